// # DNS Provider Trait
//
// Defines the interface between the sync engine and a DNS hosting provider.
//
// ## Implementations
//
// - UltraDNS: `zonesync-provider-ultra` crate
//
// ## Usage
//
// ```rust,ignore
// use zonesync_core::DnsProvider;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let provider = /* DnsProvider implementation */;
//     let desired = /* Zone built from the desired state */;
//
//     let plan = provider.plan(&desired).await?;
//     let applied = provider.apply(&plan).await?;
//     assert_eq!(applied, plan.changes.len());
//
//     Ok(())
// }
// ```

use async_trait::async_trait;

use crate::plan::Plan;
use crate::zone::{RecordType, Zone};

/// Trait for DNS provider implementations
///
/// A provider reads the current state of a zone from its API, plans the
/// changes that converge it onto a desired zone, and applies them.
///
/// # Ownership
///
/// - The diff itself belongs to [`Plan::compute`]; providers decide which
///   records take part (supported types, records they do not manage)
/// - Retries beyond a single re-authentication are not a provider concern:
///   a failed request fails the operation
/// - Providers may cache remote listings for the lifetime of the instance;
///   `apply` must invalidate whatever it makes stale
///
/// # Thread Safety
///
/// Implementations must be usable across async tasks. Calls are issued one
/// at a time by the engine, but caches must still be guarded.
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// Load the provider's current records for `zone` into it
    ///
    /// # Returns
    ///
    /// - `Ok(true)`: the zone exists at the provider
    /// - `Ok(false)`: the zone does not exist; nothing was added
    /// - `Err(Error)`: the records could not be fetched or translated
    async fn populate(&self, zone: &mut Zone) -> Result<bool, crate::Error>;

    /// Compute the changes needed to converge the provider onto `desired`
    async fn plan(&self, desired: &Zone) -> Result<Plan, crate::Error>;

    /// Apply a plan
    ///
    /// Creates the zone first when `plan.exists` is false, then applies
    /// every change in order. The first failure aborts the run; changes
    /// already applied are not rolled back.
    ///
    /// # Returns
    ///
    /// The number of changes applied (`plan.changes.len()` on success)
    async fn apply(&self, plan: &Plan) -> Result<usize, crate::Error>;

    /// Whether this provider can manage records of the given type
    fn supports(&self, record_type: RecordType) -> bool;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}

/// Helper trait for constructing DNS providers from configuration
pub trait DnsProviderFactory: Send + Sync {
    /// Create a DnsProvider instance from configuration
    ///
    /// # Parameters
    ///
    /// - `config`: Configuration specific to this provider
    ///
    /// # Returns
    ///
    /// A boxed DnsProvider trait object
    fn create(
        &self,
        config: &crate::config::ProviderConfig,
    ) -> Result<Box<dyn DnsProvider>, crate::Error>;
}
