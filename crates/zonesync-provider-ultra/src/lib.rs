// # UltraDNS Provider
//
// Reconciles zones hosted on the UltraDNS REST API (v2) with a desired state.
//
// ## Components
//
// - `auth`: Token Manager (password grant, lazy login, wholesale refresh)
// - `client`: authenticated requests with a single re-authentication on 401
// - `paginate`: offset/limit walking of list endpoints
// - `zones`: Zone Directory (primary zones, cached)
// - `records`: Record Cache (raw record sets per zone, cached)
// - `translate`: Record Translator (wire <-> normalized, payload shaping)
// - `planner`: Reconciliation Planner
// - `apply`: Change Applier
//
// ## Behavior
//
// - One request in flight at a time; nothing runs in the background
// - No retries except the single re-authentication
// - "Data not found" list responses mean "nothing there", not failure
// - Caches live as long as the provider; apply invalidates what it touched
// - The apex NS record is provider-owned and never planned
//
// ## Security Requirements
//
// - Password and tokens NEVER appear in logs or `Debug` output
//
// ## API Reference
//
// - Token: POST `/v2/authorization/token`
// - List zones: GET `/v2/zones?q=zone_type:PRIMARY&offset=..&limit=100`
// - Create zone: POST `/v2/zones`
// - List record sets: GET `/v2/zones/:zone/rrsets?offset=..&limit=100`
// - Change record set: POST | PUT | DELETE `/v2/zones/:zone/rrsets/:type/:owner`

pub mod auth;
pub mod client;
pub mod paginate;
pub mod records;
pub mod translate;
pub mod wire;
pub mod zones;

mod apply;
mod planner;

pub use auth::{Credentials, Session, TokenManager};
pub use client::UltraClient;

use async_trait::async_trait;
use records::RecordCache;
use tracing::debug;
use wire::WireRecord;
use zones::ZoneDirectory;
use zonesync_core::config::ProviderConfig;
use zonesync_core::traits::{DnsProvider, DnsProviderFactory};
use zonesync_core::{Error, Plan, RecordType, Result, Zone};

/// Provider name used for registration and logging
pub const PROVIDER_NAME: &str = "ultra";

/// Record types this provider manages
///
/// SOA is read back but never managed.
pub const SUPPORTED: [RecordType; 10] = [
    RecordType::A,
    RecordType::Aaaa,
    RecordType::Caa,
    RecordType::Cname,
    RecordType::Mx,
    RecordType::Ns,
    RecordType::Ptr,
    RecordType::Spf,
    RecordType::Srv,
    RecordType::Txt,
];

/// UltraDNS provider
///
/// Owns the API client and the two listing caches. One instance serves one
/// reconciliation run at a time.
#[derive(Debug)]
pub struct UltraProvider {
    client: UltraClient,
    zones: ZoneDirectory,
    records: RecordCache,
}

impl UltraProvider {
    /// Provider talking to the host selected by `credentials`
    pub fn new(credentials: Credentials) -> Result<Self> {
        Ok(Self::from_client(UltraClient::new(credentials)?))
    }

    /// Provider talking to an explicit API host
    pub fn with_base_url(credentials: Credentials, base_url: impl Into<String>) -> Result<Self> {
        Ok(Self::from_client(UltraClient::with_base_url(
            credentials,
            base_url,
        )?))
    }

    fn from_client(client: UltraClient) -> Self {
        Self {
            client,
            zones: ZoneDirectory::new(),
            records: RecordCache::new(),
        }
    }

    pub fn client(&self) -> &UltraClient {
        &self.client
    }

    /// Log in now instead of on the first request
    pub async fn login(&self) -> Result<()> {
        self.client.tokens().token().await.map(|_| ())
    }

    /// Names of the account's primary zones (cached)
    pub async fn zones(&self) -> Result<Vec<String>> {
        self.zones.zones(&self.client).await
    }

    /// Raw record sets of `zone` (cached); `None` when the zone does not exist
    pub async fn zone_records(&self, zone: &str) -> Result<Option<Vec<WireRecord>>> {
        self.records.zone_records(&self.client, &self.zones, zone).await
    }

    /// Forget the cached zone listing
    pub async fn invalidate_zones(&self) {
        self.zones.invalidate().await;
    }

    /// Forget the cached record sets of `zone`
    pub async fn invalidate_records(&self, zone: &str) {
        self.records.invalidate(zone).await;
    }
}

#[async_trait]
impl DnsProvider for UltraProvider {
    async fn populate(&self, zone: &mut Zone) -> Result<bool> {
        let Some(wire_records) = self.zone_records(zone.name()).await? else {
            debug!("Zone {} does not exist at UltraDNS", zone.name());
            return Ok(false);
        };

        let mut added = 0;
        for wire in &wire_records {
            if let Some(record) = translate::to_normalized(zone, wire)? {
                zone.add_record(record, true)?;
                added += 1;
            }
        }

        debug!("Populated {} with {} record(s)", zone.name(), added);
        Ok(true)
    }

    async fn plan(&self, desired: &Zone) -> Result<Plan> {
        self.plan_zone(desired).await
    }

    async fn apply(&self, plan: &Plan) -> Result<usize> {
        self.apply_plan(plan).await
    }

    fn supports(&self, record_type: RecordType) -> bool {
        SUPPORTED.contains(&record_type)
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER_NAME
    }
}

/// Factory for creating UltraDNS providers
pub struct UltraFactory;

impl DnsProviderFactory for UltraFactory {
    fn create(&self, config: &ProviderConfig) -> Result<Box<dyn DnsProvider>> {
        match config {
            ProviderConfig::Ultra {
                username,
                password,
                account_name,
                test_endpoint,
            } => {
                config.validate()?;

                if *test_endpoint {
                    tracing::warn!("UltraDNS provider using the TEST endpoint");
                }

                let credentials = Credentials::new(
                    username.clone(),
                    password.clone(),
                    account_name.clone(),
                    *test_endpoint,
                );
                Ok(Box::new(UltraProvider::new(credentials)?))
            }
            _ => Err(Error::config("Invalid config for UltraDNS provider")),
        }
    }
}

/// Register the UltraDNS provider with a registry
///
/// # Example
///
/// ```rust
/// use zonesync_core::ProviderRegistry;
///
/// let registry = ProviderRegistry::new();
/// zonesync_provider_ultra::register(&registry);
/// assert!(registry.has_provider("ultra"));
/// ```
pub fn register(registry: &zonesync_core::ProviderRegistry) {
    registry.register_provider(PROVIDER_NAME, Box::new(UltraFactory));
}
