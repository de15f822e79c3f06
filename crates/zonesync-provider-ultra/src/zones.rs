//! Zone directory
//!
//! Names of the primary zones visible to the account, fetched on first use
//! and kept until [`ZoneDirectory::invalidate`] is called.

use crate::client::UltraClient;
use crate::paginate;
use crate::wire::ZoneList;
use tracing::debug;
use zonesync_core::{CacheSlot, Result};

/// Zone listing endpoint
pub const ZONES_PATH: &str = "/v2/zones";

/// Filter restricting the listing to primary zones
const PRIMARY_FILTER: &str = "zone_type:PRIMARY";

#[derive(Debug, Default)]
pub struct ZoneDirectory {
    names: CacheSlot<Vec<String>>,
}

impl ZoneDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Names of all primary zones, fetched on first call
    pub async fn zones(&self, client: &UltraClient) -> Result<Vec<String>> {
        self.names
            .get_or_try_fetch(|| async {
                let entries = paginate::fetch_all::<ZoneList>(
                    client,
                    ZONES_PATH,
                    &[("q", PRIMARY_FILTER.to_string())],
                )
                .await?;

                let names: Vec<String> = entries.into_iter().map(|z| z.properties.name).collect();
                debug!("Zone directory loaded: {} zone(s)", names.len());
                Ok(names)
            })
            .await
    }

    /// Whether `zone` is a known primary zone
    pub async fn contains(&self, client: &UltraClient, zone: &str) -> Result<bool> {
        Ok(self.zones(client).await?.iter().any(|name| name == zone))
    }

    /// Forget the cached listing
    pub async fn invalidate(&self) {
        self.names.invalidate().await;
    }

    /// Seed the cache without fetching
    pub async fn set(&self, names: Vec<String>) {
        self.names.set(names).await;
    }
}
