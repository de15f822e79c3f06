//! Per-zone record cache
//!
//! Raw record sets per zone name, fetched once per zone and kept until the
//! entry is invalidated (apply does this for the zone it touched).

use crate::client::UltraClient;
use crate::paginate;
use crate::wire::{RrSetList, WireRecord};
use crate::zones::{ZONES_PATH, ZoneDirectory};
use tracing::debug;
use zonesync_core::{KeyedCache, Result};

#[derive(Debug, Default)]
pub struct RecordCache {
    records: KeyedCache<String, Vec<WireRecord>>,
}

impl RecordCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record sets of `zone`
    ///
    /// A cached entry is returned without any request. Otherwise the zone
    /// directory is consulted first; a zone it does not list yields `None`
    /// (and is not cached), a listed zone has its record sets fetched.
    pub async fn zone_records(
        &self,
        client: &UltraClient,
        directory: &ZoneDirectory,
        zone: &str,
    ) -> Result<Option<Vec<WireRecord>>> {
        let key = zone.to_string();
        if let Some(records) = self.records.peek(&key).await {
            debug!("Record cache hit for {}", zone);
            return Ok(Some(records));
        }

        if !directory.contains(client, zone).await? {
            debug!("Zone {} does not exist", zone);
            return Ok(None);
        }

        debug!("Record cache miss for {}", zone);
        let path = rrsets_path(zone);
        let records = self
            .records
            .get_or_try_fetch(&key, || async {
                paginate::fetch_all::<RrSetList>(client, &path, &[]).await
            })
            .await?;
        Ok(Some(records))
    }

    /// Forget the record sets of `zone`
    pub async fn invalidate(&self, zone: &str) {
        self.records.invalidate(&zone.to_string()).await;
    }

    /// Seed the cache for `zone` without fetching
    pub async fn set(&self, zone: &str, records: Vec<WireRecord>) {
        self.records.set(zone.to_string(), records).await;
    }
}

/// `/v2/zones/<zone>/rrsets`
pub fn rrsets_path(zone: &str) -> String {
    format!("{}/{}/rrsets", ZONES_PATH, zone)
}
