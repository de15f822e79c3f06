//! Change application
//!
//! A plan for a zone that does not exist yet starts with the zone creation
//! call. Changes then go out one request at a time, in plan order:
//!
//! | change | request |
//! |---|---|
//! | CREATE | `POST` payload to the rrset path |
//! | UPDATE | `PUT` payload to the rrset path |
//! | DELETE | `DELETE` the rrset path |
//!
//! The first failure ends the run. Nothing already applied is undone.

use crate::UltraProvider;
use crate::translate;
use crate::wire::ZoneCreate;
use crate::zones::ZONES_PATH;
use reqwest::Method;
use tracing::{debug, info};
use zonesync_core::{Change, Plan, Result};

impl UltraProvider {
    pub(crate) async fn apply_plan(&self, plan: &Plan) -> Result<usize> {
        let result = self.apply_changes(plan).await;

        // whatever happened, the cached record sets no longer describe the zone
        self.records.invalidate(&plan.zone).await;

        if let Err(e) = &result {
            debug!("Apply for {} stopped: {}", plan.zone, e);
        }
        result
    }

    async fn apply_changes(&self, plan: &Plan) -> Result<usize> {
        if !plan.exists {
            self.create_zone(&plan.zone).await?;
        }

        let mut applied = 0;
        for change in &plan.changes {
            self.apply_change(change).await?;
            applied += 1;
        }
        Ok(applied)
    }

    async fn create_zone(&self, zone: &str) -> Result<()> {
        let account = self.client.credentials().account_name();
        info!("Creating zone {} in account {}", zone, account);

        let body = ZoneCreate::primary(zone, account);
        let result = self.client.send_json(Method::POST, ZONES_PATH, &body).await;
        self.zones.invalidate().await;
        result
    }

    async fn apply_change(&self, change: &Change) -> Result<()> {
        let record = change.record();
        let path = translate::rrset_path(record);
        info!("{}", change);

        match change {
            Change::Create(record) => {
                let payload = translate::shape_payload(record)?;
                self.client.send_json(Method::POST, &path, &payload).await
            }
            Change::Update { desired, .. } => {
                let payload = translate::shape_payload(desired)?;
                self.client.send_json(Method::PUT, &path, &payload).await
            }
            Change::Delete(_) => self.client.delete(&path).await,
        }
    }
}
