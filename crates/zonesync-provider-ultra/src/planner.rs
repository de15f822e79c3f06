//! Reconciliation planning
//!
//! The current side of the diff is whatever [`UltraProvider::populate`]
//! reads back; the desired side is the caller's zone restricted to record
//! types this provider manages.
//!
//! The apex NS record belongs to the provider (it is created with the zone)
//! and is left out of both sides. As a consequence, NS changes at the apex
//! of an existing zone never show up in a plan. Delegations (NS records
//! below the apex) are managed like any other record.

use crate::UltraProvider;
use crate::translate;
use tracing::{debug, warn};
use zonesync_core::{DnsProvider, Plan, RecordType, Result, Zone};

impl UltraProvider {
    pub(crate) async fn plan_zone(&self, desired: &Zone) -> Result<Plan> {
        let mut existing = Zone::new(desired.name())?;
        let exists = self.populate(&mut existing).await?;
        if existing.remove_record("", RecordType::Ns).is_some() {
            debug!("Ignoring existing apex NS of {}", desired.name());
        }

        let mut wanted = Zone::new(desired.name())?;
        for record in desired.records() {
            if !self.supports(record.record_type()) {
                warn!(
                    "Dropping {} {}: record type not supported by UltraDNS",
                    record.record_type(),
                    record.fqdn()
                );
                continue;
            }
            if record.is_apex() && record.record_type() == RecordType::Ns {
                debug!("Ignoring desired apex NS of {}", desired.name());
                continue;
            }

            let record = translate::normalize(record)?;
            translate::shape_payload(&record)?;
            wanted.add_record(record, false)?;
        }

        let plan = Plan::compute(&existing, &wanted, exists);
        let summary = plan.summary();
        debug!(
            "Plan for {}: {} create(s), {} update(s), {} delete(s){}",
            plan.zone,
            summary.creates,
            summary.updates,
            summary.deletes,
            if exists { "" } else { " (zone will be created)" }
        );

        Ok(plan)
    }
}
