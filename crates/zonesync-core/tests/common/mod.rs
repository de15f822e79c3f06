//! Test doubles for the engine contract tests

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use zonesync_core::error::{Error, Result};
use zonesync_core::{Change, DnsProvider, Plan, RecordType, Zone};

/// A provider whose remote side is an in-memory map of zones
///
/// Clones share the remote state and the counters, so a test can keep one
/// handle while the engine owns another.
#[derive(Clone, Default)]
pub struct MemoryProvider {
    remote: Arc<Mutex<HashMap<String, Zone>>>,
    plan_calls: Arc<AtomicUsize>,
    apply_calls: Arc<AtomicUsize>,
    /// Zone names whose apply fails
    failing: Arc<Mutex<Vec<String>>>,
}

impl MemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the remote side with `zone`
    pub fn seed(&self, zone: Zone) {
        self.remote
            .lock()
            .unwrap()
            .insert(zone.name().to_string(), zone);
    }

    /// Make every apply for `zone` fail
    pub fn fail_apply_for(&self, zone: &str) {
        self.failing.lock().unwrap().push(zone.to_string());
    }

    pub fn remote_zone(&self, name: &str) -> Option<Zone> {
        self.remote.lock().unwrap().get(name).cloned()
    }

    pub fn plan_calls(&self) -> usize {
        self.plan_calls.load(Ordering::SeqCst)
    }

    pub fn apply_calls(&self) -> usize {
        self.apply_calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl DnsProvider for MemoryProvider {
    async fn populate(&self, zone: &mut Zone) -> Result<bool> {
        let remote = self.remote.lock().unwrap();
        match remote.get(zone.name()) {
            Some(existing) => {
                for record in existing.records() {
                    zone.add_record(record.clone(), true)?;
                }
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn plan(&self, desired: &Zone) -> Result<Plan> {
        self.plan_calls.fetch_add(1, Ordering::SeqCst);
        let mut existing = Zone::new(desired.name())?;
        let exists = self.populate(&mut existing).await?;
        Ok(Plan::compute(&existing, desired, exists))
    }

    async fn apply(&self, plan: &Plan) -> Result<usize> {
        self.apply_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.lock().unwrap().contains(&plan.zone) {
            return Err(Error::request(500, "injected failure"));
        }

        let mut remote = self.remote.lock().unwrap();
        if !plan.exists {
            remote.insert(plan.zone.clone(), Zone::new(plan.zone.clone())?);
        }
        let zone = remote
            .get_mut(&plan.zone)
            .ok_or_else(|| Error::not_found(plan.zone.clone()))?;

        for change in &plan.changes {
            match change {
                Change::Create(record) | Change::Update { desired: record, .. } => {
                    zone.add_record(record.clone(), true)?
                }
                Change::Delete(record) => {
                    zone.remove_record(record.name(), record.record_type());
                }
            }
        }
        Ok(plan.changes.len())
    }

    fn supports(&self, record_type: RecordType) -> bool {
        record_type != RecordType::Soa
    }

    fn provider_name(&self) -> &'static str {
        "memory"
    }
}

/// Desired-state document with two zones
pub const DESIRED: &str = r#"{
    "zones": {
        "a.tests.": {
            "": [{"type": "A", "ttl": 300, "values": ["1.2.3.4", "1.2.3.5"]}],
            "www": [{"type": "CNAME", "value": "a.tests."}]
        },
        "b.tests.": {
            "mail": [{"type": "MX", "values": ["10 mx1.b.tests.", "20 mx2.b.tests."]}],
            "txt": [{"type": "TXT", "ttl": 600, "value": "v=spf1 -all"}]
        }
    }
}"#;
