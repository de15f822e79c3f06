//! Generic desired-vs-existing planner
//!
//! Diffs two [`Zone`]s by natural key (name, type):
//!
//! - only in desired → [`Change::Create`]
//! - only in existing → [`Change::Delete`]
//! - in both with a different ttl or value set → [`Change::Update`]
//! - identical → nothing
//!
//! Changes are ordered by natural key so a plan is deterministic.
//! Providers decide *which* records reach the planner (supported types,
//! records they do not manage); the diff itself lives here.

use crate::zone::{Record, Zone};
use std::fmt;

/// Kind of change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Create,
    Update,
    Delete,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ChangeKind::Create => "CREATE",
            ChangeKind::Update => "UPDATE",
            ChangeKind::Delete => "DELETE",
        })
    }
}

/// A single record-level change
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    Create(Record),
    Update {
        existing: Record,
        desired: Record,
    },
    Delete(Record),
}

impl Change {
    pub fn kind(&self) -> ChangeKind {
        match self {
            Change::Create(_) => ChangeKind::Create,
            Change::Update { .. } => ChangeKind::Update,
            Change::Delete(_) => ChangeKind::Delete,
        }
    }

    /// The record this change acts on
    ///
    /// The desired record for creates and updates, the existing record for
    /// deletes.
    pub fn record(&self) -> &Record {
        match self {
            Change::Create(record) | Change::Delete(record) => record,
            Change::Update { desired, .. } => desired,
        }
    }
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Change::Update { existing, desired } => {
                write!(f, "UPDATE {} (was {})", desired, existing)
            }
            other => write!(f, "{} {}", other.kind(), other.record()),
        }
    }
}

/// Counts of changes per kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlanSummary {
    pub creates: usize,
    pub updates: usize,
    pub deletes: usize,
}

/// Ordered change set for one zone
///
/// Built fresh for every run and consumed once by the provider's apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    /// Absolute zone name
    pub zone: String,
    /// Whether the zone already exists at the provider
    ///
    /// When false, the zone has to be created before any change is applied.
    pub exists: bool,
    /// Record changes in apply order
    pub changes: Vec<Change>,
}

impl Plan {
    /// Diff `existing` against `desired`
    pub fn compute(existing: &Zone, desired: &Zone, exists: bool) -> Self {
        let mut changes = Vec::new();

        for record in desired.records() {
            match existing.get(record.name(), record.record_type()) {
                None => changes.push(Change::Create(record.clone())),
                Some(current) if !current.same_content(record) => {
                    changes.push(Change::Update {
                        existing: current.clone(),
                        desired: record.clone(),
                    })
                }
                Some(_) => {}
            }
        }

        for record in existing.records() {
            if desired.get(record.name(), record.record_type()).is_none() {
                changes.push(Change::Delete(record.clone()));
            }
        }

        changes.sort_by_key(|change| change.record().key());

        Self {
            zone: desired.name().to_string(),
            exists,
            changes,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn summary(&self) -> PlanSummary {
        self.changes
            .iter()
            .fold(PlanSummary::default(), |mut summary, change| {
                match change.kind() {
                    ChangeKind::Create => summary.creates += 1,
                    ChangeKind::Update => summary.updates += 1,
                    ChangeKind::Delete => summary.deletes += 1,
                }
                summary
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::zone::RecordType;

    fn record(name: &str, record_type: RecordType, ttl: u32, values: &[&str]) -> Record {
        Record::new(
            "unit.tests.",
            name,
            record_type,
            ttl,
            values.iter().map(|v| v.to_string()).collect(),
        )
        .unwrap()
    }

    fn zone(records: Vec<Record>) -> Zone {
        let mut zone = Zone::new("unit.tests.").unwrap();
        for r in records {
            zone.add_record(r, false).unwrap();
        }
        zone
    }

    #[test]
    fn test_empty_existing_creates_everything() {
        let desired = zone(vec![
            record("www", RecordType::A, 300, &["1.1.1.1"]),
            record("", RecordType::A, 300, &["2.2.2.2"]),
        ]);
        let existing = Zone::new("unit.tests.").unwrap();

        let plan = Plan::compute(&existing, &desired, false);
        assert!(!plan.exists);
        assert_eq!(plan.len(), 2);
        assert!(plan.changes.iter().all(|c| c.kind() == ChangeKind::Create));
        // apex sorts first
        assert_eq!(plan.changes[0].record().name(), "");
    }

    #[test]
    fn test_identical_zones_produce_no_changes() {
        let records = vec![
            record("www", RecordType::A, 300, &["1.1.1.1", "1.1.1.2"]),
            record("txt", RecordType::Txt, 600, &["hello"]),
        ];
        let plan = Plan::compute(&zone(records.clone()), &zone(records), true);
        assert!(plan.is_empty());
    }

    #[test]
    fn test_ttl_and_value_differences_become_updates() {
        let existing = zone(vec![
            record("www", RecordType::A, 300, &["1.1.1.1"]),
            record("mail", RecordType::A, 300, &["1.1.1.1"]),
            record("same", RecordType::A, 300, &["1.1.1.1"]),
        ]);
        let desired = zone(vec![
            record("www", RecordType::A, 60, &["1.1.1.1"]),
            record("mail", RecordType::A, 300, &["1.1.1.1", "1.1.1.9"]),
            record("same", RecordType::A, 300, &["1.1.1.1"]),
        ]);

        let plan = Plan::compute(&existing, &desired, true);
        assert_eq!(plan.len(), 2);
        let summary = plan.summary();
        assert_eq!(summary.updates, 2);

        match &plan.changes[1] {
            Change::Update { existing, desired } => {
                assert_eq!(existing.ttl(), 300);
                assert_eq!(desired.ttl(), 60);
            }
            other => panic!("expected update, got {}", other),
        }
    }

    #[test]
    fn test_records_missing_from_desired_are_deleted() {
        let existing = zone(vec![
            record("old", RecordType::Cname, 300, &["www.unit.tests."]),
            record("www", RecordType::A, 300, &["1.1.1.1"]),
        ]);
        let desired = zone(vec![record("www", RecordType::A, 300, &["1.1.1.1"])]);

        let plan = Plan::compute(&existing, &desired, true);
        assert_eq!(plan.len(), 1);
        assert_eq!(plan.changes[0].kind(), ChangeKind::Delete);
        assert_eq!(plan.changes[0].record().name(), "old");
    }

    #[test]
    fn test_same_name_different_type_are_distinct_keys() {
        let existing = zone(vec![record("www", RecordType::A, 300, &["1.1.1.1"])]);
        let desired = zone(vec![
            record("www", RecordType::A, 300, &["1.1.1.1"]),
            record("www", RecordType::Aaaa, 300, &["::1"]),
        ]);

        let plan = Plan::compute(&existing, &desired, true);
        assert_eq!(plan.summary(), PlanSummary { creates: 1, updates: 0, deletes: 0 });
    }
}
