//! Desired-state documents
//!
//! A desired-state document lists the zones to manage and, per zone, the
//! records keyed by relative name:
//!
//! ```json
//! {
//!   "zones": {
//!     "example.com.": {
//!       "": [{ "type": "A", "ttl": 300, "values": ["1.2.3.4", "1.2.3.5"] }],
//!       "www": [{ "type": "CNAME", "value": "example.com." }]
//!     }
//!   }
//! }
//! ```
//!
//! `value` is accepted in place of a one-element `values`; ttl defaults to
//! 3600.

use crate::error::{Error, Result};
use crate::zone::{Record, RecordType, Zone};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Default ttl for records that do not set one
pub const DEFAULT_TTL: u32 = 3600;

/// One record set as written in a desired-state document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordSpec {
    #[serde(rename = "type")]
    pub record_type: RecordType,

    #[serde(default = "default_ttl")]
    pub ttl: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<String>,
}

fn default_ttl() -> u32 {
    DEFAULT_TTL
}

impl RecordSpec {
    fn into_record(self, zone: &str, name: &str) -> Result<Record> {
        let values = match (self.value, self.values) {
            (Some(_), values) if !values.is_empty() => {
                return Err(Error::invalid_input(format!(
                    "{} record '{}' in {} sets both value and values",
                    self.record_type, name, zone
                )));
            }
            (Some(value), _) => vec![value],
            (None, values) => values,
        };
        Record::new(zone, name, self.record_type, self.ttl, values)
    }
}

/// Parsed desired-state document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DesiredState {
    pub zones: BTreeMap<String, BTreeMap<String, Vec<RecordSpec>>>,
}

impl DesiredState {
    /// Load a desired-state document from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            Error::config(format!(
                "Failed to read desired state {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Self::from_json(&content)
    }

    /// Parse a desired-state document from a JSON string
    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Build the normalized zones described by this document
    pub fn to_zones(&self) -> Result<Vec<Zone>> {
        let mut zones = Vec::with_capacity(self.zones.len());
        for (zone_name, names) in &self.zones {
            let mut zone = Zone::new(zone_name.clone())?;
            for (name, specs) in names {
                for spec in specs {
                    let record = spec.clone().into_record(zone_name, name)?;
                    zone.add_record(record, false)?;
                }
            }
            zones.push(zone);
        }
        Ok(zones)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const DOCUMENT: &str = r#"{
        "zones": {
            "unit.tests.": {
                "": [
                    {"type": "A", "ttl": 300, "values": ["1.2.3.5", "1.2.3.4"]},
                    {"type": "CAA", "value": "0 issue \"ca.unit.tests\""}
                ],
                "txt": [
                    {"type": "TXT", "ttl": 600, "values": ["v=DKIM1\\;k=rsa"]}
                ],
                "www": [{"type": "CNAME", "value": "unit.tests."}]
            }
        }
    }"#;

    #[test]
    fn test_document_to_zones() {
        let state = DesiredState::from_json(DOCUMENT).unwrap();
        let zones = state.to_zones().unwrap();

        assert_eq!(zones.len(), 1);
        let zone = &zones[0];
        assert_eq!(zone.name(), "unit.tests.");
        assert_eq!(zone.len(), 4);

        let apex = zone.get("", RecordType::A).unwrap();
        assert_eq!(apex.values(), &["1.2.3.4", "1.2.3.5"]);

        let caa = zone.get("", RecordType::Caa).unwrap();
        assert_eq!(caa.ttl(), DEFAULT_TTL);

        let txt = zone.get("txt", RecordType::Txt).unwrap();
        assert_eq!(txt.value(), "v=DKIM1\\;k=rsa");
    }

    #[test]
    fn test_duplicate_type_under_one_name_is_rejected() {
        let state = DesiredState::from_json(
            r#"{"zones": {"unit.tests.": {"www": [
                {"type": "A", "value": "1.1.1.1"},
                {"type": "A", "value": "2.2.2.2"}
            ]}}}"#,
        )
        .unwrap();
        assert!(state.to_zones().is_err());
    }

    #[test]
    fn test_value_and_values_are_exclusive() {
        let state = DesiredState::from_json(
            r#"{"zones": {"unit.tests.": {"www": [
                {"type": "A", "value": "1.1.1.1", "values": ["2.2.2.2"]}
            ]}}}"#,
        )
        .unwrap();
        assert!(state.to_zones().is_err());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(DOCUMENT.as_bytes()).unwrap();

        let state = DesiredState::from_file(file.path()).unwrap();
        assert_eq!(state.zones.len(), 1);

        assert!(DesiredState::from_file("/nonexistent/zones.json").is_err());
    }
}
