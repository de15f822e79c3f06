// # Normalized Zone Model
//
// Provider-independent representation of a DNS zone and its record sets.
//
// ## Conventions
//
// - Zone names are absolute and carry the trailing dot ("example.com.")
// - Record names are relative to the zone; the apex is the empty string
// - A zone holds at most one record per (name, type) pair, the natural key
// - Multi-value records keep their values sorted and de-duplicated, so two
//   records compare equal regardless of the order their values arrived in
// - TXT and SPF values escape `;` as `\;`

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// DNS record type
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RecordType {
    A,
    Aaaa,
    Caa,
    Cname,
    Mx,
    Ns,
    Ptr,
    Soa,
    Spf,
    Srv,
    Txt,
}

impl RecordType {
    /// Every known record type, in natural-key order
    pub const ALL: [RecordType; 11] = [
        RecordType::A,
        RecordType::Aaaa,
        RecordType::Caa,
        RecordType::Cname,
        RecordType::Mx,
        RecordType::Ns,
        RecordType::Ptr,
        RecordType::Soa,
        RecordType::Spf,
        RecordType::Srv,
        RecordType::Txt,
    ];

    /// Canonical upper-case name
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::A => "A",
            RecordType::Aaaa => "AAAA",
            RecordType::Caa => "CAA",
            RecordType::Cname => "CNAME",
            RecordType::Mx => "MX",
            RecordType::Ns => "NS",
            RecordType::Ptr => "PTR",
            RecordType::Soa => "SOA",
            RecordType::Spf => "SPF",
            RecordType::Srv => "SRV",
            RecordType::Txt => "TXT",
        }
    }

    /// IANA numeric type code
    pub fn code(&self) -> u16 {
        match self {
            RecordType::A => 1,
            RecordType::Ns => 2,
            RecordType::Cname => 5,
            RecordType::Soa => 6,
            RecordType::Ptr => 12,
            RecordType::Mx => 15,
            RecordType::Txt => 16,
            RecordType::Aaaa => 28,
            RecordType::Srv => 33,
            RecordType::Spf => 99,
            RecordType::Caa => 257,
        }
    }

    /// Whether a record set of this type may hold more than one value
    pub fn is_multi_value(&self) -> bool {
        !matches!(self, RecordType::Cname | RecordType::Ptr | RecordType::Soa)
    }

    /// Whether values of this type use the escaped-semicolon convention
    pub fn escapes_semicolons(&self) -> bool {
        matches!(self, RecordType::Txt | RecordType::Spf)
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        RecordType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::invalid_input(format!("Unknown record type: {}", s)))
    }
}

/// Escape unescaped semicolons (`;` -> `\;`)
pub fn escape_semicolons(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut escaped = false;
    for c in value.chars() {
        if c == ';' && !escaped {
            out.push('\\');
        }
        escaped = c == '\\' && !escaped;
        out.push(c);
    }
    out
}

/// Remove the escaping added by [`escape_semicolons`] (`\;` -> `;`)
pub fn unescape_semicolons(value: &str) -> String {
    value.replace("\\;", ";")
}

/// Natural key of a record within a zone: (relative name, type)
pub type RecordKey = (String, RecordType);

/// A normalized DNS record set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    zone: String,
    name: String,
    record_type: RecordType,
    ttl: u32,
    values: Vec<String>,
}

impl Record {
    /// Create a new record
    ///
    /// # Errors
    ///
    /// - no values were given
    /// - a single-value type (CNAME, PTR, SOA) was given more than one value
    /// - `zone` is not absolute
    pub fn new(
        zone: impl Into<String>,
        name: impl Into<String>,
        record_type: RecordType,
        ttl: u32,
        values: Vec<String>,
    ) -> Result<Self> {
        let zone = zone.into();
        let name = name.into().to_ascii_lowercase();

        if !zone.ends_with('.') {
            return Err(Error::invalid_input(format!(
                "Zone name must end with '.': {}",
                zone
            )));
        }
        if values.is_empty() {
            return Err(Error::invalid_input(format!(
                "{} record '{}' in {} has no values",
                record_type, name, zone
            )));
        }

        let mut values = values;
        if record_type.is_multi_value() {
            values.sort();
            values.dedup();
        } else if values.len() != 1 {
            return Err(Error::invalid_input(format!(
                "{} record '{}' in {} must have exactly one value, got {}",
                record_type,
                name,
                zone,
                values.len()
            )));
        }

        Ok(Self {
            zone,
            name,
            record_type,
            ttl,
            values,
        })
    }

    /// Zone this record belongs to
    pub fn zone(&self) -> &str {
        &self.zone
    }

    /// Name relative to the zone (empty for the apex)
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn record_type(&self) -> RecordType {
        self.record_type
    }

    pub fn ttl(&self) -> u32 {
        self.ttl
    }

    /// Record values, sorted for multi-value types
    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// The single value of a CNAME/PTR/SOA record (first value otherwise)
    pub fn value(&self) -> &str {
        &self.values[0]
    }

    pub fn is_apex(&self) -> bool {
        self.name.is_empty()
    }

    /// Absolute owner name
    pub fn fqdn(&self) -> String {
        fqdn_for(&self.zone, &self.name)
    }

    /// Natural key used for diffing
    pub fn key(&self) -> RecordKey {
        (self.name.clone(), self.record_type)
    }

    /// Same ttl and same value set
    pub fn same_content(&self, other: &Record) -> bool {
        self.ttl == other.ttl && self.values == other.values
    }

    /// Copy of this record with a different ttl
    pub fn with_ttl(&self, ttl: u32) -> Self {
        Self {
            ttl,
            ..self.clone()
        }
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} [{}]",
            self.fqdn(),
            self.ttl,
            self.record_type,
            self.values.join(", ")
        )
    }
}

/// Absolute owner name for `name` within `zone`
pub fn fqdn_for(zone: &str, name: &str) -> String {
    if name.is_empty() {
        zone.to_string()
    } else {
        format!("{}.{}", name, zone)
    }
}

/// A DNS zone and the records it holds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Zone {
    name: String,
    records: BTreeMap<RecordKey, Record>,
}

impl Zone {
    /// Create an empty zone
    ///
    /// The name must be absolute (trailing dot).
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.len() < 2 || !name.ends_with('.') {
            return Err(Error::invalid_input(format!(
                "Zone name must be absolute (end with '.'): {}",
                name
            )));
        }
        Ok(Self {
            name,
            records: BTreeMap::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Records in natural-key order
    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.records.values()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, name: &str, record_type: RecordType) -> Option<&Record> {
        self.records.get(&(name.to_string(), record_type))
    }

    /// Add a record to the zone
    ///
    /// A second record with the same (name, type) is rejected unless
    /// `replace` is set, in which case it supersedes the first.
    pub fn add_record(&mut self, record: Record, replace: bool) -> Result<()> {
        if record.zone() != self.name {
            return Err(Error::invalid_input(format!(
                "Record {} does not belong to zone {}",
                record.fqdn(),
                self.name
            )));
        }

        let key = record.key();
        if !replace && self.records.contains_key(&key) {
            return Err(Error::invalid_input(format!(
                "Duplicate record: {} {}",
                record.fqdn(),
                record.record_type()
            )));
        }
        self.records.insert(key, record);
        Ok(())
    }

    /// Remove and return the record with the given natural key
    pub fn remove_record(&mut self, name: &str, record_type: RecordType) -> Option<Record> {
        self.records.remove(&(name.to_string(), record_type))
    }

    /// Convert an absolute owner name to a name relative to this zone
    ///
    /// The zone apex maps to the empty string. Names compare without regard
    /// to ASCII case and come back lowercased.
    pub fn hostname_from_fqdn(&self, fqdn: &str) -> Result<String> {
        let fqdn = if fqdn.ends_with('.') {
            fqdn.to_string()
        } else {
            format!("{}.", fqdn)
        };

        if fqdn.eq_ignore_ascii_case(&self.name) {
            return Ok(String::new());
        }

        let suffix = format!(".{}", self.name);
        let split = fqdn.len().saturating_sub(suffix.len());
        if split > 0
            && fqdn.is_char_boundary(split)
            && fqdn[split..].eq_ignore_ascii_case(&suffix)
        {
            return Ok(fqdn[..split].to_ascii_lowercase());
        }

        Err(Error::invalid_input(format!(
            "Owner name {} is not within zone {}",
            fqdn, self.name
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_record_type_parse_and_code() {
        assert_eq!("AAAA".parse::<RecordType>().unwrap(), RecordType::Aaaa);
        assert_eq!("cname".parse::<RecordType>().unwrap(), RecordType::Cname);
        assert_eq!(RecordType::Caa.code(), 257);
        assert_eq!(RecordType::Txt.to_string(), "TXT");
        assert!("BOGUS".parse::<RecordType>().is_err());
    }

    #[test]
    fn test_multi_value_records_are_order_insensitive() {
        let a = Record::new("unit.tests.", "", RecordType::A, 300, values(&["1.2.3.5", "1.2.3.4"]))
            .unwrap();
        let b = Record::new("unit.tests.", "", RecordType::A, 300, values(&["1.2.3.4", "1.2.3.5"]))
            .unwrap();
        assert_eq!(a, b);
        assert_eq!(a.values(), &["1.2.3.4", "1.2.3.5"]);
    }

    #[test]
    fn test_single_value_type_rejects_many_values() {
        let result = Record::new(
            "unit.tests.",
            "www",
            RecordType::Cname,
            300,
            values(&["a.unit.tests.", "b.unit.tests."]),
        );
        assert!(result.is_err());

        let result = Record::new("unit.tests.", "www", RecordType::Cname, 300, vec![]);
        assert!(result.is_err());
    }

    #[test]
    fn test_zone_rejects_duplicates_unless_replacing() {
        let mut zone = Zone::new("unit.tests.").unwrap();
        let first = Record::new("unit.tests.", "www", RecordType::A, 300, values(&["1.1.1.1"]))
            .unwrap();
        let second = first.with_ttl(600);

        zone.add_record(first, false).unwrap();
        assert!(zone.add_record(second.clone(), false).is_err());
        zone.add_record(second, true).unwrap();

        assert_eq!(zone.len(), 1);
        assert_eq!(zone.get("www", RecordType::A).unwrap().ttl(), 600);
    }

    #[test]
    fn test_zone_name_must_be_absolute() {
        assert!(Zone::new("unit.tests").is_err());
        assert!(Zone::new("unit.tests.").is_ok());
    }

    #[test]
    fn test_hostname_from_fqdn() {
        let zone = Zone::new("unit.tests.").unwrap();
        assert_eq!(zone.hostname_from_fqdn("unit.tests.").unwrap(), "");
        assert_eq!(zone.hostname_from_fqdn("txt.unit.tests.").unwrap(), "txt");
        assert_eq!(zone.hostname_from_fqdn("_srv._tcp.unit.tests.").unwrap(), "_srv._tcp");
        assert!(zone.hostname_from_fqdn("other.tests.").is_err());
        assert!(zone.hostname_from_fqdn("xunit.tests.").is_err());
        assert_eq!(zone.hostname_from_fqdn("WWW.Unit.Tests.").unwrap(), "www");
        // multi-byte character straddling the suffix boundary
        assert!(zone.hostname_from_fqdn("abéunit.tests.").is_err());
        assert!(zone.hostname_from_fqdn("é.unit.tests.").is_ok());
    }

    #[test]
    fn test_record_names_are_lowercased() {
        let record = Record::new("unit.tests.", "WWW", RecordType::A, 300, values(&["1.2.3.4"]))
            .unwrap();
        assert_eq!(record.name(), "www");
        assert_eq!(record.fqdn(), "www.unit.tests.");
    }

    #[test]
    fn test_fqdn_round_trip() {
        let zone = Zone::new("unit.tests.").unwrap();
        for name in ["", "www", "deep.sub"] {
            let fqdn = fqdn_for(zone.name(), name);
            assert_eq!(zone.hostname_from_fqdn(&fqdn).unwrap(), name);
        }
    }

    #[test]
    fn test_semicolon_escaping() {
        assert_eq!(escape_semicolons("v=DKIM1;k=rsa"), "v=DKIM1\\;k=rsa");
        // already-escaped input is left alone
        assert_eq!(escape_semicolons("v=DKIM1\\;k=rsa"), "v=DKIM1\\;k=rsa");
        assert_eq!(unescape_semicolons("v=DKIM1\\;k=rsa"), "v=DKIM1;k=rsa");
    }
}
