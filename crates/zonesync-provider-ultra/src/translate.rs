//! Record translation between the API's record sets and normalized records
//!
//! Inbound, a [`WireRecord`] becomes a [`Record`]: the type descriptor
//! (`"A (1)"`) is parsed and its code checked, the absolute owner name is
//! made zone-relative and TXT/SPF values pick up the model's `\;` escaping.
//!
//! Outbound, [`shape_payload`] turns a [`Record`] into the create/update
//! body. TXT/SPF escaping is removed again so the API receives the literal
//! value, and multi-value A/AAAA sets carry a fixed-order pool profile.
//!
//! Values are validated in both directions; anything malformed is a
//! translation error, never silently dropped.

use crate::records::rrsets_path;
use crate::wire::{PoolProfile, RrSetPayload, WireRecord};
use std::net::{Ipv4Addr, Ipv6Addr};
use zonesync_core::zone::{escape_semicolons, unescape_semicolons};
use zonesync_core::{Error, Record, RecordType, Result, Zone};

/// Parse a type descriptor such as `"A (1)"`
///
/// The numeric suffix is optional but, when present, must match the type.
pub fn parse_rrtype(descriptor: &str) -> Result<RecordType> {
    let descriptor = descriptor.trim();

    let (name, code) = match descriptor
        .strip_suffix(')')
        .and_then(|d| d.rsplit_once(" ("))
    {
        Some((name, code)) => {
            let code = code.trim().parse::<u16>().map_err(|_| {
                Error::translation(format!("Malformed type descriptor: {}", descriptor))
            })?;
            (name.trim(), Some(code))
        }
        None => (descriptor, None),
    };

    let record_type: RecordType = name
        .parse()
        .map_err(|_| Error::translation(format!("Unknown record type: {}", descriptor)))?;

    if let Some(code) = code {
        if code != record_type.code() {
            return Err(Error::translation(format!(
                "Type descriptor {} does not match {} ({})",
                descriptor,
                record_type,
                record_type.code()
            )));
        }
    }

    Ok(record_type)
}

/// Translate a record set returned by the API
///
/// Returns `Ok(None)` for SOA, which is never managed.
pub fn to_normalized(zone: &Zone, wire: &WireRecord) -> Result<Option<Record>> {
    let record_type = parse_rrtype(&wire.rrtype)?;
    if record_type == RecordType::Soa {
        return Ok(None);
    }

    let name = zone
        .hostname_from_fqdn(&wire.owner_name)
        .map_err(|e| Error::translation(e.to_string()))?;

    let values = wire
        .rdata
        .iter()
        .map(|value| normalize_value(record_type, value, &wire.owner_name))
        .collect::<Result<Vec<_>>>()?;

    Record::new(zone.name(), name, record_type, wire.ttl, values)
        .map(Some)
        .map_err(|e| Error::translation(e.to_string()))
}

/// Re-validate a normalized record and canonicalize its values
pub fn normalize(record: &Record) -> Result<Record> {
    let owner = record.fqdn();
    let values = record
        .values()
        .iter()
        .map(|value| normalize_value(record.record_type(), value, &owner))
        .collect::<Result<Vec<_>>>()?;

    Record::new(
        record.zone(),
        record.name(),
        record.record_type(),
        record.ttl(),
        values,
    )
    .map_err(|e| Error::translation(e.to_string()))
}

/// Create/update body for `record`
///
/// | type | rdata | profile |
/// |---|---|---|
/// | A, AAAA | addresses | fixed-order pool when more than one |
/// | TXT, SPF | values with `\;` unescaped | none |
/// | CNAME, PTR | the single target | none |
/// | MX, SRV, CAA, NS | values | none |
/// | SOA | not sent | |
pub fn shape_payload(record: &Record) -> Result<RrSetPayload> {
    let owner = record.fqdn();
    for value in record.values() {
        normalize_value(record.record_type(), value, &owner)?;
    }

    let (rdata, profile) = match record.record_type() {
        RecordType::A | RecordType::Aaaa => {
            let profile = (record.values().len() > 1).then(|| PoolProfile::fixed(owner.clone()));
            (record.values().to_vec(), profile)
        }
        RecordType::Txt | RecordType::Spf => (
            record
                .values()
                .iter()
                .map(|v| unescape_semicolons(v))
                .collect(),
            None,
        ),
        RecordType::Cname | RecordType::Ptr => (vec![record.value().to_string()], None),
        RecordType::Mx | RecordType::Srv | RecordType::Caa | RecordType::Ns => {
            (record.values().to_vec(), None)
        }
        RecordType::Soa => {
            return Err(Error::translation(format!(
                "SOA record {} cannot be written",
                owner
            )));
        }
    };

    Ok(RrSetPayload {
        ttl: record.ttl(),
        rdata,
        profile,
    })
}

/// `/v2/zones/<zone>/rrsets/<TYPE>/<owner>`
pub fn rrset_path(record: &Record) -> String {
    format!(
        "{}/{}/{}",
        rrsets_path(record.zone()),
        record.record_type(),
        record.fqdn()
    )
}

/// Validate one value of `record_type` and bring it into model form
fn normalize_value(record_type: RecordType, value: &str, owner: &str) -> Result<String> {
    let invalid = |reason: &str| {
        Error::translation(format!(
            "Invalid {} value for {} ({}): {:?}",
            record_type, owner, reason, value
        ))
    };

    let raw = value;
    let value = value.trim();

    match record_type {
        // TXT/SPF content is kept as is, surrounding whitespace included
        RecordType::Txt | RecordType::Spf if raw.is_empty() => Err(invalid("empty")),
        RecordType::Txt | RecordType::Spf => Ok(escape_semicolons(raw)),
        _ if value.is_empty() => Err(invalid("empty")),
        RecordType::A => {
            value.parse::<Ipv4Addr>().map_err(|_| invalid("not an IPv4 address"))?;
            Ok(value.to_string())
        }
        RecordType::Aaaa => {
            value.parse::<Ipv6Addr>().map_err(|_| invalid("not an IPv6 address"))?;
            Ok(value.to_string())
        }
        RecordType::Cname | RecordType::Ptr | RecordType::Ns => {
            if value.split_whitespace().count() != 1 {
                return Err(invalid("expected a single name"));
            }
            Ok(value.to_string())
        }
        RecordType::Mx => {
            let fields = split_fields(value, 2).ok_or_else(|| invalid("expected 'preference exchange'"))?;
            fields[0].parse::<u16>().map_err(|_| invalid("preference is not a number"))?;
            if fields[1].contains(char::is_whitespace) {
                return Err(invalid("expected 'preference exchange'"));
            }
            Ok(fields.join(" "))
        }
        RecordType::Srv => {
            let fields = split_fields(value, 4)
                .ok_or_else(|| invalid("expected 'priority weight port target'"))?;
            for field in &fields[..3] {
                field
                    .parse::<u16>()
                    .map_err(|_| invalid("priority, weight and port must be numbers"))?;
            }
            if fields[3].contains(char::is_whitespace) {
                return Err(invalid("expected 'priority weight port target'"));
            }
            Ok(fields.join(" "))
        }
        RecordType::Caa => {
            let fields = split_fields(value, 3).ok_or_else(|| invalid("expected 'flags tag value'"))?;
            fields[0].parse::<u8>().map_err(|_| invalid("flags is not a number"))?;
            Ok(fields.join(" "))
        }
        RecordType::Soa => Ok(value.split_whitespace().collect::<Vec<_>>().join(" ")),
    }
}

/// Split `value` into `n` whitespace-separated fields
///
/// The last field keeps whatever follows the first `n - 1` fields, inner
/// whitespace included. Returns `None` when there are fewer than `n` fields.
fn split_fields(value: &str, n: usize) -> Option<Vec<&str>> {
    let mut fields = Vec::with_capacity(n);
    let mut rest = value.trim();
    while fields.len() + 1 < n {
        let (field, tail) = rest.split_once(char::is_whitespace)?;
        fields.push(field);
        rest = tail.trim_start();
    }
    if rest.is_empty() {
        return None;
    }
    fields.push(rest);
    Some(fields)
}
