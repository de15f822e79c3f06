//! UltraDNS REST API v2 wire types
//!
//! Request and response bodies exactly as the API spells them.

use serde::{Deserialize, Serialize};

/// `@context` of the pool profile attached to multi-value A/AAAA records
pub const RD_POOL_CONTEXT: &str = "http://schemas.ultradns.com/RDPool.jsonschema";

/// Error code the API uses for "no matching resources"
pub const DATA_NOT_FOUND: i64 = 70002;

/// Paging envelope shared by every list endpoint
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultInfo {
    pub total_count: u64,
    pub offset: u64,
    pub returned_count: u64,
}

/// A page of a list endpoint
pub trait Paged {
    type Item;

    fn result_info(&self) -> Option<ResultInfo>;

    fn into_items(self) -> Vec<Self::Item>;
}

/// `GET /v2/zones`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneList {
    pub result_info: Option<ResultInfo>,
    #[serde(default)]
    pub zones: Vec<ZoneEntry>,
}

impl Paged for ZoneList {
    type Item = ZoneEntry;

    fn result_info(&self) -> Option<ResultInfo> {
        self.result_info
    }

    fn into_items(self) -> Vec<ZoneEntry> {
        self.zones
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ZoneEntry {
    pub properties: ZoneProperties,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneProperties {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_name: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub zone_type: Option<String>,
}

/// `GET /v2/zones/<zone>/rrsets`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RrSetList {
    pub result_info: Option<ResultInfo>,
    #[serde(default)]
    pub rr_sets: Vec<WireRecord>,
}

impl Paged for RrSetList {
    type Item = WireRecord;

    fn result_info(&self) -> Option<ResultInfo> {
        self.result_info
    }

    fn into_items(self) -> Vec<WireRecord> {
        self.rr_sets
    }
}

/// A record set as the API returns it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireRecord {
    /// Absolute owner name
    pub owner_name: String,
    /// Type descriptor, e.g. "A (1)"
    pub rrtype: String,
    pub ttl: u32,
    pub rdata: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<serde_json::Value>,
}

/// Body of `POST|PUT /v2/zones/<zone>/rrsets/<TYPE>/<owner>`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RrSetPayload {
    pub ttl: u32,
    pub rdata: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<PoolProfile>,
}

/// Load-balancing pool metadata for multi-value A/AAAA records
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PoolProfile {
    #[serde(rename = "@context")]
    pub context: String,
    pub order: String,
    pub description: String,
}

impl PoolProfile {
    /// Pool served in fixed order
    pub fn fixed(description: impl Into<String>) -> Self {
        Self {
            context: RD_POOL_CONTEXT.to_string(),
            order: "FIXED".to_string(),
            description: description.into(),
        }
    }
}

/// Body of `POST /v2/zones`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneCreate {
    pub properties: ZoneProperties,
    pub primary_create_info: PrimaryCreateInfo,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrimaryCreateInfo {
    pub create_type: String,
}

impl ZoneCreate {
    /// New, empty primary zone owned by `account_name`
    pub fn primary(name: impl Into<String>, account_name: impl Into<String>) -> Self {
        Self {
            properties: ZoneProperties {
                name: name.into(),
                account_name: Some(account_name.into()),
                zone_type: Some("PRIMARY".to_string()),
            },
            primary_create_info: PrimaryCreateInfo {
                create_type: "NEW".to_string(),
            },
        }
    }
}

/// One entry of the API's error-list body
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    pub error_code: i64,
    #[serde(default)]
    pub error_message: String,
}

/// Find the "Data not found" entry in an error body, if there is one
pub fn data_not_found(body: &str) -> Option<ApiError> {
    serde_json::from_str::<Vec<ApiError>>(body)
        .ok()?
        .into_iter()
        .find(|e| e.error_code == DATA_NOT_FOUND)
}
