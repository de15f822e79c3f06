//! Offset/limit pagination over list endpoints
//!
//! Requests pages of [`PAGE_SIZE`] until `offset + returnedCount` reaches
//! the reported `totalCount`, concatenating items in server order. The next
//! page starts at `offset + returnedCount`.
//!
//! A "Data not found" error body, or a page reporting `totalCount: 0`, means
//! there is nothing to list and yields an empty result.

use crate::client::UltraClient;
use crate::wire::Paged;
use serde::de::DeserializeOwned;
use tracing::debug;
use zonesync_core::{Error, Result};

/// Items requested per page
pub const PAGE_SIZE: u64 = 100;

/// Fetch every item of a paginated collection
///
/// # Parameters
///
/// - `path`: collection path, e.g. `/v2/zones`
/// - `filters`: extra query parameters sent with every page
pub async fn fetch_all<P>(
    client: &UltraClient,
    path: &str,
    filters: &[(&str, String)],
) -> Result<Vec<P::Item>>
where
    P: Paged + DeserializeOwned,
{
    let mut items = Vec::new();
    let mut offset = 0;

    loop {
        let mut query: Vec<(&str, String)> = filters.to_vec();
        query.push(("offset", offset.to_string()));
        query.push(("limit", PAGE_SIZE.to_string()));

        let page: P = match client.get_json(path, &query).await {
            Ok(page) => page,
            Err(e) if e.is_not_found() => {
                debug!("{} has nothing at offset {}", path, offset);
                return Ok(items);
            }
            Err(e) => return Err(e),
        };

        let info = page
            .result_info()
            .ok_or_else(|| Error::protocol(format!("Response from {} has no resultInfo", path)))?;
        items.extend(page.into_items());

        debug!(
            "{}: fetched {} at offset {} of {}",
            path, info.returned_count, info.offset, info.total_count
        );

        if info.total_count == 0 || info.offset + info.returned_count >= info.total_count {
            return Ok(items);
        }
        if info.returned_count == 0 {
            return Err(Error::protocol(format!(
                "Pagination of {} stalled at offset {} of {}",
                path, info.offset, info.total_count
            )));
        }

        offset = info.offset + info.returned_count;
    }
}
