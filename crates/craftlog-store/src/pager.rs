//! Paginated query engine.
//!
//! Builds filtered, sorted, paged reads against any [`DocumentStore`] and
//! returns entries plus page metadata. Reused by every list endpoint.

use serde::Serialize;

use crate::document::Document;
use crate::error::StoreResult;
use crate::filter::Filter;
use crate::traits::{DocumentStore, FindOptions, Sort};

/// Raw pager input as supplied by a list handler.
#[derive(Debug, Clone, Default)]
pub struct PageRequest {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    /// Parallel (field, value) pairs; values are matched as escaped,
    /// case-insensitive substrings.
    pub filter: Vec<(String, String)>,
    pub order_by: Option<String>,
    pub order_desc: bool,
}

/// Page metadata returned alongside the entries.
#[derive(Debug, Clone, Serialize)]
pub struct PageInfo {
    pub count: u64,
    pub pages: Option<u32>,
    pub limit: Option<u32>,
    pub page: Option<u32>,
    pub order_by: String,
    pub order_desc: bool,
}

#[derive(Debug, Clone)]
pub struct Page<D> {
    pub entries: Vec<D>,
    pub pager: PageInfo,
}

/// Execute a paged query: `base` narrows the collection (ownership,
/// visibility), the request adds user filters, ordering and paging.
///
/// Malformed input is corrected locally: zero limit/page are dropped, an
/// unknown `order_by` falls back to `D::DEFAULT_SORT`. The count runs as a
/// separate round trip over the same filter, so under concurrent writes
/// entries and count may disagree; this engine is not snapshot-isolated.
pub async fn fetch_page<D, S>(store: &S, base: Filter, request: &PageRequest) -> StoreResult<Page<D>>
where
    D: Document,
    S: DocumentStore,
{
    let limit = request.limit.filter(|l| *l > 0);
    let page = request.page.filter(|p| *p > 0);
    let skip = match (limit, page) {
        (Some(l), Some(p)) => Some(u64::from(l) * (u64::from(p) - 1)),
        _ => None,
    };

    let order_by = match request.order_by.as_deref() {
        Some(field) if D::FIELDS.contains(&field) => field.to_string(),
        Some(field) => {
            tracing::debug!(
                collection = D::COLLECTION,
                field,
                "unknown order_by field, falling back to default sort"
            );
            D::DEFAULT_SORT.to_string()
        }
        None => D::DEFAULT_SORT.to_string(),
    };

    let mut filter = base;
    for (field, value) in &request.filter {
        filter = filter.matches(field, value);
    }

    let options = FindOptions {
        limit: limit.map(u64::from),
        skip,
        sort: Some(Sort {
            field: order_by.clone(),
            descending: request.order_desc,
        }),
    };

    let entries = store.find::<D>(&filter, &options).await?;
    let count = store.count::<D>(&filter).await?;
    let pages = limit.map(|l| ((count + u64::from(l) - 1) / u64::from(l)) as u32);

    Ok(Page {
        entries,
        pager: PageInfo {
            count,
            pages,
            limit,
            page,
            order_by,
            order_desc: request.order_desc,
        },
    })
}
