use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

/// A top-level document stored in its own collection.
///
/// `FIELDS` lists the serialized field names; the pager validates `order_by`
/// against it and falls back to `DEFAULT_SORT` for anything unknown.
pub trait Document: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    const COLLECTION: &'static str;
    const DEFAULT_SORT: &'static str;
    const FIELDS: &'static [&'static str];

    fn id(&self) -> Uuid;
}
