//! In-memory document store.
//!
//! Documents are held as JSON values per collection, which keeps filter and
//! sort evaluation uniform across entity types. Used by every test suite;
//! production deployments swap in a server-backed [`DocumentStore`].

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::document::Document;
use crate::error::{StoreError, StoreResult};
use crate::filter::Filter;
use crate::traits::{DocumentStore, FindOptions};

type Collections = HashMap<&'static str, BTreeMap<Uuid, JsonValue>>;

#[derive(Clone, Default)]
pub struct MemoryStore {
    collections: Arc<RwLock<Collections>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    fn read(&self) -> StoreResult<std::sync::RwLockReadGuard<'_, Collections>> {
        self.collections
            .read()
            .map_err(|_| StoreError::Backend("store lock poisoned".to_string()))
    }

    fn write(&self) -> StoreResult<std::sync::RwLockWriteGuard<'_, Collections>> {
        self.collections
            .write()
            .map_err(|_| StoreError::Backend("store lock poisoned".to_string()))
    }
}

/// Total order over JSON field values: nulls first, then bools, numbers,
/// strings (RFC 3339 timestamps order correctly as strings).
fn compare_values(a: &JsonValue, b: &JsonValue) -> Ordering {
    fn rank(v: &JsonValue) -> u8 {
        match v {
            JsonValue::Null => 0,
            JsonValue::Bool(_) => 1,
            JsonValue::Number(_) => 2,
            JsonValue::String(_) => 3,
            JsonValue::Array(_) => 4,
            JsonValue::Object(_) => 5,
        }
    }
    match (a, b) {
        (JsonValue::Bool(x), JsonValue::Bool(y)) => x.cmp(y),
        (JsonValue::Number(x), JsonValue::Number(y)) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (JsonValue::String(x), JsonValue::String(y)) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn insert<D: Document>(&self, doc: &D) -> StoreResult<()> {
        let value = serde_json::to_value(doc)?;
        let mut collections = self.write()?;
        let collection = collections.entry(D::COLLECTION).or_default();
        if collection.contains_key(&doc.id()) {
            return Err(StoreError::Duplicate(doc.id()));
        }
        collection.insert(doc.id(), value);
        Ok(())
    }

    async fn get<D: Document>(&self, id: Uuid) -> StoreResult<Option<D>> {
        let collections = self.read()?;
        match collections.get(D::COLLECTION).and_then(|c| c.get(&id)) {
            Some(value) => Ok(Some(serde_json::from_value(value.clone())?)),
            None => Ok(None),
        }
    }

    async fn replace<D: Document>(&self, doc: &D) -> StoreResult<()> {
        let value = serde_json::to_value(doc)?;
        let mut collections = self.write()?;
        let collection = collections.entry(D::COLLECTION).or_default();
        match collection.get_mut(&doc.id()) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(StoreError::NotFound(doc.id())),
        }
    }

    async fn delete<D: Document>(&self, id: Uuid) -> StoreResult<bool> {
        let mut collections = self.write()?;
        Ok(collections
            .get_mut(D::COLLECTION)
            .and_then(|c| c.remove(&id))
            .is_some())
    }

    async fn find<D: Document>(
        &self,
        filter: &Filter,
        options: &FindOptions,
    ) -> StoreResult<Vec<D>> {
        let compiled = filter.compile()?;
        let mut matching: Vec<JsonValue> = {
            let collections = self.read()?;
            collections
                .get(D::COLLECTION)
                .map(|c| c.values().filter(|v| compiled.matches(v)).cloned().collect())
                .unwrap_or_default()
        };

        if let Some(sort) = &options.sort {
            matching.sort_by(|a, b| {
                let ordering = compare_values(
                    a.get(&sort.field).unwrap_or(&JsonValue::Null),
                    b.get(&sort.field).unwrap_or(&JsonValue::Null),
                );
                if sort.descending {
                    ordering.reverse()
                } else {
                    ordering
                }
            });
        }

        let skip = options.skip.unwrap_or(0) as usize;
        let limit = options.limit.map(|l| l as usize).unwrap_or(usize::MAX);

        matching
            .into_iter()
            .skip(skip)
            .take(limit)
            .map(|v| serde_json::from_value(v).map_err(StoreError::from))
            .collect()
    }

    async fn count<D: Document>(&self, filter: &Filter) -> StoreResult<u64> {
        let compiled = filter.compile()?;
        let collections = self.read()?;
        Ok(collections
            .get(D::COLLECTION)
            .map(|c| c.values().filter(|v| compiled.matches(v)).count() as u64)
            .unwrap_or(0))
    }

    async fn delete_many<D: Document>(&self, filter: &Filter) -> StoreResult<u64> {
        let compiled = filter.compile()?;
        let mut collections = self.write()?;
        let Some(collection) = collections.get_mut(D::COLLECTION) else {
            return Ok(0);
        };
        let before = collection.len();
        collection.retain(|_, v| !compiled.matches(v));
        Ok((before - collection.len()) as u64)
    }

    async fn update_many<D: Document>(
        &self,
        filter: &Filter,
        patch: &JsonValue,
    ) -> StoreResult<u64> {
        let fields = patch
            .as_object()
            .ok_or_else(|| StoreError::InvalidFilter("patch must be an object".to_string()))?;
        let compiled = filter.compile()?;
        let mut collections = self.write()?;
        let Some(collection) = collections.get_mut(D::COLLECTION) else {
            return Ok(0);
        };
        let mut updated = 0;
        for value in collection.values_mut() {
            if !compiled.matches(value) {
                continue;
            }
            if let Some(doc) = value.as_object_mut() {
                for (key, patched) in fields {
                    doc.insert(key.clone(), patched.clone());
                }
                updated += 1;
            }
        }
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use craftlog_core::models::{Project, Report};
    use serde_json::json;

    #[tokio::test]
    async fn test_insert_get_replace_delete() {
        let store = MemoryStore::new();
        let mut project = Project::new(Uuid::new_v4(), "Bench");

        store.insert(&project).await.unwrap();
        assert!(matches!(
            store.insert(&project).await,
            Err(StoreError::Duplicate(_))
        ));

        let loaded: Project = store.get(project.id).await.unwrap().unwrap();
        assert_eq!(loaded.title, "Bench");

        project.title = "Workbench".to_string();
        store.replace(&project).await.unwrap();
        let loaded: Project = store.get::<Project>(project.id).await.unwrap().unwrap();
        assert_eq!(loaded.title, "Workbench");

        assert!(store.delete::<Project>(project.id).await.unwrap());
        assert!(!store.delete::<Project>(project.id).await.unwrap());
        assert!(store.get::<Project>(project.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_replace_missing_is_not_found() {
        let store = MemoryStore::new();
        let project = Project::new(Uuid::new_v4(), "Bench");
        assert!(matches!(
            store.replace(&project).await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_many_scoped_by_filter() {
        let store = MemoryStore::new();
        let reporter = Uuid::new_v4();
        let target = Uuid::new_v4();
        let other = Uuid::new_v4();

        store
            .insert(&Report::new(reporter, target, "spam"))
            .await
            .unwrap();
        store
            .insert(&Report::new(reporter, target, "offensive"))
            .await
            .unwrap();
        store
            .insert(&Report::new(reporter, other, "spam"))
            .await
            .unwrap();

        let removed = store
            .delete_many::<Report>(&Filter::new().eq("project_id", target))
            .await
            .unwrap();
        assert_eq!(removed, 2);

        let remaining = store
            .count::<Report>(&Filter::new())
            .await
            .unwrap();
        assert_eq!(remaining, 1);
    }

    #[tokio::test]
    async fn test_update_many_merges_patch() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let p1 = Project::new(owner, "One");
        let p2 = Project::new(owner, "Two");
        let p3 = Project::new(Uuid::new_v4(), "Other");
        for p in [&p1, &p2, &p3] {
            store.insert(p).await.unwrap();
        }

        let updated = store
            .update_many::<Project>(
                &Filter::new().eq("user_id", owner),
                &json!({ "active": false }),
            )
            .await
            .unwrap();
        assert_eq!(updated, 2);

        let p1 = store.get::<Project>(p1.id).await.unwrap().unwrap();
        let p3 = store.get::<Project>(p3.id).await.unwrap().unwrap();
        assert!(!p1.active);
        assert!(p3.active);
    }

    #[tokio::test]
    async fn test_find_sort_skip_limit() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        for i in 0..5 {
            store
                .insert(&Project::new(owner, format!("project-{:02}", i)))
                .await
                .unwrap();
        }

        let found: Vec<Project> = store
            .find(
                &Filter::new(),
                &FindOptions {
                    limit: Some(2),
                    skip: Some(1),
                    sort: Some(crate::traits::Sort {
                        field: "title".to_string(),
                        descending: false,
                    }),
                },
            )
            .await
            .unwrap();
        let titles: Vec<_> = found.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["project-01", "project-02"]);
    }
}
