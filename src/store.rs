use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

/// The backing database caps equality-membership queries at this many ids
/// per call; larger id sets must go through [`fetch_by_ids`].
pub const MAX_IN_BATCH: usize = 10;

pub type Fields = Map<String, Value>;

/// One stored document: its id, the id of the owning parent document when it
/// lives in a sub-collection, and its raw fields.
#[derive(Debug, Clone)]
pub struct Document {
    pub id: String,
    pub parent: Option<String>,
    pub data: Fields,
}

impl Document {
    pub fn str_field(&self, name: &str) -> Option<&str> {
        self.data.get(name).and_then(Value::as_str)
    }
}

/// Keyed document store the backend persists into. Collections are addressed
/// by slash-separated paths (`usuarios`, `usuarios/<uid>/planes`).
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get(&self, path: &str, id: &str) -> anyhow::Result<Option<Document>>;
    async fn set(&self, path: &str, id: &str, data: Fields) -> anyhow::Result<()>;
    /// Insert with a store-generated id; returns the id.
    async fn add(&self, path: &str, data: Fields) -> anyhow::Result<String>;
    /// Merge `patch` into an existing document. Keys may use dotted paths
    /// (`perfil_nutricional.peso`) to update nested fields in place.
    async fn update(&self, path: &str, id: &str, patch: Fields) -> anyhow::Result<()>;
    async fn delete(&self, path: &str, id: &str) -> anyhow::Result<()>;
    async fn list(&self, path: &str) -> anyhow::Result<Vec<Document>>;
    async fn query_eq(&self, path: &str, field: &str, value: &Value)
        -> anyhow::Result<Vec<Document>>;
    /// Membership query by document id. Fails for batches larger than
    /// [`MAX_IN_BATCH`]; callers with bigger sets use [`fetch_by_ids`].
    async fn query_ids(&self, path: &str, ids: &[String]) -> anyhow::Result<Vec<Document>>;
    /// Scan every sub-collection named `collection`, tagging each document
    /// with its owning parent id.
    async fn query_group(&self, collection: &str) -> anyhow::Result<Vec<Document>>;
}

/// Partitions `ids` into batches the store accepts and merges the results.
/// Ids missing from the store are silently absent from the output.
pub async fn fetch_by_ids(
    store: &dyn DocumentStore,
    path: &str,
    ids: &[String],
) -> anyhow::Result<Vec<Document>> {
    let mut docs = Vec::with_capacity(ids.len());
    for chunk in ids.chunks(MAX_IN_BATCH) {
        docs.extend(store.query_ids(path, chunk).await?);
    }
    Ok(docs)
}

/// Timestamps come back from the store either as a raw epoch-millisecond
/// number or as a temporal handle with second/nanosecond parts, depending on
/// how the document was written. Both normalize to epoch milliseconds.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(untagged)]
pub enum StoredTimestamp {
    Millis(i64),
    Temporal { seconds: i64, nanos: u32 },
}

impl StoredTimestamp {
    pub fn to_millis(self) -> i64 {
        match self {
            StoredTimestamp::Millis(ms) => ms,
            StoredTimestamp::Temporal { seconds, nanos } => {
                seconds * 1000 + i64::from(nanos / 1_000_000)
            }
        }
    }
}

/// Normalizes an optional raw timestamp field; absent or unrecognized values
/// fall back to the current time, matching what clients expect to render.
pub fn timestamp_millis(value: Option<&Value>) -> i64 {
    value
        .and_then(|v| serde_json::from_value::<StoredTimestamp>(v.clone()).ok())
        .map(StoredTimestamp::to_millis)
        .unwrap_or_else(now_millis)
}

pub fn now_millis() -> i64 {
    (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}

/// In-memory [`DocumentStore`] used by tests and local development.
#[derive(Clone, Default)]
pub struct MemoryStore {
    collections: Arc<RwLock<HashMap<String, BTreeMap<String, Fields>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn parent_of(path: &str) -> Option<String> {
        let segments: Vec<&str> = path.split('/').collect();
        if segments.len() >= 3 {
            Some(segments[segments.len() - 2].to_string())
        } else {
            None
        }
    }
}

fn apply_patch(data: &mut Fields, patch: Fields) {
    for (key, value) in patch {
        match key.split_once('.') {
            Some((head, rest)) => {
                let nested = data
                    .entry(head.to_string())
                    .or_insert_with(|| Value::Object(Map::new()));
                if !nested.is_object() {
                    *nested = Value::Object(Map::new());
                }
                let mut inner = Map::new();
                inner.insert(rest.to_string(), value);
                if let Value::Object(map) = nested {
                    apply_patch(map, inner);
                }
            }
            None => {
                data.insert(key, value);
            }
        }
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, path: &str, id: &str) -> anyhow::Result<Option<Document>> {
        let collections = self.collections.read().await;
        Ok(collections.get(path).and_then(|c| c.get(id)).map(|data| Document {
            id: id.to_string(),
            parent: Self::parent_of(path),
            data: data.clone(),
        }))
    }

    async fn set(&self, path: &str, id: &str, data: Fields) -> anyhow::Result<()> {
        let mut collections = self.collections.write().await;
        collections
            .entry(path.to_string())
            .or_default()
            .insert(id.to_string(), data);
        Ok(())
    }

    async fn add(&self, path: &str, data: Fields) -> anyhow::Result<String> {
        let id = Uuid::new_v4().simple().to_string();
        self.set(path, &id, data).await?;
        Ok(id)
    }

    async fn update(&self, path: &str, id: &str, patch: Fields) -> anyhow::Result<()> {
        let mut collections = self.collections.write().await;
        let doc = collections
            .get_mut(path)
            .and_then(|c| c.get_mut(id))
            .ok_or_else(|| anyhow::anyhow!("document {path}/{id} not found"))?;
        apply_patch(doc, patch);
        Ok(())
    }

    async fn delete(&self, path: &str, id: &str) -> anyhow::Result<()> {
        let mut collections = self.collections.write().await;
        if let Some(collection) = collections.get_mut(path) {
            collection.remove(id);
        }
        Ok(())
    }

    async fn list(&self, path: &str) -> anyhow::Result<Vec<Document>> {
        let collections = self.collections.read().await;
        let parent = Self::parent_of(path);
        Ok(collections
            .get(path)
            .map(|c| {
                c.iter()
                    .map(|(id, data)| Document {
                        id: id.clone(),
                        parent: parent.clone(),
                        data: data.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn query_eq(
        &self,
        path: &str,
        field: &str,
        value: &Value,
    ) -> anyhow::Result<Vec<Document>> {
        let docs = self.list(path).await?;
        Ok(docs
            .into_iter()
            .filter(|d| d.data.get(field) == Some(value))
            .collect())
    }

    async fn query_ids(&self, path: &str, ids: &[String]) -> anyhow::Result<Vec<Document>> {
        if ids.len() > MAX_IN_BATCH {
            anyhow::bail!(
                "membership query limited to {MAX_IN_BATCH} ids, got {}",
                ids.len()
            );
        }
        let collections = self.collections.read().await;
        let parent = Self::parent_of(path);
        let Some(collection) = collections.get(path) else {
            return Ok(Vec::new());
        };
        Ok(ids
            .iter()
            .filter_map(|id| {
                collection.get(id).map(|data| Document {
                    id: id.clone(),
                    parent: parent.clone(),
                    data: data.clone(),
                })
            })
            .collect())
    }

    async fn query_group(&self, collection: &str) -> anyhow::Result<Vec<Document>> {
        let collections = self.collections.read().await;
        let suffix = format!("/{collection}");
        let mut docs = Vec::new();
        for (path, entries) in collections.iter() {
            if !path.ends_with(&suffix) {
                continue;
            }
            let parent = Self::parent_of(path);
            for (id, data) in entries {
                docs.push(Document {
                    id: id.clone(),
                    parent: parent.clone(),
                    data: data.clone(),
                });
            }
        }
        Ok(docs)
    }
}
