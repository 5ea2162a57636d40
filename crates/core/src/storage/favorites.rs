//! # Favorites Persistence
//!
//! Reads and writes the favorites slot. Two on-disk shapes exist:
//!
//! ```text
//! legacy:   [1, 4, 7]                        (ids only)
//! current:  [{"id": 1, "name": ...}, ...]    (full records)
//! ```
//!
//! The legacy shape is hydrated through the catalog client and rewritten in
//! the current shape the first time it is read. Corrupted slots are reset to
//! `[]`. Loading and saving never fail; problems are logged.

use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;

use super::kv::KeyValueStore;
use crate::api::{CatalogClient, CatalogEntry};
use crate::error::{CatalogError, Result};

/// The favorites slot, classified by shape
#[derive(Debug, Clone, PartialEq)]
pub enum StoredFavorites {
    /// Missing slot or an empty list
    Empty,
    /// Identifier-only list written by older clients
    LegacyIdList(Vec<Value>),
    /// Full records
    RecordList(Vec<Value>),
    /// Unparseable or unrecognized content
    Invalid(String),
}

impl StoredFavorites {
    /// Classify raw slot content. The first element decides the shape.
    pub fn decode(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return Self::Empty;
        };

        let items = match serde_json::from_str::<Value>(raw) {
            Ok(Value::Array(items)) => items,
            Ok(other) => return Self::Invalid(format!("expected a list, found {}", kind(&other))),
            Err(e) => return Self::Invalid(e.to_string()),
        };

        match items.first() {
            None => Self::Empty,
            Some(Value::Number(n)) if n.is_u64() || n.is_i64() => Self::LegacyIdList(items),
            Some(Value::Object(first)) if first.contains_key("id") => Self::RecordList(items),
            Some(other) => Self::Invalid(format!("unexpected first element: {}", kind(other))),
        }
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
}

fn positive_id(value: &Value) -> Option<u32> {
    value
        .as_u64()
        .and_then(|id| u32::try_from(id).ok())
        .filter(|id| *id > 0)
}

/// Valid, de-duplicated identifiers from a legacy list, in order
pub fn legacy_ids(items: &[Value]) -> Vec<u32> {
    let mut seen = HashSet::new();
    items
        .iter()
        .filter_map(positive_id)
        .filter(|id| seen.insert(*id))
        .collect()
}

/// Records with a usable identifier, first occurrence of each id kept.
///
/// Accepts both the stored `CatalogEntry` shape and raw API bodies.
pub fn normalize_records(items: Vec<Value>) -> Vec<CatalogEntry> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| item.get("id").and_then(positive_id).is_some())
        .filter_map(|item| {
            serde_json::from_value::<CatalogEntry>(item.clone())
                .ok()
                .or_else(|| CatalogEntry::from_api(item).ok())
        })
        .filter(|entry| seen.insert(entry.id))
        .collect()
}

/// Load/save access to the favorites slot
#[derive(Clone)]
pub struct FavoritesAdapter {
    store: Arc<dyn KeyValueStore>,
    key: String,
}

impl FavoritesAdapter {
    pub fn new(store: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Raw slot content
    pub fn read_raw(&self) -> Result<Option<String>> {
        self.store.get(&self.key)
    }

    /// Load the collection, migrating or healing the slot as needed
    pub async fn load(&self, client: &CatalogClient) -> Vec<CatalogEntry> {
        let raw = match self.read_raw() {
            Ok(raw) => raw,
            Err(e) => {
                tracing::error!(
                    key = %self.key,
                    error = %e,
                    "Error loading favorites from storage"
                );
                return Vec::new();
            }
        };

        match StoredFavorites::decode(raw.as_deref()) {
            StoredFavorites::Empty => Vec::new(),
            StoredFavorites::Invalid(reason) => {
                let err = CatalogError::StorageCorruption(reason);
                tracing::warn!(key = %self.key, error = %err, "Resetting favorites");
                self.save(&[]);
                Vec::new()
            }
            StoredFavorites::LegacyIdList(items) => {
                let ids = legacy_ids(&items);
                let favorites = client.get_many_entries(&ids).await;
                tracing::info!(
                    key = %self.key,
                    requested = ids.len(),
                    migrated = favorites.len(),
                    "Migrated legacy favorites to full records"
                );
                self.save(&favorites);
                favorites
            }
            StoredFavorites::RecordList(items) => {
                let stored = items.len();
                let favorites = normalize_records(items);
                if favorites.len() != stored {
                    tracing::warn!(
                        key = %self.key,
                        dropped = stored - favorites.len(),
                        "Dropped malformed favorite records"
                    );
                    self.save(&favorites);
                }
                favorites
            }
        }
    }

    /// Persist the collection; failures are logged, not returned
    pub fn save(&self, favorites: &[CatalogEntry]) {
        if let Err(e) = self.try_save(favorites) {
            tracing::error!(key = %self.key, error = %e, "Error saving favorites to storage");
        }
    }

    pub fn try_save(&self, favorites: &[CatalogEntry]) -> Result<()> {
        let serialized = serde_json::to_string(favorites)
            .map_err(|e| CatalogError::Storage(format!("Failed to serialize favorites: {}", e)))?;
        self.store.set(&self.key, &serialized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::kv::MemoryKvStore;
    use crate::testing::*;
    use serde_json::json;

    const KEY: &str = "pokemonFavorites";

    fn adapter_with(raw: Option<&str>) -> (FavoritesAdapter, Arc<MemoryKvStore>) {
        let store = match raw {
            Some(raw) => MemoryKvStore::new().with_slot(KEY, raw),
            None => MemoryKvStore::new(),
        };
        let store = Arc::new(store);
        (FavoritesAdapter::new(store.clone(), KEY), store)
    }

    fn stored(store: &MemoryKvStore) -> Value {
        serde_json::from_str(&store.get(KEY).unwrap().unwrap()).unwrap()
    }

    #[test]
    fn test_decode_shapes() {
        assert_eq!(StoredFavorites::decode(None), StoredFavorites::Empty);
        assert_eq!(StoredFavorites::decode(Some("[]")), StoredFavorites::Empty);
        assert!(matches!(
            StoredFavorites::decode(Some("[1, 2, 3]")),
            StoredFavorites::LegacyIdList(items) if items.len() == 3
        ));
        assert!(matches!(
            StoredFavorites::decode(Some(r#"[{"id": 1}]"#)),
            StoredFavorites::RecordList(_)
        ));
        assert!(matches!(
            StoredFavorites::decode(Some("{not json")),
            StoredFavorites::Invalid(_)
        ));
        assert!(matches!(
            StoredFavorites::decode(Some(r#"{"id": 1}"#)),
            StoredFavorites::Invalid(_)
        ));
        assert!(matches!(
            StoredFavorites::decode(Some(r#"["pikachu"]"#)),
            StoredFavorites::Invalid(_)
        ));
        assert!(matches!(
            StoredFavorites::decode(Some(r#"[{"name": "pikachu"}]"#)),
            StoredFavorites::Invalid(_)
        ));
    }

    #[test]
    fn test_legacy_ids_filters_invalid() {
        let items = vec![json!(4), json!(-1), json!(0), json!("7"), json!(4), json!(1.5), json!(9)];
        assert_eq!(legacy_ids(&items), vec![4, 9]);
    }

    #[test]
    fn test_normalize_records_drops_malformed_and_duplicates() {
        let records = normalize_records(vec![
            json!({"id": 1, "name": "bulbasaur", "types": ["grass"]}),
            json!({"id": "2", "name": "ivysaur"}),
            json!({"name": "venusaur"}),
            json!({"id": 1, "name": "duplicate"}),
            pokemon_json(25, "pikachu", &["electric"]),
        ]);

        let ids: Vec<u32> = records.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 25]);
        assert_eq!(records[0].name, "bulbasaur");
        assert_eq!(records[1].types, vec!["electric"]);
    }

    #[tokio::test]
    async fn test_legacy_payload_is_migrated() {
        let stub = StubTransport::new();
        stub.add_pokemon(1, "bulbasaur", &["grass"]);
        stub.add_pokemon(3, "venusaur", &["grass"]);
        stub.go_offline(format!("{}/pokemon/2", BASE));
        let client = client_with(&stub);
        let (adapter, store) = adapter_with(Some("[1, 2, 3]"));

        let favorites = adapter.load(&client).await;

        let ids: Vec<u32> = favorites.iter().map(|f| f.id).collect();
        assert_eq!(ids, vec![1, 3]);

        let persisted = stored(&store);
        let persisted = persisted.as_array().unwrap();
        assert_eq!(persisted.len(), 2);
        assert_eq!(persisted[0]["id"], 1);
        assert_eq!(persisted[0]["name"], "bulbasaur");
        assert_eq!(persisted[1]["id"], 3);

        // Second load reads the new shape without touching the network
        let calls = stub.total_calls();
        client.clear_cache();
        let again = adapter.load(&client).await;
        assert_eq!(again, favorites);
        assert_eq!(stub.total_calls(), calls);
    }

    #[tokio::test]
    async fn test_corrupted_payload_is_reset() {
        let stub = StubTransport::new();
        let client = client_with(&stub);

        for raw in ["{oops", r#"{"id": 1}"#] {
            let (adapter, store) = adapter_with(Some(raw));
            assert!(adapter.load(&client).await.is_empty());
            assert_eq!(store.get(KEY).unwrap().as_deref(), Some("[]"));
        }
        assert_eq!(stub.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_missing_slot_is_left_untouched() {
        let stub = StubTransport::new();
        let client = client_with(&stub);
        let (adapter, store) = adapter_with(None);

        assert!(adapter.load(&client).await.is_empty());
        assert_eq!(store.get(KEY).unwrap(), None);
    }

    #[tokio::test]
    async fn test_malformed_records_are_rewritten() {
        let stub = StubTransport::new();
        let client = client_with(&stub);
        let (adapter, store) =
            adapter_with(Some(r#"[{"id": 4, "name": "charmander"}, {"id": null}]"#));

        let favorites = adapter.load(&client).await;
        assert_eq!(favorites.len(), 1);
        assert_eq!(stored(&store).as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unreadable_slot_loads_empty_without_rewriting() {
        let stub = StubTransport::new();
        let client = client_with(&stub);
        let adapter = FavoritesAdapter::new(Arc::new(FailingKvStore), KEY);

        assert!(adapter.load(&client).await.is_empty());
        assert_eq!(stub.total_calls(), 0);
    }

    #[test]
    fn test_failed_write_is_logged_not_raised() {
        let adapter = FavoritesAdapter::new(Arc::new(FailingKvStore), KEY);
        let charmander = normalize_records(vec![json!({"id": 4, "name": "charmander"})]);

        adapter.save(&charmander);
        assert!(matches!(
            adapter.try_save(&charmander),
            Err(CatalogError::Storage(_))
        ));
    }
}
