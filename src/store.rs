//! Boundary to the order data store.
//!
//! The CRUD service owns the real database; the engine only needs lookups by
//! id, so the store is a trait. `JsonRecordStore` serves an exported snapshot.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use thiserror::Error;
use tracing::warn;

use crate::errors::ExportError;
use crate::model::Record;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn find(&self, id: &str) -> Result<Option<Record>, StoreError>;
}

/// Resolve every requested id, in request order.
///
/// Fails when nothing was requested or when any id is unknown, so the export
/// is rejected before a page exists.
pub async fn resolve_records(
    store: &dyn RecordStore,
    ids: &[String],
) -> Result<Vec<Record>, ExportError> {
    if ids.is_empty() {
        return Err(ExportError::NoRecords);
    }

    let mut records = Vec::with_capacity(ids.len());
    let mut missing = Vec::new();
    for id in ids {
        match store.find(id).await? {
            Some(record) => records.push(record),
            None => missing.push(id.clone()),
        }
    }

    if !missing.is_empty() {
        return Err(ExportError::RecordsNotFound(missing));
    }
    Ok(records)
}

/// In-memory store loaded from a JSON array of records.
#[derive(Debug, Default)]
pub struct JsonRecordStore {
    records: HashMap<String, Record>,
}

impl JsonRecordStore {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read records from {}", path.display()))?;
        let records: Vec<Record> = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse records in {}", path.display()))?;
        Ok(Self::from_records(records))
    }

    pub fn from_records(records: Vec<Record>) -> Self {
        let mut by_id = HashMap::with_capacity(records.len());
        for record in records {
            if let Some(previous) = by_id.insert(record.id.clone(), record) {
                warn!(id = %previous.id, "duplicate record id, keeping the later entry");
            }
        }
        Self { records: by_id }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }
}

#[async_trait]
impl RecordStore for JsonRecordStore {
    async fn find(&self, id: &str) -> Result<Option<Record>, StoreError> {
        Ok(self.records.get(id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str) -> Record {
        Record {
            id: id.to_string(),
            customer_name: "Ada".to_string(),
            note: None,
            items: Vec::new(),
        }
    }

    fn store() -> JsonRecordStore {
        JsonRecordStore::from_records(vec![record("1"), record("2"), record("3")])
    }

    #[tokio::test]
    async fn test_resolves_in_request_order() {
        let ids = vec!["3".to_string(), "1".to_string()];
        let records = resolve_records(&store(), &ids).await.unwrap();
        let got: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(got, vec!["3", "1"]);
    }

    #[tokio::test]
    async fn test_any_missing_id_is_fatal() {
        let ids = vec!["1".to_string(), "404".to_string(), "405".to_string()];
        let err = resolve_records(&store(), &ids).await.unwrap_err();
        match err {
            ExportError::RecordsNotFound(missing) => assert_eq!(missing, vec!["404", "405"]),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_empty_request_is_rejected() {
        let err = resolve_records(&store(), &[]).await.unwrap_err();
        assert!(matches!(err, ExportError::NoRecords));
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!("order-sheets-{}.json", std::process::id()));
        std::fs::write(
            &path,
            r#"[{"id":"A1","customerName":"Grace","items":[{"type":"bowl","description":"Tenmoku","images":[]}]}]"#,
        )
        .unwrap();
        let store = JsonRecordStore::load(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_load_missing_file_has_context() {
        let err = JsonRecordStore::load(Path::new("/nonexistent/records.json")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/records.json"));
    }

    struct OfflineStore;

    #[async_trait]
    impl RecordStore for OfflineStore {
        async fn find(&self, _id: &str) -> Result<Option<Record>, StoreError> {
            Err(StoreError::Unavailable("connection refused".to_string()))
        }
    }

    #[tokio::test]
    async fn test_store_failure_aborts_resolution() {
        let ids = vec!["1".to_string()];
        let err = resolve_records(&OfflineStore, &ids).await.unwrap_err();
        assert!(matches!(err, ExportError::Store(StoreError::Unavailable(_))));
        assert_eq!(err.to_string(), "Record store error: store unavailable: connection refused");
    }
}
