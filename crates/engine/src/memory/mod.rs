//! In-memory implementation of the [`Engine`] trait.

use crate::{DatasetSummary, Engine, EngineError, PutOutcome, QueryOutcome, RemoveOutcome};
use archive::Dataset;
use compact_str::CompactString;
use parking_lot::RwLock;
use serde_json::Value;
use std::{collections::BTreeMap, future::Future};

mod archive;
mod query;

/// Engine keeping every dataset in process memory.
///
/// Nothing is persisted; datasets live as long as the engine.
#[derive(Default, Debug)]
pub struct MemoryEngine {
    datasets: RwLock<BTreeMap<CompactString, Dataset>>,
}

impl MemoryEngine {
    /// Create an engine with no datasets.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a dataset with this id is loaded.
    pub fn contains(&self, id: &str) -> bool {
        self.datasets.read().contains_key(id)
    }

    /// Number of loaded datasets.
    pub fn len(&self) -> usize {
        self.datasets.read().len()
    }

    /// Whether no dataset is loaded.
    pub fn is_empty(&self) -> bool {
        self.datasets.read().is_empty()
    }

    fn add(&self, id: &str, content: &str) -> PutOutcome {
        if id.trim().is_empty() || id.contains('_') {
            return PutOutcome::Rejected(format!("invalid dataset id `{id}`"));
        }
        let dataset = match archive::decode(content) {
            Ok(dataset) => dataset,
            Err(reason) => {
                tracing::debug!(id, "rejected archive: {reason}");
                return PutOutcome::Rejected(reason);
            }
        };

        let records = dataset.records.len();
        let previous = self.datasets.write().insert(CompactString::new(id), dataset);
        tracing::debug!(id, records, replaced = previous.is_some(), "stored dataset");
        match previous {
            Some(_) => PutOutcome::Replaced,
            None => PutOutcome::CreatedNew,
        }
    }

    fn remove(&self, id: &str) -> RemoveOutcome {
        match self.datasets.write().remove(id) {
            Some(_) => {
                tracing::debug!(id, "removed dataset");
                RemoveOutcome::Removed
            }
            None => RemoveOutcome::NotFound(format!("dataset `{id}` is not loaded")),
        }
    }

    fn query(&self, document: &Value) -> QueryOutcome {
        query::run(document, &self.datasets.read())
    }

    fn summaries(&self) -> Vec<DatasetSummary> {
        self.datasets
            .read()
            .iter()
            .map(|(id, dataset)| DatasetSummary {
                id: id.clone(),
                records: dataset.records.len(),
            })
            .collect()
    }
}

impl Engine for MemoryEngine {
    fn add_dataset(
        &self,
        id: &str,
        content: &str,
    ) -> impl Future<Output = Result<PutOutcome, EngineError>> + Send {
        std::future::ready(Ok(self.add(id, content)))
    }

    fn remove_dataset(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<RemoveOutcome, EngineError>> + Send {
        std::future::ready(Ok(self.remove(id)))
    }

    fn perform_query(
        &self,
        query: &Value,
    ) -> impl Future<Output = Result<QueryOutcome, EngineError>> + Send {
        std::future::ready(Ok(self.query(query)))
    }

    fn list_datasets(
        &self,
    ) -> impl Future<Output = Result<Vec<DatasetSummary>, EngineError>> + Send {
        std::future::ready(Ok(self.summaries()))
    }
}
