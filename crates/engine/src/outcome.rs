//! Outcome types reported by an [`Engine`](crate::Engine).

use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single query result row, keyed by column name.
pub type Row = Map<String, Value>;

/// Result of adding a dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PutOutcome {
    /// The id was not present before and the dataset was stored.
    CreatedNew,
    /// The id was present and its content was replaced.
    Replaced,
    /// The archive or id was refused. Prior state is unchanged.
    Rejected(String),
}

/// Result of removing a dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoveOutcome {
    /// The dataset existed and is gone now.
    Removed,
    /// No dataset with that id is loaded.
    NotFound(String),
}

/// Result of running a query.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    /// Rows matched by the query, in result order.
    Success(Vec<Row>),
    /// The document is JSON but not a valid query.
    MalformedQuery(String),
    /// The query names datasets that are not loaded.
    UnresolvedDependency(String),
}

/// Short description of a loaded dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetSummary {
    /// Dataset id.
    pub id: CompactString,
    /// Number of records stored.
    pub records: usize,
}
