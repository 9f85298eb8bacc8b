//! Dataset engine contract for the insight gateway.
//!
//! The gateway never touches datasets directly. It talks to an [`Engine`]
//! through three calls (add, remove, query) and turns the returned
//! outcome into an HTTP response. [`MemoryEngine`] is the bundled
//! implementation used for development and tests.
//!
//! # Example
//!
//! ```rust,ignore
//! use insight_engine::{Engine, MemoryEngine, PutOutcome};
//!
//! let engine = MemoryEngine::new();
//! let outcome = engine.add_dataset("rooms", &archive_base64).await?;
//! assert_eq!(outcome, PutOutcome::CreatedNew);
//! ```

pub use {
    error::EngineError,
    memory::MemoryEngine,
    outcome::{DatasetSummary, PutOutcome, QueryOutcome, RemoveOutcome, Row},
};

use serde_json::Value;
use std::future::Future;

mod error;
mod memory;
mod outcome;

/// The call contract the gateway uses to manage and query datasets.
///
/// Every method reports its expected results through an outcome enum.
/// `Err` is reserved for failures the engine could not classify, which
/// the gateway treats as unexpected.
///
/// Uses `&self` throughout: implementations shared between concurrent
/// requests must handle their own synchronization.
pub trait Engine: Send + Sync {
    /// Add the dataset `id`, or replace it if it already exists.
    ///
    /// `content` is the uploaded archive, base64 encoded.
    fn add_dataset(
        &self,
        id: &str,
        content: &str,
    ) -> impl Future<Output = Result<PutOutcome, EngineError>> + Send;

    /// Remove the dataset `id`.
    fn remove_dataset(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<RemoveOutcome, EngineError>> + Send;

    /// Run a query document against the loaded datasets.
    fn perform_query(
        &self,
        query: &Value,
    ) -> impl Future<Output = Result<QueryOutcome, EngineError>> + Send;

    /// List the datasets currently loaded.
    fn list_datasets(&self) -> impl Future<Output = Result<Vec<DatasetSummary>, EngineError>> + Send;
}
