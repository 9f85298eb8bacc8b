//! Mapping from operation outcomes to HTTP responses.
//!
//! | Operation | Outcome                                    | Status |
//! |-----------|--------------------------------------------|--------|
//! | put       | created new                                | 204    |
//! | put       | replaced                                   | 201    |
//! | put       | rejected, undecodable, failed              | 400    |
//! | delete    | removed                                    | 204    |
//! | delete    | not found, undecodable                     | 404    |
//! | delete    | failed                                     | 400    |
//! | query     | success                                    | 200    |
//! | query     | malformed, undecodable, failed             | 400    |
//! | query     | unresolved dependency                      | 424    |
//! | list      | success                                    | 200    |
//! | list      | failed                                     | 400    |
//!
//! Success bodies are `{"result": ...}` or empty, failures are
//! `{"error": message}`.

use crate::DecodeError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use engine::{DatasetSummary, PutOutcome, QueryOutcome, RemoveOutcome};
use serde_json::{Value, json};

/// A gateway operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// `PUT /dataset/{id}`
    Put,
    /// `DELETE /dataset/{id}`
    Delete,
    /// `POST /query`
    Query,
    /// `GET /datasets`
    List,
}

/// How a single request ended.
#[derive(Debug)]
pub enum Reply {
    /// The engine answered a put.
    Put(PutOutcome),
    /// The engine answered a delete.
    Delete(RemoveOutcome),
    /// The engine answered a query.
    Query(QueryOutcome),
    /// The engine listed its datasets.
    List(Vec<DatasetSummary>),
    /// The request could not be decoded; the engine was not called.
    Undecodable(Operation, DecodeError),
    /// The engine returned an error, or handling panicked.
    Failed(Operation, String),
}

impl Reply {
    /// Status code and optional JSON body for this reply.
    ///
    /// The status comes from [`Reply::status`]; this only shapes the body.
    pub fn into_parts(self) -> (StatusCode, Option<Value>) {
        let status = self.status();
        let body = match self {
            Self::Put(PutOutcome::CreatedNew | PutOutcome::Replaced)
            | Self::Delete(RemoveOutcome::Removed) => None,
            Self::Query(QueryOutcome::Success(rows)) => Some(json!({ "result": rows })),
            Self::List(datasets) => Some(json!({ "result": datasets })),
            Self::Put(PutOutcome::Rejected(message))
            | Self::Delete(RemoveOutcome::NotFound(message))
            | Self::Query(
                QueryOutcome::MalformedQuery(message) | QueryOutcome::UnresolvedDependency(message),
            )
            | Self::Failed(_, message) => Some(json!({ "error": message })),
            Self::Undecodable(_, err) => Some(json!({ "error": err.to_string() })),
        };
        (status, body)
    }

    /// Status code this reply maps to.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Put(PutOutcome::CreatedNew) | Self::Delete(RemoveOutcome::Removed) => {
                StatusCode::NO_CONTENT
            }
            Self::Put(PutOutcome::Replaced) => StatusCode::CREATED,
            Self::Query(QueryOutcome::Success(_)) | Self::List(_) => StatusCode::OK,
            Self::Query(QueryOutcome::UnresolvedDependency(_)) => StatusCode::FAILED_DEPENDENCY,
            Self::Delete(RemoveOutcome::NotFound(_)) | Self::Undecodable(Operation::Delete, _) => {
                StatusCode::NOT_FOUND
            }
            Self::Put(PutOutcome::Rejected(_))
            | Self::Query(QueryOutcome::MalformedQuery(_))
            | Self::Undecodable(_, _)
            | Self::Failed(_, _) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        match self.into_parts() {
            (status, Some(body)) => (status, Json(body)).into_response(),
            (status, None) => status.into_response(),
        }
    }
}
