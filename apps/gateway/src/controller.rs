//! Request handlers: decode, call the engine, reply.
//!
//! Each handler runs its work inside [`boundary`], so a panic while
//! decoding or inside the engine still ends in exactly one response.
//! The boundary opens a `request` span; handlers record the dataset id
//! on it once decoded.

use crate::{
    Gateway, decode,
    status::{Operation, Reply},
};
use axum::{
    extract::{Path, Request, State, rejection::PathRejection},
    http::StatusCode,
};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use engine::Engine;
use futures_util::FutureExt;
use std::{any::Any, future::Future, panic::AssertUnwindSafe};
use tracing::{Instrument, Span, field};

/// `GET /`: placeholder for the query UI.
pub async fn index() -> StatusCode {
    StatusCode::OK
}

/// `PUT /dataset/{id}`: add or replace a dataset.
pub async fn put_dataset<E: Engine + 'static>(
    State(gateway): State<Gateway<E>>,
    path: Result<Path<String>, PathRejection>,
    request: Request,
) -> Reply {
    boundary(Operation::Put, async {
        let (id, payload) = match decode::decode_put(path, request).await {
            Ok(decoded) => decoded,
            Err(err) => return Reply::Undecodable(Operation::Put, err),
        };
        Span::current().record("id", id.as_str());
        tracing::debug!(bytes = payload.len(), "adding dataset");

        let content = STANDARD.encode(&payload);
        match gateway.engine.add_dataset(&id, &content).await {
            Ok(outcome) => Reply::Put(outcome),
            Err(err) => Reply::Failed(Operation::Put, err.to_string()),
        }
    })
    .await
}

/// `DELETE /dataset/{id}`: remove a dataset.
pub async fn delete_dataset<E: Engine + 'static>(
    State(gateway): State<Gateway<E>>,
    path: Result<Path<String>, PathRejection>,
) -> Reply {
    boundary(Operation::Delete, async {
        let id = match decode::decode_delete(path) {
            Ok(id) => id,
            Err(err) => return Reply::Undecodable(Operation::Delete, err),
        };
        Span::current().record("id", id.as_str());
        tracing::debug!("removing dataset");

        match gateway.engine.remove_dataset(&id).await {
            Ok(outcome) => Reply::Delete(outcome),
            Err(err) => Reply::Failed(Operation::Delete, err.to_string()),
        }
    })
    .await
}

/// `POST /query`: run a query document.
pub async fn run_query<E: Engine + 'static>(
    State(gateway): State<Gateway<E>>,
    request: Request,
) -> Reply {
    boundary(Operation::Query, async {
        let document = match decode::decode_query(request).await {
            Ok(document) => document,
            Err(err) => return Reply::Undecodable(Operation::Query, err),
        };

        match gateway.engine.perform_query(&document).await {
            Ok(outcome) => Reply::Query(outcome),
            Err(err) => Reply::Failed(Operation::Query, err.to_string()),
        }
    })
    .await
}

/// `GET /datasets`: list loaded datasets.
pub async fn list_datasets<E: Engine + 'static>(State(gateway): State<Gateway<E>>) -> Reply {
    boundary(Operation::List, async {
        match gateway.engine.list_datasets().await {
            Ok(datasets) => Reply::List(datasets),
            Err(err) => Reply::Failed(Operation::List, err.to_string()),
        }
    })
    .await
}

/// Run `work`, turning a panic into [`Reply::Failed`], and log the result.
async fn boundary(operation: Operation, work: impl Future<Output = Reply>) -> Reply {
    let span = tracing::info_span!("request", ?operation, id = field::Empty);
    let outcome = AssertUnwindSafe(work.instrument(span.clone()))
        .catch_unwind()
        .await;

    span.in_scope(|| {
        let reply = match outcome {
            Ok(reply) => reply,
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                tracing::error!("handler panicked: {message}");
                Reply::Failed(operation, message)
            }
        };

        let status = reply.status().as_u16();
        match &reply {
            Reply::Failed(_, message) => tracing::error!(status, "{message}"),
            Reply::Undecodable(_, err) => tracing::warn!(status, "{err}"),
            _ if status >= 400 => tracing::warn!(status, "request refused"),
            _ => tracing::debug!(status, "request handled"),
        }
        reply
    })
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "internal error".to_owned()
    }
}
