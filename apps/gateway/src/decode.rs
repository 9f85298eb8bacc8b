//! Request decoding.
//!
//! Pulls dataset ids, archive payloads and query documents out of raw
//! requests. Nothing here talks to the engine; a [`DecodeError`] means
//! the engine is never called.

use axum::{
    extract::{
        FromRequest, Multipart, Path, Request, path::ErrorKind, rejection::PathRejection,
    },
    http::header,
};
use bytes::Bytes;
use compact_str::CompactString;
use serde_json::Value;
use thiserror::Error;

/// Multipart field carrying the archive.
pub const BODY_FIELD: &str = "body";

/// The request could not be turned into engine input.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The path had no usable dataset id.
    #[error("missing dataset id")]
    MissingId,
    /// The path parameter could not be extracted.
    #[error("invalid dataset path: {0}")]
    Path(String),
    /// The request carried no archive.
    #[error("missing dataset content")]
    MissingContent,
    /// The body could not be read (too large, connection reset, ...).
    #[error("failed to read request body: {0}")]
    Body(String),
    /// A multipart body was malformed.
    #[error("invalid multipart body: {0}")]
    Multipart(String),
    /// The query body is not JSON.
    #[error("query is not valid JSON: {0}")]
    Json(String),
    /// The query body is JSON but not a non-empty object.
    #[error("query must be a non-empty JSON object")]
    EmptyQuery,
}

/// Extract the dataset id from the `{id}` path segment.
///
/// A route without the segment yields [`DecodeError::MissingId`].
pub fn dataset_id(
    path: Result<Path<String>, PathRejection>,
) -> Result<CompactString, DecodeError> {
    let Path(id) = match path {
        Ok(path) => path,
        Err(PathRejection::MissingPathParams(_)) => return Err(DecodeError::MissingId),
        Err(PathRejection::FailedToDeserializePathParams(err))
            if matches!(err.kind(), ErrorKind::WrongNumberOfParameters { .. }) =>
        {
            return Err(DecodeError::MissingId);
        }
        Err(err) => return Err(DecodeError::Path(err.to_string())),
    };
    if id.is_empty() {
        return Err(DecodeError::MissingId);
    }
    Ok(CompactString::from(id))
}

/// Decode `PUT /dataset/{id}` into the id and the raw archive bytes.
///
/// The archive is the `body` field of a multipart form (or its first
/// file field), or the whole request body otherwise.
pub async fn decode_put(
    path: Result<Path<String>, PathRejection>,
    request: Request,
) -> Result<(CompactString, Bytes), DecodeError> {
    let id = dataset_id(path)?;
    let payload = if is_multipart(&request) {
        multipart_payload(request).await?
    } else {
        Bytes::from_request(request, &())
            .await
            .map_err(|e| DecodeError::Body(e.to_string()))?
    };
    if payload.is_empty() {
        return Err(DecodeError::MissingContent);
    }
    Ok((id, payload))
}

/// Decode `DELETE /dataset/{id}`.
pub fn decode_delete(
    path: Result<Path<String>, PathRejection>,
) -> Result<CompactString, DecodeError> {
    dataset_id(path)
}

/// Decode the JSON document of `POST /query`.
pub async fn decode_query(request: Request) -> Result<Value, DecodeError> {
    let body = Bytes::from_request(request, &())
        .await
        .map_err(|e| DecodeError::Body(e.to_string()))?;
    if body.is_empty() {
        return Err(DecodeError::EmptyQuery);
    }
    let document: Value =
        serde_json::from_slice(&body).map_err(|e| DecodeError::Json(e.to_string()))?;
    match &document {
        Value::Object(map) if !map.is_empty() => Ok(document),
        _ => Err(DecodeError::EmptyQuery),
    }
}

fn is_multipart(request: &Request) -> bool {
    request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("multipart/form-data"))
}

async fn multipart_payload(request: Request) -> Result<Bytes, DecodeError> {
    let mut multipart = Multipart::from_request(request, &())
        .await
        .map_err(|e| DecodeError::Multipart(e.to_string()))?;

    let mut first_file = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| DecodeError::Multipart(e.to_string()))?
    {
        let named = field.name() == Some(BODY_FIELD);
        let candidate = first_file.is_none() && field.file_name().is_some();
        if !named && !candidate {
            continue;
        }
        let bytes = field
            .bytes()
            .await
            .map_err(|e| DecodeError::Multipart(e.to_string()))?;
        if named {
            return Ok(bytes);
        }
        first_file = Some(bytes);
    }
    first_file.ok_or(DecodeError::MissingContent)
}
