//! Static files for the browser UI.
//!
//! `GET /public/{*path}` serves from `<directory>/public`. `GET /{name}`
//! serves `<directory>/<name>` and falls back to the index page when the
//! file is missing.

use crate::{Gateway, config::AssetsConfig};
use axum::{
    Json,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use engine::Engine;
use serde_json::json;
use std::path::{Component, PathBuf};

/// Directory the static routes read from.
#[derive(Debug, Clone, Default)]
pub struct Assets {
    root: Option<PathBuf>,
    index: String,
}

impl Assets {
    /// Serve files from `root`, with `index` as the fallback page.
    pub fn new(root: impl Into<PathBuf>, index: impl Into<String>) -> Self {
        Self {
            root: Some(root.into()),
            index: index.into(),
        }
    }

    /// No asset directory; every static route answers 404.
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Build from [`AssetsConfig`].
    pub fn from_config(config: &AssetsConfig) -> Self {
        match &config.directory {
            Some(root) => Self::new(root, config.index.clone()),
            None => Self::disabled(),
        }
    }

    /// Resolve a request path below the root.
    ///
    /// Returns `None` when assets are disabled or the path leaves the root.
    pub fn resolve(&self, relative: &str) -> Option<PathBuf> {
        let mut path = self.root.clone()?;
        let mut pushed = false;
        for component in std::path::Path::new(relative).components() {
            match component {
                Component::Normal(part) => {
                    path.push(part);
                    pushed = true;
                }
                Component::CurDir => {}
                _ => return None,
            }
        }
        pushed.then_some(path)
    }

    /// Read and return the file at `relative`.
    ///
    /// With `fallback`, a missing file serves the index page instead.
    pub async fn serve(&self, relative: &str, fallback: bool) -> Response {
        let Some(path) = self.resolve(relative) else {
            return not_found(relative);
        };
        match tokio::fs::read(&path).await {
            Ok(bytes) => file_response(&path, bytes),
            Err(_) if fallback && relative != self.index => {
                let Some(index) = self.resolve(&self.index) else {
                    return not_found(relative);
                };
                match tokio::fs::read(&index).await {
                    Ok(bytes) => file_response(&index, bytes),
                    Err(_) => not_found(relative),
                }
            }
            Err(err) => {
                tracing::debug!(path = %path.display(), "asset not served: {err}");
                not_found(relative)
            }
        }
    }
}

/// `GET /public/{*path}`
pub async fn public_file<E: Engine + 'static>(
    State(gateway): State<Gateway<E>>,
    Path(path): Path<String>,
) -> Response {
    gateway.assets.serve(&format!("public/{path}"), false).await
}

/// `GET /{name}`
pub async fn named_file<E: Engine + 'static>(
    State(gateway): State<Gateway<E>>,
    Path(name): Path<String>,
) -> Response {
    gateway.assets.serve(&name, true).await
}

fn file_response(path: &std::path::Path, bytes: Vec<u8>) -> Response {
    ([(header::CONTENT_TYPE, content_type(path))], bytes).into_response()
}

fn not_found(path: &str) -> Response {
    let body = json!({ "error": format!("no such asset: {path}") });
    (StatusCode::NOT_FOUND, Json(body)).into_response()
}

/// Guess a content type from the file extension.
pub fn content_type(path: &std::path::Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("html" | "htm") => "text/html; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("js") => "text/javascript; charset=utf-8",
        Some("json") => "application/json",
        Some("txt") => "text/plain; charset=utf-8",
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("ico") => "image/x-icon",
        Some("zip") => "application/zip",
        _ => "application/octet-stream",
    }
}
