//! Insight gateway: HTTP front end for a dataset engine.
//!
//! Translates `PUT /dataset/{id}`, `DELETE /dataset/{id}` and
//! `POST /query` into [`Engine`](engine::Engine) calls and maps each
//! outcome to a status code and JSON body.

pub mod assets;
pub mod config;
pub mod controller;
pub mod decode;
pub mod router;
pub mod serve;
pub mod state;
pub mod status;
pub mod utils;

pub use assets::Assets;
pub use config::GatewayConfig;
pub use decode::DecodeError;
pub use router::router;
pub use serve::{ServeHandle, serve, serve_with_config};
pub use state::Gateway;
pub use status::{Operation, Reply};
