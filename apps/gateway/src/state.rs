//! Shared state for the gateway's request handlers.

use crate::Assets;
use engine::Engine;
use std::sync::Arc;

/// State available to all request handlers.
///
/// The engine is built once at start-up and shared by every request.
pub struct Gateway<E: Engine> {
    /// The dataset engine.
    pub engine: Arc<E>,
    /// Static asset directory.
    pub assets: Arc<Assets>,
}

impl<E: Engine> Gateway<E> {
    /// Wrap an engine and asset directory.
    pub fn new(engine: E, assets: Assets) -> Self {
        Self {
            engine: Arc::new(engine),
            assets: Arc::new(assets),
        }
    }
}

impl<E: Engine> Clone for Gateway<E> {
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
            assets: Arc::clone(&self.assets),
        }
    }
}
