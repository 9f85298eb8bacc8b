//! Shared serve entrypoint used by the binary and the tests.

use crate::{Assets, Gateway, GatewayConfig, config::EngineKind};
use anyhow::{Context, Result};
use engine::{Engine, MemoryEngine};
use std::{net::SocketAddr, path::Path};
use tokio::{sync::oneshot, task::JoinHandle};

/// Handle returned by [`serve`]: holds the bound address and shutdown trigger.
pub struct ServeHandle {
    /// The address the gateway is listening on.
    pub addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
    join: Option<JoinHandle<std::io::Result<()>>>,
}

impl ServeHandle {
    /// The bound port.
    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    /// Stop accepting, drain open connections, and wait for the server task.
    pub async fn shutdown(mut self) -> Result<()> {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(join) = self.join.take() {
            join.await.context("server task failed")??;
        }
        tracing::info!("gateway on {} stopped", self.addr);
        Ok(())
    }
}

/// Load config from `config_path`, build the configured engine, and serve.
///
/// A missing config file means defaults. `bind` overrides the configured
/// address when given.
pub async fn serve(config_path: &Path, bind: Option<&str>) -> Result<ServeHandle> {
    let config = GatewayConfig::load_or_default(config_path)?;
    let bind = bind.map_or_else(|| config.bind_address(), str::to_owned);
    let engine = match config.engine.kind {
        EngineKind::Memory => {
            tracing::info!("using in-memory engine");
            MemoryEngine::new()
        }
    };
    serve_with_config(&config, engine, &bind).await
}

/// Serve an already-built engine with an already-loaded config.
///
/// The server runs in a spawned task; call [`ServeHandle::shutdown`] to
/// stop it.
pub async fn serve_with_config<E: Engine + 'static>(
    config: &GatewayConfig,
    engine: E,
    bind: &str,
) -> Result<ServeHandle> {
    let assets = Assets::from_config(&config.assets);
    let state = Gateway::new(engine, assets);
    let app = crate::router(state, config.server.max_body_bytes);

    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("failed to bind {bind}"))?;
    let addr = listener.local_addr()?;
    tracing::info!("gateway listening on {addr}");

    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let join = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
                tracing::info!("received shutdown signal");
            })
            .await
    });

    Ok(ServeHandle {
        addr,
        shutdown_tx: Some(shutdown_tx),
        join: Some(join),
    })
}
