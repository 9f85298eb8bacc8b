//! Gateway configuration loaded from TOML.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config directory name under the platform config dir.
pub const CONFIG_DIR: &str = "insight";
/// Config file name inside the config directory.
pub const CONFIG_FILE: &str = "gateway.toml";
/// Default asset subdirectory created by [`scaffold_config_dir`].
pub const ASSETS_DIR: &str = "view";

/// Resolve the global configuration directory (`~/.config/insight/` on unix).
pub fn global_config_dir() -> Result<PathBuf> {
    let base = dirs::config_dir().context("no platform config directory")?;
    Ok(base.join(CONFIG_DIR))
}

/// Top-level gateway configuration.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Listener configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Static asset configuration.
    #[serde(default)]
    pub assets: AssetsConfig,
    /// Engine selection.
    #[serde(default)]
    pub engine: EngineConfig,
}

/// Listener configuration.
#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
    /// Largest accepted request body in bytes.
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 4321,
            max_body_bytes: 64 * 1024 * 1024,
        }
    }
}

/// Static asset configuration.
#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetsConfig {
    /// Directory served by the static routes. Disabled when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,
    /// Page served when `GET /{name}` finds no file.
    pub index: String,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            directory: None,
            index: "index.html".to_owned(),
        }
    }
}

/// Engine selection.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Which engine backs the gateway.
    pub kind: EngineKind,
}

/// Supported engine kinds.
#[derive(Debug, Default, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EngineKind {
    /// Datasets kept in process memory.
    #[default]
    Memory,
}

impl GatewayConfig {
    /// Parse a TOML string, expanding `${VAR}` references first.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let expanded = crate::utils::expand_env_vars(toml_str);
        let config: Self = toml::from_str(&expanded).context("invalid gateway config")?;
        Ok(config)
    }

    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_toml(&content)
    }

    /// Load from `path`, or use defaults when the file does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::info!("no config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// `host:port` to bind.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

/// Create `config_dir` with a default `gateway.toml` and asset directory.
///
/// Returns the path of the written config file.
pub fn scaffold_config_dir(config_dir: &Path) -> Result<PathBuf> {
    let assets = config_dir.join(ASSETS_DIR);
    std::fs::create_dir_all(assets.join("public"))
        .with_context(|| format!("failed to create {}", assets.display()))?;

    let config = GatewayConfig {
        assets: AssetsConfig {
            directory: Some(assets),
            ..AssetsConfig::default()
        },
        ..GatewayConfig::default()
    };
    let contents =
        toml::to_string_pretty(&config).context("failed to serialize default config")?;
    let path = config_dir.join(CONFIG_FILE);
    std::fs::write(&path, contents).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}
