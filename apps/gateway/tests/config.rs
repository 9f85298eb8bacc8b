//! Gateway configuration tests.

use insight_gateway::{
    GatewayConfig,
    config::{self, EngineKind},
    utils::expand_env_vars,
};
use std::path::Path;

#[test]
fn empty_config_uses_defaults() {
    let config = GatewayConfig::from_toml("").unwrap();
    assert_eq!(config.server.host, "127.0.0.1");
    assert_eq!(config.server.port, 4321);
    assert_eq!(config.server.max_body_bytes, 64 * 1024 * 1024);
    assert!(config.assets.directory.is_none());
    assert_eq!(config.assets.index, "index.html");
    assert_eq!(config.engine.kind, EngineKind::Memory);
}

#[test]
fn parse_full_config() {
    let toml = r#"
[server]
host = "0.0.0.0"
port = 8080
max_body_bytes = 1024

[assets]
directory = "/srv/insight/view"
index = "home.html"

[engine]
kind = "memory"
"#;
    let config = GatewayConfig::from_toml(toml).unwrap();
    assert_eq!(config.bind_address(), "0.0.0.0:8080");
    assert_eq!(config.server.max_body_bytes, 1024);
    assert_eq!(
        config.assets.directory.as_deref(),
        Some(Path::new("/srv/insight/view"))
    );
    assert_eq!(config.assets.index, "home.html");
}

#[test]
fn unknown_engine_kind_is_an_error() {
    let toml = r#"
[engine]
kind = "postgres"
"#;
    assert!(GatewayConfig::from_toml(toml).is_err());
}

#[test]
fn env_var_expansion() {
    unsafe { std::env::set_var("TEST_INSIGHT_HOST", "10.0.0.1") };
    let toml = r#"
[server]
host = "${TEST_INSIGHT_HOST}"
port = ${TEST_INSIGHT_PORT_UNSET:-9000}
"#;
    let config = GatewayConfig::from_toml(toml).unwrap();
    assert_eq!(config.bind_address(), "10.0.0.1:9000");
    unsafe { std::env::remove_var("TEST_INSIGHT_HOST") };
}

#[test]
fn expansion_edge_cases() {
    assert_eq!(expand_env_vars("plain text"), "plain text");
    assert_eq!(expand_env_vars("${TEST_INSIGHT_NEVER_SET}"), "");
    assert_eq!(expand_env_vars("a${TEST_INSIGHT_NEVER_SET:-b}c"), "abc");
    assert_eq!(expand_env_vars("cost: $5 ${unterminated"), "cost: $5 ${unterminated");
}

#[test]
fn missing_file_loads_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = GatewayConfig::load_or_default(&dir.path().join("gateway.toml")).unwrap();
    assert_eq!(config.server.port, 4321);
}

#[test]
fn unreadable_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(GatewayConfig::load(&dir.path().join("missing.toml")).is_err());
}

#[test]
fn scaffold_writes_loadable_config() {
    let dir = tempfile::tempdir().unwrap();
    let path = config::scaffold_config_dir(dir.path()).unwrap();
    assert_eq!(path, dir.path().join(config::CONFIG_FILE));
    assert!(dir.path().join(config::ASSETS_DIR).join("public").is_dir());

    let loaded = GatewayConfig::load(&path).unwrap();
    assert_eq!(
        loaded.assets.directory,
        Some(dir.path().join(config::ASSETS_DIR))
    );
    assert_eq!(loaded.server.port, 4321);
}

#[test]
fn global_config_dir_is_under_platform_config() {
    if let Ok(dir) = config::global_config_dir() {
        assert_eq!(dir.file_name().unwrap(), "insight");
    }
}
