//! File and environment loading against real files.

use std::io::Write;
use tempfile::{Builder, NamedTempFile};
use tollgate_config::{ConfigError, GateOptions, OptionsLoader};

fn temp_file(suffix: &str, content: &str) -> NamedTempFile {
    let mut file = Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_toml_file() {
    let file = temp_file(
        ".toml",
        r#"
            secret = "supersecretkeyyoushouldnotcommit"
            ttl = 900
            secure = false
            path = ["/api"]
            ignore = ["/api/token"]
        "#,
    );

    let options = OptionsLoader::new().with_file(file.path()).unwrap().load().unwrap();
    assert_eq!(options.ttl, Some(900));
    assert!(!options.secure);

    let config = options.build().unwrap();
    assert_eq!(config.ttl(), Some(900));
    assert!(!config.transport().secure());
}

#[test]
fn test_json_file() {
    let file = temp_file(".json", r#"{"secret": "k", "attribute": "claims"}"#);

    let options = OptionsLoader::new().with_file(file.path()).unwrap().load().unwrap();
    assert_eq!(options.attribute, "claims");
}

#[test]
fn test_unsupported_extension() {
    let file = temp_file(".yaml", "secret: k");

    let err = OptionsLoader::new().with_file(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::ValidationError(_)));
}

#[test]
fn test_unknown_field_in_file() {
    let file = temp_file(".toml", "secret = \"k\"\nheaders = \"x-token\"\n");

    let err = OptionsLoader::new().with_file(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::TomlError(_)));
}

#[test]
fn test_env_overrides_file() {
    let file = temp_file(".toml", "secret = \"from-file\"\nttl = 60\n");
    std::env::set_var("TOLLGATE_IT_FILE__TTL", "120");
    std::env::set_var("TOLLGATE_IT_FILE__PATH", "/api,/admin");

    let options = OptionsLoader::new()
        .with_file(file.path())
        .unwrap()
        .with_env_prefix("tollgate_it_file")
        .load()
        .unwrap();

    assert_eq!(options.secret.as_deref(), Some("from-file"));
    assert_eq!(options.ttl, Some(120));
    assert_eq!(
        options.path,
        Some(vec!["/api".to_string(), "/admin".to_string()])
    );
}

#[test]
fn test_dotenv_file_seeds_environment() {
    let file = temp_file(
        ".env",
        "TOLLGATE_IT_DOTENV__SECRET=from-dotenv\nTOLLGATE_IT_DOTENV__COOKIE=session\n",
    );

    let options = OptionsLoader::new()
        .with_dotenv_file(file.path())
        .unwrap()
        .with_env_prefix("TOLLGATE_IT_DOTENV")
        .load()
        .unwrap();

    assert_eq!(options.secret.as_deref(), Some("from-dotenv"));
    assert_eq!(options.cookie, "session");
}

#[test]
fn test_invalid_env_value() {
    std::env::set_var("TOLLGATE_IT_BAD__SECURE", "sometimes");

    let err = OptionsLoader::new()
        .with_string(r#"secret = "k""#, "toml")
        .unwrap()
        .with_env_prefix("TOLLGATE_IT_BAD")
        .load()
        .unwrap_err();
    assert!(matches!(err, ConfigError::EnvParseError { .. }));
}

#[test]
fn test_builder_hooks_after_loading() {
    let options = GateOptions {
        secret: Some("k".to_string()),
        ..GateOptions::default()
    };

    let config = options
        .into_builder()
        .unwrap()
        .rule_fn(|request: &tollgate::Request| request.uri().path() != "/health")
        .build()
        .unwrap();
    assert_eq!(config.rules().len(), 1);
}
