//! Integration tests for the config crate

use esim_deactivation_config::{
    collect_violations, validate_config, AppConfig, ConfigLoader, Environment,
};
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

fn shipped(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../config")
        .join(name)
}

#[test]
fn test_load_test_config() {
    let config = ConfigLoader::from_file(&shipped("test.toml")).expect("Failed to load test config");

    assert_eq!(config.environment, Environment::Test);
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.retry.delay_seconds, 1.0);
}

#[test]
fn test_load_prod_config() {
    let config = ConfigLoader::from_file(&shipped("prod.toml")).expect("Failed to load prod config");

    assert_eq!(config.environment, Environment::Prod);
    assert!(config.logging.json);
    assert_eq!(config.retry.max_attempts, 3);
    assert_eq!(config.retry.delay_seconds, 5.0);
}

#[test]
fn test_shipped_configs_only_lack_credentials() {
    for name in ["test.toml", "prod.toml"] {
        let config = ConfigLoader::from_file(&shipped(name)).unwrap();
        let fields: Vec<_> = collect_violations(&config)
            .into_iter()
            .map(|v| v.field)
            .collect();

        assert_eq!(
            fields,
            vec!["rsp.base_url", "rsp.access_key", "rsp.secret_key"],
            "{name}"
        );
    }
}

#[test]
fn test_file_with_env_keeps_file_values() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(
        file,
        r#"
environment = "test"

[rsp]
base_url = "https://rsp.example.com"
access_key = "ak"
secret_key = "sk"

[retry]
max_attempts = 4
"#
    )
    .unwrap();

    // An unused prefix keeps the process environment out of the result.
    let config = ConfigLoader::from_file_with_env(file.path(), "ESIM_DEACTIVATION_IT_UNUSED")
        .expect("Failed to load layered config");

    assert_eq!(config.rsp.access_key, "ak");
    assert_eq!(config.retry.max_attempts, 4);
    assert_eq!(config.batch.batch_size, 10);
    assert!(validate_config(&config).is_ok());
}

#[test]
fn test_yaml_file_to_domain_values() {
    let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
    writeln!(
        file,
        r#"
rsp:
  base_url: "http://localhost:9000"
  access_key: ak
  secret_key: sk
  timeout_ms: 1500
  transport_attempts: 1
esim_range:
  start: "8923801000"
  end: "8923801999"
batch:
  batch_size: 4
  rate_limit_delay_secs: 0.25
  success_threshold: 0.5
"#
    )
    .unwrap();

    let config = ConfigLoader::from_file(file.path()).unwrap();
    validate_config(&config).unwrap();

    let range = config.identifier_range().unwrap();
    assert!(range.is_esim("8923801500"));
    assert!(!range.is_esim("8923802000"));

    let batch = config.batch_settings().unwrap();
    assert_eq!(batch.batch_size, 4);
    assert_eq!(batch.rate_limit_delay, Duration::from_millis(250));

    let rsp = config.rsp_settings();
    assert_eq!(rsp.timeout, Duration::from_millis(1500));
    assert_eq!(rsp.backoff.attempts(), 1);
}

#[test]
fn test_invalid_file_content() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(file, "not toml at all [").unwrap();

    assert!(ConfigLoader::from_file(file.path()).is_err());
}

#[test]
fn test_default_config_is_invalid_without_credentials() {
    assert!(validate_config(&AppConfig::default()).is_err());
}
