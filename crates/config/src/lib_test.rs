//! Config loading tests

use std::io::Write;
use std::str::FromStr;
use std::time::Duration;

use crate::{Config, ConfigError};

#[test]
fn test_minimal_config() {
    let config = Config::from_str(
        r#"
[cloudwatch]
region = "us-east-1"
namespace = "MyApp"
"#,
    )
    .unwrap();

    assert_eq!(config.cloudwatch.region, "us-east-1");
    assert_eq!(config.cloudwatch.namespace, "MyApp");
    assert_eq!(
        config.cloudwatch.force_flush_interval,
        Duration::from_secs(60)
    );
}

#[test]
fn test_full_config() {
    let config = Config::from_str(
        r#"
[cloudwatch]
region = "eu-west-1"
namespace = "CWAgent"
force_flush_interval = "30s"
max_datums_per_call = 500
max_values_per_datum = 100
endpoint_override = "http://localhost:4582"
profile = "metrics"
rollup_dimensions = [["host"], ["host", "core"], ["host"]]

[cloudwatch.drop_original_metrics]
cpu_usage_idle = ["*"]
mem_used = ["host"]

[[cloudwatch.metric_decoration]]
category = "cpu"
name = "usage_idle"
rename = "CPU_IDLE"
unit = "Percent"
"#,
    )
    .unwrap();

    let cw = &config.cloudwatch;
    assert_eq!(cw.force_flush_interval, Duration::from_secs(30));
    assert_eq!(cw.max_datums_per_call, 500);
    assert_eq!(cw.max_values_per_datum, 100);
    assert_eq!(cw.endpoint_override, "http://localhost:4582");
    assert_eq!(cw.profile, "metrics");
    assert_eq!(cw.rollup_dimensions.len(), 3);
    assert_eq!(cw.drop_original_metrics["cpu_usage_idle"], vec!["*"]);
    assert_eq!(cw.metric_decoration.len(), 1);
    assert_eq!(cw.metric_decoration[0].rename.as_deref(), Some("CPU_IDLE"));
}

#[test]
fn test_missing_region_refuses_to_parse() {
    let err = Config::from_str("[cloudwatch]\nnamespace = \"ns\"").unwrap_err();
    assert!(matches!(err, ConfigError::MissingField { field: "region" }));
}

#[test]
fn test_missing_namespace_refuses_to_parse() {
    let err = Config::from_str("[cloudwatch]\nregion = \"us-east-1\"").unwrap_err();
    assert!(matches!(
        err,
        ConfigError::MissingField { field: "namespace" }
    ));
}

#[test]
fn test_invalid_toml() {
    let err = Config::from_str("[cloudwatch").unwrap_err();
    assert!(matches!(err, ConfigError::ParseError(_)));
}

#[test]
fn test_sub_millisecond_interval_rejected() {
    let err = Config::from_str(
        r#"
[cloudwatch]
region = "us-east-1"
namespace = "ns"
force_flush_interval = "100us"
"#,
    )
    .unwrap_err();
    assert!(matches!(err, ConfigError::InvalidValue { .. }));
}

#[test]
fn test_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        "[cloudwatch]\nregion = \"us-east-1\"\nnamespace = \"ns\"\n"
    )
    .unwrap();

    let config = Config::from_file(file.path()).unwrap();
    assert_eq!(config.cloudwatch.namespace, "ns");
}

#[test]
fn test_from_file_missing() {
    let err = Config::from_file("/nonexistent/stratus.toml").unwrap_err();
    assert!(matches!(err, ConfigError::IoError { .. }));
}
