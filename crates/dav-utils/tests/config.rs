//! Integration tests: configuration files end-to-end via `Config`.

use dav_utils::{Config, ConfigError, ConfigSource, LogLevel, Reflect, UtilError};
use serde_json::json;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn write_json(dir: &TempDir, name: &str, value: &serde_json::Value) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, serde_json::to_string_pretty(value).unwrap()).unwrap();
    path
}

// ── Loading ──

#[test]
fn loads_extra_parameters_from_file() {
    let tmp = TempDir::new().unwrap();
    let path = write_json(
        &tmp,
        "params.json",
        &json!({"test_param_1": -1, "test_param_2": 0, "test_param_3": "1"}),
    );

    let config = Config::from_file(&path).expect("config should load");

    assert_eq!(config.get("test_param_1"), Some(&json!(-1)));
    assert_eq!(config.get("test_param_2"), Some(&json!(0)));
    assert_eq!(config.get("test_param_3"), Some(&json!("1")));
    assert_eq!(config.source(), &ConfigSource::File(path));
}

#[test]
fn file_keys_are_case_insensitive() {
    let tmp = TempDir::new().unwrap();
    let path = write_json(
        &tmp,
        "upper.json",
        &json!({"LOG_LVL": "warning", "Output_Dir": "reports"}),
    );

    let config = Config::from_file(&path).unwrap();

    assert_eq!(config.log_lvl(), "warning");
    assert_eq!(config.log().level(), LogLevel::Warning);
    assert_eq!(config.get("output_dir"), Some(&json!("reports")));
}

#[test]
fn missing_logging_keys_keep_defaults() {
    let tmp = TempDir::new().unwrap();
    let path = write_json(&tmp, "empty.json", &json!({}));

    let config = Config::from_file(&path).unwrap();

    assert_eq!(config.log_date_fmt(), dav_utils::DEFAULT_LOG_DATE_FMT);
    assert_eq!(config.log_fmt(), dav_utils::DEFAULT_LOG_FMT);
    assert_eq!(config.log_lvl(), dav_utils::DEFAULT_LOG_LVL);
}

#[test]
fn unknown_level_falls_back_to_error() {
    let tmp = TempDir::new().unwrap();
    let path = write_json(&tmp, "nope.json", &json!({"LOG_LVL": "NOPE"}));

    let config = Config::from_file(&path).unwrap();

    assert_eq!(config.log_lvl(), "NOPE");
    assert_eq!(config.log().level(), LogLevel::Error);
}

// ── Failures ──

#[test]
fn non_text_logging_key_aborts_construction() {
    let tmp = TempDir::new().unwrap();
    let path = write_json(&tmp, "bad.json", &json!({"LOG_LVL": 10}));

    let err = Config::from_file(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Attr(_)), "{err}");
    assert!(err.to_string().contains("log_lvl=10"), "{err}");
}

#[test]
fn wrong_extension_fails_before_parsing() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("config.txt");
    fs::write(&path, "this is not json").unwrap();

    let err = Config::from_file(&path).unwrap_err();
    assert!(matches!(
        err,
        ConfigError::Util(UtilError::ExtensionMismatch { .. })
    ));
}

#[test]
fn missing_file_is_not_found() {
    let tmp = TempDir::new().unwrap();

    let err = Config::from_file(tmp.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, ConfigError::Util(UtilError::NotFound { .. })));
}

#[test]
fn malformed_json_is_reported() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("broken.json");
    fs::write(&path, "{\"LOG_LVL\": ").unwrap();

    let err = Config::from_file(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Util(UtilError::Json { .. })));
}

#[test]
fn invalid_log_format_is_reported() {
    let tmp = TempDir::new().unwrap();
    let path = write_json(&tmp, "fmt.json", &json!({"LOG_FMT": "%(when)s %(message)s"}));

    let err = Config::from_file(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Logging(_)));
}

#[test]
fn left_aligned_log_format_is_accepted() {
    let tmp = TempDir::new().unwrap();
    let fmt = "%(asctime)s %(levelname)-8s %(message)s";
    let path = write_json(&tmp, "fmt.json", &json!({"LOG_FMT": fmt}));

    let config = Config::from_file(&path).unwrap();
    assert_eq!(config.log().log_fmt(), fmt);
}

#[test]
fn effective_attrs_match_loaded_config() {
    let tmp = TempDir::new().unwrap();
    let path = write_json(&tmp, "cfg.json", &json!({"LOG_LVL": "INFO", "RETRIES": 3}));

    let attrs = Config::effective_attrs(Some(&path)).unwrap();
    assert_eq!(attrs, Config::from_file(&path).unwrap().public_attrs());
    assert!(matches!(
        Config::effective_attrs(Some(&tmp.path().join("missing.json"))),
        Err(ConfigError::Util(UtilError::NotFound { .. }))
    ));
}

#[test]
fn load_returns_raw_mapping() {
    let tmp = TempDir::new().unwrap();
    let path = write_json(&tmp, "raw.json", &json!({"LOG_LVL": "INFO", "_private": 1}));

    let values = Config::load(&path).unwrap();

    assert_eq!(values.get("LOG_LVL"), Some(&json!("INFO")));
    assert_eq!(values.get("_private"), Some(&json!(1)));
}

#[test]
fn private_keys_in_file_are_ignored() {
    let tmp = TempDir::new().unwrap();
    let path = write_json(&tmp, "private.json", &json!({"_secret": "x", "visible": true}));

    let config = Config::from_file(&path).unwrap();

    assert!(config.get("_secret").is_none());
    assert_eq!(config.public_attrs().get("visible"), Some(&json!(true)));
}

// ── Templates ──

#[test]
fn default_template_content() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("template.json");

    Config::new().unwrap().create_template(&path).unwrap();

    insta::assert_snapshot!(fs::read_to_string(&path).unwrap(), @r#"
    {
      "LOG_DATE_FMT": "%H:%M:%S",
      "LOG_FMT": "%(asctime)s.%(msecs)03d|%(levelname).1s|%(message)s",
      "LOG_LVL": "DEBUG"
    }
    "#);
}

#[test]
fn template_includes_extra_attributes() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("template.json");

    let mut config = Config::new().unwrap();
    config.set("retries", json!(3)).unwrap();
    config.create_template(&path).unwrap();

    let written: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(written["RETRIES"], json!(3));
    assert_eq!(written["LOG_LVL"], json!("DEBUG"));
}

#[test]
fn template_round_trip_after_edit() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("template.json");

    let config = Config::new().unwrap();
    config.create_template(&path).unwrap();
    drop(config);

    let edited = fs::read_to_string(&path)
        .unwrap()
        .replace("\"%H:%M:%S\"", "\"%Y-%m-%d %H:%M:%S\"");
    fs::write(&path, edited).unwrap();

    let updated = Config::from_file(&path).unwrap();
    assert_eq!(updated.log_date_fmt(), "%Y-%m-%d %H:%M:%S");
    assert_eq!(updated.log().log_date_fmt(), "%Y-%m-%d %H:%M:%S");
    updated.log().debug("test");
}

#[test]
fn template_round_trip_preserves_logging_parameters() {
    let tmp = TempDir::new().unwrap();
    let source = write_json(
        &tmp,
        "source.json",
        &json!({"LOG_LVL": "INFO", "LOG_DATE_FMT": "%d.%m %H:%M", "LOG_FMT": "%(message)s"}),
    );
    let template = tmp.path().join("template.json");

    let original = Config::from_file(&source).unwrap();
    original.create_template(&template).unwrap();
    let reloaded = Config::from_file(&template).unwrap();

    assert_eq!(reloaded.log_lvl(), original.log_lvl());
    assert_eq!(reloaded.log_fmt(), original.log_fmt());
    assert_eq!(reloaded.log_date_fmt(), original.log_date_fmt());
    assert_eq!(reloaded.public_attrs(), original.public_attrs());
}
