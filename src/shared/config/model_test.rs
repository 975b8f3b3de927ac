use chrono_tz::Tz;
use indoc::indoc;
use std::io::Write;

use crate::engine::errors::ConfigurationError;
use crate::shared::config::{BriefingConfig, load_settings};
use crate::test_helpers::factory::Factory;

fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .expect("temp config");
    file.write_all(contents.as_bytes()).expect("write config");
    file
}

#[test]
fn loads_full_settings_file() {
    let file = write_config(indoc! {r#"
        [server]
        http_addr = "0.0.0.0:8085"
        mount_path = "/ops"
        path_secret = "abc123"
        auth_token = "tok"
        keep_alive = true
        request_timeout_ms = 2500

        [briefing]
        app_name = "Storefront"
        default_period = "30d"
        timezone = "Europe/Amsterdam"

        [logging]
        log_dir = "../logs"
        stdout_level = "info"
        file_level = "debug"

        [store]
        data_file = "data/store.json"

        [[resources]]
        key = "users"
        count = true
        latest = 5
        attributes = ["email", "name"]

        [[resources]]
        key = "revenue"
        entity = "Order"
        sum = ["total"]
        avg = ["total"]
        scope = "paid"
        date_column = "created_at"
    "#});

    let settings = load_settings(file.path().to_str()).unwrap();

    assert_eq!(settings.server.http_addr, "0.0.0.0:8085");
    assert_eq!(settings.server.mount_path, "/ops");
    assert!(settings.server.keep_alive);
    assert_eq!(settings.server.request_timeout_ms, 2500);
    assert_eq!(settings.briefing.app_name, "Storefront");
    assert_eq!(settings.briefing.parse_timezone().unwrap(), Tz::Europe__Amsterdam);
    assert_eq!(settings.store.data_file, "data/store.json");

    assert_eq!(settings.resources.len(), 2);
    let users = &settings.resources[0];
    assert_eq!(users.key, "users");
    assert!(users.count);
    assert_eq!(users.latest, Some(5));
    assert_eq!(users.entity, None);
    let revenue = &settings.resources[1];
    assert_eq!(revenue.entity.as_deref(), Some("Order"));
    assert_eq!(revenue.scope.as_deref(), Some("paid"));
    assert!(!revenue.count);
}

#[test]
fn optional_sections_fall_back_to_defaults() {
    let file = write_config(indoc! {r#"
        [server]
        http_addr = "127.0.0.1:8085"
        auth_token = "tok"

        [logging]
        log_dir = "logs"
        stdout_level = "warn"
        file_level = "info"

        [store]
        data_file = "store.json"
    "#});

    let settings = load_settings(file.path().to_str()).unwrap();

    assert_eq!(settings.server.mount_path, "/agent-gateway");
    assert_eq!(settings.server.path_secret, "");
    assert!(!settings.server.keep_alive);
    assert_eq!(settings.server.request_timeout_ms, 10_000);
    assert_eq!(settings.briefing.app_name, "App");
    assert_eq!(settings.briefing.default_period, "7d");
    assert!(settings.resources.is_empty());
}

#[test]
fn missing_required_section_is_an_error() {
    let file = write_config(indoc! {r#"
        [server]
        http_addr = "127.0.0.1:8085"
    "#});

    assert!(load_settings(file.path().to_str()).is_err());
}

#[test]
fn prepare_requires_auth_token() {
    let settings = Factory::settings().with_auth_token("").create();

    assert!(matches!(
        settings.prepare(),
        Err(ConfigurationError::MissingAuthToken)
    ));
}

#[test]
fn prepare_generates_path_secret_when_blank() {
    let first = Factory::settings().with_path_secret("  ").create().prepare().unwrap();
    let second = Factory::settings().with_path_secret("").create().prepare().unwrap();

    let secret = &first.server.path_secret;
    assert_eq!(secret.len(), 32);
    assert!(secret.chars().all(|c| c.is_ascii_alphanumeric()));
    assert_ne!(first.server.path_secret, second.server.path_secret);
}

#[test]
fn prepare_keeps_configured_secret() {
    let settings = Factory::settings().with_path_secret("fixed").create().prepare().unwrap();
    assert_eq!(settings.server.path_secret, "fixed");
}

#[test]
fn prepare_normalizes_mount_path() {
    let mut settings = Factory::settings().create();
    settings.server.mount_path = " /ops/gateway/ ".to_string();
    assert_eq!(settings.prepare().unwrap().server.mount_path, "/ops/gateway");

    let mut settings = Factory::settings().create();
    settings.server.mount_path = "/".to_string();
    assert_eq!(settings.prepare().unwrap().server.mount_path, "");

    let mut settings = Factory::settings().create();
    settings.server.mount_path = "ops".to_string();
    assert!(matches!(
        settings.prepare(),
        Err(ConfigurationError::InvalidMountPath(_))
    ));
}

#[test]
fn prepare_rejects_unknown_timezone() {
    let mut settings = Factory::settings().create();
    settings.briefing.timezone = Some("Atlantis/Capital".to_string());

    assert!(matches!(
        settings.prepare(),
        Err(ConfigurationError::InvalidTimezone(name)) if name == "Atlantis/Capital"
    ));
}

#[test]
fn prepare_tolerates_unknown_default_period() {
    let settings = Factory::settings().with_default_period("fortnight").create();

    let prepared = settings.prepare().unwrap();
    assert_eq!(prepared.briefing.default_period, "fortnight");
}

#[test]
fn timezone_defaults_to_utc() {
    let config = BriefingConfig::default();
    assert_eq!(config.parse_timezone().unwrap(), Tz::UTC);

    let blank = BriefingConfig {
        timezone: Some(" ".to_string()),
        ..BriefingConfig::default()
    };
    assert_eq!(blank.parse_timezone().unwrap(), Tz::UTC);
}
