use crate::engine::errors::ConfigurationError;
use crate::engine::resource::{ResourceRegistry, entity_name_for_key};
use crate::shared::config::ResourceSettings;
use crate::test_helpers::factory::Factory;

fn settings(key: &str) -> ResourceSettings {
    ResourceSettings {
        key: key.to_string(),
        ..Default::default()
    }
}

#[test]
fn entity_names_are_inferred_from_keys() {
    assert_eq!(entity_name_for_key("users"), "User");
    assert_eq!(entity_name_for_key("line_items"), "LineItem");
    assert_eq!(entity_name_for_key("categories"), "Category");
    assert_eq!(entity_name_for_key("boxes"), "Box");
    assert_eq!(entity_name_for_key("addresses"), "Address");
    assert_eq!(entity_name_for_key("status"), "Status");
    assert_eq!(entity_name_for_key("staff"), "Staff");
}

#[test]
fn expose_uses_explicit_entity_or_inferred_one() {
    let mut registry = ResourceRegistry::new();
    registry.expose("signups", Some("User"), |b| Ok(b.count())).unwrap();
    registry.expose("orders", None, |b| Ok(b)).unwrap();

    assert_eq!(registry.get("signups").unwrap().entity_name(), "User");
    assert_eq!(registry.get("orders").unwrap().entity_name(), "Order");
    assert_eq!(registry.keys().collect::<Vec<_>>(), vec!["signups", "orders"]);
}

#[test]
fn re_exposing_replaces_in_place() {
    let mut registry = ResourceRegistry::new();
    registry.expose("users", None, |b| Ok(b)).unwrap();
    registry.expose("orders", None, |b| Ok(b)).unwrap();
    registry.expose("users", None, |b| Ok(b.count())).unwrap();

    assert_eq!(registry.len(), 2);
    assert_eq!(registry.keys().collect::<Vec<_>>(), vec!["users", "orders"]);
    assert!(registry.get("users").unwrap().count_enabled());
}

#[test]
fn expose_rejects_blank_keys_and_builder_errors() {
    let mut registry = ResourceRegistry::new();

    assert!(matches!(
        registry.expose("  ", None, |b| Ok(b)),
        Err(ConfigurationError::EmptyResourceKey)
    ));
    assert!(matches!(
        registry.expose("users", None, |b| b.set_latest(0)),
        Err(ConfigurationError::NonPositiveLatest(0))
    ));
    assert!(registry.is_empty());
}

#[test]
fn from_settings_maps_every_option() {
    let resource = ResourceSettings {
        key: "orders".to_string(),
        count: true,
        latest: Some(4),
        attributes: vec!["total".to_string()],
        sum: vec!["total".to_string()],
        avg: vec!["total".to_string()],
        scope: Some("paid".to_string()),
        date_column: Some("created_at".to_string()),
        ..Default::default()
    };

    let registry = ResourceRegistry::from_settings(&[resource]).unwrap();
    let d = registry.get("orders").unwrap();

    assert_eq!(d.entity_name(), "Order");
    assert!(d.count_enabled());
    assert_eq!(d.latest_count(), Some(4));
    assert_eq!(d.projection_fields(), ["total"]);
    assert_eq!(d.sum_fields(), ["total"]);
    assert_eq!(d.avg_fields(), ["total"]);
    assert_eq!(d.filter_name(), Some("paid"));
    assert_eq!(d.time_field(), "created_at");
}

#[test]
fn from_settings_fails_fast_on_bad_latest() {
    let resource = ResourceSettings {
        latest: Some(-2),
        ..settings("users")
    };

    assert!(matches!(
        ResourceRegistry::from_settings(&[resource]),
        Err(ConfigurationError::NonPositiveLatest(-2))
    ));
}

#[test]
fn select_follows_request_order() {
    let registry =
        ResourceRegistry::from_settings(&[settings("users"), settings("orders"), settings("tags")])
            .unwrap();

    let all: Vec<&str> = registry.select(None).into_iter().map(|(k, _)| k).collect();
    assert_eq!(all, vec!["users", "orders", "tags"]);

    let requested = vec!["tags".to_string(), "ghost".to_string(), "users".to_string(), "tags".to_string()];
    let some: Vec<&str> = registry
        .select(Some(requested.as_slice()))
        .into_iter()
        .map(|(k, _)| k)
        .collect();
    assert_eq!(some, vec!["tags", "users"]);

    assert!(registry.select(Some(&["ghost".to_string()][..])).is_empty());
    assert!(registry.select(Some(&[][..])).is_empty());
}

#[test]
fn validate_accepts_known_fields() {
    let store = Factory::store().create();
    let registry =
        ResourceRegistry::from_settings(&Factory::settings().create().resources).unwrap();

    assert!(registry.validate(&store).is_ok());
}

#[test]
fn validate_skips_entities_unknown_to_the_store() {
    let store = Factory::store().create();
    let registry = ResourceRegistry::from_settings(&[ResourceSettings {
        attributes: vec!["anything".to_string()],
        ..settings("widgets")
    }])
    .unwrap();

    assert!(registry.validate(&store).is_ok());
}

#[test]
fn validate_rejects_unknown_projection_field() {
    let store = Factory::store().create();
    let registry = ResourceRegistry::from_settings(&[ResourceSettings {
        attributes: vec!["password_digest".to_string()],
        ..settings("users")
    }])
    .unwrap();

    assert!(matches!(
        registry.validate(&store),
        Err(ConfigurationError::UnknownField { field, .. }) if field == "password_digest"
    ));
}

#[test]
fn validate_rejects_non_numeric_aggregates() {
    let store = Factory::store().create();
    let registry = ResourceRegistry::from_settings(&[ResourceSettings {
        avg: vec!["status".to_string()],
        ..settings("orders")
    }])
    .unwrap();

    assert!(matches!(
        registry.validate(&store),
        Err(ConfigurationError::NonNumericField { field, .. }) if field == "status"
    ));
}

#[test]
fn validate_rejects_non_timestamp_time_field() {
    let store = Factory::store().create();
    let registry = ResourceRegistry::from_settings(&[ResourceSettings {
        count: true,
        date_column: Some("email".to_string()),
        ..settings("users")
    }])
    .unwrap();

    assert!(matches!(
        registry.validate(&store),
        Err(ConfigurationError::NonTimestampField { .. })
    ));
}
