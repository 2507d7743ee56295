// SPDX-License-Identifier: MIT OR Apache-2.0
//! File loading, parsing and engine construction tests for `fieldmap-config`.

use std::io::Write;

use fieldmap_config::{
    Check, ConfigError, MapperConfig, RuleSpec, build_engine, load_config, parse_toml,
    validate_config,
};
use fieldmap_sink::MemorySink;
use serde_json::json;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const ORDER_FORM: &str = r##"
discriminator = "type"
log_level = "debug"

[[groups.any]]
kind = "direct"
field = "id"
target = "#id"

[[groups.customer]]
kind = "validated"
field = "email"
target = "#email"
default = "unknown"
check = "non_empty"

[[groups.customer]]
kind = "nested"
field = "address"

[groups.customer.mapper]
discriminator = "kind"

[[groups.customer.mapper.groups.any]]
kind = "direct"
field = "city"
target = "#city"

[[groups.customer.mapper.groups.home]]
kind = "direct"
field = "street"
target = "#street"
"##;

fn write_temp(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

// ===========================================================================
// 1. Parsing
// ===========================================================================

#[test]
fn parses_groups_and_nested_mapper() {
    let cfg = parse_toml(ORDER_FORM).unwrap();
    assert_eq!(cfg.discriminator, "type");
    assert_eq!(cfg.default_group, "any");
    assert_eq!(cfg.log_level.as_deref(), Some("debug"));
    assert_eq!(cfg.groups.len(), 2);

    let customer = &cfg.groups["customer"];
    assert_eq!(
        customer[0],
        RuleSpec::Validated {
            field: "email".into(),
            target: "#email".into(),
            default: "unknown".into(),
            check: Check::NonEmpty,
        }
    );
    match &customer[1] {
        RuleSpec::Nested { field, mapper } => {
            assert_eq!(field, "address");
            assert_eq!(mapper.discriminator, "kind");
            assert_eq!(mapper.groups["any"].len(), 1);
        }
        other => panic!("expected nested rule, got {other:?}"),
    }
}

#[test]
fn empty_document_uses_defaults() {
    let cfg = parse_toml("").unwrap();
    assert_eq!(cfg.discriminator, "type");
    assert_eq!(cfg.default_group, "any");
    assert!(cfg.log_level.is_none());
    assert!(cfg.groups.is_empty());
}

#[test]
fn validated_check_defaults_to_present() {
    let cfg = parse_toml(
        r##"
        [[groups.x]]
        kind = "validated"
        field = "a"
        target = "#a"
        "##,
    )
    .unwrap();
    assert_eq!(
        cfg.groups["x"][0],
        RuleSpec::Validated {
            field: "a".into(),
            target: "#a".into(),
            default: String::new(),
            check: Check::Present,
        }
    );
}

#[test]
fn unknown_rule_kind_is_parse_error() {
    let err = parse_toml(
        r##"
        [[groups.x]]
        kind = "teleport"
        field = "a"
        "##,
    )
    .unwrap_err();
    assert!(matches!(err, ConfigError::ParseError { .. }), "{err:?}");
}

#[test]
fn unknown_check_is_parse_error() {
    let err = parse_toml(
        r##"
        [[groups.x]]
        kind = "validated"
        field = "a"
        target = "#a"
        check = "is_prime"
        "##,
    )
    .unwrap_err();
    assert!(matches!(err, ConfigError::ParseError { .. }), "{err:?}");
}

#[test]
fn toml_roundtrip() {
    let cfg = parse_toml(ORDER_FORM).unwrap();
    let text = toml::to_string(&cfg).unwrap();
    assert_eq!(parse_toml(&text).unwrap(), cfg);
}

// ===========================================================================
// 2. Loading
// ===========================================================================

#[test]
fn load_from_file() {
    let file = write_temp(ORDER_FORM);
    let cfg = load_config(Some(file.path())).unwrap();
    assert!(cfg.groups.contains_key("customer"));
}

#[test]
fn load_missing_file_errors() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_config(Some(&dir.path().join("absent.toml"))).unwrap_err();
    assert!(matches!(err, ConfigError::FileNotFound { .. }));
    assert!(err.to_string().contains("absent.toml"));
}

#[test]
fn load_invalid_toml_errors() {
    let file = write_temp("groups = [[[");
    assert!(matches!(
        load_config(Some(file.path())),
        Err(ConfigError::ParseError { .. })
    ));
}

// ===========================================================================
// 3. Validation and schema
// ===========================================================================

#[test]
fn sample_config_is_valid() {
    let cfg = parse_toml(ORDER_FORM).unwrap();
    let warnings = validate_config(&cfg).unwrap();
    assert!(warnings.is_empty(), "unexpected warnings: {warnings:?}");
}

#[test]
fn json_schema_describes_rule_kinds() {
    let schema = schemars::schema_for!(MapperConfig);
    let text = serde_json::to_string(&schema).unwrap();
    for needle in ["discriminator", "groups", "direct", "validated", "nested", "non_empty"] {
        assert!(text.contains(needle), "schema lacks {needle}: {text}");
    }
}

// ===========================================================================
// 4. Built engines map objects
// ===========================================================================

#[test]
fn built_engine_maps_order_form() {
    let engine = build_engine(&parse_toml(ORDER_FORM).unwrap()).unwrap();
    let mut sink = MemorySink::with_slots(["#f #id", "#f #email", "#f #city", "#f #street"]);

    let ok = engine.map(
        &json!({
            "type": "customer",
            "id": 42,
            "email": "",
            "address": {"kind": "home", "street": "Oude Delft 1", "city": "Delft"}
        }),
        "#f",
        &mut sink,
    );

    assert!(ok);
    assert_eq!(sink.value("#f #id"), Some("42"));
    assert_eq!(sink.value("#f #email"), Some("unknown"));
    assert_eq!(sink.value("#f #city"), Some("Delft"));
    assert_eq!(sink.value("#f #street"), Some("Oude Delft 1"));
}

#[test]
fn built_engine_number_check() {
    let cfg = parse_toml(
        r##"
        [[groups.line]]
        kind = "validated"
        field = "qty"
        target = "#qty"
        default = "0"
        check = "number"
        "##,
    )
    .unwrap();
    let engine = build_engine(&cfg).unwrap();
    let mut sink = MemorySink::accept_all();

    engine.map(&json!({"type": "line", "qty": "7"}), "", &mut sink);
    engine.map(&json!({"type": "line", "qty": "seven"}), "", &mut sink);

    let history = sink.slot("#qty").unwrap().history();
    assert_eq!(history, ["7", "0"]);
}

#[test]
fn custom_default_token_from_config() {
    let cfg = MapperConfig {
        default_group: "*".into(),
        ..parse_toml(
            r##"
            [["groups"."*"]]
            kind = "direct"
            field = "id"
            target = "#id"
            "##,
        )
        .unwrap()
    };
    let engine = build_engine(&cfg).unwrap();
    assert_eq!(engine.default_group_name(), "*");
    let mut sink = MemorySink::accept_all();
    let report = engine
        .try_map(&json!({"type": "unlisted", "id": 1}), "", &mut sink)
        .unwrap();
    assert!(report.group_missing);
    assert_eq!(sink.value("#id"), Some("1"));
}
