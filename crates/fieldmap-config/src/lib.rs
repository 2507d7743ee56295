// SPDX-License-Identifier: MIT OR Apache-2.0
#![doc = include_str!("../README.md")]
#![deny(unsafe_code)]
#![warn(missing_docs)]

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use fieldmap_engine::rule::ValidatedRule;
use fieldmap_engine::{DEFAULT_GROUP, MappingEngine, value};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;
use tracing_subscriber::EnvFilter;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur while loading, validating or applying a config.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The requested configuration file was not found.
    #[error("config file not found: {path}")]
    FileNotFound {
        /// Path that was requested.
        path: String,
    },

    /// The file could not be parsed as valid TOML.
    #[error("failed to parse config: {reason}")]
    ParseError {
        /// Human-readable parse error detail.
        reason: String,
    },

    /// Semantic validation failed (one or more problems).
    #[error("config validation failed: {reasons:?}")]
    ValidationError {
        /// Individual validation failure messages.
        reasons: Vec<String>,
    },

    /// The global tracing subscriber could not be installed.
    #[error("failed to initialise logging: {reason}")]
    LoggingInit {
        /// Underlying error detail.
        reason: String,
    },
}

// ---------------------------------------------------------------------------
// Warnings
// ---------------------------------------------------------------------------

/// Advisory issues that do not prevent building an engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    /// A group is declared without any rules.
    EmptyGroup {
        /// Dotted path of the group.
        group: String,
    },
    /// The same source field is bound more than once in one group.
    DuplicateField {
        /// Dotted path of the group.
        group: String,
        /// The repeated field.
        field: String,
    },
    /// No group uses the default token, so unmatched objects map nothing.
    NoDefaultGroup {
        /// Dotted path of the mapper (empty for the root).
        mapper: String,
    },
}

impl std::fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigWarning::EmptyGroup { group } => write!(f, "group '{group}' has no rules"),
            ConfigWarning::DuplicateField { group, field } => {
                write!(f, "group '{group}' binds field '{field}' more than once")
            }
            ConfigWarning::NoDefaultGroup { mapper } if mapper.is_empty() => {
                f.write_str("no default group declared")
            }
            ConfigWarning::NoDefaultGroup { mapper } => {
                write!(f, "mapper '{mapper}' declares no default group")
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Config types
// ---------------------------------------------------------------------------

/// A mapper: its discriminator, default group token and rule groups.
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub struct MapperConfig {
    /// Source field whose value selects the rule group.
    #[serde(default = "default_discriminator")]
    pub discriminator: String,

    /// Name of the group applied to every object.
    #[serde(default = "default_group_token")]
    pub default_group: String,

    /// Log level (e.g. `"debug"`, `"info"`, `"warn"`). Only read on the root
    /// mapper.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,

    /// Rule groups keyed by group name.
    #[serde(default)]
    pub groups: BTreeMap<String, Vec<RuleSpec>>,
}

fn default_discriminator() -> String {
    "type".into()
}

fn default_group_token() -> String {
    DEFAULT_GROUP.into()
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            discriminator: default_discriminator(),
            default_group: default_group_token(),
            log_level: Some("info".into()),
            groups: BTreeMap::new(),
        }
    }
}

/// A rule that can be expressed without code.
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RuleSpec {
    /// Copy the stringified field to `target`.
    Direct {
        /// Source field.
        field: String,
        /// Target selector.
        target: String,
    },
    /// Copy the field when it passes `check`, otherwise write `default`.
    Validated {
        /// Source field.
        field: String,
        /// Target selector.
        target: String,
        /// Value written when the check fails.
        #[serde(default)]
        default: String,
        /// Built-in check applied to the value.
        #[serde(default)]
        check: Check,
    },
    /// Map the object held in `field` with a nested mapper.
    Nested {
        /// Source field holding the nested object.
        field: String,
        /// Mapper applied to the nested object.
        mapper: Box<MapperConfig>,
    },
}

impl RuleSpec {
    /// Source field the rule reads.
    #[must_use]
    pub fn field(&self) -> &str {
        match self {
            Self::Direct { field, .. }
            | Self::Validated { field, .. }
            | Self::Nested { field, .. } => field.as_str(),
        }
    }
}

/// Built-in validation checks for [`RuleSpec::Validated`].
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Check {
    /// Present and not null.
    #[default]
    Present,
    /// Present and not an empty string, array or object.
    NonEmpty,
    /// A number, or a string holding one.
    Number,
    /// A JSON boolean.
    Boolean,
}

impl Check {
    fn predicate(self) -> fn(Option<&Value>) -> bool {
        match self {
            Self::Present => value::is_present,
            Self::NonEmpty => value::is_non_empty,
            Self::Number => value::is_number,
            Self::Boolean => value::is_boolean,
        }
    }
}

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Recognised log levels.
const VALID_LOG_LEVELS: &[&str] = &["error", "warn", "info", "debug", "trace"];

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Load a [`MapperConfig`] from an optional TOML file path.
///
/// * If `path` is `Some`, reads and parses the file.
/// * If `path` is `None`, returns [`MapperConfig::default()`].
///
/// Environment variable overrides are applied on top in both cases.
pub fn load_config(path: Option<&Path>) -> Result<MapperConfig, ConfigError> {
    let mut config = match path {
        Some(p) => {
            let content = std::fs::read_to_string(p).map_err(|_| ConfigError::FileNotFound {
                path: p.display().to_string(),
            })?;
            parse_toml(&content)?
        }
        None => MapperConfig::default(),
    };
    apply_env_overrides(&mut config);
    Ok(config)
}

/// Parse a TOML string into a [`MapperConfig`].
pub fn parse_toml(content: &str) -> Result<MapperConfig, ConfigError> {
    toml::from_str::<MapperConfig>(content).map_err(|e| ConfigError::ParseError {
        reason: e.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Env overrides
// ---------------------------------------------------------------------------

/// Apply environment variable overrides to the root mapper.
///
/// Recognised variables:
/// - `FIELDMAP_DISCRIMINATOR`
/// - `FIELDMAP_DEFAULT_GROUP`
/// - `FIELDMAP_LOG_LEVEL`
pub fn apply_env_overrides(config: &mut MapperConfig) {
    apply_overrides_from(config, |key| std::env::var(key).ok());
}

/// [`apply_env_overrides`] with an injectable variable lookup.
pub fn apply_overrides_from<F>(config: &mut MapperConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(val) = lookup("FIELDMAP_DISCRIMINATOR") {
        config.discriminator = val;
    }
    if let Some(val) = lookup("FIELDMAP_DEFAULT_GROUP") {
        config.default_group = val;
    }
    if let Some(val) = lookup("FIELDMAP_LOG_LEVEL") {
        config.log_level = Some(val);
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate a parsed configuration, returning advisory warnings.
///
/// Hard errors (empty discriminator, empty fields or targets, unknown log
/// level) are returned as a [`ConfigError::ValidationError`]; soft issues
/// come back as warnings.
pub fn validate_config(config: &MapperConfig) -> Result<Vec<ConfigWarning>, ConfigError> {
    let mut errors: Vec<String> = Vec::new();
    let mut warnings: Vec<ConfigWarning> = Vec::new();

    if let Some(ref level) = config.log_level {
        if !VALID_LOG_LEVELS.contains(&level.as_str()) {
            errors.push(format!("invalid log_level '{level}'"));
        }
    }
    validate_mapper(config, "", &mut errors, &mut warnings);

    if errors.is_empty() {
        Ok(warnings)
    } else {
        Err(ConfigError::ValidationError { reasons: errors })
    }
}

fn validate_mapper(
    mapper: &MapperConfig,
    path: &str,
    errors: &mut Vec<String>,
    warnings: &mut Vec<ConfigWarning>,
) {
    let label = if path.is_empty() { "root" } else { path };
    if mapper.discriminator.trim().is_empty() {
        errors.push(format!("mapper '{label}': discriminator must not be empty"));
    }
    if mapper.default_group.trim().is_empty() {
        errors.push(format!("mapper '{label}': default_group must not be empty"));
    }
    if !mapper.groups.contains_key(&mapper.default_group) {
        warnings.push(ConfigWarning::NoDefaultGroup {
            mapper: path.to_owned(),
        });
    }

    for (name, rules) in &mapper.groups {
        let group_path = join_path(path, name);
        if name.is_empty() {
            errors.push(format!("mapper '{label}': group name must not be empty"));
        }
        if rules.is_empty() {
            warnings.push(ConfigWarning::EmptyGroup {
                group: group_path.clone(),
            });
        }

        let mut seen = BTreeSet::new();
        for rule in rules {
            let field = rule.field();
            if field.trim().is_empty() {
                errors.push(format!("group '{group_path}': rule field must not be empty"));
            } else if !seen.insert(field) {
                warnings.push(ConfigWarning::DuplicateField {
                    group: group_path.clone(),
                    field: field.to_owned(),
                });
            }
            match rule {
                RuleSpec::Direct { target, .. } | RuleSpec::Validated { target, .. } => {
                    if target.trim().is_empty() {
                        errors.push(format!(
                            "group '{group_path}': field '{field}' has an empty target"
                        ));
                    }
                }
                RuleSpec::Nested { mapper, .. } => {
                    validate_mapper(mapper, &join_path(&group_path, field), errors, warnings);
                }
            }
        }
    }
}

fn join_path(base: &str, segment: &str) -> String {
    if base.is_empty() {
        segment.to_owned()
    } else {
        format!("{base}.{segment}")
    }
}

// ---------------------------------------------------------------------------
// Merging
// ---------------------------------------------------------------------------

/// Merge two configurations. Values in `overlay` take precedence over `base`.
///
/// Group maps are combined; on name collisions the overlay group replaces the
/// base group wholesale.
#[must_use]
pub fn merge_configs(base: MapperConfig, overlay: MapperConfig) -> MapperConfig {
    let mut groups = base.groups;
    groups.extend(overlay.groups);
    MapperConfig {
        discriminator: overlay.discriminator,
        default_group: overlay.default_group,
        log_level: overlay.log_level.or(base.log_level),
        groups,
    }
}

// ---------------------------------------------------------------------------
// Engine construction
// ---------------------------------------------------------------------------

/// Validate `config` and build the [`MappingEngine`] it describes.
///
/// Warnings are logged, errors abort construction.
pub fn build_engine(config: &MapperConfig) -> Result<MappingEngine, ConfigError> {
    for warning in validate_config(config)? {
        warn!(target: "fieldmap.config", %warning, "config warning");
    }
    Ok(engine_from(config))
}

fn engine_from(config: &MapperConfig) -> MappingEngine {
    let mut engine = MappingEngine::new(config.discriminator.clone())
        .with_default_group_name(config.default_group.clone());
    for (name, rules) in &config.groups {
        let mut group = engine.new_group(name.clone());
        for rule in rules {
            group = match rule {
                RuleSpec::Direct { field, target } => {
                    group.with_direct_mapping(field.clone(), target.clone())
                }
                RuleSpec::Validated {
                    field,
                    target,
                    default,
                    check,
                } => group.with_rule(
                    field.clone(),
                    ValidatedRule::new(target.clone(), default.clone())
                        .with_predicate(check.predicate()),
                ),
                RuleSpec::Nested { field, mapper } => {
                    group.with_nested_mapping(field.clone(), engine_from(mapper))
                }
            };
        }
    }
    engine
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

/// Install a global `tracing` subscriber filtered at the configured level.
///
/// `RUST_LOG`, when set, takes precedence over `log_level`.
pub fn init_tracing(config: &MapperConfig) -> Result<(), ConfigError> {
    let level = config.log_level.as_deref().unwrap_or("info");
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(format!("fieldmap={level}")))
        .map_err(|e| ConfigError::LoggingInit {
            reason: e.to_string(),
        })?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|e| ConfigError::LoggingInit {
            reason: e.to_string(),
        })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
