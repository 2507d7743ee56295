// SPDX-License-Identifier: MIT OR Apache-2.0
//! Mapping rules: one source field to one sink write.

use std::fmt;
use std::sync::Arc;

use fieldmap_sink::{Sink, locate};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{trace, warn};

use crate::MappingEngine;
use crate::value::{is_present, stringify};

/// Converts a source value into the string written to a slot.
pub type Transform = Arc<dyn Fn(Option<&Value>) -> String + Send + Sync>;

/// Decides whether a source value is acceptable.
pub type Predicate = Arc<dyn Fn(Option<&Value>) -> bool + Send + Sync>;

/// Performs a whole write itself: `(value, target_selector, context, sink)`.
pub type CustomFn = Arc<dyn Fn(Option<&Value>, &str, &str, &mut dyn Sink) -> bool + Send + Sync>;

// ── RuleKind ────────────────────────────────────────────────────────────

/// Discriminant of a [`MappingRule`], used in reports and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    /// [`MappingRule::Direct`].
    Direct,
    /// [`MappingRule::Validated`].
    Validated,
    /// [`MappingRule::Custom`].
    Custom,
    /// [`MappingRule::Nested`].
    Nested,
}

impl RuleKind {
    /// Stable lowercase name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::Validated => "validated",
            Self::Custom => "custom",
            Self::Nested => "nested",
        }
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Variants ────────────────────────────────────────────────────────────

/// Writes `transform(value)` to the target.
#[derive(Clone)]
pub struct DirectRule {
    target: String,
    transform: Transform,
}

impl DirectRule {
    /// A rule that stringifies the value into `target`.
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            transform: Arc::new(stringify),
        }
    }

    /// Replaces the value transform.
    #[must_use]
    pub fn with_transform<F>(mut self, transform: F) -> Self
    where
        F: Fn(Option<&Value>) -> String + Send + Sync + 'static,
    {
        self.transform = Arc::new(transform);
        self
    }

    /// Target selector.
    #[must_use]
    pub fn target(&self) -> &str {
        &self.target
    }

    fn invoke(&self, value: Option<&Value>, context: &str, sink: &mut dyn Sink) -> bool {
        let mapped = (self.transform)(value);
        let locator = locate(context, &self.target);
        match sink.resolve(&locator) {
            Some(slot) => {
                trace!(target: "fieldmap.rule", %locator, value = %mapped, "write");
                slot.write(&mapped);
                true
            }
            None => {
                warn!(target: "fieldmap.rule", %locator, kind = "direct", "target did not resolve");
                false
            }
        }
    }
}

/// Writes `transform(value)` when `predicate(value)` holds, otherwise a
/// fixed default.
#[derive(Clone)]
pub struct ValidatedRule {
    target: String,
    default: String,
    predicate: Predicate,
    transform: Transform,
}

impl ValidatedRule {
    /// A rule that accepts any present, non-null value and stringifies it,
    /// falling back to `default`.
    pub fn new(target: impl Into<String>, default: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            default: default.into(),
            predicate: Arc::new(is_present),
            transform: Arc::new(stringify),
        }
    }

    /// Replaces the validation predicate.
    #[must_use]
    pub fn with_predicate<F>(mut self, predicate: F) -> Self
    where
        F: Fn(Option<&Value>) -> bool + Send + Sync + 'static,
    {
        self.predicate = Arc::new(predicate);
        self
    }

    /// Replaces the value transform.
    #[must_use]
    pub fn with_transform<F>(mut self, transform: F) -> Self
    where
        F: Fn(Option<&Value>) -> String + Send + Sync + 'static,
    {
        self.transform = Arc::new(transform);
        self
    }

    /// Target selector.
    #[must_use]
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Value written when validation fails.
    #[must_use]
    pub fn default_value(&self) -> &str {
        &self.default
    }

    /// Returns `true` whenever a write happened, whichever branch produced it.
    fn invoke(&self, value: Option<&Value>, context: &str, sink: &mut dyn Sink) -> bool {
        let locator = locate(context, &self.target);
        let Some(slot) = sink.resolve(&locator) else {
            warn!(target: "fieldmap.rule", %locator, kind = "validated", "target did not resolve");
            return false;
        };
        if (self.predicate)(value) {
            let mapped = (self.transform)(value);
            trace!(target: "fieldmap.rule", %locator, value = %mapped, "write");
            slot.write(&mapped);
        } else {
            trace!(target: "fieldmap.rule", %locator, value = %self.default, "write default");
            slot.write(&self.default);
        }
        true
    }
}

/// Hands the whole write to a caller-supplied function.
#[derive(Clone)]
pub struct CustomRule {
    target: String,
    func: CustomFn,
}

impl CustomRule {
    /// Wraps `func`, which receives `(value, target, context, sink)`.
    pub fn new<F>(target: impl Into<String>, func: F) -> Self
    where
        F: Fn(Option<&Value>, &str, &str, &mut dyn Sink) -> bool + Send + Sync + 'static,
    {
        Self {
            target: target.into(),
            func: Arc::new(func),
        }
    }

    /// Target selector passed to the function.
    #[must_use]
    pub fn target(&self) -> &str {
        &self.target
    }

    fn invoke(&self, value: Option<&Value>, context: &str, sink: &mut dyn Sink) -> bool {
        (self.func)(value, &self.target, context, sink)
    }
}

/// Maps a nested object with its own engine.
#[derive(Clone)]
pub struct NestedRule {
    engine: Box<MappingEngine>,
}

impl NestedRule {
    /// Takes ownership of the child engine.
    #[must_use]
    pub fn new(engine: MappingEngine) -> Self {
        Self {
            engine: Box::new(engine),
        }
    }

    /// The child engine.
    #[must_use]
    pub fn engine(&self) -> &MappingEngine {
        &self.engine
    }

    fn invoke(&self, value: Option<&Value>, context: &str, sink: &mut dyn Sink) -> bool {
        self.engine
            .map(value.unwrap_or(&Value::Null), context, sink)
    }
}

// ── MappingRule ─────────────────────────────────────────────────────────

/// A strategy converting one source field into one sink write.
#[derive(Clone)]
pub enum MappingRule {
    /// Transform and write.
    Direct(DirectRule),
    /// Validate, then write the transformed value or a default.
    Validated(ValidatedRule),
    /// Delegate the write entirely.
    Custom(CustomRule),
    /// Recurse into a nested object.
    Nested(NestedRule),
}

impl MappingRule {
    /// Shorthand for a default [`DirectRule`].
    pub fn direct(target: impl Into<String>) -> Self {
        Self::Direct(DirectRule::new(target))
    }

    /// Shorthand for a default [`ValidatedRule`].
    pub fn validated(target: impl Into<String>, default: impl Into<String>) -> Self {
        Self::Validated(ValidatedRule::new(target, default))
    }

    /// Shorthand for a [`CustomRule`].
    pub fn custom<F>(target: impl Into<String>, func: F) -> Self
    where
        F: Fn(Option<&Value>, &str, &str, &mut dyn Sink) -> bool + Send + Sync + 'static,
    {
        Self::Custom(CustomRule::new(target, func))
    }

    /// Shorthand for a [`NestedRule`].
    #[must_use]
    pub fn nested(engine: MappingEngine) -> Self {
        Self::Nested(NestedRule::new(engine))
    }

    /// Which variant this is.
    #[must_use]
    pub fn kind(&self) -> RuleKind {
        match self {
            Self::Direct(_) => RuleKind::Direct,
            Self::Validated(_) => RuleKind::Validated,
            Self::Custom(_) => RuleKind::Custom,
            Self::Nested(_) => RuleKind::Nested,
        }
    }

    /// Target selector, if the variant has one.
    #[must_use]
    pub fn target(&self) -> Option<&str> {
        match self {
            Self::Direct(r) => Some(r.target()),
            Self::Validated(r) => Some(r.target()),
            Self::Custom(r) => Some(r.target()),
            Self::Nested(_) => None,
        }
    }

    /// Applies the rule to `value` and reports whether the write succeeded.
    ///
    /// `context` is joined with the rule's target selector to form the
    /// locator handed to `sink`.
    pub fn invoke(&self, value: Option<&Value>, context: &str, sink: &mut dyn Sink) -> bool {
        match self {
            Self::Direct(r) => r.invoke(value, context, sink),
            Self::Validated(r) => r.invoke(value, context, sink),
            Self::Custom(r) => r.invoke(value, context, sink),
            Self::Nested(r) => r.invoke(value, context, sink),
        }
    }
}

impl fmt::Debug for MappingRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Direct(r) => f
                .debug_struct("Direct")
                .field("target", &r.target)
                .finish_non_exhaustive(),
            Self::Validated(r) => f
                .debug_struct("Validated")
                .field("target", &r.target)
                .field("default", &r.default)
                .finish_non_exhaustive(),
            Self::Custom(r) => f
                .debug_struct("Custom")
                .field("target", &r.target)
                .finish_non_exhaustive(),
            Self::Nested(r) => f.debug_tuple("Nested").field(&r.engine).finish(),
        }
    }
}

impl From<DirectRule> for MappingRule {
    fn from(rule: DirectRule) -> Self {
        Self::Direct(rule)
    }
}

impl From<ValidatedRule> for MappingRule {
    fn from(rule: ValidatedRule) -> Self {
        Self::Validated(rule)
    }
}

impl From<CustomRule> for MappingRule {
    fn from(rule: CustomRule) -> Self {
        Self::Custom(rule)
    }
}

impl From<NestedRule> for MappingRule {
    fn from(rule: NestedRule) -> Self {
        Self::Nested(rule)
    }
}

// ── Tests ───────────────────────────────────────────────────────────────
