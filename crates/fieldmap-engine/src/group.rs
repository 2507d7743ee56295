// SPDX-License-Identifier: MIT OR Apache-2.0
//! Rule groups and the group-scoped builder used to fill them.

use fieldmap_sink::Sink;
use fieldmap_store::OrderedStore;
use serde_json::Value;

use crate::MappingEngine;
use crate::rule::{CustomRule, DirectRule, MappingRule, ValidatedRule};

/// Rules of one group, keyed by the source field they read.
pub type MappingGroup = OrderedStore<String, MappingRule>;

/// Appends rules to a single group.
///
/// Returned by [`MappingEngine::new_group`], [`MappingEngine::group`] and
/// [`MappingEngine::default_group`]. The builder is bound to its group for
/// its whole lifetime, so rules can never land in a different group.
#[derive(Debug)]
pub struct GroupBuilder<'a> {
    name: String,
    group: &'a mut MappingGroup,
}

impl<'a> GroupBuilder<'a> {
    pub(crate) fn new(name: String, group: &'a mut MappingGroup) -> Self {
        Self { name, group }
    }

    /// Name of the group being built.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of rules in the group so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.group.len()
    }

    /// Returns `true` if the group has no rules yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.group.is_empty()
    }

    /// Adds an arbitrary rule for `field`.
    pub fn with_rule(self, field: impl Into<String>, rule: impl Into<MappingRule>) -> Self {
        self.group.add(field.into(), rule.into());
        self
    }

    /// Copies `field`, stringified, to `target`.
    pub fn with_direct_mapping(self, field: impl Into<String>, target: impl Into<String>) -> Self {
        self.with_rule(field, DirectRule::new(target))
    }

    /// Copies `transform(field)` to `target`.
    pub fn with_direct_mapping_using<F>(
        self,
        field: impl Into<String>,
        target: impl Into<String>,
        transform: F,
    ) -> Self
    where
        F: Fn(Option<&Value>) -> String + Send + Sync + 'static,
    {
        self.with_rule(field, DirectRule::new(target).with_transform(transform))
    }

    /// Copies `field` to `target` when it is present and non-null, otherwise
    /// writes `default`.
    pub fn with_validated_mapping(
        self,
        field: impl Into<String>,
        target: impl Into<String>,
        default: impl Into<String>,
    ) -> Self {
        self.with_rule(field, ValidatedRule::new(target, default))
    }

    /// Writes `transform(field)` to `target` when `predicate(field)` holds,
    /// otherwise `default`.
    pub fn with_validated_mapping_using<P, F>(
        self,
        field: impl Into<String>,
        target: impl Into<String>,
        default: impl Into<String>,
        predicate: P,
        transform: F,
    ) -> Self
    where
        P: Fn(Option<&Value>) -> bool + Send + Sync + 'static,
        F: Fn(Option<&Value>) -> String + Send + Sync + 'static,
    {
        self.with_rule(
            field,
            ValidatedRule::new(target, default)
                .with_predicate(predicate)
                .with_transform(transform),
        )
    }

    /// Lets `func` perform the whole write for `field`.
    pub fn with_custom_mapping<F>(
        self,
        field: impl Into<String>,
        target: impl Into<String>,
        func: F,
    ) -> Self
    where
        F: Fn(Option<&Value>, &str, &str, &mut dyn Sink) -> bool + Send + Sync + 'static,
    {
        self.with_rule(field, CustomRule::new(target, func))
    }

    /// Maps the object held in `field` with `engine`.
    pub fn with_nested_mapping(self, field: impl Into<String>, engine: MappingEngine) -> Self {
        self.with_rule(field, MappingRule::nested(engine))
    }
}
