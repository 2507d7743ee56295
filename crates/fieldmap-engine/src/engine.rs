// SPDX-License-Identifier: MIT OR Apache-2.0
//! The mapping engine: group selection, dispatch and aggregation.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use fieldmap_sink::Sink;
use serde_json::Value;
use tracing::debug;

use crate::error::MapError;
use crate::group::{GroupBuilder, MappingGroup};
use crate::report::{MapReport, RuleOutcome};
use crate::value::{group_key, kind_name};

/// Name of the group whose rules apply to every object, unless overridden
/// with [`MappingEngine::with_default_group_name`].
pub const DEFAULT_GROUP: &str = "any";

type Accessor = Arc<dyn Fn(&Value) -> Option<String> + Send + Sync>;

#[derive(Clone)]
enum Discriminator {
    Field(String),
    Accessor { name: String, read: Accessor },
}

impl Discriminator {
    fn name(&self) -> &str {
        match self {
            Self::Field(name) | Self::Accessor { name, .. } => name,
        }
    }
}

impl fmt::Debug for Discriminator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field(name) => f.debug_tuple("Field").field(name).finish(),
            Self::Accessor { name, .. } => f
                .debug_struct("Accessor")
                .field("name", name)
                .finish_non_exhaustive(),
        }
    }
}

// ── MappingEngine ───────────────────────────────────────────────────────

/// Maps objects onto a [`Sink`] using rule groups chosen by a discriminator.
///
/// Configure with [`new_group`](Self::new_group) /
/// [`default_group`](Self::default_group), then call [`map`](Self::map) as
/// often as needed. Mapping only borrows the engine immutably.
#[derive(Debug, Clone)]
pub struct MappingEngine {
    discriminator: Discriminator,
    default_group: String,
    groups: BTreeMap<String, MappingGroup>,
}

impl MappingEngine {
    /// Creates an engine that selects groups by the value of `field`.
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            discriminator: Discriminator::Field(field.into()),
            default_group: DEFAULT_GROUP.to_owned(),
            groups: BTreeMap::new(),
        }
    }

    /// Creates an engine that selects groups with a caller-supplied accessor.
    ///
    /// `name` only labels the discriminator in errors and logs. Returning
    /// `None` from `read` makes the object unmappable.
    pub fn with_accessor<F>(name: impl Into<String>, read: F) -> Self
    where
        F: Fn(&Value) -> Option<String> + Send + Sync + 'static,
    {
        Self {
            discriminator: Discriminator::Accessor {
                name: name.into(),
                read: Arc::new(read),
            },
            default_group: DEFAULT_GROUP.to_owned(),
            groups: BTreeMap::new(),
        }
    }

    /// Uses `token` instead of [`DEFAULT_GROUP`] as the default group's name.
    #[must_use]
    pub fn with_default_group_name(mut self, token: impl Into<String>) -> Self {
        self.default_group = token.into();
        self
    }

    /// Discriminator field name (or accessor label).
    #[must_use]
    pub fn discriminator(&self) -> &str {
        self.discriminator.name()
    }

    /// Name of the always-applied group.
    #[must_use]
    pub fn default_group_name(&self) -> &str {
        &self.default_group
    }

    // ── Configuration ───────────────────────────────────────────────────

    /// Starts `name` as a fresh, empty group (dropping any previous group of
    /// that name) and returns a builder bound to it.
    pub fn new_group(&mut self, name: impl Into<String>) -> GroupBuilder<'_> {
        let name = name.into();
        let group = self.groups.entry(name.clone()).or_default();
        group.clear();
        GroupBuilder::new(name, group)
    }

    /// Returns a builder for `name`, creating the group if needed but keeping
    /// any rules it already has.
    pub fn group(&mut self, name: impl Into<String>) -> GroupBuilder<'_> {
        let name = name.into();
        let group = self.groups.entry(name.clone()).or_default();
        GroupBuilder::new(name, group)
    }

    /// Returns a builder for the default group, creating it if needed.
    pub fn default_group(&mut self) -> GroupBuilder<'_> {
        let name = self.default_group.clone();
        self.group(name)
    }

    /// Expression-style [`new_group`](Self::new_group).
    #[must_use]
    pub fn with_group<F>(mut self, name: impl Into<String>, build: F) -> Self
    where
        F: for<'g> FnOnce(GroupBuilder<'g>) -> GroupBuilder<'g>,
    {
        build(self.new_group(name));
        self
    }

    /// Expression-style [`default_group`](Self::default_group).
    #[must_use]
    pub fn with_default_group<F>(mut self, build: F) -> Self
    where
        F: for<'g> FnOnce(GroupBuilder<'g>) -> GroupBuilder<'g>,
    {
        build(self.default_group());
        self
    }

    /// Removes a whole group.
    pub fn remove_group(&mut self, name: &str) -> Option<MappingGroup> {
        self.groups.remove(name)
    }

    // ── Inspection ──────────────────────────────────────────────────────

    /// The group called `name`, if it exists.
    #[must_use]
    pub fn get_group(&self, name: &str) -> Option<&MappingGroup> {
        self.groups.get(name)
    }

    /// Group names in lexical order.
    pub fn group_names(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    /// Total number of rules across all groups (nested engines not counted).
    #[must_use]
    pub fn rule_count(&self) -> usize {
        self.groups.values().map(MappingGroup::len).sum()
    }

    // ── Invocation ──────────────────────────────────────────────────────

    /// Maps `object` into `sink`, returning `true` only if every applicable
    /// rule succeeded.
    ///
    /// Returns `false` without running anything when the object is null,
    /// lacks a usable discriminator, or matches no group while no default
    /// group exists.
    pub fn map(&self, object: &Value, context: &str, sink: &mut dyn Sink) -> bool {
        self.try_map(object, context, sink).is_ok_and(|report| report.success)
    }

    /// Like [`map`](Self::map), but explains the outcome.
    ///
    /// Rule-level failures are reported inside the [`MapReport`]; `Err` is
    /// returned only when no rule could run at all.
    pub fn try_map(
        &self,
        object: &Value,
        context: &str,
        sink: &mut dyn Sink,
    ) -> Result<MapReport, MapError> {
        if object.is_null() {
            debug!(target: "fieldmap.engine", "refusing null object");
            return Err(MapError::NullObject);
        }
        let key = self.read_discriminator(object)?;
        let default = self.groups.get(&self.default_group);
        let selected = self.groups.get(&key);
        debug!(
            target: "fieldmap.engine",
            group = %key,
            default = default.is_some(),
            matched = selected.is_some(),
            "selecting groups"
        );

        let mut report = MapReport::new(key);
        let Some(default) = default else {
            let Some(group) = selected else {
                return Err(MapError::UnknownGroup { group: report.group });
            };
            let ok = self.run_group(
                &report.group,
                group,
                object,
                context,
                sink,
                &mut report.outcomes,
            );
            report.success = ok;
            return Ok(report);
        };

        // Both groups run unconditionally; their writes must happen even when
        // the overall result is already known to be false. A discriminator
        // naming the default group runs it a second time as the selected one.
        let default_ok = self.run_group(
            &self.default_group,
            default,
            object,
            context,
            sink,
            &mut report.outcomes,
        );
        let selected_ok = if let Some(group) = selected {
            self.run_group(
                &report.group,
                group,
                object,
                context,
                sink,
                &mut report.outcomes,
            )
        } else {
            report.group_missing = true;
            false
        };
        report.success = default_ok && selected_ok;
        Ok(report)
    }

    /// Runs every rule of the group called `name` against `object`.
    ///
    /// Returns `false` (running nothing) if the group does not exist; an
    /// empty group succeeds.
    pub fn invoke_group(
        &self,
        name: &str,
        object: &Value,
        context: &str,
        sink: &mut dyn Sink,
    ) -> bool {
        match self.groups.get(name) {
            Some(group) => self.run_group(name, group, object, context, sink, &mut Vec::new()),
            None => false,
        }
    }

    fn read_discriminator(&self, object: &Value) -> Result<String, MapError> {
        match &self.discriminator {
            Discriminator::Field(field) => match object.get(field.as_str()) {
                None | Some(Value::Null) => Err(MapError::MissingDiscriminator {
                    field: field.clone(),
                }),
                Some(value) => group_key(value).ok_or_else(|| MapError::InvalidDiscriminator {
                    field: field.clone(),
                    kind: kind_name(value).to_owned(),
                }),
            },
            Discriminator::Accessor { name, read } => {
                read(object).ok_or_else(|| MapError::MissingDiscriminator {
                    field: name.clone(),
                })
            }
        }
        .inspect_err(|err| debug!(target: "fieldmap.engine", %err, "object not mappable"))
    }

    fn run_group(
        &self,
        name: &str,
        group: &MappingGroup,
        object: &Value,
        context: &str,
        sink: &mut dyn Sink,
        outcomes: &mut Vec<RuleOutcome>,
    ) -> bool {
        let mut all_ok = true;
        for (field, rule) in group {
            let ok = rule.invoke(object.get(field.as_str()), context, sink);
            debug!(
                target: "fieldmap.engine",
                group = name,
                field = %field,
                kind = %rule.kind(),
                ok,
                "rule invoked"
            );
            outcomes.push(RuleOutcome {
                group: name.to_owned(),
                field: field.clone(),
                kind: rule.kind(),
                success: ok,
            });
            all_ok &= ok;
        }
        all_ok
    }
}
