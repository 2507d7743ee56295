// SPDX-License-Identifier: MIT OR Apache-2.0
//! Per-rule outcomes of a mapping run.

use serde::{Deserialize, Serialize};

use crate::rule::RuleKind;

/// Outcome of invoking one rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleOutcome {
    /// Group the rule belongs to.
    pub group: String,
    /// Source field the rule read.
    pub field: String,
    /// Rule variant.
    pub kind: RuleKind,
    /// Whether the rule reported success.
    pub success: bool,
}

/// Everything that happened during one [`MappingEngine::try_map`](crate::MappingEngine::try_map) call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapReport {
    /// Group name derived from the object's discriminator.
    pub group: String,
    /// `true` when the default group ran but no group matched the discriminator.
    pub group_missing: bool,
    /// Outcomes in invocation order: default group first, then the selected group.
    pub outcomes: Vec<RuleOutcome>,
    /// Conjunction of every outcome (and `false` if the group was missing).
    pub success: bool,
}

impl MapReport {
    pub(crate) fn new(group: String) -> Self {
        Self {
            group,
            group_missing: false,
            outcomes: Vec::new(),
            success: true,
        }
    }

    /// Outcomes that reported failure.
    pub fn failures(&self) -> impl Iterator<Item = &RuleOutcome> {
        self.outcomes.iter().filter(|o| !o.success)
    }

    /// Outcomes recorded for `group`.
    pub fn outcomes_for<'a>(&'a self, group: &'a str) -> impl Iterator<Item = &'a RuleOutcome> {
        self.outcomes.iter().filter(move |o| o.group == group)
    }
}
