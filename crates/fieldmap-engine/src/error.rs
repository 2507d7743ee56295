// SPDX-License-Identifier: MIT OR Apache-2.0
//! Reasons an object could not be mapped at all.

use serde::{Deserialize, Serialize};

/// Why [`MappingEngine::try_map`](crate::MappingEngine::try_map) refused an
/// object before (or instead of) running any rule.
///
/// Individual rule failures are not errors; they are reported as
/// [`RuleOutcome`](crate::RuleOutcome)s inside a [`MapReport`](crate::MapReport).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MapError {
    /// The object itself was null.
    #[error("object to map is null")]
    NullObject,
    /// The object has no usable discriminator field.
    #[error("object has no discriminator field `{field}`")]
    MissingDiscriminator {
        /// Name of the discriminator field.
        field: String,
    },
    /// The discriminator holds a value that cannot name a group.
    #[error("discriminator `{field}` has type {kind}; expected a string, number or boolean")]
    InvalidDiscriminator {
        /// Name of the discriminator field.
        field: String,
        /// JSON type that was found.
        kind: String,
    },
    /// Neither a matching group nor a default group exists.
    #[error("no mapping group `{group}` and no default group")]
    UnknownGroup {
        /// Group name derived from the discriminator.
        group: String,
    },
}

impl MapError {
    /// Stable machine-readable code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::NullObject => "NULL_OBJECT",
            Self::MissingDiscriminator { .. } => "MISSING_DISCRIMINATOR",
            Self::InvalidDiscriminator { .. } => "INVALID_DISCRIMINATOR",
            Self::UnknownGroup { .. } => "UNKNOWN_GROUP",
        }
    }
}
