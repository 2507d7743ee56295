// SPDX-License-Identifier: MIT OR Apache-2.0
#![doc = include_str!("../README.md")]
#![deny(unsafe_code)]
#![warn(missing_docs)]

mod engine;
mod error;
mod group;
mod report;
pub mod rule;
pub mod value;

pub use engine::{DEFAULT_GROUP, MappingEngine};
pub use error::MapError;
pub use group::{GroupBuilder, MappingGroup};
pub use report::{MapReport, RuleOutcome};
pub use rule::{MappingRule, RuleKind};
