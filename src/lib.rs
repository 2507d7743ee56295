// SPDX-License-Identifier: MIT OR Apache-2.0
#![doc = include_str!("../README.md")]
#![deny(unsafe_code)]
#![warn(missing_docs)]

/// Insertion-ordered associative storage.
pub use fieldmap_store as store;

/// Sink and slot capabilities plus the in-memory sink.
pub use fieldmap_sink as sink;

/// Rules, groups and the mapping engine.
pub use fieldmap_engine as engine;

/// TOML configuration and engine construction.
pub use fieldmap_config as config;

pub use fieldmap_config::{MapperConfig, build_engine, load_config};
pub use fieldmap_engine::{MapError, MapReport, MappingEngine, MappingRule, RuleKind};
pub use fieldmap_sink::{MemorySink, Sink, Slot};
pub use fieldmap_store::OrderedStore;
