// SPDX-License-Identifier: MIT OR Apache-2.0
#![doc = include_str!("../README.md")]
#![deny(unsafe_code)]
#![warn(missing_docs)]

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::trace;

// ── Capability traits ───────────────────────────────────────────────────

/// A writable location inside a sink.
pub trait Slot {
    /// Stores `value` at this location, replacing whatever was there.
    fn write(&mut self, value: &str);
}

impl Slot for String {
    fn write(&mut self, value: &str) {
        value.clone_into(self);
    }
}

/// Resolves string locators to writable slots.
///
/// Resolution is synchronous and may fail; a `None` means the locator does
/// not address anything and no write must happen.
pub trait Sink {
    /// Looks up the slot addressed by `locator`.
    fn resolve(&mut self, locator: &str) -> Option<&mut dyn Slot>;
}

impl<S: Sink + ?Sized> Sink for &mut S {
    fn resolve(&mut self, locator: &str) -> Option<&mut dyn Slot> {
        (**self).resolve(locator)
    }
}

/// Joins an invocation context and a rule's target selector into a locator.
///
/// The two parts are separated by a single space; an empty part contributes
/// nothing, so `locate("", "#a")` is `"#a"`.
#[must_use]
pub fn locate(context: &str, selector: &str) -> String {
    match (context.is_empty(), selector.is_empty()) {
        (true, _) => selector.to_owned(),
        (false, true) => context.to_owned(),
        (false, false) => format!("{context} {selector}"),
    }
}

// ── MemorySink ──────────────────────────────────────────────────────────

/// A slot held by [`MemorySink`], keeping its full write history.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemorySlot {
    value: String,
    history: Vec<String>,
}

impl MemorySlot {
    /// Current value (empty until the first write).
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Every value written, oldest first.
    #[must_use]
    pub fn history(&self) -> &[String] {
        &self.history
    }

    /// Number of writes received.
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.history.len()
    }
}

impl Slot for MemorySlot {
    fn write(&mut self, value: &str) {
        value.clone_into(&mut self.value);
        self.history.push(value.to_owned());
    }
}

/// In-memory [`Sink`] whose slots are declared up front.
///
/// Resolving an undeclared locator fails unless the sink was built with
/// [`MemorySink::accept_all`], in which case slots are created on demand.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemorySink {
    slots: BTreeMap<String, MemorySlot>,
    #[serde(default)]
    accept_all: bool,
}

impl MemorySink {
    /// Creates a sink with no slots.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a sink with the given slots declared.
    #[must_use]
    pub fn with_slots<I, S>(locators: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut sink = Self::new();
        for locator in locators {
            sink.declare(locator);
        }
        sink
    }

    /// Creates a sink that resolves every locator, declaring slots lazily.
    #[must_use]
    pub fn accept_all() -> Self {
        Self {
            slots: BTreeMap::new(),
            accept_all: true,
        }
    }

    /// Declares an empty slot at `locator` if none exists yet.
    pub fn declare(&mut self, locator: impl Into<String>) {
        self.slots.entry(locator.into()).or_default();
    }

    /// Current value at `locator`, if the slot exists.
    #[must_use]
    pub fn value(&self, locator: &str) -> Option<&str> {
        self.slots.get(locator).map(MemorySlot::value)
    }

    /// The slot at `locator`, if declared.
    #[must_use]
    pub fn slot(&self, locator: &str) -> Option<&MemorySlot> {
        self.slots.get(locator)
    }

    /// Total number of writes across all slots.
    #[must_use]
    pub fn total_writes(&self) -> usize {
        self.slots.values().map(MemorySlot::write_count).sum()
    }

    /// Iterates declared slots in locator order.
    pub fn slots(&self) -> impl Iterator<Item = (&str, &MemorySlot)> {
        self.slots.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl Sink for MemorySink {
    fn resolve(&mut self, locator: &str) -> Option<&mut dyn Slot> {
        if self.accept_all {
            return Some(self.slots.entry(locator.to_owned()).or_default());
        }
        match self.slots.get_mut(locator) {
            Some(slot) => Some(slot),
            None => {
                trace!(target: "fieldmap.sink", locator, "unresolved locator");
                None
            }
        }
    }
}

// ── Tests ───────────────────────────────────────────────────────────────
