//! Notifications emitted by the coordinator.
//!
//! Records are collected per call in an [`EventLog`] and handed back to the
//! host only when the call commits. A call that fails returns no log.

use serde::{Deserialize, Serialize};

use crate::{Address, Height, ParentRef};

/// Structured notification records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    /// The pending set became current.
    ChangeFinalized { validator_set: Vec<Address> },

    /// A new set was proposed to the driver.
    InitiateChange {
        parent_ref: ParentRef,
        new_set: Vec<Address>,
    },

    /// A validator reported another for misbehaviour with evidence.
    ReportedMalicious {
        reporter: Address,
        reported: Address,
        height: Height,
        proof: Vec<u8>,
    },

    /// A validator reported another for a benign fault.
    ReportedBenign {
        reporter: Address,
        reported: Address,
        height: Height,
    },

    /// The logic's trusted facade changed.
    NewFacade { old: Address, new: Address },

    /// The facade now forwards to a different logic.
    NewLogic { old: Address, new: Address },

    /// The facade's driver changed.
    NewDriver { old: Address, new: Address },

    /// Owner capability moved. `new` is `None` after renouncing.
    OwnershipTransferred {
        previous: Option<Address>,
        new: Option<Address>,
    },
}

impl Event {
    /// Short name of the record, as observers filter on it.
    pub fn name(&self) -> &'static str {
        match self {
            Event::ChangeFinalized { .. } => "ChangeFinalized",
            Event::InitiateChange { .. } => "InitiateChange",
            Event::ReportedMalicious { .. } => "ReportedMalicious",
            Event::ReportedBenign { .. } => "ReportedBenign",
            Event::NewFacade { .. } => "NewFacade",
            Event::NewLogic { .. } => "NewLogic",
            Event::NewDriver { .. } => "NewDriver",
            Event::OwnershipTransferred { .. } => "OwnershipTransferred",
        }
    }
}

/// A record together with the component that emitted it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub emitter: Address,
    #[serde(flatten)]
    pub event: Event,
}

/// Ordered records produced by one call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventLog {
    entries: Vec<LogEntry>,
}

impl EventLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record.
    pub fn emit(&mut self, emitter: Address, event: Event) {
        self.entries.push(LogEntry { emitter, event });
    }

    /// Append every record of `other`, keeping order.
    pub fn extend(&mut self, other: EventLog) {
        self.entries.extend(other.entries);
    }

    /// All records in emission order.
    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    /// Records emitted by `emitter`.
    pub fn emitted_by(&self, emitter: Address) -> impl Iterator<Item = &Event> {
        self.entries
            .iter()
            .filter(move |e| e.emitter == emitter)
            .map(|e| &e.event)
    }

    /// Records with the given name.
    pub fn named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a LogEntry> {
        self.entries.iter().filter(move |e| e.event.name() == name)
    }

    /// First record, if any.
    pub fn first(&self) -> Option<&LogEntry> {
        self.entries.first()
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl IntoIterator for EventLog {
    type Item = LogEntry;
    type IntoIter = std::vec::IntoIter<LogEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
