//! Per-address membership status.

use serde::{Deserialize, Serialize};

/// Where an address stands relative to the current and pending sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidatorStatus {
    /// Not part of any set.
    #[default]
    NonValidator,
    /// In the pending set, not yet in the current set.
    PendingToBeAdded,
    /// In both sets.
    FinalizedValidator,
    /// In the current set, already dropped from the pending set.
    PendingToBeRemoved,
}

impl std::fmt::Display for ValidatorStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NonValidator => write!(f, "NonValidator"),
            Self::PendingToBeAdded => write!(f, "PendingToBeAdded"),
            Self::FinalizedValidator => write!(f, "FinalizedValidator"),
            Self::PendingToBeRemoved => write!(f, "PendingToBeRemoved"),
        }
    }
}

/// Status plus the slot the address occupies.
///
/// `index` points into the pending set for `PendingToBeAdded` and
/// `FinalizedValidator`, into the current set for `PendingToBeRemoved`,
/// and is 0 for `NonValidator`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AddressStatus {
    pub status: ValidatorStatus,
    pub index: usize,
}

impl AddressStatus {
    /// The status of an unknown address.
    pub const NONE: Self = Self {
        status: ValidatorStatus::NonValidator,
        index: 0,
    };

    /// Status `status` at slot `index`.
    pub const fn new(status: ValidatorStatus, index: usize) -> Self {
        Self { status, index }
    }

    /// Member of the pending set.
    pub fn is_in(&self) -> bool {
        matches!(
            self.status,
            ValidatorStatus::PendingToBeAdded | ValidatorStatus::FinalizedValidator
        )
    }

    /// Part of the outstanding change.
    pub fn is_pending(&self) -> bool {
        matches!(
            self.status,
            ValidatorStatus::PendingToBeAdded | ValidatorStatus::PendingToBeRemoved
        )
    }
}
