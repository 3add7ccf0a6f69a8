//! Membership bookkeeping: current set, pending set and per-address slots.
//!
//! # Slot Invariant
//!
//! For every address with a non-`NonValidator` status, `status.index` names
//! the slot holding it: in the pending set for `PendingToBeAdded` and
//! `FinalizedValidator`, in the current set for `PendingToBeRemoved`.
//!
//! # Staging
//!
//! Changes are computed as a [`StagedChange`] against an untouched roster and
//! applied with [`Roster::commit`]. Until then nothing is visible, so a
//! declined proposal is discarded by dropping the staged value.
//!
//! # Swap-Remove
//!
//! Removal moves the last pending member into the vacated slot and shrinks
//! the set by one. Order is not preserved; the moved member's slot is
//! rewritten in the same step.

use std::collections::{HashMap, HashSet};

use thiserror::Error;
use warden_types::{Address, AddressStatus, Error, Result, ValidatorStatus, MIN_VALIDATORS};

/// Which way a staged change goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Addition,
    Removal,
}

/// A membership change computed but not yet applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedChange {
    kind: ChangeKind,
    validator: Address,
    pending: Vec<Address>,
    updates: Vec<(Address, AddressStatus)>,
}

impl StagedChange {
    pub fn kind(&self) -> ChangeKind {
        self.kind
    }

    /// The address being added or removed.
    pub fn validator(&self) -> Address {
        self.validator
    }

    /// Pending set as it will be after commit.
    pub fn pending(&self) -> &[Address] {
        &self.pending
    }
}

/// Current and pending sets with their status table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Roster {
    current: Vec<Address>,
    pending: Vec<Address>,
    /// Only addresses with a non-`NonValidator` status are stored.
    status: HashMap<Address, AddressStatus>,
    finalized: bool,
}

impl Roster {
    /// Build a roster where both sets equal `validators`.
    ///
    /// `validators` must be non-empty, null-free and duplicate-free.
    pub fn genesis(validators: Vec<Address>, finalized: bool) -> Result<Self> {
        if validators.len() < MIN_VALIDATORS {
            return Err(Error::EmptyValidatorSet);
        }

        let mut status = HashMap::with_capacity(validators.len());
        for (index, validator) in validators.iter().enumerate() {
            if validator.is_zero() {
                return Err(Error::ValidatorAddressZero);
            }
            let slot = AddressStatus::new(ValidatorStatus::FinalizedValidator, index);
            if status.insert(*validator, slot).is_some() {
                return Err(Error::DuplicateValidator(*validator));
            }
        }

        Ok(Self {
            current: validators.clone(),
            pending: validators,
            status,
            finalized,
        })
    }

    pub fn current(&self) -> &[Address] {
        &self.current
    }

    pub fn pending(&self) -> &[Address] {
        &self.pending
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Status of `address`, `NonValidator` at slot 0 when unknown.
    pub fn status(&self, address: Address) -> AddressStatus {
        self.status.get(&address).copied().unwrap_or(AddressStatus::NONE)
    }

    /// Stage appending `validator` to the pending set.
    pub fn stage_addition(&self, validator: Address) -> Result<StagedChange> {
        if !self.finalized {
            return Err(Error::NotFinalized);
        }
        if validator.is_zero() {
            return Err(Error::ValidatorAddressZero);
        }
        if matches!(
            self.status(validator).status,
            ValidatorStatus::FinalizedValidator | ValidatorStatus::PendingToBeRemoved
        ) {
            return Err(Error::ValidatorActive);
        }

        let mut pending = self.pending.clone();
        pending.push(validator);
        let slot = AddressStatus::new(ValidatorStatus::PendingToBeAdded, pending.len() - 1);

        Ok(StagedChange {
            kind: ChangeKind::Addition,
            validator,
            pending,
            updates: vec![(validator, slot)],
        })
    }

    /// Stage swap-removing `validator` from the pending set.
    pub fn stage_removal(&self, validator: Address) -> Result<StagedChange> {
        if !self.finalized {
            return Err(Error::NotFinalized);
        }
        let current = self.status(validator);
        if !current.is_in() {
            return Err(Error::NotActiveValidator);
        }
        if self.pending.len() <= MIN_VALIDATORS {
            return Err(Error::LastValidator);
        }

        let index = current.index;
        let mut pending = self.pending.clone();
        pending.swap_remove(index);

        let mut updates = Vec::with_capacity(2);
        // The former tail now sits at `index`, unless the tail was removed.
        if let Some(moved) = pending.get(index).copied() {
            let moved_status = self.status(moved).status;
            updates.push((moved, AddressStatus::new(moved_status, index)));
        }
        // The set was finalized, so the slot in the current set is the same.
        updates.push((
            validator,
            AddressStatus::new(ValidatorStatus::PendingToBeRemoved, index),
        ));

        Ok(StagedChange {
            kind: ChangeKind::Removal,
            validator,
            pending,
            updates,
        })
    }

    /// Apply a change staged against this roster.
    pub fn commit(&mut self, staged: StagedChange) {
        self.pending = staged.pending;
        for (address, slot) in staged.updates {
            self.status.insert(address, slot);
        }
        self.finalized = false;
    }

    /// Promote the pending set to current.
    pub fn finalize(&mut self) -> Result<&[Address]> {
        if self.finalized {
            return Err(Error::AlreadyFinalized);
        }

        for outgoing in &self.current {
            if self.status(*outgoing).status == ValidatorStatus::PendingToBeRemoved {
                self.status.remove(outgoing);
            }
        }
        for incoming in &self.pending {
            if let Some(slot) = self.status.get_mut(incoming) {
                if slot.status == ValidatorStatus::PendingToBeAdded {
                    slot.status = ValidatorStatus::FinalizedValidator;
                }
            }
        }

        self.current = self.pending.clone();
        self.finalized = true;
        Ok(&self.current)
    }

    /// Check every structural invariant of the roster.
    pub fn verify(&self) -> std::result::Result<(), InvariantViolation> {
        if self.current.len() < MIN_VALIDATORS || self.pending.len() < MIN_VALIDATORS {
            return Err(InvariantViolation::BelowMinimum {
                current: self.current.len(),
                pending: self.pending.len(),
            });
        }

        let current: HashSet<_> = self.current.iter().copied().collect();
        let pending: HashSet<_> = self.pending.iter().copied().collect();
        if current.len() != self.current.len() || pending.len() != self.pending.len() {
            return Err(InvariantViolation::Duplicate);
        }

        if self.finalized && self.current != self.pending {
            return Err(InvariantViolation::FinalizedMismatch);
        }

        for (&address, slot) in &self.status {
            let (set, in_current, in_pending) = match slot.status {
                ValidatorStatus::NonValidator => {
                    return Err(InvariantViolation::StoredNonValidator(address));
                }
                ValidatorStatus::PendingToBeAdded => (&self.pending, false, true),
                ValidatorStatus::FinalizedValidator => (&self.pending, true, true),
                ValidatorStatus::PendingToBeRemoved => (&self.current, true, false),
            };
            if set.get(slot.index) != Some(&address) {
                return Err(InvariantViolation::StaleIndex {
                    address,
                    index: slot.index,
                });
            }
            if current.contains(&address) != in_current || pending.contains(&address) != in_pending {
                return Err(InvariantViolation::StatusMismatch {
                    address,
                    status: slot.status,
                });
            }
        }

        for address in current.union(&pending) {
            if !self.status.contains_key(address) {
                return Err(InvariantViolation::Untracked(*address));
            }
        }

        Ok(())
    }
}

/// A broken roster invariant. Never produced by a correct roster.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("set below minimum size (current {current}, pending {pending})")]
    BelowMinimum { current: usize, pending: usize },

    #[error("an address appears twice in one set")]
    Duplicate,

    #[error("finalized flag set while current and pending sets differ")]
    FinalizedMismatch,

    #[error("{0} stored with NonValidator status")]
    StoredNonValidator(Address),

    #[error("{address} does not sit at slot {index}")]
    StaleIndex { address: Address, index: usize },

    #[error("{address} has status {status} but set membership disagrees")]
    StatusMismatch {
        address: Address,
        status: ValidatorStatus,
    },

    #[error("{0} is a member without a status entry")]
    Untracked(Address),
}
