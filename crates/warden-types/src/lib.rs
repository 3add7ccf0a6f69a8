//! Warden Shared Model
//!
//! Identities, membership status, notification records and the component
//! seam shared by the Warden facade and its replaceable logic.
//!
//! # Membership Status
//!
//! Every address carries a [`ValidatorStatus`] and a slot index:
//! - `NonValidator` → in no set
//! - `PendingToBeAdded` → pending set only
//! - `FinalizedValidator` → both sets
//! - `PendingToBeRemoved` → current set only
//!
//! # Calls and Records
//!
//! The host hands each call a [`CallContext`] (authenticated caller, height,
//! parent reference). Components answer with an [`EventLog`] on success and
//! an [`Error`] otherwise. Nothing is recorded for a failed call.

mod address;
mod context;
mod error;
mod event;
mod genesis;
mod logic;
mod ownership;
mod status;

pub use address::{Address, Height, ParentRef, ADDRESS_LEN};
pub use context::CallContext;
pub use error::{Error, ErrorCategory, Result};
pub use event::{Event, EventLog, LogEntry};
pub use genesis::GenesisConfig;
pub use logic::{ProposalOutcome, ProposalSink, ValidatorLogic};
pub use ownership::Ownership;
pub use status::{AddressStatus, ValidatorStatus};

/// Smallest number of validators a set may hold.
pub const MIN_VALIDATORS: usize = 1;
