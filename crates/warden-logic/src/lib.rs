//! Warden Validator-Set Logic
//!
//! The replaceable half of the coordinator. Holds the membership state and
//! enforces the propose/finalize protocol; the facade in front of it only
//! forwards calls and collects proposals.
//!
//! # Two Sets
//!
//! - **current** - the last finalized validator set
//! - **pending** - what `current` becomes at the next finalize
//!
//! The sets are equal whenever the logic is finalized. An add or remove
//! changes `pending` by exactly one member and clears the flag, and nothing
//! else may change until the driver finalizes.
//!
//! # Atomic Proposals
//!
//! Every change is staged first and offered to a [`ProposalSink`]. If the sink
//! declines or fails, the staged change is dropped and the logic looks as if
//! the call never happened.
//!
//! [`ProposalSink`]: warden_types::ProposalSink

mod config;
mod report;
mod roster;
mod validator_set;

pub use config::LogicConfig;
pub use report::{check_report, Report};
pub use roster::{ChangeKind, InvariantViolation, Roster, StagedChange};
pub use validator_set::ValidatorSetLogic;
