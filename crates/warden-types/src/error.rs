//! Error types for the Warden coordinator.
//!
//! Every failure is local and synchronous. A call that returns an error has
//! changed nothing and emitted nothing.

use thiserror::Error;

/// Result type for Warden operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Broad classes of failure, distinguishable by callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Wrong caller for the operation.
    Capability,
    /// The operation's inputs or the current state forbid it.
    Precondition,
    /// The proposal callback declined an otherwise valid change.
    Coordination,
}

/// Errors that can occur while operating the coordinator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Caller is not the owner.
    #[error("caller is not the owner")]
    NotOwner,

    /// Caller is not the trusted facade.
    #[error("caller is not the facade")]
    NotFacade,

    /// Caller is not the driver.
    #[error("caller is not the driver")]
    NotDriver,

    /// Proposal callback invoked by something other than the current logic.
    #[error("caller is not the current logic")]
    NotLogic,

    /// A validator identity was the null sentinel.
    #[error("validator address cannot be zero")]
    ValidatorAddressZero,

    /// A facade identity was the null sentinel.
    #[error("facade address cannot be zero")]
    FacadeAddressZero,

    /// A logic identity was the null sentinel.
    #[error("logic address cannot be zero")]
    LogicAddressZero,

    /// Some other identity (owner, driver) was the null sentinel.
    #[error("address cannot be zero")]
    AddressZero,

    /// Validator is already active or on its way out.
    #[error("validator is already active")]
    ValidatorActive,

    /// The initial validator list contains the same identity twice.
    #[error("duplicate validator in initial set: {0}")]
    DuplicateValidator(crate::Address),

    /// A change is outstanding.
    #[error("validator set is not finalized yet")]
    NotFinalized,

    /// Nothing to finalize.
    #[error("validator set is already finalized")]
    AlreadyFinalized,

    /// Identity is not a member of the relevant set.
    #[error("address is not an active validator")]
    NotActiveValidator,

    /// Removing this member would leave no validators.
    #[error("cannot remove the last validator")]
    LastValidator,

    /// Coordinator constructed without validators.
    #[error("initial validator set cannot be empty")]
    EmptyValidatorSet,

    /// Report height is in the future.
    #[error("report height is in the future")]
    HeightNotValid,

    /// Facade replaced by itself.
    #[error("new facade address is the same as the current one")]
    SameFacade,

    /// Logic replaced by itself.
    #[error("new logic address is the same as the current one")]
    SameLogic,

    /// A logic handed to a facade trusts a different facade.
    #[error("logic trusts facade {trusted}, not {facade}")]
    FacadeMismatch {
        facade: crate::Address,
        trusted: crate::Address,
    },

    /// Driver replaced by itself.
    #[error("new driver address is the same as the current one")]
    SameDriver,

    /// The proposal callback declined the new set.
    #[error("proposed validator set was rejected")]
    ProposalRejected,

    /// An address string could not be parsed.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// Configuration could not be loaded.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl Error {
    /// Which class of failure this is.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::NotOwner | Self::NotFacade | Self::NotDriver | Self::NotLogic => {
                ErrorCategory::Capability
            }
            Self::ProposalRejected => ErrorCategory::Coordination,
            _ => ErrorCategory::Precondition,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Config(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories() {
        assert_eq!(Error::NotOwner.category(), ErrorCategory::Capability);
        assert_eq!(Error::NotLogic.category(), ErrorCategory::Capability);
        assert_eq!(Error::ProposalRejected.category(), ErrorCategory::Coordination);
        assert_eq!(
            Error::FacadeMismatch {
                facade: crate::Address::from_low_u64(1),
                trusted: crate::Address::from_low_u64(2),
            }
            .category(),
            ErrorCategory::Precondition
        );
        assert_eq!(Error::NotFinalized.category(), ErrorCategory::Precondition);
        assert_eq!(Error::HeightNotValid.category(), ErrorCategory::Precondition);
        assert_eq!(Error::ProposalRejected.category(), ErrorCategory::Coordination);
    }

    #[test]
    fn reason_strings() {
        assert_eq!(Error::NotFinalized.to_string(), "validator set is not finalized yet");
        assert_eq!(Error::AlreadyFinalized.to_string(), "validator set is already finalized");
        assert_eq!(Error::NotActiveValidator.to_string(), "address is not an active validator");
    }
}
