//! Construction parameters for a logic instance.

use warden_types::{Address, GenesisConfig};

/// Configuration for a [`ValidatorSetLogic`](crate::ValidatorSetLogic).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicConfig {
    /// Identity of this logic. The facade's proposal gateway only accepts
    /// callbacks from the logic it currently forwards to.
    pub address: Address,

    /// Owner allowed to add and remove validators.
    pub owner: Address,

    /// The facade trusted to forward finalize and reports.
    pub facade: Address,

    /// Initial validator set. Becomes both the current and pending set.
    pub initial_validators: Vec<Address>,

    /// Whether the initial set starts finalized. When `false` the driver has
    /// to finalize it before the first add or remove.
    pub finalized: bool,
}

impl LogicConfig {
    /// A config whose initial set still awaits a finalize.
    #[must_use]
    pub fn new(
        address: Address,
        owner: Address,
        facade: Address,
        initial_validators: Vec<Address>,
    ) -> Self {
        Self {
            address,
            owner,
            facade,
            initial_validators,
            finalized: false,
        }
    }

    /// Derive the logic's config from deployment parameters.
    #[must_use]
    pub fn from_genesis(genesis: &GenesisConfig) -> Self {
        Self::new(
            genesis.logic,
            genesis.owner,
            genesis.facade,
            genesis.validators.clone(),
        )
        .with_finalized(genesis.finalized)
    }

    /// Start with the initial set already active.
    #[must_use]
    pub fn finalized_at_genesis(self) -> Self {
        self.with_finalized(true)
    }

    /// Set whether the initial set starts finalized.
    #[must_use]
    pub fn with_finalized(mut self, finalized: bool) -> Self {
        self.finalized = finalized;
        self
    }

    /// Trust a different facade.
    #[must_use]
    pub fn with_facade(mut self, facade: Address) -> Self {
        self.facade = facade;
        self
    }
}
