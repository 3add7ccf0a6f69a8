//! Facade configuration.

use warden_types::{Address, GenesisConfig};

/// Configuration for a [`Facade`](crate::Facade).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacadeConfig {
    /// Identity of the facade. Logics trust this caller for finalize and
    /// reports.
    pub address: Address,

    /// Owner allowed to swap the logic and the driver.
    pub owner: Address,

    /// The only caller allowed to trigger a finalize.
    /// Default: [`Address::SYSTEM`].
    pub driver: Address,
}

impl FacadeConfig {
    /// A config driven by the well-known system identity.
    #[must_use]
    pub fn new(address: Address, owner: Address) -> Self {
        Self {
            address,
            owner,
            driver: Address::SYSTEM,
        }
    }

    /// Derive the facade's config from deployment parameters.
    #[must_use]
    pub fn from_genesis(genesis: &GenesisConfig) -> Self {
        Self::new(genesis.facade, genesis.owner).with_driver(genesis.driver)
    }

    /// Set the driver identity.
    #[must_use]
    pub fn with_driver(mut self, driver: Address) -> Self {
        self.driver = driver;
        self
    }
}
