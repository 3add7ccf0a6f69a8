//! Deployment parameters shared by both components.

use serde::Deserialize;

use crate::{Address, Error, Result};

/// Everything needed to bring up a facade and its first logic.
///
/// Loaded from JSON by hosts:
///
/// ```
/// use warden_types::GenesisConfig;
///
/// let genesis = GenesisConfig::from_json(r#"{
///     "owner": "0x0000000000000000000000000000000000000009",
///     "facade": "0x00000000000000000000000000000000000000f0",
///     "logic": "0x00000000000000000000000000000000000000f1",
///     "validators": ["0x0000000000000000000000000000000000000001"]
/// }"#).unwrap();
/// assert!(!genesis.finalized);
/// assert_eq!(genesis.driver, warden_types::Address::SYSTEM);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GenesisConfig {
    /// Owner of both components.
    pub owner: Address,
    /// Identity of the facade.
    pub facade: Address,
    /// Identity of the first logic.
    pub logic: Address,
    /// Initial validator set, in slot order.
    pub validators: Vec<Address>,
    /// Whether the initial set is active immediately. When `false` the
    /// driver has to finalize it first.
    #[serde(default)]
    pub finalized: bool,
    /// Identity allowed to trigger finalize through the facade.
    #[serde(default = "default_driver")]
    pub driver: Address,
}

fn default_driver() -> Address {
    Address::SYSTEM
}

impl GenesisConfig {
    /// Parse a JSON document and check identities are usable.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject null component identities up front. Validator list checks are
    /// left to the logic constructor.
    pub fn validate(&self) -> Result<()> {
        if self.owner.is_zero() || self.driver.is_zero() {
            return Err(Error::AddressZero);
        }
        if self.facade.is_zero() {
            return Err(Error::FacadeAddressZero);
        }
        if self.logic.is_zero() {
            return Err(Error::LogicAddressZero);
        }
        Ok(())
    }
}
