//! Simulated host for end-to-end Warden scenarios.
//!
//! Stands in for the ledger the coordinator runs on: a height counter,
//! parent references chained with BLAKE3, and named accounts. Scenario tests
//! live under `tests/`.

use std::collections::HashSet;

use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use warden_facade::{Facade, FacadeConfig};
use warden_logic::{LogicConfig, ValidatorSetLogic};
use warden_types::{
    Address, CallContext, EventLog, GenesisConfig, Height, ParentRef, Result, ValidatorLogic,
    ValidatorStatus, ADDRESS_LEN, MIN_VALIDATORS,
};

/// Install a test-friendly subscriber once per test binary.
///
/// Honours `RUST_LOG`, defaulting to debug output for the warden crates.
pub fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warden_logic=debug,warden_facade=debug,warden_types=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_test_writer())
        .try_init();
}

/// Deterministic identity for `name`.
pub fn account(name: &str) -> Address {
    let digest = blake3::hash(name.as_bytes());
    let mut bytes = [0u8; ADDRESS_LEN];
    bytes.copy_from_slice(&digest.as_bytes()[..ADDRESS_LEN]);
    Address::new(bytes)
}

/// Identities for a list of names.
pub fn accounts(names: &[&str]) -> Vec<Address> {
    names.iter().map(|n| account(n)).collect()
}

/// A minimal ledger: heights advance, each with a parent reference.
#[derive(Debug, Clone)]
pub struct SimulatedHost {
    height: Height,
    parent_ref: ParentRef,
}

impl Default for SimulatedHost {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedHost {
    /// A host at height 1 whose parent is the genesis hash.
    pub fn new() -> Self {
        Self {
            height: Height(1),
            parent_ref: ParentRef(*blake3::hash(b"warden-genesis").as_bytes()),
        }
    }

    pub fn height(&self) -> Height {
        self.height
    }

    pub fn parent_ref(&self) -> ParentRef {
        self.parent_ref
    }

    /// Seal `blocks` heights, chaining the parent reference each time.
    pub fn advance(&mut self, blocks: u64) {
        for _ in 0..blocks {
            let mut hasher = blake3::Hasher::new();
            hasher.update(&self.parent_ref.0);
            hasher.update(&self.height.0.to_be_bytes());
            self.parent_ref = ParentRef(*hasher.finalize().as_bytes());
            self.height = self.height.saturating_add(1);
        }
    }

    /// Context for a call by `caller` at the current height.
    pub fn call(&self, caller: Address) -> CallContext {
        CallContext::new(caller, self.height, self.parent_ref)
    }

    /// Context for a call by the named account.
    pub fn call_as(&self, name: &str) -> CallContext {
        self.call(account(name))
    }

    /// Genesis for a standard deployment: accounts `owner`, `facade` and
    /// `logic`, driven by [`Address::SYSTEM`].
    pub fn genesis(&self, validators: &[&str], finalized: bool) -> GenesisConfig {
        GenesisConfig {
            owner: account("owner"),
            facade: account("facade"),
            logic: account("logic"),
            validators: accounts(validators),
            finalized,
            driver: Address::SYSTEM,
        }
    }

    /// Bring up a facade and its first logic from `genesis`.
    pub fn deploy(&self, genesis: &GenesisConfig) -> Result<Deployment> {
        genesis.validate()?;
        let (logic, mut log) = ValidatorSetLogic::new(LogicConfig::from_genesis(genesis))?;
        let (facade, facade_log) = Facade::new(FacadeConfig::from_genesis(genesis), Box::new(logic))?;
        log.extend(facade_log);

        debug!(height = %self.height, validators = genesis.validators.len(), "Deployed coordinator");
        Ok(Deployment { facade, log })
    }

    /// A second logic trusting the same facade, for upgrade scenarios.
    pub fn logic(
        &self,
        genesis: &GenesisConfig,
        name: &str,
        validators: &[&str],
    ) -> Result<Box<dyn ValidatorLogic>> {
        let config = LogicConfig::new(
            account(name),
            genesis.owner,
            genesis.facade,
            accounts(validators),
        )
        .finalized_at_genesis();
        let (logic, _) = ValidatorSetLogic::new(config)?;
        Ok(Box::new(logic))
    }
}

/// A deployed coordinator and the records its construction emitted.
#[derive(Debug)]
pub struct Deployment {
    pub facade: Facade,
    pub log: EventLog,
}

/// Check the membership invariants through the public query surface.
///
/// Returns a description of the first violation found.
pub fn check_invariants(logic: &dyn ValidatorLogic) -> std::result::Result<(), String> {
    let current = logic.validators();
    let pending = logic.pending_validators();

    if current.len() < MIN_VALIDATORS || pending.len() < MIN_VALIDATORS {
        return Err(format!(
            "below minimum: current {}, pending {}",
            current.len(),
            pending.len()
        ));
    }

    let current_set: HashSet<_> = current.iter().copied().collect();
    let pending_set: HashSet<_> = pending.iter().copied().collect();
    if current_set.len() != current.len() || pending_set.len() != pending.len() {
        return Err("duplicate member".into());
    }
    if logic.finalized() && current != pending {
        return Err("finalized while sets differ".into());
    }

    for (index, member) in pending.iter().enumerate() {
        let slot = logic.address_status(*member);
        if !slot.is_in() || slot.index != index {
            return Err(format!("{member} at pending slot {index} has {slot:?}"));
        }
    }
    for (index, member) in current.iter().enumerate() {
        let slot = logic.address_status(*member);
        if slot.status == ValidatorStatus::PendingToBeRemoved && slot.index != index {
            return Err(format!("{member} leaving from slot {index} has {slot:?}"));
        }
        if slot.status == ValidatorStatus::NonValidator || slot.status == ValidatorStatus::PendingToBeAdded {
            return Err(format!("{member} in current set has {slot:?}"));
        }
    }
    Ok(())
}
