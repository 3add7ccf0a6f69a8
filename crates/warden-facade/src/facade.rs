//! The stable entry point in front of a replaceable logic.

use std::fmt;

use tokio::sync::mpsc;
use tracing::debug;
use warden_types::{
    Address, CallContext, Error, Event, EventLog, Height, Ownership, ParentRef, ProposalOutcome,
    ProposalSink, Result, ValidatorLogic,
};

use crate::config::FacadeConfig;
use crate::gateway::{Proposal, ProposalGateway};

/// Long-lived coordinator identity known to the driver.
///
/// Holds the driver identity, an owner and a handle to the current logic.
/// Membership changes are forwarded with the caller's context, so the
/// logic's own owner check applies. Finalize and reports are forwarded under
/// the facade's identity, which is the only caller the logic trusts for them.
///
/// # Proposal Flow
///
/// ```text
/// owner ──add/remove──▶ Facade ──▶ Logic (stage)
///                                    │
///                    Gateway ◀──propose──┘
///                       │ accepted? ──▶ driver channel + InitiateChange
///                       ▼
///                    Logic commits or discards
/// ```
pub struct Facade {
    address: Address,
    ownership: Ownership,
    driver: Address,
    logic: Box<dyn ValidatorLogic>,
    gateway: ProposalGateway,
}

impl Facade {
    /// Deploy a facade forwarding to `logic`. Emits `NewLogic` for it.
    pub fn new(config: FacadeConfig, logic: Box<dyn ValidatorLogic>) -> Result<(Self, EventLog)> {
        if config.address.is_zero() {
            return Err(Error::FacadeAddressZero);
        }
        if config.driver.is_zero() {
            return Err(Error::AddressZero);
        }
        let logic_address = logic.address();
        if logic_address.is_zero() {
            return Err(Error::LogicAddressZero);
        }
        ensure_trusted_by(config.address, logic.as_ref())?;
        let ownership = Ownership::new(config.owner)?;

        debug!(
            facade = %config.address,
            logic = %logic_address,
            driver = %config.driver,
            "Created facade"
        );

        let mut log = EventLog::new();
        log.emit(
            config.address,
            Event::NewLogic {
                old: Address::ZERO,
                new: logic_address,
            },
        );

        Ok((
            Self {
                address: config.address,
                ownership,
                driver: config.driver,
                logic,
                gateway: ProposalGateway::new(config.address, logic_address),
            },
            log,
        ))
    }

    #[must_use]
    pub const fn address(&self) -> Address {
        self.address
    }

    #[must_use]
    pub const fn driver(&self) -> Address {
        self.driver
    }

    #[must_use]
    pub const fn owner(&self) -> Option<Address> {
        self.ownership.owner()
    }

    /// The logic calls are forwarded to.
    #[must_use]
    pub fn logic(&self) -> &dyn ValidatorLogic {
        self.logic.as_ref()
    }

    #[must_use]
    pub fn validators(&self) -> &[Address] {
        self.logic.validators()
    }

    #[must_use]
    pub fn pending_validators(&self) -> &[Address] {
        self.logic.pending_validators()
    }

    #[must_use]
    pub fn finalized(&self) -> bool {
        self.logic.finalized()
    }

    /// Receive every future proposal on a channel.
    ///
    /// Replaces any earlier subscription. Once the returned receiver is
    /// dropped, proposals are declined and the triggering add or remove fails
    /// until someone subscribes again.
    pub fn subscribe_proposals(&mut self) -> mpsc::UnboundedReceiver<Proposal> {
        debug!(facade = %self.address, "Driver subscribed to proposals");
        self.gateway.subscribe()
    }

    /// Replace the logic. Owner-only. Returns the retired logic.
    ///
    /// The new logic must already trust this facade.
    pub fn set_logic(
        &mut self,
        ctx: &CallContext,
        logic: Box<dyn ValidatorLogic>,
    ) -> Result<(Box<dyn ValidatorLogic>, EventLog)> {
        self.ownership.ensure_owner(ctx.caller)?;
        let new = logic.address();
        if new.is_zero() {
            return Err(Error::LogicAddressZero);
        }
        let old = self.gateway.logic();
        if new == old {
            return Err(Error::SameLogic);
        }
        ensure_trusted_by(self.address, logic.as_ref())?;

        let retired = std::mem::replace(&mut self.logic, logic);
        self.gateway.retarget(new);
        debug!(%old, %new, "Swapped logic");

        let mut log = EventLog::new();
        log.emit(self.address, Event::NewLogic { old, new });
        Ok((retired, log))
    }

    /// Point the current logic at another facade. The logic's owner must be
    /// the caller.
    ///
    /// Afterwards this facade can no longer finalize, report or propose
    /// through the logic; swap it out or hand it to the new facade.
    pub fn set_logic_facade(&mut self, ctx: &CallContext, facade: Address) -> Result<EventLog> {
        self.logic.set_facade(ctx, facade)
    }

    /// Replace the driver. Owner-only.
    pub fn set_driver(&mut self, ctx: &CallContext, driver: Address) -> Result<EventLog> {
        self.ownership.ensure_owner(ctx.caller)?;
        if driver.is_zero() {
            return Err(Error::AddressZero);
        }
        if driver == self.driver {
            return Err(Error::SameDriver);
        }

        let old = std::mem::replace(&mut self.driver, driver);
        debug!(%old, new = %driver, "Swapped driver");

        let mut log = EventLog::new();
        log.emit(self.address, Event::NewDriver { old, new: driver });
        Ok(log)
    }

    pub fn transfer_ownership(&mut self, ctx: &CallContext, new_owner: Address) -> Result<EventLog> {
        self.ownership.transfer_ownership(ctx, self.address, new_owner)
    }

    pub fn renounce_ownership(&mut self, ctx: &CallContext) -> Result<EventLog> {
        self.ownership.renounce_ownership(ctx, self.address)
    }

    /// Promote the pending set. Driver-only.
    pub fn finalize(&mut self, ctx: &CallContext) -> Result<EventLog> {
        if ctx.caller != self.driver {
            return Err(Error::NotDriver);
        }
        self.logic.finalize_change(&ctx.forwarded_by(self.address))
    }

    /// Report `reported` for misbehaviour, with `ctx.caller` as reporter.
    pub fn report_malicious(
        &mut self,
        ctx: &CallContext,
        reported: Address,
        height: Height,
        proof: &[u8],
    ) -> Result<EventLog> {
        self.logic
            .report_malicious(&ctx.forwarded_by(self.address), ctx.caller, reported, height, proof)
    }

    /// Report a benign fault of `reported`, with `ctx.caller` as reporter.
    pub fn report_benign(
        &mut self,
        ctx: &CallContext,
        reported: Address,
        height: Height,
    ) -> Result<EventLog> {
        self.logic
            .report_benign(&ctx.forwarded_by(self.address), ctx.caller, reported, height)
    }

    /// Ask the logic to add `validator`. The logic's owner must be the caller.
    pub fn add_validator(&mut self, ctx: &CallContext, validator: Address) -> Result<EventLog> {
        self.logic.add_validator(ctx, validator, &mut self.gateway)
    }

    /// Ask the logic to remove `validator`. The logic's owner must be the caller.
    pub fn remove_validator(&mut self, ctx: &CallContext, validator: Address) -> Result<EventLog> {
        self.logic.remove_validator(ctx, validator, &mut self.gateway)
    }
}

/// Logics held outside the facade (e.g. a retired one) propose through here.
/// Only the current logic is accepted.
impl ProposalSink for Facade {
    fn address(&self) -> Address {
        self.address
    }

    fn receive_proposal(
        &mut self,
        ctx: &CallContext,
        parent_ref: ParentRef,
        new_set: &[Address],
    ) -> Result<ProposalOutcome> {
        self.gateway.receive_proposal(ctx, parent_ref, new_set)
    }
}

fn ensure_trusted_by(facade: Address, logic: &dyn ValidatorLogic) -> Result<()> {
    let trusted = logic.facade();
    if trusted != facade {
        return Err(Error::FacadeMismatch { facade, trusted });
    }
    Ok(())
}

impl fmt::Debug for Facade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Facade")
            .field("address", &self.address)
            .field("owner", &self.ownership.owner())
            .field("driver", &self.driver)
            .field("logic", &self.logic.address())
            .finish_non_exhaustive()
    }
}
