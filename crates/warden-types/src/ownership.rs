//! Owner capability shared by the facade and the logic.

use tracing::debug;

use crate::{Address, CallContext, Error, Event, EventLog, Result};

/// Tracks who may perform administrative operations on a component.
///
/// `None` means ownership was renounced and every owner-only call fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ownership {
    owner: Option<Address>,
}

impl Ownership {
    /// Ownership held by `owner`.
    pub fn new(owner: Address) -> Result<Self> {
        if owner.is_zero() {
            return Err(Error::AddressZero);
        }
        Ok(Self { owner: Some(owner) })
    }

    /// Current owner.
    pub const fn owner(&self) -> Option<Address> {
        self.owner
    }

    /// Fail with [`Error::NotOwner`] unless `caller` is the owner.
    pub fn ensure_owner(&self, caller: Address) -> Result<()> {
        match self.owner {
            Some(owner) if owner == caller => Ok(()),
            _ => Err(Error::NotOwner),
        }
    }

    /// Hand ownership to `new_owner`. Owner-only.
    pub fn transfer_ownership(
        &mut self,
        ctx: &CallContext,
        emitter: Address,
        new_owner: Address,
    ) -> Result<EventLog> {
        self.ensure_owner(ctx.caller)?;
        if new_owner.is_zero() {
            return Err(Error::AddressZero);
        }

        let previous = self.owner.replace(new_owner);
        debug!(component = %emitter, owner = %new_owner, "Ownership transferred");

        let mut log = EventLog::new();
        log.emit(
            emitter,
            Event::OwnershipTransferred {
                previous,
                new: Some(new_owner),
            },
        );
        Ok(log)
    }

    /// Give up ownership for good. Owner-only.
    pub fn renounce_ownership(&mut self, ctx: &CallContext, emitter: Address) -> Result<EventLog> {
        self.ensure_owner(ctx.caller)?;

        let previous = self.owner.take();
        debug!(component = %emitter, "Ownership renounced");

        let mut log = EventLog::new();
        log.emit(emitter, Event::OwnershipTransferred { previous, new: None });
        Ok(log)
    }
}
