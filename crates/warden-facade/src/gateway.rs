//! The facade's end of the proposal callback.
//!
//! A logic calls back into the gateway while holding a staged change. The
//! gateway checks the caller is the logic the facade currently forwards to,
//! hands the proposed set to the driver's subscription (if any) and records
//! `InitiateChange`.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, warn};
use warden_types::{
    Address, CallContext, Error, Event, EventLog, Height, ParentRef, ProposalOutcome, ProposalSink,
    Result,
};

/// A proposed validator set, as delivered to the driver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    /// Logic that proposed the set.
    pub logic: Address,
    /// Host height when the proposal was made.
    pub height: Height,
    /// State the change builds on.
    pub parent_ref: ParentRef,
    /// The pending set as it will be once the change is committed.
    pub new_set: Vec<Address>,
}

/// Accepts proposals from exactly one logic.
#[derive(Debug)]
pub(crate) struct ProposalGateway {
    facade: Address,
    logic: Address,
    subscriber: Option<mpsc::UnboundedSender<Proposal>>,
}

impl ProposalGateway {
    pub(crate) fn new(facade: Address, logic: Address) -> Self {
        Self {
            facade,
            logic,
            subscriber: None,
        }
    }

    pub(crate) fn logic(&self) -> Address {
        self.logic
    }

    /// Only accept proposals from `logic` from now on.
    pub(crate) fn retarget(&mut self, logic: Address) {
        self.logic = logic;
    }

    /// Deliver future proposals to a new channel, replacing any previous one.
    pub(crate) fn subscribe(&mut self) -> mpsc::UnboundedReceiver<Proposal> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscriber = Some(tx);
        rx
    }
}

impl ProposalSink for ProposalGateway {
    fn address(&self) -> Address {
        self.facade
    }

    fn receive_proposal(
        &mut self,
        ctx: &CallContext,
        parent_ref: ParentRef,
        new_set: &[Address],
    ) -> Result<ProposalOutcome> {
        if ctx.caller != self.logic {
            return Err(Error::NotLogic);
        }

        if let Some(tx) = &self.subscriber {
            let proposal = Proposal {
                logic: ctx.caller,
                height: ctx.height,
                parent_ref,
                new_set: new_set.to_vec(),
            };
            if tx.send(proposal).is_err() {
                warn!(
                    facade = %self.facade,
                    size = new_set.len(),
                    "Driver stopped listening, declining proposal"
                );
                return Ok(ProposalOutcome::Declined);
            }
        }

        debug!(
            facade = %self.facade,
            parent = ?parent_ref,
            size = new_set.len(),
            "Accepted validator set proposal"
        );

        let mut log = EventLog::new();
        log.emit(
            self.facade,
            Event::InitiateChange {
                parent_ref,
                new_set: new_set.to_vec(),
            },
        );
        Ok(ProposalOutcome::Accepted(log))
    }
}
