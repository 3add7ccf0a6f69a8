//! The seam between the facade and a replaceable logic implementation.
//!
//! The facade only ever talks to a logic through [`ValidatorLogic`], and a
//! logic only ever talks back through [`ProposalSink`]. Swapping the logic is
//! a handle replacement.

use crate::{Address, AddressStatus, CallContext, EventLog, Height, ParentRef, Result, ValidatorStatus};

/// Answer of a [`ProposalSink`] to a proposed validator set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProposalOutcome {
    /// Proposal taken. Carries the records the sink emitted for it.
    Accepted(EventLog),
    /// Proposal declined. The sink emitted nothing.
    Declined,
}

impl ProposalOutcome {
    /// Whether the proposal was taken.
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted(_))
    }
}

/// Receiver of "propose new set" notifications.
///
/// Called synchronously by a logic while it holds a staged change. `ctx.caller`
/// is the logic's own address. Returning an error or
/// [`ProposalOutcome::Declined`] makes the logic discard the staged change.
///
/// A logic only proposes to the sink whose [`address`](Self::address) is its
/// trusted facade.
pub trait ProposalSink {
    /// Identity of the component receiving proposals.
    fn address(&self) -> Address;

    fn receive_proposal(
        &mut self,
        ctx: &CallContext,
        parent_ref: ParentRef,
        new_set: &[Address],
    ) -> Result<ProposalOutcome>;
}

/// A validator-set logic the facade can forward to.
///
/// Mutating methods either commit fully and return the records they emitted,
/// or fail and leave the logic untouched.
pub trait ValidatorLogic: Send {
    /// Identity of this logic, as seen by the facade.
    fn address(&self) -> Address;

    /// Queue `validator` for addition. Owner-only; needs a finalized set.
    fn add_validator(
        &mut self,
        ctx: &CallContext,
        validator: Address,
        sink: &mut dyn ProposalSink,
    ) -> Result<EventLog>;

    /// Queue `validator` for removal. Owner-only; needs a finalized set.
    fn remove_validator(
        &mut self,
        ctx: &CallContext,
        validator: Address,
        sink: &mut dyn ProposalSink,
    ) -> Result<EventLog>;

    /// Promote the pending set to current. Only honoured from the facade.
    fn finalize_change(&mut self, ctx: &CallContext) -> Result<EventLog>;

    /// Accept a misbehaviour report. Only honoured from the facade.
    fn report_malicious(
        &mut self,
        ctx: &CallContext,
        reporter: Address,
        reported: Address,
        height: Height,
        proof: &[u8],
    ) -> Result<EventLog>;

    /// Accept a benign-fault report. Only honoured from the facade.
    fn report_benign(
        &mut self,
        ctx: &CallContext,
        reporter: Address,
        reported: Address,
        height: Height,
    ) -> Result<EventLog>;

    /// Point the logic at a different facade. Owner-only.
    fn set_facade(&mut self, ctx: &CallContext, facade: Address) -> Result<EventLog>;

    /// Hand the owner role to `new_owner`. Owner-only.
    fn transfer_ownership(&mut self, ctx: &CallContext, new_owner: Address) -> Result<EventLog>;

    /// Drop the owner role for good. Owner-only.
    fn renounce_ownership(&mut self, ctx: &CallContext) -> Result<EventLog>;

    /// Last finalized set.
    fn validators(&self) -> &[Address];

    /// Set that becomes current at the next finalize.
    fn pending_validators(&self) -> &[Address];

    /// Status and slot of `address`.
    fn address_status(&self, address: Address) -> AddressStatus;

    /// `true` when no change is outstanding.
    fn finalized(&self) -> bool;

    /// The only caller trusted for finalize and reports.
    fn facade(&self) -> Address;

    /// Current owner, `None` once renounced.
    fn owner(&self) -> Option<Address>;

    /// Current set followed by pending-only members.
    fn union(&self) -> Vec<Address> {
        let mut all = self.validators().to_vec();
        all.extend(
            self.pending_validators()
                .iter()
                .filter(|v| self.address_status(**v).status == ValidatorStatus::PendingToBeAdded),
        );
        all
    }

    /// Size of the current set.
    fn validators_num(&self) -> usize {
        self.validators().len()
    }

    /// Member of the current set (finalized or on its way out).
    fn is_active_validator(&self, address: Address) -> bool {
        matches!(
            self.address_status(address).status,
            ValidatorStatus::FinalizedValidator | ValidatorStatus::PendingToBeRemoved
        )
    }

    fn is_finalized_validator(&self, address: Address) -> bool {
        self.address_status(address).status == ValidatorStatus::FinalizedValidator
    }

    fn is_pending_to_be_added(&self, address: Address) -> bool {
        self.address_status(address).status == ValidatorStatus::PendingToBeAdded
    }

    fn is_pending_to_be_removed(&self, address: Address) -> bool {
        self.address_status(address).status == ValidatorStatus::PendingToBeRemoved
    }

    /// Part of the outstanding change, either way.
    fn is_pending(&self, address: Address) -> bool {
        self.address_status(address).is_pending()
    }

    /// Member of the pending set.
    fn is_added_validator(&self, address: Address) -> bool {
        self.address_status(address).is_in()
    }
}
