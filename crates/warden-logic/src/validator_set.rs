//! The validator-set logic component.
//!
//! Owns the roster and runs the propose/finalize protocol:
//!
//! 1. The owner adds or removes one validator. The change is staged.
//! 2. The staged pending set is proposed to the facade. If the facade
//!    declines, the staged change is dropped and the call fails.
//! 3. Otherwise the change is committed and the set becomes unfinalized.
//! 4. The driver finalizes through the facade, promoting pending to current.
//!
//! Adding or removing requires a finalized set, so at most one change is
//! outstanding between two finalizations.

use tracing::{debug, trace, warn};
use warden_types::{
    Address, AddressStatus, CallContext, Error, Event, EventLog, Height, Ownership, ProposalOutcome,
    ProposalSink, Result, ValidatorLogic,
};

use crate::config::LogicConfig;
use crate::report::{check_report, Report};
use crate::roster::{Roster, StagedChange};

/// Membership state machine behind a facade.
#[derive(Debug, Clone)]
pub struct ValidatorSetLogic {
    address: Address,
    ownership: Ownership,
    facade: Address,
    roster: Roster,
}

impl ValidatorSetLogic {
    /// Deploy a logic. Emits `NewFacade` for the initial facade.
    pub fn new(config: LogicConfig) -> Result<(Self, EventLog)> {
        if config.address.is_zero() {
            return Err(Error::LogicAddressZero);
        }
        if config.facade.is_zero() {
            return Err(Error::FacadeAddressZero);
        }
        let ownership = Ownership::new(config.owner)?;
        let roster = Roster::genesis(config.initial_validators, config.finalized)?;

        debug!(
            logic = %config.address,
            facade = %config.facade,
            validators = roster.current().len(),
            finalized = roster.is_finalized(),
            "Created validator set logic"
        );

        let mut log = EventLog::new();
        log.emit(
            config.address,
            Event::NewFacade {
                old: Address::ZERO,
                new: config.facade,
            },
        );

        Ok((
            Self {
                address: config.address,
                ownership,
                facade: config.facade,
                roster,
            },
            log,
        ))
    }

    /// Read access to the roster, for invariant checks.
    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    fn ensure_facade(&self, caller: Address) -> Result<()> {
        if caller != self.facade {
            return Err(Error::NotFacade);
        }
        Ok(())
    }

    /// Offer `staged` to the sink and commit only if it is accepted.
    ///
    /// The sink must already be known to be the trusted facade.
    fn propose(
        &mut self,
        ctx: &CallContext,
        staged: StagedChange,
        sink: &mut dyn ProposalSink,
    ) -> Result<EventLog> {
        let nested = ctx.forwarded_by(self.address);
        match sink.receive_proposal(&nested, ctx.parent_ref, staged.pending()) {
            Ok(ProposalOutcome::Accepted(log)) => {
                debug!(
                    kind = ?staged.kind(),
                    validator = %staged.validator(),
                    pending = staged.pending().len(),
                    "Committed validator set change"
                );
                self.roster.commit(staged);
                Ok(log)
            }
            Ok(ProposalOutcome::Declined) => {
                warn!(
                    kind = ?staged.kind(),
                    validator = %staged.validator(),
                    "Proposal declined, discarding staged change"
                );
                Err(Error::ProposalRejected)
            }
            Err(e) => {
                warn!(
                    kind = ?staged.kind(),
                    validator = %staged.validator(),
                    error = %e,
                    "Proposal failed, discarding staged change"
                );
                Err(e)
            }
        }
    }

    fn report(
        &mut self,
        ctx: &CallContext,
        reporter: Address,
        reported: Address,
        height: Height,
        report: Report,
    ) -> Result<EventLog> {
        self.ensure_facade(ctx.caller)?;
        check_report(
            |a| self.is_active_validator(a),
            reporter,
            reported,
            height,
            ctx.height,
        )?;

        let event = report.into_event(reporter, reported, height);
        trace!(%reporter, %reported, %height, kind = event.name(), "Report accepted");

        let mut log = EventLog::new();
        log.emit(self.address, event);
        Ok(log)
    }
}

impl ValidatorLogic for ValidatorSetLogic {
    fn address(&self) -> Address {
        self.address
    }

    fn add_validator(
        &mut self,
        ctx: &CallContext,
        validator: Address,
        sink: &mut dyn ProposalSink,
    ) -> Result<EventLog> {
        self.ownership.ensure_owner(ctx.caller)?;
        self.ensure_facade(sink.address())?;
        let staged = self.roster.stage_addition(validator)?;
        self.propose(ctx, staged, sink)
    }

    fn remove_validator(
        &mut self,
        ctx: &CallContext,
        validator: Address,
        sink: &mut dyn ProposalSink,
    ) -> Result<EventLog> {
        self.ownership.ensure_owner(ctx.caller)?;
        self.ensure_facade(sink.address())?;
        let staged = self.roster.stage_removal(validator)?;
        self.propose(ctx, staged, sink)
    }

    fn finalize_change(&mut self, ctx: &CallContext) -> Result<EventLog> {
        self.ensure_facade(ctx.caller)?;
        let validator_set = self.roster.finalize()?.to_vec();

        debug!(validators = validator_set.len(), "Finalized validator set change");

        let mut log = EventLog::new();
        log.emit(self.address, Event::ChangeFinalized { validator_set });
        Ok(log)
    }

    fn report_malicious(
        &mut self,
        ctx: &CallContext,
        reporter: Address,
        reported: Address,
        height: Height,
        proof: &[u8],
    ) -> Result<EventLog> {
        self.report(
            ctx,
            reporter,
            reported,
            height,
            Report::Malicious {
                proof: proof.to_vec(),
            },
        )
    }

    fn report_benign(
        &mut self,
        ctx: &CallContext,
        reporter: Address,
        reported: Address,
        height: Height,
    ) -> Result<EventLog> {
        self.report(ctx, reporter, reported, height, Report::Benign)
    }

    fn set_facade(&mut self, ctx: &CallContext, facade: Address) -> Result<EventLog> {
        self.ownership.ensure_owner(ctx.caller)?;
        if facade.is_zero() {
            return Err(Error::FacadeAddressZero);
        }
        if facade == self.facade {
            return Err(Error::SameFacade);
        }

        let old = std::mem::replace(&mut self.facade, facade);
        debug!(%old, new = %facade, "Logic now trusts a new facade");

        let mut log = EventLog::new();
        log.emit(self.address, Event::NewFacade { old, new: facade });
        Ok(log)
    }

    fn transfer_ownership(&mut self, ctx: &CallContext, new_owner: Address) -> Result<EventLog> {
        self.ownership.transfer_ownership(ctx, self.address, new_owner)
    }

    fn renounce_ownership(&mut self, ctx: &CallContext) -> Result<EventLog> {
        self.ownership.renounce_ownership(ctx, self.address)
    }

    fn validators(&self) -> &[Address] {
        self.roster.current()
    }

    fn pending_validators(&self) -> &[Address] {
        self.roster.pending()
    }

    fn address_status(&self, address: Address) -> AddressStatus {
        self.roster.status(address)
    }

    fn finalized(&self) -> bool {
        self.roster.is_finalized()
    }

    fn facade(&self) -> Address {
        self.facade
    }

    fn owner(&self) -> Option<Address> {
        self.ownership.owner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use warden_types::{ParentRef, ValidatorStatus};

    const OWNER: Address = Address::from_low_u64(0x99);
    const FACADE: Address = Address::from_low_u64(0xf0);
    const LOGIC: Address = Address::from_low_u64(0xf1);

    fn addr(seed: u64) -> Address {
        Address::from_low_u64(seed)
    }

    fn ctx(caller: Address) -> CallContext {
        CallContext::new(caller, Height(100), ParentRef([0xab; 32]))
    }

    /// Records every proposal and answers with a fixed outcome.
    struct RecordingSink {
        address: Address,
        decline: bool,
        fail: bool,
        seen: Vec<(Address, ParentRef, Vec<Address>)>,
    }

    impl Default for RecordingSink {
        fn default() -> Self {
            Self {
                address: FACADE,
                decline: false,
                fail: false,
                seen: Vec::new(),
            }
        }
    }

    impl ProposalSink for RecordingSink {
        fn address(&self) -> Address {
            self.address
        }

        fn receive_proposal(
            &mut self,
            ctx: &CallContext,
            parent_ref: ParentRef,
            new_set: &[Address],
        ) -> Result<ProposalOutcome> {
            if self.fail {
                return Err(Error::NotLogic);
            }
            self.seen.push((ctx.caller, parent_ref, new_set.to_vec()));
            if self.decline {
                return Ok(ProposalOutcome::Declined);
            }
            let mut log = EventLog::new();
            log.emit(
                FACADE,
                Event::InitiateChange {
                    parent_ref,
                    new_set: new_set.to_vec(),
                },
            );
            Ok(ProposalOutcome::Accepted(log))
        }
    }

    fn deploy(validators: &[u64], finalized: bool) -> ValidatorSetLogic {
        let config = LogicConfig::new(
            LOGIC,
            OWNER,
            FACADE,
            validators.iter().map(|s| addr(*s)).collect(),
        )
        .with_finalized(finalized);
        ValidatorSetLogic::new(config).unwrap().0
    }

    #[test]
    fn constructor_checks_and_event() {
        let bad_facade = LogicConfig::new(LOGIC, OWNER, Address::ZERO, vec![addr(1)]);
        assert_eq!(
            ValidatorSetLogic::new(bad_facade).unwrap_err(),
            Error::FacadeAddressZero
        );

        let bad_validator = LogicConfig::new(LOGIC, OWNER, FACADE, vec![addr(1), Address::ZERO]);
        assert_eq!(
            ValidatorSetLogic::new(bad_validator).unwrap_err(),
            Error::ValidatorAddressZero
        );

        let (logic, log) =
            ValidatorSetLogic::new(LogicConfig::new(LOGIC, OWNER, FACADE, vec![addr(1)])).unwrap();
        assert!(!logic.finalized());
        assert_eq!(logic.validators(), &[addr(1)]);
        assert_eq!(
            log.first().unwrap().event,
            Event::NewFacade {
                old: Address::ZERO,
                new: FACADE
            }
        );
    }

    #[test]
    fn initial_set_must_be_finalized_first() {
        let mut logic = deploy(&[1], false);
        let mut sink = RecordingSink::default();
        assert_eq!(
            logic.add_validator(&ctx(OWNER), addr(2), &mut sink),
            Err(Error::NotFinalized)
        );

        let log = logic.finalize_change(&ctx(FACADE)).unwrap();
        assert_eq!(
            log.first().unwrap().event,
            Event::ChangeFinalized {
                validator_set: vec![addr(1)]
            }
        );
        assert!(logic.finalized());
        assert!(logic.add_validator(&ctx(OWNER), addr(2), &mut sink).is_ok());
    }

    #[test]
    fn add_proposes_with_own_identity_and_parent() {
        let mut logic = deploy(&[1], true);
        let mut sink = RecordingSink::default();

        let log = logic.add_validator(&ctx(OWNER), addr(2), &mut sink).unwrap();

        assert_eq!(sink.seen.len(), 1);
        let (caller, parent, set) = &sink.seen[0];
        assert_eq!(*caller, LOGIC);
        assert_eq!(*parent, ParentRef([0xab; 32]));
        assert_eq!(set, &vec![addr(1), addr(2)]);
        assert_eq!(log.named("InitiateChange").count(), 1);

        assert_eq!(logic.pending_validators(), &[addr(1), addr(2)]);
        assert_eq!(logic.validators(), &[addr(1)]);
        assert!(logic.is_pending_to_be_added(addr(2)));
        assert!(!logic.finalized());
    }

    #[test]
    fn only_owner_mutates() {
        let mut logic = deploy(&[1, 2], true);
        let mut sink = RecordingSink::default();
        assert_eq!(
            logic.add_validator(&ctx(addr(1)), addr(3), &mut sink),
            Err(Error::NotOwner)
        );
        assert_eq!(
            logic.remove_validator(&ctx(addr(2)), addr(1), &mut sink),
            Err(Error::NotOwner)
        );
        assert!(sink.seen.is_empty());
    }

    #[test]
    fn declined_proposal_rolls_back() {
        let mut logic = deploy(&[1, 2], true);
        let before = logic.roster().clone();

        let mut sink = RecordingSink {
            decline: true,
            ..Default::default()
        };
        assert_eq!(
            logic.add_validator(&ctx(OWNER), addr(3), &mut sink),
            Err(Error::ProposalRejected)
        );
        assert_eq!(
            logic.remove_validator(&ctx(OWNER), addr(1), &mut sink),
            Err(Error::ProposalRejected)
        );
        assert_eq!(logic.roster(), &before);
        assert!(logic.finalized());
        assert_eq!(logic.address_status(addr(3)), AddressStatus::NONE);
    }

    #[test]
    fn proposals_only_go_to_trusted_facade() {
        let mut logic = deploy(&[1, 2], true);
        let before = logic.roster().clone();
        let mut stranger = RecordingSink {
            address: addr(0xee),
            ..Default::default()
        };

        assert_eq!(
            logic.add_validator(&ctx(OWNER), addr(3), &mut stranger),
            Err(Error::NotFacade)
        );
        assert_eq!(
            logic.remove_validator(&ctx(OWNER), addr(1), &mut stranger),
            Err(Error::NotFacade)
        );
        assert!(stranger.seen.is_empty());
        assert_eq!(logic.roster(), &before);
        assert!(logic.finalized());

        // After re-pointing, the old facade's sink is the stranger.
        logic.set_facade(&ctx(OWNER), addr(0xee)).unwrap();
        assert_eq!(
            logic.add_validator(&ctx(OWNER), addr(3), &mut RecordingSink::default()),
            Err(Error::NotFacade)
        );
        assert!(logic.add_validator(&ctx(OWNER), addr(3), &mut stranger).is_ok());
        assert_eq!(stranger.seen.len(), 1);
    }

    #[test]
    fn failing_proposal_propagates_error() {
        let mut logic = deploy(&[1, 2], true);
        let before = logic.roster().clone();
        let mut sink = RecordingSink {
            fail: true,
            ..Default::default()
        };
        assert_eq!(
            logic.add_validator(&ctx(OWNER), addr(3), &mut sink),
            Err(Error::NotLogic)
        );
        assert_eq!(logic.roster(), &before);
    }

    #[test]
    fn finalize_only_from_facade_and_once() {
        let mut logic = deploy(&[1], true);
        assert_eq!(logic.finalize_change(&ctx(FACADE)), Err(Error::AlreadyFinalized));

        logic
            .add_validator(&ctx(OWNER), addr(2), &mut RecordingSink::default())
            .unwrap();
        assert_eq!(logic.finalize_change(&ctx(OWNER)), Err(Error::NotFacade));
        assert_eq!(logic.finalize_change(&ctx(addr(5))), Err(Error::NotFacade));
        logic.finalize_change(&ctx(FACADE)).unwrap();
        assert_eq!(logic.finalize_change(&ctx(FACADE)), Err(Error::AlreadyFinalized));
        assert!(logic.is_finalized_validator(addr(2)));
    }

    #[test]
    fn removal_status_transitions() {
        let mut logic = deploy(&[1, 2], true);
        logic
            .remove_validator(&ctx(OWNER), addr(2), &mut RecordingSink::default())
            .unwrap();

        assert_eq!(
            logic.address_status(addr(2)),
            AddressStatus::new(ValidatorStatus::PendingToBeRemoved, 1)
        );
        assert!(logic.is_active_validator(addr(2)));
        assert!(logic.is_pending(addr(2)));
        assert!(!logic.is_added_validator(addr(2)));
        assert_eq!(logic.validators_num(), 2);

        logic.finalize_change(&ctx(FACADE)).unwrap();
        assert_eq!(logic.address_status(addr(2)), AddressStatus::NONE);
        assert!(!logic.is_active_validator(addr(2)));
        assert_eq!(logic.validators_num(), 1);
    }

    #[test]
    fn union_covers_transitions() {
        let mut logic = deploy(&[1, 2], true);
        logic
            .add_validator(&ctx(OWNER), addr(3), &mut RecordingSink::default())
            .unwrap();
        assert_eq!(logic.union(), vec![addr(1), addr(2), addr(3)]);
        logic.finalize_change(&ctx(FACADE)).unwrap();

        logic
            .remove_validator(&ctx(OWNER), addr(1), &mut RecordingSink::default())
            .unwrap();
        assert_eq!(logic.pending_validators(), &[addr(3), addr(2)]);
        assert_eq!(logic.union(), vec![addr(1), addr(2), addr(3)]);
    }

    #[test]
    fn reports_follow_current_set() {
        let mut logic = deploy(&[1, 2], true);
        let facade = ctx(FACADE);

        let log = logic
            .report_malicious(&facade, addr(1), addr(2), Height(100), b"evidence")
            .unwrap();
        assert_eq!(
            log.first().unwrap(),
            &warden_types::LogEntry {
                emitter: LOGIC,
                event: Event::ReportedMalicious {
                    reporter: addr(1),
                    reported: addr(2),
                    height: Height(100),
                    proof: b"evidence".to_vec(),
                },
            }
        );

        assert_eq!(
            logic.report_benign(&ctx(addr(1)), addr(1), addr(2), Height(1)),
            Err(Error::NotFacade)
        );
        assert_eq!(
            logic.report_benign(&facade, addr(3), addr(2), Height(1)),
            Err(Error::NotActiveValidator)
        );
        assert_eq!(
            logic.report_benign(&facade, addr(1), addr(2), Height(101)),
            Err(Error::HeightNotValid)
        );

        logic
            .add_validator(&ctx(OWNER), addr(3), &mut RecordingSink::default())
            .unwrap();
        assert_eq!(
            logic.report_benign(&facade, addr(1), addr(3), Height(1)),
            Err(Error::NotActiveValidator)
        );
        logic.finalize_change(&facade).unwrap();
        assert!(logic.report_benign(&facade, addr(1), addr(3), Height(1)).is_ok());
    }

    #[test]
    fn set_facade_rules() {
        let mut logic = deploy(&[1], true);
        assert_eq!(logic.set_facade(&ctx(addr(4)), addr(4)), Err(Error::NotOwner));
        assert_eq!(
            logic.set_facade(&ctx(OWNER), Address::ZERO),
            Err(Error::FacadeAddressZero)
        );
        assert_eq!(logic.set_facade(&ctx(OWNER), FACADE), Err(Error::SameFacade));

        let log = logic.set_facade(&ctx(OWNER), addr(4)).unwrap();
        assert_eq!(
            log.first().unwrap().event,
            Event::NewFacade {
                old: FACADE,
                new: addr(4)
            }
        );
        assert_eq!(logic.facade(), addr(4));
        assert_eq!(logic.set_facade(&ctx(OWNER), addr(4)), Err(Error::SameFacade));

        // The old facade is no longer trusted.
        let mut sink = RecordingSink {
            address: addr(4),
            ..Default::default()
        };
        logic.add_validator(&ctx(OWNER), addr(2), &mut sink).unwrap();
        assert_eq!(logic.finalize_change(&ctx(FACADE)), Err(Error::NotFacade));
        assert!(logic.finalize_change(&ctx(addr(4))).is_ok());
    }

    #[test]
    fn ownership_handover() {
        let mut logic = deploy(&[1], true);
        logic.transfer_ownership(&ctx(OWNER), addr(7)).unwrap();
        assert_eq!(logic.owner(), Some(addr(7)));
        assert_eq!(
            logic.add_validator(&ctx(OWNER), addr(2), &mut RecordingSink::default()),
            Err(Error::NotOwner)
        );
        logic
            .add_validator(&ctx(addr(7)), addr(2), &mut RecordingSink::default())
            .unwrap();

        logic.renounce_ownership(&ctx(addr(7))).unwrap();
        assert_eq!(logic.owner(), None);
        assert_eq!(
            logic.set_facade(&ctx(addr(7)), addr(4)),
            Err(Error::NotOwner)
        );
    }
}
