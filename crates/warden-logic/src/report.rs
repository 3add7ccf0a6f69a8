//! Misbehaviour reports forwarded by the facade.
//!
//! A report is accepted when both parties are in the current set and the
//! height is not ahead of the host. Eligibility follows the current set, so
//! an address on its way out can still be reported until the next finalize,
//! while one on its way in cannot yet.

use warden_types::{Address, Error, Event, Height, Result};

/// The two report flavours.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Report {
    /// Misbehaviour with evidence.
    Malicious { proof: Vec<u8> },
    /// A fault that does not need evidence (e.g. missed a slot).
    Benign,
}

impl Report {
    /// The record to emit once the report is accepted.
    pub fn into_event(self, reporter: Address, reported: Address, height: Height) -> Event {
        match self {
            Report::Malicious { proof } => Event::ReportedMalicious {
                reporter,
                reported,
                height,
                proof,
            },
            Report::Benign => Event::ReportedBenign {
                reporter,
                reported,
                height,
            },
        }
    }
}

/// Check report eligibility.
///
/// `is_active` answers current-set membership; `now` is the host height.
pub fn check_report(
    is_active: impl Fn(Address) -> bool,
    reporter: Address,
    reported: Address,
    height: Height,
    now: Height,
) -> Result<()> {
    if !is_active(reporter) || !is_active(reported) {
        return Err(Error::NotActiveValidator);
    }
    if height > now {
        return Err(Error::HeightNotValid);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(seed: u64) -> Address {
        Address::from_low_u64(seed)
    }

    fn members(a: Address) -> bool {
        a == addr(1) || a == addr(2)
    }

    #[test]
    fn both_parties_must_be_active() {
        assert!(check_report(members, addr(1), addr(2), Height(5), Height(5)).is_ok());
        assert_eq!(
            check_report(members, addr(3), addr(2), Height(5), Height(5)),
            Err(Error::NotActiveValidator)
        );
        assert_eq!(
            check_report(members, addr(1), addr(4), Height(5), Height(5)),
            Err(Error::NotActiveValidator)
        );
    }

    #[test]
    fn future_heights_rejected() {
        assert!(check_report(members, addr(1), addr(2), Height(0), Height(5)).is_ok());
        assert_eq!(
            check_report(members, addr(1), addr(2), Height(6), Height(5)),
            Err(Error::HeightNotValid)
        );
        assert_eq!(
            check_report(members, addr(1), addr(2), Height(105), Height(5)),
            Err(Error::HeightNotValid)
        );
    }

    #[test]
    fn self_report_allowed() {
        assert!(check_report(members, addr(2), addr(2), Height(1), Height(1)).is_ok());
    }

    #[test]
    fn event_shape() {
        let event = Report::Malicious { proof: vec![0x01, 0x23] }.into_event(addr(1), addr(2), Height(3));
        assert_eq!(
            event,
            Event::ReportedMalicious {
                reporter: addr(1),
                reported: addr(2),
                height: Height(3),
                proof: vec![0x01, 0x23],
            }
        );
        assert_eq!(Report::Benign.into_event(addr(1), addr(2), Height(3)).name(), "ReportedBenign");
    }
}
