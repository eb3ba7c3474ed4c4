// Lead status workflow: Draft -> Approved -> Sent, forward only, one step at a time.

use thiserror::Error;

use crate::leads::models::LeadStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Cannot change status from {from} to {to}")]
pub struct IllegalTransition {
    pub from: LeadStatus,
    pub to: LeadStatus,
}

/// Statuses reachable from `status` in one step.
pub fn allowed_transitions(status: LeadStatus) -> &'static [LeadStatus] {
    match status {
        LeadStatus::Draft => &[LeadStatus::Approved],
        LeadStatus::Approved => &[LeadStatus::Sent],
        LeadStatus::Sent => &[],
    }
}

pub fn can_transition(from: LeadStatus, to: LeadStatus) -> bool {
    allowed_transitions(from).contains(&to)
}

pub fn validate_transition(from: LeadStatus, to: LeadStatus) -> Result<(), IllegalTransition> {
    if can_transition(from, to) {
        Ok(())
    } else {
        Err(IllegalTransition { from, to })
    }
}

impl LeadStatus {
    /// The single legal successor, `None` once sent.
    pub fn next(&self) -> Option<LeadStatus> {
        allowed_transitions(*self).first().copied()
    }

    pub fn is_terminal(&self) -> bool {
        allowed_transitions(*self).is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use LeadStatus::*;

    #[test]
    fn test_all_status_pairs() {
        let legal = [(Draft, Approved), (Approved, Sent)];

        for from in LeadStatus::ALL {
            for to in LeadStatus::ALL {
                let expected = legal.contains(&(from, to));
                assert_eq!(
                    can_transition(from, to),
                    expected,
                    "{} -> {}",
                    from,
                    to
                );
                assert_eq!(validate_transition(from, to).is_ok(), expected);
            }
        }
    }

    #[test]
    fn test_same_status_is_rejected() {
        for status in LeadStatus::ALL {
            assert!(!can_transition(status, status));
        }
    }

    #[test]
    fn test_error_names_both_statuses() {
        let err = validate_transition(Sent, Draft).unwrap_err();
        assert_eq!(err, IllegalTransition { from: Sent, to: Draft });
        assert_eq!(err.to_string(), "Cannot change status from Sent to Draft");
    }

    #[test]
    fn test_next_and_terminal() {
        assert_eq!(Draft.next(), Some(Approved));
        assert_eq!(Approved.next(), Some(Sent));
        assert_eq!(Sent.next(), None);
        assert!(Sent.is_terminal());
        assert!(!Draft.is_terminal());
    }
}
