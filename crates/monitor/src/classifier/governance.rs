use std::collections::HashMap;

use chainio::{Proposal, ProposalStatus};

/// A governance lifecycle transition worth announcing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GovernanceEvent {
    /// A new proposal is collecting deposits
    NewProposal(Proposal),
    /// A proposal entered its voting period
    VotingStarted(Proposal),
    /// A proposal reached a terminal state
    Finalized(Proposal),
}

impl GovernanceEvent {
    /// The proposal this event refers to.
    pub const fn proposal(&self) -> &Proposal {
        match self {
            Self::NewProposal(p) | Self::VotingStarted(p) | Self::Finalized(p) => p,
        }
    }
}

/// Last-seen proposals of one chain.
///
/// The first observation only seeds the tracker, so proposals that predate monitoring are
/// never announced.
#[derive(Debug, Clone, Default)]
pub struct GovernanceTracker {
    seen: Option<HashMap<u64, ProposalStatus>>,
}

impl GovernanceTracker {
    /// Create an unseeded tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the tracker has observed at least one successful poll.
    pub const fn is_seeded(&self) -> bool {
        self.seen.is_some()
    }

    /// Number of proposals currently tracked.
    pub fn len(&self) -> usize {
        self.seen.as_ref().map_or(0, HashMap::len)
    }

    /// Whether no proposals are tracked.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Diff the live proposal list against the last observation and remember it.
    ///
    /// Proposals missing from `proposals` are forgotten silently.
    pub fn observe(&mut self, proposals: &[Proposal]) -> Vec<GovernanceEvent> {
        let current: HashMap<u64, ProposalStatus> =
            proposals.iter().map(|p| (p.id, p.status)).collect();

        let Some(seen) = self.seen.replace(current) else {
            return Vec::new();
        };

        let mut events: Vec<GovernanceEvent> = proposals
            .iter()
            .filter_map(|proposal| match (seen.get(&proposal.id), proposal.status) {
                (None, ProposalStatus::DepositPeriod) => {
                    Some(GovernanceEvent::NewProposal(proposal.clone()))
                }
                (None, ProposalStatus::VotingPeriod) => {
                    Some(GovernanceEvent::VotingStarted(proposal.clone()))
                }
                (Some(&old), ProposalStatus::VotingPeriod) if old != ProposalStatus::VotingPeriod => {
                    Some(GovernanceEvent::VotingStarted(proposal.clone()))
                }
                (Some(&old), status) if old != status && status.is_terminal() => {
                    Some(GovernanceEvent::Finalized(proposal.clone()))
                }
                _ => None,
            })
            .collect();
        events.sort_by_key(|e| e.proposal().id);
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn proposal(id: u64, status: ProposalStatus) -> Proposal {
        Proposal { id, title: format!("Proposal {id}"), status, voting_end_time: None }
    }

    #[test]
    fn cold_start_is_silent() {
        let mut tracker = GovernanceTracker::new();
        let events = tracker.observe(&[
            proposal(1, ProposalStatus::VotingPeriod),
            proposal(2, ProposalStatus::DepositPeriod),
            proposal(3, ProposalStatus::Passed),
        ]);
        assert!(events.is_empty());
        assert!(tracker.is_seeded());
        assert_eq!(tracker.len(), 3);
    }

    #[test]
    fn empty_first_poll_still_seeds() {
        let mut tracker = GovernanceTracker::new();
        assert!(tracker.observe(&[]).is_empty());
        assert!(tracker.is_seeded());

        let events = tracker.observe(&[proposal(9, ProposalStatus::DepositPeriod)]);
        assert_eq!(
            events,
            vec![GovernanceEvent::NewProposal(proposal(9, ProposalStatus::DepositPeriod))]
        );
    }

    #[test]
    fn lifecycle_transitions() {
        let mut tracker = GovernanceTracker::new();
        tracker.observe(&[proposal(1, ProposalStatus::DepositPeriod)]);

        let events = tracker.observe(&[
            proposal(1, ProposalStatus::VotingPeriod),
            proposal(2, ProposalStatus::VotingPeriod),
        ]);
        assert_eq!(
            events,
            vec![
                GovernanceEvent::VotingStarted(proposal(1, ProposalStatus::VotingPeriod)),
                GovernanceEvent::VotingStarted(proposal(2, ProposalStatus::VotingPeriod)),
            ]
        );

        // No change, no events.
        assert!(
            tracker
                .observe(&[
                    proposal(1, ProposalStatus::VotingPeriod),
                    proposal(2, ProposalStatus::VotingPeriod),
                ])
                .is_empty()
        );

        let events = tracker.observe(&[
            proposal(1, ProposalStatus::Passed),
            proposal(2, ProposalStatus::Rejected),
        ]);
        assert_eq!(
            events,
            vec![
                GovernanceEvent::Finalized(proposal(1, ProposalStatus::Passed)),
                GovernanceEvent::Finalized(proposal(2, ProposalStatus::Rejected)),
            ]
        );
    }

    #[test]
    fn new_terminal_and_pruned_proposals_are_silent() {
        let mut tracker = GovernanceTracker::new();
        tracker.observe(&[proposal(1, ProposalStatus::VotingPeriod)]);

        let events = tracker.observe(&[proposal(5, ProposalStatus::Failed)]);
        assert!(events.is_empty());
        assert_eq!(tracker.len(), 1);
    }

    #[test]
    fn failed_from_deposit_is_final() {
        let mut tracker = GovernanceTracker::new();
        tracker.observe(&[proposal(4, ProposalStatus::DepositPeriod)]);
        let events = tracker.observe(&[proposal(4, ProposalStatus::Failed)]);
        assert_eq!(events, vec![GovernanceEvent::Finalized(proposal(4, ProposalStatus::Failed))]);
    }
}
