use primitives::ValidatorStatus;

use crate::resolver::ValidatorStatusReport;

/// Chain-dependent inputs to [`classify_health`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthPolicy {
    /// Missed-block count at which a warning fires
    pub missed_blocks_threshold: i64,
    /// Whether the chain reports missed blocks
    pub missed_blocks_supported: bool,
}

/// What was persisted for a validator after the previous cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviousHealth {
    /// Persisted status
    pub status: ValidatorStatus,
    /// Persisted missed-block counter
    pub missed_blocks: i64,
}

/// Alert raised by a health transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthAlert {
    /// The staking API could not be queried
    ApiError,
    /// The validator was jailed
    Jailed,
    /// The validator left jail
    JailRecovered,
    /// The staking API is reachable again
    ApiRecovered,
    /// Missed blocks reached the threshold
    MissedBlocksWarning,
    /// Missed blocks dropped below the threshold
    MissedBlocksRecovered,
    /// Plain bonding status change
    StatusChange {
        /// Persisted status before this cycle
        from: ValidatorStatus,
        /// Status after this cycle
        to: ValidatorStatus,
    },
}

impl HealthAlert {
    /// Urgent alerts mention the registering user.
    pub const fn is_urgent(self) -> bool {
        !matches!(self, Self::StatusChange { .. })
    }
}

/// Outcome of one health cycle for one validator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthDecision {
    /// Alert to dispatch, if any
    pub alert: Option<HealthAlert>,
    /// Status to persist
    pub status: ValidatorStatus,
    /// Missed-block counter to persist
    pub missed_blocks: i64,
    /// Moniker to persist; `None` keeps the stored one
    pub moniker: Option<String>,
}

/// Compare a fresh poll against the persisted state.
///
/// `poll` is `None` when the staking API could not be queried. At most one alert fires per
/// cycle, chosen by priority: API error, jailing, jail recovery, API recovery, missed-blocks
/// threshold, plain status change. The persisted status always accounts for every condition.
pub fn classify_health(
    previous: &PreviousHealth,
    poll: Option<&ValidatorStatusReport>,
    policy: HealthPolicy,
) -> HealthDecision {
    let Some(report) = poll else {
        return HealthDecision {
            alert: (previous.status != ValidatorStatus::ApiError).then_some(HealthAlert::ApiError),
            status: ValidatorStatus::ApiError,
            missed_blocks: previous.missed_blocks,
            moniker: None,
        };
    };

    let prev = previous.status;
    let missed_valid = policy.missed_blocks_supported && report.has_missed_blocks();
    let above_threshold =
        !report.jailed && missed_valid && report.missed_blocks >= policy.missed_blocks_threshold;
    let below_threshold = !report.jailed && missed_valid && !above_threshold;

    // An unavailable counter cannot clear an earlier warning.
    let keeps_warning = prev == ValidatorStatus::WarningMissedBlocks && !missed_valid;
    let status = if report.jailed {
        ValidatorStatus::Jailed
    } else if above_threshold || keeps_warning {
        ValidatorStatus::WarningMissedBlocks
    } else {
        report.bond_status.into()
    };

    let alert = if report.jailed && prev != ValidatorStatus::Jailed {
        Some(HealthAlert::Jailed)
    } else if !report.jailed && prev == ValidatorStatus::Jailed {
        Some(HealthAlert::JailRecovered)
    } else if prev == ValidatorStatus::ApiError {
        Some(HealthAlert::ApiRecovered)
    } else if above_threshold && prev != ValidatorStatus::WarningMissedBlocks {
        Some(HealthAlert::MissedBlocksWarning)
    } else if below_threshold && prev == ValidatorStatus::WarningMissedBlocks {
        Some(HealthAlert::MissedBlocksRecovered)
    } else if status != prev && prev != ValidatorStatus::Unknown {
        Some(HealthAlert::StatusChange { from: prev, to: status })
    } else {
        None
    };

    HealthDecision {
        alert,
        status,
        missed_blocks: report.missed_blocks,
        moniker: Some(report.moniker.clone()),
    }
}
