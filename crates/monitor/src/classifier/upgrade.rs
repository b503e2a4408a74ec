use chainio::UpgradePlan;

/// An upgrade plan transition worth announcing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpgradeEvent {
    /// A plan appeared or was replaced by one with a different name
    Scheduled {
        /// The plan now set on chain
        plan: UpgradePlan,
        /// The plan it replaced, if any
        previous: Option<UpgradePlan>,
    },
    /// The plan disappeared: executed or cancelled
    Cleared {
        /// The plan that is gone
        previous: UpgradePlan,
    },
}

/// Last-seen upgrade plan of one chain.
#[derive(Debug, Clone, Default)]
pub struct UpgradeTracker {
    current: Option<UpgradePlan>,
}

impl UpgradeTracker {
    /// Create a tracker with no known plan.
    pub fn new() -> Self {
        Self::default()
    }

    /// The last observed plan.
    pub const fn current(&self) -> Option<&UpgradePlan> {
        self.current.as_ref()
    }

    /// Compare `plan` with the last observation and remember it.
    pub fn observe(&mut self, plan: Option<UpgradePlan>) -> Option<UpgradeEvent> {
        let previous = std::mem::replace(&mut self.current, plan.clone());
        match (previous, plan) {
            (None, Some(plan)) => Some(UpgradeEvent::Scheduled { plan, previous: None }),
            (Some(previous), Some(plan)) if previous.name != plan.name => {
                Some(UpgradeEvent::Scheduled { plan, previous: Some(previous) })
            }
            (Some(previous), None) => Some(UpgradeEvent::Cleared { previous }),
            _ => None,
        }
    }
}

/// Blocks left until `target_height`, clamped at zero. `None` if the chain height is unknown.
pub fn blocks_remaining(target_height: u64, latest_height: Option<u64>) -> Option<u64> {
    latest_height.map(|h| target_height.saturating_sub(h))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(name: &str, height: u64) -> UpgradePlan {
        UpgradePlan { name: name.to_owned(), height, info: String::new() }
    }

    #[test]
    fn plan_appears_stays_and_disappears() {
        let mut tracker = UpgradeTracker::new();
        assert_eq!(tracker.observe(None), None);

        assert_eq!(
            tracker.observe(Some(plan("v2", 1000))),
            Some(UpgradeEvent::Scheduled { plan: plan("v2", 1000), previous: None })
        );
        assert_eq!(tracker.observe(Some(plan("v2", 1000))), None);
        assert_eq!(tracker.current(), Some(&plan("v2", 1000)));

        assert_eq!(tracker.observe(None), Some(UpgradeEvent::Cleared { previous: plan("v2", 1000) }));
        assert_eq!(tracker.observe(None), None);
    }

    #[test]
    fn renamed_plan_is_announced() {
        let mut tracker = UpgradeTracker::new();
        tracker.observe(Some(plan("v2", 1000)));
        assert_eq!(
            tracker.observe(Some(plan("v3", 2000))),
            Some(UpgradeEvent::Scheduled { plan: plan("v3", 2000), previous: Some(plan("v2", 1000)) })
        );
        // Height-only changes keep the same plan.
        assert_eq!(tracker.observe(Some(plan("v3", 2100))), None);
    }

    #[test]
    fn remaining_blocks() {
        assert_eq!(blocks_remaining(1000, Some(900)), Some(100));
        assert_eq!(blocks_remaining(1000, Some(1200)), Some(0));
        assert_eq!(blocks_remaining(1000, None), None);
    }
}
