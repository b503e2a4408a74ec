//! Chat message builders for status cards and alerts.

use chainio::{Proposal, ProposalStatus, TallyResult, UpgradePlan};
use chrono::Utc;
use config::{ChainConfig, ChainRegistry};
use notifier::{Color, Message};
use primitives::{
    ValidatorStatus,
    format::{NOT_AVAILABLE, create_progress_bar, format_missed_blocks, format_uptime},
};

use crate::{
    classifier::{GovernanceEvent, HealthAlert, UpgradeEvent},
    resolver::ValidatorStatusReport,
};

/// Footer attached to every card.
pub const FOOTER: &str = "Monitored by valwatch";

const UPTIME_BAR_CELLS: usize = 20;
const TALLY_BAR_CELLS: usize = 10;

fn base(title: impl Into<String>, color: Color) -> Message {
    Message::new(title, color).footer(FOOTER).timestamp(Utc::now())
}

fn chain_label(chain: &str) -> String {
    chain.to_uppercase()
}

/// On-demand status card for one validator.
pub fn status_card(chain: &ChainConfig, address: &str, report: &ValidatorStatusReport) -> Message {
    let color = if report.jailed { Color::RED } else { Color::BLUE };
    let uptime_bar = create_progress_bar(report.uptime.unwrap_or(0.0), UPTIME_BAR_CELLS);

    base(format!("Validator Status: {}", report.moniker), color)
        .description(format!("Chain: **{}**\nAddress: `{address}`", chain_label(&chain.name)))
        .field("Status", report.display_status().as_str(), true)
        .field("Jailed", if report.jailed { "Yes" } else { "No" }, true)
        .field("Missed Blocks", format_missed_blocks(report.missed_blocks), true)
        .field("Total Stake", report.total_stake.as_deref().unwrap_or(NOT_AVAILABLE), true)
        .field(
            "Estimated Uptime",
            format!("`{uptime_bar}` **{}**", format_uptime(report.uptime)),
            false,
        )
}

/// Card shown when a validator lookup fails.
pub fn error_card(chain: &str, address: &str, reason: &str) -> Message {
    base("🔴 Error: Validator Data Retrieval Failed", Color::DARK_RED).description(format!(
        "Could not retrieve status for `{address}` on **{}**.\n**Reason:** `{reason}`",
        chain_label(chain)
    ))
}

/// Title and colour of a health alert.
pub const fn health_alert_style(alert: HealthAlert) -> (&'static str, Color) {
    match alert {
        HealthAlert::Jailed => ("🔴 Critical Alert: Validator Jailed", Color::RED),
        HealthAlert::JailRecovered => ("🟢 Notice: Validator Recovered", Color::GREEN),
        HealthAlert::MissedBlocksWarning => {
            ("🟠 Warning: Missed Blocks Threshold Reached", Color::ORANGE)
        }
        HealthAlert::MissedBlocksRecovered => ("🟢 Notice: Missed Blocks Recovered", Color::GREEN),
        HealthAlert::ApiError => ("🔴 Alert: API Error", Color::RED),
        HealthAlert::ApiRecovered => ("🟢 Notice: API Recovered", Color::GREEN),
        HealthAlert::StatusChange { .. } => ("Validator Status Update", Color::BLUE),
    }
}

/// Alert sent to the registering user when a health transition fires.
pub fn health_alert(
    alert: HealthAlert,
    chain: &str,
    moniker: &str,
    status: ValidatorStatus,
    missed_blocks: i64,
) -> Message {
    let (title, color) = health_alert_style(alert);
    let mut msg = base(title, color)
        .description(format!("An alert has been triggered for validator `{moniker}`."))
        .field("Chain", chain_label(chain), true)
        .field("Status", status.as_str(), true)
        .field("Missed Blocks", format_missed_blocks(missed_blocks), true);
    if let HealthAlert::StatusChange { from, .. } = alert {
        msg = msg.field("Previous Status", from.as_str(), true);
    }
    msg
}

fn tally_lines(tally: &TallyResult) -> String {
    let Some(pct) = tally.percentages() else {
        return "No votes recorded".to_owned();
    };
    [("Yes", pct.yes), ("No", pct.no), ("Abstain", pct.abstain), ("Veto", pct.no_with_veto)]
        .iter()
        .map(|(label, value)| {
            format!("`{}` {label}: **{value:.2}%**", create_progress_bar(*value, TALLY_BAR_CELLS))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn proposal_header(chain: &str, proposal: &Proposal) -> String {
    format!("**{}** proposal #{}: {}", chain_label(chain), proposal.id, proposal.title)
}

/// Governance notification. `tally` is only used for finalised proposals.
pub fn governance_message(
    chain: &str,
    event: &GovernanceEvent,
    tally: Option<&TallyResult>,
) -> Message {
    let proposal = event.proposal();
    match event {
        GovernanceEvent::NewProposal(_) => {
            base("🗳️ New Governance Proposal", Color::PURPLE)
                .description(proposal_header(chain, proposal))
                .field("Status", proposal.status.label(), true)
        }
        GovernanceEvent::VotingStarted(_) => {
            let ends = proposal.voting_end_time.map_or_else(
                || NOT_AVAILABLE.to_owned(),
                |t| t.format("%Y-%m-%d %H:%M UTC").to_string(),
            );
            base("🗳️ Voting Period Started", Color::PURPLE)
                .description(proposal_header(chain, proposal))
                .field("Status", proposal.status.label(), true)
                .field("Voting Ends", ends, true)
        }
        GovernanceEvent::Finalized(_) => {
            let color = match proposal.status {
                ProposalStatus::Passed => Color::GREEN,
                _ => Color::RED,
            };
            let msg = base(format!("🏁 Proposal {}", proposal.status.label()), color)
                .description(proposal_header(chain, proposal))
                .field("Result", proposal.status.label(), true);
            match tally {
                Some(tally) => msg.field("Final Tally", tally_lines(tally), false),
                None => msg.field("Final Tally", NOT_AVAILABLE, false),
            }
        }
    }
}

fn plan_fields(msg: Message, plan: &UpgradePlan) -> Message {
    let msg =
        msg.field("Name", plan.name.as_str(), true).field("Height", plan.height.to_string(), true);
    if plan.info.is_empty() { msg } else { msg.field("Info", plan.info.as_str(), false) }
}

/// Upgrade notification. `blocks_remaining` is shown for scheduled plans.
pub fn upgrade_message(chain: &str, event: &UpgradeEvent, blocks_remaining: Option<u64>) -> Message {
    match event {
        UpgradeEvent::Scheduled { plan, previous } => {
            let (title, description) = match previous {
                None => (
                    "⬆️ Upgrade Scheduled",
                    format!("A software upgrade is scheduled on **{}**.", chain_label(chain)),
                ),
                Some(prev) => (
                    "⬆️ Upgrade Plan Changed",
                    format!(
                        "The upgrade plan on **{}** changed from `{}` to `{}`.",
                        chain_label(chain),
                        prev.name,
                        plan.name
                    ),
                ),
            };
            let remaining =
                blocks_remaining.map_or_else(|| NOT_AVAILABLE.to_owned(), |b| b.to_string());
            plan_fields(base(title, Color::GOLD).description(description), plan)
                .field("Blocks Remaining", remaining, true)
        }
        UpgradeEvent::Cleared { previous } => plan_fields(
            base("✅ Upgrade Completed or Cancelled", Color::GREEN).description(format!(
                "The upgrade plan `{}` on **{}** is no longer pending.",
                previous.name,
                chain_label(chain)
            )),
            previous,
        ),
    }
}

/// Overview of every configured chain.
pub fn chain_list(registry: &ChainRegistry) -> Message {
    registry.iter().fold(
        Message::new("Supported Networks", Color::GREEN)
            .description("The following networks are supported by the monitoring service."),
        |msg, chain| {
            let monitoring = if chain.missed_blocks_supported { "Enabled" } else { "Disabled" };
            msg.field(
                chain_label(&chain.name),
                format!("**Token:** {}\n**Monitoring:** {monitoring}", chain.token_symbol),
                true,
            )
        },
    )
}

/// Command overview.
pub fn help() -> Message {
    Message::new("Cosmos Validator Monitoring Bot", Color::BLUE)
        .description(
            "This bot provides monitoring and alerting for Cosmos-based network validators.",
        )
        .field(
            "Core Features",
            "- **Multi-Chain Support**: Monitor validators across supported networks.\n\
             - **Real-time Alerting**: Jailing, status changes and missed blocks.\n\
             - **Governance & Upgrade Tracking**: Proposals and network upgrades.\n\
             - **On-demand Status Checks**: Instantly check any validator.",
            false,
        )
        .field(
            "Available Commands",
            "- `/register`: Add a validator for monitoring.\n\
             - `/unregister`: Remove a validator from your list.\n\
             - `/myvalidators`: List the validators you monitor.\n\
             - `/validator_status`: Get an instant status report.\n\
             - `/set_validator_notifications`: Pause or resume alerts for a validator.\n\
             - `/set_chain_notifications`: Configure governance and upgrade alerts here.\n\
             - `/list_chains`: View all supported networks.\n\
             - `/test_notification`: Send a sample alert to this channel.",
            false,
        )
        .footer(FOOTER)
}

/// Sample jailed alert used to check channel permissions.
pub fn test_alert() -> Message {
    let report = ValidatorStatusReport {
        moniker: "TestValidator".to_owned(),
        bond_status: primitives::BondStatus::Bonded,
        jailed: true,
        missed_blocks: 120,
        total_stake: Some("1,234,567.89 TST".to_owned()),
        uptime: Some(98.80),
    };
    let uptime_bar = create_progress_bar(98.80, UPTIME_BAR_CELLS);
    base("🔴 Critical Alert: Validator Jailed (Test)", Color::RED)
        .description("This is a test notification to confirm alerts are configured correctly.")
        .field("Chain", "EXAMPLE-CHAIN", true)
        .field("Status", report.display_status().as_str(), true)
        .field("Jailed", "Yes", true)
        .field("Missed Blocks", format_missed_blocks(report.missed_blocks), true)
        .field("Total Stake", report.total_stake.as_deref().unwrap_or(NOT_AVAILABLE), true)
        .field(
            "Estimated Uptime",
            format!("`{uptime_bar}` **{}**", format_uptime(report.uptime)),
            false,
        )
}

#[cfg(test)]
mod tests {
    use primitives::BondStatus;

    use super::*;
    use crate::test_utils::chain_config;

    fn report(jailed: bool, missed_blocks: i64, uptime: Option<f64>) -> ValidatorStatusReport {
        ValidatorStatusReport {
            moniker: "Node".to_owned(),
            bond_status: BondStatus::Bonded,
            jailed,
            missed_blocks,
            total_stake: Some("10.00 HUB".to_owned()),
            uptime,
        }
    }

    #[test]
    fn status_card_fields() {
        let chain = chain_config("hub", "http://localhost");
        let card = status_card(&chain, "hubvaloper1abc", &report(true, 120, Some(98.8)));

        assert_eq!(card.title(), "Validator Status: Node");
        assert_eq!(card.color(), Color::RED);
        assert_eq!(card.description_text(), Some("Chain: **HUB**\nAddress: `hubvaloper1abc`"));
        assert_eq!(card.field_value("Status"), Some("JAILED"));
        assert_eq!(card.field_value("Jailed"), Some("Yes"));
        assert_eq!(card.field_value("Missed Blocks"), Some("120"));
        assert!(card.field_value("Estimated Uptime").unwrap().ends_with("**98.80%**"));
    }

    #[test]
    fn status_card_without_slashing_data() {
        let chain = chain_config("hub", "http://localhost");
        let card = status_card(&chain, "hubvaloper1abc", &report(false, -1, None));
        assert_eq!(card.color(), Color::BLUE);
        assert_eq!(card.field_value("Missed Blocks"), Some("N/A"));
        assert!(card.field_value("Estimated Uptime").unwrap().ends_with("**N/A**"));
    }

    #[test]
    fn health_alert_titles() {
        let msg = health_alert(
            HealthAlert::MissedBlocksWarning,
            "hub",
            "Node",
            ValidatorStatus::WarningMissedBlocks,
            55,
        );
        assert_eq!(msg.title(), "🟠 Warning: Missed Blocks Threshold Reached");
        assert_eq!(msg.field_value("Chain"), Some("HUB"));
        assert_eq!(msg.field_value("Status"), Some("WARNING_MISSED_BLOCKS"));
        assert_eq!(msg.field_value("Missed Blocks"), Some("55"));

        let change = health_alert(
            HealthAlert::StatusChange {
                from: ValidatorStatus::Bonded,
                to: ValidatorStatus::Unbonding,
            },
            "hub",
            "Node",
            ValidatorStatus::Unbonding,
            -1,
        );
        assert_eq!(change.title(), "Validator Status Update");
        assert_eq!(change.field_value("Previous Status"), Some("BONDED"));
    }

    #[test]
    fn final_tally_shows_percentages() {
        let proposal = Proposal {
            id: 12,
            title: "Raise cap".to_owned(),
            status: ProposalStatus::Passed,
            voting_end_time: None,
        };
        let tally = TallyResult { yes: 75, no: 25, abstain: 0, no_with_veto: 0 };
        let msg = governance_message("hub", &GovernanceEvent::Finalized(proposal), Some(&tally));

        assert_eq!(msg.color(), Color::GREEN);
        let lines = msg.field_value("Final Tally").unwrap();
        assert!(lines.contains("Yes: **75.00%**"));
        assert!(lines.contains("No: **25.00%**"));
    }

    #[test]
    fn upgrade_messages() {
        let plan = UpgradePlan { name: "v2".to_owned(), height: 1000, info: String::new() };
        let scheduled = upgrade_message(
            "hub",
            &UpgradeEvent::Scheduled { plan: plan.clone(), previous: None },
            Some(100),
        );
        assert_eq!(scheduled.title(), "⬆️ Upgrade Scheduled");
        assert_eq!(scheduled.field_value("Blocks Remaining"), Some("100"));
        assert_eq!(scheduled.field_value("Info"), None);

        let cleared = upgrade_message("hub", &UpgradeEvent::Cleared { previous: plan }, None);
        assert_eq!(cleared.title(), "✅ Upgrade Completed or Cancelled");
        assert_eq!(cleared.field_value("Name"), Some("v2"));
    }

    #[test]
    fn test_alert_sample() {
        let msg = test_alert();
        assert_eq!(msg.title(), "🔴 Critical Alert: Validator Jailed (Test)");
        assert_eq!(msg.field_value("Total Stake"), Some("1,234,567.89 TST"));
        assert_eq!(msg.field_value("Status"), Some("JAILED"));
    }
}
