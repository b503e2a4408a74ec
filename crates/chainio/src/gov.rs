//! Governance proposals, normalised across the `v1beta1` and `v1` REST APIs.
//!
//! Each API version has its own parser module returning the same [`Proposal`] and
//! [`TallyResult`] records, so nothing downstream has to know which schema a chain serves.

use chrono::{DateTime, Utc};
use config::GovApiVersion;
use eyre::{Result, WrapErr};
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::Value;
use tracing::warn;

/// Lifecycle status of a proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum ProposalStatus {
    /// Waiting for the minimum deposit
    #[serde(rename = "PROPOSAL_STATUS_DEPOSIT_PERIOD")]
    DepositPeriod,
    /// Open for votes
    #[serde(rename = "PROPOSAL_STATUS_VOTING_PERIOD")]
    VotingPeriod,
    /// Passed
    #[serde(rename = "PROPOSAL_STATUS_PASSED")]
    Passed,
    /// Rejected by vote
    #[serde(rename = "PROPOSAL_STATUS_REJECTED")]
    Rejected,
    /// Passed but execution failed
    #[serde(rename = "PROPOSAL_STATUS_FAILED")]
    Failed,
    /// Anything else
    #[serde(other, rename = "PROPOSAL_STATUS_UNSPECIFIED")]
    Unspecified,
}

impl ProposalStatus {
    /// Whether the proposal has reached a final state.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Passed | Self::Rejected | Self::Failed)
    }

    /// Human-readable label.
    pub const fn label(self) -> &'static str {
        match self {
            Self::DepositPeriod => "Deposit Period",
            Self::VotingPeriod => "Voting Period",
            Self::Passed => "Passed",
            Self::Rejected => "Rejected",
            Self::Failed => "Failed",
            Self::Unspecified => "Unspecified",
        }
    }
}

/// A proposal in the shape the classifier works with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Proposal {
    /// Proposal id
    pub id: u64,
    /// Title, or a placeholder when the chain does not expose one
    pub title: String,
    /// Current status
    pub status: ProposalStatus,
    /// End of the voting period, when known
    pub voting_end_time: Option<DateTime<Utc>>,
}

/// Final or running vote tally in base units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TallyResult {
    /// Yes votes
    pub yes: u128,
    /// No votes
    pub no: u128,
    /// Abstain votes
    pub abstain: u128,
    /// No-with-veto votes
    pub no_with_veto: u128,
}

/// Share of each option in a [`TallyResult`], in percent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TallyPercentages {
    /// Yes share
    pub yes: f64,
    /// No share
    pub no: f64,
    /// Abstain share
    pub abstain: f64,
    /// No-with-veto share
    pub no_with_veto: f64,
}

impl TallyResult {
    /// Sum of all options.
    pub const fn total(&self) -> u128 {
        self.yes
            .saturating_add(self.no)
            .saturating_add(self.abstain)
            .saturating_add(self.no_with_veto)
    }

    /// Percentages per option; `None` when nobody voted.
    pub fn percentages(&self) -> Option<TallyPercentages> {
        let total = self.total();
        if total == 0 {
            return None;
        }
        let pct = |v: u128| v as f64 / total as f64 * 100.0;
        Some(TallyPercentages {
            yes: pct(self.yes),
            no: pct(self.no),
            abstain: pct(self.abstain),
            no_with_veto: pct(self.no_with_veto),
        })
    }
}

fn parse_amount(field: &str, raw: &str) -> Result<u128> {
    // Some chains return decimal strings for vote weights.
    let int_part = raw.split('.').next().unwrap_or(raw);
    if int_part.is_empty() {
        return Ok(0);
    }
    int_part.parse().wrap_err_with(|| format!("invalid tally {field} `{raw}`"))
}

/// Convert each list entry on its own, skipping entries that fail to decode.
fn decode_each<R, F>(entries: Vec<Value>, convert: F) -> Vec<Proposal>
where
    R: DeserializeOwned,
    F: Fn(R) -> Result<Proposal>,
{
    entries
        .into_iter()
        .filter_map(|entry| {
            let decoded = serde_json::from_value::<R>(entry)
                .wrap_err("malformed proposal")
                .and_then(&convert);
            decoded.inspect_err(|e| warn!(error = %e, "skipping proposal")).ok()
        })
        .collect()
}

fn fallback_title(id: u64) -> String {
    format!("Proposal #{id}")
}

/// Parse a proposal list for the given API version.
pub fn parse_proposals(version: GovApiVersion, body: &str) -> Result<Vec<Proposal>> {
    match version {
        GovApiVersion::V1beta1 => v1beta1::parse_proposals(body),
        GovApiVersion::V1 => v1::parse_proposals(body),
    }
}

/// Parse a tally response for the given API version.
pub fn parse_tally(version: GovApiVersion, body: &str) -> Result<TallyResult> {
    match version {
        GovApiVersion::V1beta1 => v1beta1::parse_tally(body),
        GovApiVersion::V1 => v1::parse_tally(body),
    }
}

/// Parser for `/cosmos/gov/v1beta1`.
pub mod v1beta1 {
    use super::*;

    #[derive(Deserialize)]
    struct ProposalsResponse {
        #[serde(default)]
        proposals: Vec<Value>,
    }

    #[derive(Deserialize)]
    struct RawProposal {
        proposal_id: String,
        #[serde(default)]
        content: Option<Content>,
        status: ProposalStatus,
        #[serde(default)]
        voting_end_time: Option<DateTime<Utc>>,
    }

    #[derive(Deserialize)]
    struct Content {
        #[serde(default)]
        title: Option<String>,
    }

    #[derive(Deserialize)]
    struct TallyResponse {
        tally: RawTally,
    }

    #[derive(Deserialize)]
    struct RawTally {
        yes: String,
        no: String,
        abstain: String,
        no_with_veto: String,
    }

    /// Parse `GET /cosmos/gov/v1beta1/proposals`.
    pub fn parse_proposals(body: &str) -> Result<Vec<Proposal>> {
        let resp: ProposalsResponse =
            serde_json::from_str(body).wrap_err("malformed v1beta1 proposals response")?;
        Ok(decode_each(resp.proposals, |p: RawProposal| {
            let id = p
                .proposal_id
                .parse()
                .wrap_err_with(|| format!("invalid proposal id `{}`", p.proposal_id))?;
            let title = p
                .content
                .and_then(|c| c.title)
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| fallback_title(id));
            Ok(Proposal { id, title, status: p.status, voting_end_time: p.voting_end_time })
        }))
    }

    /// Parse `GET /cosmos/gov/v1beta1/proposals/{id}/tally`.
    pub fn parse_tally(body: &str) -> Result<TallyResult> {
        let resp: TallyResponse =
            serde_json::from_str(body).wrap_err("malformed v1beta1 tally response")?;
        let t = resp.tally;
        Ok(TallyResult {
            yes: parse_amount("yes", &t.yes)?,
            no: parse_amount("no", &t.no)?,
            abstain: parse_amount("abstain", &t.abstain)?,
            no_with_veto: parse_amount("no_with_veto", &t.no_with_veto)?,
        })
    }
}

/// Parser for `/cosmos/gov/v1`.
pub mod v1 {
    use super::*;

    #[derive(Deserialize)]
    struct ProposalsResponse {
        #[serde(default)]
        proposals: Vec<Value>,
    }

    #[derive(Deserialize)]
    struct RawProposal {
        id: String,
        #[serde(default)]
        title: Option<String>,
        #[serde(default)]
        messages: Vec<Message>,
        status: ProposalStatus,
        #[serde(default)]
        voting_end_time: Option<DateTime<Utc>>,
    }

    /// Legacy proposals wrapped in `MsgExecLegacyContent` keep their title in `content`.
    #[derive(Deserialize)]
    struct Message {
        #[serde(default)]
        content: Option<LegacyContent>,
    }

    #[derive(Deserialize)]
    struct LegacyContent {
        #[serde(default)]
        title: Option<String>,
    }

    #[derive(Deserialize)]
    struct TallyResponse {
        tally: RawTally,
    }

    #[derive(Deserialize)]
    struct RawTally {
        yes_count: String,
        no_count: String,
        abstain_count: String,
        no_with_veto_count: String,
    }

    /// Parse `GET /cosmos/gov/v1/proposals`.
    pub fn parse_proposals(body: &str) -> Result<Vec<Proposal>> {
        let resp: ProposalsResponse =
            serde_json::from_str(body).wrap_err("malformed v1 proposals response")?;
        Ok(decode_each(resp.proposals, |p: RawProposal| {
            let id = p.id.parse().wrap_err_with(|| format!("invalid proposal id `{}`", p.id))?;
            let title = p
                .title
                .filter(|t| !t.is_empty())
                .or_else(|| p.messages.into_iter().find_map(|m| m.content.and_then(|c| c.title)))
                .unwrap_or_else(|| fallback_title(id));
            Ok(Proposal { id, title, status: p.status, voting_end_time: p.voting_end_time })
        }))
    }

    /// Parse `GET /cosmos/gov/v1/proposals/{id}/tally`.
    pub fn parse_tally(body: &str) -> Result<TallyResult> {
        let resp: TallyResponse =
            serde_json::from_str(body).wrap_err("malformed v1 tally response")?;
        let t = resp.tally;
        Ok(TallyResult {
            yes: parse_amount("yes", &t.yes_count)?,
            no: parse_amount("no", &t.no_count)?,
            abstain: parse_amount("abstain", &t.abstain_count)?,
            no_with_veto: parse_amount("no_with_veto", &t.no_with_veto_count)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_v1beta1_proposals() {
        let body = r#"{
            "proposals": [
                {
                    "proposal_id": "7",
                    "content": {"@type": "/cosmos.gov.v1beta1.TextProposal", "title": "Signal", "description": "d"},
                    "status": "PROPOSAL_STATUS_VOTING_PERIOD",
                    "voting_end_time": "2024-05-01T12:00:00Z"
                },
                {"proposal_id": "8", "status": "PROPOSAL_STATUS_DEPOSIT_PERIOD"}
            ],
            "pagination": {"next_key": null, "total": "2"}
        }"#;
        let proposals = parse_proposals(GovApiVersion::V1beta1, body).unwrap();
        assert_eq!(proposals.len(), 2);
        assert_eq!(proposals[0].id, 7);
        assert_eq!(proposals[0].title, "Signal");
        assert_eq!(proposals[0].status, ProposalStatus::VotingPeriod);
        assert!(proposals[0].voting_end_time.is_some());
        assert_eq!(proposals[1].title, "Proposal #8");
    }

    #[test]
    fn parses_v1_proposals_with_legacy_title() {
        let body = r#"{
            "proposals": [
                {"id": "3", "title": "Upgrade to v2", "messages": [], "status": "PROPOSAL_STATUS_PASSED"},
                {
                    "id": "4",
                    "messages": [{"@type": "/cosmos.gov.v1.MsgExecLegacyContent", "content": {"title": "Legacy"}}],
                    "status": "PROPOSAL_STATUS_REJECTED"
                },
                {"id": "5", "title": "", "status": "PROPOSAL_STATUS_SOMETHING_NEW"}
            ]
        }"#;
        let proposals = parse_proposals(GovApiVersion::V1, body).unwrap();
        assert_eq!(proposals[0].title, "Upgrade to v2");
        assert_eq!(proposals[1].title, "Legacy");
        assert_eq!(proposals[2].title, "Proposal #5");
        assert_eq!(proposals[2].status, ProposalStatus::Unspecified);
        assert!(proposals[0].status.is_terminal());
        assert!(!ProposalStatus::VotingPeriod.is_terminal());
    }

    #[test]
    fn malformed_proposals_are_skipped() {
        let v1 = r#"{"proposals": [
            {"id": "x", "status": "PROPOSAL_STATUS_PASSED"},
            {"id": "9", "title": "Kept", "status": "PROPOSAL_STATUS_VOTING_PERIOD"},
            {"id": "10"}
        ]}"#;
        let proposals = parse_proposals(GovApiVersion::V1, v1).unwrap();
        assert_eq!(proposals.len(), 1);
        assert_eq!(proposals[0].id, 9);

        let v1beta1 = r#"{"proposals": [
            {"proposal_id": 5, "status": "PROPOSAL_STATUS_PASSED"},
            {"proposal_id": "6", "status": "PROPOSAL_STATUS_DEPOSIT_PERIOD"}
        ]}"#;
        let proposals = parse_proposals(GovApiVersion::V1beta1, v1beta1).unwrap();
        assert_eq!(proposals.iter().map(|p| p.id).collect::<Vec<_>>(), vec![6]);

        assert!(parse_proposals(GovApiVersion::V1beta1, "not json").is_err());
    }

    #[test]
    fn parses_tallies() {
        let v1beta1 = r#"{"tally": {"yes": "600", "no": "200", "abstain": "100", "no_with_veto": "100"}}"#;
        let tally = parse_tally(GovApiVersion::V1beta1, v1beta1).unwrap();
        assert_eq!(tally.total(), 1000);
        let pct = tally.percentages().unwrap();
        assert!((pct.yes - 60.0).abs() < 1e-9);
        assert!((pct.no_with_veto - 10.0).abs() < 1e-9);

        let v1 = r#"{"tally": {"yes_count": "340282366920938463463374607431768211455", "no_count": "0", "abstain_count": "0.5", "no_with_veto_count": "0"}}"#;
        let tally = parse_tally(GovApiVersion::V1, v1).unwrap();
        assert_eq!(tally.yes, u128::MAX);
        assert_eq!(tally.abstain, 0);
    }

    #[test]
    fn empty_tally_has_no_percentages() {
        assert_eq!(TallyResult::default().percentages(), None);
    }
}
