use std::time::Duration;

use config::{ChainConfig, GovApiVersion};
use eyre::{Context, Result, eyre};
use reqwest::{Client as HttpClient, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::{
    gov::{self, Proposal, TallyResult},
    types::{
        CurrentPlanResponse, LatestBlockResponse, SigningInfo, SigningInfosResponse,
        SlashingParams, SlashingParamsResponse, StakingValidator, UpgradePlan, ValidatorResponse,
    },
};

const VALIDATORS_PATH: &str = "/cosmos/staking/v1beta1/validators";
const SLASHING_PARAMS_PATH: &str = "/cosmos/slashing/v1beta1/params";
const SIGNING_INFOS_PATH: &str = "/cosmos/slashing/v1beta1/signing_infos";
const CURRENT_PLAN_PATH: &str = "/cosmos/upgrade/v1beta1/current_plan";
const LATEST_BLOCK_PATH: &str = "/cosmos/base/tendermint/v1beta1/blocks/latest";

/// Page size requested from paginated list endpoints.
const PAGE_LIMIT: &str = "1000";
/// Upper bound on pages followed for a single list.
const MAX_PAGES: usize = 50;

/// Client for a chain's REST (LCD) API.
///
/// One instance is shared across chains; every request carries the timeout given at
/// construction so an unreachable endpoint only delays the caller.
#[derive(Debug, Clone)]
pub struct ChainClient {
    http: HttpClient,
}

impl ChainClient {
    /// Create a new client with the given per-request timeout.
    pub fn new(timeout: Duration) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .wrap_err("failed to build chain REST client")?;
        Ok(Self { http })
    }

    async fn get_text(&self, url: &str) -> Result<(StatusCode, String)> {
        let resp = self.http.get(url).send().await.wrap_err_with(|| format!("GET {url} failed"))?;
        let status = resp.status();
        let text = resp.text().await.wrap_err_with(|| format!("failed to read body of {url}"))?;
        debug!(%url, %status, bytes = text.len(), "chain REST response");
        Ok((status, text))
    }

    async fn get_success_text(&self, url: &str) -> Result<String> {
        let (status, text) = self.get_text(url).await?;
        if !status.is_success() {
            let snippet = text.chars().take(200).collect::<String>();
            return Err(eyre!("GET {url} returned {status}: {snippet}"));
        }
        Ok(text)
    }

    /// Fetch `url` and deserialize the JSON body. Non-2xx statuses and malformed bodies are
    /// errors.
    pub async fn fetch_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let text = self.get_success_text(url).await?;
        serde_json::from_str(&text).wrap_err_with(|| format!("malformed JSON from {url}"))
    }

    /// Like [`Self::fetch_json`] but maps `404 Not Found` to `None`.
    pub async fn fetch_optional_json<T: DeserializeOwned>(&self, url: &str) -> Result<Option<T>> {
        let (status, text) = self.get_text(url).await?;
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(eyre!("GET {url} returned {status}"));
        }
        serde_json::from_str(&text).map(Some).wrap_err_with(|| format!("malformed JSON from {url}"))
    }

    /// Fetch a single validator by operator address.
    pub async fn validator(&self, chain: &ChainConfig, address: &str) -> Result<StakingValidator> {
        // The address is user input; push it as one encoded segment.
        let mut url = Url::parse(&chain.endpoint(VALIDATORS_PATH))
            .wrap_err_with(|| format!("invalid REST URL for chain {}", chain.name))?;
        url.path_segments_mut()
            .map_err(|()| eyre!("REST URL for chain {} cannot be a base", chain.name))?
            .push(address);
        Ok(self.fetch_json::<ValidatorResponse>(url.as_str()).await?.validator)
    }

    /// Fetch the slashing module parameters.
    pub async fn slashing_params(&self, chain: &ChainConfig) -> Result<SlashingParams> {
        let url = chain.endpoint(SLASHING_PARAMS_PATH);
        Ok(self.fetch_json::<SlashingParamsResponse>(&url).await?.params)
    }

    /// Fetch all signing infos, following pagination.
    pub async fn signing_infos(&self, chain: &ChainConfig) -> Result<Vec<SigningInfo>> {
        let base = chain.endpoint(SIGNING_INFOS_PATH);
        let mut infos = Vec::new();
        let mut next_key: Option<String> = None;

        for _ in 0..MAX_PAGES {
            let mut params = vec![("pagination.limit", PAGE_LIMIT.to_owned())];
            if let Some(key) = next_key.take() {
                params.push(("pagination.key", key));
            }
            let url = Url::parse_with_params(&base, &params)
                .wrap_err_with(|| format!("invalid signing infos URL {base}"))?;

            let page: SigningInfosResponse = self.fetch_json(url.as_str()).await?;
            infos.extend(page.info);

            match page.pagination.and_then(|p| p.next_key).filter(|k| !k.is_empty()) {
                Some(key) => next_key = Some(key),
                None => return Ok(infos),
            }
        }

        debug!(chain = %chain.name, pages = MAX_PAGES, "signing infos truncated at page limit");
        Ok(infos)
    }

    /// Fetch the proposal list, newest first.
    pub async fn proposals(
        &self,
        chain: &ChainConfig,
        version: GovApiVersion,
    ) -> Result<Vec<Proposal>> {
        let base = chain.endpoint(&format!("/cosmos/gov/{}/proposals", version.path()));
        let url = Url::parse_with_params(
            &base,
            &[("pagination.limit", "100"), ("pagination.reverse", "true")],
        )
        .wrap_err_with(|| format!("invalid proposals URL {base}"))?;
        let text = self.get_success_text(url.as_str()).await?;
        gov::parse_proposals(version, &text)
    }

    /// Fetch the tally of a proposal.
    pub async fn tally(
        &self,
        chain: &ChainConfig,
        version: GovApiVersion,
        proposal_id: u64,
    ) -> Result<TallyResult> {
        let path = format!("/cosmos/gov/{}/proposals/{proposal_id}/tally", version.path());
        let url = chain.endpoint(&path);
        let text = self.get_success_text(&url).await?;
        gov::parse_tally(version, &text)
    }

    /// Fetch the currently scheduled upgrade plan. A 404 means no plan is set.
    pub async fn current_plan(&self, chain: &ChainConfig) -> Result<Option<UpgradePlan>> {
        let url = chain.endpoint(CURRENT_PLAN_PATH);
        Ok(self.fetch_optional_json::<CurrentPlanResponse>(&url).await?.and_then(|r| r.plan))
    }

    /// Fetch the latest block height.
    pub async fn latest_height(&self, chain: &ChainConfig) -> Result<u64> {
        let url = chain.endpoint(LATEST_BLOCK_PATH);
        Ok(self.fetch_json::<LatestBlockResponse>(&url).await?.block.header.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gov::ProposalStatus;
    use mockito::{Matcher, Server};
    use primitives::BondStatus;

    fn chain(url: &str) -> ChainConfig {
        ChainConfig {
            name: "testchain".to_owned(),
            rest_api_url: url.parse().unwrap(),
            valoper_prefix: "testvaloper".to_owned(),
            valcons_prefix: "testvalcons".to_owned(),
            token_symbol: "TST".to_owned(),
            decimals: 6,
            missed_blocks_supported: true,
            gov_api_version: Some(GovApiVersion::V1),
            upgrade_supported: true,
        }
    }

    fn client() -> ChainClient {
        ChainClient::new(Duration::from_secs(2)).unwrap()
    }

    #[tokio::test]
    async fn fetches_validator() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/cosmos/staking/v1beta1/validators/testvaloper1abc")
            .with_status(200)
            .with_body(
                r#"{"validator": {"operator_address": "testvaloper1abc", "jailed": true,
                "status": "BOND_STATUS_UNBONDING", "delegator_shares": "5",
                "description": {"moniker": "M"}}}"#,
            )
            .create_async()
            .await;

        let v = client().validator(&chain(&server.url()), "testvaloper1abc").await.unwrap();
        assert!(v.jailed);
        assert_eq!(v.status, BondStatus::Unbonding);
        assert!(v.consensus_pubkey.is_none());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn validator_address_stays_in_its_path_segment() {
        let mut server = Server::new_async().await;
        let escaped = server
            .mock("GET", "/cosmos/staking/v1beta1/validators/testvaloper1x%2F..%2F..%2Fparams")
            .with_status(404)
            .expect(1)
            .create_async()
            .await;
        let traversal = server
            .mock("GET", Matcher::Regex("^/cosmos/staking/v1beta1/params".to_owned()))
            .expect(0)
            .create_async()
            .await;

        let chain = chain(&server.url());
        assert!(client().validator(&chain, "testvaloper1x/../../params").await.is_err());
        escaped.assert_async().await;
        traversal.assert_async().await;
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/cosmos/staking/v1beta1/validators/testvaloper1abc")
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;

        let err = client().validator(&chain(&server.url()), "testvaloper1abc").await.unwrap_err();
        assert!(err.to_string().contains("500"));
    }

    #[tokio::test]
    async fn missing_fields_are_an_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/cosmos/slashing/v1beta1/params")
            .with_status(200)
            .with_body(r#"{"params": {}}"#)
            .create_async()
            .await;

        assert!(client().slashing_params(&chain(&server.url())).await.is_err());
    }

    #[tokio::test]
    async fn follows_signing_info_pagination() {
        let mut server = Server::new_async().await;
        let first = server
            .mock("GET", "/cosmos/slashing/v1beta1/signing_infos")
            .match_query(Matcher::Exact("pagination.limit=1000".to_owned()))
            .with_status(200)
            .with_body(
                r#"{"info": [{"address": "a", "missed_blocks_counter": "1"}],
                "pagination": {"next_key": "a2V5Kw==", "total": "2"}}"#,
            )
            .create_async()
            .await;
        let second = server
            .mock("GET", "/cosmos/slashing/v1beta1/signing_infos")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("pagination.limit".into(), "1000".into()),
                Matcher::UrlEncoded("pagination.key".into(), "a2V5Kw==".into()),
            ]))
            .with_status(200)
            .with_body(
                r#"{"info": [{"address": "b", "missed_blocks_counter": "2"}],
                "pagination": {"next_key": null}}"#,
            )
            .create_async()
            .await;

        let infos = client().signing_infos(&chain(&server.url())).await.unwrap();
        assert_eq!(infos.iter().map(|i| i.address.as_str()).collect::<Vec<_>>(), ["a", "b"]);
        first.assert_async().await;
        second.assert_async().await;
    }

    #[tokio::test]
    async fn current_plan_404_means_no_plan() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/cosmos/upgrade/v1beta1/current_plan")
            .with_status(404)
            .with_body(r#"{"code": 5, "message": "not found"}"#)
            .create_async()
            .await;

        assert_eq!(client().current_plan(&chain(&server.url())).await.unwrap(), None);
    }

    #[tokio::test]
    async fn current_plan_present() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/cosmos/upgrade/v1beta1/current_plan")
            .with_status(200)
            .with_body(r#"{"plan": {"name": "v2", "height": "1000", "info": "{}"}}"#)
            .create_async()
            .await;

        let plan = client().current_plan(&chain(&server.url())).await.unwrap().unwrap();
        assert_eq!(plan.name, "v2");
        assert_eq!(plan.height, 1000);
    }

    #[tokio::test]
    async fn latest_height_and_proposals() {
        let mut server = Server::new_async().await;
        let _block = server
            .mock("GET", "/cosmos/base/tendermint/v1beta1/blocks/latest")
            .with_status(200)
            .with_body(r#"{"block_id": {}, "block": {"header": {"height": "987"}}}"#)
            .create_async()
            .await;
        let _proposals = server
            .mock("GET", "/cosmos/gov/v1/proposals")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"proposals": [{"id": "1", "title": "T", "status": "PROPOSAL_STATUS_VOTING_PERIOD"}]}"#)
            .create_async()
            .await;
        let _tally = server
            .mock("GET", "/cosmos/gov/v1/proposals/1/tally")
            .with_status(200)
            .with_body(r#"{"tally": {"yes_count": "1", "no_count": "1", "abstain_count": "0", "no_with_veto_count": "0"}}"#)
            .create_async()
            .await;

        let c = chain(&server.url());
        let client = client();
        assert_eq!(client.latest_height(&c).await.unwrap(), 987);

        let proposals = client.proposals(&c, GovApiVersion::V1).await.unwrap();
        assert_eq!(proposals[0].status, ProposalStatus::VotingPeriod);

        let tally = client.tally(&c, GovApiVersion::V1, 1).await.unwrap();
        assert_eq!(tally.total(), 2);
    }

    #[tokio::test]
    async fn unreachable_endpoint_errors() {
        let client = ChainClient::new(Duration::from_millis(200)).unwrap();
        assert!(client.latest_height(&chain("http://127.0.0.1:9")).await.is_err());
    }
}
