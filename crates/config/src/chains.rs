//! Static chain registry loaded from a TOML file at startup.

use std::{collections::BTreeMap, path::Path};

use eyre::{Context, Result, bail};
use primitives::address::is_valid_prefix;
use serde::Deserialize;
use url::Url;

/// Largest token decimals accepted for a chain.
const MAX_DECIMALS: u32 = 18;

/// Governance REST API version exposed by a chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GovApiVersion {
    /// `/cosmos/gov/v1beta1`
    V1beta1,
    /// `/cosmos/gov/v1`
    V1,
}

impl GovApiVersion {
    /// Path segment used in REST routes.
    pub const fn path(self) -> &'static str {
        match self {
            Self::V1beta1 => "v1beta1",
            Self::V1 => "v1",
        }
    }
}

/// Static configuration for a single chain.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChainConfig {
    /// Registry key, filled in after loading
    #[serde(skip)]
    pub name: String,
    /// REST (LCD) base URL
    pub rest_api_url: Url,
    /// Operator address prefix, e.g. `cosmosvaloper`
    pub valoper_prefix: String,
    /// Consensus address prefix, e.g. `cosmosvalcons`
    pub valcons_prefix: String,
    /// Display symbol of the staking token
    pub token_symbol: String,
    /// Decimals of the staking token
    #[serde(default = "default_decimals")]
    pub decimals: u32,
    /// Whether signing infos are exposed and missed blocks should be tracked
    #[serde(default)]
    pub missed_blocks_supported: bool,
    /// Governance API version; `None` disables governance monitoring
    #[serde(default)]
    pub gov_api_version: Option<GovApiVersion>,
    /// Whether the upgrade module's current plan endpoint is available
    #[serde(default)]
    pub upgrade_supported: bool,
}

const fn default_decimals() -> u32 {
    6
}

impl ChainConfig {
    /// Build a full REST URL for `path` (which must start with `/`).
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.rest_api_url.as_str().trim_end_matches('/'), path)
    }

    fn validate(&self) -> Result<()> {
        if self.name.is_empty() || self.name != self.name.to_lowercase() {
            bail!("chain name `{}` must be non-empty and lower-case", self.name);
        }
        for (field, prefix) in
            [("valoper_prefix", &self.valoper_prefix), ("valcons_prefix", &self.valcons_prefix)]
        {
            if prefix.is_empty() || !is_valid_prefix(prefix) {
                bail!("chain `{}`: {field} `{prefix}` is not a valid bech32 prefix", self.name);
            }
        }
        if self.token_symbol.trim().is_empty() {
            bail!("chain `{}`: token_symbol must not be empty", self.name);
        }
        if self.decimals > MAX_DECIMALS {
            bail!("chain `{}`: decimals {} exceeds {MAX_DECIMALS}", self.name, self.decimals);
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RegistryFile {
    chains: BTreeMap<String, ChainConfig>,
}

/// All chains the monitor knows about, keyed by lower-case name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChainRegistry {
    chains: BTreeMap<String, ChainConfig>,
}

impl ChainRegistry {
    /// Load and validate the registry file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("failed to read chain registry {}", path.display()))?;
        Self::from_toml(&raw)
            .wrap_err_with(|| format!("invalid chain registry {}", path.display()))
    }

    /// Parse and validate a registry from TOML text.
    pub fn from_toml(raw: &str) -> Result<Self> {
        let file: RegistryFile = toml::from_str(raw)?;
        Self::from_map(file.chains)
    }

    fn from_map(chains: BTreeMap<String, ChainConfig>) -> Result<Self> {
        if chains.is_empty() {
            bail!("no chains configured");
        }
        let chains = chains
            .into_iter()
            .map(|(name, mut chain)| {
                chain.name = name.clone();
                chain.validate().map(|()| (name, chain))
            })
            .collect::<Result<BTreeMap<_, _>>>()?;
        Ok(Self { chains })
    }

    /// Build a registry from already-constructed chain configs, keyed by their `name`.
    pub fn from_chains(chains: impl IntoIterator<Item = ChainConfig>) -> Result<Self> {
        Self::from_map(chains.into_iter().map(|c| (c.name.clone(), c)).collect())
    }

    /// Look up a chain by name (case-insensitive).
    pub fn get(&self, name: &str) -> Option<&ChainConfig> {
        self.chains.get(&name.to_lowercase())
    }

    /// Iterate over all chains in name order.
    pub fn iter(&self) -> impl Iterator<Item = &ChainConfig> {
        self.chains.values()
    }

    /// Number of configured chains.
    pub fn len(&self) -> usize {
        self.chains.len()
    }

    /// Whether no chains are configured.
    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }
}
