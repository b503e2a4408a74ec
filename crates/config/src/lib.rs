//! Validator monitor configuration
use clap::Parser;
use url::Url;

mod chains;

pub use chains::{ChainConfig, ChainRegistry, GovApiVersion};

/// Default Discord REST API base URL
pub const DEFAULT_DISCORD_API_URL: &str = "https://discord.com/api/v10";

/// Discord bot configuration options
#[derive(Debug, Clone, Parser)]
pub struct DiscordOpts {
    /// Discord bot token
    #[clap(long = "discord-bot-token", env = "DISCORD_BOT_TOKEN", hide_env_values = true)]
    pub bot_token: String,
    /// Discord REST API base URL
    #[clap(long = "discord-api-url", env = "DISCORD_API_URL", default_value = DEFAULT_DISCORD_API_URL)]
    pub api_url: Url,
}

/// Database configuration options
#[derive(Debug, Clone, Parser)]
pub struct DatabaseOpts {
    /// SQLite database URL
    #[clap(long = "database-url", env = "DATABASE_URL", default_value = "sqlite://validator_monitor.db")]
    pub url: String,
}

/// Monitoring configuration options
#[derive(Debug, Clone, Parser)]
pub struct MonitorOpts {
    /// Path to the chain registry file
    #[clap(long, env = "CHAINS_CONFIG", default_value = "chains.toml")]
    pub chains_config: std::path::PathBuf,
    /// Missed-block count at which a validator is flagged
    #[clap(long, env = "MISSED_BLOCKS_THRESHOLD", default_value = "50")]
    pub missed_blocks_threshold: i64,
    /// Validator health poll interval in seconds
    #[clap(long, env = "VALIDATOR_POLL_INTERVAL_SECS", default_value = "60")]
    pub validator_poll_interval_secs: u64,
    /// Governance poll interval in seconds
    #[clap(long, env = "GOVERNANCE_POLL_INTERVAL_SECS", default_value = "300")]
    pub governance_poll_interval_secs: u64,
    /// Upgrade plan poll interval in seconds
    #[clap(long, env = "UPGRADE_POLL_INTERVAL_SECS", default_value = "3600")]
    pub upgrade_poll_interval_secs: u64,
    /// Timeout for chain REST API requests in seconds
    #[clap(long, env = "HTTP_TIMEOUT_SECS", default_value = "10")]
    pub http_timeout_secs: u64,
}

/// CLI options for the validator monitor
#[derive(Debug, Clone, Parser)]
#[clap(version, about = "Cosmos validator monitoring notifier")]
pub struct Opts {
    /// Discord bot configuration
    #[clap(flatten)]
    pub discord: DiscordOpts,

    /// Database configuration
    #[clap(flatten)]
    pub database: DatabaseOpts,

    /// Monitoring configuration
    #[clap(flatten)]
    pub monitor: MonitorOpts,
}
