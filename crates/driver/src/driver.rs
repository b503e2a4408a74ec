//! valwatch Driver - wires configuration, storage, delivery and the monitors together

use std::{future::Future, sync::Arc, time::Duration};

use chainio::ChainClient;
use commands::CommandService;
use config::{ChainRegistry, MonitorOpts, Opts};
use derive_more::Debug;
use eyre::{Context, Result, bail};
use futures::future::join_all;
use notifier::{DiscordClient, Notifier};
use runtime::shutdown::{RunOutcome, run_until_shutdown};
use store::SqliteRepository;
use tracing::{error, info, warn};

/// Owns the shared resources of a running monitor process.
#[derive(Debug)]
pub struct Driver {
    pub(crate) registry: Arc<ChainRegistry>,
    pub(crate) client: ChainClient,
    pub(crate) repository: SqliteRepository,
    #[debug(skip)]
    pub(crate) notifier: Arc<dyn Notifier>,
    pub(crate) monitor: MonitorOpts,
}

fn validate(opts: &MonitorOpts) -> Result<()> {
    if opts.missed_blocks_threshold <= 0 {
        bail!("missed blocks threshold must be positive, got {}", opts.missed_blocks_threshold);
    }
    for (name, secs) in [
        ("validator poll interval", opts.validator_poll_interval_secs),
        ("governance poll interval", opts.governance_poll_interval_secs),
        ("upgrade poll interval", opts.upgrade_poll_interval_secs),
        ("HTTP timeout", opts.http_timeout_secs),
    ] {
        if secs == 0 {
            bail!("{name} must be at least one second");
        }
    }
    if opts.http_timeout_secs > opts.validator_poll_interval_secs {
        warn!(
            timeout_secs = opts.http_timeout_secs,
            interval_secs = opts.validator_poll_interval_secs,
            "HTTP timeout exceeds the validator poll interval; cycles will be delayed"
        );
    }
    Ok(())
}

impl Driver {
    /// Create a new driver with the given configuration
    pub async fn new(opts: Opts) -> Result<Self> {
        info!("Initializing driver");
        validate(&opts.monitor)?;

        let registry = ChainRegistry::load(&opts.monitor.chains_config)?;
        info!(chains = registry.len(), "chain registry loaded");

        let timeout = Duration::from_secs(opts.monitor.http_timeout_secs);
        let client = ChainClient::new(timeout)?;
        let notifier = DiscordClient::new(opts.discord.api_url, opts.discord.bot_token, timeout)?;
        let repository = SqliteRepository::connect(&opts.database.url)
            .await
            .wrap_err("failed to open database")?;

        Ok(Self::from_parts(registry, client, repository, Arc::new(notifier), opts.monitor))
    }

    /// Assemble a driver from already constructed parts.
    pub fn from_parts(
        registry: ChainRegistry,
        client: ChainClient,
        repository: SqliteRepository,
        notifier: Arc<dyn Notifier>,
        monitor: MonitorOpts,
    ) -> Self {
        Self { registry: Arc::new(registry), client, repository, notifier, monitor }
    }

    /// Command service sharing this driver's registry, client, database and notifier.
    pub fn commands(&self) -> CommandService {
        CommandService::new(
            self.registry.clone(),
            self.client.clone(),
            Arc::new(self.repository.clone()),
            self.notifier.clone(),
        )
    }

    /// Run the monitors until `shutdown` resolves, then stop them and close the database.
    pub async fn run<S>(self, shutdown: S) -> Result<()>
    where
        S: Future<Output = ()>,
    {
        let handles = self.start_monitors();
        let aborts: Vec<_> = handles.iter().map(|h| h.abort_handle()).collect();
        let repository = self.repository.clone();
        info!(monitors = handles.len(), "valwatch running");

        let outcome = run_until_shutdown(join_all(handles), shutdown, move || async move {
            for handle in &aborts {
                handle.abort();
            }
            repository.close().await;
        })
        .await;

        match outcome {
            RunOutcome::Interrupted => {
                info!("Shutdown complete");
                Ok(())
            }
            RunOutcome::Completed(results) => {
                for result in results.into_iter().filter_map(|r| r.err()) {
                    error!(error = %result, "monitor task failed");
                }
                bail!("all monitors stopped unexpectedly")
            }
        }
    }
}
