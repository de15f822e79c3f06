// # zonesyncd - zone reconciliation runner
//
// Thin integration layer: all reconciliation logic lives in zonesync-core
// and the provider crates.
//
// The zonesyncd binary is responsible for:
// 1. Reading configuration from environment variables
// 2. Initializing logging and the runtime
// 3. Registering providers
// 4. Loading the desired state and syncing every zone in it once
//
// ## Configuration
//
// All configuration is done via environment variables:
//
// ### DNS Provider
// - `ZONESYNC_PROVIDER_TYPE`: Provider type (ultra)
// - `ZONESYNC_ULTRA_USERNAME`: API username
// - `ZONESYNC_ULTRA_PASSWORD`: API password
// - `ZONESYNC_ULTRA_ACCOUNT`: Account new zones are created under
// - `ZONESYNC_ULTRA_TEST_ENDPOINT`: `true`/`1` to use the test host
//
// ### Desired State
// - `ZONESYNC_DESIRED_STATE`: Path to the desired-state JSON document
//
// ### Run
// - `ZONESYNC_MODE`: `dry-run` (default, plan only) or `apply`
// - `ZONESYNC_LOG_LEVEL`: trace, debug, info (default), warn, error
//
// ## Example
//
// ```bash
// export ZONESYNC_ULTRA_USERNAME=user
// export ZONESYNC_ULTRA_PASSWORD=secret
// export ZONESYNC_ULTRA_ACCOUNT=myaccount
// export ZONESYNC_DESIRED_STATE=/etc/zonesync/zones.json
// export ZONESYNC_MODE=apply
//
// zonesyncd
// ```

use anyhow::{Context, Result};
use std::env;
use std::process::ExitCode;
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;
use zonesync_core::{DesiredState, EngineConfig, EngineEvent, ProviderConfig, SyncConfig};

/// Exit codes for different termination scenarios
///
/// - 0: Every zone synced (or planned, in dry-run mode)
/// - 1: Configuration or startup error
/// - 2: A zone failed to plan or apply
/// - 3: Interrupted before the run finished
#[derive(Debug, Clone, Copy)]
enum ZonesyncExitCode {
    Success = 0,
    ConfigError = 1,
    RuntimeError = 2,
    Interrupted = 3,
}

impl From<ZonesyncExitCode> for ExitCode {
    fn from(code: ZonesyncExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Application configuration
struct Config {
    provider_type: String,
    username: String,
    password: String,
    account_name: String,
    test_endpoint: bool,
    desired_state_path: String,
    mode: String,
    log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        Ok(Self {
            provider_type: env::var("ZONESYNC_PROVIDER_TYPE")
                .unwrap_or_else(|_| "ultra".to_string()),
            username: env::var("ZONESYNC_ULTRA_USERNAME")
                .context("ZONESYNC_ULTRA_USERNAME is required")?,
            password: env::var("ZONESYNC_ULTRA_PASSWORD")
                .context("ZONESYNC_ULTRA_PASSWORD is required")?,
            account_name: env::var("ZONESYNC_ULTRA_ACCOUNT")
                .context("ZONESYNC_ULTRA_ACCOUNT is required")?,
            test_endpoint: env::var("ZONESYNC_ULTRA_TEST_ENDPOINT")
                .map(|v| parse_flag(&v))
                .unwrap_or(false),
            desired_state_path: env::var("ZONESYNC_DESIRED_STATE")
                .context("ZONESYNC_DESIRED_STATE is required")?,
            mode: env::var("ZONESYNC_MODE").unwrap_or_else(|_| "dry-run".to_string()),
            log_level: env::var("ZONESYNC_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        match self.provider_type.as_str() {
            "ultra" => {}
            _ => anyhow::bail!(
                "ZONESYNC_PROVIDER_TYPE '{}' is not supported. \
                Supported providers: ultra",
                self.provider_type
            ),
        }

        match self.mode.as_str() {
            "dry-run" | "apply" => {}
            _ => anyhow::bail!(
                "ZONESYNC_MODE '{}' is not valid. Valid modes: dry-run, apply",
                self.mode
            ),
        }

        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!(
                "ZONESYNC_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }

        if !std::path::Path::new(&self.desired_state_path).is_file() {
            anyhow::bail!(
                "ZONESYNC_DESIRED_STATE does not point to a file: {}",
                self.desired_state_path
            );
        }

        self.sync_config().validate()?;
        Ok(())
    }

    fn sync_config(&self) -> SyncConfig {
        let provider = ProviderConfig::Ultra {
            username: self.username.clone(),
            password: self.password.clone(),
            account_name: self.account_name.clone(),
            test_endpoint: self.test_endpoint,
        };

        let mut config = SyncConfig::new(provider, self.desired_state_path.clone());
        config.engine = EngineConfig {
            dry_run: self.mode == "dry-run",
            ..EngineConfig::default()
        };
        config
    }

    fn log_level(&self) -> Level {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        }
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "1" | "true" | "yes")
}

fn main() -> ExitCode {
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return ZonesyncExitCode::ConfigError.into();
        }
    };

    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {:#}", e);
        return ZonesyncExitCode::ConfigError.into();
    }

    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level())
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return ZonesyncExitCode::ConfigError.into();
    }

    info!("Starting zonesyncd ({})", config.mode);

    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return ZonesyncExitCode::RuntimeError.into();
        }
    };

    let code = rt.block_on(async {
        tokio::select! {
            result = run(config.sync_config()) => match result {
                Ok(()) => ZonesyncExitCode::Success,
                Err(e) => {
                    error!("Run failed: {:#}", e);
                    ZonesyncExitCode::RuntimeError
                }
            },
            _ = tokio::signal::ctrl_c() => {
                warn!("Interrupted; changes already sent are not rolled back");
                ZonesyncExitCode::Interrupted
            }
        }
    });

    code.into()
}

/// Sync every zone of the desired state once
async fn run(config: SyncConfig) -> Result<()> {
    let registry = zonesync_core::ProviderRegistry::new();
    zonesync_provider_ultra::register(&registry);
    info!("Registered providers: {}", registry.list_providers().join(", "));

    let desired = DesiredState::from_file(&config.desired_state_path)?;
    let zones = desired.to_zones()?;
    info!(
        "Loaded {} zone(s) from {}",
        zones.len(),
        config.desired_state_path
    );

    let provider = registry.create_provider(&config.provider)?;
    let (engine, mut events) = zonesync_core::SyncEngine::new(provider, config.engine.clone())?;

    let result = engine.sync_all(&zones).await;

    events.close();
    while let Some(event) = events.recv().await {
        match event {
            EngineEvent::PlanComputed { zone, exists, summary } => info!(
                "{}: {} create, {} update, {} delete{}",
                zone,
                summary.creates,
                summary.updates,
                summary.deletes,
                if exists { "" } else { " (new zone)" }
            ),
            EngineEvent::ApplySkipped { zone, reason } => info!("{}: not applied ({})", zone, reason),
            EngineEvent::ApplySucceeded { zone, applied } => {
                info!("{}: {} change(s) applied", zone, applied)
            }
            EngineEvent::ApplyFailed { zone, error } => error!("{}: failed: {}", zone, error),
        }
    }

    let outcomes = result?;
    let applied: usize = outcomes.iter().map(|o| o.applied).sum();
    info!(
        "Run complete: {} zone(s), {} change(s) applied",
        outcomes.len(),
        applied
    );
    Ok(())
}
