//! Core sync engine
//!
//! The SyncEngine is responsible for:
//! - Asking the DnsProvider for a plan per desired zone
//! - Applying the plan (unless running dry)
//! - Reporting progress as engine events
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐
//! │ Desired Zone │───────────┐
//! └──────────────┘           │
//!                            ▼
//!                    ┌──────────────┐
//!                    │  SyncEngine  │
//!                    └──────────────┘
//!                            │
//!              ┌─────────────┴─────────────┐
//!              │                           │
//!              ▼                           ▼
//!      ┌──────────────┐            ┌─────────────┐
//!      │ DnsProvider  │            │   Events    │
//!      │ (plan/apply) │            │  (notify)   │
//!      └──────────────┘            └─────────────┘
//! ```
//!
//! ## Run Flow
//!
//! 1. `provider.plan(desired)`
//! 2. Emit `PlanComputed`
//! 3. Skip apply for empty plans and dry runs
//! 4. `provider.apply(plan)`, emit `ApplySucceeded` / `ApplyFailed`
//!
//! Zones are synced one after another; the first failure stops the run.

use crate::config::EngineConfig;
use crate::error::Result;
use crate::plan::{Plan, PlanSummary};
use crate::traits::DnsProvider;
use crate::zone::Zone;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Events emitted by the SyncEngine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// Plan computed for a zone
    PlanComputed {
        zone: String,
        exists: bool,
        summary: PlanSummary,
    },

    /// Apply skipped (empty plan or dry run)
    ApplySkipped { zone: String, reason: String },

    /// Plan applied
    ApplySucceeded { zone: String, applied: usize },

    /// Plan or apply failed
    ApplyFailed { zone: String, error: String },
}

/// Result of syncing one zone
#[derive(Debug, Clone)]
pub struct SyncOutcome {
    /// The computed plan
    pub plan: Plan,
    /// Number of changes applied (0 for dry runs)
    pub applied: usize,
}

/// Core sync engine
///
/// ## Lifecycle
///
/// 1. Create with [`SyncEngine::new()`]
/// 2. Call [`SyncEngine::sync_zone()`] or [`SyncEngine::sync_all()`]
/// 3. Drain the event receiver for reporting
pub struct SyncEngine {
    /// DNS provider for reading and writing zones
    provider: Box<dyn DnsProvider>,

    /// Plan without applying
    dry_run: bool,

    /// Event sender for external monitoring
    event_tx: mpsc::Sender<EngineEvent>,
}

impl SyncEngine {
    /// Create a new sync engine
    ///
    /// # Returns
    ///
    /// A tuple of (engine, event_receiver) where event_receiver yields engine events
    pub fn new(
        provider: Box<dyn DnsProvider>,
        config: EngineConfig,
    ) -> Result<(Self, mpsc::Receiver<EngineEvent>)> {
        config.validate()?;

        let (tx, rx) = mpsc::channel(config.event_channel_capacity);

        let engine = Self {
            provider,
            dry_run: config.dry_run,
            event_tx: tx,
        };

        Ok((engine, rx))
    }

    /// Plan and apply one desired zone
    pub async fn sync_zone(&self, desired: &Zone) -> Result<SyncOutcome> {
        let zone = desired.name().to_string();

        let plan = match self.provider.plan(desired).await {
            Ok(plan) => plan,
            Err(e) => {
                error!("Planning {} failed: {}", zone, e);
                self.emit_event(EngineEvent::ApplyFailed {
                    zone,
                    error: e.to_string(),
                });
                return Err(e);
            }
        };

        let summary = plan.summary();
        info!(
            "Plan for {} via {}: {} create, {} update, {} delete (zone exists: {})",
            zone,
            self.provider.provider_name(),
            summary.creates,
            summary.updates,
            summary.deletes,
            plan.exists
        );
        for change in &plan.changes {
            debug!("  {}", change);
        }
        self.emit_event(EngineEvent::PlanComputed {
            zone: zone.clone(),
            exists: plan.exists,
            summary,
        });

        if plan.is_empty() {
            self.emit_event(EngineEvent::ApplySkipped {
                zone,
                reason: "No changes".to_string(),
            });
            return Ok(SyncOutcome { plan, applied: 0 });
        }

        if self.dry_run {
            info!("[DRY-RUN] Not applying {} change(s) to {}", plan.len(), zone);
            self.emit_event(EngineEvent::ApplySkipped {
                zone,
                reason: "Dry run".to_string(),
            });
            return Ok(SyncOutcome { plan, applied: 0 });
        }

        match self.provider.apply(&plan).await {
            Ok(applied) => {
                info!("Applied {} change(s) to {}", applied, zone);
                self.emit_event(EngineEvent::ApplySucceeded { zone, applied });
                Ok(SyncOutcome { plan, applied })
            }
            Err(e) => {
                error!("Applying plan to {} failed: {}", zone, e);
                self.emit_event(EngineEvent::ApplyFailed {
                    zone,
                    error: e.to_string(),
                });
                Err(e)
            }
        }
    }

    /// Sync every zone in order, stopping at the first failure
    pub async fn sync_all(&self, zones: &[Zone]) -> Result<Vec<SyncOutcome>> {
        let mut outcomes = Vec::with_capacity(zones.len());
        for zone in zones {
            outcomes.push(self.sync_zone(zone).await?);
        }
        Ok(outcomes)
    }

    /// Emit an engine event
    fn emit_event(&self, event: EngineEvent) {
        if self.event_tx.try_send(event).is_err() {
            warn!("Event channel full, dropping event. Consider increasing event_channel_capacity.");
        }
    }
}
