//! Contract Test: Sync Engine
//!
//! Constraints verified:
//! - Desired-state documents drive one plan per zone
//! - Dry runs plan but never apply
//! - A second run against the converged remote is a no-op
//! - Zones are synced in order and the first failure stops the run
//!
//! If this test fails, the engine's plan/apply orchestration is broken.

mod common;

use common::*;
use zonesync_core::{
    DesiredState, EngineConfig, EngineEvent, Record, RecordType, SyncEngine, Zone,
};

fn desired_zones() -> Vec<Zone> {
    DesiredState::from_json(DESIRED).unwrap().to_zones().unwrap()
}

fn engine(provider: &MemoryProvider, dry_run: bool) -> (SyncEngine, tokio::sync::mpsc::Receiver<EngineEvent>) {
    let config = EngineConfig {
        dry_run,
        ..EngineConfig::default()
    };
    SyncEngine::new(Box::new(provider.clone()), config).expect("engine construction succeeds")
}

#[tokio::test]
async fn apply_converges_and_second_run_is_a_noop() {
    let provider = MemoryProvider::new();
    let zones = desired_zones();

    let (engine, _events) = engine(&provider, false);
    let outcomes = engine.sync_all(&zones).await.unwrap();

    assert_eq!(outcomes.len(), 2);
    assert!(outcomes.iter().all(|o| !o.plan.exists));
    assert_eq!(outcomes.iter().map(|o| o.applied).sum::<usize>(), 4);
    assert_eq!(provider.remote_zone("a.tests.").unwrap(), zones[0]);
    assert_eq!(provider.remote_zone("b.tests.").unwrap(), zones[1]);

    // converged: nothing left to do
    let again = engine.sync_all(&zones).await.unwrap();
    assert!(again.iter().all(|o| o.plan.is_empty() && o.plan.exists));
    assert_eq!(provider.apply_calls(), 2);
}

#[tokio::test]
async fn dry_run_never_applies() {
    let provider = MemoryProvider::new();
    let (engine, mut events) = engine(&provider, true);

    let outcomes = engine.sync_all(&desired_zones()).await.unwrap();
    assert_eq!(outcomes.iter().map(|o| o.plan.len()).sum::<usize>(), 4);
    assert_eq!(outcomes.iter().map(|o| o.applied).sum::<usize>(), 0);
    assert_eq!(provider.apply_calls(), 0);
    assert!(provider.remote_zone("a.tests.").is_none());

    let mut skipped = 0;
    while let Ok(event) = events.try_recv() {
        if let EngineEvent::ApplySkipped { reason, .. } = event {
            assert_eq!(reason, "Dry run");
            skipped += 1;
        }
    }
    assert_eq!(skipped, 2);
}

#[tokio::test]
async fn drift_is_corrected() {
    let provider = MemoryProvider::new();
    let zones = desired_zones();

    // remote has a stale ttl and an extra record
    let mut remote = zones[0].clone();
    let apex = remote.get("", RecordType::A).unwrap().with_ttl(60);
    remote.add_record(apex, true).unwrap();
    remote
        .add_record(
            Record::new("a.tests.", "old", RecordType::A, 300, vec!["9.9.9.9".to_string()])
                .unwrap(),
            false,
        )
        .unwrap();
    provider.seed(remote);

    let (engine, _events) = engine(&provider, false);
    let outcome = engine.sync_zone(&zones[0]).await.unwrap();

    let summary = outcome.plan.summary();
    assert_eq!((summary.creates, summary.updates, summary.deletes), (0, 1, 1));
    assert_eq!(outcome.applied, 2);
    assert_eq!(provider.remote_zone("a.tests.").unwrap(), zones[0]);
}

#[tokio::test]
async fn first_failure_stops_the_run() {
    let provider = MemoryProvider::new();
    provider.fail_apply_for("a.tests.");

    let (engine, mut events) = engine(&provider, false);
    let err = engine.sync_all(&desired_zones()).await.unwrap_err();
    assert!(err.to_string().contains("injected failure"));

    // b.tests. was never planned
    assert_eq!(provider.plan_calls(), 1);
    assert!(provider.remote_zone("b.tests.").is_none());

    let mut failed = Vec::new();
    while let Ok(event) = events.try_recv() {
        if let EngineEvent::ApplyFailed { zone, .. } = event {
            failed.push(zone);
        }
    }
    assert_eq!(failed, vec!["a.tests.".to_string()]);
}
