// # zonesync-core
//
// Core library for declarative DNS zone synchronization.
//
// ## Architecture Overview
//
// This library provides the provider-independent half of zonesync:
// - **Zone / Record**: Normalized record model keyed by (name, type)
// - **Plan**: Generic desired-vs-existing diff producing ordered changes
// - **DnsProvider**: Trait for reading, planning and applying via a provider API
// - **SyncEngine**: Orchestrates plan → apply per desired zone
// - **ProviderRegistry**: Plugin-based registry for DNS providers
// - **CacheSlot / KeyedCache**: Memo caches with explicit invalidation
// - **DesiredState**: JSON desired-state documents
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Diff semantics here, API specifics in provider crates
// 2. **Plugin-Based**: Providers are registered dynamically, no hard-coded if-else
// 3. **Library-First**: All core functionality can be used as a library
// 4. **Idempotency**: Planning against an unchanged remote yields an empty plan

pub mod cache;
pub mod config;
pub mod desired;
pub mod engine;
pub mod error;
pub mod plan;
pub mod registry;
pub mod traits;
pub mod zone;

// Re-export core types for convenience
pub use cache::{CacheSlot, KeyedCache};
pub use config::{EngineConfig, ProviderConfig, SyncConfig};
pub use desired::DesiredState;
pub use engine::{EngineEvent, SyncEngine, SyncOutcome};
pub use error::{Error, Result};
pub use plan::{Change, ChangeKind, Plan, PlanSummary};
pub use registry::ProviderRegistry;
pub use traits::{DnsProvider, DnsProviderFactory};
pub use zone::{Record, RecordType, Zone};
