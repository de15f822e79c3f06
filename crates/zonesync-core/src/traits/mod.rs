//! Core traits for zonesync
//!
//! - [`DnsProvider`]: Read, plan and apply zone changes via a provider API
//! - [`DnsProviderFactory`]: Build providers from configuration

pub mod dns_provider;

pub use dns_provider::{DnsProvider, DnsProviderFactory};
