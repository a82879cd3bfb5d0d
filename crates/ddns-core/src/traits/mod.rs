//! Core traits for the DDNS updater
//!
//! This module defines the two seams the reconciler talks through.
//!
//! - [`IpSource`]: Look up the current public address
//! - [`DnsProvider`]: List, create and update provider records

pub mod ip_source;
pub mod dns_provider;

pub use ip_source::{IpSource, IpFamily};
pub use dns_provider::{DnsProvider, RemoteRecord, RecordData};
