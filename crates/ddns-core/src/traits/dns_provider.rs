// # DNS Provider Trait
//
// Defines the interface to the provider's zone/record API.
//
// ## Implementations
//
// - Bunny.net: `ddns-provider-bunny` crate
//
// ## Usage
//
// ```rust,ignore
// use ddns_core::{DnsProvider, RecordData, RecordType};
//
// let provider = /* DnsProvider implementation */;
// let records = provider.list_records(12345).await?;
// provider
//     .create_record(12345, &RecordData::new("home", RecordType::A, "1.2.3.4", 300))
//     .await?;
// ```

use crate::config::RecordType;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A record as stored at the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteRecord {
    /// The record ID (provider-specific)
    pub id: u64,
    /// Record name relative to the zone (empty for the apex)
    pub name: String,
    /// Raw provider type code
    pub type_code: u8,
    /// Current value
    pub value: String,
    /// Time-to-live
    pub ttl: u32,
}

impl RemoteRecord {
    /// The record type, if it is one the updater manages
    pub fn record_type(&self) -> Option<RecordType> {
        RecordType::from_wire_code(self.type_code)
    }
}

/// The payload of a create or update call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordData {
    /// Record name relative to the zone
    pub name: String,
    /// Record type
    pub record_type: RecordType,
    /// New value
    pub value: String,
    /// Time-to-live
    pub ttl: u32,
}

impl RecordData {
    pub fn new(
        name: impl Into<String>,
        record_type: RecordType,
        value: impl Into<String>,
        ttl: u32,
    ) -> Self {
        Self {
            name: name.into(),
            record_type,
            value: value.into(),
            ttl,
        }
    }
}

/// Trait for DNS provider implementations
///
/// Providers are stateless and single-shot: one HTTP request per call,
/// no retries, no caching. Failures come back as typed errors
/// (`Authentication`, `NotFound`, `Http`, ...) after being logged with a
/// diagnostic hint; the reconciler decides what to do next.
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// List every record in a zone
    async fn list_records(&self, zone_id: u64) -> Result<Vec<RemoteRecord>, crate::Error>;

    /// Create a record in a zone
    async fn create_record(&self, zone_id: u64, record: &RecordData)
    -> Result<(), crate::Error>;

    /// Overwrite an existing record
    async fn update_record(
        &self,
        zone_id: u64,
        record_id: u64,
        record: &RecordData,
    ) -> Result<(), crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}
