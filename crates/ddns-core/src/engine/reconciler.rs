//! Per-zone reconciliation
//!
//! For one zone: resolve the public address of each family once, list the
//! provider's records, and create or update only the pairs that drifted.
//! Running it again with unchanged state issues no mutating calls.

use super::report::{RecordOutcome, RecordReport, ZoneReport};
use crate::config::{RecordSpec, RecordType, TypeSpec, ZoneConfig};
use crate::error::{Error, Result};
use crate::logging::LogContext;
use crate::traits::{DnsProvider, IpFamily, IpSource, RecordData, RemoteRecord};
use std::collections::{BTreeMap, HashMap};
use std::net::IpAddr;
use tracing::{debug, error, info, warn};

/// Addresses resolved for one zone, keyed by family
pub(crate) type Addresses = BTreeMap<IpFamily, IpAddr>;

/// Remote records keyed by (lowercased name, type)
type RecordIndex<'a> = HashMap<(String, RecordType), &'a RemoteRecord>;

/// Reconciles zones against the provider
pub struct Reconciler {
    /// Public address lookups
    ip_source: Box<dyn IpSource>,

    /// Provider record API
    provider: Box<dyn DnsProvider>,

    /// Where this reconciler's log lines go
    log: LogContext,
}

impl Reconciler {
    /// Create a reconciler logging to the current default dispatcher
    pub fn new(ip_source: Box<dyn IpSource>, provider: Box<dyn DnsProvider>) -> Self {
        Self {
            ip_source,
            provider,
            log: LogContext::current(),
        }
    }

    /// Log through an explicit context
    pub fn with_log_context(mut self, log: LogContext) -> Self {
        self.log = log;
        self
    }

    /// The context this reconciler logs through
    pub fn log_context(&self) -> &LogContext {
        &self.log
    }

    /// Reconcile one zone
    ///
    /// # Returns
    ///
    /// - `Ok(ZoneReport)`: Every configured pair with its outcome
    /// - `Err(Error::NoAddress)`: Neither family produced an address; no
    ///   record calls were made
    /// - `Err(_)`: Listing the zone's records failed; no mutations were made
    pub async fn reconcile_zone(&self, zone: &ZoneConfig) -> Result<ZoneReport> {
        self.log.scope(self.reconcile(zone)).await
    }

    async fn reconcile(&self, zone: &ZoneConfig) -> Result<ZoneReport> {
        let addresses = self.resolve_addresses().await;
        if addresses.is_empty() {
            warn!("No IP addresses available for {}", zone.domain);
            return Err(Error::no_address(&zone.domain));
        }

        let remote = self.provider.list_records(zone.zone_id).await.map_err(|e| {
            error!(
                "Failed to get records for zone {} ({}): {}",
                zone.zone_id, zone.domain, e
            );
            e
        })?;
        debug!("Zone {} has {} record(s)", zone.zone_id, remote.len());
        let index = index_records(&remote);

        let mut report = ZoneReport::new(zone);
        for spec in &zone.records {
            for type_spec in &spec.types {
                let outcome = self
                    .reconcile_record(zone, spec, *type_spec, &addresses, &index)
                    .await;
                report.records.push(RecordReport {
                    subdomain: spec.subdomain.clone(),
                    record_type: type_spec.record_type,
                    outcome,
                });
            }
        }

        info!(
            "Zone {}: {} created, {} updated, {} unchanged, {} skipped, {} failed",
            zone.domain,
            report.created(),
            report.updated(),
            report.unchanged(),
            report.skipped(),
            report.failed()
        );
        Ok(report)
    }

    /// Look up each family once; failures only drop that family
    async fn resolve_addresses(&self) -> Addresses {
        let mut addresses = Addresses::new();
        for family in IpFamily::ALL {
            match self.ip_source.current(family).await {
                Ok(Some(ip)) => {
                    debug!("Current {}: {}", family, ip);
                    addresses.insert(family, ip);
                }
                Ok(None) => debug!("{} detection disabled in config", family),
                Err(e) => warn!(
                    "No {} address from {}: {}",
                    family,
                    self.ip_source.source_name(),
                    e
                ),
            }
        }
        addresses
    }

    async fn reconcile_record(
        &self,
        zone: &ZoneConfig,
        spec: &RecordSpec,
        type_spec: TypeSpec,
        addresses: &Addresses,
        index: &RecordIndex<'_>,
    ) -> RecordOutcome {
        let record_type = type_spec.record_type;
        let fqdn = zone.fqdn(&spec.subdomain);

        let Some(ip) = addresses.get(&record_type.family()) else {
            warn!("No {} address available for {}", record_type, fqdn);
            return RecordOutcome::Skipped;
        };

        let value = ip.to_string();
        let desired = RecordData::new(&spec.subdomain, record_type, &value, type_spec.ttl);
        let key = (spec.subdomain.to_lowercase(), record_type);

        match index.get(&key) {
            Some(existing) if value_matches(&existing.value, ip) => {
                debug!("{} ({}) already up to date", fqdn, record_type);
                RecordOutcome::Unchanged { value }
            }
            Some(existing) => {
                match self
                    .provider
                    .update_record(zone.zone_id, existing.id, &desired)
                    .await
                {
                    Ok(()) => {
                        info!(
                            "Updated {} record for {} in zone {} to {} (was {})",
                            record_type, fqdn, zone.zone_id, value, existing.value
                        );
                        RecordOutcome::Updated {
                            previous: existing.value.clone(),
                            value,
                        }
                    }
                    Err(error) => {
                        error!(
                            "Failed to update {} record for {} in zone {}: {}",
                            record_type, fqdn, zone.zone_id, error
                        );
                        RecordOutcome::Failed { error }
                    }
                }
            }
            None => match self.provider.create_record(zone.zone_id, &desired).await {
                Ok(()) => {
                    info!(
                        "Created {} record for {} in zone {} with {}",
                        record_type, fqdn, zone.zone_id, value
                    );
                    RecordOutcome::Created { value }
                }
                Err(error) => {
                    error!(
                        "Failed to create {} record for {} in zone {}: {}",
                        record_type, fqdn, zone.zone_id, error
                    );
                    RecordOutcome::Failed { error }
                }
            },
        }
    }
}

/// Index managed records by (name, type); a later duplicate replaces an
/// earlier one
fn index_records(records: &[RemoteRecord]) -> RecordIndex<'_> {
    let mut index = RecordIndex::new();
    for record in records {
        if let Some(record_type) = record.record_type() {
            index.insert((record.name.to_lowercase(), record_type), record);
        }
    }
    index
}

/// Compare as addresses when the remote value parses, textually otherwise
fn value_matches(remote: &str, desired: &IpAddr) -> bool {
    match remote.trim().parse::<IpAddr>() {
        Ok(current) => current == *desired,
        Err(_) => remote == desired.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn remote(id: u64, name: &str, type_code: u8, value: &str) -> RemoteRecord {
        RemoteRecord {
            id,
            name: name.to_string(),
            type_code,
            value: value.to_string(),
            ttl: 300,
        }
    }

    #[test]
    fn test_value_matches_normalizes_ipv6() {
        let ip: IpAddr = "2001:db8::1".parse().unwrap();
        assert!(value_matches("2001:0db8:0000:0000:0000:0000:0000:0001", &ip));
        assert!(value_matches("2001:db8::1", &ip));
        assert!(!value_matches("2001:db8::2", &ip));
        assert!(!value_matches("garbage", &ip));
    }

    #[test]
    fn test_index_skips_unmanaged_types_and_keeps_last_duplicate() {
        let records = vec![
            remote(1, "home", 0, "1.1.1.1"),
            remote(2, "home", 2, "alias.example.com"), // CNAME
            remote(3, "Home", 0, "2.2.2.2"),
        ];
        let index = index_records(&records);

        assert_eq!(index.len(), 1);
        assert_eq!(index[&("home".to_string(), RecordType::A)].id, 3);
    }
}
