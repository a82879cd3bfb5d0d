//! Test doubles and common utilities for reconciliation contract tests
//!
//! The doubles keep their state behind an `Arc`, so a test can hand a clone
//! to the reconciler and keep another clone to inspect calls afterwards.

#![allow(dead_code)]

use ddns_core::config::{DdnsConfig, RecordSpec, RecordType, ZoneConfig};
use ddns_core::error::{Error, Result};
use ddns_core::logging::LogContext;
use ddns_core::traits::{DnsProvider, IpFamily, IpSource, RecordData, RemoteRecord};
use std::collections::{HashMap, HashSet};
use std::io;
use std::net::IpAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// An IpSource returning fixed answers per family
#[derive(Clone)]
pub struct StaticIpSource {
    answers: Arc<Mutex<HashMap<IpFamily, Option<IpAddr>>>>,
    /// Call counter for current()
    call_count: Arc<AtomicUsize>,
}

impl StaticIpSource {
    /// Both families fail unless set
    pub fn new() -> Self {
        Self {
            answers: Arc::new(Mutex::new(HashMap::new())),
            call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Only IPv4 resolves
    pub fn v4(ip: &str) -> Self {
        Self::new().with(IpFamily::V4, ip)
    }

    pub fn with(self, family: IpFamily, ip: &str) -> Self {
        self.set(family, ip);
        self
    }

    /// The family is disabled
    pub fn with_disabled(self, family: IpFamily) -> Self {
        self.answers.lock().unwrap().insert(family, None);
        self
    }

    pub fn set(&self, family: IpFamily, ip: &str) {
        self.answers
            .lock()
            .unwrap()
            .insert(family, Some(ip.parse().unwrap()));
    }

    /// Get the number of times current() was called
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl IpSource for StaticIpSource {
    async fn current(&self, family: IpFamily) -> Result<Option<IpAddr>> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        match self.answers.lock().unwrap().get(&family) {
            Some(answer) => Ok(*answer),
            None => Err(Error::ip_source(format!("No {} address retrieved", family))),
        }
    }

    fn source_name(&self) -> &'static str {
        "static"
    }
}

/// An IpSource whose lookups never complete
#[derive(Clone, Default)]
pub struct HangingIpSource;

#[async_trait::async_trait]
impl IpSource for HangingIpSource {
    async fn current(&self, _family: IpFamily) -> Result<Option<IpAddr>> {
        std::future::pending().await
    }

    fn source_name(&self) -> &'static str {
        "hanging"
    }
}

/// A mutating call seen by the mock provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Create {
        zone_id: u64,
        record: RecordData,
    },
    Update {
        zone_id: u64,
        record_id: u64,
        record: RecordData,
    },
}

#[derive(Default)]
struct ProviderState {
    zones: HashMap<u64, Vec<RemoteRecord>>,
    calls: Vec<Call>,
    failing_zones: HashSet<u64>,
    reject_mutations: bool,
    next_id: u64,
}

/// An in-memory DnsProvider that tracks calls
///
/// Creates and updates are applied to the stored zone, so a second pass sees
/// the result of the first.
#[derive(Clone, Default)]
pub struct MockDnsProvider {
    state: Arc<Mutex<ProviderState>>,
    /// Call counter for list_records()
    list_call_count: Arc<AtomicUsize>,
}

impl MockDnsProvider {
    pub fn new() -> Self {
        let provider = Self::default();
        provider.state.lock().unwrap().next_id = 1000;
        provider
    }

    /// Seed a record in a zone
    pub fn with_record(
        self,
        zone_id: u64,
        id: u64,
        name: &str,
        record_type: RecordType,
        value: &str,
    ) -> Self {
        self.state
            .lock()
            .unwrap()
            .zones
            .entry(zone_id)
            .or_default()
            .push(RemoteRecord {
                id,
                name: name.to_string(),
                type_code: record_type.wire_code(),
                value: value.to_string(),
                ttl: 300,
            });
        self
    }

    /// Listing this zone fails with an authentication error
    pub fn failing_zone(self, zone_id: u64) -> Self {
        self.state.lock().unwrap().failing_zones.insert(zone_id);
        self
    }

    /// Every create/update fails with a not-found error
    pub fn rejecting_mutations(self) -> Self {
        self.state.lock().unwrap().reject_mutations = true;
        self
    }

    /// Get the number of times list_records() was called
    pub fn list_call_count(&self) -> usize {
        self.list_call_count.load(Ordering::SeqCst)
    }

    /// Mutating calls in order
    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn creates(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, Call::Create { .. }))
            .collect()
    }

    pub fn updates(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, Call::Update { .. }))
            .collect()
    }

    /// Forget recorded calls (stored records stay)
    pub fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }
}

#[async_trait::async_trait]
impl DnsProvider for MockDnsProvider {
    async fn list_records(&self, zone_id: u64) -> Result<Vec<RemoteRecord>> {
        self.list_call_count.fetch_add(1, Ordering::SeqCst);
        let state = self.state.lock().unwrap();
        if state.failing_zones.contains(&zone_id) {
            return Err(Error::auth("Invalid API key"));
        }
        Ok(state.zones.get(&zone_id).cloned().unwrap_or_default())
    }

    async fn create_record(&self, zone_id: u64, record: &RecordData) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Create {
            zone_id,
            record: record.clone(),
        });
        if state.reject_mutations {
            return Err(Error::not_found(format!("Zone ID {} not found", zone_id)));
        }
        state.next_id += 1;
        let id = state.next_id;
        state.zones.entry(zone_id).or_default().push(RemoteRecord {
            id,
            name: record.name.clone(),
            type_code: record.record_type.wire_code(),
            value: record.value.clone(),
            ttl: record.ttl,
        });
        Ok(())
    }

    async fn update_record(&self, zone_id: u64, record_id: u64, record: &RecordData) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Update {
            zone_id,
            record_id,
            record: record.clone(),
        });
        if state.reject_mutations {
            return Err(Error::not_found(format!("Record ID {} not found", record_id)));
        }
        let existing = state
            .zones
            .get_mut(&zone_id)
            .and_then(|records| records.iter_mut().find(|r| r.id == record_id))
            .ok_or_else(|| Error::not_found(format!("Record ID {} not found", record_id)))?;
        existing.value = record.value.clone();
        existing.ttl = record.ttl;
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// Shared in-memory log sink for asserting on emitted lines
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    /// A LogContext writing plain-text lines into this buffer
    pub fn context(&self) -> LogContext {
        let writer = self.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::DEBUG)
            .finish();
        LogContext::new(subscriber)
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// One zone with an A record for "home"
pub fn home_zone(zone_id: u64) -> ZoneConfig {
    ZoneConfig::new(zone_id, "example.com")
        .with_record(RecordSpec::new("home").with_type(RecordType::A, 300))
}

/// Helper to create a minimal DdnsConfig for testing
pub fn minimal_config(zones: Vec<ZoneConfig>) -> DdnsConfig {
    let mut config = DdnsConfig::new("test-key");
    config.zones = zones;
    config
}
