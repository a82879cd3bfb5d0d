//! Outcome types returned by the reconciler and scheduler

use crate::config::{RecordType, ZoneConfig};
use crate::error::Error;

/// What happened to one (subdomain, type) pair
#[derive(Debug)]
pub enum RecordOutcome {
    /// Record did not exist and was created
    Created { value: String },
    /// Record existed with a different value and was overwritten
    Updated { previous: String, value: String },
    /// Record already had the desired value
    Unchanged { value: String },
    /// No address was available for the record's family
    Skipped,
    /// The create or update call failed
    Failed { error: Error },
}

impl RecordOutcome {
    /// Whether a mutating call was issued and succeeded
    pub fn is_mutation(&self) -> bool {
        matches!(self, Self::Created { .. } | Self::Updated { .. })
    }
}

/// Outcome for one configured pair
#[derive(Debug)]
pub struct RecordReport {
    pub subdomain: String,
    pub record_type: RecordType,
    pub outcome: RecordOutcome,
}

/// Result of reconciling one zone
#[derive(Debug)]
pub struct ZoneReport {
    pub zone_id: u64,
    pub domain: String,
    pub records: Vec<RecordReport>,
}

impl ZoneReport {
    pub(crate) fn new(zone: &ZoneConfig) -> Self {
        Self {
            zone_id: zone.zone_id,
            domain: zone.domain.clone(),
            records: Vec::new(),
        }
    }

    /// Outcome for a pair, if it was configured
    pub fn outcome(&self, subdomain: &str, record_type: RecordType) -> Option<&RecordOutcome> {
        self.records
            .iter()
            .find(|r| r.subdomain == subdomain && r.record_type == record_type)
            .map(|r| &r.outcome)
    }

    pub fn created(&self) -> usize {
        self.count(|o| matches!(o, RecordOutcome::Created { .. }))
    }

    pub fn updated(&self) -> usize {
        self.count(|o| matches!(o, RecordOutcome::Updated { .. }))
    }

    pub fn unchanged(&self) -> usize {
        self.count(|o| matches!(o, RecordOutcome::Unchanged { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, RecordOutcome::Skipped))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, RecordOutcome::Failed { .. }))
    }

    /// Successful creates plus updates
    pub fn mutations(&self) -> usize {
        self.count(RecordOutcome::is_mutation)
    }

    fn count(&self, pred: impl Fn(&RecordOutcome) -> bool) -> usize {
        self.records.iter().filter(|r| pred(&r.outcome)).count()
    }
}

/// A zone that could not be reconciled at all
#[derive(Debug)]
pub struct ZoneFailure {
    pub zone_id: u64,
    pub domain: String,
    pub error: Error,
}

/// Result of one pass over every configured zone
#[derive(Debug, Default)]
pub struct PassReport {
    pub zones: Vec<ZoneReport>,
    pub failures: Vec<ZoneFailure>,
}

impl PassReport {
    /// True when there were zones and none of them could be reconciled
    pub fn all_failed(&self) -> bool {
        self.zones.is_empty() && !self.failures.is_empty()
    }

    /// Successful mutations across all zones
    pub fn mutations(&self) -> usize {
        self.zones.iter().map(ZoneReport::mutations).sum()
    }
}
