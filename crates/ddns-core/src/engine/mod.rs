//! Reconciliation engine
//!
//! ```text
//! ┌─────────────┐        ┌──────────────┐        ┌─────────────┐
//! │  IpSource   │──ip───▶│  Reconciler  │◀─list──│ DnsProvider │
//! └─────────────┘        └──────────────┘──mut──▶└─────────────┘
//!                               ▲
//!                               │ one zone at a time
//!                        ┌──────────────┐
//!                        │  Scheduler   │ once, or every `interval`
//!                        └──────────────┘
//! ```
//!
//! ## Flow per zone
//!
//! 1. Resolve the public address of each enabled family
//! 2. List the zone's records and index them by (name, type)
//! 3. Create missing pairs, update drifted pairs, leave the rest alone

mod reconciler;
mod report;
mod scheduler;

pub use reconciler::Reconciler;
pub use report::{PassReport, RecordOutcome, RecordReport, ZoneFailure, ZoneReport};
pub use scheduler::Scheduler;
