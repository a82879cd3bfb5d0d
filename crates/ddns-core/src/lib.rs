// # ddns-core
//
// Core library for the Bunny.net dynamic DNS updater.
//
// ## Architecture Overview
//
// - **IpSource**: Trait for looking up the current public address per family
// - **DnsProvider**: Trait for listing, creating and updating provider records
// - **Reconciler**: Diffs one zone's desired records against the provider
// - **Scheduler**: Runs the reconciler over all zones, once or as a daemon
// - **LogContext**: Explicit tracing dispatcher the engine logs through
//
// The HTTP implementations of the two traits live in `ddns-ip-http` and
// `ddns-provider-bunny`; the `ddnsd` binary wires them together.

pub mod traits;
pub mod engine;
pub mod config;
pub mod error;
pub mod logging;

// Re-export core types for convenience
pub use traits::{IpSource, IpFamily, DnsProvider, RemoteRecord, RecordData};
pub use engine::{Reconciler, Scheduler, PassReport, ZoneReport, RecordOutcome};
pub use config::{DdnsConfig, ZoneConfig, RecordSpec, RecordType, TypeSpec};
pub use error::{Error, Result};
pub use logging::LogContext;
