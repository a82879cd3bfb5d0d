//! Configuration types for the DDNS updater
//!
//! The configuration is read once from a TOML file at startup and is
//! immutable afterwards.
//!
//! ```toml
//! api_key = "..."
//!
//! [[zones]]
//! zone_id = 12345
//! domain = "example.com"
//!
//! [[zones.records]]
//! subdomain = "home"
//! types = [{ type = "A", ttl = 300 }, { type = "AAAA" }]
//!
//! [daemon]
//! interval = 1800
//! ```

use crate::error::{Error, Result};
use crate::traits::IpFamily;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default provider API endpoint
pub const DEFAULT_API_BASE_URL: &str = "https://api.bunny.net";

/// Environment variable overriding `api_key`
pub const API_KEY_ENV: &str = "BUNNY_DDNS_API_KEY";

/// Default IPv4 echo services, tried in order
pub const DEFAULT_IPV4_ENDPOINTS: &[&str] =
    &["https://ipv4.icanhazip.com", "https://api.ipify.org"];

/// Default IPv6 echo services, tried in order
pub const DEFAULT_IPV6_ENDPOINTS: &[&str] =
    &["https://ipv6.icanhazip.com", "https://api6.ipify.org"];

/// Main DDNS configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct DdnsConfig {
    /// Provider API key (sent as the `AccessKey` header)
    #[serde(default)]
    pub api_key: String,

    /// Provider API base URL
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Zones to keep in sync
    #[serde(default)]
    pub zones: Vec<ZoneConfig>,

    /// Public IP detection
    #[serde(default)]
    pub ip_detection: IpDetectionConfig,

    /// Log sinks
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Daemon mode timing
    #[serde(default)]
    pub daemon: DaemonConfig,
}

// The API key never appears in Debug output
impl fmt::Debug for DdnsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DdnsConfig")
            .field("api_key", &"<REDACTED>")
            .field("api_base_url", &self.api_base_url)
            .field("zones", &self.zones)
            .field("ip_detection", &self.ip_detection)
            .field("logging", &self.logging)
            .field("daemon", &self.daemon)
            .finish()
    }
}

impl DdnsConfig {
    /// Create a configuration with defaults and the given API key
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_base_url: default_api_base_url(),
            zones: Vec::new(),
            ip_detection: IpDetectionConfig::default(),
            logging: LoggingConfig::default(),
            daemon: DaemonConfig::default(),
        }
    }

    /// Add a zone (builder style)
    pub fn with_zone(mut self, zone: ZoneConfig) -> Self {
        self.zones.push(zone);
        self
    }

    /// Parse a configuration from TOML text without validating it
    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Load, apply environment overrides and validate a configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;

        let mut config = Self::from_toml(&text).map_err(|e| {
            Error::config(format!("Failed to parse config file {}: {}", path.display(), e))
        })?;

        config.apply_api_key_override(std::env::var(API_KEY_ENV).ok());
        config.validate()?;
        Ok(config)
    }

    /// Replace `api_key` with a non-blank override (the value of `BUNNY_DDNS_API_KEY`)
    pub fn apply_api_key_override(&mut self, key: Option<String>) {
        if let Some(key) = key
            && !key.trim().is_empty()
        {
            self.api_key = key.trim().to_string();
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(Error::config("Missing api_key in config"));
        }

        if self.api_base_url.is_empty() {
            return Err(Error::config("api_base_url cannot be empty"));
        }

        if self.zones.is_empty() {
            return Err(Error::config("No zones configured"));
        }

        for zone in &self.zones {
            zone.validate()?;
        }

        self.ip_detection.validate()?;
        self.logging.validate()?;
        self.daemon.validate()?;

        Ok(())
    }
}

/// One provider zone and the records to maintain in it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZoneConfig {
    /// Provider zone identifier
    pub zone_id: u64,

    /// Domain name of the zone (used for log messages)
    pub domain: String,

    /// Records to maintain, in order
    #[serde(default)]
    pub records: Vec<RecordSpec>,
}

impl ZoneConfig {
    /// Create a zone without records
    pub fn new(zone_id: u64, domain: impl Into<String>) -> Self {
        Self {
            zone_id,
            domain: domain.into(),
            records: Vec::new(),
        }
    }

    /// Add a record spec (builder style)
    pub fn with_record(mut self, record: RecordSpec) -> Self {
        self.records.push(record);
        self
    }

    /// Fully qualified name of a subdomain in this zone
    pub fn fqdn(&self, subdomain: &str) -> String {
        if subdomain.is_empty() {
            self.domain.clone()
        } else {
            format!("{}.{}", subdomain, self.domain)
        }
    }

    fn validate(&self) -> Result<()> {
        if self.zone_id == 0 {
            return Err(Error::config(format!(
                "zone_id for {} must be a non-zero provider zone id",
                self.domain
            )));
        }
        if self.domain.trim().is_empty() {
            return Err(Error::config(format!(
                "domain for zone {} cannot be empty",
                self.zone_id
            )));
        }
        Ok(())
    }
}

/// Desired state for one subdomain
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordSpec {
    /// Subdomain label; empty means the zone apex
    #[serde(default)]
    pub subdomain: String,

    /// Record types to maintain with their TTLs
    #[serde(default)]
    pub types: Vec<TypeSpec>,
}

impl RecordSpec {
    /// Create a record spec for a subdomain
    pub fn new(subdomain: impl Into<String>) -> Self {
        Self {
            subdomain: subdomain.into(),
            types: Vec::new(),
        }
    }

    /// Add a record type with a TTL (builder style)
    pub fn with_type(mut self, record_type: RecordType, ttl: u32) -> Self {
        self.types.push(TypeSpec { record_type, ttl });
        self
    }
}

/// A record type and the TTL to publish it with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeSpec {
    /// Record type
    #[serde(rename = "type", default = "default_record_type")]
    pub record_type: RecordType,

    /// Time-to-live in seconds
    #[serde(default = "default_ttl")]
    pub ttl: u32,
}

/// DNS record type maintained by the updater
///
/// Each type names the address family it publishes and the code the
/// provider uses for it on the wire. New types only need an entry in
/// [`RecordType::ALL`] and in the two mappings below.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordType {
    /// IPv4 address record
    #[serde(alias = "a")]
    A,
    /// IPv6 address record
    #[serde(rename = "AAAA", alias = "aaaa")]
    Aaaa,
}

impl RecordType {
    /// Every supported record type
    pub const ALL: [RecordType; 2] = [RecordType::A, RecordType::Aaaa];

    /// Address family whose address this record publishes
    pub fn family(self) -> IpFamily {
        match self {
            RecordType::A => IpFamily::V4,
            RecordType::Aaaa => IpFamily::V6,
        }
    }

    /// Provider wire code
    pub fn wire_code(self) -> u8 {
        match self {
            RecordType::A => 0,
            RecordType::Aaaa => 1,
        }
    }

    /// Map a provider wire code back to a supported type
    pub fn from_wire_code(code: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.wire_code() == code)
    }

    /// Record type name as written in zone files
    pub fn as_str(self) -> &'static str {
        match self {
            RecordType::A => "A",
            RecordType::Aaaa => "AAAA",
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Public IP detection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IpDetectionConfig {
    /// Per-request timeout for echo services (in seconds)
    #[serde(default = "default_ip_timeout_secs")]
    pub timeout_secs: u64,

    /// IPv4 detection
    #[serde(default = "FamilyConfig::ipv4")]
    pub ipv4: FamilyConfig,

    /// IPv6 detection
    #[serde(default = "FamilyConfig::ipv6")]
    pub ipv6: FamilyConfig,
}

impl IpDetectionConfig {
    /// Settings for one family
    pub fn family(&self, family: IpFamily) -> &FamilyConfig {
        match family {
            IpFamily::V4 => &self.ipv4,
            IpFamily::V6 => &self.ipv6,
        }
    }

    /// Per-request timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    fn validate(&self) -> Result<()> {
        if self.timeout_secs == 0 {
            return Err(Error::config("ip_detection.timeout_secs must be > 0"));
        }
        for family in IpFamily::ALL {
            let settings = self.family(family);
            if let Some(url) = settings
                .endpoints
                .iter()
                .find(|u| !u.starts_with("https://") && !u.starts_with("http://"))
            {
                return Err(Error::config(format!(
                    "{} endpoint must use HTTP or HTTPS scheme. Got: {}",
                    family, url
                )));
            }
        }
        Ok(())
    }
}

impl Default for IpDetectionConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_ip_timeout_secs(),
            ipv4: FamilyConfig::ipv4(),
            ipv6: FamilyConfig::ipv6(),
        }
    }
}

/// Detection settings for one address family
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FamilyConfig {
    /// Whether this family is looked up at all
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Echo services to try in order (empty in the file means the defaults)
    #[serde(default)]
    pub endpoints: Vec<String>,
}

impl FamilyConfig {
    fn ipv4() -> Self {
        Self::with_defaults(DEFAULT_IPV4_ENDPOINTS)
    }

    fn ipv6() -> Self {
        Self::with_defaults(DEFAULT_IPV6_ENDPOINTS)
    }

    fn with_defaults(endpoints: &[&str]) -> Self {
        Self {
            enabled: true,
            endpoints: endpoints.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Disabled family settings
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            endpoints: Vec::new(),
        }
    }

    /// Endpoints to use, falling back to the built-in list for the family
    pub fn endpoints_or_default(&self, family: IpFamily) -> Vec<String> {
        if !self.endpoints.is_empty() {
            return self.endpoints.clone();
        }
        let defaults = match family {
            IpFamily::V4 => DEFAULT_IPV4_ENDPOINTS,
            IpFamily::V6 => DEFAULT_IPV6_ENDPOINTS,
        };
        defaults.iter().map(|s| s.to_string()).collect()
    }
}

/// Log sink configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Master switch; when false nothing is logged
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Minimum level: trace, debug, info, warn or error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Write to the log file
    #[serde(default = "default_true")]
    pub file: bool,

    /// Write to stderr
    #[serde(default)]
    pub console: bool,

    /// Log file path (defaults to `ddns.log` next to the config file)
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl LoggingConfig {
    fn validate(&self) -> Result<()> {
        match self.level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "warning" | "error" => Ok(()),
            _ => Err(Error::config(format!(
                "logging.level '{}' is not valid. Valid levels: trace, debug, info, warn, error",
                self.level
            ))),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_log_level(),
            file: true,
            console: false,
            path: None,
        }
    }
}

/// Daemon mode timing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// Seconds between passes
    #[serde(default = "default_interval")]
    pub interval: u64,

    /// Seconds to wait after a failed pass
    #[serde(default = "default_retry_delay")]
    pub retry_delay: u64,
}

impl DaemonConfig {
    /// Interval between passes
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval)
    }

    /// Pause after a failed pass
    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay)
    }

    fn validate(&self) -> Result<()> {
        if self.interval == 0 {
            return Err(Error::config("daemon.interval must be > 0"));
        }
        if self.retry_delay == 0 {
            return Err(Error::config("daemon.retry_delay must be > 0"));
        }
        Ok(())
    }
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            interval: default_interval(),
            retry_delay: default_retry_delay(),
        }
    }
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_record_type() -> RecordType {
    RecordType::A
}

fn default_ttl() -> u32 {
    300
}

fn default_ip_timeout_secs() -> u64 {
    5
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_interval() -> u64 {
    1800
}

fn default_retry_delay() -> u64 {
    60
}
