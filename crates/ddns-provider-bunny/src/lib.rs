// # Bunny.net DNS Provider
//
// This crate provides the Bunny.net implementation of `DnsProvider`.
//
// ## Behavior
//
// - One HTTP request per call; no retries, no caching
// - Failures are mapped to typed errors and logged with a diagnostic hint
// - Dry-run mode performs listings but only logs intended mutations
//
// ## Security
//
// - The API key travels in the `AccessKey` header, marked sensitive
// - The API key NEVER appears in logs or `Debug` output
//
// ## API Reference
//
// - List records: GET `/dnszone/:zone_id` (body `{"Records": [...]}`)
// - Create record: PUT `/dnszone/:zone_id/records`
// - Update record: POST `/dnszone/:zone_id/records/:record_id`

use async_trait::async_trait;
use ddns_core::config::DdnsConfig;
use ddns_core::traits::{DnsProvider, RecordData, RemoteRecord};
use ddns_core::{Error, Result};
use reqwest::StatusCode;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Default HTTP timeout for API requests (10 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Header carrying the API key (`AccessKey`; header names are stored lowercase)
const ACCESS_KEY_HEADER: &str = "accesskey";

/// Zone listing as returned by `GET /dnszone/:id`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ZoneResponse {
    #[serde(default)]
    records: Vec<ApiRecord>,
}

/// One record inside a zone listing
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ApiRecord {
    id: u64,
    #[serde(rename = "Type")]
    record_type: u8,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    value: Option<String>,
    #[serde(default)]
    ttl: Option<u32>,
}

impl From<ApiRecord> for RemoteRecord {
    fn from(record: ApiRecord) -> Self {
        RemoteRecord {
            id: record.id,
            name: record.name.unwrap_or_default(),
            type_code: record.record_type,
            value: record.value.unwrap_or_default(),
            ttl: record.ttl.unwrap_or_default(),
        }
    }
}

/// Body of create and update calls
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct RecordBody<'a> {
    #[serde(rename = "Type")]
    record_type: u8,
    name: &'a str,
    value: &'a str,
    ttl: u32,
}

impl<'a> From<&'a RecordData> for RecordBody<'a> {
    fn from(record: &'a RecordData) -> Self {
        Self {
            record_type: record.record_type.wire_code(),
            name: &record.name,
            value: &record.value,
            ttl: record.ttl,
        }
    }
}

/// Which API call a response belongs to (drives the 404 hint)
#[derive(Debug, Clone, Copy)]
enum ApiCall {
    List,
    Create,
    Update { record_id: u64 },
}

impl fmt::Display for ApiCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiCall::List => f.write_str("list records"),
            ApiCall::Create => f.write_str("create record"),
            ApiCall::Update { .. } => f.write_str("update record"),
        }
    }
}

/// Bunny.net DNS provider
///
/// # Dry-Run Mode
///
/// When `dry_run` is true, the provider will:
/// - Perform listing requests
/// - Log the intended create/update payload
/// - **NOT** actually modify DNS records
pub struct BunnyProvider {
    /// API root, without a trailing slash
    base_url: String,

    /// HTTP client; carries the AccessKey and Accept headers
    client: reqwest::Client,

    /// Dry-run mode: if true, list records but skip mutations
    dry_run: bool,
}

// Custom Debug implementation that hides the API key
impl fmt::Debug for BunnyProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BunnyProvider")
            .field("api_key", &"<REDACTED>")
            .field("base_url", &self.base_url)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

impl BunnyProvider {
    /// Create a new Bunny.net provider
    ///
    /// # Parameters
    ///
    /// - `api_key`: Account API key
    /// - `base_url`: API root (normally `https://api.bunny.net`)
    /// - `dry_run`: If true, list records but skip mutations
    ///
    /// # Errors
    ///
    /// `Error::Config` for an empty or non-header-safe key, `Error::Http` if
    /// the HTTP client cannot be built.
    pub fn new(api_key: &str, base_url: impl Into<String>, dry_run: bool) -> Result<Self> {
        if api_key.is_empty() {
            return Err(Error::config("Bunny.net API key cannot be empty"));
        }

        let mut access_key = HeaderValue::from_str(api_key)
            .map_err(|_| Error::config("api_key contains characters not allowed in a header"))?;
        access_key.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(ACCESS_KEY_HEADER, access_key);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::http(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
            dry_run,
        })
    }

    /// Create a provider from the loaded configuration
    pub fn from_config(config: &DdnsConfig, dry_run: bool) -> Result<Self> {
        if dry_run {
            tracing::warn!("Bunny.net provider running in DRY-RUN mode - no changes will be made");
        }
        Self::new(&config.api_key, config.api_base_url.clone(), dry_run)
    }

    /// Whether mutations are only logged
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    fn zone_url(&self, zone_id: u64) -> String {
        format!("{}/dnszone/{}", self.base_url, zone_id)
    }

    fn records_url(&self, zone_id: u64) -> String {
        format!("{}/dnszone/{}/records", self.base_url, zone_id)
    }

    fn record_url(&self, zone_id: u64, record_id: u64) -> String {
        format!("{}/dnszone/{}/records/{}", self.base_url, zone_id, record_id)
    }

    /// Send a request and map non-success statuses to typed errors
    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        zone_id: u64,
        call: ApiCall,
    ) -> Result<reqwest::Response> {
        let response = request
            .send()
            .await
            .map_err(|e| Error::http(format!("{} request failed: {}", call, e)))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unable to read error response".to_string());
        Err(status_error(status, &error_text, zone_id, call))
    }

    /// Log the payload a mutation would have sent
    fn log_dry_run(&self, verb: &str, url: &str, body: &RecordBody<'_>) -> Result<()> {
        tracing::info!(
            "[DRY-RUN] Would send {} request to {} with payload: {}",
            verb,
            url,
            serde_json::to_string(body)?
        );
        Ok(())
    }
}

/// Map an error status to a typed error, logging the matching hint
fn status_error(status: StatusCode, error_text: &str, zone_id: u64, call: ApiCall) -> Error {
    match status.as_u16() {
        401 | 403 => {
            tracing::error!("Invalid API key. Check 'api_key' in the configuration");
            Error::auth(format!("{} returned {}", call, status))
        }
        404 => match call {
            ApiCall::List | ApiCall::Create => {
                tracing::error!(
                    "Zone ID {} not found. Verify Zone ID in Bunny.net DNS panel",
                    zone_id
                );
                Error::not_found(format!("Zone ID {} not found", zone_id))
            }
            ApiCall::Update { record_id } => {
                tracing::error!("Record ID {} or Zone ID {} not found", record_id, zone_id);
                Error::not_found(format!(
                    "Record ID {} or Zone ID {} not found",
                    record_id, zone_id
                ))
            }
        },
        429 => {
            tracing::warn!("Bunny.net API rate limit hit during {}", call);
            Error::rate_limited(format!("{} returned {}", call, status))
        }
        500..=599 => Error::provider(
            "bunny",
            format!("Bunny.net server error (transient): {} - {}", status, error_text),
        ),
        _ => Error::provider(
            "bunny",
            format!("{} failed: {} - {}", call, status, error_text),
        ),
    }
}

#[async_trait]
impl DnsProvider for BunnyProvider {
    /// # API Call
    ///
    /// ```http
    /// GET /dnszone/:zone_id
    /// AccessKey: <key>
    /// ```
    async fn list_records(&self, zone_id: u64) -> Result<Vec<RemoteRecord>> {
        let url = self.zone_url(zone_id);
        tracing::debug!("Listing records for zone {}", zone_id);

        let response = self
            .send(self.client.get(&url), zone_id, ApiCall::List)
            .await?;

        let zone: ZoneResponse = response.json().await.map_err(|e| {
            Error::provider("bunny", format!("Failed to parse response: {}", e))
        })?;

        Ok(zone.records.into_iter().map(RemoteRecord::from).collect())
    }

    /// # API Call
    ///
    /// ```http
    /// PUT /dnszone/:zone_id/records
    /// {"Type": 0, "Name": "home", "Value": "1.2.3.4", "Ttl": 300}
    /// ```
    async fn create_record(&self, zone_id: u64, record: &RecordData) -> Result<()> {
        let url = self.records_url(zone_id);
        let body = RecordBody::from(record);

        if self.dry_run {
            return self.log_dry_run("PUT", &url, &body);
        }

        self.send(self.client.put(&url).json(&body), zone_id, ApiCall::Create)
            .await?;
        Ok(())
    }

    /// # API Call
    ///
    /// ```http
    /// POST /dnszone/:zone_id/records/:record_id
    /// {"Type": 0, "Name": "home", "Value": "1.2.3.4", "Ttl": 300}
    /// ```
    async fn update_record(&self, zone_id: u64, record_id: u64, record: &RecordData) -> Result<()> {
        let url = self.record_url(zone_id, record_id);
        let body = RecordBody::from(record);

        if self.dry_run {
            return self.log_dry_run("POST", &url, &body);
        }

        self.send(
            self.client.post(&url).json(&body),
            zone_id,
            ApiCall::Update { record_id },
        )
        .await?;
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "bunny"
    }
}
