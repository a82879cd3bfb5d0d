// # HTTP IP Source
//
// This crate provides the public-address lookup for the DDNS updater.
//
// ## Architecture
//
// Each address family has an ordered list of plain-text echo services
// (e.g. icanhazip.com, ipify.org). A lookup tries them in order and returns
// the first answer that parses as an address of the requested family.
// Failures are logged per endpoint and never abort the remaining endpoints.
//
// A disabled family answers `Ok(None)` without any network traffic.

use ddns_core::config::IpDetectionConfig;
use ddns_core::traits::{IpFamily, IpSource};
use ddns_core::{Error, Result};

use std::net::IpAddr;
use std::time::Duration;

/// HTTP-based IP source backed by echo services
pub struct HttpIpSource {
    /// IPv4 endpoints (None = family disabled)
    v4: Option<Vec<String>>,

    /// IPv6 endpoints (None = family disabled)
    v6: Option<Vec<String>>,

    /// HTTP client
    client: reqwest::Client,
}

impl HttpIpSource {
    /// Create a source with both families enabled on the built-in endpoints
    ///
    /// # Parameters
    ///
    /// - `timeout`: Per-request timeout applied to every endpoint
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::http(format!("Failed to build HTTP client: {}", e)))?;

        let defaults = IpDetectionConfig::default();
        Ok(Self {
            v4: Some(defaults.ipv4.endpoints_or_default(IpFamily::V4)),
            v6: Some(defaults.ipv6.endpoints_or_default(IpFamily::V6)),
            client,
        })
    }

    /// Create a source from the `[ip_detection]` configuration
    pub fn from_config(config: &IpDetectionConfig) -> Result<Self> {
        let mut source = Self::new(config.timeout())?;
        for family in IpFamily::ALL {
            let settings = config.family(family);
            let endpoints = settings
                .enabled
                .then(|| settings.endpoints_or_default(family));
            *source.slot_mut(family) = endpoints;
        }
        Ok(source)
    }

    /// Replace the endpoints of one family (and enable it)
    pub fn with_endpoints(mut self, family: IpFamily, endpoints: Vec<String>) -> Self {
        *self.slot_mut(family) = Some(endpoints);
        self
    }

    /// Disable one family
    pub fn with_disabled(mut self, family: IpFamily) -> Self {
        *self.slot_mut(family) = None;
        self
    }

    /// Endpoints tried for a family, or `None` when it is disabled
    pub fn endpoints(&self, family: IpFamily) -> Option<&[String]> {
        match family {
            IpFamily::V4 => self.v4.as_deref(),
            IpFamily::V6 => self.v6.as_deref(),
        }
    }

    fn slot_mut(&mut self, family: IpFamily) -> &mut Option<Vec<String>> {
        match family {
            IpFamily::V4 => &mut self.v4,
            IpFamily::V6 => &mut self.v6,
        }
    }

    /// Fetch and validate one endpoint's answer
    async fn fetch_from(&self, url: &str, family: IpFamily) -> Result<IpAddr> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::http(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::http(format!("HTTP error: {}", response.status())));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::http(format!("Failed to read response: {}", e)))?;

        family.parse(&body).ok_or_else(|| {
            Error::ip_source(format!("Invalid {} address: {:?}", family, body.trim()))
        })
    }
}

#[async_trait::async_trait]
impl IpSource for HttpIpSource {
    async fn current(&self, family: IpFamily) -> Result<Option<IpAddr>> {
        let Some(endpoints) = self.endpoints(family) else {
            tracing::debug!("{} detection disabled", family);
            return Ok(None);
        };

        for url in endpoints {
            match self.fetch_from(url, family).await {
                Ok(ip) => {
                    tracing::debug!("Detected {} address {} via {}", family, ip, url);
                    return Ok(Some(ip));
                }
                Err(e) => {
                    tracing::warn!("Failed to fetch {} from {}: {}", family, url, e);
                }
            }
        }

        tracing::error!("No {} address retrieved from any API", family);
        Err(Error::ip_source(format!(
            "No {} address retrieved from any API",
            family
        )))
    }

    fn source_name(&self) -> &'static str {
        "http"
    }
}

impl std::fmt::Debug for HttpIpSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpIpSource")
            .field("v4", &self.v4)
            .field("v6", &self.v6)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ddns_core::config::FamilyConfig;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn source() -> HttpIpSource {
        HttpIpSource::new(Duration::from_secs(2)).unwrap()
    }

    async fn answering(route: &str, status: u16, body: &str, server: &MockServer) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(server)
            .await;
    }

    #[test]
    fn test_defaults_cover_both_families() {
        let source = source();
        assert_eq!(
            source.endpoints(IpFamily::V4).unwrap()[0],
            "https://ipv4.icanhazip.com"
        );
        assert_eq!(
            source.endpoints(IpFamily::V6).unwrap()[0],
            "https://ipv6.icanhazip.com"
        );
    }

    #[test]
    fn test_from_config_respects_enabled_flag() {
        let mut config = IpDetectionConfig::default();
        config.ipv6 = FamilyConfig::disabled();
        config.ipv4.endpoints = vec!["http://127.0.0.1:1/ip".to_string()];

        let source = HttpIpSource::from_config(&config).unwrap();

        assert_eq!(
            source.endpoints(IpFamily::V4),
            Some(&["http://127.0.0.1:1/ip".to_string()][..])
        );
        assert!(source.endpoints(IpFamily::V6).is_none());
    }

    #[tokio::test]
    async fn test_first_valid_answer_wins() {
        let server = MockServer::start().await;
        answering("/a", 200, "203.0.113.7\n", &server).await;
        answering("/b", 200, "198.51.100.1", &server).await;

        let source = source().with_endpoints(
            IpFamily::V4,
            vec![format!("{}/a", server.uri()), format!("{}/b", server.uri())],
        );

        let ip = source.current(IpFamily::V4).await.unwrap();
        assert_eq!(ip, Some("203.0.113.7".parse().unwrap()));
    }

    #[tokio::test]
    async fn test_falls_through_failing_endpoints() {
        let server = MockServer::start().await;
        answering("/down", 503, "", &server).await;
        answering("/garbage", 200, "<html>hello</html>", &server).await;
        answering("/ok", 200, "2001:db8::42", &server).await;

        let source = source().with_endpoints(
            IpFamily::V6,
            vec![
                format!("{}/down", server.uri()),
                format!("{}/garbage", server.uri()),
                format!("{}/ok", server.uri()),
            ],
        );

        let ip = source.current(IpFamily::V6).await.unwrap();
        assert_eq!(ip, Some("2001:db8::42".parse().unwrap()));
    }

    #[tokio::test]
    async fn test_wrong_family_answer_is_rejected() {
        let server = MockServer::start().await;
        answering("/v4", 200, "203.0.113.7", &server).await;

        let source =
            source().with_endpoints(IpFamily::V6, vec![format!("{}/v4", server.uri())]);

        let result = source.current(IpFamily::V6).await;
        assert!(matches!(result, Err(Error::IpSource(_))));
    }

    #[tokio::test]
    async fn test_all_endpoints_failing_is_an_error() {
        let server = MockServer::start().await;
        answering("/a", 500, "", &server).await;
        answering("/b", 404, "", &server).await;

        let source = source().with_endpoints(
            IpFamily::V4,
            vec![format!("{}/a", server.uri()), format!("{}/b", server.uri())],
        );

        let err = source.current(IpFamily::V4).await.unwrap_err();
        assert!(err.to_string().contains("No ipv4 address retrieved"), "{}", err);
        assert_eq!(server.received_requests().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_skipped() {
        let server = MockServer::start().await;
        answering("/ok", 200, "192.0.2.10", &server).await;

        // nothing listens on port 1
        let source = source().with_endpoints(
            IpFamily::V4,
            vec![
                "http://127.0.0.1:1/ip".to_string(),
                format!("{}/ok", server.uri()),
            ],
        );

        let ip = source.current(IpFamily::V4).await.unwrap();
        assert_eq!(ip, Some("192.0.2.10".parse().unwrap()));
    }

    #[tokio::test]
    async fn test_slow_endpoint_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/slow"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("192.0.2.1")
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;
        answering("/fast", 200, "192.0.2.2", &server).await;

        let source = HttpIpSource::new(Duration::from_millis(200))
            .unwrap()
            .with_endpoints(
                IpFamily::V4,
                vec![format!("{}/slow", server.uri()), format!("{}/fast", server.uri())],
            );

        let ip = source.current(IpFamily::V4).await.unwrap();
        assert_eq!(ip, Some("192.0.2.2".parse().unwrap()));
    }

    #[tokio::test]
    async fn test_disabled_family_makes_no_requests() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("192.0.2.1"))
            .expect(0)
            .mount(&server)
            .await;

        let source = source()
            .with_endpoints(IpFamily::V4, vec![server.uri()])
            .with_disabled(IpFamily::V4);

        assert_eq!(source.current(IpFamily::V4).await.unwrap(), None);
    }
}
