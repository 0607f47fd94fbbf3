//! Blocking HTTP transport shared by the routing providers.
//!
//! [`TripPlanner`](hitchspots_core::TripPlanner) is synchronous so the core
//! stays embeddable in synchronous callers. Providers bridge the async
//! `reqwest` client to it by blocking on a Tokio runtime they own.

use log::debug;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tokio::runtime::{Handle, Runtime, RuntimeFlavor};
use url::Url;

use hitchspots_core::TripError;

/// Default user agent for routing requests.
pub const DEFAULT_USER_AGENT: &str = "hitchspots-routing/0.1";

/// Default routing profile for both providers.
pub const DEFAULT_PROFILE: &str = "driving";

/// Error raised while constructing a provider.
#[derive(Debug, Error)]
pub enum ProviderBuildError {
    /// Failed to build the HTTP client.
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
    /// Failed to build the Tokio runtime.
    #[error("failed to build Tokio runtime: {0}")]
    Runtime(#[source] std::io::Error),
    /// The base URL did not parse.
    #[error("invalid routing base URL {base_url:?}: {source}")]
    InvalidBaseUrl {
        /// Rejected URL.
        base_url: String,
        /// Parse failure.
        #[source]
        source: url::ParseError,
    },
    /// The base URL cannot carry path segments (for example `mailto:`).
    #[error("routing base URL {base_url:?} cannot carry a path")]
    UnsupportedBaseUrl {
        /// Rejected URL.
        base_url: String,
    },
    /// The provider needs an access token and none was supplied.
    #[error("{provider} requires an access token")]
    MissingAccessToken {
        /// Provider name.
        provider: &'static str,
    },
}

/// Connection settings for an HTTP routing provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpProviderConfig {
    /// Service root, e.g. `"https://router.project-osrm.org"`.
    pub base_url: String,
    /// Routing profile placed in the request path, e.g. `"driving"`.
    pub profile: String,
    /// User agent string for requests.
    pub user_agent: String,
}

impl HttpProviderConfig {
    /// Configuration for the service at `base_url` with default profile and
    /// user agent.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            profile: DEFAULT_PROFILE.to_owned(),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }

    /// Set the routing profile.
    #[must_use]
    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = profile.into();
        self
    }

    /// Set the user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// HTTP client, runtime and validated base URL of one provider.
///
/// # Runtime behaviour
///
/// Outside any Tokio runtime, requests run on the owned current-thread
/// runtime. Inside a multi-threaded runtime the ambient handle is used via
/// [`tokio::task::block_in_place`]. Inside a `current_thread` runtime the
/// owned runtime is used, which may deadlock if the caller's runtime drives
/// IO this request depends on.
///
/// Dropping the transport drops its runtime, so it must not be dropped from
/// an async task; move it into `block_in_place` or `spawn_blocking` first.
pub(super) struct HttpTransport {
    provider: &'static str,
    client: Client,
    runtime: Runtime,
    base_url: Url,
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("provider", &self.provider)
            .field("base_url", &self.base_url.as_str())
            .field("runtime", &"<tokio::runtime::Runtime>")
            .finish_non_exhaustive()
    }
}

impl HttpTransport {
    pub(super) fn new(
        provider: &'static str,
        config: &HttpProviderConfig,
    ) -> Result<Self, ProviderBuildError> {
        let base_url =
            Url::parse(&config.base_url).map_err(|source| ProviderBuildError::InvalidBaseUrl {
                base_url: config.base_url.clone(),
                source,
            })?;
        if base_url.cannot_be_a_base() {
            return Err(ProviderBuildError::UnsupportedBaseUrl {
                base_url: config.base_url.clone(),
            });
        }
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .build()
            .map_err(ProviderBuildError::HttpClient)?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(ProviderBuildError::Runtime)?;
        Ok(Self {
            provider,
            client,
            runtime,
            base_url,
        })
    }

    /// Base URL extended with `segments` and `query`.
    pub(super) fn endpoint<'a>(
        &self,
        segments: impl IntoIterator<Item = &'a str>,
        query: &[(&str, &str)],
    ) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        url
    }

    /// Issue a GET and decode a JSON body, blocking until it completes.
    pub(super) fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, TripError> {
        let future = self.fetch(url);
        match Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
                tokio::task::block_in_place(|| handle.block_on(future))
            }
            _ => self.runtime.block_on(future),
        }
    }

    async fn fetch<T: DeserializeOwned>(&self, url: Url) -> Result<T, TripError> {
        debug!("requesting trip from {}", self.provider);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| self.unavailable(err))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(TripError::ProviderUnavailable {
                provider: self.provider,
                status: Some(status.as_u16()),
                message: format!("unexpected HTTP status {status}"),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|err| self.unavailable(err))?;
        serde_json::from_slice(&body).map_err(|err| TripError::InvalidResponse {
            provider: self.provider,
            message: err.to_string(),
        })
    }

    /// Transport failures never echo the URL, which may carry credentials.
    fn unavailable(&self, error: reqwest::Error) -> TripError {
        TripError::ProviderUnavailable {
            provider: self.provider,
            status: error.status().map(|status| status.as_u16()),
            message: error.without_url().to_string(),
        }
    }
}

/// Render waypoints as `lon,lat` pairs joined by `;`.
pub(super) fn coordinate_path(waypoints: &[hitchspots_core::Waypoint]) -> String {
    waypoints
        .iter()
        .map(|waypoint| format!("{},{}", waypoint.lon, waypoint.lat))
        .collect::<Vec<_>>()
        .join(";")
}

#[cfg(test)]
mod tests {
    use super::*;
    use hitchspots_core::Waypoint;
    use rstest::rstest;

    #[rstest]
    fn coordinate_path_puts_longitude_first() {
        let path = coordinate_path(&[Waypoint::new(1.0, 2.0), Waypoint::new(-33.9, 18.42)]);
        assert_eq!(path, "2,1;18.42,-33.9");
    }

    #[rstest]
    #[case("http://osrm.example.com", "http://osrm.example.com/trip/v1/driving/2,1?a=b")]
    #[case("http://osrm.example.com/", "http://osrm.example.com/trip/v1/driving/2,1?a=b")]
    #[case(
        "http://example.com/osrm/",
        "http://example.com/osrm/trip/v1/driving/2,1?a=b"
    )]
    fn endpoint_appends_segments(#[case] base_url: &str, #[case] expected: &str) {
        let transport =
            HttpTransport::new("osrm", &HttpProviderConfig::new(base_url)).expect("transport");

        let url = transport.endpoint(["trip", "v1", "driving", "2,1"], &[("a", "b")]);

        assert_eq!(url.as_str(), expected);
    }

    #[rstest]
    fn rejects_unparsable_base_url() {
        let err = HttpTransport::new("osrm", &HttpProviderConfig::new("not a url"))
            .expect_err("invalid URL");
        assert!(matches!(err, ProviderBuildError::InvalidBaseUrl { .. }));
    }

    #[rstest]
    fn rejects_base_url_without_path() {
        let err = HttpTransport::new("osrm", &HttpProviderConfig::new("mailto:routing@example.com"))
            .expect_err("cannot be a base");
        assert!(matches!(err, ProviderBuildError::UnsupportedBaseUrl { .. }));
    }

    #[rstest]
    fn config_builder_pattern() {
        let config = HttpProviderConfig::new("http://example.com")
            .with_profile("cycling")
            .with_user_agent("test-agent/1.0");

        assert_eq!(config.base_url, "http://example.com");
        assert_eq!(config.profile, "cycling");
        assert_eq!(config.user_agent, "test-agent/1.0");
    }
}
