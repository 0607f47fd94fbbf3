//! Choosing a provider by configuration.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use hitchspots_core::TripPlanner;

use super::mapbox::{MAPBOX_BASE_URL, MapboxTripPlanner};
use super::osrm::{OSRM_BASE_URL, OsrmTripPlanner};
use super::transport::{HttpProviderConfig, ProviderBuildError};

/// Supported routing services.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Mapbox Directions; needs an access token.
    Mapbox,
    /// OSRM Trip.
    #[default]
    Osrm,
}

impl ProviderKind {
    /// Name used in configuration and errors.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Mapbox => "mapbox",
            Self::Osrm => "osrm",
        }
    }

    /// Public service root for the provider.
    #[must_use]
    pub const fn default_base_url(self) -> &'static str {
        match self {
            Self::Mapbox => MAPBOX_BASE_URL,
            Self::Osrm => OSRM_BASE_URL,
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when parsing an unknown provider name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown routing provider {name:?}; expected \"mapbox\" or \"osrm\"")]
pub struct UnknownProvider {
    /// Rejected name.
    pub name: String,
}

impl FromStr for ProviderKind {
    type Err = UnknownProvider;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.trim().to_ascii_lowercase().as_str() {
            "mapbox" => Ok(Self::Mapbox),
            "osrm" => Ok(Self::Osrm),
            _ => Err(UnknownProvider {
                name: name.to_owned(),
            }),
        }
    }
}

/// Which provider to build, and how to reach it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutingConfig {
    /// Selected provider.
    pub provider: ProviderKind,
    /// Connection settings.
    pub http: HttpProviderConfig,
    /// Access token, required by Mapbox.
    pub access_token: Option<String>,
}

impl RoutingConfig {
    /// Settings for `provider` against its public service.
    #[must_use]
    pub fn new(provider: ProviderKind) -> Self {
        Self {
            provider,
            http: HttpProviderConfig::new(provider.default_base_url()),
            access_token: None,
        }
    }

    /// Point the provider at another service root.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.http.base_url = base_url.into();
        self
    }

    /// Set the routing profile.
    #[must_use]
    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.http = self.http.with_profile(profile);
        self
    }

    /// Set the access token.
    #[must_use]
    pub fn with_access_token(mut self, access_token: impl Into<String>) -> Self {
        self.access_token = Some(access_token.into());
        self
    }
}

/// Build the provider selected by `config`.
///
/// ```
/// use hitchspots_data::routing::{ProviderKind, RoutingConfig, build_planner};
///
/// let planner = build_planner(&RoutingConfig::new(ProviderKind::Osrm))?;
/// assert_eq!(planner.name(), "osrm");
/// # Ok::<(), hitchspots_data::routing::ProviderBuildError>(())
/// ```
pub fn build_planner(config: &RoutingConfig) -> Result<Box<dyn TripPlanner>, ProviderBuildError> {
    log::debug!(
        "building {} planner for {}",
        config.provider,
        config.http.base_url
    );
    match config.provider {
        ProviderKind::Osrm => Ok(Box::new(OsrmTripPlanner::new(config.http.clone())?)),
        ProviderKind::Mapbox => {
            let token = config
                .access_token
                .clone()
                .ok_or(ProviderBuildError::MissingAccessToken {
                    provider: ProviderKind::Mapbox.name(),
                })?;
            Ok(Box::new(MapboxTripPlanner::new(config.http.clone(), token)?))
        }
    }
}
