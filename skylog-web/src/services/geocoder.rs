//! Location resolution
//!
//! Free text is resolved through Open-Meteo's geocoding search first, then
//! Nominatim (OpenStreetMap) when the primary provider fails or finds
//! nothing. Input that already looks like `lat,lon` skips the network.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use skylog_common::config::GeocodingConfig;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Which step of the resolution produced a location
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum GeocodeSource {
    Coordinates,
    OpenMeteo,
    Nominatim,
}

/// A location resolved to a display name and coordinates
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedLocation {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    pub country_code: Option<String>,
    pub source: GeocodeSource,
}

/// Classified failure of a single provider call
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    #[error("request timed out")]
    Timeout,

    #[error("network error: {0}")]
    Network(String),

    #[error("HTTP status {0}")]
    Status(u16),

    #[error("unexpected response: {0}")]
    Parse(String),

    #[error("no results")]
    NoResults,
}

impl ProviderError {
    fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProviderError::Timeout
        } else if err.is_decode() {
            ProviderError::Parse(err.to_string())
        } else {
            ProviderError::Network(err.to_string())
        }
    }
}

/// Geocoding failures
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeocodeError {
    #[error("location query is empty")]
    EmptyQuery,

    #[error("coordinates out of range: {lat}, {lon}")]
    InvalidCoordinates { lat: f64, lon: f64 },

    #[error("could not resolve location (primary: {primary}; fallback: {fallback})")]
    Unresolved {
        primary: ProviderError,
        fallback: ProviderError,
    },
}

#[derive(Debug, Deserialize)]
struct OpenMeteoResponse {
    #[serde(default)]
    results: Option<Vec<OpenMeteoPlace>>,
}

#[derive(Debug, Deserialize)]
struct OpenMeteoPlace {
    name: Option<String>,
    latitude: f64,
    longitude: f64,
    country_code: Option<String>,
    admin1: Option<String>,
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    display_name: Option<String>,
    lat: Option<String>,
    lon: Option<String>,
}

/// Two-tier geocoder with per-call timeout
#[derive(Debug, Clone)]
pub struct Geocoder {
    http_client: reqwest::Client,
    primary_url: String,
    fallback_url: String,
}

impl Geocoder {
    pub fn new(config: &GeocodingConfig) -> Result<Self, ProviderError> {
        Self::from_parts(
            &config.primary_url,
            &config.fallback_url,
            &config.user_agent,
            Duration::from_secs(config.timeout_secs),
        )
    }

    pub fn from_parts(
        primary_url: &str,
        fallback_url: &str,
        user_agent: &str,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let http_client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            primary_url: primary_url.to_string(),
            fallback_url: fallback_url.to_string(),
        })
    }

    /// Resolve raw user input to a single location
    pub async fn resolve(&self, query: &str) -> Result<ResolvedLocation, GeocodeError> {
        if let Some((lat, lon)) = parse_coordinates(query) {
            if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
                return Err(GeocodeError::InvalidCoordinates { lat, lon });
            }
            return Ok(ResolvedLocation {
                name: format!("{:.4},{:.4}", lat, lon),
                lat,
                lon,
                country_code: None,
                source: GeocodeSource::Coordinates,
            });
        }

        let query = query.trim();
        if query.is_empty() {
            return Err(GeocodeError::EmptyQuery);
        }

        let primary = match self.search_open_meteo(query).await {
            Ok(location) => return Ok(location),
            Err(err) => {
                log_provider_error("Open-Meteo", query, &err);
                err
            }
        };

        let fallback = match self.search_nominatim(query).await {
            Ok(location) => return Ok(location),
            Err(err) => {
                log_provider_error("Nominatim", query, &err);
                err
            }
        };

        info!(query = %query, "Geocoding failed with both providers");
        Err(GeocodeError::Unresolved { primary, fallback })
    }

    /// Primary provider: Open-Meteo geocoding search
    pub async fn search_open_meteo(&self, query: &str) -> Result<ResolvedLocation, ProviderError> {
        let response: OpenMeteoResponse = self
            .get_json(
                &self.primary_url,
                &[
                    ("name", query),
                    ("count", "1"),
                    ("language", "en"),
                    ("format", "json"),
                ],
            )
            .await?;

        let top = response
            .results
            .and_then(|results| results.into_iter().next())
            .ok_or(ProviderError::NoResults)?;

        let name = [top.name, top.admin1, top.country]
            .into_iter()
            .flatten()
            .filter(|part| !part.trim().is_empty())
            .collect::<Vec<_>>()
            .join(", ");

        Ok(ResolvedLocation {
            name: if name.is_empty() { query.to_string() } else { name },
            lat: top.latitude,
            lon: top.longitude,
            country_code: top.country_code,
            source: GeocodeSource::OpenMeteo,
        })
    }

    /// Fallback provider: Nominatim search
    pub async fn search_nominatim(&self, query: &str) -> Result<ResolvedLocation, ProviderError> {
        let places: Vec<NominatimPlace> = self
            .get_json(
                &self.fallback_url,
                &[("q", query), ("format", "jsonv2"), ("limit", "1")],
            )
            .await?;

        let top = places.into_iter().next().ok_or(ProviderError::NoResults)?;

        let lat = parse_float(top.lat.as_deref(), "lat")?;
        let lon = parse_float(top.lon.as_deref(), "lon")?;

        Ok(ResolvedLocation {
            name: top
                .display_name
                .filter(|name| !name.trim().is_empty())
                .unwrap_or_else(|| query.to_string()),
            lat,
            lon,
            country_code: None,
            source: GeocodeSource::Nominatim,
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        params: &[(&str, &str)],
    ) -> Result<T, ProviderError> {
        debug!(url = %url, "Querying geocoding provider");

        let response = self
            .http_client
            .get(url)
            .query(params)
            .send()
            .await
            .map_err(ProviderError::from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Status(status.as_u16()));
        }

        let body = response.bytes().await.map_err(ProviderError::from_reqwest)?;
        serde_json::from_slice(&body).map_err(|e| ProviderError::Parse(e.to_string()))
    }
}

fn log_provider_error(provider: &str, query: &str, err: &ProviderError) {
    match err {
        ProviderError::NoResults => debug!(query = %query, "{} geocoding found no results", provider),
        _ => warn!(query = %query, "{} geocoding error: {}", provider, err),
    }
}

fn parse_float(value: Option<&str>, field: &str) -> Result<f64, ProviderError> {
    value
        .and_then(|v| v.trim().parse::<f64>().ok())
        .ok_or_else(|| ProviderError::Parse(format!("missing or invalid {}", field)))
}

/// Recognize `"lat,lon"` or `"lat lon"` input
///
/// Each number is an optionally negative decimal such as `47` or `-122.33`;
/// exponents, plus signs and bare trailing dots are not coordinates.
pub fn parse_coordinates(input: &str) -> Option<(f64, f64)> {
    let input = input.trim();

    let (first, second) = match input.split_once(',') {
        Some((a, b)) => (a.trim(), b.trim()),
        None => {
            let mut parts = input.split_whitespace();
            let a = parts.next()?;
            let b = parts.next()?;
            if parts.next().is_some() {
                return None;
            }
            (a, b)
        }
    };

    if !is_plain_decimal(first) || !is_plain_decimal(second) {
        return None;
    }

    Some((first.parse().ok()?, second.parse().ok()?))
}

fn is_plain_decimal(s: &str) -> bool {
    let unsigned = s.strip_prefix('-').unwrap_or(s);
    let (whole, frac) = match unsigned.split_once('.') {
        Some((whole, frac)) => (whole, Some(frac)),
        None => (unsigned, None),
    };

    let all_digits = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());

    all_digits(whole) && frac.map_or(true, all_digits)
}
