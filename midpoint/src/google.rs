//! Google Routes API adapter
//!
//! Computes transit travel time with a single `computeRoutes` call, asking
//! only for `routes.duration`.
//!
//! # Example
//! ```rust,ignore
//! let client = GoogleRoutesClient::new(RoutesConfig::new(Some(key)));
//! let seconds = client.travel_time(origin, destination).await?;
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::limiter::RateLimiter;
use crate::provider::{TravelTimeError, TravelTimeProvider};
use crate::types::Coordinate;

pub const DEFAULT_ROUTES_URL: &str = "https://routes.googleapis.com/directions/v2:computeRoutes";

/// Settings for [`GoogleRoutesClient`]
#[derive(Debug, Clone)]
pub struct RoutesConfig {
    pub api_key: Option<String>,
    pub url: String,
    /// Minimum spacing between outgoing requests
    pub min_request_interval: Duration,
}

impl RoutesConfig {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            url: DEFAULT_ROUTES_URL.to_string(),
            min_request_interval: Duration::from_millis(10),
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn with_min_request_interval(mut self, interval: Duration) -> Self {
        self.min_request_interval = interval;
        self
    }
}

pub struct GoogleRoutesClient {
    http: reqwest::Client,
    url: String,
    api_key: Option<String>,
    limiter: RateLimiter,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ComputeRoutesRequest {
    origin: Waypoint,
    destination: Waypoint,
    travel_mode: &'static str,
    compute_alternative_routes: bool,
}

#[derive(Serialize)]
struct Waypoint {
    location: Location,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Location {
    lat_lng: LatLng,
}

#[derive(Serialize)]
struct LatLng {
    latitude: f64,
    longitude: f64,
}

impl From<Coordinate> for Waypoint {
    fn from(c: Coordinate) -> Self {
        Waypoint {
            location: Location {
                lat_lng: LatLng {
                    latitude: c.lat,
                    longitude: c.lng,
                },
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct ComputeRoutesResponse {
    #[serde(default)]
    routes: Vec<RouteSummary>,
}

#[derive(Debug, Deserialize)]
struct RouteSummary {
    duration: Option<String>,
}

impl GoogleRoutesClient {
    pub fn new(cfg: RoutesConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: cfg.url,
            api_key: cfg.api_key,
            limiter: RateLimiter::new(cfg.min_request_interval),
        }
    }

    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    async fn compute_route(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> Result<u32, TravelTimeError> {
        let api_key = self.api_key.as_deref().ok_or(TravelTimeError::MissingCredential)?;
        if !origin.is_finite() || !destination.is_finite() {
            return Err(TravelTimeError::NonFiniteCoordinate);
        }

        let body = ComputeRoutesRequest {
            origin: origin.into(),
            destination: destination.into(),
            travel_mode: "TRANSIT",
            compute_alternative_routes: false,
        };

        let resp = self
            .http
            .post(&self.url)
            .header("X-Goog-Api-Key", api_key)
            .header("X-Goog-FieldMask", "routes.duration")
            .json(&body)
            .send()
            .await
            .map_err(|e| TravelTimeError::Transport(e.to_string()))?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| TravelTimeError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(TravelTimeError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        parse_routes_response(&text)
    }
}

impl TravelTimeProvider for GoogleRoutesClient {
    async fn wait_for_slot(&self) {
        self.limiter.acquire().await;
    }

    async fn travel_time(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> Result<u32, TravelTimeError> {
        self.compute_route(origin, destination).await
    }

    fn ensure_configured(&self) -> Result<(), TravelTimeError> {
        if self.has_credential() {
            Ok(())
        } else {
            Err(TravelTimeError::MissingCredential)
        }
    }
}

/// Pull the first route's duration out of a successful response body.
pub fn parse_routes_response(body: &str) -> Result<u32, TravelTimeError> {
    let data: ComputeRoutesResponse = serde_json::from_str(body)
        .map_err(|e| TravelTimeError::InvalidResponse(e.to_string()))?;

    let route = data.routes.first().ok_or(TravelTimeError::NoRoute)?;
    let duration = route
        .duration
        .as_deref()
        .ok_or_else(|| TravelTimeError::MalformedDuration(String::new()))?;
    parse_duration(duration)
}

/// `"1234s"` -> 1234. Fractional seconds (`"12.5s"`) are truncated.
pub fn parse_duration(raw: &str) -> Result<u32, TravelTimeError> {
    let malformed = || TravelTimeError::MalformedDuration(raw.to_string());
    let digits = raw.trim().strip_suffix('s').ok_or_else(malformed)?;
    let whole = digits.split('.').next().unwrap_or_default();
    if whole.is_empty() {
        return Err(malformed());
    }
    whole.parse::<u32>().map_err(|_| malformed())
}
