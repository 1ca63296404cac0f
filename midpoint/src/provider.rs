//! # Travel-time port
//!
//! The resolver only needs one thing from the outside world: how long it
//! takes to get from A to B by public transit. Adapters implement
//! [`TravelTimeProvider`]; the Google Routes one lives in [`crate::google`].

use std::future::Future;

use crate::types::Coordinate;

/// Errors from a single travel-time lookup
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TravelTimeError {
    /// No API key configured. Fatal, never retried.
    #[error("GOOGLE_ROUTES_API_KEY is not configured")]
    MissingCredential,

    #[error("Routes API error ({status}): {body}")]
    Status { status: u16, body: String },

    #[error("No transit route found")]
    NoRoute,

    #[error("Malformed duration: {0:?}")]
    MalformedDuration(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Invalid response body: {0}")]
    InvalidResponse(String),

    #[error("Timeout after {0}ms")]
    Timeout(u64),

    #[error("Coordinates must be finite")]
    NonFiniteCoordinate,
}

impl TravelTimeError {
    /// Configuration problems fail the whole feature instead of a single sample.
    pub fn is_configuration(&self) -> bool {
        matches!(self, TravelTimeError::MissingCredential)
    }
}

/// Computes transit travel time between two points, in whole seconds.
///
/// One call is one lookup: no caching, no retries. Callers decide what a
/// failure means.
///
/// Callers await [`wait_for_slot`](Self::wait_for_slot) before each lookup;
/// time spent there is queueing, not part of the call.
pub trait TravelTimeProvider: Send + Sync + 'static {
    /// Resolves once this provider may start another lookup.
    fn wait_for_slot(&self) -> impl Future<Output = ()> + Send {
        async {}
    }

    fn travel_time(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> impl Future<Output = Result<u32, TravelTimeError>> + Send;

    /// Checked once before a resolution run so misconfiguration surfaces
    /// before any network call.
    fn ensure_configured(&self) -> Result<(), TravelTimeError> {
        Ok(())
    }
}
