//! Beacon midpoint resolution
//!
//! Finds fair places to meet for a group of people who only share where they
//! are, using real public-transit travel times rather than straight lines.
//!
//! # Architecture
//!
//! ```text
//!  participants ──► resolver ──► round 1: probe centroid
//!                       │            │
//!                       │            ▼  shift toward the worst-off person
//!                       │        round 2: candidates ──► evaluate ──► pool
//!                       │                                               │
//!                       ▼                                               ▼
//!               aggregate (one task per participant)        lowestTotal / fairest
//!                       │
//!                       ▼
//!               TravelTimeProvider (Google Routes, rate limited)
//! ```
//!
//! ## Failure model
//! - A failed or stalled lookup marks one participant's sample as failed
//! - A candidate nobody could reach never wins
//! - If nothing at all comes back, the answer is the geometric centroid
//! - Only bad input and a missing API key are errors

pub mod aggregate;
pub mod candidates;
pub mod evaluate;
pub mod google;
pub mod limiter;
pub mod provider;
pub mod resolver;
pub mod types;

#[cfg(test)]
pub(crate) mod test_support;

pub use evaluate::EvaluatedCandidate;
pub use google::{GoogleRoutesClient, RoutesConfig};
pub use provider::{TravelTimeError, TravelTimeProvider};
pub use resolver::{resolve_midpoint, MidpointResolver, ResolveError, ResolverConfig};
pub use types::*;
