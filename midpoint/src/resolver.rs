//! # Midpoint resolver
//!
//! Two-round search for a fair meeting point:
//!
//! 1. Probe the plain centroid of everyone's position.
//! 2. If at least two people got a travel time, pull the search center
//!    `shift_fraction` of the way toward whoever had the longest trip.
//! 3. Evaluate the shifted center plus one point per participant,
//!    `candidate_fraction` of the way toward them.
//! 4. Pool those with the round-1 centroid and pick a winner per strategy:
//!    lowest total minutes, and lowest worst-case minutes.
//!
//! The candidate set is small and heuristic. It finds a good point for a
//! handful of friends; it is not a global optimiser.
//!
//! When the provider gives nothing back at all, the result degrades to the
//! geometric centroid with every travel time marked as failed.

use std::sync::Arc;
use std::time::Duration;

use crate::aggregate::travel_times_for_participants;
use crate::candidates::{centroid, generate_candidates};
use crate::evaluate::{evaluate_candidates, EvaluatedCandidate};
use crate::provider::{TravelTimeError, TravelTimeProvider};
use crate::types::{
    Coordinate, MidpointResolution, Participant, ParticipantTravelTime, Strategies, StrategyResult,
    TravelTimeSample,
};

/// Tunable constants of the search
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// How far the center moves toward the most disadvantaged participant
    pub shift_fraction: f64,
    /// How far each candidate sits from the center toward a participant
    pub candidate_fraction: f64,
    /// Per-lookup timeout; a stalled call counts as a failed sample
    pub call_timeout: Duration,
}

impl ResolverConfig {
    pub fn with_shift_fraction(mut self, fraction: f64) -> Self {
        self.shift_fraction = fraction;
        self
    }

    pub fn with_candidate_fraction(mut self, fraction: f64) -> Self {
        self.candidate_fraction = fraction;
        self
    }

    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            shift_fraction: 0.4,
            candidate_fraction: 0.25,
            call_timeout: Duration::from_secs(5),
        }
    }
}

/// Caller mistakes and misconfiguration. Provider outages are never errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ResolveError {
    #[error("At least one participant is required")]
    NoParticipants,

    #[error("Participant {name:?} has a non-finite coordinate")]
    NonFiniteCoordinate { name: String },

    #[error("Travel time provider misconfigured: {0}")]
    Configuration(TravelTimeError),
}

pub struct MidpointResolver<P> {
    provider: Arc<P>,
    config: ResolverConfig,
}

impl<P: TravelTimeProvider> MidpointResolver<P> {
    pub fn new(provider: P, config: ResolverConfig) -> Self {
        Self::from_arc(Arc::new(provider), config)
    }

    pub fn from_arc(provider: Arc<P>, config: ResolverConfig) -> Self {
        Self { provider, config }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    pub fn provider(&self) -> &Arc<P> {
        &self.provider
    }

    /// Resolve meeting points for `participants`.
    pub async fn resolve(&self, participants: &[Participant]) -> Result<MidpointResolution, ResolveError> {
        validate(participants)?;
        self.provider
            .ensure_configured()
            .map_err(ResolveError::Configuration)?;

        if let [solo] = participants {
            tracing::debug!(participant = %solo.name, "Single participant, meeting at their location");
            return Ok(solo_resolution(solo));
        }

        let positions: Vec<Coordinate> = participants.iter().map(|p| p.position).collect();
        let center = centroid(&positions).ok_or(ResolveError::NoParticipants)?;
        let participants: Arc<[Participant]> = participants.into();
        let timeout = self.config.call_timeout;

        // Round 1: probe the centroid
        let probe = travel_times_for_participants(&self.provider, &participants, center, timeout).await;

        let search_center = match most_disadvantaged(&participants, &probe) {
            Some(p) => {
                let shifted = shift_center(center, p.position, self.config.shift_fraction);
                tracing::debug!(
                    participant = %p.name,
                    lat = shifted.lat,
                    lng = shifted.lng,
                    "Shifting search toward most disadvantaged participant"
                );
                shifted
            }
            None => center,
        };

        // Round 2: search around the shifted center
        let candidates = generate_candidates(search_center, &positions, self.config.candidate_fraction);
        let mut pool = evaluate_candidates(&self.provider, &candidates, &participants, timeout).await;
        if let Some(c) = EvaluatedCandidate::from_samples(center, probe) {
            pool.push(c);
        }

        match select_strategies(&pool) {
            Some(strategies) => {
                tracing::info!(
                    participants = participants.len(),
                    pool = pool.len(),
                    lowest_total = strategies.lowest_total.total_minutes,
                    fairest_max = strategies.fairest.max_minutes,
                    "Midpoint resolved"
                );
                Ok(MidpointResolution { strategies })
            }
            None => {
                tracing::warn!(
                    participants = participants.len(),
                    "No travel times available, falling back to geometric centroid"
                );
                Ok(fallback_resolution(center, &participants))
            }
        }
    }
}

/// One-off resolution with default tuning.
pub async fn resolve_midpoint<P: TravelTimeProvider>(
    provider: Arc<P>,
    participants: &[Participant],
) -> Result<MidpointResolution, ResolveError> {
    MidpointResolver::from_arc(provider, ResolverConfig::default())
        .resolve(participants)
        .await
}

fn validate(participants: &[Participant]) -> Result<(), ResolveError> {
    if participants.is_empty() {
        return Err(ResolveError::NoParticipants);
    }
    if let Some(p) = participants.iter().find(|p| !p.position.is_finite()) {
        return Err(ResolveError::NonFiniteCoordinate { name: p.name.clone() });
    }
    Ok(())
}

/// Participant with the longest successful trip, first one on ties.
/// `None` unless at least two trips succeeded.
pub fn most_disadvantaged<'a>(
    participants: &'a [Participant],
    samples: &[TravelTimeSample],
) -> Option<&'a Participant> {
    let reached: Vec<(&Participant, u32)> = participants
        .iter()
        .zip(samples)
        .filter_map(|(p, s)| s.travel_time.seconds().map(|secs| (p, secs)))
        .collect();

    if reached.len() < 2 {
        return None;
    }

    let mut worst = reached[0];
    for &(p, secs) in &reached[1..] {
        if secs > worst.1 {
            worst = (p, secs);
        }
    }
    Some(worst.0)
}

pub fn shift_center(center: Coordinate, toward: Coordinate, fraction: f64) -> Coordinate {
    center.lerp(&toward, fraction)
}

/// Pick the lowest-total and the lowest-worst-case candidate from `pool`.
/// Ties go to whichever comes first. `None` for an empty pool.
pub fn select_strategies(pool: &[EvaluatedCandidate]) -> Option<Strategies> {
    let lowest_total = pool.iter().min_by_key(|c| c.total_minutes)?;
    let fairest = pool.iter().min_by_key(|c| c.max_minutes)?;
    Some(Strategies {
        lowest_total: lowest_total.to_strategy(),
        fairest: fairest.to_strategy(),
    })
}

fn solo_resolution(p: &Participant) -> MidpointResolution {
    let result = StrategyResult {
        midpoint: p.position,
        travel_times: vec![ParticipantTravelTime {
            name: p.name.clone(),
            duration_minutes: Some(0),
        }],
        total_minutes: 0,
        fairness_score: 0,
        max_minutes: 0,
    };
    MidpointResolution {
        strategies: Strategies {
            lowest_total: result.clone(),
            fairest: result,
        },
    }
}

fn fallback_resolution(center: Coordinate, participants: &[Participant]) -> MidpointResolution {
    let result = StrategyResult {
        midpoint: center,
        travel_times: participants
            .iter()
            .map(|p| ParticipantTravelTime {
                name: p.name.clone(),
                duration_minutes: None,
            })
            .collect(),
        total_minutes: 0,
        fairness_score: 0,
        max_minutes: 0,
    };
    MidpointResolution {
        strategies: Strategies {
            lowest_total: result.clone(),
            fairest: result,
        },
    }
}
