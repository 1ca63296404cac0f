use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;

use crate::aggregate::travel_times_for_participants;
use crate::provider::TravelTimeProvider;
use crate::types::{Coordinate, Participant, ParticipantTravelTime, StrategyResult, TravelTimeSample};

/// Whole minutes, rounding halves away from zero.
pub fn seconds_to_minutes(seconds: u32) -> i64 {
    (f64::from(seconds) / 60.0).round() as i64
}

/// A candidate point with at least one usable travel time.
///
/// Candidates where every lookup failed can't be constructed, so they can
/// never reach strategy selection.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluatedCandidate {
    pub point: Coordinate,
    pub samples: Vec<TravelTimeSample>,
    /// Sum of successful per-participant minutes
    pub total_minutes: i64,
    /// Spread (max - min) of successful minutes; 0 with fewer than two
    pub fairness_score: i64,
    /// Worst successful per-participant minutes
    pub max_minutes: i64,
}

impl EvaluatedCandidate {
    pub fn from_samples(point: Coordinate, samples: Vec<TravelTimeSample>) -> Option<Self> {
        let minutes: Vec<i64> = samples
            .iter()
            .filter_map(|s| s.travel_time.seconds())
            .map(seconds_to_minutes)
            .collect();

        let max_minutes = *minutes.iter().max()?;
        let min_minutes = *minutes.iter().min()?;
        let fairness_score = if minutes.len() >= 2 {
            max_minutes - min_minutes
        } else {
            0
        };

        Some(Self {
            point,
            total_minutes: minutes.iter().sum(),
            fairness_score,
            max_minutes,
            samples,
        })
    }

    pub fn successful(&self) -> usize {
        self.samples.iter().filter(|s| !s.travel_time.is_failed()).count()
    }

    pub fn travel_times(&self) -> Vec<ParticipantTravelTime> {
        self.samples
            .iter()
            .map(|s| ParticipantTravelTime {
                name: s.name.clone(),
                duration_minutes: s.travel_time.seconds().map(seconds_to_minutes),
            })
            .collect()
    }

    pub fn to_strategy(&self) -> StrategyResult {
        StrategyResult {
            midpoint: self.point,
            travel_times: self.travel_times(),
            total_minutes: self.total_minutes,
            fairness_score: self.fairness_score,
            max_minutes: self.max_minutes,
        }
    }
}

/// Evaluate every candidate concurrently.
///
/// Output keeps candidate order; candidates with no successful sample are
/// dropped. Dropping the returned future aborts every outstanding lookup.
pub async fn evaluate_candidates<P: TravelTimeProvider>(
    provider: &Arc<P>,
    candidates: &[Coordinate],
    participants: &Arc<[Participant]>,
    call_timeout: Duration,
) -> Vec<EvaluatedCandidate> {
    let mut tasks = JoinSet::new();
    for (index, &candidate) in candidates.iter().enumerate() {
        let provider = Arc::clone(provider);
        let participants = Arc::clone(participants);
        tasks.spawn(async move {
            let samples = travel_times_for_participants(&provider, &participants, candidate, call_timeout).await;
            (index, samples)
        });
    }

    let mut slots: Vec<Option<Vec<TravelTimeSample>>> = vec![None; candidates.len()];
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, samples)) => slots[index] = Some(samples),
            Err(e) => tracing::warn!(error = %e, "Candidate evaluation did not finish"),
        }
    }

    candidates
        .iter()
        .zip(slots)
        .filter_map(|(&candidate, samples)| {
            let evaluated = samples.and_then(|samples| EvaluatedCandidate::from_samples(candidate, samples));
            if evaluated.is_none() {
                tracing::debug!(lat = candidate.lat, lng = candidate.lng, "Candidate has no travel times, skipping");
            }
            evaluated
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::TravelTimeError;
    use crate::test_support::ScriptedProvider;
    use crate::types::TravelTime;

    fn sample(name: &str, seconds: Option<u32>) -> TravelTimeSample {
        TravelTimeSample {
            name: name.into(),
            travel_time: match seconds {
                Some(seconds) => TravelTime::Reached { seconds },
                None => TravelTime::Failed,
            },
        }
    }

    fn origin() -> Coordinate {
        Coordinate::new(0.0, 0.0)
    }

    #[test]
    fn test_rounding() {
        assert_eq!(seconds_to_minutes(0), 0);
        assert_eq!(seconds_to_minutes(29), 0);
        assert_eq!(seconds_to_minutes(30), 1);
        assert_eq!(seconds_to_minutes(89), 1);
        assert_eq!(seconds_to_minutes(90), 2);
        assert_eq!(seconds_to_minutes(150), 3);
    }

    #[test]
    fn test_equal_times_are_perfectly_fair() {
        let c = EvaluatedCandidate::from_samples(
            origin(),
            vec![sample("A", Some(300)), sample("B", Some(300)), sample("C", Some(300))],
        )
        .unwrap();
        assert_eq!(c.fairness_score, 0);
        assert_eq!(c.total_minutes, 15);
        assert_eq!(c.max_minutes, 5);
    }

    #[test]
    fn test_spread() {
        let c = EvaluatedCandidate::from_samples(origin(), vec![sample("A", Some(120)), sample("B", Some(480))])
            .unwrap();
        assert_eq!(c.fairness_score, 6);
        assert_eq!(c.total_minutes, 10);
        assert_eq!(c.max_minutes, 8);
    }

    #[test]
    fn test_rounds_each_sample_before_summing() {
        // 1.5 + 1.5 minutes -> 2 + 2, not round(3.0)
        let c = EvaluatedCandidate::from_samples(origin(), vec![sample("A", Some(90)), sample("B", Some(90))])
            .unwrap();
        assert_eq!(c.total_minutes, 4);
    }

    #[test]
    fn test_failures_ignored_in_aggregates() {
        let c = EvaluatedCandidate::from_samples(
            origin(),
            vec![sample("A", Some(600)), sample("B", None), sample("C", Some(1200))],
        )
        .unwrap();
        assert_eq!(c.total_minutes, 30);
        assert_eq!(c.fairness_score, 10);
        assert_eq!(c.max_minutes, 20);
        assert_eq!(c.successful(), 2);

        let times = c.travel_times();
        assert_eq!(times[1].duration_minutes, None);
        assert_eq!(times[2].duration_minutes, Some(20));
    }

    #[test]
    fn test_single_success_has_zero_spread() {
        let c = EvaluatedCandidate::from_samples(origin(), vec![sample("A", Some(600)), sample("B", None)]).unwrap();
        assert_eq!(c.fairness_score, 0);
        assert_eq!(c.max_minutes, 10);
    }

    #[test]
    fn test_all_failed_is_excluded() {
        assert!(EvaluatedCandidate::from_samples(origin(), vec![sample("A", None), sample("B", None)]).is_none());
        assert!(EvaluatedCandidate::from_samples(origin(), vec![]).is_none());
    }

    #[tokio::test]
    async fn test_evaluate_drops_dead_candidates_and_keeps_order() {
        // Nobody can reach the candidate at lat 9.
        let provider = Arc::new(ScriptedProvider::new(|o, d| {
            if d.lat == 9.0 {
                Err(TravelTimeError::NoRoute)
            } else {
                Ok(((d.lat - o.lat).abs() * 600.0) as u32)
            }
        }));
        let participants: Arc<[Participant]> = vec![
            Participant::new("A", Coordinate::new(0.0, 0.0)),
            Participant::new("B", Coordinate::new(2.0, 0.0)),
        ]
        .into();
        let candidates = [
            Coordinate::new(1.0, 0.0),
            Coordinate::new(9.0, 0.0),
            Coordinate::new(2.0, 0.0),
        ];

        let out = evaluate_candidates(&provider, &candidates, &participants, Duration::from_secs(5)).await;

        assert_eq!(out.len(), 2);
        assert_eq!(out[0].point, candidates[0]);
        assert_eq!(out[1].point, candidates[2]);
        assert_eq!(out[0].total_minutes, 20);
        assert_eq!(out[0].fairness_score, 0);
        assert_eq!(out[1].max_minutes, 20);
        assert_eq!(provider.calls(), 6);
    }
}
