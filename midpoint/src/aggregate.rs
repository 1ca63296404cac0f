use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;

use crate::provider::{TravelTimeError, TravelTimeProvider};
use crate::types::{Coordinate, Participant, TravelTime, TravelTimeSample};

/// Travel time from every participant to `destination`.
///
/// All lookups run concurrently; the result has one sample per participant in
/// input order, whatever order the calls finish in. A lookup that errors,
/// exceeds `call_timeout` or panics becomes [`TravelTime::Failed`] for that
/// participant only. The timeout starts once the provider grants a slot.
/// Dropping the returned future aborts lookups still in flight.
pub async fn travel_times_for_participants<P: TravelTimeProvider>(
    provider: &Arc<P>,
    participants: &[Participant],
    destination: Coordinate,
    call_timeout: Duration,
) -> Vec<TravelTimeSample> {
    let mut tasks = JoinSet::new();
    for (index, p) in participants.iter().enumerate() {
        let provider = Arc::clone(provider);
        let origin = p.position;
        tasks.spawn(async move {
            provider.wait_for_slot().await;
            let result = match tokio::time::timeout(call_timeout, provider.travel_time(origin, destination)).await {
                Ok(result) => result,
                Err(_) => Err(TravelTimeError::Timeout(call_timeout.as_millis() as u64)),
            };
            (index, result)
        });
    }

    let mut results: Vec<Option<Result<u32, TravelTimeError>>> = vec![None; participants.len()];
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, result)) => results[index] = Some(result),
            Err(e) => tracing::warn!(error = %e, "Transit time task did not finish"),
        }
    }

    participants
        .iter()
        .zip(results)
        .map(|(p, result)| {
            let travel_time = match result {
                Some(Ok(seconds)) => TravelTime::Reached { seconds },
                Some(Err(e)) => {
                    tracing::warn!(participant = %p.name, error = %e, "Transit time failed");
                    TravelTime::Failed
                }
                None => TravelTime::Failed,
            };
            TravelTimeSample {
                name: p.name.clone(),
                travel_time,
            }
        })
        .collect()
}
