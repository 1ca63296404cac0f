use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::limiter::RateLimiter;
use crate::provider::{TravelTimeError, TravelTimeProvider};
use crate::types::Coordinate;

type Script = Box<dyn Fn(Coordinate, Coordinate) -> Result<u32, TravelTimeError> + Send + Sync>;
type Delay = Box<dyn Fn(Coordinate, Coordinate) -> Duration + Send + Sync>;

/// Deterministic provider for tests: answers come from a closure, optionally
/// after a per-call delay so completion order can be shuffled.
pub struct ScriptedProvider {
    script: Script,
    delay: Delay,
    configured: bool,
    limiter: RateLimiter,
    calls: AtomicUsize,
    destinations: Mutex<Vec<Coordinate>>,
}

impl ScriptedProvider {
    pub fn new<F>(script: F) -> Self
    where
        F: Fn(Coordinate, Coordinate) -> Result<u32, TravelTimeError> + Send + Sync + 'static,
    {
        Self {
            script: Box::new(script),
            delay: Box::new(|_, _| Duration::ZERO),
            configured: true,
            limiter: RateLimiter::unlimited(),
            calls: AtomicUsize::new(0),
            destinations: Mutex::new(Vec::new()),
        }
    }

    /// Every lookup fails.
    pub fn failing() -> Self {
        Self::new(|_, _| Err(TravelTimeError::Status { status: 503, body: "unavailable".into() }))
    }

    pub fn with_delay<D>(mut self, delay: D) -> Self
    where
        D: Fn(Coordinate, Coordinate) -> Duration + Send + Sync + 'static,
    {
        self.delay = Box::new(delay);
        self
    }

    pub fn with_limiter(mut self, limiter: RateLimiter) -> Self {
        self.limiter = limiter;
        self
    }

    pub fn unconfigured(mut self) -> Self {
        self.configured = false;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn destinations(&self) -> Vec<Coordinate> {
        self.destinations.lock().unwrap().clone()
    }
}

impl TravelTimeProvider for ScriptedProvider {
    async fn wait_for_slot(&self) {
        self.limiter.acquire().await;
    }

    async fn travel_time(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> Result<u32, TravelTimeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.destinations.lock().unwrap().push(destination);

        let delay = (self.delay)(origin, destination);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        (self.script)(origin, destination)
    }

    fn ensure_configured(&self) -> Result<(), TravelTimeError> {
        if self.configured {
            Ok(())
        } else {
            Err(TravelTimeError::MissingCredential)
        }
    }
}
