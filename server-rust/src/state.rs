use std::sync::Arc;
use chrono::{DateTime, Utc};

use beacon_midpoint::{GoogleRoutesClient, MidpointResolver};

use crate::storage::BeaconStore;

pub struct AppState {
    pub store: BeaconStore,
    pub resolver: MidpointResolver<GoogleRoutesClient>,
    pub start_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(store: BeaconStore, resolver: MidpointResolver<GoogleRoutesClient>) -> Arc<Self> {
        Arc::new(Self {
            store,
            resolver,
            start_time: Utc::now(),
        })
    }
}
