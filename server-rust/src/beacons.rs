//! Beacon lifecycle: create, look up, join, and recompute meeting points.
//!
//! Every join re-runs the midpoint search from scratch over the creator plus
//! everyone who has joined so far. Groups are small, so there is no
//! incremental update.

use beacon_midpoint::{MidpointResolution, MidpointResolver, TravelTimeProvider};
use chrono::Utc;

use crate::error::ApiError;
use crate::models::*;
use crate::storage::BeaconStore;

fn valid_coordinate(lat: f64, lng: f64) -> bool {
    lat.is_finite() && lng.is_finite() && (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lng)
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

pub async fn create_beacon(store: &BeaconStore, req: CreateBeaconRequest) -> Result<Beacon, ApiError> {
    let missing = || {
        ApiError::BadRequest(
            "Missing required fields: creator_name, creator_lat, creator_lng, categories".into(),
        )
    };
    let creator_name = non_empty(req.creator_name).ok_or_else(missing)?;
    let (creator_lat, creator_lng) = match (req.creator_lat, req.creator_lng) {
        (Some(lat), Some(lng)) => (lat, lng),
        _ => return Err(missing()),
    };
    let categories = req.categories.filter(|c| !c.is_empty()).ok_or_else(missing)?;
    if !valid_coordinate(creator_lat, creator_lng) {
        return Err(ApiError::BadRequest("Coordinates out of range".into()));
    }

    let beacon = Beacon {
        token: uuid::Uuid::new_v4().simple().to_string(),
        creator_name,
        creator_lat,
        creator_lng,
        categories,
        image_path: non_empty(req.image_path),
        participants: Vec::new(),
        created_at: Utc::now(),
    };
    let beacon = store.create(beacon).await?;
    tracing::info!(token = %beacon.token, creator = %beacon.creator_name, "Beacon created");
    Ok(beacon)
}

pub async fn resolve_beacon(store: &BeaconStore, token: &str) -> Result<Beacon, ApiError> {
    store.get(token).await.ok_or(ApiError::NotFound)
}

/// Add a participant, then recompute meeting points for the whole group.
pub async fn join_beacon<P: TravelTimeProvider>(
    store: &BeaconStore,
    resolver: &MidpointResolver<P>,
    token: &str,
    req: JoinRequest,
) -> Result<JoinResponse, ApiError> {
    let missing = || ApiError::BadRequest("Missing required fields: name, lat, lng".into());
    let name = non_empty(req.name).ok_or_else(missing)?;
    let (lat, lng) = match (req.lat, req.lng) {
        (Some(lat), Some(lng)) => (lat, lng),
        _ => return Err(missing()),
    };
    if !valid_coordinate(lat, lng) {
        return Err(ApiError::BadRequest("Coordinates out of range".into()));
    }

    let participant = BeaconParticipant {
        name,
        lat,
        lng,
        image_path: non_empty(req.image_path),
        joined_at: Utc::now(),
    };
    let beacon = store
        .append_participant(token, participant)
        .await?
        .ok_or(ApiError::NotFound)?;
    tracing::info!(token = %token, participants = beacon.participants.len() + 1, "Participant joined");

    let midpoint = resolver.resolve(&beacon.people()).await?;
    Ok(JoinResponse { beacon, midpoint })
}

/// Recompute meeting points without joining.
pub async fn beacon_midpoint<P: TravelTimeProvider>(
    store: &BeaconStore,
    resolver: &MidpointResolver<P>,
    token: &str,
) -> Result<MidpointResolution, ApiError> {
    let beacon = resolve_beacon(store, token).await?;
    Ok(resolver.resolve(&beacon.people()).await?)
}
