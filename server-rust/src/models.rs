use beacon_midpoint::{Coordinate, MidpointResolution, Participant};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Beacon {
    pub token: String,
    pub creator_name: String,
    pub creator_lat: f64,
    pub creator_lng: f64,
    pub categories: Vec<String>,
    #[serde(default)]
    pub image_path: Option<String>,
    #[serde(default)]
    pub participants: Vec<BeaconParticipant>,
    pub created_at: DateTime<Utc>,
}

impl Beacon {
    /// Creator first, then joiners in join order
    pub fn people(&self) -> Vec<Participant> {
        std::iter::once(Participant::new(
            self.creator_name.clone(),
            Coordinate::new(self.creator_lat, self.creator_lng),
        ))
        .chain(
            self.participants
                .iter()
                .map(|p| Participant::new(p.name.clone(), Coordinate::new(p.lat, p.lng))),
        )
        .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BeaconParticipant {
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    #[serde(default)]
    pub image_path: Option<String>,
    pub joined_at: DateTime<Utc>,
}

// --- Request/response types ---

#[derive(Debug, Default, Deserialize)]
pub struct CreateBeaconRequest {
    #[serde(default)]
    pub creator_name: Option<String>,
    #[serde(default)]
    pub creator_lat: Option<f64>,
    #[serde(default)]
    pub creator_lng: Option<f64>,
    #[serde(default)]
    pub categories: Option<Vec<String>>,
    #[serde(default)]
    pub image_path: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct JoinRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lng: Option<f64>,
    #[serde(default)]
    pub image_path: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct JoinResponse {
    pub beacon: Beacon,
    pub midpoint: MidpointResolution,
}
