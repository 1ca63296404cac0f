use serde::{Deserialize, Serialize, Serializer};

/// A geographic position in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }

    /// Planar interpolation `self + fraction * (toward - self)`, per axis.
    ///
    /// Not geodesic. Good enough at city scale, which is all we ask of it.
    pub fn lerp(&self, toward: &Coordinate, fraction: f64) -> Coordinate {
        Coordinate {
            lat: self.lat + fraction * (toward.lat - self.lat),
            lng: self.lng + fraction * (toward.lng - self.lng),
        }
    }
}

/// Someone taking part in a meetup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub name: String,
    pub position: Coordinate,
}

impl Participant {
    pub fn new(name: impl Into<String>, position: Coordinate) -> Self {
        Self {
            name: name.into(),
            position,
        }
    }
}

/// Outcome of one provider lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TravelTime {
    Reached { seconds: u32 },
    Failed,
}

impl TravelTime {
    pub fn seconds(&self) -> Option<u32> {
        match self {
            TravelTime::Reached { seconds } => Some(*seconds),
            TravelTime::Failed => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, TravelTime::Failed)
    }
}

/// Travel time for one participant against one destination
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TravelTimeSample {
    pub name: String,
    pub travel_time: TravelTime,
}

/// Wire form of a per-participant travel time.
///
/// `duration_minutes` is `None` when the provider gave us nothing; existing
/// clients expect that as `-1`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantTravelTime {
    pub name: String,
    #[serde(serialize_with = "minutes_or_sentinel")]
    pub duration_minutes: Option<i64>,
}

pub const FAILED_MINUTES: i64 = -1;

fn minutes_or_sentinel<S: Serializer>(minutes: &Option<i64>, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_i64(minutes.unwrap_or(FAILED_MINUTES))
}

/// The winning candidate under one selection strategy
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyResult {
    pub midpoint: Coordinate,
    pub travel_times: Vec<ParticipantTravelTime>,
    pub total_minutes: i64,
    pub fairness_score: i64,
    pub max_minutes: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Strategies {
    pub lowest_total: StrategyResult,
    pub fairest: StrategyResult,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MidpointResolution {
    pub strategies: Strategies,
}

impl MidpointResolution {
    /// True when the provider gave no usable sample at all and the midpoint
    /// is the plain geometric centroid.
    pub fn is_degraded(&self) -> bool {
        let s = &self.strategies;
        s.lowest_total.travel_times.iter().all(|t| t.duration_minutes.is_none())
            && s.fairest.travel_times.iter().all(|t| t.duration_minutes.is_none())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lerp_per_axis() {
        let a = Coordinate::new(0.0, 0.0);
        let b = Coordinate::new(4.0, 10.0);
        assert_eq!(a.lerp(&b, 0.25), Coordinate::new(1.0, 2.5));
        assert_eq!(a.lerp(&b, 0.0), a);
        assert_eq!(a.lerp(&b, 1.0), b);
    }

    #[test]
    fn test_non_finite() {
        assert!(Coordinate::new(51.5, -0.1).is_finite());
        assert!(!Coordinate::new(f64::NAN, 0.0).is_finite());
        assert!(!Coordinate::new(0.0, f64::INFINITY).is_finite());
    }

    #[test]
    fn test_failed_minutes_serialize_as_sentinel() {
        let failed = ParticipantTravelTime { name: "B".into(), duration_minutes: None };
        let ok = ParticipantTravelTime { name: "A".into(), duration_minutes: Some(12) };
        assert_eq!(
            serde_json::to_value(&failed).unwrap(),
            serde_json::json!({ "name": "B", "durationMinutes": -1 })
        );
        assert_eq!(
            serde_json::to_value(&ok).unwrap(),
            serde_json::json!({ "name": "A", "durationMinutes": 12 })
        );
    }

    #[test]
    fn test_strategy_wire_names() {
        let r = StrategyResult {
            midpoint: Coordinate::new(1.0, 2.0),
            travel_times: vec![],
            total_minutes: 3,
            fairness_score: 0,
            max_minutes: 3,
        };
        let v = serde_json::to_value(&r).unwrap();
        assert_eq!(v["midpoint"]["lat"], 1.0);
        assert_eq!(v["totalMinutes"], 3);
        assert_eq!(v["fairnessScore"], 0);
        assert!(v.get("travelTimes").is_some());
    }
}
