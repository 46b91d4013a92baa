use serde::{Deserialize, Serialize};

use crate::error::SpotError;

/// A WGS84 point. Serialized flat as `lat` / `lng`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Axis-aligned lat/lng rectangle. Does not cross the antimeridian.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingRegion {
    south_west: Coordinate,
    north_east: Coordinate,
}

impl BoundingRegion {
    /// Build a region, rejecting inverted or non-finite corners.
    pub fn new(south_west: Coordinate, north_east: Coordinate) -> Result<Self, SpotError> {
        let corners = [
            south_west.lat,
            south_west.lng,
            north_east.lat,
            north_east.lng,
        ];
        if corners.iter().any(|v| !v.is_finite()) {
            return Err(SpotError::InvalidRegion(
                "corners must be finite".to_string(),
            ));
        }
        if south_west.lat > north_east.lat {
            return Err(SpotError::InvalidRegion(format!(
                "south-west latitude {} is north of north-east latitude {}",
                south_west.lat, north_east.lat
            )));
        }
        if south_west.lng > north_east.lng {
            return Err(SpotError::InvalidRegion(format!(
                "south-west longitude {} is east of north-east longitude {}",
                south_west.lng, north_east.lng
            )));
        }
        Ok(Self {
            south_west,
            north_east,
        })
    }

    /// Region from constant corners that are known to be ordered.
    pub(crate) const fn from_ordered(south_west: Coordinate, north_east: Coordinate) -> Self {
        Self {
            south_west,
            north_east,
        }
    }

    pub fn south_west(&self) -> Coordinate {
        self.south_west
    }

    pub fn north_east(&self) -> Coordinate {
        self.north_east
    }

    pub fn contains(&self, point: Coordinate) -> bool {
        crate::geofence::contains(self, point)
    }
}

/// A spot persisted by the backend. Immutable once returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommittedSpot {
    #[serde(flatten)]
    pub coordinate: Coordinate,
    pub description: String,
    #[serde(rename = "photoUrl", default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
}

/// Body of `POST /savePinpoint`. Carries at most one of `photoKey` (uploaded
/// object) or `photo` (inline data URL).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateSpotRequest {
    #[serde(flatten)]
    pub coordinate: Coordinate,
    pub description: String,
    #[serde(rename = "photoKey", default, skip_serializing_if = "Option::is_none")]
    pub photo_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
}

/// Response of `GET /getPinpoints`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListSpotsResponse {
    pub items: Vec<CommittedSpot>,
}

/// Response of `POST /savePinpoint`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSpotResponse {
    pub item: CommittedSpot,
}
