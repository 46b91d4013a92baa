//! Geofence predicate gating where a pin may be dropped.

use crate::models::{BoundingRegion, Coordinate};

/// Closed-interval containment on both axes. No antimeridian wraparound.
///
/// NaN coordinates are never contained since every comparison with NaN is false.
pub fn contains(region: &BoundingRegion, point: Coordinate) -> bool {
    let sw = region.south_west();
    let ne = region.north_east();
    sw.lat <= point.lat && point.lat <= ne.lat && sw.lng <= point.lng && point.lng <= ne.lng
}
