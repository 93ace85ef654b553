//! Ray-cast point-in-polygon test over geographic coordinates.
//!
//! Coordinates are treated as planar, which holds up at the sub-regional
//! scale of coverage areas; revisit if fences ever span whole regions.

use sirenhub_core::types::{GeoPoint, Geofence};

/// True when `point` falls inside `fence`. A point sitting exactly on a
/// vertex counts as inside. Fences with fewer than 3 vertices never match.
pub fn point_in_polygon(fence: &Geofence, point: GeoPoint) -> bool {
    let polygon = &fence.vertices;
    if polygon.len() < 3 {
        return false;
    }

    // Vertex hit — the edge walk below can miss it on either side.
    if polygon.iter().any(|v| v.lat == point.lat && v.lon == point.lon) {
        return true;
    }

    let (x, y) = (point.lon, point.lat);
    let mut inside = false;

    for i in 0..polygon.len() {
        let j = (i + polygon.len() - 1) % polygon.len();
        let (xi, yi) = (polygon[i].lon, polygon[i].lat);
        let (xj, yj) = (polygon[j].lon, polygon[j].lat);

        if ((yi > y) != (yj > y)) && (x < (xj - xi) * (y - yi) / (yj - yi) + xi) {
            inside = !inside;
        }
    }

    inside
}
