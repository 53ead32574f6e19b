use crate::core::geo::{LatLng, LatLngBounds};

/// Radius of the largest circle around `center` that stays inside the view.
///
/// Measured to the west edge along the center's latitude and to the north edge
/// along the center's longitude; the shorter one wins.
pub fn search_radius_km(center: LatLng, bounds: &LatLngBounds) -> f64 {
    let west = LatLng::new(center.lat, bounds.south_west.lng);
    let north = LatLng::new(bounds.north_east.lat, center.lng);

    center.distance_km(&west).min(center.distance_km(&north))
}
