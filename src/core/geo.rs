use geo::{HaversineDestination, HaversineDistance};
use serde::{Deserialize, Serialize};

/// Represents a geographical coordinate with latitude and longitude
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    /// Creates a new LatLng coordinate
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Validates that the coordinates are finite and within valid ranges
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && self.lat >= -90.0
            && self.lat <= 90.0
            && self.lng >= -180.0
            && self.lng <= 180.0
    }

    /// Great-circle distance to another coordinate, in kilometres
    pub fn distance_km(&self, other: &LatLng) -> f64 {
        let meters = self.to_point().haversine_distance(&other.to_point());
        meters / 1000.0
    }

    /// Coordinate reached by travelling `distance_km` along `bearing` degrees
    pub fn destination(&self, bearing: f64, distance_km: f64) -> LatLng {
        let p = self
            .to_point()
            .haversine_destination(bearing, distance_km * 1000.0);
        LatLng::new(p.y(), p.x())
    }

    /// GeoJSON position order: `[lng, lat]`
    pub fn to_position(&self) -> [f64; 2] {
        [self.lng, self.lat]
    }

    fn to_point(self) -> geo_types::Point<f64> {
        geo_types::Point::new(self.lng, self.lat)
    }
}

impl Default for LatLng {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

/// Represents a bounding box of geographical coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLngBounds {
    pub south_west: LatLng,
    pub north_east: LatLng,
}

impl LatLngBounds {
    pub fn new(south_west: LatLng, north_east: LatLng) -> Self {
        Self {
            south_west,
            north_east,
        }
    }

    /// Creates bounds from individual coordinates
    pub fn from_coords(south: f64, west: f64, north: f64, east: f64) -> Self {
        Self::new(LatLng::new(south, west), LatLng::new(north, east))
    }

    /// Checks if the bounds contain a point
    pub fn contains(&self, point: &LatLng) -> bool {
        point.lat >= self.south_west.lat
            && point.lat <= self.north_east.lat
            && point.lng >= self.south_west.lng
            && point.lng <= self.north_east.lng
    }

    pub fn center(&self) -> LatLng {
        LatLng::new(
            (self.south_west.lat + self.north_east.lat) / 2.0,
            (self.south_west.lng + self.north_east.lng) / 2.0,
        )
    }

    pub fn is_valid(&self) -> bool {
        self.south_west.is_valid()
            && self.north_east.is_valid()
            && self.south_west.lat <= self.north_east.lat
    }

    /// `[[west, south], [east, north]]`, the engine's bounds literal
    pub fn to_array(&self) -> [[f64; 2]; 2] {
        [self.south_west.to_position(), self.north_east.to_position()]
    }
}
