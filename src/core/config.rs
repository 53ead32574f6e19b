//! Configuration for map views and the photo search overlay
//!
//! Options are plain serde structs with defaults taken from
//! [`crate::core::constants`]. A view can be configured from a preset profile,
//! from JSON, or field by field.

use crate::core::constants::{
    CIRCLE_STEPS, DEFAULT_BOUNDS, DEFAULT_CENTER, DEFAULT_STYLE, DEFAULT_ZOOM, PHOTOS_PER_PROVIDER,
};
use crate::core::geo::{LatLng, LatLngBounds};
use crate::{MapError, Result};
use serde::{Deserialize, Serialize};

/// Initial viewport and style handed to the engine on construction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapViewOptions {
    pub style: String,
    pub center: LatLng,
    pub zoom: f64,
    pub bounds: Option<LatLngBounds>,
}

impl Default for MapViewOptions {
    fn default() -> Self {
        let (south, west, north, east) = DEFAULT_BOUNDS;
        Self {
            style: DEFAULT_STYLE.to_string(),
            center: LatLng::new(DEFAULT_CENTER.0, DEFAULT_CENTER.1),
            zoom: DEFAULT_ZOOM,
            bounds: Some(LatLngBounds::from_coords(south, west, north, east)),
        }
    }
}

impl MapViewOptions {
    /// Parses options from JSON, filling missing fields with defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        let options: Self = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.center.is_valid() {
            return Err(MapError::InvalidCoordinates(format!(
                "center {:?} is out of range",
                self.center
            )));
        }
        if let Some(bounds) = &self.bounds {
            if !bounds.is_valid() {
                return Err(MapError::InvalidCoordinates(format!(
                    "bounds {:?} are out of range",
                    bounds
                )));
            }
        }
        if !self.zoom.is_finite() || self.zoom < 0.0 {
            return Err(MapError::ParseError(format!("invalid zoom {}", self.zoom)));
        }
        Ok(())
    }
}

/// Preset view configurations
#[derive(Debug, Clone, PartialEq, Default)]
pub enum MapViewProfile {
    /// The photo map's initial view over Scandinavia
    #[default]
    Scandinavia,
    /// Whole-world view without a bounds fit
    World,
    Custom(MapViewOptions),
}

impl MapViewProfile {
    pub fn resolve(&self) -> MapViewOptions {
        match self {
            Self::Scandinavia => MapViewOptions::default(),
            Self::World => MapViewOptions {
                center: LatLng::new(0.0, 0.0),
                zoom: 1.0,
                bounds: None,
                ..MapViewOptions::default()
            },
            Self::Custom(options) => options.clone(),
        }
    }
}

/// Tuning for the photo search overlay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhotoSearchConfig {
    /// Photos kept per provider after owner de-duplication
    pub per_provider_cap: usize,
    /// Vertices of the search-radius circle
    pub circle_steps: usize,
}

impl Default for PhotoSearchConfig {
    fn default() -> Self {
        Self {
            per_provider_cap: PHOTOS_PER_PROVIDER,
            circle_steps: CIRCLE_STEPS,
        }
    }
}

impl PhotoSearchConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        if config.circle_steps < 3 {
            return Err(MapError::ParseError(format!(
                "circle_steps must be at least 3, got {}",
                config.circle_steps
            )));
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_view() {
        let options = MapViewOptions::default();
        assert_eq!(options.center, LatLng::new(64.0, 10.0));
        assert_eq!(options.zoom, 3.0);
        assert!(options.bounds.is_some());
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let options = MapViewOptions::from_json_str(r#"{"zoom": 7.5}"#).unwrap();
        assert_eq!(options.zoom, 7.5);
        assert_eq!(options.style, DEFAULT_STYLE);
        assert_eq!(options.center, LatLng::new(64.0, 10.0));
    }

    #[test]
    fn test_invalid_center_rejected() {
        let err = MapViewOptions::from_json_str(r#"{"center": {"lat": 120.0, "lng": 0.0}}"#);
        assert!(matches!(err, Err(MapError::InvalidCoordinates(_))));
    }

    #[test]
    fn test_profiles() {
        assert_eq!(MapViewProfile::default().resolve(), MapViewOptions::default());
        let world = MapViewProfile::World.resolve();
        assert!(world.bounds.is_none());
        assert_eq!(world.zoom, 1.0);
    }

    #[test]
    fn test_photo_config() {
        assert_eq!(PhotoSearchConfig::default().per_provider_cap, 3);
        let config = PhotoSearchConfig::from_json_str(r#"{"per_provider_cap": 5}"#).unwrap();
        assert_eq!(config.per_provider_cap, 5);
        assert_eq!(config.circle_steps, 64);
        assert!(PhotoSearchConfig::from_json_str(r#"{"circle_steps": 2}"#).is_err());
    }
}
