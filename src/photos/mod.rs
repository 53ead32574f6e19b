//! Photo search contract
//!
//! The view consumes photos as already-resolved data: a query built from the
//! current viewport goes in, an ordered list of [`PhotoMarker`]s comes out.
//! Concrete photo services sit behind [`PhotoProvider`].

pub mod aggregator;

pub use aggregator::PhotoAggregator;

use crate::{
    core::geo::{LatLng, LatLngBounds},
    data::search::search_radius_km,
    MapError, Result,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One photo to show on the map and in the photo strip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoMarker {
    pub url: String,
    pub location: Option<LatLng>,
}

impl PhotoMarker {
    pub fn new(url: impl Into<String>, location: Option<LatLng>) -> Self {
        Self {
            url: url.into(),
            location,
        }
    }
}

/// `{center, radius_km}` search request
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhotoQuery {
    pub center: LatLng,
    pub radius_km: f64,
}

impl PhotoQuery {
    pub fn new(center: LatLng, radius_km: f64) -> Result<Self> {
        let query = Self { center, radius_km };
        query.validate()?;
        Ok(query)
    }

    /// Query covering the largest circle that fits the visible viewport
    pub fn from_viewport(center: LatLng, bounds: &LatLngBounds) -> Result<Self> {
        Self::new(center, search_radius_km(center, bounds))
    }

    pub fn validate(&self) -> Result<()> {
        if !self.center.is_valid() {
            return Err(MapError::InvalidCoordinates(format!(
                "query center {:?} is out of range",
                self.center
            )));
        }
        if !self.radius_km.is_finite() || self.radius_km < 0.0 {
            return Err(MapError::InvalidCoordinates(format!(
                "query radius {} km is not a distance",
                self.radius_km
            )));
        }
        Ok(())
    }

    /// Same center, radius clamped to `max_km` when given
    pub fn clamped(&self, max_km: Option<f64>) -> Self {
        match max_km {
            Some(max) => Self {
                center: self.center,
                radius_km: self.radius_km.min(max),
            },
            None => *self,
        }
    }
}

/// A photo as reported by one provider, with its contributor identity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderPhoto {
    pub url: String,
    pub location: Option<LatLng>,
    pub owner: String,
}

impl From<ProviderPhoto> for PhotoMarker {
    fn from(photo: ProviderPhoto) -> Self {
        PhotoMarker::new(photo.url, photo.location)
    }
}

/// A photo service queried by [`PhotoAggregator`]
#[async_trait]
pub trait PhotoProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Largest radius the service accepts, if it has a limit
    fn max_radius_km(&self) -> Option<f64> {
        None
    }

    /// Photos around `query`, best match first
    async fn search(&self, query: &PhotoQuery) -> Result<Vec<ProviderPhoto>>;
}
