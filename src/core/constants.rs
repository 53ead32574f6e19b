//! Core constants for the default map view and the photo search overlay.
//! Keeping them in a single place makes it easier to tweak session-wide magic numbers.

/// Style reference handed to the engine when none is configured.
pub const DEFAULT_STYLE: &str = "mapbox://styles/mapbox/streets-v11";

/// Initial camera center `(lat, lng)`.
pub const DEFAULT_CENTER: (f64, f64) = (64.0, 10.0);

/// Initial zoom level.
pub const DEFAULT_ZOOM: f64 = 3.0;

/// Initial bounds as `(south, west, north, east)`, covering Europe and the North Atlantic.
pub const DEFAULT_BOUNDS: (f64, f64, f64, f64) = (
    -14.721874718264118,
    -69.8046875000467,
    71.98234984606913,
    96.660156249951,
);

/// Engine event that signals the first completed style/tile load.
pub const LOAD_EVENT: &str = "load";

/// Number of vertices used to approximate the search-radius circle.
pub const CIRCLE_STEPS: usize = 64;

/// Photos kept per provider after owner de-duplication.
pub const PHOTOS_PER_PROVIDER: usize = 3;

