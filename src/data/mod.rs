pub mod geojson;
pub mod search;
