//! Coordinate codec for CloudSearch-style geographic fields.
//!
//! Search indexes that predate native `latlon` fields store coordinates as unsigned
//! integers. This crate converts degrees into that fixed-precision encoding and back,
//! and derives integer bounding boxes from a center point and a radius.
//!
//! Latitude is offset by 180 degrees and scaled by the number of meters in one degree of
//! latitude. Longitude uses the same scheme, but the meters in one degree of longitude
//! shrink with `cos(latitude)` towards the poles, so encoding or decoding a longitude
//! always needs the latitude it belongs to.
//!
//! ```rust
//! use stratus_geo::{Coordinate, coordinate_box};
//!
//! let portland = Coordinate::new(45.52, 122.68)?;
//! let encoded = portland.to_int();
//! assert_eq!(encoded.lat, 2506271416);
//! assert_eq!(encoded.to_degrees(), portland);
//!
//! let five_km = coordinate_box(portland, 5000.0)?;
//! assert!(five_km.lat.contains(&encoded.lat));
//! # Ok::<(), stratus_geo::GeoError>(())
//! ```

mod bounding;
mod coordinate;
mod error;

pub use bounding::{BoundingBox, CoordinateBox, coordinate_box};
pub use coordinate::{
    Coordinate, EncodedCoordinate, latitude_to_degrees, latitude_to_int, longitude_to_degrees,
    longitude_to_int, meters_per_degree_of_longitude,
};
pub use error::{GeoError, Result};

/// Mean earth radius used for all angular distance math, in meters.
pub const EARTH_RADIUS_METERS: f64 = 6_367_444.0;

/// Meters covered by one degree of latitude, `(2π * EARTH_RADIUS_METERS) / 360`.
pub const METERS_PER_DEGREE_OF_LATITUDE: f64 = 111_133.0;

/// Fixed-point scale applied on top of the meter value.
pub const SCALE: f64 = 100.0;

/// Round to the three decimal places the integer encoding can faithfully carry.
pub(crate) fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
