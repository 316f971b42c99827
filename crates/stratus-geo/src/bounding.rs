use std::ops::RangeInclusive;

use crate::{
    Coordinate, EARTH_RADIUS_METERS, GeoError, Result, latitude_to_degrees, latitude_to_int,
    longitude_to_degrees, longitude_to_int,
};

/// A bounding box in the integer encoding, as inclusive ranges per axis.
///
/// Longitude bounds are only meaningful together with the latitude they were encoded
/// against, which the box carries along for decoding.
#[derive(Debug, Clone, PartialEq)]
pub struct CoordinateBox {
    pub lat: RangeInclusive<u64>,
    pub lng: RangeInclusive<u64>,
    reference_latitude: f64,
}

/// A bounding box in degrees.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    north: f64,
    south: f64,
    west: f64,
    east: f64,
}

/// Compute the integer box covering `meters` around `center`.
///
/// Boxes that would cross the antimeridian are clamped at the bottom of the encoding.
pub fn coordinate_box(center: Coordinate, meters: f64) -> Result<CoordinateBox> {
    if !meters.is_finite() || meters < 0.0 {
        return Err(GeoError::InvalidRadius(meters));
    }
    let latitude = center.lat();
    let longitude = center.lng();

    let earth_radius_at_latitude = EARTH_RADIUS_METERS * latitude.to_radians().cos();

    let change_in_latitude = (meters / EARTH_RADIUS_METERS).to_degrees();
    let change_in_longitude = (meters / earth_radius_at_latitude).to_degrees();

    let bottom = latitude_to_int(latitude - change_in_latitude);
    let top = latitude_to_int(latitude + change_in_latitude);

    let left = longitude_to_int(longitude - change_in_longitude, latitude);
    let right = longitude_to_int(longitude + change_in_longitude, latitude);

    Ok(CoordinateBox {
        lat: bottom..=top,
        lng: left..=right,
        reference_latitude: latitude,
    })
}

impl CoordinateBox {
    pub const fn reference_latitude(&self) -> f64 {
        self.reference_latitude
    }

    /// Decode the corners back to degrees.
    pub fn to_degrees(&self) -> BoundingBox {
        BoundingBox {
            north: latitude_to_degrees(*self.lat.end()),
            south: latitude_to_degrees(*self.lat.start()),
            west: longitude_to_degrees(*self.lng.start(), self.reference_latitude),
            east: longitude_to_degrees(*self.lng.end(), self.reference_latitude),
        }
    }
}

impl BoundingBox {
    /// Build a box from a latitude range (south to north) and a longitude range
    /// (west to east).
    pub fn new(lat: RangeInclusive<f64>, lng: RangeInclusive<f64>) -> Result<Self> {
        let (south, north) = lat.into_inner();
        let (west, east) = lng.into_inner();
        // Validates every edge.
        Coordinate::new(south, west)?;
        Coordinate::new(north, east)?;
        if south > north {
            return Err(GeoError::InvertedBox {
                axis: "latitude",
                start: south,
                end: north,
            });
        }
        if west > east {
            return Err(GeoError::InvertedBox {
                axis: "longitude",
                start: west,
                end: east,
            });
        }
        Ok(Self {
            north,
            south,
            west,
            east,
        })
    }

    pub const fn north(&self) -> f64 {
        self.north
    }

    pub const fn south(&self) -> f64 {
        self.south
    }

    pub const fn west(&self) -> f64 {
        self.west
    }

    pub const fn east(&self) -> f64 {
        self.east
    }

    pub const fn upper_left(&self) -> Coordinate {
        Coordinate::from_parts(self.north, self.west)
    }

    pub const fn lower_right(&self) -> Coordinate {
        Coordinate::from_parts(self.south, self.east)
    }

    pub fn center(&self) -> Coordinate {
        Coordinate::from_parts(
            f64::midpoint(self.south, self.north),
            f64::midpoint(self.west, self.east),
        )
    }

    /// Encode the box, using its center latitude as the longitude reference.
    pub fn encode(&self) -> CoordinateBox {
        let reference_latitude = self.center().lat();
        CoordinateBox {
            lat: latitude_to_int(self.south)..=latitude_to_int(self.north),
            lng: longitude_to_int(self.west, reference_latitude)
                ..=longitude_to_int(self.east, reference_latitude),
            reference_latitude,
        }
    }
}
