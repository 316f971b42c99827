use crate::{GeoError, METERS_PER_DEGREE_OF_LATITUDE, Result, SCALE, round3};

/// A latitude/longitude pair in degrees.
///
/// Constructed through [`Coordinate::new`], which rejects non-finite values and
/// out-of-range components, so every `Coordinate` can be encoded.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    lat: f64,
    lng: f64,
}

/// A coordinate in the fixed-precision unsigned integer encoding.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EncodedCoordinate {
    pub lat: u64,
    pub lng: u64,
}

impl Coordinate {
    /// Validated coordinate in degrees.
    ///
    /// # Arguments
    ///
    /// * `lat` - Latitude, within `[-90, 90]`
    /// * `lng` - Longitude, within `[-180, 180]`
    ///
    /// # Examples
    ///
    /// ```rust
    /// use stratus_geo::Coordinate;
    ///
    /// let portland = Coordinate::new(45.52, 122.68)?;
    /// assert_eq!(portland.to_int().lat, 2506271416);
    /// assert!(Coordinate::new(91.0, 0.0).is_err());
    /// # Ok::<(), stratus_geo::GeoError>(())
    /// ```
    pub fn new(lat: f64, lng: f64) -> Result<Self> {
        if !lat.is_finite() || !lng.is_finite() {
            return Err(GeoError::NonFinite);
        }
        if !(-90.0..=90.0).contains(&lat) {
            return Err(GeoError::LatitudeOutOfRange(lat));
        }
        if !(-180.0..=180.0).contains(&lng) {
            return Err(GeoError::LongitudeOutOfRange(lng));
        }
        Ok(Self { lat, lng })
    }

    /// Skips validation for values derived from already-valid coordinates.
    pub(crate) const fn from_parts(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub const fn lat(&self) -> f64 {
        self.lat
    }

    pub const fn lng(&self) -> f64 {
        self.lng
    }

    /// Encode both axes; longitude is scaled by this coordinate's latitude.
    pub fn to_int(self) -> EncodedCoordinate {
        EncodedCoordinate {
            lat: latitude_to_int(self.lat),
            lng: longitude_to_int(self.lng, self.lat),
        }
    }
}

impl EncodedCoordinate {
    pub const fn new(lat: u64, lng: u64) -> Self {
        Self { lat, lng }
    }

    /// Decode back to degrees, rounded to three decimal places.
    ///
    /// The longitude is decoded against the unrounded latitude so the rounding of one
    /// component does not leak into the other.
    pub fn to_degrees(self) -> Coordinate {
        let latitude = latitude_from_int(self.lat);
        Coordinate {
            lat: round3(latitude),
            lng: longitude_to_degrees(self.lng, latitude),
        }
    }
}

impl From<Coordinate> for EncodedCoordinate {
    fn from(coordinate: Coordinate) -> Self {
        coordinate.to_int()
    }
}

/// Meters spanned by one degree of longitude at the given latitude (in degrees).
pub fn meters_per_degree_of_longitude(latitude: f64) -> f64 {
    METERS_PER_DEGREE_OF_LATITUDE * latitude.to_radians().cos()
}

/// Fixed-precision integer for a latitude in degrees.
pub fn latitude_to_int(degrees: f64) -> u64 {
    ((degrees + 180.0) * METERS_PER_DEGREE_OF_LATITUDE * SCALE).round() as u64
}

pub fn latitude_to_degrees(value: u64) -> f64 {
    round3(latitude_from_int(value))
}

/// Longitude encoding; `latitude` is the coordinate's own latitude in degrees.
pub fn longitude_to_int(degrees: f64, latitude: f64) -> u64 {
    ((degrees + 180.0) * meters_per_degree_of_longitude(latitude) * SCALE).round() as u64
}

/// Longitude decoding; at the poles every longitude collapses onto the same point and
/// the result is meaningless.
pub fn longitude_to_degrees(value: u64, latitude: f64) -> f64 {
    round3(value as f64 / meters_per_degree_of_longitude(latitude) / SCALE - 180.0)
}

fn latitude_from_int(value: u64) -> f64 {
    value as f64 / METERS_PER_DEGREE_OF_LATITUDE / SCALE - 180.0
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_encodes_standard_coordinates() {
        let encoded = Coordinate::new(45.52, 122.68).unwrap().to_int();
        assert_eq!(encoded, EncodedCoordinate::new(2506271416, 2356862483));
    }

    #[test]
    fn test_decodes_back_to_degrees() {
        let encoded = Coordinate::new(-45.52, 122.68).unwrap().to_int();
        let decoded = encoded.to_degrees();
        assert_eq!(decoded.lat(), -45.52);
        assert_eq!(decoded.lng(), 122.68);
    }

    #[test]
    fn test_latitude_ignores_reference() {
        assert_eq!(latitude_to_int(0.0), 2000394000);
        assert_eq!(latitude_to_degrees(2000394000), 0.0);
    }

    #[test]
    fn test_longitude_shrinks_towards_poles() {
        let equator = longitude_to_int(10.0, 0.0);
        let north = longitude_to_int(10.0, 60.0);
        assert!(north < equator);
        assert_eq!(longitude_to_degrees(north, 60.0), 10.0);
    }

    #[test]
    fn test_rejects_invalid_coordinates() {
        assert_eq!(Coordinate::new(f64::NAN, 0.0), Err(GeoError::NonFinite));
        assert_eq!(
            Coordinate::new(91.0, 0.0),
            Err(GeoError::LatitudeOutOfRange(91.0))
        );
        assert_eq!(
            Coordinate::new(0.0, -180.5),
            Err(GeoError::LongitudeOutOfRange(-180.5))
        );
    }

    proptest! {
        #[test]
        fn prop_round_trip_within_a_thousandth(lat in -89.9f64..89.9, lng in -180.0f64..=180.0) {
            let original = Coordinate::new(lat, lng).unwrap();
            let decoded = original.to_int().to_degrees();
            prop_assert!((decoded.lat() - lat).abs() <= 0.001, "lat {} -> {}", lat, decoded.lat());
            prop_assert!((decoded.lng() - lng).abs() <= 0.001, "lng {} -> {}", lng, decoded.lng());
        }
    }
}
