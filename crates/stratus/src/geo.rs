//! Geographic filters and distance sorting.
//!
//! A [`GeoQuery`] is resolved into an optional bounding-box clause and an optional distance
//! sort. The structured dialect filters on a `latlon` field directly; the legacy dialect only
//! knows unsigned integers, so it filters on a pair of encoded integer fields.

use std::ops::RangeInclusive;

use stratus_geo::{
    BoundingBox, Coordinate, CoordinateBox, coordinate_box, meters_per_degree_of_longitude,
};
use tracing::debug;

use crate::{
    dialect::Dialect,
    filter::{BoolOp, Clause, CompileError, RangeSpec},
    request::SortDirection,
};

const KILOMETERS_PER_MILE: f64 = 1.609_344;

/// Unit of a search radius.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DistanceUnit {
    #[default]
    Kilometers,
    Miles,
    Meters,
    /// Degrees of longitude at the query latitude.
    Degrees,
}

impl DistanceUnit {
    pub fn to_kilometers(self, distance: f64, latitude: f64) -> f64 {
        match self {
            Self::Kilometers => distance,
            Self::Miles => distance * KILOMETERS_PER_MILE,
            Self::Meters => distance / 1000.0,
            Self::Degrees => distance * meters_per_degree_of_longitude(latitude) / 1000.0,
        }
    }
}

/// Builder describing a geographic constraint on one field.
///
/// Exactly one shape is used, in this order of preference: an explicit box
/// ([`GeoQuery::within`]), a point with a radius, or a bare point (which always sorts by
/// distance).
#[derive(Debug, Clone, PartialEq)]
pub struct GeoQuery {
    field: String,
    point: Option<(f64, f64)>,
    radius: Option<(f64, DistanceUnit)>,
    within: Option<(RangeInclusive<f64>, RangeInclusive<f64>)>,
    sort: bool,
    encoded_fields: Option<(String, String)>,
}

/// Compiled geo constraint.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoClause {
    pub filter: Option<Clause>,
    pub sort: Option<DistanceSort>,
}

/// A named distance expression to sort on, nearest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistanceSort {
    pub name: &'static str,
    pub expression: String,
}

impl DistanceSort {
    pub fn rank(&self, dialect: Dialect) -> String {
        dialect.format_rank(self.name, SortDirection::Asc)
    }
}

impl GeoQuery {
    /// Query against the lat/lng field `field`.
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            point: None,
            radius: None,
            within: None,
            sort: false,
            encoded_fields: None,
        }
    }

    pub fn point(mut self, lat: f64, lng: f64) -> Self {
        self.point = Some((lat, lng));
        self
    }

    /// Search within `distance` of the point. Ignored when an explicit box is given.
    pub fn radius(mut self, distance: f64, unit: DistanceUnit) -> Self {
        self.radius = Some((distance, unit));
        self
    }

    /// Explicit box as a latitude range (south to north) and longitude range (west to east).
    pub fn within(mut self, lat: RangeInclusive<f64>, lng: RangeInclusive<f64>) -> Self {
        self.within = Some((lat, lng));
        self
    }

    /// Order hits by distance from the point, nearest first.
    pub fn sort(mut self, sort: bool) -> Self {
        self.sort = sort;
        self
    }

    /// Integer fields used by the legacy dialect. Defaults to `{field}_lat` / `{field}_lng`.
    pub fn encoded_fields(mut self, lat: impl Into<String>, lng: impl Into<String>) -> Self {
        self.encoded_fields = Some((lat.into(), lng.into()));
        self
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    fn legacy_fields(&self) -> (String, String) {
        self.encoded_fields.clone().unwrap_or_else(|| {
            (
                format!("{}_lat", self.field),
                format!("{}_lng", self.field),
            )
        })
    }

    /// Resolve the query for `dialect`.
    ///
    /// Returns `Ok(None)` when nothing usable was given: an empty field, no point and no
    /// box, or a radius without a point.
    pub fn compile(&self, dialect: Dialect) -> Result<Option<GeoClause>, CompileError> {
        if self.field.is_empty() {
            debug!("Geo query has no field, skipping");
            return Ok(None);
        }
        let point = self
            .point
            .map(|(lat, lng)| Coordinate::new(lat, lng))
            .transpose()?;

        let (area, center, sort) = if let Some((lat, lng)) = &self.within {
            let bbox = BoundingBox::new(lat.clone(), lng.clone())?;
            let center = point.unwrap_or_else(|| bbox.center());
            (Some((bbox, bbox.encode())), center, self.sort)
        } else if let (Some(point), Some((distance, unit))) = (point, self.radius) {
            let meters = unit.to_kilometers(distance, point.lat()) * 1000.0;
            let encoded = coordinate_box(point, meters)?;
            (Some((encoded.to_degrees(), encoded)), point, self.sort)
        } else if let Some(point) = point {
            (None, point, true)
        } else {
            debug!(field = %self.field, "Geo query has neither a point nor a box, skipping");
            return Ok(None);
        };

        let filter = area.map(|(bbox, encoded)| match dialect {
            Dialect::Structured => self.structured_box(&bbox),
            Dialect::Legacy => self.legacy_box(&encoded),
        });
        let sort = sort.then(|| DistanceSort {
            name: "distance",
            expression: match dialect {
                Dialect::Structured => format!(
                    "haversin({},{},{field}.latitude,{field}.longitude)",
                    center.lat(),
                    center.lng(),
                    field = self.field
                ),
                Dialect::Legacy => {
                    let (lat_field, lng_field) = self.legacy_fields();
                    let encoded = center.to_int();
                    format!(
                        "sqrt(pow({lat_field}-{},2)+pow({lng_field}-{},2))",
                        encoded.lat, encoded.lng
                    )
                }
            },
        });
        Ok(Some(GeoClause { filter, sort }))
    }

    fn structured_box(&self, bbox: &BoundingBox) -> Clause {
        let corner = |c: Coordinate| format!("{},{}", c.lat(), c.lng());
        Clause::Range {
            field: self.field.clone(),
            range: RangeSpec::between(corner(bbox.upper_left()), corner(bbox.lower_right())),
        }
    }

    fn legacy_box(&self, encoded: &CoordinateBox) -> Clause {
        let (lat_field, lng_field) = self.legacy_fields();
        let range = |r: &RangeInclusive<u64>| {
            RangeSpec::between(saturating_i64(*r.start()), saturating_i64(*r.end()))
        };
        Clause::Group {
            op: BoolOp::And,
            children: vec![
                Clause::Range {
                    field: lat_field,
                    range: range(&encoded.lat),
                },
                Clause::Range {
                    field: lng_field,
                    range: range(&encoded.lng),
                },
            ],
        }
    }
}

// Encoded coordinates stay below 4.1e9.
fn saturating_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}
