use thiserror::Error;

pub type Result<T> = std::result::Result<T, GeoError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeoError {
    #[error("Coordinate component is not a finite number")]
    NonFinite,
    #[error("Latitude {0} is outside [-90, 90]")]
    LatitudeOutOfRange(f64),
    #[error("Longitude {0} is outside [-180, 180]")]
    LongitudeOutOfRange(f64),
    #[error("Radius {0} must be a finite, non-negative distance")]
    InvalidRadius(f64),
    #[error("Bounding box is inverted: {axis} runs from {start} to {end}")]
    InvertedBox {
        axis: &'static str,
        start: f64,
        end: f64,
    },
}
