//! Error types for the commentary pipeline

use thiserror::Error;

/// The only failures the pipeline surfaces to its caller
#[derive(Debug, Error, PartialEq)]
pub enum CommentaryError {
    /// Latitude or longitude was not supplied
    #[error("Coordinates are required")]
    MissingCoordinates,

    /// Latitude or longitude is not a finite value within WGS84 bounds
    #[error("Coordinates out of range: lat {lat}, lon {lon}")]
    CoordinatesOutOfRange {
        /// Latitude as received
        lat: f64,
        /// Longitude as received
        lon: f64,
    },
}
