//! Error types for the configuration boundary.
//!
//! Nothing inside the per-tick path returns these. Stale or invalid contact
//! events, double removals and similar invariant violations are absorbed as
//! no-ops by the ecosystem instead.

use thiserror::Error;

/// A configuration value that cannot be applied.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// A numeric field is outside its documented range.
    #[error("{field} = {value} is outside the allowed range {min}..={max}")]
    OutOfRange {
        /// Name of the offending field.
        field: &'static str,
        /// The rejected value.
        value: f64,
        /// Smallest accepted value.
        min: f64,
        /// Largest accepted value.
        max: f64,
    },
    /// A numeric field is NaN or infinite.
    #[error("{field} must be finite")]
    NonFinite {
        /// Name of the offending field.
        field: &'static str,
    },
    /// The world cannot hold a single grid cell.
    #[error("world {width}x{height} is smaller than one {cell_size} unit grid cell")]
    WorldTooSmall {
        /// Configured world width.
        width: f32,
        /// Configured world height.
        height: f32,
        /// Edge length of a grid cell.
        cell_size: f32,
    },
}

/// Errors surfaced while setting up a simulation.
#[derive(Debug, Error)]
pub enum SimulationError {
    /// The supplied parameters failed validation.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    /// A configuration file could not be read.
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
    /// A configuration file is not valid JSON for [`super::params::Params`].
    #[error("failed to parse configuration: {0}")]
    Json(#[from] serde_json::Error),
}
