//! Error types for element validation, propagation, and data loading.

use crate::BodyId;

/// An error describing why an [`OrbitalElementSet`][crate::OrbitalElementSet]
/// could not be built.
///
/// These are configuration errors: a body whose elements fail validation
/// must not be propagated at all.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum ElementsError {
    /// The eccentricity is outside of the elliptic range `[0, 1)`.
    ///
    /// Parabolic and hyperbolic trajectories are not supported.
    #[error("eccentricity {0} is outside of the elliptic range [0, 1)")]
    EccentricityOutOfRange(f64),

    /// The orbital period is zero or negative.
    #[error("orbital period must be positive, got {0} years")]
    NonPositivePeriod(f64),

    /// The semi-major axis is zero or negative.
    #[error("semi-major axis must be positive, got {0} AU")]
    NonPositiveSemiMajorAxis(f64),

    /// A field holds `NaN` or an infinity.
    #[error("{field} must be finite, got {value}")]
    NonFinite {
        /// The name of the offending field.
        field: &'static str,
        /// The offending value.
        value: f64,
    },
}

/// Newton-Raphson failed to reach the Kepler tolerance within the
/// iteration cap.
///
/// With validated elements this should never happen; it points to bad
/// input data rather than a transient condition.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
#[error(
    "Kepler's equation did not converge after {iterations} iterations \
    (M = {mean_anomaly}, e = {eccentricity}, residual = {residual:e})"
)]
pub struct ConvergenceError {
    /// The mean anomaly being solved for, in radians.
    pub mean_anomaly: f64,
    /// The eccentricity used.
    pub eccentricity: f64,
    /// `|E - e sin E - M|` at the last iterate.
    pub residual: f64,
    /// How many Newton steps were taken.
    pub iterations: u32,
}

/// An error raised while propagating a single body.
///
/// Propagation errors never affect other bodies. The propagator that
/// raised one keeps its last-known-good state.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum PropagationError {
    /// The orbit was advanced before being anchored to a date.
    #[error("orbit has not been anchored to a date yet")]
    NotAnchored,

    /// The Kepler solver hit its iteration cap.
    #[error(transparent)]
    Convergence(#[from] ConvergenceError),

    /// Secular drift moved the elements out of the elliptic domain.
    #[error(
        "elements resolved {centuries} centuries from their epoch are degenerate \
        (a = {semi_major_axis}, e = {eccentricity})"
    )]
    DegenerateElements {
        /// Julian centuries since the reference epoch.
        centuries: f64,
        /// The resolved semi-major axis, in AU.
        semi_major_axis: f64,
        /// The resolved eccentricity.
        eccentricity: f64,
    },
}

/// An error returned when adding a body to a [`Universe`][crate::Universe].
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum BodyAddError {
    /// There was no body with the given parent id.
    #[error("there was no body with the parent id {0:?}")]
    ParentNotFound(BodyId),
}

/// Errors that can occur while reading a body catalog.
#[cfg(feature = "serde")]
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// The catalog is not valid JSON, or does not match the record layout.
    #[error("failed to parse catalog: {0}")]
    Parse(#[source] serde_json::Error),

    /// A record's `dataFrom` date could not be parsed.
    #[error("record {name:?} has an invalid reference date: {source}")]
    Date {
        /// The record's name.
        name: String,
        /// The underlying parse error.
        #[source]
        source: DateError,
    },

    /// A record's elements failed validation.
    #[error("record {name:?} has invalid elements: {source}")]
    Elements {
        /// The record's name.
        name: String,
        /// The underlying validation error.
        #[source]
        source: ElementsError,
    },
}

/// Errors that can occur when loading, saving, or parsing configuration.
#[cfg(feature = "serde")]
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the config file from disk.
    #[error("failed to read config: {0}")]
    Read(#[source] std::io::Error),

    /// Failed to write the config file to disk.
    #[error("failed to write config: {0}")]
    Write(#[source] std::io::Error),

    /// Failed to parse RON content.
    #[error("failed to parse config: {0}")]
    Parse(#[source] ron::error::SpannedError),

    /// Failed to serialize config to RON.
    #[error("failed to serialize config: {0}")]
    Serialize(#[source] ron::Error),
}

/// An error describing why a string or a set of calendar fields is not
/// a valid UTC instant.
#[derive(Debug, PartialEq, thiserror::Error)]
#[error("invalid calendar date {text:?}: {source}")]
pub struct DateError {
    /// The rejected date, as given or as displayed.
    pub text: String,
    /// Why `hifitime` rejected it.
    #[source]
    pub source: hifitime::HifitimeError,
}

/// An error raised when synchronising the simulation to the system clock.
#[derive(Debug, thiserror::Error)]
#[error("failed to read the system clock: {0}")]
pub struct ClockError(#[from] pub hifitime::HifitimeError);
