//! This module contains ready-made celestial bodies.
//!
//! Planet elements are the JPL "Keplerian Elements for Approximate
//! Positions of the Major Planets" (E. M. Standish), valid from 1800 AD to
//! 2050 AD, at the J2000 epoch with their rates per Julian century.
//!
//! <https://ssd.jpl.nasa.gov/planets/approx_pos.html>

use crate::{OrbitalElementSet, SecularRates, J2000_JDN};

pub mod moons;
pub mod planets;
pub mod stars;

/// Builds an element set from a row of the JPL table.
///
/// Angles are in degrees. The mean anomaly at epoch is derived as the
/// mean longitude minus the longitude of periapsis.
#[allow(clippy::too_many_arguments)]
fn from_mean_longitude(
    semi_major_axis: f64,
    eccentricity: f64,
    inclination: f64,
    mean_longitude: f64,
    long_of_periapsis: f64,
    long_asc_node: f64,
    period: f64,
    rates_in_degrees: SecularRates,
) -> OrbitalElementSet {
    OrbitalElementSet::new_unchecked(
        semi_major_axis,
        eccentricity,
        inclination.to_radians(),
        long_of_periapsis.to_radians(),
        long_asc_node.to_radians(),
        (mean_longitude - long_of_periapsis).to_radians(),
        period,
        J2000_JDN,
        SecularRates::from_degrees(
            rates_in_degrees.semi_major_axis,
            rates_in_degrees.eccentricity,
            rates_in_degrees.inclination,
            rates_in_degrees.long_of_periapsis,
            rates_in_degrees.long_asc_node,
        ),
    )
}
