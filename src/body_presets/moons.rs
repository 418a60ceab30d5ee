//! This module contains presets for natural satellites.
//!
//! Satellite elements are relative to their parent, in the same ecliptic
//! frame as the planets.

use crate::{Body, Orbit, OrbitalElementSet, SecularRates, VisualExtra, DAYS_PER_YEAR, J2000_JDN};

/// Returns the orbital elements of the Moon around the Earth.
///
/// Mean geocentric elements at J2000. The node regresses once every
/// 18.6 years and the line of apsides advances once every 8.85 years.
pub fn the_moon_elements() -> OrbitalElementSet {
    let long_asc_node = 125.08_f64;
    let arg_pe = 318.15_f64;

    OrbitalElementSet::new_unchecked(
        0.00256955529,
        0.0549,
        5.145_f64.to_radians(),
        (long_asc_node + arg_pe).to_radians(),
        long_asc_node.to_radians(),
        135.27_f64.to_radians(),
        27.321661 / DAYS_PER_YEAR,
        J2000_JDN,
        SecularRates::from_degrees(0.0, 0.0, 0.0, 4069.0137, -1934.1362),
    )
}

/// Returns the Moon.
pub fn the_moon() -> Body {
    Body::new(
        "Moon".to_string(),
        1_737.4,
        Some(Orbit::new(the_moon_elements())),
    )
    .with_extra(VisualExtra::Label {
        color: "#d0d0d0".to_string(),
    })
}
