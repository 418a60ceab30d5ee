//! This module contains presets for the planets of the Solar System.
//!
//! Each planet comes in two flavours: `*_elements()` gives the bare
//! [`OrbitalElementSet`], and the plain function gives a [`Body`] with a
//! propagator and its visual extras. The bodies still need to be anchored,
//! which [`Universe::add_body`][crate::Universe::add_body] does.

use super::from_mean_longitude;
use crate::{Body, Orbit, OrbitalElementSet, SecularRates, VisualExtra};

fn planet(name: &str, radius: f64, color: &str, elements: OrbitalElementSet) -> Body {
    Body::new(name.to_string(), radius, Some(Orbit::new(elements)))
        .with_extra(VisualExtra::Label {
            color: color.to_string(),
        })
        .with_extra(VisualExtra::Icon {
            color: color.to_string(),
        })
}

/// Returns the orbital elements of Mercury.
pub fn mercury_elements() -> OrbitalElementSet {
    from_mean_longitude(
        0.38709927,
        0.20563593,
        7.00497902,
        252.25032350,
        77.45779628,
        48.33076593,
        0.2408467,
        SecularRates {
            semi_major_axis: 0.00000037,
            eccentricity: 0.00001906,
            inclination: -0.00594749,
            long_of_periapsis: 0.16047689,
            long_asc_node: -0.12534081,
        },
    )
}

/// Returns Mercury.
pub fn mercury() -> Body {
    planet("Mercury", 2_439.7, "#a6a6a6", mercury_elements())
}

/// Returns the orbital elements of Venus.
pub fn venus_elements() -> OrbitalElementSet {
    from_mean_longitude(
        0.72333566,
        0.00677672,
        3.39467605,
        181.97909950,
        131.60246718,
        76.67984255,
        0.61519726,
        SecularRates {
            semi_major_axis: 0.00000390,
            eccentricity: -0.00004107,
            inclination: -0.00078890,
            long_of_periapsis: 0.00268329,
            long_asc_node: -0.27769418,
        },
    )
}

/// Returns Venus.
pub fn venus() -> Body {
    planet("Venus", 6_051.8, "#e3bb76", venus_elements())
}

/// Returns the orbital elements of the Earth-Moon barycenter.
pub fn earth_elements() -> OrbitalElementSet {
    from_mean_longitude(
        1.00000261,
        0.01671123,
        -0.00001531,
        100.46457166,
        102.93768193,
        0.0,
        1.0000174,
        SecularRates {
            semi_major_axis: 0.00000562,
            eccentricity: -0.00004392,
            inclination: -0.01294668,
            long_of_periapsis: 0.32327364,
            long_asc_node: 0.0,
        },
    )
}

/// Returns the Earth.
pub fn earth() -> Body {
    planet("Earth", 6_371.0, "#4f83cc", earth_elements())
}

/// Returns the orbital elements of Mars.
pub fn mars_elements() -> OrbitalElementSet {
    from_mean_longitude(
        1.52371034,
        0.09339410,
        1.84969142,
        -4.55343205,
        -23.94362959,
        49.55953891,
        1.8808476,
        SecularRates {
            semi_major_axis: 0.00001847,
            eccentricity: 0.00007882,
            inclination: -0.00813131,
            long_of_periapsis: 0.44441088,
            long_asc_node: -0.29257343,
        },
    )
}

/// Returns Mars.
pub fn mars() -> Body {
    planet("Mars", 3_389.5, "#c1440e", mars_elements())
}

/// Returns the orbital elements of Jupiter.
pub fn jupiter_elements() -> OrbitalElementSet {
    from_mean_longitude(
        5.20288700,
        0.04838624,
        1.30439695,
        34.39644051,
        14.72847983,
        100.47390909,
        11.862615,
        SecularRates {
            semi_major_axis: -0.00011607,
            eccentricity: -0.00013253,
            inclination: -0.00183714,
            long_of_periapsis: 0.21252668,
            long_asc_node: 0.20469106,
        },
    )
}

/// Returns Jupiter.
pub fn jupiter() -> Body {
    planet("Jupiter", 69_911.0, "#d8ca9d", jupiter_elements())
}

/// Returns the orbital elements of Saturn.
pub fn saturn_elements() -> OrbitalElementSet {
    from_mean_longitude(
        9.53667594,
        0.05386179,
        2.48599187,
        49.95424423,
        92.59887831,
        113.66242448,
        29.447498,
        SecularRates {
            semi_major_axis: -0.00125060,
            eccentricity: -0.00050991,
            inclination: 0.00193609,
            long_of_periapsis: -0.41897216,
            long_asc_node: -0.28867794,
        },
    )
}

/// Returns Saturn, with its main rings.
pub fn saturn() -> Body {
    planet("Saturn", 58_232.0, "#e3c16f", saturn_elements()).with_extra(VisualExtra::Ring {
        inner_radius: 74_500.0,
        outer_radius: 140_220.0,
    })
}

/// Returns the orbital elements of Uranus.
pub fn uranus_elements() -> OrbitalElementSet {
    from_mean_longitude(
        19.18916464,
        0.04725744,
        0.77263783,
        313.23810451,
        170.95427630,
        74.01692503,
        84.016846,
        SecularRates {
            semi_major_axis: -0.00196176,
            eccentricity: -0.00004397,
            inclination: -0.00242939,
            long_of_periapsis: 0.40805281,
            long_asc_node: 0.04240589,
        },
    )
}

/// Returns Uranus, with its rings.
pub fn uranus() -> Body {
    planet("Uranus", 25_362.0, "#afdbf5", uranus_elements()).with_extra(VisualExtra::Ring {
        inner_radius: 41_837.0,
        outer_radius: 51_149.0,
    })
}

/// Returns the orbital elements of Neptune.
pub fn neptune_elements() -> OrbitalElementSet {
    from_mean_longitude(
        30.06992276,
        0.00859048,
        1.77004347,
        -55.12002969,
        44.96476227,
        131.78422574,
        164.79132,
        SecularRates {
            semi_major_axis: 0.00026291,
            eccentricity: 0.00005105,
            inclination: 0.00035372,
            long_of_periapsis: -0.32241464,
            long_asc_node: -0.00508664,
        },
    )
}

/// Returns Neptune.
pub fn neptune() -> Body {
    planet("Neptune", 24_622.0, "#3e54e8", neptune_elements())
}

/// Returns all eight planets, from the innermost outwards.
pub fn all() -> Vec<Body> {
    vec![
        mercury(),
        venus(),
        earth(),
        mars(),
        jupiter(),
        saturn(),
        uranus(),
        neptune(),
    ]
}
