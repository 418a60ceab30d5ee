//! # Keplerian Orbit Propagation
//! This library crate contains the orbit propagation engine of a Solar System
//! visualiser. Given a body's orbital elements and a point in time, it
//! produces the body's 3D position, and it advances that position frame by
//! frame as simulated time elapses.
//!
//! Positions are found without integrating forces. Each body's mean anomaly
//! grows linearly with time, Kepler's equation turns it into an eccentric
//! anomaly, and from there into a true anomaly and a point on the ellipse.
//! This makes the simulation stable at any time warp, forwards or backwards.
//!
//! Element sets drift slowly over the centuries. Every element set carries
//! linear *secular rates* that are applied whenever the orbit is resolved
//! at a new epoch.
//!
//! ## Getting started
//! This crate provides a handful of main types:
//! - [`OrbitalElementSet`]: A body's Keplerian elements at a reference epoch,
//!   plus their secular rates. Construction validates the elements.
//! - [`Orbit`]: The propagator. It owns one element set, the elements
//!   resolved at the current epoch, and the body's anomaly state.
//!   It can be anchored to a calendar date, or advanced by elapsed time.
//! - [`Body`]: A celestial body: a name, a radius, an optional orbit, and
//!   any visual extras (rings, labels, icons) the renderer attaches.
//! - [`Universe`]: A flat table of bodies with parent-satellite relations.
//!   It drives every propagator on each tick and stores their positions.
//! - [`SimulationClock`]: The simulated wall clock, with a speed multiplier,
//!   pausing, and reverse time.
//!
//! We also provide a [`body_presets`] module with the Sun, the planets, and
//! the Moon, using the JPL approximate elements at J2000.
//!
//! ## Example
//!
//! ```rust
//! use orrery_kepler::{body_presets, CalendarDate, Orbit, OrbitTrait};
//!
//! # fn main() {
//! let earth = body_presets::planets::earth_elements();
//! let mut orbit = Orbit::new(earth);
//!
//! // Anchor the body to a date...
//! let anchored = orbit.set_from_date(&CalendarDate::new(2024, 3, 20)).unwrap();
//!
//! // ...then advance it by one second of real time at 1 day per second.
//! let advanced = orbit.advance(1.0, 1.0).unwrap();
//!
//! assert_ne!(anchored, advanced);
//! assert!(orbit.get_mean_anomaly() < std::f64::consts::TAU);
//! # }
//! ```

#![warn(missing_docs)]

mod body;
pub mod body_presets;
mod cached_orbit;
pub mod calendar;
#[cfg(feature = "serde")]
pub mod catalog;
pub mod config;
mod elements;
pub mod error;
mod projection;
mod solvers;
mod time_controller;
mod universe;

use core::f64::consts::TAU;

use glam::DVec3;

pub use body::{Body, VisualExtra};
pub use cached_orbit::{Orbit, PropagationPhase, PropagationState};
pub use calendar::{julian_day_number, CalendarDate, EpochPrecision};
pub use config::SimulationConfig;
pub use elements::{OrbitalElementSet, ResolvedElements, SecularRates};
pub use error::{
    BodyAddError, ClockError, ConvergenceError, DateError, ElementsError, PropagationError,
};
pub use projection::{ConicParameter, Projector};
pub use solvers::{solve_eccentric_anomaly, true_anomaly_from_eccentric};
pub use time_controller::SimulationClock;
pub use universe::{BodyId, BodyRelation, Universe};

/// Kilometers per astronomical unit.
pub const KM_PER_AU: f64 = 149_597_870.7;

/// Days per Julian century, the unit of secular drift.
pub const DAYS_PER_JULIAN_CENTURY: f64 = 36_525.0;

/// The Julian Day Number of 2000-01-01, the J2000 reference epoch.
pub const J2000_JDN: f64 = 2_451_545.0;

/// Days per year when converting orbital periods into mean motion.
///
/// This is a flat 365, not the Julian year.
pub const DAYS_PER_YEAR: f64 = 365.0;

/// Seconds per day.
pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// The residual, in radians, at which Kepler's equation counts as solved.
pub const KEPLER_TOLERANCE: f64 = 1e-6;

/// The maximum number of iterations for the Kepler solver.
///
/// This is used to prevent infinite loops in case the method fails to converge.
pub const KEPLER_MAX_ITERS: u32 = 20;

/// The true anomaly step between two orbit path samples, in radians.
pub const ORBIT_PATH_STEP: f64 = 0.00285;

/// The true anomaly at which orbit path sampling stops, in radians.
///
/// This overshoots a full turn so the sampled polyline closes on itself.
pub const ORBIT_PATH_END: f64 = 6.28 + 0.2;

/// Gets the mean motion of an orbit, in radians per day, from its orbital
/// period in years.
///
/// # Example
/// ```
/// use orrery_kepler::mean_motion;
///
/// // One revolution per 365 days
/// let n = mean_motion(1.0);
/// assert!((n * 365.0 - std::f64::consts::TAU).abs() < 1e-12);
/// ```
#[inline]
pub fn mean_motion(period: f64) -> f64 {
    TAU / (period * DAYS_PER_YEAR)
}

/// Wraps an angle into `[0, 2pi)`.
///
/// Negative angles wrap upwards, so time running backwards stays in range.
///
/// # Example
/// ```
/// use std::f64::consts::TAU;
/// use orrery_kepler::wrap_angle;
///
/// assert_eq!(wrap_angle(TAU), 0.0);
/// assert!((wrap_angle(TAU + 1.0) - 1.0).abs() < 1e-12);
/// assert!((wrap_angle(-1.0) - (TAU - 1.0)).abs() < 1e-12);
/// assert_eq!(wrap_angle(-1e-20), 0.0);
/// ```
#[inline]
pub fn wrap_angle(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid rounds tiny negative inputs up to exactly TAU
    if wrapped >= TAU {
        0.0
    } else {
        wrapped
    }
}

/// A trait that defines the geometry of an elliptic orbit.
///
/// Both the reference [`OrbitalElementSet`] and the [`ResolvedElements`]
/// derived from it implement this trait, so every geometric quantity is
/// computed the same way whichever epoch the elements belong to.
///
/// Implementors only need to provide the five geometric elements. All the
/// other methods derive from them.
///
/// # Example
/// ```
/// use orrery_kepler::{OrbitTrait, ResolvedElements};
///
/// fn accepts_orbit<O: OrbitTrait>(orbit: &O) {
///     println!("That's an orbit with a periapsis of {} AU!", orbit.get_periapsis());
/// }
///
/// let circle = ResolvedElements {
///     semi_major_axis: 1.0,
///     eccentricity: 0.0,
///     inclination: 0.0,
///     long_of_periapsis: 0.0,
///     long_asc_node: 0.0,
/// };
/// accepts_orbit(&circle);
/// ```
///
/// This example will fail to compile:
///
/// ```compile_fail
/// # use orrery_kepler::OrbitTrait;
/// #
/// # fn accepts_orbit<O: OrbitTrait>(orbit: &O) {
/// #     println!("That's an orbit with a periapsis of {} AU!", orbit.get_periapsis());
/// # }
/// #
/// # fn main() {
///       let not_orbit = (0.0, 1.0);
///       accepts_orbit(&not_orbit);
/// # }
/// ```
pub trait OrbitTrait {
    /// Gets the semi-major axis of the orbit, in AU.
    ///
    /// In an elliptic orbit, the semi-major axis is the
    /// average of the apoapsis and periapsis.
    ///
    /// Learn more: <https://en.wikipedia.org/wiki/Semi-major_and_semi-minor_axes>
    fn get_semi_major_axis(&self) -> f64;

    /// Gets the eccentricity of the orbit.
    ///
    /// The eccentricity of an orbit is a measure of how much it deviates
    /// from a perfect circle.
    ///
    /// An eccentricity of 0 means the orbit is a perfect circle.
    /// Between 0 and 1, the orbit is elliptic, and has an oval shape.
    /// Parabolic and hyperbolic trajectories are not supported.
    ///
    /// Wikipedia on conic section eccentricity: <https://en.wikipedia.org/wiki/Eccentricity_(mathematics)>
    fn get_eccentricity(&self) -> f64;

    /// Gets the inclination of the orbit, in radians.
    ///
    /// The inclination of an orbit is the angle between the plane of the
    /// orbit and the reference plane, here the ecliptic.
    ///
    /// Wikipedia: <https://en.wikipedia.org/wiki/Orbital_inclination>
    fn get_inclination(&self) -> f64;

    /// Gets the longitude of periapsis of the orbit, in radians.
    ///
    /// This is the sum of the longitude of ascending node and the argument
    /// of periapsis, measured in two different planes.
    ///
    /// Wikipedia: <https://en.wikipedia.org/wiki/Longitude_of_periapsis>
    fn get_long_of_periapsis(&self) -> f64;

    /// Gets the longitude of ascending node of the orbit, in radians.
    ///
    /// Wikipedia: <https://en.wikipedia.org/wiki/Longitude_of_the_ascending_node>
    fn get_long_asc_node(&self) -> f64;

    /// Gets the argument of periapsis of the orbit, in radians.
    ///
    /// This is derived from the longitude of periapsis and is never
    /// stored on its own.
    ///
    /// # Example
    /// ```
    /// use orrery_kepler::{OrbitTrait, ResolvedElements};
    ///
    /// let elements = ResolvedElements {
    ///     semi_major_axis: 1.0,
    ///     eccentricity: 0.1,
    ///     inclination: 0.0,
    ///     long_of_periapsis: 1.5,
    ///     long_asc_node: 0.5,
    /// };
    ///
    /// assert_eq!(elements.get_arg_pe(), 1.0);
    /// ```
    #[inline]
    fn get_arg_pe(&self) -> f64 {
        self.get_long_of_periapsis() - self.get_long_asc_node()
    }

    /// Gets the semi-latus rectum of the orbit, in AU.
    ///
    /// The value depends on the chosen [`ConicParameter`]. See its
    /// documentation for the two variants.
    ///
    /// Learn more: <https://en.wikipedia.org/wiki/Ellipse#Semi-latus_rectum>
    #[inline]
    fn get_semi_latus_rectum(&self, conic: ConicParameter) -> f64 {
        let semi_major_axis = self.get_semi_major_axis();
        let eccentricity = self.get_eccentricity();

        match conic {
            ConicParameter::Legacy => semi_major_axis * (1.0 - eccentricity).powi(2),
            ConicParameter::Exact => semi_major_axis * (1.0 - eccentricity * eccentricity),
        }
    }

    /// Gets the periapsis of the orbit, in AU.
    ///
    /// The periapsis of an orbit is the distance at the closest point
    /// to the parent body.
    ///
    /// Wikipedia: <https://en.wikipedia.org/wiki/Apsis>
    #[inline]
    fn get_periapsis(&self) -> f64 {
        self.get_semi_major_axis() * (1.0 - self.get_eccentricity())
    }

    /// Gets the apoapsis of the orbit, in AU.
    #[inline]
    fn get_apoapsis(&self) -> f64 {
        self.get_semi_major_axis() * (1.0 + self.get_eccentricity())
    }

    /// Gets the distance of the body from its parent at a given true
    /// anomaly, in AU.
    ///
    /// # Angle
    /// The angle is expressed in radians. Anything out of range wraps
    /// around through the cosine.
    ///
    /// # Example
    /// ```
    /// use orrery_kepler::{ConicParameter, OrbitTrait, ResolvedElements};
    ///
    /// let elements = ResolvedElements {
    ///     semi_major_axis: 2.0,
    ///     eccentricity: 0.5,
    ///     inclination: 0.0,
    ///     long_of_periapsis: 0.0,
    ///     long_asc_node: 0.0,
    /// };
    ///
    /// let altitude = elements.get_altitude_at_true_anomaly(0.0, ConicParameter::Exact);
    /// assert!((altitude - elements.get_periapsis()).abs() < 1e-12);
    /// ```
    #[doc(alias = "get_radius_at_true_anomaly")]
    fn get_altitude_at_true_anomaly(&self, true_anomaly: f64, conic: ConicParameter) -> f64 {
        self.get_semi_latus_rectum(conic) / (1.0 + self.get_eccentricity() * true_anomaly.cos())
    }

    /// Gets the eccentric anomaly at a given mean anomaly in the orbit.
    ///
    /// See [`solve_eccentric_anomaly`] for the method and its guarantees.
    ///
    /// # Errors
    /// Returns a [`ConvergenceError`] if the solver hits its iteration cap.
    ///
    /// # Performance
    /// This function uses an iterative method and is the most expensive
    /// step of propagation. It is recommended to cache this value if you can.
    #[inline]
    fn get_eccentric_anomaly_at_mean_anomaly(
        &self,
        mean_anomaly: f64,
    ) -> Result<f64, ConvergenceError> {
        solve_eccentric_anomaly(mean_anomaly, self.get_eccentricity())
    }

    /// Gets the true anomaly from a given eccentric anomaly in the orbit.
    ///
    /// The result is not wrapped and lies in `(-pi, pi]`.
    /// See [`true_anomaly_from_eccentric`].
    #[inline]
    fn get_true_anomaly_at_eccentric_anomaly(&self, eccentric_anomaly: f64) -> f64 {
        true_anomaly_from_eccentric(eccentric_anomaly, self.get_eccentricity())
    }

    /// Gets the true anomaly at a given mean anomaly in the orbit,
    /// normalised into `[0, 2pi]`.
    ///
    /// A negative conversion result gets `2pi` added once and is never
    /// reduced further, so a tiny negative result becomes exactly `2pi`.
    ///
    /// The true anomaly is the angle between the direction of periapsis
    /// and the current position of the body, as seen from the main focus
    /// of the ellipse.
    ///
    /// — [Wikipedia](https://en.wikipedia.org/wiki/True_anomaly)
    ///
    /// # Errors
    /// Returns a [`ConvergenceError`] if the Kepler solver hits its
    /// iteration cap.
    fn get_true_anomaly_at_mean_anomaly(&self, mean_anomaly: f64) -> Result<f64, ConvergenceError> {
        let eccentric_anomaly = self.get_eccentric_anomaly_at_mean_anomaly(mean_anomaly)?;
        let true_anomaly = self.get_true_anomaly_at_eccentric_anomaly(eccentric_anomaly);

        Ok(if true_anomaly < 0.0 {
            true_anomaly + TAU
        } else {
            true_anomaly
        })
    }

    /// Gets the position of the body at a given true anomaly, in AU.
    ///
    /// The frame is right-handed and Y-up: the ecliptic is the XZ plane,
    /// and the Z axis is flipped relative to the textbook perifocal
    /// rotation.
    ///
    /// No unit scaling is applied. Use a [`Projector`] to get positions
    /// in simulation units.
    ///
    /// # Example
    /// ```
    /// use orrery_kepler::{ConicParameter, OrbitTrait, ResolvedElements};
    ///
    /// let elements = ResolvedElements {
    ///     semi_major_axis: 1.0,
    ///     eccentricity: 0.0,
    ///     inclination: 0.0,
    ///     long_of_periapsis: 0.0,
    ///     long_asc_node: 0.0,
    /// };
    ///
    /// let position = elements.get_position_at_true_anomaly(0.0, ConicParameter::Legacy);
    /// assert_eq!(position.x, 1.0);
    /// assert_eq!(position.y, 0.0);
    /// ```
    fn get_position_at_true_anomaly(&self, true_anomaly: f64, conic: ConicParameter) -> DVec3 {
        let radius = self.get_altitude_at_true_anomaly(true_anomaly, conic);

        let (sin_u, cos_u) = (self.get_arg_pe() + true_anomaly).sin_cos();
        let (sin_node, cos_node) = self.get_long_asc_node().sin_cos();
        let (sin_inc, cos_inc) = self.get_inclination().sin_cos();

        let x = radius * (cos_u * cos_node - cos_inc * sin_u * sin_node);
        let z = -radius * (cos_u * sin_node + cos_inc * sin_u * cos_node);
        let y = radius * (sin_u * sin_inc);

        DVec3::new(x, y, z)
    }
}

#[cfg(test)]
mod tests;

#[inline]
fn keplers_equation(mean_anomaly: f64, eccentric_anomaly: f64, eccentricity: f64) -> f64 {
    eccentric_anomaly - (eccentricity * eccentric_anomaly.sin()) - mean_anomaly
}
#[inline]
fn keplers_equation_derivative(eccentric_anomaly: f64, eccentricity: f64) -> f64 {
    1.0 - (eccentricity * eccentric_anomaly.cos())
}
