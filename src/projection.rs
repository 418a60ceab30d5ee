use glam::DVec3;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{OrbitTrait, KM_PER_AU, ORBIT_PATH_END, ORBIT_PATH_STEP};

/// Which semi-latus rectum the projection uses.
///
/// The semi-latus rectum `p` sets the size of the ellipse in
/// `r = p / (1 + e cos v)`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ConicParameter {
    /// `p = a (1 - e)^2`.
    ///
    /// This is what the visualiser has always drawn, and existing scenes
    /// are calibrated against it. It is smaller than the true semi-latus
    /// rectum by a factor of `(1 - e) / (1 + e)`, which is invisible for
    /// near-circular planets but shrinks eccentric orbits noticeably.
    #[default]
    Legacy,

    /// `p = a (1 - e^2)`, the geometric semi-latus rectum.
    ///
    /// With this variant the periapsis distance is exactly `a (1 - e)`.
    Exact,
}

/// Maps a true anomaly on a set of elements into simulation space.
///
/// The projector rotates the perifocal position into the Y-up ecliptic
/// frame (see [`OrbitTrait::get_position_at_true_anomaly`]) and multiplies
/// it by `KM_PER_AU / distance_scale`.
///
/// # Example
/// ```
/// use orrery_kepler::{ConicParameter, Projector, ResolvedElements, KM_PER_AU};
///
/// // One simulation unit per 1000 km
/// let projector = Projector::new(1000.0, ConicParameter::Legacy);
///
/// let circle = ResolvedElements {
///     semi_major_axis: 1.0,
///     eccentricity: 0.0,
///     inclination: 0.0,
///     long_of_periapsis: 0.0,
///     long_asc_node: 0.0,
/// };
///
/// let position = projector.project(&circle, 0.0);
/// assert_eq!(position.x, KM_PER_AU / 1000.0);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Projector {
    scale: f64,
    conic: ConicParameter,
}

impl Projector {
    /// Creates a projector for the given distance scale, in kilometers per
    /// simulation unit.
    pub fn new(distance_scale: f64, conic: ConicParameter) -> Self {
        Self {
            scale: KM_PER_AU / distance_scale,
            conic,
        }
    }

    /// Creates a projector from a simulation config.
    pub fn from_config(config: &crate::SimulationConfig) -> Self {
        Self {
            scale: config.scale_factor(),
            conic: config.conic_parameter,
        }
    }

    /// Gets the factor that turns AU into simulation units.
    #[inline]
    pub fn get_scale(&self) -> f64 {
        self.scale
    }

    /// Gets the semi-latus rectum variant in use.
    #[inline]
    pub fn get_conic_parameter(&self) -> ConicParameter {
        self.conic
    }

    /// Gets the position of a body with the given elements at the given
    /// true anomaly, in simulation units.
    pub fn project(&self, elements: &impl OrbitTrait, true_anomaly: f64) -> DVec3 {
        elements.get_position_at_true_anomaly(true_anomaly, self.conic) * self.scale
    }

    /// Samples the whole orbit as a polyline, in simulation units.
    ///
    /// Points are spaced [`ORBIT_PATH_STEP`] radians of true anomaly apart,
    /// starting at periapsis and running slightly past a full turn so the
    /// line closes on itself.
    pub fn sample_path(&self, elements: &impl OrbitTrait) -> Vec<DVec3> {
        (0u32..)
            .map(|step| f64::from(step) * ORBIT_PATH_STEP)
            .take_while(|&true_anomaly| true_anomaly <= ORBIT_PATH_END)
            .map(|true_anomaly| self.project(elements, true_anomaly))
            .collect()
    }
}

impl Default for Projector {
    /// A projector that keeps positions in kilometers.
    fn default() -> Self {
        Self::new(1.0, ConicParameter::default())
    }
}
