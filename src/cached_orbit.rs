use glam::DVec3;
use log::{debug, trace};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    elements::ResolvedCache, wrap_angle, CalendarDate, EpochPrecision, OrbitTrait,
    OrbitalElementSet, PropagationError, Projector, ResolvedElements, SimulationConfig,
};

/// A Keplerian orbit propagator for one body.
///
/// It owns the body's reference elements, the elements resolved at the
/// current epoch (cached on the elapsed centuries), and the body's
/// anomaly state.
///
/// There are two ways to move a body:
/// - [`Orbit::set_from_date`] anchors it to a calendar date, deriving
///   everything from scratch. Use this at start-up and whenever the
///   simulation clock jumps.
/// - [`Orbit::advance`] integrates the mean anomaly by elapsed simulated
///   time. This is the per-frame path and does not touch the secular
///   resolution.
///
/// # Example
/// ```
/// use orrery_kepler::{body_presets, CalendarDate, Orbit, PropagationPhase};
///
/// let mut orbit = Orbit::new(body_presets::planets::mars_elements());
/// assert_eq!(orbit.get_phase(), PropagationPhase::Uninitialized);
///
/// let anchored = orbit.set_from_date(&CalendarDate::new(2030, 1, 1)).unwrap();
/// assert_eq!(orbit.get_phase(), PropagationPhase::Anchored);
///
/// // Advancing by no time at all changes nothing.
/// assert_eq!(orbit.advance(0.0, 1.0).unwrap(), anchored);
/// assert_eq!(orbit.get_phase(), PropagationPhase::Advancing);
/// ```
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(into = "SavedOrbit", try_from = "SavedOrbit")
)]
pub struct Orbit {
    /// The reference elements. Never mutated.
    elements: OrbitalElementSet,

    /// Where the body is in its orbit.
    state: PropagationState,

    phase: PropagationPhase,
    projector: Projector,
    precision: EpochPrecision,
    cache: ResolvedCache,
}

/// An [`Orbit`] as stored on disk.
///
/// Only the key of the resolved elements is kept. The elements themselves
/// are resolved again from the reference elements on load.
#[cfg(feature = "serde")]
#[derive(Serialize, Deserialize)]
struct SavedOrbit {
    elements: OrbitalElementSet,
    state: PropagationState,
    phase: PropagationPhase,
    projector: Projector,
    precision: EpochPrecision,
    resolved_centuries: f64,
}

#[cfg(feature = "serde")]
impl From<Orbit> for SavedOrbit {
    fn from(orbit: Orbit) -> Self {
        Self {
            elements: orbit.elements,
            state: orbit.state,
            phase: orbit.phase,
            projector: orbit.projector,
            precision: orbit.precision,
            resolved_centuries: orbit.cache.centuries(),
        }
    }
}

#[cfg(feature = "serde")]
impl TryFrom<SavedOrbit> for Orbit {
    type Error = PropagationError;

    fn try_from(saved: SavedOrbit) -> Result<Self, Self::Error> {
        let cache = ResolvedCache::at_centuries(&saved.elements, saved.resolved_centuries);
        let resolved = cache.elements();
        if !resolved.is_elliptic() {
            return Err(PropagationError::DegenerateElements {
                centuries: saved.resolved_centuries,
                semi_major_axis: resolved.semi_major_axis,
                eccentricity: resolved.eccentricity,
            });
        }

        Ok(Self {
            elements: saved.elements,
            state: saved.state,
            phase: saved.phase,
            projector: saved.projector,
            precision: saved.precision,
            cache,
        })
    }
}

/// A body's anomaly state.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PropagationState {
    /// The mean anomaly, in radians, in `[0, 2pi)`.
    pub mean_anomaly: f64,

    /// The true anomaly, in radians, in `[0, 2pi]`.
    pub true_anomaly: f64,

    /// The mean motion, in radians per day.
    ///
    /// Set when the orbit is anchored and left alone while advancing.
    pub mean_motion: f64,

    /// The last successfully computed position, in simulation units.
    pub position: DVec3,
}

/// The lifecycle of a propagator.
///
/// There is no terminal phase: a body is propagated for as long as the
/// simulation runs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PropagationPhase {
    /// Never anchored to a date. The state holds no meaningful values.
    #[default]
    Uninitialized,
    /// Freshly anchored to a date.
    Anchored,
    /// Advanced at least once since the last anchor.
    Advancing,
}

// Initialization and cache management
impl Orbit {
    /// Creates a propagator with the default simulation config.
    ///
    /// The orbit starts [`Uninitialized`][PropagationPhase::Uninitialized];
    /// anchor it with [`Orbit::set_from_date`] before advancing it.
    pub fn new(elements: OrbitalElementSet) -> Orbit {
        Self::with_config(elements, &SimulationConfig::default())
    }

    /// Creates a propagator that projects and dates positions according to
    /// the given config.
    pub fn with_config(elements: OrbitalElementSet, config: &SimulationConfig) -> Orbit {
        let cache = ResolvedCache::new(&elements);
        Orbit {
            elements,
            state: PropagationState::default(),
            phase: PropagationPhase::default(),
            projector: Projector::from_config(config),
            precision: config.epoch_precision,
            cache,
        }
    }

    /// Applies a new simulation config.
    ///
    /// The stored position is not recomputed. It picks up the new scale on
    /// the next anchor or advance.
    pub fn apply_config(&mut self, config: &SimulationConfig) {
        self.projector = Projector::from_config(config);
        self.precision = config.epoch_precision;
    }

    /// Re-resolves the elements at the given epoch (a Julian Day Number),
    /// unless the elapsed centuries equal the cached ones.
    ///
    /// This neither moves the body nor touches its anomaly state.
    ///
    /// # Errors
    /// Returns [`PropagationError::DegenerateElements`] if secular drift
    /// has pushed the elements out of the elliptic domain at that epoch.
    /// The previous resolution is kept in that case.
    pub fn set_epoch(&mut self, epoch: f64) -> Result<(), PropagationError> {
        if let Some((centuries, resolved)) = self.resolve_at(epoch)? {
            self.commit_resolution(centuries, resolved);
        }
        Ok(())
    }

    /// Resolves the elements at `epoch` without committing them.
    ///
    /// Returns `None` if the cached resolution already holds for that epoch.
    fn resolve_at(&self, epoch: f64) -> Result<Option<(f64, ResolvedElements)>, PropagationError> {
        let Some((centuries, resolved)) = self.cache.refresh(&self.elements, epoch) else {
            return Ok(None);
        };

        if !resolved.is_elliptic() {
            return Err(PropagationError::DegenerateElements {
                centuries,
                semi_major_axis: resolved.semi_major_axis,
                eccentricity: resolved.eccentricity,
            });
        }

        Ok(Some((centuries, resolved)))
    }

    fn commit_resolution(&mut self, centuries: f64, resolved: ResolvedElements) {
        trace!("Re-resolved elements at T = {centuries} centuries");
        self.cache.commit(centuries, resolved);
    }
}

// Propagation
impl Orbit {
    /// Anchors the body to a calendar date.
    ///
    /// The date's epoch is taken at the configured [`EpochPrecision`]. The
    /// elements are resolved at that epoch, the mean anomaly is derived
    /// from the reference mean anomaly and the elapsed days, and the
    /// position follows from it. The mean motion is derived afresh.
    ///
    /// The whole anomaly state is overwritten.
    ///
    /// # Errors
    /// Fails if the elements are degenerate at that date, or if Kepler's
    /// equation doesn't converge. Neither the state nor the resolved
    /// elements change on error.
    pub fn set_from_date(&mut self, date: &CalendarDate) -> Result<DVec3, PropagationError> {
        self.anchor_at_epoch(date.epoch(self.precision))
    }

    /// Anchors the body to an epoch given as a (possibly fractional)
    /// Julian Day Number.
    ///
    /// See [`Orbit::set_from_date`].
    pub fn anchor_at_epoch(&mut self, epoch: f64) -> Result<DVec3, PropagationError> {
        let resolution = self.resolve_at(epoch)?;
        let elements = resolution.map_or(*self.cache.elements(), |(_, resolved)| resolved);

        let mean_motion = self.elements.get_mean_motion();
        let elapsed_days = epoch - self.elements.get_reference_epoch();
        let mean_anomaly =
            wrap_angle(self.elements.get_mean_anomaly_at_epoch() + mean_motion * elapsed_days);

        let (true_anomaly, position) = self.solve_position(&elements, mean_anomaly)?;

        if let Some((centuries, resolved)) = resolution {
            self.commit_resolution(centuries, resolved);
        }

        self.state = PropagationState {
            mean_anomaly,
            true_anomaly,
            mean_motion,
            position,
        };
        self.phase = PropagationPhase::Anchored;

        debug!("Anchored orbit at epoch {epoch}, M = {mean_anomaly}, v = {true_anomaly}");
        Ok(position)
    }

    /// Places the body at the given mean anomaly, using the elements
    /// resolved at the current epoch.
    ///
    /// Neither the mean motion nor the secular resolution is touched.
    /// Calling this twice with the same mean anomaly gives the same
    /// position.
    ///
    /// # Errors
    /// Returns [`PropagationError::NotAnchored`] if the orbit was never
    /// anchored, or a convergence error from Kepler's equation. The state
    /// is left untouched on error.
    pub fn from_mean_anomaly(&mut self, mean_anomaly: f64) -> Result<DVec3, PropagationError> {
        if self.phase == PropagationPhase::Uninitialized {
            return Err(PropagationError::NotAnchored);
        }

        let mean_anomaly = wrap_angle(mean_anomaly);
        let (true_anomaly, position) = self.solve_position(self.cache.elements(), mean_anomaly)?;

        self.state.mean_anomaly = mean_anomaly;
        self.state.true_anomaly = true_anomaly;
        self.state.position = position;
        self.phase = PropagationPhase::Advancing;

        Ok(position)
    }

    /// Advances the body by elapsed real time.
    ///
    /// The mean anomaly grows by
    /// `mean_motion * delta_seconds * days_per_second` and is wrapped into
    /// `[0, 2pi)`. Negative deltas (or negative rates) run the body
    /// backwards.
    ///
    /// # Errors
    /// See [`Orbit::from_mean_anomaly`].
    pub fn advance(
        &mut self,
        delta_seconds: f64,
        days_per_second: f64,
    ) -> Result<DVec3, PropagationError> {
        if self.phase == PropagationPhase::Uninitialized {
            return Err(PropagationError::NotAnchored);
        }

        let mean_anomaly =
            self.state.mean_anomaly + self.state.mean_motion * delta_seconds * days_per_second;
        self.from_mean_anomaly(mean_anomaly)
    }

    /// Samples the orbit at the current epoch as a polyline, in
    /// simulation units.
    ///
    /// See [`Projector::sample_path`].
    pub fn sample_path(&self) -> Vec<DVec3> {
        self.projector.sample_path(self.cache.elements())
    }

    fn solve_position(
        &self,
        elements: &ResolvedElements,
        mean_anomaly: f64,
    ) -> Result<(f64, DVec3), PropagationError> {
        let true_anomaly = elements.get_true_anomaly_at_mean_anomaly(mean_anomaly)?;
        Ok((true_anomaly, self.projector.project(elements, true_anomaly)))
    }
}

// Getters
impl Orbit {
    /// Gets the reference elements.
    #[inline]
    pub fn get_elements(&self) -> &OrbitalElementSet {
        &self.elements
    }

    /// Gets the elements resolved at the current epoch.
    ///
    /// Before the first anchor these are the reference elements.
    #[inline]
    pub fn get_resolved_elements(&self) -> &ResolvedElements {
        self.cache.elements()
    }

    /// Gets the Julian centuries between the reference epoch and the
    /// epoch the elements are resolved at.
    #[inline]
    pub fn get_resolved_centuries(&self) -> f64 {
        self.cache.centuries()
    }

    /// Gets the full anomaly state.
    #[inline]
    pub fn get_state(&self) -> &PropagationState {
        &self.state
    }

    /// Gets the lifecycle phase.
    #[inline]
    pub fn get_phase(&self) -> PropagationPhase {
        self.phase
    }

    /// Gets the mean anomaly, in radians.
    #[inline]
    pub fn get_mean_anomaly(&self) -> f64 {
        self.state.mean_anomaly
    }

    /// Gets the true anomaly, in radians.
    #[inline]
    pub fn get_true_anomaly(&self) -> f64 {
        self.state.true_anomaly
    }

    /// Gets the mean motion, in radians per day.
    #[inline]
    pub fn get_mean_motion(&self) -> f64 {
        self.state.mean_motion
    }

    /// Gets the last successfully computed position, in simulation units.
    #[inline]
    pub fn get_position(&self) -> DVec3 {
        self.state.position
    }

    /// Gets the projector in use.
    #[inline]
    pub fn get_projector(&self) -> &Projector {
        &self.projector
    }

    /// Gets the epoch precision in use.
    #[inline]
    pub fn get_epoch_precision(&self) -> EpochPrecision {
        self.precision
    }
}
