//! Orbital elements at a reference epoch, their secular drift, and their
//! resolution to an arbitrary epoch.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{error::ElementsError, OrbitTrait, DAYS_PER_JULIAN_CENTURY};

/// Linear drift of the five geometric elements, per Julian century.
///
/// Angular rates are in radians per century, the semi-major axis rate is
/// in AU per century, and the eccentricity rate is unitless.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SecularRates {
    /// Semi-major axis drift, in AU per century.
    pub semi_major_axis: f64,
    /// Eccentricity drift, per century.
    pub eccentricity: f64,
    /// Inclination drift, in radians per century.
    pub inclination: f64,
    /// Longitude of periapsis drift, in radians per century.
    pub long_of_periapsis: f64,
    /// Longitude of ascending node drift, in radians per century.
    pub long_asc_node: f64,
}

impl SecularRates {
    /// Converts rates whose angular components are in degrees per century
    /// into radians per century.
    ///
    /// The semi-major axis and eccentricity rates are passed through.
    pub fn from_degrees(
        semi_major_axis: f64,
        eccentricity: f64,
        inclination: f64,
        long_of_periapsis: f64,
        long_asc_node: f64,
    ) -> Self {
        Self {
            semi_major_axis,
            eccentricity,
            inclination: inclination.to_radians(),
            long_of_periapsis: long_of_periapsis.to_radians(),
            long_asc_node: long_asc_node.to_radians(),
        }
    }
}

/// One body's Keplerian elements at their reference epoch.
///
/// Built once from catalog data and never mutated. Construction validates
/// the elements, so a value of this type is always safe to propagate.
///
/// # Example
/// ```
/// use orrery_kepler::{OrbitalElementSet, OrbitTrait, SecularRates, J2000_JDN};
///
/// let earth = OrbitalElementSet::from_degrees(
///     1.00000261,           // semi-major axis, AU
///     0.01671123,           // eccentricity
///     -0.00001531,          // inclination, degrees
///     102.93768193,         // longitude of periapsis, degrees
///     0.0,                  // longitude of ascending node, degrees
///     -0.0433,              // mean anomaly at epoch, radians
///     1.0,                  // orbital period, years
///     J2000_JDN,
///     SecularRates::from_degrees(0.00000562, -0.00004392, -0.01294668, 0.32327364, 0.0),
/// )
/// .unwrap();
///
/// assert!((earth.get_inclination() - (-0.00001531_f64).to_radians()).abs() < 1e-15);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(try_from = "UncheckedElementSet")
)]
pub struct OrbitalElementSet {
    /// Semi-major axis, in AU.
    semi_major_axis: f64,

    /// Eccentricity, in `[0, 1)`.
    eccentricity: f64,

    /// Inclination, in radians.
    inclination: f64,

    /// Longitude of periapsis, in radians.
    long_of_periapsis: f64,

    /// Longitude of ascending node, in radians.
    long_asc_node: f64,

    /// Mean anomaly at the reference epoch, in radians.
    mean_anomaly: f64,

    /// Orbital period, in years.
    period: f64,

    /// Julian Day Number of the date the elements were sampled at.
    reference_epoch: f64,

    rates: SecularRates,
}

/// Element fields as read from a file, before validation.
#[cfg(feature = "serde")]
#[derive(Deserialize)]
struct UncheckedElementSet {
    semi_major_axis: f64,
    eccentricity: f64,
    inclination: f64,
    long_of_periapsis: f64,
    long_asc_node: f64,
    mean_anomaly: f64,
    period: f64,
    reference_epoch: f64,
    rates: SecularRates,
}

#[cfg(feature = "serde")]
impl TryFrom<UncheckedElementSet> for OrbitalElementSet {
    type Error = ElementsError;

    fn try_from(raw: UncheckedElementSet) -> Result<Self, Self::Error> {
        Self::new(
            raw.semi_major_axis,
            raw.eccentricity,
            raw.inclination,
            raw.long_of_periapsis,
            raw.long_asc_node,
            raw.mean_anomaly,
            raw.period,
            raw.reference_epoch,
            raw.rates,
        )
    }
}

impl OrbitalElementSet {
    /// Creates a validated element set from values already in radians.
    ///
    /// # Parameters
    /// - `semi_major_axis`: in AU, must be positive.
    /// - `eccentricity`: must be in `[0, 1)`.
    /// - `inclination`, `long_of_periapsis`, `long_asc_node`: in radians.
    /// - `mean_anomaly`: the mean anomaly at the reference epoch, in radians.
    /// - `period`: the orbital period in years, must be positive.
    /// - `reference_epoch`: the Julian Day Number of the source data.
    /// - `rates`: secular rates, angular ones in radians per century.
    ///
    /// # Errors
    /// Returns an [`ElementsError`] if any value is non-finite, or if the
    /// eccentricity, period or semi-major axis is out of range.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        semi_major_axis: f64,
        eccentricity: f64,
        inclination: f64,
        long_of_periapsis: f64,
        long_asc_node: f64,
        mean_anomaly: f64,
        period: f64,
        reference_epoch: f64,
        rates: SecularRates,
    ) -> Result<Self, ElementsError> {
        let elements = Self::new_unchecked(
            semi_major_axis,
            eccentricity,
            inclination,
            long_of_periapsis,
            long_asc_node,
            mean_anomaly,
            period,
            reference_epoch,
            rates,
        );
        elements.validate()?;
        Ok(elements)
    }

    /// Creates a validated element set from catalog-style values, where
    /// the inclination, longitude of periapsis and longitude of ascending
    /// node (and their rates) are in degrees.
    ///
    /// The mean anomaly at epoch is already in radians.
    ///
    /// # Errors
    /// See [`OrbitalElementSet::new`].
    #[allow(clippy::too_many_arguments)]
    pub fn from_degrees(
        semi_major_axis: f64,
        eccentricity: f64,
        inclination: f64,
        long_of_periapsis: f64,
        long_asc_node: f64,
        mean_anomaly: f64,
        period: f64,
        reference_epoch: f64,
        rates_in_degrees: SecularRates,
    ) -> Result<Self, ElementsError> {
        let rates = SecularRates::from_degrees(
            rates_in_degrees.semi_major_axis,
            rates_in_degrees.eccentricity,
            rates_in_degrees.inclination,
            rates_in_degrees.long_of_periapsis,
            rates_in_degrees.long_asc_node,
        );

        Self::new(
            semi_major_axis,
            eccentricity,
            inclination.to_radians(),
            long_of_periapsis.to_radians(),
            long_asc_node.to_radians(),
            mean_anomaly,
            period,
            reference_epoch,
            rates,
        )
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) const fn new_unchecked(
        semi_major_axis: f64,
        eccentricity: f64,
        inclination: f64,
        long_of_periapsis: f64,
        long_asc_node: f64,
        mean_anomaly: f64,
        period: f64,
        reference_epoch: f64,
        rates: SecularRates,
    ) -> Self {
        Self {
            semi_major_axis,
            eccentricity,
            inclination,
            long_of_periapsis,
            long_asc_node,
            mean_anomaly,
            period,
            reference_epoch,
            rates,
        }
    }

    /// Checks that these elements describe a bound, finite orbit.
    ///
    /// # Errors
    /// See [`OrbitalElementSet::new`].
    pub fn validate(&self) -> Result<(), ElementsError> {
        let finite_fields = [
            ("semi-major axis", self.semi_major_axis),
            ("eccentricity", self.eccentricity),
            ("inclination", self.inclination),
            ("longitude of periapsis", self.long_of_periapsis),
            ("longitude of ascending node", self.long_asc_node),
            ("mean anomaly at epoch", self.mean_anomaly),
            ("orbital period", self.period),
            ("reference epoch", self.reference_epoch),
            ("semi-major axis rate", self.rates.semi_major_axis),
            ("eccentricity rate", self.rates.eccentricity),
            ("inclination rate", self.rates.inclination),
            ("longitude of periapsis rate", self.rates.long_of_periapsis),
            ("longitude of ascending node rate", self.rates.long_asc_node),
        ];

        if let Some(&(field, value)) = finite_fields.iter().find(|(_, v)| !v.is_finite()) {
            return Err(ElementsError::NonFinite { field, value });
        }

        if !(0.0..1.0).contains(&self.eccentricity) {
            return Err(ElementsError::EccentricityOutOfRange(self.eccentricity));
        }
        if self.period <= 0.0 {
            return Err(ElementsError::NonPositivePeriod(self.period));
        }
        if self.semi_major_axis <= 0.0 {
            return Err(ElementsError::NonPositiveSemiMajorAxis(self.semi_major_axis));
        }

        Ok(())
    }

    /// Gets the mean anomaly at the reference epoch, in radians.
    #[inline]
    pub fn get_mean_anomaly_at_epoch(&self) -> f64 {
        self.mean_anomaly
    }

    /// Gets the orbital period, in years.
    #[inline]
    pub fn get_orbital_period(&self) -> f64 {
        self.period
    }

    /// Gets the Julian Day Number of the reference epoch.
    #[inline]
    pub fn get_reference_epoch(&self) -> f64 {
        self.reference_epoch
    }

    /// Gets the secular rates, in radians (or AU) per century.
    #[inline]
    pub fn get_secular_rates(&self) -> SecularRates {
        self.rates
    }

    /// Gets the mean motion in radians per day.
    ///
    /// A year is counted as 365 days here.
    #[inline]
    pub fn get_mean_motion(&self) -> f64 {
        crate::mean_motion(self.period)
    }

    /// Gets the Julian centuries elapsed between the reference epoch and
    /// the given epoch.
    #[inline]
    pub fn get_centuries_since_epoch(&self, epoch: f64) -> f64 {
        (epoch - self.reference_epoch) / DAYS_PER_JULIAN_CENTURY
    }

    /// Resolves the geometric elements at the given epoch (a Julian Day
    /// Number).
    ///
    /// Each field drifts linearly by its secular rate. The mean anomaly is
    /// not part of the result: it advances through time-stepping only.
    ///
    /// # Example
    /// ```
    /// use orrery_kepler::{OrbitalElementSet, OrbitTrait, SecularRates};
    ///
    /// let rates = SecularRates { eccentricity: 0.001, ..Default::default() };
    /// let elements =
    ///     OrbitalElementSet::new(1.0, 0.1, 0.0, 0.0, 0.0, 0.0, 1.0, 2_451_545.0, rates)
    ///         .unwrap();
    ///
    /// // One Julian century later
    /// let resolved = elements.resolve(2_451_545.0 + 36_525.0);
    /// assert_eq!(resolved.get_eccentricity(), 0.1 + 0.001);
    /// ```
    pub fn resolve(&self, epoch: f64) -> ResolvedElements {
        self.resolve_centuries(self.get_centuries_since_epoch(epoch))
    }

    /// Resolves the geometric elements `centuries` Julian centuries after
    /// the reference epoch.
    pub fn resolve_centuries(&self, centuries: f64) -> ResolvedElements {
        let rates = &self.rates;
        ResolvedElements {
            semi_major_axis: self.semi_major_axis + rates.semi_major_axis * centuries,
            eccentricity: self.eccentricity + rates.eccentricity * centuries,
            inclination: self.inclination + rates.inclination * centuries,
            long_of_periapsis: self.long_of_periapsis + rates.long_of_periapsis * centuries,
            long_asc_node: self.long_asc_node + rates.long_asc_node * centuries,
        }
    }

    /// Gets the elements at the reference epoch, with no drift applied.
    pub fn at_reference_epoch(&self) -> ResolvedElements {
        ResolvedElements {
            semi_major_axis: self.semi_major_axis,
            eccentricity: self.eccentricity,
            inclination: self.inclination,
            long_of_periapsis: self.long_of_periapsis,
            long_asc_node: self.long_asc_node,
        }
    }
}

impl OrbitTrait for OrbitalElementSet {
    #[inline]
    fn get_semi_major_axis(&self) -> f64 {
        self.semi_major_axis
    }

    #[inline]
    fn get_eccentricity(&self) -> f64 {
        self.eccentricity
    }

    #[inline]
    fn get_inclination(&self) -> f64 {
        self.inclination
    }

    #[inline]
    fn get_long_of_periapsis(&self) -> f64 {
        self.long_of_periapsis
    }

    #[inline]
    fn get_long_asc_node(&self) -> f64 {
        self.long_asc_node
    }
}

/// The five geometric elements evaluated at a specific epoch.
///
/// Produced by [`OrbitalElementSet::resolve`].
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ResolvedElements {
    /// Semi-major axis, in AU.
    pub semi_major_axis: f64,
    /// Eccentricity.
    pub eccentricity: f64,
    /// Inclination, in radians.
    pub inclination: f64,
    /// Longitude of periapsis, in radians.
    pub long_of_periapsis: f64,
    /// Longitude of ascending node, in radians.
    pub long_asc_node: f64,
}

impl ResolvedElements {
    /// Whether these elements still describe a bound ellipse.
    ///
    /// Secular drift far from the reference epoch can push the
    /// eccentricity or semi-major axis out of range.
    pub fn is_elliptic(&self) -> bool {
        (0.0..1.0).contains(&self.eccentricity)
            && self.semi_major_axis > 0.0
            && self.semi_major_axis.is_finite()
    }
}

impl OrbitTrait for ResolvedElements {
    #[inline]
    fn get_semi_major_axis(&self) -> f64 {
        self.semi_major_axis
    }

    #[inline]
    fn get_eccentricity(&self) -> f64 {
        self.eccentricity
    }

    #[inline]
    fn get_inclination(&self) -> f64 {
        self.inclination
    }

    #[inline]
    fn get_long_of_periapsis(&self) -> f64 {
        self.long_of_periapsis
    }

    #[inline]
    fn get_long_asc_node(&self) -> f64 {
        self.long_asc_node
    }
}

// -------- MEMO --------
/// Resolved elements memoised on the elapsed Julian centuries.
///
/// The key is compared with exact float equality. Recomputing for an equal
/// key gives bit-identical elements.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct ResolvedCache {
    centuries: f64,
    elements: ResolvedElements,
}

impl ResolvedCache {
    /// A cache holding the reference elements, keyed at zero centuries.
    pub(crate) fn new(reference: &OrbitalElementSet) -> Self {
        Self {
            centuries: 0.0,
            elements: reference.at_reference_epoch(),
        }
    }

    /// Rebuilds a cache keyed at `centuries` from the reference elements.
    #[cfg(feature = "serde")]
    pub(crate) fn at_centuries(reference: &OrbitalElementSet, centuries: f64) -> Self {
        let mut cache = Self::new(reference);
        if centuries != 0.0 {
            cache.commit(centuries, reference.resolve_centuries(centuries));
        }
        cache
    }

    #[inline]
    pub(crate) fn centuries(&self) -> f64 {
        self.centuries
    }

    #[inline]
    pub(crate) fn elements(&self) -> &ResolvedElements {
        &self.elements
    }

    /// Resolves `reference` at `epoch` unless the elapsed centuries match
    /// the cached key.
    ///
    /// Returns the freshly resolved elements if they had to be recomputed,
    /// without committing them. Call [`commit`][Self::commit] to store them.
    pub(crate) fn refresh(
        &self,
        reference: &OrbitalElementSet,
        epoch: f64,
    ) -> Option<(f64, ResolvedElements)> {
        let centuries = reference.get_centuries_since_epoch(epoch);
        if centuries != self.centuries {
            Some((centuries, reference.resolve_centuries(centuries)))
        } else {
            None
        }
    }

    pub(crate) fn commit(&mut self, centuries: f64, elements: ResolvedElements) {
        self.centuries = centuries;
        self.elements = elements;
    }
}
