//! Reading bodies from the JSON catalog format.
//!
//! A catalog is a JSON array of body records. Angles are in degrees, except
//! the mean anomaly at epoch which is in radians, and are converted to
//! radians exactly once, when a record becomes an [`OrbitalElementSet`].
//!
//! ```json
//! [
//!   {
//!     "type": "planet",
//!     "name": "Earth",
//!     "radius": 6371,
//!     "orbit": {
//!       "semiMajor": 1.00000261,
//!       "eccentricity": 0.01671123,
//!       "inclination": -0.00001531,
//!       "longOfPeri": 102.93768193,
//!       "ascendingNode": 0,
//!       "meanAnomaly": -0.0431639,
//!       "period": 1,
//!       "dataFrom": "2000-01-01",
//!       "changesPerCentury": {
//!         "semiMajor": 0.00000562,
//!         "eccentricity": -0.00004392,
//!         "inclination": -0.01294668,
//!         "longOfPeri": 0.32327364,
//!         "ascendingNode": 0
//!       }
//!     }
//!   }
//! ]
//! ```

use serde::{Deserialize, Serialize};

use crate::{
    error::CatalogError, Body, CalendarDate, Orbit, OrbitalElementSet, SecularRates, VisualExtra,
};

/// One body in a catalog.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BodyRecord {
    /// What kind of body this is, like `"planet"` or `"asteroid"`.
    #[serde(rename = "type")]
    pub kind: String,

    /// The body's name.
    pub name: String,

    /// The body's texture, for the renderer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub texture_url: Option<String>,

    /// The body's radius, in kilometers.
    pub radius: f64,

    /// The CSS color of the body's label and icon.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,

    /// The body's ring, if it has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ring: Option<RingRecord>,

    /// The body's orbit. Bodies without one stay at their parent's origin.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orbit: Option<OrbitRecord>,
}

/// A ring's extent, in kilometers from the body's center.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RingRecord {
    /// Inner edge.
    pub start: f64,
    /// Outer edge.
    pub end: f64,
}

/// Orbital elements as stored in a catalog.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrbitRecord {
    /// Semi-major axis, in AU.
    pub semi_major: f64,
    /// Eccentricity.
    pub eccentricity: f64,
    /// Inclination, in degrees.
    pub inclination: f64,
    /// Longitude of periapsis, in degrees.
    pub long_of_peri: f64,
    /// Longitude of ascending node, in degrees.
    pub ascending_node: f64,
    /// Mean anomaly at the reference date, in radians.
    pub mean_anomaly: f64,
    /// Orbital period, in years.
    pub period: f64,
    /// The date the elements were sampled at, as `YYYY-MM-DD`.
    pub data_from: String,
    /// Drift of the elements per Julian century, in degrees and AU.
    #[serde(default)]
    pub changes_per_century: RatesRecord,
}

/// Secular rates as stored in a catalog.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RatesRecord {
    /// Semi-major axis drift, in AU per century.
    pub semi_major: f64,
    /// Eccentricity drift, per century.
    pub eccentricity: f64,
    /// Inclination drift, in degrees per century.
    pub inclination: f64,
    /// Longitude of periapsis drift, in degrees per century.
    pub long_of_peri: f64,
    /// Longitude of ascending node drift, in degrees per century.
    pub ascending_node: f64,
}

/// Parses a JSON catalog into its records.
///
/// # Errors
/// Returns [`CatalogError::Parse`] if the JSON is malformed or doesn't
/// match the record layout.
pub fn parse_records(json: &str) -> Result<Vec<BodyRecord>, CatalogError> {
    serde_json::from_str(json).map_err(CatalogError::Parse)
}

/// Parses a JSON catalog straight into bodies.
///
/// # Errors
/// Fails on the first record that can't be parsed or validated.
pub fn load_bodies(json: &str) -> Result<Vec<Body>, CatalogError> {
    parse_records(json)?.iter().map(BodyRecord::to_body).collect()
}

impl OrbitRecord {
    /// Converts this record into a validated element set.
    ///
    /// `name` is only used in error messages.
    ///
    /// # Errors
    /// Fails if `data_from` isn't a date, or if the elements don't
    /// describe a bound orbit.
    pub fn to_elements(&self, name: &str) -> Result<OrbitalElementSet, CatalogError> {
        let reference_date: CalendarDate =
            self.data_from.parse().map_err(|source| CatalogError::Date {
                name: name.to_string(),
                source,
            })?;

        let rates = &self.changes_per_century;

        OrbitalElementSet::from_degrees(
            self.semi_major,
            self.eccentricity,
            self.inclination,
            self.long_of_peri,
            self.ascending_node,
            self.mean_anomaly,
            self.period,
            reference_date.julian_day_number() as f64,
            SecularRates {
                semi_major_axis: rates.semi_major,
                eccentricity: rates.eccentricity,
                inclination: rates.inclination,
                long_of_periapsis: rates.long_of_peri,
                long_asc_node: rates.ascending_node,
            },
        )
        .map_err(|source| CatalogError::Elements {
            name: name.to_string(),
            source,
        })
    }
}

impl BodyRecord {
    /// Converts this record into a body with an unanchored propagator.
    ///
    /// # Errors
    /// See [`OrbitRecord::to_elements`].
    pub fn to_body(&self) -> Result<Body, CatalogError> {
        let orbit = self
            .orbit
            .as_ref()
            .map(|orbit| orbit.to_elements(&self.name).map(Orbit::new))
            .transpose()?;

        let mut body = Body::new(self.name.clone(), self.radius, orbit);

        if let Some(ring) = self.ring {
            body = body.with_extra(VisualExtra::Ring {
                inner_radius: ring.start,
                outer_radius: ring.end,
            });
        }
        if let Some(color) = &self.color {
            body = body
                .with_extra(VisualExtra::Label {
                    color: color.clone(),
                })
                .with_extra(VisualExtra::Icon {
                    color: color.clone(),
                });
        }

        Ok(body)
    }
}
