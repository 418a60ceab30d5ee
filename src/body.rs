use glam::DVec3;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::Orbit;

/// A struct representing a celestial body.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Body {
    /// The name of the celestial body.
    pub name: String,

    /// The radius of the celestial body, in kilometers.
    pub radius: f64,

    /// The orbit of the celestial body, if it is orbiting one.
    pub orbit: Option<Orbit>,

    /// The position of the body relative to its parent, in simulation units.
    ///
    /// Written by the [`Universe`][crate::Universe] after each successful
    /// propagation. It keeps its last value when propagation fails.
    pub position: DVec3,

    /// What the renderer attaches to the body besides its sphere.
    pub extras: Vec<VisualExtra>,
}

/// Something drawn alongside a body.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum VisualExtra {
    /// A flat ring around the body's equator.
    Ring {
        /// Inner edge of the ring, in kilometers from the body's center.
        inner_radius: f64,
        /// Outer edge of the ring, in kilometers from the body's center.
        outer_radius: f64,
    },
    /// A text label with the body's name.
    Label {
        /// CSS color of the label, like `"#ffcc00"`.
        color: String,
    },
    /// A screen-space icon marking the body at any zoom level.
    Icon {
        /// CSS color of the icon.
        color: String,
    },
}

impl Body {
    /// Creates a new `Body` instance at its parent's origin.
    ///
    /// # Arguments
    ///
    /// * `name` - The name of the celestial body.
    /// * `radius` - The radius of the celestial body, in kilometers.
    /// * `orbit` - An optional orbit for the celestial body.
    pub fn new(name: String, radius: f64, orbit: Option<Orbit>) -> Self {
        Self {
            name,
            radius,
            orbit,
            position: DVec3::ZERO,
            extras: Vec::new(),
        }
    }

    /// Returns this body with a visual extra attached.
    pub fn with_extra(mut self, extra: VisualExtra) -> Self {
        self.extras.push(extra);
        self
    }

    /// Gets the ring's inner and outer radius, if the body has one.
    pub fn get_ring(&self) -> Option<(f64, f64)> {
        self.extras.iter().find_map(|extra| match *extra {
            VisualExtra::Ring {
                inner_radius,
                outer_radius,
            } => Some((inner_radius, outer_radius)),
            _ => None,
        })
    }

    /// Releases the body from its orbit.
    ///
    /// The body stays where it was last placed.
    pub fn release_from_orbit(&mut self) {
        self.orbit = None;
    }
}

impl Default for Body {
    /// Creates a default `Body` instance.
    ///
    /// Currently, this function returns the Earth, without an orbit.
    /// However, do not rely on this behavior, as it may change in the future.
    fn default() -> Self {
        Self::new("Earth".to_string(), 6371.0, None)
    }
}
