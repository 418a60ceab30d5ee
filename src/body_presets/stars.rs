//! This module contains presets for stars.
//!
//! "A star is a luminous spheroid of plasma held together by self-gravity."
//!
//! \- [Wikipedia](https://en.wikipedia.org/wiki/Star)

use crate::{Body, VisualExtra};

/// Returns the Sun.
///
/// The Sun sits at the origin of the heliocentric frame and has no orbit.
pub fn the_sun() -> Body {
    Body::new("Sun".to_string(), 696_340.0, None).with_extra(VisualExtra::Label {
        color: "#ffcc33".to_string(),
    })
}
