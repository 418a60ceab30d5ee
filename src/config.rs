//! Simulation-wide settings, passed explicitly to every propagator.
//!
//! With the `serde` feature, settings persist as RON.

#[cfg(feature = "serde")]
use std::path::Path;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[cfg(feature = "serde")]
use crate::error::ConfigError;
use crate::{ConicParameter, EpochPrecision, KM_PER_AU, SECONDS_PER_DAY};

/// Settings shared by the whole simulation.
///
/// # Example
/// ```
/// use orrery_kepler::SimulationConfig;
///
/// let config = SimulationConfig {
///     simulation_speed: 86_400.0, // one day per second
///     ..Default::default()
/// };
///
/// assert_eq!(config.days_per_second(), 1.0);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SimulationConfig {
    /// Kilometers per simulation length unit.
    pub distance_scale: f64,

    /// Simulated seconds per real second.
    ///
    /// Zero freezes the simulation, negative values run it backwards.
    pub simulation_speed: f64,

    /// How much of the time of day reaches the propagators.
    pub epoch_precision: EpochPrecision,

    /// Which semi-latus rectum the projection uses.
    pub conic_parameter: ConicParameter,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            distance_scale: 1.0,
            simulation_speed: 1.0,
            epoch_precision: EpochPrecision::default(),
            conic_parameter: ConicParameter::default(),
        }
    }
}

impl SimulationConfig {
    /// Gets the factor that turns AU into simulation units.
    #[inline]
    pub fn scale_factor(&self) -> f64 {
        KM_PER_AU / self.distance_scale
    }

    /// Gets how many simulated days pass per real second.
    #[inline]
    pub fn days_per_second(&self) -> f64 {
        self.simulation_speed / SECONDS_PER_DAY
    }
}

// --- Load / Save ---

#[cfg(feature = "serde")]
impl SimulationConfig {
    /// Parses a config from RON. Missing fields take their defaults.
    pub fn from_ron_str(contents: &str) -> Result<Self, ConfigError> {
        ron::from_str(contents).map_err(ConfigError::Parse)
    }

    /// Serializes this config as pretty-printed RON.
    pub fn to_ron_string(&self) -> Result<String, ConfigError> {
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(2)
            .enumerate_arrays(false);
        ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::Serialize)
    }

    /// Loads a config from a RON file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(ConfigError::Read)?;
        let config = Self::from_ron_str(&contents)?;
        log::info!("Loaded simulation config from {}", path.display());
        Ok(config)
    }

    /// Saves this config to a RON file, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir).map_err(ConfigError::Write)?;
        }
        let serialized = self.to_ron_string()?;
        std::fs::write(path, serialized).map_err(ConfigError::Write)?;
        Ok(())
    }
}
