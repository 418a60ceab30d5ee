use core::fmt;
use std::collections::HashMap;

use glam::DVec3;
use hifitime::Epoch;
use log::{debug, warn};

use crate::{
    Body, BodyAddError, CalendarDate, ClockError, DateError, PropagationError, SimulationClock,
    SimulationConfig,
};

/// A handle to a body in a [`Universe`].
///
/// Handles are never reused within one universe.
pub type BodyId = u64;

/// Struct that represents the simulation of the Solar System.
///
/// Bodies live in a flat table and refer to each other by [`BodyId`].
/// Each tick, the universe drives every body's propagator and stores the
/// returned position on the body. A body whose propagation fails keeps its
/// last position, and its failure never affects any other body.
#[derive(Clone, Debug, PartialEq)]
pub struct Universe {
    /// The celestial bodies in the universe and their relations.
    bodies: HashMap<BodyId, BodyWrapper>,

    /// The next ID to assign to a body.
    next_id: BodyId,

    /// The simulated clock.
    clock: SimulationClock,

    config: SimulationConfig,
}

/// Where a body sits in the parent-satellite hierarchy.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BodyRelation {
    /// The body this one orbits, if any.
    pub parent: Option<BodyId>,
    /// The bodies orbiting this one.
    pub satellites: Vec<BodyId>,
}

#[derive(Clone, Debug, PartialEq)]
struct BodyWrapper {
    body: Body,
    relations: BodyRelation,
}

impl Universe {
    /// Creates an empty universe whose clock starts at `start`.
    ///
    /// The clock speed is taken from the config.
    pub fn new(config: SimulationConfig, start: Epoch) -> Universe {
        let mut clock = SimulationClock::new(start);
        clock.set_speed(config.simulation_speed);

        Universe {
            bodies: HashMap::new(),
            next_id: 0,
            clock,
            config,
        }
    }

    /// Adds a body to the universe.
    ///
    /// `body`: The body to add into the universe.
    /// `satellite_of`: The id of the body that this body is orbiting.
    ///
    /// If the body has an orbit, the orbit takes on the universe's config
    /// and is anchored at the current simulated date.
    ///
    /// Returns: The id of the newly-added body.
    pub fn add_body(
        &mut self,
        mut body: Body,
        satellite_of: Option<BodyId>,
    ) -> Result<BodyId, (BodyAddError, Body)> {
        if let Some(parent_id) = satellite_of {
            if !self.bodies.contains_key(&parent_id) {
                return Err((BodyAddError::ParentNotFound(parent_id), body));
            }
        }

        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);

        let epoch = self.current_epoch();
        if let Some(orbit) = &mut body.orbit {
            orbit.apply_config(&self.config);
            match orbit.anchor_at_epoch(epoch) {
                Ok(position) => body.position = position,
                Err(error) => warn!("Failed to anchor {} on insertion: {error}", body.name),
            }
        }

        self.bodies.insert(
            id,
            BodyWrapper {
                body,
                relations: BodyRelation {
                    parent: satellite_of,
                    satellites: Vec::new(),
                },
            },
        );
        if let Some(parent_id) = satellite_of {
            if let Some(wrapper) = self.bodies.get_mut(&parent_id) {
                wrapper.relations.satellites.push(id);
            }
        }

        Ok(id)
    }

    /// Removes a body from the universe.
    ///
    /// `body_id`: The id of the body to remove.
    ///
    /// Returns: A Vec of all bodies that were removed, including the one specified.
    /// An empty Vec is returned if the body was not found.
    pub fn remove_body(&mut self, body_id: BodyId) -> Vec<Body> {
        let wrapper = match self.bodies.remove(&body_id) {
            Some(wrapper) => wrapper,
            None => return Vec::new(),
        };

        let (body, relations) = (wrapper.body, wrapper.relations);
        let mut bodies = vec![body];

        // Remove the body from its parent's satellites.
        if let Some(parent_id) = relations.parent {
            if let Some(parent_wrapper) = self.bodies.get_mut(&parent_id) {
                parent_wrapper
                    .relations
                    .satellites
                    .retain(|&satellite| satellite != body_id);
            }
        }

        // Remove children
        for &satellite_id in &relations.satellites {
            bodies.append(&mut self.remove_body(satellite_id));
        }

        bodies
    }

    /// Gets a Vec of all bodies in the universe.
    pub fn get_bodies(&self) -> Vec<&Body> {
        self.bodies.values().map(|wrapper| &wrapper.body).collect()
    }

    /// Gets the relations of a body.
    pub fn get_body_relation(&self, id: BodyId) -> Option<&BodyRelation> {
        self.bodies.get(&id).map(|wrapper| &wrapper.relations)
    }

    /// Gets a mutable reference to a body in the universe.
    pub fn get_body_mut(&mut self, id: BodyId) -> Option<&mut Body> {
        self.bodies.get_mut(&id).map(|wrapper| &mut wrapper.body)
    }

    /// Gets an immutable reference to a body in the universe.
    pub fn get_body(&self, id: BodyId) -> Option<&Body> {
        self.bodies.get(&id).map(|wrapper| &wrapper.body)
    }

    /// Gets the id of a body with a given name.
    pub fn get_body_id_with_name(&self, name: &str) -> Option<BodyId> {
        self.bodies
            .iter()
            .find(|(_, w)| w.body.name == name)
            .map(|(id, _)| *id)
    }

    /// Gets the number of bodies in the universe.
    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    /// Whether the universe holds no bodies.
    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Gets the simulated clock.
    pub fn clock(&self) -> &SimulationClock {
        &self.clock
    }

    /// Gets the simulated clock mutably, to pause it or change its speed.
    pub fn clock_mut(&mut self) -> &mut SimulationClock {
        &mut self.clock
    }

    /// Gets the simulation config.
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Replaces the simulation config.
    ///
    /// Every orbit takes on the new config, the clock takes on its speed,
    /// and all bodies are re-anchored at the current date so the new scale
    /// applies at once.
    pub fn set_config(&mut self, config: SimulationConfig) -> Vec<(BodyId, PropagationError)> {
        self.config = config;
        self.clock.set_speed(config.simulation_speed);
        for wrapper in self.bodies.values_mut() {
            if let Some(orbit) = &mut wrapper.body.orbit {
                orbit.apply_config(&config);
            }
        }
        self.anchor_all()
    }

    /// Gets the current simulated date.
    pub fn date(&self) -> CalendarDate {
        self.clock.date()
    }

    fn current_epoch(&self) -> f64 {
        self.date().epoch(self.config.epoch_precision)
    }

    /// Jumps the simulation to a date and re-anchors every body there.
    ///
    /// Returns the bodies that failed to anchor. They keep their previous
    /// positions.
    ///
    /// # Errors
    /// Fails if the date is not a real instant. The simulation stays at
    /// its current date in that case.
    pub fn set_date(
        &mut self,
        date: &CalendarDate,
    ) -> Result<Vec<(BodyId, PropagationError)>, DateError> {
        let epoch = date.to_epoch()?;
        self.clock.set_time(epoch);
        debug!("Simulation date set to {date}");
        Ok(self.anchor_all())
    }

    /// Re-synchronises the simulation with the system clock and
    /// re-anchors every body.
    ///
    /// # Errors
    /// Fails if the system time can't be read. Nothing changes in that
    /// case.
    pub fn sync_to_now(&mut self) -> Result<Vec<(BodyId, PropagationError)>, ClockError> {
        self.clock.sync_to_now()?;
        debug!("Simulation re-synchronised to {}", self.date());
        Ok(self.anchor_all())
    }

    fn anchor_all(&mut self) -> Vec<(BodyId, PropagationError)> {
        let epoch = self.current_epoch();
        let mut failures = Vec::new();

        for (&id, wrapper) in self.bodies.iter_mut() {
            let body = &mut wrapper.body;
            let Some(orbit) = &mut body.orbit else {
                continue;
            };

            match orbit.anchor_at_epoch(epoch) {
                Ok(position) => body.position = position,
                Err(error) => {
                    warn!("Failed to anchor {}: {error}", body.name);
                    failures.push((id, error));
                }
            }
        }

        failures
    }

    /// Advances the simulation by a frame.
    ///
    /// `real_dt_seconds`: The real time since the last frame, in seconds.
    ///
    /// The clock moves on by `real_dt_seconds` times its speed. Every orbit
    /// is then brought to the new epoch (re-resolving its elements only if
    /// the elapsed centuries changed) and advanced incrementally.
    ///
    /// Returns the bodies that failed to propagate. They keep their
    /// previous positions.
    pub fn tick(&mut self, real_dt_seconds: f64) -> Vec<(BodyId, PropagationError)> {
        let days_per_second = self.clock.days_per_second();
        self.clock.tick(real_dt_seconds);
        let epoch = self.current_epoch();

        let mut failures = Vec::new();

        for (&id, wrapper) in self.bodies.iter_mut() {
            let body = &mut wrapper.body;
            let Some(orbit) = &mut body.orbit else {
                continue;
            };

            if let Err(error) = orbit.set_epoch(epoch) {
                warn!("Keeping stale elements for {}: {error}", body.name);
            }

            match orbit.advance(real_dt_seconds, days_per_second) {
                Ok(position) => body.position = position,
                Err(error) => {
                    warn!("Failed to propagate {}: {error}", body.name);
                    failures.push((id, error));
                }
            }
        }

        failures
    }

    /// Gets the absolute position of a body in the universe, in simulation
    /// units.
    ///
    /// `id`: The id of the body to get the position of.
    ///
    /// Returns: The body's position plus those of all its ancestors.
    /// The top ancestor of the body (i.e, the body with no parent) is at
    /// its stored position, which is the origin unless it orbits something.
    pub fn get_body_position(&self, id: BodyId) -> Option<DVec3> {
        let wrapper = self.bodies.get(&id)?;
        let mut position = wrapper.body.position;

        if let Some(parent) = wrapper.relations.parent {
            if let Some(parent_position) = self.get_body_position(parent) {
                position += parent_position;
            }
        }

        Some(position)
    }
}

impl Default for Universe {
    /// An empty universe with the default config, starting at J2000.
    fn default() -> Self {
        let clock = SimulationClock::default();
        Universe::new(SimulationConfig::default(), clock.current())
    }
}

impl fmt::Display for Universe {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Universe with {} bodies, at {}",
            self.bodies.len(),
            self.date()
        )
    }
}
