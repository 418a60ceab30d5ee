use hifitime::{Duration, Epoch};

use crate::{CalendarDate, ClockError, DateError, SECONDS_PER_DAY};

/// The simulated wall clock.
///
/// Keeps the current simulated instant and how fast it runs relative to
/// real time. The speed may be zero or negative to freeze or rewind the
/// simulation.
///
/// # Example
/// ```
/// use orrery_kepler::{CalendarDate, SimulationClock};
///
/// let mut clock = SimulationClock::at_date(&CalendarDate::new(2000, 1, 1)).unwrap();
/// clock.set_speed(86_400.0); // one day per second
///
/// let elapsed = clock.tick(2.0);
/// assert_eq!(elapsed, 172_800.0);
/// assert_eq!(clock.date(), CalendarDate::new(2000, 1, 3));
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimulationClock {
    /// Current simulation time
    current: Epoch,
    /// Simulated seconds per real second.
    /// 1.0 = realtime, 86400.0 = 1 day per second
    speed: f64,
    paused: bool,
}

impl SimulationClock {
    /// Creates a running clock at the given instant, at real-time speed.
    pub fn new(start: Epoch) -> Self {
        Self {
            current: start,
            speed: 1.0,
            paused: false,
        }
    }

    /// Creates a running clock at the given date, at real-time speed.
    ///
    /// # Errors
    /// Fails if the date is not a real instant.
    pub fn at_date(date: &CalendarDate) -> Result<Self, DateError> {
        Ok(Self::new(date.to_epoch()?))
    }

    /// Creates a running clock at the current system time.
    pub fn now() -> Result<Self, ClockError> {
        Ok(Self::new(Epoch::now()?))
    }

    /// Get current simulation time
    pub fn current(&self) -> Epoch {
        self.current
    }

    /// Gets the current simulation time as a calendar date.
    pub fn date(&self) -> CalendarDate {
        CalendarDate::from(self.current)
    }

    /// Set absolute time
    pub fn set_time(&mut self, epoch: Epoch) {
        self.current = epoch;
    }

    /// Moves the clock to the current system time.
    pub fn sync_to_now(&mut self) -> Result<Epoch, ClockError> {
        self.current = Epoch::now()?;
        Ok(self.current)
    }

    /// Jump forward/backward by duration
    pub fn jump(&mut self, duration: Duration) {
        self.current = self.current + duration;
    }

    /// Gets the speed, in simulated seconds per real second.
    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// Sets the speed, in simulated seconds per real second.
    pub fn set_speed(&mut self, speed: f64) {
        self.speed = speed;
    }

    /// Gets how many simulated days pass per real second.
    ///
    /// This is zero while the clock is paused.
    pub fn days_per_second(&self) -> f64 {
        if self.paused {
            0.0
        } else {
            self.speed / SECONDS_PER_DAY
        }
    }

    /// Pause simulation
    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Resume simulation
    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// Toggle pause state
    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    /// Is paused?
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Advances the clock by real-world delta time.
    ///
    /// Returns the simulated seconds that elapsed, which is zero while
    /// paused and negative when running backwards.
    pub fn tick(&mut self, real_dt_seconds: f64) -> f64 {
        if self.paused {
            return 0.0;
        }

        let sim_dt = real_dt_seconds * self.speed;
        self.current = self.current + Duration::from_seconds(sim_dt);
        sim_dt
    }
}

impl Default for SimulationClock {
    /// A clock at J2000 (2000-01-01 12:00 UTC).
    fn default() -> Self {
        Self::new(Epoch::from_gregorian_utc(2000, 1, 1, 12, 0, 0, 0))
    }
}
