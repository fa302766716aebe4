//! Simulation data types.

use crate::config::Config;

/// Lowest selectable speed (km/h).
pub const MIN_SPEED_KPH: u32 = 5;
/// Highest selectable speed (km/h).
pub const MAX_SPEED_KPH: u32 = 80;
/// Speed selected when the simulation is mounted.
pub const DEFAULT_SPEED_KPH: u32 = 40;

/// The deer carrying seeds across the landscape.
///
/// The vertical position is owned by the current mode and is rewritten on
/// every step; only the horizontal position is integrated.
#[derive(Debug, Clone, PartialEq)]
pub struct Actor {
    pub x: f64,
    pub y: f64,
    /// Horizontal velocity (px/s) used by the last step.
    pub vx: f64,
    pub radius: f64,
    seeds_carried: u32,
}

impl Actor {
    pub fn new(x: f64, y: f64, radius: f64) -> Self {
        Self {
            x,
            y,
            vx: 0.0,
            radius,
            seeds_carried: 0,
        }
    }

    pub fn seeds_carried(&self) -> u32 {
        self.seeds_carried
    }

    pub fn pick_seed(&mut self) {
        self.seeds_carried += 1;
    }

    /// Release one carried seed. Returns `false` if there was none to drop.
    pub fn release_seed(&mut self) -> bool {
        match self.seeds_carried.checked_sub(1) {
            Some(left) => {
                self.seeds_carried = left;
                true
            }
            None => false,
        }
    }
}

/// A seed lying where the actor dropped it.
#[derive(Debug, Clone, PartialEq)]
pub struct Seed {
    pub x: f64,
    pub y: f64,
    age: f64,
    planted: bool,
    sprouted: bool,
}

impl Seed {
    /// Create a seed freshly released at `(x, y)`.
    pub fn dropped_at(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            age: 0.0,
            planted: true,
            sprouted: false,
        }
    }

    pub fn age(&self) -> f64 {
        self.age
    }

    pub fn sprouted(&self) -> bool {
        self.sprouted
    }

    /// Age the seed by `dt` and sprout it once its age exceeds `maturation`.
    ///
    /// Returns the new plant on the tick the seed sprouts, `None` otherwise.
    /// A sprouted seed no longer ages.
    pub fn grow(&mut self, dt: f64, maturation: f64) -> Option<Plant> {
        if self.sprouted {
            return None;
        }
        self.age += dt.max(0.0);
        if self.planted && self.age > maturation {
            self.sprouted = true;
            return Some(Plant {
                x: self.x,
                y: self.y,
            });
        }
        None
    }
}

/// A sprout grown from a seed. Purely visual.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plant {
    pub x: f64,
    pub y: f64,
}

/// Complete state of the simulated landscape.
///
/// Seeds and plants are never removed; both collections only grow.
#[derive(Debug, Clone, PartialEq)]
pub struct World {
    pub width: f64,
    pub height: f64,
    pub actor: Actor,
    pub seeds: Vec<Seed>,
    pub plants: Vec<Plant>,
    /// Number of steps taken since initialization.
    pub ticks: u64,
}

impl World {
    /// Build the starting world for a surface of the given size.
    ///
    /// Calling this twice with the same arguments yields equal worlds, which
    /// is what a reset relies on.
    pub fn new(width: f64, height: f64, cfg: &Config) -> Self {
        let actor = Actor::new(
            cfg.motion.start_x,
            cfg.layout.ground_y(height) - cfg.motion.ground_offset,
            cfg.motion.radius,
        );
        Self {
            width,
            height,
            actor,
            seeds: Vec::new(),
            plants: Vec::new(),
            ticks: 0,
        }
    }

    /// Build the starting world for the configured surface size.
    pub fn from_config(cfg: &Config) -> Self {
        Self::new(cfg.layout.width, cfg.layout.height, cfg)
    }

    pub fn n_sprouted(&self) -> usize {
        self.seeds.iter().filter(|seed| seed.sprouted()).count()
    }
}

/// Externally owned control values read once per tick.
#[derive(Debug, Clone, PartialEq)]
pub struct Controls {
    speed_kph: u32,
    pub swim: bool,
    pub running: bool,
    /// Bumped on every reset request.
    pub reset_epoch: u64,
}

impl Default for Controls {
    fn default() -> Self {
        Self {
            speed_kph: DEFAULT_SPEED_KPH,
            swim: false,
            running: false,
            reset_epoch: 0,
        }
    }
}

impl Controls {
    pub fn speed_kph(&self) -> u32 {
        self.speed_kph
    }

    /// Set the speed, clamping it into the selectable range.
    pub fn set_speed_kph(&mut self, speed_kph: i64) {
        let clamped = speed_kph.clamp(MIN_SPEED_KPH as i64, MAX_SPEED_KPH as i64);
        if clamped != speed_kph {
            log::warn!("speed {speed_kph} km/h clamped to {clamped} km/h");
        }
        self.speed_kph = clamped as u32;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_worlds_are_identical() {
        let cfg = Config::default();
        let a = World::new(640.0, 440.0, &cfg);
        let b = World::new(640.0, 440.0, &cfg);
        assert_eq!(a, b);
        assert_eq!(a.actor.seeds_carried(), 0);
        assert!(a.seeds.is_empty() && a.plants.is_empty());
        assert_eq!(a.actor.x, 40.0);
        assert!((a.actor.y - (440.0 * 0.72 - 18.0)).abs() < 1e-9);
    }

    #[test]
    fn release_without_seeds_is_refused() {
        let mut actor = Actor::new(0.0, 0.0, 12.0);
        assert!(!actor.release_seed());
        assert_eq!(actor.seeds_carried(), 0);
        actor.pick_seed();
        assert!(actor.release_seed());
        assert_eq!(actor.seeds_carried(), 0);
    }

    #[test]
    fn seed_sprouts_once_past_threshold() {
        let mut seed = Seed::dropped_at(10.0, 20.0);
        assert!(seed.grow(2.5, 2.5).is_none());
        let plant = seed.grow(0.01, 2.5).expect("should sprout");
        assert_eq!(plant, Plant { x: 10.0, y: 20.0 });
        assert!(seed.sprouted());
        let age = seed.age();
        assert!(seed.grow(1.0, 2.5).is_none());
        assert!(seed.sprouted());
        assert_eq!(seed.age(), age);
    }

    #[test]
    fn speed_is_clamped() {
        let mut controls = Controls::default();
        assert_eq!(controls.speed_kph(), 40);
        controls.set_speed_kph(200);
        assert_eq!(controls.speed_kph(), 80);
        controls.set_speed_kph(-3);
        assert_eq!(controls.speed_kph(), 5);
        controls.set_speed_kph(55);
        assert_eq!(controls.speed_kph(), 55);
    }
}
