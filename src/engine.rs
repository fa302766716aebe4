use crate::config::Config;
use crate::model::{Controls, Seed, World};
use anyhow::{Context, Result};
use rand::prelude::*;
use rand_chacha::ChaCha12Rng;
use rand_distr::{Bernoulli, Uniform};

/// Simulation engine.
///
/// Holds the configuration, the per-tick distributions and the random
/// number generator. The world itself is owned by the caller and passed in
/// on every step.
pub struct Engine {
    cfg: Config,
    rng: ChaCha12Rng,
    pickup_dist: Bernoulli,
    drop_land_dist: Bernoulli,
    drop_swim_dist: Bernoulli,
    jitter_land_dist: Uniform<f64>,
    jitter_swim_dist: Uniform<f64>,
}

/// What happened during a single step.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StepEvents {
    pub picked: bool,
    pub dropped: bool,
    pub sprouted: usize,
    pub wrapped: bool,
}

impl Engine {
    /// Create a new `Engine` seeded from the operating system.
    pub fn new(cfg: Config) -> Result<Self> {
        let rng = ChaCha12Rng::try_from_os_rng().context("failed to seed rng")?;
        Self::with_rng(cfg, rng)
    }

    /// Create a new `Engine` drawing from the given generator.
    pub fn with_rng(cfg: Config, rng: ChaCha12Rng) -> Result<Self> {
        let disp = &cfg.dispersal;
        let pickup_dist = Bernoulli::new(disp.prob_pickup).context("invalid pickup probability")?;
        let drop_land_dist =
            Bernoulli::new(disp.prob_drop_land).context("invalid land drop probability")?;
        let drop_swim_dist =
            Bernoulli::new(disp.prob_drop_swim).context("invalid swim drop probability")?;
        let jitter_land_dist = jitter_dist(disp.spread_land).context("invalid land spread")?;
        let jitter_swim_dist = jitter_dist(disp.spread_swim).context("invalid swim spread")?;

        Ok(Self {
            cfg,
            rng,
            pickup_dist,
            drop_land_dist,
            drop_swim_dist,
            jitter_land_dist,
            jitter_swim_dist,
        })
    }

    pub fn cfg(&self) -> &Config {
        &self.cfg
    }

    /// Horizontal velocity (px/s) for a speed in km/h.
    pub fn velocity(&self, speed_kph: u32) -> f64 {
        let motion = &self.cfg.motion;
        speed_kph as f64 / motion.ref_speed_kph * motion.ref_speed_px
    }

    /// Advance `world` by `dt` seconds under the given controls.
    ///
    /// Pickup and drop are decided once per call regardless of `dt`.
    pub fn step(&mut self, world: &mut World, dt: f64, controls: &Controls) -> StepEvents {
        let dt = dt.max(0.0);
        let mut events = StepEvents::default();

        let margin = self.cfg.motion.wrap_margin;
        let right_edge = world.width + margin;
        let target_y = if controls.swim {
            self.cfg.layout.river_y(world.height)
        } else {
            self.cfg.layout.ground_y(world.height) - self.cfg.motion.ground_offset
        };

        // Move forward and wrap past the right edge.
        let actor = &mut world.actor;
        actor.vx = self.velocity(controls.speed_kph());
        actor.x += actor.vx * dt;
        if actor.x > right_edge {
            actor.x = -margin;
            events.wrapped = true;
        }

        // Snap to the river or ground line.
        actor.y = target_y;

        // Age seeds and sprout the mature ones.
        let maturation = self.cfg.growth.maturation;
        for seed in &mut world.seeds {
            if let Some(plant) = seed.grow(dt, maturation) {
                world.plants.push(plant);
                events.sprouted += 1;
            }
        }

        events.picked = self.maybe_pick(world, controls);
        events.dropped = self.maybe_drop(world, controls);

        world.ticks += 1;
        events
    }

    fn maybe_pick(&mut self, world: &mut World, controls: &Controls) -> bool {
        if controls.swim || !self.pickup_dist.sample(&mut self.rng) {
            return false;
        }
        world.actor.pick_seed();
        true
    }

    fn maybe_drop(&mut self, world: &mut World, controls: &Controls) -> bool {
        if world.actor.seeds_carried() == 0 {
            return false;
        }
        let drop_dist = if controls.swim {
            &self.drop_swim_dist
        } else {
            &self.drop_land_dist
        };
        if !drop_dist.sample(&mut self.rng) || !world.actor.release_seed() {
            return false;
        }

        let disp = &self.cfg.dispersal;
        let actor = &world.actor;
        let (x, y) = if controls.swim {
            let jitter = self.jitter_swim_dist.sample(&mut self.rng);
            let y = self.cfg.layout.river_y(world.height) + disp.swim_drop_depth;
            (actor.x + jitter + disp.swim_forward, y)
        } else {
            let jitter = self.jitter_land_dist.sample(&mut self.rng);
            (actor.x + jitter, actor.y + actor.radius)
        };
        world.seeds.push(Seed::dropped_at(x, y));
        true
    }
}

fn jitter_dist(spread: f64) -> Result<Uniform<f64>> {
    Ok(Uniform::new(-spread / 2.0, spread / 2.0)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn engine(seed: u64) -> Engine {
        Engine::with_rng(Config::default(), ChaCha12Rng::seed_from_u64(seed))
            .expect("default config is valid")
    }

    fn controls(speed: i64, swim: bool) -> Controls {
        let mut controls = Controls::default();
        controls.set_speed_kph(speed);
        controls.swim = swim;
        controls
    }

    fn certain(mut cfg: Config) -> Config {
        cfg.dispersal.prob_pickup = 1.0;
        cfg.dispersal.prob_drop_land = 1.0;
        cfg.dispersal.prob_drop_swim = 1.0;
        cfg
    }

    #[test]
    fn velocity_maps_reference_speed() {
        let engine = engine(0);
        assert!((engine.velocity(80) - 280.0).abs() < EPS);
        assert!((engine.velocity(40) - 140.0).abs() < EPS);
        assert!((engine.velocity(5) - 17.5).abs() < EPS);
    }

    #[test]
    fn position_advances_linearly() {
        let mut engine = engine(1);
        let cfg = Config::default();
        let controls = controls(60, false);
        for &dt in &[0.0, 0.001, 0.016, 0.05, 0.2] {
            let mut world = World::from_config(&cfg);
            let x0 = world.actor.x;
            engine.step(&mut world, dt, &controls);
            assert!((world.actor.x - (x0 + 210.0 * dt)).abs() < EPS);
        }
    }

    #[test]
    fn wraps_to_negative_margin() {
        let mut engine = engine(2);
        let mut world = World::from_config(&Config::default());
        world.actor.x = 679.0;
        let events = engine.step(&mut world, 0.05, &controls(80, false));
        assert!(events.wrapped);
        assert_eq!(world.actor.x, -40.0);

        world.actor.x = 666.0;
        let events = engine.step(&mut world, 0.05, &controls(80, false));
        assert!(!events.wrapped);
        assert!((world.actor.x - 680.0).abs() < EPS);
    }

    #[test]
    fn swim_toggle_snaps_vertical_position() {
        let mut engine = engine(3);
        let mut world = World::from_config(&Config::default());
        engine.step(&mut world, 0.016, &controls(40, true));
        assert!((world.actor.y - 167.2).abs() < EPS);
        engine.step(&mut world, 0.016, &controls(40, false));
        assert!((world.actor.y - 298.8).abs() < EPS);
    }

    #[test]
    fn no_pickup_while_swimming() {
        let mut engine =
            Engine::with_rng(certain(Config::default()), ChaCha12Rng::seed_from_u64(4))
                .expect("valid config");
        let mut world = World::from_config(&Config::default());
        for _ in 0..20 {
            let events = engine.step(&mut world, 0.016, &controls(40, true));
            assert!(!events.picked && !events.dropped);
        }
        assert_eq!(world.actor.seeds_carried(), 0);
        assert!(world.seeds.is_empty());
    }

    #[test]
    fn drop_positions_follow_mode() {
        let cfg = certain(Config::default());
        let mut engine =
            Engine::with_rng(cfg.clone(), ChaCha12Rng::seed_from_u64(5)).expect("valid config");
        let mut world = World::from_config(&cfg);

        // Certain pickup then certain drop on land.
        let events = engine.step(&mut world, 0.0, &controls(40, false));
        assert!(events.picked && events.dropped);
        let seed = &world.seeds[0];
        assert!((seed.x - world.actor.x).abs() <= 7.0);
        assert!((seed.y - (298.8 + 12.0)).abs() < EPS);

        // Carry one seed into the river.
        world.actor.pick_seed();
        let events = engine.step(&mut world, 0.0, &controls(40, true));
        assert!(events.dropped);
        let seed = &world.seeds[1];
        let offset = seed.x - world.actor.x - 26.0;
        assert!((-15.0..15.0).contains(&offset));
        assert!((seed.y - (167.2 + 30.0)).abs() < EPS);
    }

    /// Observed frequency of `hits` in `n` trials must lie within five
    /// standard errors of `p`.
    fn assert_rate(hits: usize, n: usize, p: f64) {
        let freq = hits as f64 / n as f64;
        let std_err = (p * (1.0 - p) / n as f64).sqrt();
        assert!(
            (freq - p).abs() < 5.0 * std_err,
            "frequency {freq} too far from {p} (std err {std_err})"
        );
    }

    #[test]
    fn dispersal_rates_match_config() {
        const N_TICKS: usize = 200_000;
        let cfg = Config::default();
        let mut engine =
            Engine::with_rng(cfg.clone(), ChaCha12Rng::seed_from_u64(8)).expect("valid config");
        let mut world = World::from_config(&cfg);

        // Land: always carrying, so every tick draws both a pickup and a drop.
        let land = controls(40, false);
        let (mut n_picked, mut n_dropped) = (0, 0);
        for _ in 0..N_TICKS {
            world.actor.pick_seed();
            let events = engine.step(&mut world, 0.0, &land);
            n_picked += events.picked as usize;
            if events.dropped {
                n_dropped += 1;
                let seed = world.seeds.last().expect("dropped seed");
                assert!((seed.x - world.actor.x).abs() <= 7.0 + EPS);
            }
            world.seeds.clear();
        }
        assert_rate(n_picked, N_TICKS, 0.05);
        assert_rate(n_dropped, N_TICKS, 0.06);

        // River: no pickups, drops at half the land rate.
        let swim = controls(40, true);
        let mut n_dropped = 0;
        for _ in 0..N_TICKS {
            world.actor.pick_seed();
            let events = engine.step(&mut world, 0.0, &swim);
            assert!(!events.picked);
            if events.dropped {
                n_dropped += 1;
                let seed = world.seeds.last().expect("dropped seed");
                let offset = seed.x - world.actor.x - 26.0;
                assert!(offset.abs() <= 15.0 + EPS);
            }
            world.seeds.clear();
        }
        assert_rate(n_dropped, N_TICKS, 0.03);
    }

    #[test]
    fn lines_follow_world_height() {
        let cfg = Config::default();
        let mut engine = engine(9);
        let mut world = World::new(640.0, 880.0, &cfg);
        assert!((world.actor.y - (633.6 - 18.0)).abs() < EPS);

        engine.step(&mut world, 0.016, &controls(40, true));
        assert!((world.actor.y - 334.4).abs() < EPS);
        assert!((world.actor.y - cfg.layout.river_y(world.height)).abs() < EPS);
    }

    #[test]
    fn invariants_hold_over_long_run() {
        let mut engine = engine(6);
        let mut world = World::from_config(&Config::default());
        let mut ages: Vec<f64> = Vec::new();
        let mut sprouted: Vec<bool> = Vec::new();

        for tick in 0..3000 {
            let swim = (tick / 200) % 2 == 1;
            let carried_before = world.actor.seeds_carried();
            let events = engine.step(&mut world, 0.016, &controls(70, swim));
            if events.dropped {
                assert!(carried_before > 0 || events.picked);
            }

            for (i_seed, seed) in world.seeds.iter().enumerate() {
                if let Some(&age) = ages.get(i_seed) {
                    assert!(seed.age() >= age);
                    assert!(!sprouted[i_seed] || seed.sprouted());
                }
                assert_eq!(seed.sprouted(), seed.age() > 2.5);
            }
            ages = world.seeds.iter().map(|seed| seed.age()).collect();
            sprouted = world.seeds.iter().map(|seed| seed.sprouted()).collect();

            assert_eq!(world.plants.len(), world.n_sprouted());
        }
        assert!(!world.seeds.is_empty());
        assert!(!world.plants.is_empty());

        for seed in world.seeds.iter().filter(|seed| seed.sprouted()) {
            assert!(
                world
                    .plants
                    .iter()
                    .any(|plant| plant.x == seed.x && plant.y == seed.y)
            );
        }
    }

    #[test]
    fn three_second_scenario() {
        let mut engine = engine(7);
        let mut world = World::from_config(&Config::default());
        let controls = controls(40, false);
        for _ in 0..60 {
            engine.step(&mut world, 0.05, &controls);
        }
        assert_eq!(world.ticks, 60);
        assert!((world.actor.x - 460.0).abs() < 1e-6);
        for seed in &world.seeds {
            assert_eq!(seed.sprouted(), seed.age() > 2.5);
        }
        assert_eq!(world.plants.len(), world.n_sprouted());
    }
}
