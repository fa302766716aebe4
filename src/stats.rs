use crate::config::Config;
use crate::model::World;
use serde::{Deserialize, Serialize};

/// Streaming mean and variance (Welford's algorithm).
#[derive(Debug, Default, Clone)]
pub struct Accumulator {
    n_vals: usize,
    mean: f64,
    diff_2_sum: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AccumulatorReport {
    pub mean: f64,
    pub std_dev: f64,
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, val: f64) {
        self.n_vals += 1;

        let diff_a = val - self.mean;
        self.mean += diff_a / self.n_vals as f64;

        let diff_b = val - self.mean;
        self.diff_2_sum += diff_a * diff_b;
    }

    pub fn report(&self) -> AccumulatorReport {
        AccumulatorReport {
            mean: if self.n_vals > 0 { self.mean } else { f64::NAN },
            std_dev: if self.n_vals > 1 {
                (self.diff_2_sum / (self.n_vals as f64 - 1.0)).sqrt()
            } else {
                f64::NAN
            },
        }
    }
}

/// Snapshot summary of how far the seeds have spread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Census {
    pub ticks: u64,
    pub seeds_carried: u32,
    pub n_seeds: usize,
    pub n_sprouted: usize,
    pub n_plants: usize,
    /// Plants grown from seeds dropped while swimming.
    pub n_river_plants: usize,
    /// Horizontal distribution of the plants.
    pub plant_x: AccumulatorReport,
}

impl Census {
    pub fn of(world: &World, cfg: &Config) -> Self {
        // Land drops fall at the deer's feet, below its land line; swim
        // drops land above it.
        let land_line = cfg.layout.ground_y(world.height) - cfg.motion.ground_offset;

        let mut plant_x = Accumulator::new();
        let mut n_river_plants = 0;
        for plant in &world.plants {
            plant_x.add(plant.x);
            if plant.y < land_line {
                n_river_plants += 1;
            }
        }

        Self {
            ticks: world.ticks,
            seeds_carried: world.actor.seeds_carried(),
            n_seeds: world.seeds.len(),
            n_sprouted: world.n_sprouted(),
            n_plants: world.plants.len(),
            n_river_plants,
            plant_x: plant_x.report(),
        }
    }
}
