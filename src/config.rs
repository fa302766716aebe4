use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::{fmt::Debug, fs, ops::RangeBounds, path::Path};

/// Simulation configuration parameters.
///
/// Every field has a default, so a TOML file only needs to list the values
/// it changes. See [`Config::from_file`] for loading.
#[derive(Debug, PartialEq, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub layout: LayoutConfig,
    pub motion: MotionConfig,
    pub dispersal: DispersalConfig,
    pub growth: GrowthConfig,
}

/// Geometry of the drawing surface and the landscape on it.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutConfig {
    /// Surface width in logical units.
    pub width: f64,
    /// Surface height in logical units.
    pub height: f64,
    /// Ground line as a fraction of the surface height.
    pub ground_frac: f64,
    /// River line as a fraction of the surface height.
    pub river_frac: f64,
}

/// Actor geometry and kinematics.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MotionConfig {
    /// Horizontal start position.
    pub start_x: f64,
    /// Height of the actor's centre above the ground line.
    pub ground_offset: f64,
    /// Body radius.
    pub radius: f64,
    /// Distance past either edge at which the actor wraps around.
    pub wrap_margin: f64,
    /// Reference speed (km/h) for the pixel velocity mapping.
    pub ref_speed_kph: f64,
    /// Pixel velocity (px/s) reached at the reference speed.
    pub ref_speed_px: f64,
}

/// Per-tick pickup and drop stochastics.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DispersalConfig {
    /// Probability per land tick of picking up one seed.
    pub prob_pickup: f64,
    /// Probability per land tick of dropping one seed.
    pub prob_drop_land: f64,
    /// Probability per swim tick of dropping one seed.
    pub prob_drop_swim: f64,
    /// Width of the horizontal drop jitter on land.
    pub spread_land: f64,
    /// Width of the horizontal drop jitter while swimming.
    pub spread_swim: f64,
    /// Forward offset added to drops while swimming.
    pub swim_forward: f64,
    /// Distance below the river line at which swim drops land.
    pub swim_drop_depth: f64,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GrowthConfig {
    /// Seed age (s) after which a seed sprouts.
    pub maturation: f64,
    /// Largest time step (s) a single tick may advance.
    pub max_dt: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            width: 640.0,
            height: 440.0,
            ground_frac: 0.72,
            river_frac: 0.38,
        }
    }
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            start_x: 40.0,
            ground_offset: 18.0,
            radius: 12.0,
            wrap_margin: 40.0,
            ref_speed_kph: 80.0,
            ref_speed_px: 280.0,
        }
    }
}

impl Default for DispersalConfig {
    fn default() -> Self {
        Self {
            prob_pickup: 0.05,
            prob_drop_land: 0.06,
            prob_drop_swim: 0.03,
            spread_land: 14.0,
            spread_swim: 30.0,
            swim_forward: 26.0,
            swim_drop_depth: 30.0,
        }
    }
}

impl Default for GrowthConfig {
    fn default() -> Self {
        Self {
            maturation: 2.5,
            max_dt: 0.05,
        }
    }
}

impl LayoutConfig {
    /// Ground line of a surface `height` pixels tall.
    pub fn ground_y(&self, height: f64) -> f64 {
        height * self.ground_frac
    }

    /// River line of a surface `height` pixels tall.
    pub fn river_y(&self, height: f64) -> f64 {
        height * self.river_frac
    }
}

impl Config {
    /// Load a [`Config`] from a TOML file.
    ///
    /// Missing sections and fields take their default values.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, deserialized,
    /// or if the configuration values are invalid.
    pub fn from_file<P: AsRef<Path>>(file: P) -> Result<Self> {
        let file = file.as_ref();
        let contents =
            fs::read_to_string(file).with_context(|| format!("failed to read {file:?}"))?;
        Self::from_toml(&contents)
    }

    /// Parse and validate a [`Config`] from a TOML string.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents).context("failed to deserialize config")?;
        config.validate().context("failed to validate config")?;
        Ok(config)
    }

    /// Serialize the configuration back to TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string(self).context("failed to serialize config")
    }

    pub fn validate(&self) -> Result<()> {
        let layout = &self.layout;
        check_num(layout.width, 1.0..=8192.0).context("invalid surface width")?;
        check_num(layout.height, 1.0..=8192.0).context("invalid surface height")?;
        check_num(layout.ground_frac, 0.0..=1.0).context("invalid ground line")?;
        check_num(layout.river_frac, 0.0..=1.0).context("invalid river line")?;

        let motion = &self.motion;
        check_num(motion.start_x, 0.0..=layout.width).context("invalid start position")?;
        check_num(motion.ground_offset, 0.0..=layout.height).context("invalid ground offset")?;
        check_num(motion.radius, 0.0..=layout.height).context("invalid actor radius")?;
        check_num(motion.wrap_margin, 0.0..=layout.width).context("invalid wrap margin")?;
        check_num(motion.ref_speed_kph, 1.0..=1000.0).context("invalid reference speed")?;
        check_num(motion.ref_speed_px, 0.0..=10_000.0).context("invalid reference velocity")?;

        let disp = &self.dispersal;
        check_num(disp.prob_pickup, 0.0..=1.0).context("invalid pickup probability")?;
        check_num(disp.prob_drop_land, 0.0..=1.0).context("invalid land drop probability")?;
        check_num(disp.prob_drop_swim, 0.0..=1.0).context("invalid swim drop probability")?;
        check_spread(disp.spread_land).context("invalid land spread")?;
        check_spread(disp.spread_swim).context("invalid swim spread")?;
        check_num(disp.swim_forward, -layout.width..=layout.width)
            .context("invalid swim forward offset")?;
        check_num(disp.swim_drop_depth, -layout.height..=layout.height)
            .context("invalid swim drop depth")?;

        let growth = &self.growth;
        check_num(growth.maturation, 0.0..=3600.0).context("invalid maturation threshold")?;
        check_num(growth.max_dt, 0.001..=1.0).context("invalid maximum time step")?;

        Ok(())
    }
}

fn check_num<T, R>(num: T, range: R) -> Result<()>
where
    T: PartialOrd + Debug,
    R: RangeBounds<T> + Debug,
{
    if !range.contains(&num) {
        bail!("number must be in the range {range:?}, but is {num:?}");
    }
    Ok(())
}

fn check_spread(spread: f64) -> Result<()> {
    // Uniform sampling needs a non-empty interval.
    if !(spread > 0.0 && spread.is_finite()) {
        bail!("spread must be positive, but is {spread:?}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        Config::default().validate().expect("defaults must validate");
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let cfg = Config::from_toml("[growth]\nmaturation = 1.0\n").expect("valid config");
        assert_eq!(cfg.growth.maturation, 1.0);
        assert_eq!(cfg.growth.max_dt, 0.05);
        assert_eq!(cfg.layout, LayoutConfig::default());
    }

    #[test]
    fn rejects_bad_probability() {
        let err = Config::from_toml("[dispersal]\nprob_pickup = 1.5\n").unwrap_err();
        assert!(format!("{err:#}").contains("invalid pickup probability"));
    }

    #[test]
    fn rejects_unknown_field() {
        assert!(Config::from_toml("[motion]\nwings = 2\n").is_err());
    }

    #[test]
    fn toml_roundtrip_of_defaults() {
        let text = Config::default().to_toml().expect("serializable");
        assert_eq!(Config::from_toml(&text).expect("parsable"), Config::default());
    }

    #[test]
    fn derived_lines() {
        let layout = LayoutConfig::default();
        assert!((layout.ground_y(layout.height) - 316.8).abs() < 1e-9);
        assert!((layout.river_y(layout.height) - 167.2).abs() < 1e-9);
        assert!((layout.ground_y(880.0) - 633.6).abs() < 1e-9);
    }
}
