use crate::clock::{Clock, FixedRateClock, SystemClock};
use crate::config::Config;
use crate::controller::LoopController;
use crate::engine::Engine;
use crate::scheduler::FrameQueue;
use crate::stats::Census;
use crate::surface::{NullSurface, Surface};
use crate::svg::SvgSurface;
use anyhow::{Context, Result, anyhow, bail};
use std::{
    fs::File,
    io::BufWriter,
    path::{Path, PathBuf},
    str::FromStr,
    thread,
    time::Duration,
};

/// A control-surface interaction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    Start,
    Stop,
    ToggleSwim,
    Swim(bool),
    Reset,
    Speed(i64),
}

/// An [`Action`] applied at a given clock time (s).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlEvent {
    pub at: f64,
    pub action: Action,
}

impl FromStr for Action {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let action = match s.split_once('=') {
            None => match s {
                "start" => Action::Start,
                "stop" => Action::Stop,
                "swim" => Action::ToggleSwim,
                "reset" => Action::Reset,
                _ => bail!("unknown action {s:?}"),
            },
            Some(("swim", "on")) => Action::Swim(true),
            Some(("swim", "off")) => Action::Swim(false),
            Some(("speed", val)) => {
                let speed = val
                    .parse()
                    .with_context(|| format!("invalid speed {val:?}"))?;
                Action::Speed(speed)
            }
            Some(_) => bail!("unknown action {s:?}"),
        };
        Ok(action)
    }
}

impl FromStr for ControlEvent {
    type Err = anyhow::Error;

    /// Parse `TIME:ACTION`, e.g. `1.5:swim=on` or `3:speed=60`.
    fn from_str(s: &str) -> Result<Self> {
        let (at, action) = s
            .split_once(':')
            .ok_or_else(|| anyhow!("expected TIME:ACTION, got {s:?}"))?;
        let at: f64 = at
            .trim()
            .parse()
            .with_context(|| format!("invalid event time {at:?}"))?;
        if !(at >= 0.0 && at.is_finite()) {
            bail!("event time must be non-negative, but is {at}");
        }
        let action = action.trim().parse()?;
        Ok(Self { at, action })
    }
}

/// Options of a headless session.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Clock time to simulate (s).
    pub seconds: f64,
    /// Display refresh rate (Hz).
    pub fps: f64,
    pub speed_kph: i64,
    pub swim: bool,
    pub events: Vec<ControlEvent>,
    /// Where to write the last presented frame.
    pub out: Option<PathBuf>,
    /// Pace frames against the wall clock.
    pub realtime: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            seconds: 10.0,
            fps: 60.0,
            speed_kph: crate::model::DEFAULT_SPEED_KPH as i64,
            swim: false,
            events: Vec::new(),
            out: None,
            realtime: false,
        }
    }
}

/// Runs simulation sessions for the command line.
pub struct Manager {
    cfg: Config,
}

impl Manager {
    pub fn new(cfg: Config) -> Self {
        Self { cfg }
    }

    pub fn from_file<P: AsRef<Path>>(file: P) -> Result<Self> {
        let cfg = Config::from_file(file).context("failed to construct cfg")?;
        log::info!("{cfg:#?}");
        Ok(Self::new(cfg))
    }

    pub fn cfg(&self) -> &Config {
        &self.cfg
    }

    /// Mount the simulation, start it at t = 0 and drive it for
    /// `opts.seconds` of clock time, applying the scheduled control events.
    pub fn run_session(&self, opts: &RunOptions) -> Result<Census> {
        if !(opts.fps > 0.0 && opts.fps.is_finite()) {
            bail!("frame rate must be positive, but is {}", opts.fps);
        }
        if !(opts.seconds >= 0.0 && opts.seconds.is_finite()) {
            bail!("duration must be non-negative, but is {}", opts.seconds);
        }

        let engine = Engine::new(self.cfg.clone()).context("failed to construct engine")?;
        let mut ctl = LoopController::new(engine, FrameQueue::new());

        let target = open_target(opts.out.as_deref());
        let mut svg = SvgSurface::new();
        let mut null = NullSurface;
        let surface: &mut dyn Surface = match target {
            Some(_) => &mut svg,
            None => &mut null,
        };

        ctl.set_speed(opts.speed_kph);
        ctl.set_swim(opts.swim, &mut *surface);
        ctl.start(0.0);

        let mut events = opts.events.clone();
        events.sort_by(|a, b| a.at.total_cmp(&b.at));
        let mut events = events.into_iter().peekable();

        let mut sim_clock = FixedRateClock::new(opts.fps);
        let wall_clock = SystemClock::new();
        let n_frames = (opts.seconds * opts.fps).round() as u64;

        for _ in 0..n_frames {
            sim_clock.advance();
            let now = if opts.realtime {
                let ahead = sim_clock.now() - wall_clock.now();
                if ahead > 0.0 {
                    thread::sleep(Duration::from_secs_f64(ahead));
                }
                wall_clock.now()
            } else {
                sim_clock.now()
            };

            while let Some(event) = events.next_if(|event| event.at <= sim_clock.now()) {
                log::info!("{:.3}s: {:?}", event.at, event.action);
                apply(&mut ctl, event.action, now, &mut *surface);
            }

            for handle in ctl.scheduler_mut().drain() {
                ctl.on_frame(handle, now, &mut *surface);
            }
        }

        let census = Census::of(ctl.world(), &self.cfg);
        log::info!("{census:#?}");

        if let Some(file) = target {
            svg.write_to(&mut BufWriter::new(file))
                .context("failed to write final frame")?;
        }

        Ok(census)
    }

    /// Render the frame shown before the simulation is started.
    pub fn render_initial(&self, swim: bool, out: Option<&Path>) -> Result<()> {
        let engine = Engine::new(self.cfg.clone()).context("failed to construct engine")?;
        let mut ctl = LoopController::new(engine, FrameQueue::new());
        let mut svg = SvgSurface::new();
        ctl.set_swim(swim, &mut svg);

        match out {
            Some(file) => svg.save(file)?,
            None => svg.write_to(&mut std::io::stdout().lock())?,
        }
        Ok(())
    }
}

fn apply(ctl: &mut LoopController<FrameQueue>, action: Action, now: f64, surface: &mut dyn Surface) {
    match action {
        Action::Start => ctl.start(now),
        Action::Stop => ctl.stop(surface),
        Action::ToggleSwim => {
            let swim = !ctl.controls().swim;
            ctl.set_swim(swim, surface);
        }
        Action::Swim(swim) => ctl.set_swim(swim, surface),
        Action::Reset => ctl.reset(surface),
        Action::Speed(speed) => ctl.set_speed(speed),
    }
}

/// Open the output target. An unavailable target disables rendering
/// instead of failing the session.
fn open_target(out: Option<&Path>) -> Option<File> {
    let out = out?;
    match File::create(out) {
        Ok(file) => Some(file),
        Err(error) => {
            log::warn!("cannot open {out:?} ({error}), rendering disabled");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_events() {
        let event: ControlEvent = "1.5:swim=on".parse().expect("valid event");
        assert_eq!(event.at, 1.5);
        assert_eq!(event.action, Action::Swim(true));

        let event: ControlEvent = "3:speed=120".parse().expect("valid event");
        assert_eq!(event.action, Action::Speed(120));

        let event: ControlEvent = " 0 : reset".parse().expect("valid event");
        assert_eq!(event.action, Action::Reset);

        assert!("reset".parse::<ControlEvent>().is_err());
        assert!("-1:stop".parse::<ControlEvent>().is_err());
        assert!("1:fly".parse::<ControlEvent>().is_err());
        assert!("1:speed=fast".parse::<ControlEvent>().is_err());
    }

    #[test]
    fn session_scenario_without_target() {
        let mgr = Manager::new(Config::default());
        let opts = RunOptions {
            seconds: 3.0,
            fps: 20.0,
            ..RunOptions::default()
        };
        let census = mgr.run_session(&opts).expect("session runs");
        assert_eq!(census.ticks, 60);
        assert_eq!(census.n_plants, census.n_sprouted);
    }

    #[test]
    fn reset_event_clears_world() {
        let mgr = Manager::new(Config::default());
        let opts = RunOptions {
            seconds: 4.0,
            fps: 4.0,
            events: vec!["3.5:reset".parse().expect("valid event")],
            ..RunOptions::default()
        };
        let census = mgr.run_session(&opts).expect("session runs");
        // Frames at 3.5, 3.75 and 4.0 s run after the reset.
        assert_eq!(census.ticks, 3);
        assert_eq!(census.n_plants, 0);
    }

    #[test]
    fn stop_event_freezes_world() {
        let mgr = Manager::new(Config::default());
        let opts = RunOptions {
            seconds: 2.0,
            fps: 4.0,
            events: vec!["1:stop".parse().expect("valid event")],
            ..RunOptions::default()
        };
        let census = mgr.run_session(&opts).expect("session runs");
        assert_eq!(census.ticks, 3);
    }

    #[test]
    fn unavailable_target_does_not_fail() {
        let mgr = Manager::new(Config::default());
        let opts = RunOptions {
            seconds: 0.5,
            out: Some(PathBuf::from("/nonexistent-dir/frame.svg")),
            ..RunOptions::default()
        };
        assert!(mgr.run_session(&opts).is_ok());
    }
}
