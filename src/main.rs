use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use hiran::config::Config;
use hiran::manager::{ControlEvent, Manager, RunOptions};
use hiran::model::DEFAULT_SPEED_KPH;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(version, about)]
struct CLI {
    /// TOML file overriding the default layout and dispersal parameters.
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the simulation headlessly and print a census of the result.
    Run {
        /// Clock time to simulate, in seconds.
        #[arg(long, default_value_t = 10.0)]
        seconds: f64,

        /// Speed in km/h, clamped to [5, 80].
        #[arg(long, default_value_t = DEFAULT_SPEED_KPH as i64, allow_negative_numbers = true)]
        speed: i64,

        /// Start in swim mode.
        #[arg(long)]
        swim: bool,

        /// Display refresh rate in Hz.
        #[arg(long, default_value_t = 60.0)]
        fps: f64,

        /// Timed control event TIME:ACTION (start, stop, swim, swim=on|off, reset, speed=N).
        #[arg(long = "event")]
        events: Vec<ControlEvent>,

        /// Write the last frame as SVG.
        #[arg(long)]
        out: Option<PathBuf>,

        /// Pace frames against the wall clock.
        #[arg(long)]
        realtime: bool,
    },

    /// Render the initial frame as SVG.
    Frame {
        #[arg(long)]
        swim: bool,

        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Print the default configuration.
    Defaults,
}

fn main() {
    env_logger::Builder::new()
        .format_timestamp_millis()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    if let Err(error) = run_cli() {
        log::error!("{error:#?}");
        std::process::exit(1);
    }
}

fn run_cli() -> Result<()> {
    let args = CLI::parse();
    log::debug!("{args:#?}");

    let mgr = match &args.config {
        Some(file) => Manager::from_file(file).context("failed to construct mgr")?,
        None => Manager::new(Config::default()),
    };

    match args.command {
        Command::Run {
            seconds,
            speed,
            swim,
            fps,
            events,
            out,
            realtime,
        } => {
            let opts = RunOptions {
                seconds,
                fps,
                speed_kph: speed,
                swim,
                events,
                out,
                realtime,
            };
            let census = mgr.run_session(&opts).context("failed to run session")?;
            let report = toml::to_string(&census).context("failed to serialize census")?;
            print!("{report}");
        }
        Command::Frame { swim, out } => mgr.render_initial(swim, out.as_deref())?,
        Command::Defaults => print!("{}", mgr.cfg().to_toml()?),
    }

    Ok(())
}
