//! pack-sim: run the battery management loop over a load profile.
//!
//! Usage: `pack-sim [--verbose] [config.json]`
//!
//! Without a config file the default 12S4P pack runs one simulated day of the
//! daily usage cycle. Hourly status goes to the log; the run summary is
//! printed to stdout as JSON.

use std::error::Error;
use std::fs;

use control::{LogSink, SimulationConfig};
use log::{LevelFilter, info};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

fn main() -> Result<(), Box<dyn Error>> {
    let mut verbose = false;
    let mut config_path = None;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "-v" | "--verbose" => verbose = true,
            _ => config_path = Some(arg),
        }
    }

    let level = if verbose { LevelFilter::Debug } else { LevelFilter::Info };
    TermLogger::init(level, Config::default(), TerminalMode::Stderr, ColorChoice::Auto)?;

    let config = match &config_path {
        Some(path) => {
            info!("loading configuration from {path}");
            SimulationConfig::from_json_str(&fs::read_to_string(path)?)?
        }
        None => SimulationConfig::default(),
    };

    let mut bms = config.build()?;
    let snapshot = bms.measure();
    info!(
        "{}S{}P pack, {:.2} V, mean SoC {:.1}%",
        snapshot.series,
        snapshot.parallel,
        snapshot.pack_voltage,
        snapshot.mean_soc * 100.0
    );

    let mut sink = LogSink::hourly(config.run.dt_s);
    let summary = bms.run(&config.run, &config.profile, &mut sink)?;

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
