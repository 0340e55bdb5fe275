//! midiator command-line entry point.

use clap::Parser;
use midiator::{Channel, Config, Result};
use std::path::PathBuf;
use std::process::ExitCode;

/// Drive your keyboard and mouse from a MIDI controller
#[derive(Parser, Debug)]
#[command(name = "midiator")]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file (TOML). The built-in profile is used when omitted
    #[arg(short, long, env = "MIDIATOR_CONFIG")]
    config: Option<PathBuf>,

    /// Case-insensitive substring of the MIDI input port name
    #[arg(short, long)]
    device: Option<String>,

    /// MIDI channel to listen on (0-15)
    #[arg(long, value_parser = parse_channel)]
    channel: Option<Channel>,

    /// Pixels per tick for one held movement note
    #[arg(short, long)]
    sensitivity: Option<f64>,

    /// Only log warnings and errors
    #[arg(short, long)]
    quiet: bool,

    /// Print the available MIDI input ports and exit
    #[arg(long)]
    list_devices: bool,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    print_config: bool,
}

fn parse_channel(s: &str) -> std::result::Result<Channel, String> {
    let number: u8 = s.parse().map_err(|e| format!("{e}"))?;
    Channel::new(number).map_err(|e| e.to_string())
}

impl Args {
    /// Load the config file (or the built-in profile) and apply overrides.
    fn config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)?,
            None => Config::default(),
        };

        if let Some(device) = &self.device {
            config.device = device.clone();
        }
        if let Some(channel) = self.channel {
            config.channel = channel;
        }
        if let Some(sensitivity) = self.sensitivity {
            config.sensitivity = sensitivity;
        }
        if self.quiet {
            config.verbose = false;
        }

        config.validate()?;
        Ok(config)
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { "info" } else { "warn" };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .try_init();
}

fn run(args: &Args) -> Result<()> {
    if args.list_devices {
        for name in midiator::input_port_names()? {
            println!("{name}");
        }
        return Ok(());
    }

    let config = args.config()?;
    if args.print_config {
        print!("{}", config.to_toml_string()?);
        return Ok(());
    }

    init_logging(config.verbose);
    log::info!("midiator v{}", env!("CARGO_PKG_VERSION"));
    midiator::start(&config)?;
    log::info!("midiator stopped");
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
