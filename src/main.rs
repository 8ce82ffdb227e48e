use std::ffi::OsString;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use color_eyre::Result;
use statwatch::config::{self, load_config, load_config_from_path};
use statwatch::logging;

#[derive(Parser, Debug)]
#[command(
    name = "statwatch",
    about = "Samples memory, CPU and user sessions at a fixed interval"
)]
struct Cli {
    /// Number of samples (same as --samples)
    #[arg(value_name = "SAMPLES")]
    samples_pos: Option<usize>,

    /// Seconds between samples (same as --tdelay)
    #[arg(value_name = "TDELAY")]
    tdelay_pos: Option<u64>,

    /// Number of samples to take
    #[arg(long)]
    samples: Option<usize>,

    /// Seconds between samples
    #[arg(long)]
    tdelay: Option<u64>,

    /// Show the memory and CPU panels
    #[arg(short = 's', long)]
    system: bool,

    /// Show the sessions panel
    #[arg(short = 'u', long)]
    user: bool,

    /// Draw ASCII history graphics
    #[arg(short = 'g', long)]
    graphics: bool,

    /// Print each round below the previous one instead of redrawing
    #[arg(long, visible_alias = "seq")]
    sequential: bool,

    /// Path to config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write JSON logs to this file
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    color_eyre::install()?;

    let cli = Cli::parse_from(normalize_args(std::env::args_os()));
    let config = load_config_for_cli(&cli);
    logging::init_tracing_json(&config.logging)?;

    let monitor = match config.general.monitor() {
        Ok(monitor) => monitor,
        Err(err) => {
            eprintln!("Error: {err}");
            return Ok(ExitCode::FAILURE);
        }
    };

    Ok(statwatch::run(monitor).await)
}

/// Accepts the single-dash `-seq` spelling that older scripts pass.
fn normalize_args<I: IntoIterator<Item = OsString>>(args: I) -> Vec<OsString> {
    args.into_iter()
        .map(|arg| if arg == "-seq" { OsString::from("--seq") } else { arg })
        .collect()
}

fn load_config_for_cli(cli: &Cli) -> config::Config {
    let mut config = match &cli.config {
        Some(path) => load_config_from_path(path),
        None => load_config(),
    };

    if let Some(samples) = cli.samples.or(cli.samples_pos) {
        config.general.samples = samples;
    }
    if let Some(tdelay) = cli.tdelay.or(cli.tdelay_pos) {
        config.general.tdelay_secs = tdelay;
    }
    // Naming only one panel hides the other.
    if cli.system || cli.user {
        config.general.show_system = cli.system;
        config.general.show_user = cli.user;
    }
    config.general.graphics |= cli.graphics;
    config.general.sequential |= cli.sequential;
    if let Some(path) = &cli.log_file {
        config.logging.file = Some(path.clone());
    }

    config
}
