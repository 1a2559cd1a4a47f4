use std::path::PathBuf;

use clap::Parser;
use color_eyre::Result;
use meshmock_console::config::{load_config, ConfigFormat};
use meshmock_console::service::MeshSession;
use meshmock_core::MeshConfig;
use meshmock_telemetry::TelemetryHandle;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "meshmock-console",
    version,
    about = "Runs a scripted session against the photonic mesh mock"
)]
struct Cli {
    /// Path to configuration file (TOML or YAML).
    #[arg(long, default_value = "configs/meshmock-console.toml")]
    config: PathBuf,
    /// Explicit configuration format override.
    #[arg(long, value_enum, default_value_t = ConfigFormat::Auto)]
    config_format: ConfigFormat,
    /// Number of sessions to run before exiting.
    #[arg(long, default_value_t = 1)]
    iterations: u16,
    /// Fixed seed for the random result source, overriding the config.
    #[arg(long)]
    seed: Option<u64>,
    /// Seed from operating-system entropy instead.
    #[arg(long, conflicts_with = "seed")]
    entropy: bool,
    /// Emit logs as JSON lines.
    #[arg(long)]
    log_json: bool,
}

fn init_tracing(json: bool) {
    let builder = tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env());
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    let mut config = load_config(&cli.config, cli.config_format)?;
    if let Some(seed) = cli.seed {
        config.mesh = MeshConfig::fixed(seed);
    } else if cli.entropy {
        config.mesh = MeshConfig::entropy();
    }
    tracing::info!(seeding = ?config.mesh.seeding, "mesh session starting");

    let telemetry = TelemetryHandle::from_config(config.telemetry.clone());
    let mut session = MeshSession::new(&config, telemetry.clone());

    for iteration in 0..cli.iterations {
        let report = session.run()?;
        println!(
            "session {} {}",
            iteration + 1,
            serde_json::to_string_pretty(&report)?
        );
    }

    let snapshot = telemetry.flush();
    println!(
        "telemetry counters={:?} readings={:?}",
        snapshot.counters, snapshot.readings
    );
    Ok(())
}
