//! ---
//! ems_section: "01-core-functionality"
//! ems_subsection: "binary"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Binary entrypoint for the hardware telemetry simulator daemon."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use r_ems_common::config::{AppConfig, LoadedAppConfig};
use r_ems_common::logging::init_tracing;
use r_ems_hwsim::TelemetryEmitter;
use tokio::signal;
use tokio::sync::broadcast;
use tracing::{info, warn};

const SERVICE_NAME: &str = "r-ems-hwtelemd";
const DEFAULT_CONFIG: &str = "configs/hwsim.toml";

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Simulated GPU and grid carbon-intensity telemetry writer",
    long_about = None
)]
struct Cli {
    /// Path to a configuration file. Built-in defaults apply when omitted and
    /// configs/hwsim.toml does not exist.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Stop after this many ticks instead of running until interrupted
    #[arg(long)]
    max_ticks: Option<u64>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let loaded = load_config(&cli)?;
    let config = loaded.config;
    init_tracing(SERVICE_NAME, &config.logging)?;

    match &loaded.source {
        Some(path) => info!(config_path = %path.display(), "configuration loaded"),
        None => info!("no configuration file found; using built-in defaults"),
    }
    info!(
        path = %config.output.path.display(),
        interval_ms = config.emitter.interval.as_millis() as u64,
        "starting hardware telemetry pipeline"
    );

    let mut emitter = TelemetryEmitter::from_config(&config);
    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    tokio::spawn(async move {
        match signal::ctrl_c().await {
            Ok(()) => info!("ctrl-c received; shutting down"),
            Err(err) => warn!(error = %err, "unable to listen for ctrl-c; shutting down"),
        }
        let _ = shutdown_tx.send(());
    });

    let ticks = emitter.run(shutdown_rx).await;
    info!(ticks, "telemetry emitter stopped");
    Ok(())
}

/// An explicit `--config` must exist; otherwise the default location is
/// optional.
fn load_config(cli: &Cli) -> Result<LoadedAppConfig> {
    let mut loaded = match &cli.config {
        Some(path) => AppConfig::load_with_source(&[path.clone()])?,
        None => AppConfig::load_or_default(&[PathBuf::from(DEFAULT_CONFIG)])?,
    };
    if let Some(limit) = cli.max_ticks {
        loaded.config.emitter.max_ticks = Some(limit);
    }
    Ok(loaded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn cli_accepts_no_arguments() {
        let cli = Cli::try_parse_from(["r-ems-hwtelemd"]).unwrap();
        assert!(cli.config.is_none());
        assert!(cli.max_ticks.is_none());
    }

    #[test]
    fn explicit_config_must_exist() {
        let cli = Cli::try_parse_from([
            "r-ems-hwtelemd",
            "--config",
            "definitely/missing/hwsim.toml",
        ])
        .unwrap();
        assert!(load_config(&cli).is_err());
    }

    #[test]
    fn explicit_config_is_loaded_and_limit_overrides() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[device]\nindex = 4\n\n[emitter]\nmax_ticks = 100").unwrap();
        file.flush().unwrap();
        let path = file.path().to_str().unwrap().to_owned();

        let cli = Cli::try_parse_from(["r-ems-hwtelemd", "--config", &path, "--max-ticks", "7"])
            .unwrap();
        let loaded = load_config(&cli).unwrap();
        assert_eq!(loaded.config.device.index, 4);
        assert_eq!(loaded.config.emitter.max_ticks, Some(7));
        assert_eq!(loaded.source.as_deref(), Some(file.path()));
    }
}
