//! ---
//! ems_section: "11-simulation-test-harness"
//! ems_subsection: "integration-tests"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Integration tests for the hardware telemetry emitter loop."
//! ems_version: "v0.1.0"
//! ems_owner: "tbd"
//! ---
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use r_ems_common::config::AppConfig;
use r_ems_common::time::{FixedClock, SystemClock};
use r_ems_hwsim::{SnapshotError, TelemetryEmitter, TelemetrySink, TelemetrySnapshot};
use tempfile::tempdir;
use tokio::sync::broadcast;

#[derive(Debug, Default)]
struct CountingSink {
    summaries: usize,
    notes: usize,
    failures: Vec<PathBuf>,
}

impl TelemetrySink for CountingSink {
    fn started(&mut self, _device_index: u32) {}

    fn snapshot(&mut self, _tick: u64, _snapshot: &TelemetrySnapshot) {
        self.summaries += 1;
    }

    fn burst_note(&mut self, _tick: u64) {
        self.notes += 1;
    }

    fn write_failed(&mut self, _tick: u64, path: &Path, _error: &SnapshotError) {
        self.failures.push(path.to_path_buf());
    }
}

fn bounded_config(path: PathBuf, max_ticks: u64) -> AppConfig {
    let mut config = AppConfig::default();
    config.output.path = path;
    config.emitter.interval = Duration::from_millis(2);
    config.emitter.max_ticks = Some(max_ticks);
    config
}

#[tokio::test]
async fn bounded_run_leaves_latest_snapshot_on_disk() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("telemetry_output.json");
    fs::write(&path, "{\"stale\": true, \"padding\": \"".to_owned() + &"x".repeat(512) + "\"}")?;

    let config = bounded_config(path.clone(), 4);
    let mut emitter = TelemetryEmitter::new(&config, CountingSink::default(), SystemClock);
    let (_shutdown_tx, shutdown_rx) = broadcast::channel(1);
    let ticks = emitter.run(shutdown_rx).await;
    assert_eq!(ticks, 4);

    let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path)?)?;
    let object = value.as_object().expect("snapshot is an object");
    let mut keys: Vec<&str> = object.keys().map(String::as_str).collect();
    keys.sort_unstable();
    assert_eq!(
        keys,
        vec![
            "carbon_intensity_gCO2_kWh",
            "gpu_power_w",
            "gpu_temp_c",
            "timestamp",
            "vram_bandwidth_gbs",
            "vram_efficiency_pct",
        ]
    );

    // The file holds the last iteration, computed at tick 3.
    let last = TelemetrySnapshot::capture(3, &FixedClock::new(0, 0));
    assert_eq!(object["gpu_power_w"], last.gpu_power_w);
    assert_eq!(object["gpu_temp_c"], last.gpu_temp_c);
    assert_eq!(object["vram_bandwidth_gbs"], last.vram_bandwidth_gbs);
    assert!(object["timestamp"].as_u64().expect("integer timestamp") > 0);

    let sink = emitter.into_sink();
    assert_eq!(sink.summaries, 4);
    assert_eq!(sink.notes, 4);
    assert!(sink.failures.is_empty());
    Ok(())
}

#[tokio::test]
async fn invalid_path_is_reported_every_iteration_without_stopping() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("absent").join("telemetry_output.json");

    let config = bounded_config(path.clone(), 2);
    let mut emitter = TelemetryEmitter::new(&config, CountingSink::default(), SystemClock);
    let (_shutdown_tx, shutdown_rx) = broadcast::channel(1);
    let ticks = emitter.run(shutdown_rx).await;

    assert_eq!(ticks, 2);
    let sink = emitter.into_sink();
    assert_eq!(sink.failures, vec![path.clone(), path]);
    assert_eq!(sink.summaries, 2);
    assert_eq!(sink.notes, 2);
    Ok(())
}

#[tokio::test]
async fn recovers_once_output_directory_appears() -> Result<()> {
    let dir = tempdir()?;
    let parent = dir.path().join("late");
    let path = parent.join("telemetry_output.json");

    let config = bounded_config(path.clone(), 10);
    let mut emitter = TelemetryEmitter::new(&config, CountingSink::default(), SystemClock);
    assert!(!emitter.step().written());

    fs::create_dir_all(&parent)?;
    let outcome = emitter.step();
    assert!(outcome.written());
    assert_eq!(outcome.tick, 1);
    assert!(path.is_file());
    assert_eq!(emitter.sink().failures.len(), 1);
    Ok(())
}

#[tokio::test]
async fn shutdown_from_another_task_stops_unbounded_run() -> Result<()> {
    let dir = tempdir()?;
    let mut config = AppConfig::default();
    config.output.path = dir.path().join("telemetry_output.json");
    config.emitter.interval = Duration::from_millis(5);

    let mut emitter = TelemetryEmitter::from_config(&config);
    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    let stopper = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(30)).await;
        let _ = shutdown_tx.send(());
    });

    let ticks = emitter.run(shutdown_rx).await;
    stopper.await?;
    assert!(ticks >= 1);
    assert_eq!(ticks, emitter.tick());
    Ok(())
}
