//! ---
//! ems_section: "11-simulation-test-harness"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Telemetry snapshot record and single-file writer."
//! ems_version: "v0.1.0"
//! ems_owner: "tbd"
//! ---
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use r_ems_common::time::WallClock;
use serde::{Deserialize, Serialize};

use crate::signals;

/// Result alias used by the snapshot writer.
pub type Result<T> = std::result::Result<T, SnapshotError>;

/// Failure to persist a snapshot.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// The output file could not be opened, written or flushed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// The snapshot could not be encoded.
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Readings captured for one tick. Field order is the on-disk key order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySnapshot {
    /// Unix epoch milliseconds at capture time.
    pub timestamp: i64,
    pub gpu_power_w: u64,
    pub gpu_temp_c: u64,
    pub vram_bandwidth_gbs: u64,
    pub vram_efficiency_pct: f64,
    #[serde(rename = "carbon_intensity_gCO2_kWh")]
    pub carbon_intensity_gco2_kwh: f64,
}

impl TelemetrySnapshot {
    /// Compute every signal for `tick` and stamp the result with `clock`.
    pub fn capture<C: WallClock>(tick: u64, clock: &C) -> Self {
        Self {
            gpu_power_w: signals::power_draw_w(tick),
            gpu_temp_c: signals::temperature_c(tick),
            vram_bandwidth_gbs: signals::vram_bandwidth_gbs(tick),
            vram_efficiency_pct: signals::vram_efficiency_pct(tick),
            carbon_intensity_gco2_kwh: signals::carbon_intensity_g_per_kwh(
                tick,
                clock.local_hour(),
            ),
            timestamp: clock.unix_millis(),
        }
    }
}

impl fmt::Display for TelemetrySnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Power: {}W, Temp: {}C, VRAM BW: {}GB/s ({}% Eff), Grid: {}gCO2/kWh",
            self.gpu_power_w,
            self.gpu_temp_c,
            self.vram_bandwidth_gbs,
            self.vram_efficiency_pct,
            self.carbon_intensity_gco2_kwh
        )
    }
}

/// Overwrite `path` with the pretty-printed JSON encoding of `snapshot`.
///
/// Existing content is truncated. Missing parent directories are an error;
/// they are never created here.
pub fn write_snapshot(snapshot: &TelemetrySnapshot, path: &Path) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, snapshot)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}
