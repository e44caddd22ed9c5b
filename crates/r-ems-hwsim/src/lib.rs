//! ---
//! ems_section: "11-simulation"
//! ems_subsection: "01-bootstrap"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Hardware telemetry simulator module exports and shared types."
//! ems_version: "v0.1.0"
//! ems_owner: "tbd"
//! ---
//! Synthetic hardware telemetry for the R-EMS project.
//!
//! [`signals`] fabricates GPU power, temperature, VRAM and grid carbon
//! intensity readings from a tick counter. [`snapshot`] turns one tick into a
//! JSON record and overwrites the output file with it. [`emitter`] drives the
//! fixed-interval loop until it is told to stop.

pub mod emitter;
pub mod signals;
pub mod snapshot;

pub use emitter::{IterationOutcome, TelemetryEmitter, TelemetrySink, TracingSink};
pub use signals::DayPart;
pub use snapshot::{write_snapshot, Result, SnapshotError, TelemetrySnapshot};
