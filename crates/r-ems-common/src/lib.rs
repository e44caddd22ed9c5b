//! ---
//! ems_section: "01-core-functionality"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Shared primitives and utilities for the core runtime."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
//! Shared primitives for the R-EMS hardware telemetry simulator.
//! This crate exposes configuration loading, logging setup, and the wall
//! clock abstraction consumed by the simulator and its daemon.

pub mod config;
pub mod logging;
pub mod time;

pub use config::{AppConfig, DeviceConfig, EmitterConfig, LoggingConfig, OutputConfig};
pub use logging::{init_tracing, LogFormat};
pub use time::{FixedClock, SystemClock, WallClock};
