//! ---
//! ems_section: "01-core-functionality"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Shared primitives and utilities for the core runtime."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
use chrono::{Local, Timelike, Utc};

/// Source of wall-clock readings for snapshot assembly.
pub trait WallClock {
    /// Milliseconds since the Unix epoch.
    fn unix_millis(&self) -> i64;

    /// Hour of day (0-23) in the local timezone.
    fn local_hour(&self) -> u32;
}

/// Reads the host clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl WallClock for SystemClock {
    fn unix_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }

    fn local_hour(&self) -> u32 {
        Local::now().hour()
    }
}

/// Clock pinned to a fixed instant and hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock {
    pub unix_millis: i64,
    pub local_hour: u32,
}

impl FixedClock {
    pub fn new(unix_millis: i64, local_hour: u32) -> Self {
        Self {
            unix_millis,
            local_hour: local_hour % 24,
        }
    }
}

impl WallClock for FixedClock {
    fn unix_millis(&self) -> i64 {
        self.unix_millis
    }

    fn local_hour(&self) -> u32 {
        self.local_hour
    }
}
