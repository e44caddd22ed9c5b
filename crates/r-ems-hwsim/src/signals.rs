//! ---
//! ems_section: "11-simulation-test-harness"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Deterministic oscillating signals for simulated hardware sensors."
//! ems_version: "v0.1.0"
//! ems_owner: "tbd"
//! ---
//! Every signal is a pure function of the tick (carbon intensity also takes
//! the local hour). Integer signals truncate the oscillating term toward zero
//! before adding it to the base.

/// GPU board power in watts, within `[250, 350]`.
pub fn power_draw_w(tick: u64) -> u64 {
    oscillate_int(300.0, 50.0, (0.5 * tick as f64).sin())
}

/// GPU die temperature in degrees Celsius, within `[55, 75]`.
pub fn temperature_c(tick: u64) -> u64 {
    oscillate_int(65.0, 10.0, (0.3 * tick as f64).cos())
}

/// VRAM bandwidth usage in GB/s, within `[1300, 1700]`.
pub fn vram_bandwidth_gbs(tick: u64) -> u64 {
    oscillate_int(1500.0, 200.0, (0.2 * tick as f64).cos())
}

/// HBM efficiency in percent, within `[98.7, 99.9]`.
pub fn vram_efficiency_pct(tick: u64) -> f64 {
    98.7 + 1.2 * (0.05 * tick as f64).sin().abs()
}

/// Grid carbon intensity in gCO2/kWh for the day-part containing `local_hour`.
pub fn carbon_intensity_g_per_kwh(tick: u64, local_hour: u32) -> f64 {
    let part = DayPart::from_hour(local_hour);
    part.base() + part.amplitude() * (0.1 * tick as f64).sin()
}

// The bases are integral and |amplitude * wave| <= amplitude < base, so the
// sum is a non-negative whole number.
fn oscillate_int(base: f64, amplitude: f64, wave: f64) -> u64 {
    (base + (amplitude * wave).trunc()) as u64
}

/// Local-hour band selecting carbon-intensity parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DayPart {
    /// 18:00 through 22:59.
    EveningPeak,
    /// 10:00 through 16:59.
    Daytime,
    /// Every other hour, including 17, 23 and 0 through 9.
    OffPeak,
}

impl DayPart {
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            18..=22 => DayPart::EveningPeak,
            10..=16 => DayPart::Daytime,
            _ => DayPart::OffPeak,
        }
    }

    pub fn base(&self) -> f64 {
        match self {
            DayPart::EveningPeak => 650.0,
            DayPart::Daytime => 350.0,
            DayPart::OffPeak => 450.0,
        }
    }

    pub fn amplitude(&self) -> f64 {
        match self {
            DayPart::EveningPeak => 50.0,
            DayPart::Daytime => 30.0,
            DayPart::OffPeak => 40.0,
        }
    }
}
