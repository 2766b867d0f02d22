//! Output configuration
//!
//! The node drives its channel buffer out through one of two strategies:
//! a handful of duty-cycle (PWM) outputs, or a full DMX512 serial line.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::buffer::DMX_CHANNELS;
use crate::error::{CoreError, Result};

/// Upper bound for duty-cycle outputs on supported hardware
pub const MAX_DUTY_CHANNELS: usize = 8;

/// Output subsystem configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Disabled output keeps the network side running without a driver
    pub enabled: bool,
    /// Selected output strategy
    pub strategy: OutputStrategy,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            strategy: OutputStrategy::Duty(DutyConfig::default()),
        }
    }
}

impl OutputConfig {
    /// Validate the selected strategy
    pub fn validate(&self) -> Result<()> {
        match &self.strategy {
            OutputStrategy::Duty(duty) => duty.validate(),
            OutputStrategy::Serial(serial) => serial.timing.validate(),
        }
    }
}

/// Output strategy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum OutputStrategy {
    /// Map a window of channels onto PWM outputs
    Duty(DutyConfig),
    /// Continuous DMX512 serial refresh
    Serial(SerialConfig),
}

/// Duty-cycle output settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DutyConfig {
    /// Number of PWM outputs (K)
    pub channels: usize,
    /// How often the buffer is checked for changes
    pub refresh_interval_ms: u64,
    /// Where duty values are written
    pub sink: DutySinkKind,
}

impl Default for DutyConfig {
    fn default() -> Self {
        Self {
            channels: 3,
            refresh_interval_ms: 10,
            sink: DutySinkKind::Log,
        }
    }
}

impl DutyConfig {
    /// Refresh interval as a [`Duration`]
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms.max(1))
    }

    pub fn validate(&self) -> Result<()> {
        if self.channels == 0 || self.channels > MAX_DUTY_CHANNELS {
            return Err(CoreError::InvalidOutput(format!(
                "duty channel count {} out of range (1-{})",
                self.channels, MAX_DUTY_CHANNELS
            )));
        }
        Ok(())
    }
}

/// Duty-cycle sink selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DutySinkKind {
    /// Log duty values instead of driving hardware
    Log,
    /// Linux sysfs PWM chip, one `pwmN` per output
    Sysfs {
        /// e.g. `/sys/class/pwm/pwmchip0`
        chip: PathBuf,
        /// PWM period in nanoseconds
        period_ns: u64,
    },
}

/// Serial DMX512 settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SerialConfig {
    pub timing: DmxTiming,
    pub sink: SerialSinkKind,
}

/// Serial sink selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub enum SerialSinkKind {
    /// Log frame summaries instead of driving hardware
    #[default]
    Log,
    /// A UART device with break support, e.g. `/dev/ttyUSB0`
    Port { path: String },
}

/// DMX512 line timing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DmxTiming {
    /// Break (line held low), microseconds
    pub break_us: u32,
    /// Mark after break (line held high), microseconds
    pub mark_after_break_us: u32,
    /// Idle gap after each slot, microseconds
    pub slot_gap_us: u32,
    /// Target refresh rate
    pub refresh_hz: u32,
    /// Number of slots sent after the start code
    pub channel_count: u16,
}

impl Default for DmxTiming {
    fn default() -> Self {
        Self {
            break_us: Self::MIN_BREAK_US,
            mark_after_break_us: 54,
            slot_gap_us: 6,
            refresh_hz: 44,
            channel_count: DMX_CHANNELS as u16,
        }
    }
}

impl DmxTiming {
    /// Minimum break a receiver must see
    pub const MIN_BREAK_US: u32 = 176;
    /// Minimum mark after break
    pub const MIN_MARK_US: u32 = 8;
    /// One slot at 250 kbaud: start bit, 8 data bits, 2 stop bits
    pub const SLOT_TIME_US: u32 = 44;
    /// Longest idle time DMX512 allows between slots
    pub const MAX_SLOT_GAP_US: u32 = 1_000_000;

    pub fn validate(&self) -> Result<()> {
        if self.break_us < Self::MIN_BREAK_US {
            return Err(CoreError::InvalidTiming(format!(
                "break {}us is shorter than {}us",
                self.break_us,
                Self::MIN_BREAK_US
            )));
        }
        if self.mark_after_break_us < Self::MIN_MARK_US {
            return Err(CoreError::InvalidTiming(format!(
                "mark after break {}us is shorter than {}us",
                self.mark_after_break_us,
                Self::MIN_MARK_US
            )));
        }
        if self.slot_gap_us >= Self::MAX_SLOT_GAP_US {
            return Err(CoreError::InvalidTiming(format!(
                "slot gap {}us must be shorter than {}us",
                self.slot_gap_us,
                Self::MAX_SLOT_GAP_US
            )));
        }
        if self.refresh_hz == 0 {
            return Err(CoreError::InvalidTiming(
                "refresh rate must be non-zero".to_string(),
            ));
        }
        if self.channel_count == 0 || self.channel_count as usize > DMX_CHANNELS {
            return Err(CoreError::InvalidTiming(format!(
                "channel count {} out of range (1-512)",
                self.channel_count
            )));
        }
        Ok(())
    }

    pub fn break_duration(&self) -> Duration {
        Duration::from_micros(self.break_us as u64)
    }

    pub fn mark_duration(&self) -> Duration {
        Duration::from_micros(self.mark_after_break_us as u64)
    }

    pub fn slot_gap(&self) -> Duration {
        Duration::from_micros(self.slot_gap_us as u64)
    }

    /// Shortest possible frame: break + mark + (start code + slots) × slot
    pub fn min_frame_duration(&self) -> Duration {
        let slots = 1 + self.channel_count as u64;
        let slot = Self::SLOT_TIME_US as u64 + self.slot_gap_us as u64;
        Duration::from_micros(
            self.break_us as u64 + self.mark_after_break_us as u64 + slots * slot,
        )
    }

    /// Cycle period: the refresh target, never shorter than one frame
    pub fn frame_period(&self) -> Duration {
        let target = Duration::from_micros(1_000_000 / self.refresh_hz.max(1) as u64);
        target.max(self.min_frame_duration())
    }
}
