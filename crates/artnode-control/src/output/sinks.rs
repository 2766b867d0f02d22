//! Platform sinks
//!
//! - [`LogDutySink`] / [`LogSerialSink`]: no hardware, values go to the log
//! - [`SysfsPwmSink`]: Linux PWM class devices
//! - [`SerialPortSink`]: a UART configured for DMX512 (feature `serial`)

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, trace};

use super::{DutySink, SerialSink};
use crate::error::{ControlError, Result};

/// Duty sink that only logs what it would write
#[derive(Debug, Default)]
pub struct LogDutySink {
    last: Vec<u8>,
    commits: u64,
}

impl LogDutySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Values of the most recent commit
    pub fn last(&self) -> &[u8] {
        &self.last
    }

    pub fn commits(&self) -> u64 {
        self.commits
    }
}

impl DutySink for LogDutySink {
    fn commit(&mut self, duties: &[u8]) -> Result<()> {
        debug!("Duty: {:?}", duties);
        self.last = duties.to_vec();
        self.commits += 1;
        Ok(())
    }
}

/// Serial sink that only counts and logs frames
#[derive(Debug, Default)]
pub struct LogSerialSink {
    current: Vec<u8>,
    last_frame: Vec<u8>,
    frames: u64,
}

impl LogSerialSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Slots of the last completed frame, start code first
    pub fn last_frame(&self) -> &[u8] {
        &self.last_frame
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl SerialSink for LogSerialSink {
    fn start_break(&mut self) -> Result<()> {
        self.current.clear();
        Ok(())
    }

    fn end_break(&mut self) -> Result<()> {
        Ok(())
    }

    fn write_slot(&mut self, value: u8) -> Result<()> {
        self.current.push(value);
        Ok(())
    }

    fn end_frame(&mut self) -> Result<()> {
        self.frames += 1;
        self.last_frame = std::mem::take(&mut self.current);
        trace!("DMX frame {}: {} slots", self.frames, self.last_frame.len());
        Ok(())
    }
}

/// Linux sysfs PWM outputs, `pwm0..pwmK-1` of one chip
///
/// Channel values 0-255 are scaled linearly onto the PWM period.
#[derive(Debug)]
pub struct SysfsPwmSink {
    chip: PathBuf,
    period_ns: u64,
    outputs: usize,
}

impl SysfsPwmSink {
    /// Export and enable `outputs` channels of `chip`
    pub fn open(chip: impl Into<PathBuf>, period_ns: u64, outputs: usize) -> Result<Self> {
        let chip = chip.into();
        if period_ns == 0 {
            return Err(ControlError::InvalidParameter(
                "PWM period must be non-zero".to_string(),
            ));
        }

        for index in 0..outputs {
            let pwm = chip.join(format!("pwm{index}"));
            if !pwm.exists() {
                write_attr(&chip.join("export"), &index.to_string())?;
            }
            write_attr(&pwm.join("period"), &period_ns.to_string())?;
            write_attr(&pwm.join("duty_cycle"), "0")?;
            write_attr(&pwm.join("enable"), "1")?;
        }

        info!(
            "PWM chip {} ready: {} outputs, period {}ns",
            chip.display(),
            outputs,
            period_ns
        );
        Ok(Self {
            chip,
            period_ns,
            outputs,
        })
    }

    /// Duty cycle in nanoseconds for a channel value
    pub fn duty_ns(&self, value: u8) -> u64 {
        self.period_ns * value as u64 / u8::MAX as u64
    }
}

impl DutySink for SysfsPwmSink {
    fn commit(&mut self, duties: &[u8]) -> Result<()> {
        for (index, value) in duties.iter().take(self.outputs).enumerate() {
            let path = self.chip.join(format!("pwm{index}")).join("duty_cycle");
            write_attr(&path, &self.duty_ns(*value).to_string())?;
        }
        Ok(())
    }
}

fn write_attr(path: &Path, value: &str) -> Result<()> {
    fs::write(path, value).map_err(|e| {
        ControlError::OutputError(format!("failed to write {}: {}", path.display(), e))
    })
}

#[cfg(feature = "serial")]
pub use port::SerialPortSink;

#[cfg(feature = "serial")]
mod port {
    use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};
    use std::io::Write;
    use std::time::Duration;
    use tracing::info;

    use super::super::SerialSink;
    use crate::error::Result;

    /// DMX512 line rate
    pub const DMX_BAUD_RATE: u32 = 250_000;

    /// UART driving a DMX512 line: 250 kbaud, 8 data bits, no parity, 2 stop bits
    pub struct SerialPortSink {
        port: Box<dyn SerialPort>,
    }

    impl SerialPortSink {
        pub fn open(path: &str) -> Result<Self> {
            let port = serialport::new(path, DMX_BAUD_RATE)
                .data_bits(DataBits::Eight)
                .parity(Parity::None)
                .stop_bits(StopBits::Two)
                .flow_control(FlowControl::None)
                .timeout(Duration::from_millis(50))
                .open()?;

            info!("Opened DMX serial port {} at {} baud", path, DMX_BAUD_RATE);
            Ok(Self { port })
        }
    }

    impl SerialSink for SerialPortSink {
        fn start_break(&mut self) -> Result<()> {
            Ok(self.port.set_break()?)
        }

        fn end_break(&mut self) -> Result<()> {
            Ok(self.port.clear_break()?)
        }

        fn write_slot(&mut self, value: u8) -> Result<()> {
            self.port.write_all(&[value])?;
            Ok(())
        }

        fn end_frame(&mut self) -> Result<()> {
            self.port.flush()?;
            Ok(())
        }
    }
}
