//! Output drivers
//!
//! The driver reads the shared channel buffer on its own thread and pushes it
//! to hardware through one of two strategies:
//!
//! - **Duty**: a few channels mapped onto PWM outputs, written on change
//! - **Serial**: a continuous DMX512 frame stream with break / mark timing
//!
//! The buffer lock is only held while copying a snapshot; the device is never
//! touched with the lock held.

pub mod duty;
pub mod serial;
pub mod sinks;
pub mod timer;

pub use duty::DutyOutput;
pub use serial::{LineAction, SerialFrameMachine, SerialOutput, SerialState, SerialStep};
#[cfg(feature = "serial")]
pub use sinks::SerialPortSink;
pub use sinks::{LogDutySink, LogSerialSink, SysfsPwmSink};
pub use timer::{ManualTimer, PrecisionTimer, Timer};

use artnode_core::{
    DutySinkKind, OutputConfig, OutputStrategy, SerialSinkKind, SharedChannelBuffer,
};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{error, info, warn};

use crate::error::{ControlError, Result};

/// Receives duty values, one per output, in a single call
pub trait DutySink: Send {
    fn commit(&mut self, duties: &[u8]) -> Result<()>;
}

impl<S: DutySink + ?Sized> DutySink for Box<S> {
    fn commit(&mut self, duties: &[u8]) -> Result<()> {
        (**self).commit(duties)
    }
}

/// A DMX512 line
pub trait SerialSink: Send {
    /// Hold the line low
    fn start_break(&mut self) -> Result<()>;
    /// Release the line
    fn end_break(&mut self) -> Result<()>;
    /// Transmit one slot
    fn write_slot(&mut self, value: u8) -> Result<()>;
    /// Called after the last slot of a frame
    fn end_frame(&mut self) -> Result<()>;
}

impl<S: SerialSink + ?Sized> SerialSink for Box<S> {
    fn start_break(&mut self) -> Result<()> {
        (**self).start_break()
    }

    fn end_break(&mut self) -> Result<()> {
        (**self).end_break()
    }

    fn write_slot(&mut self, value: u8) -> Result<()> {
        (**self).write_slot(value)
    }

    fn end_frame(&mut self) -> Result<()> {
        (**self).end_frame()
    }
}

impl<T: Timer + ?Sized> Timer for Box<T> {
    fn now(&self) -> std::time::Instant {
        (**self).now()
    }

    fn sleep_until(&mut self, deadline: std::time::Instant) {
        (**self).sleep_until(deadline)
    }
}

/// Output loop statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutputStats {
    /// Loop iterations
    pub cycles: u64,
    /// Successful hardware writes (duty commits or serial frames)
    pub writes: u64,
    /// Failed hardware writes
    pub errors: u64,
}

/// A configured output strategy, ready to run
pub enum OutputDriver {
    Duty {
        output: DutyOutput<Box<dyn DutySink>>,
        interval: Duration,
    },
    Serial(SerialOutput<Box<dyn SerialSink>, Box<dyn Timer>>),
}

impl OutputDriver {
    /// Build the driver and open its sink
    ///
    /// `start` is the zero-based buffer slot mapped to the first duty output.
    pub fn from_config(config: &OutputConfig, start: usize) -> Result<Self> {
        config.validate()?;

        match &config.strategy {
            OutputStrategy::Duty(duty) => {
                let sink: Box<dyn DutySink> = match &duty.sink {
                    DutySinkKind::Log => Box::new(LogDutySink::new()),
                    DutySinkKind::Sysfs { chip, period_ns } => {
                        Box::new(SysfsPwmSink::open(chip, *period_ns, duty.channels)?)
                    }
                };
                Ok(Self::Duty {
                    output: DutyOutput::from_config(sink, duty, start),
                    interval: duty.refresh_interval(),
                })
            }
            OutputStrategy::Serial(serial) => {
                let sink: Box<dyn SerialSink> = match &serial.sink {
                    SerialSinkKind::Log => Box::new(LogSerialSink::new()),
                    SerialSinkKind::Port { path } => open_serial_port(path)?,
                };
                let timer: Box<dyn Timer> = Box::new(PrecisionTimer);
                Ok(Self::Serial(SerialOutput::new(
                    sink,
                    timer,
                    serial.timing.clone(),
                )))
            }
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Duty { .. } => "duty",
            Self::Serial(_) => "serial",
        }
    }

    /// One loop iteration; returns whether hardware was written
    fn run_once(&mut self, buffer: &SharedChannelBuffer) -> Result<bool> {
        match self {
            Self::Duty { output, interval } => {
                let written = output.refresh(buffer);
                thread::sleep(*interval);
                written
            }
            Self::Serial(output) => {
                output.wait_next_cycle();
                output.run_cycle(buffer).map(|_| true)
            }
        }
    }
}

#[cfg(feature = "serial")]
fn open_serial_port(path: &str) -> Result<Box<dyn SerialSink>> {
    Ok(Box::new(SerialPortSink::open(path)?))
}

#[cfg(not(feature = "serial"))]
fn open_serial_port(path: &str) -> Result<Box<dyn SerialSink>> {
    Err(ControlError::InvalidParameter(format!(
        "cannot open {path}: built without serial port support"
    )))
}

/// Handle to a running output thread
pub struct OutputHandle {
    running: Arc<AtomicBool>,
    stats: Arc<RwLock<OutputStats>>,
    thread: Option<JoinHandle<()>>,
}

impl OutputHandle {
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    pub fn stats(&self) -> OutputStats {
        *self.stats.read()
    }

    /// Clear the running flag and wait for the thread to exit
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::Relaxed);

        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                error!("Output thread panicked");
            }
            let stats = self.stats();
            info!(
                "Output stopped after {} cycles ({} writes, {} errors)",
                stats.cycles, stats.writes, stats.errors
            );
        }
    }
}

impl Drop for OutputHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Run `driver` on a dedicated thread until the handle is stopped
///
/// Write failures are logged and counted; the loop keeps going.
pub fn spawn(mut driver: OutputDriver, buffer: SharedChannelBuffer) -> Result<OutputHandle> {
    let running = Arc::new(AtomicBool::new(true));
    let stats = Arc::new(RwLock::new(OutputStats::default()));

    let thread_running = running.clone();
    let thread_stats = stats.clone();
    let name = driver.name();

    let thread = thread::Builder::new()
        .name(format!("{name}-output"))
        .spawn(move || {
            info!("{} output thread started", name);

            while thread_running.load(Ordering::Relaxed) {
                let result = driver.run_once(&buffer);

                let mut stats = thread_stats.write();
                stats.cycles += 1;
                match result {
                    Ok(true) => stats.writes += 1,
                    Ok(false) => {}
                    Err(e) => {
                        stats.errors += 1;
                        warn!("{} output write failed: {}", name, e);
                    }
                }
            }
        })
        .map_err(ControlError::IoError)?;

    Ok(OutputHandle {
        running,
        stats,
        thread: Some(thread),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use artnode_core::{ChannelBuffer, DmxTiming, DutyConfig, SerialConfig};

    #[test]
    fn test_from_config_default_is_duty() {
        let driver = OutputDriver::from_config(&OutputConfig::default(), 0).unwrap();
        assert_eq!(driver.name(), "duty");
    }

    #[test]
    fn test_from_config_rejects_bad_timing() {
        let config = OutputConfig {
            enabled: true,
            strategy: OutputStrategy::Serial(SerialConfig {
                timing: DmxTiming {
                    break_us: 100,
                    ..Default::default()
                },
                sink: SerialSinkKind::Log,
            }),
        };
        assert!(matches!(
            OutputDriver::from_config(&config, 0),
            Err(ControlError::Config(_))
        ));
    }

    #[test]
    fn test_spawned_duty_driver_stops() {
        let config = OutputConfig {
            enabled: true,
            strategy: OutputStrategy::Duty(DutyConfig {
                refresh_interval_ms: 1,
                ..Default::default()
            }),
        };
        let buffer = ChannelBuffer::shared();
        buffer.lock().ingest(&[1, 2, 3]);

        let driver = OutputDriver::from_config(&config, 0).unwrap();
        let mut handle = spawn(driver, buffer.clone()).unwrap();
        assert!(handle.is_running());

        // Wait for the dirty buffer to be picked up
        for _ in 0..200 {
            if !buffer.lock().is_dirty() {
                break;
            }
            thread::sleep(Duration::from_millis(1));
        }

        handle.stop();
        assert!(!handle.is_running());
        assert!(!buffer.lock().is_dirty());
        assert_eq!(handle.stats().writes, 1);
    }
}
