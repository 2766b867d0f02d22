//! DMX512 serial output
//!
//! One frame on the line is: break (line low), mark after break (line high),
//! the start code slot, then one slot per channel. [`SerialFrameMachine`]
//! walks through that sequence and says what to do and how long to hold it;
//! [`SerialOutput`] executes the steps against a sink and a timer.

use artnode_core::{DmxTiming, SharedChannelBuffer, DMX_CHANNELS};
use std::time::{Duration, Instant};
use tracing::debug;

use super::timer::Timer;
use super::SerialSink;
use crate::error::Result;

/// DMX512 null start code
pub const START_CODE: u8 = 0x00;

/// Phase of the frame currently on the line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SerialState {
    Idle,
    Break,
    Mark,
    StartCode,
    /// Channel slot `i` (zero-based) has been sent
    Transmitting(usize),
}

/// What the line should do next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineAction {
    /// Drive the line low
    BreakOn,
    /// Release the line
    BreakOff,
    /// Send one slot
    Slot(u8),
    /// Frame finished; drain pending output
    EndOfFrame,
}

/// One transition: the action to perform, then how long to hold before the next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SerialStep {
    pub action: LineAction,
    pub hold: Duration,
}

/// Frame sequencing, independent of any clock or device
#[derive(Debug, Clone)]
pub struct SerialFrameMachine {
    timing: DmxTiming,
    state: SerialState,
}

impl SerialFrameMachine {
    pub fn new(timing: DmxTiming) -> Self {
        Self {
            timing,
            state: SerialState::Idle,
        }
    }

    pub fn state(&self) -> SerialState {
        self.state
    }

    pub fn timing(&self) -> &DmxTiming {
        &self.timing
    }

    fn slot_hold(&self) -> Duration {
        Duration::from_micros(DmxTiming::SLOT_TIME_US as u64) + self.timing.slot_gap()
    }

    fn channel_count(&self) -> usize {
        (self.timing.channel_count as usize).min(DMX_CHANNELS)
    }

    /// Advance one phase using `frame` for channel values
    pub fn step(&mut self, frame: &[u8; DMX_CHANNELS]) -> SerialStep {
        let (next, action, hold) = match self.state {
            SerialState::Idle => (
                SerialState::Break,
                LineAction::BreakOn,
                self.timing.break_duration(),
            ),
            SerialState::Break => (
                SerialState::Mark,
                LineAction::BreakOff,
                self.timing.mark_duration(),
            ),
            SerialState::Mark => (
                SerialState::StartCode,
                LineAction::Slot(START_CODE),
                self.slot_hold(),
            ),
            SerialState::StartCode => (
                SerialState::Transmitting(0),
                LineAction::Slot(frame[0]),
                self.slot_hold(),
            ),
            SerialState::Transmitting(i) if i + 1 < self.channel_count() => (
                SerialState::Transmitting(i + 1),
                LineAction::Slot(frame[i + 1]),
                self.slot_hold(),
            ),
            SerialState::Transmitting(_) => {
                (SerialState::Idle, LineAction::EndOfFrame, Duration::ZERO)
            }
        };
        self.state = next;
        SerialStep { action, hold }
    }
}

/// Continuous DMX512 refresh driving a [`SerialSink`]
pub struct SerialOutput<S: SerialSink, T: Timer> {
    sink: S,
    timer: T,
    machine: SerialFrameMachine,
    next_cycle: Option<Instant>,
}

impl<S: SerialSink, T: Timer> SerialOutput<S, T> {
    pub fn new(sink: S, timer: T, timing: DmxTiming) -> Self {
        Self {
            sink,
            timer,
            machine: SerialFrameMachine::new(timing),
            next_cycle: None,
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn timer(&self) -> &T {
        &self.timer
    }

    /// Send one full frame from the current buffer contents
    ///
    /// Runs whether or not the buffer changed. On a sink error the frame is
    /// abandoned, the line released, and the error returned; the next cycle
    /// starts over with a fresh break.
    pub fn run_cycle(&mut self, buffer: &SharedChannelBuffer) -> Result<()> {
        let frame = buffer.lock().snapshot();
        let mut deadline = self.timer.now();

        loop {
            let step = self.machine.step(&frame);
            let result = match step.action {
                LineAction::BreakOn => self.sink.start_break(),
                LineAction::BreakOff => self.sink.end_break(),
                LineAction::Slot(value) => self.sink.write_slot(value),
                LineAction::EndOfFrame => return self.sink.end_frame(),
            };

            if let Err(e) = result {
                self.machine = SerialFrameMachine::new(self.machine.timing.clone());
                if let Err(release) = self.sink.end_break() {
                    debug!("Releasing line after failed frame also failed: {}", release);
                }
                return Err(e);
            }

            // Break and mark are timed from when the line actually changed;
            // slots keep a fixed cadence from there
            deadline = match step.action {
                LineAction::BreakOn | LineAction::BreakOff => self.timer.now() + step.hold,
                _ => deadline + step.hold,
            };
            self.timer.sleep_until(deadline);
        }
    }

    /// Wait for the next cycle slot at the configured refresh period
    ///
    /// A cycle that overran its period is not made up; the schedule restarts
    /// from now.
    pub fn wait_next_cycle(&mut self) {
        let period = self.machine.timing.frame_period();
        let now = self.timer.now();
        let next = match self.next_cycle {
            Some(next) if next > now => next,
            _ => now,
        };
        self.timer.sleep_until(next);
        self.next_cycle = Some(next + period);
    }
}
