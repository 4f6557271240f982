//! Actuator side poll loop.
//!
//! Each tick drains the serial input without blocking. When a full line is
//! available it is parsed and applied to the servos (Dispatch), otherwise the
//! tick does nothing (Idle). The caller sleeps [`POLL_INTERVAL_MS`] between
//! ticks.
//!
//! [`POLL_INTERVAL_MS`]: crate::config::POLL_INTERVAL_MS
use embedded_hal::pwm::SetDutyCycle;
use embedded_io::{Read, ReadReady};
use log::{error, warn};

use crate::config::{LINE_CAPACITY, SERVO_COUNT};
use crate::protocol::{LineError, LineReader, ParseCommandError, PoseCommand};
use crate::robot::Servo;

const STAMP: &str = "[POLL_TASK]";

/// Result of one poll tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// No complete line was pending.
    Idle,
    /// A command was applied; `updated` channels accepted their new angle.
    Dispatched { updated: usize },
    /// A line arrived but was rejected. Servo positions are unchanged.
    Skipped,
}

pub struct Controller<R, PWM, const N: usize = LINE_CAPACITY> {
    reader: R,
    lines: LineReader<N>,
    servos: [Servo<PWM>; SERVO_COUNT],
}

impl<R, PWM, const N: usize> Controller<R, PWM, N>
where
    R: Read + ReadReady,
    PWM: SetDutyCycle,
{
    /// `servos[i]` receives the `i`-th angle of every command.
    pub fn new(reader: R, servos: [Servo<PWM>; SERVO_COUNT]) -> Self {
        for (i, servo) in servos.iter().enumerate() {
            if servo.channel().index() != i {
                warn!("{STAMP} channel {} wired at position {i}", servo.channel());
            }
        }
        Self {
            reader,
            lines: LineReader::new(),
            servos,
        }
    }

    /// Runs one tick of the loop.
    pub fn poll(&mut self) -> Tick {
        let line = match self.lines.poll(&mut self.reader) {
            Ok(Some(line)) => line,
            Ok(None) => return Tick::Idle,
            Err(LineError::Read(e)) => {
                error!("{STAMP} serial read failed: {:?}", e);
                return Tick::Skipped;
            }
            Err(LineError::Overflow) => {
                warn!("{STAMP} dropped a line longer than {N} bytes");
                return Tick::Skipped;
            }
            Err(LineError::InvalidUtf8) => {
                warn!("{STAMP} dropped a line that is not utf-8");
                return Tick::Skipped;
            }
        };

        match PoseCommand::try_from(line.as_str()) {
            Ok(command) => Tick::Dispatched {
                updated: self.apply(&command),
            },
            Err(ParseCommandError::Empty) => Tick::Idle,
            Err(e) => {
                warn!("{STAMP} ignoring command {:?}: {}", line.as_str(), e);
                Tick::Skipped
            }
        }
    }

    /// Writes each angle of `command` to its channel, in order.
    ///
    /// A channel whose PWM write fails is skipped; the others are still
    /// written. Returns the number of channels updated.
    pub fn apply(&mut self, command: &PoseCommand) -> usize {
        let mut updated = 0;
        for (servo, angle) in self.servos.iter_mut().zip(command.angles()) {
            if servo.set_angle(*angle).is_ok() {
                updated += 1;
            }
        }
        updated
    }

    /// Angle last written to each channel.
    pub fn angles(&self) -> [Option<i32>; SERVO_COUNT] {
        core::array::from_fn(|i| self.servos[i].angle())
    }

    pub fn servos(&self) -> &[Servo<PWM>; SERVO_COUNT] {
        &self.servos
    }

    pub fn reader_mut(&mut self) -> &mut R {
        &mut self.reader
    }
}
