use core::fmt::{self, Display};

use embedded_hal::pwm::SetDutyCycle;
use log::{debug, error, info};

use super::{joint::Joint, leg::Leg, pose::channel_index};
use crate::config::{
    JOINTS_PER_LEG, MAX_ANGLE, MAX_PULSE_US, MIN_ANGLE, MIN_PULSE_US, PERIOD_US, SERVO_COUNT,
};

/// Pulse bounds of a hobby servo driven by a fixed-period PWM carrier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServoCalibration {
    pub min_pulse_us: u32,
    pub max_pulse_us: u32,
    pub period_us: u32,
}

impl Default for ServoCalibration {
    fn default() -> Self {
        Self {
            min_pulse_us: MIN_PULSE_US,
            max_pulse_us: MAX_PULSE_US,
            period_us: PERIOD_US,
        }
    }
}

impl ServoCalibration {
    /// Converts an angle in degrees to a 16-bit duty cycle of the carrier period.
    ///
    /// `pulse = min + angle / 180 * (max - min)` and
    /// `duty = round(pulse / period * 65535)`, computed on integers so the
    /// controller needs no float support. Angles are clamped to 0..=180 first,
    /// so the pulse never leaves the servo's rated range.
    pub fn duty(&self, angle: i32) -> u16 {
        let angle = angle.clamp(MIN_ANGLE, MAX_ANGLE) as u64;
        let span = MAX_ANGLE as u64;
        let range = self.max_pulse_us.saturating_sub(self.min_pulse_us) as u64;

        // pulse * span, kept exact
        let scaled_pulse = self.min_pulse_us as u64 * span + angle * range;
        let numerator = scaled_pulse * u16::MAX as u64;
        let denominator = span * self.period_us.max(1) as u64;

        let duty = (numerator + denominator / 2) / denominator;
        duty.min(u16::MAX as u64) as u16
    }

    /// Pulse width in microseconds, truncated. Only used for diagnostics.
    pub fn pulse_width_us(&self, angle: i32) -> u32 {
        let angle = angle.clamp(MIN_ANGLE, MAX_ANGLE) as u32;
        let range = self.max_pulse_us.saturating_sub(self.min_pulse_us);
        self.min_pulse_us + angle * range / MAX_ANGLE as u32
    }
}

/// Duty cycle of `angle` with the default 500–2400 µs / 50 Hz calibration.
pub fn angle_to_duty(angle: i32) -> u16 {
    ServoCalibration::default().duty(angle)
}

/// Where a servo sits on the robot and which output pin drives it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelDescriptor {
    pub leg: Leg,
    pub joint: Joint,
    pub gpio: u8,
}

impl ChannelDescriptor {
    pub const fn new(leg: Leg, joint: Joint, gpio: u8) -> Self {
        Self { leg, joint, gpio }
    }

    /// Position of this channel in a transport command.
    pub const fn index(&self) -> usize {
        channel_index(self.leg, self.joint)
    }
}

/// Descriptors in wire order, pairing each channel with its output pin.
pub fn channel_layout(gpios: [u8; SERVO_COUNT]) -> [ChannelDescriptor; SERVO_COUNT] {
    core::array::from_fn(|i| {
        ChannelDescriptor::new(
            Leg::ALL[i / JOINTS_PER_LEG],
            Joint::ALL[i % JOINTS_PER_LEG],
            gpios[i],
        )
    })
}

impl Display for ChannelDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} (gpio {})", self.leg, self.joint, self.gpio)
    }
}

#[derive(Debug)]
pub struct Servo<PWM> {
    pwm: PWM,
    angle: Option<i32>,
    calibration: ServoCalibration,
    channel: ChannelDescriptor,
}

impl<PWM> Servo<PWM>
where
    PWM: SetDutyCycle,
{
    pub fn new(pwm: PWM, channel: ChannelDescriptor, calibration: ServoCalibration) -> Self {
        Self {
            pwm,
            angle: None,
            calibration,
            channel,
        }
    }

    /// Sets the servo angle in degrees.
    ///
    /// # Arguments
    /// * `angle` - A value between 0 and 180 degrees. Values outside this range are clamped.
    ///
    /// # Returns
    /// * `Ok(duty)` with the 16-bit duty written (or already in place)
    /// * `Err(e)` if the PWM driver fails to update the duty cycle
    pub fn set_angle(&mut self, angle: i32) -> Result<u16, PWM::Error> {
        let angle = angle.clamp(MIN_ANGLE, MAX_ANGLE);
        let duty = self.calibration.duty(angle);

        //Avoid setting the same angle again
        if self.angle == Some(angle) {
            return Ok(duty);
        }

        debug!(
            "{}: {} us -> duty {}",
            self.channel,
            self.calibration.pulse_width_us(angle),
            duty
        );
        // THE WIDTH OF THE PULSE DRIVES THE ANGLE, NOT FREQ
        if let Err(e) = self.pwm.set_duty_cycle_fraction(duty, u16::MAX) {
            error!("{} Error writing angle {:?}", self.channel, e);
            return Err(e);
        }
        self.angle = Some(angle);
        info!("servo {} set to {} degrees", self.channel.index(), angle);
        Ok(duty)
    }

    /// Last angle written, `None` until the first successful write.
    pub fn angle(&self) -> Option<i32> {
        self.angle
    }

    pub fn channel(&self) -> &ChannelDescriptor {
        &self.channel
    }

    pub fn pwm(&self) -> &PWM {
        &self.pwm
    }
}
