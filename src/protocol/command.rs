//! Transport command encoding and parsing.
//!
//! A command is one line of comma separated decimal angles, in channel order.
//! The host encodes a full [`Pose`]; the controller accepts any prefix of it.
use core::fmt::Write;

use heapless::{String, Vec};

use crate::config::{COMMAND_CAPACITY, SERVO_COUNT};
use crate::robot::Pose;

/// Encodes `pose` as `a0,a1,...,a7` with no separator or newline at the end.
///
/// Angles are passed through unchanged.
pub fn encode(pose: &Pose) -> String<COMMAND_CAPACITY> {
    let mut command = String::new();
    // COMMAND_CAPACITY fits eight i32 fields, so the write cannot overflow.
    let _ = write!(command, "{pose}");
    command
}

/// Angles decoded from one command line, at most one per channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoseCommand {
    angles: Vec<i32, SERVO_COUNT>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseCommandError {
    /// Blank line: nothing to apply.
    Empty,
    /// Field `index` is not a decimal integer.
    InvalidAngle { index: usize },
}

impl core::fmt::Display for ParseCommandError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ParseCommandError::Empty => f.write_str("empty command"),
            ParseCommandError::InvalidAngle { index } => {
                write!(f, "field {index} is not an integer angle")
            }
        }
    }
}

impl TryFrom<&str> for PoseCommand {
    type Error = ParseCommandError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let value = value.trim();
        if value.is_empty() {
            return Err(ParseCommandError::Empty);
        }

        let mut angles = Vec::new();
        // Fields past the last channel are ignored, not validated.
        for (index, token) in value.split(',').take(SERVO_COUNT).enumerate() {
            let angle = token
                .trim()
                .parse::<i32>()
                .map_err(|_| ParseCommandError::InvalidAngle { index })?;
            // take(SERVO_COUNT) bounds the push
            let _ = angles.push(angle);
        }

        Ok(Self { angles })
    }
}

impl PoseCommand {
    pub fn angles(&self) -> &[i32] {
        &self.angles
    }

    /// Overwrites the first `len()` channels of `pose`, leaving the rest alone.
    pub fn apply_to(&self, pose: &mut Pose) {
        for (channel, angle) in self.angles.iter().enumerate() {
            pose.set(channel, *angle);
        }
    }
}

impl From<&Pose> for PoseCommand {
    fn from(pose: &Pose) -> Self {
        let mut angles = Vec::new();
        for (_, angle) in pose.iter() {
            let _ = angles.push(angle);
        }
        Self { angles }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_known_pose() {
        let pose = Pose::new([10, 20, 30, 40, 50, 60, 70, 80]);
        assert_eq!(encode(&pose).as_str(), "10,20,30,40,50,60,70,80");
    }

    #[test]
    fn encode_passes_out_of_range_values_through() {
        let pose = Pose::new([-5, 0, 180, 181, i32::MIN, i32::MAX, 90, 90]);
        assert_eq!(
            encode(&pose).as_str(),
            "-5,0,180,181,-2147483648,2147483647,90,90"
        );
    }

    #[test]
    fn parse_full_command() {
        let command = PoseCommand::try_from("10,20,30,40,50,60,70,80").unwrap();
        assert_eq!(command.angles(), &[10, 20, 30, 40, 50, 60, 70, 80]);
    }

    #[test]
    fn parse_what_encode_produced() {
        let pose = Pose::new([0, 45, 90, 135, 180, 12, 7, 99]);
        let command = PoseCommand::try_from(encode(&pose).as_str()).unwrap();
        assert_eq!(command, PoseCommand::from(&pose));
    }

    #[test]
    fn parse_strips_line_ending_and_field_padding() {
        let command = PoseCommand::try_from(" 15, 30 \r\n").unwrap();
        assert_eq!(command.angles(), &[15, 30]);
    }

    #[test]
    fn partial_command_updates_leading_channels_only() {
        let mut pose = Pose::new([1, 2, 3, 4, 5, 6, 7, 8]);
        PoseCommand::try_from("15,30").unwrap().apply_to(&mut pose);
        assert_eq!(pose.angles(), &[15, 30, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn extra_fields_are_ignored() {
        let command = PoseCommand::try_from("1,2,3,4,5,6,7,8,9,oops").unwrap();
        assert_eq!(command.angles().len(), SERVO_COUNT);
        assert_eq!(command.angles()[7], 8);
    }

    #[test]
    fn malformed_field_is_reported_with_its_position() {
        assert_eq!(
            PoseCommand::try_from("10,abc,30"),
            Err(ParseCommandError::InvalidAngle { index: 1 })
        );
        assert_eq!(
            PoseCommand::try_from("10,20,"),
            Err(ParseCommandError::InvalidAngle { index: 2 })
        );
        assert_eq!(
            PoseCommand::try_from("90.5"),
            Err(ParseCommandError::InvalidAngle { index: 0 })
        );
    }

    #[test]
    fn blank_line_is_empty() {
        assert_eq!(PoseCommand::try_from(""), Err(ParseCommandError::Empty));
        assert_eq!(PoseCommand::try_from(" \r\n"), Err(ParseCommandError::Empty));
    }
}
