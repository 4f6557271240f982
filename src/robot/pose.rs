//! The eight-angle configuration of the robot at one instant.
use core::fmt::{self, Display};
use core::ops::{Index, IndexMut};

use super::{joint::Joint, leg::Leg};
use crate::config::{DEFAULT_ANGLE, JOINTS_PER_LEG, SERVO_COUNT};

/// Angles in degrees, ordered leg by leg as `[knee, hip]`.
///
/// Values are not range checked here: a pose is what gets encoded on the
/// wire, and clamping belongs to the editing and conversion boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Pose([i32; SERVO_COUNT]);

/// Channel index of a joint in the fixed wire order.
pub const fn channel_index(leg: Leg, joint: Joint) -> usize {
    leg as usize * JOINTS_PER_LEG + joint as usize
}

impl Pose {
    pub const fn new(angles: [i32; SERVO_COUNT]) -> Self {
        Self(angles)
    }

    /// Every channel at the same angle.
    pub const fn splat(angle: i32) -> Self {
        Self([angle; SERVO_COUNT])
    }

    pub fn angles(&self) -> &[i32; SERVO_COUNT] {
        &self.0
    }

    pub fn get(&self, channel: usize) -> Option<i32> {
        self.0.get(channel).copied()
    }

    /// Returns `false` when `channel` is out of range.
    pub fn set(&mut self, channel: usize, angle: i32) -> bool {
        match self.0.get_mut(channel) {
            Some(slot) => {
                *slot = angle;
                true
            }
            None => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, i32)> + '_ {
        self.0.iter().copied().enumerate()
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::splat(DEFAULT_ANGLE)
    }
}

impl From<[i32; SERVO_COUNT]> for Pose {
    fn from(angles: [i32; SERVO_COUNT]) -> Self {
        Self(angles)
    }
}

impl Index<usize> for Pose {
    type Output = i32;

    fn index(&self, channel: usize) -> &Self::Output {
        &self.0[channel]
    }
}

impl IndexMut<usize> for Pose {
    fn index_mut(&mut self, channel: usize) -> &mut Self::Output {
        &mut self.0[channel]
    }
}

impl Index<(Leg, Joint)> for Pose {
    type Output = i32;

    fn index(&self, (leg, joint): (Leg, Joint)) -> &Self::Output {
        &self.0[channel_index(leg, joint)]
    }
}

impl IndexMut<(Leg, Joint)> for Pose {
    fn index_mut(&mut self, (leg, joint): (Leg, Joint)) -> &mut Self::Output {
        &mut self.0[channel_index(leg, joint)]
    }
}

/// Writes the wire form `a0,a1,...,a7`, without a trailing separator.
impl Display for Pose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, angle) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{angle}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_order_is_knee_then_hip_per_leg() {
        assert_eq!(channel_index(Leg::FrontLeft, Joint::Knee), 0);
        assert_eq!(channel_index(Leg::FrontLeft, Joint::Hip), 1);
        assert_eq!(channel_index(Leg::BottomLeft, Joint::Knee), 2);
        assert_eq!(channel_index(Leg::BottomRight, Joint::Hip), 7);
    }

    #[test]
    fn default_pose_rests_at_ninety() {
        assert_eq!(Pose::default().angles(), &[90; SERVO_COUNT]);
    }

    #[test]
    fn index_by_leg_and_joint() {
        let mut pose = Pose::new([10, 20, 30, 40, 50, 60, 70, 80]);
        assert_eq!(pose[(Leg::FrontRight, Joint::Hip)], 60);

        pose[(Leg::BottomLeft, Joint::Knee)] = 5;
        assert_eq!(pose[2], 5);
    }

    #[test]
    fn set_rejects_channel_out_of_range() {
        let mut pose = Pose::default();
        assert!(pose.set(7, 12));
        assert!(!pose.set(SERVO_COUNT, 12));
        assert_eq!(pose.get(7), Some(12));
        assert_eq!(pose.get(SERVO_COUNT), None);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serializes_as_plain_array() {
        let pose = Pose::new([1, 2, 3, 4, 5, 6, 7, 8]);
        let json = serde_json::to_string(&pose).unwrap();
        assert_eq!(json, "[1,2,3,4,5,6,7,8]");

        let short: Result<Pose, _> = serde_json::from_str("[1,2,3]");
        assert!(short.is_err());
    }
}
