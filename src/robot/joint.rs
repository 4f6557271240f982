//! Joint enumeration and display helpers.
//!
//! Each leg carries a knee and a hip servo; the discriminant is the joint's
//! offset inside the leg's pair of channels.
use core::fmt::Display;

use crate::config::JOINTS_PER_LEG;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Joint {
    Knee = 0,
    Hip = 1,
}

impl Joint {
    pub const ALL: [Joint; JOINTS_PER_LEG] = [Joint::Knee, Joint::Hip];
}

impl Display for Joint {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Joint::Knee => f.write_str("knee"),
            Joint::Hip => f.write_str("hip"),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct UnknownJoint;

impl TryFrom<&str> for Joint {
    type Error = UnknownJoint;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim() {
            "knee" | "k" => Ok(Joint::Knee),
            "hip" | "h" => Ok(Joint::Hip),
            _ => Err(UnknownJoint),
        }
    }
}
