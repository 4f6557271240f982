use core::fmt::Display;

use crate::config::LEG_COUNT;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Leg {
    FrontLeft = 0,
    BottomLeft = 1,
    FrontRight = 2,
    BottomRight = 3,
}

impl Leg {
    pub const ALL: [Leg; LEG_COUNT] = [
        Leg::FrontLeft,
        Leg::BottomLeft,
        Leg::FrontRight,
        Leg::BottomRight,
    ];
}

impl Display for Leg {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Leg::FrontLeft => f.write_str("Front left"),
            Leg::FrontRight => f.write_str("Front right"),
            Leg::BottomLeft => f.write_str("Bottom left"),
            Leg::BottomRight => f.write_str("Bottom right"),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct UnknownLeg;

/// Accepts the leg number (`1`-`4`) or a short name such as `fl` / `front-left`.
impl TryFrom<&str> for Leg {
    type Error = UnknownLeg;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim() {
            "1" | "fl" | "front-left" => Ok(Leg::FrontLeft),
            "2" | "bl" | "bottom-left" => Ok(Leg::BottomLeft),
            "3" | "fr" | "front-right" => Ok(Leg::FrontRight),
            "4" | "br" | "bottom-right" => Ok(Leg::BottomRight),
            _ => Err(UnknownLeg),
        }
    }
}
