//! Timed sequences of stored poses (stand, sit, wave, ...).
//!
//! Routines carry no motion planning: each step names a stored pose, which is
//! sent as-is and then held for `hold_ms` before the next step.
use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Hold between the poses of the built-in wave.
const WAVE_HOLD_MS: u64 = 500;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutineStep {
    pub pose: String,
    #[serde(default)]
    pub hold_ms: u64,
}

impl RoutineStep {
    pub fn new(pose: impl Into<String>, hold_ms: u64) -> Self {
        Self {
            pose: pose.into(),
            hold_ms,
        }
    }

    pub fn hold(&self) -> Duration {
        Duration::from_millis(self.hold_ms)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Routine {
    pub steps: Vec<RoutineStep>,
}

impl Routine {
    pub fn new(steps: Vec<RoutineStep>) -> Self {
        Self { steps }
    }

    /// A routine that sends a single pose.
    pub fn single(pose: impl Into<String>) -> Self {
        Self::new(vec![RoutineStep::new(pose, 0)])
    }

    /// The `stand`, `sit` and `wave` routines available without a config file.
    pub fn builtin() -> BTreeMap<String, Routine> {
        let wave = ["wave1", "wave2", "wave3", "wave2", "wave3"]
            .into_iter()
            .map(|pose| RoutineStep::new(pose, WAVE_HOLD_MS))
            .chain(std::iter::once(RoutineStep::new("stand", 0)))
            .collect();

        BTreeMap::from([
            ("stand".to_string(), Routine::single("stand")),
            ("sit".to_string(), Routine::single("sit")),
            ("wave".to_string(), Routine::new(wave)),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_wave_returns_to_stand() {
        let routines = Routine::builtin();
        let wave = &routines["wave"];
        assert_eq!(wave.steps.first().unwrap().pose, "wave1");
        assert_eq!(wave.steps.last().unwrap().pose, "stand");
        assert_eq!(wave.steps[0].hold(), Duration::from_millis(500));
    }

    #[test]
    fn hold_defaults_to_zero() {
        let step: RoutineStep = toml::from_str(r#"pose = "sit""#).unwrap();
        assert_eq!(step.hold_ms, 0);
    }
}
