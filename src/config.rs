//! Link and servo constants shared by the pose host and the actuator controller.

/// Number of servos driven by the controller: two per leg, four legs.
pub const SERVO_COUNT: usize = 8;
pub const LEG_COUNT: usize = 4;
pub const JOINTS_PER_LEG: usize = 2;

/// SERIAL LINK
pub const BAUD_RATE: u32 = 115_200;
/// Delay between two controller polls of the serial input.
pub const POLL_INTERVAL_MS: u64 = 100;
/// Longest line the controller assembles before discarding input.
pub const LINE_CAPACITY: usize = 128;
/// Eight `i32` fields of at most 11 characters plus seven separators.
pub const COMMAND_CAPACITY: usize = 96;

/// SERVO TIMING
pub const PWM_FREQUENCY_HZ: u32 = 50;
pub const PERIOD_US: u32 = 1_000_000 / PWM_FREQUENCY_HZ; // 20000 µs
pub const MIN_PULSE_US: u32 = 500; // 0°
pub const MAX_PULSE_US: u32 = 2400; // 180°
pub const MIN_ANGLE: i32 = 0;
pub const MAX_ANGLE: i32 = 180;
/// Resting angle every channel starts from.
pub const DEFAULT_ANGLE: i32 = 90;
