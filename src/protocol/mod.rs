//! Wire protocol between the pose host and the actuator controller.
//!
//! - [`command`]: encoding a pose into a command line and parsing it back.
//! - [`line`]: assembling lines from a serial byte stream without blocking.
//!
//! One newline-terminated line per command, host to controller only. There is
//! no acknowledgement, checksum or sequence number.
pub mod command;
pub mod line;

pub use command::{encode, ParseCommandError, PoseCommand};
pub use line::{LineError, LineReader};
