//! Host side of the quadruped pose link.
//!
//! An operator edits an 8-angle [`quadruped_link::Pose`], keeps named poses in
//! a JSON file and sends them to the controller over a serial line.
pub mod config;
pub mod console;
pub mod routine;
pub mod session;
pub mod store;
pub mod transport;

pub use config::HostConfig;
pub use session::{Session, SessionError};
pub use transport::{PoseSink, SerialTransport};
