//! Library root for the quadruped pose link.
//!
//! Shared by the pose host and the actuator firmware: [`robot`] holds the pose
//! model and servo conversion, [`protocol`] the line-based wire format and
//! [`controller`] the actuator poll loop.
#![no_std]

pub mod config;
pub mod controller;
pub mod protocol;
pub mod robot;

pub use controller::{Controller, Tick};
pub use protocol::{encode, PoseCommand};
pub use robot::Pose;
