//! Core robot types.
//!
//! This module defines the main types of the quadruped, including:
//! - [`leg`]: Leg enumeration and parsing helpers.
//! - [`joint`]: Joint enumeration (knee, hip) and display helpers.
//! - [`pose`]: The eight-angle [`pose::Pose`] and its fixed channel order.
//! - [`servo`]: Angle to duty conversion and the PWM-backed [`servo::Servo`].
//!
//! These types are shared by the pose host and the actuator controller.
pub mod joint;
pub mod leg;
pub mod pose;
pub mod servo;

pub use joint::Joint;
pub use leg::Leg;
pub use pose::{channel_index, Pose};
pub use servo::{angle_to_duty, channel_layout, ChannelDescriptor, Servo, ServoCalibration};
