//! Core arm types.
//!
//! This module defines the main types for the arm, including:
//! - [`joint`]: Joint enumeration and display helpers.
//! - [`servo`]: Angle to duty mapping for a single PWM channel.
//! - [`arm`]: The four-channel actuation mapper.
//! - [`commands`]: Decoding of servo command records.
//!
//! With the `firmware` feature, [`ledc`] binds the arm to the ESP32 LEDC peripheral.
pub mod arm;
pub mod commands;
pub mod joint;
#[cfg(feature = "firmware")]
pub mod ledc;
pub mod servo;
