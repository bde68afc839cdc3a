//! Library root for the robotic arm controller firmware.
//!
//! Re-exports all main modules: [`config`], [`robot`], [`session`] and, with the
//! `firmware` feature, [`tasks`].
//! The hardware-independent modules build on the host so they can be unit tested
//! without an ESP32 attached.
#![cfg_attr(not(test), no_std)]

pub mod config;
pub mod robot;
pub mod session;

#[cfg(feature = "firmware")]
pub mod tasks;
