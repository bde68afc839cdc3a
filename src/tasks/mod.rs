//! Asynchronous tasks for the arm controller.
//!
//! This module contains the Embassy async tasks of the firmware:
//! - [`net_task`]: Brings up the access point, drives the network stack and
//!   serves the single TCP control session.
//! - [`dhcp_task`]: Hands out addresses to clients joining the access point.
//!
//! The [`Arm`](crate::robot::arm::Arm) is owned by the TCP server task, which is
//! the only writer of the servo channels.
pub mod dhcp_task;
pub mod net_task;
