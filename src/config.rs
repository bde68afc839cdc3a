//! Fixed controller configuration.
//!
//! Everything the arm needs to know about its wiring and its network lives in one
//! immutable [`ArmConfig`], built once at startup and handed out by reference.
//! Nothing here is runtime-configurable.
use embassy_time::Duration;
use fugit::HertzU32;

use crate::robot::joint::Joint;

/// Longest record accepted before the line buffer is discarded.
pub const LINE_CAPACITY: usize = 512;

pub const RX_BUF_SIZE: usize = 1024;
pub const TX_BUF_SIZE: usize = 256;
/// Bytes pulled from the socket per read.
pub const READ_CHUNK_SIZE: usize = 128;

pub const PORT: u16 = 8000;
pub const IDLE_TIMEOUT_MS: u64 = 5000;

const AP_SSID: &str = match option_env!("ARM_AP_SSID") {
    Some(ssid) => ssid,
    None => "ESP32_AP",
};
const AP_PASSWORD: &str = match option_env!("ARM_AP_PASSWORD") {
    Some(password) => password,
    None => "12345678",
};

/// Pulse widths for SG90-class hobby servos at 0 and 180 degrees.
const MIN_PULSE_US: u32 = 500;
const MAX_PULSE_US: u32 = 2500;

/// Wiring and timing of a single servo slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelConfig {
    pub joint: Joint,
    /// Pulse width commanded at 0 degrees.
    pub min_pulse_us: u32,
    /// Pulse width commanded at 180 degrees.
    pub max_pulse_us: u32,
}

impl ChannelConfig {
    pub const fn new(joint: Joint) -> Self {
        Self {
            joint,
            min_pulse_us: MIN_PULSE_US,
            max_pulse_us: MAX_PULSE_US,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkConfig {
    pub ssid: &'static str,
    pub password: &'static str,
    /// Address of the access point, also the address clients connect to.
    pub address: [u8; 4],
    pub prefix_len: u8,
    pub port: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// A connected client silent for longer than this is dropped.
    pub idle_timeout: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArmConfig {
    /// Indexed by channel: base, shoulder, elbow, gripper.
    pub channels: [ChannelConfig; 4],
    pub pwm_frequency: HertzU32,
    pub network: NetworkConfig,
    pub session: SessionConfig,
}

impl ArmConfig {
    pub const DEFAULT: Self = Self {
        channels: [
            ChannelConfig::new(Joint::Base),
            ChannelConfig::new(Joint::Shoulder),
            ChannelConfig::new(Joint::Elbow),
            ChannelConfig::new(Joint::Gripper),
        ],
        pwm_frequency: HertzU32::from_raw(50),
        network: NetworkConfig {
            ssid: AP_SSID,
            password: AP_PASSWORD,
            address: [192, 168, 4, 1],
            prefix_len: 24,
            port: PORT,
        },
        session: SessionConfig {
            idle_timeout: Duration::from_millis(IDLE_TIMEOUT_MS),
        },
    };
}

impl Default for ArmConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}
