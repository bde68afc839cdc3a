//! ESP32 LEDC binding for the arm.
//!
//! All four servos share one low speed timer running at the configured PWM
//! frequency. Channels start at 0% duty, so the servos stay unpowered until the
//! first command arrives.
extern crate alloc;

use crate::config::ArmConfig;
use crate::robot::arm::{Arm, CHANNEL_COUNT};
use alloc::boxed::Box;
use anyhow::anyhow;
use esp_hal::gpio::AnyPin;
use esp_hal::ledc::channel::{self, Channel, ChannelIFace, Number};
use esp_hal::ledc::timer::{self, LSClockSource, TimerIFace};
use esp_hal::ledc::{LSGlobalClkSource, Ledc, LowSpeed};
use esp_hal::peripherals::LEDC;
use esp_hal::time::Rate;
use log::info;

pub type ServoChannel = Channel<'static, LowSpeed>;

pub fn create_arm(
    ledc: LEDC<'static>,
    servo_pins: [AnyPin<'static>; CHANNEL_COUNT],
    config: &ArmConfig,
) -> anyhow::Result<Arm<ServoChannel>> {
    let mut ledc = Ledc::new(ledc);
    ledc.set_global_slow_clock(LSGlobalClkSource::APBClk);

    let mut servo_timer = ledc.timer::<LowSpeed>(timer::Number::Timer0);
    servo_timer
        .configure(timer::config::Config {
            duty: timer::config::Duty::Duty14Bit,
            clock_source: LSClockSource::APBClk,
            frequency: Rate::from_hz(config.pwm_frequency.raw()),
        })
        .map_err(|e| anyhow!("Fail creating ledc timer: {e:?}"))?;
    // Leak the timer to get static lifetime: the channels reference it forever.
    let servo_timer: &'static timer::Timer<'static, LowSpeed> = Box::leak(Box::new(servo_timer));

    let [p0, p1, p2, p3] = servo_pins;
    let mut channels: [ServoChannel; CHANNEL_COUNT] = [
        ledc.channel(Number::Channel0, p0),
        ledc.channel(Number::Channel1, p1),
        ledc.channel(Number::Channel2, p2),
        ledc.channel(Number::Channel3, p3),
    ];
    for servo_channel in channels.iter_mut() {
        servo_channel
            .configure(channel::config::Config {
                timer: servo_timer,
                duty_pct: 0,
                pin_config: channel::config::PinConfig::PushPull,
            })
            .map_err(|e| anyhow!("Fail configurating servo channel: {e:?}"))?;
    }

    info!("Servo channels ready at {} Hz", config.pwm_frequency.raw());
    Ok(Arm::new(channels, config))
}
