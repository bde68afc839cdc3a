use crate::config::ChannelConfig;
use crate::robot::joint::Joint;
use embedded_hal::pwm::SetDutyCycle;
use fugit::HertzU32;
use log::{debug, error};

pub const MAX_ANGLE: i32 = 180;

/// Duty values commanded at 0 and 180 degrees, in the channel's own resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DutyBounds {
    pub min: u16,
    pub max: u16,
}

impl DutyBounds {
    pub const fn new(min: u16, max: u16) -> Self {
        Self { min, max }
    }

    /// Scales pulse widths to the PWM register resolution.
    ///
    /// Example: 1500 µs / 20000 µs * 16383 ≈ 1228
    pub fn from_pulse_width(
        min_pulse_us: u32,
        max_pulse_us: u32,
        max_duty: u16,
        frequency: HertzU32,
    ) -> Self {
        // THE WIDTH OF THE PULSE DRIVES THE ANGLE, NOT FREQ
        let period_us = u64::from(1_000_000 / frequency.raw());
        let to_duty = |pulse_us: u32| {
            (u64::from(pulse_us) * u64::from(max_duty) / period_us).min(u64::from(max_duty)) as u16
        };

        Self {
            min: to_duty(min_pulse_us),
            max: to_duty(max_pulse_us),
        }
    }
}

/// Maps an angle in degrees onto `bounds`.
///
/// Angles outside 0..=180 are saturated, never rejected.
pub fn angle_to_duty(bounds: DutyBounds, angle: i32) -> u16 {
    interpolate(bounds, clamp_angle(angle))
}

/// Saturates `angle` to 0..=180.
pub fn clamp_angle(angle: i32) -> u8 {
    angle.clamp(0, MAX_ANGLE) as u8
}

fn interpolate(bounds: DutyBounds, angle: u8) -> u16 {
    let min = i32::from(bounds.min);
    let span = i32::from(bounds.max) - min;

    // Linearly interpolate the duty
    (min + span * i32::from(angle) / MAX_ANGLE) as u16
}

pub struct Servo<PWM> {
    pwm: PWM,
    joint: Joint,
    bounds: DutyBounds,
    angle: Option<u8>,
}

impl<PWM> core::fmt::Debug for Servo<PWM> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Servo")
            .field("joint", &self.joint)
            .field("bounds", &self.bounds)
            .field("angle", &self.angle)
            .finish()
    }
}

impl<PWM> Servo<PWM>
where
    PWM: SetDutyCycle,
{
    pub fn new(pwm: PWM, config: &ChannelConfig, frequency: HertzU32) -> Self {
        let bounds = DutyBounds::from_pulse_width(
            config.min_pulse_us,
            config.max_pulse_us,
            pwm.max_duty_cycle(),
            frequency,
        );
        Self::with_bounds(pwm, config.joint, bounds)
    }

    pub fn with_bounds(pwm: PWM, joint: Joint, bounds: DutyBounds) -> Self {
        Self {
            pwm,
            joint,
            bounds,
            angle: None,
        }
    }

    /// Sets the servo angle in degrees.
    ///
    /// # Arguments
    /// * `angle` - Values outside 0..=180 are clamped.
    ///
    /// # Returns
    /// * `Some(angle)` with the clamped angle once the duty cycle is written
    /// * `None` if the PWM driver fails to update the duty cycle; the stored angle is kept
    pub fn set_angle(&mut self, angle: i32) -> Option<u8> {
        let angle = clamp_angle(angle);
        let duty = interpolate(self.bounds, angle);
        debug!("{} duty: {duty}", self.joint);

        match self.pwm.set_duty_cycle(duty) {
            Ok(()) => {
                self.angle = Some(angle);
                self.angle
            }
            Err(e) => {
                error!("{} Error writing angle {angle}: {:?}", self.joint, e);
                None
            }
        }
    }

    /// Last angle written, `None` before the first command.
    pub fn angle(&self) -> Option<u8> {
        self.angle
    }

    pub fn joint(&self) -> Joint {
        self.joint
    }

    pub fn bounds(&self) -> DutyBounds {
        self.bounds
    }

    #[cfg(test)]
    pub(crate) fn pwm(&self) -> &PWM {
        &self.pwm
    }
}

#[cfg(test)]
pub(crate) mod mock {
    use core::convert::Infallible;
    use embedded_hal::pwm::{ErrorKind, ErrorType, SetDutyCycle};

    /// Records every duty cycle written to it.
    #[derive(Debug, Default)]
    pub struct MockPwm {
        pub max_duty: u16,
        pub writes: std::vec::Vec<u16>,
    }

    impl MockPwm {
        pub fn new(max_duty: u16) -> Self {
            Self {
                max_duty,
                writes: std::vec::Vec::new(),
            }
        }

        pub fn last(&self) -> Option<u16> {
            self.writes.last().copied()
        }
    }

    impl ErrorType for MockPwm {
        type Error = Infallible;
    }

    impl SetDutyCycle for MockPwm {
        fn max_duty_cycle(&self) -> u16 {
            self.max_duty
        }

        fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
            self.writes.push(duty);
            Ok(())
        }
    }

    /// A channel whose driver rejects every write.
    #[derive(Debug, Default)]
    pub struct FailingPwm;

    impl ErrorType for FailingPwm {
        type Error = ErrorKind;
    }

    impl SetDutyCycle for FailingPwm {
        fn max_duty_cycle(&self) -> u16 {
            u16::MAX
        }

        fn set_duty_cycle(&mut self, _duty: u16) -> Result<(), Self::Error> {
            Err(ErrorKind::Other)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::{FailingPwm, MockPwm};
    use super::*;
    use proptest::prelude::*;

    const BOUNDS: DutyBounds = DutyBounds::new(1000, 2800);

    #[test]
    fn pulse_widths_scale_to_register_resolution() {
        let bounds = DutyBounds::from_pulse_width(500, 2500, 16383, HertzU32::from_raw(50));
        assert_eq!(bounds, DutyBounds::new(409, 2047));
    }

    #[test]
    fn pulse_wider_than_period_saturates_at_max_duty() {
        let bounds = DutyBounds::from_pulse_width(500, 30_000, 255, HertzU32::from_raw(50));
        assert_eq!(bounds.max, 255);
    }

    #[test]
    fn endpoints_and_fractions_of_the_range() {
        assert_eq!(angle_to_duty(BOUNDS, 0), 1000);
        assert_eq!(angle_to_duty(BOUNDS, 180), 2800);
        assert_eq!(angle_to_duty(BOUNDS, 90), 1900);
        assert_eq!(angle_to_duty(BOUNDS, 45), 1450);
    }

    #[test]
    fn clamp_angle_saturates_both_ends() {
        assert_eq!(clamp_angle(i32::MIN), 0);
        assert_eq!(clamp_angle(-1), 0);
        assert_eq!(clamp_angle(97), 97);
        assert_eq!(clamp_angle(181), 180);
        assert_eq!(clamp_angle(i32::MAX), 180);
    }

    #[test]
    fn set_angle_writes_the_same_duty_as_angle_to_duty() {
        let mut servo = Servo::with_bounds(MockPwm::new(u16::MAX), Joint::Base, BOUNDS);
        for requested in [-500, 0, 33, 90, 179, 180, 1000] {
            servo.set_angle(requested);
            assert_eq!(servo.pwm().last(), Some(angle_to_duty(BOUNDS, requested)));
        }
    }

    #[test]
    fn set_angle_clamps_and_records_the_written_angle() {
        let mut servo = Servo::with_bounds(MockPwm::new(u16::MAX), Joint::Elbow, BOUNDS);
        assert_eq!(servo.angle(), None);

        assert_eq!(servo.set_angle(250), Some(180));
        assert_eq!(servo.pwm().last(), Some(2800));
        assert_eq!(servo.set_angle(-40), Some(0));
        assert_eq!(servo.pwm().last(), Some(1000));
        assert_eq!(servo.angle(), Some(0));
    }

    #[test]
    fn repeated_angle_is_written_again() {
        let mut servo = Servo::with_bounds(MockPwm::new(u16::MAX), Joint::Base, BOUNDS);
        servo.set_angle(90);
        servo.set_angle(90);
        assert_eq!(servo.pwm().writes, [1900, 1900]);
    }

    #[test]
    fn failed_write_keeps_previous_angle() {
        let mut servo = Servo::with_bounds(FailingPwm, Joint::Gripper, BOUNDS);
        assert_eq!(servo.set_angle(90), None);
        assert_eq!(servo.angle(), None);
    }

    #[test]
    fn new_derives_bounds_from_channel_resolution() {
        let config = ChannelConfig::new(Joint::Shoulder);
        let servo = Servo::new(MockPwm::new(16383), &config, HertzU32::from_raw(50));
        assert_eq!(servo.joint(), Joint::Shoulder);
        assert_eq!(servo.bounds(), DutyBounds::new(409, 2047));
    }

    proptest! {
        #[test]
        fn duty_is_monotonic_inside_the_range(a in 0i32..180) {
            let low = angle_to_duty(BOUNDS, a);
            let high = angle_to_duty(BOUNDS, a + 1);
            prop_assert!(low <= high);
            prop_assert!(low >= BOUNDS.min && high <= BOUNDS.max);
        }

        #[test]
        fn out_of_range_angles_saturate(a in any::<i32>()) {
            prop_assert_eq!(angle_to_duty(BOUNDS, a), angle_to_duty(BOUNDS, a.clamp(0, 180)));
        }
    }
}
