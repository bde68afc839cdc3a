//! The actuation mapper.
//!
//! [`Arm`] owns one [`Servo`] per joint and is the only writer of the PWM channels.
//! Every call is an instantaneous commanded position: there is no smoothing and no
//! rate limiting.
use crate::config::ArmConfig;
use crate::robot::commands::ServoCommand;
use crate::robot::joint::Joint;
use crate::robot::servo::Servo;
use embedded_hal::pwm::SetDutyCycle;
use log::info;

pub const CHANNEL_COUNT: usize = 4;

#[derive(Debug)]
pub struct Arm<PWM> {
    servos: [Servo<PWM>; CHANNEL_COUNT],
}

impl<PWM> Arm<PWM>
where
    PWM: SetDutyCycle,
{
    /// Channels are given in joint order: base, shoulder, elbow, gripper.
    pub fn new(channels: [PWM; CHANNEL_COUNT], config: &ArmConfig) -> Self {
        let mut index = 0;
        let servos = channels.map(|pwm| {
            let servo = Servo::new(pwm, &config.channels[index], config.pwm_frequency);
            index += 1;
            servo
        });
        Self { servos }
    }

    pub fn from_servos(servos: [Servo<PWM>; CHANNEL_COUNT]) -> Self {
        Self { servos }
    }

    /// Commands channel `index` to `angle` degrees.
    ///
    /// Indices outside 0..=3 are ignored and the angle is saturated to 0..=180.
    /// Returns the angle actually written.
    pub fn set_angle(&mut self, index: usize, angle: i32) -> Option<u8> {
        self.servos.get_mut(index)?.set_angle(angle)
    }

    /// Forwards every present field of `cmd` to its channel, returning how many
    /// channels were written.
    pub fn apply(&mut self, cmd: &ServoCommand) -> usize {
        let mut written = 0;
        for (index, field) in cmd.fields.iter().enumerate() {
            let Some(requested) = field.value() else {
                continue;
            };
            if let Some(angle) = self.set_angle(index, requested) {
                info!("{} -> {angle}", self.servos[index].joint());
                written += 1;
            }
        }
        written
    }

    pub fn servo(&self, joint: Joint) -> &Servo<PWM> {
        &self.servos[joint as usize]
    }

    #[cfg(test)]
    pub(crate) fn angles(&self) -> [Option<u8>; CHANNEL_COUNT] {
        core::array::from_fn(|index| self.servos[index].angle())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::robot::commands::Field;
    use crate::robot::servo::mock::MockPwm;
    use crate::robot::servo::DutyBounds;

    pub(crate) const BOUNDS: DutyBounds = DutyBounds::new(1000, 2800);

    pub(crate) fn mock_arm() -> Arm<MockPwm> {
        Arm::from_servos(
            Joint::ALL.map(|joint| Servo::with_bounds(MockPwm::new(u16::MAX), joint, BOUNDS)),
        )
    }

    pub(crate) fn write_counts(arm: &Arm<MockPwm>) -> [usize; CHANNEL_COUNT] {
        Joint::ALL.map(|joint| arm.servo(joint).pwm().writes.len())
    }

    #[test]
    fn new_assigns_joints_in_channel_order() {
        let channels = core::array::from_fn(|_| MockPwm::new(16383));
        let arm = Arm::new(channels, &ArmConfig::DEFAULT);
        for joint in Joint::ALL {
            assert_eq!(arm.servo(joint).joint(), joint);
        }
        assert_eq!(arm.angles(), [None; CHANNEL_COUNT]);
    }

    #[test]
    fn out_of_range_index_is_a_no_op() {
        let mut arm = mock_arm();
        assert_eq!(arm.set_angle(4, 90), None);
        assert_eq!(arm.set_angle(usize::MAX, 90), None);
        assert_eq!(write_counts(&arm), [0; CHANNEL_COUNT]);
    }

    #[test]
    fn apply_writes_only_present_fields() {
        let mut arm = mock_arm();
        let cmd = ServoCommand {
            fields: [Field::Absent, Field::Present(45), Field::Absent, Field::Present(400)],
        };

        assert_eq!(arm.apply(&cmd), 2);
        assert_eq!(write_counts(&arm), [0, 1, 0, 1]);
        assert_eq!(arm.angles(), [None, Some(45), None, Some(180)]);
    }
}
