//! Routing of complete records to the arm.
use crate::robot::arm::Arm;
use crate::robot::commands::{ParseCommandError, ServoCommand};
use embedded_hal::pwm::SetDutyCycle;
use log::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// Not a servo record; nothing was decoded.
    Ignored,
    /// A servo record with no usable field.
    DecodeMiss,
    /// A servo command was decoded and this many channels were written.
    Applied(usize),
}

pub fn dispatch<PWM: SetDutyCycle>(record: &str, arm: &mut Arm<PWM>) -> Dispatch {
    let record = record.trim();
    match ServoCommand::try_from(record) {
        Ok(cmd) => Dispatch::Applied(arm.apply(&cmd)),
        Err(ParseCommandError::NotServoRecord) => {
            debug!("Ignoring record: {record}");
            Dispatch::Ignored
        }
        Err(e @ ParseCommandError::NoFields) => {
            warn!("Failed to parse servo command ({e}): {record}");
            Dispatch::DecodeMiss
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::robot::arm::tests::{mock_arm, write_counts, BOUNDS};
    use crate::robot::joint::Joint;

    #[test]
    fn full_command_reaches_bounds_midpoint_and_quarter() {
        let mut arm = mock_arm();
        let outcome = dispatch(
            r#"{"type":"servo","servo1":0,"servo2":180,"servo3":90,"servo4":45}"#,
            &mut arm,
        );

        assert_eq!(outcome, Dispatch::Applied(4));
        let span = BOUNDS.max - BOUNDS.min;
        assert_eq!(arm.servo(Joint::Base).pwm().last(), Some(BOUNDS.min));
        assert_eq!(arm.servo(Joint::Shoulder).pwm().last(), Some(BOUNDS.max));
        assert_eq!(arm.servo(Joint::Elbow).pwm().last(), Some(BOUNDS.min + span / 2));
        assert_eq!(arm.servo(Joint::Gripper).pwm().last(), Some(BOUNDS.min + span / 4));
    }

    #[test]
    fn single_field_changes_only_its_channel() {
        let mut arm = mock_arm();
        assert_eq!(
            dispatch(r#"{"type":"servo","servo2":45}"#, &mut arm),
            Dispatch::Applied(1)
        );
        assert_eq!(write_counts(&arm), [0, 1, 0, 0]);
        assert_eq!(arm.angles(), [None, Some(45), None, None]);
    }

    #[test]
    fn record_without_marker_writes_nothing() {
        let mut arm = mock_arm();
        assert_eq!(
            dispatch(r#"{"servo1":90,"servo2":90}"#, &mut arm),
            Dispatch::Ignored
        );
        assert_eq!(write_counts(&arm), [0; 4]);
    }

    #[test]
    fn negative_field_behaves_as_absent() {
        let mut arm = mock_arm();
        assert_eq!(
            dispatch(r#"{"type":"servo","servo1":-5}"#, &mut arm),
            Dispatch::DecodeMiss
        );
        assert_eq!(write_counts(&arm), [0; 4]);
    }

    #[test]
    fn surrounding_spaces_are_trimmed() {
        let mut arm = mock_arm();
        assert_eq!(
            dispatch(r#"   {"type": "servo","servo4":180}  "#, &mut arm),
            Dispatch::Applied(1)
        );
        assert_eq!(arm.angles()[3], Some(180));
    }
}
