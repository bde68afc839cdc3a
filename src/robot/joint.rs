//! Joint enumeration and display helpers.
//!
//! Defines the [`Joint`] enum identifying each actuator slot of the arm, and
//! provides display formatting for debugging and logging. The discriminant is the
//! channel index.
use core::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Joint {
    Base = 0,
    Shoulder = 1,
    Elbow = 2,
    Gripper = 3,
}

impl Joint {
    pub const ALL: [Joint; 4] = [Joint::Base, Joint::Shoulder, Joint::Elbow, Joint::Gripper];
}

impl Display for Joint {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Joint::Base => f.write_str("base"),
            Joint::Shoulder => f.write_str("shoulder"),
            Joint::Elbow => f.write_str("elbow"),
            Joint::Gripper => f.write_str("gripper"),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct InvalidChannel(pub usize);

impl TryFrom<usize> for Joint {
    type Error = InvalidChannel;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        Joint::ALL.get(value).copied().ok_or(InvalidChannel(value))
    }
}
