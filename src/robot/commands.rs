//! Servo command records.
//!
//! A record is one line of loosely JSON-shaped text:
//!
//! ```text
//! {"type":"servo","servo1":90,"servo2":45,"servo3":120,"servo4":10}
//! ```
//!
//! It is scanned, not parsed: each key is looked up independently, so fields may
//! come in any order, any subset may be present and surrounding garbage is
//! tolerated.
use crate::robot::arm::CHANNEL_COUNT;

const TYPE_MARKERS: [&str; 2] = ["\"type\":\"servo\"", "\"type\": \"servo\""];

/// Key markers, indexed by channel.
const FIELD_KEYS: [&str; CHANNEL_COUNT] =
    ["\"servo1\":", "\"servo2\":", "\"servo3\":", "\"servo4\":"];

const FIELD_SEPARATOR: char = ',';
const RECORD_END: char = '}';

/// Decoded value for one channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    /// A non-negative angle as sent; the mapper saturates it to 0..=180.
    Present(i32),
    Absent,
}

impl Field {
    pub fn value(self) -> Option<i32> {
        match self {
            Field::Present(angle) => Some(angle),
            Field::Absent => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseCommandError {
    /// The record does not carry the servo type marker.
    NotServoRecord,
    /// The record is a servo command but none of the four fields decoded.
    NoFields,
}

impl core::fmt::Display for ParseCommandError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ParseCommandError::NotServoRecord => f.write_str("not a servo record"),
            ParseCommandError::NoFields => f.write_str("no servo field found"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServoCommand {
    /// Indexed by channel: base, shoulder, elbow, gripper.
    pub fields: [Field; CHANNEL_COUNT],
}

impl ServoCommand {
    /// Scans `record` for the four servo fields without checking the type marker.
    ///
    /// Fails with [`ParseCommandError::NoFields`] when every field is absent.
    pub fn decode(record: &str) -> Result<Self, ParseCommandError> {
        let fields = FIELD_KEYS.map(|key| decode_field(record, key));
        if fields.iter().all(|field| *field == Field::Absent) {
            return Err(ParseCommandError::NoFields);
        }
        Ok(Self { fields })
    }
}

impl TryFrom<&str> for ServoCommand {
    type Error = ParseCommandError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        if !is_servo_record(value) {
            return Err(ParseCommandError::NotServoRecord);
        }
        Self::decode(value)
    }
}

/// Whether `record` carries the servo type marker, with or without a space after
/// the colon.
pub fn is_servo_record(record: &str) -> bool {
    TYPE_MARKERS.iter().any(|marker| record.contains(marker))
}

fn decode_field(record: &str, key: &str) -> Field {
    let Some(at) = record.find(key) else {
        return Field::Absent;
    };
    let rest = &record[at + key.len()..];
    let end = match (rest.find(FIELD_SEPARATOR), rest.find(RECORD_END)) {
        (Some(sep), Some(close)) => sep.min(close),
        (Some(end), None) | (None, Some(end)) => end,
        (None, None) => return Field::Absent,
    };
    if end == 0 {
        return Field::Absent;
    }

    // Negative values share the absent sentinel: `"servo1":-5` leaves the channel alone.
    match scan_int(&rest[..end]) {
        value if value < 0 => Field::Absent,
        value => Field::Present(value),
    }
}

/// Leading sign and digit scan. Anything that is not a number reads as zero and
/// out-of-range values saturate.
fn scan_int(span: &str) -> i32 {
    let mut bytes = span
        .trim_start_matches(|c: char| c.is_ascii_whitespace())
        .bytes()
        .peekable();

    let negative = match bytes.peek() {
        Some(b'-') => {
            bytes.next();
            true
        }
        Some(b'+') => {
            bytes.next();
            false
        }
        _ => false,
    };

    let mut value: i32 = 0;
    for digit in bytes.map_while(|b| b.is_ascii_digit().then(|| i32::from(b - b'0'))) {
        value = if negative {
            value.saturating_mul(10).saturating_sub(digit)
        } else {
            value.saturating_mul(10).saturating_add(digit)
        };
    }
    value
}
