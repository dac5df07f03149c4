// Alarm severity levels
//
// The monitoring system owns the level enumeration. Levels are carried as
// their numeric code and rendered to text only when written into a cell.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Alarm severity reported by the monitoring system
///
/// Codes without a named level are kept as `Unknown` and render as their
/// decimal value, the same text the monitoring system produces for them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "i32", into = "i32")]
pub enum AlarmLevel {
    Undefined,
    Normal,
    Warning,
    Minor,
    Major,
    Critical,
    Information,
    Timeout,
    Initial,
    Masked,
    Error,
    Notice,
    Suggestion,
    Unknown(i32),
}

impl AlarmLevel {
    /// Map a monitoring-system level code to a level
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => AlarmLevel::Undefined,
            1 => AlarmLevel::Normal,
            2 => AlarmLevel::Warning,
            3 => AlarmLevel::Minor,
            4 => AlarmLevel::Major,
            5 => AlarmLevel::Critical,
            6 => AlarmLevel::Information,
            7 => AlarmLevel::Timeout,
            8 => AlarmLevel::Initial,
            9 => AlarmLevel::Masked,
            10 => AlarmLevel::Error,
            11 => AlarmLevel::Notice,
            12 => AlarmLevel::Suggestion,
            other => AlarmLevel::Unknown(other),
        }
    }

    /// Numeric code used by the monitoring system
    pub fn code(self) -> i32 {
        match self {
            AlarmLevel::Undefined => 0,
            AlarmLevel::Normal => 1,
            AlarmLevel::Warning => 2,
            AlarmLevel::Minor => 3,
            AlarmLevel::Major => 4,
            AlarmLevel::Critical => 5,
            AlarmLevel::Information => 6,
            AlarmLevel::Timeout => 7,
            AlarmLevel::Initial => 8,
            AlarmLevel::Masked => 9,
            AlarmLevel::Error => 10,
            AlarmLevel::Notice => 11,
            AlarmLevel::Suggestion => 12,
            AlarmLevel::Unknown(code) => code,
        }
    }

    fn name(self) -> Option<&'static str> {
        let name = match self {
            AlarmLevel::Undefined => "Undefined",
            AlarmLevel::Normal => "Normal",
            AlarmLevel::Warning => "Warning",
            AlarmLevel::Minor => "Minor",
            AlarmLevel::Major => "Major",
            AlarmLevel::Critical => "Critical",
            AlarmLevel::Information => "Information",
            AlarmLevel::Timeout => "Timeout",
            AlarmLevel::Initial => "Initial",
            AlarmLevel::Masked => "Masked",
            AlarmLevel::Error => "Error",
            AlarmLevel::Notice => "Notice",
            AlarmLevel::Suggestion => "Suggestion",
            AlarmLevel::Unknown(_) => return None,
        };
        Some(name)
    }
}

impl From<i32> for AlarmLevel {
    fn from(code: i32) -> Self {
        AlarmLevel::from_code(code)
    }
}

impl From<AlarmLevel> for i32 {
    fn from(level: AlarmLevel) -> Self {
        level.code()
    }
}

impl fmt::Display for AlarmLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "{}", self.code()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_levels_render_as_names() {
        assert_eq!(AlarmLevel::Critical.to_string(), "Critical");
        assert_eq!(AlarmLevel::Minor.to_string(), "Minor");
        assert_eq!(AlarmLevel::from_code(1).to_string(), "Normal");
    }

    #[test]
    fn test_unknown_code_renders_as_number() {
        let level = AlarmLevel::from_code(42);
        assert_eq!(level, AlarmLevel::Unknown(42));
        assert_eq!(level.to_string(), "42");
        assert_eq!(level.code(), 42);
    }

    #[test]
    fn test_serde_uses_numeric_code() {
        let json = serde_json::to_string(&AlarmLevel::Major).unwrap();
        assert_eq!(json, "4");

        let level: AlarmLevel = serde_json::from_str("5").unwrap();
        assert_eq!(level, AlarmLevel::Critical);
    }
}
