//! Diagnostic severity levels and acceptance ranges.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The severity of a diagnostic.
///
/// Numeric levels follow the LSP convention: `Error = 1` through `Hint = 4`.
/// A lower level is more severe, so the derived ordering puts `Error` first
/// and "worst" always means "smallest".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "SeverityRepr")]
#[repr(u8)]
pub enum Severity {
    Error = 1,
    Warning = 2,
    Information = 3,
    Hint = 4,
}

/// How one severity relates to another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeverityOrdering {
    Worse,
    Same,
    Better,
}

impl Severity {
    /// All severities, most severe first.
    pub const ALL: [Severity; 4] = [
        Severity::Error,
        Severity::Warning,
        Severity::Information,
        Severity::Hint,
    ];

    /// The numeric level (1 = error, 4 = hint).
    pub fn level(self) -> u8 {
        self as u8
    }

    /// Converts a numeric level into a severity.
    pub fn from_level(level: u64) -> Option<Self> {
        match level {
            1 => Some(Severity::Error),
            2 => Some(Severity::Warning),
            3 => Some(Severity::Information),
            4 => Some(Severity::Hint),
            _ => None,
        }
    }

    /// Converts a severity name into a severity, ignoring case.
    ///
    /// Accepts both `info` and `information`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "error" => Some(Severity::Error),
            "warning" | "warn" => Some(Severity::Warning),
            "information" | "info" => Some(Severity::Information),
            "hint" => Some(Severity::Hint),
            _ => None,
        }
    }

    /// Compares this severity against another one.
    pub fn compare(self, other: Severity) -> SeverityOrdering {
        match self.level().cmp(&other.level()) {
            std::cmp::Ordering::Less => SeverityOrdering::Worse,
            std::cmp::Ordering::Equal => SeverityOrdering::Same,
            std::cmp::Ordering::Greater => SeverityOrdering::Better,
        }
    }

    /// Returns the more severe of the two.
    pub fn worst_of(self, other: Severity) -> Severity {
        if other.level() < self.level() {
            other
        } else {
            self
        }
    }

    /// Checks whether the severity falls inside an acceptance range.
    pub fn in_range(self, range: &SeverityRange) -> bool {
        range.contains(self)
    }

    /// Reduces an iterator of severities to the worst one.
    pub fn worst<I: IntoIterator<Item = Severity>>(severities: I) -> Option<Severity> {
        severities.into_iter().reduce(Severity::worst_of)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Information => write!(f, "info"),
            Severity::Hint => write!(f, "hint"),
        }
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(level) = s.trim().parse::<u64>() {
            return Severity::from_level(level)
                .ok_or_else(|| format!("Severity level must be between 1 and 4, got {level}"));
        }
        Severity::from_name(s).ok_or_else(|| {
            format!("Unknown severity '{s}'. Expected one of: error, warning, info, hint")
        })
    }
}

/// Configuration representation of a severity: either a name or a level.
#[derive(Deserialize)]
#[serde(untagged)]
enum SeverityRepr {
    Level(u64),
    Name(String),
}

impl TryFrom<SeverityRepr> for Severity {
    type Error = String;

    fn try_from(repr: SeverityRepr) -> Result<Self, String> {
        match repr {
            SeverityRepr::Level(level) => Severity::from_level(level)
                .ok_or_else(|| format!("Severity level must be between 1 and 4, got {level}")),
            SeverityRepr::Name(name) => name.parse(),
        }
    }
}

/// An inclusive window of accepted severities.
///
/// `min` is the least severe level accepted and `max` the most severe, so a
/// severity is accepted when `max <= severity <= min` by numeric level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeverityRange {
    pub min: Severity,
    pub max: Severity,
}

impl Default for SeverityRange {
    fn default() -> Self {
        Self {
            min: Severity::Hint,
            max: Severity::Error,
        }
    }
}

impl SeverityRange {
    pub fn new(min: Severity, max: Severity) -> Self {
        Self { min, max }
    }

    /// Checks whether a severity is accepted by this range.
    pub fn contains(&self, severity: Severity) -> bool {
        self.max.level() <= severity.level() && severity.level() <= self.min.level()
    }

    /// A range whose `min` is more severe than its `max` accepts nothing.
    pub fn is_inverted(&self) -> bool {
        self.min.level() < self.max.level()
    }
}

impl fmt::Display for SeverityRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.max, self.min)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worst_of_is_commutative_and_idempotent() {
        for a in Severity::ALL {
            assert_eq!(a.worst_of(a), a);
            for b in Severity::ALL {
                assert_eq!(a.worst_of(b), b.worst_of(a));
            }
        }
    }

    #[test]
    fn test_worst_of_prefers_lower_level() {
        assert_eq!(Severity::Hint.worst_of(Severity::Error), Severity::Error);
        assert_eq!(Severity::Warning.worst_of(Severity::Information), Severity::Warning);
    }

    #[test]
    fn test_compare() {
        assert_eq!(Severity::Error.compare(Severity::Hint), SeverityOrdering::Worse);
        assert_eq!(Severity::Hint.compare(Severity::Error), SeverityOrdering::Better);
        assert_eq!(Severity::Warning.compare(Severity::Warning), SeverityOrdering::Same);
    }

    #[test]
    fn test_derived_order_matches_levels() {
        assert!(Severity::Error < Severity::Warning);
        assert!(Severity::Warning < Severity::Information);
        assert!(Severity::Information < Severity::Hint);
    }

    #[test]
    fn test_in_range_matches_level_bounds() {
        for min in Severity::ALL {
            for max in Severity::ALL {
                let range = SeverityRange::new(min, max);
                for s in Severity::ALL {
                    let expected = max.level() <= s.level() && s.level() <= min.level();
                    assert_eq!(s.in_range(&range), expected, "{s} in {range}");
                }
            }
        }
    }

    #[test]
    fn test_in_range_includes_boundaries() {
        let range = SeverityRange::new(Severity::Information, Severity::Warning);
        assert!(Severity::Warning.in_range(&range));
        assert!(Severity::Information.in_range(&range));
        assert!(!Severity::Error.in_range(&range));
        assert!(!Severity::Hint.in_range(&range));
    }

    #[test]
    fn test_default_range_accepts_everything() {
        let range = SeverityRange::default();
        assert!(Severity::ALL.iter().all(|s| range.contains(*s)));
        assert!(!range.is_inverted());
    }

    #[test]
    fn test_inverted_range() {
        let range = SeverityRange::new(Severity::Error, Severity::Hint);
        assert!(range.is_inverted());
        assert!(Severity::ALL.iter().all(|s| !range.contains(*s)));
    }

    #[test]
    fn test_worst_of_iterator() {
        let worst = Severity::worst([Severity::Hint, Severity::Warning, Severity::Information]);
        assert_eq!(worst, Some(Severity::Warning));
        assert_eq!(Severity::worst([]), None);
    }

    #[test]
    fn test_parse_names_and_levels() {
        assert_eq!("error".parse::<Severity>(), Ok(Severity::Error));
        assert_eq!("Warning".parse::<Severity>(), Ok(Severity::Warning));
        assert_eq!("info".parse::<Severity>(), Ok(Severity::Information));
        assert_eq!("information".parse::<Severity>(), Ok(Severity::Information));
        assert_eq!("4".parse::<Severity>(), Ok(Severity::Hint));
        assert!("5".parse::<Severity>().is_err());
        assert!("fatal".parse::<Severity>().is_err());
    }

    #[test]
    fn test_deserialize_name_or_level() {
        let range: SeverityRange =
            serde_json::from_str(r#"{ "min": "information", "max": 2 }"#).unwrap();
        assert_eq!(range, SeverityRange::new(Severity::Information, Severity::Warning));
    }

    #[test]
    fn test_deserialize_rejects_unknown_level() {
        assert!(serde_json::from_str::<Severity>("9").is_err());
    }

    #[test]
    fn test_serialize_lowercase() {
        assert_eq!(serde_json::to_string(&Severity::Error).unwrap(), "\"error\"");
        assert_eq!(
            serde_json::to_string(&Severity::Information).unwrap(),
            "\"information\""
        );
    }
}
