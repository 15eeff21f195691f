//! Path canonicalization shared by diagnostic sources and the tree matcher.
//!
//! Both sides of every comparison go through [`canonical_path`], so a path
//! reported as `C:\proj\a.txt` and a node at `c:/proj/a.txt` compare equal.

use std::fmt;
use std::path::Path;

use serde::Serialize;

/// The separator used by every canonical path.
pub const SEPARATOR: char = '/';

/// An absolute path normalized for comparison.
///
/// Canonical paths use `/` as their only separator, carry no `.` or `..`
/// segments, no repeated or trailing separators, and an uppercase drive
/// letter when one is present. Comparison is otherwise case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct CanonicalPath(String);

impl CanonicalPath {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Canonicalizes a filesystem path.
    pub fn from_path(path: &Path) -> Self {
        canonical_path(path.to_string_lossy())
    }

    /// Checks whether this path lies strictly below `dir`.
    ///
    /// A path is never a descendant of itself.
    pub fn is_strict_descendant_of(&self, dir: &CanonicalPath) -> bool {
        if dir.0.is_empty() || self.0.len() <= dir.0.len() {
            return false;
        }
        if dir.0.ends_with(SEPARATOR) {
            return self.0.starts_with(&dir.0);
        }
        self.0.starts_with(&dir.0) && self.0[dir.0.len()..].starts_with(SEPARATOR)
    }
}

impl fmt::Display for CanonicalPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for CanonicalPath {
    fn from(path: &str) -> Self {
        canonical_path(path)
    }
}

impl From<&Path> for CanonicalPath {
    fn from(path: &Path) -> Self {
        CanonicalPath::from_path(path)
    }
}

/// Normalizes a path string for comparison.
pub fn canonical_path(path: impl AsRef<str>) -> CanonicalPath {
    let path = path.as_ref().trim();
    if path.is_empty() {
        return CanonicalPath(String::new());
    }

    let unified = path.replace('\\', "/");
    let cleaned = path_clean::clean(&unified)
        .to_string_lossy()
        .replace('\\', "/");

    CanonicalPath(uppercase_drive_letter(cleaned))
}

/// `c:/proj` -> `C:/proj`
fn uppercase_drive_letter(path: String) -> String {
    let bytes = path.as_bytes();
    if bytes.len() >= 2 && bytes[0].is_ascii_lowercase() && bytes[1] == b':' {
        let mut upper = String::with_capacity(path.len());
        upper.push(bytes[0].to_ascii_uppercase() as char);
        upper.push_str(&path[1..]);
        upper
    } else {
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backslashes_become_forward_slashes() {
        assert_eq!(canonical_path(r"a\b\c.txt"), canonical_path("a/b/c.txt"));
        assert_eq!(canonical_path(r"a\b\c.txt").as_str(), "a/b/c.txt");
    }

    #[test]
    fn test_dot_segments_and_repeated_separators_are_removed() {
        assert_eq!(canonical_path("/proj/./src//main.rs").as_str(), "/proj/src/main.rs");
        assert_eq!(canonical_path("/proj/src/../lib.rs").as_str(), "/proj/lib.rs");
    }

    #[test]
    fn test_trailing_separator_is_removed() {
        assert_eq!(canonical_path("/proj/src/").as_str(), "/proj/src");
    }

    #[test]
    fn test_root_is_kept() {
        assert_eq!(canonical_path("/").as_str(), "/");
    }

    #[test]
    fn test_empty_path_stays_empty() {
        assert_eq!(canonical_path("").as_str(), "");
    }

    #[test]
    fn test_drive_letter_is_uppercased() {
        assert_eq!(canonical_path(r"c:\proj\a.txt").as_str(), "C:/proj/a.txt");
        assert_eq!(canonical_path(r"c:\proj\a.txt"), canonical_path("C:/proj/a.txt"));
    }

    #[test]
    fn test_comparison_is_case_sensitive_beyond_drive_letter() {
        assert_ne!(canonical_path("/Proj/a.txt"), canonical_path("/proj/a.txt"));
    }

    #[test]
    fn test_strict_descendant() {
        let dir = canonical_path("/proj");
        assert!(canonical_path("/proj/a.txt").is_strict_descendant_of(&dir));
        assert!(canonical_path("/proj/src/deep/a.txt").is_strict_descendant_of(&dir));
        assert!(!canonical_path("/proj").is_strict_descendant_of(&dir));
        assert!(!canonical_path("/project/a.txt").is_strict_descendant_of(&dir));
        assert!(!canonical_path("/other/a.txt").is_strict_descendant_of(&dir));
    }

    #[test]
    fn test_strict_descendant_of_root() {
        let root = canonical_path("/");
        assert!(canonical_path("/a.txt").is_strict_descendant_of(&root));
        assert!(!canonical_path("/").is_strict_descendant_of(&root));
    }

    #[test]
    fn test_nothing_descends_from_empty_path() {
        assert!(!canonical_path("/a.txt").is_strict_descendant_of(&canonical_path("")));
    }
}
