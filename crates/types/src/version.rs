//! Version representation and range parsing
//!
//! Upstream projects version themselves in wildly inconsistent schemes, so
//! versions are ordered tuples of mixed segments rather than strict semver:
//! - `1.3.1` - numeric segments compare numerically
//! - `cci.20240101` - date-tagged snapshots sort by their embedded date
//! - `latest` - a floating tag the host resolves before comparison
//!
//! Ranges use a bracketed expression: `[>=1.2 <2.0]`, with `>=`, `<=`, `>`,
//! `<`, `~` (same minor series) and `^` (same major series) comparators,
//! separated by commas or whitespace. `[*]` matches any version and a bare
//! version inside brackets means an exact match.

use ferrite_errors::VersionError;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// One dot- or dash-separated piece of a version string
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Num(u64),
    Alpha(String),
}

impl Segment {
    fn parse(s: &str) -> Self {
        s.parse::<u64>().map_or_else(|_| Self::Alpha(s.to_string()), Self::Num)
    }
}

impl Ord for Segment {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Num(a), Self::Num(b)) => a.cmp(b),
            (Self::Alpha(a), Self::Alpha(b)) => a.cmp(b),
            // Numbered releases sort after tagged pre-releases (1.0 > 1.0-rc)
            (Self::Num(_), Self::Alpha(_)) => Ordering::Greater,
            (Self::Alpha(_), Self::Num(_)) => Ordering::Less,
        }
    }
}

impl PartialOrd for Segment {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// An upstream package version
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Version {
    original: String,
    segments: Vec<Segment>,
}

impl From<Version> for String {
    fn from(version: Version) -> Self {
        version.original
    }
}

impl TryFrom<String> for Version {
    type Error = VersionError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl Version {
    /// Parse a version string
    ///
    /// # Errors
    ///
    /// Returns `VersionError::ParseError` if the input is empty or contains
    /// no usable segments.
    pub fn parse(input: &str) -> Result<Self, VersionError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(VersionError::ParseError {
                input: input.to_string(),
            });
        }
        let segments: Vec<Segment> = trimmed
            .split(['.', '-'])
            .filter(|s| !s.is_empty())
            .map(Segment::parse)
            .collect();
        if segments.is_empty() {
            return Err(VersionError::ParseError {
                input: input.to_string(),
            });
        }
        Ok(Self {
            original: trimmed.to_string(),
            segments,
        })
    }

    /// The version exactly as it was written
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.original
    }

    /// Whether this is the floating `latest` tag, resolved by the host
    #[must_use]
    pub fn is_floating(&self) -> bool {
        self.original == "latest"
    }

    /// Numeric value of the segment at `idx`, if it is numeric
    #[must_use]
    pub fn numeric_segment(&self, idx: usize) -> Option<u64> {
        match self.segments.get(idx) {
            Some(Segment::Num(n)) => Some(*n),
            _ => None,
        }
    }
}

impl FromStr for Version {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.segments == other.segments
    }
}

impl Eq for Version {}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        // Segment-wise. On an equal prefix a trailing numeric segment means
        // a later release (1.2 < 1.2.1) while a trailing alphabetic tag
        // means a pre-release (1.0.0-rc1 < 1.0.0).
        let len = self.segments.len().max(other.segments.len());
        for i in 0..len {
            match (self.segments.get(i), other.segments.get(i)) {
                (Some(a), Some(b)) => match a.cmp(b) {
                    Ordering::Equal => {}
                    non_eq => return non_eq,
                },
                (Some(Segment::Alpha(_)), None) => return Ordering::Less,
                (Some(Segment::Num(_)), None) => return Ordering::Greater,
                (None, Some(Segment::Alpha(_))) => return Ordering::Greater,
                (None, Some(Segment::Num(_))) => return Ordering::Less,
                (None, None) => break,
            }
        }
        Ordering::Equal
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl std::hash::Hash for Version {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.original.hash(state);
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.original)
    }
}

/// Comparator of a single range constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConstraintOp {
    Exact,
    GreaterEqual,
    LessEqual,
    Greater,
    Less,
    /// `~x.y.z`: stays within the same minor series
    Tilde,
    /// `^x.y.z`: stays within the same major series
    Caret,
}

/// A single constraint inside a version range
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constraint {
    pub op: ConstraintOp,
    pub version: Version,
}

impl Constraint {
    fn parse(s: &str, range: &str) -> Result<Self, VersionError> {
        let (op, rest) = if let Some(rest) = s.strip_prefix(">=") {
            (ConstraintOp::GreaterEqual, rest)
        } else if let Some(rest) = s.strip_prefix("<=") {
            (ConstraintOp::LessEqual, rest)
        } else if let Some(rest) = s.strip_prefix('>') {
            (ConstraintOp::Greater, rest)
        } else if let Some(rest) = s.strip_prefix('<') {
            (ConstraintOp::Less, rest)
        } else if let Some(rest) = s.strip_prefix('~') {
            (ConstraintOp::Tilde, rest)
        } else if let Some(rest) = s.strip_prefix('^') {
            (ConstraintOp::Caret, rest)
        } else {
            (ConstraintOp::Exact, s)
        };
        let version = Version::parse(rest).map_err(|_| VersionError::InvalidConstraint {
            constraint: s.to_string(),
            range: range.to_string(),
        })?;
        Ok(Self { op, version })
    }

    /// Check whether a version satisfies this constraint
    #[must_use]
    pub fn matches(&self, candidate: &Version) -> bool {
        match self.op {
            ConstraintOp::Exact => candidate == &self.version,
            ConstraintOp::GreaterEqual => candidate >= &self.version,
            ConstraintOp::LessEqual => candidate <= &self.version,
            ConstraintOp::Greater => candidate > &self.version,
            ConstraintOp::Less => candidate < &self.version,
            ConstraintOp::Tilde => {
                candidate >= &self.version
                    && candidate.numeric_segment(0) == self.version.numeric_segment(0)
                    && candidate.numeric_segment(1) == self.version.numeric_segment(1)
            }
            ConstraintOp::Caret => {
                candidate >= &self.version
                    && candidate.numeric_segment(0) == self.version.numeric_segment(0)
            }
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self.op {
            ConstraintOp::Exact => "",
            ConstraintOp::GreaterEqual => ">=",
            ConstraintOp::LessEqual => "<=",
            ConstraintOp::Greater => ">",
            ConstraintOp::Less => "<",
            ConstraintOp::Tilde => "~",
            ConstraintOp::Caret => "^",
        };
        write!(f, "{op}{}", self.version)
    }
}

/// A version range: the conjunction of its constraints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionRange {
    constraints: Vec<Constraint>,
    any: bool,
}

impl VersionRange {
    /// Parse a range expression, with or without the surrounding brackets
    ///
    /// # Errors
    ///
    /// Returns `VersionError::InvalidRange` for an empty expression and
    /// `VersionError::InvalidConstraint` for an unparsable constraint.
    pub fn parse(input: &str) -> Result<Self, VersionError> {
        let trimmed = input.trim();
        let inner = trimmed
            .strip_prefix('[')
            .and_then(|s| s.strip_suffix(']'))
            .unwrap_or(trimmed)
            .trim();
        if inner.is_empty() {
            return Err(VersionError::InvalidRange {
                input: input.to_string(),
            });
        }
        if inner == "*" {
            return Ok(Self {
                constraints: Vec::new(),
                any: true,
            });
        }
        let constraints = inner
            .split([',', ' '])
            .filter(|s| !s.trim().is_empty())
            .map(|s| Constraint::parse(s.trim(), trimmed))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            constraints,
            any: false,
        })
    }

    /// Range matching exactly one version
    #[must_use]
    pub fn exact(version: Version) -> Self {
        Self {
            constraints: vec![Constraint {
                op: ConstraintOp::Exact,
                version,
            }],
            any: false,
        }
    }

    /// Range matching any version (`[*]`)
    #[must_use]
    pub fn any() -> Self {
        Self {
            constraints: Vec::new(),
            any: true,
        }
    }

    /// Whether this range matches every version
    #[must_use]
    pub fn is_any(&self) -> bool {
        self.any
    }

    /// Check whether a version satisfies every constraint
    #[must_use]
    pub fn matches(&self, candidate: &Version) -> bool {
        self.any || self.constraints.iter().all(|c| c.matches(candidate))
    }

    /// Pick the highest matching version out of `candidates`
    #[must_use]
    pub fn best_match<'a, I>(&self, candidates: I) -> Option<&'a Version>
    where
        I: IntoIterator<Item = &'a Version>,
    {
        candidates
            .into_iter()
            .filter(|v| self.matches(v))
            .max_by(|a, b| a.cmp(b))
    }
}

impl FromStr for VersionRange {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.any {
            return write!(f, "[*]");
        }
        let parts: Vec<String> = self.constraints.iter().map(ToString::to_string).collect();
        write!(f, "[{}]", parts.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    #[test]
    fn numeric_ordering() {
        assert!(v("1.10.0") > v("1.9.3"));
        assert!(v("1.2") < v("1.2.1"));
        assert!(v("2.0") > v("1.99.99"));
    }

    #[test]
    fn date_tags_sort_by_date() {
        assert!(v("cci.20240315") > v("cci.20231201"));
        assert_eq!(v("cci.20240315"), v("cci.20240315"));
    }

    #[test]
    fn pre_release_sorts_before_release() {
        assert!(v("1.0.0-rc1") < v("1.0.0"));
    }

    #[test]
    fn range_conjunction() {
        let range = VersionRange::parse("[>=1.2 <2.0]").unwrap();
        assert!(range.matches(&v("1.5.0")));
        assert!(!range.matches(&v("2.0")));
        assert!(!range.matches(&v("1.1.9")));
    }

    #[test]
    fn range_comma_separated() {
        let range = VersionRange::parse("[>=1.2, <2.0]").unwrap();
        assert!(range.matches(&v("1.2")));
    }

    #[test]
    fn tilde_stays_in_minor_series() {
        let range = VersionRange::parse("[~1.2.3]").unwrap();
        assert!(range.matches(&v("1.2.9")));
        assert!(!range.matches(&v("1.3.0")));
    }

    #[test]
    fn caret_stays_in_major_series() {
        let range = VersionRange::parse("[^1.2.3]").unwrap();
        assert!(range.matches(&v("1.9.0")));
        assert!(!range.matches(&v("2.0.0")));
    }

    #[test]
    fn wildcard_matches_everything() {
        let range = VersionRange::parse("[*]").unwrap();
        assert!(range.is_any());
        assert!(range.matches(&v("cci.20240101")));
    }

    #[test]
    fn best_match_picks_highest() {
        let versions = vec![v("1.1.0"), v("1.4.2"), v("2.0.0")];
        let range = VersionRange::parse("[<2.0.0]").unwrap();
        assert_eq!(range.best_match(versions.iter()), Some(&v("1.4.2")));
    }

    #[test]
    fn exact_range_from_bare_version() {
        let range = VersionRange::parse("[1.7.18]").unwrap();
        assert!(range.matches(&v("1.7.18")));
        assert!(!range.matches(&v("1.7.19")));
    }
}
