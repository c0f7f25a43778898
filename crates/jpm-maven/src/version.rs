//! Version Comparator
//!
//! [`VersionString`] is the single comparison law every version-gated
//! recipe relies on:
//!
//! 1. Split on `.` and `-`.
//! 2. Each segment is a numeric prefix plus an alphanumeric remainder
//!    (`17` = `17`+``, `1a` = `1`+`a`, `SNAPSHOT` = none+`snapshot`).
//! 3. Pad the shorter list with `0` segments.
//! 4. Compare pairwise: numeric prefixes numerically (a segment without one
//!    sorts first), then remainders lexicographically, ignoring case.
//!
//! Padding makes `4.40` equal to `4.40.0`, and the missing-prefix rule puts
//! `1.0-SNAPSHOT` before `1.0`.

use smallvec::SmallVec;
use std::cmp::Ordering;
use std::fmt::{self, Display, Formatter};
use std::hash::{Hash, Hasher};
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct Segment {
    /// Digits with leading zeros stripped ("0" for zero), `None` if absent
    numeric: Option<String>,
    /// Lowercased remainder after the digits
    rest: String,
}

impl Segment {
    fn zero() -> Self {
        Self {
            numeric: Some("0".to_string()),
            rest: String::new(),
        }
    }

    fn is_zero(&self) -> bool {
        self.numeric.as_deref() == Some("0") && self.rest.is_empty()
    }

    fn parse(text: &str) -> Self {
        let digits_end = text.find(|c: char| !c.is_ascii_digit()).unwrap_or(text.len());
        let (digits, rest) = text.split_at(digits_end);
        let numeric = (!digits.is_empty()).then(|| {
            let trimmed = digits.trim_start_matches('0');
            let normalized = if trimmed.is_empty() { "0" } else { trimmed };
            normalized.to_string()
        });
        Self {
            numeric,
            rest: rest.to_ascii_lowercase(),
        }
    }
}

impl Ord for Segment {
    fn cmp(&self, other: &Self) -> Ordering {
        let numeric = match (&self.numeric, &other.numeric) {
            (Some(a), Some(b)) => a.len().cmp(&b.len()).then_with(|| a.cmp(b)),
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        numeric.then_with(|| self.rest.cmp(&other.rest))
    }
}

impl PartialOrd for Segment {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A parsed, totally ordered version
#[derive(Debug, Clone)]
pub struct VersionString {
    raw: String,
    segments: SmallVec<[Segment; 6]>,
}

impl VersionString {
    /// Parse a version
    ///
    /// # Errors
    /// Returns [`VersionError`] for empty input, empty segments, unresolved
    /// `${...}` placeholders, or characters outside `[A-Za-z0-9_+.-]`.
    pub fn parse(raw: &str) -> Result<Self, VersionError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(VersionError::Empty);
        }
        if trimmed.contains("${") {
            return Err(VersionError::Unresolved(trimmed.to_string()));
        }
        let mut segments = SmallVec::new();
        for part in trimmed.split(['.', '-']) {
            if part.is_empty() {
                return Err(VersionError::EmptySegment(trimmed.to_string()));
            }
            if let Some(bad) = part.chars().find(|c| !c.is_ascii_alphanumeric() && *c != '_' && *c != '+') {
                return Err(VersionError::InvalidCharacter {
                    version: trimmed.to_string(),
                    character: bad,
                });
            }
            segments.push(Segment::parse(part));
        }
        Ok(Self {
            raw: trimmed.to_string(),
            segments,
        })
    }

    /// Text as written
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Number of segments as written, before padding
    #[inline]
    #[must_use]
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Strictly greater than `other`
    #[inline]
    #[must_use]
    pub fn is_newer_than(&self, other: &Self) -> bool {
        self > other
    }

    /// Text up to the last `.`, e.g. `2.452` for `2.452.4`
    #[must_use]
    pub fn without_last_segment(&self) -> Option<&str> {
        self.raw.rfind('.').map(|i| &self.raw[..i])
    }

    /// Text after the last `.`, e.g. `4` for `2.452.4`
    #[must_use]
    pub fn last_segment(&self) -> &str {
        self.raw.rfind('.').map_or(self.raw.as_str(), |i| &self.raw[i + 1..])
    }

    fn significant(&self) -> &[Segment] {
        let keep = self
            .segments
            .iter()
            .rposition(|s| !s.is_zero())
            .map_or(0, |i| i + 1);
        &self.segments[..keep]
    }
}

/// Compare two version texts
///
/// # Errors
/// Returns [`VersionError`] if either side is malformed.
pub fn compare(a: &str, b: &str) -> Result<Ordering, VersionError> {
    Ok(VersionString::parse(a)?.cmp(&VersionString::parse(b)?))
}

impl Ord for VersionString {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.segments.len().max(other.segments.len());
        let zero = Segment::zero();
        (0..len)
            .map(|i| {
                let a = self.segments.get(i).unwrap_or(&zero);
                let b = other.segments.get(i).unwrap_or(&zero);
                a.cmp(b)
            })
            .find(|o| o.is_ne())
            .unwrap_or(Ordering::Equal)
    }
}

impl PartialOrd for VersionString {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for VersionString {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other).is_eq()
    }
}

impl Eq for VersionString {}

impl Hash for VersionString {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.significant().hash(state);
    }
}

impl Display for VersionString {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl FromStr for VersionString {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl serde::Serialize for VersionString {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

impl<'de> serde::Deserialize<'de> for VersionString {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Errors parsing versions and version ranges
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VersionError {
    /// Nothing to parse
    #[error("empty version")]
    Empty,

    /// `1..2`, `1.`, `-1`
    #[error("version '{0}' has an empty segment")]
    EmptySegment(String),

    /// Character outside the version grammar
    #[error("version '{version}' contains invalid character '{character}'")]
    InvalidCharacter {
        /// The version text
        version: String,
        /// First offending character
        character: char,
    },

    /// A `${property}` reference that was never resolved
    #[error("version '{0}' contains an unresolved property reference")]
    Unresolved(String),

    /// Malformed range syntax
    #[error("invalid version range '{range}': {reason}")]
    InvalidRange {
        /// The range text
        range: String,
        /// What was wrong
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn v(s: &str) -> VersionString {
        VersionString::parse(s).unwrap()
    }

    #[test]
    fn numeric_segments_compare_numerically() {
        assert!(v("2.303.3") > v("2.107.3"));
        assert!(v("4.40") > v("3.40"));
        assert!(v("2.10") > v("2.9"));
        assert!(v("1.0010") > v("1.9"));
    }

    #[test]
    fn padding_makes_trailing_zeros_equal() {
        assert_eq!(v("4.40"), v("4.40.0"));
        assert_eq!(v("4.40").cmp(&v("4.40.0.0")), Ordering::Equal);
        assert!(v("4.40.1") > v("4.40"));
    }

    #[test]
    fn qualifiers_sort_before_release() {
        assert!(v("1.0-SNAPSHOT") < v("1.0"));
        assert!(v("1.0-alpha") < v("1.0-beta"));
        assert!(v("1.0-RC1") == v("1.0-rc1"));
        assert!(v("1.0-rc1") < v("1.0.1"));
    }

    #[test]
    fn mixed_segments_use_numeric_prefix_first() {
        assert!(v("1.10a") > v("1.9b"));
        assert!(v("1.9b") > v("1.9a"));
        assert!(v("1981.v17df70e84a_a_1") > v("1980.vabc"));
    }

    #[test]
    fn malformed_versions_are_rejected() {
        assert_eq!(VersionString::parse(""), Err(VersionError::Empty));
        assert!(matches!(VersionString::parse("1..2"), Err(VersionError::EmptySegment(_))));
        assert!(matches!(VersionString::parse("1.2."), Err(VersionError::EmptySegment(_))));
        assert!(matches!(
            VersionString::parse("${jenkins.version}"),
            Err(VersionError::Unresolved(_))
        ));
        assert!(matches!(
            VersionString::parse("1.2 beta"),
            Err(VersionError::InvalidCharacter { character: ' ', .. })
        ));
    }

    #[test]
    fn baseline_helpers() {
        let target = v("2.452.4");
        assert_eq!(target.without_last_segment(), Some("2.452"));
        assert_eq!(target.last_segment(), "4");
        assert_eq!(v("4").without_last_segment(), None);
    }

    #[test]
    fn compare_text() {
        assert_eq!(compare("2.361.4", "2.361.4").unwrap(), Ordering::Equal);
        assert!(compare("x..y", "1").is_err());
    }

    #[test]
    fn serde_round_trips_text() {
        let version: VersionString = serde_json::from_str("\"2.303.3\"").unwrap();
        assert_eq!(version.as_str(), "2.303.3");
        assert!(serde_json::from_str::<VersionString>("\"1..2\"").is_err());
    }

    fn version_text() -> impl Strategy<Value = String> {
        let segment = prop_oneof![
            (0u32..30).prop_map(|n| n.to_string()),
            "[a-c]{1,3}",
            (0u32..9, "[a-b]{1,2}").prop_map(|(n, s)| format!("{n}{s}")),
        ];
        (proptest::collection::vec(segment, 1..5), proptest::collection::vec(prop_oneof![Just('.'), Just('-')], 4))
            .prop_map(|(segments, seps)| {
                let mut out = String::new();
                for (i, s) in segments.iter().enumerate() {
                    if i > 0 {
                        out.push(seps[i - 1]);
                    }
                    out.push_str(s);
                }
                out
            })
    }

    proptest! {
        #[test]
        fn comparison_is_antisymmetric(a in version_text(), b in version_text()) {
            let (a, b) = (v(&a), v(&b));
            prop_assert_eq!(a.cmp(&b), b.cmp(&a).reverse());
        }

        #[test]
        fn comparison_is_transitive(a in version_text(), b in version_text(), c in version_text()) {
            let (a, b, c) = (v(&a), v(&b), v(&c));
            if a <= b && b <= c {
                prop_assert!(a <= c);
            }
            if a >= b && b >= c {
                prop_assert!(a >= c);
            }
        }

        #[test]
        fn zero_padding_is_neutral(a in version_text(), zeros in 1usize..4) {
            let padded = format!("{a}{}", ".0".repeat(zeros));
            prop_assert_eq!(v(&a), v(&padded));
            let mut h1 = std::collections::hash_map::DefaultHasher::new();
            let mut h2 = std::collections::hash_map::DefaultHasher::new();
            v(&a).hash(&mut h1);
            v(&padded).hash(&mut h2);
            prop_assert_eq!(h1.finish(), h2.finish());
        }

        #[test]
        fn equality_is_reflexive(a in version_text()) {
            prop_assert_eq!(v(&a).cmp(&v(&a)), Ordering::Equal);
        }
    }
}
