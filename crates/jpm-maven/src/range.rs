//! Maven version ranges
//!
//! Supported forms:
//! - `*` or empty: any version
//! - `2.361.4`: exactly that version
//! - `[1.0,2.0)`, `(,2.0]`, `[2.0,)`: intervals with inclusive `[]` or
//!   exclusive `()` ends
//! - `[1.0]`: exactly 1.0
//! - `[1,2),[3,4)`: union of intervals

use crate::version::{VersionError, VersionString};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Bound {
    version: VersionString,
    inclusive: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Interval {
    lower: Option<Bound>,
    upper: Option<Bound>,
}

impl Interval {
    fn contains(&self, version: &VersionString) -> bool {
        let above = self.lower.as_ref().is_none_or(|b| {
            if b.inclusive {
                version >= &b.version
            } else {
                version > &b.version
            }
        });
        let below = self.upper.as_ref().is_none_or(|b| {
            if b.inclusive {
                version <= &b.version
            } else {
                version < &b.version
            }
        });
        above && below
    }
}

/// A set of acceptable versions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRange {
    source: String,
    intervals: Option<Vec<Interval>>,
}

impl VersionRange {
    /// Range accepting every version
    #[must_use]
    pub fn any() -> Self {
        Self {
            source: "*".to_string(),
            intervals: None,
        }
    }

    /// Parse range syntax
    ///
    /// # Errors
    /// Returns [`VersionError::InvalidRange`] for unbalanced brackets or bad
    /// bounds, and the underlying version error for malformed versions.
    pub fn parse(text: &str) -> Result<Self, VersionError> {
        let source = text.trim();
        if source.is_empty() || source == "*" {
            return Ok(Self::any());
        }
        let invalid = |reason: &str| VersionError::InvalidRange {
            range: source.to_string(),
            reason: reason.to_string(),
        };
        if !source.starts_with(['[', '(']) {
            let exact = VersionString::parse(source)?;
            return Ok(Self {
                source: source.to_string(),
                intervals: Some(vec![Interval {
                    lower: Some(Bound {
                        version: exact.clone(),
                        inclusive: true,
                    }),
                    upper: Some(Bound {
                        version: exact,
                        inclusive: true,
                    }),
                }]),
            });
        }

        let mut intervals = Vec::new();
        let mut rest = source;
        while !rest.is_empty() {
            let open = rest.chars().next().ok_or_else(|| invalid("unexpected end"))?;
            if open != '[' && open != '(' {
                return Err(invalid("expected '[' or '('"));
            }
            let close_at = rest.find([']', ')']).ok_or_else(|| invalid("missing closing bracket"))?;
            let close = rest[close_at..].chars().next().unwrap_or(']');
            let body = &rest[1..close_at];
            intervals.push(parse_interval(body, open == '[', close == ']').map_err(|e| match e {
                ParseFailure::Reason(r) => invalid(r),
                ParseFailure::Version(v) => v,
            })?);
            rest = rest[close_at + 1..].trim_start();
            if let Some(tail) = rest.strip_prefix(',') {
                rest = tail.trim_start();
                if rest.is_empty() {
                    return Err(invalid("trailing ','"));
                }
            } else if !rest.is_empty() {
                return Err(invalid("expected ',' between intervals"));
            }
        }
        Ok(Self {
            source: source.to_string(),
            intervals: Some(intervals),
        })
    }

    /// Whether the range accepts every version, including unknown ones
    #[inline]
    #[must_use]
    pub fn is_any(&self) -> bool {
        self.intervals.is_none()
    }

    /// Whether `version` is in the range
    #[must_use]
    pub fn contains(&self, version: &VersionString) -> bool {
        self.intervals
            .as_ref()
            .is_none_or(|intervals| intervals.iter().any(|i| i.contains(version)))
    }

    /// Parse `version` and test membership
    ///
    /// Malformed versions are outside every range except `*`.
    #[must_use]
    pub fn contains_text(&self, version: &str) -> bool {
        match VersionString::parse(version) {
            Ok(parsed) => self.contains(&parsed),
            Err(_) => self.intervals.is_none(),
        }
    }
}

enum ParseFailure {
    Reason(&'static str),
    Version(VersionError),
}

fn bound(text: &str, inclusive: bool) -> Result<Option<Bound>, ParseFailure> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }
    VersionString::parse(text)
        .map(|version| Some(Bound { version, inclusive }))
        .map_err(ParseFailure::Version)
}

fn parse_interval(body: &str, lower_inclusive: bool, upper_inclusive: bool) -> Result<Interval, ParseFailure> {
    match body.split_once(',') {
        None => {
            if !(lower_inclusive && upper_inclusive) {
                return Err(ParseFailure::Reason("single version must use '[...]'"));
            }
            let exact = bound(body, true)?.ok_or(ParseFailure::Reason("empty interval"))?;
            Ok(Interval {
                lower: Some(exact.clone()),
                upper: Some(exact),
            })
        }
        Some((low, high)) => {
            if high.contains(',') {
                return Err(ParseFailure::Reason("too many bounds"));
            }
            let lower = bound(low, lower_inclusive)?;
            let upper = bound(high, upper_inclusive)?;
            if low.trim().is_empty() && lower_inclusive {
                return Err(ParseFailure::Reason("unbounded lower end must use '('"));
            }
            if let (Some(l), Some(u)) = (&lower, &upper) {
                if l.version > u.version {
                    return Err(ParseFailure::Reason("lower bound above upper bound"));
                }
            }
            Ok(Interval { lower, upper })
        }
    }
}

impl Display for VersionRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl FromStr for VersionRange {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Default for VersionRange {
    fn default() -> Self {
        Self::any()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(s: &str) -> VersionRange {
        VersionRange::parse(s).unwrap()
    }

    #[test]
    fn open_ended_ranges() {
        let range = r("[1,)");
        assert!(range.contains_text("2.303.3"));
        assert!(range.contains_text("1"));
        assert!(!range.contains_text("0.9"));
        assert!(r("(,2.0]").contains_text("2.0"));
        assert!(!r("(,2.0)").contains_text("2.0"));
    }

    #[test]
    fn bounded_ranges() {
        let range = r("[2.361,2.400)");
        assert!(range.contains_text("2.361.4"));
        assert!(!range.contains_text("2.400"));
        assert!(!range.contains_text("2.346.1"));
    }

    #[test]
    fn exact_and_union() {
        assert!(r("[2.361.4]").contains_text("2.361.4.0"));
        assert!(r("2.361.4").contains_text("2.361.4"));
        assert!(!r("2.361.4").contains_text("2.361.5"));
        let union = r("[1,2),[3,4)");
        assert!(union.contains_text("1.5"));
        assert!(!union.contains_text("2.5"));
        assert!(union.contains_text("3"));
    }

    #[test]
    fn wildcard_accepts_everything() {
        assert!(r("*").contains_text("anything-goes"));
        assert!(r("").contains_text("${unresolved}"));
        assert!(!r("[1,)").contains_text("${unresolved}"));
        assert!(r("*").is_any());
        assert!(!r("[1,)").is_any());
    }

    #[test]
    fn invalid_ranges() {
        assert!(VersionRange::parse("[1,2").is_err());
        assert!(VersionRange::parse("[2,1]").is_err());
        assert!(VersionRange::parse("(1)").is_err());
        assert!(VersionRange::parse("[1,2],").is_err());
        assert!(VersionRange::parse("[,2]").is_err());
        assert!(matches!(VersionRange::parse("[1..2,)"), Err(VersionError::EmptySegment(_))));
    }
}
