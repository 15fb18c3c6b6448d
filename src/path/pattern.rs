// Copyright (c) 2025 - Cowboy AI, Inc.
//! Path Patterns
//!
//! A pattern is a dotted template whose segments are literals or typed
//! wildcards:
//!
//! ```text
//! interfaces.*                         generic wildcard
//! protocols.bgp.neighbors.<*:ip>       IP wildcard (hex-encoded segment)
//! subscribers.<*:mac>.vlan.<*:uint16>  several wildcards, left to right
//! ```
//!
//! # Examples
//!
//! ```rust
//! use bng_config::path::PathPattern;
//!
//! let pattern = PathPattern::parse("protocols.bgp.neighbors.<*:ip>").unwrap();
//! let path = pattern.build(&["203.0.113.5"]).unwrap();
//! assert!(pattern.matches(&path));
//! assert_eq!(pattern.extract(&path).unwrap(), vec!["203.0.113.5".to_string()]);
//! ```

use std::fmt;
use std::str::FromStr;

use super::codec::{self, PathError, WildcardKind};
use super::split_path;

/// One segment of a pattern
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    Literal(String),
    Wildcard(WildcardKind),
}

impl Segment {
    pub fn literal(name: impl Into<String>) -> Self {
        Segment::Literal(name.into())
    }

    fn parse(raw: &str) -> Result<Self, PathError> {
        if raw == "*" {
            return Ok(Segment::Wildcard(WildcardKind::Generic));
        }
        if let Some(inner) = raw.strip_prefix('<').and_then(|s| s.strip_suffix('>')) {
            let token = inner.strip_prefix("*:").unwrap_or(inner);
            return Ok(Segment::Wildcard(WildcardKind::from_str(token)?));
        }
        Ok(Segment::Literal(raw.to_string()))
    }

    fn matches(&self, segment: &str) -> bool {
        match self {
            Segment::Literal(lit) => lit == segment,
            Segment::Wildcard(kind) => codec::segment_matches(*kind, segment),
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Literal(lit) => f.write_str(lit),
            Segment::Wildcard(WildcardKind::Generic) => f.write_str("*"),
            Segment::Wildcard(kind) => write!(f, "<*:{}>", kind.token()),
        }
    }
}

/// Dotted path template with typed wildcards
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathPattern {
    raw: String,
    segments: Vec<Segment>,
}

impl PathPattern {
    /// Parse a pattern string
    ///
    /// # Errors
    /// - `EmptySegment` for `a..b`, leading or trailing dots
    /// - `UnknownKind` for `<*:nope>`
    pub fn parse(pattern: impl AsRef<str>) -> Result<Self, PathError> {
        let pattern = pattern.as_ref();
        let segments = split_path(pattern)?
            .into_iter()
            .map(Segment::parse)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            raw: pattern.to_string(),
            segments,
        })
    }

    /// Assemble a pattern from typed segments
    pub fn from_segments(segments: Vec<Segment>) -> Self {
        let raw = segments
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(".");
        Self { raw, segments }
    }

    /// The pattern as written; used as the registry key
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn wildcard_count(&self) -> usize {
        self.segments
            .iter()
            .filter(|s| matches!(s, Segment::Wildcard(_)))
            .count()
    }

    pub fn literal_count(&self) -> usize {
        self.segments.len() - self.wildcard_count()
    }

    /// True when the pattern has no wildcards
    pub fn is_concrete(&self) -> bool {
        self.wildcard_count() == 0
    }

    /// Check whether a concrete path is an instance of this pattern
    pub fn matches(&self, path: &str) -> bool {
        let parts: Vec<&str> = path.split('.').collect();
        parts.len() == self.segments.len()
            && self
                .segments
                .iter()
                .zip(parts.iter())
                .all(|(seg, part)| seg.matches(part))
    }

    /// Substitute `values` into the wildcards, left to right
    ///
    /// # Errors
    /// - `ValueCountMismatch` unless there is exactly one value per wildcard
    /// - `Encoding` if a value does not parse as its wildcard kind
    pub fn build<S: AsRef<str>>(&self, values: &[S]) -> Result<String, PathError> {
        let expected = self.wildcard_count();
        if values.len() != expected {
            return Err(PathError::ValueCountMismatch {
                pattern: self.raw.clone(),
                expected,
                actual: values.len(),
            });
        }

        let mut values = values.iter();
        let mut parts = Vec::with_capacity(self.segments.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(lit) => parts.push(lit.clone()),
                Segment::Wildcard(kind) => {
                    // count checked above
                    let value = values.next().map(|v| v.as_ref()).unwrap_or_default();
                    parts.push(codec::encode(*kind, value)?);
                }
            }
        }
        Ok(parts.join("."))
    }

    /// Recover wildcard values from a path assumed to match this pattern
    ///
    /// Literal segments are not compared; only the segment count is checked.
    pub fn extract(&self, path: &str) -> Result<Vec<String>, PathError> {
        let parts: Vec<&str> = path.split('.').collect();
        if parts.len() != self.segments.len() {
            return Err(PathError::SegmentCountMismatch {
                path: path.to_string(),
                pattern: self.raw.clone(),
                expected: self.segments.len(),
                actual: parts.len(),
            });
        }

        Ok(self
            .segments
            .iter()
            .zip(parts)
            .filter_map(|(segment, part)| match segment {
                Segment::Wildcard(kind) => Some(codec::decode(*kind, part)),
                Segment::Literal(_) => None,
            })
            .collect())
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

impl FromStr for PathPattern {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Build a concrete path from a pattern string and its wildcard values
pub fn build<S: AsRef<str>>(pattern: &str, values: &[S]) -> Result<String, PathError> {
    PathPattern::parse(pattern)?.build(values)
}

/// Extract wildcard values from `path` given the pattern it matches
pub fn extract(path: &str, pattern: &str) -> Result<Vec<String>, PathError> {
    PathPattern::parse(pattern)?.extract(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_segments_matches_parse() {
        let built = PathPattern::from_segments(vec![
            Segment::literal("protocols"),
            Segment::literal("bgp"),
            Segment::literal("neighbors"),
            Segment::Wildcard(WildcardKind::Ip),
        ]);
        assert_eq!(built, PathPattern::parse("protocols.bgp.neighbors.<*:ip>").unwrap());

        let generic = PathPattern::from_segments(vec![
            Segment::literal("interfaces"),
            Segment::Wildcard(WildcardKind::Generic),
        ]);
        assert_eq!(generic.as_str(), "interfaces.*");
    }

    #[test]
    fn test_parse_segments() {
        let pattern = PathPattern::parse("subscribers.<*:mac>.vlan.<uint16>").unwrap();
        assert_eq!(
            pattern.segments(),
            &[
                Segment::Literal("subscribers".into()),
                Segment::Wildcard(WildcardKind::Mac),
                Segment::Literal("vlan".into()),
                Segment::Wildcard(WildcardKind::Uint16),
            ]
        );
        assert_eq!(pattern.wildcard_count(), 2);
        assert_eq!(pattern.literal_count(), 2);
    }

    #[test]
    fn test_parse_generic_forms() {
        for raw in ["interfaces.*", "interfaces.<*>"] {
            let pattern = PathPattern::parse(raw).unwrap();
            assert_eq!(pattern.segments()[1], Segment::Wildcard(WildcardKind::Generic));
        }
    }

    #[test]
    fn test_parse_rejects_empty_and_unknown() {
        assert!(matches!(
            PathPattern::parse("interfaces..mtu"),
            Err(PathError::EmptySegment(_))
        ));
        assert!(matches!(
            PathPattern::parse("a.<*:float>"),
            Err(PathError::UnknownKind(_))
        ));
    }

    #[test]
    fn test_matches() {
        let pattern = PathPattern::parse("interfaces.*").unwrap();
        assert!(pattern.matches("interfaces.eth0"));
        assert!(!pattern.matches("interfaces"));
        assert!(!pattern.matches("interfaces.eth0.mtu"));
        assert!(!pattern.matches("vrfs.eth0"));
    }

    #[test]
    fn test_typed_wildcard_matches_only_encoded() {
        let pattern = PathPattern::parse("protocols.bgp.neighbors.<*:ip>").unwrap();
        let path = pattern.build(&["198.51.100.7"]).unwrap();
        assert!(pattern.matches(&path));
        assert!(!pattern.matches("protocols.bgp.neighbors.peer1"));
    }

    #[test]
    fn test_build_value_count_mismatch() {
        let pattern = PathPattern::parse("subscribers.<*:mac>.vlan.<uint16>").unwrap();
        let err = pattern.build(&["00:11:22:33:44:55"]).unwrap_err();
        assert_eq!(
            err,
            PathError::ValueCountMismatch {
                pattern: "subscribers.<*:mac>.vlan.<uint16>".into(),
                expected: 2,
                actual: 1,
            }
        );
    }

    #[test]
    fn test_build_and_extract_multiple() {
        let path = build("subscribers.<*:mac>.vlan.<uint16>", &["00:11:22:33:44:55", "100"]).unwrap();
        assert_eq!(path, "subscribers.001122334455.vlan.100");
        assert_eq!(
            extract(&path, "subscribers.<*:mac>.vlan.<uint16>").unwrap(),
            vec!["00:11:22:33:44:55".to_string(), "100".to_string()]
        );
    }

    #[test]
    fn test_extract_segment_count_mismatch() {
        assert!(matches!(
            extract("interfaces.eth0.mtu", "interfaces.*"),
            Err(PathError::SegmentCountMismatch { .. })
        ));
    }

    #[test]
    fn test_extract_tolerates_unencoded_segment() {
        let values = extract("protocols.bgp.neighbors.peer1", "protocols.bgp.neighbors.<*:ip>").unwrap();
        assert_eq!(values, vec!["peer1".to_string()]);
    }
}
