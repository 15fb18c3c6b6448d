// Copyright (c) 2025 - Cowboy AI, Inc.
//! Configuration Paths
//!
//! Every configuration node is addressed by a dotted path such as
//! `interfaces.eth0` or `protocols.bgp`. Handlers claim a *pattern*; the
//! codec lets structured values (addresses, integers) live inside a single
//! path segment.
//!
//! - [`codec`] - per-kind segment encoding
//! - [`pattern`] - [`PathPattern`] parse / match / build / extract

pub mod codec;
pub mod pattern;

pub use codec::{decode, encode, PathError, WildcardKind};
pub use pattern::{build, extract, PathPattern, Segment};

/// Split a dotted path into segments, rejecting empty segments
pub fn split_path(path: &str) -> Result<Vec<&str>, PathError> {
    let parts: Vec<&str> = path.split('.').collect();
    if parts.iter().any(|p| p.is_empty()) {
        return Err(PathError::EmptySegment(path.to_string()));
    }
    Ok(parts)
}

/// Parent of a dotted path (`a.b.c` → `a.b`), `None` at the root
pub fn parent(path: &str) -> Option<&str> {
    path.rsplit_once('.').map(|(head, _)| head)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_path() {
        assert_eq!(split_path("a.b.c").unwrap(), vec!["a", "b", "c"]);
        assert!(split_path("").is_err());
        assert!(split_path(".a").is_err());
        assert!(split_path("a.").is_err());
    }

    #[test]
    fn test_parent() {
        assert_eq!(parent("interfaces.eth0.mtu"), Some("interfaces.eth0"));
        assert_eq!(parent("interfaces"), None);
    }
}
