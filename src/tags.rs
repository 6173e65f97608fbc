//! Tag candidate resolution.
//!
//! Given the tag universe of a repository and the policy of a watched
//! image, [`candidates`] returns the tags that are newer than the current
//! version, highest first.  The function is pure; regular expressions are
//! compiled once when the policy is built so that a malformed pattern is
//! reported as configuration, never during a watch cycle.

use std::cmp::Ordering;
use std::sync::OnceLock;

use regex::Regex;
use semver::Version;

use crate::error::{Error, Result};
use crate::types::Image;

fn coerce_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?:^|[^\d])(\d{1,16})(?:\.(\d{1,16}))?(?:\.(\d{1,16}))?(?:$|[^\d])").unwrap()
    })
}

/// Coerce a free-form tag into a semantic version.
///
/// The first `major[.minor[.patch]]` run of digits wins and missing parts
/// default to zero, so `v10` is `10.0.0` and `1.2-alpine` is `1.2.0`.
/// Prerelease and build suffixes are dropped.
pub fn coerce(tag: &str) -> Option<Version> {
    let caps = coerce_regex().captures(tag)?;
    let part = |i: usize| -> Option<u64> {
        match caps.get(i) {
            Some(m) => m.as_str().parse().ok(),
            None => Some(0),
        }
    };
    Some(Version::new(part(1)?, part(2)?, part(3)?))
}

/// Sort a tag universe descending by byte-wise string order.
///
/// This is the order presented to [`candidates`] for images that do not
/// follow semantic versioning.
pub fn sort_lexical_desc(tags: &mut [String]) {
    tags.sort_unstable_by(|a, b| b.cmp(a));
}

/// Compiled tag selection policy of one image.
#[derive(Debug, Clone)]
pub struct TagPolicy {
    version: String,
    current: Option<Version>,
    is_semver: bool,
    include: Option<Regex>,
    exclude: Option<Regex>,
}

impl TagPolicy {
    pub fn new(
        version: &str,
        include_tags: Option<&str>,
        exclude_tags: Option<&str>,
        is_semver: bool,
    ) -> Result<Self> {
        Ok(Self {
            version: version.to_string(),
            current: if is_semver { coerce(version) } else { None },
            is_semver,
            include: compile("include", include_tags)?,
            exclude: compile("exclude", exclude_tags)?,
        })
    }

    pub fn from_image(image: &Image) -> Result<Self> {
        Self::new(
            &image.version,
            image.include_tags.as_deref(),
            image.exclude_tags.as_deref(),
            image.is_semver,
        )
    }

    fn accepts(&self, tag: &str) -> bool {
        if let Some(include) = &self.include {
            if !include.is_match(tag) {
                return false;
            }
        }
        if let Some(exclude) = &self.exclude {
            if exclude.is_match(tag) {
                return false;
            }
        }
        true
    }
}

fn compile(kind: &str, pattern: Option<&str>) -> Result<Option<Regex>> {
    match pattern {
        None => Ok(None),
        Some(p) => Regex::new(p)
            .map(Some)
            .map_err(|e| Error::Configuration(format!("invalid {} tags regex {:?}: {}", kind, p, e))),
    }
}

/// Return the tags newer than the policy's current version, highest first.
///
/// In semver mode the universe may be in any order, and tags coercing to
/// the same version are kept once, strictly descending.  Otherwise `tags` must
/// already be sorted descending by the caller's total order; only tags
/// ranked above the current version are kept, and when the current version
/// is absent from the universe every filtered tag is a candidate.
pub fn candidates(policy: &TagPolicy, tags: &[String]) -> Vec<String> {
    if policy.is_semver {
        let current = match &policy.current {
            Some(v) => v,
            None => return Vec::new(),
        };
        let mut versions: Vec<(Version, &String)> = tags
            .iter()
            .filter(|tag| policy.accepts(tag))
            .filter_map(|tag| coerce(tag).map(|v| (v, tag)))
            .filter(|(v, _)| v > current)
            .collect();
        // Stable sort: among tags of equal version the first one listed wins.
        versions.sort_by(|(a, _), (b, _)| b.cmp(a));
        versions.dedup_by(|(a, _), (b, _)| a == b);
        return versions.into_iter().map(|(_, tag)| tag.clone()).collect();
    }

    let position = tags.iter().position(|tag| *tag == policy.version);
    tags.iter()
        .enumerate()
        .filter(|(i, _)| position.map_or(true, |p| *i < p))
        .filter(|(_, tag)| policy.accepts(tag))
        .map(|(_, tag)| tag.clone())
        .collect()
}

/// Compare two tags by their coerced semantic version.
pub fn compare_semver(a: &str, b: &str) -> Ordering {
    coerce(a).cmp(&coerce(b))
}
