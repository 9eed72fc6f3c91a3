//! Path pattern parsing and parameter binding.
//!
//! # Syntax
//! ```text
//! /                      root (no segments)
//! /user/me               literal segments
//! /user/:id              named parameter, matches one non-empty segment
//! /assets/*filepath      wildcard, matches the rest of the path (may be empty)
//! /docs/                 trailing slash is a distinct empty literal segment
//! ```
//!
//! # Design Decisions
//! - Patterns are validated once, at registration time
//! - Only the first character decides the segment kind (`:` or `*`)
//! - Wildcards are only legal as the last segment

use std::fmt;
use std::str::FromStr;

use crate::routing::RouteError;

/// One segment of a parsed pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Matches only the identical text.
    Literal(String),
    /// `:name`, matches a single non-empty segment.
    Param(String),
    /// `*name`, matches the remainder of the path.
    Wildcard(String),
}

/// A parsed, validated path template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    raw: String,
    segments: Vec<Segment>,
}

impl Pattern {
    /// Parse and validate a pattern.
    pub fn parse(raw: &str) -> Result<Self, RouteError> {
        let rest = raw
            .strip_prefix('/')
            .ok_or_else(|| RouteError::MissingLeadingSlash(raw.to_string()))?;

        if rest.is_empty() {
            return Ok(Self {
                raw: raw.to_string(),
                segments: Vec::new(),
            });
        }

        let parts: Vec<&str> = rest.split('/').collect();
        let last = parts.len() - 1;
        let mut segments = Vec::with_capacity(parts.len());
        let mut names: Vec<&str> = Vec::new();

        for (i, part) in parts.iter().enumerate() {
            let segment = match part.chars().next() {
                None if i == last => Segment::Literal(String::new()),
                None => return Err(RouteError::EmptySegment(raw.to_string())),
                Some(':') | Some('*') => {
                    let name = &part[1..];
                    if name.is_empty() {
                        return Err(RouteError::EmptyName(raw.to_string()));
                    }
                    if names.contains(&name) {
                        return Err(RouteError::DuplicateName {
                            pattern: raw.to_string(),
                            name: name.to_string(),
                        });
                    }
                    names.push(name);

                    if part.starts_with(':') {
                        Segment::Param(name.to_string())
                    } else if i != last {
                        return Err(RouteError::WildcardNotLast(raw.to_string()));
                    } else {
                        Segment::Wildcard(name.to_string())
                    }
                }
                Some(_) => Segment::Literal(part.to_string()),
            };
            segments.push(segment);
        }

        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    /// The pattern text as registered.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// True if the pattern has no parameter or wildcard segments.
    pub fn is_static(&self) -> bool {
        self.segments
            .iter()
            .all(|s| matches!(s, Segment::Literal(_)))
    }

    /// Extract parameter values from path segments this pattern matched.
    ///
    /// `path` must be the output of [`split_path`] for a path the tree
    /// resolved to this pattern.
    pub(crate) fn bind(&self, path: &[&str]) -> Params {
        let mut params = Params::default();
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Literal(_) => {}
                Segment::Param(name) => {
                    if let Some(value) = path.get(i) {
                        params.push(name, *value);
                    }
                }
                Segment::Wildcard(name) => {
                    let rest = path.get(i..).map(|r| r.join("/")).unwrap_or_default();
                    params.push(name, rest);
                }
            }
        }
        params
    }
}

impl FromStr for Pattern {
    type Err = RouteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Split a request path into segments.
///
/// `/` yields no segments; every other path drops the leading slash and
/// splits the rest, so `/p/` yields `["p", ""]`.
pub(crate) fn split_path(path: &str) -> Vec<&str> {
    let rest = path.strip_prefix('/').unwrap_or(path);
    if rest.is_empty() {
        Vec::new()
    } else {
        rest.split('/').collect()
    }
}

/// Path parameters bound during resolution, in pattern order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    entries: Vec<(String, String)>,
}

impl Params {
    fn push(&mut self, name: &str, value: impl Into<String>) {
        self.entries.push((name.to_string(), value.into()));
    }

    /// Look up a parameter by name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
