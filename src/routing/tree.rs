//! Segment trie used to resolve paths for a single HTTP method.
//!
//! # Responsibilities
//! - Store patterns with an associated value
//! - Resolve a concrete path to the most specific pattern
//! - Bind parameter and wildcard values
//!
//! # Design Decisions
//! - Precedence at every depth: literal > parameter > wildcard
//! - Backtracking: a dead literal subtree falls back to its siblings
//! - Structurally identical patterns share a slot; the last insert wins
//! - No path normalization (`/p` and `/p/` are different routes)

use std::collections::HashMap;

use crate::routing::pattern::{split_path, Params, Pattern, Segment};

/// A registered pattern and its value.
#[derive(Debug)]
struct Leaf<T> {
    pattern: Pattern,
    value: T,
}

#[derive(Debug)]
struct Node<T> {
    literals: HashMap<String, Node<T>>,
    param: Option<Box<Node<T>>>,
    wildcard: Option<Leaf<T>>,
    leaf: Option<Leaf<T>>,
}

impl<T> Default for Node<T> {
    fn default() -> Self {
        Self {
            literals: HashMap::new(),
            param: None,
            wildcard: None,
            leaf: None,
        }
    }
}

/// Result of a successful lookup.
#[derive(Debug)]
pub struct Match<'t, T> {
    pub pattern: &'t Pattern,
    pub params: Params,
    pub value: &'t T,
}

/// Pattern trie for one method.
#[derive(Debug)]
pub struct Tree<T> {
    root: Node<T>,
    len: usize,
}

impl<T> Default for Tree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Tree<T> {
    pub fn new() -> Self {
        Self {
            root: Node::default(),
            len: 0,
        }
    }

    /// Insert a pattern. Returns the value it replaced, if any.
    pub fn insert(&mut self, pattern: Pattern, value: T) -> Option<T> {
        let mut node = &mut self.root;
        let mut wildcard = false;

        for segment in pattern.segments() {
            match segment {
                Segment::Literal(text) => {
                    node = node.literals.entry(text.clone()).or_default();
                }
                Segment::Param(_) => {
                    node = &mut **node.param.get_or_insert_with(Box::default);
                }
                Segment::Wildcard(_) => wildcard = true,
            }
        }

        let slot = if wildcard {
            &mut node.wildcard
        } else {
            &mut node.leaf
        };
        let previous = slot.replace(Leaf { pattern, value }).map(|leaf| leaf.value);
        if previous.is_none() {
            self.len += 1;
        }
        previous
    }

    /// Resolve a concrete path.
    pub fn find(&self, path: &str) -> Option<Match<'_, T>> {
        let segments = split_path(path);
        let leaf = search(&self.root, &segments, 0)?;
        Some(Match {
            pattern: &leaf.pattern,
            params: leaf.pattern.bind(&segments),
            value: &leaf.value,
        })
    }

    /// Iterate over every stored pattern and value.
    pub fn iter(&self) -> impl Iterator<Item = (&Pattern, &T)> {
        let mut out = Vec::with_capacity(self.len);
        collect(&self.root, &mut out);
        out.into_iter()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

fn search<'t, T>(node: &'t Node<T>, segments: &[&str], depth: usize) -> Option<&'t Leaf<T>> {
    let Some(segment) = segments.get(depth) else {
        if let Some(leaf) = &node.leaf {
            return Some(leaf);
        }
        // `/` is the only path where a wildcard may capture nothing without a
        // trailing empty segment.
        if segments.is_empty() {
            return node.wildcard.as_ref();
        }
        return None;
    };

    if let Some(child) = node.literals.get(*segment) {
        if let Some(leaf) = search(child, segments, depth + 1) {
            return Some(leaf);
        }
    }

    if !segment.is_empty() {
        if let Some(child) = &node.param {
            if let Some(leaf) = search(child, segments, depth + 1) {
                return Some(leaf);
            }
        }
    }

    node.wildcard.as_ref()
}

fn collect<'t, T>(node: &'t Node<T>, out: &mut Vec<(&'t Pattern, &'t T)>) {
    for leaf in node.leaf.iter().chain(node.wildcard.iter()) {
        out.push((&leaf.pattern, &leaf.value));
    }
    let mut literals: Vec<_> = node.literals.iter().collect();
    literals.sort_by(|a, b| a.0.cmp(b.0));
    for (_, child) in literals {
        collect(child, out);
    }
    if let Some(child) = &node.param {
        collect(child, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree(patterns: &[&'static str]) -> Tree<&'static str> {
        let mut tree = Tree::new();
        for p in patterns {
            tree.insert(Pattern::parse(p).unwrap(), *p);
        }
        tree
    }

    #[test]
    fn binds_named_parameter() {
        let t = tree(&["/user/:id"]);
        let m = t.find("/user/42").unwrap();
        assert_eq!(*m.value, "/user/:id");
        assert_eq!(m.params.get("id"), Some("42"));
    }

    #[test]
    fn literal_beats_parameter() {
        let t = tree(&["/user/:id", "/user/me"]);
        assert_eq!(*t.find("/user/me").unwrap().value, "/user/me");
        assert_eq!(*t.find("/user/you").unwrap().value, "/user/:id");
    }

    #[test]
    fn parameter_beats_wildcard() {
        let t = tree(&["/files/*path", "/files/:name"]);
        assert_eq!(*t.find("/files/a.txt").unwrap().value, "/files/:name");
        let m = t.find("/files/dir/a.txt").unwrap();
        assert_eq!(*m.value, "/files/*path");
        assert_eq!(m.params.get("path"), Some("dir/a.txt"));
    }

    #[test]
    fn backtracks_out_of_literal_subtree() {
        let t = tree(&["/user/me/settings", "/user/:id/profile"]);
        let m = t.find("/user/me/profile").unwrap();
        assert_eq!(*m.value, "/user/:id/profile");
        assert_eq!(m.params.get("id"), Some("me"));
    }

    #[test]
    fn backtracks_to_wildcard() {
        let t = tree(&["/static/css/:file", "/static/*path"]);
        let m = t.find("/static/css/deep/site.css").unwrap();
        assert_eq!(*m.value, "/static/*path");
        assert_eq!(m.params.get("path"), Some("css/deep/site.css"));
    }

    #[test]
    fn wildcard_captures_rest_and_empty() {
        let t = tree(&["/assets/*filepath"]);
        let m = t.find("/assets/js/app.js").unwrap();
        assert_eq!(m.params.get("filepath"), Some("js/app.js"));

        let m = t.find("/assets/").unwrap();
        assert_eq!(m.params.get("filepath"), Some(""));

        assert!(t.find("/assets").is_none());
    }

    #[test]
    fn root_wildcard_matches_root() {
        let t = tree(&["/*filepath"]);
        let m = t.find("/").unwrap();
        assert_eq!(m.params.get("filepath"), Some(""));
        let m = t.find("/a/b").unwrap();
        assert_eq!(m.params.get("filepath"), Some("a/b"));
    }

    #[test]
    fn root_is_distinct() {
        let t = tree(&["/", "/:name"]);
        assert_eq!(*t.find("/").unwrap().value, "/");
        assert_eq!(*t.find("/x").unwrap().value, "/:name");
    }

    #[test]
    fn trailing_slash_not_normalized() {
        let t = tree(&["/p"]);
        assert!(t.find("/p").is_some());
        assert!(t.find("/p/").is_none());

        let t = tree(&["/p/"]);
        assert!(t.find("/p").is_none());
        assert!(t.find("/p/").is_some());
    }

    #[test]
    fn parameter_requires_non_empty_segment() {
        let t = tree(&["/user/:id"]);
        assert!(t.find("/user/").is_none());
        assert!(t.find("/user/42/extra").is_none());
    }

    #[test]
    fn static_round_trip_has_no_params() {
        let t = tree(&["/a/b/c"]);
        let m = t.find("/a/b/c").unwrap();
        assert!(m.params.is_empty());
        assert_eq!(m.pattern.as_str(), "/a/b/c");
    }

    #[test]
    fn reinsert_overwrites() {
        let mut t = Tree::new();
        assert!(t.insert(Pattern::parse("/user/:id").unwrap(), 1).is_none());
        assert_eq!(t.insert(Pattern::parse("/user/:name").unwrap(), 2), Some(1));
        assert_eq!(t.len(), 1);

        let m = t.find("/user/7").unwrap();
        assert_eq!(*m.value, 2);
        assert_eq!(m.params.get("name"), Some("7"));
    }

    #[test]
    fn iter_lists_all_patterns() {
        let t = tree(&["/", "/b", "/a/:x", "/a/*rest"]);
        let mut seen: Vec<&str> = t.iter().map(|(p, _)| p.as_str()).collect();
        seen.sort();
        assert_eq!(seen, vec!["/", "/a/*rest", "/a/:x", "/b"]);
    }
}
