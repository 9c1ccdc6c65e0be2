//! Matching tree.
//!
//! Each node represents one pattern segment. Literal children are kept
//! sorted for binary search; every other child lives in `dynamic_children`,
//! ordered by [`Specificity`] and then by registration. Lookups walk the
//! tree depth-first in that order and backtrack out of branches that fail
//! further down, so the first accepted value is the most specific one.

use crate::params::Params;
use crate::pattern::{Segment, Specificity};

/// A node in the matching tree.
///
/// `V` is whatever the owner stores at route boundaries: a
/// [`MethodRouter`](crate::MethodRouter) for routes, or an arbitrary value
/// for mount prefixes.
#[derive(Debug, Clone)]
pub struct Node<V> {
    /// The segment this node matches (`None` only for the root).
    segment: Option<Segment>,

    /// Value stored at this node, if a pattern ends here.
    value: Option<V>,

    /// Literal children, sorted by text.
    static_children: Vec<Node<V>>,

    /// Constrained, composite, parameter and wildcard children, most
    /// specific first.
    dynamic_children: Vec<Node<V>>,
}

/// A prefix that matched the leading segments of a path.
#[derive(Debug, Clone)]
pub struct PrefixHit<'a, V> {
    /// Value stored at the prefix.
    pub value: &'a V,
    /// Bindings made by the prefix.
    pub params: Params,
    /// Number of path segments the prefix consumed.
    pub consumed: usize,
}

impl<V> Node<V> {
    /// Creates a root node for the tree.
    #[must_use]
    pub fn root() -> Self {
        Self::with_segment(None)
    }

    fn with_segment(segment: Option<Segment>) -> Self {
        Self {
            segment,
            value: None,
            static_children: Vec::new(),
            dynamic_children: Vec::new(),
        }
    }

    /// Returns the value stored at this node.
    #[must_use]
    pub fn value(&self) -> Option<&V> {
        self.value.as_ref()
    }

    /// Returns the slot at the end of `segments`, creating nodes as needed.
    pub fn slot_mut(&mut self, segments: &[Segment]) -> &mut Option<V> {
        let Some((head, rest)) = segments.split_first() else {
            return &mut self.value;
        };
        self.child_mut(head).slot_mut(rest)
    }

    fn child_mut(&mut self, segment: &Segment) -> &mut Node<V> {
        if let Segment::Static(text) = segment {
            let idx = match self
                .static_children
                .binary_search_by(|c| static_text(c).cmp(text.as_str()))
            {
                Ok(idx) => idx,
                Err(idx) => {
                    self.static_children
                        .insert(idx, Node::with_segment(Some(segment.clone())));
                    idx
                }
            };
            return &mut self.static_children[idx];
        }

        let existing = self.dynamic_children.iter().position(|c| {
            c.segment
                .as_ref()
                .is_some_and(|s| s.same_shape(segment))
        });
        let idx = existing.unwrap_or_else(|| {
            // Insert after every sibling of equal or higher precedence so
            // that registration order breaks ties.
            let rank = segment.specificity();
            let idx = self
                .dynamic_children
                .iter()
                .position(|c| specificity(c) > rank)
                .unwrap_or(self.dynamic_children.len());
            self.dynamic_children
                .insert(idx, Node::with_segment(Some(segment.clone())));
            idx
        });
        &mut self.dynamic_children[idx]
    }

    /// Finds the most specific value for `segments` that `accept` approves.
    ///
    /// On success `params` holds the bindings along the winning branch; on
    /// failure it is restored to its original length.
    pub fn find<'a, F>(
        &'a self,
        segments: &[&str],
        params: &mut Params,
        accept: &mut F,
    ) -> Option<&'a V>
    where
        F: FnMut(&'a V) -> bool,
    {
        let Some((head, rest)) = segments.split_first() else {
            return self.value.as_ref().filter(|v| accept(*v));
        };

        if let Some(child) = self.find_static_child(head) {
            if let Some(found) = child.find(rest, params, accept) {
                return Some(found);
            }
        }

        for child in &self.dynamic_children {
            let mark = params.len();
            match &child.segment {
                Some(Segment::Wildcard(name)) => {
                    if let Some(value) = child.value.as_ref().filter(|v| accept(*v)) {
                        params.push(name.as_str(), segments.join("/"));
                        return Some(value);
                    }
                }
                Some(segment) => {
                    if segment.matches(head, params) {
                        if let Some(found) = child.find(rest, params, accept) {
                            return Some(found);
                        }
                    }
                }
                None => {}
            }
            params.truncate(mark);
        }

        None
    }

    /// Collects every stored value whose pattern matches a leading run of
    /// `segments`, deepest-first within each branch order.
    pub fn collect_prefixes<'a>(
        &'a self,
        segments: &[&str],
        consumed: usize,
        params: &mut Params,
        out: &mut Vec<PrefixHit<'a, V>>,
    ) {
        if let Some((head, rest)) = segments.split_first() {
            if let Some(child) = self.find_static_child(head) {
                child.collect_prefixes(rest, consumed + 1, params, out);
            }

            for child in &self.dynamic_children {
                let mark = params.len();
                if let Some(segment) = &child.segment {
                    if !matches!(segment, Segment::Wildcard(_)) && segment.matches(head, params) {
                        child.collect_prefixes(rest, consumed + 1, params, out);
                    }
                }
                params.truncate(mark);
            }
        }

        if let Some(value) = &self.value {
            out.push(PrefixHit {
                value,
                params: params.clone(),
                consumed,
            });
        }
    }

    /// Finds a static child by segment using binary search.
    fn find_static_child(&self, segment: &str) -> Option<&Node<V>> {
        self.static_children
            .binary_search_by(|c| static_text(c).cmp(segment))
            .ok()
            .map(|i| &self.static_children[i])
    }

    /// Collects the values at branches that accept exactly the paths
    /// `segments` accepts but bind at least one parameter under another name.
    pub fn renamed_twins<'a>(&'a self, segments: &[Segment], out: &mut Vec<&'a V>) {
        self.collect_twins(segments, false, out);
    }

    fn collect_twins<'a>(&'a self, segments: &[Segment], renamed: bool, out: &mut Vec<&'a V>) {
        let Some((head, rest)) = segments.split_first() else {
            if renamed {
                out.extend(self.value.as_ref());
            }
            return;
        };

        if let Segment::Static(text) = head {
            if let Some(child) = self.find_static_child(text) {
                child.collect_twins(rest, renamed, out);
            }
            return;
        }

        for child in &self.dynamic_children {
            let Some(segment) = &child.segment else {
                continue;
            };
            if segment.accepts_same(head) {
                child.collect_twins(rest, renamed || !segment.same_shape(head), out);
            }
        }
    }

    /// Visits every stored value in the subtree.
    pub fn for_each_value<'a>(&'a self, f: &mut impl FnMut(&'a V)) {
        if let Some(value) = &self.value {
            f(value);
        }
        for child in self.static_children.iter().chain(&self.dynamic_children) {
            child.for_each_value(f);
        }
    }
}

fn static_text<V>(node: &Node<V>) -> &str {
    match &node.segment {
        Some(Segment::Static(text)) => text,
        _ => "",
    }
}

fn specificity<V>(node: &Node<V>) -> Specificity {
    node.segment
        .as_ref()
        .map_or(Specificity::Static, Segment::specificity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::{split_path, Pattern};

    fn insert(root: &mut Node<&'static str>, pattern: &str, value: &'static str) {
        let pattern = Pattern::parse(pattern).unwrap();
        *root.slot_mut(pattern.segments()) = Some(value);
    }

    fn lookup<'a>(root: &'a Node<&'static str>, path: &str) -> Option<(&'a str, Params)> {
        let mut params = Params::new();
        let found = root.find(&split_path(path), &mut params, &mut |_| true)?;
        Some((*found, params))
    }

    #[test]
    fn test_insert_and_match_static() {
        let mut root = Node::root();
        insert(&mut root, "/articles", "listArticles");

        let (value, params) = lookup(&root, "/articles").unwrap();
        assert_eq!(value, "listArticles");
        assert!(params.is_empty());
        assert!(lookup(&root, "/posts").is_none());
    }

    #[test]
    fn test_root_match() {
        let mut root = Node::root();
        insert(&mut root, "/", "index");
        assert_eq!(lookup(&root, "/").unwrap().0, "index");
    }

    #[test]
    fn test_static_priority_over_param() {
        let mut root = Node::root();
        insert(&mut root, "/articles/{articleID}", "getArticle");
        insert(&mut root, "/articles/search", "searchArticles");

        assert_eq!(lookup(&root, "/articles/search").unwrap().0, "searchArticles");

        let (value, params) = lookup(&root, "/articles/42").unwrap();
        assert_eq!(value, "getArticle");
        assert_eq!(params.get("articleID"), Some("42"));
    }

    #[test]
    fn test_constrained_before_composite_before_param() {
        let mut root = Node::root();
        insert(&mut root, "/{id}", "param");
        insert(&mut root, "/{month}-{day}-{year}", "composite");
        insert(&mut root, "/{slug:[a-z-]+}", "constrained");

        assert_eq!(lookup(&root, "/home-is-toronto").unwrap().0, "constrained");
        assert_eq!(lookup(&root, "/01-16-2017").unwrap().0, "composite");
        assert_eq!(lookup(&root, "/123").unwrap().0, "param");
    }

    #[test]
    fn test_first_registered_wins_ties() {
        let mut root = Node::root();
        insert(&mut root, "/{a:[0-9]+}", "digits");
        insert(&mut root, "/{b:[0-9a-f]+}", "hex");

        assert_eq!(lookup(&root, "/123").unwrap().0, "digits");
        assert_eq!(lookup(&root, "/beef").unwrap().0, "hex");
    }

    #[test]
    fn test_renamed_twins() {
        let mut root = Node::root();
        insert(&mut root, "/articles/{articleID}", "byId");
        insert(&mut root, "/articles/{id}/comments", "comments");
        insert(&mut root, "/articles/{slug:[a-z]+}", "bySlug");

        let mut twins = Vec::new();
        let renamed = Pattern::parse("/articles/{name}").unwrap();
        root.renamed_twins(renamed.segments(), &mut twins);
        assert_eq!(twins, [&"byId"]);

        // The exact same shape is not a rename.
        twins.clear();
        let same = Pattern::parse("/articles/{articleID}").unwrap();
        root.renamed_twins(same.segments(), &mut twins);
        assert!(twins.is_empty());
    }

    #[test]
    fn test_backtracking_restores_params() {
        let mut root = Node::root();
        insert(&mut root, "/{kind}/details", "details");
        insert(&mut root, "/users/{id}", "user");

        // The static branch `users` fails on the second segment, so the
        // param branch has to be tried instead.
        let (value, params) = lookup(&root, "/users/details").unwrap();
        assert_eq!(value, "user");
        assert_eq!(params.get("id"), Some("details"));

        let (value, params) = lookup(&root, "/orgs/details").unwrap();
        assert_eq!(value, "details");
        assert_eq!(params.get("kind"), Some("orgs"));
        assert_eq!(params.len(), 1);
    }

    #[test]
    fn test_wildcard_lowest_priority() {
        let mut root = Node::root();
        insert(&mut root, "/files/*path", "serveFile");
        insert(&mut root, "/files/{name}", "fileByName");

        assert_eq!(lookup(&root, "/files/logo.png").unwrap().0, "fileByName");

        let (value, params) = lookup(&root, "/files/images/logo.png").unwrap();
        assert_eq!(value, "serveFile");
        assert_eq!(params.get("path"), Some("images/logo.png"));
    }

    #[test]
    fn test_accept_filters_candidates() {
        let mut root = Node::root();
        insert(&mut root, "/articles/search", "search");
        insert(&mut root, "/articles/{id}", "byId");

        let mut params = Params::new();
        let found = root.find(
            &split_path("/articles/search"),
            &mut params,
            &mut |v: &&str| *v != "search",
        );
        assert_eq!(found, Some(&"byId"));
        assert_eq!(params.get("id"), Some("search"));
    }

    #[test]
    fn test_collect_prefixes() {
        let mut root = Node::root();
        insert(&mut root, "/articles", "articles");
        insert(&mut root, "/articles/{articleID}", "article");

        let mut out = Vec::new();
        let segments = split_path("/articles/7/comments");
        root.collect_prefixes(&segments, 0, &mut Params::new(), &mut out);

        let hits: Vec<_> = out.iter().map(|h| (*h.value, h.consumed)).collect();
        assert_eq!(hits, vec![("article", 2), ("articles", 1)]);
        assert_eq!(out[0].params.get("articleID"), Some("7"));
        assert!(out[1].params.is_empty());
    }

    #[test]
    fn test_for_each_value() {
        let mut root = Node::root();
        insert(&mut root, "/a", "a");
        insert(&mut root, "/a/{b}", "b");
        insert(&mut root, "/c/*", "c");

        let mut seen = Vec::new();
        root.for_each_value(&mut |v| seen.push(*v));
        seen.sort_unstable();
        assert_eq!(seen, vec!["a", "b", "c"]);
    }
}
