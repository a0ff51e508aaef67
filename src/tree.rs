//! Compressed radix trie keyed by URL pattern.
//!
//! One tree serves every HTTP method: each node carries its own
//! method→handler map, so "path matched but method missing" stays
//! distinguishable from "no path match" (405 vs 404 at the server layer).
//!
//! Nodes live in an arena (`Vec<Node>`, index handles) rather than in boxed
//! links. Insertion restructures the tree in place — splitting a node means
//! rewriting a parent's child list — and index handles make that rewiring
//! borrow-checker-friendly.
//!
//! Four node kinds, matched in priority order at every step:
//!
//! 1. `static`   — literal text, e.g. `/users/`
//! 2. `regexp`   — `:name(regex)`, one segment constrained by an anchored regex
//! 3. `param`    — `:name`, one segment, captured
//! 4. `catchAll` — `*` / `*name`, the rest of the path, captured
//!
//! Exact matches always win over wildcards; catch-all is tried last.

use std::sync::Arc;

use regex::Regex;

use crate::error::Error;
use crate::handler::BoxedHandler;
use crate::method::{METHOD_COUNT, MethodFlags};
use crate::params::ParamRecorder;

pub(crate) type NodeId = usize;

const ROOT: NodeId = 0;

/// Child lists per node, one per kind, in match-priority order.
const KIND_COUNT: usize = 4;
const STATIC_LIST: usize = 0;

/// What a node's prefix means when matched against a path.
///
/// A closed set dispatched by exhaustive `match`; wildcard kinds carry the
/// parameter name they capture under, regexp additionally its compiled
/// (anchored) program.
pub(crate) enum NodeKind {
    Static,
    Regexp { name: String, pattern: Regex },
    Param { name: String },
    CatchAll { name: String },
}

impl NodeKind {
    fn list(&self) -> usize {
        match self {
            Self::Static => STATIC_LIST,
            Self::Regexp { .. } => 1,
            Self::Param { .. } => 2,
            Self::CatchAll { .. } => 3,
        }
    }
}

/// Per-node method→handler map: one slot per method flag.
///
/// Present (non-empty) only on nodes that terminate a registered route.
#[derive(Clone)]
pub(crate) struct MethodHandlers {
    slots: [Option<BoxedHandler>; METHOD_COUNT],
}

impl Default for MethodHandlers {
    fn default() -> Self {
        Self { slots: std::array::from_fn(|_| None) }
    }
}

impl MethodHandlers {
    /// Assigns `handler` to every method in `flags`. The `ALL` sentinel fans
    /// out into all nine slots here. Re-registering a method overwrites —
    /// last registration wins, duplicates are not an error.
    pub(crate) fn set(&mut self, flags: MethodFlags, handler: &BoxedHandler) {
        for slot in 0..METHOD_COUNT {
            let flag = MethodFlags::from_bits_truncate(1 << slot);
            if flags.contains(flag) {
                self.slots[slot] = Some(Arc::clone(handler));
            }
        }
    }

    /// The handler registered for a single-method flag, if any.
    pub(crate) fn get(&self, method: MethodFlags) -> Option<&BoxedHandler> {
        self.slots[method.slot()].as_ref()
    }

    /// True iff any method is registered — this node is a route leaf.
    pub(crate) fn is_registered(&self) -> bool {
        self.slots.iter().any(Option::is_some)
    }

    /// The set of methods with a handler, for `Allow` header rendering.
    pub(crate) fn allowed(&self) -> MethodFlags {
        let mut set = MethodFlags::empty();
        for (slot, handler) in self.slots.iter().enumerate() {
            if handler.is_some() {
                set |= MethodFlags::from_bits_truncate(1 << slot);
            }
        }
        set
    }
}

struct Node {
    kind: NodeKind,
    /// First byte of `prefix`, for sibling lookup without touching the string.
    label: u8,
    /// The path text this node consumes. For wildcard nodes this is the
    /// pattern segment as written (`:id`, `:id([0-9]+)`, `*path`).
    prefix: String,
    handlers: MethodHandlers,
    /// Child ids grouped by kind, each list sorted by label.
    children: [Vec<NodeId>; KIND_COUNT],
}

/// The routing trie. Built single-threaded at setup; read-only while serving.
pub(crate) struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    pub(crate) fn new() -> Self {
        let mut tree = Self { nodes: Vec::new() };
        tree.push_node("");
        tree
    }

    /// Registers `handler` under `flags` for `pattern`.
    ///
    /// Walks the trie consuming the pattern, creating, descending into, or
    /// splitting nodes as prefixes dictate. Malformed patterns are rejected
    /// here, at registration, never at request time.
    pub(crate) fn insert(
        &mut self,
        flags: MethodFlags,
        pattern: &str,
        handler: BoxedHandler,
    ) -> Result<(), Error> {
        if !pattern.starts_with('/') {
            return Err(Error::invalid_pattern(pattern, "must begin with `/`"));
        }
        if let Some(star) = unconstrained_star(pattern) {
            if pattern[star + 1..].chars().any(|c| c == '/' || c == '*') {
                return Err(Error::invalid_pattern(
                    pattern,
                    "catch-all must be the final segment",
                ));
            }
        }

        let mut node = ROOT;
        let mut search = pattern;

        loop {
            // Key exhausted: the cursor node is the route's leaf.
            if search.is_empty() {
                self.nodes[node].handlers.set(flags, &handler);
                return Ok(());
            }

            let Some(next) = self.get_edge(node, search) else {
                // No edge: the rest of the pattern becomes a new subtree.
                let leaf = self.push_node(search);
                self.nodes[leaf].handlers.set(flags, &handler);
                self.add_child(node, leaf)?;
                return Ok(());
            };

            if !matches!(self.nodes[next].kind, NodeKind::Static) {
                // Wildcard edge: it consumes one whole pattern segment.
                // Trim the segment and keep descending; wildcards never split.
                search = &search[wildcard_segment_end(search)..];
                node = next;
                continue;
            }

            let common = longest_prefix(search, &self.nodes[next].prefix);
            if common == self.nodes[next].prefix.len() {
                // Child prefix fully shared: descend.
                search = &search[common..];
                node = next;
                continue;
            }

            // Prefixes diverge inside the child: split. A new intermediate
            // node takes the common prefix and the old child's place; the old
            // child keeps the remainder and moves beneath it.
            let mid = self.push_node(&search[..common]);
            self.replace_child(node, next, mid);
            {
                let old = &mut self.nodes[next];
                old.prefix.drain(..common);
                old.label = old.prefix.as_bytes()[0];
            }
            self.attach(mid, next);

            search = &search[common..];
            if search.is_empty() {
                // The new pattern is exactly the common prefix.
                self.nodes[mid].handlers.set(flags, &handler);
                return Ok(());
            }
            let leaf = self.push_node(search);
            self.nodes[leaf].handlers.set(flags, &handler);
            self.add_child(mid, leaf)?;
            return Ok(());
        }
    }

    /// Matches `path` against the trie.
    ///
    /// Returns the matched node's method map, or `None` when no route covers
    /// the path. Captures from wildcard segments are committed to `recorder`
    /// only once the overall match succeeds — failed speculative branches are
    /// rolled back internally and can never leak bindings.
    pub(crate) fn find<'a>(
        &'a self,
        path: &'a str,
        recorder: &mut dyn ParamRecorder,
    ) -> Option<&'a MethodHandlers> {
        let mut captures = Vec::new();
        let found = self.find_node(ROOT, path, &mut captures)?;
        for (name, value) in captures {
            recorder.add(name, value);
        }
        Some(&self.nodes[found].handlers)
    }

    /// Recursive descent: static children first (every candidate sharing the
    /// lead byte), then the wildcard lists in priority order.
    ///
    /// `captures` doubles as the undo log: each speculative wildcard branch
    /// remembers its watermark and truncates back to it on failure. Static
    /// branches capture nothing, so they have nothing to roll back.
    fn find_node<'a>(
        &'a self,
        node: NodeId,
        search: &'a str,
        captures: &mut Vec<(&'a str, &'a str)>,
    ) -> Option<NodeId> {
        let label = search.as_bytes().first().copied().unwrap_or(0);
        for &next in self.static_candidates(node, label) {
            let Some(rest) = search.strip_prefix(self.nodes[next].prefix.as_str()) else {
                continue;
            };
            if rest.is_empty() && self.nodes[next].handlers.is_registered() {
                return Some(next);
            }
            if let Some(found) = self.find_node(next, rest, captures) {
                return Some(found);
            }
        }

        for list in 1..KIND_COUNT {
            let Some(next) = self.wildcard_edge(node, list) else {
                continue;
            };

            let mark = captures.len();
            let rest = match &self.nodes[next].kind {
                // Static nodes never land in a wildcard list.
                NodeKind::Static => continue,
                NodeKind::Regexp { name, pattern } => {
                    let seg = search.find('/').unwrap_or(search.len());
                    if !pattern.is_match(&search[..seg]) {
                        continue;
                    }
                    captures.push((name.as_str(), &search[..seg]));
                    &search[seg..]
                }
                NodeKind::Param { name } => {
                    let seg = search.find('/').unwrap_or(search.len());
                    captures.push((name.as_str(), &search[..seg]));
                    &search[seg..]
                }
                NodeKind::CatchAll { name } => {
                    captures.push((name.as_str(), search));
                    ""
                }
            };

            if rest.is_empty() && self.nodes[next].handlers.is_registered() {
                return Some(next);
            }
            if let Some(found) = self.find_node(next, rest, captures) {
                return Some(found);
            }
            // Failed branch: roll its captures back before the next candidate.
            captures.truncate(mark);
        }
        None
    }

    /// Appends a fresh node to the arena. Starts out static; `add_child`
    /// reclassifies it from its prefix.
    fn push_node(&mut self, prefix: &str) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(Node {
            kind: NodeKind::Static,
            label: prefix.as_bytes().first().copied().unwrap_or(0),
            prefix: prefix.to_owned(),
            handlers: MethodHandlers::default(),
            children: Default::default(),
        });
        id
    }

    /// Classifies `child` from its prefix and hooks it under `parent`.
    ///
    /// A `:`/`*` marker at position 0 turns the node into a wildcard covering
    /// one segment; any trailing text splits off into a static child beneath
    /// it, taking the handler map along. A marker past position 0 keeps a
    /// static head here and pushes the wildcard part down the same way.
    fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), Error> {
        let search = self.nodes[child].prefix.clone();

        if let Some(marker) = search.find(|c| c == ':' || c == '*') {
            if marker == 0 {
                let seg_end = if search.as_bytes()[0] == b'*' {
                    search.len()
                } else {
                    wildcard_segment_end(&search)
                };
                let kind = parse_wildcard(&search[..seg_end])?;
                self.nodes[child].kind = kind;
                if seg_end != search.len() {
                    // Route continues past the wildcard: move the handler map
                    // down into the static tail.
                    let handlers = std::mem::take(&mut self.nodes[child].handlers);
                    self.nodes[child].prefix.truncate(seg_end);
                    let tail = self.push_node(&search[seg_end..]);
                    self.nodes[tail].handlers = handlers;
                    self.add_child(child, tail)?;
                }
            } else {
                // Static head, wildcard later in the prefix.
                let handlers = std::mem::take(&mut self.nodes[child].handlers);
                self.nodes[child].prefix.truncate(marker);
                let sub = self.push_node(&search[marker..]);
                self.nodes[sub].handlers = handlers;
                self.add_child(child, sub)?;
            }
        }

        self.attach(parent, child);
        Ok(())
    }

    /// Appends `child` to the kind-matching list of `parent`, keeping the
    /// list sorted by label.
    fn attach(&mut self, parent: NodeId, child: NodeId) {
        let list = self.nodes[child].kind.list();
        let mut siblings = std::mem::take(&mut self.nodes[parent].children[list]);
        siblings.push(child);
        siblings.sort_by_key(|&id| self.nodes[id].label);
        self.nodes[parent].children[list] = siblings;
    }

    /// Swaps the child `old` of `parent` for `new`, in place. Looked up by
    /// id, not label — sibling labels may collide (see `static_candidates`).
    ///
    /// Only insertion calls this, and only for a child it just looked up; a
    /// missing target means the trie's own invariants are broken.
    fn replace_child(&mut self, parent: NodeId, old: NodeId, new: NodeId) {
        let list = self.nodes[new].kind.list();
        let pos = self.nodes[parent].children[list]
            .iter()
            .position(|&id| id == old);
        match pos {
            Some(i) => self.nodes[parent].children[list][i] = new,
            None => panic!("byway: replacing missing child"),
        }
    }

    /// Insert-time edge lookup: linear scan across all four kind lists.
    ///
    /// A static edge counts only if it shares at least one character with
    /// `search`. Two siblings can carry the same label without sharing any
    /// character — multi-byte characters with a common lead byte — and only
    /// one of them (or neither) is the right branch to descend or split.
    fn get_edge(&self, node: NodeId, search: &str) -> Option<NodeId> {
        let label = search.as_bytes()[0];
        self.nodes[node].children.iter().flatten().copied().find(|&id| {
            let child = &self.nodes[id];
            child.label == label
                && (!matches!(child.kind, NodeKind::Static)
                    || longest_prefix(search, &child.prefix) > 0)
        })
    }

    /// Match-time lookup of every static child carrying `label`. The list is
    /// sorted by label, so the candidates sit in one contiguous run; it has
    /// more than one entry only when sibling prefixes share a lead byte but
    /// diverge inside a multi-byte character.
    fn static_candidates(&self, node: NodeId, label: u8) -> &[NodeId] {
        let children = &self.nodes[node].children[STATIC_LIST];
        let start = children.partition_point(|&id| self.nodes[id].label < label);
        let end = children.partition_point(|&id| self.nodes[id].label <= label);
        &children[start..end]
    }

    /// Match-time wildcard edge lookup: the first entry of the kind list — at
    /// most one wildcard candidate per kind is ever tried.
    fn wildcard_edge(&self, node: NodeId, list: usize) -> Option<NodeId> {
        self.nodes[node].children[list].first().copied()
    }
}

/// Parses a wildcard pattern segment (`:name`, `:name(regex)`, `*`, `*name`)
/// into its node kind. Regexes are compiled anchored: the whole segment must
/// match.
fn parse_wildcard(segment: &str) -> Result<NodeKind, Error> {
    if segment.as_bytes()[0] == b'*' {
        let name = if segment.len() > 1 { &segment[1..] } else { "*" };
        return Ok(NodeKind::CatchAll { name: name.to_owned() });
    }

    let body = &segment[1..];
    let (name, constraint) = match body.find('(') {
        Some(open) => {
            if !body.ends_with(')') {
                return Err(Error::invalid_pattern(segment, "unclosed regex group"));
            }
            (&body[..open], Some(&body[open + 1..body.len() - 1]))
        }
        None => (body, None),
    };
    if name.is_empty() {
        return Err(Error::invalid_pattern(segment, "parameter is missing a name"));
    }

    match constraint {
        Some(regex) => {
            let pattern = Regex::new(&format!("^{regex}$"))
                .map_err(|e| Error::invalid_pattern(segment, e.to_string()))?;
            Ok(NodeKind::Regexp { name: name.to_owned(), pattern })
        }
        None => Ok(NodeKind::Param { name: name.to_owned() }),
    }
}

/// Byte offset of the first `*` outside a `(...)` constraint body, if any.
/// A star inside a regex constraint (`:id([0-9]*)`) is regex text, not a
/// catch-all marker.
fn unconstrained_star(pattern: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (i, b) in pattern.bytes().enumerate() {
        match b {
            b'(' => depth += 1,
            b')' => depth = depth.saturating_sub(1),
            b'*' if depth == 0 => return Some(i),
            _ => {}
        }
    }
    None
}

/// End offset of the wildcard segment at the head of `search`. A `/` inside a
/// regex constraint body does not terminate the segment.
fn wildcard_segment_end(search: &str) -> usize {
    let mut depth = 0usize;
    for (i, b) in search.bytes().enumerate() {
        match b {
            b'(' => depth += 1,
            b')' => depth = depth.saturating_sub(1),
            b'/' if depth == 0 => return i,
            _ => {}
        }
    }
    search.len()
}

/// Length of the common prefix of `a` and `b`, in bytes, cut at a character
/// boundary so the result is always a valid split point.
fn longest_prefix(a: &str, b: &str) -> usize {
    a.char_indices()
        .zip(b.chars())
        .find(|((_, ca), cb)| ca != cb)
        .map(|((i, _), _)| i)
        .unwrap_or_else(|| a.len().min(b.len()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::Handler;
    use crate::params::RouteParams;
    use crate::{Request, Response};

    fn handler() -> BoxedHandler {
        (|_req: Request| async { Response::text("ok") }).into_boxed_handler()
    }

    fn find<'a>(tree: &'a Tree, path: &'a str) -> (Option<&'a MethodHandlers>, RouteParams) {
        let mut params = RouteParams::new();
        let found = tree.find(path, &mut params);
        (found, params)
    }

    fn found_is(tree: &Tree, method: MethodFlags, path: &str, expected: &BoxedHandler) -> bool {
        let (found, _) = find(tree, path);
        match found.and_then(|m| m.get(method)) {
            Some(h) => Arc::ptr_eq(h, expected),
            None => false,
        }
    }

    #[test]
    fn static_route_roundtrip() {
        let mut tree = Tree::new();
        let h = handler();
        tree.insert(MethodFlags::GET, "/users", h.clone()).unwrap();
        assert!(found_is(&tree, MethodFlags::GET, "/users", &h));
        assert!(find(&tree, "/user").0.is_none());
        assert!(find(&tree, "/users/42").0.is_none());
    }

    #[test]
    fn root_route() {
        let mut tree = Tree::new();
        let h = handler();
        tree.insert(MethodFlags::GET, "/", h.clone()).unwrap();
        assert!(found_is(&tree, MethodFlags::GET, "/", &h));
    }

    #[test]
    fn duplicate_registration_overwrites() {
        let mut tree = Tree::new();
        let first = handler();
        let second = handler();
        tree.insert(MethodFlags::GET, "/users", first.clone()).unwrap();
        tree.insert(MethodFlags::GET, "/users", second.clone()).unwrap();
        assert!(found_is(&tree, MethodFlags::GET, "/users", &second));
        assert!(!found_is(&tree, MethodFlags::GET, "/users", &first));
    }

    #[test]
    fn static_beats_param() {
        let mut tree = Tree::new();
        let fixed = handler();
        let wild = handler();
        tree.insert(MethodFlags::GET, "/users/admin", fixed.clone()).unwrap();
        tree.insert(MethodFlags::GET, "/users/:id", wild.clone()).unwrap();

        let (found, params) = find(&tree, "/users/admin");
        assert!(Arc::ptr_eq(found.unwrap().get(MethodFlags::GET).unwrap(), &fixed));
        assert!(params.is_empty());

        let (found, params) = find(&tree, "/users/42");
        assert!(Arc::ptr_eq(found.unwrap().get(MethodFlags::GET).unwrap(), &wild));
        assert_eq!(params.lookup("id"), Some("42"));
    }

    #[test]
    fn param_stops_at_slash() {
        let mut tree = Tree::new();
        tree.insert(MethodFlags::GET, "/users/:id", handler()).unwrap();
        assert!(find(&tree, "/users/42/posts").0.is_none());
    }

    #[test]
    fn nested_params_capture_in_order() {
        let mut tree = Tree::new();
        tree.insert(MethodFlags::GET, "/users/:uid/posts/:pid", handler()).unwrap();
        let (found, params) = find(&tree, "/users/7/posts/99");
        assert!(found.is_some());
        assert_eq!(params.lookup("uid"), Some("7"));
        assert_eq!(params.lookup("pid"), Some("99"));
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn catch_all_swallows_slashes() {
        let mut tree = Tree::new();
        let h = handler();
        tree.insert(MethodFlags::GET, "/files/*filepath", h.clone()).unwrap();
        let (found, params) = find(&tree, "/files/a/b/c");
        assert!(Arc::ptr_eq(found.unwrap().get(MethodFlags::GET).unwrap(), &h));
        assert_eq!(params.lookup("filepath"), Some("a/b/c"));
    }

    #[test]
    fn bare_catch_all_records_under_star() {
        let mut tree = Tree::new();
        tree.insert(MethodFlags::GET, "/static/*", handler()).unwrap();
        let (found, params) = find(&tree, "/static/css/site.css");
        assert!(found.is_some());
        assert_eq!(params.lookup("*"), Some("css/site.css"));
    }

    #[test]
    fn backtracking_rolls_captures_back() {
        let mut tree = Tree::new();
        let short = handler();
        tree.insert(MethodFlags::GET, "/a/:x/static", handler()).unwrap();
        tree.insert(MethodFlags::GET, "/a/:x", short.clone()).unwrap();

        // "/a/5" first speculates into the deeper ":x/static" shape and
        // fails; the surviving state must be exactly one binding.
        let (found, params) = find(&tree, "/a/5");
        assert!(Arc::ptr_eq(found.unwrap().get(MethodFlags::GET).unwrap(), &short));
        assert_eq!(params.lookup("x"), Some("5"));
        assert_eq!(params.len(), 1);
    }

    #[test]
    fn failed_match_commits_nothing() {
        let mut tree = Tree::new();
        tree.insert(MethodFlags::GET, "/a/:x/static", handler()).unwrap();
        let (found, params) = find(&tree, "/a/5/other");
        assert!(found.is_none());
        assert!(params.is_empty());
    }

    #[test]
    fn splitting_keeps_routes_distinct() {
        let mut tree = Tree::new();
        let foo = handler();
        let bar = handler();
        let baz = handler();
        tree.insert(MethodFlags::GET, "/foo", foo.clone()).unwrap();
        tree.insert(MethodFlags::GET, "/foobar", bar.clone()).unwrap();
        tree.insert(MethodFlags::GET, "/foobaz", baz.clone()).unwrap();

        assert!(found_is(&tree, MethodFlags::GET, "/foo", &foo));
        assert!(found_is(&tree, MethodFlags::GET, "/foobar", &bar));
        assert!(found_is(&tree, MethodFlags::GET, "/foobaz", &baz));
        // "/foob" is an intermediate split node, not a registered route.
        assert!(find(&tree, "/foob").0.is_none());
    }

    #[test]
    fn split_where_new_pattern_is_the_common_prefix() {
        let mut tree = Tree::new();
        let long = handler();
        let short = handler();
        tree.insert(MethodFlags::GET, "/foobar", long.clone()).unwrap();
        tree.insert(MethodFlags::GET, "/foo", short.clone()).unwrap();
        assert!(found_is(&tree, MethodFlags::GET, "/foobar", &long));
        assert!(found_is(&tree, MethodFlags::GET, "/foo", &short));
    }

    #[test]
    fn multibyte_siblings_with_a_shared_lead_byte_stay_reachable() {
        // "é" (C3 A9) and "è" (C3 A8) share their UTF-8 lead byte, so after
        // the split both siblings carry the same label. Both routes must
        // still resolve.
        let mut tree = Tree::new();
        let acute = handler();
        let grave = handler();
        tree.insert(MethodFlags::GET, "/café", acute.clone()).unwrap();
        tree.insert(MethodFlags::GET, "/cafè", grave.clone()).unwrap();

        assert!(found_is(&tree, MethodFlags::GET, "/café", &acute));
        assert!(found_is(&tree, MethodFlags::GET, "/cafè", &grave));
        assert!(find(&tree, "/caf").0.is_none());
        assert!(find(&tree, "/cafê").0.is_none());
    }

    #[test]
    fn multibyte_divergence_at_the_first_character() {
        // Same collision one level up: the two patterns share no character
        // at all, only a lead byte, so no split happens — the second insert
        // must become a sibling, not clobber or shadow the first.
        let mut tree = Tree::new();
        let a = handler();
        let b = handler();
        tree.insert(MethodFlags::GET, "/é", a.clone()).unwrap();
        tree.insert(MethodFlags::GET, "/è", b.clone()).unwrap();
        assert!(found_is(&tree, MethodFlags::GET, "/é", &a));
        assert!(found_is(&tree, MethodFlags::GET, "/è", &b));
    }

    #[test]
    fn mid_segment_param_after_static_head() {
        let mut tree = Tree::new();
        tree.insert(MethodFlags::GET, "/file.:ext", handler()).unwrap();
        let (found, params) = find(&tree, "/file.tar");
        assert!(found.is_some());
        assert_eq!(params.lookup("ext"), Some("tar"));
    }

    #[test]
    fn method_map_is_per_node() {
        let mut tree = Tree::new();
        let get = handler();
        let post = handler();
        tree.insert(MethodFlags::GET, "/things", get.clone()).unwrap();
        tree.insert(MethodFlags::POST, "/things", post.clone()).unwrap();

        let (found, _) = find(&tree, "/things");
        let map = found.unwrap();
        assert!(Arc::ptr_eq(map.get(MethodFlags::GET).unwrap(), &get));
        assert!(Arc::ptr_eq(map.get(MethodFlags::POST).unwrap(), &post));
        // Path matched, method absent: the map is there but the slot is not.
        assert!(map.get(MethodFlags::DELETE).is_none());
        assert!(map.is_registered());
        assert_eq!(map.allowed(), MethodFlags::GET | MethodFlags::POST);
    }

    #[test]
    fn all_sentinel_fans_out() {
        let mut tree = Tree::new();
        let h = handler();
        tree.insert(MethodFlags::ALL, "/anything", h.clone()).unwrap();
        let (found, _) = find(&tree, "/anything");
        let map = found.unwrap();
        for flag in [MethodFlags::GET, MethodFlags::TRACE, MethodFlags::CONNECT] {
            assert!(Arc::ptr_eq(map.get(flag).unwrap(), &h));
        }
    }

    #[test]
    fn one_registration_can_cover_several_methods() {
        let mut tree = Tree::new();
        let h = handler();
        tree.insert(MethodFlags::GET | MethodFlags::HEAD, "/page", h.clone()).unwrap();
        let (found, _) = find(&tree, "/page");
        let map = found.unwrap();
        assert!(map.get(MethodFlags::GET).is_some());
        assert!(map.get(MethodFlags::HEAD).is_some());
        assert!(map.get(MethodFlags::POST).is_none());
    }

    #[test]
    fn regexp_segment_constrains_the_match() {
        let mut tree = Tree::new();
        let h = handler();
        tree.insert(MethodFlags::GET, "/articles/:id([0-9]+)", h.clone()).unwrap();

        let (found, params) = find(&tree, "/articles/123");
        assert!(Arc::ptr_eq(found.unwrap().get(MethodFlags::GET).unwrap(), &h));
        assert_eq!(params.lookup("id"), Some("123"));

        let (found, params) = find(&tree, "/articles/abc");
        assert!(found.is_none());
        assert!(params.is_empty());
    }

    #[test]
    fn regexp_is_anchored_to_the_whole_segment() {
        let mut tree = Tree::new();
        tree.insert(MethodFlags::GET, "/v:num([0-9]+)", handler()).unwrap();
        assert!(find(&tree, "/v2").0.is_some());
        assert!(find(&tree, "/v2beta").0.is_none());
    }

    #[test]
    fn param_matches_empty_segment() {
        // No trailing-slash normalization: "/users/" reaches the param node
        // with an empty capture.
        let mut tree = Tree::new();
        tree.insert(MethodFlags::GET, "/users/:id", handler()).unwrap();
        let (found, params) = find(&tree, "/users/");
        assert!(found.is_some());
        assert_eq!(params.lookup("id"), Some(""));
    }

    #[test]
    fn rejects_pattern_without_leading_slash() {
        let mut tree = Tree::new();
        let err = tree.insert(MethodFlags::GET, "users", handler()).unwrap_err();
        assert!(matches!(err, Error::InvalidPattern { .. }));
    }

    #[test]
    fn star_inside_a_regex_constraint_is_not_a_catch_all() {
        let mut tree = Tree::new();
        let h = handler();
        tree.insert(MethodFlags::GET, "/a/:id([0-9]*)/b", h.clone()).unwrap();

        assert!(found_is(&tree, MethodFlags::GET, "/a/123/b", &h));
        // [0-9]* accepts the empty segment.
        assert!(found_is(&tree, MethodFlags::GET, "/a//b", &h));
        assert!(find(&tree, "/a/xy/b").0.is_none());
        assert!(find(&tree, "/a/123").0.is_none());
    }

    #[test]
    fn rejects_catch_all_before_the_tail() {
        let mut tree = Tree::new();
        let err = tree
            .insert(MethodFlags::GET, "/files/*dir/meta", handler())
            .unwrap_err();
        assert!(matches!(err, Error::InvalidPattern { .. }));
    }

    #[test]
    fn rejects_unnamed_param() {
        let mut tree = Tree::new();
        let err = tree.insert(MethodFlags::GET, "/users/:", handler()).unwrap_err();
        assert!(matches!(err, Error::InvalidPattern { .. }));
    }

    #[test]
    fn rejects_malformed_regex() {
        let mut tree = Tree::new();
        assert!(matches!(
            tree.insert(MethodFlags::GET, "/a/:id([", handler()).unwrap_err(),
            Error::InvalidPattern { .. }
        ));
        assert!(matches!(
            tree.insert(MethodFlags::GET, "/a/:id(()", handler()).unwrap_err(),
            Error::InvalidPattern { .. }
        ));
    }

    #[test]
    fn deep_mixed_tree() {
        let mut tree = Tree::new();
        let api_user = handler();
        let api_user_posts = handler();
        let asset = handler();
        tree.insert(MethodFlags::GET, "/api/users/:id", api_user.clone()).unwrap();
        tree.insert(MethodFlags::GET, "/api/users/:id/posts", api_user_posts.clone()).unwrap();
        tree.insert(MethodFlags::GET, "/assets/*path", asset.clone()).unwrap();

        assert!(found_is(&tree, MethodFlags::GET, "/api/users/1", &api_user));
        assert!(found_is(&tree, MethodFlags::GET, "/api/users/1/posts", &api_user_posts));
        assert!(found_is(&tree, MethodFlags::GET, "/assets/js/app.js", &asset));
        assert!(find(&tree, "/api").0.is_none());
    }
}
