// Copyright notice and licensing information.
// SPDX-License-Identifier: Apache-2.0 OR MIT indicates dual licensing under Apache 2.0 or MIT licenses.
// Copyright © 2024 yamltree Contributors. All rights reserved.

//! Path lookup: `name(.name | [index])*` walks a tree
//! breadcrumb by breadcrumb, either read-only ([`lookup`]) or creating
//! missing structure along the way ([`lookup_or_modify`]).

use crate::modules::error::{self, ErrorImpl, Result};
use crate::modules::path::Path;
use crate::tree::arena::ScalarSpan;
use crate::tree::node::{NodeId, NONE};
use crate::tree::Tree;

enum Segment<'a> {
    Name(&'a str),
    Index(usize),
}

fn parse_first(s: &str) -> Option<(Segment<'_>, &str)> {
    if s.is_empty() {
        return None;
    }
    if let Some(rest) = s.strip_prefix('[') {
        let end = rest.find(']')?;
        let idx: usize = rest[..end].parse().ok()?;
        return Some((Segment::Index(idx), &rest[end + 1..]));
    }
    let end = s.find(['.', '[']).unwrap_or(s.len());
    if end == 0 {
        return None;
    }
    Some((Segment::Name(&s[..end]), &s[end..]))
}

fn parse_next(s: &str) -> Option<(Segment<'_>, &str)> {
    if let Some(rest) = s.strip_prefix('.') {
        let end = rest.find(['.', '[']).unwrap_or(rest.len());
        if end == 0 {
            return None;
        }
        return Some((Segment::Name(&rest[..end]), &rest[end..]));
    }
    if let Some(rest) = s.strip_prefix('[') {
        let end = rest.find(']')?;
        let idx: usize = rest[..end].parse().ok()?;
        return Some((Segment::Index(idx), &rest[end + 1..]));
    }
    None
}

fn find_map_child(tree: &Tree, parent: NodeId, name: &str) -> Option<NodeId> {
    if !tree.ty(parent).is_map() {
        return None;
    }
    let mut child = tree.first_child(parent);
    while child != NONE {
        if tree.key(child) == Some(name) {
            return Some(child);
        }
        child = tree.next_sibling(child);
    }
    None
}

fn find_seq_child(tree: &Tree, parent: NodeId, index: usize) -> Option<NodeId> {
    if !tree.ty(parent).is_seq() {
        return None;
    }
    let mut child = tree.first_child(parent);
    let mut i = 0;
    while child != NONE {
        if i == index {
            return Some(child);
        }
        i += 1;
        child = tree.next_sibling(child);
    }
    None
}

fn child_count(tree: &Tree, id: NodeId) -> usize {
    let mut count = 0;
    let mut child = tree.first_child(id);
    while child != NONE {
        count += 1;
        child = tree.next_sibling(child);
    }
    count
}

/// Outcome of a read-only path walk.
pub struct Lookup {
    /// The node the full path resolved to, or [`NONE`] if it didn't.
    pub target: NodeId,
    /// The deepest node reached before the first unresolved segment
    /// (equal to `target` on success).
    pub closest: NodeId,
    /// The portion of the path that did resolve, rendered the way
    /// [`Path`]'s `Display` impl renders it (`a.b[2]`-style).
    pub resolved_prefix: String,
}

/// Walks `path` from the tree's root, without modifying the tree.
pub fn lookup(tree: &Tree, path: &str) -> Lookup {
    walk(tree, tree.root_id(), Path::Root, path, true)
}

fn walk(tree: &Tree, current: NodeId, current_path: Path, rest: &str, first: bool) -> Lookup {
    let parsed = if first { parse_first(rest) } else { parse_next(rest) };
    let (seg, next_rest) = match parsed {
        Some(v) => v,
        None => {
            return Lookup { target: current, closest: current, resolved_prefix: current_path.to_string() };
        }
    };
    let (found, next_path) = match seg {
        Segment::Name(name) => (find_map_child(tree, current, name), Path::Map { parent: &current_path, key: name }),
        Segment::Index(idx) => {
            (find_seq_child(tree, current, idx), Path::Seq { parent: &current_path, index: idx })
        }
    };
    match found {
        Some(node) => walk(tree, node, next_path, next_rest, false),
        None => Lookup { target: NONE, closest: current, resolved_prefix: current_path.to_string() },
    }
}

/// Like [`lookup`], but returns a [`ErrorImpl::PathNotFound`] error
/// carrying the resolved prefix instead of a sentinel `target`.
pub fn get(tree: &Tree, path: &str) -> Result<NodeId> {
    let result = lookup(tree, path);
    if result.target != NONE {
        Ok(result.target)
    } else {
        Err(error::new(ErrorImpl::PathNotFound { path: path.to_string(), resolved_prefix: result.resolved_prefix }))
    }
}

/// Walks `path` from the tree's root, creating whatever map/seq/val
/// structure is missing along the way. A dotted segment on a
/// non-container turns it into a map; a bracketed segment turns it into
/// a seq; missing intermediate sequence slots are filled with empty
/// (null) values. If the final segment's node is newly created, its
/// value is set to `default_value`.
pub fn lookup_or_modify(tree: &mut Tree, path: &str, default_value: ScalarSpan) -> NodeId {
    let mut segments = Vec::new();
    let mut rest = path;
    let mut first = true;
    loop {
        let parsed = if first { parse_first(rest) } else { parse_next(rest) };
        first = false;
        match parsed {
            Some((seg, next_rest)) => {
                segments.push(seg);
                rest = next_rest;
            }
            None => break,
        }
    }

    let mut current = tree.root_id();
    let mut created = false;
    for seg in &segments {
        let (node, was_created) = match seg {
            Segment::Name(name) => {
                if !tree.ty(current).is_map() {
                    tree.to_map(current);
                }
                match find_map_child(tree, current, name) {
                    Some(node) => (node, false),
                    None => {
                        let child = tree.append_child(current);
                        let key = ScalarSpan::arena(tree.copy_to_arena(name.as_bytes()));
                        tree.to_key(child, key);
                        (child, true)
                    }
                }
            }
            Segment::Index(idx) => {
                if !tree.ty(current).is_seq() {
                    tree.to_seq(current);
                }
                let original_count = child_count(tree, current);
                let mut count = original_count;
                while count <= *idx {
                    let child = tree.append_child(current);
                    tree.to_null_val(child);
                    count += 1;
                }
                let node = find_seq_child(tree, current, *idx).expect("gap fill just ensured this index exists");
                (node, *idx >= original_count)
            }
        };
        current = node;
        created = was_created;
    }

    if created {
        tree.to_val(current, default_value);
    }
    current
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(tree: &mut Tree, s: &str) -> ScalarSpan {
        ScalarSpan::arena(tree.copy_to_arena(s.as_bytes()))
    }

    #[test]
    fn lookup_walks_map_and_seq_segments() {
        let mut tree = Tree::new();
        let root = tree.root_id();
        tree.to_map(root);
        let a = tree.append_child(root);
        let k = text(&mut tree, "a");
        tree.to_key(a, k);
        tree.to_seq(a);
        let item0 = tree.append_child(a);
        tree.to_null_val(item0);
        let item1 = tree.append_child(a);
        let v = text(&mut tree, "hit");
        tree.to_val(item1, v);

        let result = lookup(&tree, "a[1]");
        assert_eq!(result.target, item1);
        assert_eq!(tree.val(result.target), Some("hit"));
    }

    #[test]
    fn lookup_reports_closest_on_failure() {
        let mut tree = Tree::new();
        let root = tree.root_id();
        tree.to_map(root);
        let a = tree.append_child(root);
        let k = text(&mut tree, "a");
        tree.to_key(a, k);
        tree.to_null_val(a);

        let result = lookup(&tree, "a.b");
        assert_eq!(result.target, NONE);
        assert_eq!(result.closest, a);
        assert_eq!(result.resolved_prefix, "a");
    }

    #[test]
    fn lookup_or_modify_creates_missing_structure() {
        let mut tree = Tree::new();
        let default_value = text(&mut tree, "x");
        let node = lookup_or_modify(&mut tree, "a.b[2].c", default_value);
        assert_eq!(tree.val(node), Some("x"));

        let result = lookup(&tree, "a.b[2].c");
        assert_eq!(result.target, node);
    }

    #[test]
    fn lookup_or_modify_leaves_existing_values_alone() {
        let mut tree = Tree::new();
        let root = tree.root_id();
        tree.to_map(root);
        let a = tree.append_child(root);
        let k = text(&mut tree, "a");
        tree.to_key(a, k);
        let existing = text(&mut tree, "keep-me");
        tree.to_val(a, existing);

        let default_value = text(&mut tree, "overwritten?");
        let node = lookup_or_modify(&mut tree, "a", default_value);
        assert_eq!(node, a);
        assert_eq!(tree.val(node), Some("keep-me"));
    }
}
