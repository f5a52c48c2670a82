// Copyright notice and licensing information.
// SPDX-License-Identifier: Apache-2.0 OR MIT indicates dual licensing under Apache 2.0 or MIT licenses.
// Copyright © 2024 yamltree Contributors. All rights reserved.

//! The reference resolver: an explicit post-parse pass
//! that expands `*alias` and `<<: *merge` nodes left behind by the
//! parser.
//!
//! Only the value side of a node is ever anchored, aliased, or merged
//! by this crate's own parser — a bare map key is never itself `&anchor`
//! or `*alias`, so [`resolve`] handles key-side anchors/aliases mostly
//! for completeness against the general tree model (a tree built by
//! hand through the `Tree` API directly could still use them).

use std::collections::HashMap;

use crate::modules::error::{self, Error, ErrorImpl, Mark, Result};
use crate::tree::node::{NodeId, NONE};
use crate::tree::types::NodeType;
use crate::tree::Tree;

enum Job {
    ValAlias { node: NodeId, target: NodeId },
    KeyAlias { node: NodeId, target: NodeId },
    Merge { entry: NodeId, targets: Vec<NodeId> },
}

/// Expands every alias and merge key in `tree` in place, then clears
/// the anchor/ref flags and spans that drove the expansion.
pub fn resolve(tree: &mut Tree) -> Result<()> {
    let mut anchors: HashMap<String, NodeId> = HashMap::new();
    let mut jobs: Vec<Job> = Vec::new();
    let root = tree.root_id();
    walk(tree, root, &mut anchors, &mut jobs)?;

    for job in jobs {
        match job {
            Job::ValAlias { node, target } => {
                log::debug!("resolving value alias: node={node:?} target={target:?}");
                tree.replace_val_with_subtree_within(target, node);
            }
            Job::KeyAlias { node, target } => {
                log::debug!("resolving key alias: node={node:?} target={target:?}");
                let text = tree.val(target).unwrap_or_default().to_string();
                let span = crate::tree::arena::ScalarSpan::arena(tree.copy_to_arena(text.as_bytes()));
                tree.to_key(node, span);
                tree.clear_key_ref_anchor_flags(node);
            }
            Job::Merge { entry, targets } => {
                log::debug!("resolving merge key: entry={entry:?} targets={}", targets.len());
                let parent = tree.parent(entry);
                let mut after = tree.prev_sibling(entry);
                for target in targets {
                    after = tree.duplicate_children_no_rep_within(target, parent, after);
                }
                tree.remove(entry);
            }
        }
    }

    clear_flags(tree, root);
    Ok(())
}

fn unknown_anchor(name: &str) -> Error {
    error::new(ErrorImpl::UnknownAnchor { mark: Mark::default(), name: name.to_string() })
}

fn resolve_name(anchors: &HashMap<String, NodeId>, name: &str) -> Result<NodeId> {
    anchors.get(name).copied().ok_or_else(|| unknown_anchor(name))
}

fn walk(tree: &Tree, id: NodeId, anchors: &mut HashMap<String, NodeId>, jobs: &mut Vec<Job>) -> Result<()> {
    if tree.ty(id).has_any(NodeType::KEYREF) {
        let name = tree.key(id).expect("KEYREF node must carry an alias name").to_string();
        let target = resolve_name(anchors, &name)?;
        jobs.push(Job::KeyAlias { node: id, target });
    }

    if tree.key(id) == Some("<<") {
        let mut targets = Vec::new();
        if tree.ty(id).has_any(NodeType::VALREF) {
            let name = tree.val(id).expect("VALREF node must carry an alias name").to_string();
            targets.push(resolve_name(anchors, &name)?);
        } else if tree.ty(id).is_seq() {
            let mut child = tree.first_child(id);
            while child != NONE {
                if tree.ty(child).has_any(NodeType::VALREF) {
                    let name = tree.val(child).expect("VALREF node must carry an alias name").to_string();
                    targets.push(resolve_name(anchors, &name)?);
                }
                child = tree.next_sibling(child);
            }
        }
        jobs.push(Job::Merge { entry: id, targets });
        return Ok(());
    }

    if tree.ty(id).has_any(NodeType::VALREF) {
        let name = tree.val(id).expect("VALREF node must carry an alias name").to_string();
        let target = resolve_name(anchors, &name)?;
        jobs.push(Job::ValAlias { node: id, target });
    } else {
        let mut child = tree.first_child(id);
        while child != NONE {
            walk(tree, child, anchors, jobs)?;
            child = tree.next_sibling(child);
        }
    }

    if let Some(name) = tree.key_anchor(id) {
        anchors.insert(name.to_string(), id);
    }
    if let Some(name) = tree.val_anchor(id) {
        anchors.insert(name.to_string(), id);
    }
    Ok(())
}

fn clear_flags(tree: &mut Tree, id: NodeId) {
    tree.clear_key_ref_anchor_flags(id);
    tree.clear_val_ref_anchor_flags(id);
    let mut child = tree.first_child(id);
    while child != NONE {
        clear_flags(tree, child);
        child = tree.next_sibling(child);
    }
}
