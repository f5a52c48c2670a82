// Copyright notice and licensing information.
// SPDX-License-Identifier: Apache-2.0 OR MIT indicates dual licensing under Apache 2.0 or MIT licenses.
// Copyright © 2024 yamltree Contributors. All rights reserved.

use super::arena::ScalarSpan;
use super::types::NodeType;

/// A node's identity: its position in the tree's node pool.
///
/// Indices, not pointers: the pool may move wholesale on growth, but a `NodeId` keeps identifying the same logical node.
pub type NodeId = u32;

/// Sentinel meaning "no such node" (used for `parent`, sibling and child
/// links, and as the free-list terminator).
pub const NONE: NodeId = u32::MAX;

/// One side (key or value) of a node: a `(tag, scalar, anchor)` triple of
/// optional spans. `scalar: None` is YAML's `~`; `Some(span)`
/// with `span.is_empty()` is `''`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Side {
    pub tag: Option<ScalarSpan>,
    pub scalar: Option<ScalarSpan>,
    pub anchor: Option<ScalarSpan>,
}

impl Side {
    pub fn clear(&mut self) {
        *self = Side::default();
    }
}

/// A single entry in the node pool.
///
/// Children are kept in document order via a doubly-linked sibling list;
/// the free list reuses `prev_sibling`/`next_sibling` on released slots.
#[derive(Clone, Copy, Debug)]
pub struct NodeData {
    pub ty: NodeType,
    pub key: Side,
    pub val: Side,
    pub parent: NodeId,
    pub first_child: NodeId,
    pub last_child: NodeId,
    pub prev_sibling: NodeId,
    pub next_sibling: NodeId,
}

impl NodeData {
    pub fn empty() -> Self {
        NodeData {
            ty: NodeType::NOTYPE,
            key: Side::default(),
            val: Side::default(),
            parent: NONE,
            first_child: NONE,
            last_child: NONE,
            prev_sibling: NONE,
            next_sibling: NONE,
        }
    }

    pub fn has_children(&self) -> bool {
        self.first_child != NONE
    }
}

impl Default for NodeData {
    fn default() -> Self {
        NodeData::empty()
    }
}
