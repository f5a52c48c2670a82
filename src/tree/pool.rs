// Copyright notice and licensing information.
// SPDX-License-Identifier: Apache-2.0 OR MIT indicates dual licensing under Apache 2.0 or MIT licenses.
// Copyright © 2024 yamltree Contributors. All rights reserved.

use super::node::{NodeData, NodeId, NONE};

/// A densely packed node pool with an intrusive free list threaded through
/// released slots' sibling fields.
#[derive(Debug, Default)]
pub struct NodePool {
    nodes: Vec<NodeData>,
    free_head: NodeId,
    free_tail: NodeId,
    num_free: usize,
}

impl NodePool {
    pub fn new() -> Self {
        NodePool {
            nodes: Vec::new(),
            free_head: NONE,
            free_tail: NONE,
            num_free: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.nodes.capacity()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn num_free(&self) -> usize {
        self.num_free
    }

    #[inline]
    pub fn get(&self, id: NodeId) -> &NodeData {
        &self.nodes[id as usize]
    }

    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> &mut NodeData {
        &mut self.nodes[id as usize]
    }

    pub fn is_valid(&self, id: NodeId) -> bool {
        id != NONE && (id as usize) < self.nodes.len()
    }

    /// Grows the pool to at least `cap` slots, appending the new slots to
    /// the free list. A `Vec` growth is a move of the whole backing
    /// allocation, but since nodes are addressed by index rather than by
    /// pointer this never invalidates a live `NodeId`.
    pub fn reserve(&mut self, cap: usize) {
        if cap <= self.nodes.len() {
            return;
        }
        let first_new = self.nodes.len() as NodeId;
        self.nodes.resize_with(cap, NodeData::empty);
        for id in first_new..cap as NodeId {
            self.push_free(id);
        }
    }

    fn push_free(&mut self, id: NodeId) {
        {
            let node = &mut self.nodes[id as usize];
            node.parent = NONE;
            node.first_child = NONE;
            node.last_child = NONE;
            node.prev_sibling = self.free_tail;
            node.next_sibling = NONE;
        }
        if self.free_tail == NONE {
            self.free_head = id;
        } else {
            self.nodes[self.free_tail as usize].next_sibling = id;
        }
        self.free_tail = id;
        self.num_free += 1;
    }

    /// Claims a free slot, growing the pool geometrically if none remain.
    /// Returns a freshly zeroed node's id.
    pub fn claim(&mut self) -> NodeId {
        if self.free_head == NONE {
            let new_cap = if self.nodes.is_empty() { 16 } else { self.nodes.len() * 2 };
            self.reserve(new_cap);
        }
        let id = self.free_head;
        debug_assert!(id != NONE, "pool exhausted after reserve");
        let next = self.nodes[id as usize].next_sibling;
        self.free_head = next;
        if next == NONE {
            self.free_tail = NONE;
        } else {
            self.nodes[next as usize].prev_sibling = NONE;
        }
        self.num_free -= 1;
        self.nodes[id as usize] = NodeData::empty();
        id
    }

    /// Returns `id` to the free list. Caller is responsible for having
    /// already detached it from any live parent/sibling chain.
    pub fn release(&mut self, id: NodeId) {
        self.push_free(id);
    }

    pub fn iter_ids(&self) -> impl Iterator<Item = NodeId> {
        0..self.nodes.len() as NodeId
    }
}
