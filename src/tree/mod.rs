// Copyright notice and licensing information.
// SPDX-License-Identifier: Apache-2.0 OR MIT indicates dual licensing under Apache 2.0 or MIT licenses.
// Copyright © 2024 yamltree Contributors. All rights reserved.

//! The arena tree: an index-addressed node pool with a side string
//! arena. This is the data model every other component (parser,
//! resolver, emitter, path lookup) builds on.

pub mod arena;
pub mod node;
mod pool;
pub mod types;

use crate::config::Callbacks;
use crate::modules::error::{Error, ErrorImpl, Result};
use arena::{ScalarSpan, Span, SpanSource, StringArena};
use node::{NodeData, NodeId, Side, NONE};
use pool::NodePool;
use std::collections::HashMap;
pub use types::{to_tag, to_tag_with_handles, NodeType, TagType};

/// The arena tree described at the top of this module.
///
/// Owns a node pool, a side string arena, and (while a parse is in
/// progress or has not been superseded) the raw source buffer that scalar
/// spans may point into. Two trees never share an arena or a buffer;
/// cross-tree operations always copy bytes via [`Tree::copy_to_arena`].
pub struct Tree {
    pool: NodePool,
    arena: StringArena,
    buffer: Vec<u8>,
    root: NodeId,
    callbacks: Callbacks,
    tag_handles: HashMap<String, String>,
}

impl Tree {
    /// Creates an empty tree using the process-wide default callbacks.
    pub fn new() -> Self {
        Self::with_callbacks(Callbacks::default())
    }

    /// Creates an empty tree with an explicit allocate/free/error hook set.
    pub fn with_callbacks(callbacks: Callbacks) -> Self {
        let mut tree = Tree {
            pool: NodePool::new(),
            arena: StringArena::new(),
            buffer: Vec::new(),
            root: NONE,
            callbacks,
            tag_handles: HashMap::new(),
        };
        tree.claim_root();
        tree
    }

    fn claim_root(&mut self) {
        let id = self.pool.claim();
        debug_assert_eq!(id, 0, "root must be the first claimed node");
        self.root = id;
    }

    pub fn root_id(&self) -> NodeId {
        self.root
    }

    pub fn callbacks(&self) -> &Callbacks {
        &self.callbacks
    }

    // -- capacity -----------------------------------------------------

    pub fn capacity(&self) -> usize {
        self.pool.capacity()
    }

    pub fn size(&self) -> usize {
        self.pool.len() - self.pool.num_free()
    }

    /// Grows the node pool to at least `cap` slots. Never invalidates a live `NodeId`.
    pub fn reserve(&mut self, cap: usize) {
        self.pool.reserve(cap);
    }

    pub fn arena_capacity(&self) -> usize {
        self.arena.capacity()
    }

    pub fn arena_len(&self) -> usize {
        self.arena.len()
    }

    /// Grows the string arena to at least `cap` bytes. If the caller
    /// intends to append bytes and rebase in one step, use
    /// [`Tree::copy_to_arena`]/[`Tree::to_arena`] directly; this is for
    /// pre-sizing ahead of many small appends.
    pub fn reserve_arena(&mut self, cap: usize) {
        if cap > self.arena.capacity() {
            self.arena.reserve(cap - self.arena.len());
        }
    }

    /// Appends a verbatim copy of `data` to the arena and returns the
    /// span it now occupies.
    pub fn copy_to_arena(&mut self, data: &[u8]) -> Span {
        self.arena.copy_to_arena(data)
    }

    /// Renders `value`'s `Display` form into the arena tail and returns
    /// the resulting span.
    pub fn to_arena(&mut self, value: impl std::fmt::Display) -> Span {
        self.arena.write_fmt_to_arena(format_args!("{value}"))
    }

    // -- scalar access --------------------------------------------------

    fn slice(&self, span: ScalarSpan) -> &[u8] {
        match span.source {
            SpanSource::Buffer => &self.buffer[span.span.start as usize..span.span.end as usize],
            SpanSource::Arena => self.arena.slice(span.span),
        }
    }

    pub fn scalar_str(&self, span: ScalarSpan) -> &str {
        std::str::from_utf8(self.slice(span)).expect("scalar spans are UTF-8 by construction")
    }

    pub fn buffer(&self) -> &[u8] {
        &self.buffer
    }

    pub fn buffer_mut(&mut self) -> &mut Vec<u8> {
        &mut self.buffer
    }

    pub fn set_buffer(&mut self, buffer: Vec<u8>) {
        self.buffer = buffer;
    }

    /// The `%TAG` handle→prefix table collected from this document's
    /// directives, if any were parsed. Pass to
    /// [`crate::tree::types::to_tag_with_handles`] to expand a custom
    /// `!handle!name` shorthand on a node's tag span.
    pub fn tag_handles(&self) -> &HashMap<String, String> {
        &self.tag_handles
    }

    pub fn set_tag_handles(&mut self, handles: HashMap<String, String>) {
        self.tag_handles = handles;
    }

    pub fn node(&self, id: NodeId) -> &NodeData {
        self.pool.get(id)
    }

    fn node_mut(&mut self, id: NodeId) -> &mut NodeData {
        self.pool.get_mut(id)
    }

    pub fn is_valid(&self, id: NodeId) -> bool {
        self.pool.is_valid(id)
    }

    pub fn ty(&self, id: NodeId) -> NodeType {
        self.node(id).ty
    }

    pub fn parent(&self, id: NodeId) -> NodeId {
        self.node(id).parent
    }

    pub fn first_child(&self, id: NodeId) -> NodeId {
        self.node(id).first_child
    }

    pub fn last_child(&self, id: NodeId) -> NodeId {
        self.node(id).last_child
    }

    pub fn next_sibling(&self, id: NodeId) -> NodeId {
        self.node(id).next_sibling
    }

    pub fn prev_sibling(&self, id: NodeId) -> NodeId {
        self.node(id).prev_sibling
    }

    pub fn has_children(&self, id: NodeId) -> bool {
        self.node(id).has_children()
    }

    pub fn num_children(&self, id: NodeId) -> usize {
        let mut n = 0;
        let mut child = self.first_child(id);
        while child != NONE {
            n += 1;
            child = self.next_sibling(child);
        }
        n
    }

    pub fn children(&self, id: NodeId) -> ChildIter<'_> {
        ChildIter { tree: self, next: self.first_child(id) }
    }

    pub fn val(&self, id: NodeId) -> Option<&str> {
        self.node(id).val.scalar.map(|s| self.scalar_str(s))
    }

    pub fn key(&self, id: NodeId) -> Option<&str> {
        self.node(id).key.scalar.map(|s| self.scalar_str(s))
    }

    pub fn val_tag(&self, id: NodeId) -> Option<&str> {
        self.node(id).val.tag.map(|s| self.scalar_str(s))
    }

    pub fn key_tag(&self, id: NodeId) -> Option<&str> {
        self.node(id).key.tag.map(|s| self.scalar_str(s))
    }

    pub fn val_anchor(&self, id: NodeId) -> Option<&str> {
        self.node(id).val.anchor.map(|s| self.scalar_str(s))
    }

    pub fn key_anchor(&self, id: NodeId) -> Option<&str> {
        self.node(id).key.anchor.map(|s| self.scalar_str(s))
    }

    /// Finds the map child keyed `key`, in O(#children).
    pub fn find_child_by_key(&self, id: NodeId, key: &str) -> Option<NodeId> {
        self.children(id).find(|&c| self.key(c) == Some(key))
    }

    pub fn child_at(&self, id: NodeId, index: usize) -> Option<NodeId> {
        self.children(id).nth(index)
    }

    // -- type transitions ------------------------------------------------

    fn assert_leafifiable(&self, id: NodeId) {
        if self.has_children(id) {
            panic!("cannot change type of node {id} while it has children");
        }
    }

    /// Sets this node's val-side scalar (and, if `tag`/`anchor` are
    /// given, the val tag/anchor), marking it `VAL`. The node must have
    /// no children.
    pub fn to_val(&mut self, id: NodeId, scalar: ScalarSpan) {
        self.assert_leafifiable(id);
        let node = self.node_mut(id);
        node.ty |= NodeType::VAL;
        node.ty = node.ty.without(NodeType::MAP.or(NodeType::SEQ));
        node.val.scalar = Some(scalar);
    }

    /// Marks `id` `VAL` with no scalar span at all — YAML's `~`/implicit
    /// null, as distinct from `''` which is `to_val` with an empty span.
    pub fn to_null_val(&mut self, id: NodeId) {
        self.assert_leafifiable(id);
        let node = self.node_mut(id);
        node.ty |= NodeType::VAL;
        node.ty = node.ty.without(NodeType::MAP.or(NodeType::SEQ));
        node.val.scalar = None;
    }

    pub fn to_map(&mut self, id: NodeId) {
        let node = self.node_mut(id);
        node.ty |= NodeType::MAP;
        node.ty = node.ty.without(NodeType::SEQ.or(NodeType::VAL));
        node.val.scalar = None;
    }

    pub fn to_seq(&mut self, id: NodeId) {
        let node = self.node_mut(id);
        node.ty |= NodeType::SEQ;
        node.ty = node.ty.without(NodeType::MAP.or(NodeType::VAL));
        node.val.scalar = None;
    }

    /// Sets both key and val scalar, marking the node `KEYVAL`. The
    /// parent must be a `MAP`.
    pub fn to_keyval(&mut self, id: NodeId, key: ScalarSpan, val: ScalarSpan) {
        self.assert_leafifiable(id);
        let node = self.node_mut(id);
        node.ty |= NodeType::KEYVAL;
        node.ty = node.ty.without(NodeType::MAP.or(NodeType::SEQ));
        node.key.scalar = Some(key);
        node.val.scalar = Some(val);
    }

    pub fn to_key(&mut self, id: NodeId, key: ScalarSpan) {
        let node = self.node_mut(id);
        node.ty |= NodeType::KEY;
        node.key.scalar = Some(key);
    }

    pub fn to_keymap(&mut self, id: NodeId, key: ScalarSpan) {
        let node = self.node_mut(id);
        node.ty |= NodeType::KEYMAP;
        node.ty = node.ty.without(NodeType::SEQ.or(NodeType::VAL));
        node.key.scalar = Some(key);
        node.val.scalar = None;
    }

    pub fn to_keyseq(&mut self, id: NodeId, key: ScalarSpan) {
        let node = self.node_mut(id);
        node.ty |= NodeType::KEYSEQ;
        node.ty = node.ty.without(NodeType::MAP.or(NodeType::VAL));
        node.key.scalar = Some(key);
        node.val.scalar = None;
    }

    pub fn to_doc(&mut self, id: NodeId) {
        let node = self.node_mut(id);
        node.ty |= NodeType::DOC;
    }

    pub fn to_stream(&mut self, id: NodeId) {
        let node = self.node_mut(id);
        node.ty |= NodeType::STREAM;
    }

    pub fn set_key_tag(&mut self, id: NodeId, tag: ScalarSpan) {
        let node = self.node_mut(id);
        node.ty |= NodeType::KEYTAG;
        node.key.tag = Some(tag);
    }

    pub fn set_val_tag(&mut self, id: NodeId, tag: ScalarSpan) {
        let node = self.node_mut(id);
        node.ty |= NodeType::VALTAG;
        node.val.tag = Some(tag);
    }

    pub fn set_key_anchor(&mut self, id: NodeId, anchor: ScalarSpan) {
        let node = self.node_mut(id);
        debug_assert!(!node.ty.has_any(NodeType::KEYREF), "KEYANCH/KEYREF are mutually exclusive");
        node.ty |= NodeType::KEYANCH;
        node.key.anchor = Some(anchor);
    }

    pub fn set_val_anchor(&mut self, id: NodeId, anchor: ScalarSpan) {
        let node = self.node_mut(id);
        debug_assert!(!node.ty.has_any(NodeType::VALREF), "VALANCH/VALREF are mutually exclusive");
        node.ty |= NodeType::VALANCH;
        node.val.anchor = Some(anchor);
    }

    pub fn set_key_ref(&mut self, id: NodeId, name: ScalarSpan) {
        let node = self.node_mut(id);
        debug_assert!(!node.ty.has_any(NodeType::KEYANCH), "KEYANCH/KEYREF are mutually exclusive");
        node.ty |= NodeType::KEYREF.or(NodeType::KEY);
        node.key.scalar = Some(name);
    }

    pub fn set_val_ref(&mut self, id: NodeId, name: ScalarSpan) {
        let node = self.node_mut(id);
        debug_assert!(!node.ty.has_any(NodeType::VALANCH), "VALANCH/VALREF are mutually exclusive");
        node.ty |= NodeType::VALREF.or(NodeType::VAL);
        node.val.scalar = Some(name);
    }

    fn clear_key_ref_flags(&mut self, id: NodeId) {
        let node = self.node_mut(id);
        node.ty = node.ty.without(NodeType::KEYREF.or(NodeType::KEYANCH));
        node.key.anchor = None;
    }

    fn clear_val_ref_flags(&mut self, id: NodeId) {
        let node = self.node_mut(id);
        node.ty = node.ty.without(NodeType::VALREF.or(NodeType::VALANCH));
        node.val.anchor = None;
    }

    // -- structural mutation --------------------------------------------

    /// Splices a freshly claimed node into `parent`'s child list, right
    /// after `after` (or at the head if `after == NONE`).
    pub fn insert_child(&mut self, parent: NodeId, after: NodeId) -> NodeId {
        let id = self.pool.claim();
        self.splice_child(id, parent, after);
        id
    }

    fn splice_child(&mut self, id: NodeId, parent: NodeId, after: NodeId) {
        self.node_mut(id).parent = parent;
        let next = if after == NONE {
            let first = self.first_child(parent);
            self.node_mut(id).next_sibling = first;
            self.node_mut(id).prev_sibling = NONE;
            if first != NONE {
                self.node_mut(first).prev_sibling = id;
            }
            self.node_mut(parent).first_child = id;
            first
        } else {
            let next = self.next_sibling(after);
            self.node_mut(id).prev_sibling = after;
            self.node_mut(id).next_sibling = next;
            self.node_mut(after).next_sibling = id;
            if next != NONE {
                self.node_mut(next).prev_sibling = id;
            }
            next
        };
        if next == NONE {
            self.node_mut(parent).last_child = id;
        }
    }

    pub fn append_child(&mut self, parent: NodeId) -> NodeId {
        let after = self.last_child(parent);
        self.insert_child(parent, after)
    }

    pub fn prepend_child(&mut self, parent: NodeId) -> NodeId {
        self.insert_child(parent, NONE)
    }

    pub fn insert_sibling(&mut self, after: NodeId) -> NodeId {
        let parent = self.parent(after);
        self.insert_child(parent, after)
    }

    /// Detaches `id` from its current parent/sibling chain without
    /// releasing it.
    fn detach(&mut self, id: NodeId) {
        let parent = self.parent(id);
        let prev = self.prev_sibling(id);
        let next = self.next_sibling(id);
        if prev != NONE {
            self.node_mut(prev).next_sibling = next;
        } else if parent != NONE {
            self.node_mut(parent).first_child = next;
        }
        if next != NONE {
            self.node_mut(next).prev_sibling = prev;
        } else if parent != NONE {
            self.node_mut(parent).last_child = prev;
        }
        let node = self.node_mut(id);
        node.parent = NONE;
        node.prev_sibling = NONE;
        node.next_sibling = NONE;
    }

    /// Removes `id` and its entire subtree, returning released slots to
    /// the free list.
    pub fn remove(&mut self, id: NodeId) {
        self.remove_children(id);
        self.detach(id);
        self.pool.release(id);
    }

    /// Removes all of `id`'s children, keeping `id` itself.
    pub fn remove_children(&mut self, id: NodeId) {
        let mut child = self.first_child(id);
        while child != NONE {
            let next = self.next_sibling(child);
            self.remove_children(child);
            self.pool.release(child);
            child = next;
        }
        let node = self.node_mut(id);
        node.first_child = NONE;
        node.last_child = NONE;
    }

    /// Moves `id` (and its subtree) to a new position after `after`
    /// within the same parent.
    pub fn move_after(&mut self, id: NodeId, after: NodeId) {
        let parent = self.parent(id);
        self.detach(id);
        self.splice_child(id, parent, after);
    }

    /// Moves `id` under `new_parent`, after `after`.
    pub fn move_to(&mut self, id: NodeId, new_parent: NodeId, after: NodeId) {
        self.detach(id);
        self.splice_child(id, new_parent, after);
    }

    /// Cross-tree move: duplicates `src_node` from `src` into `self`
    /// under `dst_parent`, then removes it from `src`.
    pub fn move_from(&mut self, src: &mut Tree, src_node: NodeId, dst_parent: NodeId, after: NodeId) -> NodeId {
        let new_id = self.duplicate(src, src_node, dst_parent, after);
        src.remove(src_node);
        new_id
    }

    fn copy_span(&mut self, src: &Tree, span: Option<ScalarSpan>) -> Option<ScalarSpan> {
        span.map(|s| ScalarSpan::arena(self.copy_to_arena(src.slice(s))))
    }

    fn copy_side(&mut self, src: &Tree, side: &Side) -> Side {
        Side {
            tag: self.copy_span(src, side.tag),
            scalar: self.copy_span(src, side.scalar),
            anchor: self.copy_span(src, side.anchor),
        }
    }

    /// Clones the subtree rooted at `src_node` in another tree `src`
    /// into `dst_parent`, after `after`, preserving order, copying
    /// scalar bytes into this tree's arena along the way. For copies within the same tree, use
    /// [`Tree::duplicate_within`] instead — it skips the byte copy and,
    /// unlike this method, can actually be called with a source that
    /// aliases `self`.
    pub fn duplicate(&mut self, src: &Tree, src_node: NodeId, dst_parent: NodeId, after: NodeId) -> NodeId {
        let ty = src.ty(src_node);
        let key = self.copy_side(src, &src.node(src_node).key);
        let val = self.copy_side(src, &src.node(src_node).val);
        let new_id = self.insert_child(dst_parent, after);
        {
            let node = self.node_mut(new_id);
            node.ty = ty;
            node.key = key;
            node.val = val;
        }
        let mut child = src.first_child(src_node);
        let mut prev_new = NONE;
        while child != NONE {
            prev_new = self.duplicate(src, child, new_id, prev_new);
            child = src.next_sibling(child);
        }
        new_id
    }

    /// Deep-copies `src_node` and its subtree to a new position within
    /// *this same tree*. Spans are
    /// reused as-is since source and destination already share an arena
    /// and buffer; no bytes are copied.
    ///
    /// [`Tree::duplicate`] takes a `&Tree` source and cannot soundly be
    /// called with `self` aliased as its own source, so same-tree copies
    /// go through this method instead.
    pub fn duplicate_within(&mut self, src_node: NodeId, dst_parent: NodeId, after: NodeId) -> NodeId {
        let data = *self.node(src_node);
        let new_id = self.insert_child(dst_parent, after);
        {
            let node = self.node_mut(new_id);
            node.ty = data.ty;
            node.key = data.key;
            node.val = data.val;
        }
        let mut child = self.first_child(src_node);
        let mut prev_new = NONE;
        while child != NONE {
            prev_new = self.duplicate_within(child, new_id, prev_new);
            child = self.next_sibling(child);
        }
        new_id
    }

    /// Moves `src`'s own type, key/val sides, and entire child list onto
    /// `dst` (which must currently be empty and childless), then resets
    /// `src` to an empty, untyped node. Used to renest an implicit
    /// single document one level deeper once a second `---` reveals the
    /// source is actually a multi-document stream.
    pub fn rehome_content(&mut self, src: NodeId, dst: NodeId) {
        debug_assert!(!self.has_children(dst), "rehome destination must be empty");
        let data = *self.node(src);
        {
            let d = self.node_mut(dst);
            d.ty = data.ty;
            d.key = data.key;
            d.val = data.val;
            d.first_child = data.first_child;
            d.last_child = data.last_child;
        }
        let mut child = data.first_child;
        while child != NONE {
            let next = self.next_sibling(child);
            self.node_mut(child).parent = dst;
            child = next;
        }
        let s = self.node_mut(src);
        s.ty = NodeType::NOTYPE;
        s.key = Side::default();
        s.val = Side::default();
        s.first_child = NONE;
        s.last_child = NONE;
    }

    /// Same-tree counterpart of [`Tree::replace_val_with_subtree`] — the
    /// form the resolver actually calls, since alias expansion always
    /// happens within one tree.
    pub fn replace_val_with_subtree_within(&mut self, src_node: NodeId, id: NodeId) {
        self.remove_children(id);
        let data = *self.node(src_node);
        let kept_key_bits = self.ty(id) & NodeType::KEY.or(NodeType::KEYTAG);
        let new_ty = (data.ty.without(NodeType::KEY.or(NodeType::KEYTAG))) | kept_key_bits;
        {
            let node = self.node_mut(id);
            node.ty = new_ty;
            node.val = data.val;
        }
        let mut child = data.first_child;
        let mut prev_new = NONE;
        while child != NONE {
            prev_new = self.duplicate_within(child, id, prev_new);
            child = self.next_sibling(child);
        }
    }

    /// Same-tree counterpart of [`Tree::duplicate_children`].
    pub fn duplicate_children_within(&mut self, src_parent: NodeId, dst_parent: NodeId, mut after: NodeId) {
        let mut child = self.first_child(src_parent);
        while child != NONE {
            after = self.duplicate_within(child, dst_parent, after);
            child = self.next_sibling(child);
        }
    }

    /// Same-tree counterpart of [`Tree::duplicate_children_no_rep`].
    /// Returns the final `after`, so a caller merging several sources in
    /// sequence can chain them —
    /// pass this call's return as the next call's `after` so each source
    /// takes precedence over the ones merged before it.
    pub fn duplicate_children_no_rep_within(&mut self, src_parent: NodeId, dst_parent: NodeId, mut after: NodeId) -> NodeId {
        debug_assert!(self.ty(dst_parent).is_map(), "no-rep duplication only applies to map destinations");
        let mut child = self.first_child(src_parent);
        while child != NONE {
            let next_src_child = self.next_sibling(child);
            let key_text = self.key(child).map(str::to_owned);
            if let Some(existing) = key_text.as_deref().and_then(|k| self.find_child_by_key(dst_parent, k)) {
                if existing != child && self.precedes(existing, after, dst_parent) {
                    let reanchor = if existing == after { self.prev_sibling(existing) } else { after };
                    self.remove(existing);
                    after = self.duplicate_within(child, dst_parent, reanchor);
                } else if existing != child {
                    self.move_after(existing, after);
                    after = existing;
                }
            } else {
                after = self.duplicate_within(child, dst_parent, after);
            }
            child = next_src_child;
        }
        after
    }

    pub fn duplicate_children(&mut self, src: &Tree, src_parent: NodeId, dst_parent: NodeId, mut after: NodeId) {
        let mut child = src.first_child(src_parent);
        while child != NONE {
            after = self.duplicate(src, child, dst_parent, after);
            child = src.next_sibling(child);
        }
    }

    /// Like [`Tree::duplicate_children`], but into a map destination that
    /// may already hold some of the source's keys: the *last*-specified
    /// sibling wins. If the pre-existing destination key
    /// precedes `after` it is removed and replaced by the source child at
    /// that position; if it follows, it is moved up to sit right after
    /// `after`. This is what lets merge keys override or
    /// be overridden correctly.
    pub fn duplicate_children_no_rep(&mut self, src: &Tree, src_parent: NodeId, dst_parent: NodeId, mut after: NodeId) {
        debug_assert!(self.ty(dst_parent).is_map(), "no-rep duplication only applies to map destinations");
        let mut child = src.first_child(src_parent);
        while child != NONE {
            let key_text = src.key(child).map(str::to_owned);
            if let Some(existing) = key_text.as_deref().and_then(|k| self.find_child_by_key(dst_parent, k)) {
                if self.precedes(existing, after, dst_parent) {
                    // The destination's copy is older than the insertion
                    // point: the incoming source child wins. If `existing`
                    // *is* the insertion point, re-anchor on its
                    // predecessor before removing it.
                    let reanchor = if existing == after { self.prev_sibling(existing) } else { after };
                    self.remove(existing);
                    after = self.duplicate(src, child, dst_parent, reanchor);
                } else {
                    // The destination's copy was specified later: it
                    // wins, just shifted up to sit at the insertion point.
                    self.move_after(existing, after);
                    after = existing;
                }
            } else {
                after = self.duplicate(src, child, dst_parent, after);
            }
            child = src.next_sibling(child);
        }
    }

    /// Whether `a` occurs at or before `b` in `parent`'s child order
    /// (`NONE` sorts before every real child, matching `after == NONE`
    /// meaning "insert at head").
    fn precedes(&self, a: NodeId, b: NodeId, parent: NodeId) -> bool {
        if b == NONE {
            return false;
        }
        if a == NONE {
            return true;
        }
        let mut cur = self.first_child(parent);
        while cur != NONE {
            if cur == a {
                return true;
            }
            if cur == b {
                return false;
            }
            cur = self.next_sibling(cur);
        }
        false
    }

    /// Depth-first walk that swaps node slots so traversal order equals
    /// slot order; improves cache locality for
    /// later readers without changing any semantics a reader can observe.
    pub fn reorder(&mut self) {
        let mut order = Vec::with_capacity(self.pool.len());
        self.collect_dfs(self.root, &mut order);
        // order[new_slot] = old_slot. Build the inverse permutation and
        // apply it via a fresh pool, remapping every index field.
        let mut remap = vec![NONE; self.pool.len()];
        for (new_slot, &old_slot) in order.iter().enumerate() {
            remap[old_slot as usize] = new_slot as NodeId;
        }
        let mut new_nodes = Vec::with_capacity(order.len());
        for &old_slot in &order {
            let mut node = *self.pool.get(old_slot);
            let fix = |id: NodeId| if id == NONE { NONE } else { remap[id as usize] };
            node.parent = fix(node.parent);
            node.first_child = fix(node.first_child);
            node.last_child = fix(node.last_child);
            node.prev_sibling = fix(node.prev_sibling);
            node.next_sibling = fix(node.next_sibling);
            new_nodes.push(node);
        }
        let mut pool = NodePool::new();
        pool.reserve(new_nodes.len());
        for (i, node) in new_nodes.into_iter().enumerate() {
            *pool.get_mut(i as NodeId) = node;
        }
        self.pool = pool;
        self.root = remap[self.root as usize];
    }

    fn collect_dfs(&self, id: NodeId, out: &mut Vec<NodeId>) {
        out.push(id);
        let mut child = self.first_child(id);
        while child != NONE {
            self.collect_dfs(child, out);
            child = self.next_sibling(child);
        }
    }

    /// Merges `src` into `self` at `dst`: scalars are overwritten;
    /// sequence children are appended; map children are merged by key,
    /// descending recursively on collisions.
    pub fn merge_into(&mut self, src: &Tree, src_node: NodeId, dst: NodeId) {
        let src_ty = src.ty(src_node);
        if src_ty.is_val() {
            self.remove_children(dst);
            let val = self.copy_span(src, src.node(src_node).val.scalar);
            self.node_mut(dst).ty |= NodeType::VAL;
            self.node_mut(dst).val.scalar = val;
            return;
        }
        if src_ty.is_seq() {
            if !self.ty(dst).is_seq() {
                self.remove_children(dst);
                self.to_seq(dst);
            }
            let mut after = self.last_child(dst);
            let mut child = src.first_child(src_node);
            while child != NONE {
                after = self.duplicate(src, child, dst, after);
                child = src.next_sibling(child);
            }
            return;
        }
        if src_ty.is_map() {
            if !self.ty(dst).is_map() {
                self.remove_children(dst);
                self.to_map(dst);
            }
            let mut child = src.first_child(src_node);
            while child != NONE {
                let key = src.key(child).map(str::to_owned);
                match key.as_deref().and_then(|k| self.find_child_by_key(dst, k)) {
                    Some(existing) => self.merge_into(src, child, existing),
                    None => {
                        let after = self.last_child(dst);
                        self.duplicate(src, child, dst, after);
                    }
                }
                child = src.next_sibling(child);
            }
        }
    }

    // -- resolver support -------------------------------------------------

    pub(crate) fn clear_key_ref_anchor_flags(&mut self, id: NodeId) {
        self.clear_key_ref_flags(id);
    }

    pub(crate) fn clear_val_ref_anchor_flags(&mut self, id: NodeId) {
        self.clear_val_ref_flags(id);
    }

    /// Replaces `id`'s val side with a deep copy of `src_node`'s *val
    /// contents* (type, val, children) â€” used by the resolver to expand a
    /// plain alias in place.
    pub fn replace_val_with_subtree(&mut self, src: &Tree, src_node: NodeId, id: NodeId) {
        self.remove_children(id);
        let ty = src.ty(src_node);
        let kept_key_bits = self.ty(id) & NodeType::KEY.or(NodeType::KEYTAG);
        let new_ty = (ty.without(NodeType::KEY.or(NodeType::KEYTAG))) | kept_key_bits;
        let val = if self as *const _ == src as *const _ {
            src.node(src_node).val
        } else {
            self.copy_side(src, &src.node(src_node).val)
        };
        {
            let node = self.node_mut(id);
            node.ty = new_ty;
            node.val = val;
        }
        let mut child = src.first_child(src_node);
        let mut prev_new = NONE;
        while child != NONE {
            prev_new = self.duplicate(src, child, id, prev_new);
            child = src.next_sibling(child);
        }
    }

    /// Builds anchor-name -> node-id index in document order, used by the
    /// resolver to back-chain "most recent preceding anchor" lookups.
    pub(crate) fn index_anchors(&self) -> HashMap<String, Vec<NodeId>> {
        let mut map: HashMap<String, Vec<NodeId>> = HashMap::new();
        self.index_anchors_rec(self.root, &mut map);
        map
    }

    fn index_anchors_rec(&self, id: NodeId, map: &mut HashMap<String, Vec<NodeId>>) {
        if let Some(name) = self.key_anchor(id) {
            map.entry(name.to_owned()).or_default().push(id);
        }
        if let Some(name) = self.val_anchor(id) {
            map.entry(name.to_owned()).or_default().push(id);
        }
        let mut child = self.first_child(id);
        while child != NONE {
            self.index_anchors_rec(child, map);
            child = self.next_sibling(child);
        }
    }

    pub(crate) fn error_invalid_transition(&self, msg: impl Into<String>) -> Error {
        Error::from(ErrorImpl::InvalidTransition(msg.into()))
    }

    pub fn check_invariants(&self) -> Result<()> {
        self.check_invariants_rec(self.root)
    }

    fn check_invariants_rec(&self, id: NodeId) -> Result<()> {
        let ty = self.ty(id);
        if ty.is_map() && ty.is_seq() {
            return Err(self.error_invalid_transition("node is both MAP and SEQ"));
        }
        if ty.has_any(NodeType::KEYANCH) && ty.has_any(NodeType::KEYREF) {
            return Err(self.error_invalid_transition("KEYANCH and KEYREF are mutually exclusive"));
        }
        if ty.has_any(NodeType::VALANCH) && ty.has_any(NodeType::VALREF) {
            return Err(self.error_invalid_transition("VALANCH and VALREF are mutually exclusive"));
        }
        let parent = self.parent(id);
        if parent != NONE {
            let parent_is_map = self.ty(parent).is_map();
            if ty.is_keyed() != parent_is_map {
                return Err(self.error_invalid_transition("KEY must be set iff parent is a MAP"));
            }
        }
        let mut child = self.first_child(id);
        while child != NONE {
            self.check_invariants_rec(child)?;
            child = self.next_sibling(child);
        }
        Ok(())
    }
}

impl Default for Tree {
    fn default() -> Self {
        Tree::new()
    }
}

/// Iterator over the direct children of a node, in document order.
pub struct ChildIter<'a> {
    tree: &'a Tree,
    next: NodeId,
}

impl<'a> Iterator for ChildIter<'a> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        if self.next == NONE {
            return None;
        }
        let cur = self.next;
        self.next = self.tree.next_sibling(cur);
        Some(cur)
    }
}
