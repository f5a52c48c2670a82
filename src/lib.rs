// Copyright notice and licensing information.
// SPDX-License-Identifier: Apache-2.0 OR MIT indicates dual licensing under Apache 2.0 or MIT licenses.
// Copyright © 2024 yamltree Contributors. All rights reserved.

//! # yamltree
//!
//! An index-addressed arena tree for YAML, with a parser, a reference
//! resolver for anchors/aliases/merge keys, an emitter that renders YAML
//! or JSON, and a dotted/bracketed path-lookup surface on top — all
//! operating directly on the tree rather than through a typed data
//! model.
//!
//! ## Overview
//!
//! [`parse`] turns a byte buffer into a [`Tree`]; [`resolve::resolve`]
//! expands `&anchor`/`*alias`/`<<: *merge` nodes left behind by the
//! parser; [`emit::to_string`]/[`emit::to_writer`]/[`emit::to_vec`] render
//! a tree back out; [`path::lookup`]/[`path::lookup_or_modify`] walk a
//! tree by a `name(.name | [index])*` path.
//!
//! ## Example
//!
//! ```
//! let tree = yamltree::parse(b"name: Alice\nage: 30\n").unwrap();
//! let node = yamltree::path::get(&tree, "name").unwrap();
//! assert_eq!(tree.val(node), Some("Alice"));
//!
//! let yaml = yamltree::emit::to_string(&tree, yamltree::emit::Format::Yaml).unwrap();
//! assert_eq!(yaml, "name: Alice\nage: 30\n");
//! ```
//!
//! ## Rust Version Compatibility
//!
//! This library is compatible with Rust 1.65.0 and above.
#![deny(missing_docs)]
#![doc(html_root_url = "https://docs.rs/yamltree")]

/// Allocation and error hooks passed to a tree at construction time.
pub mod config;

/// The emitter: renders a tree as YAML or JSON through a pluggable
/// [`emit::Writer`] sink.
pub mod emit;

/// Error, `Mark`, `Location`, and path-breadcrumb types shared across
/// the crate.
pub mod modules;

/// The byte-buffer parser that builds a tree.
pub mod parser;

/// Dotted/bracketed path lookup over a tree.
pub mod path;

/// The reference resolver: expands anchors, aliases, and merge keys
/// left behind by the parser.
pub mod resolve;

/// Scalar filtering: plain/quoted/block scalar content rules.
pub mod scalar;

/// The arena tree data model.
pub mod tree;

pub use crate::modules::error::{Error, Location, Result};
pub use crate::tree::Tree;

/// Parses `src` into a tree, then resolves its anchors, aliases, and
/// merge keys. This is the common case; call [`parser::parse`] directly
/// to inspect a tree before resolution (for example, to walk raw
/// `*alias` nodes).
pub fn parse(src: &[u8]) -> Result<Tree> {
    let mut tree = parser::parse(src)?;
    resolve::resolve(&mut tree)?;
    Ok(tree)
}
