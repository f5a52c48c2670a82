// Copyright notice and licensing information.
// SPDX-License-Identifier: Apache-2.0 OR MIT indicates dual licensing under Apache 2.0 or MIT licenses.
// Copyright © 2024 yamltree Contributors. All rights reserved.

use std::ops::{BitAnd, BitOr, BitOrAssign, Not};

/// The integral type backing a node's type bitset.
pub type TypeBits = u32;

/// Node type flags, independently combinable bits describing what a node is.
///
/// Mirrors the `c4::yml::NodeType_e` bitset: a node can simultaneously be a
/// mapping child (`KEY`), carry a value (`VAL`), and so on. Combinations with
/// conventional names (`KEYVAL`, `DOCMAP`, ...) are provided as constants.
#[derive(Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct NodeType(pub TypeBits);

macro_rules! bit { ($n:expr) => { 1 << $n }; }

impl NodeType {
    pub const NOTYPE: NodeType = NodeType(0);
    pub const VAL: NodeType = NodeType(bit!(0));
    pub const KEY: NodeType = NodeType(bit!(1));
    pub const MAP: NodeType = NodeType(bit!(2));
    pub const SEQ: NodeType = NodeType(bit!(3));
    pub const DOC: NodeType = NodeType(bit!(4));
    pub const KEYREF: NodeType = NodeType(bit!(5));
    pub const VALREF: NodeType = NodeType(bit!(6));
    pub const KEYANCH: NodeType = NodeType(bit!(7));
    pub const VALANCH: NodeType = NodeType(bit!(8));
    pub const KEYTAG: NodeType = NodeType(bit!(9));
    pub const VALTAG: NodeType = NodeType(bit!(10));

    /// `STREAM` implies `SEQ`: a stream is a sequence of documents.
    pub const STREAM: NodeType = NodeType(bit!(11) | Self::SEQ.0);

    pub const KEYVAL: NodeType = NodeType(Self::KEY.0 | Self::VAL.0);
    pub const KEYMAP: NodeType = NodeType(Self::KEY.0 | Self::MAP.0);
    pub const KEYSEQ: NodeType = NodeType(Self::KEY.0 | Self::SEQ.0);
    pub const DOCMAP: NodeType = NodeType(Self::DOC.0 | Self::MAP.0);
    pub const DOCSEQ: NodeType = NodeType(Self::DOC.0 | Self::SEQ.0);
    pub const DOCVAL: NodeType = NodeType(Self::DOC.0 | Self::VAL.0);

    pub fn has_all(self, bits: NodeType) -> bool {
        (self.0 & bits.0) == bits.0
    }

    pub fn has_any(self, bits: NodeType) -> bool {
        (self.0 & bits.0) != 0
    }

    pub fn is_val(self) -> bool {
        self.has_all(Self::VAL) && !self.has_any(Self::MAP.or(Self::SEQ))
    }

    pub fn is_container(self) -> bool {
        self.has_any(Self::MAP.or(Self::SEQ))
    }

    pub fn is_map(self) -> bool {
        self.has_all(Self::MAP)
    }

    pub fn is_seq(self) -> bool {
        self.has_all(Self::SEQ)
    }

    pub fn is_doc(self) -> bool {
        self.has_all(Self::DOC)
    }

    pub fn is_stream(self) -> bool {
        self.has_all(Self::STREAM)
    }

    pub fn is_keyed(self) -> bool {
        self.has_all(Self::KEY)
    }

    /// Combine two bitsets; named to read naturally at call sites
    /// (`NodeType::MAP.or(NodeType::KEY)`).
    pub const fn or(self, other: NodeType) -> NodeType {
        NodeType(self.0 | other.0)
    }

    pub const fn without(self, other: NodeType) -> NodeType {
        NodeType(self.0 & !other.0)
    }
}

impl BitOr for NodeType {
    type Output = NodeType;
    fn bitor(self, rhs: NodeType) -> NodeType {
        NodeType(self.0 | rhs.0)
    }
}

impl BitOrAssign for NodeType {
    fn bitor_assign(&mut self, rhs: NodeType) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for NodeType {
    type Output = NodeType;
    fn bitand(self, rhs: NodeType) -> NodeType {
        NodeType(self.0 & rhs.0)
    }
}

impl Not for NodeType {
    type Output = NodeType;
    fn not(self) -> NodeType {
        NodeType(!self.0)
    }
}

impl std::fmt::Debug for NodeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: &[(NodeType, &str)] = &[
            (NodeType::VAL, "VAL"),
            (NodeType::KEY, "KEY"),
            (NodeType::MAP, "MAP"),
            (NodeType::SEQ, "SEQ"),
            (NodeType::DOC, "DOC"),
            (NodeType::STREAM, "STREAM"),
            (NodeType::KEYREF, "KEYREF"),
            (NodeType::VALREF, "VALREF"),
            (NodeType::KEYANCH, "KEYANCH"),
            (NodeType::VALANCH, "VALANCH"),
            (NodeType::KEYTAG, "KEYTAG"),
            (NodeType::VALTAG, "VALTAG"),
        ];
        let mut first = true;
        for (bits, name) in names {
            if self.has_all(*bits) {
                if !first {
                    f.write_str("|")?;
                }
                f.write_str(name)?;
                first = false;
            }
        }
        if first {
            f.write_str("NOTYPE")?;
        }
        Ok(())
    }
}

/// Canonical YAML core-schema tags recognised at parse time.
///
/// A bare `!` tag and unrecognised `!!xxx` shorthand both resolve to
/// `TagType::None`; this crate performs tag *recognition*, not schema
/// validation.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum TagType {
    #[default]
    None,
    Map,
    Omap,
    Pairs,
    Set,
    Seq,
    Binary,
    Bool,
    Float,
    Int,
    Merge,
    Null,
    Str,
    Timestamp,
    Value,
    Yaml,
}

/// Maps a tag token's textual form to a canonical [`TagType`].
///
/// Accepts both `!!name` shorthand and the fully resolved
/// `tag:yaml.org,2002:name` form. A custom `!handle!name` shorthand
/// (declared by a `%TAG` directive) is not expanded here — use
/// [`to_tag_with_handles`] when the document may carry one.
pub fn to_tag(tag: &str) -> TagType {
    to_tag_with_handles(tag, &std::collections::HashMap::new())
}

/// Like [`to_tag`], but first expands a custom `!handle!name` shorthand
/// into its full URI using `handles` (the handle→prefix table a
/// document's `%TAG` directives populate, e.g. [`crate::Tree::tag_handles`])
/// before classifying it.
pub fn to_tag_with_handles(tag: &str, handles: &std::collections::HashMap<String, String>) -> TagType {
    let expanded;
    let name = if let Some(rest) = tag.strip_prefix("tag:yaml.org,2002:") {
        rest
    } else if let Some(rest) = tag.strip_prefix("!!") {
        rest
    } else if let Some(bang) = tag.strip_prefix('!').and_then(|after| after.find('!')) {
        let handle = &tag[..bang + 2];
        let rest = &tag[bang + 2..];
        match handles.get(handle) {
            Some(prefix) if prefix == "tag:yaml.org,2002:" => rest,
            Some(prefix) => {
                expanded = format!("{prefix}{rest}");
                return to_tag_with_handles(&expanded, &std::collections::HashMap::new());
            }
            None => tag,
        }
    } else {
        tag
    };
    match name {
        "map" => TagType::Map,
        "omap" => TagType::Omap,
        "pairs" => TagType::Pairs,
        "set" => TagType::Set,
        "seq" => TagType::Seq,
        "binary" => TagType::Binary,
        "bool" => TagType::Bool,
        "float" => TagType::Float,
        "int" => TagType::Int,
        "merge" => TagType::Merge,
        "null" => TagType::Null,
        "str" => TagType::Str,
        "timestamp" => TagType::Timestamp,
        "value" => TagType::Value,
        "yaml" => TagType::Yaml,
        _ => TagType::None,
    }
}
