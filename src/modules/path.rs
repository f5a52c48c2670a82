// Copyright notice and licensing information.
// SPDX-License-Identifier: Apache-2.0 OR MIT indicates dual licensing under Apache 2.0 or MIT licenses.
// Copyright © 2024 yamltree Contributors. All rights reserved.

use std::fmt::{self, Display};

/// A breadcrumb chain describing where, inside a tree, some operation
/// currently stands. Used by [`crate::path`] to render the "resolved up
/// to" prefix in a [`crate::modules::error::ErrorImpl::PathNotFound`].
///
/// Borrows its parent rather than owning a `Vec`, so building one up
/// while walking down a path costs no allocation.
#[derive(Copy, Clone, Debug)]
pub enum Path<'a> {
    /// The root path.
    Root,
    /// A sequence index step.
    Seq { parent: &'a Path<'a>, index: usize },
    /// A map key step.
    Map { parent: &'a Path<'a>, key: &'a str },
}

impl Display for Path<'_> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        struct Parent<'a>(&'a Path<'a>);

        impl Display for Parent<'_> {
            fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                match self.0 {
                    Path::Root => Ok(()),
                    path => write!(formatter, "{}.", path),
                }
            }
        }

        match self {
            Path::Root => formatter.write_str("."),
            Path::Seq { parent, index } => write!(formatter, "{}[{}]", Parent(parent), index),
            Path::Map { parent, key } => write!(formatter, "{}{}", Parent(parent), key),
        }
    }
}
