// Copyright notice and licensing information.
// SPDX-License-Identifier: Apache-2.0 OR MIT indicates dual licensing under Apache 2.0 or MIT licenses.
// Copyright © 2024 yamltree Contributors. All rights reserved.

/// Error, `Mark`, and `Location` types shared across the crate.
pub mod error;

/// The `Path` breadcrumb type used to render a position inside the tree
/// for error messages, and the dotted/bracketed path-lookup surface built
/// on top of it.
pub mod path;
