// Copyright notice and licensing information.
// SPDX-License-Identifier: Apache-2.0 OR MIT indicates dual licensing under Apache 2.0 or MIT licenses.
// Copyright © 2024 yamltree Contributors. All rights reserved.

//! Parses a small document, patches a value in by path, and re-emits
//! it as both YAML and JSON.

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let src = b"\
package:
  name: widget
  version: 1.0.0
  authors:
    - Ada
    - Grace
";
    let mut tree = yamltree::parse(src)?;

    let name_node = yamltree::path::get(&tree, "package.name")?;
    println!("package.name = {:?}", tree.val(name_node));

    let default_value = yamltree::tree::arena::ScalarSpan::arena(tree.copy_to_arena(b"MIT"));
    yamltree::path::lookup_or_modify(&mut tree, "package.license", default_value);

    let yaml = yamltree::emit::to_string(&tree, yamltree::emit::Format::Yaml)?;
    println!("--- yaml ---\n{yaml}");

    let json = yamltree::emit::to_string(&tree, yamltree::emit::Format::Json)?;
    println!("--- json ---\n{json}");

    Ok(())
}
