// Copyright notice and licensing information.
// These lines indicate the copyright of the software and its licensing terms.
// SPDX-License-Identifier: Apache-2.0 OR MIT indicates dual licensing under Apache 2.0 or MIT licenses.
// Copyright © 2024 yamltree Contributors. All rights reserved.

#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 10240 {
        return;
    }
    if let Ok(tree) = yamltree::parse(data) {
        _ = yamltree::emit::to_vec(&tree, yamltree::emit::Format::Yaml);
    }
});
