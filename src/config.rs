// Copyright notice and licensing information.
// SPDX-License-Identifier: Apache-2.0 OR MIT indicates dual licensing under Apache 2.0 or MIT licenses.
// Copyright © 2024 yamltree Contributors. All rights reserved.

//! The error hook.
//!
//! The host's error reporting is modelled as an explicit config record
//! passed at tree construction, rather than an ambient global. A
//! process-wide default exists for convenience but must be reached
//! through [`Callbacks::default`] or [`set_global_callbacks`] rather
//! than implicit construction.

use std::fmt;
use std::sync::{Arc, OnceLock, RwLock};

/// The error hook. This is contractually required never to return;
/// this crate models that by having the default
/// implementation panic, and by documenting that a replacement must do
/// the same (abort the thread of execution) for every invariant downstream
/// of an error call to hold.
pub type ErrorHook = Arc<dyn Fn(&str) + Send + Sync>;

/// A per-tree record of the error hook a host may override.
#[derive(Clone)]
pub struct Callbacks {
    on_error: ErrorHook,
}

impl Callbacks {
    pub fn new(on_error: ErrorHook) -> Self {
        Callbacks { on_error }
    }

    /// Invokes the error hook. Never returns normally in the default
    /// implementation.
    pub fn error(&self, msg: &str) -> ! {
        (self.on_error)(msg);
        unreachable!("error hook must not return")
    }
}

impl fmt::Debug for Callbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callbacks").finish_non_exhaustive()
    }
}

fn default_on_error(msg: &str) -> ! {
    log::error!("yamltree: fatal: {msg}");
    panic!("yamltree: fatal: {msg}");
}

fn default_callbacks() -> Callbacks {
    Callbacks::new(Arc::new(default_on_error))
}

impl Default for Callbacks {
    fn default() -> Self {
        global_callbacks()
    }
}

static GLOBAL_CALLBACKS: OnceLock<RwLock<Callbacks>> = OnceLock::new();

fn cell() -> &'static RwLock<Callbacks> {
    GLOBAL_CALLBACKS.get_or_init(|| RwLock::new(default_callbacks()))
}

/// Returns the current process-wide default callbacks, initializing them
/// on first use.
pub fn global_callbacks() -> Callbacks {
    cell().read().expect("callbacks lock poisoned").clone()
}

/// Replaces the process-wide default callbacks.
pub fn set_global_callbacks(callbacks: Callbacks) {
    *cell().write().expect("callbacks lock poisoned") = callbacks;
}

/// Resets the process-wide default callbacks to the built-in pair.
pub fn reset_global_callbacks() {
    set_global_callbacks(default_callbacks());
}
