// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Lifecycle hooks for [`HeadlessSurface`]s.
//!
//! Real adapters look their lifecycle entry points up once per process.
//! [`HeadlessHooks`] does the same: the hook table is resolved on first use
//! and cached in a process-wide [`OnceLock`]; every later instance shares it.

use std::sync::OnceLock;

use strata_core::error::{HookError, HookKind};
use strata_core::host::LifecycleHooks;

use crate::tree::HeadlessSurface;

/// Resolved lifecycle entry points.
#[derive(Clone, Copy, Debug)]
struct HookTable {
    detach: fn(&HeadlessSurface),
    attach: fn(&HeadlessSurface),
}

static HOOK_TABLE: OnceLock<HookTable> = OnceLock::new();

fn hook_table() -> &'static HookTable {
    HOOK_TABLE.get_or_init(|| {
        tracing::debug!("resolving headless lifecycle hooks");
        HookTable {
            detach: HeadlessSurface::dispatch_detached,
            attach: HeadlessSurface::dispatch_attached,
        }
    })
}

/// [`LifecycleHooks`] for [`HeadlessSurface`].
#[derive(Clone, Copy, Debug)]
pub struct HeadlessHooks {
    table: Option<&'static HookTable>,
}

impl HeadlessHooks {
    /// Hooks backed by the shared table.
    #[must_use]
    pub fn resolve() -> Self {
        Self {
            table: Some(hook_table()),
        }
    }

    /// Hooks for a platform that hides its lifecycle entry points. Every
    /// call reports [`HookError::Unavailable`].
    #[must_use]
    pub const fn unavailable() -> Self {
        Self { table: None }
    }

    /// Whether the entry points were found.
    #[must_use]
    pub const fn is_available(&self) -> bool {
        self.table.is_some()
    }
}

impl LifecycleHooks<HeadlessSurface> for HeadlessHooks {
    fn detach(&self, surface: &HeadlessSurface) -> Result<(), HookError> {
        let table = self.table.ok_or(HookError::Unavailable(HookKind::Detach))?;
        (table.detach)(surface);
        Ok(())
    }

    fn attach(&self, surface: &HeadlessSurface) -> Result<(), HookError> {
        let table = self.table.ok_or(HookError::Unavailable(HookKind::Attach))?;
        (table.attach)(surface);
        Ok(())
    }
}
