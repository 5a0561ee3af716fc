// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types.
//!
//! Only two conditions are reported as values:
//!
//! - [`HookError`]: a best-effort lifecycle hook could not run. The
//!   reattachment driver swallows it per surface; it never escapes a
//!   reconciliation pass.
//! - [`ConfigError`]: the render bridge was constructed without the
//!   configuration it needs.
//!
//! Precondition violations by callers are panics, as in the rest of the
//! crate.

use thiserror::Error;

/// Which synthetic lifecycle hook was being invoked.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HookKind {
    /// The "detached from window" hook.
    Detach,
    /// The "attached to window" hook.
    Attach,
}

/// Failure of a best-effort lifecycle hook.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
pub enum HookError {
    /// The platform adapter does not provide this hook.
    #[error("{0:?} hook is unavailable on this platform")]
    Unavailable(HookKind),
    /// The hook exists but the host rejected the invocation.
    #[error("{0:?} hook was rejected by the host")]
    Rejected(HookKind),
}

impl HookError {
    /// Returns the hook that failed.
    #[must_use]
    pub const fn kind(self) -> HookKind {
        match self {
            Self::Unavailable(kind) | Self::Rejected(kind) => kind,
        }
    }
}

/// Invalid render bridge configuration.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// No content layout was selected for the container.
    #[error("no content layout configured for render bridge `{name}`")]
    MissingContentLayout {
        /// Name of the bridge being constructed.
        name: alloc::string::String,
    },
}
