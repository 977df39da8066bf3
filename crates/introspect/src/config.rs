// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Introspection configuration - single source of truth for rendering constants.
//!
//! # Architecture
//!
//! - **Level 1 (Static)**: Compile-time constants (sentinels, markers)
//! - **Level 2 (Dynamic)**: `RuntimeConfig` holding [`RenderOptions`]
//!
//! # Performance
//!
//! - **Atomic swap**: `ArcSwap` for render options (no lock on the render path)
//!
//! # Example
//!
//! ```
//! use introspect::config::{RenderOptions, RuntimeConfig};
//!
//! let config = RuntimeConfig::new();
//! config.set_render_options(RenderOptions {
//!     show_addresses: false,
//!     ..RenderOptions::default()
//! });
//! assert!(!config.render_options().show_addresses);
//! ```

use arc_swap::ArcSwap;
use std::sync::{Arc, OnceLock};

// =======================================================================
// Rendering sentinels
// =======================================================================

/// Rendering of an invalid handle (default and debug modes).
///
/// Distinct from every rendering of a valid value.
pub const INVALID_SENTINEL: &str = "<invalid Value>";

/// Rendering of a nil pointer, nil function or empty interface.
pub const NIL_SENTINEL: &str = "<nil>";

/// Prefix marking a pointer to an aggregate (`&{1 bee 3.14}`).
pub const POINTER_MARKER: &str = "&";

/// Printed in place of values nested deeper than `RenderOptions::max_depth`.
pub const ELLIPSIS: &str = "...";

/// Name of the anonymous interface type.
pub const ANY_TYPE_NAME: &str = "any";

/// Default nesting limit for value rendering.
pub const DEFAULT_MAX_RENDER_DEPTH: usize = 32;

// =======================================================================
// Type registry
// =======================================================================

/// Shard count of the registry maps. Must be a power of two.
pub const REGISTRY_SHARDS: usize = 16;

// =======================================================================
// Runtime configuration
// =======================================================================

/// Options consulted by the value renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Print real storage and code addresses. When false, addresses print
    /// as `0x0` so output is stable across runs.
    pub show_addresses: bool,
    /// Nesting limit; deeper values print as [`ELLIPSIS`].
    pub max_depth: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            show_addresses: true,
            max_depth: DEFAULT_MAX_RENDER_DEPTH,
        }
    }
}

/// Runtime configuration store.
///
/// `ArcSwap` allows atomically replacing the options while renderers on
/// other threads keep reading the previous snapshot.
#[derive(Debug)]
pub struct RuntimeConfig {
    render: ArcSwap<RenderOptions>,
}

impl RuntimeConfig {
    #[must_use]
    pub fn new() -> Self {
        Self {
            render: ArcSwap::from_pointee(RenderOptions::default()),
        }
    }

    /// Current render options snapshot.
    pub fn render_options(&self) -> RenderOptions {
        **self.render.load()
    }

    /// Replace render options.
    pub fn set_render_options(&self, options: RenderOptions) {
        log::debug!("[config] render options updated: {:?}", options);
        self.render.store(Arc::new(options));
    }

    /// Restore defaults.
    pub fn reset(&self) {
        self.set_render_options(RenderOptions::default());
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Process-wide configuration used by `Display` impls.
pub fn global() -> &'static RuntimeConfig {
    static CONFIG: OnceLock<RuntimeConfig> = OnceLock::new();
    CONFIG.get_or_init(RuntimeConfig::new)
}
