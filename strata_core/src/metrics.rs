// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Destination-surface geometry.
//!
//! [`LayerMetrics`] is the only input that decides whether a render target
//! has to be rebuilt: two metrics that compare equal describe the same
//! virtual display, so the bridge keeps the current target.

use core::fmt;

use kurbo::Size;

/// Density that maps one physical pixel to one logical unit.
pub const BASELINE_DENSITY_DPI: u32 = 160;

/// Pixel geometry and scale of a destination surface.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayerMetrics {
    /// Width in physical pixels.
    pub width: u32,
    /// Height in physical pixels.
    pub height: u32,
    /// Density in dots per inch.
    pub density_dpi: u32,
}

impl LayerMetrics {
    /// Creates metrics from a pixel size and density.
    #[must_use]
    pub const fn new(width: u32, height: u32, density_dpi: u32) -> Self {
        Self {
            width,
            height,
            density_dpi,
        }
    }

    /// Returns the same geometry at a different density.
    #[must_use]
    pub const fn with_density(self, density_dpi: u32) -> Self {
        Self {
            density_dpi,
            ..self
        }
    }

    /// Returns `true` if the surface has no pixels.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Physical size in pixels.
    #[must_use]
    pub fn size(self) -> Size {
        Size::new(f64::from(self.width), f64::from(self.height))
    }

    /// Density-independent size, relative to [`BASELINE_DENSITY_DPI`].
    ///
    /// A zero density is treated as the baseline.
    #[must_use]
    pub fn logical_size(self) -> Size {
        let density = if self.density_dpi == 0 {
            BASELINE_DENSITY_DPI
        } else {
            self.density_dpi
        };
        self.size() * (f64::from(BASELINE_DENSITY_DPI) / f64::from(density))
    }
}

impl fmt::Debug for LayerMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}@{}dpi", self.width, self.height, self.density_dpi)
    }
}
