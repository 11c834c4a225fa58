use crate::foundation::error::{SaplingError, SaplingResult};

pub use kurbo::{Affine, Point, Rect, Vec2};

/// Size of the drawing stage (the container the canvas fills), in canvas pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Stage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Stage {
    /// Build a stage, rejecting sizes the raster backend cannot allocate.
    pub fn new(width: u32, height: u32) -> SaplingResult<Self> {
        if width == 0 || height == 0 {
            return Err(SaplingError::validation("stage width and height must be > 0"));
        }
        if width > u32::from(u16::MAX) || height > u32::from(u16::MAX) {
            return Err(SaplingError::validation("stage dimensions exceed u16"));
        }
        Ok(Self { width, height })
    }

    /// Width as `f64`.
    pub fn w(self) -> f64 {
        f64::from(self.width)
    }

    /// Height as `f64`.
    pub fn h(self) -> f64 {
        f64::from(self.height)
    }

    /// Full-stage rectangle in canvas pixels.
    pub fn rect(self) -> Rect {
        Rect::new(0.0, 0.0, self.w(), self.h())
    }
}

/// Identity of a planted tree, stable from planting through the finished forest list.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct TreeId(pub u64);

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
