use std::sync::Arc;

use anyhow::Context;

use crate::foundation::error::{SaplingError, SaplingResult};
use crate::foundation::math::premultiply_rgba8_in_place;
use crate::render::cpu::premul_bytes_to_pixmap;

/// A decoded background image, ready to be painted with a cover fit.
#[derive(Clone)]
pub struct Backdrop {
    width: u32,
    height: u32,
    paint: vello_cpu::Image,
}

impl std::fmt::Debug for Backdrop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Backdrop")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

impl Backdrop {
    /// Decode any format the `image` crate recognizes.
    pub fn decode(bytes: &[u8]) -> SaplingResult<Self> {
        let dyn_img = image::load_from_memory(bytes).context("decode background image")?;
        let rgba = dyn_img.to_rgba8();
        let (width, height) = rgba.dimensions();

        let mut rgba8_premul = rgba.into_raw();
        premultiply_rgba8_in_place(&mut rgba8_premul);
        Self::from_premul_rgba8(width, height, &rgba8_premul)
    }

    /// Wrap already premultiplied RGBA8 pixels.
    pub fn from_premul_rgba8(width: u32, height: u32, rgba8_premul: &[u8]) -> SaplingResult<Self> {
        if width == 0 || height == 0 {
            return Err(SaplingError::asset("background image has no pixels"));
        }
        let pixmap = premul_bytes_to_pixmap(rgba8_premul, width, height)?;
        Ok(Self {
            width,
            height,
            paint: vello_cpu::Image {
                image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
                sampler: vello_cpu::peniko::ImageSampler::default(),
            },
        })
    }

    /// Natural width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Natural height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Natural size.
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub(crate) fn paint(&self) -> &vello_cpu::Image {
        &self.paint
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/backdrop.rs"]
mod tests;
