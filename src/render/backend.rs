use crate::assets::backdrop::Backdrop;
use crate::assets::color::Rgb;
use crate::foundation::core::{Affine, Point, Rect};
use crate::foundation::error::SaplingResult;
use crate::shading::model::StrokeStyle;

/// A read-back frame.
#[derive(Clone, Debug)]
pub struct FrameRGBA {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Row-major RGBA8.
    pub data: Vec<u8>,
    /// Whether `data` is premultiplied.
    pub premultiplied: bool,
}

/// Immediate-mode drawing target used by the tree and background painters.
///
/// Draw calls between [`PaintSurface::begin_frame`] and [`PaintSurface::end_frame`] replace
/// the previous contents; [`PaintSurface::pixels`] reflects the last finished frame.
pub trait PaintSurface {
    /// Current size in pixels.
    fn size(&self) -> (u32, u32);

    /// Resize, discarding contents.
    fn resize(&mut self, width: u32, height: u32) -> SaplingResult<()>;

    /// Start a new frame on a transparent surface.
    fn begin_frame(&mut self);

    /// Fill `rect` with `color` at `alpha`.
    fn fill_rect(&mut self, rect: Rect, color: Rgb, alpha: f64);

    /// Draw `image` at its natural size under `transform`.
    fn draw_image(&mut self, image: &Backdrop, transform: Affine);

    /// Stroke a straight line with butt caps.
    fn stroke_line(&mut self, from: Point, to: Point, width: f64, style: &StrokeStyle);

    /// Rasterize everything drawn since [`PaintSurface::begin_frame`].
    fn end_frame(&mut self);

    /// Premultiplied RGBA8 of the last finished frame.
    fn pixels(&self) -> &[u8];

    /// Copy of the last finished frame.
    fn read_frame(&self) -> FrameRGBA {
        let (width, height) = self.size();
        FrameRGBA {
            width,
            height,
            data: self.pixels().to_vec(),
            premultiplied: true,
        }
    }
}
