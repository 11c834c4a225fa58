use std::sync::Arc;

use crate::assets::backdrop::Backdrop;
use crate::assets::color::Rgb;
use crate::foundation::core::{Affine, Point, Rect, Vec2};
use crate::foundation::error::{SaplingError, SaplingResult};
use crate::render::backend::PaintSurface;
use crate::shading::model::StrokeStyle;

/// Texels in a rasterized stroke gradient ramp.
const GRADIENT_STEPS: u32 = 64;

/// [`PaintSurface`] backed by `vello_cpu`.
pub struct CpuSurface {
    width: u16,
    height: u16,
    ctx: vello_cpu::RenderContext,
    pixmap: vello_cpu::Pixmap,
}

impl std::fmt::Debug for CpuSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CpuSurface")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

fn dims_u16(width: u32, height: u32) -> SaplingResult<(u16, u16)> {
    if width == 0 || height == 0 {
        return Err(SaplingError::render("surface size must be non-zero"));
    }
    let w: u16 = width
        .try_into()
        .map_err(|_| SaplingError::render("surface width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| SaplingError::render("surface height exceeds u16"))?;
    Ok((w, h))
}

impl CpuSurface {
    /// Transparent surface of the given size.
    pub fn new(width: u32, height: u32) -> SaplingResult<Self> {
        let (w, h) = dims_u16(width, height)?;
        Ok(Self {
            width: w,
            height: h,
            ctx: vello_cpu::RenderContext::new(w, h),
            pixmap: vello_cpu::Pixmap::new(w, h),
        })
    }
}

impl PaintSurface for CpuSurface {
    fn size(&self) -> (u32, u32) {
        (u32::from(self.width), u32::from(self.height))
    }

    fn resize(&mut self, width: u32, height: u32) -> SaplingResult<()> {
        let (w, h) = dims_u16(width, height)?;
        if (w, h) != (self.width, self.height) {
            *self = Self {
                width: w,
                height: h,
                ctx: vello_cpu::RenderContext::new(w, h),
                pixmap: vello_cpu::Pixmap::new(w, h),
            };
        }
        Ok(())
    }

    fn begin_frame(&mut self) {
        self.ctx = vello_cpu::RenderContext::new(self.width, self.height);
        clear_pixmap(&mut self.pixmap, [0, 0, 0, 0]);
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgb, alpha: f64) {
        let [r, g, b] = color.to_u8();
        let a = (alpha.clamp(0.0, 1.0) * 255.0).round() as u8;
        if a == 0 {
            return;
        }
        self.ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx
            .set_paint(vello_cpu::peniko::Color::from_rgba8(r, g, b, a));
        self.ctx.fill_rect(&rect_to_cpu(rect));
    }

    fn draw_image(&mut self, image: &Backdrop, transform: Affine) {
        let (w, h) = image.size();
        self.ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.set_transform(affine_to_cpu(transform));
        self.ctx.set_paint(image.paint().clone());
        self.ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(w),
            f64::from(h),
        ));
    }

    fn stroke_line(&mut self, from: Point, to: Point, width: f64, style: &StrokeStyle) {
        let Some(frame) = line_frame(from, to, width) else {
            return;
        };
        self.ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        match *style {
            StrokeStyle::Solid(color) => {
                // Unit square stretched over the stroke footprint.
                self.ctx.set_transform(affine_to_cpu(frame));
                self.ctx.set_paint(color.to_paint());
                self.ctx
                    .fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, 1.0, 1.0));
            }
            StrokeStyle::Gradient {
                from: ramp_from,
                to: ramp_to,
                start,
                end,
            } => {
                // The stroke may cover only part of the gradient axis.
                let t0 = axis_param(from, ramp_from, ramp_to);
                let t1 = axis_param(to, ramp_from, ramp_to);
                let Ok(ramp) = gradient_ramp(start, end, t0, t1) else {
                    self.ctx.set_transform(affine_to_cpu(frame));
                    self.ctx.set_paint(start.to_paint());
                    self.ctx
                        .fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, 1.0, 1.0));
                    return;
                };
                let steps = f64::from(GRADIENT_STEPS);
                let ramp_frame = frame * Affine::scale_non_uniform(1.0 / steps, 1.0);
                self.ctx.set_transform(affine_to_cpu(ramp_frame));
                self.ctx.set_paint(ramp);
                self.ctx
                    .fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, steps, 1.0));
            }
        }
    }

    fn end_frame(&mut self) {
        self.ctx.flush();
        self.ctx.render_to_pixmap(&mut self.pixmap);
    }

    fn pixels(&self) -> &[u8] {
        self.pixmap.data_as_u8_slice()
    }
}

/// Affine mapping the unit square onto the stroke footprint of `from -> to`: x runs along
/// the line, y across its width. `None` for zero-length or zero-width lines.
pub(crate) fn line_frame(from: Point, to: Point, width: f64) -> Option<Affine> {
    let along = to - from;
    let len = along.hypot();
    if !(len > 0.0 && len.is_finite() && width > 0.0 && width.is_finite()) {
        return None;
    }
    Some(
        Affine::translate(from.to_vec2())
            * Affine::rotate(along.atan2())
            * Affine::translate(Vec2::new(0.0, -width / 2.0))
            * Affine::scale_non_uniform(len, width),
    )
}

/// Position of `p` projected onto the `from -> to` gradient axis, 0 at `from` and 1 at `to`.
pub(crate) fn axis_param(p: Point, from: Point, to: Point) -> f64 {
    let axis = to - from;
    let len2 = axis.hypot2();
    if !(len2 > 0.0 && len2.is_finite()) {
        return 0.0;
    }
    (p - from).dot(axis) / len2
}

/// `GRADIENT_STEPS x 1` opaque ramp covering axis positions `t0..t1` of the `start -> end`
/// gradient. Positions outside `[0, 1]` pad with the end colors.
fn gradient_ramp(start: Rgb, end: Rgb, t0: f64, t1: f64) -> SaplingResult<vello_cpu::Image> {
    let steps = GRADIENT_STEPS;
    let last = f64::from(steps - 1);
    let mut bytes = Vec::with_capacity(steps as usize * 4);
    for i in 0..steps {
        let t = t0 + (t1 - t0) * f64::from(i) / last;
        let [r, g, b] = start.mix(end, t).to_u8();
        bytes.extend_from_slice(&[r, g, b, 255]);
    }
    let pixmap = premul_bytes_to_pixmap(&bytes, steps, 1)?;
    Ok(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    })
}

fn clear_pixmap(pixmap: &mut vello_cpu::Pixmap, rgba: [u8; 4]) {
    let data = pixmap.data_as_u8_slice_mut();
    for px in data.chunks_exact_mut(4) {
        px.copy_from_slice(&rgba);
    }
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn rect_to_cpu(r: Rect) -> vello_cpu::kurbo::Rect {
    vello_cpu::kurbo::Rect::new(r.x0, r.y0, r.x1, r.y1)
}

/// Wrap premultiplied RGBA8 bytes in a `vello_cpu` pixmap.
pub(crate) fn premul_bytes_to_pixmap(
    rgba8_premul: &[u8],
    width: u32,
    height: u32,
) -> SaplingResult<vello_cpu::Pixmap> {
    let (w, h) = dims_u16(width, height)?;
    if rgba8_premul.len() != width as usize * height as usize * 4 {
        return Err(SaplingError::render("image byte length mismatch"));
    }

    let mut may_have_opacities = false;
    let mut pixels = Vec::with_capacity(width as usize * height as usize);
    for px in rgba8_premul.chunks_exact(4) {
        let a = px[3];
        may_have_opacities |= a != 255;
        pixels.push(vello_cpu::peniko::color::PremulRgba8 {
            r: px[0],
            g: px[1],
            b: px[2],
            a,
        });
    }

    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
