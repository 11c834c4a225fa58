use crate::assets::backdrop::Backdrop;
use crate::assets::color::Rgb;
use crate::foundation::core::{Point, TreeId};
use crate::foundation::error::SaplingResult;
use crate::foundation::math::unpremultiply_rgba8_in_place;
use crate::growth::tree::FinishedTree;
use crate::render::backend::PaintSurface;
use crate::render::cpu::CpuSurface;
use crate::render::tree::paint_background;
use crate::space::cover::CoordinateSpace;

/// Everything the static layer draws from.
pub(crate) struct StaticScene<'a> {
    pub(crate) space: &'a CoordinateSpace,
    pub(crate) backdrop: Option<&'a Backdrop>,
    pub(crate) flat: Rgb,
    pub(crate) overlay_alpha: f64,
    /// Forest trees; empty outside forest mode.
    pub(crate) forest: &'a [FinishedTree],
    pub(crate) depth_sorted: bool,
}

/// Cached raster of the background plus the finished forest, repainted only when dirty.
#[derive(Debug)]
pub struct StaticLayer {
    surface: CpuSurface,
    dirty: bool,
    show_forest: bool,
    last_draw_order: Vec<TreeId>,
    repaints: u64,
}

impl StaticLayer {
    /// Dirty layer of the given size.
    pub fn new(width: u32, height: u32) -> SaplingResult<Self> {
        Ok(Self {
            surface: CpuSurface::new(width, height)?,
            dirty: true,
            show_forest: true,
            last_draw_order: Vec::new(),
            repaints: 0,
        })
    }

    /// Force the next [`Self::repaint`] to redraw.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Whether the cached raster is stale.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Whether forest trees are drawn (off while growing trees are composited with them).
    pub fn shows_forest(&self) -> bool {
        self.show_forest
    }

    /// Toggle forest drawing; a change marks the layer dirty.
    pub fn set_show_forest(&mut self, show: bool) {
        if self.show_forest != show {
            self.show_forest = show;
            self.dirty = true;
        }
    }

    /// Resize the backing surface and mark dirty.
    pub fn resize(&mut self, width: u32, height: u32) -> SaplingResult<()> {
        self.surface.resize(width, height)?;
        self.dirty = true;
        Ok(())
    }

    /// Redraw if dirty. Returns whether anything was painted.
    #[tracing::instrument(level = "debug", skip_all, fields(dirty = self.dirty))]
    pub(crate) fn repaint(&mut self, scene: &StaticScene<'_>) -> bool {
        if !self.dirty {
            return false;
        }
        self.surface.begin_frame();
        paint_background(
            &mut self.surface,
            scene.space,
            scene.backdrop,
            scene.flat,
            scene.overlay_alpha,
        );

        self.last_draw_order.clear();
        if self.show_forest && !scene.forest.is_empty() {
            let mut order: Vec<&FinishedTree> = scene.forest.iter().collect();
            if scene.depth_sorted {
                order.sort_by(|a, b| {
                    a.depth_key(scene.space)
                        .total_cmp(&b.depth_key(scene.space))
                });
            }
            for tree in order {
                tree.draw(&mut self.surface, scene.space);
                self.last_draw_order.push(tree.id());
            }
        }
        self.surface.end_frame();
        self.dirty = false;
        self.repaints += 1;
        true
    }

    /// Forest trees in the order the last repaint drew them.
    pub fn last_draw_order(&self) -> &[TreeId] {
        &self.last_draw_order
    }

    /// Number of repaints so far.
    pub fn repaint_count(&self) -> u64 {
        self.repaints
    }

    /// Premultiplied RGBA8 pixels.
    pub fn pixels(&self) -> &[u8] {
        self.surface.pixels()
    }

    /// Size in pixels.
    pub fn size(&self) -> (u32, u32) {
        self.surface.size()
    }

    /// Straight-alpha color of the pixel nearest `p` (clamped to the layer).
    pub fn sample(&self, p: Point) -> Option<Rgb> {
        let (w, h) = self.surface.size();
        if !(p.x.is_finite() && p.y.is_finite()) {
            return None;
        }
        let x = p.x.round().clamp(0.0, f64::from(w - 1)) as usize;
        let y = p.y.round().clamp(0.0, f64::from(h - 1)) as usize;
        let i = (y * w as usize + x) * 4;
        let mut px = [0u8; 4];
        px.copy_from_slice(self.surface.pixels().get(i..i + 4)?);
        unpremultiply_rgba8_in_place(&mut px);
        Some(Rgb::from_u8(px[0], px[1], px[2]))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/engine/static_layer.rs"]
mod tests;
