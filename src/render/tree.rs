use crate::assets::backdrop::Backdrop;
use crate::assets::color::Rgb;
use crate::config::settings::{ColorMode, TreeSettings};
use crate::foundation::core::{Affine, Point, Vec2};
use crate::render::backend::PaintSurface;
use crate::shading::model::stroke_style_for;
use crate::space::cover::CoordinateSpace;
use crate::structure::branch::{Branch, Segment};

/// Where a tree lands on screen: geometry generated around `origin` is drawn around `anchor`,
/// scaled by `scale`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    /// Current screen position of the tree root.
    pub anchor: Point,
    /// Root position the geometry was generated at.
    pub origin: Point,
    /// Effective render scale.
    pub scale: f64,
}

impl Placement {
    /// Identity placement for a tree drawn where it was planted.
    pub fn at_origin(origin: Point) -> Self {
        Self {
            anchor: origin,
            origin,
            scale: 1.0,
        }
    }

    /// Map a geometry point to screen space.
    pub fn map(&self, p: Point) -> Point {
        self.anchor + (p - self.origin) * self.scale
    }

    /// The same mapping as an affine.
    pub fn affine(&self) -> Affine {
        Affine::translate(self.anchor.to_vec2())
            * Affine::scale(self.scale)
            * Affine::translate(-self.origin.to_vec2())
    }
}

/// The color and light parameters a tree was planted with.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TreeLook {
    /// Color mode.
    pub color_mode: ColorMode,
    /// Solid color.
    pub color: Rgb,
    /// Gradient root color (the sampled base color in base-gradient mode).
    pub gradient_start: Rgb,
    /// Gradient tip color.
    pub gradient_end: Rgb,
    /// Degrees.
    pub light_direction: f64,
    /// `[0, 1]`.
    pub light_intensity: f64,
    /// Planting origin (shading and gradient reference).
    pub origin: Point,
    /// Smallest Y of the generated structure.
    pub tree_top: f64,
}

impl TreeLook {
    /// Snapshot the look of a tree planted at `origin`.
    ///
    /// `base_color` replaces the gradient start in base-gradient mode when present.
    pub fn new(
        settings: &TreeSettings,
        origin: Point,
        tree_top: f64,
        base_color: Option<Rgb>,
    ) -> Self {
        let gradient_start = match (settings.color_mode, base_color) {
            (ColorMode::BaseGradient, Some(base)) => base,
            _ => settings.gradient_start,
        };
        Self {
            color_mode: settings.color_mode,
            color: settings.color,
            gradient_start,
            gradient_end: settings.gradient_end,
            light_direction: settings.light_direction,
            light_intensity: settings.light_intensity,
            origin,
            tree_top,
        }
    }
}

/// Stroke `branch` up to `progress` of its length. The gradient is laid out over the whole
/// segment and the partial stroke takes its slice of it, so a growing branch keeps its
/// colors as it extends.
pub(crate) fn draw_branch(
    surface: &mut dyn PaintSurface,
    branch: &Branch,
    progress: f64,
    look: &TreeLook,
    placement: &Placement,
) {
    if progress <= 0.0 {
        return;
    }
    let style = stroke_style_for(branch, look, placement);
    surface.stroke_line(
        placement.map(branch.start),
        placement.map(branch.point_at(progress)),
        branch.line_width * placement.scale,
        &style,
    );
}

/// Draw finished geometry, every level in full.
pub(crate) fn draw_finished(
    surface: &mut dyn PaintSurface,
    levels: &[Vec<Branch>],
    look: &TreeLook,
    placement: &Placement,
) {
    for level in levels {
        for branch in level {
            draw_branch(surface, branch, 1.0, look, placement);
        }
    }
}

/// Draw growing geometry: levels below `current_depth` in full, the animating level at each
/// segment's own progress.
pub(crate) fn draw_growing(
    surface: &mut dyn PaintSurface,
    levels: &[Vec<Segment>],
    current_depth: usize,
    depth: usize,
    look: &TreeLook,
    placement: &Placement,
) {
    for (d, level) in levels.iter().enumerate().take(depth) {
        if d > current_depth {
            break;
        }
        for seg in level {
            let progress = if d < current_depth { 1.0 } else { seg.progress() };
            draw_branch(surface, &seg.branch, progress, look, placement);
        }
    }
}

/// Flat fill, then the cover-fitted backdrop and its darkening overlay when one is shown.
pub(crate) fn paint_background(
    surface: &mut dyn PaintSurface,
    space: &CoordinateSpace,
    backdrop: Option<&Backdrop>,
    flat: Rgb,
    overlay_alpha: f64,
) {
    let rect = space.stage().rect();
    surface.fill_rect(rect, flat, 1.0);
    let Some(image) = backdrop.filter(|_| space.image_active()) else {
        return;
    };
    let cover = space.cover();
    surface.draw_image(
        image,
        Affine::translate(Vec2::new(cover.offset.x, cover.offset.y)) * Affine::scale(cover.scale),
    );
    surface.fill_rect(rect, Rgb::BLACK, overlay_alpha);
}

#[cfg(test)]
#[path = "../../tests/unit/render/tree.rs"]
mod tests;
