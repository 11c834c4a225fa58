//! Light-direction shading and per-segment color resolution.
//!
//! Shading is computed in planting (object) space so a tree keeps its look when it is moved or
//! rescaled; only gradient endpoints are expressed in final screen coordinates.

use crate::assets::color::Rgb;
use crate::config::settings::ColorMode;
use crate::foundation::core::{Point, Vec2};
use crate::foundation::math::{clamp_finite, clamp01, deg_to_rad};
use crate::render::tree::{Placement, TreeLook};
use crate::structure::branch::Branch;

/// How one segment is stroked.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum StrokeStyle {
    /// Flat color.
    Solid(Rgb),
    /// Linear gradient between two screen-space points.
    Gradient {
        /// Screen position of the `start` color.
        from: Point,
        /// Screen position of the `end` color.
        to: Point,
        /// Color at `from`.
        start: Rgb,
        /// Color at `to`.
        end: Rgb,
    },
}

/// How lit a segment is, in `[0, 1]`.
///
/// Compares the direction from the tree's center (`origin.x`, halfway between the origin and
/// the tree top) to the segment midpoint against the direction toward the light.
pub fn shade_factor(mid: Point, origin: Point, tree_top: f64, light_direction_deg: f64) -> f64 {
    let rad = deg_to_rad(light_direction_deg);
    let light = Vec2::new(rad.cos(), rad.sin());
    let center_y = if tree_top.is_finite() {
        (origin.y + tree_top) / 2.0
    } else {
        origin.y
    };
    let mut to_mid = Vec2::new(mid.x - origin.x, mid.y - center_y);
    let len = to_mid.hypot();
    if len > 0.0 && len.is_finite() {
        to_mid /= len;
    }
    clamp01((to_mid.dot(-light) + 1.0) / 2.0)
}

/// Gradient color at height `y`: `start` at the origin, `end` at the tree top.
pub fn color_at_y(y: f64, origin_y: f64, tree_top: f64, start: Rgb, end: Rgb) -> Rgb {
    if !origin_y.is_finite() || !tree_top.is_finite() || origin_y == tree_top {
        return start;
    }
    start.mix(end, clamp01((origin_y - y) / (origin_y - tree_top)))
}

/// Lighten toward white (shade above 0.5) or darken toward black (below 0.5).
pub fn apply_shading(rgb: Rgb, shade: f64, intensity: f64) -> Rgb {
    let amount = (shade - 0.5) * 2.0 * intensity;
    if amount > 0.0 {
        rgb.mix(Rgb::WHITE, amount)
    } else if amount < 0.0 {
        rgb.mix(Rgb::BLACK, -amount)
    } else {
        rgb
    }
}

/// Render-scale multiplier for an anchor at vertical UV `v`; higher anchors are farther away
/// and smaller.
///
/// A missing `v` counts as nearest (factor 1).
pub fn depth_scale_for_uv(v: Option<f64>, depth_strength: f64) -> f64 {
    let v = clamp01(v.unwrap_or(1.0));
    let strength = clamp_finite(depth_strength, 0.0, 3.0);
    let min_factor = (1.0 - strength).max(0.02);
    let gamma = 1.0 + strength * 0.8;
    min_factor + (1.0 - min_factor) * v.powf(gamma)
}

/// Resolve the stroke for `branch` drawn with `look` at `placement`.
pub fn stroke_style_for(branch: &Branch, look: &TreeLook, placement: &Placement) -> StrokeStyle {
    let shade = shade_factor(branch.mid, look.origin, look.tree_top, look.light_direction);
    match look.color_mode {
        ColorMode::Solid => StrokeStyle::Solid(apply_shading(look.color, shade, look.light_intensity)),
        ColorMode::Gradient | ColorMode::BaseGradient => {
            let at = |y: f64| {
                let c = color_at_y(
                    y,
                    look.origin.y,
                    look.tree_top,
                    look.gradient_start,
                    look.gradient_end,
                );
                apply_shading(c, shade, look.light_intensity)
            };
            StrokeStyle::Gradient {
                from: placement.map(branch.start),
                to: placement.map(branch.end),
                start: at(branch.start.y),
                end: at(branch.end.y),
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/shading/model.rs"]
mod tests;
