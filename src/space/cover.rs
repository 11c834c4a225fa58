use crate::foundation::core::{Point, Stage, Vec2};

/// Scale and offset that fit a background image over the whole stage ("cover" fit).
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CoverTransform {
    /// Uniform image-to-canvas scale.
    pub scale: f64,
    /// Canvas position of the image's top-left corner.
    pub offset: Vec2,
}

impl CoverTransform {
    /// No scaling, no offset. Used whenever no background image is active.
    pub const IDENTITY: Self = Self {
        scale: 1.0,
        offset: Vec2::ZERO,
    };

    /// Cover-fit an `image_w x image_h` image into a `stage_w x stage_h` container.
    pub fn cover(stage_w: f64, stage_h: f64, image_w: f64, image_h: f64) -> Self {
        if !(image_w > 0.0 && image_h > 0.0) {
            return Self::IDENTITY;
        }
        let scale = (stage_w / image_w).max(stage_h / image_h);
        Self {
            scale,
            offset: Vec2::new(
                (stage_w - image_w * scale) * 0.5,
                (stage_h - image_h * scale) * 0.5,
            ),
        }
    }

    /// Image pixel to canvas pixel.
    pub fn apply(&self, image_px: Point) -> Point {
        Point::new(
            self.offset.x + image_px.x * self.scale,
            self.offset.y + image_px.y * self.scale,
        )
    }

    /// Canvas pixel to image pixel.
    pub fn invert(&self, canvas_px: Point) -> Point {
        Point::new(
            (canvas_px.x - self.offset.x) / self.scale,
            (canvas_px.y - self.offset.y) / self.scale,
        )
    }
}

impl Default for CoverTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Where a tree is rooted.
///
/// `Canvas` anchors are relative to the stage and drift when it is resized; `Image` anchors
/// are relative to the background image's natural size and stay glued to it.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "space", rename_all = "camelCase")]
pub enum Anchor {
    /// Stage-relative UV, recorded while no background image was active.
    Canvas {
        /// Horizontal fraction of the stage width.
        u: f64,
        /// Vertical fraction of the stage height.
        v: f64,
    },
    /// Background-image UV in `[0, 1]`.
    Image {
        /// Horizontal fraction of the image width.
        u: f64,
        /// Vertical fraction of the image height.
        v: f64,
    },
}

impl Anchor {
    /// Horizontal coordinate, whichever space it lives in.
    pub fn u(&self) -> f64 {
        match *self {
            Self::Canvas { u, .. } | Self::Image { u, .. } => u,
        }
    }

    /// Vertical coordinate; `0` is the top (far), `1` the bottom (near).
    pub fn v(&self) -> f64 {
        match *self {
            Self::Canvas { v, .. } | Self::Image { v, .. } => v,
        }
    }

    /// `true` for image-relative anchors.
    pub fn is_image(&self) -> bool {
        matches!(self, Self::Image { .. })
    }
}

/// Back-to-front ordering key: anchor `v` when known, else `y` normalized by stage height.
pub fn depth_sort_key(anchor: Option<&Anchor>, y: f64, stage_height: f64) -> f64 {
    match anchor {
        Some(a) if a.v().is_finite() => a.v(),
        _ => {
            let y = if y.is_finite() { y } else { 0.0 };
            y / stage_height.max(1.0)
        }
    }
}

/// Canvas-pixel / image-UV translation for one stage.
///
/// Holds the stage size, the natural size of the active background image (if any) and the
/// derived cover transform, which is recomputed whenever either changes.
#[derive(Clone, Debug)]
pub struct CoordinateSpace {
    stage: Stage,
    image_size: Option<(f64, f64)>,
    cover: CoverTransform,
}

impl CoordinateSpace {
    /// Space with no active background image.
    pub fn new(stage: Stage) -> Self {
        Self {
            stage,
            image_size: None,
            cover: CoverTransform::IDENTITY,
        }
    }

    /// Current stage.
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Current cover transform (identity without an image).
    pub fn cover(&self) -> CoverTransform {
        self.cover
    }

    /// Whether image-space anchors are currently resolvable.
    pub fn image_active(&self) -> bool {
        self.image_size.is_some()
    }

    /// Change the stage size and recompute the cover transform.
    pub fn set_stage(&mut self, stage: Stage) {
        self.stage = stage;
        self.update_cover();
    }

    /// Set (or clear) the natural size of the active background image.
    pub fn set_image_size(&mut self, size: Option<(u32, u32)>) {
        self.image_size = size
            .filter(|&(w, h)| w > 0 && h > 0)
            .map(|(w, h)| (f64::from(w), f64::from(h)));
        self.update_cover();
    }

    /// Recompute the cover transform. Safe to call redundantly.
    pub fn update_cover(&mut self) {
        self.cover = match self.image_size {
            Some((iw, ih)) => CoverTransform::cover(self.stage.w(), self.stage.h(), iw, ih),
            None => CoverTransform::IDENTITY,
        };
    }

    /// Resolve a canvas pixel to an anchor.
    ///
    /// With an active image the result is clamped image UV; otherwise it is unclamped
    /// stage-relative UV.
    pub fn canvas_to_image_uv(&self, p: Point) -> Anchor {
        match self.image_size {
            Some((iw, ih)) => {
                let ip = self.cover.invert(p);
                Anchor::Image {
                    u: (ip.x / iw).clamp(0.0, 1.0),
                    v: (ip.y / ih).clamp(0.0, 1.0),
                }
            }
            None => Anchor::Canvas {
                u: p.x / self.stage.w(),
                v: p.y / self.stage.h(),
            },
        }
    }

    /// Resolve an anchor to a canvas pixel.
    ///
    /// Canvas anchors are upgraded first when an image is active, so the result matches what
    /// the stored anchor will resolve to after [`Self::upgrade_anchor`]. An image anchor with
    /// no active image falls back to stage-relative placement.
    pub fn uv_to_canvas_xy(&self, anchor: Anchor) -> Point {
        match self.upgrade_anchor(anchor) {
            Anchor::Image { u, v } => match self.image_size {
                Some((iw, ih)) => self.cover.apply(Point::new(u * iw, v * ih)),
                None => self.stage_point(u, v),
            },
            Anchor::Canvas { u, v } => self.stage_point(u, v),
        }
    }

    /// Convert a canvas anchor into image space when an image is active. Image anchors are
    /// returned unchanged.
    pub fn upgrade_anchor(&self, anchor: Anchor) -> Anchor {
        match anchor {
            Anchor::Canvas { u, v } if self.image_active() => {
                self.canvas_to_image_uv(self.stage_point(u, v))
            }
            other => other,
        }
    }

    /// Effective render scale for a tree: image-anchored trees follow the cover scale.
    pub fn render_scale(&self, base: f64, anchor: Option<&Anchor>) -> f64 {
        match anchor {
            Some(a) if a.is_image() => base * self.cover.scale,
            _ => base,
        }
    }

    fn stage_point(&self, u: f64, v: f64) -> Point {
        Point::new(u * self.stage.w(), v * self.stage.h())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/space/cover.rs"]
mod tests;
