//! Transparent "card" images of a single finished tree.

use std::time::SystemTime;

use anyhow::Context;
use image::ImageEncoder;

use crate::assets::backdrop::Backdrop;
use crate::foundation::core::{Affine, TreeId, Vec2};
use crate::foundation::error::{SaplingError, SaplingResult};
use crate::foundation::math::unpremultiply_rgba8_in_place;
use crate::growth::tree::FinishedTree;
use crate::render::backend::{FrameRGBA, PaintSurface};
use crate::render::cpu::CpuSurface;
use crate::space::cover::CoordinateSpace;

/// Margin added around the visible pixels so antialiased edges are not clipped.
const CROP_INFLATE_PX: u32 = 6;

/// Preview card: width, height, padding.
pub(crate) const PREVIEW_CARD: (u32, u32, u32) = (300, 400, 20);
/// HD card: width, height, padding.
pub(crate) const HD_CARD: (u32, u32, u32) = (900, 1200, 40);
/// Title used when a tree was planted without one.
pub(crate) const DEFAULT_TITLE: &str = "Untitled Session";

/// Notification emitted when a single-mode tree finishes growing.
#[derive(Clone, Debug)]
pub struct TreeFinished {
    /// Tree identity.
    pub id: TreeId,
    /// Session title.
    pub title: String,
    /// 300x400 transparent PNG.
    pub preview_png: Vec<u8>,
    /// 900x1200 transparent PNG, when it could be produced.
    pub hd_png: Option<Vec<u8>>,
    /// Seed the tree was grown from.
    pub seed: Option<i64>,
    /// When the notification was produced.
    pub created_at: SystemTime,
}

/// Draw `tree` alone on a transparent stage, crop to its visible pixels and fit the crop
/// centered into `target_w x target_h` with `padding`.
///
/// Returns `Ok(None)` when the tree has no visible pixels.
pub fn snapshot_transparent(
    tree: &FinishedTree,
    space: &CoordinateSpace,
    target_w: u32,
    target_h: u32,
    padding: u32,
) -> SaplingResult<Option<FrameRGBA>> {
    if target_w == 0 || target_h == 0 {
        return Err(SaplingError::validation("snapshot target size must be non-zero"));
    }
    let stage = space.stage();
    let mut src = CpuSurface::new(stage.width, stage.height)?;
    src.begin_frame();
    tree.draw(&mut src, space);
    src.end_frame();

    let Some((min_x, min_y, max_x, max_y)) = alpha_bounds(src.pixels(), stage.width, stage.height)
    else {
        tracing::debug!(id = tree.id().0, "snapshot has no visible pixels");
        return Ok(None);
    };
    let min_x = min_x.saturating_sub(CROP_INFLATE_PX);
    let min_y = min_y.saturating_sub(CROP_INFLATE_PX);
    let max_x = (max_x + CROP_INFLATE_PX).min(stage.width - 1);
    let max_y = (max_y + CROP_INFLATE_PX).min(stage.height - 1);
    let cw = max_x - min_x + 1;
    let ch = max_y - min_y + 1;

    let crop = crop_rgba8(src.pixels(), stage.width, min_x, min_y, cw, ch);
    let crop = Backdrop::from_premul_rgba8(cw, ch, &crop)?;

    let inner_w = f64::from(target_w.saturating_sub(padding * 2).max(1));
    let inner_h = f64::from(target_h.saturating_sub(padding * 2).max(1));
    let scale = (inner_w / f64::from(cw)).min(inner_h / f64::from(ch));
    let dx = (f64::from(target_w) - f64::from(cw) * scale) * 0.5;
    let dy = (f64::from(target_h) - f64::from(ch) * scale) * 0.5;

    let mut out = CpuSurface::new(target_w, target_h)?;
    out.begin_frame();
    out.draw_image(&crop, Affine::translate(Vec2::new(dx, dy)) * Affine::scale(scale));
    out.end_frame();
    Ok(Some(out.read_frame()))
}

/// Encode a frame as PNG (straight alpha).
pub fn encode_png(frame: &FrameRGBA) -> SaplingResult<Vec<u8>> {
    let expected = frame.width as usize * frame.height as usize * 4;
    if frame.data.len() != expected {
        return Err(SaplingError::export(format!(
            "frame has {} bytes, expected {expected}",
            frame.data.len()
        )));
    }
    let mut rgba = frame.data.clone();
    if frame.premultiplied {
        unpremultiply_rgba8_in_place(&mut rgba);
    }
    let mut out = Vec::new();
    image::codecs::png::PngEncoder::new(&mut out)
        .write_image(
            &rgba,
            frame.width,
            frame.height,
            image::ExtendedColorType::Rgba8,
        )
        .context("encode png")?;
    Ok(out)
}

/// Build the finished-tree notification with preview and HD cards.
pub(crate) fn card_for(
    tree: &FinishedTree,
    space: &CoordinateSpace,
    created_at: SystemTime,
) -> SaplingResult<Option<TreeFinished>> {
    let (w, h, pad) = PREVIEW_CARD;
    let Some(preview) = snapshot_transparent(tree, space, w, h, pad)? else {
        return Ok(None);
    };
    let (w, h, pad) = HD_CARD;
    let hd_png = match snapshot_transparent(tree, space, w, h, pad) {
        Ok(Some(frame)) => Some(encode_png(&frame)?),
        Ok(None) => None,
        Err(err) => {
            tracing::warn!(error = %err, "hd card snapshot failed");
            None
        }
    };
    Ok(Some(TreeFinished {
        id: tree.id(),
        title: tree.title().unwrap_or(DEFAULT_TITLE).to_owned(),
        preview_png: encode_png(&preview)?,
        hd_png,
        seed: tree.seed(),
        created_at,
    }))
}

/// Inclusive bounds of pixels with non-zero alpha.
fn alpha_bounds(rgba: &[u8], width: u32, height: u32) -> Option<(u32, u32, u32, u32)> {
    let mut bounds: Option<(u32, u32, u32, u32)> = None;
    for y in 0..height {
        for x in 0..width {
            let a = rgba[(y as usize * width as usize + x as usize) * 4 + 3];
            if a == 0 {
                continue;
            }
            bounds = Some(match bounds {
                None => (x, y, x, y),
                Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
            });
        }
    }
    bounds
}

fn crop_rgba8(rgba: &[u8], width: u32, x0: u32, y0: u32, cw: u32, ch: u32) -> Vec<u8> {
    let mut out = Vec::with_capacity(cw as usize * ch as usize * 4);
    for y in y0..y0 + ch {
        let start = (y as usize * width as usize + x0 as usize) * 4;
        out.extend_from_slice(&rgba[start..start + cw as usize * 4]);
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/export/snapshot.rs"]
mod tests;
