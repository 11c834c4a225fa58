use std::time::{Duration, Instant};

use crate::assets::color::Rgb;
use crate::config::settings::TreeSettings;
use crate::foundation::core::{Point, TreeId};
use crate::random::sequence::TreeRng;
use crate::render::backend::PaintSurface;
use crate::render::tree::{Placement, TreeLook, draw_finished, draw_growing};
use crate::space::cover::{Anchor, CoordinateSpace, depth_sort_key};
use crate::structure::branch::{Branch, BranchStructure, FULL_DEPTH, clamp_tree_scale, generate};

/// Growing trees older than this are completed on the next tick.
pub const STUCK_TREE_TIMEOUT: Duration = Duration::from_secs(30);

/// Result of advancing a tree by one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GrowthStep {
    /// Some level is still animating.
    Growing,
    /// Every displayed level is complete.
    Finished,
}

/// A tree that is still being revealed.
#[derive(Clone, Debug)]
pub struct GrowingTree {
    id: TreeId,
    structure: BranchStructure,
    anchor: Anchor,
    origin: Point,
    look: TreeLook,
    depth: usize,
    growth_speed: f64,
    render_scale_base: f64,
    current_depth: usize,
    seed: Option<i64>,
    rng_cursor: Option<usize>,
    created_at: Instant,
    title: Option<String>,
}

impl GrowingTree {
    /// Generate the full structure for a tree rooted at `origin` (the anchor's current screen
    /// position) and start it at level 0.
    ///
    /// The settings are copied; later settings changes never reach this tree.
    pub fn plant(
        id: TreeId,
        settings: &TreeSettings,
        anchor: Anchor,
        origin: Point,
        render_scale_base: f64,
        base_color: Option<Rgb>,
        created_at: Instant,
    ) -> Self {
        let depth = (settings.depth as usize).clamp(1, FULL_DEPTH);
        let mut rng = TreeRng::for_tree(settings.seed, depth as u32, settings.tree_scale);
        let tree_scale = clamp_tree_scale(settings.tree_scale, origin.y);
        let structure = generate(origin, tree_scale, settings.branch_width, &mut rng);
        let look = TreeLook::new(settings, origin, structure.tree_top(), base_color);
        Self {
            id,
            look,
            structure,
            anchor,
            origin,
            depth,
            growth_speed: settings.growth_speed,
            render_scale_base,
            current_depth: 0,
            seed: settings.seed,
            rng_cursor: rng.cursor(),
            created_at,
            title: None,
        }
    }

    /// Builder: override the per-tick growth speed.
    pub fn with_growth_speed(mut self, growth_speed: f64) -> Self {
        if growth_speed.is_finite() && growth_speed > 0.0 {
            self.growth_speed = growth_speed;
        }
        self
    }

    /// Builder: attach a title carried into the finished tree.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Identity.
    pub fn id(&self) -> TreeId {
        self.id
    }

    /// Where the tree is rooted.
    pub fn anchor(&self) -> Anchor {
        self.anchor
    }

    pub(crate) fn set_anchor(&mut self, anchor: Anchor) {
        self.anchor = anchor;
    }

    /// Screen position the geometry was generated at.
    pub fn origin(&self) -> Point {
        self.origin
    }

    /// Levels to grow.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Level currently animating; equals [`Self::depth`] once finished.
    pub fn current_depth(&self) -> usize {
        self.current_depth
    }

    /// Growth frames added per tick.
    pub fn growth_speed(&self) -> f64 {
        self.growth_speed
    }

    /// Full generated geometry with progress.
    pub fn structure(&self) -> &BranchStructure {
        &self.structure
    }

    /// Seed used, if any.
    pub fn seed(&self) -> Option<i64> {
        self.seed
    }

    /// Position in the seeded sequence after generation (`None` when unseeded).
    pub fn rng_cursor(&self) -> Option<usize> {
        self.rng_cursor
    }

    /// Render scale before cover scaling.
    pub fn render_scale_base(&self) -> f64 {
        self.render_scale_base
    }

    /// Planting time.
    pub fn created_at(&self) -> Instant {
        self.created_at
    }

    /// Time since planting.
    pub fn age(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.created_at)
    }

    /// Whether every displayed level is complete.
    pub fn is_finished(&self) -> bool {
        self.current_depth >= self.depth
    }

    /// Advance the animating level by one tick and move on to the next level once it is
    /// complete.
    pub fn advance(&mut self) -> GrowthStep {
        if self.is_finished() {
            return GrowthStep::Finished;
        }
        let speed = self.growth_speed;
        if let Some(level) = self.structure.levels_mut().get_mut(self.current_depth) {
            for seg in level.iter_mut().filter(|s| !s.is_complete()) {
                seg.advance(speed);
            }
        }
        while self.current_depth < self.depth
            && self
                .structure
                .level(self.current_depth)
                .iter()
                .all(|s| s.is_complete())
        {
            self.current_depth += 1;
        }
        if self.is_finished() {
            tracing::debug!(
                id = self.id.0,
                depth = self.depth,
                "tree completed"
            );
            GrowthStep::Finished
        } else {
            GrowthStep::Growing
        }
    }

    /// Complete every displayed segment immediately.
    pub fn force_complete(&mut self) {
        let depth = self.depth;
        for level in self.structure.levels_mut().iter_mut().take(depth) {
            for seg in level.iter_mut() {
                seg.complete();
            }
        }
        self.current_depth = self.depth;
    }

    /// Placement on the current stage.
    pub fn placement(&self, space: &CoordinateSpace) -> Placement {
        placement_for(space, self.anchor, self.origin, self.render_scale_base)
    }

    /// Back-to-front ordering key.
    pub fn depth_key(&self, space: &CoordinateSpace) -> f64 {
        let y = space.uv_to_canvas_xy(self.anchor).y;
        depth_sort_key(Some(&self.anchor), y, space.stage().h())
    }

    /// Draw the revealed part of the tree.
    pub fn draw(&self, surface: &mut dyn PaintSurface, space: &CoordinateSpace) {
        draw_growing(
            surface,
            self.structure.levels(),
            self.current_depth,
            self.depth,
            &self.look,
            &self.placement(space),
        );
    }

    /// Drop growth state and keep only the displayed geometry.
    pub fn into_finished(self) -> FinishedTree {
        FinishedTree {
            id: self.id,
            levels: self.structure.geometry(self.depth),
            anchor: self.anchor,
            origin: self.origin,
            look: self.look,
            render_scale_base: self.render_scale_base,
            seed: self.seed,
            created_at: self.created_at,
            title: self.title,
        }
    }
}

/// A completed tree: geometry and look only.
#[derive(Clone, Debug)]
pub struct FinishedTree {
    id: TreeId,
    levels: Vec<Vec<Branch>>,
    anchor: Anchor,
    origin: Point,
    look: TreeLook,
    render_scale_base: f64,
    seed: Option<i64>,
    created_at: Instant,
    title: Option<String>,
}

impl FinishedTree {
    /// Identity (same as while growing).
    pub fn id(&self) -> TreeId {
        self.id
    }

    /// Displayed levels.
    pub fn levels(&self) -> &[Vec<Branch>] {
        &self.levels
    }

    /// Where the tree is rooted.
    pub fn anchor(&self) -> Anchor {
        self.anchor
    }

    pub(crate) fn set_anchor(&mut self, anchor: Anchor) {
        self.anchor = anchor;
    }

    /// Color and light parameters.
    pub fn look(&self) -> &TreeLook {
        &self.look
    }

    /// Seed used, if any.
    pub fn seed(&self) -> Option<i64> {
        self.seed
    }

    /// Planting time.
    pub fn created_at(&self) -> Instant {
        self.created_at
    }

    /// Title given at plant time, if any.
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Render scale before cover scaling.
    pub fn render_scale_base(&self) -> f64 {
        self.render_scale_base
    }

    pub(crate) fn set_render_scale_base(&mut self, base: f64) {
        self.render_scale_base = base;
    }

    /// Placement on the current stage.
    pub fn placement(&self, space: &CoordinateSpace) -> Placement {
        placement_for(space, self.anchor, self.origin, self.render_scale_base)
    }

    /// Back-to-front ordering key.
    pub fn depth_key(&self, space: &CoordinateSpace) -> f64 {
        let y = space.uv_to_canvas_xy(self.anchor).y;
        depth_sort_key(Some(&self.anchor), y, space.stage().h())
    }

    /// Draw every level in full.
    pub fn draw(&self, surface: &mut dyn PaintSurface, space: &CoordinateSpace) {
        draw_finished(surface, &self.levels, &self.look, &self.placement(space));
    }
}

fn placement_for(space: &CoordinateSpace, anchor: Anchor, origin: Point, base: f64) -> Placement {
    Placement {
        anchor: space.uv_to_canvas_xy(anchor),
        origin,
        scale: space.render_scale(base, Some(&space.upgrade_anchor(anchor))),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/growth/tree.rs"]
mod tests;
