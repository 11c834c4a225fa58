use std::time::{Duration, SystemTime};

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::assets::backdrop::Backdrop;
use crate::assets::color::Rgb;
use crate::config::settings::{ColorMode, SettingsPatch, TreeSettings, random_seed};
use crate::engine::scheduler::{Clock, FrameHandle, FrameScheduler, ManualScheduler, SystemClock};
use crate::engine::static_layer::{StaticLayer, StaticScene};
use crate::export::snapshot::{TreeFinished, card_for};
use crate::foundation::core::{Point, Stage, TreeId};
use crate::foundation::error::{SaplingError, SaplingResult};
use crate::growth::tree::{FinishedTree, GrowingTree, GrowthStep, STUCK_TREE_TIMEOUT};
use crate::render::backend::{FrameRGBA, PaintSurface};
use crate::render::composite::over_in_place;
use crate::render::cpu::CpuSurface;
use crate::render::tree::paint_background;
use crate::shading::model::depth_scale_for_uv;
use crate::space::cover::{Anchor, CoordinateSpace};
use crate::structure::branch::FRAMES_PER_SEGMENT;

/// Canvas UV where timed trees are planted when no anchor is given.
const TIMED_PLANT_UV: Anchor = Anchor::Canvas { u: 0.5, v: 0.88 };
/// Host frame rate assumed when calibrating timed plants.
const TICKS_PER_SECOND: f64 = 60.0;

/// Engine construction options.
#[derive(Clone, Debug)]
pub struct EngineOpts {
    /// Stage width in pixels.
    pub width: u32,
    /// Stage height in pixels.
    pub height: u32,
    /// Draw a fresh seed before every [`TreeEngine::plant`].
    pub auto_seed: bool,
    /// Growing trees older than this are force-completed.
    pub stuck_timeout: Duration,
    /// Background fill under (or instead of) the image.
    pub background: Rgb,
    /// Black overlay drawn over the background image.
    pub overlay_alpha: f64,
    /// Emit [`EngineEvent::TreeFinished`] cards for single-tree completions.
    pub emit_snapshots: bool,
}

impl Default for EngineOpts {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            auto_seed: false,
            stuck_timeout: STUCK_TREE_TIMEOUT,
            background: Rgb::from_u8(0x0e, 0x0f, 0x10),
            overlay_alpha: 0.35,
            emit_snapshots: true,
        }
    }
}

/// Which background the static layer paints.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BackgroundMode {
    /// Flat color only.
    Flat,
    /// Cover-fitted image when one is loaded.
    #[default]
    Image,
}

/// How an item was drawn on the live layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DrawKind {
    /// A finished tree drawn in full.
    Finished,
    /// A growing tree drawn up to its current level.
    Growing,
}

/// One live-layer draw, in paint order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DrawItem {
    /// Tree drawn.
    pub id: TreeId,
    /// Whether it was finished or growing.
    pub kind: DrawKind,
}

/// What a tick did with the loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// The handle was not the in-flight one; nothing happened.
    Stale,
    /// Work was done and the next frame is scheduled.
    Continue,
    /// Work was done and the loop stopped.
    Idle,
}

/// Summary of one tick.
#[derive(Clone, Debug, PartialEq)]
pub struct TickReport {
    /// Loop state after the tick.
    pub outcome: TickOutcome,
    /// Live-layer draws, back to front.
    pub draw_order: Vec<DrawItem>,
    /// Trees that finished this tick (forced ones included).
    pub finished: Vec<TreeId>,
    /// Trees completed by the stuck-tree timeout.
    pub forced: Vec<TreeId>,
    /// Whether finished and growing trees were interleaved on the live layer.
    pub composited: bool,
    /// Whether the static layer was repainted.
    pub static_repainted: bool,
}

impl TickReport {
    fn stale() -> Self {
        Self::with_outcome(TickOutcome::Stale)
    }

    fn with_outcome(outcome: TickOutcome) -> Self {
        Self {
            outcome,
            draw_order: Vec::new(),
            finished: Vec::new(),
            forced: Vec::new(),
            composited: false,
            static_repainted: false,
        }
    }
}

/// Notifications for the host, drained with [`TreeEngine::drain_events`].
#[derive(Clone, Debug)]
pub enum EngineEvent {
    /// A single-tree-mode tree completed; carries its card images.
    TreeFinished(TreeFinished),
    /// A forest-mode tree completed and joined the forest.
    ForestTreeAdded(TreeId),
}

#[derive(Clone, Copy)]
enum Slot {
    Forest(usize),
    Single,
    Growing(usize),
}

/// Frame-driven tree growth and compositing.
///
/// The engine never runs on its own: it asks its [`FrameScheduler`] for a frame whenever there
/// is work, and the host answers by calling [`TreeEngine::tick`] with the handle it was given.
pub struct TreeEngine {
    opts: EngineOpts,
    settings: TreeSettings,
    space: CoordinateSpace,
    backdrop: Option<Backdrop>,
    background_mode: BackgroundMode,
    static_layer: StaticLayer,
    live: CpuSurface,
    growing: Vec<GrowingTree>,
    forest: Vec<FinishedTree>,
    completed_single: Option<FinishedTree>,
    forest_mode: bool,
    last_anchor: Option<Anchor>,
    scheduler: Box<dyn FrameScheduler>,
    clock: Box<dyn Clock>,
    loop_handle: Option<FrameHandle>,
    paused: bool,
    next_id: u64,
    events: Vec<EngineEvent>,
    rng: StdRng,
}

impl std::fmt::Debug for TreeEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TreeEngine")
            .field("stage", &self.space.stage())
            .field("growing", &self.growing.len())
            .field("forest", &self.forest.len())
            .field("forest_mode", &self.forest_mode)
            .field("loop_handle", &self.loop_handle)
            .field("paused", &self.paused)
            .finish_non_exhaustive()
    }
}

impl TreeEngine {
    /// Engine with default settings, a [`ManualScheduler`] and the system clock.
    pub fn new(opts: EngineOpts) -> SaplingResult<Self> {
        let stage = Stage::new(opts.width, opts.height)?;
        Ok(Self {
            settings: TreeSettings::default(),
            space: CoordinateSpace::new(stage),
            backdrop: None,
            background_mode: BackgroundMode::default(),
            static_layer: StaticLayer::new(stage.width, stage.height)?,
            live: CpuSurface::new(stage.width, stage.height)?,
            growing: Vec::new(),
            forest: Vec::new(),
            completed_single: None,
            forest_mode: false,
            last_anchor: None,
            scheduler: Box::new(ManualScheduler::new()),
            clock: Box::new(SystemClock),
            loop_handle: None,
            paused: false,
            next_id: 1,
            events: Vec::new(),
            rng: StdRng::from_entropy(),
            opts,
        })
    }

    /// Builder: replace the frame scheduler. Any in-flight frame is dropped.
    pub fn with_scheduler(mut self, scheduler: Box<dyn FrameScheduler>) -> Self {
        self.loop_handle = None;
        self.scheduler = scheduler;
        self
    }

    /// Builder: replace the clock used for the stuck-tree timeout.
    pub fn with_clock(mut self, clock: Box<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Builder: start from `settings` (sanitized).
    pub fn with_settings(mut self, settings: TreeSettings) -> Self {
        self.settings = settings.sanitized();
        self
    }

    /// Builder: seed the RNG behind auto-seeding and randomization.
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Current settings.
    pub fn settings(&self) -> &TreeSettings {
        &self.settings
    }

    /// Coordinate translator for the current stage and background.
    pub fn space(&self) -> &CoordinateSpace {
        &self.space
    }

    /// Trees still growing, in planting order.
    pub fn growing(&self) -> &[GrowingTree] {
        &self.growing
    }

    /// Finished forest trees, in completion order.
    pub fn forest(&self) -> &[FinishedTree] {
        &self.forest
    }

    /// Last tree finished in single-tree mode.
    pub fn completed_single(&self) -> Option<&FinishedTree> {
        self.completed_single.as_ref()
    }

    /// Whether finished trees accumulate.
    pub fn forest_mode(&self) -> bool {
        self.forest_mode
    }

    /// Anchor of the last plant, reused by [`Self::redraw_from_last_anchor`].
    pub fn last_anchor(&self) -> Option<Anchor> {
        self.last_anchor
    }

    /// Frame the engine is waiting for, if any.
    pub fn loop_handle(&self) -> Option<FrameHandle> {
        self.loop_handle
    }

    /// Whether the loop is paused.
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Whether each plant draws a fresh seed.
    pub fn auto_seed(&self) -> bool {
        self.opts.auto_seed
    }

    /// Toggle auto-seeding.
    pub fn set_auto_seed(&mut self, on: bool) {
        self.opts.auto_seed = on;
    }

    /// Cached background and forest layer.
    pub fn static_layer(&self) -> &StaticLayer {
        &self.static_layer
    }

    /// Premultiplied RGBA8 of the live (animated) layer.
    pub fn live_pixels(&self) -> &[u8] {
        self.live.pixels()
    }

    /// Static layer with the live layer composited over it.
    pub fn frame_rgba(&self) -> SaplingResult<FrameRGBA> {
        let (width, height) = self.static_layer.size();
        let mut data = self.static_layer.pixels().to_vec();
        over_in_place(&mut data, self.live.pixels())?;
        Ok(FrameRGBA {
            width,
            height,
            data,
            premultiplied: true,
        })
    }

    /// Take all pending notifications.
    pub fn drain_events(&mut self) -> Vec<EngineEvent> {
        std::mem::take(&mut self.events)
    }

    /// Start a tree at canvas point `at`, or at `anchor` when given.
    ///
    /// In single-tree mode everything previously grown is discarded first.
    pub fn plant(&mut self, at: Point, anchor: Option<Anchor>) -> SaplingResult<TreeId> {
        if anchor.is_none() && !(at.x.is_finite() && at.y.is_finite()) {
            return Err(SaplingError::validation("plant point must be finite"));
        }
        if self.opts.auto_seed {
            self.settings.seed = Some(random_seed(&mut self.rng));
        }
        if !self.forest_mode {
            self.reset_trees();
        }
        let anchor = anchor.unwrap_or_else(|| self.space.canvas_to_image_uv(at));
        let anchor = self.space.upgrade_anchor(anchor);
        self.last_anchor = Some(anchor);
        Ok(self.spawn(anchor, None, None))
    }

    /// Plant a tree whose growth takes `duration` at 60 ticks per second.
    ///
    /// Uses a fresh seed and defaults to the lower middle of the stage. Durations of one second
    /// or less are ignored.
    pub fn plant_timed(
        &mut self,
        anchor: Option<Anchor>,
        duration: Duration,
        title: Option<String>,
    ) -> Option<TreeId> {
        let secs = duration.as_secs_f64();
        if secs <= 1.0 {
            tracing::debug!(secs, "timed plant ignored");
            return None;
        }
        self.settings.seed = Some(random_seed(&mut self.rng));
        if !self.forest_mode {
            self.reset_trees();
        }
        let anchor = self.space.upgrade_anchor(anchor.unwrap_or(TIMED_PLANT_UV));
        let depth = f64::from(self.settings.depth);
        let speed = depth * FRAMES_PER_SEGMENT / (TICKS_PER_SECOND * secs);
        Some(self.spawn(anchor, Some(speed), title))
    }

    /// Re-plant at the last anchor with the current settings.
    ///
    /// Returns `None` when nothing has been planted yet.
    pub fn redraw_from_last_anchor(&mut self) -> Option<TreeId> {
        let anchor = self.last_anchor?;
        self.cancel_loop();
        self.growing.clear();
        if !self.forest_mode {
            self.completed_single = None;
            self.forest.clear();
        }
        let anchor = self.space.upgrade_anchor(anchor);
        self.last_anchor = Some(anchor);
        Some(self.spawn(anchor, None, None))
    }

    /// Merge a partial settings update. Trees already planted are unaffected.
    pub fn update_settings(&mut self, patch: &SettingsPatch) {
        let depth_mode = self.settings.depth_mode;
        self.settings.apply(patch);
        if self.settings.depth_mode != depth_mode {
            self.static_layer.mark_dirty();
            self.request_frame();
        }
    }

    /// Randomize shape and color settings, then re-plant at the last anchor.
    pub fn randomize_settings(&mut self) -> Option<TreeId> {
        self.settings.randomize(&mut self.rng);
        self.redraw_from_last_anchor()
    }

    /// Draw a new seed, then re-plant at the last anchor.
    pub fn randomize_seed(&mut self) -> Option<TreeId> {
        self.settings.seed = Some(random_seed(&mut self.rng));
        self.redraw_from_last_anchor()
    }

    /// Change the render scale, re-planting at the last anchor and rescaling the completed
    /// single tree.
    pub fn set_render_scale(&mut self, scale: f64) {
        self.settings.apply(&SettingsPatch {
            render_scale: Some(scale),
            ..SettingsPatch::default()
        });
        let base = self.settings.render_scale;
        if self.last_anchor.is_some() {
            self.redraw_from_last_anchor();
        }
        if let Some(tree) = self.completed_single.as_mut() {
            tree.set_render_scale_base(base);
            self.request_frame();
        }
    }

    /// Enter or leave forest mode.
    ///
    /// Leaving cancels the loop and drops every growing and forest tree.
    pub fn set_forest_mode(&mut self, on: bool) {
        if self.forest_mode == on {
            return;
        }
        self.forest_mode = on;
        if on {
            self.static_layer.mark_dirty();
            self.request_frame();
        } else {
            self.cancel_loop();
            self.growing.clear();
            self.forest.clear();
            self.live.begin_frame();
            self.live.end_frame();
            self.static_layer.mark_dirty();
            self.repaint_static();
        }
    }

    /// Drop every tree and the last anchor.
    pub fn clear(&mut self) {
        self.cancel_loop();
        self.growing.clear();
        self.forest.clear();
        self.completed_single = None;
        self.last_anchor = None;
        self.live.begin_frame();
        self.live.end_frame();
        self.static_layer.mark_dirty();
        self.repaint_static();
    }

    /// Resize the stage. Anchored trees keep their relative positions.
    pub fn resize(&mut self, width: u32, height: u32) -> SaplingResult<()> {
        let stage = Stage::new(width, height)?;
        self.static_layer.resize(width, height)?;
        self.live.resize(width, height)?;
        self.space.set_stage(stage);
        self.normalize_anchors();
        self.request_frame();
        Ok(())
    }

    /// Install (or remove) the background image. `None` falls back to the flat color.
    pub fn set_background(&mut self, backdrop: Option<Backdrop>) {
        self.backdrop = backdrop;
        self.sync_background();
    }

    /// Decode and install a background image; decode failures fall back to the flat color.
    pub fn load_background(&mut self, bytes: &[u8]) -> bool {
        match Backdrop::decode(bytes) {
            Ok(backdrop) => {
                self.set_background(Some(backdrop));
                true
            }
            Err(err) => {
                tracing::warn!(error = %err, "background decode failed, using flat color");
                self.set_background(None);
                false
            }
        }
    }

    /// Choose between the image and the flat color.
    pub fn set_background_mode(&mut self, mode: BackgroundMode) {
        self.background_mode = mode;
        self.sync_background();
    }

    /// Stop ticking without discarding growth state.
    pub fn pause(&mut self) {
        self.paused = true;
        self.cancel_loop();
    }

    /// Restart the loop after [`Self::pause`].
    pub fn resume(&mut self) {
        if !self.paused {
            return;
        }
        self.paused = false;
        if !self.growing.is_empty() || self.static_layer.is_dirty() {
            self.request_frame();
        }
    }

    /// Tick the in-flight frame, if any.
    pub fn step(&mut self) -> SaplingResult<Option<TickReport>> {
        match self.loop_handle {
            Some(handle) => self.tick(handle).map(Some),
            None => Ok(None),
        }
    }

    /// Tick until the loop stops or `max_ticks` ticks ran. Returns the number of ticks run.
    pub fn run_until_idle(&mut self, max_ticks: usize) -> SaplingResult<usize> {
        let mut ticks = 0;
        while ticks < max_ticks {
            if self.step()?.is_none() {
                break;
            }
            ticks += 1;
        }
        Ok(ticks)
    }

    /// Run one frame of the master loop.
    ///
    /// `handle` must be the frame the engine last scheduled; anything else (a cancelled or
    /// superseded frame) is reported as [`TickOutcome::Stale`] and changes nothing.
    #[tracing::instrument(level = "debug", skip(self), fields(growing = self.growing.len()))]
    pub fn tick(&mut self, handle: FrameHandle) -> SaplingResult<TickReport> {
        if self.loop_handle != Some(handle) {
            return Ok(TickReport::stale());
        }
        self.loop_handle = None;
        let mut report = TickReport::with_outcome(TickOutcome::Idle);

        self.normalize_anchors();
        self.complete_stuck_trees(&mut report);

        let has_finished = if self.forest_mode {
            !self.forest.is_empty()
        } else {
            self.completed_single.is_some()
        };
        let composite = self.settings.depth_mode && !self.growing.is_empty() && has_finished;
        report.composited = composite;
        self.static_layer.set_show_forest(!composite);
        report.static_repainted = self.repaint_static();

        self.live.begin_frame();
        let mut done = Vec::new();
        if composite {
            let backdrop = match self.background_mode {
                BackgroundMode::Image => self.backdrop.as_ref(),
                BackgroundMode::Flat => None,
            };
            paint_background(
                &mut self.live,
                &self.space,
                backdrop,
                self.opts.background,
                self.opts.overlay_alpha,
            );
            for slot in self.composite_order() {
                self.draw_slot(slot, &mut report, &mut done);
            }
        } else {
            if self.growing.is_empty() && !self.forest_mode {
                self.draw_slot(Slot::Single, &mut report, &mut done);
            }
            for slot in self.growing_order() {
                self.draw_slot(slot, &mut report, &mut done);
            }
        }
        self.live.end_frame();

        done.sort_unstable_by(|a, b| b.cmp(a));
        for idx in done {
            let tree = self.growing.remove(idx);
            report.finished.push(tree.id());
            self.persist(tree.into_finished());
        }

        let keep_going =
            !self.growing.is_empty() || (self.forest_mode && self.static_layer.is_dirty());
        if keep_going {
            self.request_frame();
        }
        if self.loop_handle.is_some() {
            report.outcome = TickOutcome::Continue;
        }
        Ok(report)
    }

    fn spawn(&mut self, anchor: Anchor, speed: Option<f64>, title: Option<String>) -> TreeId {
        let id = TreeId(self.next_id);
        self.next_id += 1;
        let origin = self.space.uv_to_canvas_xy(anchor);
        let base_color = if self.settings.color_mode == ColorMode::BaseGradient {
            self.repaint_static();
            self.static_layer.sample(origin)
        } else {
            None
        };
        let mut render_scale = self.settings.render_scale;
        if self.settings.depth_mode {
            render_scale *= depth_scale_for_uv(Some(anchor.v()), self.settings.depth_strength);
        }
        let mut tree = GrowingTree::plant(
            id,
            &self.settings,
            anchor,
            origin,
            render_scale,
            base_color,
            self.clock.now(),
        );
        if let Some(speed) = speed {
            tree = tree.with_growth_speed(speed);
        }
        if let Some(title) = title {
            tree = tree.with_title(title);
        }
        tracing::debug!(id = id.0, u = anchor.u(), v = anchor.v(), "planted tree");
        self.growing.push(tree);
        self.request_frame();
        id
    }

    /// Single-tree mode starts from nothing on every plant.
    fn reset_trees(&mut self) {
        self.cancel_loop();
        self.growing.clear();
        self.forest.clear();
        self.completed_single = None;
    }

    fn complete_stuck_trees(&mut self, report: &mut TickReport) {
        let now = self.clock.now();
        let timeout = self.opts.stuck_timeout;
        let mut i = 0;
        while i < self.growing.len() {
            let age = self.growing[i].age(now);
            if age <= timeout {
                i += 1;
                continue;
            }
            let mut tree = self.growing.remove(i);
            tracing::warn!(
                id = tree.id().0,
                age_ms = age.as_millis() as u64,
                "tree stuck growing, forcing completion"
            );
            tree.force_complete();
            report.forced.push(tree.id());
            report.finished.push(tree.id());
            self.persist(tree.into_finished());
        }
    }

    /// Growing trees in live draw order.
    fn growing_order(&self) -> Vec<Slot> {
        if !self.settings.depth_mode {
            return (0..self.growing.len()).rev().map(Slot::Growing).collect();
        }
        let mut keyed: Vec<(f64, Slot)> = self
            .growing
            .iter()
            .enumerate()
            .map(|(i, t)| (t.depth_key(&self.space), Slot::Growing(i)))
            .collect();
        keyed.sort_by(|a, b| a.0.total_cmp(&b.0));
        keyed.into_iter().map(|(_, slot)| slot).collect()
    }

    /// Finished and growing trees merged far to near.
    fn composite_order(&self) -> Vec<Slot> {
        let mut keyed: Vec<(f64, Slot)> = Vec::new();
        if self.forest_mode {
            for (i, t) in self.forest.iter().enumerate() {
                keyed.push((t.depth_key(&self.space), Slot::Forest(i)));
            }
        } else if let Some(t) = &self.completed_single {
            keyed.push((t.depth_key(&self.space), Slot::Single));
        }
        for (i, t) in self.growing.iter().enumerate() {
            keyed.push((t.depth_key(&self.space), Slot::Growing(i)));
        }
        keyed.sort_by(|a, b| a.0.total_cmp(&b.0));
        keyed.into_iter().map(|(_, slot)| slot).collect()
    }

    fn draw_slot(&mut self, slot: Slot, report: &mut TickReport, done: &mut Vec<usize>) {
        let finished = match slot {
            Slot::Forest(i) => self.forest.get(i),
            Slot::Single => self.completed_single.as_ref(),
            Slot::Growing(i) => {
                let Some(tree) = self.growing.get_mut(i) else {
                    return;
                };
                if tree.advance() == GrowthStep::Finished {
                    done.push(i);
                }
                tree.draw(&mut self.live, &self.space);
                report.draw_order.push(DrawItem {
                    id: tree.id(),
                    kind: DrawKind::Growing,
                });
                return;
            }
        };
        if let Some(tree) = finished {
            tree.draw(&mut self.live, &self.space);
            report.draw_order.push(DrawItem {
                id: tree.id(),
                kind: DrawKind::Finished,
            });
        }
    }

    fn persist(&mut self, tree: FinishedTree) {
        if self.forest_mode {
            self.events.push(EngineEvent::ForestTreeAdded(tree.id()));
            self.forest.push(tree);
            self.static_layer.mark_dirty();
            return;
        }
        if self.opts.emit_snapshots {
            match card_for(&tree, &self.space, SystemTime::now()) {
                Ok(Some(card)) => self.events.push(EngineEvent::TreeFinished(card)),
                Ok(None) => {}
                Err(err) => tracing::warn!(id = tree.id().0, error = %err, "tree card failed"),
            }
        }
        self.completed_single = Some(tree);
    }

    fn repaint_static(&mut self) -> bool {
        let backdrop = match self.background_mode {
            BackgroundMode::Image => self.backdrop.as_ref(),
            BackgroundMode::Flat => None,
        };
        let forest: &[FinishedTree] = if self.forest_mode { &self.forest } else { &[] };
        let scene = StaticScene {
            space: &self.space,
            backdrop,
            flat: self.opts.background,
            overlay_alpha: self.opts.overlay_alpha,
            forest,
            depth_sorted: self.settings.depth_mode,
        };
        self.static_layer.repaint(&scene)
    }

    fn sync_background(&mut self) {
        let size = match (self.background_mode, &self.backdrop) {
            (BackgroundMode::Image, Some(backdrop)) => Some(backdrop.size()),
            _ => None,
        };
        self.space.set_image_size(size);
        self.normalize_anchors();
        self.static_layer.mark_dirty();
        self.request_frame();
    }

    /// Move canvas-space anchors into image space once an image is active.
    fn normalize_anchors(&mut self) {
        if !self.space.image_active() {
            return;
        }
        let space = &self.space;
        for tree in &mut self.growing {
            tree.set_anchor(space.upgrade_anchor(tree.anchor()));
        }
        for tree in &mut self.forest {
            tree.set_anchor(space.upgrade_anchor(tree.anchor()));
        }
        if let Some(tree) = self.completed_single.as_mut() {
            tree.set_anchor(space.upgrade_anchor(tree.anchor()));
        }
        self.last_anchor = self.last_anchor.map(|a| space.upgrade_anchor(a));
    }

    fn request_frame(&mut self) {
        if self.paused || self.loop_handle.is_some() {
            return;
        }
        self.loop_handle = Some(self.scheduler.schedule_next());
    }

    fn cancel_loop(&mut self) {
        if let Some(handle) = self.loop_handle.take() {
            self.scheduler.cancel(handle);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/engine/tree_engine.rs"]
mod tests;
