//! Sapling grows procedural trees on a raster stage, one frame at a time.
//!
//! Clicking (planting) at a point builds a complete, deterministic branch structure up front and
//! then reveals it level by level over many ticks. Any number of trees can grow at once and
//! finished trees accumulate into a forest that is composited against an optional background
//! image.
//!
//! # Pipeline overview
//!
//! 1. **Resolve**: a canvas point becomes an [`Anchor`] (background-image UV when an image is
//!    active, canvas-relative UV otherwise) via [`CoordinateSpace`].
//! 2. **Generate**: [`generate`] expands a seed into an immutable [`BranchStructure`] using the
//!    replayable [`TreeRng`].
//! 3. **Grow**: [`TreeEngine::tick`] advances every [`GrowingTree`] and composites finished and
//!    growing trees in depth order.
//! 4. **Export**: [`snapshot_transparent`] crops a finished tree into a transparent card image.
//!
//! Design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Deterministic-by-seed**: identical seed and settings reproduce identical geometry.
//! - **Host-driven**: the engine never sleeps or spawns threads; a [`FrameScheduler`] decides
//!   when the next tick happens.
//! - **Premultiplied RGBA8** for every surface the engine exposes.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod assets;
mod config;
mod engine;
mod export;
mod foundation;
mod growth;
mod random;
mod render;
mod shading;
mod space;
mod structure;

pub use assets::backdrop::Backdrop;
pub use assets::color::Rgb;
pub use config::settings::{ColorMode, SettingsPatch, TreeSettings, random_seed};
pub use engine::scheduler::{
    Clock, FrameHandle, FrameScheduler, ManualClock, ManualScheduler, SystemClock,
};
pub use engine::static_layer::StaticLayer;
pub use engine::tree_engine::{
    BackgroundMode, DrawItem, DrawKind, EngineEvent, EngineOpts, TickOutcome, TickReport,
    TreeEngine,
};
pub use export::snapshot::{TreeFinished, encode_png, snapshot_transparent};
pub use foundation::core::{Affine, Point, Rect, Stage, TreeId, Vec2};
pub use foundation::error::{SaplingError, SaplingResult};
pub use growth::tree::{FinishedTree, GrowingTree, GrowthStep, STUCK_TREE_TIMEOUT};
pub use random::sequence::{SeededSequence, TreeRng, sequence_len};
pub use render::backend::{FrameRGBA, PaintSurface};
pub use render::cpu::CpuSurface;
pub use render::tree::{Placement, TreeLook};
pub use shading::model::{
    StrokeStyle, apply_shading, color_at_y, depth_scale_for_uv, shade_factor, stroke_style_for,
};
pub use space::cover::{Anchor, CoordinateSpace, CoverTransform, depth_sort_key};
pub use structure::branch::{
    Branch, BranchStructure, FRAMES_PER_SEGMENT, FULL_DEPTH, Segment, clamp_tree_scale, generate,
};
