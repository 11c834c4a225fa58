use crate::foundation::core::Point;
use crate::foundation::math::deg_to_rad;
use crate::random::sequence::TreeRng;

/// Structural recursion limit; geometry is always generated this deep.
pub const FULL_DEPTH: usize = 11;

/// Normalized draw duration of one segment, in growth frames.
pub const FRAMES_PER_SEGMENT: f64 = 100.0;

const TRUNK_LEN: (f64, f64) = (10.0, 13.0);
const BRANCH_LEN: (f64, f64) = (0.0, 11.0);
const SPLIT_ANGLE: (f64, f64) = (15.0, 23.0);
const TRUNK_ANGLE_DEG: f64 = -90.0;

const MIN_HEADROOM_PX: f64 = 24.0;
const MIN_TREE_SCALE: f64 = 0.15;

/// Immutable geometry of one branch segment, in planting (object) coordinates.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Branch {
    /// Segment start.
    pub start: Point,
    /// Segment end.
    pub end: Point,
    /// Midpoint, used as the shading sample position.
    pub mid: Point,
    /// Stroke width before render scaling.
    pub line_width: f64,
}

impl Branch {
    fn new(start: Point, end: Point, line_width: f64) -> Self {
        Self {
            start,
            end,
            mid: start.midpoint(end),
            line_width,
        }
    }

    /// Point reached after drawing `progress` (0..=1) of the segment.
    pub fn point_at(&self, progress: f64) -> Point {
        self.start.lerp(self.end, progress.clamp(0.0, 1.0))
    }
}

/// A branch plus its growth progress.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Segment {
    /// Geometry.
    pub branch: Branch,
    /// Growth frames elapsed; only ever increases.
    pub frames_elapsed: f64,
    /// Growth frames until complete.
    pub frames_total: f64,
}

impl Segment {
    fn new(branch: Branch) -> Self {
        Self {
            branch,
            frames_elapsed: 0.0,
            frames_total: FRAMES_PER_SEGMENT,
        }
    }

    /// Complete iff `frames_elapsed >= frames_total`.
    pub fn is_complete(&self) -> bool {
        self.frames_elapsed >= self.frames_total
    }

    /// Fraction drawn, in `[0, 1]`.
    pub fn progress(&self) -> f64 {
        if self.frames_total <= 0.0 {
            return 1.0;
        }
        (self.frames_elapsed / self.frames_total).clamp(0.0, 1.0)
    }

    /// Advance by `frames` (negative or non-finite amounts are ignored).
    pub fn advance(&mut self, frames: f64) {
        if !frames.is_finite() || frames <= 0.0 || self.is_complete() {
            return;
        }
        self.frames_elapsed = (self.frames_elapsed + frames).min(self.frames_total);
    }

    pub(crate) fn complete(&mut self) {
        self.frames_elapsed = self.frames_total;
    }
}

/// Fully generated tree geometry: `FULL_DEPTH` levels, level `d` holding up to `2^d` segments.
#[derive(Clone, Debug, PartialEq)]
pub struct BranchStructure {
    levels: Vec<Vec<Segment>>,
    tree_top: f64,
}

impl BranchStructure {
    /// All levels, root first. Always `FULL_DEPTH` entries.
    pub fn levels(&self) -> &[Vec<Segment>] {
        &self.levels
    }

    pub(crate) fn levels_mut(&mut self) -> &mut [Vec<Segment>] {
        &mut self.levels
    }

    /// Segments at `depth`, empty past the structure.
    pub fn level(&self, depth: usize) -> &[Segment] {
        self.levels.get(depth).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Smallest Y reached by any generated point.
    pub fn tree_top(&self) -> f64 {
        self.tree_top
    }

    /// The single level-0 segment.
    pub fn trunk(&self) -> Option<&Segment> {
        self.levels.first().and_then(|l| l.first())
    }

    /// Geometry of the first `depth` levels, progress stripped.
    pub fn geometry(&self, depth: usize) -> Vec<Vec<Branch>> {
        self.levels
            .iter()
            .take(depth)
            .map(|level| level.iter().map(|s| s.branch).collect())
            .collect()
    }

    /// Total segments across all levels.
    pub fn segment_count(&self) -> usize {
        self.levels.iter().map(Vec::len).sum()
    }
}

/// Cap a requested scale so the full structure cannot leave the top of the stage.
///
/// Headroom is the anchor's distance from the top (at least 24 px); the cap never drops
/// below 0.15.
pub fn clamp_tree_scale(requested: f64, anchor_y: f64) -> f64 {
    let headroom = anchor_y.floor().max(MIN_HEADROOM_PX);
    let max_scale = headroom / (13.0 * FULL_DEPTH as f64);
    requested.min(max_scale.max(MIN_TREE_SCALE))
}

struct Grower<'a> {
    rng: &'a mut TreeRng,
    tree_scale: f64,
    branch_width: f64,
    levels: Vec<Vec<Segment>>,
    tree_top: f64,
}

impl Grower<'_> {
    fn grow(&mut self, start: Point, angle_deg: f64, depth: usize) {
        if depth == FULL_DEPTH {
            return;
        }
        let (lo, hi) = if depth == 0 { TRUNK_LEN } else { BRANCH_LEN };
        let len = self.rng.next(lo, hi) * self.tree_scale;
        let factor = (FULL_DEPTH - depth) as f64;
        let rad = deg_to_rad(angle_deg);
        let end = Point::new(
            start.x + rad.cos() * len * factor,
            start.y + rad.sin() * len * factor,
        );

        self.tree_top = self.tree_top.min(start.y).min(end.y);
        self.levels[depth].push(Segment::new(Branch::new(
            start,
            end,
            factor * self.branch_width,
        )));

        // Draw order matters for replay: left angle, left subtree, then right angle.
        let left = angle_deg - self.rng.next(SPLIT_ANGLE.0, SPLIT_ANGLE.1);
        self.grow(end, left, depth + 1);
        let right = angle_deg + self.rng.next(SPLIT_ANGLE.0, SPLIT_ANGLE.1);
        self.grow(end, right, depth + 1);
    }
}

/// Build the complete branch structure rooted at `origin`.
///
/// `tree_scale` must already be clamped (see [`clamp_tree_scale`]). Geometry is a pure function
/// of the inputs and the values drawn from `rng`.
#[tracing::instrument(level = "debug", skip(rng))]
pub fn generate(
    origin: Point,
    tree_scale: f64,
    branch_width: f64,
    rng: &mut TreeRng,
) -> BranchStructure {
    let mut grower = Grower {
        rng,
        tree_scale,
        branch_width,
        levels: vec![Vec::new(); FULL_DEPTH],
        tree_top: f64::INFINITY,
    };
    grower.grow(origin, TRUNK_ANGLE_DEG, 0);
    BranchStructure {
        levels: grower.levels,
        tree_top: grower.tree_top,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/structure/branch.rs"]
mod tests;
