use rand::Rng;

use crate::assets::color::Rgb;
use crate::foundation::math::clamp_finite;

const DEPTH_RANGE: (u32, u32) = (1, 11);
const GROWTH_SPEED_RANGE: (f64, f64) = (0.5, 5.0);
const TREE_SCALE_RANGE: (f64, f64) = (0.2, 4.0);
const BRANCH_WIDTH_RANGE: (f64, f64) = (0.2, 5.0);
const LIGHT_INTENSITY_RANGE: (f64, f64) = (0.0, 1.0);
const RENDER_SCALE_RANGE: (f64, f64) = (0.02, 8.0);
const DEPTH_STRENGTH_RANGE: (f64, f64) = (0.0, 3.0);

const SEED_RANGE: std::ops::RangeInclusive<i64> = 1..=999_999_999;

/// How branch colors are chosen.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ColorMode {
    /// One configured color, shaded.
    Solid,
    /// Gradient start color at the root to end color at the top.
    #[default]
    Gradient,
    /// Like [`ColorMode::Gradient`], with the start color sampled from the background under
    /// the anchor at plant time.
    BaseGradient,
}

impl ColorMode {
    /// Parse a mode name; anything unrecognized is [`ColorMode::Gradient`].
    pub fn parse(s: &str) -> Self {
        match s.trim() {
            "solid" => Self::Solid,
            "baseGradient" => Self::BaseGradient,
            _ => Self::Gradient,
        }
    }

    /// Canonical name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Solid => "solid",
            Self::Gradient => "gradient",
            Self::BaseGradient => "baseGradient",
        }
    }
}

impl From<String> for ColorMode {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<ColorMode> for String {
    fn from(value: ColorMode) -> Self {
        value.as_str().to_owned()
    }
}

/// Settings copied into every tree at plant time.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TreeSettings {
    /// Levels grown and shown (1..=11).
    pub depth: u32,
    /// Growth frames added to each animating segment per tick.
    pub growth_speed: f64,
    /// Requested geometry scale, capped by headroom at plant time.
    pub tree_scale: f64,
    /// Stroke width multiplier.
    pub branch_width: f64,
    /// Color resolution mode.
    pub color_mode: ColorMode,
    /// Solid-mode color.
    pub color: Rgb,
    /// Gradient root color.
    pub gradient_start: Rgb,
    /// Gradient tip color.
    pub gradient_end: Rgb,
    /// Geometry seed; `None` grows a non-replayable tree.
    pub seed: Option<i64>,
    /// Light direction in degrees, `[0, 360)`.
    pub light_direction: f64,
    /// Shading strength, `[0, 1]`.
    pub light_intensity: f64,
    /// Base render scale applied to newly planted trees.
    pub render_scale: f64,
    /// Scale new trees by anchor height and depth-sort everything drawn.
    pub depth_mode: bool,
    /// How strongly depth mode shrinks far trees.
    pub depth_strength: f64,
}

impl Default for TreeSettings {
    fn default() -> Self {
        Self {
            depth: 10,
            growth_speed: 5.0,
            tree_scale: 1.0,
            branch_width: 2.7,
            color_mode: ColorMode::Gradient,
            color: Rgb::from_u8(0x2c, 0x7a, 0x2c),
            gradient_start: Rgb::from_u8(0x55, 0x2c, 0x22),
            gradient_end: Rgb::from_u8(0x6d, 0x30, 0xfd),
            seed: Some(1337),
            light_direction: 40.0,
            light_intensity: 0.5,
            render_scale: 1.0,
            depth_mode: false,
            depth_strength: 0.6,
        }
    }
}

/// Partial update for [`TreeSettings`]. `None` leaves a field untouched.
///
/// Colors are raw strings so malformed input can be rejected field by field.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SettingsPatch {
    /// See [`TreeSettings::depth`].
    pub depth: Option<u32>,
    /// See [`TreeSettings::growth_speed`].
    pub growth_speed: Option<f64>,
    /// See [`TreeSettings::tree_scale`].
    pub tree_scale: Option<f64>,
    /// See [`TreeSettings::branch_width`].
    pub branch_width: Option<f64>,
    /// Mode name; unknown names select gradient.
    pub color_mode: Option<String>,
    /// Hex color.
    pub color: Option<String>,
    /// Hex color.
    pub gradient_start: Option<String>,
    /// Hex color.
    pub gradient_end: Option<String>,
    /// `Some(None)` clears the seed.
    pub seed: Option<Option<i64>>,
    /// Degrees; wrapped into `[0, 360)`.
    pub light_direction: Option<f64>,
    /// See [`TreeSettings::light_intensity`].
    pub light_intensity: Option<f64>,
    /// See [`TreeSettings::render_scale`].
    pub render_scale: Option<f64>,
    /// See [`TreeSettings::depth_mode`].
    pub depth_mode: Option<bool>,
    /// See [`TreeSettings::depth_strength`].
    pub depth_strength: Option<f64>,
}

fn merge_clamped(field: &mut f64, value: Option<f64>, (min, max): (f64, f64)) {
    if let Some(v) = value.filter(|v| v.is_finite()) {
        *field = v.clamp(min, max);
    }
}

fn merge_color(field: &mut Rgb, value: Option<&str>, name: &str) {
    let Some(raw) = value else {
        return;
    };
    match Rgb::parse_hex(raw) {
        Some(c) => *field = c,
        None => tracing::debug!(field = name, value = raw, "ignoring malformed color"),
    }
}

fn wrap_degrees(deg: f64) -> f64 {
    let w = deg.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if w >= 360.0 { 0.0 } else { w }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Fresh seed in `1..=999_999_999`.
pub fn random_seed<R: Rng + ?Sized>(rng: &mut R) -> i64 {
    rng.gen_range(SEED_RANGE)
}

fn random_rgb<R: Rng + ?Sized>(rng: &mut R) -> Rgb {
    let v: u32 = rng.gen_range(0..0xff_ffff);
    Rgb::from_u8((v >> 16) as u8, (v >> 8) as u8, v as u8)
}

impl TreeSettings {
    /// Merge `patch` into these settings, clamping every numeric field to its range.
    pub fn apply(&mut self, patch: &SettingsPatch) {
        if let Some(depth) = patch.depth {
            self.depth = depth.clamp(DEPTH_RANGE.0, DEPTH_RANGE.1);
        }
        merge_clamped(&mut self.growth_speed, patch.growth_speed, GROWTH_SPEED_RANGE);
        merge_clamped(&mut self.tree_scale, patch.tree_scale, TREE_SCALE_RANGE);
        merge_clamped(&mut self.branch_width, patch.branch_width, BRANCH_WIDTH_RANGE);
        merge_clamped(&mut self.light_intensity, patch.light_intensity, LIGHT_INTENSITY_RANGE);
        merge_clamped(&mut self.render_scale, patch.render_scale, RENDER_SCALE_RANGE);
        merge_clamped(&mut self.depth_strength, patch.depth_strength, DEPTH_STRENGTH_RANGE);
        if let Some(dir) = patch.light_direction.filter(|d| d.is_finite()) {
            self.light_direction = wrap_degrees(dir);
        }
        if let Some(mode) = &patch.color_mode {
            self.color_mode = ColorMode::parse(mode);
        }
        merge_color(&mut self.color, patch.color.as_deref(), "color");
        merge_color(&mut self.gradient_start, patch.gradient_start.as_deref(), "gradientStart");
        merge_color(&mut self.gradient_end, patch.gradient_end.as_deref(), "gradientEnd");
        if let Some(seed) = patch.seed {
            self.seed = seed;
        }
        if let Some(depth_mode) = patch.depth_mode {
            self.depth_mode = depth_mode;
        }
    }

    /// Clamp every field into range. Used for settings loaded from files.
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        let fix = |v: f64, fallback: f64, (min, max): (f64, f64)| {
            if v.is_finite() { v.clamp(min, max) } else { fallback }
        };
        self.depth = self.depth.clamp(DEPTH_RANGE.0, DEPTH_RANGE.1);
        self.growth_speed = fix(self.growth_speed, defaults.growth_speed, GROWTH_SPEED_RANGE);
        self.tree_scale = fix(self.tree_scale, defaults.tree_scale, TREE_SCALE_RANGE);
        self.branch_width = fix(self.branch_width, defaults.branch_width, BRANCH_WIDTH_RANGE);
        self.light_intensity = fix(
            self.light_intensity,
            defaults.light_intensity,
            LIGHT_INTENSITY_RANGE,
        );
        self.render_scale = fix(self.render_scale, defaults.render_scale, RENDER_SCALE_RANGE);
        self.depth_strength = fix(self.depth_strength, defaults.depth_strength, DEPTH_STRENGTH_RANGE);
        self.light_direction = if self.light_direction.is_finite() {
            wrap_degrees(self.light_direction)
        } else {
            defaults.light_direction
        };
        self
    }

    /// Replace the shape, light and color fields with random values and draw a new seed.
    ///
    /// Render scale and depth settings are left alone.
    pub fn randomize<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.depth = rng.gen_range(3..=11);
        self.growth_speed = clamp_finite(round2(rng.gen_range(0.6..4.5)), 0.5, 5.0);
        self.tree_scale = clamp_finite(round2(rng.gen_range(0.5..3.5)), 0.2, 4.0);
        self.branch_width = clamp_finite(round2(rng.gen_range(0.3..4.0)), 0.2, 5.0);
        self.light_direction = f64::from(rng.gen_range(0..=359u32));
        self.light_intensity = clamp_finite(round2(rng.gen_range(0.1..1.0)), 0.0, 1.0);

        if rng.gen_bool(0.7) {
            self.color_mode = ColorMode::Gradient;
            self.gradient_start = random_rgb(rng);
            let mut end = random_rgb(rng);
            if end == self.gradient_start {
                end = random_rgb(rng);
            }
            self.gradient_end = end;
            self.color = random_rgb(rng);
        } else {
            let solid = random_rgb(rng);
            self.color_mode = ColorMode::Solid;
            self.color = solid;
            self.gradient_start = solid;
            self.gradient_end = solid;
        }
        self.seed = Some(random_seed(rng));
    }
}

#[cfg(test)]
#[path = "../../tests/unit/config/settings.rs"]
mod tests;
