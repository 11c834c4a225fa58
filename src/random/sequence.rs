use rand::{Rng, SeedableRng, rngs::StdRng};

const LCG_MULTIPLIER: i128 = 16807;
const LCG_MODULUS: i128 = 2_147_483_647;
const LCG_SCALE: f64 = 2_147_483_646.0;

const MIN_SEQUENCE_LEN: usize = 10_000;
const MAX_SEQUENCE_LEN: usize = 50_000;

/// Consumption ratio past which a diagnostic is logged.
const WARN_RATIO: f64 = 0.8;

/// Sequence length sized to expected consumption for a tree of `depth` display levels and
/// requested `tree_scale`: `clamp(10000 * 2^depth * scale * 2 / 10, 10000, 50000)`, rounded up.
pub fn sequence_len(depth: u32, tree_scale: f64) -> usize {
    let raw = (10_000.0 * 2f64.powi(depth.min(30) as i32) * tree_scale * 2.0) / 10.0;
    let raw = if raw.is_finite() { raw } else { 0.0 };
    let clamped = raw.clamp(MIN_SEQUENCE_LEN as f64, MAX_SEQUENCE_LEN as f64);
    clamped.ceil() as usize
}

fn fill_lcg(seed: i64, len: usize) -> Vec<f64> {
    let mut s = i128::from(seed);
    let mut out = Vec::with_capacity(len);
    for _ in 0..len {
        s = (s * LCG_MULTIPLIER) % LCG_MODULUS;
        out.push(((s - 1) as f64) / LCG_SCALE);
    }
    out
}

/// Replayable Park–Miller sequence with cursor-offset regeneration on exhaustion.
#[derive(Clone, Debug)]
pub struct SeededSequence {
    seed: i64,
    values: Vec<f64>,
    cursor: usize,
    regenerations: u32,
    warned: bool,
}

impl SeededSequence {
    /// Precompute `len` values from `seed`.
    pub fn new(seed: i64, len: usize) -> Self {
        let len = len.max(1);
        Self {
            seed,
            values: fill_lcg(seed, len),
            cursor: 0,
            regenerations: 0,
            warned: false,
        }
    }

    /// The seed the first sequence was generated from.
    pub fn seed(&self) -> i64 {
        self.seed
    }

    /// Values consumed from the current sequence.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Length of every generated sequence.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always false; sequences hold at least one value.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// How many times the sequence has been regenerated after exhaustion.
    pub fn regenerations(&self) -> u32 {
        self.regenerations
    }

    /// Next raw value in `[0, 1)`.
    pub fn next_unit(&mut self) -> f64 {
        if self.cursor >= self.values.len() {
            self.regenerate();
        }
        if !self.warned && (self.cursor as f64) > (self.values.len() as f64) * WARN_RATIO {
            self.warned = true;
            tracing::warn!(
                used = self.cursor,
                len = self.values.len(),
                "tree random sequence is over 80% consumed"
            );
        }
        let v = self.values[self.cursor];
        self.cursor += 1;
        v
    }

    // The new sequence is seeded from the original seed offset by the consumed count, not
    // from where the old sequence left off. Saved seeds depend on this.
    fn regenerate(&mut self) {
        let offset_seed = self.seed.wrapping_add(self.cursor as i64);
        tracing::debug!(
            used = self.cursor,
            len = self.values.len(),
            "regenerating tree random sequence"
        );
        self.values = fill_lcg(offset_seed, self.values.len());
        self.cursor = 0;
        self.regenerations += 1;
        self.warned = false;
    }
}

/// Per-tree random source: a replayable sequence when seeded, OS entropy otherwise.
#[derive(Clone, Debug)]
pub enum TreeRng {
    /// Deterministic Park–Miller sequence.
    Seeded(SeededSequence),
    /// Non-deterministic fallback used when no seed is configured.
    Entropy(StdRng),
}

impl TreeRng {
    /// Build the random source for a tree planted with the given settings.
    pub fn for_tree(seed: Option<i64>, depth: u32, tree_scale: f64) -> Self {
        match seed {
            Some(seed) => {
                let len = sequence_len(depth, tree_scale);
                tracing::debug!(seed, len, depth, tree_scale, "seeded tree sequence");
                Self::Seeded(SeededSequence::new(seed, len))
            }
            None => Self::Entropy(StdRng::from_entropy()),
        }
    }

    /// `min + r * (max - min)` with `r` drawn from the underlying source.
    pub fn next(&mut self, min: f64, max: f64) -> f64 {
        match self {
            Self::Seeded(seq) => min + seq.next_unit() * (max - min),
            Self::Entropy(rng) => rng.r#gen::<f64>() * (max - min) + min,
        }
    }

    /// Current cursor into the seeded sequence (`None` when unseeded).
    pub fn cursor(&self) -> Option<usize> {
        match self {
            Self::Seeded(seq) => Some(seq.cursor()),
            Self::Entropy(_) => None,
        }
    }

    /// Whether geometry drawn from this source is replayable.
    pub fn is_deterministic(&self) -> bool {
        matches!(self, Self::Seeded(_))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/random/sequence.rs"]
mod tests;
