//! Column state and per-frame advance for the digital rain.
//!
//! The field is pure simulation: it owns the column positions and emits
//! glyph draw commands through a visitor, leaving canvas work to the
//! caller. Randomness comes in as a closure yielding [0, 1) and time as
//! plain milliseconds, so the whole thing runs under host `cargo test`.

use crate::charset;
use crate::profile::RainTuning;

/// Cells of trail drawn above the head (head + secondary + 6 fading).
pub const TRAIL_CELLS: usize = 8;

/// Off-screen columns respawn to a random offset in (-RESPAWN_BAND, 0].
const RESPAWN_BAND: f64 = 200.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GlyphKind {
    /// Bright white head with the strongest glow.
    Head,
    /// One cell above the head, dimmer, lighter glow.
    Secondary,
    /// Fading tail, no glow.
    Trail { opacity: f64 },
}

#[derive(Clone, Copy, Debug)]
pub struct Glyph {
    pub x: f64,
    pub y: f64,
    pub ch: char,
    pub kind: GlyphKind,
}

/// Exactly `floor(width / (glyph_size * spacing))` columns fit a viewport.
pub fn column_count(width: f64, tuning: &RainTuning) -> usize {
    (width / (tuning.glyph_size * tuning.column_spacing)).floor() as usize
}

pub struct RainField {
    tuning: RainTuning,
    width: f64,
    height: f64,
    /// Head position per column; negative means not yet entered.
    columns: Vec<f64>,
    rebuilds: u32,
}

impl RainField {
    pub fn new(
        tuning: RainTuning,
        width: f64,
        height: f64,
        rng: &mut impl FnMut() -> f64,
    ) -> Self {
        let mut field = Self {
            tuning,
            width,
            height,
            columns: Vec::new(),
            rebuilds: 0,
        };
        field.rebuild(width, height, rng);
        field
    }

    /// Recomputes the column count for the new viewport and resets every
    /// column to a random negative offset, staggering re-entry. The
    /// collection is always rebuilt whole; per-column state from before
    /// a resize never survives.
    pub fn rebuild(&mut self, width: f64, height: f64, rng: &mut impl FnMut() -> f64) {
        self.width = width;
        self.height = height;
        let count = column_count(width, &self.tuning);
        self.columns.clear();
        self.columns.extend((0..count).map(|_| rng() * -height));
        self.rebuilds += 1;
    }

    pub fn columns(&self) -> &[f64] {
        &self.columns
    }

    pub fn rebuild_count(&self) -> u32 {
        self.rebuilds
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    /// Advances every column one frame and emits the glyphs to draw.
    ///
    /// Glyphs are re-picked from the pool on every frame, trail included,
    /// which is what makes the tails flicker.
    pub fn step(
        &mut self,
        pool: &[char],
        rng: &mut impl FnMut() -> f64,
        mut put: impl FnMut(Glyph),
    ) {
        let g = self.tuning.glyph_size;
        let cell_w = g * self.tuning.column_spacing;
        let base_step = g * self.tuning.speed;

        for (i, y) in self.columns.iter_mut().enumerate() {
            let x = i as f64 * cell_w;

            // Not yet on screen: advance silently.
            if *y < 0.0 {
                *y += base_step;
                continue;
            }

            put(Glyph {
                x,
                y: *y,
                ch: charset::pick(pool, rng),
                kind: GlyphKind::Head,
            });
            put(Glyph {
                x,
                y: *y - g,
                ch: charset::pick(pool, rng),
                kind: GlyphKind::Secondary,
            });
            for t in 2..TRAIL_CELLS {
                let trail_y = *y - g * t as f64;
                if trail_y < 0.0 {
                    break;
                }
                let opacity = 1.0 - t as f64 / TRAIL_CELLS as f64;
                put(Glyph {
                    x,
                    y: trail_y,
                    ch: charset::pick(pool, rng),
                    kind: GlyphKind::Trail { opacity },
                });
            }

            if *y > self.height + g * TRAIL_CELLS as f64 {
                // Fully off screen, trail included. Respawn is
                // probabilistic so columns do not restart in lockstep.
                if rng() > 0.95 {
                    *y = rng() * -RESPAWN_BAND;
                }
            } else {
                // Per-frame jitter keeps fall speed visually uneven.
                *y += base_step * (0.8 + rng() * 0.4);
            }
        }
    }
}
