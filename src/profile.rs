//! Tuning tables for the two device classes.
//!
//! The constrained profile trades visual density for battery: fewer
//! particles, coarser frame intervals, smaller glow radii, and no
//! particle-connection pass.

/// Backing-store scale is capped so high-DPR screens do not allocate
/// 3x/4x canvases for a decorative background.
pub const DPR_CAP: f64 = 2.0;

/// Quiet period for coalescing bursts of resize events.
pub const RESIZE_DEBOUNCE_MS: i32 = 200;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Profile {
    Desktop,
    Constrained,
}

#[derive(Clone, Copy, Debug)]
pub struct RainTuning {
    /// Glyph cell size in CSS pixels (font size and vertical cell step).
    pub glyph_size: f64,
    /// Horizontal cell width as a multiple of `glyph_size`.
    pub column_spacing: f64,
    /// Base fall speed in cells per rendered frame.
    pub speed: f64,
    /// Alpha of the black overpaint that produces fading trails.
    /// Lower alpha leaves longer trails.
    pub fade_alpha: f64,
    /// Shadow blur radius of the head glyph.
    pub glow: f64,
    /// Minimum time between rendered frames.
    pub frame_interval_ms: f64,
}

#[derive(Clone, Copy, Debug)]
pub struct ParticleTuning {
    pub particle_count: usize,
    /// Hard cap on concurrently live sparks.
    pub spark_cap: usize,
    pub frame_interval_ms: f64,
    /// Pair-connection distance threshold in CSS pixels.
    pub connect_radius: f64,
    /// The O(n^2) connection pass only runs on the desktop profile.
    pub draw_connections: bool,
}

const RAIN_DESKTOP: RainTuning = RainTuning {
    glyph_size: 18.0,
    column_spacing: 1.0,
    speed: 1.0,
    fade_alpha: 0.05,
    glow: 20.0,
    frame_interval_ms: 33.0,
};

const RAIN_CONSTRAINED: RainTuning = RainTuning {
    glyph_size: 14.0,
    column_spacing: 1.2,
    speed: 0.8,
    fade_alpha: 0.08,
    glow: 8.0,
    frame_interval_ms: 50.0,
};

const PARTICLES_DESKTOP: ParticleTuning = ParticleTuning {
    particle_count: 120,
    spark_cap: 30,
    frame_interval_ms: 25.0,
    connect_radius: 150.0,
    draw_connections: true,
};

const PARTICLES_CONSTRAINED: ParticleTuning = ParticleTuning {
    particle_count: 50,
    spark_cap: 30,
    frame_interval_ms: 40.0,
    connect_radius: 150.0,
    draw_connections: false,
};

const MOBILE_UA_TOKENS: [&str; 6] = [
    "android",
    "iphone",
    "ipad",
    "ipod",
    "opera mini",
    "iemobile",
];

impl Profile {
    pub fn from_user_agent(ua: &str) -> Profile {
        if is_mobile_user_agent(ua) {
            Profile::Constrained
        } else {
            Profile::Desktop
        }
    }

    pub fn rain(self) -> &'static RainTuning {
        match self {
            Profile::Desktop => &RAIN_DESKTOP,
            Profile::Constrained => &RAIN_CONSTRAINED,
        }
    }

    pub fn particles(self) -> &'static ParticleTuning {
        match self {
            Profile::Desktop => &PARTICLES_DESKTOP,
            Profile::Constrained => &PARTICLES_CONSTRAINED,
        }
    }
}

pub fn is_mobile_user_agent(ua: &str) -> bool {
    let ua = ua.to_ascii_lowercase();
    MOBILE_UA_TOKENS.iter().any(|tok| ua.contains(tok))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iphone_ua_selects_constrained() {
        let ua = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X)";
        assert_eq!(Profile::from_user_agent(ua), Profile::Constrained);
    }

    #[test]
    fn desktop_ua_selects_desktop() {
        let ua = "Mozilla/5.0 (X11; Linux x86_64) Gecko/20100101 Firefox/121.0";
        assert_eq!(Profile::from_user_agent(ua), Profile::Desktop);
    }

    #[test]
    fn connection_pass_disabled_on_constrained() {
        assert!(Profile::Desktop.particles().draw_connections);
        assert!(!Profile::Constrained.particles().draw_connections);
    }
}
