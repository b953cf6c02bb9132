//! Ambient particle, spark, and glow-blob simulation.
//!
//! Same contract as [`crate::rain`]: pure state plus visitor-style draw
//! callbacks, with randomness and timestamps injected by the caller.

use crate::profile::ParticleTuning;

/// Particles wrap to the opposite edge once they drift this far outside
/// the viewport; they are never destroyed.
pub const WRAP_MARGIN: f64 = 10.0;

/// Spark velocity decays by this factor every frame.
pub const SPARK_DAMPING: f64 = 0.98;

/// Slow sinusoidal glow blobs drawn behind everything else.
pub const AMBIENT_BLOBS: usize = 3;

#[derive(Clone, Copy, Debug)]
pub struct Particle {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub vx: f64,
    pub vy: f64,
    /// Base opacity; the drawn value oscillates with the pulse phase.
    pub opacity: f64,
    pub pulse: f64,
    pub pulse_speed: f64,
    /// Green-to-cyan range, degrees.
    pub hue: f64,
}

#[derive(Clone, Copy, Debug)]
pub struct Spark {
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    pub age: f64,
    pub max_life: f64,
    pub radius: f64,
}

pub struct ParticleField {
    tuning: ParticleTuning,
    width: f64,
    height: f64,
    particles: Vec<Particle>,
    sparks: Vec<Spark>,
    rebuilds: u32,
}

impl ParticleField {
    pub fn new(
        tuning: ParticleTuning,
        width: f64,
        height: f64,
        rng: &mut impl FnMut() -> f64,
    ) -> Self {
        let mut field = Self {
            tuning,
            width,
            height,
            particles: Vec::new(),
            sparks: Vec::new(),
            rebuilds: 0,
        };
        field.rebuild(width, height, rng);
        field
    }

    /// Regenerates the particle batch for the new viewport and drops all
    /// sparks (they are ephemeral and respawn on their own).
    pub fn rebuild(&mut self, width: f64, height: f64, rng: &mut impl FnMut() -> f64) {
        self.width = width;
        self.height = height;
        self.particles.clear();
        self.particles
            .extend((0..self.tuning.particle_count).map(|_| spawn_particle(width, height, rng)));
        self.sparks.clear();
        self.rebuilds += 1;
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn sparks(&self) -> &[Spark] {
        &self.sparks
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

    /// Rolls the per-frame spawn chance and, under the population cap,
    /// adds one spark at a random position with random velocity.
    pub fn maybe_spawn_spark(&mut self, rng: &mut impl FnMut() -> f64) {
        if rng() <= 0.9 {
            return;
        }
        if self.sparks.len() >= self.tuning.spark_cap {
            return;
        }
        self.sparks.push(Spark {
            x: rng() * self.width,
            y: rng() * self.height,
            vx: (rng() - 0.5) * 4.0,
            vy: (rng() - 0.5) * 4.0,
            age: 1.0,
            max_life: 60.0 + rng() * 60.0,
            radius: rng() * 2.0 + 1.0,
        });
    }

    /// Integrates, damps and ages every spark. A spark whose remaining
    /// life ratio reaches zero is removed without being drawn; live ones
    /// are passed to `draw` with their ratio.
    pub fn step_sparks(&mut self, mut draw: impl FnMut(&Spark, f64)) {
        self.sparks.retain_mut(|s| {
            s.x += s.vx;
            s.y += s.vy;
            s.age += 1.0;
            s.vx *= SPARK_DAMPING;
            s.vy *= SPARK_DAMPING;
            let life = 1.0 - s.age / s.max_life;
            if life <= 0.0 {
                return false;
            }
            draw(s, life);
            true
        });
    }

    /// Drifts every particle, wrapping at the viewport margin, and hands
    /// it to `draw` with its pulsed opacity for this frame.
    pub fn step_particles(&mut self, mut draw: impl FnMut(&Particle, f64)) {
        let (w, h) = (self.width, self.height);
        for p in &mut self.particles {
            p.x += p.vx;
            p.y += p.vy;
            p.pulse += p.pulse_speed;

            if p.x < -WRAP_MARGIN {
                p.x = w + WRAP_MARGIN;
            }
            if p.x > w + WRAP_MARGIN {
                p.x = -WRAP_MARGIN;
            }
            if p.y < -WRAP_MARGIN {
                p.y = h + WRAP_MARGIN;
            }
            if p.y > h + WRAP_MARGIN {
                p.y = -WRAP_MARGIN;
            }

            let opacity = p.opacity * (0.5 + 0.5 * p.pulse.sin());
            draw(p, opacity);
        }
    }

    /// Emits one line per particle pair closer than the connect radius,
    /// with alpha falling off linearly with distance. Pairwise scan;
    /// fine while the particle count stays in the tens. Skipped entirely
    /// on the constrained profile.
    pub fn connections(&self, mut draw: impl FnMut(f64, f64, f64, f64, f64)) {
        if !self.tuning.draw_connections {
            return;
        }
        let reach = self.tuning.connect_radius;
        for i in 0..self.particles.len() {
            for j in (i + 1)..self.particles.len() {
                let a = &self.particles[i];
                let b = &self.particles[j];
                let dx = a.x - b.x;
                let dy = a.y - b.y;
                let dist = (dx * dx + dy * dy).sqrt();
                if dist < reach {
                    let alpha = (1.0 - dist / reach) * 0.15;
                    draw(a.x, a.y, b.x, b.y, alpha);
                }
            }
        }
    }
}

fn spawn_particle(width: f64, height: f64, rng: &mut impl FnMut() -> f64) -> Particle {
    Particle {
        x: rng() * width,
        y: rng() * height,
        radius: rng() * 3.0 + 1.0,
        vx: (rng() - 0.5) * 0.5,
        vy: (rng() - 0.5) * 0.5 - 0.3,
        opacity: rng() * 0.7 + 0.3,
        pulse: rng() * std::f64::consts::TAU,
        pulse_speed: rng() * 0.03 + 0.01,
        hue: 120.0 + rng() * 40.0,
    }
}

/// Position and radius of one ambient glow blob at the given timestamp.
/// Each blob follows an independent sinusoidal path across the viewport.
pub fn ambient_blob(index: usize, timestamp_ms: f64, width: f64, height: f64) -> (f64, f64, f64) {
    let time = timestamp_ms * 0.0003 + index as f64 * 2.0;
    let x = (time.sin() * 0.4 + 0.5) * width;
    let y = ((time * 0.7).cos() * 0.4 + 0.5) * height;
    let radius = 200.0 + (time * 2.0).sin() * 50.0;
    (x, y, radius)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::Profile;

    fn fixed(v: f64) -> impl FnMut() -> f64 {
        move || v
    }

    #[test]
    fn rebuild_fills_the_batch_and_clears_sparks() {
        let mut rng = fixed(0.95);
        let mut field =
            ParticleField::new(*Profile::Desktop.particles(), 1280.0, 720.0, &mut rng);
        assert_eq!(field.particles().len(), 120);

        field.maybe_spawn_spark(&mut rng);
        assert_eq!(field.sparks().len(), 1);

        field.rebuild(800.0, 600.0, &mut rng);
        assert_eq!(field.particles().len(), 120);
        assert!(field.sparks().is_empty());
        assert_eq!(field.rebuild_count(), 2);
    }

    #[test]
    fn constrained_profile_carries_fewer_particles() {
        let mut rng = fixed(0.5);
        let field =
            ParticleField::new(*Profile::Constrained.particles(), 375.0, 667.0, &mut rng);
        assert_eq!(field.particles().len(), 50);
    }

    #[test]
    fn spark_population_never_exceeds_the_cap() {
        let mut rng = fixed(0.95);
        let mut field =
            ParticleField::new(*Profile::Desktop.particles(), 1280.0, 720.0, &mut rng);
        for _ in 0..200 {
            field.maybe_spawn_spark(&mut rng);
            assert!(field.sparks().len() <= 30);
        }
        assert_eq!(field.sparks().len(), 30);
    }

    #[test]
    fn spawn_gate_below_threshold_adds_nothing() {
        let mut rng = fixed(0.5);
        let mut field =
            ParticleField::new(*Profile::Desktop.particles(), 1280.0, 720.0, &mut rng);
        for _ in 0..50 {
            field.maybe_spawn_spark(&mut rng);
        }
        assert!(field.sparks().is_empty());
    }

    #[test]
    fn spark_is_removed_exactly_at_life_expiry() {
        let mut rng = fixed(0.95);
        let mut field =
            ParticleField::new(*Profile::Desktop.particles(), 1280.0, 720.0, &mut rng);
        field.maybe_spawn_spark(&mut rng);
        let max_life = field.sparks()[0].max_life; // 60 + 0.95 * 60 = 117
        assert_eq!(max_life, 117.0);

        // Age starts at 1 and gains 1 per frame; the spark must survive
        // every frame where age < max_life and vanish on the frame age
        // reaches it.
        let mut frames = 0;
        while !field.sparks().is_empty() {
            field.step_sparks(|_, life| assert!(life > 0.0));
            frames += 1;
            assert!(frames < 1000, "spark never expired");
        }
        assert_eq!(frames as f64, max_life - 1.0);
    }

    #[test]
    fn spark_velocity_damps_each_frame() {
        let mut rng = fixed(0.95);
        let mut field =
            ParticleField::new(*Profile::Desktop.particles(), 1280.0, 720.0, &mut rng);
        field.maybe_spawn_spark(&mut rng);
        let v0 = field.sparks()[0].vx;
        field.step_sparks(|_, _| {});
        assert!((field.sparks()[0].vx - v0 * SPARK_DAMPING).abs() < 1e-12);
    }

    #[test]
    fn particles_wrap_instead_of_dying() {
        let mut rng = fixed(0.5);
        let mut field =
            ParticleField::new(*Profile::Desktop.particles(), 200.0, 100.0, &mut rng);
        let count = field.particles().len();

        field.particles[0].x = 200.0 + WRAP_MARGIN + 0.5;
        field.particles[0].vx = 1.0;
        field.particles[0].y = 50.0;
        field.particles[0].vy = 0.0;
        field.step_particles(|_, _| {});
        assert_eq!(field.particles()[0].x, -WRAP_MARGIN);

        field.particles[0].x = -WRAP_MARGIN - 0.5;
        field.particles[0].vx = -1.0;
        field.step_particles(|_, _| {});
        assert_eq!(field.particles()[0].x, 200.0 + WRAP_MARGIN);

        assert_eq!(field.particles().len(), count);
    }

    #[test]
    fn pulsed_opacity_oscillates_within_the_base_bound() {
        let mut rng = fixed(0.5);
        let mut field =
            ParticleField::new(*Profile::Desktop.particles(), 400.0, 300.0, &mut rng);
        for _ in 0..100 {
            field.step_particles(|p, opacity| {
                assert!(opacity >= 0.0);
                assert!(opacity <= p.opacity + 1e-12);
            });
        }
    }

    #[test]
    fn connection_alpha_falls_off_with_distance() {
        let mut rng = fixed(0.5);
        let mut field =
            ParticleField::new(*Profile::Desktop.particles(), 1000.0, 1000.0, &mut rng);
        field.particles.truncate(3);
        field.particles[0].x = 0.0;
        field.particles[0].y = 0.0;
        field.particles[1].x = 90.0;
        field.particles[1].y = 0.0;
        field.particles[2].x = 500.0;
        field.particles[2].y = 500.0;

        let mut lines = Vec::new();
        field.connections(|x1, y1, x2, y2, alpha| lines.push((x1, y1, x2, y2, alpha)));
        assert_eq!(lines.len(), 1);
        let expected = (1.0 - 90.0 / 150.0) * 0.15;
        assert!((lines[0].4 - expected).abs() < 1e-12);
    }

    #[test]
    fn connection_pass_is_skipped_on_constrained_profile() {
        let mut rng = fixed(0.5);
        let mut field =
            ParticleField::new(*Profile::Constrained.particles(), 100.0, 100.0, &mut rng);
        // Stack two particles on top of each other; still no lines.
        field.particles[0].x = 10.0;
        field.particles[0].y = 10.0;
        field.particles[1].x = 11.0;
        field.particles[1].y = 10.0;
        let mut called = false;
        field.connections(|_, _, _, _, _| called = true);
        assert!(!called);
    }

    #[test]
    fn ambient_blobs_stay_inside_the_viewport_band() {
        for i in 0..AMBIENT_BLOBS {
            for step in 0..200 {
                let ts = step as f64 * 137.0;
                let (x, y, r) = ambient_blob(i, ts, 1280.0, 720.0);
                assert!((0.1 * 1280.0..=0.9 * 1280.0).contains(&x));
                assert!((0.1 * 720.0..=0.9 * 720.0).contains(&y));
                assert!((150.0..=250.0).contains(&r));
            }
        }
    }
}
