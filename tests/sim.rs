//! Host-side integration run: drives both simulation fields through a
//! long randomized session and checks the invariants that must hold at
//! every frame.

#![cfg(not(target_arch = "wasm32"))]

use neonstage::charset;
use neonstage::particles::{ParticleField, WRAP_MARGIN};
use neonstage::profile::Profile;
use neonstage::rain::{self, RainField, TRAIL_CELLS};

/// Deterministic [0, 1) stream; splitmix-style so runs are repeatable.
fn lcg(mut seed: u64) -> impl FnMut() -> f64 {
    move || {
        seed = seed
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (seed >> 11) as f64 / (1u64 << 53) as f64
    }
}

#[test]
fn rain_session_keeps_column_invariants() {
    let tuning = *Profile::Desktop.rain();
    let pool = charset::glyph_pool();
    let mut rng = lcg(7);
    let (w, h) = (1280.0, 720.0);
    let mut field = RainField::new(tuning, w, h, &mut rng);
    assert_eq!(field.columns().len(), rain::column_count(w, &tuning));
    assert_eq!(field.columns().len(), 71);

    let respawn_floor = -200.0;
    let exit = h + tuning.glyph_size * TRAIL_CELLS as f64;
    for _ in 0..2000 {
        let before = field.columns().to_vec();
        field.step(&pool, &mut rng, |glyph| {
            assert!(glyph.x >= 0.0 && glyph.x < w);
        });
        assert_eq!(field.columns().len(), before.len());
        for (prev, next) in before.iter().zip(field.columns()) {
            // Either the column advanced (or held) or it respawned from
            // past the exit band to a fresh negative offset.
            let advanced = next >= prev;
            let respawned = *prev > exit && *next < 0.0 && *next >= respawn_floor;
            assert!(advanced || respawned, "bad transition {prev} -> {next}");
        }
    }
}

#[test]
fn rain_resize_rebuilds_for_the_new_viewport() {
    let tuning = *Profile::Constrained.rain();
    let mut rng = lcg(11);
    let mut field = RainField::new(tuning, 375.0, 667.0, &mut rng);
    assert_eq!(field.columns().len(), 22); // floor(375 / (14 * 1.2))

    field.rebuild(667.0, 375.0, &mut rng);
    assert_eq!(field.columns().len(), rain::column_count(667.0, &tuning));
    assert!(field.columns().iter().all(|&y| y < 0.0));
    assert_eq!(field.rebuild_count(), 2);
}

#[test]
fn particle_session_keeps_population_invariants() {
    let tuning = *Profile::Desktop.particles();
    let mut rng = lcg(23);
    let (w, h) = (1280.0, 720.0);
    let mut field = ParticleField::new(tuning, w, h, &mut rng);
    assert_eq!(field.particles().len(), 120);

    let mut peak_sparks = 0;
    for frame in 0..3000 {
        field.maybe_spawn_spark(&mut rng);
        assert!(field.sparks().len() <= 30, "cap broken at frame {frame}");
        peak_sparks = peak_sparks.max(field.sparks().len());

        field.step_sparks(|s, life| {
            assert!(life > 0.0 && life < 1.0);
            assert!(s.age < s.max_life);
        });

        field.step_particles(|p, opacity| {
            assert!(p.x >= -WRAP_MARGIN - 1.0 && p.x <= w + WRAP_MARGIN + 1.0);
            assert!(p.y >= -WRAP_MARGIN - 1.0 && p.y <= h + WRAP_MARGIN + 1.0);
            assert!((0.0..=1.0).contains(&opacity));
        });
        assert_eq!(field.particles().len(), 120);

        field.connections(|_, _, _, _, alpha| {
            assert!(alpha > 0.0 && alpha <= 0.15);
        });
    }
    // With a 0.1 spawn chance over 3000 frames sparks must have flowed.
    assert!(peak_sparks > 0);
}

#[test]
fn constrained_session_draws_no_connections() {
    let tuning = *Profile::Constrained.particles();
    let mut rng = lcg(31);
    let mut field = ParticleField::new(tuning, 375.0, 667.0, &mut rng);
    for _ in 0..200 {
        field.step_particles(|_, _| {});
        field.connections(|_, _, _, _, _| panic!("connection pass ran on constrained profile"));
    }
}
