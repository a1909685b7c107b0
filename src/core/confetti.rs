//! Winner confetti burst
//!
//! A fixed batch of particles, each spawned `CONFETTI_STAGGER` after the
//! previous one and removed `CONFETTI_LIFETIME` after its own spawn.

use std::time::Duration;

use rand::Rng;

use super::constants::{CONFETTI_COLORS, CONFETTI_COUNT, CONFETTI_LIFETIME, CONFETTI_STAGGER};

#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    /// Offset from the start of the burst
    pub spawn_at: Duration,
    /// Horizontal position in percent of the width
    pub left: f32,
    pub color: &'static str,
    /// Degrees
    pub rotation: f32,
}

impl Particle {
    /// Fraction of the fall completed at `elapsed`, or `None` if not on screen
    pub fn progress(&self, elapsed: Duration) -> Option<f32> {
        let age = elapsed.checked_sub(self.spawn_at)?;
        if age >= CONFETTI_LIFETIME {
            return None;
        }
        Some(age.as_secs_f32() / CONFETTI_LIFETIME.as_secs_f32())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConfettiBurst {
    particles: Vec<Particle>,
}

impl ConfettiBurst {
    pub fn new<R: Rng>(rng: &mut R) -> Self {
        let particles = (0..CONFETTI_COUNT)
            .map(|i| Particle {
                spawn_at: CONFETTI_STAGGER * i as u32,
                left: rng.gen_range(0.0..100.0),
                color: CONFETTI_COLORS[rng.gen_range(0..CONFETTI_COLORS.len())],
                rotation: rng.gen_range(0.0..360.0),
            })
            .collect();
        Self { particles }
    }

    pub fn random() -> Self {
        Self::new(&mut rand::thread_rng())
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Particles on screen at `elapsed`, with their fall progress
    pub fn visible(&self, elapsed: Duration) -> impl Iterator<Item = (&Particle, f32)> + '_ {
        self.particles
            .iter()
            .filter_map(move |p| p.progress(elapsed).map(|progress| (p, progress)))
    }

    /// True once every particle has removed itself
    pub fn is_finished(&self, elapsed: Duration) -> bool {
        self.particles
            .last()
            .map_or(true, |last| elapsed >= last.spawn_at + CONFETTI_LIFETIME)
    }
}
