// Driftfield: particle field animation
// Small white dots drifting at constant velocity, wrapping at the surface edges

use driftfield_utils::consts::DEFAULT_FPS;
use driftfield_utils::FieldSettings;
use rand::Rng;

use super::engine::{AnimationEngine, AnimationFrame};
use super::particle::Particle;
use crate::surface::Surface;

/// Particle field animation: a fixed set of particles seeded once and
/// advanced every frame
pub struct ParticleField {
    particles: Vec<Particle>,
    /// Layout right after seeding, restored by `reset()`
    seeded: Vec<Particle>,
    /// Frames rendered since seeding (or the last reset)
    frame_count: u64,
    /// Target frames per second
    fps: u32,
}

impl ParticleField {
    /// Seed `settings.count` particles across a `width` x `height` surface
    pub fn seed<R: Rng + ?Sized>(
        settings: FieldSettings,
        width: f64,
        height: f64,
        rng: &mut R,
    ) -> Self {
        let particles: Vec<Particle> = (0..settings.count)
            .map(|_| Particle::seed(rng, &settings, width, height))
            .collect();

        Self {
            seeded: particles.clone(),
            particles,
            frame_count: 0,
            fps: DEFAULT_FPS,
        }
    }

    /// Set custom FPS (for testing or performance tuning)
    pub fn with_fps(mut self, fps: u32) -> Self {
        self.fps = fps;
        self
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Clear the surface, then advance, wrap and draw every particle in
    /// insertion order. Returns the number of particles drawn.
    pub fn render_into<S: Surface + ?Sized>(&mut self, surface: &mut S) -> usize {
        surface.clear();
        let (width, height) = (surface.width(), surface.height());

        for particle in &mut self.particles {
            particle.advance(width, height);
            surface.fill_circle(particle.x, particle.y, particle.radius, particle.alpha);
        }

        self.frame_count += 1;
        self.particles.len()
    }
}

impl AnimationEngine for ParticleField {
    fn next_frame(&mut self, surface: &mut dyn Surface) -> Option<AnimationFrame> {
        let index = self.frame_count;
        let drawn = self.render_into(surface);
        Some(AnimationFrame::new(
            index,
            drawn,
            surface.width(),
            surface.height(),
        ))
    }

    fn target_fps(&self) -> u32 {
        self.fps
    }

    fn reset(&mut self) {
        self.particles.clone_from(&self.seeded);
        self.frame_count = 0;
    }
}
