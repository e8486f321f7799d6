use driftfield_utils::consts::{ALPHA_SPAN, FIXED_RADIUS, MAX_SPEED, MIN_ALPHA, MIN_SCALED_RADIUS};
use driftfield_utils::FieldSettings;
use rand::Rng;

/// One drifting dot. Only the position changes after seeding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    /// Velocity in pixels per frame
    pub vx: f64,
    pub vy: f64,
    /// Opacity in [0.2, 0.8)
    pub alpha: f64,
}

impl Particle {
    /// Random particle somewhere inside a `width` x `height` surface
    pub fn seed<R: Rng + ?Sized>(
        rng: &mut R,
        settings: &FieldSettings,
        width: f64,
        height: f64,
    ) -> Self {
        let x = rng.gen::<f64>() * width;
        let y = rng.gen::<f64>() * height;
        let radius = match settings.size_scale {
            Some(scale) => scale * rng.gen::<f64>() + MIN_SCALED_RADIUS,
            None => FIXED_RADIUS,
        };
        let vx = (rng.gen::<f64>() - 0.5) * 2.0 * MAX_SPEED;
        let vy = (rng.gen::<f64>() - 0.5) * 2.0 * MAX_SPEED;
        let alpha = MIN_ALPHA + rng.gen::<f64>() * ALPHA_SPAN;

        Self {
            x,
            y,
            radius,
            vx,
            vy,
            alpha,
        }
    }

    /// Move by one frame of velocity, then wrap to the opposite edge.
    /// Overshoot is discarded: a particle leaving the left edge lands exactly
    /// on the right edge.
    pub fn advance(&mut self, width: f64, height: f64) {
        self.x += self.vx;
        self.y += self.vy;

        if self.x < 0.0 {
            self.x = width;
        }
        if self.x > width {
            self.x = 0.0;
        }
        if self.y < 0.0 {
            self.y = height;
        }
        if self.y > height {
            self.y = 0.0;
        }
    }
}
