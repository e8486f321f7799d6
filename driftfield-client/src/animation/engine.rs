// Driftfield: AnimationEngine trait and frame types
use std::time::{Duration, Instant};

use crate::surface::Surface;

/// Summary of one rendered frame
#[derive(Debug, Clone)]
pub struct AnimationFrame {
    /// Zero-based index of this frame since the animation started (or was reset)
    pub index: u64,
    /// Number of shapes drawn into the surface
    pub drawn: usize,
    /// Surface dimensions the frame was drawn at
    pub width: f64,
    pub height: f64,
    /// Frame timestamp for FPS calculation
    pub timestamp: Instant,
}

impl AnimationFrame {
    pub fn new(index: u64, drawn: usize, width: f64, height: f64) -> Self {
        Self {
            index,
            drawn,
            width,
            height,
            timestamp: Instant::now(),
        }
    }
}

/// Frame-based animation interface
pub trait AnimationEngine: Send + Sync {
    /// Draw the next frame into `surface`
    /// Returns None if animation is complete (for finite animations)
    fn next_frame(&mut self, surface: &mut dyn Surface) -> Option<AnimationFrame>;

    /// Get the target FPS for this animation
    fn target_fps(&self) -> u32;

    /// Get the frame duration based on target FPS
    fn frame_duration(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.target_fps().max(1) as f64)
    }

    /// Reset animation to initial state
    fn reset(&mut self);

    /// Check if animation should degrade to lower FPS based on CPU usage
    /// Default implementation always returns target FPS
    fn adaptive_fps(&self, cpu_usage_percent: f32) -> u32 {
        let target = self.target_fps();
        // drop to 30fps if CPU >80%
        if cpu_usage_percent > 80.0 && target > 30 {
            30
        } else {
            target
        }
    }
}
