// Driftfield: program-wide constants

/// Particle count used when `particles.number.value` is absent or falsy
pub const DEFAULT_PARTICLE_COUNT: usize = 40;

/// Upper bound on the particle count accepted from configuration
pub const MAX_PARTICLE_COUNT: usize = 100_000;

/// Radius of every particle when `particles.size.value` is absent
pub const FIXED_RADIUS: f64 = 2.0;

/// Smallest radius a scaled particle can have
pub const MIN_SCALED_RADIUS: f64 = 1.0;

/// Per-axis velocity bound in pixels per frame
pub const MAX_SPEED: f64 = 0.25;

pub const MIN_ALPHA: f64 = 0.2;
pub const ALPHA_SPAN: f64 = 0.6;

pub const DEFAULT_CONTAINER_ID: &str = "particles-js";
pub const DEFAULT_FPS: u32 = 60;

pub const LOG_DIR_NAME: &str = "driftfield";
pub const LOG_FILE_NAME: &str = "driftfield.log";
