// Driftfield: Animation Engine
// Frame-based animation system for the particle field

pub mod engine;
pub mod particle;
pub mod particle_field;

pub use engine::{AnimationEngine, AnimationFrame};
pub use particle::Particle;
pub use particle_field::ParticleField;
