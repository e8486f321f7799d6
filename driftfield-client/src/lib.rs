//! # Driftfield client
//!
//! A decorative particle field: small white dots of varying opacity drift
//! across a surface at constant velocity and wrap at its edges.
//!
//! ```ignore
//! use driftfield_client::{particles_js, Document, Viewport};
//! use driftfield_utils::FieldConfig;
//!
//! let mut document = Document::new(Viewport::new(800.0, 600.0)).with_container("bg");
//! let config = FieldConfig::default().with_number(5).with_size(3);
//! if let Some(handle) = particles_js(&mut document, "bg", &config, presenter) {
//!     // ... later
//!     handle.stop().await?;
//! }
//! ```

pub mod animation;
pub mod surface;

#[cfg(not(target_arch = "wasm32"))]
pub mod host;
#[cfg(not(target_arch = "wasm32"))]
pub mod runtime;
#[cfg(not(target_arch = "wasm32"))]
pub mod terminal;

#[cfg(all(feature = "web", target_arch = "wasm32"))]
pub mod web;


pub use animation::{AnimationEngine, AnimationFrame, Particle, ParticleField};
#[cfg(not(target_arch = "wasm32"))]
pub use host::{Document, Node, ResizeListener, SurfaceId, Viewport};
#[cfg(not(target_arch = "wasm32"))]
pub use runtime::{
    particles_js, particles_js_with, spawn, FieldHandle, FieldLoop, Presenter, RunOptions,
};
pub use surface::{Canvas, Surface};
#[cfg(not(target_arch = "wasm32"))]
pub use terminal::{TerminalPresenter, TerminalSize, WindowChanges};
