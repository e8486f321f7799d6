// Driftfield frame runtime
//
// Mounts a particle field into a document and drives it on a tokio task:
// one repeating ticker, a cancellation token for shutdown, and a presenter
// that shows each finished frame.
//
// ```text
// Document ──resize──▶ FieldLoop ──Canvas──▶ Presenter
//                         ▲
//                 interval tick / cancel
// ```

use std::io;
use std::time::Duration;

use driftfield_utils::consts::DEFAULT_FPS;
use driftfield_utils::{DriftError, DriftResult, FieldConfig};
use log::{debug, error, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::animation::{AnimationEngine, AnimationFrame, ParticleField};
use crate::host::{Document, ResizeListener, SurfaceId};
use crate::surface::{Canvas, Surface};

/// Shows finished frames (terminal, test channel, ...)
pub trait Presenter: Send {
    fn present(&mut self, canvas: &Canvas, frame: &AnimationFrame) -> io::Result<()>;

    /// Called once when the loop ends, whatever the reason
    fn teardown(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// How a field is seeded and driven
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub fps: u32,
    /// Fixed RNG seed; entropy when `None`
    pub seed: Option<u64>,
    /// Stop on its own after this many frames
    pub max_frames: Option<u64>,
    /// Canvas cell size in pixels
    pub cell_width: f64,
    pub cell_height: f64,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            fps: DEFAULT_FPS,
            seed: None,
            max_frames: None,
            cell_width: 1.0,
            cell_height: 1.0,
        }
    }
}

/// A mounted field with its surface and resize listener.
/// `tick()` renders exactly one frame; nothing here is time-driven.
pub struct FieldLoop {
    field: ParticleField,
    canvas: Canvas,
    resize: ResizeListener,
    surface_id: SurfaceId,
}

impl FieldLoop {
    /// Mount into `container_id` and seed the field.
    ///
    /// Returns `None` without touching the document when the container
    /// does not exist.
    pub fn mount(
        document: &mut Document,
        container_id: &str,
        config: &FieldConfig,
        options: &RunOptions,
    ) -> Option<Self> {
        let surface_id = document.mount_surface(container_id)?;
        let resize = document.listen_resize();

        let viewport = document.viewport();
        let canvas = Canvas::with_cell_size(
            viewport.width,
            viewport.height,
            options.cell_width,
            options.cell_height,
        );

        let settings = config.resolve();
        let mut rng = match options.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let field = ParticleField::seed(settings, canvas.width(), canvas.height(), &mut rng)
            .with_fps(options.fps);

        info!(
            "Mounted particle field in '{}' with {} particles ({}x{})",
            container_id,
            field.len(),
            canvas.width(),
            canvas.height()
        );

        Some(Self {
            field,
            canvas,
            resize,
            surface_id,
        })
    }

    /// Apply a pending resize, then render one frame
    pub fn tick(&mut self) -> Option<AnimationFrame> {
        if let Some(viewport) = self.resize.take_resize() {
            debug!(
                "Resizing surface to {}x{}",
                viewport.width, viewport.height
            );
            self.canvas.resize(viewport.width, viewport.height);
        }
        self.field.next_frame(&mut self.canvas)
    }

    pub fn field(&self) -> &ParticleField {
        &self.field
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn surface_id(&self) -> SurfaceId {
        self.surface_id
    }

    pub fn frames(&self) -> u64 {
        self.field.frame_count()
    }

    pub fn frame_duration(&self) -> Duration {
        self.field.frame_duration()
    }
}

/// Handle to a running field.
///
/// Dropping the handle leaves the field running; `stop()` shuts it down.
pub struct FieldHandle {
    cancel: CancellationToken,
    task: JoinHandle<DriftResult<u64>>,
    surface_id: SurfaceId,
}

impl FieldHandle {
    pub fn surface_id(&self) -> SurfaceId {
        self.surface_id
    }

    /// Token that is cancelled when the loop ends, and that ends the loop
    /// when cancelled
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Cancel the loop and wait for it. Returns the number of frames
    /// rendered. The resize listener is unregistered by the time this
    /// returns.
    pub async fn stop(self) -> DriftResult<u64> {
        self.cancel.cancel();
        self.wait().await
    }

    /// Wait for the loop to end on its own (frame limit, presenter error)
    pub async fn wait(self) -> DriftResult<u64> {
        self.task
            .await
            .map_err(|e| DriftError::LoopAborted(e.to_string()))?
    }
}

/// Mount a particle field into `container_id` and start animating it at
/// the default frame rate.
///
/// Silent no-op returning `None` if the container does not exist. Must be
/// called from within a tokio runtime.
pub fn particles_js<P>(
    document: &mut Document,
    container_id: &str,
    config: &FieldConfig,
    presenter: P,
) -> Option<FieldHandle>
where
    P: Presenter + 'static,
{
    particles_js_with(
        document,
        container_id,
        config,
        &RunOptions::default(),
        presenter,
    )
}

pub fn particles_js_with<P>(
    document: &mut Document,
    container_id: &str,
    config: &FieldConfig,
    options: &RunOptions,
    presenter: P,
) -> Option<FieldHandle>
where
    P: Presenter + 'static,
{
    let field_loop = FieldLoop::mount(document, container_id, config, options)?;
    Some(spawn(field_loop, presenter, options.max_frames))
}

/// Drive `field_loop` on a tokio task until cancelled
pub fn spawn<P>(field_loop: FieldLoop, presenter: P, max_frames: Option<u64>) -> FieldHandle
where
    P: Presenter + 'static,
{
    let cancel = CancellationToken::new();
    let surface_id = field_loop.surface_id();
    let task = tokio::spawn(run_loop(field_loop, presenter, cancel.clone(), max_frames));

    FieldHandle {
        cancel,
        task,
        surface_id,
    }
}

async fn run_loop<P: Presenter>(
    mut field_loop: FieldLoop,
    mut presenter: P,
    cancel: CancellationToken,
    max_frames: Option<u64>,
) -> DriftResult<u64> {
    let mut ticker = interval(field_loop.frame_duration());
    // A stalled frame is skipped rather than replayed in a burst
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let result = loop {
        if max_frames.map_or(false, |limit| field_loop.frames() >= limit) {
            break Ok(());
        }

        tokio::select! {
            biased;
            _ = cancel.cancelled() => break Ok(()),
            _ = ticker.tick() => {
                let Some(frame) = field_loop.tick() else {
                    break Ok(());
                };
                if let Err(e) = presenter.present(field_loop.canvas(), &frame) {
                    error!("Failed to present frame {}: {}", frame.index, e);
                    break Err(DriftError::from(e));
                }
            }
        }
    };

    if let Err(e) = presenter.teardown() {
        warn!("Presenter teardown failed: {}", e);
    }

    let frames = field_loop.frames();
    drop(field_loop);
    cancel.cancel();
    info!("Particle field stopped after {} frames", frames);

    result.map(|_| frames)
}
