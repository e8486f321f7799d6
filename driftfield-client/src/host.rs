// Driftfield host document
//
// Models the page a particle field is mounted into: named containers with
// child nodes, the current viewport, and resize notifications. Resize
// listeners are watch receivers, so dropping one unregisters it.

use std::collections::HashMap;

use tokio::sync::watch;

/// Viewport dimensions in pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Identifies a surface mounted into a container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceId(u64);

/// Content of a container
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Text(String),
    Surface(SurfaceId),
}

pub struct Document {
    containers: HashMap<String, Vec<Node>>,
    viewport: watch::Sender<Viewport>,
    next_surface_id: u64,
}

impl Document {
    pub fn new(viewport: Viewport) -> Self {
        let (viewport, _) = watch::channel(viewport);
        Self {
            containers: HashMap::new(),
            viewport,
            next_surface_id: 0,
        }
    }

    pub fn with_container(mut self, id: impl Into<String>) -> Self {
        self.add_container(id);
        self
    }

    /// Add an empty container. Existing containers keep their content.
    pub fn add_container(&mut self, id: impl Into<String>) {
        self.containers.entry(id.into()).or_default();
    }

    pub fn has_container(&self, id: &str) -> bool {
        self.containers.contains_key(id)
    }

    /// Append text to a container; false if the container does not exist
    pub fn append_text(&mut self, id: &str, text: impl Into<String>) -> bool {
        match self.containers.get_mut(id) {
            Some(children) => {
                children.push(Node::Text(text.into()));
                true
            }
            None => false,
        }
    }

    pub fn children(&self, id: &str) -> Option<&[Node]> {
        self.containers.get(id).map(Vec::as_slice)
    }

    /// Replace the container's content with a new surface.
    /// `None` (and no change) if the container does not exist.
    pub fn mount_surface(&mut self, id: &str) -> Option<SurfaceId> {
        let children = self.containers.get_mut(id)?;
        let surface_id = SurfaceId(self.next_surface_id);
        self.next_surface_id += 1;

        children.clear();
        children.push(Node::Surface(surface_id));
        Some(surface_id)
    }

    pub fn viewport(&self) -> Viewport {
        *self.viewport.borrow()
    }

    /// Publish a new viewport to every live resize listener
    pub fn resize(&self, viewport: Viewport) {
        self.viewport.send_replace(viewport);
    }

    /// Register a listener; it sees resizes published after this call
    pub fn listen_resize(&self) -> ResizeListener {
        ResizeListener {
            rx: self.viewport.subscribe(),
        }
    }

    pub fn resize_listener_count(&self) -> usize {
        self.viewport.receiver_count()
    }
}

/// Registered viewport-resize listener. Dropping it unregisters it.
#[derive(Debug)]
pub struct ResizeListener {
    rx: watch::Receiver<Viewport>,
}

impl ResizeListener {
    /// Latest viewport if it changed since the last call. Several resizes
    /// between calls collapse into the most recent one.
    pub fn take_resize(&mut self) -> Option<Viewport> {
        if self.rx.has_changed().unwrap_or(false) {
            Some(*self.rx.borrow_and_update())
        } else {
            None
        }
    }

    /// Wait for the next resize; `None` once the document is gone
    pub async fn changed(&mut self) -> Option<Viewport> {
        self.rx.changed().await.ok()?;
        Some(*self.rx.borrow_and_update())
    }
}
