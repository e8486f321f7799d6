// Driftfield: browser bindings
//
// particlesJS(id, config) mounts a full-window <canvas> into the element with
// the given id and animates it with requestAnimationFrame. A missing element
// is a silent no-op.

use std::cell::RefCell;
use std::f64::consts::TAU;
use std::rc::Rc;

use driftfield_utils::FieldConfig;
use log::warn;
use rand::rngs::StdRng;
use rand::SeedableRng;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, Window};

use crate::animation::ParticleField;
use crate::surface::Surface;

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

/// Canvas 2D context as a drawing surface
struct ContextSurface {
    canvas: HtmlCanvasElement,
    context: CanvasRenderingContext2d,
}

impl Surface for ContextSurface {
    fn width(&self) -> f64 {
        self.canvas.width() as f64
    }

    fn height(&self) -> f64 {
        self.canvas.height() as f64
    }

    fn resize(&mut self, width: f64, height: f64) {
        self.canvas.set_width(width as u32);
        self.canvas.set_height(height as u32);
    }

    fn clear(&mut self) {
        self.context
            .clear_rect(0.0, 0.0, self.width(), self.height());
    }

    fn fill_circle(&mut self, x: f64, y: f64, radius: f64, alpha: f64) {
        self.context.begin_path();
        #[allow(deprecated)]
        self.context
            .set_fill_style(&JsValue::from_str(&format!("rgba(255,255,255,{})", alpha)));
        if let Err(e) = self.context.arc(x, y, radius, 0.0, TAU) {
            warn!("Failed to trace particle at ({}, {}): {:?}", x, y, e);
            return;
        }
        self.context.fill();
    }
}

#[derive(Default)]
struct LoopState {
    stopped: bool,
    frame_request: Option<i32>,
}

/// A running field in the page. `stop()` cancels the pending frame and
/// removes the resize listener.
#[wasm_bindgen]
pub struct WebParticleField {
    window: Window,
    state: Rc<RefCell<LoopState>>,
    frame: FrameCallback,
    on_resize: Option<Closure<dyn FnMut()>>,
    particle_count: usize,
}

#[wasm_bindgen]
impl WebParticleField {
    #[wasm_bindgen(getter, js_name = particleCount)]
    pub fn particle_count(&self) -> usize {
        self.particle_count
    }

    pub fn stop(&mut self) {
        let mut state = self.state.borrow_mut();
        state.stopped = true;
        if let Some(id) = state.frame_request.take() {
            if let Err(e) = self.window.cancel_animation_frame(id) {
                warn!("Failed to cancel animation frame {}: {:?}", id, e);
            }
        }
        drop(state);

        if let Some(on_resize) = self.on_resize.take() {
            if let Err(e) = self
                .window
                .remove_event_listener_with_callback("resize", on_resize.as_ref().unchecked_ref())
            {
                warn!("Failed to remove resize listener: {:?}", e);
            }
        }
        // Breaks the callback's reference to itself
        self.frame.borrow_mut().take();
    }
}

fn viewport(window: &Window) -> (f64, f64) {
    let width = window
        .inner_width()
        .ok()
        .and_then(|v| v.as_f64())
        .unwrap_or(0.0);
    let height = window
        .inner_height()
        .ok()
        .and_then(|v| v.as_f64())
        .unwrap_or(0.0);
    (width, height)
}

fn config_from_js(config: &JsValue) -> FieldConfig {
    if config.is_undefined() || config.is_null() {
        return FieldConfig::default();
    }
    js_sys::JSON::stringify(config)
        .ok()
        .and_then(|text| text.as_string())
        .and_then(|text| FieldConfig::from_json_str(&text).ok())
        .unwrap_or_default()
}

/// Mount and start a particle field in the element with id `id`.
///
/// Returns `undefined` when there is no such element (or no window).
#[wasm_bindgen(js_name = particlesJS)]
pub fn particles_js(id: &str, config: JsValue) -> Result<Option<WebParticleField>, JsValue> {
    let Some(window) = web_sys::window() else {
        return Ok(None);
    };
    let Some(document) = window.document() else {
        return Ok(None);
    };
    let Some(container) = document.get_element_by_id(id) else {
        return Ok(None);
    };

    container.set_inner_html("");
    let canvas: HtmlCanvasElement = document.create_element("canvas")?.dyn_into()?;
    container.append_child(&canvas)?;
    let context: CanvasRenderingContext2d = canvas
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("2d canvas context unavailable"))?
        .dyn_into()?;

    let (width, height) = viewport(&window);
    let mut surface = ContextSurface {
        canvas: canvas.clone(),
        context,
    };
    surface.resize(width, height);

    let on_resize = {
        let window = window.clone();
        let canvas = canvas.clone();
        Closure::wrap(Box::new(move || {
            let (width, height) = viewport(&window);
            canvas.set_width(width as u32);
            canvas.set_height(height as u32);
        }) as Box<dyn FnMut()>)
    };
    window.add_event_listener_with_callback("resize", on_resize.as_ref().unchecked_ref())?;

    let settings = config_from_js(&config).resolve();
    let mut rng = StdRng::from_entropy();
    let mut field = ParticleField::seed(settings, surface.width(), surface.height(), &mut rng);
    let particle_count = field.len();

    let state = Rc::new(RefCell::new(LoopState::default()));
    let frame: FrameCallback = Rc::new(RefCell::new(None));
    {
        let state = state.clone();
        let window = window.clone();
        let next = frame.clone();
        *frame.borrow_mut() = Some(Closure::wrap(Box::new(move || {
            if state.borrow().stopped {
                return;
            }
            field.render_into(&mut surface);

            if let Some(callback) = next.borrow().as_ref() {
                if let Ok(id) = window.request_animation_frame(callback.as_ref().unchecked_ref()) {
                    state.borrow_mut().frame_request = Some(id);
                }
            }
        }) as Box<dyn FnMut()>));
    }

    if let Some(callback) = frame.borrow().as_ref() {
        let id = window.request_animation_frame(callback.as_ref().unchecked_ref())?;
        state.borrow_mut().frame_request = Some(id);
    }

    Ok(Some(WebParticleField {
        window,
        state,
        frame,
        on_resize: Some(on_resize),
        particle_count,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;
    use web_sys::{Element, Event};

    wasm_bindgen_test_configure!(run_in_browser);

    fn container(id: &str) -> Element {
        let document = web_sys::window().unwrap().document().unwrap();
        let element = document.create_element("div").unwrap();
        element.set_id(id);
        element.set_inner_html("<p>placeholder</p><span>text</span>");
        document.body().unwrap().append_child(&element).unwrap();
        element
    }

    fn config(text: &str) -> JsValue {
        js_sys::JSON::parse(text).unwrap()
    }

    fn canvas_in(element: &Element) -> HtmlCanvasElement {
        element.first_element_child().unwrap().dyn_into().unwrap()
    }

    #[wasm_bindgen_test]
    fn missing_element_returns_undefined() {
        let field = particles_js("no-such-element", JsValue::UNDEFINED).unwrap();
        assert!(field.is_none());
    }

    #[wasm_bindgen_test]
    fn replaces_container_content_with_a_window_sized_canvas() {
        let element = container("bg-mount");
        let mut field = particles_js("bg-mount", JsValue::UNDEFINED)
            .unwrap()
            .unwrap();

        assert_eq!(element.child_element_count(), 1);
        let canvas = canvas_in(&element);
        assert_eq!(canvas.tag_name(), "CANVAS");

        let (width, height) = viewport(&web_sys::window().unwrap());
        assert_eq!(canvas.width(), width as u32);
        assert_eq!(canvas.height(), height as u32);
        assert_eq!(field.particle_count(), 40);

        field.stop();
    }

    #[wasm_bindgen_test]
    fn particle_count_follows_config() {
        container("bg-count");
        let mut field = particles_js(
            "bg-count",
            config(r#"{"particles":{"number":{"value":7},"size":{"value":3}}}"#),
        )
        .unwrap()
        .unwrap();

        assert_eq!(field.particle_count(), 7);
        field.stop();
    }

    #[wasm_bindgen_test]
    fn resize_resets_canvas_until_stopped() {
        let window = web_sys::window().unwrap();
        let element = container("bg-resize");
        let mut field = particles_js("bg-resize", JsValue::UNDEFINED)
            .unwrap()
            .unwrap();
        let canvas = canvas_in(&element);
        let (width, _) = viewport(&window);

        canvas.set_width(1);
        window
            .dispatch_event(&Event::new("resize").unwrap())
            .unwrap();
        assert_eq!(canvas.width(), width as u32);

        field.stop();
        assert!(field.state.borrow().stopped);
        assert!(field.state.borrow().frame_request.is_none());
        assert!(field.frame.borrow().is_none());
        assert!(field.on_resize.is_none());

        canvas.set_width(1);
        window
            .dispatch_event(&Event::new("resize").unwrap())
            .unwrap();
        assert_eq!(canvas.width(), 1);
    }

    #[wasm_bindgen_test]
    fn config_from_js_reads_objects_and_defaults() {
        assert_eq!(config_from_js(&JsValue::UNDEFINED), FieldConfig::default());
        assert_eq!(config_from_js(&JsValue::NULL), FieldConfig::default());
        assert_eq!(
            config_from_js(&JsValue::from_str("lots")).resolve().count,
            40
        );

        let settings =
            config_from_js(&config(r#"{"particles":{"number":{"value":"12"}}}"#)).resolve();
        assert_eq!(settings.count, 12);
        assert_eq!(settings.size_scale, None);
    }
}
