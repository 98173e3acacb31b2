//! Browser entry point for the plexus backdrop.
//!
//! `start` binds a full-window canvas, seeds it for the current viewport and
//! drives frames with a self-rescheduling `requestAnimationFrame` closure.
//! A window `resize` listener reseeds between frames. Everything runs on the
//! page's single thread, so shared state lives in `Rc<RefCell<_>>`.

pub mod canvas;

use std::cell::RefCell;
use std::rc::Rc;

use plexus_core::{AnimationDriver, Backdrop, BackdropError, StopHandle, SurfaceDimensions};
use serde_json::Value;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::Window;

pub use canvas::CanvasSurface;

struct App {
    backdrop: Backdrop,
    surface: CanvasSurface,
    driver: AnimationDriver,
}

impl App {
    fn resize_to_viewport(&mut self, window: &Window) {
        let (width, height) = viewport(window);
        self.backdrop.resize(&mut self.surface, width, height);
    }
}

type Callback = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

/// Handle returned by [`start`]; keeps the resize listener alive.
#[wasm_bindgen]
pub struct BackdropHandle {
    app: Rc<RefCell<App>>,
    stop: StopHandle,
    on_resize: Option<Closure<dyn FnMut()>>,
}

#[wasm_bindgen]
impl BackdropHandle {
    /// Stops the loop after the current frame and detaches the resize listener.
    pub fn stop(&mut self) {
        self.stop.stop();
        if let Ok(mut app) = self.app.try_borrow_mut() {
            app.driver.stop();
        }
        if let (Some(window), Some(listener)) = (web_sys::window(), self.on_resize.take()) {
            let _ = window
                .remove_event_listener_with_callback("resize", listener.as_ref().unchecked_ref());
        }
    }

    pub fn is_running(&self) -> bool {
        !self.stop.is_stopped()
    }

    pub fn particle_count(&self) -> usize {
        self.app.borrow().backdrop.particles().len()
    }

    /// Frames rendered since `start`.
    pub fn frame_count(&self) -> f64 {
        self.app.borrow().driver.frames() as f64
    }
}

impl Drop for BackdropHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Window inner size in whole pixels; zero when unavailable.
fn viewport(window: &Window) -> (u32, u32) {
    let read = |v: Result<JsValue, JsValue>| v.ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
    SurfaceDimensions::new(read(window.inner_width()), read(window.inner_height())).to_pixels()
}

/// Warnings go to the browser devtools console.
fn console_warn(message: &str) {
    web_sys::console::warn_1(&JsValue::from_str(message));
}

/// Empty or whitespace input means "all defaults".
fn parse_params(params_json: &str) -> Result<Value, BackdropError> {
    if params_json.trim().is_empty() {
        return Ok(Value::Object(Default::default()));
    }
    serde_json::from_str(params_json)
        .map_err(|e| BackdropError::invalid_param("params", e.to_string()))
}

fn request_frame(window: &Window, callback: &Closure<dyn FnMut()>) {
    if let Err(e) = window.request_animation_frame(callback.as_ref().unchecked_ref()) {
        console_warn(&format!("plexus: requestAnimationFrame failed: {e:?}"));
    }
}

/// Starts the backdrop on the canvas with id `canvas_id`.
///
/// Returns `None` (and starts nothing) when there is no such canvas, it has
/// no 2D context, or `params_json` is not a valid params object.
#[wasm_bindgen]
pub fn start(canvas_id: &str, seed: u32, params_json: &str) -> Option<BackdropHandle> {
    let window = web_sys::window()?;
    let surface = match CanvasSurface::from_element_id(canvas_id) {
        Ok(s) => s,
        Err(e) => {
            console_warn(&format!("plexus: backdrop disabled: {e}"));
            return None;
        }
    };
    let params = parse_params(params_json);
    let backdrop = match params.and_then(|p| Backdrop::from_json(&p, seed as u64)) {
        Ok(b) => b,
        Err(e) => {
            console_warn(&format!("plexus: backdrop disabled: {e}"));
            return None;
        }
    };

    let app = Rc::new(RefCell::new(App {
        backdrop,
        surface,
        driver: AnimationDriver::new(),
    }));
    app.borrow_mut().resize_to_viewport(&window);
    let stop = app.borrow().driver.stop_handle();

    let on_resize = {
        let app = Rc::clone(&app);
        let window = window.clone();
        Closure::<dyn FnMut()>::new(move || {
            if let Ok(mut app) = app.try_borrow_mut() {
                app.resize_to_viewport(&window);
            }
        })
    };
    if let Err(e) =
        window.add_event_listener_with_callback("resize", on_resize.as_ref().unchecked_ref())
    {
        console_warn(&format!("plexus: resize listener not attached: {e:?}"));
    }

    let frame: Callback = Rc::new(RefCell::new(None));
    {
        let next = Rc::clone(&frame);
        let app = Rc::clone(&app);
        let stop = stop.clone();
        let window = window.clone();
        *frame.borrow_mut() = Some(Closure::<dyn FnMut()>::new(move || {
            if stop.is_stopped() {
                // drop the self-reference so the closure is freed
                let _ = next.borrow_mut().take();
                return;
            }
            {
                let mut app = app.borrow_mut();
                let App {
                    backdrop,
                    surface,
                    driver,
                } = &mut *app;
                driver.tick(backdrop, surface);
            }
            if let Some(cb) = next.borrow().as_ref() {
                request_frame(&window, cb);
            }
        }));
    }
    if let Some(cb) = frame.borrow().as_ref() {
        request_frame(&window, cb);
    }

    Some(BackdropHandle {
        app,
        stop,
        on_resize: Some(on_resize),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn blank_params_mean_defaults() {
        assert_eq!(parse_params("").unwrap(), json!({}));
        assert_eq!(parse_params("   ").unwrap(), json!({}));
    }

    #[test]
    fn params_json_is_parsed() {
        assert_eq!(
            parse_params(r#"{"line_width": 2}"#).unwrap(),
            json!({"line_width": 2})
        );
    }

    #[test]
    fn malformed_params_are_rejected() {
        assert!(matches!(
            parse_params("{nope"),
            Err(BackdropError::InvalidParam { .. })
        ));
    }
}
