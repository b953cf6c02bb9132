//! Canvas plumbing shared by the two animation layers: DPR-capped
//! surface sizing, the recursive `requestAnimationFrame` loop, and
//! guard types that release their browser resource on drop so teardown
//! never leaks a frame callback, listener, or timer.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use web_sys::{
    window, AddEventListenerOptions, CanvasRenderingContext2d, Document, EventTarget,
    HtmlCanvasElement, Window,
};

use crate::profile::DPR_CAP;

/// Current viewport size in CSS pixels.
pub fn viewport(window: &Window) -> (f64, f64) {
    let w = window
        .inner_width()
        .ok()
        .and_then(|v| v.as_f64())
        .unwrap_or(0.0);
    let h = window
        .inner_height()
        .ok()
        .and_then(|v| v.as_f64())
        .unwrap_or(0.0);
    (w, h)
}

/// Device pixel ratio clamped to [1, DPR_CAP].
pub fn capped_dpr(window: &Window) -> f64 {
    let dpr = window.device_pixel_ratio();
    if dpr <= 0.0 {
        1.0
    } else {
        dpr.min(DPR_CAP)
    }
}

/// A viewport-filling canvas layer and its 2D context.
pub struct Canvas2d {
    pub canvas: HtmlCanvasElement,
    pub ctx: CanvasRenderingContext2d,
}

impl Canvas2d {
    /// Creates the canvas element, styled as a fixed, non-interactive,
    /// assistive-tech-hidden layer at the given z-index. Returns `None`
    /// when no 2D context is available; the caller then mounts no layer
    /// and the rest of the page keeps working.
    pub fn create(document: &Document, z_index: &str) -> Result<Option<Canvas2d>, JsValue> {
        let canvas = document
            .create_element("canvas")?
            .dyn_into::<HtmlCanvasElement>()?;
        canvas.set_attribute("aria-hidden", "true")?;
        let style = canvas.style();
        style.set_property("position", "fixed")?;
        style.set_property("inset", "0")?;
        style.set_property("width", "100%")?;
        style.set_property("height", "100%")?;
        style.set_property("z-index", z_index)?;
        style.set_property("pointer-events", "none")?;

        let ctx = match canvas.get_context("2d")? {
            Some(obj) => obj.dyn_into::<CanvasRenderingContext2d>()?,
            None => {
                log::warn!("2d canvas context unavailable; layer disabled");
                return Ok(None);
            }
        };
        Ok(Some(Canvas2d { canvas, ctx }))
    }

    /// Resizes the backing store to the viewport scaled by the capped
    /// device pixel ratio and resets the context transform to match, so
    /// all drawing stays in CSS-pixel coordinates.
    pub fn fit_viewport(&self, width: f64, height: f64, dpr: f64) -> Result<(), JsValue> {
        self.canvas.set_width((width * dpr) as u32);
        self.canvas.set_height((height * dpr) as u32);
        self.ctx.set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0)
    }
}

/// A recursive `requestAnimationFrame` loop with a cancellation handle.
///
/// The closure holds an `Rc` back to its own slot so it can re-request
/// the next frame; dropping the handle cancels the pending frame and
/// empties the slot, breaking that cycle.
pub struct FrameLoop {
    raf_id: Rc<Cell<Option<i32>>>,
    closure: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>,
}

impl FrameLoop {
    /// Starts the loop. `tick` receives the callback timestamp in
    /// milliseconds every available frame; throttling to a coarser
    /// interval is the tick's own business.
    pub fn start(mut tick: impl FnMut(f64) + 'static) -> Result<FrameLoop, JsValue> {
        let closure: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>> = Rc::new(RefCell::new(None));
        let raf_id: Rc<Cell<Option<i32>>> = Rc::new(Cell::new(None));

        let slot = closure.clone();
        let id_slot = raf_id.clone();
        *closure.borrow_mut() = Some(Closure::wrap(Box::new(move |ts: f64| {
            tick(ts);
            // Re-request only while the closure is still installed.
            let Some(win) = window() else { return };
            let borrow = slot.borrow();
            if let Some(cb) = borrow.as_ref() {
                match win.request_animation_frame(cb.as_ref().unchecked_ref()) {
                    Ok(id) => id_slot.set(Some(id)),
                    Err(_) => id_slot.set(None),
                }
            }
        }) as Box<dyn FnMut(f64)>));

        let win = window().ok_or("no window")?;
        let first = {
            let borrow = closure.borrow();
            let cb = borrow.as_ref().ok_or("frame closure missing")?;
            win.request_animation_frame(cb.as_ref().unchecked_ref())?
        };
        raf_id.set(Some(first));

        Ok(FrameLoop { raf_id, closure })
    }
}

impl Drop for FrameLoop {
    fn drop(&mut self) {
        if let Some(id) = self.raf_id.take() {
            if let Some(win) = window() {
                let _ = win.cancel_animation_frame(id);
            }
        }
        self.closure.borrow_mut().take();
    }
}

/// An event listener registration that removes itself on drop.
pub struct Listener {
    target: EventTarget,
    event: &'static str,
    closure: Closure<dyn FnMut()>,
}

impl Listener {
    pub fn new(
        target: &EventTarget,
        event: &'static str,
        handler: impl FnMut() + 'static,
    ) -> Result<Listener, JsValue> {
        let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut()>);
        target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
        Ok(Listener {
            target: target.clone(),
            event,
            closure,
        })
    }

    /// Passive registration, for high-frequency events like `resize`.
    pub fn passive(
        target: &EventTarget,
        event: &'static str,
        handler: impl FnMut() + 'static,
    ) -> Result<Listener, JsValue> {
        let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut()>);
        let opts = AddEventListenerOptions::new();
        opts.set_passive(true);
        target.add_event_listener_with_callback_and_add_event_listener_options(
            event,
            closure.as_ref().unchecked_ref(),
            &opts,
        )?;
        Ok(Listener {
            target: target.clone(),
            event,
            closure,
        })
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(self.event, self.closure.as_ref().unchecked_ref());
    }
}

/// Single-slot debounce timer: every poke cancels the pending timeout
/// and arms a fresh one, so a burst of events yields one action after
/// the quiet period. Dropping cancels any pending timeout.
pub struct Debounce {
    delay_ms: i32,
    timer: Rc<Cell<Option<i32>>>,
    closure: Closure<dyn FnMut()>,
}

impl Debounce {
    pub fn new(delay_ms: i32, mut action: impl FnMut() + 'static) -> Debounce {
        let timer: Rc<Cell<Option<i32>>> = Rc::new(Cell::new(None));
        let slot = timer.clone();
        let closure = Closure::wrap(Box::new(move || {
            slot.set(None);
            action();
        }) as Box<dyn FnMut()>);
        Debounce {
            delay_ms,
            timer,
            closure,
        }
    }

    pub fn poke(&self) {
        let Some(win) = window() else { return };
        if let Some(id) = self.timer.take() {
            win.clear_timeout_with_handle(id);
        }
        if let Ok(id) = win.set_timeout_with_callback_and_timeout_and_arguments_0(
            self.closure.as_ref().unchecked_ref(),
            self.delay_ms,
        ) {
            self.timer.set(Some(id));
        }
    }
}

impl Drop for Debounce {
    fn drop(&mut self) {
        if let Some(id) = self.timer.take() {
            if let Some(win) = window() {
                win.clear_timeout_with_handle(id);
            }
        }
    }
}
