//! The composition root: assembles the layer stack in its fixed z-order
//! and owns every layer guard.

use std::cell::RefCell;

use wasm_bindgen::{JsCast, JsValue};
use web_sys::HtmlElement;

use super::particle_layer::{self, ParticleLayer};
use super::rain_layer::{self, RainLayer};
use super::video_layer::{self, VideoLayer};
use super::overlays;
use crate::profile::Profile;

const DEFAULT_VIDEO_SRC: &str = "media/loop.webm";

thread_local! {
    static STAGE: RefCell<Option<Stage>> = const { RefCell::new(None) };
}

/// Owns the DOM subtree and the layer guards living in it. Dropping it
/// cancels animation frames, listeners and timers, then detaches the
/// subtree from the mount element.
struct Stage {
    mount: HtmlElement,
    root: HtmlElement,
    _rain: Option<RainLayer>,
    _particles: Option<ParticleLayer>,
    _video: VideoLayer,
}

impl Drop for Stage {
    fn drop(&mut self) {
        let _ = self.mount.remove_child(&self.root);
    }
}

pub fn mount(mount: HtmlElement) -> Result<(), JsValue> {
    // Remount replaces any previous stage.
    unmount();

    let window = web_sys::window().ok_or("no window")?;
    let document = window.document().ok_or("no document")?;
    let profile =
        Profile::from_user_agent(&window.navigator().user_agent().unwrap_or_default());
    log::info!("mounting stage with {profile:?} profile");

    let root = document.create_element("div")?.dyn_into::<HtmlElement>()?;
    let style = root.style();
    style.set_property("position", "fixed")?;
    style.set_property("inset", "0")?;
    style.set_property("overflow", "hidden")?;
    style.set_property("background", "#000")?;
    mount.append_child(&root)?;

    // Fixed stacking order: animation canvases at the bottom, video in
    // the middle, overlays on top.
    let rain = rain_layer::mount(&window, &document, &root, profile)?;
    let particles = particle_layer::mount(&window, &document, &root, profile)?;
    let src = mount
        .get_attribute("data-video")
        .unwrap_or_else(|| DEFAULT_VIDEO_SRC.to_string());
    let video = video_layer::mount(&document, &root, &src)?;
    overlays::mount(&document, &root)?;

    STAGE.with(|slot| {
        *slot.borrow_mut() = Some(Stage {
            mount,
            root,
            _rain: rain,
            _particles: particles,
            _video: video,
        })
    });
    Ok(())
}

pub fn unmount() {
    STAGE.with(|slot| {
        if slot.borrow_mut().take().is_some() {
            log::info!("stage unmounted");
        }
    });
}
