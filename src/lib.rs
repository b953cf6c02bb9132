//! Full-screen decorative backdrop: digital rain and particle canvases,
//! a looping background video, and static CRT-style overlays, stacked
//! into one composition and driven by the browser's frame callbacks.
//!
//! The simulation modules below are pure and compile on every target;
//! DOM and canvas plumbing only exists for wasm32.

pub mod charset;
pub mod particles;
pub mod profile;
pub mod rain;

#[cfg(target_arch = "wasm32")]
pub mod wasm {
    use wasm_bindgen::prelude::*;

    pub mod overlays;
    pub mod particle_layer;
    pub mod rain_layer;
    pub mod stage;
    pub mod surface;
    pub mod video_layer;

    #[wasm_bindgen(start)]
    pub fn main() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).ok();
        mount_at("stage")
    }

    /// Builds the full layer stack inside the element with the given id.
    #[wasm_bindgen]
    pub fn mount_at(id: &str) -> Result<(), JsValue> {
        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;
        let mount = document
            .get_element_by_id(id)
            .ok_or("mount element not found")?
            .dyn_into::<web_sys::HtmlElement>()?;
        stage::mount(mount)
    }

    /// Tears the composition down: cancels pending animation frames,
    /// removes listeners and timers, and detaches the DOM subtree.
    #[wasm_bindgen]
    pub fn unmount() {
        stage::unmount();
    }
}
