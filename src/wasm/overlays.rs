//! Static overlay filters: glow border, vignette, scanlines. No state,
//! no per-frame work; the vignette and scanline textures are plain CSS
//! classes from the static stylesheet.

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, HtmlElement};

pub fn mount(document: &Document, parent: &HtmlElement) -> Result<(), JsValue> {
    // Inset glow hugging the viewport border.
    let glow = decorative_div(document)?;
    let style = glow.style();
    style.set_property("position", "fixed")?;
    style.set_property("inset", "0")?;
    style.set_property("z-index", "98")?;
    style.set_property("pointer-events", "none")?;
    style.set_property(
        "box-shadow",
        "inset 0 0 100px rgba(0, 255, 136, 0.1), inset 0 0 200px rgba(0, 255, 136, 0.05)",
    )?;
    parent.append_child(&glow)?;

    let vignette = decorative_div(document)?;
    vignette.set_class_name("vignette");
    parent.append_child(&vignette)?;

    // Topmost layer.
    let scanlines = decorative_div(document)?;
    scanlines.set_class_name("scanlines");
    parent.append_child(&scanlines)?;

    Ok(())
}

fn decorative_div(document: &Document) -> Result<HtmlElement, JsValue> {
    let div = document.create_element("div")?.dyn_into::<HtmlElement>()?;
    div.set_attribute("aria-hidden", "true")?;
    Ok(div)
}
