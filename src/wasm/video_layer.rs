//! Looping background video with autoplay-policy fallback and
//! pause-on-hidden-tab handling.

use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{Document, HtmlElement, HtmlVideoElement};

use super::surface::Listener;

pub struct VideoLayer {
    _visibility: Listener,
}

pub fn mount(document: &Document, parent: &HtmlElement, src: &str) -> Result<VideoLayer, JsValue> {
    let wrapper = document.create_element("div")?.dyn_into::<HtmlElement>()?;
    let style = wrapper.style();
    style.set_property("position", "fixed")?;
    style.set_property("inset", "0")?;
    style.set_property("z-index", "10")?;
    style.set_property("display", "flex")?;
    style.set_property("align-items", "center")?;
    style.set_property("justify-content", "center")?;

    let video = document
        .create_element("video")?
        .dyn_into::<HtmlVideoElement>()?;
    video.set_src(src);
    video.set_autoplay(true);
    video.set_muted(true);
    video.set_loop(true);
    video.set_attribute("playsinline", "")?;
    let vstyle = video.style();
    vstyle.set_property("width", "100%")?;
    vstyle.set_property("height", "100%")?;
    // Letterboxed, never cropped or stretched.
    vstyle.set_property("object-fit", "contain")?;

    wrapper.append_child(&video)?;
    parent.append_child(&wrapper)?;

    spawn_local(autoplay_with_fallback(video.clone()));

    let visibility = {
        let video = video.clone();
        Listener::new(document, "visibilitychange", move || {
            let Some(doc) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };
            if doc.hidden() {
                let _ = video.pause();
            } else {
                resume(&video);
            }
        })?
    };

    Ok(VideoLayer {
        _visibility: visibility,
    })
}

/// First playback attempt. A rejection under autoplay policy gets one
/// mute-and-retry; a second rejection leaves the video paused. Both
/// rejections are consumed, never surfaced.
pub async fn autoplay_with_fallback(video: HtmlVideoElement) {
    if try_play(&video).await {
        return;
    }
    video.set_muted(true);
    if !try_play(&video).await {
        log::info!("video autoplay blocked; leaving it paused");
    }
}

async fn try_play(video: &HtmlVideoElement) -> bool {
    match video.play() {
        Ok(promise) => JsFuture::from(promise).await.is_ok(),
        Err(_) => false,
    }
}

/// Resume after the tab becomes visible again. The play promise is
/// awaited and discarded so a rejection cannot escape as an unhandled
/// one.
fn resume(video: &HtmlVideoElement) {
    if let Ok(promise) = video.play() {
        spawn_local(async move {
            let _ = JsFuture::from(promise).await;
        });
    }
}
