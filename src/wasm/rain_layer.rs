//! The digital-rain canvas layer: owns a [`RainField`] and paints it.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsValue;
use web_sys::{Document, HtmlElement, Window};

use super::surface::{self, Canvas2d, Debounce, FrameLoop, Listener};
use crate::charset;
use crate::profile::{Profile, RainTuning, RESIZE_DEBOUNCE_MS};
use crate::rain::{GlyphKind, RainField};

pub struct RainLayer {
    _frames: FrameLoop,
    _resize: Listener,
    _debounce: Rc<Debounce>,
}

struct State {
    surface: Canvas2d,
    field: RainField,
    pool: Vec<char>,
    tuning: &'static RainTuning,
    last_ts: f64,
}

pub fn mount(
    window: &Window,
    document: &Document,
    parent: &HtmlElement,
    profile: Profile,
) -> Result<Option<RainLayer>, JsValue> {
    let Some(surface) = Canvas2d::create(document, "0")? else {
        return Ok(None);
    };
    parent.append_child(&surface.canvas)?;

    let tuning = profile.rain();
    let (w, h) = surface::viewport(window);
    let dpr = surface::capped_dpr(window);
    surface.fit_viewport(w, h, dpr)?;

    let mut rng = || js_sys::Math::random();
    let field = RainField::new(*tuning, w, h, &mut rng);
    log::debug!("rain: {} columns at {w}x{h}", field.columns().len());

    let state = Rc::new(RefCell::new(State {
        surface,
        field,
        pool: charset::glyph_pool(),
        tuning,
        last_ts: 0.0,
    }));

    // One full recomputation per quiet period, however many resize
    // events arrive. The column collection is rebuilt whole.
    let debounce = {
        let state = state.clone();
        Rc::new(Debounce::new(RESIZE_DEBOUNCE_MS, move || {
            let Some(win) = web_sys::window() else { return };
            let mut st = state.borrow_mut();
            let (w, h) = surface::viewport(&win);
            let dpr = surface::capped_dpr(&win);
            if st.surface.fit_viewport(w, h, dpr).is_err() {
                return;
            }
            let mut rng = || js_sys::Math::random();
            st.field.rebuild(w, h, &mut rng);
            log::debug!("rain resized: {} columns at {w}x{h}", st.field.columns().len());
        }))
    };

    let resize = {
        let debounce = debounce.clone();
        Listener::passive(window, "resize", move || debounce.poke())?
    };

    let frames = {
        let state = state.clone();
        FrameLoop::start(move |ts| {
            let mut st = state.borrow_mut();
            if ts - st.last_ts < st.tuning.frame_interval_ms {
                return;
            }
            st.last_ts = ts;
            draw_frame(&mut st);
        })?
    };

    Ok(Some(RainLayer {
        _frames: frames,
        _resize: resize,
        _debounce: debounce,
    }))
}

fn draw_frame(st: &mut State) {
    let State {
        surface,
        field,
        pool,
        tuning,
        ..
    } = st;
    let ctx = &surface.ctx;
    let (w, h) = (field.width(), field.height());

    // Low-alpha overpaint instead of a clear; this is what leaves the
    // fading trails behind the heads.
    ctx.set_shadow_blur(0.0);
    ctx.set_fill_style_str(&format!("rgba(0, 0, 0, {})", tuning.fade_alpha));
    ctx.fill_rect(0.0, 0.0, w, h);

    ctx.set_font(&format!(
        "bold {}px \"MS Gothic\", monospace",
        tuning.glyph_size
    ));
    ctx.set_text_baseline("top");

    let glow = tuning.glow;
    let mut rng = || js_sys::Math::random();
    field.step(pool, &mut rng, |glyph| {
        match glyph.kind {
            GlyphKind::Head => {
                ctx.set_shadow_color("#00ff88");
                ctx.set_shadow_blur(glow);
                ctx.set_fill_style_str("#ffffff");
            }
            GlyphKind::Secondary => {
                ctx.set_shadow_blur(glow * 0.6);
                ctx.set_fill_style_str("#88ffaa");
            }
            GlyphKind::Trail { opacity } => {
                ctx.set_shadow_blur(0.0);
                let g = (170.0 + 85.0 * opacity).floor();
                let b = (85.0 + 50.0 * opacity).floor();
                ctx.set_fill_style_str(&format!("rgba(0, {g}, {b}, {})", opacity * 0.8));
            }
        }
        let mut buf = [0u8; 4];
        let _ = ctx.fill_text(glyph.ch.encode_utf8(&mut buf), glyph.x, glyph.y);
    });
}
