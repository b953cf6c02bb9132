//! The particle-field canvas layer: ambient glowing particles, their
//! connection lines, transient sparks, and the slow glow blobs.

use std::cell::RefCell;
use std::f64::consts::TAU;
use std::rc::Rc;

use wasm_bindgen::JsValue;
use web_sys::{Document, HtmlElement, Window};

use super::surface::{self, Canvas2d, Debounce, FrameLoop, Listener};
use crate::particles::{self, ParticleField};
use crate::profile::{ParticleTuning, Profile, RESIZE_DEBOUNCE_MS};

pub struct ParticleLayer {
    _frames: FrameLoop,
    _resize: Listener,
    _debounce: Rc<Debounce>,
}

struct State {
    surface: Canvas2d,
    field: ParticleField,
    tuning: &'static ParticleTuning,
    last_ts: f64,
}

pub fn mount(
    window: &Window,
    document: &Document,
    parent: &HtmlElement,
    profile: Profile,
) -> Result<Option<ParticleLayer>, JsValue> {
    let Some(surface) = Canvas2d::create(document, "1")? else {
        return Ok(None);
    };
    parent.append_child(&surface.canvas)?;

    let tuning = profile.particles();
    let (w, h) = surface::viewport(window);
    let dpr = surface::capped_dpr(window);
    surface.fit_viewport(w, h, dpr)?;

    let mut rng = || js_sys::Math::random();
    let field = ParticleField::new(*tuning, w, h, &mut rng);
    log::debug!("particles: {} at {w}x{h}", field.particles().len());

    let state = Rc::new(RefCell::new(State {
        surface,
        field,
        tuning,
        last_ts: 0.0,
    }));

    // Particles are regenerated for the new viewport; sparks are just
    // dropped, they respawn on their own.
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
            draw_frame(&mut st, ts);
        })?
    };

    Ok(Some(ParticleLayer {
        _frames: frames,
        _resize: resize,
        _debounce: debounce,
    }))
}

fn draw_frame(st: &mut State, ts: f64) {
    let State { surface, field, .. } = st;
    let ctx = &surface.ctx;
    let (w, h) = (field.width(), field.height());

    // Glow here comes from radial gradients, so a full clear each frame
    // rather than the rain layer's fade trick.
    ctx.clear_rect(0.0, 0.0, w, h);

    let mut rng = || js_sys::Math::random();
    field.maybe_spawn_spark(&mut rng);

    field.step_sparks(|s, life| {
        let Ok(gradient) = ctx.create_radial_gradient(s.x, s.y, 0.0, s.x, s.y, s.radius * 4.0)
        else {
            return;
        };
        let _ = gradient.add_color_stop(0.0, &format!("rgba(200, 255, 200, {life})"));
        let _ = gradient.add_color_stop(0.3, &format!("rgba(0, 255, 136, {})", life * 0.6));
        let _ = gradient.add_color_stop(1.0, "rgba(0, 255, 136, 0)");
        ctx.begin_path();
        let _ = ctx.arc(s.x, s.y, s.radius * 4.0, 0.0, TAU);
        ctx.set_fill_style_canvas_gradient(&gradient);
        ctx.fill();
    });

    field.step_particles(|p, opacity| {
        // Soft outer glow in the particle's hue.
        if let Ok(glow) = ctx.create_radial_gradient(p.x, p.y, 0.0, p.x, p.y, p.radius * 6.0) {
            let hue = p.hue;
            let _ = glow.add_color_stop(0.0, &format!("hsla({hue}, 100%, 70%, {opacity})"));
            let _ = glow.add_color_stop(0.3, &format!("hsla({hue}, 100%, 50%, {})", opacity * 0.5));
            let _ = glow.add_color_stop(0.6, &format!("hsla({hue}, 100%, 40%, {})", opacity * 0.2));
            let _ = glow.add_color_stop(1.0, "hsla(150, 100%, 50%, 0)");
            ctx.begin_path();
            let _ = ctx.arc(p.x, p.y, p.radius * 6.0, 0.0, TAU);
            ctx.set_fill_style_canvas_gradient(&glow);
            ctx.fill();
        }

        // Bright core.
        ctx.begin_path();
        let _ = ctx.arc(p.x, p.y, p.radius * 0.8, 0.0, TAU);
        ctx.set_fill_style_str(&format!("hsla({}, 100%, 90%, {opacity})", p.hue));
        ctx.fill();
    });

    ctx.set_line_width(1.0);
    field.connections(|x1, y1, x2, y2, alpha| {
        ctx.set_stroke_style_str(&format!("rgba(0, 255, 136, {alpha})"));
        ctx.begin_path();
        ctx.move_to(x1, y1);
        ctx.line_to(x2, y2);
        ctx.stroke();
    });

    for i in 0..particles::AMBIENT_BLOBS {
        let (x, y, radius) = particles::ambient_blob(i, ts, w, h);
        let Ok(ambient) = ctx.create_radial_gradient(x, y, 0.0, x, y, radius) else {
            continue;
        };
        let _ = ambient.add_color_stop(0.0, "rgba(0, 255, 136, 0.03)");
        let _ = ambient.add_color_stop(0.5, "rgba(0, 200, 100, 0.01)");
        let _ = ambient.add_color_stop(1.0, "rgba(0, 150, 80, 0)");
        ctx.begin_path();
        let _ = ctx.arc(x, y, radius, 0.0, TAU);
        ctx.set_fill_style_canvas_gradient(&ambient);
        ctx.fill();
    }
}
