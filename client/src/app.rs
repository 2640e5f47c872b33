use std::cell::{Cell, RefCell};
use std::rc::Rc;

use js_sys::Reflect;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    Document, Element, Event, HtmlButtonElement, HtmlCanvasElement, KeyboardEvent, MouseEvent,
    PointerEvent, WheelEvent, Window,
};

use geobox_shared::{BoundingBoxDrawer, Mode, Viewport};

use crate::config::ClientConfig;
use crate::dom::{canvas_context, event_to_screen, get_element, resize_canvas, show_tooltip};
use crate::export::{copy_coordinates, download_export};
use crate::host::CanvasHost;
use crate::keys::{map_shortcut, MapShortcut};
use crate::logging;
use crate::panel::{BoxPanel, PanelElements};
use crate::render::redraw_map;
use crate::stamp_pad;
use crate::state::{MapState, PanMode, PointerLock, CLICK_SLOP_PX, UNIT_SCROLL};

const DRAW_LABEL: &str = "Draw Bounding Box";
const CANCEL_LABEL: &str = "Cancel Drawing";

fn document_ready_state(document: &Document) -> Option<String> {
    Reflect::get(document.as_ref(), &JsValue::from_str("readyState"))
        .ok()?
        .as_string()
}

#[wasm_bindgen(start)]
pub fn run() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("Missing window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("Missing document"))?;
    let started = Rc::new(Cell::new(false));

    if document_ready_state(&document).as_deref() == Some("complete") {
        started.set(true);
        return start_app();
    }

    let onload_started = started.clone();
    let onload = Closure::<dyn FnMut(Event)>::new(move |_| {
        if onload_started.replace(true) {
            return;
        }
        if let Err(err) = start_app() {
            web_sys::console::error_1(&err);
        }
    });
    window.add_event_listener_with_callback("load", onload.as_ref().unchecked_ref())?;
    onload.forget();

    Ok(())
}

fn start_app() -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("Missing window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("Missing document"))?;

    let search = window.location().search().ok().unwrap_or_default();
    let config = ClientConfig::from_query(&search);
    logging::init(config.log_level());
    log::debug!("starting with {config:?}");

    let has_map = document.get_element_by_id("map-canvas").is_some();
    if has_map {
        start_map(&window, &document, &config)?;
    }
    if document.get_element_by_id("stamp-canvas").is_some() {
        stamp_pad::start(&window, &document, !has_map)?;
    }
    if !has_map && document.get_element_by_id("stamp-canvas").is_none() {
        log::warn!("no #map-canvas or #stamp-canvas on this page");
    }
    Ok(())
}

fn sync_draw_button(button: &HtmlButtonElement, drawing: bool) {
    button.set_text_content(Some(if drawing { CANCEL_LABEL } else { DRAW_LABEL }));
    let _ = button.class_list().toggle_with_force("active", drawing);
    let _ = button.set_attribute("aria-pressed", if drawing { "true" } else { "false" });
}

fn toggle_drawing(
    state: &Rc<RefCell<MapState>>,
    window: &Window,
    document: &Document,
    draw_button: &HtmlButtonElement,
) {
    let mut state = state.borrow_mut();
    state.pan = PanMode::Idle;
    state.draw_pointer.reset();
    state.drawer.toggle();
    let drawing = state.drawer.is_drawing();
    sync_draw_button(draw_button, drawing);
    if drawing {
        show_tooltip(
            window,
            document,
            draw_button,
            "Click and drag on the map to draw a bounding box",
        );
    }
    if state.take_dirty() {
        redraw_map(&state);
    }
}

fn clear_boxes(
    state: &Rc<RefCell<MapState>>,
    window: &Window,
    document: &Document,
    draw_button: &HtmlButtonElement,
    clear_button: &Element,
) {
    let mut state = state.borrow_mut();
    state.draw_pointer.reset();
    state.drawer.clear();
    sync_draw_button(draw_button, false);
    if state.take_dirty() {
        redraw_map(&state);
    }
    show_tooltip(window, document, clear_button, "All shapes cleared");
}

fn copy_selected(
    state: &Rc<RefCell<MapState>>,
    window: &Window,
    document: &Document,
    anchor: &Element,
) {
    let selected = state.borrow().drawer.display().selected().copied();
    if let Some(committed) = selected {
        copy_coordinates(window, document, anchor, &committed);
    }
}

fn has_anchor(state: &MapState) -> bool {
    matches!(
        state.drawer.mode(),
        Mode::Drawing {
            anchor: Some(_),
            ..
        }
    )
}

/// A pan released close to where it started selects the box under it.
fn select_on_click(state: &mut MapState, start: (f64, f64), end: Option<(f64, f64)>) {
    let Some((x, y)) = end else {
        return;
    };
    if (x - start.0).hypot(y - start.1) > CLICK_SLOP_PX {
        return;
    }
    let Some(point) = state.host().viewport.screen_to_geo(x, y) else {
        return;
    };
    state.drawer.display_mut().select_at(point);
}

fn finish_gesture(state: &mut MapState, event: &PointerEvent, canvas: &HtmlCanvasElement) -> bool {
    let screen = event_to_screen(canvas, event).unwrap_or((f64::NAN, f64::NAN));
    let committed = state.drawer.pointer_up(&screen).is_some();
    let _ = canvas.release_pointer_capture(event.pointer_id());
    committed
}

fn start_map(window: &Window, document: &Document, config: &ClientConfig) -> Result<(), JsValue> {
    let canvas: HtmlCanvasElement = get_element(document, "map-canvas")?;
    let draw_button: HtmlButtonElement = get_element(document, "draw-button")?;
    let clear_button: HtmlButtonElement = get_element(document, "clear-button")?;
    let copy_button: HtmlButtonElement = get_element(document, "copy-button")?;
    let export_button: HtmlButtonElement = get_element(document, "export-button")?;
    let close_panel_button: HtmlButtonElement = get_element(document, "close-panel-button")?;
    let panel = PanelElements::lookup(document)?;

    let ctx = canvas_context(&canvas)?;
    let _ = canvas.style().set_property("touch-action", "none");
    let (width, height) = resize_canvas(window, &canvas, &ctx);
    let viewport = Viewport::new(config.center, config.zoom, width, height);
    let host = CanvasHost::new(canvas.clone(), viewport);
    host.set_grabbing(false);
    let drawer = BoundingBoxDrawer::new(host, BoxPanel::new(panel), config.drawer);

    let state = Rc::new(RefCell::new(MapState {
        drawer,
        ctx,
        pan: PanMode::Idle,
        draw_pointer: PointerLock::default(),
    }));
    redraw_map(&state.borrow());
    sync_draw_button(&draw_button, false);

    {
        let resize_state = state.clone();
        let window_cb = window.clone();
        let onresize = Closure::<dyn FnMut()>::new(move || {
            let mut state = resize_state.borrow_mut();
            let canvas = state.host().canvas.clone();
            let (width, height) = resize_canvas(&window_cb, &canvas, &state.ctx);
            state.host_mut().viewport.resize(width, height);
            redraw_map(&state);
        });
        window.add_event_listener_with_callback("resize", onresize.as_ref().unchecked_ref())?;
        onresize.forget();
    }

    {
        let click_state = state.clone();
        let window_cb = window.clone();
        let document_cb = document.clone();
        let draw_button_cb = draw_button.clone();
        let onclick = Closure::<dyn FnMut(Event)>::new(move |_| {
            toggle_drawing(&click_state, &window_cb, &document_cb, &draw_button_cb);
        });
        draw_button.add_event_listener_with_callback("click", onclick.as_ref().unchecked_ref())?;
        onclick.forget();
    }

    {
        let click_state = state.clone();
        let window_cb = window.clone();
        let document_cb = document.clone();
        let draw_button_cb = draw_button.clone();
        let clear_button_cb = clear_button.clone();
        let onclick = Closure::<dyn FnMut(Event)>::new(move |_| {
            clear_boxes(
                &click_state,
                &window_cb,
                &document_cb,
                &draw_button_cb,
                &clear_button_cb,
            );
        });
        clear_button.add_event_listener_with_callback("click", onclick.as_ref().unchecked_ref())?;
        onclick.forget();
    }

    {
        let click_state = state.clone();
        let window_cb = window.clone();
        let document_cb = document.clone();
        let copy_button_cb = copy_button.clone();
        let onclick = Closure::<dyn FnMut(Event)>::new(move |_| {
            copy_selected(&click_state, &window_cb, &document_cb, &copy_button_cb);
        });
        copy_button.add_event_listener_with_callback("click", onclick.as_ref().unchecked_ref())?;
        onclick.forget();
    }

    {
        let click_state = state.clone();
        let window_cb = window.clone();
        let document_cb = document.clone();
        let export_button_cb = export_button.clone();
        let onclick = Closure::<dyn FnMut(Event)>::new(move |_| {
            let selected = click_state.borrow().drawer.display().selected().copied();
            let Some(committed) = selected else {
                return;
            };
            if let Err(err) = download_export(&window_cb, &document_cb, &export_button_cb, &committed) {
                web_sys::console::error_1(&err);
            }
        });
        export_button
            .add_event_listener_with_callback("click", onclick.as_ref().unchecked_ref())?;
        onclick.forget();
    }

    {
        let click_state = state.clone();
        let onclick = Closure::<dyn FnMut(Event)>::new(move |_| {
            click_state.borrow().drawer.display().hide();
        });
        close_panel_button
            .add_event_listener_with_callback("click", onclick.as_ref().unchecked_ref())?;
        onclick.forget();
    }

    {
        let key_state = state.clone();
        let window_cb = window.clone();
        let document_cb = document.clone();
        let draw_button_cb = draw_button.clone();
        let clear_button_cb = clear_button.clone();
        let copy_button_cb = copy_button.clone();
        let onkeydown = Closure::<dyn FnMut(KeyboardEvent)>::new(move |event: KeyboardEvent| {
            let modifier = event.meta_key() || event.ctrl_key();
            let Some(shortcut) = map_shortcut(&event.key(), modifier, event.shift_key()) else {
                return;
            };
            match shortcut {
                MapShortcut::ToggleDrawing => {
                    event.prevent_default();
                    toggle_drawing(&key_state, &window_cb, &document_cb, &draw_button_cb);
                }
                MapShortcut::Clear => {
                    event.prevent_default();
                    clear_boxes(
                        &key_state,
                        &window_cb,
                        &document_cb,
                        &draw_button_cb,
                        &clear_button_cb,
                    );
                }
                MapShortcut::Copy => {
                    event.prevent_default();
                    copy_selected(&key_state, &window_cb, &document_cb, &copy_button_cb);
                }
                MapShortcut::CancelDrawing => {
                    if key_state.borrow().drawer.is_drawing() {
                        toggle_drawing(&key_state, &window_cb, &document_cb, &draw_button_cb);
                    }
                }
            }
        });
        window.add_event_listener_with_callback("keydown", onkeydown.as_ref().unchecked_ref())?;
        onkeydown.forget();
    }

    {
        let down_state = state.clone();
        let down_canvas = canvas.clone();
        let ondown = Closure::<dyn FnMut(PointerEvent)>::new(move |event: PointerEvent| {
            if event.button() != 0 {
                return;
            }
            let Some(screen) = event_to_screen(&down_canvas, &event) else {
                return;
            };
            event.prevent_default();
            let mut state = down_state.borrow_mut();
            if state.drawer.is_drawing() {
                if !state.draw_pointer.claim(event.pointer_id()) {
                    return;
                }
                state.drawer.pointer_down(&screen);
                if !has_anchor(&state) {
                    state.draw_pointer.reset();
                    return;
                }
            } else if state.host().interactions_enabled() {
                if matches!(state.pan, PanMode::Active { .. }) {
                    return;
                }
                state.pan = PanMode::Active {
                    pointer_id: event.pointer_id(),
                    start_x: screen.0,
                    start_y: screen.1,
                    last_x: screen.0,
                    last_y: screen.1,
                };
                state.host().set_grabbing(true);
            } else {
                return;
            }
            let _ = down_canvas.set_pointer_capture(event.pointer_id());
            if state.take_dirty() {
                redraw_map(&state);
            }
        });
        canvas.add_event_listener_with_callback("pointerdown", ondown.as_ref().unchecked_ref())?;
        ondown.forget();
    }

    {
        let move_state = state.clone();
        let move_canvas = canvas.clone();
        let onmove = Closure::<dyn FnMut(PointerEvent)>::new(move |event: PointerEvent| {
            let Some(screen) = event_to_screen(&move_canvas, &event) else {
                return;
            };
            let mut state = move_state.borrow_mut();
            if state.drawer.is_drawing() {
                if !state.draw_pointer.owns(event.pointer_id()) {
                    return;
                }
                state.drawer.pointer_move(&screen);
            } else if let PanMode::Active {
                pointer_id,
                start_x,
                start_y,
                last_x,
                last_y,
            } = state.pan
            {
                if pointer_id != event.pointer_id() {
                    return;
                }
                state.pan = PanMode::Active {
                    pointer_id,
                    start_x,
                    start_y,
                    last_x: screen.0,
                    last_y: screen.1,
                };
                let host = state.host_mut();
                host.viewport.pan_by(screen.0 - last_x, screen.1 - last_y);
                host.mark_dirty();
            }
            if state.take_dirty() {
                redraw_map(&state);
            }
        });
        canvas.add_event_listener_with_callback("pointermove", onmove.as_ref().unchecked_ref())?;
        onmove.forget();
    }

    {
        let up_state = state.clone();
        let up_canvas = canvas.clone();
        let up_window = window.clone();
        let up_document = document.clone();
        let up_draw_button = draw_button.clone();
        let onup = Closure::<dyn FnMut(PointerEvent)>::new(move |event: PointerEvent| {
            let mut state = up_state.borrow_mut();
            if state.drawer.is_drawing() {
                if !state.draw_pointer.release(event.pointer_id()) {
                    return;
                }
                let committed = finish_gesture(&mut state, &event, &up_canvas);
                sync_draw_button(&up_draw_button, state.drawer.is_drawing());
                if committed {
                    show_tooltip(
                        &up_window,
                        &up_document,
                        &up_draw_button,
                        "Bounding box created successfully!",
                    );
                }
            } else if let Some(start) = state.pan.end(event.pointer_id()) {
                state.host().set_grabbing(false);
                let _ = up_canvas.release_pointer_capture(event.pointer_id());
                select_on_click(&mut state, start, event_to_screen(&up_canvas, &event));
            }
            if state.take_dirty() {
                redraw_map(&state);
            }
        });
        canvas.add_event_listener_with_callback("pointerup", onup.as_ref().unchecked_ref())?;
        onup.forget();
    }

    {
        let cancel_state = state.clone();
        let cancel_canvas = canvas.clone();
        let cancel_draw_button = draw_button.clone();
        let oncancel = Closure::<dyn FnMut(PointerEvent)>::new(move |event: PointerEvent| {
            let mut state = cancel_state.borrow_mut();
            let pointer_id = event.pointer_id();
            if state.drawer.is_drawing() {
                if !state.draw_pointer.release(pointer_id) {
                    return;
                }
                log::debug!("pointer {pointer_id} cancelled mid-gesture");
                state.drawer.cancel();
                sync_draw_button(&cancel_draw_button, false);
            } else if state.pan.end(pointer_id).is_some() {
                state.host().set_grabbing(false);
            } else {
                return;
            }
            let _ = cancel_canvas.release_pointer_capture(pointer_id);
            if state.take_dirty() {
                redraw_map(&state);
            }
        });
        canvas.add_event_listener_with_callback(
            "pointercancel",
            oncancel.as_ref().unchecked_ref(),
        )?;
        oncancel.forget();
    }

    {
        let wheel_state = state.clone();
        let wheel_canvas = canvas.clone();
        let onwheel = Closure::<dyn FnMut(WheelEvent)>::new(move |event: WheelEvent| {
            event.prevent_default();
            let mut state = wheel_state.borrow_mut();
            if !state.host().interactions_enabled() {
                return;
            }
            let Some((x, y)) = event_to_screen(&wheel_canvas, &event) else {
                return;
            };
            let factor = (-event.delta_y() / UNIT_SCROLL).exp();
            let host = state.host_mut();
            host.viewport.zoom_at(factor, x, y);
            host.mark_dirty();
            if state.take_dirty() {
                redraw_map(&state);
            }
        });
        canvas.add_event_listener_with_callback("wheel", onwheel.as_ref().unchecked_ref())?;
        onwheel.forget();
    }

    {
        let dbl_state = state.clone();
        let dbl_canvas = canvas.clone();
        let ondblclick = Closure::<dyn FnMut(MouseEvent)>::new(move |event: MouseEvent| {
            let mut state = dbl_state.borrow_mut();
            if !state.host().interactions_enabled() {
                return;
            }
            let Some((x, y)) = event_to_screen(&dbl_canvas, &event) else {
                return;
            };
            event.prevent_default();
            let host = state.host_mut();
            host.viewport.zoom_at(2.0, x, y);
            host.mark_dirty();
            if state.take_dirty() {
                redraw_map(&state);
            }
        });
        canvas.add_event_listener_with_callback("dblclick", ondblclick.as_ref().unchecked_ref())?;
        ondblclick.forget();
    }

    {
        let menu_state = state.clone();
        let oncontextmenu = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
            if menu_state.borrow().drawer.is_drawing() {
                event.prevent_default();
            }
        });
        canvas.add_event_listener_with_callback(
            "contextmenu",
            oncontextmenu.as_ref().unchecked_ref(),
        )?;
        oncontextmenu.forget();
    }

    log::info!(
        "map ready at {:.4}, {:.4} zoom {}, minimum size {:?}",
        config.center.lat,
        config.center.lng,
        config.zoom,
        state.borrow().drawer.config().minimum_size
    );
    Ok(())
}
