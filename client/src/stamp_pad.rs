use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    Document, Event, HtmlButtonElement, HtmlCanvasElement, HtmlElement, HtmlInputElement,
    HtmlSelectElement, KeyboardEvent, MouseEvent, PointerEvent, Window,
};

use geobox_shared::{Brush, StampPad, StampShape};

use crate::dom::{canvas_context, event_to_canvas_pixels, flash_opacity, get_element, set_text};
use crate::keys::{stamp_shortcut, StampShortcut};
use crate::render::{clear_stamp_canvas, draw_stamp};
use crate::state::{PointerLock, StampState};

fn size_label(size: f64) -> String {
    format!("{size:.0}")
}

fn brush_from_controls(
    shape_select: &HtmlSelectElement,
    color_picker: &HtmlInputElement,
    size_slider: &HtmlInputElement,
) -> Brush {
    let mut brush = Brush {
        shape: StampShape::parse(&shape_select.value()).unwrap_or_default(),
        ..Brush::default()
    };
    brush.set_color(color_picker.value());
    if let Ok(size) = size_slider.value().parse::<f64>() {
        brush.set_size(size);
    }
    brush
}

fn stamp_at(state: &mut StampState, event: &MouseEvent, pressing: bool) {
    let Some((x, y)) = event_to_canvas_pixels(&state.canvas, event) else {
        return;
    };
    let stamp = if pressing {
        state.pad.press(x, y)
    } else {
        state.pad.drag(x, y)
    };
    if let Some(stamp) = stamp {
        draw_stamp(&state.ctx, &stamp);
    }
}

fn clear_pad(state: &Rc<RefCell<StampState>>, window: &Window, clear_button: &HtmlElement) {
    let mut state = state.borrow_mut();
    state.pad.clear();
    clear_stamp_canvas(&state);
    flash_opacity(window, clear_button, 150);
    log::debug!("stamp canvas cleared");
}

fn select_shape(
    state: &Rc<RefCell<StampState>>,
    shape_select: &HtmlSelectElement,
    shape: StampShape,
) {
    shape_select.set_value(shape.as_str());
    state.borrow_mut().pad.brush.shape = shape;
}

/// Wires the freehand stamp canvas. `keyboard` enables the Ctrl+1/2/C
/// shortcuts, which would clash with the map shortcuts on a shared page.
pub fn start(window: &Window, document: &Document, keyboard: bool) -> Result<(), JsValue> {
    let canvas: HtmlCanvasElement = get_element(document, "stamp-canvas")?;
    let shape_select: HtmlSelectElement = get_element(document, "shape-select")?;
    let color_picker: HtmlInputElement = get_element(document, "color-picker")?;
    let size_slider: HtmlInputElement = get_element(document, "size-slider")?;
    let size_value: HtmlElement = get_element(document, "size-value")?;
    let clear_button: HtmlButtonElement = get_element(document, "clear-canvas")?;

    let ctx = canvas_context(&canvas)?;
    let _ = canvas.style().set_property("touch-action", "none");
    let brush = brush_from_controls(&shape_select, &color_picker, &size_slider);
    set_text(&size_value, &size_label(brush.size));
    let state = Rc::new(RefCell::new(StampState {
        canvas: canvas.clone(),
        ctx,
        pad: StampPad::new(brush),
        pointer: PointerLock::default(),
    }));
    clear_stamp_canvas(&state.borrow());

    {
        let down_state = state.clone();
        let down_canvas = canvas.clone();
        let ondown = Closure::<dyn FnMut(PointerEvent)>::new(move |event: PointerEvent| {
            if event.button() != 0 {
                return;
            }
            let mut state = down_state.borrow_mut();
            if !state.pointer.claim(event.pointer_id()) {
                return;
            }
            event.prevent_default();
            let _ = down_canvas.set_pointer_capture(event.pointer_id());
            stamp_at(&mut state, &event, true);
        });
        canvas.add_event_listener_with_callback("pointerdown", ondown.as_ref().unchecked_ref())?;
        ondown.forget();
    }

    {
        let move_state = state.clone();
        let onmove = Closure::<dyn FnMut(PointerEvent)>::new(move |event: PointerEvent| {
            let mut state = move_state.borrow_mut();
            if state.pointer.owns(event.pointer_id()) && state.pad.is_pressed() {
                stamp_at(&mut state, &event, false);
            }
        });
        canvas.add_event_listener_with_callback("pointermove", onmove.as_ref().unchecked_ref())?;
        onmove.forget();
    }

    {
        let up_state = state.clone();
        let up_canvas = canvas.clone();
        let onup = Closure::<dyn FnMut(PointerEvent)>::new(move |event: PointerEvent| {
            let mut state = up_state.borrow_mut();
            if state.pointer.release(event.pointer_id()) {
                state.pad.release();
                let _ = up_canvas.release_pointer_capture(event.pointer_id());
            }
        });
        canvas.add_event_listener_with_callback("pointerup", onup.as_ref().unchecked_ref())?;
        canvas.add_event_listener_with_callback("pointercancel", onup.as_ref().unchecked_ref())?;
        onup.forget();
    }

    {
        let change_state = state.clone();
        let select_cb = shape_select.clone();
        let onchange = Closure::<dyn FnMut(Event)>::new(move |_| {
            let shape = StampShape::parse(&select_cb.value()).unwrap_or_default();
            change_state.borrow_mut().pad.brush.shape = shape;
        });
        shape_select
            .add_event_listener_with_callback("change", onchange.as_ref().unchecked_ref())?;
        onchange.forget();
    }

    {
        let input_state = state.clone();
        let picker_cb = color_picker.clone();
        let oninput = Closure::<dyn FnMut(Event)>::new(move |_| {
            input_state.borrow_mut().pad.brush.set_color(picker_cb.value());
        });
        color_picker.add_event_listener_with_callback("input", oninput.as_ref().unchecked_ref())?;
        oninput.forget();
    }

    {
        let input_state = state.clone();
        let slider_cb = size_slider.clone();
        let size_value_cb = size_value.clone();
        let oninput = Closure::<dyn FnMut(Event)>::new(move |_| {
            let Ok(size) = slider_cb.value().parse::<f64>() else {
                return;
            };
            let mut state = input_state.borrow_mut();
            state.pad.brush.set_size(size);
            set_text(&size_value_cb, &size_label(state.pad.brush.size));
        });
        size_slider.add_event_listener_with_callback("input", oninput.as_ref().unchecked_ref())?;
        oninput.forget();
    }

    {
        let click_state = state.clone();
        let window_cb = window.clone();
        let button_cb: HtmlElement = clear_button.clone().into();
        let onclick = Closure::<dyn FnMut(Event)>::new(move |_| {
            clear_pad(&click_state, &window_cb, &button_cb);
        });
        clear_button.add_event_listener_with_callback("click", onclick.as_ref().unchecked_ref())?;
        onclick.forget();
    }

    if keyboard {
        let key_state = state.clone();
        let window_cb = window.clone();
        let select_cb = shape_select.clone();
        let button_cb: HtmlElement = clear_button.clone().into();
        let onkeydown = Closure::<dyn FnMut(KeyboardEvent)>::new(move |event: KeyboardEvent| {
            let modifier = event.meta_key() || event.ctrl_key();
            let Some(shortcut) = stamp_shortcut(&event.key(), modifier, event.shift_key()) else {
                return;
            };
            event.prevent_default();
            match shortcut {
                StampShortcut::Circle => select_shape(&key_state, &select_cb, StampShape::Circle),
                StampShortcut::Square => select_shape(&key_state, &select_cb, StampShape::Square),
                StampShortcut::Clear => clear_pad(&key_state, &window_cb, &button_cb),
            }
        });
        window.add_event_listener_with_callback("keydown", onkeydown.as_ref().unchecked_ref())?;
        onkeydown.forget();
    }

    log::info!("stamp pad ready");
    Ok(())
}
