use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    CanvasRenderingContext2d, Document, Element, HtmlCanvasElement, HtmlElement, MouseEvent,
    Window,
};

pub fn get_element<T: JsCast>(document: &Document, id: &str) -> Result<T, JsValue> {
    let element = document
        .get_element_by_id(id)
        .ok_or_else(|| JsValue::from_str(&format!("Missing element: {id}")))?;
    element
        .dyn_into::<T>()
        .map_err(|_| JsValue::from_str(&format!("Invalid element type: {id}")))
}

pub fn canvas_context(canvas: &HtmlCanvasElement) -> Result<CanvasRenderingContext2d, JsValue> {
    canvas
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("Missing 2d context"))?
        .dyn_into::<CanvasRenderingContext2d>()
        .map_err(|_| JsValue::from_str("Invalid 2d context"))
}

pub fn set_cursor(canvas: &HtmlCanvasElement, cursor: &str) {
    if let Ok(element) = canvas.clone().dyn_into::<HtmlElement>() {
        let _ = element.style().set_property("cursor", cursor);
    }
}

pub fn set_hidden(element: &Element, hidden: bool) {
    let _ = element.class_list().toggle_with_force("hidden", hidden);
}

pub fn set_text(element: &Element, text: &str) {
    element.set_text_content(Some(text));
}

/// Sizes the backing store for the device pixel ratio and returns the CSS size.
pub fn resize_canvas(
    window: &Window,
    canvas: &HtmlCanvasElement,
    ctx: &CanvasRenderingContext2d,
) -> (f64, f64) {
    let rect = canvas.get_bounding_client_rect();
    let dpr = window.device_pixel_ratio();
    canvas.set_width((rect.width() * dpr) as u32);
    canvas.set_height((rect.height() * dpr) as u32);
    let _ = ctx.set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0);
    log::debug!("canvas resized to {}x{} @{dpr}", rect.width(), rect.height());
    (rect.width(), rect.height())
}

/// Pointer position in CSS pixels relative to the canvas.
pub fn event_to_screen(canvas: &HtmlCanvasElement, event: &MouseEvent) -> Option<(f64, f64)> {
    let rect = canvas.get_bounding_client_rect();
    if rect.width() <= 0.0 || rect.height() <= 0.0 {
        return None;
    }
    let x = event.client_x() as f64 - rect.left();
    let y = event.client_y() as f64 - rect.top();
    Some((x, y))
}

/// Pointer position in backing-store pixels, for canvases drawn without a
/// CSS-to-device transform.
pub fn event_to_canvas_pixels(
    canvas: &HtmlCanvasElement,
    event: &MouseEvent,
) -> Option<(f64, f64)> {
    let rect = canvas.get_bounding_client_rect();
    if rect.width() <= 0.0 || rect.height() <= 0.0 {
        return None;
    }
    let scale_x = canvas.width() as f64 / rect.width();
    let scale_y = canvas.height() as f64 / rect.height();
    let x = (event.client_x() as f64 - rect.left()) * scale_x;
    let y = (event.client_y() as f64 - rect.top()) * scale_y;
    Some((x, y))
}

fn set_timeout(window: &Window, millis: i32, callback: impl FnOnce() + 'static) {
    let cb = Closure::once_into_js(callback);
    let _ = window
        .set_timeout_with_callback_and_timeout_and_arguments_0(cb.unchecked_ref(), millis);
}

/// Floating hint under `anchor` that fades out after two seconds.
pub fn show_tooltip(window: &Window, document: &Document, anchor: &Element, message: &str) {
    let Ok(tooltip) = document.create_element("div") else {
        return;
    };
    tooltip.set_class_name("custom-tooltip");
    tooltip.set_text_content(Some(message));
    let Some(body) = document.body() else {
        return;
    };
    if body.append_child(&tooltip).is_err() {
        return;
    }
    if let Ok(html) = tooltip.clone().dyn_into::<HtmlElement>() {
        let rect = anchor.get_bounding_client_rect();
        let left = rect.left() + rect.width() / 2.0 - html.offset_width() as f64 / 2.0;
        let style = html.style();
        let _ = style.set_property("left", &format!("{left}px"));
        let _ = style.set_property("top", &format!("{}px", rect.bottom() + 10.0));
    }

    let shown = tooltip.clone();
    set_timeout(window, 10, move || {
        let _ = shown.class_list().add_1("show");
    });
    let window_cb = window.clone();
    set_timeout(window, 2000, move || {
        let _ = tooltip.class_list().remove_1("show");
        set_timeout(&window_cb, 300, move || tooltip.remove());
    });
}

pub fn flash_opacity(window: &Window, element: &HtmlElement, millis: i32) {
    let _ = element.style().set_property("opacity", "0.5");
    let element = element.clone();
    set_timeout(window, millis, move || {
        let _ = element.style().set_property("opacity", "1");
    });
}
