use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlAnchorElement, HtmlDocument, HtmlTextAreaElement, Window};

use geobox_shared::{BoxExport, CommittedBox};

use crate::dom::show_tooltip;

fn now_utc() -> Option<chrono::DateTime<chrono::Utc>> {
    chrono::DateTime::from_timestamp_millis(js_sys::Date::now() as i64)
}

/// Hidden-textarea copy for browsers without the async clipboard.
fn copy_with_exec_command(document: &Document, text: &str) -> bool {
    let Some(body) = document.body() else {
        return false;
    };
    let Ok(textarea) = document
        .create_element("textarea")
        .and_then(|element| element.dyn_into::<HtmlTextAreaElement>().map_err(JsValue::from))
    else {
        return false;
    };
    textarea.set_value(text);
    if body.append_child(&textarea).is_err() {
        return false;
    }
    textarea.select();
    let copied = document
        .clone()
        .dyn_into::<HtmlDocument>()
        .ok()
        .and_then(|html| html.exec_command("copy").ok())
        .unwrap_or(false);
    textarea.remove();
    copied
}

pub fn copy_coordinates(
    window: &Window,
    document: &Document,
    anchor: &Element,
    committed: &CommittedBox,
) {
    let text = match committed.to_json_pretty() {
        Ok(text) => text,
        Err(error) => {
            log::error!("copy: cannot serialize box: {error}");
            return;
        }
    };
    let promise = window.navigator().clipboard().write_text(&text);

    let ok_window = window.clone();
    let ok_document = document.clone();
    let ok_anchor = anchor.clone();
    let on_ok = Closure::<dyn FnMut(JsValue)>::new(move |_| {
        show_tooltip(&ok_window, &ok_document, &ok_anchor, "Coordinates copied to clipboard!");
    });

    let err_window = window.clone();
    let err_document = document.clone();
    let err_anchor = anchor.clone();
    let on_err = Closure::<dyn FnMut(JsValue)>::new(move |error: JsValue| {
        log::warn!("clipboard write failed: {error:?}, falling back to execCommand");
        let message = if copy_with_exec_command(&err_document, &text) {
            "Coordinates copied!"
        } else {
            "Copy failed"
        };
        show_tooltip(&err_window, &err_document, &err_anchor, message);
    });

    let _ = promise.then2(&on_ok, &on_err);
    on_ok.forget();
    on_err.forget();
}

pub fn download_export(
    window: &Window,
    document: &Document,
    anchor: &Element,
    committed: &CommittedBox,
) -> Result<(), JsValue> {
    let created_at = now_utc().ok_or_else(|| JsValue::from_str("Invalid clock"))?;
    let record = BoxExport::new(committed, created_at);
    let json = record
        .to_json_pretty()
        .map_err(|error| JsValue::from_str(&error.to_string()))?;
    let encoded = js_sys::encode_uri_component(&json);
    let href = format!("data:application/json;charset=utf-8,{encoded}");
    let link = document
        .create_element("a")?
        .dyn_into::<HtmlAnchorElement>()
        .map_err(|_| JsValue::from_str("Invalid anchor element"))?;
    link.set_href(&href);
    link.set_download(&record.file_name());
    link.click();
    log::info!("exported {}", record.id);
    show_tooltip(window, document, anchor, "Data exported as JSON!");
    Ok(())
}
