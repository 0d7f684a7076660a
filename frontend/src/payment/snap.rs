use web_sys::js_sys::{Object, Reflect};
use log::{error, warn};
use wasm_bindgen::prelude::*;
use web_sys::window;
use yew::Callback;

use crate::payment::checkout::{CheckoutError, CheckoutWidget, WidgetEvent, WidgetResult};

#[wasm_bindgen]
extern "C" {
    // Midtrans Snap, loaded by index.html.
    #[wasm_bindgen(catch, js_namespace = snap, js_name = pay)]
    fn snap_pay(token: &str, options: &JsValue) -> Result<(), JsValue>;
}

fn snap_loaded() -> bool {
    window()
        .and_then(|w| Reflect::get(&w, &JsValue::from_str("snap")).ok())
        .map(|snap| !snap.is_undefined() && !snap.is_null())
        .unwrap_or(false)
}

fn parse_result(value: JsValue) -> WidgetResult {
    gloo_console::log!("Snap result", value.clone());
    serde_wasm_bindgen::from_value(value).unwrap_or_else(|e| {
        warn!("Unreadable Snap result, continuing without details: {}", e);
        WidgetResult::default()
    })
}

fn result_handler(on_event: &Callback<WidgetEvent>, wrap: fn(WidgetResult) -> WidgetEvent) -> JsValue {
    let on_event = on_event.clone();
    Closure::wrap(Box::new(move |value: JsValue| {
        on_event.emit(wrap(parse_result(value)));
    }) as Box<dyn FnMut(JsValue)>)
    .into_js_value()
}

/// Hosted checkout popup. Each `open` registers four one-shot handlers.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SnapWidget;

impl CheckoutWidget for SnapWidget {
    fn open(&self, token: &str, on_event: Callback<WidgetEvent>) -> Result<(), CheckoutError> {
        if !snap_loaded() {
            error!("window.snap is missing; checkout script not loaded");
            return Err(CheckoutError::WidgetUnavailable);
        }

        let on_close = {
            let on_event = on_event.clone();
            Closure::wrap(Box::new(move || on_event.emit(WidgetEvent::Closed)) as Box<dyn FnMut()>)
                .into_js_value()
        };

        let options = Object::new();
        let handlers = [
            ("onSuccess", result_handler(&on_event, WidgetEvent::Success)),
            ("onPending", result_handler(&on_event, WidgetEvent::Pending)),
            ("onError", result_handler(&on_event, WidgetEvent::Error)),
            ("onClose", on_close),
        ];
        for (name, handler) in handlers.iter() {
            Reflect::set(&options, &JsValue::from_str(name), handler)
                .map_err(|_| CheckoutError::WidgetUnavailable)?;
        }

        snap_pay(token, &options).map_err(|e| {
            error!("Snap refused to open: {:?}", e);
            CheckoutError::WidgetUnavailable
        })
    }
}
