//! Browser bindings.
//!
//! Implements the element and scheduler seams for `web_sys` and runs
//! requests through `fetch`. All failures are logged with [`tracing`]; use a
//! WASM subscriber such as `tracing-wasm` to see them in the developer tools.

mod dom;
mod fetch;

use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, NodeList};

use crate::element::Scheduler;
use crate::{Error, Result, Selection};

pub use fetch::{FetchResponse, FetchTransport};

/// Select every element of the document matching `selector`, in document order.
///
/// ## Example
///
/// ```rust,ignore
/// use appropriate::select;
///
/// select("nav a")?.on_click(|event| event.prevent_default());
/// ```
pub fn select(selector: &str) -> Result<Selection<Element>> {
    let list = document()?
        .query_selector_all(selector)
        .map_err(|err| selector_error(selector, &err))?;
    Ok(node_list_elements(&list).into())
}

/// The current window's document.
pub fn document() -> Result<Document> {
    web_sys::window()
        .ok_or_else(|| Error::Dom("No window available".to_string()))?
        .document()
        .ok_or_else(|| Error::Dom("No document available".to_string()))
}

pub(crate) fn node_list_elements(list: &NodeList) -> Vec<Element> {
    (0..list.length())
        .filter_map(|i| list.item(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

/// Best-effort message of a thrown JS value.
pub(crate) fn describe(value: &JsValue) -> String {
    if let Some(text) = value.as_string() {
        return text;
    }
    js_sys::Reflect::get(value, &JsValue::from_str("message"))
        .ok()
        .and_then(|message| message.as_string())
        .unwrap_or_else(|| format!("{:?}", value))
}

pub(crate) fn dom_error(value: JsValue) -> Error {
    Error::Dom(describe(&value))
}

pub(crate) fn selector_error(selector: &str, value: &JsValue) -> Error {
    Error::Selector {
        selector: selector.to_string(),
        message: describe(value),
    }
}

/// Scheduler backed by `requestAnimationFrame`, `setTimeout` and
/// `performance.now()` of the current window.
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserScheduler;

impl Scheduler for BrowserScheduler {
    fn now(&self) -> f64 {
        web_sys::window()
            .and_then(|window| window.performance())
            .map(|performance| performance.now())
            .unwrap_or_else(js_sys::Date::now)
    }

    fn request_frame(&self, callback: Box<dyn FnOnce(f64)>) {
        let Some(window) = web_sys::window() else {
            tracing::error!("No window available for animation frame");
            return;
        };
        let closure = Closure::once_into_js(move |timestamp: f64| callback(timestamp));
        if let Err(err) = window.request_animation_frame(closure.unchecked_ref()) {
            tracing::error!(error = %describe(&err), "requestAnimationFrame failed");
        }
    }

    fn set_timeout(&self, delay_ms: u32, callback: Box<dyn FnOnce()>) {
        let Some(window) = web_sys::window() else {
            tracing::error!("No window available for timer");
            return;
        };
        let closure = Closure::once_into_js(move || callback());
        let delay = i32::try_from(delay_ms).unwrap_or(i32::MAX);
        if let Err(err) =
            window.set_timeout_with_callback_and_timeout_and_arguments_0(closure.unchecked_ref(), delay)
        {
            tracing::error!(error = %describe(&err), "setTimeout failed");
        }
    }
}

/// Fire-and-forget request helpers backed by `fetch`.
///
/// Each call returns immediately; the outcome is only delivered through the
/// request's callbacks.
///
/// ## Example
///
/// ```rust,ignore
/// use appropriate::{requests, Request};
/// use serde_json::json;
///
/// requests::get(
///     Request::new("/api/items")
///         .data(json!({"page": 2}))
///         .on_success(|items| render(items))
///         .on_error(|err| tracing::warn!(%err, "could not load items")),
/// );
/// ```
pub mod requests {
    use crate::request::{execute, Request, RequestKind};

    use super::FetchTransport;

    /// GET with the payload encoded into the query string.
    pub fn get(request: Request) {
        spawn(RequestKind::Query, request);
    }

    /// Alias of [`get`].
    pub fn args(request: Request) {
        get(request);
    }

    /// Send the payload as a JSON body (POST unless the request says otherwise).
    pub fn json(request: Request) {
        spawn(RequestKind::Json, request);
    }

    /// Send the payload form-encoded (POST unless the request says otherwise).
    pub fn form(request: Request) {
        spawn(RequestKind::Form, request);
    }

    fn spawn(kind: RequestKind, request: Request) {
        wasm_bindgen_futures::spawn_local(async move {
            execute(&FetchTransport, kind, request).await;
        });
    }
}
