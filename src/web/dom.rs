//! `DomElement` for `web_sys::Element`.

use serde_json::Value;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CssStyleDeclaration, Element, Event, HtmlElement};

use super::{dom_error, node_list_elements, selector_error, BrowserScheduler};
use crate::element::{DomElement, DomEvent, InsertPosition, Listener};
use crate::{Error, Result};

impl DomEvent for Event {
    type Element = Element;

    fn target_element(&self) -> Option<Element> {
        self.target().and_then(|target| target.dyn_into::<Element>().ok())
    }
}

fn inline_style(element: &Element) -> Result<CssStyleDeclaration> {
    element
        .dyn_ref::<HtmlElement>()
        .map(|html| html.style())
        .ok_or_else(|| Error::Dom(format!("<{}> has no inline style", element.tag_name().to_lowercase())))
}

fn js_to_json(value: &JsValue) -> Option<Value> {
    if value.is_undefined() {
        return None;
    }
    if value.is_null() {
        return Some(Value::Null);
    }
    if let Some(flag) = value.as_bool() {
        return Some(Value::Bool(flag));
    }
    if let Some(number) = value.as_f64() {
        // Integral numbers stay integers so they print without a fraction
        if number.fract() == 0.0 && number.abs() < i64::MAX as f64 {
            return Some(Value::from(number as i64));
        }
        return Some(serde_json::Number::from_f64(number).map_or(Value::Null, Value::Number));
    }
    if let Some(text) = value.as_string() {
        return Some(Value::String(text));
    }
    js_sys::JSON::stringify(value)
        .ok()
        .and_then(|json| json.as_string())
        .and_then(|json| serde_json::from_str(&json).ok())
}

fn json_to_js(value: &Value) -> Result<JsValue> {
    Ok(match value {
        Value::Null => JsValue::NULL,
        Value::Bool(flag) => JsValue::from_bool(*flag),
        Value::Number(number) => JsValue::from_f64(number.as_f64().unwrap_or(0.0)),
        Value::String(text) => JsValue::from_str(text),
        other => js_sys::JSON::parse(&other.to_string()).map_err(dom_error)?,
    })
}

impl DomElement for Element {
    type Event = Event;
    type Scheduler = BrowserScheduler;

    fn scheduler(&self) -> BrowserScheduler {
        BrowserScheduler
    }

    fn add_class(&self, class: &str) -> Result<()> {
        self.class_list().add_1(class).map_err(dom_error)
    }

    fn remove_class(&self, class: &str) -> Result<()> {
        self.class_list().remove_1(class).map_err(dom_error)
    }

    fn toggle_class(&self, class: &str) -> Result<()> {
        self.class_list().toggle(class).map(|_| ()).map_err(dom_error)
    }

    fn has_class(&self, class: &str) -> bool {
        self.class_list().contains(class)
    }

    fn set_style(&self, property: &str, value: &str) -> Result<()> {
        inline_style(self)?
            .set_property(property, value)
            .map_err(dom_error)
    }

    fn remove_style(&self, property: &str) -> Result<()> {
        inline_style(self)?
            .remove_property(property)
            .map(|_| ())
            .map_err(dom_error)
    }

    fn computed_style(&self, property: &str) -> Result<String> {
        let window = web_sys::window().ok_or_else(|| Error::Dom("No window available".to_string()))?;
        window
            .get_computed_style(self)
            .map_err(dom_error)?
            .ok_or_else(|| Error::Dom("No computed style available".to_string()))?
            .get_property_value(property)
            .map_err(dom_error)
    }

    fn text(&self) -> String {
        match self.dyn_ref::<HtmlElement>() {
            Some(html) => html.inner_text(),
            None => self.text_content().unwrap_or_default(),
        }
    }

    fn set_text(&self, text: &str) {
        match self.dyn_ref::<HtmlElement>() {
            Some(html) => html.set_inner_text(text),
            None => self.set_text_content(Some(text)),
        }
    }

    fn html(&self) -> String {
        self.inner_html()
    }

    fn set_html(&self, html: &str) {
        self.set_inner_html(html);
    }

    fn insert_html(&self, position: InsertPosition, html: &str) -> Result<()> {
        self.insert_adjacent_html(position.as_str(), html)
            .map_err(dom_error)
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.get_attribute(name)
    }

    fn set_attribute(&self, name: &str, value: &str) -> Result<()> {
        Element::set_attribute(self, name, value).map_err(dom_error)
    }

    fn property(&self, name: &str) -> Option<Value> {
        let value = js_sys::Reflect::get(self, &JsValue::from_str(name)).ok()?;
        js_to_json(&value)
    }

    fn set_property(&self, name: &str, value: &Value) -> Result<()> {
        let value = json_to_js(value)?;
        js_sys::Reflect::set(self, &JsValue::from_str(name), &value)
            .map(|_| ())
            .map_err(dom_error)
    }

    fn remove(&self) {
        Element::remove(self);
    }

    fn parent(&self) -> Option<Element> {
        self.parent_element()
    }

    fn children(&self) -> Vec<Element> {
        let children = Element::children(self);
        (0..children.length())
            .filter_map(|i| children.item(i))
            .collect()
    }

    fn next_sibling(&self) -> Option<Element> {
        self.next_element_sibling()
    }

    fn previous_sibling(&self) -> Option<Element> {
        self.previous_element_sibling()
    }

    fn query_selector(&self, selector: &str) -> Result<Option<Element>> {
        Element::query_selector(self, selector).map_err(|err| selector_error(selector, &err))
    }

    fn query_selector_all(&self, selector: &str) -> Result<Vec<Element>> {
        let list = Element::query_selector_all(self, selector)
            .map_err(|err| selector_error(selector, &err))?;
        Ok(node_list_elements(&list))
    }

    fn matches(&self, selector: &str) -> Result<bool> {
        Element::matches(self, selector).map_err(|err| selector_error(selector, &err))
    }

    fn scroll_height(&self) -> f64 {
        Element::scroll_height(self) as f64
    }

    fn reflow(&self) {
        // Reading a layout property flushes pending style changes
        if let Some(html) = self.dyn_ref::<HtmlElement>() {
            let _ = html.offset_height();
        }
    }

    fn add_listener(&self, event: &str, listener: Listener<Event>) -> Result<()> {
        let closure = Closure::<dyn Fn(Event)>::new(move |event: Event| listener(&event));
        self.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
            .map_err(dom_error)?;
        // Listeners are never removed, so the closure lives as long as the page
        closure.forget();
        Ok(())
    }
}
