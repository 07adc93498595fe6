//! Chainable collection of elements.

use std::rc::Rc;

use crate::animation::{self, Completion};
use crate::element::{DomElement, DomEvent, InsertPosition, Listener, VALUE_PROPERTY};
use crate::error::report;
use crate::style::{css_property_name, Display, Visibility};
use crate::Result;

/// An ordered group of elements with chainable operations.
///
/// The group is captured once at construction and does not follow later
/// DOM changes.
///
/// Mutating operations apply to every member and return `&Self` so calls can
/// be chained. A member rejecting an operation is logged and skipped; the
/// remaining members are still updated. Reading operations look at the first
/// member only and return `None` for an empty selection.
///
/// ## Example
///
/// ```rust,ignore
/// use appropriate::select;
///
/// select(".card")?
///     .add_class("visible")
///     .set_style("backgroundColor", "#1a1a2e")
///     .fade_in(300, |_| {});
///
/// let title = select("h1")?.text();
/// ```
#[derive(Clone, Debug)]
pub struct Selection<E> {
    elements: Vec<E>,
}

impl<E> Default for Selection<E> {
    fn default() -> Self {
        Self {
            elements: Vec::new(),
        }
    }
}

impl<E> From<Vec<E>> for Selection<E> {
    fn from(elements: Vec<E>) -> Self {
        Self { elements }
    }
}

impl<E> FromIterator<E> for Selection<E> {
    fn from_iter<I: IntoIterator<Item = E>>(iter: I) -> Self {
        Self {
            elements: iter.into_iter().collect(),
        }
    }
}

impl<E> IntoIterator for Selection<E> {
    type Item = E;
    type IntoIter = std::vec::IntoIter<E>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.into_iter()
    }
}

impl<'a, E> IntoIterator for &'a Selection<E> {
    type Item = &'a E;
    type IntoIter = std::slice::Iter<'a, E>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter()
    }
}

impl<E> Selection<E> {
    /// Create a selection from a list of elements.
    pub fn new(elements: Vec<E>) -> Self {
        Self { elements }
    }

    /// Number of elements in the selection.
    #[inline]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Get the element at `index`.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&E> {
        self.elements.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, E> {
        self.elements.iter()
    }

    /// The wrapped elements.
    #[inline]
    pub fn elements(&self) -> &[E] {
        &self.elements
    }
}

impl<E: DomElement> Selection<E> {
    /// Wrap a single element.
    pub fn from_element(element: E) -> Self {
        Self {
            elements: vec![element],
        }
    }

    fn first_element(&self) -> Option<&E> {
        self.elements.first()
    }

    fn apply(&self, operation: &str, f: impl Fn(&E) -> Result<()>) -> &Self {
        for element in &self.elements {
            report(operation, f(element));
        }
        self
    }

    /// Call `f` with every element and its index.
    pub fn each(&self, mut f: impl FnMut(&E, usize)) -> &Self {
        for (index, element) in self.elements.iter().enumerate() {
            f(element, index);
        }
        self
    }

    // Events

    /// Register `callback` for `event` on every element.
    pub fn on(&self, event: &str, callback: impl Fn(&E::Event) + 'static) -> &Self {
        let listener: Listener<E::Event> = Rc::new(callback);
        self.apply("on", |element| element.add_listener(event, listener.clone()))
    }

    /// Register a listener for `event` that only fires when the event target
    /// matches `selector`.
    pub fn listen(&self, event: &str, selector: &str, callback: impl Fn(&E::Event) + 'static) -> &Self {
        let selector = selector.to_string();
        self.on(event, move |e: &E::Event| {
            let matched = e
                .target_element()
                .map(|target| target.matches(&selector).unwrap_or(false))
                .unwrap_or(false);
            if matched {
                callback(e);
            }
        })
    }

    /// `DOMContentLoaded`
    pub fn on_ready(&self, callback: impl Fn(&E::Event) + 'static) -> &Self {
        self.on("DOMContentLoaded", callback)
    }

    pub fn on_load(&self, callback: impl Fn(&E::Event) + 'static) -> &Self {
        self.on("load", callback)
    }

    pub fn on_click(&self, callback: impl Fn(&E::Event) + 'static) -> &Self {
        self.on("click", callback)
    }

    pub fn on_mouse_over(&self, callback: impl Fn(&E::Event) + 'static) -> &Self {
        self.on("mouseover", callback)
    }

    pub fn on_mouse_out(&self, callback: impl Fn(&E::Event) + 'static) -> &Self {
        self.on("mouseout", callback)
    }

    pub fn on_submit(&self, callback: impl Fn(&E::Event) + 'static) -> &Self {
        self.on("submit", callback)
    }

    // Classes

    pub fn add_class(&self, class: &str) -> &Self {
        self.apply("add_class", |element| element.add_class(class))
    }

    pub fn remove_class(&self, class: &str) -> &Self {
        self.apply("remove_class", |element| element.remove_class(class))
    }

    pub fn toggle_class(&self, class: &str) -> &Self {
        self.apply("toggle_class", |element| element.toggle_class(class))
    }

    /// Check whether every element carries `class`.
    pub fn has_class(&self, class: &str) -> bool {
        self.elements.iter().all(|element| element.has_class(class))
    }

    // Styles

    /// Set an inline style property on every element.
    ///
    /// Accepts camelCase (`fontSize`) or hyphenated (`font-size`) names.
    pub fn set_style(&self, property: &str, value: &str) -> &Self {
        let name = css_property_name(property);
        self.apply("set_style", |element| element.set_style(&name, value))
    }

    /// Computed value of `property` on the first element.
    pub fn style(&self, property: &str) -> Option<String> {
        let element = self.first_element()?;
        match element.computed_style(&css_property_name(property)) {
            Ok(value) => Some(value),
            Err(err) => {
                tracing::debug!(property, error = %err, "computed style unavailable");
                None
            }
        }
    }

    /// `visibility: hidden`
    pub fn hide(&self) -> &Self {
        self.set_style("visibility", Visibility::Hidden.as_str())
    }

    /// `visibility: visible`
    pub fn show(&self) -> &Self {
        self.set_style("visibility", Visibility::Visible.as_str())
    }

    /// Set the `display` property on every element.
    pub fn display(&self, display: Display) -> &Self {
        self.set_style("display", display.as_str())
    }

    pub fn none(&self) -> &Self {
        self.display(Display::None)
    }

    pub fn block(&self) -> &Self {
        self.display(Display::Block)
    }

    pub fn inline(&self) -> &Self {
        self.display(Display::Inline)
    }

    pub fn inline_block(&self) -> &Self {
        self.display(Display::InlineBlock)
    }

    // Content

    /// Rendered text of the first element.
    pub fn text(&self) -> Option<String> {
        self.first_element().map(|element| element.text())
    }

    pub fn set_text(&self, text: &str) -> &Self {
        for element in &self.elements {
            element.set_text(text);
        }
        self
    }

    /// Inner HTML of the first element.
    pub fn html(&self) -> Option<String> {
        self.first_element().map(|element| element.html())
    }

    pub fn set_html(&self, html: &str) -> &Self {
        for element in &self.elements {
            element.set_html(html);
        }
        self
    }

    /// Remove all content of every element.
    pub fn clear(&self) -> &Self {
        self.set_html("")
    }

    /// Form value of the first element, as text.
    pub fn value(&self) -> Option<String> {
        let value = self.first_element()?.property(VALUE_PROPERTY)?;
        Some(match value {
            serde_json::Value::String(s) => s,
            serde_json::Value::Null => String::new(),
            other => other.to_string(),
        })
    }

    pub fn set_value(&self, value: &str) -> &Self {
        let value = serde_json::Value::String(value.to_string());
        self.apply("set_value", |element| element.set_property(VALUE_PROPERTY, &value))
    }

    /// Attribute of the first element.
    pub fn attribute(&self, name: &str) -> Option<String> {
        self.first_element()?.attribute(name)
    }

    pub fn set_attribute(&self, name: &str, value: &str) -> &Self {
        self.apply("set_attribute", |element| element.set_attribute(name, value))
    }

    /// Property (`element[name]`) of the first element.
    pub fn property(&self, name: &str) -> Option<serde_json::Value> {
        self.first_element()?.property(name)
    }

    pub fn set_property(&self, name: &str, value: impl Into<serde_json::Value>) -> &Self {
        let value = value.into();
        self.apply("set_property", |element| element.set_property(name, &value))
    }

    /// Insert `html` inside every element, after its last child.
    pub fn append(&self, html: &str) -> &Self {
        self.insert(InsertPosition::BeforeEnd, html)
    }

    /// Insert `html` inside every element, before its first child.
    pub fn prepend(&self, html: &str) -> &Self {
        self.insert(InsertPosition::AfterBegin, html)
    }

    /// Insert `html` right after every element.
    pub fn after(&self, html: &str) -> &Self {
        self.insert(InsertPosition::AfterEnd, html)
    }

    /// Insert `html` right before every element.
    pub fn before(&self, html: &str) -> &Self {
        self.insert(InsertPosition::BeforeBegin, html)
    }

    fn insert(&self, position: InsertPosition, html: &str) -> &Self {
        self.apply(position.as_str(), |element| element.insert_html(position, html))
    }

    /// Detach every element from the document.
    pub fn remove(&self) -> &Self {
        for element in &self.elements {
            element.remove();
        }
        self
    }

    // Traversal

    /// Selection of the first element.
    pub fn first(&self) -> Self {
        self.elements.first().cloned().into_iter().collect()
    }

    /// Selection of the last element.
    pub fn last(&self) -> Self {
        self.elements.last().cloned().into_iter().collect()
    }

    /// Next element sibling of every element.
    pub fn next(&self) -> Self {
        self.elements.iter().filter_map(E::next_sibling).collect()
    }

    /// Previous element sibling of every element.
    pub fn prev(&self) -> Self {
        self.elements.iter().filter_map(E::previous_sibling).collect()
    }

    /// Parent element of the first element.
    pub fn parent(&self) -> Self {
        self.first_element().and_then(E::parent).into_iter().collect()
    }

    /// Element children of the first element.
    pub fn children(&self) -> Self {
        self.first_element().map(E::children).unwrap_or_default().into()
    }

    /// First descendant of the first element matching `selector`.
    pub fn find(&self, selector: &str) -> Result<Self> {
        Ok(self.find_element(selector)?.into_iter().collect())
    }

    /// All descendants of the first element matching `selector`.
    pub fn find_all(&self, selector: &str) -> Result<Self> {
        Ok(self.find_all_elements(selector)?.into())
    }

    /// Like [`find`](Self::find), returning the bare element.
    pub fn find_element(&self, selector: &str) -> Result<Option<E>> {
        match self.first_element() {
            Some(element) => element.query_selector(selector),
            None => Ok(None),
        }
    }

    /// Like [`find_all`](Self::find_all), returning the bare elements.
    pub fn find_all_elements(&self, selector: &str) -> Result<Vec<E>> {
        match self.first_element() {
            Some(element) => element.query_selector_all(selector),
            None => Ok(Vec::new()),
        }
    }

    // Animation

    /// Fade every element in over `duration_ms`.
    ///
    /// `on_complete` runs once per element when its fade has finished.
    pub fn fade_in(&self, duration_ms: u32, on_complete: impl Fn(&E) + 'static) -> &Self {
        let on_complete: Completion<E> = Rc::new(on_complete);
        for element in &self.elements {
            animation::fade_in(element, duration_ms, on_complete.clone());
        }
        self
    }

    /// Fade every element out over `duration_ms`.
    pub fn fade_out(&self, duration_ms: u32, on_complete: impl Fn(&E) + 'static) -> &Self {
        let on_complete: Completion<E> = Rc::new(on_complete);
        for element in &self.elements {
            animation::fade_out(element, duration_ms, on_complete.clone());
        }
        self
    }

    /// Collapse every element to zero height and hide it.
    pub fn slide_up(&self, duration_ms: u32, on_complete: impl Fn(&E) + 'static) -> &Self {
        let on_complete: Completion<E> = Rc::new(on_complete);
        for element in &self.elements {
            animation::slide_up(element, duration_ms, on_complete.clone());
        }
        self
    }

    /// Reveal every element by expanding it to its full height.
    pub fn slide_down(&self, duration_ms: u32, on_complete: impl Fn(&E) + 'static) -> &Self {
        let on_complete: Completion<E> = Rc::new(on_complete);
        for element in &self.elements {
            animation::slide_down(element, duration_ms, on_complete.clone());
        }
        self
    }

    /// Animate numeric style properties of every element towards the given targets.
    ///
    /// Values are applied in pixels, except `opacity`. Each element runs
    /// independently; starting a second animation does not stop the first.
    ///
    /// ## Example
    ///
    /// ```rust,ignore
    /// select("#box")?.animate([("left", 200.0), ("opacity", 0.5)], 400, |_| {});
    /// ```
    pub fn animate<I, K>(&self, properties: I, duration_ms: u32, on_complete: impl Fn(&E) + 'static) -> &Self
    where
        I: IntoIterator<Item = (K, f64)>,
        K: Into<String>,
    {
        let properties: Vec<(String, f64)> = properties
            .into_iter()
            .map(|(property, target)| (property.into(), target))
            .collect();
        let on_complete: Completion<E> = Rc::new(on_complete);
        for element in &self.elements {
            animation::animate(element, &properties, duration_ms, on_complete.clone());
        }
        self
    }
}
