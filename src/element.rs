//! Platform seam between the collection wrapper and a concrete DOM.
//!
//! [`Selection`](crate::Selection) and the animation drivers only talk to
//! elements through [`DomElement`] and to the host event loop through
//! [`Scheduler`]. The `web` feature implements both for `web_sys`; tests use
//! an in-memory DOM.

use std::rc::Rc;

use crate::Result;

/// Where `insertAdjacentHTML` places the inserted markup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InsertPosition {
    /// Before the element itself
    BeforeBegin,
    /// Inside the element, before its first child
    AfterBegin,
    /// Inside the element, after its last child
    BeforeEnd,
    /// After the element itself
    AfterEnd,
}

impl InsertPosition {
    /// The position keyword understood by `insertAdjacentHTML`.
    pub fn as_str(self) -> &'static str {
        match self {
            InsertPosition::BeforeBegin => "beforebegin",
            InsertPosition::AfterBegin => "afterbegin",
            InsertPosition::BeforeEnd => "beforeend",
            InsertPosition::AfterEnd => "afterend",
        }
    }
}

/// Shared event listener callback.
pub type Listener<Ev> = Rc<dyn Fn(&Ev)>;

/// An event delivered to a listener.
pub trait DomEvent {
    /// Element type of the DOM the event came from.
    type Element;

    /// The element the event was dispatched to, if it is an element.
    fn target_element(&self) -> Option<Self::Element>;
}

/// Cooperative timing hooks of the host event loop.
///
/// No `Send` bounds: callbacks run on the single browser thread.
pub trait Scheduler: Clone + 'static {
    /// Current high resolution time in milliseconds.
    fn now(&self) -> f64;

    /// Run `callback` before the next repaint with the frame timestamp.
    fn request_frame(&self, callback: Box<dyn FnOnce(f64)>);

    /// Run `callback` once after `delay_ms` milliseconds.
    fn set_timeout(&self, delay_ms: u32, callback: Box<dyn FnOnce()>);
}

/// A handle to a single element of a document.
///
/// Handles are cheap to clone and clones refer to the same element.
/// Operations the platform can reject return a [`Result`].
pub trait DomElement: Clone + 'static {
    /// Event type passed to listeners.
    type Event: DomEvent<Element = Self>;
    /// Scheduler driving animations of this element.
    type Scheduler: Scheduler;

    /// Scheduler of the window owning this element.
    fn scheduler(&self) -> Self::Scheduler;

    fn add_class(&self, class: &str) -> Result<()>;
    fn remove_class(&self, class: &str) -> Result<()>;
    fn toggle_class(&self, class: &str) -> Result<()>;
    fn has_class(&self, class: &str) -> bool;

    /// Set an inline style property (hyphenated name).
    fn set_style(&self, property: &str, value: &str) -> Result<()>;
    /// Remove an inline style property (hyphenated name).
    fn remove_style(&self, property: &str) -> Result<()>;
    /// Resolved value of a property from the computed style.
    fn computed_style(&self, property: &str) -> Result<String>;

    /// Rendered text (`innerText`).
    fn text(&self) -> String;
    fn set_text(&self, text: &str);
    fn html(&self) -> String;
    fn set_html(&self, html: &str);
    fn insert_html(&self, position: InsertPosition, html: &str) -> Result<()>;

    fn attribute(&self, name: &str) -> Option<String>;
    fn set_attribute(&self, name: &str, value: &str) -> Result<()>;

    /// Read an arbitrary element property (`element[name]`).
    fn property(&self, name: &str) -> Option<serde_json::Value>;
    /// Write an arbitrary element property (`element[name] = value`).
    fn set_property(&self, name: &str, value: &serde_json::Value) -> Result<()>;

    /// Detach the element from its parent.
    fn remove(&self);

    fn parent(&self) -> Option<Self>;
    fn children(&self) -> Vec<Self>;
    fn next_sibling(&self) -> Option<Self>;
    fn previous_sibling(&self) -> Option<Self>;

    /// First descendant matching `selector`.
    fn query_selector(&self, selector: &str) -> Result<Option<Self>>;
    /// All descendants matching `selector`, in document order.
    fn query_selector_all(&self, selector: &str) -> Result<Vec<Self>>;
    fn matches(&self, selector: &str) -> Result<bool>;

    /// Full content height in pixels, including overflow.
    fn scroll_height(&self) -> f64;
    /// Force a synchronous style recalculation so the next style change
    /// starts a transition.
    fn reflow(&self);

    /// Register `listener` for `event`. Listeners live as long as the element.
    fn add_listener(&self, event: &str, listener: Listener<Self::Event>) -> Result<()>;
}

/// Form value property read and written by `value`/`set_value`.
pub(crate) const VALUE_PROPERTY: &str = "value";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_position_keywords() {
        assert_eq!(InsertPosition::BeforeBegin.as_str(), "beforebegin");
        assert_eq!(InsertPosition::AfterBegin.as_str(), "afterbegin");
        assert_eq!(InsertPosition::BeforeEnd.as_str(), "beforeend");
        assert_eq!(InsertPosition::AfterEnd.as_str(), "afterend");
    }
}
