//! In-memory DOM and manual clock used by the unit tests.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};

use crate::element::{DomElement, DomEvent, InsertPosition, Listener, Scheduler};
use crate::{Error, Result};

type Frame = Box<dyn FnOnce(f64)>;
type Timer = Box<dyn FnOnce()>;

#[derive(Default)]
struct Clock {
    now: f64,
    frames: Vec<Frame>,
    timers: Vec<(f64, Timer)>,
}

/// Scheduler whose time only moves when a test says so.
#[derive(Clone, Default)]
pub(crate) struct ManualScheduler(Rc<RefCell<Clock>>);

impl ManualScheduler {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Advance the clock by `dt` milliseconds and run one round of frame callbacks.
    pub(crate) fn frame(&self, dt: f64) {
        let (now, frames) = {
            let mut clock = self.0.borrow_mut();
            clock.now += dt;
            (clock.now, std::mem::take(&mut clock.frames))
        };
        for frame in frames {
            frame(now);
        }
    }

    /// Advance the clock by `ms` milliseconds and fire every timer that came due.
    pub(crate) fn advance(&self, ms: f64) {
        let due = {
            let mut clock = self.0.borrow_mut();
            clock.now += ms;
            let now = clock.now;
            let (due, pending): (Vec<_>, Vec<_>) =
                std::mem::take(&mut clock.timers).into_iter().partition(|(at, _)| *at <= now);
            clock.timers = pending;
            due
        };
        for (_, timer) in due {
            timer();
        }
    }

    pub(crate) fn pending_frames(&self) -> usize {
        self.0.borrow().frames.len()
    }

    pub(crate) fn pending_timers(&self) -> usize {
        self.0.borrow().timers.len()
    }
}

impl Scheduler for ManualScheduler {
    fn now(&self) -> f64 {
        self.0.borrow().now
    }

    fn request_frame(&self, callback: Box<dyn FnOnce(f64)>) {
        self.0.borrow_mut().frames.push(callback);
    }

    fn set_timeout(&self, delay_ms: u32, callback: Box<dyn FnOnce()>) {
        let mut clock = self.0.borrow_mut();
        let at = clock.now + delay_ms as f64;
        clock.timers.push((at, callback));
    }
}

/// Event handed to mock listeners.
pub(crate) struct MockEvent {
    target: Option<MockElement>,
}

impl DomEvent for MockEvent {
    type Element = MockElement;

    fn target_element(&self) -> Option<MockElement> {
        self.target.clone()
    }
}

#[derive(Default)]
struct State {
    id: Option<String>,
    classes: Vec<String>,
    style: BTreeMap<String, String>,
    computed: BTreeMap<String, String>,
    text: String,
    html: String,
    adjacent: Vec<(InsertPosition, String)>,
    attributes: BTreeMap<String, String>,
    properties: BTreeMap<String, serde_json::Value>,
    children: Vec<MockElement>,
    listeners: Vec<(String, Listener<MockEvent>)>,
    scroll_height: f64,
    no_computed_style: bool,
    reflows: usize,
    style_writes: Vec<(String, String)>,
}

struct Node {
    tag: String,
    scheduler: ManualScheduler,
    parent: RefCell<Weak<Node>>,
    state: RefCell<State>,
}

/// A minimal element tree supporting `tag`, `.class` and `#id` selectors.
#[derive(Clone)]
pub(crate) struct MockElement(Rc<Node>);

impl MockElement {
    pub(crate) fn new(scheduler: &ManualScheduler, tag: &str) -> Self {
        Self(Rc::new(Node {
            tag: tag.to_string(),
            scheduler: scheduler.clone(),
            parent: RefCell::new(Weak::new()),
            state: RefCell::new(State::default()),
        }))
    }

    pub(crate) fn with_id(self, id: &str) -> Self {
        self.0.state.borrow_mut().id = Some(id.to_string());
        self
    }

    pub(crate) fn with_class(self, class: &str) -> Self {
        self.0.state.borrow_mut().classes.push(class.to_string());
        self
    }

    pub(crate) fn with_computed(self, property: &str, value: &str) -> Self {
        self.0
            .state
            .borrow_mut()
            .computed
            .insert(property.to_string(), value.to_string());
        self
    }

    /// Make computed style lookups fail, like an element outside any window.
    pub(crate) fn without_computed_style(self) -> Self {
        self.0.state.borrow_mut().no_computed_style = true;
        self
    }

    pub(crate) fn with_scroll_height(self, height: f64) -> Self {
        self.0.state.borrow_mut().scroll_height = height;
        self
    }

    pub(crate) fn append_child(&self, child: &MockElement) {
        *child.0.parent.borrow_mut() = Rc::downgrade(&self.0);
        self.0.state.borrow_mut().children.push(child.clone());
    }

    pub(crate) fn id(&self) -> Option<String> {
        self.0.state.borrow().id.clone()
    }

    pub(crate) fn inline_style(&self, property: &str) -> Option<String> {
        self.0.state.borrow().style.get(property).cloned()
    }

    /// Every `set_style` call in order, including ones later overwritten.
    pub(crate) fn style_writes(&self) -> Vec<(String, String)> {
        self.0.state.borrow().style_writes.clone()
    }

    pub(crate) fn adjacent(&self) -> Vec<(InsertPosition, String)> {
        self.0.state.borrow().adjacent.clone()
    }

    pub(crate) fn reflows(&self) -> usize {
        self.0.state.borrow().reflows
    }

    pub(crate) fn is_attached(&self) -> bool {
        self.0.parent.borrow().upgrade().is_some()
    }

    /// Deliver an event of `kind` to this element's own listeners.
    pub(crate) fn dispatch(&self, kind: &str, target: Option<&MockElement>) {
        let listeners: Vec<_> = self
            .0
            .state
            .borrow()
            .listeners
            .iter()
            .filter(|(event, _)| event == kind)
            .map(|(_, listener)| listener.clone())
            .collect();
        let event = MockEvent {
            target: target.cloned(),
        };
        for listener in listeners {
            listener(&event);
        }
    }

    pub(crate) fn same(&self, other: &MockElement) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    fn collect_matches(&self, selector: &Selector, out: &mut Vec<MockElement>) {
        let children = self.0.state.borrow().children.clone();
        for child in children {
            if child.matches_parsed(selector) {
                out.push(child.clone());
            }
            child.collect_matches(selector, out);
        }
    }

    fn matches_parsed(&self, selector: &Selector) -> bool {
        let state = self.0.state.borrow();
        match selector {
            Selector::Any => true,
            Selector::Tag(tag) => self.0.tag == *tag,
            Selector::Class(class) => state.classes.iter().any(|c| c == class),
            Selector::Id(id) => state.id.as_deref() == Some(id.as_str()),
        }
    }
}

enum Selector {
    Any,
    Tag(String),
    Class(String),
    Id(String),
}

fn parse_selector(selector: &str) -> Result<Selector> {
    let invalid = || Error::Selector {
        selector: selector.to_string(),
        message: "unsupported selector".to_string(),
    };
    let valid_name =
        |name: &str| !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

    if selector == "*" {
        Ok(Selector::Any)
    } else if let Some(class) = selector.strip_prefix('.') {
        valid_name(class).then(|| Selector::Class(class.to_string())).ok_or_else(invalid)
    } else if let Some(id) = selector.strip_prefix('#') {
        valid_name(id).then(|| Selector::Id(id.to_string())).ok_or_else(invalid)
    } else if valid_name(selector) {
        Ok(Selector::Tag(selector.to_string()))
    } else {
        Err(invalid())
    }
}

impl DomElement for MockElement {
    type Event = MockEvent;
    type Scheduler = ManualScheduler;

    fn scheduler(&self) -> ManualScheduler {
        self.0.scheduler.clone()
    }

    fn add_class(&self, class: &str) -> Result<()> {
        if class.contains(' ') {
            return Err(Error::Dom(format!("invalid token `{}`", class)));
        }
        let mut state = self.0.state.borrow_mut();
        if !state.classes.iter().any(|c| c == class) {
            state.classes.push(class.to_string());
        }
        Ok(())
    }

    fn remove_class(&self, class: &str) -> Result<()> {
        self.0.state.borrow_mut().classes.retain(|c| c != class);
        Ok(())
    }

    fn toggle_class(&self, class: &str) -> Result<()> {
        if self.has_class(class) {
            self.remove_class(class)
        } else {
            self.add_class(class)
        }
    }

    fn has_class(&self, class: &str) -> bool {
        self.0.state.borrow().classes.iter().any(|c| c == class)
    }

    fn set_style(&self, property: &str, value: &str) -> Result<()> {
        let mut state = self.0.state.borrow_mut();
        state
            .style_writes
            .push((property.to_string(), value.to_string()));
        if value.is_empty() {
            state.style.remove(property);
        } else {
            state.style.insert(property.to_string(), value.to_string());
        }
        Ok(())
    }

    fn remove_style(&self, property: &str) -> Result<()> {
        self.0.state.borrow_mut().style.remove(property);
        Ok(())
    }

    fn computed_style(&self, property: &str) -> Result<String> {
        let state = self.0.state.borrow();
        if state.no_computed_style {
            return Err(Error::Dom("No window available".to_string()));
        }
        Ok(state
            .style
            .get(property)
            .or_else(|| state.computed.get(property))
            .cloned()
            .unwrap_or_default())
    }

    fn text(&self) -> String {
        self.0.state.borrow().text.clone()
    }

    fn set_text(&self, text: &str) {
        self.0.state.borrow_mut().text = text.to_string();
    }

    fn html(&self) -> String {
        self.0.state.borrow().html.clone()
    }

    fn set_html(&self, html: &str) {
        let mut state = self.0.state.borrow_mut();
        state.html = html.to_string();
        state.children.clear();
    }

    fn insert_html(&self, position: InsertPosition, html: &str) -> Result<()> {
        let mut state = self.0.state.borrow_mut();
        match position {
            InsertPosition::AfterBegin => state.html.insert_str(0, html),
            InsertPosition::BeforeEnd => state.html.push_str(html),
            InsertPosition::BeforeBegin | InsertPosition::AfterEnd => {}
        }
        state.adjacent.push((position, html.to_string()));
        Ok(())
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.0.state.borrow().attributes.get(name).cloned()
    }

    fn set_attribute(&self, name: &str, value: &str) -> Result<()> {
        self.0
            .state
            .borrow_mut()
            .attributes
            .insert(name.to_string(), value.to_string());
        Ok(())
    }

    fn property(&self, name: &str) -> Option<serde_json::Value> {
        self.0.state.borrow().properties.get(name).cloned()
    }

    fn set_property(&self, name: &str, value: &serde_json::Value) -> Result<()> {
        self.0
            .state
            .borrow_mut()
            .properties
            .insert(name.to_string(), value.clone());
        Ok(())
    }

    fn remove(&self) {
        let parent = self.0.parent.replace(Weak::new()).upgrade();
        if let Some(parent) = parent {
            parent
                .state
                .borrow_mut()
                .children
                .retain(|child| !Rc::ptr_eq(&child.0, &self.0));
        }
    }

    fn parent(&self) -> Option<Self> {
        self.0.parent.borrow().upgrade().map(MockElement)
    }

    fn children(&self) -> Vec<Self> {
        self.0.state.borrow().children.clone()
    }

    fn next_sibling(&self) -> Option<Self> {
        let parent = self.parent()?;
        let siblings = parent.children();
        let index = siblings.iter().position(|s| s.same(self))?;
        siblings.get(index + 1).cloned()
    }

    fn previous_sibling(&self) -> Option<Self> {
        let parent = self.parent()?;
        let siblings = parent.children();
        let index = siblings.iter().position(|s| s.same(self))?;
        index.checked_sub(1).and_then(|i| siblings.get(i).cloned())
    }

    fn query_selector(&self, selector: &str) -> Result<Option<Self>> {
        Ok(self.query_selector_all(selector)?.into_iter().next())
    }

    fn query_selector_all(&self, selector: &str) -> Result<Vec<Self>> {
        let parsed = parse_selector(selector)?;
        let mut out = Vec::new();
        self.collect_matches(&parsed, &mut out);
        Ok(out)
    }

    fn matches(&self, selector: &str) -> Result<bool> {
        Ok(self.matches_parsed(&parse_selector(selector)?))
    }

    fn scroll_height(&self) -> f64 {
        self.0.state.borrow().scroll_height
    }

    fn reflow(&self) {
        self.0.state.borrow_mut().reflows += 1;
    }

    fn add_listener(&self, event: &str, listener: Listener<MockEvent>) -> Result<()> {
        self.0
            .state
            .borrow_mut()
            .listeners
            .push((event.to_string(), listener));
        Ok(())
    }
}

/// Builds:
///
/// ```text
/// body
/// ├── ul#list
/// │   ├── li#a.item
/// │   ├── li#b.item.active
/// │   └── li#c.item
/// └── p#note.item
/// ```
pub(crate) fn sample_document(scheduler: &ManualScheduler) -> MockElement {
    let body = MockElement::new(scheduler, "body");
    let list = MockElement::new(scheduler, "ul").with_id("list");
    let a = MockElement::new(scheduler, "li").with_id("a").with_class("item");
    let b = MockElement::new(scheduler, "li")
        .with_id("b")
        .with_class("item")
        .with_class("active");
    let c = MockElement::new(scheduler, "li").with_id("c").with_class("item");
    let note = MockElement::new(scheduler, "p").with_id("note").with_class("item");

    body.append_child(&list);
    list.append_child(&a);
    list.append_child(&b);
    list.append_child(&c);
    body.append_child(&note);
    body
}
