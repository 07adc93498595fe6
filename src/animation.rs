//! Animation drivers for element styles.
//!
//! [`PropertyAnimation`] is a platform-agnostic linear interpolator: it does
//! not handle timing itself, the caller samples it with frame timestamps.
//! The driver functions below hook it (and the transition based fades and
//! slides) up to an element's [`Scheduler`].

use std::rc::Rc;

use crate::element::{DomElement, Scheduler};
use crate::error::report;
use crate::style::{css_property_name, format_css_value, parse_css_number, transition_value};
use crate::Result;

/// Duration used when the caller has no preference.
pub const DEFAULT_DURATION_MS: u32 = 500;

/// Completion callback shared by every member of a selection.
pub type Completion<E> = Rc<dyn Fn(&E)>;

/// Fraction of `duration_ms` covered by `elapsed`, clamped to 0.0 - 1.0.
///
/// A non-positive duration is complete immediately.
///
/// ## Example
///
/// ```rust
/// use appropriate::animation::progress;
///
/// assert_eq!(progress(250.0, 500.0), 0.5);
/// assert_eq!(progress(900.0, 500.0), 1.0);
/// assert_eq!(progress(-3.0, 500.0), 0.0);
/// ```
#[inline]
pub fn progress(elapsed: f64, duration_ms: f64) -> f64 {
    if duration_ms <= 0.0 {
        return 1.0;
    }
    (elapsed / duration_ms).clamp(0.0, 1.0)
}

/// Linear interpolation between `initial` and `target`.
///
/// ## Example
///
/// ```rust
/// use appropriate::animation::interpolate;
///
/// assert_eq!(interpolate(10.0, 110.0, 0.25), 35.0);
/// assert_eq!(interpolate(1.0, 0.0, 1.0), 0.0);
/// ```
#[inline]
pub fn interpolate(initial: f64, target: f64, progress: f64) -> f64 {
    initial + (target - initial) * progress.clamp(0.0, 1.0)
}

/// One animated style property.
#[derive(Clone, Debug, PartialEq)]
pub struct PropertyTrack {
    /// Hyphenated CSS property name
    pub property: String,
    /// Value when the animation started
    pub initial: f64,
    /// Value when the animation completes
    pub target: f64,
}

/// Style values to apply for one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct AnimationFrame {
    /// Progress (0.0 - 1.0) at the sampled time
    pub progress: f64,
    /// `(property, css value)` pairs in track order
    pub values: Vec<(String, String)>,
}

impl AnimationFrame {
    /// Check if this is the final frame.
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.progress >= 1.0
    }
}

/// Linear animation of numeric style properties.
///
/// ## Example
///
/// ```rust
/// use appropriate::PropertyAnimation;
///
/// let animation = PropertyAnimation::new(1000.0, 200)
///     .with_track("height", 0.0, 100.0)
///     .with_track("opacity", 1.0, 0.0);
///
/// let frame = animation.sample(1050.0);
/// assert_eq!(frame.progress, 0.25);
/// assert_eq!(frame.values[0], ("height".to_string(), "25px".to_string()));
/// assert_eq!(frame.values[1], ("opacity".to_string(), "0.75".to_string()));
/// assert!(animation.sample(1200.0).is_complete());
/// ```
#[derive(Clone, Debug)]
pub struct PropertyAnimation {
    start: f64,
    duration_ms: f64,
    tracks: Vec<PropertyTrack>,
}

impl PropertyAnimation {
    /// Create an animation starting at timestamp `start` (milliseconds).
    pub fn new(start: f64, duration_ms: u32) -> Self {
        Self {
            start,
            duration_ms: duration_ms as f64,
            tracks: Vec::new(),
        }
    }

    /// Add a property track.
    pub fn with_track(mut self, property: impl Into<String>, initial: f64, target: f64) -> Self {
        self.tracks.push(PropertyTrack {
            property: property.into(),
            initial,
            target,
        });
        self
    }

    /// Get the animated tracks.
    #[inline]
    pub fn tracks(&self) -> &[PropertyTrack] {
        &self.tracks
    }

    /// Progress at timestamp `now`.
    #[inline]
    pub fn progress(&self, now: f64) -> f64 {
        progress(now - self.start, self.duration_ms)
    }

    /// Compute the style values for timestamp `now`.
    pub fn sample(&self, now: f64) -> AnimationFrame {
        let progress = self.progress(now);
        let values = self
            .tracks
            .iter()
            .map(|track| {
                let value = interpolate(track.initial, track.target, progress);
                (track.property.clone(), format_css_value(&track.property, value))
            })
            .collect();
        AnimationFrame { progress, values }
    }
}

/// Animate `properties` of `element` on every animation frame until done.
///
/// Initial values are read from the computed style; values that do not
/// parse as numbers start from 0.
pub(crate) fn animate<E: DomElement>(
    element: &E,
    properties: &[(String, f64)],
    duration_ms: u32,
    on_complete: Completion<E>,
) {
    let scheduler = element.scheduler();
    let mut animation = PropertyAnimation::new(scheduler.now(), duration_ms);
    for (property, target) in properties {
        let name = css_property_name(property);
        let initial = element
            .computed_style(&name)
            .ok()
            .and_then(|value| parse_css_number(&value))
            .unwrap_or(0.0);
        animation = animation.with_track(name, initial, *target);
    }

    tracing::debug!(tracks = animation.tracks().len(), duration_ms, "starting property animation");
    schedule_frame(element.clone(), animation, on_complete);
}

fn schedule_frame<E: DomElement>(element: E, animation: PropertyAnimation, on_complete: Completion<E>) {
    let scheduler = element.scheduler();
    scheduler.request_frame(Box::new(move |timestamp| {
        let frame = animation.sample(timestamp);
        for (property, value) in &frame.values {
            report("animate", element.set_style(property, value));
        }

        if frame.is_complete() {
            on_complete(&element);
        } else {
            schedule_frame(element, animation, on_complete);
        }
    }));
}

/// Run `cleanup` and then `on_complete` once `duration_ms` has elapsed.
fn after_transition<E, F>(element: &E, duration_ms: u32, operation: &'static str, cleanup: F, on_complete: Completion<E>)
where
    E: DomElement,
    F: FnOnce(&E) -> Result<()> + 'static,
{
    let target = element.clone();
    element.scheduler().set_timeout(
        duration_ms,
        Box::new(move || {
            report(operation, cleanup(&target));
            on_complete(&target);
        }),
    );
}

fn clear_transition<E: DomElement>(element: &E) -> Result<()> {
    element.remove_style("transition")
}

/// Fade `element` from transparent to opaque with a CSS transition.
pub(crate) fn fade_in<E: DomElement>(element: &E, duration_ms: u32, on_complete: Completion<E>) {
    let start = || -> Result<()> {
        element.set_style("opacity", "0")?;
        element.remove_style("display")?;
        // Commit the starting opacity so the change below transitions
        element.reflow();
        element.set_style("transition", &transition_value("opacity", duration_ms))?;
        element.set_style("opacity", "1")
    };
    report("fade_in", start());
    after_transition(element, duration_ms, "fade_in", clear_transition::<E>, on_complete);
}

/// Fade `element` from opaque to transparent with a CSS transition.
pub(crate) fn fade_out<E: DomElement>(element: &E, duration_ms: u32, on_complete: Completion<E>) {
    let start = || -> Result<()> {
        element.set_style("opacity", "1")?;
        element.set_style("transition", &transition_value("opacity", duration_ms))?;
        element.set_style("opacity", "0")
    };
    report("fade_out", start());
    after_transition(element, duration_ms, "fade_out", clear_transition::<E>, on_complete);
}

/// Collapse `element` to zero height, then hide it.
pub(crate) fn slide_up<E: DomElement>(element: &E, duration_ms: u32, on_complete: Completion<E>) {
    let start = || -> Result<()> {
        element.set_style("overflow", "hidden")?;
        element.set_style("height", &format_css_value("height", element.scroll_height()))?;
        element.reflow();
        element.set_style("transition", &transition_value("height", duration_ms))?;
        element.set_style("height", "0")
    };
    report("slide_up", start());

    let cleanup = |element: &E| -> Result<()> {
        element.set_style("display", "none")?;
        element.remove_style("height")?;
        element.remove_style("overflow")?;
        clear_transition(element)
    };
    after_transition(element, duration_ms, "slide_up", cleanup, on_complete);
}

/// Reveal `element` and expand it from zero to its full height.
pub(crate) fn slide_down<E: DomElement>(element: &E, duration_ms: u32, on_complete: Completion<E>) {
    let start = || -> Result<()> {
        element.remove_style("display")?;
        let mut display = element.computed_style("display")?;
        if display == "none" {
            display = "block".to_string();
        }
        element.set_style("display", &display)?;

        let height = element.scroll_height();
        element.set_style("overflow", "hidden")?;
        element.set_style("height", "0")?;
        element.reflow();
        element.set_style("transition", &transition_value("height", duration_ms))?;
        element.set_style("height", &format_css_value("height", height))
    };
    report("slide_down", start());

    let cleanup = |element: &E| -> Result<()> {
        element.remove_style("height")?;
        element.remove_style("overflow")?;
        clear_transition(element)
    };
    after_transition(element, duration_ms, "slide_down", cleanup, on_complete);
}
