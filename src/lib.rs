//! # appropriate
//!
//! Chainable DOM helpers for Rust compiled to WebAssembly.
//!
//! This crate provides:
//! - A collection wrapper over selected elements with chainable class, style,
//!   content, event and traversal operations ([`Selection`])
//! - Fade, slide and per-frame property animations
//! - Callback-driven `fetch` helpers for query, JSON and form requests
//!
//! The collection, animation and request logic is platform-agnostic: it talks
//! to the DOM through the [`DomElement`] and [`Scheduler`] traits and to the
//! network through [`Transport`].
//!
//! ## Features
//!
//! - `web` - Browser bindings for `web_sys` elements, animation frames and `fetch`
//! - `toml` - Load [`RequestOptions`] from TOML
//!
//! ## Example
//!
//! ```rust,ignore
//! use appropriate::{requests, select, Request};
//! use serde_json::json;
//!
//! select(".notice")?
//!     .add_class("visible")
//!     .set_text("Saved")
//!     .fade_in(300, |_| {});
//!
//! requests::json(
//!     Request::new("/api/items")
//!         .data(json!({"name": "x"}))
//!         .on_success(|item| tracing::info!(%item, "created"))
//!         .always(|| tracing::debug!("done")),
//! );
//! ```

pub mod animation;
mod element;
mod error;
pub mod request;
mod selection;
pub mod style;
#[cfg(test)]
mod testing;
#[cfg(feature = "web")]
pub mod web;

pub use animation::{AnimationFrame, PropertyAnimation, PropertyTrack, DEFAULT_DURATION_MS};
pub use element::{DomElement, DomEvent, InsertPosition, Listener, Scheduler};
pub use error::{Error, Result};
pub use request::{
    execute, CacheMode, Credentials, Method, Mode, PreparedRequest, Redirect, ReferrerPolicy, Request,
    RequestKind, RequestOptions, Transport, TransportResponse,
};
pub use selection::Selection;
pub use style::Display;

#[cfg(feature = "web")]
pub use web::{requests, select, BrowserScheduler, FetchTransport};
