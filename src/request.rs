//! Callback-driven HTTP requests.
//!
//! A [`Request`] describes one call: target, payload, fetch options and four
//! lifecycle callbacks. [`execute`] runs it through a [`Transport`]:
//!
//! 1. `before_send`
//! 2. one network call
//! 3. `on_success(json)` for a 2xx response with a JSON body, otherwise
//!    `on_error(error)` for a network failure, a non-2xx status or a body
//!    that is not JSON
//! 4. `always`
//!
//! There is no retry and no cancellation.

use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Error, Result};

/// Content type sent by JSON requests.
pub const JSON_CONTENT_TYPE: &str = "application/json;charset=utf-8";
/// Content type sent by form requests.
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// HTTP method of a JSON or form request.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    #[default]
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
            Method::Head => "HEAD",
            Method::Options => "OPTIONS",
        }
    }
}

/// Fetch `mode`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    #[default]
    Cors,
    NoCors,
    SameOrigin,
    Navigate,
}

impl Mode {
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Cors => "cors",
            Mode::NoCors => "no-cors",
            Mode::SameOrigin => "same-origin",
            Mode::Navigate => "navigate",
        }
    }
}

/// Fetch `cache`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CacheMode {
    #[default]
    Default,
    NoStore,
    Reload,
    NoCache,
    ForceCache,
    OnlyIfCached,
}

impl CacheMode {
    pub fn as_str(self) -> &'static str {
        match self {
            CacheMode::Default => "default",
            CacheMode::NoStore => "no-store",
            CacheMode::Reload => "reload",
            CacheMode::NoCache => "no-cache",
            CacheMode::ForceCache => "force-cache",
            CacheMode::OnlyIfCached => "only-if-cached",
        }
    }
}

/// Fetch `credentials`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Credentials {
    Omit,
    #[default]
    SameOrigin,
    Include,
}

impl Credentials {
    pub fn as_str(self) -> &'static str {
        match self {
            Credentials::Omit => "omit",
            Credentials::SameOrigin => "same-origin",
            Credentials::Include => "include",
        }
    }
}

/// Fetch `redirect`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Redirect {
    #[default]
    Follow,
    Error,
    Manual,
}

impl Redirect {
    pub fn as_str(self) -> &'static str {
        match self {
            Redirect::Follow => "follow",
            Redirect::Error => "error",
            Redirect::Manual => "manual",
        }
    }
}

/// Fetch `referrerPolicy`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReferrerPolicy {
    #[default]
    NoReferrer,
    NoReferrerWhenDowngrade,
    Origin,
    OriginWhenCrossOrigin,
    SameOrigin,
    StrictOrigin,
    StrictOriginWhenCrossOrigin,
    UnsafeUrl,
}

impl ReferrerPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            ReferrerPolicy::NoReferrer => "no-referrer",
            ReferrerPolicy::NoReferrerWhenDowngrade => "no-referrer-when-downgrade",
            ReferrerPolicy::Origin => "origin",
            ReferrerPolicy::OriginWhenCrossOrigin => "origin-when-cross-origin",
            ReferrerPolicy::SameOrigin => "same-origin",
            ReferrerPolicy::StrictOrigin => "strict-origin",
            ReferrerPolicy::StrictOriginWhenCrossOrigin => "strict-origin-when-cross-origin",
            ReferrerPolicy::UnsafeUrl => "unsafe-url",
        }
    }
}

/// Options shared by every request helper.
///
/// Every field is optional when deserializing, missing fields take the
/// documented defaults.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestOptions {
    /// Log failed requests at error level
    pub echo: bool,
    pub mode: Mode,
    pub cache: CacheMode,
    /// Extra headers; these override the helper's `Content-Type`
    pub headers: BTreeMap<String, String>,
    pub credentials: Credentials,
    pub redirect: Redirect,
    pub referrer_policy: ReferrerPolicy,
}

impl RequestOptions {
    /// Parse request defaults from TOML.
    ///
    /// ```toml
    /// echo = true
    /// credentials = "include"
    ///
    /// [headers]
    /// X-Requested-With = "appropriate"
    /// ```
    #[cfg(feature = "toml")]
    pub fn from_toml_str(s: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(s)
    }
}

#[derive(Default)]
struct Callbacks {
    before_send: Option<Box<dyn FnOnce()>>,
    on_success: Option<Box<dyn FnOnce(Value)>>,
    on_error: Option<Box<dyn FnOnce(Error)>>,
    always: Option<Box<dyn FnOnce()>>,
}

/// Configuration of a single HTTP call.
///
/// ## Example
///
/// ```rust
/// use appropriate::{Request, RequestKind, PreparedRequest};
/// use serde_json::json;
///
/// let request = Request::new("/api/items")
///     .data(json!({"page": 2}))
///     .on_success(|items| println!("{items}"));
///
/// let prepared = PreparedRequest::build(RequestKind::Query, &request).unwrap();
/// assert_eq!(prepared.url, "/api/items?page=2");
/// ```
pub struct Request {
    /// Target address
    pub url: String,
    /// Method of JSON and form requests; query requests always use GET
    pub method: Method,
    /// Payload, usually a JSON object
    pub data: Value,
    pub options: RequestOptions,
    callbacks: Callbacks,
}

impl fmt::Debug for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Request")
            .field("url", &self.url)
            .field("method", &self.method)
            .field("data", &self.data)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl Request {
    /// Create a request to `url` with default options and an empty payload.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: Method::default(),
            data: Value::Object(serde_json::Map::new()),
            options: RequestOptions::default(),
            callbacks: Callbacks::default(),
        }
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Replace the payload.
    pub fn data(mut self, data: Value) -> Self {
        self.data = data;
        self
    }

    /// Set one payload field, turning the payload into an object if needed.
    pub fn param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        if !self.data.is_object() {
            self.data = Value::Object(serde_json::Map::new());
        }
        if let Value::Object(map) = &mut self.data {
            map.insert(key.into(), value.into());
        }
        self
    }

    /// Replace all options, e.g. with defaults loaded from configuration.
    pub fn options(mut self, options: RequestOptions) -> Self {
        self.options = options;
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.headers.insert(name.into(), value.into());
        self
    }

    pub fn echo(mut self, echo: bool) -> Self {
        self.options.echo = echo;
        self
    }

    pub fn mode(mut self, mode: Mode) -> Self {
        self.options.mode = mode;
        self
    }

    pub fn cache(mut self, cache: CacheMode) -> Self {
        self.options.cache = cache;
        self
    }

    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.options.credentials = credentials;
        self
    }

    pub fn redirect(mut self, redirect: Redirect) -> Self {
        self.options.redirect = redirect;
        self
    }

    pub fn referrer_policy(mut self, policy: ReferrerPolicy) -> Self {
        self.options.referrer_policy = policy;
        self
    }

    /// Called right before the request is issued.
    pub fn before_send(mut self, f: impl FnOnce() + 'static) -> Self {
        self.callbacks.before_send = Some(Box::new(f));
        self
    }

    /// Called with the parsed JSON body of a successful response.
    pub fn on_success(mut self, f: impl FnOnce(Value) + 'static) -> Self {
        self.callbacks.on_success = Some(Box::new(f));
        self
    }

    /// Called when the request fails for any reason.
    pub fn on_error(mut self, f: impl FnOnce(Error) + 'static) -> Self {
        self.callbacks.on_error = Some(Box::new(f));
        self
    }

    /// Called after success or failure.
    pub fn always(mut self, f: impl FnOnce() + 'static) -> Self {
        self.callbacks.always = Some(Box::new(f));
        self
    }
}

/// How the payload is sent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RequestKind {
    /// GET with the payload encoded into the query string
    Query,
    /// Payload as a JSON body
    Json,
    /// Payload as an `application/x-www-form-urlencoded` body
    Form,
}

/// A request ready to hand to a [`Transport`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PreparedRequest {
    pub method: Method,
    pub url: String,
    /// Headers in send order
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
    pub mode: Mode,
    pub cache: CacheMode,
    pub credentials: Credentials,
    pub redirect: Redirect,
    pub referrer_policy: ReferrerPolicy,
}

impl PreparedRequest {
    /// Encode `request` for the given kind.
    pub fn build(kind: RequestKind, request: &Request) -> Result<Self> {
        let pairs = || form_pairs(&request.data);
        let (method, url, content_type, body) = match kind {
            RequestKind::Query => {
                let query = serde_urlencoded::to_string(pairs())?;
                (Method::Get, format!("{}?{}", request.url, query), None, None)
            }
            RequestKind::Json => (
                request.method,
                request.url.clone(),
                Some(JSON_CONTENT_TYPE),
                Some(serde_json::to_string(&request.data)?),
            ),
            RequestKind::Form => (
                request.method,
                request.url.clone(),
                Some(FORM_CONTENT_TYPE),
                Some(serde_urlencoded::to_string(pairs())?),
            ),
        };

        let options = &request.options;
        Ok(Self {
            method,
            url,
            headers: merge_headers(content_type, &options.headers),
            body,
            mode: options.mode,
            cache: options.cache,
            credentials: options.credentials,
            redirect: options.redirect,
            referrer_policy: options.referrer_policy,
        })
    }

    /// Value of a header, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Flatten a payload into `(key, value)` pairs for query strings and forms.
///
/// Objects yield their entries, arrays their indices; strings are used as-is
/// and any other value as its JSON text.
pub fn form_pairs(data: &Value) -> Vec<(String, String)> {
    match data {
        Value::Object(map) => map
            .iter()
            .map(|(key, value)| (key.clone(), param_text(value)))
            .collect(),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(index, value)| (index.to_string(), param_text(value)))
            .collect(),
        _ => Vec::new(),
    }
}

fn param_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn merge_headers(content_type: Option<&str>, extra: &BTreeMap<String, String>) -> Vec<(String, String)> {
    let mut headers: Vec<(String, String)> = content_type
        .map(|value| ("Content-Type".to_string(), value.to_string()))
        .into_iter()
        .collect();

    for (name, value) in extra {
        match headers.iter_mut().find(|(key, _)| key.eq_ignore_ascii_case(name)) {
            Some(existing) => existing.1 = value.clone(),
            None => headers.push((name.clone(), value.clone())),
        }
    }
    headers
}

/// Response handed back by a [`Transport`].
pub trait TransportResponse {
    /// HTTP status code.
    fn status(&self) -> u16;

    /// Read the whole body as text.
    fn text(self) -> impl Future<Output = Result<String>>;
}

/// Issues prepared requests.
///
/// No `Send` bounds, works in single-threaded WASM contexts.
pub trait Transport {
    type Response: TransportResponse;

    /// Perform one network call. Fails only when no response arrived.
    fn send(&self, request: PreparedRequest) -> impl Future<Output = Result<Self::Response>>;
}

/// Run `request` through `transport`, invoking its callbacks.
///
/// Exactly one of `on_success`/`on_error` runs, then `always`.
pub async fn execute<T: Transport>(transport: &T, kind: RequestKind, mut request: Request) {
    let callbacks = std::mem::take(&mut request.callbacks);
    if let Some(before_send) = callbacks.before_send {
        before_send();
    }

    let (target, outcome) = match PreparedRequest::build(kind, &request) {
        Ok(prepared) => (prepared.url.clone(), send_json(transport, prepared).await),
        Err(err) => (request.url.clone(), Err(err)),
    };

    match outcome {
        Ok(value) => {
            if let Some(on_success) = callbacks.on_success {
                on_success(value);
            }
        }
        Err(err) => {
            if request.options.echo {
                tracing::error!(error = %err, "Error requesting {}", target);
            }
            if let Some(on_error) = callbacks.on_error {
                on_error(err);
            }
        }
    }

    if let Some(always) = callbacks.always {
        always();
    }
}

async fn send_json<T: Transport>(transport: &T, request: PreparedRequest) -> Result<Value> {
    tracing::debug!(method = request.method.as_str(), url = %request.url, "sending request");
    let response = transport.send(request).await?;

    let status = response.status();
    if !(200..=299).contains(&status) {
        return Err(Error::Status(status));
    }

    let body = response.text().await?;
    Ok(serde_json::from_str(&body)?)
}
