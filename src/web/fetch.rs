//! `fetch` based transport.

use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Headers, RequestCache, RequestCredentials, RequestInit, RequestMode, RequestRedirect};

use super::describe;
use crate::request::{
    CacheMode, Credentials, Mode, PreparedRequest, Redirect, ReferrerPolicy, Transport, TransportResponse,
};
use crate::{Error, Result};

fn network_error(value: JsValue) -> Error {
    Error::Network(describe(&value))
}

fn request_mode(mode: Mode) -> RequestMode {
    match mode {
        Mode::Cors => RequestMode::Cors,
        Mode::NoCors => RequestMode::NoCors,
        Mode::SameOrigin => RequestMode::SameOrigin,
        Mode::Navigate => RequestMode::Navigate,
    }
}

fn request_cache(cache: CacheMode) -> RequestCache {
    match cache {
        CacheMode::Default => RequestCache::Default,
        CacheMode::NoStore => RequestCache::NoStore,
        CacheMode::Reload => RequestCache::Reload,
        CacheMode::NoCache => RequestCache::NoCache,
        CacheMode::ForceCache => RequestCache::ForceCache,
        CacheMode::OnlyIfCached => RequestCache::OnlyIfCached,
    }
}

fn request_credentials(credentials: Credentials) -> RequestCredentials {
    match credentials {
        Credentials::Omit => RequestCredentials::Omit,
        Credentials::SameOrigin => RequestCredentials::SameOrigin,
        Credentials::Include => RequestCredentials::Include,
    }
}

fn request_redirect(redirect: Redirect) -> RequestRedirect {
    match redirect {
        Redirect::Follow => RequestRedirect::Follow,
        Redirect::Error => RequestRedirect::Error,
        Redirect::Manual => RequestRedirect::Manual,
    }
}

fn referrer_policy(policy: ReferrerPolicy) -> web_sys::ReferrerPolicy {
    use web_sys::ReferrerPolicy as Web;

    match policy {
        ReferrerPolicy::NoReferrer => Web::NoReferrer,
        ReferrerPolicy::NoReferrerWhenDowngrade => Web::NoReferrerWhenDowngrade,
        ReferrerPolicy::Origin => Web::Origin,
        ReferrerPolicy::OriginWhenCrossOrigin => Web::OriginWhenCrossOrigin,
        ReferrerPolicy::SameOrigin => Web::SameOrigin,
        ReferrerPolicy::StrictOrigin => Web::StrictOrigin,
        ReferrerPolicy::StrictOriginWhenCrossOrigin => Web::StrictOriginWhenCrossOrigin,
        ReferrerPolicy::UnsafeUrl => Web::UnsafeUrl,
    }
}

/// Issues requests with `window.fetch`.
#[derive(Clone, Copy, Debug, Default)]
pub struct FetchTransport;

/// A settled `fetch` response.
#[derive(Debug)]
pub struct FetchResponse(web_sys::Response);

impl TransportResponse for FetchResponse {
    fn status(&self) -> u16 {
        self.0.status()
    }

    async fn text(self) -> Result<String> {
        let promise = self.0.text().map_err(network_error)?;
        let text = JsFuture::from(promise).await.map_err(network_error)?;
        Ok(text.as_string().unwrap_or_default())
    }
}

impl Transport for FetchTransport {
    type Response = FetchResponse;

    async fn send(&self, request: PreparedRequest) -> Result<FetchResponse> {
        let init = RequestInit::new();
        init.set_method(request.method.as_str());
        init.set_mode(request_mode(request.mode));
        init.set_cache(request_cache(request.cache));
        init.set_credentials(request_credentials(request.credentials));
        init.set_redirect(request_redirect(request.redirect));
        init.set_referrer_policy(referrer_policy(request.referrer_policy));

        let headers = Headers::new().map_err(network_error)?;
        for (name, value) in &request.headers {
            headers.set(name, value).map_err(network_error)?;
        }
        init.set_headers(&headers);

        if let Some(body) = &request.body {
            init.set_body(&JsValue::from_str(body));
        }

        let fetch_request =
            web_sys::Request::new_with_str_and_init(&request.url, &init).map_err(network_error)?;
        let window = web_sys::window().ok_or_else(|| Error::Network("No window available".to_string()))?;
        let response = JsFuture::from(window.fetch_with_request(&fetch_request))
            .await
            .map_err(network_error)?;

        Ok(FetchResponse(response.dyn_into().map_err(network_error)?))
    }
}
