//! Web-specific functionality for running in a browser.
//!
//! Provides the fetch-based text source used to load OBJ files from
//! WebAssembly.

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::Response;

use crate::source::{SourceError, SourceFuture, TextSource};

/// Text source fetching URLs relative to the current page
#[derive(Debug, Clone, Default)]
pub struct FetchSource;

impl FetchSource {
    pub fn new() -> Self {
        Self
    }
}

fn js_reason(value: JsValue) -> String {
    if let Some(err) = value.dyn_ref::<js_sys::Error>() {
        return String::from(err.message());
    }
    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}

impl TextSource for FetchSource {
    fn fetch(&self, url: &str) -> SourceFuture<String> {
        let url = url.to_owned();
        Box::pin(async move {
            let fetch_error = |reason: String| SourceError::Fetch {
                url: url.clone(),
                reason,
            };

            let window = web_sys::window().ok_or_else(|| fetch_error("no global window".into()))?;
            let response = JsFuture::from(window.fetch_with_str(&url))
                .await
                .map_err(|e| fetch_error(js_reason(e)))?;
            let response: Response = response
                .dyn_into()
                .map_err(|_| fetch_error("not a Response".into()))?;

            if response.status() == 404 {
                return Err(SourceError::NotFound(url.clone()));
            }
            if !response.ok() {
                return Err(fetch_error(format!("HTTP {}", response.status())));
            }

            let text = response.text().map_err(|e| fetch_error(js_reason(e)))?;
            let text = JsFuture::from(text)
                .await
                .map_err(|e| fetch_error(js_reason(e)))?;
            text.as_string()
                .ok_or_else(|| SourceError::InvalidUtf8(url.clone()))
        })
    }
}
