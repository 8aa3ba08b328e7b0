// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Manual HTTP redirect probing for direct dependency URLs (§4.1 step 1,
//! §9 "redirect handling must be manual"). `reqwest`'s automatic
//! redirect following is explicitly disabled here — the resolver needs
//! to record the terminal URI itself, and letting the HTTP stack
//! swallow the chain would make that terminal URI unobservable.

use jx_core::RunnerError;
use reqwest::{redirect::Policy, StatusCode};
use url::Url;

/// Redirect status codes the resolver follows manually (§4.1).
const REDIRECT_CODES: [u16; 4] = [301, 302, 303, 307];

/// Maximum redirect hops before giving up, matching common browser/HTTP
/// client defaults.
const MAX_REDIRECTS: usize = 10;

/// Probes `http(s)://` dependency URLs with `HEAD` (falling back to a
/// bodyless `GET` if the server rejects `HEAD`), following redirects
/// manually and returning the terminal URI. Non-HTTP schemes are left
/// unchanged (§4.1 step 1).
pub struct HttpUrlNormalizer {
    client: reqwest::Client,
}

impl Default for HttpUrlNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpUrlNormalizer {
    pub fn new() -> Self {
        let client = reqwest::Client::builder().redirect(Policy::none()).build().unwrap_or_default();
        Self { client }
    }

    /// Normalize one dependency URI. Maven URIs and URIs already ending
    /// `.jar` are expected to have been filtered out by the caller
    /// before this is reached — this only handles direct connection
    /// URLs.
    pub async fn normalize(&self, uri: &str) -> Result<String, RunnerError> {
        let scheme = Url::parse(uri).ok().map(|u| u.scheme().to_string());
        match scheme.as_deref() {
            Some("http") | Some("https") => self.probe(uri).await,
            _ => {
                tracing::info!(uri, "non-http dependency connection type left unchanged");
                Ok(uri.to_string())
            }
        }
    }

    async fn probe(&self, uri: &str) -> Result<String, RunnerError> {
        let mut current = uri.to_string();
        for _ in 0..MAX_REDIRECTS {
            let response = self
                .send_probe(&current)
                .await
                .map_err(|e| RunnerError::ResolverFailure(format!("probing {current}: {e}")))?;
            let status = response.status().as_u16();
            if !REDIRECT_CODES.contains(&status) {
                return Ok(current);
            }
            let location = response
                .headers()
                .get(reqwest::header::LOCATION)
                .and_then(|v| v.to_str().ok())
                .ok_or_else(|| RunnerError::ResolverFailure(format!("redirect from {current} carried no Location")))?;
            current = absolutize(&current, location)?;
        }
        Err(RunnerError::ResolverFailure(format!("too many redirects resolving {uri}")))
    }

    async fn send_probe(&self, url: &str) -> Result<reqwest::Response, reqwest::Error> {
        let response = self.client.head(url).send().await?;
        if response.status() == StatusCode::METHOD_NOT_ALLOWED {
            return self.client.get(url).send().await;
        }
        Ok(response)
    }
}

fn absolutize(base: &str, location: &str) -> Result<String, RunnerError> {
    let base_url = Url::parse(base).map_err(|e| RunnerError::ResolverFailure(format!("bad base url {base}: {e}")))?;
    let joined = base_url.join(location).map_err(|e| RunnerError::ResolverFailure(format!("bad redirect location {location}: {e}")))?;
    Ok(joined.to_string())
}

#[cfg(test)]
#[path = "http_resolver_tests.rs"]
mod tests;
