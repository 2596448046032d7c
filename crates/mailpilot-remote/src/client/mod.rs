//! HTTP client for the single backend endpoint.

mod actions;
mod retry;

pub use retry::RetryPolicy;

use crate::error::{Error, Result};
use crate::log::LogHandle;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, LOCATION};
use reqwest::{Client, Response, StatusCode, redirect};
use serde::Serialize;
use std::fmt;
use std::future::Future;
use std::time::Duration;
use url::Url;

/// Per-request timeout.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Redirect hops followed on GET calls before giving up.
pub const MAX_REDIRECTS: usize = 10;

/// Basic authentication credentials.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    id: String,
    password: String,
}

impl Credentials {
    /// Creates credentials from an id and password.
    #[must_use]
    pub fn new(id: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            password: password.into(),
        }
    }

    /// Returns the user id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns true when both id and password are empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.id.is_empty() && self.password.is_empty()
    }

    /// Returns the `Authorization` header value, or `None` when both parts
    /// are empty. A single empty part still produces a header.
    #[must_use]
    pub fn header_value(&self) -> Option<String> {
        if self.is_empty() {
            return None;
        }
        let raw = format!("{}:{}", self.id, self.password);
        Some(format!("Basic {}", BASE64_STANDARD.encode(raw)))
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("id", &self.id)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Retried, redirect-aware client for the mail backend.
///
/// GET calls use a transport that follows up to [`MAX_REDIRECTS`] hops.
/// POST calls never follow redirects automatically: a 301/302 is re-issued
/// as an authenticated GET against its `Location`, since the body would be
/// dropped by a standard redirect.
///
/// Base URL and credentials may be changed between calls, never during one.
#[derive(Debug, Clone)]
pub struct RequestClient {
    base_url: String,
    credentials: Credentials,
    policy: RetryPolicy,
    follow: Client,
    no_follow: Client,
    log: LogHandle,
}

impl RequestClient {
    /// Creates a client for `base_url` with the default retry policy.
    ///
    /// An empty URL is accepted; calls will fail until one is set.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP transport cannot be initialized.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let follow = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .redirect(redirect::Policy::limited(MAX_REDIRECTS))
            .build()?;
        let no_follow = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .redirect(redirect::Policy::none())
            .build()?;

        Ok(Self {
            base_url: base_url.into(),
            credentials: Credentials::default(),
            policy: RetryPolicy::default(),
            follow,
            no_follow,
            log: LogHandle::default(),
        })
    }

    /// Sets the Basic authentication credentials.
    #[must_use]
    pub fn with_basic_auth(mut self, id: impl Into<String>, password: impl Into<String>) -> Self {
        self.set_basic_auth(id, password);
        self
    }

    /// Replaces the retry policy.
    #[must_use]
    pub const fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Replaces the event log.
    #[must_use]
    pub fn with_log(mut self, log: LogHandle) -> Self {
        self.log = log;
        self
    }

    /// Changes the endpoint URL.
    pub fn set_base_url(&mut self, base_url: impl Into<String>) {
        self.base_url = base_url.into();
    }

    /// Changes the Basic authentication credentials.
    pub fn set_basic_auth(&mut self, id: impl Into<String>, password: impl Into<String>) {
        self.credentials = Credentials::new(id, password);
    }

    /// Returns the endpoint URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the configured credentials.
    #[must_use]
    pub const fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Returns the retry policy.
    #[must_use]
    pub const fn retry_policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Returns the `Authorization` header sent with every call, if any.
    #[must_use]
    pub fn auth_header(&self) -> Option<String> {
        self.credentials.header_value()
    }

    /// Performs a GET with `params` encoded in the query string and returns
    /// the raw body of a 200 response.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RetryLimitExceeded`] wrapping the last failure once
    /// every attempt has failed.
    pub async fn get(&self, params: &[(&str, &str)]) -> Result<Vec<u8>> {
        self.with_retries("GET", move || self.get_once(params)).await
    }

    /// Performs a POST with `payload` as a JSON body and returns the raw body
    /// of the effective 200 response.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] immediately if the payload cannot be encoded,
    /// otherwise [`Error::RetryLimitExceeded`] once every attempt has failed.
    pub async fn post<T>(&self, payload: &T) -> Result<Vec<u8>>
    where
        T: Serialize + ?Sized,
    {
        let body = serde_json::to_vec(payload)?;
        let body = body.as_slice();
        self.with_retries("POST", move || self.post_once(body)).await
    }

    /// Runs `attempt` until it succeeds, fails with a non-retryable error,
    /// or the policy's attempt budget is spent.
    async fn with_retries<F, Fut>(&self, method: &str, mut attempt: F) -> Result<Vec<u8>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<Vec<u8>>>,
    {
        let max_attempts = self.policy.max_attempts();
        let mut failures = 0;

        loop {
            if failures > 0 {
                tokio::time::sleep(self.policy.delay_before(failures)).await;
                self.log.info(format!(
                    "retry {}/{max_attempts}: {method} {}",
                    failures + 1,
                    self.base_url
                ));
            }

            match attempt().await {
                Ok(body) => return Ok(body),
                Err(err) if !err.is_retryable() => return Err(err),
                Err(err) => {
                    failures += 1;
                    self.log.error(format!("{method} failed: {err}"));
                    if failures >= max_attempts {
                        return Err(Error::RetryLimitExceeded {
                            attempts: failures,
                            source: Box::new(err),
                        });
                    }
                }
            }
        }
    }

    fn endpoint(&self) -> Result<Url> {
        Ok(Url::parse(self.base_url.trim())?)
    }

    fn query_url(&self, params: &[(&str, &str)]) -> Result<Url> {
        let mut url = self.endpoint()?;
        if !params.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in params {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    async fn get_once(&self, params: &[(&str, &str)]) -> Result<Vec<u8>> {
        let url = self.query_url(params)?;
        let mut request = self.follow.get(url);
        if let Some(header) = self.auth_header() {
            request = request.header(AUTHORIZATION, header);
        }
        read_ok(request.send().await?).await
    }

    async fn post_once(&self, body: &[u8]) -> Result<Vec<u8>> {
        let url = self.endpoint()?;
        let mut request = self
            .no_follow
            .post(url.clone())
            .header(CONTENT_TYPE, "application/json")
            .body(body.to_vec());
        if let Some(header) = self.auth_header() {
            request = request.header(AUTHORIZATION, header);
        }

        let response = request.send().await?;
        let status = response.status();
        if status != StatusCode::FOUND && status != StatusCode::MOVED_PERMANENTLY {
            return read_ok(response).await;
        }

        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|value| value.to_str().ok())
            .filter(|value| !value.is_empty())
            .map(str::to_owned);
        drop(response);

        let location = location.ok_or(Error::MissingRedirectTarget)?;
        let target = url.join(&location)?;
        self.log.info(format!("redirect: {target}"));
        self.fetch_redirect(target).await
    }

    /// Fetches a POST redirect target with GET, carrying the same credentials.
    async fn fetch_redirect(&self, target: Url) -> Result<Vec<u8>> {
        let mut request = self.follow.get(target);
        if let Some(header) = self.auth_header() {
            request = request.header(AUTHORIZATION, header);
        }
        read_ok(request.send().await?).await
    }
}

/// Reads the whole body and fails unless the status is 200.
async fn read_ok(response: Response) -> Result<Vec<u8>> {
    let status = response.status();
    let body = response.bytes().await?;
    if status != StatusCode::OK {
        return Err(Error::Status {
            status: status.as_u16(),
            body: String::from_utf8_lossy(&body).into_owned(),
        });
    }
    Ok(body.to_vec())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_header_absent_only_when_both_empty() {
        assert_eq!(Credentials::new("", "").header_value(), None);
        assert_eq!(
            Credentials::new("user", "pass").header_value().as_deref(),
            Some("Basic dXNlcjpwYXNz")
        );
        assert_eq!(
            Credentials::new("user", "").header_value().as_deref(),
            Some("Basic dXNlcjo=")
        );
        assert_eq!(
            Credentials::new("", "pass").header_value().as_deref(),
            Some("Basic OnBhc3M=")
        );
    }

    #[test]
    fn test_credentials_debug_hides_password() {
        let debug = format!("{:?}", Credentials::new("user", "hunter2"));
        assert!(debug.contains("user"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn test_client_reconfiguration() {
        let mut client = RequestClient::new("").unwrap();
        assert!(client.auth_header().is_none());

        client.set_base_url("https://script.example.com/exec");
        client.set_basic_auth("id", "pw");

        assert_eq!(client.base_url(), "https://script.example.com/exec");
        assert_eq!(client.credentials().id(), "id");
        assert!(client.auth_header().is_some());

        client.set_basic_auth("", "");
        assert!(client.auth_header().is_none());
    }

    #[test]
    fn test_query_url_keeps_every_param() {
        let client = RequestClient::new("https://script.example.com/exec").unwrap();
        let url = client
            .query_url(&[("action", "getTemplates"), ("page", "2")])
            .unwrap();

        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("action".to_string(), "getTemplates".to_string()),
                ("page".to_string(), "2".to_string()),
            ]
        );
    }

    #[test]
    fn test_query_url_rejects_empty_base() {
        let client = RequestClient::new("").unwrap();
        assert!(matches!(client.query_url(&[]), Err(Error::InvalidUrl(_))));
    }
}
