//! Blocking HTTP access for remote sources.

use std::time::Duration;

use reqwest::blocking::{Client, Response};

use crate::error::{IngestError, Result};

/// User agent string for outgoing requests.
const USER_AGENT_VALUE: &str = concat!("observatorio/", env!("CARGO_PKG_VERSION"));

/// Default request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Minimal HTTP interface used by the URL and Drive sources.
///
/// Non-success status codes are errors.
pub trait HttpClient {
    /// Fetches `url` and returns the response body.
    fn get(&self, url: &str, bearer: Option<&str>) -> Result<Vec<u8>>;

    /// Posts an url-encoded form and returns the response body.
    fn post_form(&self, url: &str, form: &[(&str, &str)]) -> Result<Vec<u8>>;
}

/// [`HttpClient`] backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    client: Client,
}

impl ReqwestClient {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT_VALUE)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| IngestError::unavailable("http client", e))?;
        Ok(Self { client })
    }
}

impl HttpClient for ReqwestClient {
    fn get(&self, url: &str, bearer: Option<&str>) -> Result<Vec<u8>> {
        tracing::debug!(url, authenticated = bearer.is_some(), "fetching document");

        let mut request = self.client.get(url);
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }

        read_body(url, request.send())
    }

    fn post_form(&self, url: &str, form: &[(&str, &str)]) -> Result<Vec<u8>> {
        tracing::debug!(url, "posting form");
        read_body(url, self.client.post(url).form(form).send())
    }
}

fn read_body(url: &str, sent: reqwest::Result<Response>) -> Result<Vec<u8>> {
    let response = sent.map_err(|e| IngestError::unavailable(url, e))?;
    let status = response.status();
    if !status.is_success() {
        return Err(IngestError::unavailable(url, format!("HTTP {status}")));
    }

    let body = response
        .bytes()
        .map_err(|e| IngestError::unavailable(url, e))?;
    Ok(body.to_vec())
}
