use std::future::Future;
use std::time::Duration;

use rand::seq::SliceRandom;
use reqwest::header::USER_AGENT;
use reqwest::redirect::Policy;

use crate::types::TransportErrorKind;

/// A single HTTP response, reduced to what outcome classification needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeResponse {
    pub status: u16,
    pub content_length: Option<u64>,
}

/// Seam between the dispatcher and the network. Tests substitute scripted
/// implementations; production uses `HttpTransport`.
pub trait Transport: Send + Sync + 'static {
    fn fetch(
        &self,
        url: &str,
    ) -> impl Future<Output = Result<ProbeResponse, TransportErrorKind>> + Send;
}

const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64; rv:109.0) Gecko/20100101 Firefox/121.0",
    "Mozilla/5.0 (iPhone; CPU iPhone OS 14_6 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/14.0 Mobile/15E148 Safari/604.1",
];

/// reqwest-backed transport. Redirects are not followed so 301/302 hits are
/// reported as-is; each attempt is bounded by the configured timeout.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .redirect(Policy::none())
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    async fn fetch(&self, url: &str) -> Result<ProbeResponse, TransportErrorKind> {
        let agent = USER_AGENTS
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or("dirprobe-rs/0.1");

        let response = self
            .client
            .get(url)
            .header(USER_AGENT, agent)
            .send()
            .await
            .map_err(classify_error)?;

        Ok(ProbeResponse {
            status: response.status().as_u16(),
            content_length: response.content_length(),
        })
    }
}

fn classify_error(e: reqwest::Error) -> TransportErrorKind {
    if e.is_timeout() {
        TransportErrorKind::Timeout
    } else if e.is_connect() {
        TransportErrorKind::Connect
    } else if e.to_string().contains("reset") {
        TransportErrorKind::Reset
    } else {
        TransportErrorKind::Other
    }
}
