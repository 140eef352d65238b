// Hand-crafted async HTTP client for the LIFX HTTP API (v1).
//
// Base path: /v1/
// Auth: Authorization: Bearer header

use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::retry::RetryPolicy;
use crate::transport::TransportConfig;
use crate::types::{Light, LightState, PulseEffect};

/// Production API endpoint.
pub const DEFAULT_API_URL: &str = "https://api.lifx.com/v1";

// ── Error response shape from the API ─────────────────────────────────

#[derive(serde::Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    error: Option<String>,
}

// ── Client ───────────────────────────────────────────────────────────

/// Async client for the lighting API.
///
/// Holds the bearer token as a sensitive default header; every operation
/// is a single authenticated request wrapped in the retry policy.
pub struct LightClient {
    http: reqwest::Client,
    base_url: Url,
    retry: RetryPolicy,
    timeout_secs: u64,
}

impl LightClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build from a token and transport config.
    ///
    /// Injects `Authorization: Bearer <token>` as a default header on
    /// every request; the header value is marked sensitive so it never
    /// appears in debug output.
    pub fn new(
        base_url: &str,
        token: &secrecy::SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        let mut bearer = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
            .map_err(|_| Error::InvalidToken)?;
        bearer.set_sensitive(true);
        headers.insert(reqwest::header::AUTHORIZATION, bearer);

        let http = transport.build_client_with_headers(headers)?;
        let base_url = Self::normalize_base_url(base_url)?;

        Ok(Self {
            http,
            base_url,
            retry: RetryPolicy::default(),
            timeout_secs: transport.timeout.as_secs(),
        })
    }

    /// Replace the default retry policy.
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Ensure the base URL ends with a single trailing slash so relative
    /// joins keep the full path.
    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let trimmed = raw.trim_end_matches('/');
        Ok(Url::parse(&format!("{trimmed}/"))?)
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Join a relative path (e.g. `"lights/all"`) onto the base URL.
    fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path)?)
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("GET {url}");

        let resp = self.send(self.http.get(url)).await?;
        Self::handle_response(resp).await
    }

    async fn put_no_response<B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<(), Error> {
        let url = self.url(path)?;
        debug!("PUT {url}");

        let resp = self.send(self.http.put(url).json(body)).await?;
        Self::handle_empty(resp).await
    }

    async fn post_no_response<B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<(), Error> {
        let url = self.url(path)?;
        debug!("POST {url}");

        let resp = self.send(self.http.post(url).json(body)).await?;
        Self::handle_empty(resp).await
    }

    /// Issue the request, classifying reqwest timeouts explicitly.
    async fn send(&self, req: reqwest::RequestBuilder) -> Result<reqwest::Response, Error> {
        req.send().await.map_err(|e| {
            if e.is_timeout() {
                Error::Timeout {
                    timeout_secs: self.timeout_secs,
                }
            } else {
                Error::Transport(e)
            }
        })
    }

    // ── Response handling ────────────────────────────────────────────

    async fn handle_response<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            serde_json::from_str(&body).map_err(|e| {
                let preview: String = body.chars().take(200).collect();
                Error::Deserialization {
                    message: format!("{e} (body preview: {preview:?})"),
                    body,
                }
            })
        } else {
            Err(Self::parse_error(status, resp).await)
        }
    }

    async fn handle_empty(resp: reqwest::Response) -> Result<(), Error> {
        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(Self::parse_error(status, resp).await)
        }
    }

    /// Classify a non-success response per the retry taxonomy:
    /// 401 permanent, 429 and 5xx transient, remaining 4xx permanent.
    async fn parse_error(status: reqwest::StatusCode, resp: reqwest::Response) -> Error {
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Error::InvalidToken;
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = resp
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok())
                .unwrap_or(60);
            return Error::RateLimited { retry_after_secs };
        }

        let raw = resp.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorResponse>(&raw)
            .ok()
            .and_then(|e| e.error)
            .unwrap_or_else(|| {
                if raw.is_empty() {
                    status.to_string()
                } else {
                    raw
                }
            });

        if status.is_server_error() {
            Error::Server {
                status: status.as_u16(),
                message,
            }
        } else {
            Error::Api {
                status: status.as_u16(),
                message,
            }
        }
    }

    // ━━ Public API ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    /// Fetch every light visible to the token.
    ///
    /// `GET /lights/all` -- also the liveness probe used by the
    /// connection monitor.
    pub async fn list_lights(&self) -> Result<Vec<Light>, Error> {
        self.retry.run(|| self.get("lights/all")).await
    }

    /// Apply a steady target state to the lights addressed by `selector`.
    ///
    /// `PUT /lights/{selector}/state`
    pub async fn set_state(&self, selector: &str, state: &LightState) -> Result<(), Error> {
        let path = format!("lights/{selector}/state");
        self.retry.run(|| self.put_no_response(&path, state)).await
    }

    /// Start a pulse effect on the lights addressed by `selector`.
    ///
    /// `POST /lights/{selector}/effects/pulse` -- returns once the API
    /// accepts the effect; the cycles run on the devices themselves.
    pub async fn pulse(&self, selector: &str, effect: &PulseEffect) -> Result<(), Error> {
        let path = format!("lights/{selector}/effects/pulse");
        self.retry.run(|| self.post_no_response(&path, effect)).await
    }
}
