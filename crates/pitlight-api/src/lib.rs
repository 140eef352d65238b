//! Async client for the LIFX HTTP API, scoped to what pitlight needs:
//! listing lights, applying steady states, and starting pulse effects.
//!
//! - **[`LightClient`]** -- authenticated JSON client with a fixed 15s
//!   transport timeout and bearer-token auth.
//! - **[`RetryPolicy`]** -- bounded exponential backoff around individual
//!   requests; permanent errors (401) are never retried.
//! - **[`Error`]** -- classification of every failure mode
//!   (`is_transient()` / `is_invalid_token()`) consumed by the session
//!   layer in `pitlight-core`.

pub mod client;
pub mod error;
pub mod retry;
pub mod transport;
pub mod types;

pub use client::{DEFAULT_API_URL, LightClient};
pub use error::Error;
pub use retry::RetryPolicy;
pub use transport::TransportConfig;
pub use types::{Capabilities, Color, Light, LightState, Power, Product, PulseEffect};
