//! Core session logic for race-flag light control.
//!
//! Sits between the HTTP client ([`pitlight-api`](pitlight_api)) and the
//! consumer surfaces (CLI). Owns the connection lifecycle, the background
//! liveness monitor, the persisted device selection, and the mapping from
//! race flags to light command sequences.
//!
//! The main entry point is [`Session`].

pub mod config;
pub mod error;
pub mod flag;
mod monitor;
pub mod sequence;
pub mod sequencer;
pub mod session;
pub mod store;

pub use config::{ReconnectConfig, SessionConfig};
pub use error::CoreError;
pub use pitlight_api::Error as ApiError;
pub use pitlight_api::{Light, Power};
pub use flag::{FeedFlag, FlagEffect};
pub use session::{ConnectionState, Session};
pub use store::{
    CredentialStore, MemoryCredentialStore, MemorySelectionStore, SelectionStore, StoreError,
};
