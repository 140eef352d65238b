use thiserror::Error;

/// Error type for session-level operations.
///
/// [`Disconnected`](CoreError::Disconnected) and
/// [`NoSelection`](CoreError::NoSelection) are caller guards: they are
/// returned before any network activity and cost nothing to construct.
#[derive(Debug, Error)]
pub enum CoreError {
    /// No active session -- `apply_flag` and friends refuse to touch the
    /// network until `connect` succeeds.
    #[error("not connected to the lighting API")]
    Disconnected,

    /// The device selection is empty; there is nothing to address.
    #[error("no lights selected")]
    NoSelection,

    /// A flag sequence stopped mid-way after a step failed. Earlier steps
    /// are not rolled back; the next flag event re-asserts a full state.
    #[error("flag sequence aborted after {completed} completed step(s): {source}")]
    SequenceAborted {
        completed: usize,
        #[source]
        source: pitlight_api::Error,
    },

    /// Error from the lighting API outside a sequence (directory fetch,
    /// liveness probe).
    #[error(transparent)]
    Api(#[from] pitlight_api::Error),

    /// The credential store failed to read or write the token.
    #[error("credential store error: {0}")]
    Credential(String),

    /// The selection store failed to read or write the selection.
    #[error("selection store error: {0}")]
    Selection(String),
}

impl CoreError {
    /// Returns `true` if the underlying cause is a rejected token,
    /// looking through sequence aborts.
    pub fn is_invalid_token(&self) -> bool {
        match self {
            Self::Api(e) | Self::SequenceAborted { source: e, .. } => e.is_invalid_token(),
            _ => false,
        }
    }
}
