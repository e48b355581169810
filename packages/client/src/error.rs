//! Top-level error types for the CodeThrone client.

use thiserror::Error;

use crate::auth::token_store::TokenStoreError;
use crate::infrastructure::http::ApiError;
use crate::infrastructure::websocket::TransportError;

/// Client-specific errors
#[derive(Debug, Error)]
pub enum ClientError {
    /// An operation required a logged-in user
    #[error("not authenticated; run `login` first")]
    NotAuthenticated,

    /// REST API failure
    #[error(transparent)]
    Api(#[from] ApiError),

    /// WebSocket transport failure
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Persisted token could not be read or written
    #[error("token store error: {0}")]
    TokenStore(#[from] TokenStoreError),
}
