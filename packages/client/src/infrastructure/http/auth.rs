//! Auth endpoints.
//!
//! The OAuth flow is redirect-based: the browser-equivalent entry point is
//! `GET /auth/google`, and the provider returns control with a `?token=`
//! query parameter. The client side of that flow is just "adopt the token,
//! then fetch the profile once" — see `auth::AuthSession::complete_oauth`.

use crate::infrastructure::dto::http::{AuthResponse, LoginRequest, RegisterRequest, UserDto};

use super::client::{ApiClient, ApiError};

impl ApiClient {
    /// `POST /auth/login`
    pub async fn login(
        &self,
        username: &str,
        password: &str,
        role: &str,
    ) -> Result<AuthResponse, ApiError> {
        self.post_json(
            "/auth/login",
            &LoginRequest {
                username: username.to_string(),
                password: password.to_string(),
                role: role.to_string(),
            },
        )
        .await
    }

    /// `POST /auth/register`
    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, ApiError> {
        self.post_json("/auth/register", request).await
    }

    /// `GET /auth/me` (Bearer)
    pub async fn me(&self) -> Result<UserDto, ApiError> {
        self.get_json("/auth/me").await
    }
}
