//! Core REST client: base URL, bearer token and response handling.
//!
//! Requests carry no client-side timeout or abort signal; they run to
//! completion or network-level failure. Failures never panic — they come
//! back as [`ApiError`] values for the caller to surface.

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use crate::domain::value_object::AuthToken;

/// REST API failures
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing, expired or rejected token (HTTP 401/403)
    #[error("authentication required or token rejected")]
    Unauthorized,

    /// Rate limit or upstream quota exhausted (HTTP 429, or a body
    /// mentioning "quota"); shown with a longer-lived notice than the
    /// generic error path
    #[error("rate limit or quota exhausted: {0}")]
    QuotaExceeded(String),

    /// Request rejected client-side before anything was sent
    #[error("request rejected before send: {0}")]
    Validation(String),

    /// Any other non-success status
    #[error("server returned {status}: {message}")]
    Api { status: u16, message: String },

    /// Connection-level failure
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl ApiError {
    /// Map a non-success response to the error taxonomy
    pub fn from_status(status: u16, body: &str) -> Self {
        if status == 401 || status == 403 {
            return ApiError::Unauthorized;
        }
        if is_quota_error(status, body) {
            return ApiError::QuotaExceeded(extract_message(body));
        }
        ApiError::Api {
            status,
            message: extract_message(body),
        }
    }
}

/// Quota detection: HTTP 429 or a "quota" substring anywhere in the body
pub fn is_quota_error(status: u16, body: &str) -> bool {
    status == 429 || body.to_lowercase().contains("quota")
}

/// Best-effort extraction of the server's `{"message": ...}` field,
/// falling back to the raw body
fn extract_message(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body)
        && let Some(message) = value.get("message").and_then(|m| m.as_str())
    {
        return message.to_string();
    }
    body.trim().to_string()
}

/// CodeThrone REST API client
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<AuthToken>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http: reqwest::Client::new(),
            base_url,
            token: None,
        }
    }

    /// Set or clear the bearer token attached to every request
    pub fn set_token(&mut self, token: Option<AuthToken>) {
        self.token = token;
    }

    pub fn token(&self) -> Option<&AuthToken> {
        self.token.as_ref()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub(crate) fn request(
        &self,
        method: reqwest::Method,
        path: &str,
    ) -> reqwest::RequestBuilder {
        let mut builder = self.http.request(method, self.url(path));
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token.as_str());
        }
        builder
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.execute_json(self.request(reqwest::Method::GET, path))
            .await
    }

    pub(crate) async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.execute_json(self.request(reqwest::Method::POST, path).json(body))
            .await
    }

    pub(crate) async fn put_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.execute_json(self.request(reqwest::Method::PUT, path).json(body))
            .await
    }

    /// POST without a body for endpoints that answer with plain success
    pub(crate) async fn post_unit(&self, path: &str) -> Result<(), ApiError> {
        self.execute_unit(self.request(reqwest::Method::POST, path))
            .await
    }

    pub(crate) async fn post_json_unit<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<(), ApiError> {
        self.execute_unit(self.request(reqwest::Method::POST, path).json(body))
            .await
    }

    pub(crate) async fn delete_unit(&self, path: &str) -> Result<(), ApiError> {
        self.execute_unit(self.request(reqwest::Method::DELETE, path))
            .await
    }

    pub(crate) async fn execute_json<T: DeserializeOwned>(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::from_status(status.as_u16(), &body));
        }
        Ok(response.json::<T>().await?)
    }

    pub(crate) async fn execute_unit(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<(), ApiError> {
        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::from_status(status.as_u16(), &body));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quota_detection_by_status() {
        // テスト項目: HTTP 429 がクォータエラーとして検出される
        // given (前提条件):
        let status = 429;
        let body = "too many requests";

        // when (操作) / then (期待する結果):
        assert!(is_quota_error(status, body));
    }

    #[test]
    fn test_quota_detection_by_body_substring() {
        // テスト項目: 本文に quota を含むレスポンスがクォータエラーとして検出される
        // given (前提条件):
        let status = 500;
        let body = r#"{"message":"AI generation Quota exceeded for today"}"#;

        // when (操作) / then (期待する結果):
        assert!(is_quota_error(status, body));
    }

    #[test]
    fn test_normal_server_error_is_not_quota() {
        // テスト項目: 通常のサーバーエラーがクォータ扱いされない
        // given (前提条件):
        let status = 500;
        let body = r#"{"message":"internal error"}"#;

        // when (操作) / then (期待する結果):
        assert!(!is_quota_error(status, body));
    }

    #[test]
    fn test_from_status_maps_auth_failures() {
        // テスト項目: 401/403 が Unauthorized に写像される
        // given (前提条件) / when (操作) / then (期待する結果):
        assert!(matches!(
            ApiError::from_status(401, ""),
            ApiError::Unauthorized
        ));
        assert!(matches!(
            ApiError::from_status(403, ""),
            ApiError::Unauthorized
        ));
    }

    #[test]
    fn test_from_status_extracts_message_field() {
        // テスト項目: エラーレスポンスの message フィールドが抽出される
        // given (前提条件):
        let body = r#"{"message":"room not found"}"#;

        // when (操作):
        let error = ApiError::from_status(404, body);

        // then (期待する結果):
        match error {
            ApiError::Api { status, message } => {
                assert_eq!(status, 404);
                assert_eq!(message, "room not found");
            }
            other => panic!("expected Api error, got {:?}", other),
        }
    }

    #[test]
    fn test_from_status_falls_back_to_raw_body() {
        // テスト項目: JSON でない本文はそのままメッセージとして使われる
        // given (前提条件):
        let body = "Bad Gateway\n";

        // when (操作):
        let error = ApiError::from_status(502, body);

        // then (期待する結果):
        match error {
            ApiError::Api { message, .. } => assert_eq!(message, "Bad Gateway"),
            other => panic!("expected Api error, got {:?}", other),
        }
    }

    #[test]
    fn test_base_url_trailing_slash_is_normalized() {
        // テスト項目: 末尾スラッシュ付きの base URL が正規化される
        // given (前提条件):
        let client = ApiClient::new("http://localhost:5000/");

        // when (操作):
        let url = client.url("/auth/me");

        // then (期待する結果):
        assert_eq!(url, "http://localhost:5000/auth/me");
    }
}
