//! Authenticated session owned by the application root.
//!
//! Lifecycle is explicit: boot attempts a silent restore from the
//! persisted token, `login`/`register`/`complete_oauth` adopt a fresh
//! token, and `logout` clears both the persisted token and the in-memory
//! identity. Nothing here is a global; the CLI constructs one
//! [`AuthSession`] at startup and passes it down.

pub mod token_store;

use std::sync::Arc;

use crate::domain::entity::User;
use crate::domain::value_object::{AuthToken, UserId};
use crate::error::ClientError;
use crate::infrastructure::dto::http::RegisterRequest;
use crate::infrastructure::http::{ApiClient, ApiError};

use token_store::TokenStore;

pub struct AuthSession {
    store: Arc<dyn TokenStore>,
    token: Option<AuthToken>,
    user: Option<User>,
}

impl AuthSession {
    pub fn new(store: Arc<dyn TokenStore>) -> Self {
        Self {
            store,
            token: None,
            user: None,
        }
    }

    pub fn token(&self) -> Option<&AuthToken> {
        self.token.as_ref()
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn user_id(&self) -> Option<&UserId> {
        self.user.as_ref().map(|u| &u.id)
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some() && self.user.is_some()
    }

    /// Silent session restore on boot.
    ///
    /// Loads the persisted token and validates it with one `GET /auth/me`.
    /// A rejected token is cleared from storage; a network failure leaves
    /// it in place for the next boot. Returns whether a session was
    /// restored.
    pub async fn restore(&mut self, api: &mut ApiClient) -> Result<bool, ClientError> {
        let Some(raw_token) = self.store.load()? else {
            return Ok(false);
        };
        let Ok(token) = AuthToken::new(raw_token) else {
            self.store.clear()?;
            return Ok(false);
        };

        api.set_token(Some(token.clone()));
        match api.me().await {
            Ok(user_dto) => {
                self.token = Some(token);
                self.user = Some(user_dto.into());
                tracing::info!("Session restored from persisted token");
                Ok(true)
            }
            Err(ApiError::Unauthorized) => {
                tracing::info!("Persisted token was rejected; clearing it");
                self.store.clear()?;
                api.set_token(None);
                Ok(false)
            }
            Err(e) => {
                // Keep the token: it may still be valid once the network
                // comes back
                api.set_token(None);
                Err(e.into())
            }
        }
    }

    /// `POST /auth/login`, then persist the returned token
    pub async fn login(
        &mut self,
        api: &mut ApiClient,
        username: &str,
        password: &str,
        role: &str,
    ) -> Result<&User, ClientError> {
        let response = api.login(username, password, role).await?;
        self.adopt(api, response.token, response.user.into())
    }

    /// `POST /auth/register`, then persist the returned token
    pub async fn register(
        &mut self,
        api: &mut ApiClient,
        request: &RegisterRequest,
    ) -> Result<&User, ClientError> {
        let response = api.register(request).await?;
        self.adopt(api, response.token, response.user.into())
    }

    /// Complete the OAuth redirect flow: adopt the `?token=` callback
    /// value, then fetch the profile once, best-effort.
    pub async fn complete_oauth(
        &mut self,
        api: &mut ApiClient,
        callback_token: &str,
    ) -> Result<(), ClientError> {
        let Ok(token) = AuthToken::new(callback_token.to_string()) else {
            return Err(ClientError::NotAuthenticated);
        };
        self.store.save(token.as_str())?;
        api.set_token(Some(token.clone()));
        self.token = Some(token);

        match api.me().await {
            Ok(user_dto) => self.user = Some(user_dto.into()),
            Err(e) => tracing::warn!("Profile fetch after OAuth callback failed: {}", e),
        }
        Ok(())
    }

    /// Clear persisted token and in-memory identity
    pub fn logout(&mut self, api: &mut ApiClient) -> Result<(), ClientError> {
        self.store.clear()?;
        self.token = None;
        self.user = None;
        api.set_token(None);
        Ok(())
    }

    fn adopt(
        &mut self,
        api: &mut ApiClient,
        raw_token: String,
        user: User,
    ) -> Result<&User, ClientError> {
        let Ok(token) = AuthToken::new(raw_token) else {
            return Err(ClientError::NotAuthenticated);
        };
        self.store.save(token.as_str())?;
        api.set_token(Some(token.clone()));
        self.token = Some(token);
        Ok(self.user.insert(user))
    }
}

#[cfg(test)]
mod tests {
    use super::token_store::{InMemoryTokenStore, TokenStore};
    use super::*;

    #[test]
    fn test_logout_clears_store_and_identity() {
        // テスト項目: logout で永続トークンとメモリ上の識別情報が消える
        // given (前提条件):
        let store = Arc::new(InMemoryTokenStore::with_token("tok"));
        let mut session = AuthSession::new(store.clone());
        session.token = Some(AuthToken::new("tok".to_string()).unwrap());
        session.user = Some(User {
            id: UserId::new("u1".to_string()).unwrap(),
            username: "alice".to_string(),
            role: None,
        });
        let mut api = ApiClient::new("http://localhost:5000");

        // when (操作):
        session.logout(&mut api).unwrap();

        // then (期待する結果):
        assert!(!session.is_authenticated());
        assert_eq!(store.load().unwrap(), None);
        assert!(api.token().is_none());
    }

    #[tokio::test]
    async fn test_restore_without_persisted_token_is_a_no_op() {
        // テスト項目: 永続トークンが無い場合、restore は何もせず false を返す
        // given (前提条件):
        let store = Arc::new(InMemoryTokenStore::new());
        let mut session = AuthSession::new(store);
        let mut api = ApiClient::new("http://127.0.0.1:1");

        // when (操作):
        let restored = session.restore(&mut api).await.unwrap();

        // then (期待する結果):
        assert!(!restored);
        assert!(!session.is_authenticated());
    }
}
