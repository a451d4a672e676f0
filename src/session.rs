//! Session Module
//!
//! Holds the auth token and the logged-in user's profile. The token lives in
//! device storage where [`ApiClient`] picks it up for every request.

use tracing::{debug, info, warn};

use crate::client::{ApiClient, ApiError};
use crate::i18n::Locale;
use crate::models::User;
use crate::storage::{StorageError, TOKEN_KEY, USERNAME_KEY, USER_ID_KEY};
use crate::validation::{self, ValidationError};

/// Manages authentication state
#[derive(Debug)]
pub struct SessionManager {
    client: ApiClient,
    user: Option<User>,
}

impl SessionManager {
    pub fn new(client: ApiClient) -> Self {
        Self { client, user: None }
    }

    /// Re-establish a session from a stored token.
    ///
    /// The profile is refreshed from `/api/auth/me`. A 401 there means the
    /// token is dead (the client has already wiped it); any other failure keeps
    /// the token and falls back to the profile fields kept in storage.
    pub async fn restore(&mut self) -> Result<Option<&User>, SessionError> {
        let storage = self.client.storage();
        if storage.get_item(TOKEN_KEY)?.is_none() {
            debug!("No stored session found");
            self.user = None;
            return Ok(None);
        }

        match self.client.auth().me().await {
            Ok(user) => {
                if let Some(id) = user.id_funcionario {
                    storage.set_item(USER_ID_KEY, &id.to_string())?;
                }
                info!("Session restored for user: {:?}", user.id_funcionario);
                self.user = Some(user);
            }
            Err(ApiError::Http { status: 401, .. }) => {
                info!("Stored session is no longer valid");
                storage.remove_item(USERNAME_KEY)?;
                self.user = None;
            }
            Err(e) => {
                warn!("Could not refresh profile, using stored one: {}", e);
                self.user = Some(self.stored_profile()?);
            }
        }
        Ok(self.user.as_ref())
    }

    /// Exchange credentials for a token and persist it
    pub async fn login(&mut self, username: &str, password: &str) -> Result<&User, SessionError> {
        validation::require_credentials(username, password)?;
        let username = username.trim();

        let response = self
            .client
            .auth()
            .login(username, password)
            .await
            .map_err(SessionError::from_login_failure)?;

        let token = response
            .token
            .filter(|t| !t.trim().is_empty())
            .ok_or(SessionError::InvalidCredentials)?;

        let storage = self.client.storage();
        storage.set_item(TOKEN_KEY, &token)?;
        storage.set_item(USERNAME_KEY, username)?;
        match response.id_funcionario {
            Some(id) => storage.set_item(USER_ID_KEY, &id.to_string())?,
            None => storage.remove_item(USER_ID_KEY)?,
        }

        info!("Session set for user: {}", username);
        Ok(&*self.user.insert(User {
            id_funcionario: response.id_funcionario,
            nome: response.nome,
            email: response.email,
            cargo: response.cargo,
            username: Some(username.to_string()),
        }))
    }

    /// Clear the stored credentials and the in-memory profile
    pub fn logout(&mut self) -> Result<(), SessionError> {
        self.user = None;
        self.client
            .storage()
            .multi_remove(&[TOKEN_KEY, USER_ID_KEY, USERNAME_KEY])?;
        info!("Session cleared");
        Ok(())
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    /// True while a token is stored; a 401 anywhere ends it
    pub fn is_authenticated(&self) -> bool {
        matches!(self.client.storage().get_item(TOKEN_KEY), Ok(Some(_)))
    }

    fn stored_profile(&self) -> Result<User, StorageError> {
        let storage = self.client.storage();
        Ok(User {
            id_funcionario: storage.get_item(USER_ID_KEY)?.and_then(|id| id.trim().parse().ok()),
            username: storage.get_item(USERNAME_KEY)?,
            ..User::default()
        })
    }
}

/// Session errors
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Authentication server unavailable")]
    ServerUnavailable,

    #[error("Login failed: {0}")]
    Api(ApiError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl SessionError {
    fn from_login_failure(err: ApiError) -> Self {
        match err.status() {
            Some(401) => SessionError::InvalidCredentials,
            Some(status) if status >= 500 => SessionError::ServerUnavailable,
            _ => SessionError::Api(err),
        }
    }

    pub fn localized(&self, locale: Locale) -> String {
        match self {
            SessionError::Validation(e) => e.localized(locale),
            SessionError::InvalidCredentials => locale.t("login.invalid"),
            SessionError::ServerUnavailable => locale.t("login.unavailable"),
            SessionError::Api(ApiError::Network(_)) => locale.t("errors.network"),
            SessionError::Api(_) | SessionError::Storage(_) => locale.t("login.failed"),
        }
    }
}
