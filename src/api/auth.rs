//! `/api/auth`

use crate::client::{ApiClient, ApiError};
use crate::models::{LoginRequest, LoginResponse, User};

pub struct AuthApi<'a> {
    client: &'a ApiClient,
}

impl<'a> AuthApi<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, ApiError> {
        self.client
            .post("/api/auth/login", &LoginRequest { username, password })
            .await
    }

    /// Profile of the token holder
    pub async fn me(&self) -> Result<User, ApiError> {
        self.client.get("/api/auth/me").await
    }
}
