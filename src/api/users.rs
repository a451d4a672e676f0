//! `/api/usuarios`

use tracing::info;

use crate::client::{ApiClient, ApiError};
use crate::models::NewUserPayload;

pub struct UsersApi<'a> {
    client: &'a ApiClient,
}

impl<'a> UsersApi<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Create an account. A 400 from the backend means the email is taken.
    pub async fn register(&self, payload: &NewUserPayload) -> Result<(), ApiError> {
        self.client.post_discard("/api/usuarios", payload).await?;
        info!("User {} registered", payload.username);
        Ok(())
    }
}
