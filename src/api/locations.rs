//! `/api/localizacoes`

use tracing::info;

use crate::client::{ApiClient, ApiError};
use crate::models::{Id, Location, LocationPayload};

const PATH: &str = "/api/localizacoes";

pub struct LocationsApi<'a> {
    client: &'a ApiClient,
}

impl<'a> LocationsApi<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Vec<Location>, ApiError> {
        self.client.get_list(PATH).await
    }

    pub async fn get(&self, id: Id) -> Result<Location, ApiError> {
        self.client.get(&format!("{}/{}", PATH, id)).await
    }

    /// The created record is not read back; callers reload the list instead.
    pub async fn create(&self, payload: &LocationPayload) -> Result<(), ApiError> {
        self.client.post_discard(PATH, payload).await?;
        info!(
            "Location recorded for moto {} in yard {}",
            payload.moto_id, payload.patio_id
        );
        Ok(())
    }

    pub async fn update(&self, id: Id, payload: &LocationPayload) -> Result<Location, ApiError> {
        self.client.put(&format!("{}/{}", PATH, id), payload).await
    }

    pub async fn delete(&self, id: Id) -> Result<(), ApiError> {
        self.client.delete(&format!("{}/{}", PATH, id)).await
    }
}
