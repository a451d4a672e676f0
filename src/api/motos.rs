//! `/api/motos`

use tracing::info;

use crate::client::{ApiClient, ApiError};
use crate::models::{Id, Moto, MotoPayload};

const PATH: &str = "/api/motos";

pub struct MotosApi<'a> {
    client: &'a ApiClient,
}

impl<'a> MotosApi<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Vec<Moto>, ApiError> {
        self.client.get_list(PATH).await
    }

    pub async fn get(&self, id: Id) -> Result<Moto, ApiError> {
        self.client.get(&format!("{}/{}", PATH, id)).await
    }

    pub async fn create(&self, payload: &MotoPayload) -> Result<Moto, ApiError> {
        let moto: Moto = self.client.post(PATH, payload).await?;
        info!("Moto {} registered with plate {}", moto.id, moto.placa);
        Ok(moto)
    }

    pub async fn update(&self, id: Id, payload: &MotoPayload) -> Result<Moto, ApiError> {
        self.client.put(&format!("{}/{}", PATH, id), payload).await
    }

    pub async fn delete(&self, id: Id) -> Result<(), ApiError> {
        self.client.delete(&format!("{}/{}", PATH, id)).await?;
        info!("Moto {} deleted", id);
        Ok(())
    }
}
