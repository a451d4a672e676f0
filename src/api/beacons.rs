//! `/api/beacons`

use tracing::info;

use crate::client::{ApiClient, ApiError};
use crate::models::{Beacon, BeaconPayload, Id};

const PATH: &str = "/api/beacons";

pub struct BeaconsApi<'a> {
    client: &'a ApiClient,
}

impl<'a> BeaconsApi<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Vec<Beacon>, ApiError> {
        self.client.get_list(PATH).await
    }

    pub async fn get(&self, id: Id) -> Result<Beacon, ApiError> {
        self.client.get(&format!("{}/{}", PATH, id)).await
    }

    pub async fn create(&self, payload: &BeaconPayload) -> Result<Beacon, ApiError> {
        let beacon: Beacon = self.client.post(PATH, payload).await?;
        info!("Beacon {} created", beacon.uuid);
        Ok(beacon)
    }

    pub async fn update(&self, id: Id, payload: &BeaconPayload) -> Result<Beacon, ApiError> {
        self.client.put(&format!("{}/{}", PATH, id), payload).await
    }

    pub async fn delete(&self, id: Id) -> Result<(), ApiError> {
        self.client.delete(&format!("{}/{}", PATH, id)).await?;
        info!("Beacon {} deleted", id);
        Ok(())
    }
}
