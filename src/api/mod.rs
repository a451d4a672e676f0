//! Resource API modules.
//!
//! Each resource is a short-lived handle borrowed from [`ApiClient`], e.g.
//! `client.motos().list().await`.

pub mod auth;
pub mod beacons;
pub mod locations;
pub mod motos;
pub mod users;

use crate::client::ApiClient;

pub use auth::AuthApi;
pub use beacons::BeaconsApi;
pub use locations::LocationsApi;
pub use motos::MotosApi;
pub use users::UsersApi;

impl ApiClient {
    pub fn auth(&self) -> AuthApi<'_> {
        AuthApi::new(self)
    }

    pub fn beacons(&self) -> BeaconsApi<'_> {
        BeaconsApi::new(self)
    }

    pub fn locations(&self) -> LocationsApi<'_> {
        LocationsApi::new(self)
    }

    pub fn motos(&self) -> MotosApi<'_> {
        MotosApi::new(self)
    }

    pub fn users(&self) -> UsersApi<'_> {
        UsersApi::new(self)
    }
}
