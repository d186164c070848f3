use reqwest::Method;

use crate::{
    Gateway,
    client::RequestOptions,
    errors::Error,
    types::{Profile, ProfileUpdate, normalize_object},
};

#[derive(Clone)]
pub struct ProfileApi {
    gateway: Gateway,
}

impl ProfileApi {
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    pub async fn get(&self) -> Result<Profile, Error> {
        let data = self.gateway.get_envelope("/users/profile").await?;
        normalize_object(data, "user")
    }

    pub async fn update(&self, update: &ProfileUpdate) -> Result<Profile, Error> {
        let data = self
            .gateway
            .send_envelope(
                Method::PUT,
                "/users/profile",
                RequestOptions::new().json(update)?,
            )
            .await?;
        normalize_object(data, "user")
    }
}
