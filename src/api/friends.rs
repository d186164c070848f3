use reqwest::Method;
use serde_json::json;

use crate::{
    Gateway,
    client::RequestOptions,
    errors::Error,
    types::{Friend, FriendRequest, normalize_list, normalize_object},
};

use super::segment;

#[derive(Clone)]
pub struct FriendsApi {
    gateway: Gateway,
}

impl FriendsApi {
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    pub async fn list(&self) -> Result<Vec<Friend>, Error> {
        let data = self.gateway.get_envelope("/friends").await?;
        normalize_list(data, "friends")
    }

    pub async fn send_request(&self, user_id: &str) -> Result<FriendRequest, Error> {
        let data = self
            .gateway
            .send_envelope(
                Method::POST,
                "/friends/request",
                RequestOptions::new().json(&json!({ "userId": user_id }))?,
            )
            .await?;
        normalize_object(data, "request")
    }

    pub async fn accept(&self, request_id: &str) -> Result<FriendRequest, Error> {
        let data = self
            .gateway
            .send_envelope(
                Method::PUT,
                &format!("/friends/request/{}/accept", segment(request_id)),
                RequestOptions::new(),
            )
            .await?;
        normalize_object(data, "request")
    }

    pub async fn remove(&self, friend_id: &str) -> Result<(), Error> {
        self.gateway
            .send_envelope(
                Method::DELETE,
                &format!("/friends/{}", segment(friend_id)),
                RequestOptions::new(),
            )
            .await?;
        Ok(())
    }
}
