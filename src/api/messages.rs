use reqwest::Method;
use serde_json::json;

use crate::{
    Gateway,
    client::RequestOptions,
    errors::Error,
    types::{Conversation, Message, normalize_list, normalize_object},
};

use super::segment;

#[derive(Clone)]
pub struct MessagesApi {
    gateway: Gateway,
}

impl MessagesApi {
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    pub async fn conversations(&self) -> Result<Vec<Conversation>, Error> {
        let data = self.gateway.get_envelope("/messages/conversations").await?;
        normalize_list(data, "conversations")
    }

    /// Messages exchanged with `user_id`, oldest first as returned by the API.
    pub async fn thread(&self, user_id: &str) -> Result<Vec<Message>, Error> {
        let data = self
            .gateway
            .get_envelope(&format!("/messages/{}", segment(user_id)))
            .await?;
        normalize_list(data, "messages")
    }

    pub async fn send(&self, receiver_id: &str, content: &str) -> Result<Message, Error> {
        let data = self
            .gateway
            .send_envelope(
                Method::POST,
                "/messages",
                RequestOptions::new().json(&json!({
                    "receiverId": receiver_id,
                    "content": content,
                }))?,
            )
            .await?;
        normalize_object(data, "message")
    }
}
