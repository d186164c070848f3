use reqwest::Method;

use crate::{
    Gateway,
    client::RequestOptions,
    errors::Error,
    types::{Event, normalize_list, normalize_object},
};

use super::segment;

#[derive(Clone)]
pub struct EventsApi {
    gateway: Gateway,
}

impl EventsApi {
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    pub async fn list(&self) -> Result<Vec<Event>, Error> {
        let data = self.gateway.get_envelope("/events").await?;
        normalize_list(data, "events")
    }

    pub async fn get(&self, event_id: &str) -> Result<Event, Error> {
        let data = self
            .gateway
            .get_envelope(&format!("/events/{}", segment(event_id)))
            .await?;
        normalize_object(data, "event")
    }

    /// Joins the event and returns its updated state.
    pub async fn join(&self, event_id: &str) -> Result<Event, Error> {
        let data = self
            .gateway
            .send_envelope(
                Method::POST,
                &format!("/events/{}/join", segment(event_id)),
                RequestOptions::new(),
            )
            .await?;
        normalize_object(data, "event")
    }
}
