use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::Error;

/// Response envelope used by every endpoint of the API.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiEnvelope<T = Value> {
    #[serde(default)]
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    pub error: Option<String>,
}

impl<T> ApiEnvelope<T> {
    /// Unwraps `data`, turning `success: false` into [`Error::Api`].
    pub fn into_data(self) -> Result<Option<T>, Error> {
        if self.success {
            return Ok(self.data);
        }
        Err(Error::Api(
            self.message
                .or(self.error)
                .unwrap_or_else(|| "request failed".to_string()),
        ))
    }
}

/// Reads a list that the backend returns either bare, wrapped as `{ key: [...] }`, or
/// not at all.
pub fn normalize_list<T: DeserializeOwned>(data: Option<Value>, key: &str) -> Result<Vec<T>, Error> {
    let list = match data {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Object(mut map)) => match map.remove(key) {
            Some(Value::Null) | None => return Ok(Vec::new()),
            Some(inner) => inner,
        },
        Some(other) => other,
    };
    if !list.is_array() {
        return Err(Error::Api(format!("expected a list for '{key}'")));
    }
    Ok(serde_json::from_value(list)?)
}

/// Reads an object returned either as `{ key: {...} }` or directly.
pub fn normalize_object<T: DeserializeOwned>(data: Option<Value>, key: &str) -> Result<T, Error> {
    let value = match data {
        None | Some(Value::Null) => {
            return Err(Error::Api(format!("response is missing '{key}'")));
        }
        Some(Value::Object(mut map)) => match map.remove(key) {
            Some(inner) if inner.is_object() => inner,
            Some(other) => {
                map.insert(key.to_string(), other);
                Value::Object(map)
            }
            None => Value::Object(map),
        },
        Some(other) => other,
    };
    Ok(serde_json::from_value(value)?)
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[serde(alias = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub sport: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default, alias = "date")]
    pub starts_at: Option<String>,
    #[serde(default)]
    pub max_participants: Option<u32>,
    #[serde(default)]
    pub participants: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(alias = "name")]
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default, alias = "profileImage")]
    pub avatar_url: Option<String>,
    #[serde(default, alias = "sports")]
    pub favorite_sports: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub favorite_sports: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Friend {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(alias = "name")]
    pub username: String,
    #[serde(default, alias = "profileImage")]
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendRequest {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default, alias = "sender")]
    pub from: Option<String>,
    #[serde(default, alias = "receiver")]
    pub to: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(alias = "sender")]
    pub sender_id: String,
    #[serde(alias = "receiver")]
    pub receiver_id: String,
    pub content: String,
    #[serde(default, alias = "timestamp")]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    #[serde(alias = "_id")]
    pub user_id: String,
    #[serde(default, alias = "name")]
    pub username: Option<String>,
    #[serde(default)]
    pub last_message: Option<String>,
    #[serde(default)]
    pub unread_count: u32,
}
