//! WebSocket message types for tag updates

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::DecodeError;
use crate::types::TagFields;

/// Requested operation, from the inbound `UpdateType`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateAction {
    Add,
    Delete,
    Retrieve,
    Unknown(String),
}

impl From<&str> for UpdateAction {
    fn from(value: &str) -> Self {
        match value {
            "add" => Self::Add,
            "delete" => Self::Delete,
            "retrieve" => Self::Retrieve,
            other => Self::Unknown(other.to_string()),
        }
    }
}

/// Message sent by a client
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ClientMessage {
    #[serde(rename = "UpdateType", default)]
    pub update_type: String,

    /// Single tag payload for `add` / `delete`
    #[serde(rename = "Tag", default)]
    pub tag: Option<TagFields>,
}

impl ClientMessage {
    /// Decode a client frame (text or binary JSON)
    pub fn decode(raw: &[u8]) -> Result<Self, DecodeError> {
        Ok(serde_json::from_slice(raw)?)
    }

    pub fn action(&self) -> UpdateAction {
        UpdateAction::from(self.update_type.as_str())
    }
}

/// Notification sent to clients
///
/// Every notification carries all three keys; unused ones are empty.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagNotification {
    #[serde(rename = "UpdateType")]
    pub update_type: String,

    #[serde(rename = "Tag", default)]
    pub tag: TagFields,

    #[serde(rename = "Tags", default)]
    pub tags: Vec<TagFields>,
}

impl TagNotification {
    pub fn added(tag: TagFields) -> Self {
        Self::single("add", tag)
    }

    pub fn deleted(tag: TagFields) -> Self {
        Self::single("delete", tag)
    }

    pub fn retrieval(tags: Vec<TagFields>) -> Self {
        Self {
            update_type: "retrieval".to_string(),
            tag: TagFields::default(),
            tags,
        }
    }

    /// Failure reply sent back to the requester only
    pub fn error(tag: TagFields) -> Self {
        Self::single("error", tag)
    }

    fn single(update_type: &str, tag: TagFields) -> Self {
        Self {
            update_type: update_type.to_string(),
            tag,
            tags: Vec::new(),
        }
    }

    /// Serialize once for fan-out
    pub fn to_frame(&self) -> Result<Arc<str>, serde_json::Error> {
        serde_json::to_string(self).map(Arc::from)
    }
}
