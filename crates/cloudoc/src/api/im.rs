use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{segment, with_json, NoData};
use crate::client::{Client, Response};
use crate::error::Result;
use crate::http::{HttpClient, HttpRequest};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Messages {
    pub items: Vec<Message>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Message {
    pub message_id: String,
    pub root_id: String,
    pub parent_id: String,
    pub msg_type: String,
    /// Unix milliseconds, as a string
    pub create_time: String,
    pub update_time: String,
    pub deleted: bool,
    pub updated: bool,
    pub chat_id: String,
    pub sender: Sender,
    pub body: MessageBody,
    pub mentions: Vec<Mention>,
    pub upper_message_id: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Sender {
    pub id: String,
    pub id_type: String,
    pub sender_type: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MessageBody {
    /// JSON document whose shape depends on `msg_type`
    pub content: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Mention {
    pub key: String,
    pub id: String,
    pub id_type: String,
    pub name: String,
}

/// Delayed update of an interactive card
///
/// `token` comes from the card callback and is valid for 30 minutes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardUpdate {
    pub token: String,
    pub card: Card,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Card {
    /// Restricts the update to these users; empty updates it for everyone
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub open_ids: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elements: Option<Value>,
}

impl<H: HttpClient> Client<H> {
    /// Gets the content of one message
    pub async fn get_message(&self, message_id: &str) -> Result<Response<Messages>> {
        let url = self.url(&format!("/open-apis/im/v1/messages/{}", segment(message_id)));
        self.call(HttpRequest::get(url)).await
    }

    pub async fn update_card(&self, update: &CardUpdate) -> Result<Response<NoData>> {
        let url = self.url("/open-apis/interactive/v1/card/update");
        self.call(with_json(HttpRequest::post(url), update)?).await
    }
}
