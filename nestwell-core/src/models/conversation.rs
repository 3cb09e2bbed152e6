use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    pub id: Uuid,
    pub subject: Option<String>,
    pub participant_ids: Vec<Uuid>,
    /// Names as they were when the conversation was opened.
    pub participant_names: BTreeMap<Uuid, String>,
    pub created_at: DateTime<Utc>,
    pub last_message_at: Option<DateTime<Utc>>,
}

impl Conversation {
    pub fn has_participant(&self, id: Uuid) -> bool {
        self.participant_ids.contains(&id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub sender_id: Uuid,
    pub body: String,
    pub attachment_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateConversationInput {
    pub subject: Option<String>,
    pub participant_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendMessageInput {
    pub sender_id: Uuid,
    pub body: String,
    pub attachment_url: Option<String>,
}

/// A conversation as seen by one participant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationOverview {
    #[serde(flatten)]
    pub conversation: Conversation,
    pub unread_count: u32,
}
