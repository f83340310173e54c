use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Send input as it arrives off the wire; optional fields so validation can
/// produce field errors instead of deserialization failures.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SendMessageInput {
    #[serde(default)]
    pub receiver: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateMessageInput {
    #[serde(default)]
    pub body: Option<String>,
}

/// Domain message (business view).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessageRecord {
    pub id: Uuid,
    pub body: String,
    pub sender: Uuid,
    pub receiver: Uuid,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: DateTime<FixedOffset>,
}

/// Conversation entry carrying the sender's display name for grouping.
#[derive(Debug, Clone, Serialize)]
pub struct ConversationMessage {
    pub id: Uuid,
    pub body: String,
    pub sender: Uuid,
    pub sender_name: String,
    pub created_at: DateTime<FixedOffset>,
}
