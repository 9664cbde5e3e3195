//! Activity model — the inbound turn payload and outbound replies.
//!
//! Field names follow the Bot Framework activity JSON (`camelCase`, `type`,
//! `channelId`, `membersAdded`) so payloads from existing channel connectors
//! deserialize without translation.

use serde::{Deserialize, Serialize};

/// Kind of inbound activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActivityType {
    Message,
    ConversationUpdate,
    /// Anything else (typing, endOfConversation, ...). Ignored by the bot.
    #[serde(other)]
    Other,
}

/// A participant in a conversation (user or bot).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelAccount {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
}

impl ChannelAccount {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    /// Whether two accounts denote the same participant.
    ///
    /// Ids win when both sides carry one; otherwise fall back to names.
    pub fn is_same(&self, other: &ChannelAccount) -> bool {
        if !self.id.is_empty() && !other.id.is_empty() {
            self.id == other.id
        } else {
            !self.name.is_empty() && self.name == other.name
        }
    }
}

/// Conversation reference carried on every activity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationAccount {
    #[serde(default)]
    pub id: String,
}

/// A single inbound event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    #[serde(rename = "type")]
    pub activity_type: ActivityType,
    #[serde(default)]
    pub channel_id: String,
    #[serde(default)]
    pub conversation: ConversationAccount,
    #[serde(default)]
    pub from: ChannelAccount,
    #[serde(default)]
    pub recipient: ChannelAccount,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub members_added: Vec<ChannelAccount>,
}

impl Activity {
    /// Build a plain message activity from `user_id` in `conversation_id`.
    pub fn message(
        channel_id: impl Into<String>,
        conversation_id: impl Into<String>,
        user_id: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        let user_id = user_id.into();
        Self {
            activity_type: ActivityType::Message,
            channel_id: channel_id.into(),
            conversation: ConversationAccount {
                id: conversation_id.into(),
            },
            from: ChannelAccount::new(user_id.clone(), user_id),
            recipient: ChannelAccount::default(),
            text: Some(text.into()),
            members_added: Vec::new(),
        }
    }

    /// Build a membership update announcing `members` joined.
    pub fn members_added(
        channel_id: impl Into<String>,
        conversation_id: impl Into<String>,
        members: Vec<ChannelAccount>,
    ) -> Self {
        Self {
            activity_type: ActivityType::ConversationUpdate,
            channel_id: channel_id.into(),
            conversation: ConversationAccount {
                id: conversation_id.into(),
            },
            from: members.first().cloned().unwrap_or_default(),
            recipient: ChannelAccount::default(),
            text: None,
            members_added: members,
        }
    }

    /// Set the bot account this activity is addressed to.
    pub fn with_recipient(mut self, recipient: ChannelAccount) -> Self {
        self.recipient = recipient;
        self
    }

    /// Message text, or empty for non-message activities.
    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }

    /// Key under which turns for this conversation are serialized.
    pub fn conversation_key(&self) -> String {
        format!("{}/{}", self.channel_id, self.conversation.id)
    }
}

/// A reply sent during a turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutgoingResponse {
    pub text: String,
    /// Quick replies offered alongside the text (choice prompts).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggested_actions: Vec<String>,
}

impl OutgoingResponse {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            suggested_actions: Vec::new(),
        }
    }

    pub fn with_suggested_actions(mut self, actions: Vec<String>) -> Self {
        self.suggested_actions = actions;
        self
    }
}
