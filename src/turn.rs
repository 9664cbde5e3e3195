//! Everything bound to one inbound activity.

use crate::activity::{Activity, OutgoingResponse};
use crate::state::BotState;

/// One turn: the inbound activity, the state scopes it binds, and the
/// replies produced so far (in send order).
pub struct TurnContext {
    activity: Activity,
    /// User-scoped state (the profile store).
    pub user_state: BotState,
    /// Conversation-scoped state (the dialog position).
    pub conversation_state: BotState,
    responses: Vec<OutgoingResponse>,
}

impl TurnContext {
    pub fn new(activity: Activity, user_state: BotState, conversation_state: BotState) -> Self {
        Self {
            activity,
            user_state,
            conversation_state,
            responses: Vec::new(),
        }
    }

    pub fn activity(&self) -> &Activity {
        &self.activity
    }

    /// Queue a plain text reply.
    pub fn send_text(&mut self, text: impl Into<String>) {
        self.send(OutgoingResponse::text(text));
    }

    /// Queue a reply.
    pub fn send(&mut self, response: OutgoingResponse) {
        tracing::debug!(text = %response.text, "Sending reply");
        self.responses.push(response);
    }

    /// Whether anything has been sent this turn.
    pub fn responded(&self) -> bool {
        !self.responses.is_empty()
    }

    pub fn responses(&self) -> &[OutgoingResponse] {
        &self.responses
    }

    pub fn into_responses(self) -> Vec<OutgoingResponse> {
        self.responses
    }
}
