//! Turn controller — decides, per inbound activity, whether to cancel,
//! resume or start a flow, then persists user and conversation state.

use tracing::debug;

use super::greeting::HELLO_USER;
use super::onboarding::WHO_ARE_YOU;
use super::profile::UserProfile;
use crate::activity::ActivityType;
use crate::dialogs::DialogSet;
use crate::error::Error;
use crate::state::properties::USER_PROFILE;
use crate::turn::TurnContext;

pub const CANCELED: &str = "Ok... canceled.";
pub const NOTHING_TO_CANCEL: &str = "Nothing to cancel.";

/// Sentences sent when a user joins the conversation.
pub const WELCOME_LINES: [&str; 3] = [
    "Hello! I am a simple profile bot.",
    "I will ask for your name and, if you like, your age, and remember them for next time.",
    "Say cancel at any point to stop what we are doing.",
];

/// The bot's turn handler.
pub struct ProfileBot {
    dialogs: DialogSet,
}

impl Default for ProfileBot {
    fn default() -> Self {
        Self::new()
    }
}

impl ProfileBot {
    pub fn new() -> Self {
        Self {
            dialogs: super::dialog_set(),
        }
    }

    /// Handle one turn. Errors propagate to the caller untouched; state is
    /// only persisted when the turn completes.
    pub async fn on_turn(&self, turn: &mut TurnContext) -> Result<(), Error> {
        match turn.activity().activity_type {
            ActivityType::Message => self.on_message(turn).await?,
            ActivityType::ConversationUpdate => on_members_added(turn),
            ActivityType::Other => debug!("Ignoring activity"),
        }

        turn.user_state.save_changes().await?;
        turn.conversation_state.save_changes().await?;
        Ok(())
    }

    async fn on_message(&self, turn: &mut TurnContext) -> Result<(), Error> {
        let mut dc = self.dialogs.create_context(turn).await?;
        let utterance = turn.activity().text().trim().to_lowercase();

        if utterance == "cancel" {
            if dc.active_dialog().is_some() {
                dc.cancel_all_dialogs();
                turn.send_text(CANCELED);
            } else {
                turn.send_text(NOTHING_TO_CANCEL);
            }
        } else {
            let status = dc.continue_dialog(turn).await?;
            debug!(?status, "Continued dialog");

            if !turn.responded() && dc.active_dialog().is_none() {
                let profile: UserProfile = turn.user_state.get_or_default(USER_PROFILE).await?;
                let flow = if profile.name.is_some() {
                    HELLO_USER
                } else {
                    WHO_ARE_YOU
                };
                dc.begin_dialog(flow, turn).await?;
            }
        }

        dc.save(turn).await?;
        Ok(())
    }
}

fn on_members_added(turn: &mut TurnContext) {
    let activity = turn.activity();
    let joined = activity
        .members_added
        .iter()
        .filter(|member| !member.is_same(&activity.recipient))
        .count();
    for _ in 0..joined {
        turn.send_text(WELCOME_LINES.join(" "));
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::activity::{Activity, ChannelAccount};
    use crate::dialogs::DialogStack;
    use crate::error::DatabaseError;
    use crate::state::properties::DIALOG_STATE;
    use crate::state::{BotState, StateScope};
    use crate::store::{MemoryStore, StateStore};

    fn bot_account() -> ChannelAccount {
        ChannelAccount::new("bot", "profile-bot")
    }

    async fn run(bot: &ProfileBot, store: &Arc<dyn StateStore>, activity: Activity) -> Vec<String> {
        let activity = activity.with_recipient(bot_account());
        let user = BotState::for_activity(Arc::clone(store), StateScope::User, &activity);
        let conversation =
            BotState::for_activity(Arc::clone(store), StateScope::Conversation, &activity);
        let mut turn = TurnContext::new(activity, user, conversation);
        bot.on_turn(&mut turn).await.unwrap();
        turn.into_responses().into_iter().map(|r| r.text).collect()
    }

    fn say(text: &str) -> Activity {
        Activity::message("test", "conv", "user", text)
    }

    async fn stack(store: &Arc<dyn StateStore>) -> DialogStack {
        let record = store
            .read("test/conversations/conv")
            .await
            .unwrap()
            .unwrap_or_default();
        serde_json::from_value(record[DIALOG_STATE].clone()).unwrap_or_default()
    }

    #[tokio::test]
    async fn first_message_begins_onboarding() {
        let bot = ProfileBot::new();
        let store: Arc<dyn StateStore> = Arc::new(MemoryStore::new());

        assert_eq!(run(&bot, &store, say("hi")).await, vec!["What is your name, human?"]);
        assert_eq!(stack(&store).await.active().unwrap().id, WHO_ARE_YOU);
    }

    #[tokio::test]
    async fn cancel_without_active_flow() {
        let bot = ProfileBot::new();
        let store: Arc<dyn StateStore> = Arc::new(MemoryStore::new());

        assert_eq!(run(&bot, &store, say("cancel")).await, vec![NOTHING_TO_CANCEL]);
        assert!(stack(&store).await.is_empty());
    }

    #[tokio::test]
    async fn cancel_clears_active_flow_and_starts_nothing() {
        let bot = ProfileBot::new();
        let store: Arc<dyn StateStore> = Arc::new(MemoryStore::new());

        run(&bot, &store, say("hi")).await;
        assert_eq!(run(&bot, &store, say("  CANCEL ")).await, vec![CANCELED]);
        assert!(stack(&store).await.is_empty());

        // The name prompt was never answered.
        let user = store.read("test/users/user").await.unwrap();
        assert!(user.is_none());
    }

    #[tokio::test]
    async fn welcome_skips_the_bot_itself() {
        let bot = ProfileBot::new();
        let store: Arc<dyn StateStore> = Arc::new(MemoryStore::new());

        let only_bot = Activity::members_added("test", "conv", vec![bot_account()]);
        assert!(run(&bot, &store, only_bot).await.is_empty());

        let user_joined = Activity::members_added(
            "test",
            "conv",
            vec![bot_account(), ChannelAccount::new("user", "Ada")],
        );
        assert_eq!(run(&bot, &store, user_joined).await, vec![WELCOME_LINES.join(" ")]);
        assert!(stack(&store).await.is_empty(), "Welcome starts no flow");
    }

    #[tokio::test]
    async fn other_activities_are_ignored() {
        let bot = ProfileBot::new();
        let store: Arc<dyn StateStore> = Arc::new(MemoryStore::new());

        let mut typing = say("");
        typing.activity_type = ActivityType::Other;
        assert!(run(&bot, &store, typing).await.is_empty());
        assert!(store.read("test/conversations/conv").await.unwrap().is_none());
    }

    /// Memory store that records the key of every write.
    struct RecordingStore {
        inner: MemoryStore,
        writes: std::sync::Mutex<Vec<String>>,
    }

    #[async_trait::async_trait]
    impl StateStore for RecordingStore {
        async fn read(&self, key: &str) -> Result<Option<serde_json::Value>, DatabaseError> {
            self.inner.read(key).await
        }
        async fn write(&self, key: &str, value: &serde_json::Value) -> Result<(), DatabaseError> {
            self.writes.lock().unwrap().push(key.to_string());
            self.inner.write(key, value).await
        }
        async fn delete(&self, key: &str) -> Result<bool, DatabaseError> {
            self.inner.delete(key).await
        }
    }

    #[tokio::test]
    async fn user_state_is_saved_before_conversation_state() {
        let bot = ProfileBot::new();
        let recording = Arc::new(RecordingStore {
            inner: MemoryStore::new(),
            writes: std::sync::Mutex::new(Vec::new()),
        });
        let store: Arc<dyn StateStore> = Arc::clone(&recording) as Arc<dyn StateStore>;

        run(&bot, &store, say("hi")).await;
        recording.writes.lock().unwrap().clear();

        // Answering the name prompt changes both scopes.
        run(&bot, &store, say("Ada")).await;
        assert_eq!(
            *recording.writes.lock().unwrap(),
            vec!["test/users/user", "test/conversations/conv"]
        );
    }
}

