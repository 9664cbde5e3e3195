//! The host runtime around `ProfileBot`.
//!
//! Turns for the same conversation run one at a time. This is the only
//! place turn errors are caught.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{error, info};

use crate::activity::{Activity, ActivityType, ChannelAccount, OutgoingResponse};
use crate::bot::ProfileBot;
use crate::error::{ChannelError, Error};
use crate::state::{BotState, StateScope};
use crate::store::StateStore;
use crate::turn::TurnContext;

/// Reply sent when a turn fails.
pub const ERROR_REPLY: &str = "Sorry, it looks like something went wrong.";

pub struct BotAdapter {
    bot: ProfileBot,
    store: Arc<dyn StateStore>,
    bot_account: ChannelAccount,
    conversation_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl BotAdapter {
    pub fn new(bot: ProfileBot, store: Arc<dyn StateStore>, bot_account: ChannelAccount) -> Self {
        Self {
            bot,
            store,
            bot_account,
            conversation_locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn store(&self) -> &Arc<dyn StateStore> {
        &self.store
    }

    pub fn bot_account(&self) -> &ChannelAccount {
        &self.bot_account
    }

    /// Run one turn for `activity` and return the replies it produced.
    ///
    /// Only malformed activities are returned as errors. A failing turn is
    /// logged and the user gets `ERROR_REPLY` after whatever was already
    /// sent. Unsaved state changes are dropped; the two scopes are saved one
    /// after the other, so a user save that succeeded before the
    /// conversation save failed stays written.
    pub async fn process_activity(
        &self,
        mut activity: Activity,
    ) -> Result<Vec<OutgoingResponse>, Error> {
        validate(&activity)?;
        if activity.recipient.id.is_empty() && activity.recipient.name.is_empty() {
            activity.recipient = self.bot_account.clone();
        }

        let conversation_key = activity.conversation_key();
        let lock = self.conversation_lock(&conversation_key).await;
        let responses = {
            let _guard = lock.lock().await;
            self.run_turn(activity, &conversation_key).await
        };
        self.release_conversation_lock(&conversation_key, lock).await;
        Ok(responses)
    }

    async fn run_turn(&self, activity: Activity, conversation_key: &str) -> Vec<OutgoingResponse> {
        info!(
            conversation = %conversation_key,
            kind = ?activity.activity_type,
            "Processing activity"
        );

        let user_state = BotState::for_activity(Arc::clone(&self.store), StateScope::User, &activity);
        let conversation_state =
            BotState::for_activity(Arc::clone(&self.store), StateScope::Conversation, &activity);
        let mut turn = TurnContext::new(activity, user_state, conversation_state);

        let result = self.bot.on_turn(&mut turn).await;
        let mut responses = turn.into_responses();
        if let Err(e) = result {
            error!(conversation = %conversation_key, error = %e, "Turn failed");
            responses.push(OutgoingResponse::text(ERROR_REPLY));
        }
        responses
    }

    async fn conversation_lock(&self, key: &str) -> Arc<Mutex<()>> {
        let mut locks = self.conversation_locks.lock().await;
        Arc::clone(locks.entry(key.to_string()).or_default())
    }

    /// Forget the lock for `key` once no other turn holds or awaits it.
    ///
    /// Clones are only taken under the map lock, so the count cannot grow
    /// while it is held here.
    async fn release_conversation_lock(&self, key: &str, lock: Arc<Mutex<()>>) {
        let mut locks = self.conversation_locks.lock().await;
        drop(lock);
        if locks.get(key).is_some_and(|l| Arc::strong_count(l) == 1) {
            locks.remove(key);
        }
    }
}

fn validate(activity: &Activity) -> Result<(), ChannelError> {
    if activity.channel_id.trim().is_empty() {
        return Err(ChannelError::InvalidMessage("missing channelId".to_string()));
    }
    if activity.conversation.id.trim().is_empty() {
        return Err(ChannelError::InvalidMessage(
            "missing conversation.id".to_string(),
        ));
    }
    if activity.activity_type == ActivityType::Message && activity.from.id.trim().is_empty() {
        return Err(ChannelError::InvalidMessage("missing from.id".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::error::DatabaseError;
    use crate::store::MemoryStore;

    fn adapter(store: Arc<dyn StateStore>) -> BotAdapter {
        BotAdapter::new(ProfileBot::new(), store, ChannelAccount::new("bot", "profile-bot"))
    }

    /// Reads succeed (empty), writes always fail.
    struct ReadOnlyStore;

    #[async_trait]
    impl StateStore for ReadOnlyStore {
        async fn read(&self, _key: &str) -> Result<Option<serde_json::Value>, DatabaseError> {
            Ok(None)
        }
        async fn write(&self, _key: &str, _value: &serde_json::Value) -> Result<(), DatabaseError> {
            Err(DatabaseError::Query("read-only".to_string()))
        }
        async fn delete(&self, _key: &str) -> Result<bool, DatabaseError> {
            Ok(false)
        }
    }

    #[tokio::test]
    async fn missing_conversation_is_rejected() {
        let adapter = adapter(Arc::new(MemoryStore::new()));
        let activity = Activity::message("test", "", "user", "hi");
        let err = adapter.process_activity(activity).await.unwrap_err();
        assert!(matches!(err, Error::Channel(ChannelError::InvalidMessage(_))));
    }

    #[tokio::test]
    async fn missing_sender_is_rejected() {
        let adapter = adapter(Arc::new(MemoryStore::new()));
        let activity = Activity::message("test", "conv", "", "hi");
        let err = adapter.process_activity(activity).await.unwrap_err();
        assert!(matches!(err, Error::Channel(ChannelError::InvalidMessage(_))));
    }

    #[tokio::test]
    async fn store_failure_becomes_error_reply() {
        let adapter = adapter(Arc::new(ReadOnlyStore));
        let responses = adapter
            .process_activity(Activity::message("test", "conv", "user", "hi"))
            .await
            .unwrap();
        let texts: Vec<_> = responses.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, vec!["What is your name, human?", ERROR_REPLY]);
    }

    #[tokio::test]
    async fn recipient_defaults_to_bot_account() {
        let adapter = adapter(Arc::new(MemoryStore::new()));
        // The bot's own join event carries no recipient; it must not be welcomed.
        let activity = Activity::members_added(
            "test",
            "conv",
            vec![ChannelAccount::new("bot", "profile-bot")],
        );
        assert!(adapter.process_activity(activity).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn concurrent_turns_in_one_conversation_are_serialized() {
        let store: Arc<dyn StateStore> = Arc::new(MemoryStore::new());
        let adapter = Arc::new(adapter(Arc::clone(&store)));

        let a = {
            let adapter = Arc::clone(&adapter);
            tokio::spawn(async move {
                adapter
                    .process_activity(Activity::message("test", "conv", "user", "hi"))
                    .await
                    .unwrap()
            })
        };
        let b = {
            let adapter = Arc::clone(&adapter);
            tokio::spawn(async move {
                adapter
                    .process_activity(Activity::message("test", "conv", "user", "hello"))
                    .await
                    .unwrap()
            })
        };
        let mut texts: Vec<String> = [a.await.unwrap(), b.await.unwrap()]
            .into_iter()
            .flatten()
            .map(|r| r.text)
            .collect();
        texts.sort();

        // Whichever turn ran first began onboarding; the second answered the
        // name prompt instead of beginning a second flow.
        assert_eq!(
            texts,
            vec!["Do you want to give your age?", "What is your name, human?"]
        );
    }

    #[tokio::test]
    async fn finished_conversations_release_their_lock() {
        let adapter = Arc::new(adapter(Arc::new(MemoryStore::new())));
        for i in 0..100 {
            let activity = Activity::message("test", format!("c{i}"), "user", "cancel");
            adapter.process_activity(activity).await.unwrap();
        }
        assert!(adapter.conversation_locks.lock().await.is_empty());

        let turns: Vec<_> = (0..10)
            .map(|i| {
                let adapter = Arc::clone(&adapter);
                tokio::spawn(async move {
                    let text = if i % 2 == 0 { "hi" } else { "cancel" };
                    adapter
                        .process_activity(Activity::message("test", "shared", "user", text))
                        .await
                        .unwrap()
                })
            })
            .collect();
        for turn in turns {
            turn.await.unwrap();
        }
        assert!(adapter.conversation_locks.lock().await.is_empty());
    }
}
