//! Main loop — feeds channel activities through the adapter.

use std::sync::Arc;

use futures::StreamExt;

use crate::adapter::BotAdapter;
use crate::channels::ChannelManager;
use crate::error::Error;

/// Why `run` returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Interrupted,
    StreamsEnded,
}

/// Process activities until Ctrl+C or until every channel stream ends.
pub async fn run(adapter: Arc<BotAdapter>, channels: ChannelManager) -> Result<StopReason, Error> {
    let mut activities = channels.start_all().await?;
    tracing::info!(channels = ?channels.names(), "Bot ready and listening");

    let reason = loop {
        let activity = tokio::select! {
            biased;
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Ctrl+C received, shutting down...");
                break StopReason::Interrupted;
            }
            next = activities.next() => {
                match next {
                    Some(activity) => activity,
                    None => {
                        tracing::info!("All channel streams ended");
                        break StopReason::StreamsEnded;
                    }
                }
            }
        };

        match adapter.process_activity(activity.clone()).await {
            Ok(responses) if responses.is_empty() => {}
            Ok(responses) => {
                if let Err(e) = channels.respond(&activity, &responses).await {
                    tracing::error!("Failed to deliver replies: {}", e);
                }
            }
            Err(e) => tracing::warn!("Dropping activity: {}", e),
        }
    };

    channels.shutdown_all().await?;
    Ok(reason)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use futures::stream;

    use super::*;
    use crate::activity::{Activity, ChannelAccount, OutgoingResponse};
    use crate::bot::ProfileBot;
    use crate::channels::{Channel, MessageStream};
    use crate::error::ChannelError;
    use crate::store::{MemoryStore, StateStore};

    /// Replays a fixed conversation and records every reply.
    struct Replay {
        lines: Vec<&'static str>,
        sent: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl Channel for Replay {
        fn name(&self) -> &str {
            "replay"
        }

        async fn start(&self) -> Result<MessageStream, ChannelError> {
            let mut activities = vec![Activity::members_added(
                "replay",
                "conv",
                vec![ChannelAccount::new("user", "user")],
            )];
            activities.extend(
                self.lines
                    .iter()
                    .map(|line| Activity::message("replay", "conv", "user", *line)),
            );
            Ok(Box::pin(stream::iter(activities)))
        }

        async fn respond(
            &self,
            _activity: &Activity,
            responses: &[OutgoingResponse],
        ) -> Result<(), ChannelError> {
            let mut sent = self.sent.lock().unwrap();
            sent.extend(responses.iter().map(|r| r.text.clone()));
            Ok(())
        }
    }

    #[tokio::test]
    async fn runs_until_streams_end() {
        let store: Arc<dyn StateStore> = Arc::new(MemoryStore::new());
        let adapter = Arc::new(BotAdapter::new(
            ProfileBot::new(),
            store,
            ChannelAccount::new("bot", "profile-bot"),
        ));
        let sent = Arc::new(Mutex::new(Vec::new()));
        let mut channels = ChannelManager::new();
        channels.add(Box::new(Replay {
            lines: vec!["hi", "Ada", "no", "hi"],
            sent: Arc::clone(&sent),
        }));

        let reason = run(adapter, channels).await.unwrap();
        assert_eq!(reason, StopReason::StreamsEnded);

        let sent = sent.lock().unwrap();
        assert_eq!(sent.len(), 5);
        assert!(sent[0].starts_with("Hello!"));
        assert_eq!(sent[1..], [
            "What is your name, human?",
            "Do you want to give your age?",
            "No age given.",
            "Your name is Ada and you did not share your age.",
        ]);
    }
}
