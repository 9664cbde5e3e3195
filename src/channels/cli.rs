//! CLI channel — stdin/stdout REPL for local testing.

use async_trait::async_trait;
use futures::stream;
use tokio::io::{AsyncBufReadExt, BufReader};
use uuid::Uuid;

use crate::activity::{Activity, ChannelAccount, OutgoingResponse};
use crate::channels::{Channel, MessageStream};
use crate::error::ChannelError;

const CHANNEL: &str = "cli";
const USER: &str = "local-user";

/// A single-user channel reading lines from stdin and printing replies.
///
/// Every run is a new conversation; the user's profile carries over.
pub struct CliChannel {
    bot: ChannelAccount,
    conversation_id: String,
}

impl CliChannel {
    pub fn new(bot: ChannelAccount) -> Self {
        Self {
            bot,
            conversation_id: format!("cli-{}", Uuid::new_v4()),
        }
    }

    pub fn conversation_id(&self) -> &str {
        &self.conversation_id
    }
}

#[async_trait]
impl Channel for CliChannel {
    fn name(&self) -> &str {
        CHANNEL
    }

    async fn start(&self) -> Result<MessageStream, ChannelError> {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        let bot = self.bot.clone();
        let conversation_id = self.conversation_id.clone();

        // The local user joins as soon as the REPL opens.
        let joined = Activity::members_added(
            CHANNEL,
            conversation_id.clone(),
            vec![ChannelAccount::new(USER, USER)],
        )
        .with_recipient(bot.clone());
        tx.send(joined).map_err(|e| ChannelError::StartupFailed {
            name: CHANNEL.to_string(),
            reason: e.to_string(),
        })?;

        tokio::spawn(async move {
            let stdin = tokio::io::stdin();
            let reader = BufReader::new(stdin);
            let mut lines = reader.lines();

            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        if line.trim().is_empty() {
                            eprint!("> ");
                            continue;
                        }
                        let msg = Activity::message(CHANNEL, conversation_id.as_str(), USER, line)
                            .with_recipient(bot.clone());
                        if tx.send(msg).is_err() {
                            break;
                        }
                    }
                    Ok(None) => break, // EOF
                    Err(e) => {
                        tracing::error!("Error reading stdin: {}", e);
                        break;
                    }
                }
            }
        });

        let stream = stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|msg| (msg, rx))
        });

        Ok(Box::pin(stream))
    }

    async fn respond(
        &self,
        _activity: &Activity,
        responses: &[OutgoingResponse],
    ) -> Result<(), ChannelError> {
        for response in responses {
            println!("{}", render(response));
        }
        eprint!("> ");
        Ok(())
    }
}

/// Reply text followed by its quick replies, if any.
fn render(response: &OutgoingResponse) -> String {
    if response.suggested_actions.is_empty() {
        return response.text.clone();
    }
    let actions: Vec<String> = response
        .suggested_actions
        .iter()
        .map(|a| format!("[{a}]"))
        .collect();
    format!("{}\n  {}", response.text, actions.join(" "))
}
