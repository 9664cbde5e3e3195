//! Merges channel streams and routes replies back to their channel.

use futures::stream;

use super::channel::{Channel, MessageStream};
use crate::activity::{Activity, OutgoingResponse};
use crate::error::ChannelError;

#[derive(Default)]
pub struct ChannelManager {
    channels: Vec<Box<dyn Channel>>,
}

impl ChannelManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, channel: Box<dyn Channel>) {
        self.channels.push(channel);
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.channels.iter().map(|c| c.name()).collect()
    }

    /// Start every channel and merge their activities into one stream.
    pub async fn start_all(&self) -> Result<MessageStream, ChannelError> {
        let mut streams = Vec::with_capacity(self.channels.len());
        for channel in &self.channels {
            streams.push(channel.start().await?);
            tracing::info!(channel = channel.name(), "Channel started");
        }
        Ok(Box::pin(stream::select_all(streams)))
    }

    /// Send `responses` on the channel `activity` came from.
    pub async fn respond(
        &self,
        activity: &Activity,
        responses: &[OutgoingResponse],
    ) -> Result<(), ChannelError> {
        let channel = self
            .channels
            .iter()
            .find(|c| c.name() == activity.channel_id)
            .ok_or_else(|| ChannelError::SendFailed {
                name: activity.channel_id.clone(),
                reason: "no such channel".to_string(),
            })?;
        channel.respond(activity, responses).await
    }

    pub async fn shutdown_all(&self) -> Result<(), ChannelError> {
        for channel in &self.channels {
            channel.shutdown().await?;
        }
        Ok(())
    }
}
