//! `Channel` trait — a streaming source of activities with a reply path.

use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;

use crate::activity::{Activity, OutgoingResponse};
use crate::error::ChannelError;

/// Stream of inbound activities from one or more channels.
pub type MessageStream = Pin<Box<dyn Stream<Item = Activity> + Send>>;

#[async_trait]
pub trait Channel: Send + Sync {
    /// Channel id; matches `Activity::channel_id` of everything it emits.
    fn name(&self) -> &str;

    /// Start receiving activities.
    async fn start(&self) -> Result<MessageStream, ChannelError>;

    /// Deliver the replies produced for `activity`, in order.
    async fn respond(
        &self,
        activity: &Activity,
        responses: &[OutgoingResponse],
    ) -> Result<(), ChannelError>;

    async fn shutdown(&self) -> Result<(), ChannelError> {
        Ok(())
    }
}
