//! Greeting flow. Replays the stored profile.

use async_trait::async_trait;

use super::profile::UserProfile;
use crate::dialogs::{Flow, StepInput, StepOutcome};
use crate::error::{DialogError, Error};
use crate::state::properties::USER_PROFILE;
use crate::turn::TurnContext;

/// Flow id.
pub const HELLO_USER: &str = "hello_user";

pub struct GreetingFlow;

#[async_trait]
impl Flow for GreetingFlow {
    fn id(&self) -> &'static str {
        HELLO_USER
    }

    fn step_count(&self) -> usize {
        1
    }

    async fn run_step(
        &self,
        step: usize,
        _input: StepInput,
        turn: &mut TurnContext,
    ) -> Result<StepOutcome, Error> {
        if step != 0 {
            return Err(DialogError::StepOutOfRange {
                flow: HELLO_USER.to_string(),
                step,
            }
            .into());
        }
        let profile: UserProfile = turn.user_state.get_or_default(USER_PROFILE).await?;
        turn.send_text(profile.describe());
        Ok(StepOutcome::End)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::activity::Activity;
    use crate::state::BotState;
    use crate::store::{MemoryStore, StateStore};

    #[tokio::test]
    async fn renders_profile_and_ends() {
        let store: Arc<dyn StateStore> = Arc::new(MemoryStore::new());
        store
            .write(
                "user",
                &serde_json::json!({ "user_profile": { "name": "Grace", "age": 34 } }),
            )
            .await
            .unwrap();

        let mut turn = TurnContext::new(
            Activity::message("test", "conv", "user", "hi"),
            BotState::new(Arc::clone(&store), "user"),
            BotState::new(Arc::clone(&store), "conv"),
        );

        let outcome = GreetingFlow
            .run_step(0, StepInput::Begin, &mut turn)
            .await
            .unwrap();
        assert_eq!(outcome, StepOutcome::End);
        assert_eq!(
            turn.responses()[0].text,
            "Your name is Grace and you are 34 years old."
        );
        assert!(!turn.user_state.is_dirty());
    }
}
