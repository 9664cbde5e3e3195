//! The profile bot — onboarding and greeting flows plus the turn controller.
//!
//! A new user is walked through onboarding (name, then optionally age).
//! Once a name is stored, every later message replays the profile instead.

pub mod controller;
pub mod greeting;
pub mod onboarding;
pub mod profile;

use std::sync::Arc;

use crate::dialogs::{DialogSet, PromptKind};

pub use controller::ProfileBot;
pub use greeting::{GreetingFlow, HELLO_USER};
pub use onboarding::{OnboardingFlow, WHO_ARE_YOU};
pub use profile::UserProfile;

/// Prompt ids registered in the bot's dialog set.
pub const TEXT_PROMPT: &str = "text_prompt";
pub const CHOICE_PROMPT: &str = "choice_prompt";
pub const NUMBER_PROMPT: &str = "number_prompt";

/// Register both flows and the three prompts they use.
pub fn dialog_set() -> DialogSet {
    DialogSet::new()
        .with_prompt(TEXT_PROMPT, PromptKind::Text)
        .with_prompt(CHOICE_PROMPT, PromptKind::Choice)
        .with_prompt(
            NUMBER_PROMPT,
            PromptKind::number_with_validator(onboarding::validate_age),
        )
        .with_flow(Arc::new(OnboardingFlow))
        .with_flow(Arc::new(GreetingFlow))
}
