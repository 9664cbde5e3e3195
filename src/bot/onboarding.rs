//! Onboarding flow — collects the user's name and, optionally, their age.
//!
//! Steps run in order: AskName → ConfirmAgeChoice → AskAgeOrSkip → CaptureAge.
//! Each step that touches the profile reads the whole record from user state,
//! changes one field and writes the whole record back.

use async_trait::async_trait;

use super::profile::UserProfile;
use super::{CHOICE_PROMPT, NUMBER_PROMPT, TEXT_PROMPT};
use crate::dialogs::flow::unexpected_input;
use crate::dialogs::{Flow, PromptOptions, StepInput, StepOutcome, Validation};
use crate::error::{DialogError, Error};
use crate::state::properties::USER_PROFILE;
use crate::turn::TurnContext;

/// Flow id.
pub const WHO_ARE_YOU: &str = "who_are_you";

pub const ASK_NAME: &str = "What is your name, human?";
pub const ASK_AGE_CHOICE: &str = "Do you want to give your age?";
pub const ASK_AGE: &str = "What is your age?";
pub const AGE_RETRY: &str = "Sorry, please specify your age as a positive number or say cancel.";
pub const AGE_BELOW_ZERO: &str = "Your age can't be less than zero.";
pub const NO_AGE_GIVEN: &str = "No age given.";

/// Choice value that leads to the age prompt. Matched exactly.
const YES: &str = "yes";
const NO: &str = "no";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OnboardingStep {
    AskName,
    ConfirmAgeChoice,
    AskAgeOrSkip,
    CaptureAge,
}

impl OnboardingStep {
    const ALL: [OnboardingStep; 4] = [
        Self::AskName,
        Self::ConfirmAgeChoice,
        Self::AskAgeOrSkip,
        Self::CaptureAge,
    ];

    fn from_index(step: usize) -> Option<Self> {
        Self::ALL.get(step).copied()
    }
}

/// Validator for the age prompt.
pub fn validate_age(value: i64) -> Validation {
    if value < 0 {
        Validation::reject(AGE_BELOW_ZERO)
    } else {
        Validation::Accepted
    }
}

pub struct OnboardingFlow;

#[async_trait]
impl Flow for OnboardingFlow {
    fn id(&self) -> &'static str {
        WHO_ARE_YOU
    }

    fn step_count(&self) -> usize {
        OnboardingStep::ALL.len()
    }

    async fn run_step(
        &self,
        step: usize,
        input: StepInput,
        turn: &mut TurnContext,
    ) -> Result<StepOutcome, Error> {
        let Some(current) = OnboardingStep::from_index(step) else {
            return Err(DialogError::StepOutOfRange {
                flow: WHO_ARE_YOU.to_string(),
                step,
            }
            .into());
        };

        match (current, input) {
            (OnboardingStep::AskName, _) => {
                Ok(StepOutcome::prompt(TEXT_PROMPT, PromptOptions::new(ASK_NAME)))
            }
            (OnboardingStep::ConfirmAgeChoice, StepInput::Text(name)) => {
                let mut profile: UserProfile = turn.user_state.get_or_default(USER_PROFILE).await?;
                profile.name = Some(name);
                turn.user_state.set(USER_PROFILE, &profile).await?;
                Ok(StepOutcome::prompt(
                    CHOICE_PROMPT,
                    PromptOptions::new(ASK_AGE_CHOICE).with_choices([YES, NO]),
                ))
            }
            (OnboardingStep::AskAgeOrSkip, StepInput::Choice { value, .. }) => {
                if value == YES {
                    Ok(StepOutcome::prompt(
                        NUMBER_PROMPT,
                        PromptOptions::new(ASK_AGE).with_retry_prompt(AGE_RETRY),
                    ))
                } else {
                    Ok(StepOutcome::Next(StepInput::Skipped))
                }
            }
            (OnboardingStep::CaptureAge, StepInput::Number(value)) => {
                let age = u64::try_from(value).map_err(|_| DialogError::InvalidStepInput {
                    flow: WHO_ARE_YOU.to_string(),
                    step,
                    reason: format!("negative age {value} passed validation"),
                })?;
                let mut profile: UserProfile = turn.user_state.get_or_default(USER_PROFILE).await?;
                profile.age = Some(age);
                turn.user_state.set(USER_PROFILE, &profile).await?;
                turn.send_text(format!("I will remember that you are {age} years old."));
                Ok(StepOutcome::End)
            }
            (OnboardingStep::CaptureAge, StepInput::Skipped) => {
                turn.send_text(NO_AGE_GIVEN);
                Ok(StepOutcome::End)
            }
            (_, input) => Err(unexpected_input(WHO_ARE_YOU, step, &input)),
        }
    }
}
