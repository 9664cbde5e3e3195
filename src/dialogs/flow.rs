//! `Flow` trait — a named, ordered sequence of steps resumable across turns.

use async_trait::async_trait;

use super::prompt::{PromptOptions, PromptResult};
use crate::error::{DialogError, Error};
use crate::turn::TurnContext;

/// Value handed to a step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepInput {
    /// First step of a freshly begun flow.
    Begin,
    Text(String),
    Choice { value: String, index: usize },
    Number(i64),
    /// The previous step chose not to ask anything.
    Skipped,
}

impl From<PromptResult> for StepInput {
    fn from(result: PromptResult) -> Self {
        match result {
            PromptResult::Text(text) => Self::Text(text),
            PromptResult::Choice { value, index } => Self::Choice { value, index },
            PromptResult::Number(n) => Self::Number(n),
        }
    }
}

/// What a step asks the dialog context to do next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// Ask the user; the next step receives the prompt's result on a later turn.
    Prompt {
        prompt_id: String,
        options: PromptOptions,
    },
    /// Run the next step now with the given input.
    Next(StepInput),
    /// Pop the flow.
    End,
}

impl StepOutcome {
    pub fn prompt(prompt_id: impl Into<String>, options: PromptOptions) -> Self {
        Self::Prompt {
            prompt_id: prompt_id.into(),
            options,
        }
    }
}

/// A multi-step conversation flow.
///
/// Steps must not keep state in memory between calls: anything that has to
/// survive to a later step goes through `TurnContext` state.
#[async_trait]
pub trait Flow: Send + Sync {
    /// Stable id used to begin the flow and to persist its position.
    fn id(&self) -> &'static str;

    /// Number of steps.
    fn step_count(&self) -> usize;

    /// Run step `step` with `input`.
    async fn run_step(
        &self,
        step: usize,
        input: StepInput,
        turn: &mut TurnContext,
    ) -> Result<StepOutcome, Error>;
}

/// Error for a step that received an input it cannot handle.
pub fn unexpected_input(flow: &str, step: usize, input: &StepInput) -> Error {
    DialogError::InvalidStepInput {
        flow: flow.to_string(),
        step,
        reason: format!("{input:?}"),
    }
    .into()
}
