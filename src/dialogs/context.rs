//! Dialog set and per-turn dialog context.
//!
//! `DialogSet` holds the registered flows and prompts. `DialogContext` loads
//! the conversation's `DialogStack` at the start of a turn, runs steps until
//! a prompt suspends the flow or the flow ends, and writes the stack back.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use super::flow::{Flow, StepInput, StepOutcome};
use super::prompt::{PromptKind, Recognition};
use super::stack::{DialogInstance, DialogStack, PendingPrompt};
use crate::error::{DatabaseError, DialogError, Error};
use crate::state::properties::DIALOG_STATE;
use crate::turn::TurnContext;

/// Status of the dialog stack after `continue_dialog`/`begin_dialog`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogTurnStatus {
    /// No flow was active.
    Empty,
    /// A prompt is pending.
    Waiting,
    /// The flow ended this turn.
    Complete,
    /// The stack was cleared.
    Cancelled,
}

/// Registry of flows and prompts.
#[derive(Default)]
pub struct DialogSet {
    flows: HashMap<&'static str, Arc<dyn Flow>>,
    prompts: HashMap<&'static str, PromptKind>,
}

impl DialogSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a flow under its own id.
    pub fn with_flow(mut self, flow: Arc<dyn Flow>) -> Self {
        self.flows.insert(flow.id(), flow);
        self
    }

    /// Register a prompt under `id`.
    pub fn with_prompt(mut self, id: &'static str, kind: PromptKind) -> Self {
        self.prompts.insert(id, kind);
        self
    }

    fn flow(&self, id: &str) -> Result<&Arc<dyn Flow>, DialogError> {
        self.flows
            .get(id)
            .ok_or_else(|| DialogError::UnknownFlow(id.to_string()))
    }

    fn prompt(&self, id: &str) -> Result<&PromptKind, DialogError> {
        self.prompts
            .get(id)
            .ok_or_else(|| DialogError::UnknownPrompt(id.to_string()))
    }

    /// Restore the conversation's dialog position for this turn.
    pub async fn create_context(
        &self,
        turn: &mut TurnContext,
    ) -> Result<DialogContext<'_>, DatabaseError> {
        let stack: DialogStack = turn.conversation_state.get_or_default(DIALOG_STATE).await?;
        Ok(DialogContext {
            dialogs: self,
            loaded: stack.clone(),
            stack,
        })
    }
}

/// One turn's view of the dialog stack.
pub struct DialogContext<'a> {
    dialogs: &'a DialogSet,
    loaded: DialogStack,
    stack: DialogStack,
}

impl DialogContext<'_> {
    /// The flow currently on top of the stack.
    pub fn active_dialog(&self) -> Option<&DialogInstance> {
        self.stack.active()
    }

    /// Resume the active flow with this turn's activity.
    pub async fn continue_dialog(&mut self, turn: &mut TurnContext) -> Result<DialogTurnStatus, Error> {
        let Some(active) = self.stack.active() else {
            return Ok(DialogTurnStatus::Empty);
        };
        let Some(pending) = active.pending.clone() else {
            return self.run_steps(turn, StepInput::Begin).await;
        };

        let dialogs = self.dialogs;
        let kind = dialogs.prompt(&pending.prompt_id)?;
        match kind.recognize(&pending.options, turn.activity().text()) {
            Recognition::Recognized(result) => {
                if let Some(active) = self.stack.active_mut() {
                    active.pending = None;
                }
                self.run_steps(turn, result.into()).await
            }
            Recognition::NotRecognized => {
                debug!(prompt = %pending.prompt_id, "Reply not recognized, re-prompting");
                turn.send(kind.render(&pending.options, true));
                Ok(DialogTurnStatus::Waiting)
            }
            Recognition::Rejected { message } => {
                debug!(prompt = %pending.prompt_id, "Reply rejected by validator");
                match message {
                    Some(message) => turn.send_text(message),
                    None => turn.send(kind.render(&pending.options, true)),
                }
                Ok(DialogTurnStatus::Waiting)
            }
        }
    }

    /// Push flow `id` and run it until it prompts or ends.
    pub async fn begin_dialog(
        &mut self,
        id: &str,
        turn: &mut TurnContext,
    ) -> Result<DialogTurnStatus, Error> {
        if let Some(active) = self.stack.active() {
            return Err(DialogError::AlreadyActive {
                requested: id.to_string(),
                active: active.id.clone(),
            }
            .into());
        }
        let dialogs = self.dialogs;
        let flow = dialogs.flow(id)?;
        debug!(flow = flow.id(), "Beginning flow");
        self.stack.push(DialogInstance::new(flow.id()));
        self.run_steps(turn, StepInput::Begin).await
    }

    /// Pop the active flow.
    pub fn end_dialog(&mut self) -> Option<DialogInstance> {
        let ended = self.stack.pop();
        if let Some(instance) = &ended {
            debug!(flow = %instance.id, "Flow ended");
        }
        ended
    }

    /// Clear the whole stack.
    pub fn cancel_all_dialogs(&mut self) -> DialogTurnStatus {
        if self.stack.is_empty() {
            return DialogTurnStatus::Empty;
        }
        debug!(depth = self.stack.stack.len(), "Cancelling all flows");
        self.stack.clear();
        DialogTurnStatus::Cancelled
    }

    /// Write the stack back into conversation state if it changed.
    ///
    /// An empty stack removes the property instead of storing `[]`.
    pub async fn save(&mut self, turn: &mut TurnContext) -> Result<(), DatabaseError> {
        if self.stack == self.loaded {
            return Ok(());
        }
        if self.stack.is_empty() {
            turn.conversation_state.delete(DIALOG_STATE).await?;
        } else {
            turn.conversation_state
                .set(DIALOG_STATE, &self.stack)
                .await?;
        }
        self.loaded = self.stack.clone();
        Ok(())
    }

    async fn run_steps(
        &mut self,
        turn: &mut TurnContext,
        mut input: StepInput,
    ) -> Result<DialogTurnStatus, Error> {
        let dialogs = self.dialogs;
        loop {
            let Some(active) = self.stack.active() else {
                return Ok(DialogTurnStatus::Complete);
            };
            let flow = dialogs.flow(&active.id)?;
            let step = active.step;
            if step >= flow.step_count() {
                self.end_dialog();
                return Ok(DialogTurnStatus::Complete);
            }

            debug!(flow = flow.id(), step, "Running step");
            match flow.run_step(step, input, turn).await? {
                StepOutcome::Prompt { prompt_id, options } => {
                    let kind = dialogs.prompt(&prompt_id)?;
                    turn.send(kind.render(&options, false));
                    if let Some(active) = self.stack.active_mut() {
                        active.step = step + 1;
                        active.pending = Some(PendingPrompt { prompt_id, options });
                    }
                    return Ok(DialogTurnStatus::Waiting);
                }
                StepOutcome::Next(next) => {
                    if let Some(active) = self.stack.active_mut() {
                        active.step = step + 1;
                    }
                    input = next;
                }
                StepOutcome::End => {
                    self.end_dialog();
                    return Ok(DialogTurnStatus::Complete);
                }
            }
        }
    }
}
