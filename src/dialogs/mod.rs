//! Dialogs — multi-turn flows whose position survives between turns.
//!
//! A flow's position (flow id, next step, pending prompt) lives in
//! conversation state as a `DialogStack`. Nothing is held in memory across
//! turns: each turn restores the stack, resumes the pending prompt with the
//! new reply, and runs steps until the next prompt or the end of the flow.

pub mod context;
pub mod flow;
pub mod prompt;
pub mod stack;

pub use context::{DialogContext, DialogSet, DialogTurnStatus};
pub use flow::{Flow, StepInput, StepOutcome};
pub use prompt::{PromptKind, PromptOptions, PromptResult, Recognition, Validation};
pub use stack::{DialogInstance, DialogStack, PendingPrompt};
