//! Prompts — suspend points that ask a question and recognize the reply.
//!
//! A prompt is registered once under a stable id with its `PromptKind`
//! (which may carry a validator callback). Each use supplies `PromptOptions`,
//! which are persisted with the dialog position while the prompt is pending.

use std::fmt;
use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::activity::OutgoingResponse;

static NUMBER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-?\d+(?:\.\d+)?").expect("number pattern is a valid regex"));

/// Per-use prompt text and choices.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptOptions {
    pub prompt: String,
    /// Sent instead of `prompt` when a reply is not recognized.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_prompt: Option<String>,
    /// Allowed values for choice prompts.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<String>,
}

impl PromptOptions {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Default::default()
        }
    }

    pub fn with_retry_prompt(mut self, retry_prompt: impl Into<String>) -> Self {
        self.retry_prompt = Some(retry_prompt.into());
        self
    }

    pub fn with_choices<I, S>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.choices = choices.into_iter().map(Into::into).collect();
        self
    }
}

/// Outcome of a validator callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation {
    Accepted,
    /// Keep the prompt pending. `message` replaces the retry prompt.
    Rejected { message: Option<String> },
}

impl Validation {
    pub fn reject(message: impl Into<String>) -> Self {
        Self::Rejected {
            message: Some(message.into()),
        }
    }
}

/// Validator run on every recognized number before the prompt completes.
pub type NumberValidator = Arc<dyn Fn(i64) -> Validation + Send + Sync>;

/// The three prompt behaviours.
#[derive(Clone)]
pub enum PromptKind {
    /// Any non-blank reply.
    Text,
    /// One of `PromptOptions::choices`, by value or 1-based position.
    Choice,
    /// The first whole number in the reply, checked by an optional validator.
    Number { validator: Option<NumberValidator> },
}

impl fmt::Debug for PromptKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => write!(f, "Text"),
            Self::Choice => write!(f, "Choice"),
            Self::Number { validator } => f
                .debug_struct("Number")
                .field("validated", &validator.is_some())
                .finish(),
        }
    }
}

/// Value a prompt completes with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptResult {
    Text(String),
    Choice { value: String, index: usize },
    Number(i64),
}

/// What a prompt made of one reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recognition {
    Recognized(PromptResult),
    NotRecognized,
    Rejected { message: Option<String> },
}

impl PromptKind {
    pub fn number_with_validator<F>(validator: F) -> Self
    where
        F: Fn(i64) -> Validation + Send + Sync + 'static,
    {
        Self::Number {
            validator: Some(Arc::new(validator)),
        }
    }

    /// Build the message that asks (or re-asks) the question.
    pub fn render(&self, options: &PromptOptions, is_retry: bool) -> OutgoingResponse {
        let text = match (&options.retry_prompt, is_retry) {
            (Some(retry), true) => retry.clone(),
            _ => options.prompt.clone(),
        };
        match self {
            Self::Choice => {
                OutgoingResponse::text(text).with_suggested_actions(options.choices.clone())
            }
            Self::Text | Self::Number { .. } => OutgoingResponse::text(text),
        }
    }

    /// Try to complete the prompt with `reply`.
    pub fn recognize(&self, options: &PromptOptions, reply: &str) -> Recognition {
        match self {
            Self::Text => {
                let trimmed = reply.trim();
                if trimmed.is_empty() {
                    Recognition::NotRecognized
                } else {
                    Recognition::Recognized(PromptResult::Text(trimmed.to_string()))
                }
            }
            Self::Choice => match recognize_choice(&options.choices, reply) {
                Some((value, index)) => {
                    Recognition::Recognized(PromptResult::Choice { value, index })
                }
                None => Recognition::NotRecognized,
            },
            Self::Number { validator } => {
                let Some(value) = recognize_number(reply) else {
                    return Recognition::NotRecognized;
                };
                match validator.as_ref().map(|v| v(value)) {
                    None | Some(Validation::Accepted) => {
                        Recognition::Recognized(PromptResult::Number(value))
                    }
                    Some(Validation::Rejected { message }) => Recognition::Rejected { message },
                }
            }
        }
    }
}

/// Match `reply` against `choices` by case-insensitive value, then by ordinal.
fn recognize_choice(choices: &[String], reply: &str) -> Option<(String, usize)> {
    let normalized = reply.trim().to_lowercase();
    if let Some(index) = choices.iter().position(|c| c.to_lowercase() == normalized) {
        return Some((choices[index].clone(), index));
    }
    let ordinal: usize = normalized.parse().ok()?;
    let index = ordinal.checked_sub(1)?;
    choices.get(index).map(|c| (c.clone(), index))
}

/// First signed whole number appearing in `reply`.
///
/// Positive fractions are not recognized. Negative fractions are rounded
/// away from zero so a validator still sees a value below zero.
fn recognize_number(reply: &str) -> Option<i64> {
    let matched = NUMBER_PATTERN.find(reply)?.as_str();
    match matched.split_once('.') {
        None => matched.parse().ok(),
        Some((whole, _)) if whole.starts_with('-') => whole.parse::<i64>().ok()?.checked_sub(1),
        Some(_) => None,
    }
}
