//! Persisted dialog position — which flow is active and at which step.

use serde::{Deserialize, Serialize};

use super::prompt::PromptOptions;

/// A prompt waiting for the user's reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingPrompt {
    pub prompt_id: String,
    pub options: PromptOptions,
}

/// One running flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogInstance {
    /// Flow id.
    pub id: String,
    /// Index of the next step to run.
    pub step: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending: Option<PendingPrompt>,
}

impl DialogInstance {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            step: 0,
            pending: None,
        }
    }
}

/// Per-conversation dialog stack, stored in conversation state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogStack {
    #[serde(default)]
    pub stack: Vec<DialogInstance>,
}

impl DialogStack {
    pub fn active(&self) -> Option<&DialogInstance> {
        self.stack.last()
    }

    pub fn active_mut(&mut self) -> Option<&mut DialogInstance> {
        self.stack.last_mut()
    }

    pub fn push(&mut self, instance: DialogInstance) {
        self.stack.push(instance);
    }

    pub fn pop(&mut self) -> Option<DialogInstance> {
        self.stack.pop()
    }

    pub fn clear(&mut self) {
        self.stack.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn active_is_top_of_stack() {
        let mut stack = DialogStack::default();
        assert!(stack.active().is_none());

        stack.push(DialogInstance::new("who_are_you"));
        assert_eq!(stack.active().unwrap().id, "who_are_you");

        stack.active_mut().unwrap().step = 2;
        assert_eq!(stack.pop().unwrap().step, 2);
        assert!(stack.is_empty());
    }

    #[test]
    fn serde_preserves_pending_prompt() {
        let mut instance = DialogInstance::new("who_are_you");
        instance.step = 1;
        instance.pending = Some(PendingPrompt {
            prompt_id: "text_prompt".to_string(),
            options: PromptOptions::new("What is your name, human?"),
        });
        let stack = DialogStack {
            stack: vec![instance],
        };

        let json = serde_json::to_value(&stack).unwrap();
        assert_eq!(json["stack"][0]["pending"]["prompt_id"], "text_prompt");

        let parsed: DialogStack = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, stack);
    }

    #[test]
    fn empty_object_deserializes_to_empty_stack() {
        let parsed: DialogStack = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(parsed.is_empty());
    }
}
