//! User profile model.

use serde::{Deserialize, Serialize};

/// What the bot knows about a user.
///
/// Stored in user state under `properties::USER_PROFILE`. `age` is only ever
/// written after `name`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u64>,
}

impl UserProfile {
    /// Sentence describing the stored profile.
    pub fn describe(&self) -> String {
        let name = self.name.as_deref().unwrap_or_default();
        match self.age {
            Some(age) => format!("Your name is {name} and you are {age} years old."),
            None => format!("Your name is {name} and you did not share your age."),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describe_with_age() {
        let profile = UserProfile {
            name: Some("Grace".to_string()),
            age: Some(34),
        };
        assert_eq!(profile.describe(), "Your name is Grace and you are 34 years old.");
    }

    #[test]
    fn describe_without_age() {
        let profile = UserProfile {
            name: Some("Ada".to_string()),
            age: None,
        };
        assert_eq!(
            profile.describe(),
            "Your name is Ada and you did not share your age."
        );
    }

    #[test]
    fn empty_profile_serializes_to_empty_object() {
        assert_eq!(
            serde_json::to_value(UserProfile::default()).unwrap(),
            serde_json::json!({})
        );
        let parsed: UserProfile = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(parsed, UserProfile::default());
    }
}
