//! Scoped bot state: a per-turn cache over one `StateStore` record.
//!
//! A `BotState` binds one scope (a user, or a conversation) for the duration
//! of a turn. The record is read lazily on first access, mutated in memory by
//! `set`/`delete`, and written back as a whole by `save_changes()`.

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::activity::Activity;
use crate::error::DatabaseError;
use crate::store::StateStore;

/// Which identity a state record is keyed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateScope {
    /// One record per user per channel.
    User,
    /// One record per conversation per channel.
    Conversation,
}

impl StateScope {
    /// Storage key for the record this scope selects from `activity`.
    pub fn storage_key(&self, activity: &Activity) -> String {
        match self {
            Self::User => self.key(&activity.channel_id, &activity.from.id),
            Self::Conversation => self.key(&activity.channel_id, &activity.conversation.id),
        }
    }

    /// Storage key for user or conversation `id` on `channel_id`.
    pub fn key(&self, channel_id: &str, id: &str) -> String {
        let collection = match self {
            Self::User => "users",
            Self::Conversation => "conversations",
        };
        format!("{channel_id}/{collection}/{id}")
    }
}

/// Property names used inside state records.
pub mod properties {
    /// `UserProfile` in user scope.
    pub const USER_PROFILE: &str = "user_profile";
    /// `DialogStack` in conversation scope.
    pub const DIALOG_STATE: &str = "dialog_state";
}

/// Cached view of one scoped record.
pub struct BotState {
    store: Arc<dyn StateStore>,
    key: String,
    record: Option<Map<String, Value>>,
    dirty: bool,
}

impl BotState {
    /// Bind `scope` for the identity carried by `activity`.
    pub fn for_activity(store: Arc<dyn StateStore>, scope: StateScope, activity: &Activity) -> Self {
        Self::new(store, scope.storage_key(activity))
    }

    pub fn new(store: Arc<dyn StateStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
            record: None,
            dirty: false,
        }
    }

    /// Whether unsaved changes are pending.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    async fn load(&mut self) -> Result<&mut Map<String, Value>, DatabaseError> {
        if self.record.is_none() {
            let record = match self.store.read(&self.key).await? {
                Some(Value::Object(map)) => map,
                Some(Value::Null) | None => Map::new(),
                Some(other) => {
                    return Err(DatabaseError::Serialization(format!(
                        "state record {} is not an object: {other}",
                        self.key
                    )));
                }
            };
            self.record = Some(record);
        }
        Ok(self.record.get_or_insert_with(Map::new))
    }

    /// Read `property`, falling back to `default` when it is absent.
    pub async fn get<T: DeserializeOwned>(
        &mut self,
        property: &str,
        default: T,
    ) -> Result<T, DatabaseError> {
        let key = self.key.clone();
        let record = self.load().await?;
        match record.get(property) {
            Some(value) => serde_json::from_value(value.clone()).map_err(|e| {
                DatabaseError::Serialization(format!("{key}.{property}: {e}"))
            }),
            None => Ok(default),
        }
    }

    /// Read `property`, falling back to `T::default()`.
    pub async fn get_or_default<T: DeserializeOwned + Default>(
        &mut self,
        property: &str,
    ) -> Result<T, DatabaseError> {
        self.get(property, T::default()).await
    }

    /// Replace `property` in the cached record.
    pub async fn set<T: Serialize>(&mut self, property: &str, value: &T) -> Result<(), DatabaseError> {
        let value =
            serde_json::to_value(value).map_err(|e| DatabaseError::Serialization(e.to_string()))?;
        let record = self.load().await?;
        record.insert(property.to_string(), value);
        self.dirty = true;
        Ok(())
    }

    /// Remove `property` from the cached record.
    pub async fn delete(&mut self, property: &str) -> Result<(), DatabaseError> {
        let record = self.load().await?;
        if record.remove(property).is_some() {
            self.dirty = true;
        }
        Ok(())
    }

    /// Write the cached record back to the store if it changed.
    ///
    /// A record left without properties is deleted from the store.
    pub async fn save_changes(&mut self) -> Result<(), DatabaseError> {
        if !self.dirty {
            return Ok(());
        }
        match &self.record {
            Some(record) if record.is_empty() => {
                self.store.delete(&self.key).await?;
                tracing::debug!(key = %self.key, "State cleared");
            }
            Some(record) => {
                self.store
                    .write(&self.key, &Value::Object(record.clone()))
                    .await?;
                tracing::debug!(key = %self.key, "State saved");
            }
            None => {}
        }
        self.dirty = false;
        Ok(())
    }
}
