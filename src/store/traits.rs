//! `StateStore` trait — single async interface for bot state persistence.

use async_trait::async_trait;

use crate::error::DatabaseError;

/// Backend-agnostic key/value store for scoped bot state records.
///
/// Each record is a JSON object holding every property of one scope
/// (one user, or one conversation). Callers read the whole record, modify it
/// and write the whole record back.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Read the record stored under `key`, if any.
    async fn read(&self, key: &str) -> Result<Option<serde_json::Value>, DatabaseError>;

    /// Insert or replace the record stored under `key`.
    async fn write(&self, key: &str, value: &serde_json::Value) -> Result<(), DatabaseError>;

    /// Remove the record under `key`. Returns whether anything was deleted.
    async fn delete(&self, key: &str) -> Result<bool, DatabaseError>;
}
