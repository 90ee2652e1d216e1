//! Persistence adapter: settings groups to and from string storage.
//!
//! Reads never fail. A group whose key is absent, unreadable or holds a value
//! that does not decode comes back as its hard-coded default, wrapped in
//! [`Defaulted`] so callers can still tell *why* the default was used.
//!
//! Per-field fallback happens here, at read time: the stored JSON is merged
//! onto the group default before decoding, so a record written before a field
//! existed picks up that field's default instead of failing. Writes store the
//! full record as compact JSON and overwrite unconditionally. There is no
//! version field and no migration step.

use std::fmt;
use std::sync::Arc;

use lendfront_storage::StorageBackend;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::StoreError;
use crate::group::{GroupKey, MergeStrategy};

/// Bounds shared by every settings group value.
pub trait SettingsValue:
    Serialize + DeserializeOwned + Clone + PartialEq + fmt::Debug + Send + Sync + 'static
{
}

impl<T> SettingsValue for T where
    T: Serialize + DeserializeOwned + Clone + PartialEq + fmt::Debug + Send + Sync + 'static
{
}

/// Why a load fell back to the group default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefaultReason {
    /// Nothing stored under the key.
    Absent,
    /// The stored string is not valid JSON or does not fit the group's shape.
    Corrupt(String),
    /// The storage backend failed to read the key.
    Unreadable(String),
}

impl fmt::Display for DefaultReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absent => f.write_str("absent"),
            Self::Corrupt(reason) => write!(f, "corrupt: {reason}"),
            Self::Unreadable(reason) => write!(f, "unreadable: {reason}"),
        }
    }
}

/// A group default returned in place of a stored value.
#[derive(Debug, Clone, PartialEq)]
pub struct Defaulted<T> {
    pub value: T,
    pub reason: DefaultReason,
}

/// Result of reading a group: the stored value, or the default and the reason.
pub type Decoded<T> = Result<T, Defaulted<T>>;

/// Collapse a [`Decoded`] into the effective value.
pub fn effective<T>(decoded: Decoded<T>) -> T {
    decoded.unwrap_or_else(|defaulted| defaulted.value)
}

/// Decode a raw stored string for `key`, applying per-field fallback.
///
/// # Errors
///
/// Returns [`Defaulted`] carrying the group default when `raw` is `None` or
/// does not decode.
pub fn decode<T: SettingsValue>(key: &GroupKey<T>, raw: Option<&str>) -> Decoded<T> {
    let Some(raw) = raw else {
        return Err(Defaulted {
            value: key.default_value(),
            reason: DefaultReason::Absent,
        });
    };

    decode_value(key, raw).map_err(|reason| Defaulted {
        value: key.default_value(),
        reason: DefaultReason::Corrupt(reason),
    })
}

fn decode_value<T: SettingsValue>(key: &GroupKey<T>, raw: &str) -> Result<T, String> {
    let stored: Value = serde_json::from_str(raw).map_err(|e| e.to_string())?;

    let effective = match key.merge() {
        MergeStrategy::Record => {
            if !stored.is_object() {
                return Err(format!("expected a JSON object, found {}", kind(&stored)));
            }
            let mut base = serde_json::to_value(key.default_value()).map_err(|e| e.to_string())?;
            merge_onto(&mut base, stored);
            base
        }
        MergeStrategy::List => {
            let Value::Array(items) = stored else {
                return Err(format!("expected a JSON array, found {}", kind(&stored)));
            };
            match key.element_template() {
                Some(template) => Value::Array(
                    items
                        .into_iter()
                        .map(|item| {
                            if !item.is_object() {
                                return item;
                            }
                            let mut base = template.clone();
                            merge_onto(&mut base, item);
                            base
                        })
                        .collect(),
                ),
                None => Value::Array(items),
            }
        }
    };

    serde_json::from_value(effective).map_err(|e| e.to_string())
}

/// Merge `overlay` onto `base`: objects merge key by key, `null` keeps the
/// base value, anything else replaces it.
pub fn merge_onto(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (_, Value::Null) => {}
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (field, value) in overlay_map {
                match base_map.get_mut(&field) {
                    Some(slot) => merge_onto(slot, value),
                    None if value.is_null() => {}
                    None => {
                        base_map.insert(field, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Serialize a full record for `key`.
///
/// # Errors
///
/// Returns [`StoreError::Encode`] if serialization fails.
pub fn encode<T: SettingsValue>(key: &GroupKey<T>, value: &T) -> Result<String, StoreError> {
    serde_json::to_string(value).map_err(|e| StoreError::Encode {
        key: key.storage_key().to_owned(),
        reason: e.to_string(),
    })
}

/// Loads and saves settings groups through an injected storage backend.
#[derive(Clone)]
pub struct PersistenceAdapter {
    storage: Arc<dyn StorageBackend>,
}

impl fmt::Debug for PersistenceAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PersistenceAdapter").finish_non_exhaustive()
    }
}

impl PersistenceAdapter {
    #[must_use]
    pub fn new(storage: Arc<dyn StorageBackend>) -> Self {
        Self { storage }
    }

    /// The underlying storage backend.
    #[must_use]
    pub fn storage(&self) -> &Arc<dyn StorageBackend> {
        &self.storage
    }

    /// Load a group. Falls back to the default on any failure; see [`decode`].
    ///
    /// # Errors
    ///
    /// Returns [`Defaulted`] (never a hard error) when the default was used.
    pub async fn load<T: SettingsValue>(&self, key: &GroupKey<T>) -> Decoded<T> {
        let storage_key = key.storage_key();
        let decoded = match self.storage.get(storage_key).await {
            Ok(raw) => decode(key, raw.as_deref()),
            Err(e) => Err(Defaulted {
                value: key.default_value(),
                reason: DefaultReason::Unreadable(e.to_string()),
            }),
        };

        if let Err(defaulted) = &decoded {
            match &defaulted.reason {
                DefaultReason::Absent => debug!(key = storage_key, "no stored settings, using default"),
                reason => warn!(key = storage_key, %reason, "stored settings unusable, using default"),
            }
        }
        decoded
    }

    /// Serialize `value` and write it under the group's key, overwriting.
    ///
    /// # Errors
    ///
    /// - [`StoreError::Encode`] if serialization fails.
    /// - [`StoreError::Storage`] if the backend rejects the write.
    pub async fn save<T: SettingsValue>(&self, key: &GroupKey<T>, value: &T) -> Result<(), StoreError> {
        let raw = encode(key, value)?;
        self.storage.put(key.storage_key(), &raw).await?;
        Ok(())
    }
}
