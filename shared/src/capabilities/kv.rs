use crux_kv::KeyValue;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::marker::PhantomData;
use thiserror::Error;

use crate::event::Event;

pub type KvCapability = KeyValue<Event>;

pub const MAX_KEY_LENGTH: usize = 512;
pub const MAX_VALUE_SIZE: usize = 64 * 1024;

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum StorageError {
    #[error("invalid key '{key}': {reason}")]
    InvalidKey { key: String, reason: String },

    #[error("value too large: {size} bytes exceeds maximum of {max} bytes")]
    ValueTooLarge { size: usize, max: usize },

    #[error("serialization error: {message}")]
    Serialization { message: String },

    #[error("storage backend error: {message}")]
    Backend { message: String },
}

/// A key the shell's key-value store will accept.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KvKey(String);

impl KvKey {
    pub fn new(key: impl Into<String>) -> Result<Self, StorageError> {
        let key = key.into();
        Self::validate(&key)?;
        Ok(Self(key))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(key: &str) -> Result<(), StorageError> {
        let invalid = |reason: &str| StorageError::InvalidKey {
            key: key.chars().take(50).collect(),
            reason: reason.to_string(),
        };

        if key.trim().is_empty() {
            return Err(invalid("key cannot be empty"));
        }
        if key.len() > MAX_KEY_LENGTH {
            return Err(invalid("key is too long"));
        }
        if key.chars().any(char::is_control) {
            return Err(invalid("key contains control characters"));
        }
        if key.contains("..") || key.starts_with('/') || key.starts_with('\\') {
            return Err(invalid("key looks like a path"));
        }

        Ok(())
    }
}

/// One JSON-encoded value stored under a fixed key.
#[derive(Debug, Clone)]
pub struct StoredSetting<T> {
    key: KvKey,
    _marker: PhantomData<T>,
}

impl<T> StoredSetting<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(key: impl Into<String>) -> Result<Self, StorageError> {
        Ok(Self {
            key: KvKey::new(key)?,
            _marker: PhantomData,
        })
    }

    pub fn encode(&self, value: &T) -> Result<Vec<u8>, StorageError> {
        let bytes = serde_json::to_vec(value).map_err(|e| StorageError::Serialization {
            message: e.to_string(),
        })?;
        if bytes.len() > MAX_VALUE_SIZE {
            return Err(StorageError::ValueTooLarge {
                size: bytes.len(),
                max: MAX_VALUE_SIZE,
            });
        }
        Ok(bytes)
    }

    /// An absent value is `Ok(None)`.
    pub fn decode(&self, bytes: Option<&[u8]>) -> Result<Option<T>, StorageError> {
        bytes
            .map(|bytes| {
                serde_json::from_slice(bytes).map_err(|e| StorageError::Serialization {
                    message: e.to_string(),
                })
            })
            .transpose()
    }

    /// Asks the shell for the stored bytes.
    pub fn load<F>(&self, kv: &KvCapability, make_event: F)
    where
        F: FnOnce(Result<Option<Vec<u8>>, StorageError>) -> Event + Send + Sync + 'static,
    {
        kv.get(self.key.as_str().to_string(), move |result| {
            make_event(result.map_err(|e| StorageError::Backend {
                message: e.to_string(),
            }))
        });
    }

    pub fn store<F>(&self, kv: &KvCapability, value: &T, make_event: F) -> Result<(), StorageError>
    where
        F: FnOnce(Result<(), StorageError>) -> Event + Send + Sync + 'static,
    {
        let bytes = self.encode(value)?;
        kv.set(self.key.as_str().to_string(), bytes, move |result| {
            make_event(result.map(|_| ()).map_err(|e| StorageError::Backend {
                message: e.to_string(),
            }))
        });
        Ok(())
    }
}
