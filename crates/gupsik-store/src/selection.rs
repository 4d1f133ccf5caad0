//! Persisted school selection.
//!
//! Stored under `selectedSchool` as `{"schoolCode": ..., "eduCode": ...}`,
//! the same shape the web viewer kept in local storage.

use gupsik_core::{LocaleIdentity, StorageError};
use serde::{Deserialize, Serialize};

use crate::kv::KeyValueStore;

pub const SELECTED_SCHOOL_KEY: &str = "selectedSchool";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedSchool {
    pub school_code: String,
    pub edu_code: String,
    /// Display only; older entries don't have it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub school_name: Option<String>,
}

impl SelectedSchool {
    pub fn new(locale: LocaleIdentity, school_name: Option<String>) -> Self {
        Self {
            school_code: locale.school_code,
            edu_code: locale.edu_code,
            school_name,
        }
    }

    pub fn locale(&self) -> LocaleIdentity {
        LocaleIdentity::new(&self.edu_code, &self.school_code)
    }
}

/// Reads and writes the selected school through any [`KeyValueStore`].
pub struct SelectionStore<S> {
    store: S,
}

impl<S: KeyValueStore> SelectionStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn select(&self, school: &SelectedSchool) -> Result<(), StorageError> {
        let json =
            serde_json::to_string(school).map_err(|e| StorageError::Serialize(e.to_string()))?;
        self.store.set(SELECTED_SCHOOL_KEY, &json)?;
        tracing::info!("Selected school {}", school.locale());
        Ok(())
    }

    pub fn current(&self) -> Result<Option<SelectedSchool>, StorageError> {
        match self.store.get(SELECTED_SCHOOL_KEY)? {
            None => Ok(None),
            Some(json) => serde_json::from_str(&json)
                .map(Some)
                .map_err(|e| StorageError::Corrupt(format!("{}: {}", SELECTED_SCHOOL_KEY, e))),
        }
    }

    pub fn clear(&self) -> Result<(), StorageError> {
        self.store.remove(SELECTED_SCHOOL_KEY)
    }

    /// The persisted selection if there is a readable one, otherwise `defaults`.
    ///
    /// An unreadable or corrupt entry is logged and ignored.
    pub fn resolve_locale(&self, defaults: LocaleIdentity) -> LocaleIdentity {
        match self.current() {
            Ok(Some(school)) => school.locale(),
            Ok(None) => defaults,
            Err(e) => {
                tracing::warn!("Ignoring saved school selection: {}", e);
                defaults
            }
        }
    }

    pub fn into_inner(self) -> S {
        self.store
    }
}
