// SPDX-License-Identifier: MPL-2.0
//! "Don't show this again" memory.
//!
//! Dismissals are stored as RFC 3339 timestamps in a [`KeyValueStore`].
//! Storage failures never hide feedback: a key that cannot be read counts
//! as not dismissed.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::id::ItemId;
use super::kind::FeedbackKind;
use super::manager::FeedbackManager;
use super::options::FeedbackOptions;
use crate::diagnostics::{report_warning, DiagnosticsHandle, WarningEvent, WarningType};
use crate::error::{Error, Result};
use crate::storage::KeyValueStore;

const DEFAULT_NAMESPACE: &str = "feedback-dismissed";

#[derive(Clone)]
pub struct DismissMemory {
    store: Arc<dyn KeyValueStore>,
    namespace: String,
    diagnostics: Option<DiagnosticsHandle>,
}

impl DismissMemory {
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            namespace: DEFAULT_NAMESPACE.to_string(),
            diagnostics: None,
        }
    }

    /// Prefixes every key with `namespace`.
    #[must_use]
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    #[must_use]
    pub fn with_diagnostics(mut self, handle: DiagnosticsHandle) -> Self {
        self.diagnostics = Some(handle);
        self
    }

    fn key(&self, key: &str) -> String {
        format!("{}:{}", self.namespace, key)
    }

    fn warn(&self, err: &Error) {
        report_warning(
            self.diagnostics.as_ref(),
            WarningEvent::new(WarningType::StorageUnavailable, err.to_string()),
        );
    }

    /// Returns false only when `key` is known to be dismissed.
    #[must_use]
    pub fn should_show(&self, key: &str) -> bool {
        match self.store.get_item(&self.key(key)) {
            Ok(stored) => stored.is_none(),
            Err(err) => {
                self.warn(&err);
                true
            }
        }
    }

    /// Records `key` as dismissed now. Returns false if the store failed.
    pub fn remember(&self, key: &str) -> bool {
        match self.store.set_item(&self.key(key), &Utc::now().to_rfc3339()) {
            Ok(()) => true,
            Err(err) => {
                self.warn(&err);
                false
            }
        }
    }

    /// Clears the dismissal of `key`. Returns false if the store failed.
    pub fn forget(&self, key: &str) -> bool {
        match self.store.remove_item(&self.key(key)) {
            Ok(()) => true,
            Err(err) => {
                self.warn(&err);
                false
            }
        }
    }

    /// When `key` was dismissed, if it was and the record is readable.
    #[must_use]
    pub fn dismissed_at(&self, key: &str) -> Option<DateTime<Utc>> {
        let stored = match self.store.get_item(&self.key(key)) {
            Ok(stored) => stored?,
            Err(err) => {
                self.warn(&err);
                return None;
            }
        };
        DateTime::parse_from_rfc3339(&stored)
            .ok()
            .map(|at| at.with_timezone(&Utc))
    }

    /// Adds the item unless `key` was dismissed.
    ///
    /// # Errors
    ///
    /// Returns the manager's error if the item cannot be added.
    pub fn show_unless_dismissed(
        &self,
        manager: &FeedbackManager,
        kind: FeedbackKind,
        key: &str,
        options: FeedbackOptions,
    ) -> Result<Option<ItemId>> {
        if !self.should_show(key) {
            return Ok(None);
        }
        manager.add(kind, options).map(Some)
    }

    /// Removes the item and remembers `key` as dismissed.
    ///
    /// Returns what [`FeedbackManager::remove`] returned.
    pub fn dismiss(&self, manager: &FeedbackManager, id: &ItemId, key: &str) -> bool {
        self.remember(key);
        manager.remove(id)
    }
}
