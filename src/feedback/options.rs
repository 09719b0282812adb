// SPDX-License-Identifier: MPL-2.0
//! Per-item options and partial updates.

use super::id::ItemId;
use super::kind::Variant;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Lifecycle callback receiving the id of the item it fired for.
pub type Callback = Arc<dyn Fn(&ItemId) + Send + Sync>;

/// Options attached to a feedback item.
///
/// Fields left as `None` fall back to the per-kind defaults held by the
/// manager configuration. A `duration` of zero means "persist until
/// dismissed".
#[derive(Clone, Default)]
pub struct FeedbackOptions {
    /// Caller-chosen id. Generated when absent.
    pub id: Option<ItemId>,
    pub message: Option<String>,
    pub title: Option<String>,
    pub variant: Option<Variant>,
    /// Time spent `visible` before auto-dismissal.
    pub duration: Option<Duration>,
    /// Kind-specific fields (progress value, confirm labels, ...).
    pub data: BTreeMap<String, Value>,
    /// Fires after the item becomes `visible`.
    pub on_open: Option<Callback>,
    /// Fires after the item enters `exiting`, whatever triggered it.
    pub on_close: Option<Callback>,
}

impl FeedbackOptions {
    /// Creates empty options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates options carrying only a message.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: impl Into<ItemId>) -> Self {
        self.id = Some(id.into());
        self
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn with_variant(mut self, variant: Variant) -> Self {
        self.variant = Some(variant);
        self
    }

    #[must_use]
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    /// Keeps the item on screen until it is dismissed explicitly.
    #[must_use]
    pub fn persistent(self) -> Self {
        self.with_duration(Duration::ZERO)
    }

    #[must_use]
    pub fn with_data(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn on_open(mut self, callback: impl Fn(&ItemId) + Send + Sync + 'static) -> Self {
        self.on_open = Some(Arc::new(callback));
        self
    }

    #[must_use]
    pub fn on_close(mut self, callback: impl Fn(&ItemId) + Send + Sync + 'static) -> Self {
        self.on_close = Some(Arc::new(callback));
        self
    }

    /// Returns the display duration, zero when unset.
    #[must_use]
    pub fn display_duration(&self) -> Duration {
        self.duration.unwrap_or(Duration::ZERO)
    }

    /// Fills every unset field from `defaults`.
    ///
    /// `data` entries from `self` win over entries with the same key in
    /// `defaults`. The default id is never inherited.
    #[must_use]
    pub fn merged_over(self, defaults: &FeedbackOptions) -> FeedbackOptions {
        let mut data = defaults.data.clone();
        data.extend(self.data);
        FeedbackOptions {
            id: self.id,
            message: self.message.or_else(|| defaults.message.clone()),
            title: self.title.or_else(|| defaults.title.clone()),
            variant: self.variant.or(defaults.variant),
            duration: self.duration.or(defaults.duration),
            data,
            on_open: self.on_open.or_else(|| defaults.on_open.clone()),
            on_close: self.on_close.or_else(|| defaults.on_close.clone()),
        }
    }

    /// Applies a partial update in place.
    pub fn apply(&mut self, patch: OptionsPatch) {
        if let Some(message) = patch.message {
            self.message = Some(message);
        }
        if let Some(title) = patch.title {
            self.title = Some(title);
        }
        if let Some(variant) = patch.variant {
            self.variant = Some(variant);
        }
        self.data.extend(patch.data);
    }
}

impl fmt::Debug for FeedbackOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeedbackOptions")
            .field("id", &self.id)
            .field("message", &self.message)
            .field("title", &self.title)
            .field("variant", &self.variant)
            .field("duration", &self.duration)
            .field("data", &self.data)
            .field("on_open", &self.on_open.is_some())
            .field("on_close", &self.on_close.is_some())
            .finish()
    }
}

/// Partial update for a resident item.
///
/// Durations and callbacks are fixed at creation and cannot be patched:
/// updating never touches status or timers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptionsPatch {
    pub message: Option<String>,
    pub title: Option<String>,
    pub variant: Option<Variant>,
    pub data: BTreeMap<String, Value>,
}

impl OptionsPatch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn variant(mut self, variant: Variant) -> Self {
        self.variant = Some(variant);
        self
    }

    #[must_use]
    pub fn data(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    /// Returns true if applying this patch would change nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.message.is_none() && self.title.is_none() && self.variant.is_none() && self.data.is_empty()
    }
}
