// SPDX-License-Identifier: MPL-2.0
//! The feedback item entity.

use super::id::ItemId;
use super::kind::{FeedbackKind, Status};
use super::options::{FeedbackOptions, OptionsPatch};
use chrono::{DateTime, Utc};
use std::time::Duration;

/// One transient notification tracked by the lifecycle manager.
#[derive(Debug, Clone)]
pub struct FeedbackItem {
    id: ItemId,
    kind: FeedbackKind,
    status: Status,
    options: FeedbackOptions,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    /// Admission order, used to pick the oldest item for eviction.
    seq: u64,
    /// Bumped on every mutation.
    revision: u64,
}

impl FeedbackItem {
    /// Creates an item in the `entering` status.
    #[must_use]
    pub fn new(id: ItemId, kind: FeedbackKind, options: FeedbackOptions, seq: u64) -> Self {
        let now = Utc::now();
        Self {
            id,
            kind,
            status: Status::Entering,
            options,
            created_at: now,
            updated_at: now,
            seq,
            revision: 0,
        }
    }

    #[must_use]
    pub fn id(&self) -> &ItemId {
        &self.id
    }

    #[must_use]
    pub fn kind(&self) -> FeedbackKind {
        self.kind
    }

    #[must_use]
    pub fn status(&self) -> Status {
        self.status
    }

    #[must_use]
    pub fn options(&self) -> &FeedbackOptions {
        &self.options
    }

    /// Returns the item's message, if any.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.options.message.as_deref()
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    #[must_use]
    pub fn seq(&self) -> u64 {
        self.seq
    }

    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Returns true while the item counts against its kind's visibility cap.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// Returns how long the item stays visible; zero means it persists.
    #[must_use]
    pub fn display_duration(&self) -> Duration {
        self.options.display_duration()
    }

    pub(crate) fn apply(&mut self, patch: OptionsPatch) {
        self.options.apply(patch);
        self.touch();
    }

    /// Moves the status forward. Backward moves are ignored.
    pub(crate) fn advance_to(&mut self, status: Status) -> bool {
        if status <= self.status {
            return false;
        }
        self.status = status;
        self.touch();
        true
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
        self.revision += 1;
    }
}

/// Items compare equal when they are the same item at the same revision.
///
/// Options hold callbacks and cannot be compared structurally; the revision
/// changes on every mutation, which is what selector-based subscriptions
/// need to detect a change.
impl PartialEq for FeedbackItem {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.revision == other.revision
    }
}
