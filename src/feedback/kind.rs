// SPDX-License-Identifier: MPL-2.0
//! Feedback kinds, lifecycle statuses and visual variants.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The fixed set of feedback surfaces the manager knows about.
///
/// The kind of an item never changes after creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackKind {
    Toast,
    Modal,
    Loading,
    Alert,
    Progress,
    Confirm,
    Banner,
    Drawer,
    Popconfirm,
    Sheet,
    Prompt,
    Result,
    Skeleton,
}

impl FeedbackKind {
    /// Every kind, in declaration order.
    pub const ALL: [FeedbackKind; 13] = [
        FeedbackKind::Toast,
        FeedbackKind::Modal,
        FeedbackKind::Loading,
        FeedbackKind::Alert,
        FeedbackKind::Progress,
        FeedbackKind::Confirm,
        FeedbackKind::Banner,
        FeedbackKind::Drawer,
        FeedbackKind::Popconfirm,
        FeedbackKind::Sheet,
        FeedbackKind::Prompt,
        FeedbackKind::Result,
        FeedbackKind::Skeleton,
    ];

    /// Returns the lowercase name used in configuration files.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            FeedbackKind::Toast => "toast",
            FeedbackKind::Modal => "modal",
            FeedbackKind::Loading => "loading",
            FeedbackKind::Alert => "alert",
            FeedbackKind::Progress => "progress",
            FeedbackKind::Confirm => "confirm",
            FeedbackKind::Banner => "banner",
            FeedbackKind::Drawer => "drawer",
            FeedbackKind::Popconfirm => "popconfirm",
            FeedbackKind::Sheet => "sheet",
            FeedbackKind::Prompt => "prompt",
            FeedbackKind::Result => "result",
            FeedbackKind::Skeleton => "skeleton",
        }
    }
}

impl fmt::Display for FeedbackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FeedbackKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == needle)
            .ok_or_else(|| format!("unknown feedback kind: {s}"))
    }
}

/// Lifecycle status of a resident item.
///
/// Statuses only move forward. There is no `Removed` variant: an item that
/// finishes exiting is deleted from the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// Written to the store, enter animation running.
    Entering,
    /// Fully shown.
    Visible,
    /// Exit animation running, deletion pending.
    Exiting,
}

impl Status {
    /// Returns true for the statuses that count against the visibility cap.
    #[must_use]
    pub fn is_active(self) -> bool {
        matches!(self, Status::Entering | Status::Visible)
    }
}

/// Visual variant carried in an item's options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    #[default]
    Default,
    Success,
    Info,
    Warning,
    Error,
    Loading,
}

/// What `add` does when a kind already shows `max_visible` items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverflowPolicy {
    /// Force the oldest active item of the kind into `exiting`, then admit.
    EvictOldest,
    /// Hold the new item back until an active item of the kind starts exiting.
    Queue,
}

impl OverflowPolicy {
    /// Policy applied to a kind when the configuration does not override it.
    ///
    /// Stacking surfaces make room for newer items; blocking dialogs wait
    /// their turn so the user answers them one at a time.
    #[must_use]
    pub fn default_for(kind: FeedbackKind) -> Self {
        match kind {
            FeedbackKind::Modal
            | FeedbackKind::Confirm
            | FeedbackKind::Drawer
            | FeedbackKind::Sheet
            | FeedbackKind::Prompt => OverflowPolicy::Queue,
            FeedbackKind::Toast
            | FeedbackKind::Loading
            | FeedbackKind::Alert
            | FeedbackKind::Progress
            | FeedbackKind::Banner
            | FeedbackKind::Popconfirm
            | FeedbackKind::Result
            | FeedbackKind::Skeleton => OverflowPolicy::EvictOldest,
        }
    }
}
