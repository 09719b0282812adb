// SPDX-License-Identifier: MPL-2.0
//! Feedback items and their lifecycle.
//!
//! This module provides:
//! - [`FeedbackManager`]: creates items, drives status transitions and
//!   enforces per-kind visibility caps
//! - [`StoreState`]: immutable snapshot of every resident item
//! - [`Scheduler`]: cancellable timers ([`TokioScheduler`], [`ManualScheduler`])
//! - [`ProgressController`]: value tracking for progress items
//! - [`DismissMemory`]: persistent "don't show again" flags
//! - `wrap` / `promise`: loading indicators bound to async operations

mod dismissal;
mod id;
mod item;
mod kind;
mod manager;
mod options;
mod progress;
mod promise;
mod scheduler;
mod settings;
mod store;
mod subscription;

pub use dismissal::DismissMemory;
pub use id::{generate_id, reset_id_counter, ItemId, DEFAULT_ID_PREFIX};
pub use item::FeedbackItem;
pub use kind::{FeedbackKind, OverflowPolicy, Status, Variant};
pub use manager::{FeedbackManager, WeakFeedbackManager};
pub use options::{Callback, FeedbackOptions, OptionsPatch};
pub use progress::{ProgressController, ProgressOptions};
pub use promise::{PhaseMessage, PromiseMessages};
pub use scheduler::{ManualScheduler, Scheduler, TimerHandle, TimerTask, TokioScheduler};
pub use settings::{ConfigPatch, ManagerConfig};
pub use store::{Store, StoreState};
pub use subscription::{Subscription, SubscriptionId};
