// SPDX-License-Identifier: MPL-2.0
//! `feedback_kit` is the lifecycle core behind transient UI feedback:
//! toasts, modals, drawers, banners, progress indicators and confirmations.
//!
//! A [`FeedbackManager`] owns every item, moves it through
//! `Entering → Visible → Exiting → removed` on a timer schedule, enforces
//! per-kind visibility caps and notifies subscribers so a presentation layer
//! can re-render. Rendering itself is left to the host.
//!
//! # Examples
//!
//! ```
//! use feedback_kit::{FeedbackKind, FeedbackManager, FeedbackOptions, ManagerConfig, ManualScheduler, Status};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let clock = ManualScheduler::new();
//! let manager = FeedbackManager::new(ManagerConfig::default(), Arc::new(clock.clone()));
//!
//! let id = manager
//!     .add(FeedbackKind::Toast, FeedbackOptions::message("Saved"))
//!     .expect("fresh id");
//! assert_eq!(manager.get(&id).map(|item| item.status()), Some(Status::Entering));
//!
//! clock.advance(Duration::from_millis(200));
//! assert_eq!(manager.get(&id).map(|item| item.status()), Some(Status::Visible));
//!
//! // Default toast duration, then the exit animation.
//! clock.advance(Duration::from_secs(5));
//! assert!(manager.get(&id).is_none());
//! ```

#![doc(html_root_url = "https://docs.rs/feedback_kit/0.1.0")]

pub mod config;
pub mod context;
pub mod diagnostics;
pub mod domain;
pub mod error;
pub mod feedback;
pub mod gesture;
pub mod offline;
pub mod storage;

#[cfg(test)]
mod test_utils;

pub use error::{Error, Result};
pub use feedback::{
    FeedbackItem, FeedbackKind, FeedbackManager, FeedbackOptions, ItemId, ManagerConfig,
    ManualScheduler, OptionsPatch, Status, TokioScheduler, Variant,
};
