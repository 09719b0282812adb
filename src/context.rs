// SPDX-License-Identifier: MPL-2.0
//! Scoped access to a [`FeedbackManager`] without threading it through
//! every call.
//!
//! Scopes are per thread and nest: the innermost [`provide`] wins until its
//! guard is dropped.
//!
//! ```
//! use feedback_kit::context;
//! use feedback_kit::{FeedbackManager, ManagerConfig, ManualScheduler};
//! use std::sync::Arc;
//!
//! let manager = FeedbackManager::new(ManagerConfig::default(), Arc::new(ManualScheduler::new()));
//! assert!(context::use_feedback().is_err());
//!
//! let _scope = context::provide(manager);
//! assert!(context::use_feedback().is_ok());
//! ```

use std::cell::RefCell;
use std::marker::PhantomData;

use crate::error::{Error, Result};
use crate::feedback::FeedbackManager;

thread_local! {
    static PROVIDED: RefCell<Vec<FeedbackManager>> = const { RefCell::new(Vec::new()) };
}

/// Keeps a provided manager in scope until dropped.
#[must_use = "the manager leaves scope as soon as the guard is dropped"]
#[derive(Debug)]
pub struct ContextGuard {
    depth: usize,
    // Scopes live on the providing thread.
    _not_send: PhantomData<*const ()>,
}

impl Drop for ContextGuard {
    fn drop(&mut self) {
        PROVIDED.with(|stack| stack.borrow_mut().truncate(self.depth));
    }
}

/// Makes `manager` the current one on this thread.
pub fn provide(manager: FeedbackManager) -> ContextGuard {
    let depth = PROVIDED.with(|stack| {
        let mut stack = stack.borrow_mut();
        let depth = stack.len();
        stack.push(manager);
        depth
    });
    ContextGuard {
        depth,
        _not_send: PhantomData,
    }
}

/// Returns the innermost provided manager.
///
/// # Errors
///
/// Returns [`Error::MissingContext`] outside every [`provide`] scope.
pub fn use_feedback() -> Result<FeedbackManager> {
    try_use_feedback().ok_or(Error::MissingContext("FeedbackManager"))
}

#[must_use]
pub fn try_use_feedback() -> Option<FeedbackManager> {
    PROVIDED.with(|stack| stack.borrow().last().cloned())
}

/// Runs `f` with the innermost provided manager.
///
/// # Errors
///
/// Returns [`Error::MissingContext`] outside every [`provide`] scope.
pub fn with_feedback<R>(f: impl FnOnce(&FeedbackManager) -> R) -> Result<R> {
    let manager = use_feedback()?;
    Ok(f(&manager))
}
