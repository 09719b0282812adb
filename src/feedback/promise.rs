// SPDX-License-Identifier: MPL-2.0
//! Loading indicators tied to the lifetime of an async operation.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use super::id::ItemId;
use super::kind::{FeedbackKind, Variant};
use super::manager::FeedbackManager;
use super::options::FeedbackOptions;
use crate::diagnostics::{report_warning, WarningEvent, WarningType};

/// Message shown for one outcome of [`FeedbackManager::promise`].
pub enum PhaseMessage<T> {
    Text(String),
    /// Built from the outcome value.
    Format(Box<dyn FnOnce(&T) -> String + Send>),
}

impl<T> PhaseMessage<T> {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    pub fn format(format: impl FnOnce(&T) -> String + Send + 'static) -> Self {
        Self::Format(Box::new(format))
    }

    fn render(self, value: &T) -> String {
        match self {
            Self::Text(text) => text,
            Self::Format(format) => format(value),
        }
    }
}

impl<T> From<&str> for PhaseMessage<T> {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl<T> From<String> for PhaseMessage<T> {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl<T> fmt::Debug for PhaseMessage<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Self::Format(_) => f.write_str("Format(..)"),
        }
    }
}

/// Messages for the three phases of [`FeedbackManager::promise`].
#[derive(Debug)]
pub struct PromiseMessages<T, E> {
    pub loading: String,
    pub success: PhaseMessage<T>,
    pub error: PhaseMessage<E>,
}

impl<T, E> PromiseMessages<T, E> {
    pub fn new(
        loading: impl Into<String>,
        success: impl Into<PhaseMessage<T>>,
        error: impl Into<PhaseMessage<E>>,
    ) -> Self {
        Self {
            loading: loading.into(),
            success: success.into(),
            error: error.into(),
        }
    }
}

/// Removes its item when dropped, whatever ended the operation.
struct LoadingGuard {
    manager: FeedbackManager,
    id: Option<ItemId>,
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        if let Some(id) = self.id.take() {
            self.manager.remove(&id);
        }
    }
}

impl FeedbackManager {
    /// Shows a loading item while `operation` runs.
    ///
    /// The item is removed before the result is returned, and also when the
    /// operation panics or the returned future is dropped early. If the
    /// item cannot be created the operation still runs.
    pub async fn wrap<F, Fut>(&self, operation: F, options: FeedbackOptions) -> Fut::Output
    where
        F: FnOnce() -> Fut,
        Fut: Future,
    {
        let guard = self.loading_guard(FeedbackKind::Loading, options);
        let output = operation().await;
        drop(guard);
        output
    }

    /// Shows a loading toast until `future` settles, then a success or an
    /// error toast.
    ///
    /// `options` apply to all three toasts; its `id` is ignored so that
    /// every call owns fresh items. The error is returned unchanged after the
    /// error toast is shown.
    pub async fn promise<Fut, T, E>(
        &self,
        future: Fut,
        messages: PromiseMessages<T, E>,
        options: FeedbackOptions,
    ) -> Result<T, E>
    where
        Fut: Future<Output = Result<T, E>>,
    {
        let PromiseMessages {
            loading,
            success,
            error,
        } = messages;
        let base = FeedbackOptions { id: None, ..options };

        let loading_options = FeedbackOptions {
            message: Some(loading),
            variant: Some(Variant::Loading),
            duration: Some(Duration::ZERO),
            ..base.clone()
        };
        let guard = self.loading_guard(FeedbackKind::Toast, loading_options);
        let outcome = future.await;
        drop(guard);

        let (message, variant) = match &outcome {
            Ok(value) => (success.render(value), Variant::Success),
            Err(err) => (error.render(err), Variant::Error),
        };
        let result_options = FeedbackOptions {
            message: Some(message),
            variant: Some(variant),
            ..base
        };
        if let Err(err) = self.add(FeedbackKind::Toast, result_options) {
            report_warning(
                self.diagnostics().as_ref(),
                WarningEvent::new(WarningType::IndicatorUnavailable, err.to_string()),
            );
        }
        outcome
    }

    fn loading_guard(&self, kind: FeedbackKind, options: FeedbackOptions) -> LoadingGuard {
        let id = match self.add(kind, options) {
            Ok(id) => Some(id),
            Err(err) => {
                report_warning(
                    self.diagnostics().as_ref(),
                    WarningEvent::new(
                        WarningType::IndicatorUnavailable,
                        format!("running without loading indicator: {err}"),
                    ),
                );
                None
            }
        };
        LoadingGuard {
            manager: self.clone(),
            id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feedback::{FeedbackItem, Status};
    use crate::test_utils::manual_manager;
    use futures_util::FutureExt;
    use std::panic::AssertUnwindSafe;

    fn by_variant(items: &[FeedbackItem], variant: Variant) -> Vec<&FeedbackItem> {
        items
            .iter()
            .filter(|item| item.options().variant == Some(variant))
            .collect()
    }

    #[tokio::test]
    async fn wrap_removes_indicator_on_success() {
        let (manager, _) = manual_manager();
        let observer = manager.clone();

        let value = manager
            .wrap(
                || async move {
                    let loading = observer.snapshot().get_by_kind(FeedbackKind::Loading).len();
                    assert_eq!(loading, 1);
                    42
                },
                FeedbackOptions::message("Working"),
            )
            .await;

        assert_eq!(value, 42);
        let items = manager.get_all();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].status(), Status::Exiting);
    }

    #[tokio::test]
    async fn wrap_removes_indicator_on_error() {
        let (manager, _) = manual_manager();
        let result: Result<(), String> = manager
            .wrap(|| async { Err("nope".to_string()) }, FeedbackOptions::new())
            .await;

        assert_eq!(result, Err("nope".to_string()));
        assert!(manager.get_all().iter().all(|item| item.status() == Status::Exiting));
    }

    #[test]
    fn wrap_removes_indicator_on_synchronous_panic() {
        let (manager, _) = manual_manager();
        let outcome = std::panic::catch_unwind(AssertUnwindSafe(|| {
            manager
                .wrap(
                    || -> std::future::Ready<()> { panic!("boom") },
                    FeedbackOptions::new(),
                )
                .now_or_never()
        }));

        assert!(outcome.is_err());
        let items = manager.get_all();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].status(), Status::Exiting);
    }

    #[test]
    fn dropping_wrap_future_removes_indicator() {
        let (manager, _) = manual_manager();
        let mut pending = Box::pin(manager.wrap(std::future::pending::<()>, FeedbackOptions::new()));

        assert!(pending.as_mut().now_or_never().is_none());
        assert_eq!(manager.get_all()[0].status(), Status::Entering);

        drop(pending);
        assert_eq!(manager.get_all()[0].status(), Status::Exiting);
    }

    #[tokio::test]
    async fn wrap_runs_without_indicator_when_add_fails() {
        let (manager, _) = manual_manager();
        manager
            .add(FeedbackKind::Toast, FeedbackOptions::new().with_id("taken"))
            .expect("add");

        let value = manager
            .wrap(|| async { "done" }, FeedbackOptions::new().with_id("taken"))
            .await;

        assert_eq!(value, "done");
        assert_eq!(manager.get_all().len(), 1);
    }

    #[tokio::test]
    async fn promise_success_swaps_loading_for_success_toast() {
        let (manager, _) = manual_manager();
        let result: Result<u32, String> = manager
            .promise(
                async { Ok(3) },
                PromiseMessages::new(
                    "Uploading",
                    PhaseMessage::format(|n: &u32| format!("Uploaded {n} files")),
                    "Upload failed",
                ),
                FeedbackOptions::new(),
            )
            .await;

        assert_eq!(result, Ok(3));
        let items = manager.get_all();
        let loading = by_variant(&items, Variant::Loading);
        assert_eq!(loading.len(), 1);
        assert_eq!(loading[0].status(), Status::Exiting);
        assert_eq!(loading[0].display_duration(), Duration::ZERO);

        let success = by_variant(&items, Variant::Success);
        assert_eq!(success.len(), 1);
        assert_eq!(success[0].message(), Some("Uploaded 3 files"));
        assert_eq!(success[0].kind(), FeedbackKind::Toast);
    }

    #[tokio::test]
    async fn promise_error_shows_error_toast_and_reraises() {
        let (manager, _) = manual_manager();
        let result: Result<(), String> = manager
            .promise(
                async { Err("timeout".to_string()) },
                PromiseMessages::new(
                    "Saving",
                    "Saved",
                    PhaseMessage::format(|e: &String| format!("Failed: {e}")),
                ),
                FeedbackOptions::new(),
            )
            .await;

        assert_eq!(result, Err("timeout".to_string()));
        let items = manager.get_all();
        let errors = by_variant(&items, Variant::Error);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message(), Some("Failed: timeout"));
        assert!(by_variant(&items, Variant::Success).is_empty());
    }

    #[tokio::test]
    async fn promise_ignores_caller_id() {
        let (manager, _) = manual_manager();
        for _ in 0..2 {
            let _: Result<(), ()> = manager
                .promise(
                    async { Ok(()) },
                    PromiseMessages::new("a", "b", "c"),
                    FeedbackOptions::new().with_id("fixed"),
                )
                .await;
        }
        assert_eq!(manager.get_all().len(), 4);
        assert!(manager.get(&ItemId::from("fixed")).is_none());
    }
}
