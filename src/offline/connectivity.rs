// SPDX-License-Identifier: MPL-2.0
//! Online/offline tracking that replays the offline queue on reconnect.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use super::queue::{ActionError, OfflineQueue, ProcessReport};
use crate::config::Config;
use crate::diagnostics::{report_warning, DiagnosticsHandle, WarningEvent, WarningType};
use crate::error::Result;

/// What [`ConnectivityMonitor::run_or_queue`] did with an action.
#[derive(Debug)]
pub enum Dispatch {
    /// The action ran immediately.
    Ran(std::result::Result<(), ActionError>),
    /// The action waits in the offline queue.
    Queued,
}

/// HTTP probe used to confirm connectivity.
#[derive(Debug, Clone)]
pub struct HealthCheck {
    url: String,
    client: reqwest::Client,
}

impl HealthCheck {
    /// # Errors
    ///
    /// Returns [`crate::error::Error::Network`] if the HTTP client cannot be
    /// built.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("feedback_kit/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            url: url.into(),
            client,
        })
    }

    /// Builds the probe described by `config`, if it names a URL.
    pub fn from_config(config: &Config) -> Option<Result<Self>> {
        config
            .health_check_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .map(|url| Self::new(url, config.health_check_timeout()))
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Issues a GET request; any 2xx answer means online.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::Error::Network`] on transport failure or a
    /// non-success status.
    pub async fn check(&self) -> Result<()> {
        let response = self.client.get(&self.url).send().await?;
        response.error_for_status()?;
        Ok(())
    }

    /// Like [`check`](Self::check), collapsed to a flag.
    pub async fn probe(&self) -> bool {
        self.check().await.is_ok()
    }
}

/// Tracks connectivity and drains the offline queue when it comes back.
///
/// Cloning yields another handle to the same state.
#[derive(Clone)]
pub struct ConnectivityMonitor {
    queue: OfflineQueue,
    online: Arc<watch::Sender<bool>>,
    diagnostics: Option<DiagnosticsHandle>,
}

impl ConnectivityMonitor {
    #[must_use]
    pub fn new(queue: OfflineQueue, online: bool) -> Self {
        let (sender, _) = watch::channel(online);
        Self {
            queue,
            online: Arc::new(sender),
            diagnostics: None,
        }
    }

    #[must_use]
    pub fn with_diagnostics(mut self, handle: DiagnosticsHandle) -> Self {
        self.diagnostics = Some(handle);
        self
    }

    #[must_use]
    pub fn queue(&self) -> &OfflineQueue {
        &self.queue
    }

    #[must_use]
    pub fn is_online(&self) -> bool {
        *self.online.borrow()
    }

    /// Receiver of online state changes.
    #[must_use]
    pub fn watch(&self) -> watch::Receiver<bool> {
        self.online.subscribe()
    }

    /// Records the connectivity state.
    ///
    /// Going from offline to online processes the queue and returns the
    /// report; every other call returns `None`.
    pub async fn set_online(&self, online: bool) -> Option<ProcessReport> {
        let was_online = self.online.send_replace(online);
        if online && !was_online {
            Some(self.queue.process_queue().await)
        } else {
            None
        }
    }

    /// Runs `action` now when online, otherwise queues it.
    pub async fn run_or_queue<F, Fut>(&self, action: F) -> Dispatch
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = std::result::Result<(), ActionError>> + Send + 'static,
    {
        if self.is_online() {
            Dispatch::Ran(action().await)
        } else {
            self.queue.queue_action(action);
            Dispatch::Queued
        }
    }

    /// Probes `check` and feeds the result into [`set_online`](Self::set_online).
    pub async fn refresh(&self, check: &HealthCheck) -> Option<ProcessReport> {
        let online = match check.check().await {
            Ok(()) => true,
            Err(err) => {
                report_warning(
                    self.diagnostics.as_ref(),
                    WarningEvent::new(
                        WarningType::HealthCheckFailed,
                        format!("health check against {} failed: {err}", check.url()),
                    ),
                );
                false
            }
        };
        self.set_online(online).await
    }
}

impl fmt::Debug for ConnectivityMonitor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectivityMonitor")
            .field("online", &self.is_online())
            .field("queue", &self.queue)
            .finish()
    }
}
