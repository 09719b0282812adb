// SPDX-License-Identifier: MPL-2.0
//! Runtime settings of the lifecycle manager.

use std::collections::BTreeMap;
use std::time::Duration;

use super::id::DEFAULT_ID_PREFIX;
use super::kind::{FeedbackKind, OverflowPolicy};
use super::options::FeedbackOptions;
use crate::config::defaults;
use crate::domain::feedback::MaxVisible;

/// Settings read by the manager on every operation.
///
/// Every kind has an entry in each map after [`ManagerConfig::default`];
/// lookups for a missing entry fall back to the built-in defaults.
#[derive(Debug, Clone)]
pub struct ManagerConfig {
    pub enter_animation: Duration,
    pub exit_animation: Duration,
    pub max_visible: BTreeMap<FeedbackKind, MaxVisible>,
    pub overflow: BTreeMap<FeedbackKind, OverflowPolicy>,
    /// Options merged under the caller's options on `add`.
    pub defaults: BTreeMap<FeedbackKind, FeedbackOptions>,
    pub id_prefix: String,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        let mut max_visible = BTreeMap::new();
        let mut overflow = BTreeMap::new();
        let mut kind_defaults = BTreeMap::new();
        for kind in FeedbackKind::ALL {
            max_visible.insert(kind, MaxVisible::new(defaults::default_max_visible(kind)));
            overflow.insert(kind, OverflowPolicy::default_for(kind));
            kind_defaults.insert(
                kind,
                FeedbackOptions::new().with_duration(defaults::default_duration(kind)),
            );
        }

        Self {
            enter_animation: Duration::from_millis(defaults::DEFAULT_ENTER_ANIMATION_MS),
            exit_animation: Duration::from_millis(defaults::DEFAULT_EXIT_ANIMATION_MS),
            max_visible,
            overflow,
            defaults: kind_defaults,
            id_prefix: DEFAULT_ID_PREFIX.to_string(),
        }
    }
}

impl ManagerConfig {
    #[must_use]
    pub fn max_visible_for(&self, kind: FeedbackKind) -> MaxVisible {
        self.max_visible
            .get(&kind)
            .copied()
            .unwrap_or_else(|| MaxVisible::new(defaults::default_max_visible(kind)))
    }

    #[must_use]
    pub fn overflow_for(&self, kind: FeedbackKind) -> OverflowPolicy {
        self.overflow
            .get(&kind)
            .copied()
            .unwrap_or_else(|| OverflowPolicy::default_for(kind))
    }

    /// Merges `options` over the defaults registered for `kind`.
    #[must_use]
    pub fn resolve(&self, kind: FeedbackKind, options: FeedbackOptions) -> FeedbackOptions {
        match self.defaults.get(&kind) {
            Some(kind_defaults) => options.merged_over(kind_defaults),
            None => options.merged_over(
                &FeedbackOptions::new().with_duration(defaults::default_duration(kind)),
            ),
        }
    }

    /// Applies every field set in `patch`.
    pub fn apply(&mut self, patch: ConfigPatch) {
        if let Some(enter) = patch.enter_animation {
            self.enter_animation = enter;
        }
        if let Some(exit) = patch.exit_animation {
            self.exit_animation = exit;
        }
        self.max_visible.extend(patch.max_visible);
        self.overflow.extend(patch.overflow);
        for (kind, options) in patch.defaults {
            let merged = match self.defaults.remove(&kind) {
                Some(previous) => options.merged_over(&previous),
                None => options,
            };
            self.defaults.insert(kind, merged);
        }
        if let Some(prefix) = patch.id_prefix {
            self.id_prefix = prefix;
        }
    }
}

/// Partial update for [`ManagerConfig`].
///
/// Per-kind default options are merged over the existing ones.
#[derive(Debug, Clone, Default)]
pub struct ConfigPatch {
    pub enter_animation: Option<Duration>,
    pub exit_animation: Option<Duration>,
    pub max_visible: BTreeMap<FeedbackKind, MaxVisible>,
    pub overflow: BTreeMap<FeedbackKind, OverflowPolicy>,
    pub defaults: BTreeMap<FeedbackKind, FeedbackOptions>,
    pub id_prefix: Option<String>,
}

impl ConfigPatch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn enter_animation(mut self, delay: Duration) -> Self {
        self.enter_animation = Some(delay);
        self
    }

    #[must_use]
    pub fn exit_animation(mut self, delay: Duration) -> Self {
        self.exit_animation = Some(delay);
        self
    }

    #[must_use]
    pub fn max_visible(mut self, kind: FeedbackKind, cap: usize) -> Self {
        self.max_visible.insert(kind, MaxVisible::new(cap));
        self
    }

    #[must_use]
    pub fn overflow(mut self, kind: FeedbackKind, policy: OverflowPolicy) -> Self {
        self.overflow.insert(kind, policy);
        self
    }

    #[must_use]
    pub fn defaults(mut self, kind: FeedbackKind, options: FeedbackOptions) -> Self {
        self.defaults.insert(kind, options);
        self
    }

    #[must_use]
    pub fn id_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.id_prefix = Some(prefix.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_covers_every_kind() {
        let config = ManagerConfig::default();
        for kind in FeedbackKind::ALL {
            assert!(config.max_visible.contains_key(&kind));
            assert!(config.overflow.contains_key(&kind));
            assert!(config.defaults.contains_key(&kind));
        }
        assert_eq!(config.enter_animation, Duration::from_millis(200));
        assert_eq!(config.exit_animation, Duration::from_millis(150));
        assert_eq!(config.id_prefix, "fb");
    }

    #[test]
    fn resolve_fills_toast_duration() {
        let config = ManagerConfig::default();
        let options = config.resolve(FeedbackKind::Toast, FeedbackOptions::message("hi"));
        assert_eq!(options.duration, Some(Duration::from_millis(4_000)));
        assert_eq!(options.message.as_deref(), Some("hi"));
    }

    #[test]
    fn resolve_keeps_caller_duration() {
        let config = ManagerConfig::default();
        let options = config.resolve(
            FeedbackKind::Toast,
            FeedbackOptions::new().with_duration(Duration::from_secs(1)),
        );
        assert_eq!(options.duration, Some(Duration::from_secs(1)));
    }

    #[test]
    fn lookups_fall_back_when_entry_is_missing() {
        let mut config = ManagerConfig::default();
        config.max_visible.clear();
        config.overflow.clear();
        config.defaults.clear();

        assert_eq!(config.max_visible_for(FeedbackKind::Alert).value(), 3);
        assert_eq!(config.overflow_for(FeedbackKind::Modal), OverflowPolicy::Queue);
        let options = config.resolve(FeedbackKind::Toast, FeedbackOptions::new());
        assert_eq!(options.duration, Some(Duration::from_millis(4_000)));
    }

    #[test]
    fn patch_merges_defaults_and_overrides_scalars() {
        let mut config = ManagerConfig::default();
        config.apply(
            ConfigPatch::new()
                .exit_animation(Duration::from_millis(10))
                .max_visible(FeedbackKind::Toast, 2)
                .defaults(FeedbackKind::Toast, FeedbackOptions::new().with_title("Note"))
                .id_prefix("app"),
        );

        assert_eq!(config.exit_animation, Duration::from_millis(10));
        assert_eq!(config.enter_animation, Duration::from_millis(200));
        assert_eq!(config.max_visible_for(FeedbackKind::Toast).value(), 2);
        assert_eq!(config.id_prefix, "app");

        let toast = &config.defaults[&FeedbackKind::Toast];
        assert_eq!(toast.title.as_deref(), Some("Note"));
        assert_eq!(toast.duration, Some(Duration::from_millis(4_000)));
    }
}
