// SPDX-License-Identifier: MPL-2.0
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use feedback_kit::config::{self, Config};
use feedback_kit::context;
use feedback_kit::diagnostics::DiagnosticsCollector;
use feedback_kit::domain::diagnostics::BufferCapacity;
use feedback_kit::feedback::{
    generate_id, ConfigPatch, DismissMemory, ProgressController, ProgressOptions, StoreState,
};
use feedback_kit::gesture::{DragConfig, DragGesture, Point};
use feedback_kit::storage::FileStore;
use feedback_kit::{
    FeedbackKind, FeedbackManager, FeedbackOptions, ManagerConfig, ManualScheduler, Status,
};
use tempfile::tempdir;

const ENTER: Duration = Duration::from_millis(200);
const EXIT: Duration = Duration::from_millis(150);

fn manual_manager(config: ManagerConfig) -> (FeedbackManager, ManualScheduler) {
    let clock = ManualScheduler::new();
    let manager = FeedbackManager::new(config, Arc::new(clock.clone()));
    (manager, clock)
}

fn status(manager: &FeedbackManager, id: &feedback_kit::ItemId) -> Option<Status> {
    manager.get(id).map(|item| item.status())
}

#[test]
fn toast_runs_full_lifecycle() {
    let (manager, clock) = manual_manager(ManagerConfig::default());
    let id = manager
        .add(
            FeedbackKind::Toast,
            FeedbackOptions::message("Saved").with_duration(Duration::from_millis(4000)),
        )
        .expect("add toast");

    assert_eq!(status(&manager, &id), Some(Status::Entering));

    clock.advance(ENTER);
    assert_eq!(status(&manager, &id), Some(Status::Visible));

    clock.advance(Duration::from_millis(3999));
    assert_eq!(status(&manager, &id), Some(Status::Visible));
    clock.advance(Duration::from_millis(1));
    assert_eq!(status(&manager, &id), Some(Status::Exiting));

    clock.advance(EXIT);
    assert!(manager.get_all().is_empty());
}

#[test]
fn generated_ids_are_unique() {
    let ids: HashSet<String> = (0..10_000).map(|_| generate_id("fb")).collect();
    assert_eq!(ids.len(), 10_000);
}

#[test]
fn observed_statuses_only_move_forward() {
    let (manager, clock) = manual_manager(ManagerConfig::default());
    let id = feedback_kit::ItemId::from("watched");
    let seen = Arc::new(Mutex::new(Vec::new()));

    let sink = Arc::clone(&seen);
    let target = id.clone();
    let _subscription = manager.subscribe(
        move |state: &StoreState| state.get(&target).map(|item| item.status()),
        move |status: &Option<Status>| sink.lock().expect("lock").push(*status),
    );

    manager
        .add(FeedbackKind::Toast, FeedbackOptions::new().with_id(id.clone()))
        .expect("add");
    for _ in 0..20 {
        clock.advance(Duration::from_millis(500));
    }

    let seen = seen.lock().expect("lock").clone();
    assert_eq!(
        seen,
        vec![
            Some(Status::Entering),
            Some(Status::Visible),
            Some(Status::Exiting),
            None
        ]
    );
}

#[test]
fn zero_duration_items_persist_until_removed() {
    let (manager, clock) = manual_manager(ManagerConfig::default());
    let id = manager
        .add(FeedbackKind::Toast, FeedbackOptions::message("Pinned").persistent())
        .expect("add");

    clock.advance(Duration::from_secs(24 * 60 * 60));
    assert_eq!(status(&manager, &id), Some(Status::Visible));

    assert!(manager.remove(&id));
    assert_eq!(status(&manager, &id), Some(Status::Exiting));
    clock.advance(EXIT);
    assert_eq!(status(&manager, &id), None);
}

#[test]
fn active_items_never_exceed_cap() {
    let (manager, clock) = manual_manager(ManagerConfig::default());
    let cap = manager
        .config()
        .max_visible_for(FeedbackKind::Toast)
        .value();
    let peak = Arc::new(AtomicUsize::new(0));

    let observed = Arc::clone(&peak);
    let _subscription = manager.subscribe(
        |state: &StoreState| state.active_count(FeedbackKind::Toast),
        move |active: &usize| {
            observed.fetch_max(*active, Ordering::SeqCst);
        },
    );

    let ids: Vec<_> = (0..=cap)
        .map(|n| {
            manager
                .add(FeedbackKind::Toast, FeedbackOptions::message(format!("#{n}")))
                .expect("add")
        })
        .collect();

    assert!(peak.load(Ordering::SeqCst) <= cap);
    assert_eq!(status(&manager, &ids[0]), Some(Status::Exiting));
    assert!(ids[1..]
        .iter()
        .all(|id| status(&manager, id) == Some(Status::Entering)));

    clock.advance(ENTER);
    assert_eq!(manager.snapshot().active_count(FeedbackKind::Toast), cap);
}

#[test]
fn blocking_dialogs_wait_their_turn() {
    let (manager, clock) = manual_manager(ManagerConfig::default());
    let first = manager
        .add(FeedbackKind::Modal, FeedbackOptions::message("first"))
        .expect("add");
    let second = manager
        .add(FeedbackKind::Modal, FeedbackOptions::message("second"))
        .expect("add");

    assert!(manager.is_queued(&second));
    assert!(manager.get(&second).is_none());
    assert_eq!(manager.queued_count(FeedbackKind::Modal), 1);

    clock.advance(ENTER);
    assert!(manager.remove(&first));

    assert!(!manager.is_queued(&second));
    assert_eq!(status(&manager, &second), Some(Status::Entering));
}

#[test]
fn raising_cap_promotes_waiting_dialogs() {
    let (manager, _) = manual_manager(ManagerConfig::default());
    for n in 0..3 {
        manager
            .add(FeedbackKind::Drawer, FeedbackOptions::message(format!("{n}")))
            .expect("add");
    }
    assert_eq!(manager.queued_count(FeedbackKind::Drawer), 2);

    manager.update_config(ConfigPatch::new().max_visible(FeedbackKind::Drawer, 3));

    assert_eq!(manager.queued_count(FeedbackKind::Drawer), 0);
    assert_eq!(manager.snapshot().active_count(FeedbackKind::Drawer), 3);
}

#[test]
fn progress_completion_fires_once_inside_update() {
    let (manager, clock) = manual_manager(ManagerConfig::default());
    let progress = ProgressController::new(manager.clone());
    let completions = Arc::new(AtomicUsize::new(0));

    let counter = Arc::clone(&completions);
    let id = progress
        .show(ProgressOptions::new().value(0.0).on_complete(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        }))
        .expect("show");

    assert!(progress.update(&id, 100.0, None));
    assert_eq!(completions.load(Ordering::SeqCst), 1);

    assert!(progress.update(&id, 100.0, None));
    assert_eq!(completions.load(Ordering::SeqCst), 1);

    assert!(progress.complete(&id));
    assert_eq!(completions.load(Ordering::SeqCst), 1);

    clock.advance(Duration::from_millis(500));
    assert_eq!(status(&manager, &id), Some(Status::Exiting));
    clock.advance(EXIT);
    assert!(manager.get(&id).is_none());
    assert_eq!(progress.value(&id), None);
}

#[test]
fn disposed_manager_releases_progress_trackers() {
    let (manager, clock) = manual_manager(ManagerConfig::default());
    let progress = ProgressController::new(manager.clone());
    let id = progress.show(ProgressOptions::new().value(30.0)).expect("show");
    assert!(progress.complete(&id));

    manager.dispose();
    clock.advance(Duration::from_secs(5));

    assert_eq!(progress.value(&id), None);
    assert_eq!(progress.tracked(), 0);
    assert_eq!(clock.pending(), 0);
}

#[test]
fn drag_within_threshold_never_starts() {
    let calls = Arc::new(AtomicUsize::new(0));
    let (on_start, on_end) = (Arc::clone(&calls), Arc::clone(&calls));
    let mut gesture = DragGesture::new(DragConfig::default())
        .on_drag_start(move |_| {
            on_start.fetch_add(1, Ordering::SeqCst);
        })
        .on_drag_end(move |_| {
            on_end.fetch_add(1, Ordering::SeqCst);
        });

    let t0 = Instant::now();
    gesture.pointer_down(Point::new(50.0, 50.0), t0);
    for (step, dy) in [4.0, -8.0, 10.0, -10.0, 0.0].into_iter().enumerate() {
        let at = t0 + Duration::from_millis(16 * (step as u64 + 1));
        assert!(!gesture.pointer_move(Point::new(50.0, 50.0 + dy), at));
    }
    assert!(gesture
        .pointer_up(Point::new(50.0, 50.0), t0 + Duration::from_millis(100))
        .is_none());

    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn config_file_drives_manager_settings() {
    let dir = tempdir().expect("Failed to create temporary directory");
    let path = dir.path().join("feedback.toml");

    let mut file_config = Config::default();
    file_config.max_visible.insert("toast".to_string(), 2);
    file_config.default_duration_ms.insert("banner".to_string(), 1000);
    file_config.id_prefix = "app".to_string();
    config::save_to_path(&file_config, &path).expect("Failed to write config file");

    let loaded = config::load_from_path(&path).expect("Failed to load config");
    assert_eq!(loaded, file_config);

    let (manager, clock) = manual_manager(loaded.manager_config());
    let banner = manager
        .add(FeedbackKind::Banner, FeedbackOptions::new())
        .expect("add");
    assert!(banner.as_str().starts_with("app_"));

    clock.advance(ENTER + Duration::from_millis(1000));
    assert_eq!(status(&manager, &banner), Some(Status::Exiting));

    for _ in 0..3 {
        manager
            .add(FeedbackKind::Toast, FeedbackOptions::new())
            .expect("add");
    }
    assert_eq!(manager.snapshot().active_count(FeedbackKind::Toast), 2);
}

#[test]
fn dismissals_survive_a_new_store_instance() {
    let dir = tempdir().expect("Failed to create temporary directory");
    let path = dir.path().join("dismissed.toml");
    let (manager, _) = manual_manager(ManagerConfig::default());

    let memory = DismissMemory::new(Arc::new(FileStore::new(&path)));
    let id = memory
        .show_unless_dismissed(&manager, FeedbackKind::Banner, "welcome", FeedbackOptions::new())
        .expect("add")
        .expect("shown the first time");
    assert!(memory.dismiss(&manager, &id, "welcome"));

    let reopened = DismissMemory::new(Arc::new(FileStore::new(&path)));
    assert!(!reopened.should_show("welcome"));
    assert!(reopened.dismissed_at("welcome").is_some());
}

#[test]
fn lifecycle_events_reach_diagnostics() {
    let (manager, clock) = manual_manager(ManagerConfig::default());
    let mut collector = DiagnosticsCollector::new(BufferCapacity::default());
    manager.set_diagnostics(collector.handle());

    manager
        .add(FeedbackKind::Toast, FeedbackOptions::new())
        .expect("add");
    clock.advance(Duration::from_secs(10));
    collector.process_pending();

    assert!(collector.len() >= 4);
    let json = collector.export_json().expect("export");
    assert!(json.contains("\"added\""));
    assert!(json.contains("\"removed\""));
}

#[test]
fn context_scope_reaches_manager() {
    let (manager, _) = manual_manager(ManagerConfig::default());
    assert!(context::use_feedback().is_err());

    let _scope = context::provide(manager.clone());
    let id = context::with_feedback(|fb| fb.add(FeedbackKind::Alert, FeedbackOptions::new()))
        .expect("in scope")
        .expect("add");
    assert!(manager.get(&id).is_some());
}
