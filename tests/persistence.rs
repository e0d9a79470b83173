use std::time::Duration;

use archdiag::config::Config;
use archdiag::interaction::{Controller, HitTarget, PointerEvent};
use archdiag::ir::{Block, ConnectionId, Design};
use archdiag::overrides::Overrides;
use archdiag::persist::{
    FileStore, LayoutStore, SavedLayout, layout_key, load_overrides, save_overrides,
};
use archdiag::schedule::ManualClock;

fn sample_overrides() -> Overrides {
    let id = ConnectionId::from("psu->mcu:VCC#0");
    let mut overrides = Overrides::new();
    overrides.set_block_position("psu", (40.0, 220.0));
    overrides.set_point_offset(&id, 0, (12.0, 0.0));
    overrides.push_waypoint(&id, (300.0, 95.0));
    overrides
}

#[test]
fn file_store_round_trips_a_layout() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = FileStore::new(dir.path().join("layouts"));
    let overrides = sample_overrides();
    save_overrides(&mut store, "rev-3", &overrides).unwrap();

    let path = store.path_for(&layout_key("rev-3"));
    assert!(path.exists());
    let raw = std::fs::read_to_string(&path).unwrap();
    let saved: SavedLayout = serde_json::from_str(&raw).unwrap();
    assert_eq!(saved.version, 1);
    assert_eq!(saved.block_overrides, vec![("psu".to_string(), (40.0, 220.0))]);

    assert_eq!(load_overrides(&store, "rev-3"), overrides);
}

#[test]
fn missing_directory_means_no_saved_layout() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::new(dir.path().join("never-created"));
    assert_eq!(store.load(&layout_key("rev-1")).unwrap(), None);
    assert!(load_overrides(&store, "rev-1").is_empty());
}

#[test]
fn corrupt_file_loads_as_empty() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = FileStore::new(dir.path());
    store.save(&layout_key("rev-2"), "{\"version\": 1, \"block_overrides\": [[\"a\"").unwrap();
    assert!(load_overrides(&store, "rev-2").is_empty());
}

#[test]
fn write_failures_are_not_fatal() {
    // A regular file where the store directory should be makes every save fail.
    let blocker = tempfile::NamedTempFile::new().unwrap();
    let store = FileStore::new(blocker.path());
    let clock = ManualClock::new();
    let mut design = Design::new();
    design.blocks.push(Block::new("a", "A"));
    let mut controller = Controller::new(design, Config::default(), store, clock.clone());
    controller.mount("rev-4");

    controller.handle(PointerEvent::Down {
        pos: (60.0, 60.0),
        target: HitTarget::Block("a".to_string()),
    });
    controller.handle(PointerEvent::Up { pos: (120.0, 60.0) });
    assert!(controller.has_pending_save());
    assert!(controller.flush().is_err());

    controller.handle(PointerEvent::Down {
        pos: (120.0, 60.0),
        target: HitTarget::Block("a".to_string()),
    });
    controller.handle(PointerEvent::Up { pos: (160.0, 60.0) });
    clock.advance(Duration::from_secs(1));
    controller.tick();
    assert!(!controller.has_pending_save());
    assert!(!controller.save_indicator_visible());
    assert_eq!(controller.overrides().block_position("a"), Some((140.0, 40.0)));
}

#[test]
fn switching_designs_flushes_the_previous_one() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::new(dir.path());
    let clock = ManualClock::new();
    let mut design = Design::new();
    design.blocks.push(Block::new("a", "A"));
    let mut controller = Controller::new(design, Config::default(), store, clock);
    controller.mount("first");
    controller.handle(PointerEvent::Down {
        pos: (60.0, 60.0),
        target: HitTarget::Block("a".to_string()),
    });
    controller.handle(PointerEvent::Up { pos: (90.0, 60.0) });
    controller.mount("second");
    assert!(controller.overrides().is_empty());

    let reader = FileStore::new(dir.path());
    assert_eq!(
        load_overrides(&reader, "first").block_position("a"),
        Some((70.0, 40.0))
    );
}
