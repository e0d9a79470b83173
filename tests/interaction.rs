use std::time::Duration;

use archdiag::config::Config;
use archdiag::interaction::{Controller, HitTarget, InteractionState, PointerEvent, Selection};
use archdiag::ir::{Block, Connection, ConnectionId, Design, SignalType};
use archdiag::layout::compute_diagram;
use archdiag::overrides::Overrides;
use archdiag::persist::{MemoryStore, load_overrides, save_overrides};
use archdiag::schedule::ManualClock;

const DESIGN_ID: &str = "design-1";

fn design() -> Design {
    let mut design = Design::new();
    design.blocks.push(Block::new("a", "Source").with_outputs(&["X", "Y"]));
    design.blocks.push(Block::new("b", "Sink").with_inputs(&["X", "Y"]));
    design.blocks.push(Block::new("c", "Spare"));
    design
        .connections
        .push(Connection::new("a", "b", "X", SignalType::Data));
    design
        .connections
        .push(Connection::new("a", "b", "Y", SignalType::Control));
    design
}

fn controller_with(store: MemoryStore) -> (Controller<MemoryStore, ManualClock>, ManualClock) {
    let clock = ManualClock::new();
    let mut controller = Controller::new(design(), Config::default(), store, clock.clone());
    controller.mount(DESIGN_ID);
    (controller, clock)
}

fn controller() -> (Controller<MemoryStore, ManualClock>, ManualClock) {
    controller_with(MemoryStore::new())
}

fn drag_block(controller: &mut Controller<MemoryStore, ManualClock>, id: &str, from: (f32, f32), to: (f32, f32)) {
    controller.handle(PointerEvent::Down {
        pos: from,
        target: HitTarget::Block(id.to_string()),
    });
    controller.handle(PointerEvent::Move { pos: to });
    controller.handle(PointerEvent::Up { pos: to });
}

fn x_id() -> ConnectionId {
    ConnectionId::from("a->b:X#0")
}

fn y_id() -> ConnectionId {
    ConnectionId::from("a->b:Y#0")
}

#[test]
fn missing_record_gives_the_computed_layout() {
    let (mut controller, _clock) = controller();
    assert!(controller.overrides().is_empty());
    let pure = compute_diagram(&design(), &Overrides::new(), &Config::default());
    assert_eq!(controller.diagram(), &pure);
}

#[test]
fn mount_loads_once_per_design() {
    let mut store = MemoryStore::new();
    let mut saved = Overrides::new();
    saved.set_block_position("c", (500.0, 500.0));
    save_overrides(&mut store, DESIGN_ID, &saved).unwrap();

    let (mut controller, _clock) = controller_with(store);
    assert_eq!(controller.overrides(), &saved);
    assert_eq!(controller.diagram().blocks["c"].x, 500.0);

    drag_block(&mut controller, "a", (100.0, 60.0), (130.0, 80.0));
    controller.mount(DESIGN_ID);
    assert!(controller.overrides().block_position("a").is_some());
}

#[test]
fn dragging_a_block_moves_only_that_block() {
    let (mut controller, clock) = controller();
    let before = controller.diagram().clone();
    drag_block(&mut controller, "a", (100.0, 60.0), (130.0, 80.0));

    assert_eq!(controller.overrides().blocks.len(), 1);
    assert_eq!(controller.overrides().block_position("a"), Some((70.0, 60.0)));
    let after = controller.diagram().clone();
    assert_eq!(after.blocks["b"], before.blocks["b"]);
    assert_eq!(after.blocks["c"], before.blocks["c"]);
    assert!(controller.state().is_idle());

    assert!(controller.has_pending_save());
    clock.advance(Duration::from_millis(799));
    controller.tick();
    assert_eq!(controller.store().writes(), 0);
    clock.advance(Duration::from_millis(1));
    controller.tick();
    assert_eq!(controller.store().writes(), 1);
    assert!(controller.save_indicator_visible());
    assert_eq!(
        &load_overrides(controller.store(), DESIGN_ID),
        controller.overrides()
    );
    clock.advance(Duration::from_secs(2));
    assert!(!controller.save_indicator_visible());
}

#[test]
fn small_movements_select_instead_of_dragging() {
    let (mut controller, _clock) = controller();
    drag_block(&mut controller, "a", (100.0, 60.0), (101.0, 61.0));
    assert!(controller.overrides().is_empty());
    assert_eq!(controller.selection(), &Selection::Block("a".to_string()));
    assert!(!controller.has_pending_save());
}

#[test]
fn blocks_cannot_be_dragged_past_the_origin() {
    let (mut controller, _clock) = controller();
    drag_block(&mut controller, "a", (100.0, 60.0), (-400.0, -400.0));
    assert_eq!(controller.overrides().block_position("a"), Some((0.0, 0.0)));
}

#[test]
fn drags_scale_with_zoom() {
    let (mut controller, _clock) = controller();
    controller.set_viewport_size(800.0, 600.0);
    controller.zoom_in();
    let zoom = controller.viewport().zoom;
    let start = controller.viewport().to_screen((100.0, 60.0));
    let end = (start.0 + 24.0, start.1);
    drag_block(&mut controller, "a", start, end);
    let (x, y) = controller.overrides().block_position("a").unwrap();
    assert!((x - (40.0 + 24.0 / zoom)).abs() < 1e-3);
    assert!((y - 40.0).abs() < 1e-3);
}

#[test]
fn edits_inside_the_window_write_once() {
    let (mut controller, clock) = controller();
    drag_block(&mut controller, "a", (100.0, 60.0), (130.0, 80.0));
    clock.advance(Duration::from_millis(500));
    drag_block(&mut controller, "c", (100.0, 170.0), (140.0, 170.0));
    clock.advance(Duration::from_millis(400));
    controller.tick();
    assert_eq!(controller.store().writes(), 0);
    clock.advance(Duration::from_millis(400));
    controller.tick();
    controller.tick();
    assert_eq!(controller.store().writes(), 1);
}

#[test]
fn teardown_cancels_the_pending_write() {
    let (mut controller, clock) = controller();
    drag_block(&mut controller, "a", (100.0, 60.0), (130.0, 80.0));
    controller.teardown();
    clock.advance(Duration::from_secs(5));
    controller.tick();
    assert_eq!(controller.store().writes(), 0);
}

#[test]
fn canvas_drag_pans_and_clears_selection() {
    let (mut controller, _clock) = controller();
    drag_block(&mut controller, "a", (100.0, 60.0), (100.0, 60.0));
    assert_eq!(controller.selection(), &Selection::Block("a".to_string()));

    controller.handle(PointerEvent::Down {
        pos: (700.0, 500.0),
        target: HitTarget::Canvas,
    });
    assert_eq!(controller.selection(), &Selection::None);
    controller.handle(PointerEvent::Move { pos: (650.0, 520.0) });
    controller.handle(PointerEvent::Move { pos: (640.0, 530.0) });
    controller.handle(PointerEvent::Up { pos: (640.0, 530.0) });
    assert_eq!(controller.viewport().pan, (-60.0, 30.0));
    assert!(controller.overrides().is_empty());
}

#[test]
fn leaving_the_canvas_ends_a_drag() {
    let (mut controller, _clock) = controller();
    controller.handle(PointerEvent::Down {
        pos: (100.0, 60.0),
        target: HitTarget::Block("a".to_string()),
    });
    controller.handle(PointerEvent::Move { pos: (160.0, 60.0) });
    controller.handle(PointerEvent::Leave);
    assert!(controller.state().is_idle());
    assert_eq!(controller.overrides().block_position("a"), Some((100.0, 40.0)));
    controller.handle(PointerEvent::Move { pos: (300.0, 300.0) });
    assert_eq!(controller.overrides().block_position("a"), Some((100.0, 40.0)));
}

#[test]
fn wheel_zoom_keeps_the_cursor_fixed() {
    let (mut controller, _clock) = controller();
    let cursor = (300.0, 200.0);
    let before = controller.viewport().to_content(cursor);
    controller.handle(PointerEvent::Wheel {
        pos: cursor,
        delta: (0.0, -100.0),
        zoom_modifier: true,
    });
    assert!(controller.viewport().zoom > 1.0);
    let after = controller.viewport().to_content(cursor);
    assert!((before.0 - after.0).abs() < 1e-3);
    assert!((before.1 - after.1).abs() < 1e-3);
}

#[test]
fn plain_wheel_pans() {
    let (mut controller, _clock) = controller();
    controller.handle(PointerEvent::Wheel {
        pos: (300.0, 200.0),
        delta: (10.0, 40.0),
        zoom_modifier: false,
    });
    assert_eq!(controller.viewport().zoom, 1.0);
    assert_eq!(controller.viewport().pan, (-10.0, -40.0));
}

#[test]
fn zoom_controls_clamp_and_reset() {
    let (mut controller, _clock) = controller();
    controller.set_viewport_size(800.0, 600.0);
    let centre = controller.viewport().to_content((400.0, 300.0));
    controller.zoom_in();
    assert!((controller.viewport().zoom - 1.2).abs() < 1e-5);
    let after = controller.viewport().to_content((400.0, 300.0));
    assert!((centre.0 - after.0).abs() < 1e-3);
    for _ in 0..30 {
        controller.zoom_in();
    }
    assert_eq!(controller.viewport().zoom, 5.0);
    for _ in 0..60 {
        controller.zoom_out();
    }
    assert!((controller.viewport().zoom - 0.2).abs() < 1e-5);
    controller.reset_view();
    assert_eq!(controller.viewport().zoom, 1.0);
    assert_eq!(controller.viewport().pan, (0.0, 0.0));
}

#[test]
fn dragging_an_interior_node_records_an_offset() {
    let (mut controller, _clock) = controller();
    let node = controller.diagram().path(&x_id()).unwrap().points[1];
    controller.handle(PointerEvent::Down {
        pos: node,
        target: HitTarget::Connection(x_id()),
    });
    assert!(matches!(
        controller.state(),
        InteractionState::DraggingNode { index: 0, .. }
    ));
    assert!(controller.state().is_dragging());
    controller.handle(PointerEvent::Move {
        pos: (node.0 + 10.0, node.1),
    });
    controller.handle(PointerEvent::Up {
        pos: (node.0 + 10.0, node.1),
    });
    assert_eq!(controller.overrides().point_offsets(&x_id()), &[(10.0, 0.0)]);
    assert!(controller.has_pending_save());
    let moved = controller.diagram().path(&x_id()).unwrap().points[1];
    assert_eq!(moved, (node.0 + 10.0, node.1));
}

fn drag_node(
    controller: &mut Controller<MemoryStore, ManualClock>,
    id: &ConnectionId,
    from: (f32, f32),
    moves: &[(f32, f32)],
) {
    controller.handle(PointerEvent::Down {
        pos: from,
        target: HitTarget::Connection(id.clone()),
    });
    for pos in moves {
        controller.handle(PointerEvent::Move { pos: *pos });
    }
    let end = moves.last().copied().unwrap_or(from);
    controller.handle(PointerEvent::Up { pos: end });
}

#[test]
fn repeated_node_drags_accumulate() {
    let (mut controller, _clock) = controller();
    let node = controller.diagram().path(&x_id()).unwrap().points[1];

    drag_node(
        &mut controller,
        &x_id(),
        node,
        &[(node.0 + 4.0, node.1), (node.0 + 7.0, node.1), (node.0 + 10.0, node.1)],
    );
    assert_eq!(controller.overrides().point_offsets(&x_id()), &[(10.0, 0.0)]);

    let moved = controller.diagram().path(&x_id()).unwrap().points[1];
    assert_eq!(moved, (node.0 + 10.0, node.1));
    drag_node(
        &mut controller,
        &x_id(),
        moved,
        &[(moved.0 + 2.0, moved.1 + 1.0), (moved.0 + 5.0, moved.1 + 3.0)],
    );
    assert_eq!(controller.overrides().point_offsets(&x_id()), &[(15.0, 3.0)]);
    assert_eq!(
        controller.diagram().path(&x_id()).unwrap().points[1],
        (node.0 + 15.0, node.1 + 3.0)
    );
}

#[test]
fn node_drags_scale_with_zoom() {
    let (mut controller, _clock) = controller();
    controller.set_viewport_size(800.0, 600.0);
    controller.zoom_in();
    let zoom = controller.viewport().zoom;
    let node = controller.diagram().path(&x_id()).unwrap().points[1];
    let start = controller.viewport().to_screen(node);
    drag_node(
        &mut controller,
        &x_id(),
        start,
        &[(start.0 + 12.0, start.1 + 6.0), (start.0 + 24.0, start.1 + 12.0)],
    );
    let offsets = controller.overrides().point_offsets(&x_id());
    assert_eq!(offsets.len(), 1);
    assert!((offsets[0].0 - 24.0 / zoom).abs() < 1e-3);
    assert!((offsets[0].1 - 12.0 / zoom).abs() < 1e-3);
}

#[test]
fn clicking_a_node_without_moving_changes_nothing() {
    let (mut controller, _clock) = controller();
    let node = controller.diagram().path(&x_id()).unwrap().points[1];
    drag_node(&mut controller, &x_id(), node, &[(node.0 + 10.0, node.1)]);
    let offsets = controller.overrides().point_offsets(&x_id()).to_vec();
    assert_eq!(offsets, vec![(10.0, 0.0)]);
    controller.teardown();

    // The second corner still sits at the unmoved channel position.
    let path = controller.diagram().path(&x_id()).unwrap().clone();
    let corner = path.points[2];
    drag_node(&mut controller, &x_id(), corner, &[(corner.0 + 1.0, corner.1)]);
    assert_eq!(controller.overrides().point_offsets(&x_id()), offsets.as_slice());
    assert!(!controller.has_pending_save());
    assert!(controller.state().is_idle());
    assert_eq!(controller.diagram().path(&x_id()).unwrap(), &path);

    let start = path.points[0];
    let click = (start.0 + 10.0, start.1);
    controller.handle(PointerEvent::DoubleClick {
        pos: click,
        target: HitTarget::Connection(x_id()),
    });
    assert_eq!(controller.overrides().waypoints_for(&x_id()), &[click]);
    assert_eq!(
        controller.overrides().point_offsets(&x_id()).len(),
        offsets.len() + 2
    );
    controller.handle(PointerEvent::DoubleClick {
        pos: click,
        target: HitTarget::Connection(x_id()),
    });
    assert!(controller.overrides().waypoints_for(&x_id()).is_empty());
    assert_eq!(controller.overrides().point_offsets(&x_id()), offsets.as_slice());
    assert_eq!(controller.diagram().path(&x_id()).unwrap().points, path.points);
}

#[test]
fn plain_click_on_a_node_leaves_overrides_empty() {
    let (mut controller, _clock) = controller();
    let node = controller.diagram().path(&x_id()).unwrap().points[2];
    drag_node(&mut controller, &x_id(), node, &[]);
    assert!(controller.overrides().is_empty());
    assert!(!controller.has_pending_save());
    assert_eq!(controller.selection(), &Selection::Connection(x_id()));
}

#[test]
fn replacing_the_design_keeps_overrides() {
    let (mut controller, _clock) = controller();
    drag_block(&mut controller, "a", (100.0, 60.0), (130.0, 80.0));
    let mut next = design();
    next.blocks.push(Block::new("d", "Added"));
    controller.set_design(next);
    assert_eq!(controller.design().blocks.len(), 4);
    let diagram = controller.diagram();
    assert_eq!((diagram.blocks["a"].x, diagram.blocks["a"].y), (70.0, 60.0));
    assert!(diagram.blocks.contains_key("d"));
}

#[test]
fn connection_hits_resolve_geometrically() {
    let (mut controller, _clock) = controller();
    let path = controller.diagram().path(&y_id()).unwrap().clone();
    let last = path.points[path.points.len() - 1];
    let near_end = (last.0 - 5.0, last.1);
    controller.handle(PointerEvent::Down {
        pos: near_end,
        target: HitTarget::Connection(x_id()),
    });
    assert_eq!(controller.selection(), &Selection::Connection(y_id()));
    assert!(controller.state().is_idle());
}

#[test]
fn double_click_inserts_and_removes_waypoints() {
    let (mut controller, _clock) = controller();
    let before = controller.diagram().path(&y_id()).unwrap().clone();
    let start = before.points[0];
    let click = (start.0 + 10.0, start.1);

    controller.handle(PointerEvent::DoubleClick {
        pos: click,
        target: HitTarget::Connection(y_id()),
    });
    assert_eq!(controller.overrides().waypoints_for(&y_id()), &[click]);
    let spliced = controller.diagram().path(&y_id()).unwrap().clone();
    assert_eq!(spliced.points.len(), before.points.len() + 2);
    assert!(controller.has_pending_save());

    controller.handle(PointerEvent::DoubleClick {
        pos: click,
        target: HitTarget::Connection(y_id()),
    });
    assert!(controller.overrides().waypoints_for(&y_id()).is_empty());
    assert_eq!(controller.diagram().path(&y_id()).unwrap().points, before.points);
}

#[test]
fn reset_layout_clears_everything() {
    let (mut controller, clock) = controller();
    drag_block(&mut controller, "a", (100.0, 60.0), (130.0, 80.0));
    clock.advance(Duration::from_secs(1));
    controller.tick();
    assert_eq!(controller.store().writes(), 1);

    controller.reset_layout();
    assert!(controller.overrides().is_empty());
    clock.advance(Duration::from_secs(1));
    controller.tick();
    assert_eq!(controller.store().writes(), 2);
    assert!(load_overrides(controller.store(), DESIGN_ID).is_empty());
}
