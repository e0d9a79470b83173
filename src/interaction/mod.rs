//! Pointer-driven editing of a computed diagram.
//!
//! [`Controller`] owns the design, the overrides and the viewport. Every
//! pointer event runs through an explicit state machine; every override
//! change schedules a debounced save that the host drives via
//! [`Controller::tick`].

mod hit;
mod state;
mod viewport;

pub use hit::{PathHit, interior_node_at, nearest_path};
pub use state::{HitTarget, InteractionState, PointerEvent, Selection};
pub use viewport::Viewport;

use crate::config::Config;
use crate::ir::{Design, Point};
use crate::layout::{Diagram, compute_diagram, fingerprint, insert_waypoint, remove_waypoint_near};
use crate::overrides::Overrides;
use crate::persist::{LayoutStore, StoreError, load_overrides, save_overrides};
use crate::schedule::{Clock, Debouncer, SaveIndicator};

pub struct Controller<S: LayoutStore, C: Clock> {
    design: Design,
    design_id: Option<String>,
    config: Config,
    overrides: Overrides,
    viewport: Viewport,
    viewport_size: Point,
    state: InteractionState,
    selection: Selection,
    store: S,
    clock: C,
    debouncer: Debouncer,
    indicator: SaveIndicator,
    cache: Option<Diagram>,
}

impl<S: LayoutStore, C: Clock> Controller<S, C> {
    pub fn new(design: Design, config: Config, store: S, clock: C) -> Self {
        let debouncer = Debouncer::new(config.interaction.debounce());
        let indicator = SaveIndicator::new(config.interaction.save_indicator());
        Self {
            design,
            design_id: None,
            config,
            overrides: Overrides::new(),
            viewport: Viewport::default(),
            viewport_size: (0.0, 0.0),
            state: InteractionState::Idle,
            selection: Selection::None,
            store,
            clock,
            debouncer,
            indicator,
            cache: None,
        }
    }

    /// Loads the saved overrides for `design_id`. Mounting the id that is
    /// already mounted keeps the in-memory overrides. Switching ids flushes
    /// a pending save for the previous design first.
    pub fn mount(&mut self, design_id: &str) {
        if self.design_id.as_deref() == Some(design_id) {
            return;
        }
        if self.debouncer.is_pending() {
            self.debouncer.cancel();
            self.flush_logged();
        }
        self.overrides = load_overrides(&self.store, design_id);
        self.design_id = Some(design_id.to_string());
        self.state = InteractionState::Idle;
        self.selection = Selection::None;
    }

    /// Replaces the design, keeping overrides. Overrides for blocks or
    /// connections that no longer exist are kept but have no effect.
    pub fn set_design(&mut self, design: Design) {
        self.design = design;
        self.state = InteractionState::Idle;
    }

    pub fn design(&self) -> &Design {
        &self.design
    }

    pub fn design_id(&self) -> Option<&str> {
        self.design_id.as_deref()
    }

    pub fn overrides(&self) -> &Overrides {
        &self.overrides
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Size of the visible area in screen pixels; the zoom buttons anchor at
    /// its centre.
    pub fn set_viewport_size(&mut self, width: f32, height: f32) {
        self.viewport_size = (width, height);
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn has_pending_save(&self) -> bool {
        self.debouncer.is_pending()
    }

    pub fn save_indicator_visible(&self) -> bool {
        self.indicator.is_visible(self.clock.now())
    }

    /// The diagram for the current design and overrides, recomputed only
    /// when either has changed.
    pub fn diagram(&mut self) -> &Diagram {
        self.refresh();
        self.cache
            .get_or_insert_with(|| compute_diagram(&self.design, &self.overrides, &self.config))
    }

    fn refresh(&mut self) {
        let current = fingerprint(&self.design, &self.overrides);
        if self
            .cache
            .as_ref()
            .is_none_or(|diagram| diagram.fingerprint != current)
        {
            self.cache = Some(compute_diagram(&self.design, &self.overrides, &self.config));
        }
    }

    pub fn handle(&mut self, event: PointerEvent) {
        match event {
            PointerEvent::Down { pos, target } => self.pointer_down(pos, target),
            PointerEvent::Move { pos } => self.pointer_move(pos),
            PointerEvent::Up { pos } => {
                self.pointer_move(pos);
                self.finish_gesture(true);
            }
            PointerEvent::Leave => self.finish_gesture(false),
            PointerEvent::DoubleClick { pos, target } => self.double_click(pos, target),
            PointerEvent::Wheel {
                pos,
                delta,
                zoom_modifier,
            } => self.wheel(pos, delta, zoom_modifier),
        }
    }

    fn pointer_down(&mut self, pos: Point, target: HitTarget) {
        if !self.state.is_idle() {
            return;
        }
        let content = self.viewport.to_content(pos);
        self.refresh();
        let Some(diagram) = self.cache.as_ref() else {
            return;
        };
        match target {
            HitTarget::Block(block_id) => {
                if let Some(block) = diagram.blocks.get(&block_id) {
                    self.state = InteractionState::DraggingBlock {
                        origin: (block.x, block.y),
                        block_id,
                        pointer_start: pos,
                        moved: false,
                    };
                    return;
                }
                self.start_panning(pos);
            }
            HitTarget::Connection(_) => {
                let Some(hit) = nearest_path(diagram, content) else {
                    self.start_panning(pos);
                    return;
                };
                let radius = self.config.interaction.node_hit_radius / self.viewport.zoom;
                let node = diagram
                    .path(&hit.id)
                    .and_then(|path| interior_node_at(path, content, radius));
                if let Some(index) = node {
                    let baseline = self
                        .overrides
                        .point_offsets(&hit.id)
                        .get(index)
                        .copied()
                        .unwrap_or((0.0, 0.0));
                    self.state = InteractionState::DraggingNode {
                        id: hit.id.clone(),
                        index,
                        pointer_start: pos,
                        baseline,
                        moved: false,
                    };
                }
                self.selection = Selection::Connection(hit.id);
            }
            HitTarget::Canvas => self.start_panning(pos),
        }
    }

    fn start_panning(&mut self, pos: Point) {
        self.selection = Selection::None;
        self.state = InteractionState::Panning { last: pos };
    }

    fn pointer_move(&mut self, pos: Point) {
        let zoom = self.viewport.zoom;
        let threshold = self.config.interaction.drag_threshold;
        match &mut self.state {
            InteractionState::Idle => {}
            InteractionState::Panning { last } => {
                let delta = (pos.0 - last.0, pos.1 - last.1);
                *last = pos;
                self.viewport.pan_by(delta);
            }
            InteractionState::DraggingBlock {
                block_id,
                origin,
                pointer_start,
                moved,
            } => {
                let dx = pos.0 - pointer_start.0;
                let dy = pos.1 - pointer_start.1;
                if !*moved && (dx * dx + dy * dy).sqrt() > threshold {
                    *moved = true;
                }
                if *moved {
                    let x = (origin.0 + dx / zoom).max(0.0);
                    let y = (origin.1 + dy / zoom).max(0.0);
                    self.overrides.set_block_position(block_id, (x, y));
                }
            }
            InteractionState::DraggingNode {
                id,
                index,
                pointer_start,
                baseline,
                moved,
            } => {
                let dx = pos.0 - pointer_start.0;
                let dy = pos.1 - pointer_start.1;
                if !*moved && (dx * dx + dy * dy).sqrt() > threshold {
                    *moved = true;
                }
                if *moved {
                    let offset = (baseline.0 + dx / zoom, baseline.1 + dy / zoom);
                    self.overrides.set_point_offset(id, *index, offset);
                }
            }
        }
    }

    /// Ends whatever gesture is active. Pointer-up on an unmoved block selects
    /// it; a pointer leaving the canvas never selects.
    fn finish_gesture(&mut self, released: bool) {
        match std::mem::take(&mut self.state) {
            InteractionState::DraggingBlock {
                block_id, moved, ..
            } => {
                if moved {
                    log::debug!("block {block_id} moved");
                    self.schedule_save();
                } else if released {
                    self.selection = Selection::Block(block_id);
                }
            }
            InteractionState::DraggingNode {
                id, index, moved, ..
            } => {
                if moved {
                    log::debug!("point {index} of {id} moved");
                    self.schedule_save();
                }
            }
            InteractionState::Panning { .. } | InteractionState::Idle => {}
        }
    }

    fn double_click(&mut self, pos: Point, target: HitTarget) {
        if !matches!(target, HitTarget::Connection(_)) {
            return;
        }
        let content = self.viewport.to_content(pos);
        self.refresh();
        let Some(diagram) = self.cache.as_ref() else {
            return;
        };
        let Some(hit) = nearest_path(diagram, content) else {
            return;
        };
        let Some(path) = diagram.path(&hit.id) else {
            return;
        };
        let radius = self.config.interaction.waypoint_remove_radius / self.viewport.zoom;
        let changed = remove_waypoint_near(&mut self.overrides, path, content, radius).is_some()
            || insert_waypoint(
                &mut self.overrides,
                path,
                content,
                self.config.routing.split_inset,
            )
            .is_some();
        self.selection = Selection::Connection(hit.id);
        if changed {
            self.schedule_save();
        }
    }

    fn wheel(&mut self, pos: Point, delta: Point, zoom_modifier: bool) {
        if zoom_modifier {
            let interaction = &self.config.interaction;
            let factor = (1.0 - delta.1 * interaction.wheel_zoom_sensitivity).max(0.1);
            self.viewport
                .zoom_at(pos, factor, interaction.min_zoom, interaction.max_zoom);
        } else {
            self.viewport.pan_by((-delta.0, -delta.1));
        }
    }

    pub fn zoom_in(&mut self) {
        let step = self.config.interaction.zoom_step;
        self.zoom_centred(step);
    }

    pub fn zoom_out(&mut self) {
        let step = self.config.interaction.zoom_step;
        if step > 0.0 {
            self.zoom_centred(1.0 / step);
        }
    }

    fn zoom_centred(&mut self, factor: f32) {
        let centre = (self.viewport_size.0 / 2.0, self.viewport_size.1 / 2.0);
        let interaction = &self.config.interaction;
        self.viewport
            .zoom_at(centre, factor, interaction.min_zoom, interaction.max_zoom);
    }

    pub fn reset_view(&mut self) {
        self.viewport.reset();
    }

    /// Drops every override of the mounted design.
    pub fn reset_layout(&mut self) {
        if self.overrides.is_empty() {
            return;
        }
        self.overrides.clear();
        self.state = InteractionState::Idle;
        log::info!("layout overrides cleared");
        self.schedule_save();
    }

    fn schedule_save(&mut self) {
        if self.design_id.is_none() {
            return;
        }
        self.debouncer.schedule(self.clock.now());
        log::debug!("layout save scheduled");
    }

    /// Runs due timers. Call this from the host's event loop.
    pub fn tick(&mut self) {
        let now = self.clock.now();
        if self.debouncer.take_due(now) {
            self.flush_logged();
        }
    }

    /// Writes the overrides immediately, cancelling any pending save.
    pub fn flush(&mut self) -> Result<(), StoreError> {
        self.debouncer.cancel();
        let Some(design_id) = self.design_id.as_deref() else {
            return Ok(());
        };
        save_overrides(&mut self.store, design_id, &self.overrides)?;
        self.indicator.show(self.clock.now());
        Ok(())
    }

    fn flush_logged(&mut self) {
        if let Err(err) = self.flush() {
            log::warn!("failed to save layout: {err}");
        }
    }

    /// Ends any gesture and cancels a pending save without writing it.
    pub fn teardown(&mut self) {
        self.debouncer.cancel();
        self.indicator.hide();
        self.state = InteractionState::Idle;
    }
}
