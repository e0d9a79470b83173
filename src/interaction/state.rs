use crate::ir::{ConnectionId, Point};

/// What the rendering surface reported under the pointer. Connection hits
/// are only a hint; the controller re-resolves them geometrically.
#[derive(Debug, Clone, PartialEq)]
pub enum HitTarget {
    Canvas,
    Block(String),
    Connection(ConnectionId),
}

/// Pointer input in screen coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum PointerEvent {
    Down { pos: Point, target: HitTarget },
    Move { pos: Point },
    Up { pos: Point },
    Leave,
    DoubleClick { pos: Point, target: HitTarget },
    Wheel {
        pos: Point,
        delta: Point,
        /// Ctrl/Cmd held: zoom instead of pan.
        zoom_modifier: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Selection {
    #[default]
    None,
    Block(String),
    Connection(ConnectionId),
}

/// The single active pointer mode.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum InteractionState {
    #[default]
    Idle,
    Panning {
        last: Point,
    },
    DraggingBlock {
        block_id: String,
        /// Block position when the drag started.
        origin: Point,
        pointer_start: Point,
        /// Set once the pointer travels past the drag threshold.
        moved: bool,
    },
    DraggingNode {
        id: ConnectionId,
        /// Interior point index.
        index: usize,
        pointer_start: Point,
        /// The point's offset when the drag started.
        baseline: Point,
        /// Set once the pointer travels past the drag threshold.
        moved: bool,
    },
}

impl InteractionState {
    pub fn is_idle(&self) -> bool {
        matches!(self, InteractionState::Idle)
    }

    pub fn is_dragging(&self) -> bool {
        matches!(
            self,
            InteractionState::DraggingBlock { .. } | InteractionState::DraggingNode { .. }
        )
    }
}
