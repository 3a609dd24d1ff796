//! Pointer state machine and the drag session guard.
//!
//! ```text
//!            down on canvas            up
//!   Idle ─────────────────► Panning ────────► Idle
//!    │
//!    │ down on card           move > threshold             up (commit)
//!    └──────────► PendingDrag ────────────────► Dragging ────────────► Idle
//!                     │ up (plain click)
//!                     └──────────────► Idle
//! ```

use std::sync::Arc;

use crate::model::{PersonId, Point};

use super::host::PlatformHost;

/// What the pointer is doing right now.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum PointerState {
    #[default]
    Idle,
    Panning {
        last: Point,
        origin: Point,
        /// Travel exceeded the drag threshold at some point.
        moved: bool,
    },
    PendingDrag {
        person_id: PersonId,
        start_pointer: Point,
        start_position: Point,
    },
    Dragging {
        person_id: PersonId,
        start_pointer: Point,
        start_position: Point,
    },
}

impl PointerState {
    pub fn is_idle(&self) -> bool {
        matches!(self, PointerState::Idle)
    }

    /// Person being dragged, once the drag threshold was crossed.
    pub fn dragging(&self) -> Option<&PersonId> {
        match self {
            PointerState::Dragging { person_id, .. } => Some(person_id),
            _ => None,
        }
    }
}

/// Keys the canvas reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Escape,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Other,
}

impl Key {
    /// Unit direction for arrow keys.
    pub fn direction(self) -> Option<Point> {
        match self {
            Key::ArrowUp => Some(Point::new(0.0, -1.0)),
            Key::ArrowDown => Some(Point::new(0.0, 1.0)),
            Key::ArrowLeft => Some(Point::new(-1.0, 0.0)),
            Key::ArrowRight => Some(Point::new(1.0, 0.0)),
            Key::Escape | Key::Other => None,
        }
    }

    /// Map a DOM `KeyboardEvent.key` value.
    pub fn from_dom(key: &str) -> Self {
        match key {
            "Escape" | "Esc" => Key::Escape,
            "ArrowUp" => Key::ArrowUp,
            "ArrowDown" => Key::ArrowDown,
            "ArrowLeft" => Key::ArrowLeft,
            "ArrowRight" => Key::ArrowRight,
            _ => Key::Other,
        }
    }
}

/// Document-level listeners and disabled text selection for the lifetime
/// of a drag. Dropping the session undoes both.
pub struct DragSession {
    host: Arc<dyn PlatformHost>,
}

impl DragSession {
    pub fn begin(host: Arc<dyn PlatformHost>) -> Self {
        host.attach_drag_listeners();
        host.set_user_select(false);
        Self { host }
    }
}

impl Drop for DragSession {
    fn drop(&mut self) {
        self.host.detach_drag_listeners();
        self.host.set_user_select(true);
    }
}

impl std::fmt::Debug for DragSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DragSession").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct Log(Mutex<Vec<&'static str>>);

    impl PlatformHost for Log {
        fn attach_drag_listeners(&self) {
            self.0.lock().push("attach");
        }
        fn detach_drag_listeners(&self) {
            self.0.lock().push("detach");
        }
        fn set_user_select(&self, enabled: bool) {
            self.0.lock().push(if enabled { "select-on" } else { "select-off" });
        }
    }

    #[test]
    fn test_session_restores_on_drop() {
        let log = Arc::new(Log::default());
        let session = DragSession::begin(log.clone());
        assert_eq!(*log.0.lock(), vec!["attach", "select-off"]);
        drop(session);
        assert_eq!(*log.0.lock(), vec!["attach", "select-off", "detach", "select-on"]);
    }

    #[test]
    fn test_key_mapping() {
        assert_eq!(Key::from_dom("Escape"), Key::Escape);
        assert_eq!(Key::from_dom("ArrowLeft").direction(), Some(Point::new(-1.0, 0.0)));
        assert_eq!(Key::from_dom("a"), Key::Other);
    }
}
