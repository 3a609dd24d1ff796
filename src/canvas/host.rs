//! Seams between the canvas and whatever embeds it.

use crate::model::PersonId;

/// Platform services the canvas needs while running.
///
/// Every method defaults to a no-op, so a headless host only implements
/// what it cares about.
pub trait PlatformHost {
    /// Ask for one call to [`super::FamilyTreeCanvas::animation_frame`] on
    /// the next frame. The canvas never has more than one request
    /// outstanding.
    fn request_animation_frame(&self) {}

    /// Start delivering pointer move/up events from the whole document, not
    /// only the canvas element.
    fn attach_drag_listeners(&self) {}

    fn detach_drag_listeners(&self) {}

    /// Enable or disable text selection on the page.
    fn set_user_select(&self, enabled: bool) {
        let _ = enabled;
    }
}

/// Host that ignores every request.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHost;

impl PlatformHost for NoopHost {}

/// Outbound notifications for the embedding application.
pub trait CanvasCallbacks {
    fn on_person_select(&self, person_id: &PersonId) {
        let _ = person_id;
    }

    fn on_person_edit(&self, person_id: &PersonId) {
        let _ = person_id;
    }

    fn on_person_view(&self, person_id: &PersonId) {
        let _ = person_id;
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCallbacks;

impl CanvasCallbacks for NoopCallbacks {}
