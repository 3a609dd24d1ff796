//! # Family tree canvas
//!
//! Owns the authoritative `LayoutNode` array and everything interactive
//! around it: pan/zoom, selection, card dragging, keyboard nudging and
//! auto-fit. The host feeds it pointer, key and wheel events and draws
//! whatever [`FamilyTreeCanvas::cards`] and
//! [`FamilyTreeCanvas::connectors`] return.
//!
//! ## Dragging
//!
//! A drag never touches the node array until pointer-up. While it runs, the
//! dragged card lives in a transient override map that
//! [`FamilyTreeCanvas::positions`] merges over the nodes. Pointer moves only
//! record the latest pointer and request an animation frame; the override
//! is recomputed once per frame in [`FamilyTreeCanvas::animation_frame`].
//!
//! ## Clicks
//!
//! Any gesture that travelled further than the drag threshold (dragging a
//! card or panning) arms a short window in which clicks are swallowed, so
//! releasing a drag over a card does not also select it.

pub mod fit;
pub mod host;
pub mod interaction;
pub mod viewport;

use std::sync::Arc;

use hashbrown::HashMap;

use crate::card::{CardIntent, CardRenderer, PersonCard};
use crate::config::TreeConfig;
use crate::connectors::{ConnectionRenderer, Connector};
use crate::diagnostics::{self, DiagnosticsHandle};
use crate::layout::LayoutEngine;
use crate::model::{
    LayoutNode, Person, PersonId, Point, Position, PositionMap, Relationship, Size, TreeVersion, ViewMeta,
};
use crate::Result;

pub use fit::{content_bounds, fit_view, FitParams};
pub use host::{CanvasCallbacks, NoopCallbacks, NoopHost, PlatformHost};
pub use interaction::{DragSession, Key, PointerState};
pub use viewport::Viewport;

/// Interactive tree view.
pub struct FamilyTreeCanvas {
    config: TreeConfig,
    engine: LayoutEngine,
    renderer: ConnectionRenderer,
    cards: CardRenderer,
    host: Arc<dyn PlatformHost>,
    callbacks: Arc<dyn CanvasCallbacks>,
    diagnostics: DiagnosticsHandle,

    people: Vec<Person>,
    person_index: HashMap<PersonId, usize>,
    relationships: Vec<Relationship>,
    nodes: Vec<LayoutNode>,

    overrides: HashMap<PersonId, Point>,
    viewport: Viewport,
    pointer: PointerState,
    session: Option<DragSession>,
    frame_pending: bool,
    latest_pointer: Option<Point>,
    suppress_click_until: f64,
    selected: Option<PersonId>,
    /// Auto-fit is owed once the viewport has a size.
    fit_pending: bool,
    fitted_once: bool,
}

impl FamilyTreeCanvas {
    pub fn new(config: TreeConfig) -> Self {
        let diagnostics = diagnostics::noop();
        Self {
            engine: LayoutEngine::new(config.layout),
            renderer: ConnectionRenderer::new(&config.layout, &config.canvas),
            cards: CardRenderer::new(config.layout.card_size()),
            config,
            host: Arc::new(NoopHost),
            callbacks: Arc::new(NoopCallbacks),
            diagnostics,
            people: Vec::new(),
            person_index: HashMap::new(),
            relationships: Vec::new(),
            nodes: Vec::new(),
            overrides: HashMap::new(),
            viewport: Viewport::default(),
            pointer: PointerState::Idle,
            session: None,
            frame_pending: false,
            latest_pointer: None,
            suppress_click_until: f64::NEG_INFINITY,
            selected: None,
            fit_pending: false,
            fitted_once: false,
        }
    }

    pub fn with_host(mut self, host: Arc<dyn PlatformHost>) -> Self {
        self.host = host;
        self
    }

    pub fn with_callbacks(mut self, callbacks: Arc<dyn CanvasCallbacks>) -> Self {
        self.callbacks = callbacks;
        self
    }

    pub fn with_diagnostics(mut self, diagnostics: DiagnosticsHandle) -> Self {
        self.engine = self.engine.clone().with_diagnostics(diagnostics.clone());
        self.renderer = self.renderer.clone().with_diagnostics(diagnostics.clone());
        self.diagnostics = diagnostics;
        self
    }

    // ========================================================================
    // Data & layout
    // ========================================================================

    /// Replace people and relationships and lay the tree out from scratch.
    ///
    /// Manual moves are discarded. The first call that yields at least one
    /// node schedules an auto-fit.
    pub fn set_data(&mut self, people: Vec<Person>, relationships: Vec<Relationship>) {
        self.cancel_transient();
        self.person_index = people.iter().enumerate().map(|(i, p)| (p.id.clone(), i)).collect();
        self.people = people;
        self.relationships = relationships;
        self.cards.clear();
        if let Some(id) = &self.selected {
            if !self.person_index.contains_key(id) {
                self.selected = None;
            }
        }
        self.relayout();
        if !self.fitted_once && !self.nodes.is_empty() {
            self.fit_pending = true;
            self.try_pending_fit();
        }
    }

    /// Recompute the layout with the current spacing, discarding manual
    /// moves.
    pub fn relayout(&mut self) {
        self.cancel_transient();
        self.nodes = self.engine.generate_layout(&self.people, &self.relationships).nodes;
    }

    /// Change spacing and lay out again.
    pub fn set_gaps(&mut self, h_gap: f64, v_gap: f64) {
        self.config.layout.h_gap = h_gap.max(0.0);
        self.config.layout.v_gap = v_gap.max(0.0);
        self.engine = LayoutEngine::new(self.config.layout).with_diagnostics(self.diagnostics.clone());
        self.relayout();
    }

    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    pub fn people(&self) -> &[Person] {
        &self.people
    }

    pub fn relationships(&self) -> &[Relationship] {
        &self.relationships
    }

    /// Committed nodes, without any in-flight drag.
    pub fn nodes(&self) -> &[LayoutNode] {
        &self.nodes
    }

    /// Current positions with the drag override merged in.
    pub fn positions(&self) -> PositionMap {
        self.nodes
            .iter()
            .map(|n| {
                let pos = match self.overrides.get(&n.person_id) {
                    Some(p) => Position { x: p.x, y: p.y, depth: n.depth },
                    None => n.position(),
                };
                (n.person_id.clone(), pos)
            })
            .collect()
    }

    pub fn position_of(&self, id: &PersonId) -> Option<Point> {
        if let Some(p) = self.overrides.get(id) {
            return Some(*p);
        }
        self.node(id).map(LayoutNode::center)
    }

    fn node(&self, id: &PersonId) -> Option<&LayoutNode> {
        self.nodes.iter().find(|n| &n.person_id == id)
    }

    fn commit_position(&mut self, id: &PersonId, position: Point) {
        if let Some(node) = self.nodes.iter_mut().find(|n| &n.person_id == id) {
            node.x = position.x;
            node.y = position.y;
        }
    }

    // ========================================================================
    // Rendering
    // ========================================================================

    /// One card per node, memoized: only cards whose position, selection or
    /// dragging flag changed are rebuilt.
    pub fn cards(&mut self) -> Vec<Arc<PersonCard>> {
        let dragging = self.pointer.dragging().cloned();
        let mut out = Vec::with_capacity(self.nodes.len());
        for node in &self.nodes {
            let Some(&idx) = self.person_index.get(&node.person_id) else { continue };
            let center = self.overrides.get(&node.person_id).copied().unwrap_or(node.center());
            let selected = self.selected.as_ref() == Some(&node.person_id);
            let is_dragging = dragging.as_ref() == Some(&node.person_id);
            out.push(self.cards.render(&self.people[idx], center, selected, is_dragging));
        }
        out
    }

    /// Number of card rebuilds so far.
    pub fn card_render_count(&self) -> u64 {
        self.cards.render_count()
    }

    pub fn connectors(&self) -> Vec<Connector> {
        self.renderer.render(&self.people, &self.relationships, &self.positions())
    }

    pub fn card_size(&self) -> Size {
        self.config.layout.card_size()
    }

    // ========================================================================
    // Viewport
    // ========================================================================

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn zoom(&self) -> f64 {
        self.viewport.zoom
    }

    pub fn pan(&self) -> Point {
        self.viewport.pan
    }

    pub fn screen_to_canvas(&self, screen: Point) -> Point {
        self.viewport.screen_to_canvas(screen)
    }

    pub fn canvas_to_screen(&self, canvas: Point) -> Point {
        self.viewport.canvas_to_screen(canvas)
    }

    /// The host reports the visible size. Runs a deferred auto-fit.
    pub fn resize(&mut self, size: Size) {
        self.viewport.size = size;
        self.try_pending_fit();
    }

    /// Wheel zoom about the cursor. Negative `delta_y` zooms in.
    pub fn wheel(&mut self, pointer: Point, delta_y: f64) {
        if delta_y == 0.0 {
            return;
        }
        let step = self.config.canvas.zoom_step;
        let factor = if delta_y < 0.0 { step } else { 1.0 / step };
        self.zoom_about(pointer, self.viewport.zoom * factor);
    }

    pub fn zoom_in(&mut self) {
        let center = self.viewport.screen_center();
        self.zoom_about(center, self.viewport.zoom * self.config.canvas.zoom_step);
    }

    pub fn zoom_out(&mut self) {
        let center = self.viewport.screen_center();
        self.zoom_about(center, self.viewport.zoom / self.config.canvas.zoom_step);
    }

    fn zoom_about(&mut self, anchor: Point, zoom: f64) {
        let c = &self.config.canvas;
        self.viewport.zoom_about(anchor, zoom, c.min_zoom, c.max_zoom);
    }

    /// Zoom 1, no pan.
    pub fn reset_view(&mut self) {
        self.viewport.reset();
    }

    /// Fit the current positions into the viewport. Returns false when
    /// there is nothing to fit or the viewport has no size yet.
    pub fn fit_to_view(&mut self) -> bool {
        let centers: Vec<Point> = self.positions().values().map(Position::center).collect();
        let c = &self.config.canvas;
        let params = FitParams {
            card: self.config.layout.card_size(),
            padding: c.fit_padding,
            min_zoom: c.fit_min_zoom,
            max_zoom: c.fit_max_zoom,
        };
        match fit_view(&centers, self.viewport.size, &params) {
            Some((zoom, pan)) => {
                self.viewport.zoom = zoom;
                self.viewport.pan = pan;
                true
            }
            None => false,
        }
    }

    fn try_pending_fit(&mut self) {
        if self.fit_pending && self.fit_to_view() {
            self.fit_pending = false;
            self.fitted_once = true;
        }
    }

    // ========================================================================
    // Grid
    // ========================================================================

    pub fn toggle_grid(&mut self) -> bool {
        self.config.canvas.show_grid = !self.config.canvas.show_grid;
        self.config.canvas.show_grid
    }

    pub fn set_snap_to_grid(&mut self, snap: bool) {
        self.config.canvas.snap_to_grid = snap;
    }

    pub fn set_grid_pitch(&mut self, pitch: f64) {
        if pitch.is_finite() && pitch > 0.0 {
            self.config.canvas.grid_pitch = pitch;
        }
    }

    fn snap(&self, p: Point) -> Point {
        if self.config.canvas.snap_to_grid { p.snap(self.config.canvas.grid_pitch) } else { p }
    }

    // ========================================================================
    // Pointer
    // ========================================================================

    pub fn pointer_state(&self) -> &PointerState {
        &self.pointer
    }

    pub fn drag_session_active(&self) -> bool {
        self.session.is_some()
    }

    /// Pointer pressed on empty canvas: start panning.
    pub fn pointer_down_canvas(&mut self, pointer: Point) {
        self.cancel_transient();
        self.pointer = PointerState::Panning { last: pointer, origin: pointer, moved: false };
    }

    /// Pointer pressed on a card: arm a drag. Unknown ids are ignored.
    pub fn pointer_down_card(&mut self, person_id: &PersonId, pointer: Point) {
        let Some(start_position) = self.node(person_id).map(LayoutNode::center) else {
            return;
        };
        self.cancel_transient();
        self.session = Some(DragSession::begin(Arc::clone(&self.host)));
        self.pointer = PointerState::PendingDrag {
            person_id: person_id.clone(),
            start_pointer: pointer,
            start_position,
        };
    }

    pub fn pointer_move(&mut self, pointer: Point) {
        let threshold = self.config.canvas.drag_threshold_px;
        match &mut self.pointer {
            PointerState::Idle => {}
            PointerState::Panning { last, origin, moved } => {
                let delta = pointer - *last;
                *last = pointer;
                if (pointer - *origin).length() > threshold {
                    *moved = true;
                }
                self.viewport.pan_by(delta);
            }
            PointerState::PendingDrag { person_id, start_pointer, start_position } => {
                if (pointer - *start_pointer).length() > threshold {
                    self.pointer = PointerState::Dragging {
                        person_id: person_id.clone(),
                        start_pointer: *start_pointer,
                        start_position: *start_position,
                    };
                    self.schedule_frame(pointer);
                }
            }
            PointerState::Dragging { .. } => self.schedule_frame(pointer),
        }
    }

    fn schedule_frame(&mut self, pointer: Point) {
        self.latest_pointer = Some(pointer);
        if !self.frame_pending {
            self.frame_pending = true;
            self.host.request_animation_frame();
        }
    }

    pub fn frame_pending(&self) -> bool {
        self.frame_pending
    }

    /// Apply the latest pointer position to the dragged card.
    pub fn animation_frame(&mut self) {
        self.frame_pending = false;
        if let Some(pointer) = self.latest_pointer.take() {
            self.apply_drag(pointer);
        }
    }

    fn apply_drag(&mut self, pointer: Point) {
        if let PointerState::Dragging { person_id, start_pointer, start_position } = &self.pointer {
            let target = *start_position + (pointer - *start_pointer) / self.viewport.zoom;
            let target = self.snap(target);
            self.overrides.insert(person_id.clone(), target);
        }
    }

    /// Pointer released at `pointer`, `now_ms` on the host clock.
    pub fn pointer_up(&mut self, pointer: Point, now_ms: f64) {
        match std::mem::take(&mut self.pointer) {
            PointerState::Dragging { person_id, start_pointer, start_position } => {
                self.pointer = PointerState::Dragging { person_id: person_id.clone(), start_pointer, start_position };
                self.latest_pointer = None;
                self.apply_drag(pointer);
                if let Some(pos) = self.overrides.remove(&person_id) {
                    self.commit_position(&person_id, pos);
                }
                self.arm_click_suppression(now_ms);
            }
            PointerState::Panning { moved: true, .. } => self.arm_click_suppression(now_ms),
            PointerState::Panning { .. } | PointerState::PendingDrag { .. } | PointerState::Idle => {}
        }
        self.cancel_transient();
    }

    fn arm_click_suppression(&mut self, now_ms: f64) {
        self.suppress_click_until = now_ms + self.config.canvas.click_suppress_ms;
    }

    pub fn click_suppressed(&self, now_ms: f64) -> bool {
        now_ms < self.suppress_click_until
    }

    /// Drop all transient drag state: override, pointer state, pending
    /// frame input and the drag session.
    fn cancel_transient(&mut self) {
        self.overrides.clear();
        self.pointer = PointerState::Idle;
        self.latest_pointer = None;
        self.session = None;
    }

    /// Window lost focus.
    pub fn blur(&mut self) {
        self.cancel_transient();
    }

    /// Page is about to unload.
    pub fn before_unload(&mut self) {
        self.cancel_transient();
    }

    // ========================================================================
    // Clicks & keys
    // ========================================================================

    pub fn selected(&self) -> Option<&PersonId> {
        self.selected.as_ref()
    }

    /// Click on a card. Returns false when the click was swallowed.
    pub fn click(&mut self, person_id: &PersonId, now_ms: f64) -> bool {
        if self.click_suppressed(now_ms) || !self.person_index.contains_key(person_id) {
            return false;
        }
        self.selected = Some(person_id.clone());
        self.callbacks.on_person_select(person_id);
        true
    }

    /// Click on empty canvas clears the selection.
    pub fn click_canvas(&mut self, now_ms: f64) -> bool {
        if self.click_suppressed(now_ms) {
            return false;
        }
        self.selected = None;
        true
    }

    pub fn double_click(&mut self, person_id: &PersonId, now_ms: f64) -> bool {
        if self.click_suppressed(now_ms) || !self.person_index.contains_key(person_id) {
            return false;
        }
        self.callbacks.on_person_view(person_id);
        true
    }

    pub fn edit(&mut self, person_id: &PersonId) {
        if self.person_index.contains_key(person_id) {
            self.callbacks.on_person_edit(person_id);
        }
    }

    /// Route an intent coming from a [`PersonCard`].
    pub fn handle_intent(&mut self, intent: CardIntent, now_ms: f64) {
        match intent {
            CardIntent::DragStart { person_id, pointer } => self.pointer_down_card(&person_id, pointer),
            CardIntent::Select(id) => {
                self.click(&id, now_ms);
            }
            CardIntent::View(id) => {
                self.double_click(&id, now_ms);
            }
            CardIntent::Edit(id) => self.edit(&id),
        }
    }

    /// Returns true when the key was handled.
    ///
    /// Escape clears the selection and cancels any drag in progress.
    /// Arrow keys move the selected card's committed node by one grid pitch
    /// (snapping on) or by the nudge step (snapping off), whatever the
    /// pointer is doing.
    pub fn key_down(&mut self, key: Key) -> bool {
        if key == Key::Escape {
            if !self.pointer.is_idle() {
                self.cancel_transient();
            }
            self.selected = None;
            return true;
        }
        let Some(dir) = key.direction() else { return false };
        let Some(id) = self.selected.clone() else { return false };
        let Some(current) = self.node(&id).map(LayoutNode::center) else { return false };
        let c = &self.config.canvas;
        let step = if c.snap_to_grid { c.grid_pitch } else { c.nudge_step };
        let target = self.snap(current + dir * step);
        self.commit_position(&id, target);
        true
    }

    // ========================================================================
    // Versions
    // ========================================================================

    /// Committed nodes plus the spacing and viewport they were seen with.
    pub fn snapshot(&self) -> (Vec<LayoutNode>, ViewMeta) {
        let meta = ViewMeta {
            h_gap: self.config.layout.h_gap,
            v_gap: self.config.layout.v_gap,
            zoom: self.viewport.zoom,
            pan: self.viewport.pan,
        };
        (self.nodes.clone(), meta)
    }

    /// Replace nodes, spacing and viewport with a saved version.
    ///
    /// Nothing changes if the version fails validation.
    pub fn restore(&mut self, version: &TreeVersion) -> Result<()> {
        version.validate()?;
        self.cancel_transient();
        self.nodes = version.nodes.clone();
        self.config.layout.h_gap = version.meta.h_gap;
        self.config.layout.v_gap = version.meta.v_gap;
        self.engine = LayoutEngine::new(self.config.layout).with_diagnostics(self.diagnostics.clone());
        self.viewport.zoom = version.meta.zoom;
        self.viewport.pan = version.meta.pan;
        self.fit_pending = false;
        self.fitted_once = true;
        Ok(())
    }
}

impl Default for FamilyTreeCanvas {
    fn default() -> Self {
        Self::new(TreeConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn family() -> (Vec<Person>, Vec<Relationship>) {
        let people = vec![Person::new("a", "A"), Person::new("b", "B"), Person::new("c", "C")];
        let rels = vec![
            Relationship::spouse("a", "b"),
            Relationship::parent("a", "c"),
            Relationship::parent("b", "c"),
        ];
        (people, rels)
    }

    fn canvas() -> FamilyTreeCanvas {
        let (people, rels) = family();
        let mut canvas = FamilyTreeCanvas::default();
        canvas.set_data(people, rels);
        canvas
    }

    #[test]
    fn test_pan_moves_one_to_one() {
        let mut canvas = canvas();
        canvas.pointer_down_canvas(Point::new(10.0, 10.0));
        canvas.pointer_move(Point::new(25.0, 5.0));
        canvas.pointer_move(Point::new(40.0, 0.0));
        assert_eq!(canvas.pan(), Point::new(30.0, -10.0));
        canvas.pointer_up(Point::new(40.0, 0.0), 1000.0);
        assert!(canvas.pointer_state().is_idle());
        assert!(canvas.click_suppressed(1100.0));
    }

    #[test]
    fn test_small_pan_does_not_suppress_clicks() {
        let mut canvas = canvas();
        canvas.pointer_down_canvas(Point::ZERO);
        canvas.pointer_move(Point::new(1.0, 1.0));
        canvas.pointer_up(Point::new(1.0, 1.0), 1000.0);
        assert!(!canvas.click_suppressed(1000.0));
    }

    #[test]
    fn test_pending_drag_below_threshold_stays_pending() {
        let mut canvas = canvas();
        let c = PersonId::from("c");
        canvas.pointer_down_card(&c, Point::new(100.0, 100.0));
        canvas.pointer_move(Point::new(102.0, 101.0));
        assert!(matches!(canvas.pointer_state(), PointerState::PendingDrag { .. }));
        assert!(!canvas.frame_pending());
        canvas.pointer_up(Point::new(102.0, 101.0), 0.0);
        assert!(canvas.click(&c, 1.0));
        assert_eq!(canvas.selected(), Some(&c));
    }

    #[test]
    fn test_escape_mid_drag_cancels_and_clears_selection() {
        let mut canvas = canvas();
        let (a, c) = (PersonId::from("a"), PersonId::from("c"));
        canvas.click(&c, 0.0);
        let before = canvas.position_of(&a).unwrap();
        canvas.pointer_down_card(&a, Point::ZERO);
        canvas.pointer_move(Point::new(200.0, 0.0));
        canvas.animation_frame();
        assert_ne!(canvas.position_of(&a), Some(before));

        assert!(canvas.key_down(Key::Escape));
        assert_eq!(canvas.position_of(&a), Some(before));
        assert!(!canvas.drag_session_active());
        assert!(canvas.pointer_state().is_idle());
        assert_eq!(canvas.selected(), None);
    }

    #[test]
    fn test_escape_when_idle_clears_selection() {
        let mut canvas = canvas();
        let c = PersonId::from("c");
        canvas.click(&c, 0.0);
        assert!(canvas.key_down(Key::Escape));
        assert_eq!(canvas.selected(), None);
    }

    #[test]
    fn test_arrow_nudges_while_panning() {
        let mut canvas = canvas();
        let c = PersonId::from("c");
        canvas.click(&c, 0.0);
        let before = canvas.position_of(&c).unwrap();
        canvas.pointer_down_canvas(Point::new(400.0, 400.0));
        assert!(canvas.key_down(Key::ArrowRight));
        assert_eq!(canvas.position_of(&c).unwrap(), (before + Point::new(20.0, 0.0)).snap(20.0));
        assert!(matches!(canvas.pointer_state(), PointerState::Panning { .. }));
    }

    #[test]
    fn test_arrow_nudges_selected_on_grid() {
        let mut canvas = canvas();
        let c = PersonId::from("c");
        canvas.click(&c, 0.0);
        let before = canvas.position_of(&c).unwrap();
        assert!(canvas.key_down(Key::ArrowRight));
        let after = canvas.position_of(&c).unwrap();
        assert_eq!(after, (before + Point::new(20.0, 0.0)).snap(20.0));
    }

    #[test]
    fn test_arrow_without_selection_is_ignored() {
        let mut canvas = canvas();
        assert!(!canvas.key_down(Key::ArrowDown));
    }

    #[test]
    fn test_wheel_zoom_clamped() {
        let mut canvas = canvas();
        for _ in 0..100 {
            canvas.wheel(Point::new(50.0, 50.0), -1.0);
        }
        assert_eq!(canvas.zoom(), 3.0);
        for _ in 0..100 {
            canvas.wheel(Point::new(50.0, 50.0), 1.0);
        }
        assert_eq!(canvas.zoom(), 0.3);
    }

    #[test]
    fn test_set_gaps_relayouts() {
        let mut canvas = canvas();
        canvas.set_gaps(60.0, 200.0);
        let c = canvas.position_of(&"c".into()).unwrap();
        assert_eq!(c.y, 180.0 + 200.0);
    }
}
