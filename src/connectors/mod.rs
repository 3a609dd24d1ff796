//! # Connection Renderer
//!
//! Derives every line drawn between cards from the relationships and the
//! current position map.
//!
//! ```text
//!   ┌───┐        ┌───┐
//!   │ A ├───●────┤ B │      spouse line + marker, once per pair
//!   └───┘   │    └───┘
//!           │ trunk
//!     ┌─────┴─────┐         bar over all routed children
//!     │ stem      │ stem
//!   ┌─┴─┐       ┌─┴─┐
//!   │ C │       │ D │
//!   └───┘       └───┘
//! ```
//!
//! Children of a couple are routed through the couple's marker. Every
//! `(parent, child)` edge consumed that way is remembered, and only the
//! parent edges left over get an independent elbow. An edge with an endpoint
//! missing from the position map is skipped and reported.

mod anchors;
mod path;

use std::collections::BTreeSet;

use hashbrown::HashSet;

use crate::config::{CanvasConfig, LayoutConfig};
use crate::diagnostics::{self, DiagnosticEvent, DiagnosticsHandle};
use crate::kinship::Kinship;
use crate::model::{Person, PersonId, Point, PositionMap, Relationship, Size};

pub use anchors::CardAnchors;
pub use path::{Connector, ConnectorKind, PolylinePoints, Shape};

/// Stateless connector builder.
#[derive(Clone)]
pub struct ConnectionRenderer {
    card: Size,
    marker_radius: f64,
    bar_offset: f64,
    diagnostics: DiagnosticsHandle,
}

impl ConnectionRenderer {
    pub fn new(layout: &LayoutConfig, canvas: &CanvasConfig) -> Self {
        Self {
            card: layout.card_size(),
            marker_radius: canvas.marker_radius,
            bar_offset: canvas.bar_offset,
            diagnostics: diagnostics::noop(),
        }
    }

    pub fn with_diagnostics(mut self, diagnostics: DiagnosticsHandle) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    pub fn card_size(&self) -> Size {
        self.card
    }

    /// Build all connectors for `positions`.
    ///
    /// Output order is stable: per spouse pair (sorted) the spouse line, its
    /// marker and the couple's child routes, then the leftover parent edges
    /// sorted by parent and child.
    pub fn render(
        &self,
        people: &[Person],
        relationships: &[Relationship],
        positions: &PositionMap,
    ) -> Vec<Connector> {
        let kin = Kinship::build(people, relationships, self.diagnostics.as_ref());
        let pairs = kin.spouse_pairs();

        let mut out = Vec::new();
        let mut consumed: HashSet<(&PersonId, &PersonId)> = HashSet::new();
        let mut claimed: HashSet<&PersonId> = HashSet::new();

        for (a, b) in &pairs {
            let (Some(pa), Some(pb)) = (self.center(positions, a), self.center(positions, b)) else {
                self.missing(a, b);
                continue;
            };

            let (left, right) = if pb.x < pa.x { (pb, pa) } else { (pa, pb) };
            let from = CardAnchors::new(left, self.card).mid_right;
            let to = CardAnchors::new(right, self.card).mid_left;
            let marker = from.midpoint(to);

            out.push(Connector::polyline(
                ConnectorKind::Spouse { a: a.clone(), b: b.clone() },
                spouse_line(from, to),
            ));
            out.push(Connector::marker(
                ConnectorKind::SpouseMarker { a: a.clone(), b: b.clone() },
                marker,
                self.marker_radius,
            ));

            let mut tops: Vec<(&PersonId, Point)> = Vec::new();
            for child in couple_children(&kin, a, b, &mut claimed) {
                consumed.insert((a, child));
                consumed.insert((b, child));
                match self.center(positions, child) {
                    Some(c) => tops.push((child, CardAnchors::new(c, self.card).top)),
                    None => self.missing(a, child),
                }
            }
            self.route_children(&mut out, (a, b), marker, tops);
        }

        for (parent, child) in kin.parent_edges() {
            if consumed.contains(&(parent, child)) {
                continue;
            }
            let (Some(p), Some(c)) = (self.center(positions, parent), self.center(positions, child)) else {
                self.missing(parent, child);
                continue;
            };
            let start = CardAnchors::new(p, self.card).bottom;
            let end = CardAnchors::new(c, self.card).top;
            out.push(Connector::polyline(
                ConnectorKind::ParentChild { parent: parent.clone(), child: child.clone() },
                elbow(start, end, (start.y + end.y) / 2.0),
            ));
        }

        out
    }

    fn route_children(
        &self,
        out: &mut Vec<Connector>,
        (a, b): (&PersonId, &PersonId),
        marker: Point,
        mut tops: Vec<(&PersonId, Point)>,
    ) {
        let parents = || (a.clone(), b.clone());
        match tops.len() {
            0 => {}
            1 => {
                let (child, top) = tops[0];
                out.push(Connector::polyline(
                    ConnectorKind::CoupleChild { parents: parents(), child: child.clone() },
                    elbow(marker, top, (marker.y + top.y) / 2.0),
                ));
            }
            _ => {
                tops.sort_by(|l, r| l.1.x.total_cmp(&r.1.x).then_with(|| l.0.cmp(r.0)));
                let highest = tops.iter().map(|(_, t)| t.y).fold(f64::INFINITY, f64::min);
                let mut bar_y = highest - self.bar_offset;
                if bar_y <= marker.y {
                    bar_y = (marker.y + highest) / 2.0;
                }
                let lo = tops[0].1.x;
                let hi = tops[tops.len() - 1].1.x;

                out.push(Connector::polyline(
                    ConnectorKind::Trunk { parents: parents() },
                    [marker, Point::new(marker.x, bar_y)],
                ));
                out.push(Connector::polyline(
                    ConnectorKind::Bar { parents: parents() },
                    [Point::new(lo, bar_y), Point::new(hi, bar_y)],
                ));
                if marker.x < lo || marker.x > hi {
                    let near = if marker.x < lo { lo } else { hi };
                    out.push(Connector::polyline(
                        ConnectorKind::BarLink { parents: parents() },
                        [Point::new(marker.x, bar_y), Point::new(near, bar_y)],
                    ));
                }
                for (child, top) in &tops {
                    out.push(Connector::polyline(
                        ConnectorKind::Stem { parents: parents(), child: (*child).clone() },
                        [Point::new(top.x, bar_y), *top],
                    ));
                }
            }
        }
    }

    fn center(&self, positions: &PositionMap, id: &PersonId) -> Option<Point> {
        positions.get(id).map(|p| p.center()).filter(|p| p.is_finite())
    }

    fn missing(&self, from: &PersonId, to: &PersonId) {
        self.diagnostics.record(DiagnosticEvent::MissingPosition { from: from.clone(), to: to.clone() });
    }
}

impl Default for ConnectionRenderer {
    fn default() -> Self {
        Self::new(&LayoutConfig::default(), &CanvasConfig::default())
    }
}

/// Children routed through the `(a, b)` marker.
///
/// A child qualifies when both partners are among its recorded parents. A
/// child with fewer than two recorded parents also qualifies, but only for
/// the first pair that asks for it.
fn couple_children<'k>(
    kin: &'k Kinship,
    a: &PersonId,
    b: &PersonId,
    claimed: &mut HashSet<&'k PersonId>,
) -> Vec<&'k PersonId> {
    let union: BTreeSet<&PersonId> = [kin.children_of(a), kin.children_of(b)]
        .into_iter()
        .flatten()
        .flatten()
        .collect();

    union
        .into_iter()
        .filter(|child| {
            let Some(parents) = kin.parents_of(child) else { return false };
            if parents.contains(a) && parents.contains(b) {
                true
            } else {
                kin.parent_count(child) < 2 && claimed.insert(*child)
            }
        })
        .collect()
}

/// Straight when both cards share a row; after a manual move that broke the
/// row, across to the middle, up or down, and across again.
fn spouse_line(from: Point, to: Point) -> PolylinePoints {
    if from.y == to.y {
        return PolylinePoints::from_slice(&[from, to]);
    }
    let mid_x = (from.x + to.x) / 2.0;
    PolylinePoints::from_slice(&[from, Point::new(mid_x, from.y), Point::new(mid_x, to.y), to])
}

/// Orthogonal elbow: down from `start` to `mid_y`, across, down into `end`.
fn elbow(start: Point, end: Point, mid_y: f64) -> PolylinePoints {
    PolylinePoints::from_slice(&[
        start,
        Point::new(start.x, mid_y),
        Point::new(end.x, mid_y),
        end,
    ])
}
