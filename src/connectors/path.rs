//! Drawable connector primitives.

use std::fmt::Write;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::model::{PersonId, Point};

/// Points of an orthogonal polyline. Elbows have four, everything else two.
pub type PolylinePoints = SmallVec<[Point; 4]>;

/// What a connector stands for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConnectorKind {
    /// Horizontal line between two spouses.
    Spouse { a: PersonId, b: PersonId },
    /// Glyph at the middle of a spouse line.
    SpouseMarker { a: PersonId, b: PersonId },
    /// Elbow from a couple's marker to their only routed child.
    CoupleChild { parents: (PersonId, PersonId), child: PersonId },
    /// Vertical drop from a couple's marker to the sibling bar.
    Trunk { parents: (PersonId, PersonId) },
    /// Horizontal line spanning all routed children of a couple.
    Bar { parents: (PersonId, PersonId) },
    /// Joins the trunk to the bar when the trunk misses the bar's span.
    BarLink { parents: (PersonId, PersonId) },
    /// Short drop from the bar into one child.
    Stem { parents: (PersonId, PersonId), child: PersonId },
    /// Independent elbow for a parent edge not covered by couple routing.
    ParentChild { parent: PersonId, child: PersonId },
}

/// Geometry of a connector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Polyline(PolylinePoints),
    Marker { center: Point, radius: f64 },
}

/// One drawable connector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connector {
    pub kind: ConnectorKind,
    pub shape: Shape,
}

impl Connector {
    pub fn polyline(kind: ConnectorKind, points: impl IntoIterator<Item = Point>) -> Self {
        Self { kind, shape: Shape::Polyline(points.into_iter().collect()) }
    }

    pub fn marker(kind: ConnectorKind, center: Point, radius: f64) -> Self {
        Self { kind, shape: Shape::Marker { center, radius } }
    }

    pub fn points(&self) -> &[Point] {
        match &self.shape {
            Shape::Polyline(points) => points,
            Shape::Marker { .. } => &[],
        }
    }

    pub fn is_marker(&self) -> bool {
        matches!(self.shape, Shape::Marker { .. })
    }

    /// SVG path data (`M x y L x y …`); `None` for markers.
    pub fn svg_path(&self) -> Option<String> {
        let Shape::Polyline(points) = &self.shape else {
            return None;
        };
        let mut d = String::new();
        for (i, p) in points.iter().enumerate() {
            let cmd = if i == 0 { 'M' } else { 'L' };
            if i > 0 {
                d.push(' ');
            }
            let _ = write!(d, "{cmd}{} {}", p.x, p.y);
        }
        Some(d)
    }

    /// True when every segment is horizontal or vertical.
    pub fn is_orthogonal(&self) -> bool {
        self.points()
            .windows(2)
            .all(|w| w[0].x == w[1].x || w[0].y == w[1].y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_svg_path_data() {
        let c = Connector::polyline(
            ConnectorKind::ParentChild { parent: "p".into(), child: "c".into() },
            [Point::new(0.0, 90.0), Point::new(0.0, 140.0), Point::new(210.5, 140.0)],
        );
        assert_eq!(c.svg_path().as_deref(), Some("M0 90 L0 140 L210.5 140"));
        assert!(c.is_orthogonal());

        let m = Connector::marker(
            ConnectorKind::SpouseMarker { a: "a".into(), b: "b".into() },
            Point::ZERO,
            6.0,
        );
        assert!(m.svg_path().is_none());
        assert!(m.points().is_empty());
    }
}
