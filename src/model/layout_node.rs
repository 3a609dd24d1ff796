//! Computed placements and the position map renderers read.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{PersonId, Point};

/// Placement of one person. `depth` is the generational row, 0 at the top.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutNode {
    pub person_id: PersonId,
    pub x: f64,
    pub y: f64,
    pub depth: u32,
}

impl LayoutNode {
    pub fn new(person_id: impl Into<PersonId>, x: f64, y: f64, depth: u32) -> Self {
        Self { person_id: person_id.into(), x, y, depth }
    }

    pub fn center(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn position(&self) -> Position {
        Position { x: self.x, y: self.y, depth: self.depth }
    }
}

/// Position entry in a [`PositionMap`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub depth: u32,
}

impl Position {
    pub fn center(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// `person id → position`, ordered so every consumer iterates identically.
pub type PositionMap = BTreeMap<PersonId, Position>;

/// Build a position map from a node slice. Later duplicates win.
pub fn positions_of(nodes: &[LayoutNode]) -> PositionMap {
    nodes
        .iter()
        .map(|n| (n.person_id.clone(), n.position()))
        .collect()
}
