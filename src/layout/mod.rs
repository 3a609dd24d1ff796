//! # Layout Engine
//!
//! Turns people + parent/spouse edges into generational rows of cards.
//!
//! ```text
//! relationships ──► Kinship ──► depths ──► units per row ──► x/y
//!                                │            │
//!                      cycle breaking   spouse groups, siblings
//!                      + relaxation     ordered under parents
//! ```
//!
//! The pass is a pure function of its inputs. People are processed in id
//! order and every tie is broken on id, so the same family always lands in
//! the same place regardless of the order rows arrived in.

mod depth;
mod placement;

use crate::config::LayoutConfig;
use crate::diagnostics::{self, DiagnosticsHandle};
use crate::kinship::Kinship;
use crate::model::{positions_of, LayoutNode, Person, PositionMap, Relationship};

pub use depth::assign_depths;

/// Result of a layout pass.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Layout {
    /// Sorted by depth, then x.
    pub nodes: Vec<LayoutNode>,
}

impl Layout {
    pub fn positions(&self) -> PositionMap {
        positions_of(&self.nodes)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }
}

/// Deterministic generational layout.
#[derive(Clone)]
pub struct LayoutEngine {
    config: LayoutConfig,
    diagnostics: DiagnosticsHandle,
}

impl LayoutEngine {
    pub fn new(config: LayoutConfig) -> Self {
        Self { config, diagnostics: diagnostics::noop() }
    }

    pub fn with_diagnostics(mut self, diagnostics: DiagnosticsHandle) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Compute one [`LayoutNode`] per person.
    ///
    /// Every person gets a position: connected people sit in the row given
    /// by their generational depth, people without any relationship go to an
    /// overflow row under the deepest generation.
    pub fn generate_layout(&self, people: &[Person], relationships: &[Relationship]) -> Layout {
        let mut people: Vec<Person> = people.to_vec();
        people.sort_by(|a, b| a.id.cmp(&b.id));
        people.dedup_by(|a, b| a.id == b.id);

        let kin = Kinship::build(&people, relationships, self.diagnostics.as_ref());
        let depths = assign_depths(&people, &kin, self.diagnostics.as_ref());
        let mut nodes = placement::place(&people, &kin, &depths, &self.config);

        nodes.sort_by(|a, b| {
            a.depth
                .cmp(&b.depth)
                .then(a.x.total_cmp(&b.x))
                .then_with(|| a.person_id.cmp(&b.person_id))
        });
        Layout { nodes }
    }
}

impl Default for LayoutEngine {
    fn default() -> Self {
        Self::new(LayoutConfig::default())
    }
}

/// Layout with default spacing and no diagnostics.
pub fn generate_layout(people: &[Person], relationships: &[Relationship]) -> Layout {
    LayoutEngine::default().generate_layout(people, relationships)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PersonId;

    fn person(id: &str) -> Person {
        Person::new(id, id.to_uppercase())
    }

    fn node<'a>(layout: &'a Layout, id: &str) -> &'a LayoutNode {
        layout
            .nodes
            .iter()
            .find(|n| n.person_id == PersonId::from(id))
            .unwrap()
    }

    #[test]
    fn test_couple_with_child() {
        let people = vec![person("a"), person("b"), person("c")];
        let rels = vec![
            Relationship::parent("a", "c"),
            Relationship::parent("b", "c"),
            Relationship::spouse("a", "b"),
        ];
        let layout = generate_layout(&people, &rels);
        let cfg = LayoutConfig::default();

        let (a, b, c) = (node(&layout, "a"), node(&layout, "b"), node(&layout, "c"));
        assert_eq!((a.depth, b.depth, c.depth), (0, 0, 1));
        assert_eq!(a.y, b.y);
        assert_eq!((b.x - a.x).abs(), cfg.spouse_pitch());
        assert_eq!(c.y, cfg.row_pitch());
        // the only child is centered under the couple
        assert!((c.x - (a.x + b.x) / 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_depth_takes_deepest_parent() {
        // g → p1 → c, and p2 (a root) → c: c must sit below p1
        let people = vec![person("g"), person("p1"), person("p2"), person("c")];
        let rels = vec![
            Relationship::parent("g", "p1"),
            Relationship::parent("p1", "c"),
            Relationship::parent("p2", "c"),
        ];
        let layout = generate_layout(&people, &rels);
        assert_eq!(node(&layout, "c").depth, 2);
        assert!(node(&layout, "p2").depth < 2);
    }

    #[test]
    fn test_isolated_people_go_to_overflow_row() {
        let people = vec![person("a"), person("b"), person("loner"), person("z")];
        let rels = vec![Relationship::parent("a", "b")];
        let layout = generate_layout(&people, &rels);
        assert_eq!(layout.len(), 4);
        assert_eq!(node(&layout, "loner").depth, 2);
        assert_eq!(node(&layout, "z").depth, 2);
        assert!(node(&layout, "loner").x < node(&layout, "z").x);
    }

    #[test]
    fn test_everyone_isolated_uses_first_row() {
        let people = vec![person("b"), person("a")];
        let layout = generate_layout(&people, &[]);
        assert_eq!(layout.nodes[0].person_id, PersonId::from("a"));
        assert!(layout.nodes.iter().all(|n| n.depth == 0 && n.y == 0.0));
    }

    #[test]
    fn test_input_order_does_not_matter() {
        let people = vec![person("a"), person("b"), person("c"), person("d")];
        let rels = vec![
            Relationship::spouse("a", "b"),
            Relationship::parent("a", "c"),
            Relationship::parent("b", "d"),
            Relationship::parent("a", "d"),
        ];
        let forward = generate_layout(&people, &rels);
        let mut people_rev = people.clone();
        people_rev.reverse();
        let mut rels_rev = rels.clone();
        rels_rev.reverse();
        assert_eq!(forward, generate_layout(&people_rev, &rels_rev));
    }

    #[test]
    fn test_siblings_do_not_overlap() {
        let mut people = vec![person("p")];
        let mut rels = Vec::new();
        for i in 0..5 {
            let id = format!("k{i}");
            people.push(person(&id));
            rels.push(Relationship::parent("p", id.as_str()));
        }
        let layout = generate_layout(&people, &rels);
        let cfg = LayoutConfig::default();
        let row: Vec<&LayoutNode> = layout.nodes.iter().filter(|n| n.depth == 1).collect();
        assert_eq!(row.len(), 5);
        for pair in row.windows(2) {
            assert!(pair[1].x - pair[0].x >= cfg.card_width + cfg.h_gap - 1e-9);
        }
        // parent re-centered over the sibling group
        let mid = (row[0].x + row[4].x) / 2.0;
        assert!((node(&layout, "p").x - mid).abs() < 1e-9);
    }
}
