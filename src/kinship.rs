//! Kinship index: symmetrized adjacency built once from relationship rows.
//!
//! Layout and connector routing both read relationships through this index,
//! so spouse edges are always treated as undirected and parent edges are
//! always `parent → child`, whatever direction the rows were stored in.

use std::collections::{BTreeMap, BTreeSet};

use crate::diagnostics::{DiagnosticEvent, Diagnostics};
use crate::model::{Person, PersonId, Relationship, RelationshipType};

/// Adjacency over parent and spouse edges.
#[derive(Debug, Clone, Default)]
pub struct Kinship {
    /// child → recorded parents
    parents: BTreeMap<PersonId, BTreeSet<PersonId>>,
    /// parent → children
    children: BTreeMap<PersonId, BTreeSet<PersonId>>,
    /// person → spouses (symmetric)
    spouses: BTreeMap<PersonId, BTreeSet<PersonId>>,
}

impl Kinship {
    /// Index `relationships`, keeping only edges whose endpoints are both in
    /// `people`. Self edges and unknown ids are dropped; unknown ids are
    /// reported once each.
    pub fn build(people: &[Person], relationships: &[Relationship], diag: &dyn Diagnostics) -> Self {
        let known: BTreeSet<&PersonId> = people.iter().map(|p| &p.id).collect();
        let mut reported: BTreeSet<PersonId> = BTreeSet::new();
        let mut kin = Kinship::default();

        for rel in relationships {
            if rel.relationship_type == RelationshipType::Other {
                continue;
            }
            let (from, to) = (&rel.from_person_id, &rel.to_person_id);
            let mut missing = false;
            for id in [from, to] {
                if !known.contains(id) {
                    missing = true;
                    if reported.insert(id.clone()) {
                        diag.record(DiagnosticEvent::UnknownPerson { person_id: id.clone() });
                    }
                }
            }
            if missing || from == to {
                continue;
            }
            match rel.relationship_type {
                RelationshipType::Parent => {
                    kin.parents.entry(to.clone()).or_default().insert(from.clone());
                    kin.children.entry(from.clone()).or_default().insert(to.clone());
                }
                RelationshipType::Spouse => {
                    kin.spouses.entry(from.clone()).or_default().insert(to.clone());
                    kin.spouses.entry(to.clone()).or_default().insert(from.clone());
                }
                RelationshipType::Other => {}
            }
        }
        kin
    }

    pub fn parents_of(&self, id: &PersonId) -> Option<&BTreeSet<PersonId>> {
        self.parents.get(id)
    }

    pub fn children_of(&self, id: &PersonId) -> Option<&BTreeSet<PersonId>> {
        self.children.get(id)
    }

    pub fn spouses_of(&self, id: &PersonId) -> Option<&BTreeSet<PersonId>> {
        self.spouses.get(id)
    }

    pub fn parent_count(&self, id: &PersonId) -> usize {
        self.parents.get(id).map_or(0, BTreeSet::len)
    }

    /// True when the person takes part in any parent or spouse edge.
    pub fn is_connected(&self, id: &PersonId) -> bool {
        self.parents.contains_key(id) || self.children.contains_key(id) || self.spouses.contains_key(id)
    }

    /// Unique spouse pairs `(a, b)` with `a < b`, in sorted order.
    pub fn spouse_pairs(&self) -> Vec<(PersonId, PersonId)> {
        let mut pairs = Vec::new();
        for (a, partners) in &self.spouses {
            for b in partners {
                if a < b {
                    pairs.push((a.clone(), b.clone()));
                }
            }
        }
        pairs
    }

    /// Every `(parent, child)` edge, sorted by parent then child.
    pub fn parent_edges(&self) -> impl Iterator<Item = (&PersonId, &PersonId)> {
        self.children
            .iter()
            .flat_map(|(parent, kids)| kids.iter().map(move |child| (parent, child)))
    }
}
