//! Relationship (edge) between two people.

use serde::{Deserialize, Serialize};

use super::PersonId;

/// Edge type. Anything other than `parent`/`spouse` is carried as `Other`
/// and ignored by layout and routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationshipType {
    /// `from` is the parent, `to` is the child.
    Parent,
    /// Logically undirected; stored in one direction.
    Spouse,
    #[serde(other)]
    Other,
}

/// A directed, typed edge between two person ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Relationship {
    pub from_person_id: PersonId,
    pub to_person_id: PersonId,
    pub relationship_type: RelationshipType,
}

impl Relationship {
    pub fn new(
        from: impl Into<PersonId>,
        to: impl Into<PersonId>,
        relationship_type: RelationshipType,
    ) -> Self {
        Self {
            from_person_id: from.into(),
            to_person_id: to.into(),
            relationship_type,
        }
    }

    /// `parent` edge: `parent` → `child`.
    pub fn parent(parent: impl Into<PersonId>, child: impl Into<PersonId>) -> Self {
        Self::new(parent, child, RelationshipType::Parent)
    }

    pub fn spouse(a: impl Into<PersonId>, b: impl Into<PersonId>) -> Self {
        Self::new(a, b, RelationshipType::Spouse)
    }

    pub fn is_parent(&self) -> bool {
        self.relationship_type == RelationshipType::Parent
    }

    pub fn is_spouse(&self) -> bool {
        self.relationship_type == RelationshipType::Spouse
    }

    /// The "other" end of the relationship from the given person.
    pub fn other_person(&self, from: &PersonId) -> Option<&PersonId> {
        if *from == self.from_person_id {
            Some(&self.to_person_id)
        } else if *from == self.to_person_id {
            Some(&self.from_person_id)
        } else {
            None
        }
    }

    /// Unordered key for spouse edges, so A–B and B–A collapse.
    pub fn unordered_pair(&self) -> (PersonId, PersonId) {
        if self.from_person_id <= self.to_person_id {
            (self.from_person_id.clone(), self.to_person_id.clone())
        } else {
            (self.to_person_id.clone(), self.from_person_id.clone())
        }
    }
}
