//! # Family Tree Model
//!
//! Plain DTOs shared by layout, routing, cards and the canvas.
//!
//! Design rule: pure data. No I/O, no state, no async.

pub mod geometry;
pub mod person;
pub mod relationship;
pub mod layout_node;
pub mod version;

pub use geometry::{Point, Rect, Size};
pub use person::{Gender, Person, PersonId, PersonRecord, YearOrDate};
pub use relationship::{Relationship, RelationshipType};
pub use layout_node::{positions_of, LayoutNode, Position, PositionMap};
pub use version::{FamilyId, TreeVersion, VersionId, ViewMeta};
