//! # family-tree-rs: Generational Layout & Interactive Tree Canvas
//!
//! Lays out a family as generational rows of cards, routes the connectors
//! between them and drives an interactive pan/zoom/drag canvas whose layout
//! can be saved and restored as named versions.
//!
//! ## Design Principles
//!
//! 1. **Layout is a pure function**: same people + relationships, same nodes
//! 2. **Connectors are derived**: always recomputed from relationships + positions
//! 3. **The canvas owns positions**: cards only report intents upward
//! 4. **Trait-first I/O**: `VersionService`, `PlatformHost`, `CanvasCallbacks`
//!    and `Diagnostics` are the only seams to the outside world
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use family_tree::{FamilyTreeCanvas, Person, Relationship, Size, TreeConfig};
//!
//! let people = vec![Person::new("a", "Ada"), Person::new("b", "Ben"), Person::new("c", "Cy")];
//! let relationships = vec![
//!     Relationship::spouse("a", "b"),
//!     Relationship::parent("a", "c"),
//!     Relationship::parent("b", "c"),
//! ];
//!
//! let mut canvas = FamilyTreeCanvas::new(TreeConfig::default());
//! canvas.resize(Size::new(1280.0, 800.0));
//! canvas.set_data(people, relationships);
//!
//! for card in canvas.cards() {
//!     println!("{} at {:?}", card.display_name, card.center);
//! }
//! println!("{} connectors", canvas.connectors().len());
//! ```
//!
//! ## Components
//!
//! | Component | Module | Description |
//! |-----------|--------|-------------|
//! | `LayoutEngine` | `layout` | depth assignment + row placement |
//! | `ConnectionRenderer` | `connectors` | spouse lines, couple routing, parent elbows |
//! | `PersonCard` / `CardRenderer` | `card` | memoized card views |
//! | `FamilyTreeCanvas` | `canvas` | pointer state machine, viewport, auto-fit |
//! | `VersionManager` | `version` | save / load / delete layout versions |

// ============================================================================
// Modules
// ============================================================================

pub mod model;
pub mod config;
pub mod diagnostics;
pub mod kinship;
pub mod layout;
pub mod connectors;
pub mod card;
pub mod canvas;
pub mod version;
pub mod export;

// ============================================================================
// Re-exports: Model (the DTOs)
// ============================================================================

pub use model::{
    FamilyId, Gender, LayoutNode, Person, PersonId, PersonRecord, Point, Position, PositionMap, Rect,
    Relationship, RelationshipType, Size, TreeVersion, VersionId, ViewMeta, YearOrDate,
};

// ============================================================================
// Re-exports: Engine
// ============================================================================

pub use config::{CanvasConfig, LayoutConfig, TreeConfig};
pub use diagnostics::{
    CollectingDiagnostics, DiagnosticEvent, Diagnostics, DiagnosticsHandle, NoopDiagnostics, TracingDiagnostics,
};
pub use layout::{generate_layout, Layout, LayoutEngine};
pub use connectors::{ConnectionRenderer, Connector, ConnectorKind, Shape};
pub use card::{Avatar, CardIntent, CardRenderer, PersonCard};

// ============================================================================
// Re-exports: Canvas & Versions
// ============================================================================

pub use canvas::{CanvasCallbacks, FamilyTreeCanvas, Key, PlatformHost, PointerState, Viewport};
pub use version::{MemoryVersionService, Notice, NoticeLevel, VersionManager, VersionService};

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Version service error: {0}")]
    VersionService(String),

    #[error("Invalid version: {0}")]
    InvalidVersion(String),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Another version operation is in progress ({0})")]
    Busy(&'static str),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
