//! # Diagnostics sink
//!
//! The engine never logs on its own. Anything worth telling a developer
//! about (skipped edges, broken cycles, failed version calls) is handed to
//! an injected [`Diagnostics`] implementation.
//!
//! | Sink | Use |
//! |------|-----|
//! | `NoopDiagnostics` | default, drops everything |
//! | `TracingDiagnostics` | forwards to `tracing` |
//! | `CollectingDiagnostics` | keeps events in memory (tests, debug panels) |

use std::sync::Arc;

use parking_lot::Mutex;

use crate::model::{PersonId, VersionId};

/// Something the engine noticed and recovered from.
#[derive(Debug, Clone, PartialEq)]
pub enum DiagnosticEvent {
    /// A relationship row names a person that is not in the input.
    UnknownPerson { person_id: PersonId },
    /// A parent edge closes a cycle and was ignored for depth assignment.
    CycleBroken { parent: PersonId, child: PersonId },
    /// Spouse/parent constraints could not all be met.
    LayoutNotConverged { rounds: usize },
    /// A connector was skipped because an endpoint has no position.
    MissingPosition { from: PersonId, to: PersonId },
    /// A version service call failed.
    VersionFailure { operation: &'static str, version_id: Option<VersionId>, message: String },
}

/// Diagnostic sink.
pub trait Diagnostics: Send + Sync {
    fn record(&self, event: DiagnosticEvent);
}

/// Drops every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopDiagnostics;

impl Diagnostics for NoopDiagnostics {
    fn record(&self, _event: DiagnosticEvent) {}
}

/// Forwards events to the `tracing` subscriber the host installed.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn record(&self, event: DiagnosticEvent) {
        match event {
            DiagnosticEvent::UnknownPerson { person_id } => {
                tracing::debug!(%person_id, "relationship references unknown person");
            }
            DiagnosticEvent::CycleBroken { parent, child } => {
                tracing::warn!(%parent, %child, "parent cycle broken during depth assignment");
            }
            DiagnosticEvent::LayoutNotConverged { rounds } => {
                tracing::warn!(rounds, "layout depth relaxation did not converge");
            }
            DiagnosticEvent::MissingPosition { from, to } => {
                tracing::debug!(%from, %to, "connector skipped: endpoint has no position");
            }
            DiagnosticEvent::VersionFailure { operation, version_id, message } => {
                tracing::warn!(operation, version_id = ?version_id, %message, "version call failed");
            }
        }
    }
}

/// Keeps every event in memory.
#[derive(Debug, Default)]
pub struct CollectingDiagnostics {
    events: Mutex<Vec<DiagnosticEvent>>,
}

impl CollectingDiagnostics {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> Vec<DiagnosticEvent> {
        self.events.lock().clone()
    }

    pub fn take(&self) -> Vec<DiagnosticEvent> {
        std::mem::take(&mut *self.events.lock())
    }

    pub fn count(&self, pred: impl Fn(&DiagnosticEvent) -> bool) -> usize {
        self.events.lock().iter().filter(|e| pred(e)).count()
    }
}

impl Diagnostics for CollectingDiagnostics {
    fn record(&self, event: DiagnosticEvent) {
        self.events.lock().push(event);
    }
}

/// Shared handle type used throughout the crate.
pub type DiagnosticsHandle = Arc<dyn Diagnostics>;

/// The default sink.
pub fn noop() -> DiagnosticsHandle {
    Arc::new(NoopDiagnostics)
}
