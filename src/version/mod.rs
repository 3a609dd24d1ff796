//! # Layout versions
//!
//! Named snapshots of the node array plus the viewport, stored by an
//! external [`VersionService`].
//!
//! | Piece | Role |
//! |-------|------|
//! | `VersionService` | async contract to whatever stores versions |
//! | `MemoryVersionService` | in-memory reference implementation |
//! | `VersionManager` | drives a service on behalf of a canvas: busy flag, cached list, notices |
//!
//! A failed call never touches the canvas. The error is returned, a notice
//! is queued for the UI and a `VersionFailure` diagnostic is recorded.

pub mod memory;

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;

use crate::canvas::FamilyTreeCanvas;
use crate::diagnostics::{self, DiagnosticEvent, DiagnosticsHandle};
use crate::model::{LayoutNode, TreeVersion, VersionId, ViewMeta};
use crate::{Error, Result};

pub use memory::MemoryVersionService;

// ============================================================================
// Service contract
// ============================================================================

/// Storage for saved layouts of one family.
#[async_trait]
pub trait VersionService: Send + Sync {
    /// All versions, newest first.
    async fn list(&self) -> Result<Vec<TreeVersion>>;

    /// Store a new version and return it as stored.
    async fn save(&self, name: &str, nodes: Vec<LayoutNode>, meta: ViewMeta) -> Result<TreeVersion>;

    /// Remove a version. Unknown ids are `Error::NotFound`.
    async fn delete(&self, version_id: &VersionId) -> Result<()>;
}

// ============================================================================
// Notices
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// Short message for a toast or status line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

// ============================================================================
// Manager
// ============================================================================

/// Runs version operations for a canvas, one at a time.
pub struct VersionManager<V: VersionService> {
    service: V,
    versions: Mutex<Vec<TreeVersion>>,
    busy: AtomicBool,
    notices: Mutex<VecDeque<Notice>>,
    diagnostics: DiagnosticsHandle,
}

/// Clears the busy flag when the call finishes or its future is dropped.
struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl<V: VersionService> VersionManager<V> {
    pub fn new(service: V) -> Self {
        Self {
            service,
            versions: Mutex::new(Vec::new()),
            busy: AtomicBool::new(false),
            notices: Mutex::new(VecDeque::new()),
            diagnostics: diagnostics::noop(),
        }
    }

    pub fn with_diagnostics(mut self, diagnostics: DiagnosticsHandle) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    pub fn service(&self) -> &V {
        &self.service
    }

    /// True while a version call is in flight.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Versions from the last successful refresh, newest first.
    pub fn versions(&self) -> Vec<TreeVersion> {
        self.versions.lock().clone()
    }

    /// Drain queued notices, oldest first.
    pub fn take_notices(&self) -> Vec<Notice> {
        self.notices.lock().drain(..).collect()
    }

    fn begin(&self, operation: &'static str) -> Result<BusyGuard<'_>> {
        if self.busy.swap(true, Ordering::AcqRel) {
            return Err(Error::Busy(operation));
        }
        Ok(BusyGuard(&self.busy))
    }

    fn notify(&self, level: NoticeLevel, message: String) {
        self.notices.lock().push_back(Notice { level, message });
    }

    fn fail<T>(&self, operation: &'static str, version_id: Option<&VersionId>, err: Error) -> Result<T> {
        self.diagnostics.record(DiagnosticEvent::VersionFailure {
            operation,
            version_id: version_id.cloned(),
            message: err.to_string(),
        });
        self.notify(NoticeLevel::Error, format!("Could not {operation} version: {err}"));
        Err(err)
    }

    /// Reload the cached list from the service.
    pub async fn refresh(&self) -> Result<Vec<TreeVersion>> {
        let _guard = self.begin("list")?;
        self.refresh_inner().await
    }

    async fn refresh_inner(&self) -> Result<Vec<TreeVersion>> {
        match self.service.list().await {
            Ok(list) => {
                *self.versions.lock() = list.clone();
                Ok(list)
            }
            Err(err) => self.fail("list", None, err),
        }
    }

    /// Save the canvas' committed nodes and viewport. Without a name (or
    /// with a blank one) the version is called `Layout <date time>`.
    pub async fn save(&self, canvas: &FamilyTreeCanvas, name: Option<&str>) -> Result<TreeVersion> {
        let _guard = self.begin("save")?;
        let name = match name.map(str::trim).filter(|n| !n.is_empty()) {
            Some(n) => n.to_string(),
            None => default_name(),
        };
        let (nodes, meta) = canvas.snapshot();
        match self.service.save(&name, nodes, meta).await {
            Ok(version) => {
                self.versions.lock().insert(0, version.clone());
                self.notify(NoticeLevel::Info, format!("Saved \"{}\"", version.name));
                Ok(version)
            }
            Err(err) => self.fail("save", None, err),
        }
    }

    /// Replace the canvas layout and viewport with a stored version.
    ///
    /// Looks in the cached list first and refreshes once if the id is not
    /// there.
    pub async fn load(&self, canvas: &mut FamilyTreeCanvas, version_id: &VersionId) -> Result<()> {
        let _guard = self.begin("load")?;
        let mut found = self.find(version_id);
        if found.is_none() {
            self.refresh_inner().await?;
            found = self.find(version_id);
        }
        let Some(version) = found else {
            return self.fail("load", Some(version_id), Error::NotFound(format!("version {version_id}")));
        };
        if let Err(err) = canvas.restore(&version) {
            return self.fail("load", Some(version_id), err);
        }
        self.notify(NoticeLevel::Info, format!("Loaded \"{}\"", version.name));
        Ok(())
    }

    pub async fn delete(&self, version_id: &VersionId) -> Result<()> {
        let _guard = self.begin("delete")?;
        match self.service.delete(version_id).await {
            Ok(()) => {
                self.versions.lock().retain(|v| &v.id != version_id);
                Ok(())
            }
            Err(err) => self.fail("delete", Some(version_id), err),
        }
    }

    fn find(&self, version_id: &VersionId) -> Option<TreeVersion> {
        self.versions.lock().iter().find(|v| &v.id == version_id).cloned()
    }
}

fn default_name() -> String {
    format!("Layout {}", Utc::now().format("%Y-%m-%d %H:%M"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_name_shape() {
        let name = default_name();
        assert!(name.starts_with("Layout "));
        // "Layout YYYY-MM-DD HH:MM"
        assert_eq!(name.len(), "Layout ".len() + 16);
    }

    #[test]
    fn test_busy_guard_clears_flag() {
        let manager = VersionManager::new(MemoryVersionService::new("fam"));
        {
            let _guard = manager.begin("save").unwrap();
            assert!(manager.is_busy());
            assert!(matches!(manager.begin("list"), Err(Error::Busy("list"))));
        }
        assert!(!manager.is_busy());
    }
}
