//! In-memory version store.
//!
//! Reference implementation of [`VersionService`]. Versions of every family
//! live in one shared map; each handle is scoped to a single family, and
//! [`MemoryVersionService::for_family`] hands out handles that share the
//! same storage.
//!
//! Nothing is persisted.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;

use super::VersionService;
use crate::model::{FamilyId, LayoutNode, TreeVersion, VersionId, ViewMeta};
use crate::{Error, Result};

#[derive(Clone)]
pub struct MemoryVersionService {
    family_id: FamilyId,
    inner: Arc<MemoryInner>,
}

struct MemoryInner {
    /// family → versions in creation order
    versions: RwLock<HashMap<FamilyId, Vec<TreeVersion>>>,
    next_id: AtomicU64,
}

impl MemoryVersionService {
    pub fn new(family_id: impl Into<FamilyId>) -> Self {
        Self {
            family_id: family_id.into(),
            inner: Arc::new(MemoryInner {
                versions: RwLock::new(HashMap::new()),
                next_id: AtomicU64::new(1),
            }),
        }
    }

    /// Handle for another family over the same storage.
    pub fn for_family(&self, family_id: impl Into<FamilyId>) -> Self {
        Self { family_id: family_id.into(), inner: Arc::clone(&self.inner) }
    }

    pub fn family_id(&self) -> &FamilyId {
        &self.family_id
    }

    /// Number of versions stored for this family.
    pub fn len(&self) -> usize {
        self.inner.versions.read().get(&self.family_id).map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl VersionService for MemoryVersionService {
    async fn list(&self) -> Result<Vec<TreeVersion>> {
        let versions = self.inner.versions.read();
        Ok(versions
            .get(&self.family_id)
            .map(|list| list.iter().rev().cloned().collect())
            .unwrap_or_default())
    }

    async fn save(&self, name: &str, nodes: Vec<LayoutNode>, meta: ViewMeta) -> Result<TreeVersion> {
        let id = VersionId(format!("v{}", self.inner.next_id.fetch_add(1, Ordering::Relaxed)));
        let version = TreeVersion {
            id,
            family_id: self.family_id.clone(),
            name: name.to_string(),
            created_at: Utc::now(),
            nodes,
            meta,
        };
        version.validate()?;
        self.inner
            .versions
            .write()
            .entry(self.family_id.clone())
            .or_default()
            .push(version.clone());
        Ok(version)
    }

    async fn delete(&self, version_id: &VersionId) -> Result<()> {
        let mut versions = self.inner.versions.write();
        let list = versions.entry(self.family_id.clone()).or_default();
        let before = list.len();
        list.retain(|v| &v.id != version_id);
        if list.len() == before {
            return Err(Error::NotFound(format!("version {version_id}")));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Point;

    fn meta() -> ViewMeta {
        ViewMeta { h_gap: 60.0, v_gap: 100.0, zoom: 1.0, pan: Point::ZERO }
    }

    #[tokio::test]
    async fn test_list_is_newest_first_and_family_scoped() {
        let svc = MemoryVersionService::new("smiths");
        let other = svc.for_family("joneses");
        svc.save("first", vec![], meta()).await.unwrap();
        svc.save("second", vec![], meta()).await.unwrap();
        other.save("theirs", vec![], meta()).await.unwrap();

        let names: Vec<String> = svc.list().await.unwrap().into_iter().map(|v| v.name).collect();
        assert_eq!(names, vec!["second", "first"]);
        assert_eq!(other.len(), 1);
    }

    #[tokio::test]
    async fn test_delete_unknown_is_not_found() {
        let svc = MemoryVersionService::new("smiths");
        let v = svc.save("x", vec![], meta()).await.unwrap();
        svc.delete(&v.id).await.unwrap();
        assert!(svc.is_empty());
        assert!(matches!(svc.delete(&v.id).await, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn test_invalid_snapshot_is_rejected() {
        let svc = MemoryVersionService::new("smiths");
        let bad = ViewMeta { zoom: f64::NAN, ..meta() };
        assert!(matches!(svc.save("x", vec![], bad).await, Err(Error::InvalidVersion(_))));
        assert!(svc.is_empty());
    }
}
