//! Saved layout snapshots.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{LayoutNode, Point};
use crate::{Error, Result};

/// Opaque version identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionId(pub String);

impl std::fmt::Display for VersionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VersionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Family the versions belong to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FamilyId(pub String);

impl std::fmt::Display for FamilyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FamilyId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Spacing and viewport stored alongside the nodes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewMeta {
    pub h_gap: f64,
    pub v_gap: f64,
    pub zoom: f64,
    pub pan: Point,
}

/// A named, immutable snapshot of the full layout plus viewport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeVersion {
    pub id: VersionId,
    pub family_id: FamilyId,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub nodes: Vec<LayoutNode>,
    pub meta: ViewMeta,
}

impl TreeVersion {
    /// Reject snapshots that could not have come from a live canvas.
    pub fn validate(&self) -> Result<()> {
        if !(self.meta.zoom.is_finite() && self.meta.zoom > 0.0) {
            return Err(Error::InvalidVersion(format!(
                "version {} has zoom {}",
                self.id, self.meta.zoom
            )));
        }
        if !self.meta.pan.is_finite() {
            return Err(Error::InvalidVersion(format!("version {} has a non-finite pan", self.id)));
        }
        if let Some(bad) = self.nodes.iter().find(|n| !(n.x.is_finite() && n.y.is_finite())) {
            return Err(Error::InvalidVersion(format!(
                "version {} places {} at a non-finite position",
                self.id, bad.person_id
            )));
        }
        Ok(())
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TreeVersion {
        TreeVersion {
            id: "v1".into(),
            family_id: "fam".into(),
            name: "Before the wedding".into(),
            created_at: Utc::now(),
            nodes: vec![
                LayoutNode::new("a", 75.0, 0.0, 0),
                LayoutNode::new("b", 265.1234567891, 0.1, 0),
            ],
            meta: ViewMeta { h_gap: 60.0, v_gap: 100.0, zoom: 0.8123, pan: Point::new(-12.5, 40.0) },
        }
    }

    #[test]
    fn test_json_preserves_positions_exactly() {
        let v = sample();
        let back = TreeVersion::from_json(&v.to_json().unwrap()).unwrap();
        assert_eq!(back, v);
    }

    #[test]
    fn test_validate_rejects_non_finite() {
        let mut v = sample();
        assert!(v.validate().is_ok());
        v.nodes[0].x = f64::NAN;
        assert!(matches!(v.validate(), Err(Error::InvalidVersion(_))));
        let mut v = sample();
        v.meta.zoom = 0.0;
        assert!(v.validate().is_err());
    }
}
