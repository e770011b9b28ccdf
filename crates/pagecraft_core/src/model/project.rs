//! Project domain model.
//!
//! Projects are thin owner rows: the interesting state lives in their
//! sections. Metadata editing UIs are external collaborators.

use serde::{Deserialize, Serialize};

/// Stable integer identifier of a project row.
pub type ProjectId = i64;

/// Project read model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Stable row id.
    pub id: ProjectId,
    /// User-facing project title.
    pub title: String,
    /// Optional free-form description.
    pub description: Option<String>,
    /// Epoch ms creation timestamp.
    pub created_at: i64,
    /// Epoch ms update timestamp.
    pub updated_at: i64,
}
