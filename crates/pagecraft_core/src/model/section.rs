//! Section domain model.
//!
//! # Responsibility
//! - Define the ordered, typed content block and its optional text payload.
//! - Define the client-proposal shape consumed by reconciliation.
//!
//! # Invariants
//! - `position` is the zero-based rank within one project's sequence;
//!   repositories keep the set of positions contiguous after every operation.
//! - `kind == Text` implies exactly one payload; any other kind implies none.

use serde::{Deserialize, Serialize};

/// Stable integer identifier of a section row.
pub type SectionId = i64;

/// Default markup written into a fresh text payload when the caller
/// supplies no content.
pub const DEFAULT_TEXT_CONTENT: &str = "<h1>Your Heading</h1><p>Enter your text here...</p>";

/// Content block kind. Selects at most one payload table, keyed by section id.
///
/// Only `Text` has a payload today; the other kinds reserve their tag so
/// adding a payload table later is not a schema break.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionType {
    /// Rich-text block backed by one `texts` row.
    Text,
    /// Single image block.
    Image,
    /// Embedded video block.
    Video,
    /// Combined text-and-image block.
    TextImage,
    /// Structural layout block.
    Layout,
}

/// Text payload read model. One row per `Text` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextPayload {
    /// HTML fragment edited by the builder UI.
    pub content: String,
}

/// Section read model, payload included when one exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    /// Stable row id.
    pub id: SectionId,
    /// Owning project. Immutable after creation.
    pub project_id: i64,
    /// Content block kind. Serialized as `type` to match external naming.
    #[serde(rename = "type")]
    pub kind: SectionType,
    /// Zero-based rank within the project's section sequence.
    pub position: i64,
    /// Text payload; `Some` exactly when `kind == SectionType::Text`.
    pub text: Option<TextPayload>,
    /// Epoch ms creation timestamp.
    pub created_at: i64,
    /// Epoch ms update timestamp.
    pub updated_at: i64,
}

impl Section {
    /// Returns the payload content, if this section carries one.
    pub fn text_content(&self) -> Option<&str> {
        self.text.as_ref().map(|payload| payload.content.as_str())
    }
}

/// One entry of a client-proposed full section list.
///
/// `id: Some` marks an update of a persisted section; `id: None` marks a
/// creation. Entries the client dropped from the list are deleted server-side
/// during reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionDraft {
    /// Persisted section id, when the entry refers to an existing row.
    pub id: Option<SectionId>,
    /// Desired content block kind.
    #[serde(rename = "type")]
    pub kind: SectionType,
    /// Raw position requested by the client. Normalization overrides it;
    /// ties are broken by the entry's index in the proposal.
    pub position: i64,
    /// Desired text content for `Text` entries. `None` falls back to
    /// [`DEFAULT_TEXT_CONTENT`].
    pub text: Option<String>,
}

impl SectionDraft {
    /// Creation entry with no explicit text content.
    pub fn create(kind: SectionType, position: i64) -> Self {
        Self {
            id: None,
            kind,
            position,
            text: None,
        }
    }

    /// Update entry referencing a persisted section.
    pub fn update(id: SectionId, kind: SectionType, position: i64) -> Self {
        Self {
            id: Some(id),
            kind,
            position,
            text: None,
        }
    }

    /// Returns the same draft with explicit text content.
    pub fn with_text(mut self, content: impl Into<String>) -> Self {
        self.text = Some(content.into());
        self
    }
}
