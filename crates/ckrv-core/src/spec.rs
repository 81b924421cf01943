use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// SpecSummary
// ---------------------------------------------------------------------------

/// Snapshot of one spec as reported by `GET /api/specs`.
///
/// Lifecycle is owned by the orchestration engine; the dashboard only
/// observes snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecSummary {
    pub name: String,
    pub path: String,
    #[serde(default)]
    pub has_tasks: bool,
    #[serde(default)]
    pub has_implementation: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub implementation_branch: Option<String>,
}

impl SpecSummary {
    /// Furthest pipeline stage this spec has reached.
    pub fn stage_label(&self) -> &'static str {
        if self.has_implementation {
            "implemented"
        } else if self.has_tasks {
            "tasks ready"
        } else {
            "spec only"
        }
    }
}

// ---------------------------------------------------------------------------
// SpecList
// ---------------------------------------------------------------------------

/// Response body of `GET /api/specs`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpecList {
    #[serde(default)]
    pub specs: Vec<SpecSummary>,
    #[serde(default)]
    pub count: usize,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
