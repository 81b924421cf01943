use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// CommandResult
// ---------------------------------------------------------------------------

/// Outcome of the most recent command invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl CommandResult {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
        }
    }
}

// ---------------------------------------------------------------------------
// CommandSlot
// ---------------------------------------------------------------------------

/// Holds the latest [`CommandResult`] until the user dismisses it.
///
/// Replaces the original dashboard's ambient cross-component context with
/// an owned store and an explicit reset lifecycle.
#[derive(Debug, Default)]
pub struct CommandSlot {
    latest: Option<CommandResult>,
}

impl CommandSlot {
    pub fn set(&mut self, result: CommandResult) {
        self.latest = Some(result);
    }

    pub fn get(&self) -> Option<&CommandResult> {
        self.latest.as_ref()
    }

    /// Explicit user dismissal.
    pub fn clear(&mut self) {
        self.latest = None;
    }

    pub fn take(&mut self) -> Option<CommandResult> {
        self.latest.take()
    }
}

// ---------------------------------------------------------------------------
// ValidationReport
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Response body of the spec-validation endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub valid: bool,
    #[serde(default)]
    pub errors: Vec<FieldError>,
}

impl ValidationReport {
    pub fn summary(&self) -> String {
        if self.valid {
            "spec is valid".to_string()
        } else {
            let details = self
                .errors
                .iter()
                .map(|e| format!("{}: {}", e.field, e.message))
                .collect::<Vec<_>>()
                .join("; ");
            format!("{} validation error(s): {details}", self.errors.len())
        }
    }

    pub fn into_result(self) -> CommandResult {
        if self.valid {
            CommandResult::ok(self.summary())
        } else {
            CommandResult::failed(self.summary())
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
