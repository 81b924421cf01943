use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// GateInputs
// ---------------------------------------------------------------------------

/// Upstream state the three workflow gates are derived from.
///
/// A failed mutation never changes these; gate transitions happen only
/// when fresh inputs arrive (success callback or a new poll snapshot).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateInputs {
    pub unresolved_clarifications: usize,
    pub has_design: bool,
    pub has_tasks: bool,
}

// ---------------------------------------------------------------------------
// Gates
// ---------------------------------------------------------------------------

/// The three sequential gates: clarify → design → tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gates {
    pub needs_clarification: bool,
    pub can_design: bool,
    pub can_generate_tasks: bool,
}

impl Gates {
    pub fn derive(inputs: GateInputs) -> Self {
        Self {
            needs_clarification: inputs.unresolved_clarifications > 0,
            can_design: inputs.unresolved_clarifications == 0 && !inputs.has_design,
            can_generate_tasks: inputs.has_design && !inputs.has_tasks,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn gates(unresolved: usize, has_design: bool, has_tasks: bool) -> Gates {
        Gates::derive(GateInputs {
            unresolved_clarifications: unresolved,
            has_design,
            has_tasks,
        })
    }

    #[test]
    fn unresolved_clarifications_block_design() {
        let g = gates(2, false, false);
        assert!(g.needs_clarification);
        assert!(!g.can_design);
        assert!(!g.can_generate_tasks);
    }

    #[test]
    fn resolved_clarifications_enable_design() {
        let g = gates(0, false, false);
        assert!(!g.needs_clarification);
        assert!(g.can_design);
        assert!(!g.can_generate_tasks);
    }

    #[test]
    fn design_disables_itself_and_enables_tasks() {
        let g = gates(0, true, false);
        assert!(!g.can_design);
        assert!(g.can_generate_tasks);
    }

    #[test]
    fn tasks_generated_disables_everything() {
        let g = gates(0, true, true);
        assert!(!g.needs_clarification);
        assert!(!g.can_design);
        assert!(!g.can_generate_tasks);
    }

    #[test]
    fn clarifications_block_even_with_design() {
        // Design exists but new clarifications arrived: tasks gate still
        // follows has_design only, per the invariant.
        let g = gates(1, true, false);
        assert!(g.needs_clarification);
        assert!(!g.can_design);
        assert!(g.can_generate_tasks);
    }
}
