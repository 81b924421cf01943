use crate::spec::SpecSummary;
use crate::task::{Task, TaskCounts};
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Stage / StageStatus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Specifications,
    Tasks,
    Execution,
    Review,
}

impl Stage {
    pub fn all() -> &'static [Stage] {
        &[Stage::Specifications, Stage::Tasks, Stage::Execution, Stage::Review]
    }

    pub fn title(self) -> &'static str {
        match self {
            Stage::Specifications => "Specifications",
            Stage::Tasks => "Tasks",
            Stage::Execution => "Execution",
            Stage::Review => "Review",
        }
    }
}

/// Client-side inference from counts; no stage has server-authoritative
/// state of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    Empty,
    Ready,
    Running,
    Done,
}

impl fmt::Display for StageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StageStatus::Empty => "empty",
            StageStatus::Ready => "ready",
            StageStatus::Running => "running",
            StageStatus::Done => "done",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// StageReport
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageReport {
    pub stage: Stage,
    pub status: StageStatus,
    pub headline: String,
    /// Empty-state hint or per-stage detail shown under the headline.
    pub detail: String,
}

/// Derive all four stage panels from the latest list snapshots.
pub fn derive_stages(specs: &[SpecSummary], tasks: &[Task]) -> [StageReport; 4] {
    [
        specifications_stage(specs),
        tasks_stage(specs),
        execution_stage(tasks),
        review_stage(specs),
    ]
}

fn specifications_stage(specs: &[SpecSummary]) -> StageReport {
    let (status, headline, detail) = if specs.is_empty() {
        (
            StageStatus::Empty,
            "no specs".to_string(),
            "ckrv spec new <name>".to_string(),
        )
    } else {
        (
            StageStatus::Ready,
            format!("{} spec{}", specs.len(), plural(specs.len())),
            specs
                .iter()
                .map(|s| s.name.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        )
    };
    StageReport {
        stage: Stage::Specifications,
        status,
        headline,
        detail,
    }
}

fn tasks_stage(specs: &[SpecSummary]) -> StageReport {
    let with_tasks = specs.iter().filter(|s| s.has_tasks).count();
    let (status, headline, detail) = if with_tasks == 0 {
        (
            StageStatus::Empty,
            "no task lists".to_string(),
            "ckrv spec tasks <name>".to_string(),
        )
    } else {
        (
            StageStatus::Ready,
            format!("{with_tasks}/{} specs have tasks", specs.len()),
            String::new(),
        )
    };
    StageReport {
        stage: Stage::Tasks,
        status,
        headline,
        detail,
    }
}

fn execution_stage(tasks: &[Task]) -> StageReport {
    let counts = TaskCounts::of(tasks);
    let (status, headline, detail) = if counts.total() == 0 {
        (
            StageStatus::Empty,
            "no tasks".to_string(),
            "ckrv run".to_string(),
        )
    } else if counts.in_progress > 0 {
        (StageStatus::Running, counts.summarize(), String::new())
    } else if counts.completed == counts.total() {
        (StageStatus::Done, counts.summarize(), String::new())
    } else {
        (StageStatus::Ready, counts.summarize(), "ckrv run".to_string())
    };
    StageReport {
        stage: Stage::Execution,
        status,
        headline,
        detail,
    }
}

fn review_stage(specs: &[SpecSummary]) -> StageReport {
    let implemented: Vec<&SpecSummary> =
        specs.iter().filter(|s| s.has_implementation).collect();
    let with_tasks = specs.iter().filter(|s| s.has_tasks).count();
    // Done means every tasked spec is implemented, not that the two
    // counts happen to match.
    let all_tasked_implemented = specs
        .iter()
        .filter(|s| s.has_tasks)
        .all(|s| s.has_implementation);

    let (status, headline, detail) = if implemented.is_empty() {
        (
            StageStatus::Empty,
            "nothing to review".to_string(),
            "ckrv diff / ckrv verify / ckrv promote".to_string(),
        )
    } else {
        let branches = implemented
            .iter()
            .filter_map(|s| {
                s.implementation_branch
                    .as_deref()
                    .map(|b| format!("{} → {b}", s.name))
            })
            .collect::<Vec<_>>()
            .join(", ");
        let status = if with_tasks > 0 && all_tasked_implemented {
            StageStatus::Done
        } else {
            StageStatus::Ready
        };
        (
            status,
            format!("{} implementation{}", implemented.len(), plural(implemented.len())),
            branches,
        )
    };
    StageReport {
        stage: Stage::Review,
        status,
        headline,
        detail,
    }
}

fn plural(n: usize) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::TaskStatus;

    fn spec(name: &str, has_tasks: bool, has_impl: bool) -> SpecSummary {
        SpecSummary {
            name: name.to_string(),
            path: format!("specs/{name}.md"),
            has_tasks,
            has_implementation: has_impl,
            implementation_branch: has_impl.then(|| format!("ckrv/{name}")),
        }
    }

    fn task(status: TaskStatus) -> Task {
        Task {
            id: "T1".to_string(),
            phase: "implementation".to_string(),
            title: "a task".to_string(),
            status,
        }
    }

    #[test]
    fn empty_project_shows_hints() {
        let reports = derive_stages(&[], &[]);
        assert!(reports.iter().all(|r| r.status == StageStatus::Empty));
        assert_eq!(reports[0].detail, "ckrv spec new <name>");
        assert_eq!(reports[1].detail, "ckrv spec tasks <name>");
        assert_eq!(reports[2].detail, "ckrv run");
        assert!(reports[3].detail.contains("ckrv promote"));
    }

    #[test]
    fn in_progress_task_marks_execution_running() {
        let specs = vec![spec("auth", true, false)];
        let tasks = vec![task(TaskStatus::Completed), task(TaskStatus::InProgress)];
        let reports = derive_stages(&specs, &tasks);
        assert_eq!(reports[2].status, StageStatus::Running);
        assert_eq!(reports[2].headline, "1/2 completed, 1 in progress");
    }

    #[test]
    fn all_completed_marks_execution_done() {
        let tasks = vec![task(TaskStatus::Completed), task(TaskStatus::Completed)];
        let reports = derive_stages(&[], &tasks);
        assert_eq!(reports[2].status, StageStatus::Done);
    }

    #[test]
    fn review_lists_implementation_branches() {
        let specs = vec![spec("auth", true, true), spec("billing", true, false)];
        let reports = derive_stages(&specs, &[]);
        assert_eq!(reports[3].status, StageStatus::Ready);
        assert!(reports[3].detail.contains("auth → ckrv/auth"));
    }

    #[test]
    fn review_done_when_every_tasked_spec_is_implemented() {
        let specs = vec![spec("auth", true, true)];
        let reports = derive_stages(&specs, &[]);
        assert_eq!(reports[3].status, StageStatus::Done);
    }

    #[test]
    fn review_not_done_when_an_unrelated_spec_is_implemented() {
        // One tasked spec without an implementation, one implemented spec
        // without tasks. Equal counts must not read as Done.
        let specs = vec![spec("auth", true, false), spec("docs", false, true)];
        let reports = derive_stages(&specs, &[]);
        assert_eq!(reports[3].status, StageStatus::Ready);
    }

    #[test]
    fn tasks_stage_counts_specs_with_tasks() {
        let specs = vec![spec("auth", true, false), spec("billing", false, false)];
        let reports = derive_stages(&specs, &[]);
        assert_eq!(reports[1].status, StageStatus::Ready);
        assert_eq!(reports[1].headline, "1/2 specs have tasks");
    }
}
