use std::path::{Path, PathBuf};

use anyhow::Context as _;
use chrono::Utc;

use ckrv_core::event::OrchestrationEvent;
use ckrv_core::log;

/// Write the given (already filtered) events to a timestamped text file
/// under `dir`, one export line per event. Returns the file path.
pub fn write_export<'a>(
    dir: &Path,
    events: impl IntoIterator<Item = &'a OrchestrationEvent>,
) -> anyhow::Result<PathBuf> {
    let filename = format!("ckrv-log-{}.txt", Utc::now().format("%Y%m%dT%H%M%SZ"));
    let path = dir.join(filename);
    let body = log::export(events);
    std::fs::write(&path, body).with_context(|| format!("writing {}", path.display()))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ckrv_core::event::EventKind;
    use tempfile::TempDir;

    #[test]
    fn export_writes_one_line_per_event() {
        let dir = TempDir::new().unwrap();
        let events = vec![
            OrchestrationEvent::new(EventKind::StepStart, "begin"),
            OrchestrationEvent::new(EventKind::Log, "working"),
            OrchestrationEvent::new(EventKind::Success, "end"),
        ];

        let path = write_export(dir.path(), &events).unwrap();
        let body = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = body.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("[STEP_START] begin"));
        assert!(lines[2].contains("[SUCCESS] end"));
    }

    #[test]
    fn export_of_empty_set_is_empty_file() {
        let dir = TempDir::new().unwrap();
        let path = write_export(dir.path(), std::iter::empty()).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "");
    }
}
