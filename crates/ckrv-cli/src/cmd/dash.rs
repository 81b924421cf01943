use anyhow::Result;
use ckrv_core::config::DashConfig;
use std::path::Path;

/// Launch the full-screen dashboard. Blocks until the user quits.
pub fn run(root: &Path, config: DashConfig) -> Result<()> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(ckrv_dash::run(root.to_path_buf(), config))
}
