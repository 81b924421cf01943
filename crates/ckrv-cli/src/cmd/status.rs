use anyhow::{Context, Result};
use ckrv_client::ApiClient;
use ckrv_core::pipeline::derive_stages;
use ckrv_core::config::DashConfig;

use crate::output::{print_json, print_table};

/// One-shot snapshot of the four pipeline stages.
pub fn run(config: &DashConfig, json: bool) -> Result<()> {
    let rt = tokio::runtime::Runtime::new()?;
    let api = ApiClient::new(&config.server_url);

    let (specs, tasks) = rt.block_on(async {
        let specs = api
            .list_specs()
            .await
            .with_context(|| format!("fetching specs from {}", config.server_url))?;
        let tasks = api
            .list_tasks()
            .await
            .with_context(|| format!("fetching tasks from {}", config.server_url))?;
        Ok::<_, anyhow::Error>((specs, tasks))
    })?;

    let stages = derive_stages(&specs.specs, &tasks.tasks);

    if json {
        return print_json(&stages);
    }

    let rows = stages
        .iter()
        .map(|s| {
            vec![
                s.stage.title().to_string(),
                s.status.to_string(),
                s.headline.clone(),
                s.detail.clone(),
            ]
        })
        .collect();
    print_table(&["STAGE", "STATUS", "SUMMARY", "DETAIL"], rows);
    Ok(())
}
