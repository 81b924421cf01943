use anyhow::{Context, Result};
use ckrv_client::{ApiClient, EventStream};
use ckrv_core::config::DashConfig;
use futures::StreamExt;

use crate::output::print_json;

/// Tail the engine's event stream to stdout until the stream closes,
/// Ctrl+C, or `limit` events have been printed.
pub fn run(config: &DashConfig, limit: Option<usize>, json: bool) -> Result<()> {
    let rt = tokio::runtime::Runtime::new()?;
    let api = ApiClient::new(&config.server_url);

    rt.block_on(async move {
        let mut stream = EventStream::connect(api.http_client(), api.base_url())
            .await
            .with_context(|| format!("connecting to {}", config.server_url))?;

        let mut printed = 0usize;
        while let Some(event) = stream.next().await {
            if json {
                print_json(&event)?;
            } else {
                println!("{}", event.export_line());
            }
            printed += 1;
            if limit.is_some_and(|n| printed >= n) {
                break;
            }
        }
        Ok(())
    })
}
