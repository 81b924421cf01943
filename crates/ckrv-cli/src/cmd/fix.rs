use anyhow::{bail, Context, Result};
use ckrv_client::ApiClient;
use ckrv_core::config::DashConfig;

use crate::output::print_json;

/// Ask the engine to repair outstanding issues (or report them with --check).
pub fn run(config: &DashConfig, check: bool, json: bool) -> Result<()> {
    let rt = tokio::runtime::Runtime::new()?;
    let api = ApiClient::new(&config.server_url);

    let result = rt
        .block_on(api.fix(check))
        .with_context(|| format!("requesting fix from {}", config.server_url))?;

    if json {
        print_json(&result)?;
    } else {
        let verb = if check { "fix --check" } else { "fix" };
        match &result.message {
            Some(msg) => println!("{verb}: {msg}"),
            None if result.success => println!("{verb}: ok"),
            None => println!("{verb}: failed"),
        }
    }

    if !result.success {
        bail!("fix reported failure");
    }
    Ok(())
}
