use ckrv_core::command::{CommandResult, ValidationReport};
use ckrv_core::spec::SpecList;
use ckrv_core::task::TaskList;

use crate::{ClientError, Result};

// ─── ApiClient ────────────────────────────────────────────────────────────

/// Request/response client for the orchestration engine's REST surface.
///
/// List fetches and validation are plain typed GETs/POSTs. For the
/// mutation endpoints an HTTP-level failure is data, not an error: a
/// non-2xx response becomes a failed [`CommandResult`] so the caller can
/// surface it inline and leave its gate state untouched. Only transport
/// failures (connection refused, mid-body disconnect) are `Err`.
///
/// No per-request timeout is configured; hangs are bounded only by
/// transport defaults.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn http_client(&self) -> &reqwest::Client {
        &self.client
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    // ── Lists ────────────────────────────────────────────────────────────

    pub async fn list_specs(&self) -> Result<SpecList> {
        let response = self.client.get(self.url("/api/specs")).send().await?;
        decode_json(response).await
    }

    pub async fn list_tasks(&self) -> Result<TaskList> {
        let response = self.client.get(self.url("/api/tasks")).send().await?;
        decode_json(response).await
    }

    // ── Mutations ────────────────────────────────────────────────────────

    /// `POST /api/command/fix` with body `{"check": bool}`. The result
    /// body is arbitrary JSON; any 2xx is success.
    pub async fn fix(&self, check: bool) -> Result<CommandResult> {
        let response = self
            .client
            .post(self.url("/api/command/fix"))
            .json(&serde_json::json!({ "check": check }))
            .send()
            .await?;
        Ok(command_outcome(response, if check { "fix check passed" } else { "fix applied" }).await)
    }

    /// `POST /api/specs/{name}/validate` → `{valid, errors: [...]}`.
    pub async fn validate_spec(&self, name: &str) -> Result<ValidationReport> {
        let response = self
            .client
            .post(self.url(&format!("/api/specs/{name}/validate")))
            .send()
            .await?;
        decode_json(response).await
    }

    pub async fn generate_design(&self, name: &str) -> Result<CommandResult> {
        let response = self
            .client
            .post(self.url(&format!("/api/specs/{name}/design")))
            .send()
            .await?;
        Ok(command_outcome(response, "design generated").await)
    }

    pub async fn generate_tasks(&self, name: &str) -> Result<CommandResult> {
        let response = self
            .client
            .post(self.url(&format!("/api/specs/{name}/tasks")))
            .send()
            .await?;
        Ok(command_outcome(response, "tasks generated").await)
    }
}

// ─── Response handling ────────────────────────────────────────────────────

async fn decode_json<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        return Err(ClientError::Status {
            status: status.as_u16(),
            body: response.text().await.unwrap_or_default(),
        });
    }
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| ClientError::Decode(format!("{e}: {body}")))
}

/// Collapse a mutation response into a [`CommandResult`].
///
/// A 2xx is a success; its `message` field (when present) overrides the
/// default text. A non-2xx becomes a failure carrying the body's
/// `error`/`message` text, or the raw body, or the status line.
async fn command_outcome(response: reqwest::Response, default_msg: &str) -> CommandResult {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let extracted = extract_message(&body);

    if status.is_success() {
        CommandResult::ok(extracted.unwrap_or_else(|| default_msg.to_string()))
    } else {
        let message = extracted.unwrap_or_else(|| {
            if body.trim().is_empty() {
                format!("server returned {}", status.as_u16())
            } else {
                body.trim().to_string()
            }
        });
        CommandResult::failed(message)
    }
}

fn extract_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    for key in ["error", "message"] {
        if let Some(text) = value.get(key).and_then(|v| v.as_str()) {
            return Some(text.to_string());
        }
    }
    None
}

// ─── Tests ────────────────────────────────────────────────────────────────
