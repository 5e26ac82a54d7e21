use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use recallbench_core::{
    BenchError, BenchResult, MemoryRecord, MemoryService, RecallRequest, RecallResponse,
    ServiceHealth,
};

/// Blocking HTTP client for the memory service's REST surface.
pub struct HttpMemoryClient {
    base_url: String,
    agent: ureq::Agent,
}

impl HttpMemoryClient {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            agent,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

// ---------------------------------------------------------------------------
// Response helpers
// ---------------------------------------------------------------------------

fn check(result: Result<ureq::Response, ureq::Error>) -> BenchResult<ureq::Response> {
    match result {
        Ok(resp) => Ok(resp),
        Err(ureq::Error::Status(status, resp)) => Err(BenchError::Status {
            status,
            body: resp.into_string().unwrap_or_default(),
        }),
        Err(ureq::Error::Transport(t)) => Err(BenchError::Transport(t.to_string())),
    }
}

fn read_body(resp: ureq::Response) -> BenchResult<String> {
    resp.into_string()
        .map_err(|e| BenchError::Transport(format!("cannot read response body: {e}")))
}

fn decode<T: DeserializeOwned>(resp: ureq::Response) -> BenchResult<T> {
    Ok(serde_json::from_str(&read_body(resp)?)?)
}

/// Parse the `{ok, error, ...}` envelope the service wraps mutations and
/// recalls in. Failures arrive as HTTP 200 with `ok: false`. An empty body is
/// treated as success.
fn envelope(resp: ureq::Response) -> BenchResult<Value> {
    let body = read_body(resp)?;
    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    let value: Value = serde_json::from_str(&body)?;
    if value.get("ok").and_then(Value::as_bool) == Some(false) {
        let reason = value
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or("no reason given")
            .to_string();
        return Err(BenchError::Rejected(reason));
    }
    Ok(value)
}

// ---------------------------------------------------------------------------
// MemoryService impl
// ---------------------------------------------------------------------------

impl MemoryService for HttpMemoryClient {
    fn store(&self, record: &MemoryRecord) -> BenchResult<()> {
        let body = serde_json::to_value(record)?;
        let resp = check(self.agent.post(&self.url("/v1/memories")).send_json(body))?;
        envelope(resp)?;
        debug!("stored memory for subject {}", record.subject);
        Ok(())
    }

    fn recall(&self, request: &RecallRequest) -> BenchResult<RecallResponse> {
        let body = serde_json::to_value(request)?;
        let resp = check(
            self.agent
                .post(&self.url("/v1/memories/recall"))
                .send_json(body),
        )?;
        Ok(serde_json::from_value(envelope(resp)?)?)
    }

    fn delete(&self, id: &str) -> BenchResult<()> {
        let resp = check(self.agent.delete(&self.url(&format!("/v1/memories/{id}"))).call())?;
        envelope(resp)?;
        Ok(())
    }

    fn health(&self) -> BenchResult<ServiceHealth> {
        let resp = check(self.agent.get(&self.url("/health")).call())?;
        decode(resp)
    }
}
