use std::time::Duration;

use reqwest::header::ACCEPT;
use serde_json::Value;
use thiserror::Error;

use crate::model::Step;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Everything that can go wrong between issuing the request and having a
/// usable step list. All variants converge into the diagram's `Failed`
/// state; none is retried.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    #[error("request timed out")]
    Timeout,
    #[error("network error: {0}")]
    Network(String),
    #[error("HTTP error! Status: {0}")]
    Status(u16),
    #[error("malformed workflow response: {0}")]
    Malformed(String),
}

/// Client for the workflow endpoint. One instance issues one request per
/// diagram load; the timeout is enforced by the underlying client, so a
/// stalled server surfaces as `Timeout` rather than hanging the load.
pub struct WorkflowClient {
    client: reqwest::Client,
    url: String,
}

impl WorkflowClient {
    pub fn new(url: impl Into<String>) -> Result<Self, FetchError> {
        Self::with_timeout(url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(url: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| FetchError::Network(err.to_string()))?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub async fn fetch_steps(&self) -> Result<Vec<Step>, FetchError> {
        tracing::info!(url = %self.url, "fetching workflow");
        let response = self
            .client
            .post(&self.url)
            .header(ACCEPT, "application/json")
            .body("")
            .send()
            .await
            .map_err(map_transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body: Value = response.json().await.map_err(map_transport)?;
        let steps = decode_workflow(body)?;
        tracing::info!(steps = steps.len(), "workflow fetched");
        Ok(steps)
    }
}

fn map_transport(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout
    } else if err.is_decode() {
        FetchError::Malformed(err.to_string())
    } else {
        FetchError::Network(err.to_string())
    }
}

/// Decodes the `{ "tree": [...] }` document into steps. Shared by the HTTP
/// path and the local-file path so both produce the same error taxonomy.
pub fn decode_workflow(value: Value) -> Result<Vec<Step>, FetchError> {
    let Some(tree) = value.get("tree") else {
        return Err(FetchError::Malformed("response has no `tree` field".to_string()));
    };
    if !tree.is_array() {
        return Err(FetchError::Malformed("`tree` is not an array".to_string()));
    }
    serde_json::from_value(tree.clone()).map_err(|err| FetchError::Malformed(err.to_string()))
}

/// Parses a raw JSON document (e.g. a file read from disk) into steps.
pub fn decode_workflow_str(body: &str) -> Result<Vec<Step>, FetchError> {
    let value: Value =
        serde_json::from_str(body).map_err(|err| FetchError::Malformed(err.to_string()))?;
    decode_workflow(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_a_tree() {
        let steps = decode_workflow_str(
            r#"{"tree":[{"id":"A","title":"Wing Spar","dependencies":[]},{"id":"B","title":"Fuselage Frame","dependencies":["A"]}]}"#,
        )
        .expect("decode failed");
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[1].dependency_ids(), ["A"]);
    }

    #[test]
    fn missing_tree_is_malformed() {
        let err = decode_workflow_str(r#"{"steps":[]}"#).expect_err("should fail");
        assert!(matches!(err, FetchError::Malformed(_)));
        assert!(err.to_string().contains("tree"));
    }

    #[test]
    fn non_array_tree_is_malformed() {
        let err = decode_workflow_str(r#"{"tree":{"id":"A"}}"#).expect_err("should fail");
        assert!(matches!(err, FetchError::Malformed(_)));
    }

    #[test]
    fn invalid_json_is_malformed() {
        let err = decode_workflow_str("not json").expect_err("should fail");
        assert!(matches!(err, FetchError::Malformed(_)));
    }

    #[test]
    fn timeout_message_names_the_timeout() {
        assert!(FetchError::Timeout.to_string().contains("timed out"));
    }
}
