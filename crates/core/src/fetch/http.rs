use crate::config::Settings;
use crate::domain::proposal::RawProposalRecord;
use crate::fetch::types::{ProposalEnvelope, ProposalsEnvelope};
use crate::fetch::ProposalSource;
use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::Value;
use std::time::Duration;

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_RETRIES: u32 = 3;
const PROPOSALS_PATH: &str = "/api/proposals";

#[derive(Debug, Clone)]
pub struct HttpProposalSource {
    http: reqwest::Client,
    base_url: String,
    retries: u32,
}

impl HttpProposalSource {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let base_url = settings.require_proposals_api_base_url()?.to_string();

        let timeout_secs = std::env::var("PROPOSALS_API_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let retries = std::env::var("PROPOSALS_API_RETRIES")
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(DEFAULT_RETRIES);

        Self::new(base_url, Duration::from_secs(timeout_secs), retries)
    }

    pub fn new(base_url: impl Into<String>, timeout: Duration, retries: u32) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build proposals http client")?;

        Ok(Self {
            http,
            base_url: base_url.into(),
            retries: retries.max(1),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    /// `Ok(None)` for 404. A non-2xx response still counts as an answer when its body is a status
    /// envelope, so the envelope decides; any other non-2xx is an error.
    async fn get_once(&self, path: &str) -> Result<Option<Value>> {
        let url = self.url(path);
        let res = self
            .http
            .get(&url)
            .send()
            .await
            .with_context(|| format!("proposals request failed: {url}"))?;

        let status = res.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let text = res
            .text()
            .await
            .context("failed to read proposals response")?;
        let raw_json = serde_json::from_str::<Value>(&text)
            .with_context(|| format!("proposals response is not valid JSON: {text}"))?;

        if !status.is_success() && !is_envelope(&raw_json) {
            anyhow::bail!("proposals backend HTTP {status}: {raw_json}");
        }

        Ok(Some(raw_json))
    }

    async fn get_with_retries(&self, path: &str) -> Result<Option<Value>> {
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            match self.get_once(path).await {
                Ok(body) => return Ok(body),
                Err(err) => {
                    if attempt >= self.retries {
                        return Err(err);
                    }
                    let backoff = Duration::from_secs(1 << (attempt - 1));
                    tracing::warn!(attempt, ?backoff, path, error = %err, "proposals fetch failed; retrying");
                    tokio::time::sleep(backoff).await;
                }
            }
        }
    }
}

#[async_trait::async_trait]
impl ProposalSource for HttpProposalSource {
    fn source_name(&self) -> &'static str {
        "http_json"
    }

    async fn fetch_proposals(&self) -> Result<Vec<RawProposalRecord>> {
        let Some(body) = self.get_with_retries(PROPOSALS_PATH).await? else {
            tracing::warn!(path = PROPOSALS_PATH, "proposals endpoint not found; treating as empty");
            return Ok(Vec::new());
        };
        let envelope = serde_json::from_value::<ProposalsEnvelope>(body)
            .context("failed to parse proposals response into ProposalsEnvelope")?;
        Ok(envelope.into_records())
    }

    async fn fetch_proposal(&self, id: &str) -> Result<Option<RawProposalRecord>> {
        let path = proposal_path(id);
        let Some(body) = self.get_with_retries(&path).await? else {
            return Ok(None);
        };
        let envelope = serde_json::from_value::<ProposalEnvelope>(body)
            .context("failed to parse proposal response into ProposalEnvelope")?;
        Ok(envelope.into_record())
    }
}

fn is_envelope(body: &Value) -> bool {
    body.get("status").is_some_and(Value::is_string)
}

// Ids are opaque; keep them from breaking out of their path segment.
fn proposal_path(id: &str) -> String {
    format!("{PROPOSALS_PATH}/{}", urlencoding::encode(id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    /// Answers every connection with the same canned response; returns the base url.
    async fn canned_backend(status_line: &'static str, body: &'static str) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            while let Ok((mut sock, _)) = listener.accept().await {
                let mut buf = [0u8; 4096];
                let _ = sock.read(&mut buf).await;
                let res = format!(
                    "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\n\
                     Content-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = sock.write_all(res.as_bytes()).await;
                let _ = sock.shutdown().await;
            }
        });
        format!("http://{addr}")
    }

    fn source(base_url: String) -> HttpProposalSource {
        HttpProposalSource::new(base_url, Duration::from_secs(5), 1).unwrap()
    }

    #[tokio::test]
    async fn backend_error_envelope_over_http_500_is_empty() {
        let base = canned_backend(
            "500 Internal Server Error",
            r#"{"status":"error","message":"Failed to connect to MongoDB"}"#,
        )
        .await;
        let records = source(base).fetch_proposals().await.unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn success_envelope_over_http_yields_records() {
        let base = canned_backend(
            "200 OK",
            r#"{"status":"success","proposals":[{"_id":"a"},{"_id":"b"}]}"#,
        )
        .await;
        let records = source(base).fetch_proposals().await.unwrap();
        assert_eq!(records.len(), 2);
    }

    #[tokio::test]
    async fn non_envelope_server_error_is_an_error() {
        let base = canned_backend("502 Bad Gateway", r#"{"detail":"upstream down"}"#).await;
        assert!(source(base).fetch_proposals().await.is_err());
    }

    #[tokio::test]
    async fn missing_proposal_is_none() {
        let base = canned_backend(
            "404 Not Found",
            r#"{"status":"error","message":"Proposal not found"}"#,
        )
        .await;
        assert_eq!(source(base).fetch_proposal("nope").await.unwrap(), None);
    }

    #[test]
    fn url_joins_without_double_slash() {
        let src = HttpProposalSource::new("http://localhost:5000/", Duration::from_secs(1), 1)
            .unwrap();
        assert_eq!(
            src.url(PROPOSALS_PATH),
            "http://localhost:5000/api/proposals"
        );
    }

    #[test]
    fn proposal_path_escapes_reserved_bytes() {
        assert_eq!(proposal_path("65f1a2b3"), "/api/proposals/65f1a2b3");
        assert_eq!(proposal_path("a/b c"), "/api/proposals/a%2Fb%20c");
    }

    #[test]
    fn success_envelope_yields_records() {
        let v = json!({
            "status": "success",
            "proposals": [{"_id": "a"}, {"_id": "b", "loan_amount": 5}]
        });
        let env: ProposalsEnvelope = serde_json::from_value(v).unwrap();
        assert_eq!(env.into_records().len(), 2);
    }

    #[test]
    fn error_envelope_yields_no_records() {
        let v = json!({"status": "error", "message": "Failed to connect to MongoDB"});
        let env: ProposalsEnvelope = serde_json::from_value(v).unwrap();
        assert!(env.into_records().is_empty());
    }

    #[test]
    fn detail_envelope_without_success_is_none() {
        let v = json!({"status": "error", "message": "Proposal not found"});
        let env: ProposalEnvelope = serde_json::from_value(v).unwrap();
        assert!(env.into_record().is_none());

        let v = json!({"status": "success", "proposal": {"_id": "a"}});
        let env: ProposalEnvelope = serde_json::from_value(v).unwrap();
        assert_eq!(env.into_record(), Some(RawProposalRecord(json!({"_id": "a"}))));
    }
}
