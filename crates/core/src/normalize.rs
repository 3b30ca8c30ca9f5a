use crate::domain::error::InvalidRecordError;
use crate::domain::proposal::{
    lookup, FinancialMetrics, Proposal, RawProposalRecord, DEFAULT_ANALYSIS,
    DEFAULT_COMPANY_NAME, DEFAULT_DESCRIPTION, DEFAULT_TITLE,
};
use chrono::{DateTime, Utc};
use serde_json::Value;

const ID_KEYS: &[&str] = &["_id", "id"];
const TITLE_KEYS: &[&str] = &["proposal_title", "title"];
const DESCRIPTION_KEYS: &[&str] = &["company_description", "description"];
const RISK_KEYS: &[&str] = &["risk_percentage", "riskPercentage"];
const LOAN_KEYS: &[&str] = &["loan_amount", "loanAmount"];
const COMPANY_KEYS: &[&str] = &["name", "company_name", "companyName"];
const ANALYSIS_KEYS: &[&str] = &["gemini_analysis", "analysis", "analysisText"];
const METRICS_KEYS: &[&str] = &["financial_metrics", "metrics"];
const TIMESTAMP_KEYS: &[&str] = &["timestamp"];

const NAV_KEYS: &[&str] = &["nav"];
const PROFIT_LOSS_KEYS: &[&str] = &["profit_loss", "profitLoss"];
const CASH_FLOW_KEYS: &[&str] = &["cash_flow", "cashFlow"];

/// Result of normalizing a whole fetch response.
#[derive(Debug, Clone, Default)]
pub struct NormalizedBatch {
    pub proposals: Vec<Proposal>,
    pub rejected: Vec<InvalidRecordError>,
}

/// Turns an untrusted record into a [`Proposal`]. Every field except the id falls back to its
/// default; only a missing or blank id is an error.
pub fn normalize(raw: &RawProposalRecord) -> Result<Proposal, InvalidRecordError> {
    let id = non_empty_str(raw.field(ID_KEYS))
        .ok_or_else(|| InvalidRecordError::new("missing or empty id"))?;

    Ok(Proposal {
        id,
        title: string_or(raw.field(TITLE_KEYS), DEFAULT_TITLE),
        description: string_or(raw.field(DESCRIPTION_KEYS), DEFAULT_DESCRIPTION),
        risk_percentage: number_or_zero(raw.field(RISK_KEYS)),
        loan_amount: number_or_zero(raw.field(LOAN_KEYS)),
        company_name: string_or(raw.field(COMPANY_KEYS), DEFAULT_COMPANY_NAME),
        analysis_text: string_or(raw.field(ANALYSIS_KEYS), DEFAULT_ANALYSIS),
        metrics: raw.field(METRICS_KEYS).and_then(metrics),
        timestamp: raw.field(TIMESTAMP_KEYS).and_then(timestamp),
    })
}

/// Normalizes every record independently. A record without an id is logged and skipped; it
/// never takes its siblings down with it.
pub fn normalize_batch(records: &[RawProposalRecord]) -> NormalizedBatch {
    let mut batch = NormalizedBatch {
        proposals: Vec::with_capacity(records.len()),
        rejected: Vec::new(),
    };

    for (index, raw) in records.iter().enumerate() {
        match normalize(raw) {
            Ok(proposal) => batch.proposals.push(proposal),
            Err(err) => {
                let err = err.at(index);
                tracing::warn!(index, error = %err, "skipping proposal record");
                batch.rejected.push(err);
            }
        }
    }

    batch
}

fn non_empty_str(value: Option<&Value>) -> Option<String> {
    let s = value?.as_str()?.trim();
    (!s.is_empty()).then(|| s.to_string())
}

fn string_or(value: Option<&Value>, default: &str) -> String {
    non_empty_str(value).unwrap_or_else(|| default.to_string())
}

fn number_or_zero(value: Option<&Value>) -> f64 {
    value
        .and_then(Value::as_f64)
        .filter(|n| n.is_finite())
        .unwrap_or(0.0)
}

fn metrics(value: &Value) -> Option<FinancialMetrics> {
    Some(FinancialMetrics {
        nav: series(lookup(value, NAV_KEYS)?)?,
        profit_loss: series(lookup(value, PROFIT_LOSS_KEYS)?)?,
        cash_flow: series(lookup(value, CASH_FLOW_KEYS)?)?,
    })
}

// All-or-nothing: one non-numeric sample makes the whole series unusable.
fn series(value: &Value) -> Option<Vec<f64>> {
    value
        .as_array()?
        .iter()
        .map(|v| v.as_f64().filter(|n| n.is_finite()))
        .collect()
}

fn timestamp(value: &Value) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value.as_str()?)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}
