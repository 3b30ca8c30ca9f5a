use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DEFAULT_TITLE: &str = "Untitled Proposal";
pub const DEFAULT_DESCRIPTION: &str = "No description available";
pub const DEFAULT_COMPANY_NAME: &str = "Unnamed Company";
pub const DEFAULT_ANALYSIS: &str = "No analysis available";

/// A proposal document exactly as it came off the wire. Nothing about its shape is trusted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawProposalRecord(pub Value);

impl RawProposalRecord {
    /// First non-null value found under any of `keys`, in order.
    pub fn field(&self, keys: &[&str]) -> Option<&Value> {
        lookup(&self.0, keys)
    }
}

pub(crate) fn lookup<'a>(value: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    let object = value.as_object()?;
    keys.iter()
        .filter_map(|key| object.get(*key))
        .find(|v| !v.is_null())
}

impl From<Value> for RawProposalRecord {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// Fully-defaulted proposal. Serializes with the backend's wire keys so a normalized proposal
/// can be served back out and normalized again unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Proposal {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "proposal_title")]
    pub title: String,
    #[serde(rename = "company_description")]
    pub description: String,
    pub risk_percentage: f64,
    pub loan_amount: f64,
    #[serde(rename = "name")]
    pub company_name: String,
    #[serde(rename = "gemini_analysis")]
    pub analysis_text: String,
    #[serde(
        rename = "financial_metrics",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub metrics: Option<FinancialMetrics>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

/// Monthly samples. The three series are independent in length.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinancialMetrics {
    pub nav: Vec<f64>,
    pub profit_loss: Vec<f64>,
    pub cash_flow: Vec<f64>,
}
