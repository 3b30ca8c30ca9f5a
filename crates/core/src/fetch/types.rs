use crate::domain::proposal::RawProposalRecord;
use serde::{Deserialize, Serialize};

pub const STATUS_SUCCESS: &str = "success";
pub const STATUS_ERROR: &str = "error";

/// `GET /api/proposals` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProposalsEnvelope {
    pub status: String,
    #[serde(default)]
    pub proposals: Vec<RawProposalRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// `GET /api/proposals/:id` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProposalEnvelope {
    pub status: String,
    #[serde(default)]
    pub proposal: Option<RawProposalRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ProposalsEnvelope {
    pub fn is_success(&self) -> bool {
        self.status == STATUS_SUCCESS
    }

    pub fn into_records(self) -> Vec<RawProposalRecord> {
        if self.is_success() {
            return self.proposals;
        }
        tracing::warn!(
            status = %self.status,
            message = self.message.as_deref().unwrap_or(""),
            "proposals backend returned non-success status; treating as empty"
        );
        Vec::new()
    }
}

impl ProposalEnvelope {
    pub fn into_record(self) -> Option<RawProposalRecord> {
        if self.status == STATUS_SUCCESS {
            return self.proposal;
        }
        tracing::warn!(
            status = %self.status,
            message = self.message.as_deref().unwrap_or(""),
            "proposal backend returned non-success status"
        );
        None
    }
}
