pub mod http;
pub mod types;

use crate::domain::proposal::RawProposalRecord;
use anyhow::Result;

/// Where raw proposal documents come from. Implementations own transport concerns (timeouts,
/// retries, the backend's status envelope); callers only see records.
#[async_trait::async_trait]
pub trait ProposalSource: Send + Sync {
    fn source_name(&self) -> &'static str;

    /// Every proposal the backend has. A backend that reports a non-success status yields an
    /// empty list.
    async fn fetch_proposals(&self) -> Result<Vec<RawProposalRecord>>;

    async fn fetch_proposal(&self, id: &str) -> Result<Option<RawProposalRecord>>;
}
