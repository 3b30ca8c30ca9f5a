use crate::domain::error::InvalidRecordError;
use crate::domain::proposal::RawProposalRecord;
use crate::normalize::normalize_batch;
use crate::select::Selection;
use crate::view::{derive_view_model, ViewModel};
use serde::Serialize;

/// What a dashboard renders. An empty `view_models` is the "no proposals available" state, not
/// a failure.
#[derive(Debug, Clone, Serialize)]
pub struct Presentation {
    pub view_models: Vec<ViewModel>,
    #[serde(skip)]
    pub rejected: Vec<InvalidRecordError>,
}

/// Normalize every record, pick the ones `selection` wants, derive a view model for each.
pub fn present(records: &[RawProposalRecord], selection: Selection) -> Presentation {
    let batch = normalize_batch(records);
    let view_models = selection
        .apply(&batch.proposals)
        .into_iter()
        .map(derive_view_model)
        .collect();

    tracing::debug!(
        records = records.len(),
        normalized = batch.proposals.len(),
        rejected = batch.rejected.len(),
        ?selection,
        "proposal pipeline"
    );

    Presentation {
        view_models,
        rejected: batch.rejected,
    }
}
