use crate::domain::proposal::Proposal;

pub const DEFAULT_LATEST_LIMIT: usize = 3;
pub const DEFAULT_RISK_THRESHOLD: f64 = 50.0;

/// Which proposals a view presents, and in what order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Selection {
    Latest(usize),
    RiskBelow(f64),
}

impl Selection {
    pub fn apply<'a>(&self, proposals: &'a [Proposal]) -> Vec<&'a Proposal> {
        match *self {
            Self::Latest(n) => select_latest(proposals, n),
            Self::RiskBelow(threshold) => select_by_risk_below(proposals, threshold)
                .into_iter()
                .collect(),
        }
    }
}

impl Default for Selection {
    fn default() -> Self {
        Self::Latest(DEFAULT_LATEST_LIMIT)
    }
}

/// Top `n` by id in reverse lexicographic (byte-wise) order. Ids are opaque strings here; only
/// store-generated ids carry a time prefix that makes this order track recency.
pub fn select_latest(proposals: &[Proposal], n: usize) -> Vec<&Proposal> {
    let mut sorted: Vec<&Proposal> = proposals.iter().collect();
    sorted.sort_by(|a, b| b.id.cmp(&a.id));
    sorted.truncate(n);
    sorted
}

/// First proposal, in input order, whose risk is strictly below `threshold`.
pub fn select_by_risk_below(proposals: &[Proposal], threshold: f64) -> Option<&Proposal> {
    proposals.iter().find(|p| p.risk_percentage < threshold)
}
