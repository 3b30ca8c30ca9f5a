//! Sample proposal documents for seeding a development store and for tests. Nothing in the
//! normalize/select/derive path reads from here.

use crate::domain::proposal::RawProposalRecord;
use serde_json::json;

/// Four documents in the backend's wire shape, without `_id`; the store assigns ids on insert.
pub fn sample_proposals() -> Vec<RawProposalRecord> {
    vec![
        json!({
            "proposal_title": "TechStart Inc. Expansion Loan",
            "company_description": "Technology startup seeking funding for market expansion",
            "name": "TechStart Inc.",
            "risk_percentage": 45.5,
            "loan_amount": 75000,
            "gemini_analysis": analysis(
                "TechStart Inc. Loan Proposal",
                "Overall risk score: 45.5% (Moderate Risk)",
                "**APPROVE** this loan proposal: stable asset values and positive cash flow.",
            ),
            "financial_metrics": {
                "nav": [100000, 102000, 104000, 106000, 108000, 110000, 112000, 114000, 116000, 118000, 120000, 122000],
                "profit_loss": [10000, 12000, 14000, 16000, 18000, 20000, 22000, 24000, 26000, 28000, 30000, 32000],
                "cash_flow": [5000, 7000, 9000, 11000, 13000, 15000, 17000, 19000, 21000, 23000, 25000, 27000]
            }
        }),
        json!({
            "proposal_title": "GreenEnergy Solutions Project",
            "company_description": "Renewable energy company seeking funding for solar panel installation project",
            "name": "GreenEnergy Solutions",
            "risk_percentage": 35.5,
            "loan_amount": 120000,
            "gemini_analysis": analysis(
                "GreenEnergy Solutions Project",
                "Overall risk score: 35.5% (Low Risk)",
                "**CONDITIONAL APPROVAL**: stricter reporting, additional collateral, quarterly reviews.",
            ),
            "financial_metrics": {
                "nav": [150000, 148000, 146000, 144000, 142000, 140000, 138000, 136000, 134000, 132000, 130000, 128000],
                "profit_loss": [15000, 13000, 11000, 9000, 7000, 5000, 3000, 1000, -1000, -3000, -5000, -7000],
                "cash_flow": [8000, 6000, 4000, 2000, 0, -2000, -4000, -6000, -8000, -10000, -12000, -14000]
            }
        }),
        json!({
            "proposal_title": "Amish Bahi's Loan Proposal",
            "company_description": "Business expansion proposal for retail operations",
            "risk_percentage": 82.8,
            "loan_amount": 50000,
            "gemini_analysis": analysis(
                "Amish Bahi's Loan Proposal",
                "Overall risk score: 82.8% (High Risk)",
                "**REJECT** this loan proposal: declining asset values and inconsistent cash flow.",
            ),
            "financial_metrics": {
                "nav": [100000, 95000, 92000, 90000, 88000, 85000, 82000, 80000, 78000, 75000, 72000, 70000],
                "profit_loss": [10000, 8000, 6000, 4000, 2000, 0, -2000, -4000, -6000, -8000, -10000, -12000],
                "cash_flow": [5000, 3000, 1000, -1000, -3000, -5000, -7000, -9000, -11000, -13000, -15000, -17000]
            }
        }),
        json!({
            "proposal_title": "TechStart Innovation Fund",
            "company_description": "Early-stage technology startup seeking seed funding",
            "name": "TechStart Labs",
            "risk_percentage": 65.2,
            "loan_amount": 75000,
            "gemini_analysis": analysis(
                "TechStart Innovation Fund",
                "Overall risk score: 65.2% (Moderate Risk)",
                "**CONDITIONAL APPROVAL**: milestone-based releases and quarterly progress reports.",
            ),
            "financial_metrics": {
                "nav": [80000, 82000, 84000, 86000, 88000, 90000, 92000, 94000, 96000, 98000, 100000, 102000],
                "profit_loss": [-5000, -3000, -1000, 1000, 3000, 5000, 7000, 9000, 11000, 13000, 15000, 17000],
                "cash_flow": [-3000, -1000, 1000, 3000, 5000, 7000, 9000, 11000, 13000, 15000, 17000, 19000]
            }
        }),
    ]
    .into_iter()
    .map(RawProposalRecord)
    .collect()
}

fn analysis(subject: &str, risk_line: &str, recommendation: &str) -> String {
    format!(
        "# Financial Analysis of {subject}\n\n## Risk Assessment\n- {risk_line}\n\n## Recommendation\n{recommendation}\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize;

    #[test]
    fn samples_have_no_ids_until_stored() {
        for record in sample_proposals() {
            assert!(normalize(&record).is_err());
        }
    }

    #[test]
    fn samples_carry_full_metrics() {
        for mut record in sample_proposals() {
            record.0["_id"] = json!("x");
            let p = normalize(&record).unwrap();
            let m = p.metrics.expect("fixture metrics");
            assert_eq!(m.nav.len(), 12);
            assert_eq!(m.profit_loss.len(), 12);
            assert_eq!(m.cash_flow.len(), 12);
        }
    }
}
