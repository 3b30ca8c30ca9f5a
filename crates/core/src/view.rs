use crate::domain::proposal::{FinancialMetrics, Proposal};
use chrono::{DateTime, Utc};
use serde::Serialize;

pub const LOAN_UNIT: &str = "ETH";
pub const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];
pub const NO_DATA_LABEL: &str = "No Financial Data Available";

const NO_DATA_COLOR: &str = "#9E9E9E";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskTier {
    Low,
    Medium,
    High,
}

impl RiskTier {
    /// Boundaries are inclusive-low: 50 is MEDIUM and 75 is HIGH.
    pub fn from_risk(risk_percentage: f64) -> Self {
        if risk_percentage < 50.0 {
            Self::Low
        } else if risk_percentage < 75.0 {
            Self::Medium
        } else {
            Self::High
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Nav,
    ProfitLoss,
    CashFlow,
}

impl MetricKind {
    pub const ALL: [MetricKind; 3] = [Self::Nav, Self::ProfitLoss, Self::CashFlow];

    pub fn label(self) -> &'static str {
        match self {
            Self::Nav => "Net Asset Value (NAV)",
            Self::ProfitLoss => "Profit/Loss",
            Self::CashFlow => "Cash Flow",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            Self::Nav => "#4CAF50",
            Self::ProfitLoss => "#FF5722",
            Self::CashFlow => "#2196F3",
        }
    }

    fn samples(self, metrics: &FinancialMetrics) -> &[f64] {
        match self {
            Self::Nav => &metrics.nav,
            Self::ProfitLoss => &metrics.profit_loss,
            Self::CashFlow => &metrics.cash_flow,
        }
    }
}

/// One bar chart. `categories` and `values` always have the same length, at most 12.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub label: String,
    pub categories: Vec<String>,
    pub values: Vec<f64>,
    pub color: &'static str,
}

impl ChartSeries {
    fn from_samples(kind: MetricKind, samples: &[f64]) -> Self {
        let values: Vec<f64> = samples.iter().copied().take(MONTHS.len()).collect();
        Self {
            label: kind.label().to_string(),
            categories: month_labels(values.len()),
            values,
            color: kind.color(),
        }
    }

    fn no_data() -> Self {
        Self {
            label: NO_DATA_LABEL.to_string(),
            categories: month_labels(MONTHS.len()),
            values: vec![0.0; MONTHS.len()],
            color: NO_DATA_COLOR,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewModel {
    pub id: String,
    pub title: String,
    pub description: String,
    pub company_name: String,
    pub analysis_text: String,
    pub risk_percentage: f64,
    pub risk_tier: RiskTier,
    pub risk_display: String,
    pub loan_amount_display: String,
    pub timestamp: Option<DateTime<Utc>>,
    /// NAV, profit/loss, cash flow, in that order.
    pub charts: [ChartSeries; 3],
}

pub fn derive_view_model(p: &Proposal) -> ViewModel {
    ViewModel {
        id: p.id.clone(),
        title: p.title.clone(),
        description: p.description.clone(),
        company_name: p.company_name.clone(),
        analysis_text: p.analysis_text.clone(),
        risk_percentage: p.risk_percentage,
        risk_tier: RiskTier::from_risk(p.risk_percentage),
        risk_display: format_risk_percentage(p.risk_percentage),
        loan_amount_display: format_loan_amount(p.loan_amount),
        timestamp: p.timestamp,
        charts: chart_series(p.metrics.as_ref()),
    }
}

pub fn chart_series(metrics: Option<&FinancialMetrics>) -> [ChartSeries; 3] {
    match metrics {
        Some(m) => MetricKind::ALL.map(|kind| ChartSeries::from_samples(kind, kind.samples(m))),
        None => [
            ChartSeries::no_data(),
            ChartSeries::no_data(),
            ChartSeries::no_data(),
        ],
    }
}

/// `75000.0` -> `"75,000 ETH"`. Up to three fraction digits survive, trailing zeros dropped.
pub fn format_loan_amount(amount: f64) -> String {
    format!("{} {LOAN_UNIT}", group_thousands(amount))
}

pub fn format_risk_percentage(risk_percentage: f64) -> String {
    format!("{risk_percentage:.1}%")
}

fn month_labels(n: usize) -> Vec<String> {
    MONTHS.iter().take(n).map(|m| m.to_string()).collect()
}

// Above this every f64 is an integer, and scaling by 1000 could overflow to infinity.
const EXACT_INTEGER_LIMIT: f64 = 9_007_199_254_740_992.0;

fn group_thousands(value: f64) -> String {
    let rounded = if value.abs() < EXACT_INTEGER_LIMIT {
        (value * 1000.0).round() / 1000.0
    } else {
        value
    };
    let text = format!("{:.3}", rounded.abs());
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), ""));
    let frac_part = frac_part.trim_end_matches('0');

    let mut out = String::with_capacity(text.len() + int_part.len() / 3 + 1);
    if rounded < 0.0 {
        out.push('-');
    }
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if !frac_part.is_empty() {
        out.push('.');
        out.push_str(frac_part);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn proposal(risk: f64, metrics: Option<FinancialMetrics>) -> Proposal {
        Proposal {
            id: "x".to_string(),
            title: "T".to_string(),
            description: "D".to_string(),
            risk_percentage: risk,
            loan_amount: 75_000.0,
            company_name: "C".to_string(),
            analysis_text: "A".to_string(),
            metrics,
            timestamp: None,
        }
    }

    #[test]
    fn risk_tier_boundaries_are_inclusive_low() {
        let cases = [
            (49.9, RiskTier::Low),
            (50.0, RiskTier::Medium),
            (74.9, RiskTier::Medium),
            (75.0, RiskTier::High),
            (100.0, RiskTier::High),
        ];
        for (risk, tier) in cases {
            assert_eq!(derive_view_model(&proposal(risk, None)).risk_tier, tier, "risk {risk}");
        }
    }

    #[test]
    fn unclamped_risk_still_classifies() {
        assert_eq!(RiskTier::from_risk(-5.0), RiskTier::Low);
        assert_eq!(RiskTier::from_risk(180.0), RiskTier::High);
    }

    #[test]
    fn loan_amount_is_grouped() {
        assert_eq!(format_loan_amount(75_000.0), "75,000 ETH");
        assert_eq!(format_loan_amount(0.0), "0 ETH");
        assert_eq!(format_loan_amount(999.0), "999 ETH");
        assert_eq!(format_loan_amount(1_234_567.0), "1,234,567 ETH");
        assert_eq!(format_loan_amount(1234.5), "1,234.5 ETH");
        assert_eq!(format_loan_amount(0.12345), "0.123 ETH");
        assert_eq!(format_loan_amount(-1500.0), "-1,500 ETH");
    }

    #[test]
    fn huge_loan_amounts_keep_their_digits() {
        assert_eq!(
            format_loan_amount(1e20),
            "100,000,000,000,000,000,000 ETH"
        );

        let huge = format_loan_amount(1e306);
        assert!(!huge.contains("inf"), "{huge}");
        let digits = huge.strip_suffix(" ETH").unwrap().replace(',', "");
        assert_eq!(digits.len(), 307, "{huge}");
        assert!(digits.bytes().all(|b| b.is_ascii_digit()), "{huge}");
    }

    #[test]
    fn risk_percentage_has_one_decimal() {
        assert_eq!(format_risk_percentage(45.5), "45.5%");
        assert_eq!(format_risk_percentage(0.0), "0.0%");
        assert_eq!(format_risk_percentage(82.84), "82.8%");
    }

    #[test]
    fn absent_metrics_give_three_flat_series() {
        let vm = derive_view_model(&proposal(10.0, None));
        assert_eq!(vm.charts.len(), 3);
        for chart in &vm.charts {
            assert_eq!(chart.label, NO_DATA_LABEL);
            assert_eq!(chart.values, vec![0.0; 12]);
            assert_eq!(chart.categories.len(), 12);
            assert_eq!(chart.categories[0], "Jan");
            assert_eq!(chart.categories[11], "Dec");
        }
    }

    #[test]
    fn short_series_are_not_padded() {
        let metrics = FinancialMetrics {
            nav: vec![1.0, 2.0, 3.0, 4.0, 5.0],
            profit_loss: vec![],
            cash_flow: vec![-1.0; 12],
        };
        let vm = derive_view_model(&proposal(10.0, Some(metrics)));
        let [nav, pl, cf] = &vm.charts;

        assert_eq!(nav.label, "Net Asset Value (NAV)");
        assert_eq!(nav.categories, vec!["Jan", "Feb", "Mar", "Apr", "May"]);
        assert_eq!(nav.values, vec![1.0, 2.0, 3.0, 4.0, 5.0]);

        assert_eq!(pl.label, "Profit/Loss");
        assert!(pl.categories.is_empty());
        assert!(pl.values.is_empty());

        assert_eq!(cf.label, "Cash Flow");
        assert_eq!(cf.values, vec![-1.0; 12]);
    }

    #[test]
    fn long_series_are_truncated_to_twelve() {
        let samples: Vec<f64> = (0..20).map(f64::from).collect();
        let metrics = FinancialMetrics {
            nav: samples.clone(),
            profit_loss: samples.clone(),
            cash_flow: samples,
        };
        let vm = derive_view_model(&proposal(10.0, Some(metrics)));
        for chart in &vm.charts {
            assert_eq!(chart.values.len(), 12);
            assert_eq!(chart.categories.len(), chart.values.len());
            assert_eq!(chart.values[11], 11.0);
        }
    }

    #[test]
    fn derivation_is_deterministic() {
        let metrics = FinancialMetrics {
            nav: vec![100_000.0, 102_000.0],
            profit_loss: vec![-7_000.0],
            cash_flow: vec![0.5],
        };
        let p = proposal(45.5, Some(metrics));
        let a = serde_json::to_string(&derive_view_model(&p)).unwrap();
        let b = serde_json::to_string(&derive_view_model(&p)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn tier_serializes_upper_case() {
        let v = serde_json::to_value(RiskTier::Medium).unwrap();
        assert_eq!(v, serde_json::json!("MEDIUM"));
    }
}
