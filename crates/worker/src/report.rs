use bizcred_core::fetch::ProposalSource;
use bizcred_core::normalize::{normalize, normalize_batch};
use bizcred_core::pipeline::present;
use bizcred_core::select::{select_latest, Selection};
use bizcred_core::storage::documents;
use bizcred_core::view::derive_view_model;

pub async fn inspect_store(pool: &sqlx::PgPool, limit: usize) -> anyhow::Result<()> {
    let count = documents::count_documents(pool).await?;
    println!("There are {count} documents in 'proposal_documents'");

    let records = documents::list_documents(pool).await?;
    let batch = normalize_batch(&records);
    if !batch.rejected.is_empty() {
        println!("{} stored documents failed normalization", batch.rejected.len());
    }

    let latest = select_latest(&batch.proposals, limit);
    println!("\nLatest {} proposals:", latest.len());
    for (i, p) in latest.iter().enumerate() {
        println!("\nProposal {}:", i + 1);
        println!("ID: {}", p.id);
        println!("Title: {}", p.title);
        println!("Company: {}", p.company_name);
        println!("Risk Percentage: {}", p.risk_percentage);
        println!("Loan Amount: {}", p.loan_amount);
        println!("Has Financial Metrics: {}", p.metrics.is_some());
    }
    Ok(())
}

pub async fn print_dashboard(
    source: &dyn ProposalSource,
    selection: Selection,
) -> anyhow::Result<()> {
    let records = source.fetch_proposals().await?;
    let presentation = present(&records, selection);

    tracing::info!(
        source = source.source_name(),
        records = records.len(),
        shown = presentation.view_models.len(),
        rejected = presentation.rejected.len(),
        ?selection,
        "dashboard built"
    );

    if presentation.view_models.is_empty() {
        println!("No proposals available");
        return Ok(());
    }

    println!("{}", serde_json::to_string_pretty(&presentation.view_models)?);
    Ok(())
}

pub async fn print_view(source: &dyn ProposalSource, id: &str) -> anyhow::Result<()> {
    let Some(record) = source.fetch_proposal(id).await? else {
        println!("Proposal not found: {id}");
        return Ok(());
    };
    let proposal = normalize(&record)?;
    println!("{}", serde_json::to_string_pretty(&derive_view_model(&proposal))?);
    Ok(())
}
