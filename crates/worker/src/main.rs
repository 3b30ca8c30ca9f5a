use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bizcred_core::fetch::http::HttpProposalSource;
use bizcred_core::select::{Selection, DEFAULT_LATEST_LIMIT};

mod report;
mod seed;

#[derive(Debug, Parser)]
#[command(name = "bizcred_worker")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Insert the sample proposals into the document store.
    Seed {
        /// Delete every stored proposal before inserting.
        #[arg(long)]
        reset: bool,

        /// Do everything except writing to the database.
        #[arg(long)]
        dry_run: bool,
    },

    /// Print the document count and the latest stored proposals.
    Inspect {
        #[arg(long, default_value_t = DEFAULT_LATEST_LIMIT)]
        limit: usize,
    },

    /// Fetch proposals from the REST backend and print the dashboard view models as JSON.
    Dashboard {
        #[arg(long, default_value_t = DEFAULT_LATEST_LIMIT)]
        limit: usize,

        /// Show the first proposal whose risk is below this percentage instead of the latest N.
        #[arg(long)]
        risk_below: Option<f64>,
    },

    /// Fetch one proposal from the REST backend and print its view model as JSON.
    View { id: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = bizcred_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();

    let res = run(args.command, &settings).await;
    if let Err(err) = &res {
        sentry_anyhow::capture_anyhow(err);
    }
    res
}

async fn run(command: Command, settings: &bizcred_core::config::Settings) -> anyhow::Result<()> {
    match command {
        Command::Seed { reset, dry_run } => {
            let records = bizcred_core::fixtures::sample_proposals();

            if dry_run {
                tracing::info!(
                    reset,
                    dry_run = true,
                    records_len = records.len(),
                    "seed (dry-run)"
                );
                return Ok(());
            }

            let pool = connect(settings).await?;
            match seed::seed_documents(&pool, &records, reset).await? {
                Some(report) => {
                    tracing::info!(
                        deleted = report.deleted,
                        inserted = report.inserted_ids.len(),
                        "seeded proposal documents"
                    );
                }
                None => {
                    tracing::warn!("seed lock not acquired; another seed run in progress");
                }
            }
            Ok(())
        }
        Command::Inspect { limit } => {
            let pool = connect(settings).await?;
            report::inspect_store(&pool, limit).await
        }
        Command::Dashboard { limit, risk_below } => {
            let selection = match risk_below {
                Some(threshold) => {
                    anyhow::ensure!(threshold.is_finite(), "--risk-below must be a finite number");
                    Selection::RiskBelow(threshold)
                }
                None => Selection::Latest(limit),
            };
            let source = HttpProposalSource::from_settings(settings)?;
            report::print_dashboard(&source, selection).await
        }
        Command::View { id } => {
            let source = HttpProposalSource::from_settings(settings)?;
            report::print_view(&source, &id).await
        }
    }
}

async fn connect(settings: &bizcred_core::config::Settings) -> anyhow::Result<sqlx::PgPool> {
    let db_url = settings.require_database_url()?;

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(db_url)
        .await
        .context("connect DATABASE_URL failed")?;

    bizcred_core::storage::migrate(&pool).await?;
    Ok(pool)
}

fn init_sentry(settings: &bizcred_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dashboard_args_parse() {
        let args = Args::try_parse_from(["bizcred_worker", "dashboard", "--risk-below", "50"])
            .unwrap();
        match args.command {
            Command::Dashboard { limit, risk_below } => {
                assert_eq!(limit, DEFAULT_LATEST_LIMIT);
                assert_eq!(risk_below, Some(50.0));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn seed_flags_parse() {
        let args = Args::try_parse_from(["bizcred_worker", "seed", "--reset", "--dry-run"]).unwrap();
        assert!(matches!(
            args.command,
            Command::Seed {
                reset: true,
                dry_run: true
            }
        ));
    }
}
