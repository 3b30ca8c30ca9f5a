use anyhow::Context;
use sqlx::Connection;
use bizcred_core::domain::proposal::RawProposalRecord;
use bizcred_core::storage::{documents, lock};

#[derive(Debug, Default)]
pub struct SeedReport {
    pub deleted: u64,
    pub inserted_ids: Vec<String>,
}

/// Writes `records` into the document store under the seed lock. With `reset`, existing
/// documents are deleted first. Returns `None` when another seed run holds the lock.
pub async fn seed_documents(
    pool: &sqlx::PgPool,
    records: &[RawProposalRecord],
    reset: bool,
) -> anyhow::Result<Option<SeedReport>> {
    anyhow::ensure!(!records.is_empty(), "seed records must be non-empty");

    let mut conn = pool.acquire().await.context("acquire seed connection failed")?;
    if !lock::try_acquire_seed_lock(&mut *conn).await? {
        return Ok(None);
    }

    let result = write(pool, records, reset).await;
    let unlock = lock::release_seed_lock(&mut *conn).await;
    if !returnable_after_unlock(unlock) {
        // Closing the session drops its advisory locks; a pooled connection would keep it.
        if let Err(err) = conn.detach().close().await {
            tracing::warn!(error = %err, "closing seed connection failed");
        }
    }
    result.map(Some)
}

/// Whether the seed connection may go back to the pool after the unlock attempt.
fn returnable_after_unlock(unlock: anyhow::Result<bool>) -> bool {
    match unlock {
        Ok(true) => true,
        Ok(false) => {
            tracing::warn!("seed lock was not held at release");
            true
        }
        Err(err) => {
            tracing::warn!(error = %err, "seed lock release failed; closing the connection");
            false
        }
    }
}

async fn write(
    pool: &sqlx::PgPool,
    records: &[RawProposalRecord],
    reset: bool,
) -> anyhow::Result<SeedReport> {
    let mut report = SeedReport::default();

    if reset {
        report.deleted = documents::delete_all_documents(pool).await?;
        tracing::info!(deleted = report.deleted, "cleared proposal documents");
    }

    report.inserted_ids = documents::insert_documents(pool, records).await?;
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_unlock_keeps_connection_out_of_pool() {
        let err = anyhow::anyhow!("connection reset by peer");
        assert!(!returnable_after_unlock(Err(err)));
    }

    #[test]
    fn clean_or_missing_lock_returns_connection() {
        assert!(returnable_after_unlock(Ok(true)));
        assert!(returnable_after_unlock(Ok(false)));
    }
}
