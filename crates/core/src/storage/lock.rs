use anyhow::Context;

// Advisory locks belong to the Postgres session, so acquire and release must run on the same
// connection. Seeding holds one so two seed runs cannot interleave their deletes and inserts.
const SEED_LOCK_KEY: i64 = 0x4249_5A43_5245; // "BIZCRE"

pub async fn try_acquire_seed_lock(conn: &mut sqlx::PgConnection) -> anyhow::Result<bool> {
    let acquired: (bool,) = sqlx::query_as("SELECT pg_try_advisory_lock($1)")
        .persistent(false)
        .bind(SEED_LOCK_KEY)
        .fetch_one(&mut *conn)
        .await
        .with_context(|| format!("failed to acquire advisory lock (key={SEED_LOCK_KEY})"))?;
    Ok(acquired.0)
}

/// `Ok(false)` when this session did not hold the lock.
pub async fn release_seed_lock(conn: &mut sqlx::PgConnection) -> anyhow::Result<bool> {
    let released: (bool,) = sqlx::query_as("SELECT pg_advisory_unlock($1)")
        .persistent(false)
        .bind(SEED_LOCK_KEY)
        .fetch_one(&mut *conn)
        .await
        .with_context(|| format!("failed to release advisory lock (key={SEED_LOCK_KEY})"))?;
    Ok(released.0)
}
