use crate::domain::proposal::RawProposalRecord;
use anyhow::Context;
use chrono::{DateTime, Utc};
use serde_json::Value;

const ID_KEY: &str = "_id";

/// 24 lowercase hex chars: 8 for the unix second, 16 random. Lexicographic order of two ids
/// follows their creation second; within one second it is arbitrary.
pub fn new_document_id(now: DateTime<Utc>) -> String {
    let secs = now.timestamp().clamp(0, u32::MAX as i64) as u32;
    let entropy = uuid::Uuid::new_v4().simple().to_string();
    format!("{secs:08x}{}", &entropy[..16])
}

/// Inserts every document in one transaction. A document that already carries a string `_id`
/// keeps it; the rest get a generated one. The id lives in its own column, not in the JSON.
pub async fn insert_documents(
    pool: &sqlx::PgPool,
    documents: &[RawProposalRecord],
) -> anyhow::Result<Vec<String>> {
    let mut tx = pool.begin().await.context("begin transaction failed")?;
    let now = Utc::now();
    let mut ids = Vec::with_capacity(documents.len());

    for (index, doc) in documents.iter().enumerate() {
        let mut body = doc.0.clone();
        let Some(object) = body.as_object_mut() else {
            anyhow::bail!("proposal document at index {index} is not a JSON object");
        };
        let id = match object.remove(ID_KEY) {
            Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
            _ => new_document_id(now),
        };

        sqlx::query(
            "INSERT INTO proposal_documents (id, document, created_at) \
             VALUES ($1, $2, $3)",
        )
        .bind(&id)
        .bind(body)
        .bind(now)
        .execute(&mut *tx)
        .await
        .with_context(|| format!("insert proposal_documents failed (id={id})"))?;

        ids.push(id);
    }

    tx.commit().await.context("commit transaction failed")?;
    Ok(ids)
}

pub async fn list_documents(pool: &sqlx::PgPool) -> anyhow::Result<Vec<RawProposalRecord>> {
    let rows = sqlx::query_as::<_, (String, Value)>(
        "SELECT id, document FROM proposal_documents ORDER BY created_at ASC, id ASC",
    )
    .fetch_all(pool)
    .await
    .context("select proposal_documents failed")?;

    Ok(rows
        .into_iter()
        .map(|(id, document)| with_id(id, document))
        .collect())
}

pub async fn fetch_document(
    pool: &sqlx::PgPool,
    id: &str,
) -> anyhow::Result<Option<RawProposalRecord>> {
    let row = sqlx::query_as::<_, (String, Value)>(
        "SELECT id, document FROM proposal_documents WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .with_context(|| format!("select proposal_documents failed (id={id})"))?;

    Ok(row.map(|(id, document)| with_id(id, document)))
}

pub async fn count_documents(pool: &sqlx::PgPool) -> anyhow::Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM proposal_documents")
        .fetch_one(pool)
        .await
        .context("count proposal_documents failed")?;
    Ok(count)
}

pub async fn delete_all_documents(pool: &sqlx::PgPool) -> anyhow::Result<u64> {
    let res = sqlx::query("DELETE FROM proposal_documents")
        .execute(pool)
        .await
        .context("delete proposal_documents failed")?;
    Ok(res.rows_affected())
}

fn with_id(id: String, mut document: Value) -> RawProposalRecord {
    if let Some(object) = document.as_object_mut() {
        object.insert(ID_KEY.to_string(), Value::String(id));
    }
    RawProposalRecord(document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn document_ids_are_hex_and_time_ordered() {
        let earlier = Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap();
        let later = Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 1).unwrap();
        let a = new_document_id(earlier);
        let b = new_document_id(later);

        assert_eq!(a.len(), 24);
        assert!(a.bytes().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert!(b > a);
        assert_eq!(&a[..8], format!("{:08x}", earlier.timestamp()));
    }

    #[test]
    fn ids_from_the_same_second_differ() {
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap();
        assert_ne!(new_document_id(now), new_document_id(now));
    }

    #[test]
    fn stored_id_is_injected_under_underscore_id() {
        let rec = with_id("abc".to_string(), json!({"proposal_title": "T"}));
        assert_eq!(rec.field(&["_id"]), Some(&json!("abc")));
        assert_eq!(rec.field(&["proposal_title"]), Some(&json!("T")));
    }
}
