use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::PgPool;

use crate::lead_store::{check_column, LeadStore, StoreError};
use crate::models::{LeadKind, StoredLead};

/// Lead storage backed by PostgreSQL.
///
/// One generic insert serves every lead table: the record is bound as a
/// single `jsonb` parameter and expanded with `jsonb_populate_record`, so
/// column types come from the table definition. Only the columns present in
/// the record are listed, which keeps `id`, `status` and `created_at`
/// defaults in effect when the record leaves them out.
pub struct PgLeadStore {
    pool: PgPool,
}

impl PgLeadStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Builds the insert statement for `table` with the given columns.
pub fn insert_sql<'a>(
    table: &str,
    columns: impl Iterator<Item = &'a String>,
) -> Result<String, StoreError> {
    let columns = columns
        .map(|c| check_column(c).map(|c| format!("\"{}\"", c)))
        .collect::<Result<Vec<_>, _>>()?
        .join(", ");

    if columns.is_empty() {
        return Err(StoreError::MalformedRow("record has no columns".to_string()));
    }

    Ok(format!(
        "INSERT INTO {table} ({columns}) \
         SELECT {columns} FROM jsonb_populate_record(NULL::{table}, $1) \
         RETURNING to_jsonb({table}.*)"
    ))
}

#[async_trait]
impl LeadStore for PgLeadStore {
    async fn insert(
        &self,
        kind: LeadKind,
        record: Map<String, Value>,
    ) -> Result<StoredLead, StoreError> {
        let table = kind.table();
        let sql = insert_sql(table, record.keys())?;

        let row: Value = sqlx::query_scalar(&sql)
            .bind(Value::Object(record))
            .fetch_one(&self.pool)
            .await?;

        tracing::debug!("Inserted row into {}", table);
        StoredLead::from_row(row)
    }

    async fn list(&self, kind: LeadKind, limit: i64) -> Result<Vec<StoredLead>, StoreError> {
        let table = kind.table();
        let sql = format!(
            "SELECT to_jsonb(t.*) FROM {table} t ORDER BY t.created_at DESC LIMIT $1"
        );

        let rows: Vec<Value> = sqlx::query_scalar(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(StoredLead::from_row).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_sql_lists_only_given_columns() {
        let columns = vec!["full_name".to_string(), "status".to_string()];

        let sql = insert_sql("contact_submissions", columns.iter()).unwrap();

        assert_eq!(
            sql,
            "INSERT INTO contact_submissions (\"full_name\", \"status\") \
             SELECT \"full_name\", \"status\" FROM jsonb_populate_record(NULL::contact_submissions, $1) \
             RETURNING to_jsonb(contact_submissions.*)"
        );
    }

    #[test]
    fn test_insert_sql_rejects_unsafe_columns() {
        let columns = vec!["full_name\" text); --".to_string()];
        assert!(matches!(
            insert_sql("appointments", columns.iter()),
            Err(StoreError::InvalidColumn(_))
        ));
    }

    #[test]
    fn test_insert_sql_requires_columns() {
        let columns: Vec<String> = Vec::new();
        assert!(insert_sql("appointments", columns.iter()).is_err());
    }
}
