// src/db/gateway.rs

use async_trait::async_trait;
use serde_json::Value;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::mapping::{ChildRows, Row, RowSet, POSITION},
};

/// Acesso cru às tabelas, linha a linha em JSON. O repositório tipado fica por cima.
#[async_trait]
pub trait RowGateway: Send + Sync {
    async fn select_all(&self, table: &'static str) -> Result<Vec<Row>, AppError>;

    async fn select_by_id(&self, table: &'static str, id: Uuid) -> Result<Option<Row>, AppError>;

    /// Filhos de vários pais numa só consulta (`parent_key = ANY($1)`).
    async fn select_children(
        &self,
        table: &'static str,
        parent_key: &'static str,
        parent_ids: &[Uuid],
    ) -> Result<Vec<Row>, AppError>;

    async fn insert(&self, set: &RowSet) -> Result<(), AppError>;

    /// Atualiza a linha e reescreve as filhas (delete + insert).
    async fn update(&self, id: Uuid, set: &RowSet) -> Result<bool, AppError>;

    /// Filhas saem junto (ON DELETE CASCADE).
    async fn delete(&self, table: &'static str, id: Uuid) -> Result<bool, AppError>;
}

// =========================================================================
//  POSTGRES
// =========================================================================

#[derive(Clone)]
pub struct PgGateway {
    pool: PgPool,
}

impl PgGateway {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn into_rows(values: Vec<Value>) -> Vec<Row> {
    values
        .into_iter()
        .filter_map(|value| match value {
            Value::Object(map) => Some(map),
            _ => None,
        })
        .collect()
}

fn quoted(column: &str) -> String {
    format!("\"{}\"", column.replace('"', "\"\""))
}

async fn insert_row(
    tx: &mut Transaction<'_, Postgres>,
    table: &str,
    row: &Row,
) -> Result<(), AppError> {
    let sql = format!("INSERT INTO {table} SELECT * FROM jsonb_populate_record(NULL::{table}, $1)");
    sqlx::query(&sql)
        .bind(Value::Object(row.clone()))
        .execute(&mut **tx)
        .await?;
    Ok(())
}

async fn write_children(
    tx: &mut Transaction<'_, Postgres>,
    children: &[ChildRows],
) -> Result<(), AppError> {
    for child in children {
        for row in &child.rows {
            insert_row(tx, child.table, row).await?;
        }
    }
    Ok(())
}

#[async_trait]
impl RowGateway for PgGateway {
    async fn select_all(&self, table: &'static str) -> Result<Vec<Row>, AppError> {
        let sql = format!("SELECT to_jsonb(t) FROM {table} t ORDER BY t.created_at");
        let values: Vec<Value> = sqlx::query_scalar(&sql).fetch_all(&self.pool).await?;
        Ok(into_rows(values))
    }

    async fn select_by_id(&self, table: &'static str, id: Uuid) -> Result<Option<Row>, AppError> {
        let sql = format!("SELECT to_jsonb(t) FROM {table} t WHERE t.id = $1");
        let value: Option<Value> = sqlx::query_scalar(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(value.and_then(|v| into_rows(vec![v]).pop()))
    }

    async fn select_children(
        &self,
        table: &'static str,
        parent_key: &'static str,
        parent_ids: &[Uuid],
    ) -> Result<Vec<Row>, AppError> {
        if parent_ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT to_jsonb(c) FROM {table} c WHERE c.{parent_key} = ANY($1) ORDER BY c.{POSITION}"
        );
        let values: Vec<Value> = sqlx::query_scalar(&sql)
            .bind(parent_ids.to_vec())
            .fetch_all(&self.pool)
            .await?;
        Ok(into_rows(values))
    }

    async fn insert(&self, set: &RowSet) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;
        insert_row(&mut tx, set.table, &set.row).await?;
        write_children(&mut tx, &set.children).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn update(&self, id: Uuid, set: &RowSet) -> Result<bool, AppError> {
        let columns: Vec<String> = set
            .row
            .keys()
            .filter(|k| k.as_str() != "id")
            .map(|k| quoted(k))
            .collect();
        if columns.is_empty() {
            return Ok(false);
        }
        let list = columns.join(", ");
        let table = set.table;
        let sql = format!(
            "UPDATE {table} SET ({list}) = (SELECT {list} FROM jsonb_populate_record(NULL::{table}, $1)) WHERE id = $2"
        );

        let mut tx = self.pool.begin().await?;
        let result = sqlx::query(&sql)
            .bind(Value::Object(set.row.clone()))
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        for child in &set.children {
            let sql = format!("DELETE FROM {} WHERE {} = $1", child.table, child.parent_key);
            sqlx::query(&sql).bind(id).execute(&mut *tx).await?;
        }
        write_children(&mut tx, &set.children).await?;
        tx.commit().await?;
        Ok(true)
    }

    async fn delete(&self, table: &'static str, id: Uuid) -> Result<bool, AppError> {
        let sql = format!("DELETE FROM {table} WHERE id = $1");
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }
}
