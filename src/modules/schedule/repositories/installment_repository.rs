// SQLite persistence for installment schedules.
//
// The reconciler talks to storage through the `InstallmentStore` trait so it
// can be exercised against an in-memory store in tests; this file also holds
// the production implementation backed by the app's local SQLite database.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use sqlx::{Sqlite, SqlitePool, Transaction};
use std::str::FromStr;

use crate::core::{AppError, Result};
use crate::modules::schedule::models::{Installment, StoredInstallment};

/// Narrow storage surface the reconciler needs.
///
/// Each call is durable on its own; cross-call atomicity is only guaranteed
/// by `replace_installments`, which runs the blanket soft-delete and the
/// fresh inserts inside one transaction.
#[async_trait]
pub trait InstallmentStore: Send + Sync {
    /// All non-deleted rows for a sale, ordered by id ascending
    async fn load_active(&self, sale_id: i64) -> Result<Vec<StoredInstallment>>;

    /// Insert fresh rows; returns them with store-assigned ids
    async fn insert_installments(&self, installments: &[Installment]) -> Result<Vec<Installment>>;

    /// Mark rows deleted, stamping deleted_at and updated_at
    async fn soft_delete_installments(&self, ids: &[i64], deleted_at: NaiveDateTime) -> Result<()>;

    /// Atomically soft-delete `stale_ids` and insert `fresh` in one transaction
    async fn replace_installments(
        &self,
        stale_ids: &[i64],
        fresh: &[Installment],
        now: NaiveDateTime,
    ) -> Result<Vec<Installment>>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Installment>>;

    async fn update_installment(&self, installment: &Installment) -> Result<()>;
}

/// Repository for installment database operations
pub struct SqliteInstallmentRepository {
    pool: SqlitePool,
}

impl SqliteInstallmentRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn insert_with_tx(
        tx: &mut Transaction<'_, Sqlite>,
        installment: &Installment,
    ) -> Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO installments (
                sale_id, due_date, pay_date, amount, commission_amount,
                paid, paid_at, deleted, deleted_at, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(installment.sale_id)
        .bind(installment.due_date)
        .bind(installment.pay_date)
        .bind(installment.amount.to_string())
        .bind(installment.commission_amount.to_string())
        .bind(installment.paid)
        .bind(installment.paid_at)
        .bind(installment.deleted)
        .bind(installment.deleted_at)
        .bind(installment.created_at)
        .bind(installment.updated_at)
        .execute(tx.as_mut())
        .await?;

        Ok(result.last_insert_rowid())
    }

    async fn soft_delete_with_tx(
        tx: &mut Transaction<'_, Sqlite>,
        ids: &[i64],
        deleted_at: NaiveDateTime,
    ) -> Result<()> {
        for id in ids {
            sqlx::query(
                r#"
                UPDATE installments
                SET deleted = 1, deleted_at = ?, updated_at = ?
                WHERE id = ? AND deleted = 0
                "#,
            )
            .bind(deleted_at)
            .bind(deleted_at)
            .bind(id)
            .execute(tx.as_mut())
            .await?;
        }

        Ok(())
    }
}

#[async_trait]
impl InstallmentStore for SqliteInstallmentRepository {
    async fn load_active(&self, sale_id: i64) -> Result<Vec<StoredInstallment>> {
        let rows = sqlx::query_as::<_, InstallmentRow>(
            r#"
            SELECT
                id, sale_id, due_date, pay_date, amount, commission_amount,
                paid, paid_at, created_at, updated_at
            FROM installments
            WHERE sale_id = ? AND deleted = 0
            ORDER BY id ASC
            "#,
        )
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(|row| row.try_into()).collect()
    }

    async fn insert_installments(&self, installments: &[Installment]) -> Result<Vec<Installment>> {
        if installments.is_empty() {
            return Ok(Vec::new());
        }

        let mut tx = self.pool.begin().await?;

        let mut inserted = Vec::with_capacity(installments.len());
        for installment in installments {
            let id = Self::insert_with_tx(&mut tx, installment).await?;
            let mut assigned = installment.clone();
            assigned.id = id;
            inserted.push(assigned);
        }

        tx.commit().await?;

        Ok(inserted)
    }

    async fn soft_delete_installments(&self, ids: &[i64], deleted_at: NaiveDateTime) -> Result<()> {
        if ids.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await?;
        Self::soft_delete_with_tx(&mut tx, ids, deleted_at).await?;
        tx.commit().await?;

        Ok(())
    }

    async fn replace_installments(
        &self,
        stale_ids: &[i64],
        fresh: &[Installment],
        now: NaiveDateTime,
    ) -> Result<Vec<Installment>> {
        let mut tx = self.pool.begin().await?;

        Self::soft_delete_with_tx(&mut tx, stale_ids, now).await?;

        let mut inserted = Vec::with_capacity(fresh.len());
        for installment in fresh {
            let id = Self::insert_with_tx(&mut tx, installment).await?;
            let mut assigned = installment.clone();
            assigned.id = id;
            inserted.push(assigned);
        }

        tx.commit().await?;

        Ok(inserted)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Installment>> {
        let row = sqlx::query_as::<_, InstallmentRow>(
            r#"
            SELECT
                id, sale_id, due_date, pay_date, amount, commission_amount,
                paid, paid_at, created_at, updated_at
            FROM installments
            WHERE id = ? AND deleted = 0
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => {
                let stored: StoredInstallment = row.try_into()?;
                let installment = stored.to_active().ok_or_else(|| {
                    AppError::internal(format!("Installment {} has corrupt dates", id))
                })?;
                Ok(Some(installment))
            }
            None => Ok(None),
        }
    }

    async fn update_installment(&self, installment: &Installment) -> Result<()> {
        let rows_affected = sqlx::query(
            r#"
            UPDATE installments
            SET
                amount = ?,
                commission_amount = ?,
                paid = ?,
                paid_at = ?,
                updated_at = ?
            WHERE id = ? AND deleted = 0
            "#,
        )
        .bind(installment.amount.to_string())
        .bind(installment.commission_amount.to_string())
        .bind(installment.paid)
        .bind(installment.paid_at)
        .bind(installment.updated_at)
        .bind(installment.id)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if rows_affected == 0 {
            return Err(AppError::not_found(format!(
                "Installment {}",
                installment.id
            )));
        }

        Ok(())
    }
}

/// Database row for the installments table.
///
/// Monetary columns have TEXT affinity in SQLite, so amounts come back as
/// strings and are parsed into `Decimal` during conversion.
#[derive(sqlx::FromRow)]
struct InstallmentRow {
    id: i64,
    sale_id: i64,
    due_date: Option<chrono::NaiveDate>,
    pay_date: Option<chrono::NaiveDate>,
    amount: String,
    commission_amount: String,
    paid: bool,
    paid_at: Option<NaiveDateTime>,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

impl TryFrom<InstallmentRow> for StoredInstallment {
    type Error = AppError;

    fn try_from(row: InstallmentRow) -> Result<Self> {
        let amount = parse_money(&row.amount, row.id)?;
        let commission_amount = parse_money(&row.commission_amount, row.id)?;

        Ok(StoredInstallment {
            id: row.id,
            sale_id: row.sale_id,
            due_date: row.due_date,
            pay_date: row.pay_date,
            amount,
            commission_amount,
            paid: row.paid,
            paid_at: row.paid_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn parse_money(raw: &str, row_id: i64) -> Result<Decimal> {
    Decimal::from_str(raw).map_err(|_| {
        AppError::internal(format!(
            "Installment {} carries a non-numeric amount: {}",
            row_id, raw
        ))
    })
}
