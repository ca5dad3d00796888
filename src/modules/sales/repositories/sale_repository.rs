use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use sqlx::SqlitePool;
use std::str::FromStr;

use crate::core::{AppError, Result};
use crate::modules::sales::models::Sale;

/// Repository for sale database operations
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a sale and return it with its store-assigned id
    pub async fn insert(&self, sale: &Sale) -> Result<Sale> {
        let result = sqlx::query(
            r#"
            INSERT INTO sales (
                client_id, contact_id, invoice_number, sale_date, amount,
                commission_percent, deleted, deleted_at, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(sale.client_id)
        .bind(sale.contact_id)
        .bind(&sale.invoice_number)
        .bind(sale.sale_date)
        .bind(sale.amount.to_string())
        .bind(sale.commission_percent.to_string())
        .bind(sale.deleted)
        .bind(sale.deleted_at)
        .bind(sale.created_at)
        .bind(sale.updated_at)
        .execute(&self.pool)
        .await?;

        let mut inserted = sale.clone();
        inserted.id = result.last_insert_rowid();
        Ok(inserted)
    }

    pub async fn update(&self, sale: &Sale) -> Result<()> {
        let rows_affected = sqlx::query(
            r#"
            UPDATE sales
            SET
                client_id = ?,
                contact_id = ?,
                invoice_number = ?,
                sale_date = ?,
                amount = ?,
                commission_percent = ?,
                updated_at = ?
            WHERE id = ? AND deleted = 0
            "#,
        )
        .bind(sale.client_id)
        .bind(sale.contact_id)
        .bind(&sale.invoice_number)
        .bind(sale.sale_date)
        .bind(sale.amount.to_string())
        .bind(sale.commission_percent.to_string())
        .bind(sale.updated_at)
        .bind(sale.id)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if rows_affected == 0 {
            return Err(AppError::not_found(format!("Sale {}", sale.id)));
        }

        Ok(())
    }

    /// Flag a sale deleted, keeping the row for referential history
    pub async fn soft_delete(&self, sale_id: i64, deleted_at: NaiveDateTime) -> Result<()> {
        let rows_affected = sqlx::query(
            r#"
            UPDATE sales
            SET deleted = 1, deleted_at = ?, updated_at = ?
            WHERE id = ? AND deleted = 0
            "#,
        )
        .bind(deleted_at)
        .bind(deleted_at)
        .bind(sale_id)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if rows_affected == 0 {
            return Err(AppError::not_found(format!("Sale {}", sale_id)));
        }

        Ok(())
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Sale>> {
        let row = sqlx::query_as::<_, SaleRow>(
            r#"
            SELECT
                id, client_id, contact_id, invoice_number, sale_date, amount,
                commission_percent, deleted, deleted_at, created_at, updated_at
            FROM sales
            WHERE id = ? AND deleted = 0
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(row.try_into()?)),
            None => Ok(None),
        }
    }

    pub async fn list_active(&self) -> Result<Vec<Sale>> {
        let rows = sqlx::query_as::<_, SaleRow>(
            r#"
            SELECT
                id, client_id, contact_id, invoice_number, sale_date, amount,
                commission_percent, deleted, deleted_at, created_at, updated_at
            FROM sales
            WHERE deleted = 0
            ORDER BY sale_date DESC, id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(|row| row.try_into()).collect()
    }
}

/// Database row for the sales table; monetary columns are TEXT in SQLite
#[derive(sqlx::FromRow)]
struct SaleRow {
    id: i64,
    client_id: i64,
    contact_id: Option<i64>,
    invoice_number: String,
    sale_date: chrono::NaiveDate,
    amount: String,
    commission_percent: String,
    deleted: bool,
    deleted_at: Option<NaiveDateTime>,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

impl TryFrom<SaleRow> for Sale {
    type Error = AppError;

    fn try_from(row: SaleRow) -> Result<Self> {
        let amount = Decimal::from_str(&row.amount).map_err(|_| {
            AppError::internal(format!(
                "Sale {} carries a non-numeric amount: {}",
                row.id, row.amount
            ))
        })?;
        let commission_percent = Decimal::from_str(&row.commission_percent).map_err(|_| {
            AppError::internal(format!(
                "Sale {} carries a non-numeric commission percent: {}",
                row.id, row.commission_percent
            ))
        })?;

        Ok(Sale {
            id: row.id,
            client_id: row.client_id,
            contact_id: row.contact_id,
            invoice_number: row.invoice_number,
            sale_date: row.sale_date,
            amount,
            commission_percent,
            deleted: row.deleted,
            deleted_at: row.deleted_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
