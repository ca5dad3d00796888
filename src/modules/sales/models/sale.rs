use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::{AppError, Result};

/// One commercial transaction generating a commission obligation.
///
/// Sales are soft-deleted, never physically removed, to preserve referential
/// history for their installments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sale {
    pub id: i64,
    pub client_id: i64,
    pub contact_id: Option<i64>,
    pub invoice_number: String,
    /// Calendar date of the sale; installment due dates offset from here
    pub sale_date: NaiveDate,
    pub amount: Decimal,
    /// Commission percent as a decimal, e.g. 10 for 10%
    pub commission_percent: Decimal,
    pub deleted: bool,
    pub deleted_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Sale {
    /// Business-rule validation, run before reconciliation is invoked.
    ///
    /// The schedule generator itself never rejects a sale; this is the
    /// gatekeeper.
    pub fn validate(&self) -> Result<()> {
        if self.amount <= Decimal::ZERO {
            return Err(AppError::validation("Sale amount must be positive"));
        }

        if self.commission_percent < Decimal::ZERO {
            return Err(AppError::validation(
                "Commission percent cannot be negative",
            ));
        }

        Ok(())
    }
}
