use chrono::{Datelike, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Earliest due/pay-date year considered sane; anything below is legacy corruption
pub const MIN_VALID_YEAR: i32 = 2000;
/// Latest due/pay-date year considered sane
pub const MAX_VALID_YEAR: i32 = 2100;

/// One scheduled commission disbursement derived from a sale.
///
/// Rows are produced exclusively by the schedule generator and persisted by
/// the reconciler; users never create installments directly. Regeneration
/// soft-deletes the active set and inserts fresh rows, so `id` is 0 until the
/// store assigns one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Installment {
    pub id: i64,
    pub sale_id: i64,
    /// Calendar date the installment is nominally owed
    pub due_date: NaiveDate,
    /// Payroll cutoff date on which the commission is actually disbursed
    pub pay_date: NaiveDate,
    /// Fraction of the sale amount covered by this installment
    pub amount: Decimal,
    /// Commission owed on this installment, rounded to cents
    pub commission_amount: Decimal,
    pub paid: bool,
    /// Set exactly when `paid` is true
    pub paid_at: Option<NaiveDateTime>,
    pub deleted: bool,
    pub deleted_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Installment {
    /// Toggle the paid flag, keeping flag and timestamp mutually consistent.
    ///
    /// Transitioning to paid stamps `paid_at` with the caller-supplied
    /// timestamp, or `now` when none is given. Transitioning to unpaid
    /// clears it.
    pub fn set_paid_status(
        &mut self,
        paid: bool,
        paid_at: Option<NaiveDateTime>,
        now: NaiveDateTime,
    ) {
        self.paid = paid;
        self.paid_at = if paid { Some(paid_at.unwrap_or(now)) } else { None };
        self.updated_at = now;
    }
}

/// Raw persisted installment row, before the integrity pass has vetted it.
///
/// Legacy data can carry missing or out-of-range dates, so both dates are
/// optional here; [`StoredInstallment::to_active`] promotes a sane row to an
/// [`Installment`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredInstallment {
    pub id: i64,
    pub sale_id: i64,
    pub due_date: Option<NaiveDate>,
    pub pay_date: Option<NaiveDate>,
    pub amount: Decimal,
    pub commission_amount: Decimal,
    pub paid: bool,
    pub paid_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl StoredInstallment {
    /// Both dates present and within the sane year range
    pub fn has_sane_dates(&self) -> bool {
        matches!((self.due_date, self.pay_date), (Some(due), Some(pay))
            if year_in_range(due) && year_in_range(pay))
    }

    /// Promote to a clean installment, or `None` when the dates are corrupt
    pub fn to_active(&self) -> Option<Installment> {
        if !self.has_sane_dates() {
            return None;
        }

        Some(Installment {
            id: self.id,
            sale_id: self.sale_id,
            due_date: self.due_date?,
            pay_date: self.pay_date?,
            amount: self.amount,
            commission_amount: self.commission_amount,
            paid: self.paid,
            paid_at: self.paid_at,
            deleted: false,
            deleted_at: None,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn year_in_range(date: NaiveDate) -> bool {
    (MIN_VALID_YEAR..=MAX_VALID_YEAR).contains(&date.year())
}
