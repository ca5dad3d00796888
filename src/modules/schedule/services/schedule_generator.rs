use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;

use crate::core::money::{commission_for, round_money};
use crate::core::{AppError, Result};
use crate::modules::sales::models::Sale;
use crate::modules::schedule::models::{Installment, ScheduleCadence};

/// Pure derivation of a sale's installment schedule.
///
/// No I/O and no ambient clock: the caller supplies `now` for the row
/// timestamps, so identical inputs always yield identical output. The
/// generator does not validate the sale; a non-positive amount or negative
/// percent produces degenerate but well-defined rows, and rejecting such
/// sales is the caller's job.
pub struct ScheduleGenerator;

impl ScheduleGenerator {
    /// Generate the installment set for a sale.
    ///
    /// One installment per cadence offset, due at `sale_date + offset` days.
    /// Each installment carries an equal share of the sale amount rounded to
    /// cents; the remainder is deliberately not redistributed, so the sum may
    /// drift from the sale amount by a cent or two.
    ///
    /// For every generated due date that also appears in `existing` (date-only
    /// comparison), the prior paid flag and paid timestamp are carried over;
    /// all other installments start unpaid.
    pub fn generate(
        sale: &Sale,
        existing: &[Installment],
        cadence: &ScheduleCadence,
        now: NaiveDateTime,
    ) -> Result<Vec<Installment>> {
        let count = Decimal::from(cadence.installment_count());
        let amount = round_money(sale.amount / count);
        let commission_amount = commission_for(amount, sale.commission_percent);

        let mut installments = Vec::with_capacity(cadence.installment_count());
        for &offset in cadence.day_offsets() {
            let due_date = sale
                .sale_date
                .checked_add_signed(Duration::days(offset))
                .ok_or_else(|| {
                    AppError::validation(format!(
                        "Due date overflows the calendar: {} + {} days",
                        sale.sale_date, offset
                    ))
                })?;
            let pay_date = pay_date_for(due_date)?;

            let (paid, paid_at) = existing
                .iter()
                .find(|prior| prior.due_date == due_date)
                .map(|prior| (prior.paid, prior.paid_at))
                .unwrap_or((false, None));

            installments.push(Installment {
                id: 0,
                sale_id: sale.id,
                due_date,
                pay_date,
                amount,
                commission_amount,
                paid,
                paid_at,
                deleted: false,
                deleted_at: None,
                created_at: now,
                updated_at: now,
            });
        }

        Ok(installments)
    }
}

/// Payroll cutoff date for a due date.
///
/// Due on or before the 15th pays out on the 15th of that month; anything
/// later pays out on the last calendar day of that month.
pub fn pay_date_for(due_date: NaiveDate) -> Result<NaiveDate> {
    if due_date.day() <= 15 {
        NaiveDate::from_ymd_opt(due_date.year(), due_date.month(), 15)
            .ok_or_else(|| AppError::internal(format!("Invalid mid-month date for {}", due_date)))
    } else {
        last_day_of_month(due_date.year(), due_date.month())
    }
}

/// Last calendar day of a month, month length and leap years respected
pub fn last_day_of_month(year: i32, month: u32) -> Result<NaiveDate> {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };

    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first| first.pred_opt())
        .ok_or_else(|| AppError::internal(format!("Invalid month: {}-{}", year, month)))
}
