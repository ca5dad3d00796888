use chrono::{NaiveDate, NaiveDateTime};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, warn};

use crate::core::{AppError, Result};
use crate::modules::sales::models::Sale;
use crate::modules::schedule::models::{Installment, ScheduleCadence, StoredInstallment};
use crate::modules::schedule::repositories::InstallmentStore;
use crate::modules::schedule::services::ScheduleGenerator;

/// Keeps the persisted installment set of a sale in step with its generated
/// schedule.
///
/// All side effects live here; the generator stays pure. Reconciliation is
/// invoked synchronously per sale mutation and is not safe against concurrent
/// runs for the same sale; different sales never contend since every
/// operation is scoped by sale id. Storage errors propagate uncaught.
pub struct ScheduleReconciler {
    store: Arc<dyn InstallmentStore>,
    cadence: ScheduleCadence,
}

impl ScheduleReconciler {
    pub fn new(store: Arc<dyn InstallmentStore>, cadence: ScheduleCadence) -> Self {
        Self { store, cadence }
    }

    /// Regenerate the installment set for an existing sale.
    ///
    /// Runs the integrity pass over the stored rows, then replaces the whole
    /// active set with a freshly generated one in a single transaction,
    /// carrying paid state over for unchanged due dates. Idempotent: a second
    /// run with the same sale and `now` produces an identical set.
    pub async fn reconcile_for_sale(
        &self,
        sale: &Sale,
        now: NaiveDateTime,
    ) -> Result<Vec<Installment>> {
        let rows = self.store.load_active(sale.id).await?;
        let (existing, rejected) = integrity_pass(rows);

        if !rejected.is_empty() {
            warn!(
                sale_id = sale.id,
                rejected = rejected.len(),
                "Removing corrupt or duplicate installments"
            );
            self.store.soft_delete_installments(&rejected, now).await?;
        }

        let fresh = ScheduleGenerator::generate(sale, &existing, &self.cadence, now)?;

        let stale_ids: Vec<i64> = existing.iter().map(|i| i.id).collect();
        let inserted = self
            .store
            .replace_installments(&stale_ids, &fresh, now)
            .await?;

        info!(
            sale_id = sale.id,
            installments = inserted.len(),
            "Installment schedule reconciled"
        );

        Ok(inserted)
    }

    /// Generate and persist the schedule for a brand-new sale.
    ///
    /// A new sale cannot have stored installments, so no integrity pass and
    /// no invalidation run.
    pub async fn reconcile_for_new_sale(
        &self,
        sale: &Sale,
        now: NaiveDateTime,
    ) -> Result<Vec<Installment>> {
        let fresh = ScheduleGenerator::generate(sale, &[], &self.cadence, now)?;
        let inserted = self.store.insert_installments(&fresh).await?;

        info!(
            sale_id = sale.id,
            installments = inserted.len(),
            "Installment schedule created"
        );

        Ok(inserted)
    }

    /// Soft-delete every active installment of a sale.
    ///
    /// Invoked when the sale itself is soft-deleted; rows are kept for the
    /// audit trail.
    pub async fn delete_schedule_for_sale(&self, sale_id: i64, now: NaiveDateTime) -> Result<()> {
        let rows = self.store.load_active(sale_id).await?;
        let ids: Vec<i64> = rows.iter().map(|row| row.id).collect();

        if !ids.is_empty() {
            self.store.soft_delete_installments(&ids, now).await?;
            info!(
                sale_id = sale_id,
                installments = ids.len(),
                "Installment schedule soft-deleted"
            );
        }

        Ok(())
    }

    /// Toggle a single installment's paid checkbox without touching the sale.
    ///
    /// Marking paid stamps the caller-supplied timestamp, or `now` when none
    /// is given; marking unpaid clears it.
    pub async fn update_installment_paid_status(
        &self,
        installment_id: i64,
        paid: bool,
        paid_at: Option<NaiveDateTime>,
        now: NaiveDateTime,
    ) -> Result<Installment> {
        let mut installment = self
            .store
            .find_by_id(installment_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Installment {}", installment_id)))?;

        installment.set_paid_status(paid, paid_at, now);
        self.store.update_installment(&installment).await?;

        info!(
            installment_id = installment_id,
            paid = paid,
            "Installment paid status updated"
        );

        Ok(installment)
    }
}

/// Vet stored rows before they feed regeneration.
///
/// Rejects rows with missing dates, rows whose due or pay date falls outside
/// the sane year range, and duplicate due dates (the earliest-created row,
/// i.e. the lowest id, wins). Returns the surviving clean installments and
/// the ids to soft-delete.
fn integrity_pass(mut rows: Vec<StoredInstallment>) -> (Vec<Installment>, Vec<i64>) {
    rows.sort_by_key(|row| row.id);

    let mut seen_due_dates: HashSet<NaiveDate> = HashSet::new();
    let mut clean = Vec::with_capacity(rows.len());
    let mut rejected = Vec::new();

    for row in rows {
        match row.to_active() {
            Some(installment) if seen_due_dates.insert(installment.due_date) => {
                clean.push(installment);
            }
            _ => rejected.push(row.id),
        }
    }

    (clean, rejected)
}
