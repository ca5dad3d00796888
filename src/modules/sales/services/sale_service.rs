use chrono::NaiveDateTime;
use tracing::info;

use crate::core::Result;
use crate::modules::sales::models::Sale;
use crate::modules::sales::repositories::SaleRepository;
use crate::modules::schedule::models::Installment;
use crate::modules::schedule::services::ScheduleReconciler;

/// Sale lifecycle orchestration.
///
/// The UI layer calls in here on create/edit/delete; this service validates
/// the sale, persists it, and triggers the matching reconciler entry point.
/// Sale persistence and schedule reconciliation are separate storage calls;
/// a reconciliation failure leaves the sale row in place and surfaces the
/// error to the caller.
pub struct SaleService {
    repository: SaleRepository,
    reconciler: ScheduleReconciler,
}

impl SaleService {
    pub fn new(repository: SaleRepository, reconciler: ScheduleReconciler) -> Self {
        Self {
            repository,
            reconciler,
        }
    }

    /// Record a new sale and generate its installment schedule.
    pub async fn create_sale(
        &self,
        sale: Sale,
        now: NaiveDateTime,
    ) -> Result<(Sale, Vec<Installment>)> {
        sale.validate()?;

        let sale = self.repository.insert(&sale).await?;
        let installments = self.reconciler.reconcile_for_new_sale(&sale, now).await?;

        info!(
            sale_id = sale.id,
            invoice_number = sale.invoice_number.as_str(),
            installments = installments.len(),
            "Sale created"
        );

        Ok((sale, installments))
    }

    /// Persist an edited sale and regenerate its installment schedule.
    pub async fn update_sale(
        &self,
        sale: Sale,
        now: NaiveDateTime,
    ) -> Result<(Sale, Vec<Installment>)> {
        sale.validate()?;

        self.repository.update(&sale).await?;
        let installments = self.reconciler.reconcile_for_sale(&sale, now).await?;

        info!(
            sale_id = sale.id,
            installments = installments.len(),
            "Sale updated"
        );

        Ok((sale, installments))
    }

    /// Soft-delete a sale along with its active installments.
    pub async fn delete_sale(&self, sale_id: i64, now: NaiveDateTime) -> Result<()> {
        self.repository.soft_delete(sale_id, now).await?;
        self.reconciler.delete_schedule_for_sale(sale_id, now).await?;

        info!(sale_id = sale_id, "Sale soft-deleted");

        Ok(())
    }

    pub async fn get_sale(&self, sale_id: i64) -> Result<Option<Sale>> {
        self.repository.find_by_id(sale_id).await
    }

    pub async fn list_sales(&self) -> Result<Vec<Sale>> {
        self.repository.list_active().await
    }
}
