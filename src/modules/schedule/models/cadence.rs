use serde::{Deserialize, Serialize};

use crate::core::{AppError, Result};

/// Ordered day offsets from the sale date at which installments fall due.
///
/// The default matches the cadence the business runs on today: three
/// installments at 25, 30 and 35 days after the sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleCadence {
    day_offsets: Vec<i64>,
}

impl ScheduleCadence {
    pub fn new(day_offsets: Vec<i64>) -> Result<Self> {
        if day_offsets.is_empty() {
            return Err(AppError::validation(
                "Schedule cadence requires at least one day offset",
            ));
        }

        Ok(Self { day_offsets })
    }

    pub fn day_offsets(&self) -> &[i64] {
        &self.day_offsets
    }

    /// Number of installments a schedule built from this cadence contains
    pub fn installment_count(&self) -> usize {
        self.day_offsets.len()
    }
}

impl Default for ScheduleCadence {
    fn default() -> Self {
        Self {
            day_offsets: vec![25, 30, 35],
        }
    }
}
