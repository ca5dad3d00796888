pub mod cadence;
pub mod installment;

pub use cadence::ScheduleCadence;
pub use installment::{Installment, StoredInstallment, MAX_VALID_YEAR, MIN_VALID_YEAR};
