pub mod schedule_generator;
pub mod schedule_reconciler;

pub use schedule_generator::{last_day_of_month, pay_date_for, ScheduleGenerator};
pub use schedule_reconciler::ScheduleReconciler;
