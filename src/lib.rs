//! Commtrack commission scheduling core
//!
//! Derives commission payment schedules from sales and keeps them consistent
//! across sale edits, re-edits and deletions, backed by the app's local
//! SQLite store. The surrounding UI, sync and update machinery live outside
//! this crate and call in through [`sales::services::SaleService`] and
//! [`schedule::services::ScheduleReconciler`].

pub mod config;
pub mod core;
pub mod modules;

// Re-export commonly used types
pub use modules::sales;
pub use modules::schedule;
