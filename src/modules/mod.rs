pub mod sales;
pub mod schedule;
