//! Sales: the commercial transactions commission schedules derive from.

pub mod models;
pub mod repositories;
pub mod services;
