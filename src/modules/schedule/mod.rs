//! Commission payment-schedule generation and reconciliation.

pub mod models;
pub mod repositories;
pub mod services;
