//! Live synchronization core of the bank statement dashboard.
//!
//! A [`DashboardEngine`](engine::DashboardEngine) keeps an in-memory view of the document worker's
//! jobs and the ledger's transactions up to date by combining a push event stream with REST
//! refetches, and exposes it through a cloneable [`DashboardHandle`](engine::DashboardHandle).

pub mod actors;
pub mod api;
pub mod channel;
pub mod config;
pub mod engine;
pub mod models;
pub mod registry;
pub mod storage;
pub mod types;

#[cfg(test)]
mod test_support;
