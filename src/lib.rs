//! VibeFlix Billing - Subscription reconciliation for a streaming platform
//!
//! This crate implements the paid-access pipeline: checkout initiation against
//! the hosted payment gateway, idempotent webhook reconciliation of settled
//! charges into the entitlement store, client-side entitlement polling, and
//! the manual activation escape hatches.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
