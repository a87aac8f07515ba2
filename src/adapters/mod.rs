//! Adapters: concrete implementations of the ports.

pub mod client;
pub mod gateway;
pub mod http;
pub mod platform;
