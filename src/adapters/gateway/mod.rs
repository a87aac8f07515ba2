//! Payment gateway adapters.

mod korapay;
mod mock;

pub use korapay::{KorapayConfig, KorapayGateway};
pub use mock::MockPaymentGateway;
