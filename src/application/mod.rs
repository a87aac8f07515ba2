//! Application layer: command and query handlers over the ports.

mod activation;
mod checkout;
mod poller;
mod reconcile;
mod verify;

pub use activation::{ActivationError, ManualActivation, ManualActivationHandler};
pub use checkout::{CheckoutError, InitiateCheckoutCommand, InitiateCheckoutHandler};
pub use poller::{EntitlementPoller, PollOutcome, PollerSettings};
pub use reconcile::{ReconcileChargeHandler, ReconcileOutcome};
pub use verify::{SubscriptionInspection, VerifyEntitlementHandler, VerifyError};
