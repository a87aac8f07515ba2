//! Recording mock for the payment gateway port.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::ports::{CreateChargeRequest, GatewayError, HostedCheckout, PaymentGateway};

enum MockBehavior {
    Succeed,
    Reject(String),
    NetworkError,
}

/// Mock gateway that records every charge request.
///
/// Defaults to succeeding with a fixed checkout URL and echoing the request's
/// reference, which is what a well-behaved gateway does.
pub struct MockPaymentGateway {
    requests: Mutex<Vec<CreateChargeRequest>>,
    behavior: Mutex<MockBehavior>,
}

impl MockPaymentGateway {
    pub fn new() -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            behavior: Mutex::new(MockBehavior::Succeed),
        }
    }

    /// All charge requests received so far.
    pub fn requests(&self) -> Vec<CreateChargeRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Make subsequent calls fail with a gateway rejection.
    pub fn reject_with(&self, message: &str) {
        *self.behavior.lock().unwrap() = MockBehavior::Reject(message.to_string());
    }

    /// Make subsequent calls fail as if the gateway were unreachable.
    pub fn fail_with_network_error(&self) {
        *self.behavior.lock().unwrap() = MockBehavior::NetworkError;
    }
}

impl Default for MockPaymentGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PaymentGateway for MockPaymentGateway {
    async fn initialize_charge(
        &self,
        request: CreateChargeRequest,
    ) -> Result<HostedCheckout, GatewayError> {
        let reference = request.reference.clone();
        self.requests.lock().unwrap().push(request);

        match &*self.behavior.lock().unwrap() {
            MockBehavior::Succeed => Ok(HostedCheckout {
                checkout_url: "https://checkout.test/session".to_string(),
                reference,
            }),
            MockBehavior::Reject(message) => Err(GatewayError::Rejected(message.clone())),
            MockBehavior::NetworkError => {
                Err(GatewayError::Unreachable("connection refused".to_string()))
            }
        }
    }
}
