use crate::gateway::{CheckoutRequest, CheckoutSession, PaymentProvider};
use anyhow::Result;

/// Development and test stand-in for the real gateway.
pub struct MockGateway {
    pub behavior: String,
}

#[async_trait::async_trait]
impl PaymentProvider for MockGateway {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn create_checkout(&self, request: CheckoutRequest) -> Result<CheckoutSession> {
        if self.behavior == "ALWAYS_FAIL" {
            anyhow::bail!("mock gateway configured to fail");
        }

        let order_id = format!("mock_{}", request.merchant_order_id.simple());
        Ok(CheckoutSession {
            redirect_url: format!("https://checkout.invalid/pay/{order_id}"),
            gateway_order_id: order_id,
        })
    }
}
