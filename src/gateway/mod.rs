use anyhow::Result;
use serde::Serialize;
use uuid::Uuid;

pub mod mock;
pub mod paymob;

#[derive(Debug, Clone)]
pub struct CheckoutRequest {
    pub merchant_order_id: Uuid,
    pub amount_cents: i64,
    pub currency: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckoutSession {
    pub gateway_order_id: String,
    pub redirect_url: String,
}

/// Outbound side of the payment gateway: authenticate, register an order
/// under our payment id, and obtain a hosted-checkout redirect.
#[async_trait::async_trait]
pub trait PaymentProvider: Send + Sync {
    fn name(&self) -> &'static str;

    async fn create_checkout(&self, request: CheckoutRequest) -> Result<CheckoutSession>;
}
