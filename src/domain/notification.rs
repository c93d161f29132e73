/// Normalized transaction notification, produced by the webhook payload
/// parser after schema validation. Field meanings follow the gateway's
/// transaction callback: `pending` and `refunded` take precedence over
/// `success` when resolving the target state.
#[derive(Debug, Clone)]
pub struct TransactionNotification {
    pub transaction_id: i64,
    pub merchant_order_id: String,
    pub amount_cents: i64,
    pub currency: String,
    pub success: bool,
    pub pending: bool,
    pub refunded: bool,
    pub payment_method: Option<String>,
}
