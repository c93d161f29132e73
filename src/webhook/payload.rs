use crate::domain::error::PaymentError;
use crate::domain::notification::TransactionNotification;
use serde::Deserialize;

pub const TRANSACTION_EVENT: &str = "TRANSACTION";

#[derive(Debug, Deserialize)]
struct WebhookEnvelope {
    #[serde(rename = "type")]
    kind: String,
    obj: TransactionObject,
}

#[derive(Debug, Deserialize)]
struct TransactionObject {
    id: i64,
    amount_cents: i64,
    currency: String,
    success: bool,
    #[serde(default)]
    pending: bool,
    #[serde(default)]
    refunded: bool,
    order: OrderRef,
    #[serde(default)]
    source_data: Option<SourceData>,
}

#[derive(Debug, Deserialize)]
struct OrderRef {
    merchant_order_id: String,
}

#[derive(Debug, Deserialize)]
struct SourceData {
    #[serde(rename = "type", default)]
    kind: Option<String>,
}

/// Schema-validated parse of the gateway callback body. Anything that does
/// not match the transaction envelope is rejected before domain logic runs.
pub fn parse(raw: &[u8]) -> Result<TransactionNotification, PaymentError> {
    let envelope: WebhookEnvelope =
        serde_json::from_slice(raw).map_err(|e| PaymentError::PayloadMalformed(e.to_string()))?;
    from_envelope(envelope)
}

pub fn parse_value(raw: &serde_json::Value) -> Result<TransactionNotification, PaymentError> {
    let envelope: WebhookEnvelope = serde_json::from_value(raw.clone())
        .map_err(|e| PaymentError::PayloadMalformed(e.to_string()))?;
    from_envelope(envelope)
}

fn from_envelope(envelope: WebhookEnvelope) -> Result<TransactionNotification, PaymentError> {
    if envelope.kind != TRANSACTION_EVENT {
        return Err(PaymentError::PayloadMalformed(format!(
            "unsupported event type {:?}",
            envelope.kind
        )));
    }
    let obj = envelope.obj;
    Ok(TransactionNotification {
        transaction_id: obj.id,
        merchant_order_id: obj.order.merchant_order_id,
        amount_cents: obj.amount_cents,
        currency: obj.currency,
        success: obj.success,
        pending: obj.pending,
        refunded: obj.refunded,
        payment_method: obj.source_data.and_then(|s| s.kind),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body(v: serde_json::Value) -> Vec<u8> {
        serde_json::to_vec(&v).unwrap()
    }

    #[test]
    fn parses_full_transaction_payload() {
        let raw = body(json!({
            "type": "TRANSACTION",
            "obj": {
                "id": 9912345,
                "amount_cents": 50000,
                "currency": "EGP",
                "success": true,
                "pending": false,
                "refunded": false,
                "order": {"merchant_order_id": "5f6a1a3e-9adb-4ae1-9c2c-1a2b3c4d5e6f"},
                "source_data": {"type": "card"}
            }
        }));

        let n = parse(&raw).unwrap();
        assert_eq!(n.transaction_id, 9912345);
        assert_eq!(n.amount_cents, 50000);
        assert_eq!(n.currency, "EGP");
        assert!(n.success);
        assert!(!n.pending);
        assert_eq!(n.payment_method.as_deref(), Some("card"));
    }

    #[test]
    fn optional_flags_default_to_false() {
        let raw = body(json!({
            "type": "TRANSACTION",
            "obj": {
                "id": 1,
                "amount_cents": 100,
                "currency": "EGP",
                "success": false,
                "order": {"merchant_order_id": "x"}
            }
        }));

        let n = parse(&raw).unwrap();
        assert!(!n.pending);
        assert!(!n.refunded);
        assert!(n.payment_method.is_none());
    }

    #[test]
    fn rejects_non_transaction_events() {
        let raw = body(json!({
            "type": "TOKEN",
            "obj": {
                "id": 1,
                "amount_cents": 100,
                "currency": "EGP",
                "success": true,
                "order": {"merchant_order_id": "x"}
            }
        }));

        assert!(matches!(
            parse(&raw),
            Err(PaymentError::PayloadMalformed(_))
        ));
    }

    #[test]
    fn rejects_missing_required_fields() {
        let raw = body(json!({
            "type": "TRANSACTION",
            "obj": {"id": 1, "success": true}
        }));

        assert!(matches!(
            parse(&raw),
            Err(PaymentError::PayloadMalformed(_))
        ));
    }

    #[test]
    fn rejects_non_json_body() {
        assert!(matches!(
            parse(b"not json at all"),
            Err(PaymentError::PayloadMalformed(_))
        ));
    }
}
