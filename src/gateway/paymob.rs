use crate::gateway::{CheckoutRequest, CheckoutSession, PaymentProvider};
use anyhow::{anyhow, Context, Result};
use serde_json::json;

pub struct PaymobGateway {
    pub base_url: String,
    pub api_key: String,
    pub integration_id: i64,
    pub iframe_id: String,
    pub timeout_ms: u64,
    pub client: reqwest::Client,
}

impl PaymobGateway {
    /// One bounded-timeout POST with a single retry on timeout or connect
    /// errors. HTTP-level failures are not retried.
    async fn post_json(&self, url: &str, body: &serde_json::Value) -> Result<serde_json::Value> {
        for attempt in 0..2 {
            let resp = self
                .client
                .post(url)
                .json(body)
                .timeout(std::time::Duration::from_millis(self.timeout_ms))
                .send()
                .await;

            match resp {
                Ok(r) if r.status().is_success() => {
                    return r.json().await.context("gateway returned unparseable body");
                }
                Ok(r) => {
                    let status = r.status();
                    let snippet: String = r.text().await.unwrap_or_default().chars().take(200).collect();
                    return Err(anyhow!("gateway responded {status}: {snippet}"));
                }
                Err(e) if (e.is_timeout() || e.is_connect()) && attempt == 0 => {
                    tracing::warn!(url, error = %e, "gateway call failed, retrying once");
                }
                Err(e) => return Err(anyhow!("gateway request failed: {e}")),
            }
        }
        Err(anyhow!("gateway retry budget exhausted"))
    }

    async fn authenticate(&self) -> Result<String> {
        let v = self
            .post_json(
                &format!("{}/api/auth/tokens", self.base_url),
                &json!({"api_key": self.api_key}),
            )
            .await?;
        v.get("token")
            .and_then(|t| t.as_str())
            .map(str::to_string)
            .ok_or_else(|| anyhow!("auth response missing token"))
    }
}

#[async_trait::async_trait]
impl PaymentProvider for PaymobGateway {
    fn name(&self) -> &'static str {
        "paymob"
    }

    async fn create_checkout(&self, request: CheckoutRequest) -> Result<CheckoutSession> {
        let auth_token = self.authenticate().await?;

        let order = self
            .post_json(
                &format!("{}/api/ecommerce/orders", self.base_url),
                &json!({
                    "auth_token": auth_token,
                    "delivery_needed": false,
                    "amount_cents": request.amount_cents,
                    "currency": request.currency,
                    "merchant_order_id": request.merchant_order_id,
                    "items": []
                }),
            )
            .await?;
        let order_id = order
            .get("id")
            .and_then(|id| id.as_i64())
            .ok_or_else(|| anyhow!("order response missing id"))?;

        let key = self
            .post_json(
                &format!("{}/api/acceptance/payment_keys", self.base_url),
                &json!({
                    "auth_token": auth_token,
                    "amount_cents": request.amount_cents,
                    "currency": request.currency,
                    "order_id": order_id,
                    "integration_id": self.integration_id,
                    "expiration": 3600,
                    "billing_data": {
                        "first_name": "NA",
                        "last_name": "NA",
                        "email": "NA",
                        "phone_number": "NA",
                        "street": "NA",
                        "building": "NA",
                        "floor": "NA",
                        "apartment": "NA",
                        "city": "NA",
                        "state": "NA",
                        "country": "NA",
                        "postal_code": "NA"
                    }
                }),
            )
            .await?;
        let payment_token = key
            .get("token")
            .and_then(|t| t.as_str())
            .ok_or_else(|| anyhow!("payment key response missing token"))?;

        Ok(CheckoutSession {
            gateway_order_id: order_id.to_string(),
            redirect_url: format!(
                "{}/api/acceptance/iframes/{}?payment_token={}",
                self.base_url, self.iframe_id, payment_token
            ),
        })
    }
}
