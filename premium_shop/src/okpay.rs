use anyhow::Context;
use common::GatewaySigner;
use serde_json::{Map, Value, json};

// The API host differs from the gateway's brand name; this is the URL the
// production deployment talks to.
const API_URL_PAYLINK: &str = "https://api.okaypay.me/shop/payLink";

/// Outbound OkPay client: builds signed pay-link requests for new orders.
#[derive(Clone)]
pub struct OkPayClient {
    signer: GatewaySigner,
    server_domain: String,
    http: reqwest::Client,
}

impl OkPayClient {
    pub fn new(signer: GatewaySigner, server_domain: &str) -> Self {
        OkPayClient {
            signer,
            server_domain: server_domain.to_string(),
            http: reqwest::Client::new(),
        }
    }

    fn notify_url(&self) -> String {
        format!("{}/okpay/notify", self.server_domain.trim_end_matches('/'))
    }

    /// Requests a payment link for the given order. The payload carries the
    /// same keyed digest the gateway later attaches to its callback.
    pub async fn create_pay_link(
        &self,
        order_id: &str,
        amount_usdt: f64,
        months: i64,
    ) -> anyhow::Result<String> {
        let mut payload = Map::new();
        payload.insert("amount".to_string(), json!(amount_usdt.to_string()));
        payload.insert("coin".to_string(), json!("USDT"));
        payload.insert("unique_id".to_string(), json!(order_id));
        payload.insert("name".to_string(), json!(format!("Premium {}M", months)));
        payload.insert("callback_url".to_string(), json!(self.notify_url()));

        let sign = self.signer.sign(&payload);
        payload.insert("sign".to_string(), json!(sign));

        log::info!("Creating OkPay order: {}", order_id);

        let response = self
            .http
            .post(API_URL_PAYLINK)
            .json(&Value::Object(payload))
            .send()
            .await
            .context("OkPay request failed")?;

        let body: Value = response
            .json()
            .await
            .context("Invalid JSON in OkPay response")?;

        let accepted = body.get("code").and_then(Value::as_i64) == Some(10000)
            || body.get("status").and_then(Value::as_str) == Some("success");
        if !accepted {
            let message = body
                .get("msg")
                .or_else(|| body.get("message"))
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| body.to_string());
            anyhow::bail!("OkPay API error: {}", message);
        }

        let pay_url = body
            .get("data")
            .and_then(|data| data.get("pay_url"))
            .and_then(Value::as_str)
            .context("OkPay response is missing data.pay_url")?;

        Ok(pay_url.to_string())
    }
}
