use std::collections::BTreeMap;

use serde_json::{Map, Value};
use subtle::ConstantTimeEq;

/// Computes and verifies the keyed digest the OkPay gateway attaches to
/// callbacks and expects on outbound requests.
///
/// Canonicalization convention (must match the gateway exactly):
/// 1. take the parameter map without `sign`, insert the merchant id as `id`,
/// 2. drop parameters whose value is null or an empty string,
/// 3. render strings verbatim, numbers and bools in their display form,
///    nested objects and arrays as compact JSON,
/// 4. sort by key (byte order) and join as `key=value` pairs with `&`,
///    without percent-encoding,
/// 5. append `&token=<secret>`, MD5, uppercase hex.
#[derive(Debug, Clone)]
pub struct GatewaySigner {
    merchant_id: String,
    secret: String,
}

impl GatewaySigner {
    pub fn new(merchant_id: &str, secret: &str) -> Self {
        GatewaySigner {
            merchant_id: merchant_id.to_string(),
            secret: secret.to_string(),
        }
    }

    fn canonical_string(&self, params: &Map<String, Value>) -> String {
        let mut sorted: BTreeMap<String, String> = BTreeMap::new();
        for (key, value) in params {
            if key == "sign" {
                continue;
            }
            if let Some(rendered) = render_value(value) {
                sorted.insert(key.clone(), rendered);
            }
        }
        sorted.insert("id".to_string(), self.merchant_id.clone());

        let joined = sorted
            .into_iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&");

        format!("{}&token={}", joined, self.secret)
    }

    /// Returns the uppercase hex MD5 digest over the canonical parameter set.
    pub fn sign(&self, params: &Map<String, Value>) -> String {
        let raw = self.canonical_string(params);
        let digest = md5::compute(raw.as_bytes());
        digest
            .0
            .iter()
            .map(|b| format!("{:02X}", b))
            .collect::<String>()
    }

    /// Verifies the `sign` parameter of a received callback. Comparison is
    /// constant-time; a missing or non-string `sign` fails verification.
    pub fn verify(&self, params: &Map<String, Value>) -> bool {
        let received = match params.get("sign").and_then(Value::as_str) {
            Some(s) => s,
            None => {
                log::warn!("Missing sign in callback data");
                return false;
            }
        };

        let expected = self.sign(params);
        expected.as_bytes().ct_eq(received.as_bytes()).into()
    }
}

fn render_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params() -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("unique_id".to_string(), json!("ORD17001"));
        map.insert("amount".to_string(), json!("10"));
        map.insert("status".to_string(), json!(1));
        map.insert("type".to_string(), json!("deposit"));
        map
    }

    #[test]
    fn canonical_string_is_sorted_and_keyed() {
        let signer = GatewaySigner::new("merchant", "secret");
        let raw = signer.canonical_string(&params());
        assert_eq!(
            raw,
            "amount=10&id=merchant&status=1&type=deposit&unique_id=ORD17001&token=secret"
        );
    }

    #[test]
    fn empty_and_null_values_are_dropped() {
        let signer = GatewaySigner::new("merchant", "secret");
        let mut map = params();
        map.insert("memo".to_string(), json!(""));
        map.insert("coin".to_string(), Value::Null);
        assert_eq!(signer.canonical_string(&map), signer.canonical_string(&params()));
    }

    #[test]
    fn sign_is_ignored_during_canonicalization() {
        let signer = GatewaySigner::new("merchant", "secret");
        let mut map = params();
        map.insert("sign".to_string(), json!("AAAA"));
        assert_eq!(signer.sign(&map), signer.sign(&params()));
    }

    #[test]
    fn verify_accepts_own_signature() {
        let signer = GatewaySigner::new("merchant", "secret");
        let mut map = params();
        let sign = signer.sign(&map);
        map.insert("sign".to_string(), json!(sign));
        assert!(signer.verify(&map));
    }

    #[test]
    fn verify_rejects_wrong_secret() {
        let signer = GatewaySigner::new("merchant", "secret");
        let wrong = GatewaySigner::new("merchant", "other");
        let mut map = params();
        let sign = wrong.sign(&map);
        map.insert("sign".to_string(), json!(sign));
        assert!(!signer.verify(&map));
    }

    #[test]
    fn verify_rejects_tampered_parameter() {
        let signer = GatewaySigner::new("merchant", "secret");
        let mut map = params();
        let sign = signer.sign(&map);
        map.insert("sign".to_string(), json!(sign));
        map.insert("amount".to_string(), json!("9999"));
        assert!(!signer.verify(&map));
    }

    #[test]
    fn verify_rejects_missing_sign() {
        let signer = GatewaySigner::new("merchant", "secret");
        assert!(!signer.verify(&params()));
    }

    #[test]
    fn digest_is_uppercase_hex() {
        let signer = GatewaySigner::new("merchant", "secret");
        let sign = signer.sign(&params());
        assert_eq!(sign.len(), 32);
        assert!(sign.chars().all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
    }
}
