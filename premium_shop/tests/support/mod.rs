use std::net::IpAddr;

use actix_web::web;
use common::{Database, GatewaySigner, NewOrder, generate_order_id};
use serde_json::{Map, Value, json};
use tempfile::TempDir;

use premium_shop::okpay::OkPayClient;
use premium_shop::state::AppState;

#[allow(dead_code)]
pub const TEST_MERCHANT: &str = "merchant-1";
#[allow(dead_code)]
pub const TEST_SECRET: &str = "test-secret";

pub struct TestApp {
    pub state: web::Data<AppState>,
    _dir: TempDir,
}

/// Builds an app state over a throwaway on-disk SQLite database.
pub async fn init_state(allowed_ips: Vec<IpAddr>) -> TestApp {
    let dir = tempfile::tempdir().expect("create temp dir");
    let database_url = format!("sqlite://{}", dir.path().join("orders.db").display());

    let db = Database::new(&database_url).await.expect("open test db");
    let signer = GatewaySigner::new(TEST_MERCHANT, TEST_SECRET);
    let okpay = OkPayClient::new(signer.clone(), "http://localhost");

    let state = AppState {
        db,
        signer,
        allowed_ips,
        okpay,
    };

    TestApp {
        state: web::Data::new(state),
        _dir: dir,
    }
}

/// Inserts a pending order and returns its order id.
#[allow(dead_code)]
pub async fn seed_order(state: &AppState, user_id: i64, amount_usdt: f64) -> String {
    let order = NewOrder {
        order_id: generate_order_id(user_id),
        user_id,
        username: Some(format!("user{user_id}")),
        target: Some("recipient".to_string()),
        months: 3,
        amount_usdt,
        payment_method: "okpay".to_string(),
        pay_address: None,
    };
    state.db.create_order(&order).await.expect("seed order");
    order.order_id
}

/// Builds a deposit callback body signed with the given secret. The event
/// fields sit in the nested `data` object, `sign` at the top level, the
/// shape the gateway delivers.
#[allow(dead_code)]
pub fn signed_callback(order_id: &str, amount: &str, status: i64, secret: &str) -> Value {
    let mut params = Map::new();
    params.insert(
        "data".to_string(),
        json!({
            "unique_id": order_id,
            "amount": amount,
            "status": status,
            "type": "deposit",
        }),
    );

    let sign = GatewaySigner::new(TEST_MERCHANT, secret).sign(&params);
    params.insert("sign".to_string(), json!(sign));
    Value::Object(params)
}
