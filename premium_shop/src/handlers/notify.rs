use std::net::IpAddr;

use actix_web::{HttpRequest, HttpResponse, get, post, web};
use serde_json::{Value, json};

use crate::state::AppState;

const SUCCESS_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>Payment Success</title></head>
<body style="font-family: sans-serif; text-align: center; padding-top: 4em;">
<h1>Payment Success</h1>
<p>Your payment was received. You can return to the bot now.</p>
</body>
</html>
"#;

fn client_ip(req: &HttpRequest) -> Option<IpAddr> {
    req.peer_addr().map(|addr| addr.ip())
}

/// Success redirect page the gateway sends the user back to.
#[get("/okpay/notify")]
pub async fn notify_page(req: HttpRequest, state: web::Data<AppState>) -> HttpResponse {
    let ip = client_ip(&req);
    if !state.is_allowed_source(ip) {
        log::error!("Unauthorized IP callback: {:?}", ip);
        return HttpResponse::Forbidden()
            .json(json!({ "status": "error", "message": "Unauthorized IP" }));
    }

    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(SUCCESS_PAGE)
}

/// OkPay server-to-server payment notification.
///
/// The body is an envelope: `sign` at the top level, the event fields
/// (`unique_id`, `amount`, `status`, `type`) in a nested `data` object.
/// Checks, in order: source IP against the allow-list, the keyed digest
/// over the full top-level parameter set, presence of `data`, then the
/// event filter (only completed deposits reach the order store). The
/// `pending -> paid` transition is a conditional update, so gateway
/// retries and duplicate deliveries cannot credit an order twice;
/// redeliveries of an already-terminal order are answered with success
/// and change nothing.
#[post("/okpay/notify")]
pub async fn notify_callback(
    req: HttpRequest,
    body: web::Json<Value>,
    state: web::Data<AppState>,
) -> HttpResponse {
    let ip = client_ip(&req);
    if !state.is_allowed_source(ip) {
        log::error!("Unauthorized IP callback: {:?}", ip);
        return HttpResponse::Forbidden()
            .json(json!({ "status": "error", "message": "Unauthorized IP" }));
    }

    log::info!("OkPay server callback received from {:?}", ip);

    let Some(params) = body.as_object() else {
        log::error!("Invalid JSON format from OkPay");
        return HttpResponse::BadRequest()
            .json(json!({ "status": "error", "message": "Invalid JSON" }));
    };

    if !state.signer.verify(params) {
        log::error!("OkPay signature verification failed");
        return HttpResponse::Forbidden()
            .json(json!({ "status": "error", "message": "Invalid signature" }));
    }

    let Some(callback_data) = params.get("data").and_then(Value::as_object) else {
        log::error!("Missing 'data' field in callback");
        return HttpResponse::BadRequest()
            .json(json!({ "status": "error", "message": "Missing data" }));
    };

    let pay_type = callback_data.get("type").and_then(Value::as_str);
    if pay_type != Some("deposit") {
        log::info!("Ignoring non-deposit callback: {:?}", pay_type);
        return HttpResponse::Ok()
            .json(json!({ "status": "success", "message": "Ignored" }));
    }

    let status = callback_data.get("status").and_then(Value::as_i64);
    if status != Some(1) {
        log::info!("Payment not completed: status={:?}", status);
        return HttpResponse::Ok()
            .json(json!({ "status": "success", "message": "Pending" }));
    }

    let Some(order_id) = callback_data.get("unique_id").and_then(Value::as_str) else {
        log::error!("Missing unique_id in callback data");
        return HttpResponse::BadRequest()
            .json(json!({ "status": "error", "message": "Missing unique_id" }));
    };

    let Some(amount) = parse_amount(callback_data.get("amount")) else {
        log::error!("Missing or invalid amount in callback for {}", order_id);
        return HttpResponse::BadRequest()
            .json(json!({ "status": "error", "message": "Missing amount" }));
    };

    let order = match state.db.get_order(order_id).await {
        Ok(order) => order,
        Err(e) => {
            log::error!("Failed to load order {}: {:#}", order_id, e);
            return HttpResponse::InternalServerError()
                .json(json!({ "status": "error", "message": "Internal error" }));
        }
    };

    let Some(order) = order else {
        // Unknown order ids are acknowledged so the gateway stops retrying.
        log::warn!("Order not found: {}", order_id);
        return HttpResponse::Ok()
            .json(json!({ "status": "success", "message": "Ignored" }));
    };

    if order.status.is_terminal() {
        log::info!(
            "Order {} already {}, treating redelivery as success",
            order_id,
            order.status.as_str()
        );
        return HttpResponse::Ok().json(json!({ "status": "success", "message": "OK" }));
    }

    match state.db.mark_paid(order_id, amount).await {
        Ok(true) => {
            log::info!("Order {} marked paid ({} USDT)", order_id, amount);
            HttpResponse::Ok().json(json!({ "status": "success", "message": "OK" }))
        }
        Ok(false) => {
            // A concurrent delivery won the conditional update.
            log::info!("Order {} was already finalized concurrently", order_id);
            HttpResponse::Ok().json(json!({ "status": "success", "message": "OK" }))
        }
        Err(e) => {
            log::error!("Failed to process notification for {}: {:#}", order_id, e);
            HttpResponse::InternalServerError()
                .json(json!({ "status": "error", "message": "Process failed" }))
        }
    }
}

fn parse_amount(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.parse::<f64>().ok(),
        _ => None,
    }
}
