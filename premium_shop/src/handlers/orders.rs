use actix_web::{Error, HttpResponse, error::InternalError, get, http::StatusCode, post, web};
use common::{NewOrder, generate_order_id};
use serde::Deserialize;

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub user_id: i64,
    pub username: Option<String>,
    pub target: Option<String>,
    pub months: i64,
    pub amount_usdt: f64,
    pub payment_method: String,
    pub pay_address: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OrderQuery {
    user_id: i64,
}

#[post("/orders")]
pub async fn create_order(
    payload: web::Json<CreateOrderRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let payload = payload.into_inner();

    let order = NewOrder {
        order_id: generate_order_id(payload.user_id),
        user_id: payload.user_id,
        username: payload.username,
        target: payload.target,
        months: payload.months,
        amount_usdt: payload.amount_usdt,
        payment_method: payload.payment_method,
        pay_address: payload.pay_address,
    };

    app_state.db.create_order(&order).await.map_err(|e| {
        log::error!("Failed to create order: {:#}", e);
        InternalError::new(
            "Failed to create order. Please try again later.",
            StatusCode::INTERNAL_SERVER_ERROR,
        )
    })?;

    // Gateway orders also need a payment link; crypto orders are paid
    // directly to pay_address and watched by the on-chain monitor.
    if order.payment_method == "okpay" {
        let pay_url = app_state
            .okpay
            .create_pay_link(&order.order_id, order.amount_usdt, order.months)
            .await
            .map_err(|e| {
                log::error!("OkPay pay link failed for {}: {:#}", order.order_id, e);
                InternalError::new(
                    "Failed to create payment link. Please try again later.",
                    StatusCode::BAD_GATEWAY,
                )
            })?;

        app_state
            .db
            .set_pay_url(&order.order_id, &pay_url)
            .await
            .map_err(|e| {
                log::error!("Failed to store pay url for {}: {:#}", order.order_id, e);
                InternalError::new(
                    "Failed to store payment link.",
                    StatusCode::INTERNAL_SERVER_ERROR,
                )
            })?;
    }

    let saved = app_state
        .db
        .get_order(&order.order_id)
        .await
        .map_err(|e| {
            log::error!("Failed to load created order {}: {:#}", order.order_id, e);
            InternalError::new(
                "Order was created but could not be loaded.",
                StatusCode::INTERNAL_SERVER_ERROR,
            )
        })?;

    Ok(HttpResponse::Created().json(saved))
}

#[get("/orders/{order_id}")]
pub async fn get_order(
    path: web::Path<String>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let order_id = path.into_inner();

    let order = app_state.db.get_order(&order_id).await.map_err(|e| {
        log::error!("Failed to get order {}: {:#}", order_id, e);
        InternalError::new(
            "Failed to get order. Please try again later.",
            StatusCode::INTERNAL_SERVER_ERROR,
        )
    })?;

    match order {
        Some(order) => Ok(HttpResponse::Ok().json(order)),
        None => Err(InternalError::new(
            "Order with provided id not found.",
            StatusCode::NOT_FOUND,
        )
        .into()),
    }
}

#[get("/orders")]
pub async fn get_user_orders(
    query: web::Query<OrderQuery>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let orders = app_state
        .db
        .get_orders_by_user(query.user_id)
        .await
        .map_err(|e| {
            log::error!("Failed to fetch orders for user {}: {:#}", query.user_id, e);
            InternalError::new(
                "Failed to get orders. Please try again later.",
                StatusCode::INTERNAL_SERVER_ERROR,
            )
        })?;

    Ok(HttpResponse::Ok().json(orders))
}
