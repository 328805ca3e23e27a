use actix_web::test::TestRequest;
use actix_web::{App, test};
use serde_json::{Value, json};

use premium_shop::handlers::{create_order, get_order, get_user_orders};

mod support;

#[actix_web::test]
async fn crypto_order_can_be_created_and_fetched() {
    let test_app = support::init_state(vec![]).await;

    let app = test::init_service(
        App::new()
            .app_data(test_app.state.clone())
            .service(create_order)
            .service(get_order)
            .service(get_user_orders),
    )
    .await;

    let req = TestRequest::post()
        .uri("/orders")
        .set_json(json!({
            "user_id": 7,
            "username": "alice",
            "target": "bob",
            "months": 6,
            "amount_usdt": 50.0,
            "payment_method": "ton",
            "pay_address": "EQDtest-address",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 201);

    let created: Value = test::read_body_json(resp).await;
    let order_id = created["order_id"].as_str().expect("order_id").to_string();
    assert_eq!(created["status"], "pending");
    assert_eq!(created["months"], 6);

    let req = TestRequest::get()
        .uri(&format!("/orders/{order_id}"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
    let fetched: Value = test::read_body_json(resp).await;
    assert_eq!(fetched["order_id"], order_id.as_str());
    assert_eq!(fetched["pay_address"], "EQDtest-address");

    let req = TestRequest::get().uri("/orders?user_id=7").to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
    let listed: Value = test::read_body_json(resp).await;
    assert_eq!(listed.as_array().expect("array").len(), 1);

    let req = TestRequest::get().uri("/orders?user_id=8").to_request();
    let resp = test::call_service(&app, req).await;
    let listed: Value = test::read_body_json(resp).await;
    assert!(listed.as_array().expect("array").is_empty());
}

#[actix_web::test]
async fn unknown_order_returns_not_found() {
    let test_app = support::init_state(vec![]).await;

    let app =
        test::init_service(App::new().app_data(test_app.state.clone()).service(get_order)).await;

    let req = TestRequest::get().uri("/orders/ORD-missing").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 404);
}
