mod notify;
mod orders;

use actix_web::{HttpResponse, Responder, get};
pub use notify::*;
pub use orders::*;

#[get("/health")]
pub async fn health() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}
