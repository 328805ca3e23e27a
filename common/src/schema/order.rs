use serde::{Deserialize, Serialize};

/// Lifecycle of an order. `pending` is the only state that can still
/// change; `paid`, `failed` and `expired` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Paid,
    Failed,
    Expired,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Paid => "paid",
            OrderStatus::Failed => "failed",
            OrderStatus::Expired => "expired",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, OrderStatus::Pending)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Order {
    pub id: i64,
    pub order_id: String,
    pub user_id: i64,
    pub username: Option<String>,
    pub target: Option<String>,
    pub months: i64,
    pub amount_usdt: f64,
    pub payment_method: String, // "ton", "trc20", "okpay"
    pub pay_address: Option<String>,
    pub pay_url: Option<String>,
    pub status: OrderStatus,
    pub paid_amount: Option<f64>,
    pub paid_at: Option<chrono::NaiveDateTime>,
    pub created_at: chrono::NaiveDateTime,
    pub updated_at: chrono::NaiveDateTime,
}

/// Fields supplied when an order is created. Status starts as `pending`,
/// ids and timestamps are assigned by the database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrder {
    pub order_id: String,
    pub user_id: i64,
    pub username: Option<String>,
    pub target: Option<String>,
    pub months: i64,
    pub amount_usdt: f64,
    pub payment_method: String,
    pub pay_address: Option<String>,
}
