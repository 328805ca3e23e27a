use rand::Rng;

/// Generates a public order identifier: `ORD<unix-ts><user-id><salt>`.
/// The salt avoids collisions when one user creates several orders
/// within the same second.
pub fn generate_order_id(user_id: i64) -> String {
    let ts = chrono::Utc::now().timestamp();
    let salt: u32 = rand::rng().random_range(0..1000u32);
    format!("ORD{}{}{:03}", ts, user_id, salt)
}
