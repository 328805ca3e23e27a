use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqliteSynchronous,
};

use crate::schema::{NewOrder, Order};

pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens (creating if missing) the SQLite database and ensures the
    /// orders schema exists. WAL + NORMAL sync + busy timeout match the
    /// production deployment settings.
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .context("Failed to create SQLite connect options")?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_millis(5000));

        let pool = SqlitePool::connect_with(options)
            .await
            .context("Failed to connect to SQLite database")?;

        let db = Self { pool };
        db.init().await?;
        Ok(db)
    }

    /// Creates the orders table and its lookup indexes idempotently.
    pub async fn init(&self) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS orders (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                order_id TEXT UNIQUE NOT NULL,
                user_id INTEGER NOT NULL,
                username TEXT,
                target TEXT,
                months INTEGER NOT NULL,
                amount_usdt REAL NOT NULL,
                payment_method TEXT NOT NULL,
                pay_address TEXT,
                pay_url TEXT,
                status TEXT NOT NULL DEFAULT 'pending',
                paid_amount REAL,
                paid_at TIMESTAMP,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .context("Failed to create orders table")?;

        for index in [
            "CREATE INDEX IF NOT EXISTS idx_orders_status ON orders(status)",
            "CREATE INDEX IF NOT EXISTS idx_orders_user_id ON orders(user_id)",
            "CREATE INDEX IF NOT EXISTS idx_orders_order_id ON orders(order_id)",
            "CREATE INDEX IF NOT EXISTS idx_orders_pay_address ON orders(pay_address)",
            "CREATE INDEX IF NOT EXISTS idx_orders_created_at ON orders(created_at)",
        ] {
            sqlx::query(index)
                .execute(&self.pool)
                .await
                .context("Failed to create orders index")?;
        }

        Ok(())
    }

    pub async fn create_order(&self, order: &NewOrder) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO orders (
                order_id, user_id, username, target, months,
                amount_usdt, payment_method, pay_address, status
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, 'pending')
            "#,
        )
        .bind(&order.order_id)
        .bind(order.user_id)
        .bind(&order.username)
        .bind(&order.target)
        .bind(order.months)
        .bind(order.amount_usdt)
        .bind(&order.payment_method)
        .bind(&order.pay_address)
        .execute(&self.pool)
        .await
        .context("Failed to save order to database")?;

        log::info!("Order created: {}", order.order_id);
        Ok(())
    }

    pub async fn get_order(&self, order_id: &str) -> anyhow::Result<Option<Order>> {
        let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE order_id = ?")
            .bind(order_id)
            .fetch_optional(&self.pool)
            .await
            .context(format!("Failed to get order {}", order_id))?;
        Ok(order)
    }

    pub async fn get_orders_by_user(&self, user_id: i64) -> anyhow::Result<Vec<Order>> {
        let orders = sqlx::query_as::<_, Order>(
            "SELECT * FROM orders WHERE user_id = ? ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .context(format!("Failed to get orders for user {}", user_id))?;
        Ok(orders)
    }

    pub async fn get_all_orders(&self) -> anyhow::Result<Vec<Order>> {
        let orders =
            sqlx::query_as::<_, Order>("SELECT * FROM orders ORDER BY created_at DESC")
                .fetch_all(&self.pool)
                .await
                .context("Failed to get all orders")?;
        Ok(orders)
    }

    pub async fn get_order_by_address(&self, pay_address: &str) -> anyhow::Result<Option<Order>> {
        let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE pay_address = ?")
            .bind(pay_address)
            .fetch_optional(&self.pool)
            .await
            .context(format!("Failed to get order for address {}", pay_address))?;
        Ok(order)
    }

    /// Applies the `pending -> paid` transition. The status precondition
    /// makes the update atomic: of any number of concurrent deliveries for
    /// the same order, exactly one observes `true`.
    pub async fn mark_paid(&self, order_id: &str, amount: f64) -> anyhow::Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE orders
            SET status = 'paid',
                paid_amount = ?,
                paid_at = CURRENT_TIMESTAMP,
                updated_at = CURRENT_TIMESTAMP
            WHERE order_id = ? AND status = 'pending'
            "#,
        )
        .bind(amount)
        .bind(order_id)
        .execute(&self.pool)
        .await
        .context(format!("Failed to mark order {} as paid", order_id))?;

        Ok(result.rows_affected() == 1)
    }

    /// `pending -> failed`, same precondition semantics as [`mark_paid`].
    ///
    /// [`mark_paid`]: Database::mark_paid
    pub async fn mark_failed(&self, order_id: &str) -> anyhow::Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE orders
            SET status = 'failed', updated_at = CURRENT_TIMESTAMP
            WHERE order_id = ? AND status = 'pending'
            "#,
        )
        .bind(order_id)
        .execute(&self.pool)
        .await
        .context(format!("Failed to mark order {} as failed", order_id))?;

        Ok(result.rows_affected() == 1)
    }

    /// Moves pending orders created at least `timeout_minutes` ago to
    /// `expired`. Returns how many orders were expired.
    pub async fn expire_stale(&self, timeout_minutes: i64) -> anyhow::Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE orders
            SET status = 'expired', updated_at = CURRENT_TIMESTAMP
            WHERE status = 'pending'
              AND datetime(created_at) <= datetime('now', '-' || ? || ' minutes')
            "#,
        )
        .bind(timeout_minutes)
        .execute(&self.pool)
        .await
        .context("Failed to expire stale orders")?;

        Ok(result.rows_affected())
    }

    pub async fn set_pay_url(&self, order_id: &str, pay_url: &str) -> anyhow::Result<()> {
        sqlx::query(
            "UPDATE orders SET pay_url = ?, updated_at = CURRENT_TIMESTAMP WHERE order_id = ?",
        )
        .bind(pay_url)
        .bind(order_id)
        .execute(&self.pool)
        .await
        .context(format!("Failed to set pay url for order {}", order_id))?;
        Ok(())
    }

    /// Operational tooling only; the service itself never deletes orders.
    pub async fn delete_order(&self, order_id: &str) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM orders WHERE order_id = ?")
            .bind(order_id)
            .execute(&self.pool)
            .await
            .context(format!("Failed to delete order {}", order_id))?;
        log::info!("Order {} deleted", order_id);
        Ok(())
    }
}
