mod args;

pub use args::{Args, Commands, CreateOrderArgs, DeleteOrderArgs, ListOrdersArgs};
use clap::Parser;
use common::{Database, NewOrder, generate_order_id};

/// Runs the CLI command parser and executes the selected command.
/// Returns true if a CLI command was handled, false otherwise.
pub async fn run_cli() -> bool {
    let args = Args::parse();
    match &args.command {
        Some(Commands::InitDb) => {
            match connect_db().await {
                Ok(_) => println!("Orders database schema created."),
                Err(e) => eprintln!("Failed to initialize database: {e}"),
            }
            true
        }
        Some(Commands::CreateOrder(order_args)) => {
            match create_order(order_args).await {
                Ok(order_id) => println!("Order created: {order_id}"),
                Err(e) => eprintln!("Failed to create order: {e}"),
            }
            true
        }
        Some(Commands::ListOrders(list_args)) => {
            match list_orders(list_args.user_id).await {
                Ok(()) => {}
                Err(e) => eprintln!("Failed to list orders: {e}"),
            }
            true
        }
        Some(Commands::DeleteOrder(delete_args)) => {
            match delete_order(&delete_args.order_id).await {
                Ok(()) => println!("Order deleted: {}", delete_args.order_id),
                Err(e) => eprintln!("Failed to delete order: {e}"),
            }
            true
        }
        None => false,
    }
}

/// Helper to open the database from the DATABASE_URL environment variable.
async fn connect_db() -> anyhow::Result<Database> {
    let database_url =
        std::env::var("DATABASE_URL").map_err(|_| anyhow::anyhow!("DATABASE_URL not set"))?;
    Database::new(&database_url).await
}

/// Inserts a pending order and returns its generated order id.
async fn create_order(args: &CreateOrderArgs) -> anyhow::Result<String> {
    let db = connect_db().await?;

    let order = NewOrder {
        order_id: generate_order_id(args.user_id),
        user_id: args.user_id,
        username: None,
        target: Some(args.target.clone()),
        months: args.months,
        amount_usdt: args.amount,
        payment_method: args.payment_method.clone(),
        pay_address: None,
    };

    db.create_order(&order).await?;
    Ok(order.order_id)
}

/// Removes an order row; refuses nothing, so check the id before running.
async fn delete_order(order_id: &str) -> anyhow::Result<()> {
    let db = connect_db().await?;
    if db.get_order(order_id).await?.is_none() {
        return Err(anyhow::anyhow!("No order with id '{order_id}' found."));
    }
    db.delete_order(order_id).await
}

/// Prints orders, one line each, newest first.
async fn list_orders(user_id: Option<i64>) -> anyhow::Result<()> {
    let db = connect_db().await?;
    let orders = match user_id {
        Some(user_id) => db.get_orders_by_user(user_id).await?,
        None => db.get_all_orders().await?,
    };

    if orders.is_empty() {
        println!("No orders found.");
        return Ok(());
    }

    for order in orders {
        println!(
            "{} user={} target={} {}M {} USDT via {} [{}] created={}",
            order.order_id,
            order.user_id,
            order.target.as_deref().unwrap_or("-"),
            order.months,
            order.amount_usdt,
            order.payment_method,
            order.status.as_str(),
            order.created_at,
        );
    }
    Ok(())
}
