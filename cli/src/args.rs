use clap::{Args as ClapArgs, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(author, version, about = "Premium Shop CLI - manage the orders database")]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the orders table and indexes
    InitDb,

    /// Create an order directly in the database (for testing only)
    ///
    /// Prints the generated order id. Useful for exercising the callback
    /// endpoint without going through the bot conversation flow.
    CreateOrder(CreateOrderArgs),

    /// List orders, optionally filtered by Telegram user id
    ListOrders(ListOrdersArgs),

    /// Delete an order from the database (for testing only)
    ///
    /// The service itself never deletes orders; this removes leftovers
    /// created by `create-order`.
    DeleteOrder(DeleteOrderArgs),
}

#[derive(ClapArgs, Debug)]
pub struct CreateOrderArgs {
    /// Telegram user id that owns the order
    #[arg(short, long, help = "Telegram user id that owns the order")]
    pub user_id: i64,

    /// Recipient username for the Premium subscription
    #[arg(short, long, help = "Recipient username for the Premium subscription")]
    pub target: String,

    /// Subscription length in months
    #[arg(short, long, default_value_t = 3, help = "Subscription length in months")]
    pub months: i64,

    /// Price in USDT
    #[arg(short, long, help = "Price in USDT")]
    pub amount: f64,

    /// Payment method: ton, trc20 or okpay
    #[arg(
        short,
        long,
        default_value = "okpay",
        help = "Payment method: ton, trc20 or okpay"
    )]
    pub payment_method: String,
}

#[derive(ClapArgs, Debug)]
pub struct DeleteOrderArgs {
    /// Public order id, e.g. ORD17001234567042
    #[arg(short, long, help = "Public order id, e.g. ORD17001234567042")]
    pub order_id: String,
}

#[derive(ClapArgs, Debug)]
pub struct ListOrdersArgs {
    /// Only list orders of this Telegram user
    #[arg(short, long, help = "Only list orders of this Telegram user")]
    pub user_id: Option<i64>,
}
