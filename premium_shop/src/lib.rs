pub mod cleaner;
pub mod config;
pub mod handlers;
pub mod okpay;
pub mod state;
