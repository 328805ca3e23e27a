mod db;
mod helpers;
mod schema;
mod sign;

pub use db::*;
pub use helpers::*;
pub use schema::*;
pub use sign::*;
