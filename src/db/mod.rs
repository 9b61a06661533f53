pub mod auth;
pub mod connection;
pub mod history;
pub mod leads;
pub mod rate_limits;
pub mod seed;
pub mod users;

pub use connection::Database;
