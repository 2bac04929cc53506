pub mod config;
pub mod context;
pub mod error;
pub mod identity;
pub mod proxy;
pub mod rate_limit;
pub mod registry;
pub mod routes;
pub mod utils;
