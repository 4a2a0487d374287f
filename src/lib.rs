pub mod api;
pub mod config;
pub mod docs;
pub mod migration;
pub mod model;
pub mod routes;
pub mod store;
pub mod utils;
