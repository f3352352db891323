//! recordd - item and user records over HTTP
//!
//! Create, list, update and delete endpoints backed by SQLite, plus a
//! static file server for the pre-built frontend.

pub mod cli;
pub mod http_server;
pub mod observability;
pub mod record;
pub mod rest_api;
