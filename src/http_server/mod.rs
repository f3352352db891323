//! # HTTP Server Module
//!
//! # Endpoints
//!
//! - `/item`, `/item/:id` - Item records
//! - `/api/users`, `/api/users/:id` - User records
//! - `/health` - Health check
//! - `/` and everything else - static frontend

pub mod config;
pub mod server;

pub use config::HttpServerConfig;
pub use server::HttpServer;
