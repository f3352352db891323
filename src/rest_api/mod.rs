//! # REST API Module
//!
//! Create, list, update and delete endpoints for a record collection, all
//! answering with the same `{status, message, data}` envelope.

pub mod errors;
pub mod handler;
pub mod parser;
pub mod response;
pub mod server;

pub use errors::{ApiError, ApiResult};
pub use handler::RecordService;
pub use parser::{parse_list_query, parse_new_record, parse_patch};
pub use response::{Envelope, ListEnvelope, Status};
pub use server::record_routes;
