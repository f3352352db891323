//! # Response Envelope
//!
//! Every endpoint answers with `{status, message, data}`; listings add
//! `page`, `total_pages` and `total_items`.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

/// Single-payload envelope. `data` serializes as `null` when absent.
#[derive(Debug, Clone, Serialize)]
pub struct Envelope<T: Serialize> {
    pub status: Status,
    pub message: String,
    pub data: Option<T>,
}

impl<T: Serialize> Envelope<T> {
    pub fn success(message: impl Into<String>, data: T) -> Self {
        Self {
            status: Status::Success,
            message: message.into(),
            data: Some(data),
        }
    }
}

impl Envelope<()> {
    /// Success without a payload
    pub fn empty(message: impl Into<String>) -> Self {
        Self {
            status: Status::Success,
            message: message.into(),
            data: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: Status::Error,
            message: message.into(),
            data: None,
        }
    }
}

/// Paginated listing envelope
#[derive(Debug, Clone, Serialize)]
pub struct ListEnvelope<T: Serialize> {
    pub status: Status,
    pub message: String,
    pub data: Vec<T>,
    pub page: u32,
    pub total_pages: u64,
    pub total_items: u64,
}

impl<T: Serialize> ListEnvelope<T> {
    pub fn new(
        message: impl Into<String>,
        data: Vec<T>,
        page: u32,
        total_pages: u64,
        total_items: u64,
    ) -> Self {
        Self {
            status: Status::Success,
            message: message.into(),
            data,
            page,
            total_pages,
            total_items,
        }
    }
}
