//! Error types for collaborator operations.

use thiserror::Error;

/// Errors returned by persistent stores.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing store rejected or failed the operation.
    #[error("storage backend failed: {0}")]
    Backend(String),

    /// The store is not reachable right now.
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Errors returned by the chat transport when sending.
#[derive(Debug, Error)]
pub enum SendError {
    /// The transport rejected the message.
    #[error("send rejected: {0}")]
    Rejected(String),

    /// The send did not complete in time.
    #[error("send timed out")]
    Timeout,

    /// The transport does not implement this kind of message.
    #[error("unsupported by transport: {0}")]
    Unsupported(&'static str),
}

/// Errors returned by lead delivery gateways (CRM and similar).
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// Required configuration is missing.
    #[error("delivery not configured: {0}")]
    NotConfigured(String),

    /// The lead is missing data the remote side requires.
    #[error("invalid lead: {0}")]
    InvalidLead(String),

    /// Network or protocol failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// The remote side answered with a non-success status.
    #[error("remote returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The delivery did not complete in time.
    #[error("delivery timed out")]
    Timeout,
}
