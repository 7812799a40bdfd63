// ABOUTME: Crate-wide error type unifying store, protocol, and configuration failures
// ABOUTME: Mirrors the teacher crate's one-error-enum-per-concern layering, composed with #[from]

use thiserror::Error;

/// Error returned by a `MessageStore` implementation (spec §7, kind 6).
///
/// The core never interprets the contents of a store error — it only
/// propagates it, so this wraps an opaque message rather than a structured
/// variant set.
#[derive(Debug, Error)]
#[error("store error: {0}")]
pub struct StoreError(pub String);

impl StoreError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

/// Error returned by a `ProtocolSender` implementation.
#[derive(Debug, Error)]
#[error("protocol send error: {0}")]
pub struct ProtocolError(pub String);

impl ProtocolError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

/// Configuration errors, fatal at load time (spec §7, kind 5).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error(
        "at most one of send_long_messages, send_multipart_sar, send_multipart_udh may be set; found: {0:?}"
    )]
    MutuallyExclusiveLongMessageFlags(Vec<&'static str>),

    #[error("invalid delivery_report_regex: {0}")]
    InvalidRegex(String),
}

/// Top-level error type for this core (spec §7).
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Non-ASCII address supplied to `SubmitProcessor::send` (spec §7, kind 7).
    #[error("address field '{field}' contains non-ASCII characters: {value:?}")]
    NonAsciiAddress { field: &'static str, value: String },
}

pub type CoreResult<T> = Result<T, CoreError>;
