use thiserror::Error;

use crate::domain::error::DomainError;
use crate::domain::id::ProductId;

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

/// Failures from the remote catalog. Never fatal; surfaced as display text.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("catalog request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("catalog returned HTTP {status} for {url}")]
    Status { status: u16, url: String },

    #[error("failed to decode catalog response: {0}")]
    Decode(String),

    #[error("product {0} not found")]
    NotFound(ProductId),

    #[error("invalid catalog URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("catalog unavailable: {0}")]
    Unavailable(String),
}

/// Failures from the persistent cart store.
#[derive(Error, Debug, Clone)]
pub enum StoreError {
    #[error("store connection error: {0}")]
    Connection(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("corrupt cart row: {0}")]
    Corrupt(String),

    #[error("cart store is no longer available")]
    Unavailable,
}

/// Checkout rejections.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CheckoutError {
    #[error("checkout field is blank: {field}")]
    MissingField { field: &'static str },

    #[error("cannot check out an empty cart")]
    EmptyCart,
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Checkout(#[from] CheckoutError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// True when the failure came from the cart store.
    #[must_use]
    pub const fn is_store_failure(&self) -> bool {
        matches!(self, Self::Store(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Catalog(CatalogError::Transport(err))
    }
}

impl From<diesel::result::Error> for Error {
    fn from(err: diesel::result::Error) -> Self {
        Error::Store(StoreError::Database(err.to_string()))
    }
}

impl From<tokio::task::JoinError> for Error {
    fn from(err: tokio::task::JoinError) -> Self {
        Error::Store(StoreError::Connection(format!(
            "store worker task failed: {err}"
        )))
    }
}
