//! FILENAME: cellset-renderer/src/error.rs

use olap_engine::{BackendError, QueryError};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RendererError {
    #[error("Query error: {0}")]
    Query(#[from] QueryError),

    #[error("Error when executing query: {0}")]
    Execution(#[from] BackendError),
}
