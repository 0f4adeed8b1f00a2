//! Host port
//!
//! The host owns the batch: it hands out items, the operation parameters bound
//! to each item, the credentials to use, and whether a failing item should stop
//! the whole batch.

use thiserror::Error;

use crate::application::OperationRequest;
use crate::config::Credentials;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HostError {
    #[error("Item {0} is out of range")]
    NoSuchItem(usize),
    #[error("Invalid parameters for item {index}: {message}")]
    InvalidParameters { index: usize, message: String },
    #[error("Credentials unavailable: {0}")]
    Credentials(String),
}

pub trait ItemSource {
    fn item_count(&self) -> usize;

    fn operation(&self, index: usize) -> Result<OperationRequest, HostError>;

    fn credentials(&self, index: usize) -> Result<Credentials, HostError>;

    fn continue_on_fail(&self) -> bool;

    /// Name used to attribute errors to this node
    fn node_name(&self) -> &str;
}
