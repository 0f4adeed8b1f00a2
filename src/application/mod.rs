//! Application Layer
//!
//! Operation requests, the dispatcher that runs them, and the batch runner.

pub mod batch;
pub mod dispatcher;
pub mod error;
pub mod output;
pub mod request;

pub use batch::{run_batch, BatchError, CompletedItem, FailedItem, ItemResult};
pub use dispatcher::OperationDispatcher;
pub use error::OperationError;
pub use output::{OperationOutput, OperationStatus};
pub use request::OperationRequest;
