//! Batch runner
//!
//! Pulls items from an [`ItemSource`] one at a time and runs each through the
//! dispatcher. Items never share state; a failure either becomes that item's
//! result (continue-on-fail) or stops the batch.

use serde::Serialize;
use thiserror::Error;

use super::dispatcher::OperationDispatcher;
use super::error::OperationError;
use super::output::OperationOutput;
use crate::ports::host::ItemSource;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletedItem {
    pub item: usize,
    #[serde(flatten)]
    pub output: OperationOutput,
}

/// Error record kept in place of an output under continue-on-fail
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailedItem {
    pub item: usize,
    pub operation: String,
    pub error: String,
    pub error_kind: &'static str,
    pub node: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ItemResult {
    Completed(CompletedItem),
    Failed(FailedItem),
}

impl ItemResult {
    pub fn is_failed(&self) -> bool {
        matches!(self, ItemResult::Failed(_))
    }
}

/// First failure of a batch run without continue-on-fail
#[derive(Debug, Error)]
#[error("{node}: item {item} ({operation}) failed: {source}")]
pub struct BatchError {
    pub node: String,
    pub item: usize,
    pub operation: String,
    #[source]
    pub source: OperationError,
}

impl BatchError {
    pub fn kind(&self) -> &'static str {
        self.source.kind()
    }
}

/// Run every item of `source` in order
pub async fn run_batch(
    dispatcher: &OperationDispatcher,
    source: &dyn ItemSource,
) -> Result<Vec<ItemResult>, BatchError> {
    let count = source.item_count();
    let mut results = Vec::with_capacity(count);

    tracing::info!(items = count, continue_on_fail = source.continue_on_fail(), "Starting batch");

    for item in 0..count {
        let (operation, outcome) = run_item(dispatcher, source, item).await;

        match outcome {
            Ok(output) => {
                tracing::debug!(item, operation = %operation, "Item completed");
                results.push(ItemResult::Completed(CompletedItem { item, output }));
            }
            Err(e) if source.continue_on_fail() => {
                tracing::warn!(item, operation = %operation, kind = e.kind(), "Item failed: {}", e);
                results.push(ItemResult::Failed(FailedItem {
                    item,
                    operation,
                    error: e.to_string(),
                    error_kind: e.kind(),
                    node: source.node_name().to_string(),
                }));
            }
            Err(e) => {
                tracing::error!(item, operation = %operation, kind = e.kind(), "Item failed, stopping batch: {}", e);
                return Err(BatchError {
                    node: source.node_name().to_string(),
                    item,
                    operation,
                    source: e,
                });
            }
        }
    }

    let failed = results.iter().filter(|r| r.is_failed()).count();
    tracing::info!(items = count, failed, "Batch finished");

    Ok(results)
}

async fn run_item(
    dispatcher: &OperationDispatcher,
    source: &dyn ItemSource,
    item: usize,
) -> (String, Result<OperationOutput, OperationError>) {
    let request = match source.operation(item) {
        Ok(request) => request,
        Err(e) => return ("unknown".to_string(), Err(e.into())),
    };
    let operation = request.name().to_string();

    let credentials = match source.credentials(item) {
        Ok(credentials) => credentials,
        Err(e) => return (operation, Err(e.into())),
    };

    let outcome = dispatcher.execute(&request, &credentials).await;
    (operation, outcome)
}
