use thiserror::Error;

use crate::adapters::solana::{BuildError, RpcError, SubmissionError, WalletError};
use crate::domain::instructions::DerivationError;
use crate::domain::units::AmountError;
use crate::ports::execution::SwapError;
use crate::ports::host::HostError;
use crate::ports::market_data::PriceError;

/// Failure of one operation. Never carries key material.
#[derive(Debug, Error)]
pub enum OperationError {
    #[error(transparent)]
    Rpc(#[from] RpcError),
    #[error("Price lookup failed: {0}")]
    Price(#[from] PriceError),
    #[error(transparent)]
    Swap(#[from] SwapError),
    #[error(transparent)]
    Derivation(#[from] DerivationError),
    #[error(transparent)]
    InvalidKey(#[from] WalletError),
    #[error(transparent)]
    Submission(#[from] SubmissionError),
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    MissingCredential(String),
}

impl OperationError {
    pub fn validation(message: impl Into<String>) -> Self {
        OperationError::Validation(message.into())
    }

    pub fn missing_credential(message: impl Into<String>) -> Self {
        OperationError::MissingCredential(message.into())
    }

    /// Stable error category reported with failed items
    pub fn kind(&self) -> &'static str {
        match self {
            OperationError::Rpc(e) if e.is_transport() => "TransportError",
            OperationError::Rpc(_) => "RpcApplicationError",
            OperationError::Price(PriceError::Http(_) | PriceError::Status(_)) => "TransportError",
            OperationError::Price(PriceError::Parse(_)) => "PriceDataError",
            OperationError::Swap(SwapError::Quote { .. }) => "QuoteError",
            OperationError::Swap(SwapError::SwapBuild { .. }) => "SwapBuildError",
            OperationError::Derivation(_) => "DerivationError",
            OperationError::InvalidKey(WalletError::MissingKey) => "MissingCredentialError",
            OperationError::InvalidKey(_) => "InvalidKeyError",
            OperationError::Submission(_) => "SubmissionError",
            OperationError::Validation(_) => "ValidationError",
            OperationError::MissingCredential(_) => "MissingCredentialError",
        }
    }
}

impl From<AmountError> for OperationError {
    fn from(err: AmountError) -> Self {
        OperationError::Validation(err.to_string())
    }
}

impl From<BuildError> for OperationError {
    fn from(err: BuildError) -> Self {
        match err {
            BuildError::Derivation(e) => OperationError::Derivation(e),
            BuildError::Rpc(e) => OperationError::Rpc(e),
            BuildError::Amount(e) => e.into(),
            BuildError::NoInstructions => OperationError::Submission(SubmissionError::Serialize(
                "Transaction has no instructions".to_string(),
            )),
            BuildError::Serialize(msg) => OperationError::Submission(SubmissionError::Serialize(msg)),
        }
    }
}

impl From<HostError> for OperationError {
    fn from(err: HostError) -> Self {
        match err {
            HostError::Credentials(msg) => OperationError::MissingCredential(msg),
            other => OperationError::Validation(other.to_string()),
        }
    }
}
