pub mod rpc;
pub mod submitter;
pub mod tx_builder;
pub mod types;
pub mod wallet;

pub use rpc::{HttpTransport, RetryPolicy, RpcError, SolanaClient};
pub use submitter::{sign_and_submit, sign_transaction, Submission, SubmissionError, TransactionType};
pub use tx_builder::{BuildError, TransactionBuilder, UnsignedTransaction};
pub use types::{LatestBlockhash, SignatureInfo, TokenAmount, TransactionSummary};
pub use wallet::{WalletError, WalletManager};
