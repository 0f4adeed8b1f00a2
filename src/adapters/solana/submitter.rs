//! Sign and broadcast provider-built or locally built transactions
//!
//! The wire format is discovered, never declared: a payload is first read as
//! a versioned (v0) transaction and, failing that, as a legacy transaction.
//! bincode happily reads a legacy message through the versioned decoder, so
//! the versioned path only accepts messages carrying the v0 prefix.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::{Deserialize, Serialize};
use solana_sdk::message::VersionedMessage;
use solana_sdk::signature::{Keypair, Signature, Signer};
use solana_sdk::transaction::{Transaction, VersionedTransaction};
use thiserror::Error;

use super::rpc::{RpcError, SolanaClient};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Versioned,
    Legacy,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Versioned => "versioned",
            TransactionType::Legacy => "legacy",
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error("Transaction is not valid base64: {0}")]
    Encoding(String),
    #[error("Failed to deserialize transaction as versioned or legacy: {0}")]
    Deserialize(String),
    #[error("Wallet {0} is not a required signer of this transaction")]
    SignerNotRequired(String),
    #[error("Failed to sign transaction: {0}")]
    Signing(String),
    #[error("Failed to serialize signed transaction: {0}")]
    Serialize(String),
    #[error("Transaction broadcast failed: {0}")]
    Broadcast(#[from] RpcError),
}

impl SubmissionError {
    /// Transport failures during broadcast keep their own kind
    pub fn rpc_error(&self) -> Option<&RpcError> {
        match self {
            SubmissionError::Broadcast(e) => Some(e),
            _ => None,
        }
    }
}

/// Signed wire transaction ready for broadcast
#[derive(Debug, Clone, PartialEq)]
pub struct SignedTransaction {
    pub transaction_base64: String,
    pub signature: Signature,
    pub transaction_type: TransactionType,
}

/// Broadcast outcome: the node's signature and the discovered wire format
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub signature: String,
    pub transaction_type: TransactionType,
}

/// Decode, sign with `keypair` and re-encode, trying versioned then legacy
pub fn sign_transaction(transaction_base64: &str, keypair: &Keypair) -> Result<SignedTransaction, SubmissionError> {
    let bytes = BASE64
        .decode(transaction_base64.trim())
        .map_err(|e| SubmissionError::Encoding(e.to_string()))?;

    match bincode::deserialize::<VersionedTransaction>(&bytes) {
        Ok(tx) if matches!(tx.message, VersionedMessage::V0(_)) => sign_versioned(tx, keypair),
        _ => {
            tracing::debug!("Not a v0 transaction, falling back to legacy format");
            let tx: Transaction =
                bincode::deserialize(&bytes).map_err(|e| SubmissionError::Deserialize(e.to_string()))?;
            sign_legacy(tx, keypair)
        }
    }
}

fn sign_versioned(mut tx: VersionedTransaction, keypair: &Keypair) -> Result<SignedTransaction, SubmissionError> {
    let pubkey = keypair.pubkey();
    let required = tx.message.header().num_required_signatures as usize;
    let index = tx
        .message
        .static_account_keys()
        .iter()
        .take(required)
        .position(|key| *key == pubkey)
        .ok_or_else(|| SubmissionError::SignerNotRequired(pubkey.to_string()))?;

    if tx.signatures.len() < required {
        tx.signatures.resize(required, Signature::default());
    }

    let signature = keypair.sign_message(&tx.message.serialize());
    tx.signatures[index] = signature;

    let bytes = bincode::serialize(&tx).map_err(|e| SubmissionError::Serialize(e.to_string()))?;
    Ok(SignedTransaction {
        transaction_base64: BASE64.encode(bytes),
        signature,
        transaction_type: TransactionType::Versioned,
    })
}

fn sign_legacy(mut tx: Transaction, keypair: &Keypair) -> Result<SignedTransaction, SubmissionError> {
    let pubkey = keypair.pubkey();
    let index = tx
        .get_signing_keypair_positions(&[pubkey])
        .map_err(|e| SubmissionError::Signing(e.to_string()))?
        .first()
        .copied()
        .flatten()
        .ok_or_else(|| SubmissionError::SignerNotRequired(pubkey.to_string()))?;

    let blockhash = tx.message.recent_blockhash;
    tx.try_partial_sign(&[keypair], blockhash)
        .map_err(|e| SubmissionError::Signing(e.to_string()))?;

    let signature = tx.signatures[index];
    let bytes = bincode::serialize(&tx).map_err(|e| SubmissionError::Serialize(e.to_string()))?;
    Ok(SignedTransaction {
        transaction_base64: BASE64.encode(bytes),
        signature,
        transaction_type: TransactionType::Legacy,
    })
}

/// Sign `transaction_base64` and broadcast it. Returns as soon as the node
/// accepts the transaction; confirmation is not awaited.
pub async fn sign_and_submit(
    rpc: &SolanaClient,
    transaction_base64: &str,
    keypair: &Keypair,
) -> Result<Submission, SubmissionError> {
    let signed = sign_transaction(transaction_base64, keypair)?;
    let signature = rpc.send_transaction(&signed.transaction_base64).await?;

    tracing::info!(
        signature = %signature,
        transaction_type = %signed.transaction_type,
        "Transaction submitted"
    );

    Ok(Submission {
        signature,
        transaction_type: signed.transaction_type,
    })
}
