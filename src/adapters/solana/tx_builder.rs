//! Unsigned transfer construction
//!
//! The recent blockhash is always the last node read: the destination ATA
//! probe happens first so the hash is as fresh as possible when the
//! transaction leaves the builder.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use solana_sdk::hash::Hash;
use solana_sdk::instruction::Instruction;
use solana_sdk::message::Message;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::transaction::Transaction;
use thiserror::Error;

use super::rpc::{RpcError, SolanaClient};
use crate::domain::instructions::{
    associated_token_address, create_associated_token_account, parse_address, set_compute_unit_price,
    system_transfer, token_transfer, DerivationError,
};
use crate::domain::units::{to_smallest_unit, AmountError};

#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Derivation(#[from] DerivationError),
    #[error(transparent)]
    Rpc(#[from] RpcError),
    #[error("Invalid transfer amount: {0}")]
    Amount(#[from] AmountError),
    #[error("Transaction has no instructions")]
    NoInstructions,
    #[error("Failed to serialize transaction: {0}")]
    Serialize(String),
}

/// Fee payer, blockhash and ordered instructions awaiting signatures
#[derive(Debug, Clone, PartialEq)]
pub struct UnsignedTransaction {
    pub fee_payer: Pubkey,
    pub recent_blockhash: Hash,
    pub instructions: Vec<Instruction>,
}

impl UnsignedTransaction {
    /// Legacy transaction with empty signature slots
    pub fn to_transaction(&self) -> Result<Transaction, BuildError> {
        if self.instructions.is_empty() {
            return Err(BuildError::NoInstructions);
        }
        let message = Message::new_with_blockhash(&self.instructions, Some(&self.fee_payer), &self.recent_blockhash);
        Ok(Transaction::new_unsigned(message))
    }

    /// Wire form, ready for the signer
    pub fn to_base64(&self) -> Result<String, BuildError> {
        let tx = self.to_transaction()?;
        let bytes = bincode::serialize(&tx).map_err(|e| BuildError::Serialize(e.to_string()))?;
        Ok(BASE64.encode(bytes))
    }
}

/// Builds native and SPL token transfers against a node
pub struct TransactionBuilder<'a> {
    rpc: &'a SolanaClient,
}

impl<'a> TransactionBuilder<'a> {
    pub fn new(rpc: &'a SolanaClient) -> Self {
        Self { rpc }
    }

    /// One System transfer, with a compute-unit price first when `priority_fee > 0`
    pub async fn build_native_transfer(
        &self,
        from: &str,
        to: &str,
        lamports: u64,
        priority_fee: u64,
    ) -> Result<UnsignedTransaction, BuildError> {
        let from = parse_address(from, "sender")?;
        let to = parse_address(to, "recipient")?;

        let mut instructions = priority_fee_instructions(priority_fee);
        instructions.push(system_transfer(&from, &to, lamports));

        self.finish(from, instructions).await
    }

    /// SPL token transfer between the parties' associated token accounts.
    /// `amount` is in display units and scaled by `10^decimals`.
    pub async fn build_token_transfer(
        &self,
        from: &str,
        to: &str,
        mint: &str,
        amount: f64,
        decimals: u8,
        priority_fee: u64,
    ) -> Result<UnsignedTransaction, BuildError> {
        let owner = parse_address(from, "sender")?;
        let recipient = parse_address(to, "recipient")?;
        let mint = parse_address(mint, "mint")?;
        let raw_amount = to_smallest_unit(amount, decimals)?;

        let source_ata = associated_token_address(&owner, &mint);
        let destination_ata = associated_token_address(&recipient, &mint);

        let mut instructions = priority_fee_instructions(priority_fee);

        if !self.rpc.account_exists(&destination_ata.to_string()).await? {
            tracing::debug!(ata = %destination_ata, "Destination token account missing, adding create instruction");
            instructions.push(create_associated_token_account(&owner, &destination_ata, &recipient, &mint));
        }

        instructions.push(token_transfer(&source_ata, &destination_ata, &owner, raw_amount));

        self.finish(owner, instructions).await
    }

    async fn finish(&self, fee_payer: Pubkey, instructions: Vec<Instruction>) -> Result<UnsignedTransaction, BuildError> {
        if instructions.is_empty() {
            return Err(BuildError::NoInstructions);
        }
        let latest = self.rpc.get_latest_blockhash().await?;
        Ok(UnsignedTransaction {
            fee_payer,
            recent_blockhash: latest.blockhash,
            instructions,
        })
    }
}

fn priority_fee_instructions(priority_fee: u64) -> Vec<Instruction> {
    if priority_fee > 0 {
        vec![set_compute_unit_price(priority_fee)]
    } else {
        Vec::new()
    }
}
