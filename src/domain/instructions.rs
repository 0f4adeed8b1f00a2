//! Instruction encoding and associated-token-account derivation
//!
//! Byte layouts:
//! - System transfer: `u32 LE 2 | u64 LE lamports` (12 bytes)
//! - Token transfer: `u8 3 | u64 LE amount` (9 bytes)
//! - Compute unit price: `u8 3 | u64 LE micro-lamports` (9 bytes)
//!
//! The token transfer and compute unit price share discriminator `3`; each is
//! scoped to its own program id.

use std::str::FromStr;

use solana_sdk::instruction::{AccountMeta, Instruction};
use solana_sdk::pubkey::Pubkey;
use thiserror::Error;

use super::known_programs::{
    ASSOCIATED_TOKEN_PROGRAM_ID, COMPUTE_BUDGET_PROGRAM_ID, SYSTEM_PROGRAM_ID, TOKEN_PROGRAM_ID,
};
use super::units::is_valid_address;

const SYSTEM_TRANSFER_TAG: u32 = 2;
const TOKEN_TRANSFER_TAG: u8 = 3;
const SET_COMPUTE_UNIT_PRICE_TAG: u8 = 3;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DerivationError {
    #[error("Failed to derive Associated Token Account: invalid {role} address format")]
    InvalidAddress { role: &'static str },
}

pub fn encode_system_transfer(lamports: u64) -> [u8; 12] {
    let mut data = [0u8; 12];
    data[..4].copy_from_slice(&SYSTEM_TRANSFER_TAG.to_le_bytes());
    data[4..].copy_from_slice(&lamports.to_le_bytes());
    data
}

pub fn encode_token_transfer(amount: u64) -> [u8; 9] {
    let mut data = [0u8; 9];
    data[0] = TOKEN_TRANSFER_TAG;
    data[1..].copy_from_slice(&amount.to_le_bytes());
    data
}

pub fn encode_set_compute_unit_price(micro_lamports: u64) -> [u8; 9] {
    let mut data = [0u8; 9];
    data[0] = SET_COMPUTE_UNIT_PRICE_TAG;
    data[1..].copy_from_slice(&micro_lamports.to_le_bytes());
    data
}

/// Native SOL transfer from `from` (signer) to `to`
pub fn system_transfer(from: &Pubkey, to: &Pubkey, lamports: u64) -> Instruction {
    Instruction {
        program_id: SYSTEM_PROGRAM_ID,
        accounts: vec![AccountMeta::new(*from, true), AccountMeta::new(*to, false)],
        data: encode_system_transfer(lamports).to_vec(),
    }
}

/// SPL token transfer between two token accounts, authorised by `owner`
pub fn token_transfer(source: &Pubkey, destination: &Pubkey, owner: &Pubkey, amount: u64) -> Instruction {
    Instruction {
        program_id: TOKEN_PROGRAM_ID,
        accounts: vec![
            AccountMeta::new(*source, false),
            AccountMeta::new(*destination, false),
            AccountMeta::new_readonly(*owner, true),
        ],
        data: encode_token_transfer(amount).to_vec(),
    }
}

pub fn set_compute_unit_price(micro_lamports: u64) -> Instruction {
    Instruction {
        program_id: COMPUTE_BUDGET_PROGRAM_ID,
        accounts: vec![],
        data: encode_set_compute_unit_price(micro_lamports).to_vec(),
    }
}

/// ATA program `Create` (empty data) paid for by `payer`
pub fn create_associated_token_account(
    payer: &Pubkey,
    associated_account: &Pubkey,
    owner: &Pubkey,
    mint: &Pubkey,
) -> Instruction {
    Instruction {
        program_id: ASSOCIATED_TOKEN_PROGRAM_ID,
        accounts: vec![
            AccountMeta::new(*payer, true),
            AccountMeta::new(*associated_account, false),
            AccountMeta::new_readonly(*owner, false),
            AccountMeta::new_readonly(*mint, false),
            AccountMeta::new_readonly(SYSTEM_PROGRAM_ID, false),
            AccountMeta::new_readonly(TOKEN_PROGRAM_ID, false),
        ],
        data: vec![],
    }
}

/// Parse an address after the shape check.
pub fn parse_address(address: &str, role: &'static str) -> Result<Pubkey, DerivationError> {
    if !is_valid_address(address) {
        return Err(DerivationError::InvalidAddress { role });
    }
    Pubkey::from_str(address).map_err(|_| DerivationError::InvalidAddress { role })
}

/// Derive the associated token account of `owner` for `mint` under the
/// classic token program.
pub fn derive_associated_token_account(owner: &str, mint: &str) -> Result<Pubkey, DerivationError> {
    let owner = parse_address(owner, "owner")?;
    let mint = parse_address(mint, "mint")?;
    Ok(associated_token_address(&owner, &mint))
}

pub fn associated_token_address(owner: &Pubkey, mint: &Pubkey) -> Pubkey {
    let (address, _bump) = Pubkey::find_program_address(
        &[owner.as_ref(), TOKEN_PROGRAM_ID.as_ref(), mint.as_ref()],
        &ASSOCIATED_TOKEN_PROGRAM_ID,
    );
    address
}
