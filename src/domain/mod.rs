//! Domain Layer
//!
//! Pure types and logic with no I/O: amount scaling, token and program
//! constants, instruction encoding, and the priority-fee cache.

pub mod instructions;
pub mod known_programs;
pub mod priority_fee_cache;
pub mod tokens;
pub mod units;

pub use instructions::DerivationError;
pub use priority_fee_cache::PriorityFeeCache;
pub use tokens::{TokenSpec, TokenType};
pub use units::{AmountError, DecimalsPolicy};
