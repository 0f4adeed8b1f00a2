//! Well-known tokens accepted by the transfer operation

use serde::{Deserialize, Serialize};

use super::units::{DEFAULT_TOKEN_DECIMALS, NATIVE_DECIMALS, NATIVE_MINT};

pub const USDC_MINT: &str = "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v";
pub const USDT_MINT: &str = "Es9vMFrzaCERmJfrF4H2FYD4KCoNkY11McCe8BenwNYB";
pub const CHECKHC_MINT: &str = "5tpkrCVVh6tjjve4TuyP8MXBwURufgAnaboaLwo49uau";

/// Token selector for transfers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TokenType {
    Sol,
    Usdc,
    Usdt,
    Checkhc,
    /// Any SPL mint supplied by the caller
    Custom,
}

/// Mint and decimals for a resolved token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSpec {
    pub mint: String,
    pub decimals: u8,
}

impl TokenType {
    /// Resolve to a mint. `Custom` uses `custom_mint` with the default
    /// 6-decimal assumption and yields `None` when no mint was given.
    pub fn resolve(&self, custom_mint: Option<&str>) -> Option<TokenSpec> {
        let (mint, decimals) = match self {
            TokenType::Sol => (NATIVE_MINT, NATIVE_DECIMALS),
            TokenType::Usdc => (USDC_MINT, 6),
            TokenType::Usdt => (USDT_MINT, 6),
            TokenType::Checkhc => (CHECKHC_MINT, 6),
            TokenType::Custom => (custom_mint?, DEFAULT_TOKEN_DECIMALS),
        };
        Some(TokenSpec {
            mint: mint.to_string(),
            decimals,
        })
    }

    pub fn is_native(&self) -> bool {
        matches!(self, TokenType::Sol)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TokenType::Sol => "SOL",
            TokenType::Usdc => "USDC",
            TokenType::Usdt => "USDT",
            TokenType::Checkhc => "CHECKHC",
            TokenType::Custom => "CUSTOM",
        }
    }
}

impl std::fmt::Display for TokenType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TokenType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SOL" => Ok(TokenType::Sol),
            "USDC" => Ok(TokenType::Usdc),
            "USDT" => Ok(TokenType::Usdt),
            "CHECKHC" => Ok(TokenType::Checkhc),
            "CUSTOM" => Ok(TokenType::Custom),
            other => Err(format!("unknown token type '{}'", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_known_tokens() {
        let usdc = TokenType::Usdc.resolve(None).unwrap();
        assert_eq!(usdc.mint, USDC_MINT);
        assert_eq!(usdc.decimals, 6);

        let sol = TokenType::Sol.resolve(Some("ignored")).unwrap();
        assert_eq!(sol.mint, NATIVE_MINT);
        assert_eq!(sol.decimals, 9);
    }

    #[test]
    fn test_resolve_custom() {
        assert!(TokenType::Custom.resolve(None).is_none());
        let token = TokenType::Custom.resolve(Some(CHECKHC_MINT)).unwrap();
        assert_eq!(token.decimals, DEFAULT_TOKEN_DECIMALS);
    }

    #[test]
    fn test_serde_names() {
        let t: TokenType = serde_json::from_str(r#""USDC""#).unwrap();
        assert_eq!(t, TokenType::Usdc);
        assert_eq!(serde_json::to_string(&TokenType::Checkhc).unwrap(), r#""CHECKHC""#);
    }

    #[test]
    fn test_from_str() {
        assert_eq!("usdt".parse::<TokenType>().unwrap(), TokenType::Usdt);
        assert!("doge".parse::<TokenType>().is_err());
    }
}
