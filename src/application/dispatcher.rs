//! Operation Dispatcher
//!
//! Runs one [`OperationRequest`] against the node and the enabled swap
//! providers. Per item: signing key check → endpoint and wallet resolution →
//! queries / quote → optional build and sign → typed output.

use std::sync::Arc;

use chrono::Utc;
use futures::future::join_all;

use super::error::OperationError;
use super::output::*;
use super::request::*;
use crate::adapters::solana::{
    sign_and_submit, RetryPolicy, SolanaClient, TokenAmount, TransactionBuilder, WalletManager,
};
use crate::config::Credentials;
use crate::domain::tokens::TokenType;
use crate::domain::units::{
    assumed_decimals, is_native_mint, is_valid_address, lamports_to_sol, raw_str_to_display, to_smallest_unit,
    DecimalsPolicy, NATIVE_DECIMALS,
};
use crate::ports::execution::SwapPort;
use crate::ports::market_data::PricePort;
use crate::ports::models::{DexProvider, Quote, QuoteRequest};
use crate::ports::transport::TransportPort;

pub const DEFAULT_MAX_SWAP_AMOUNT: f64 = 1_000_000.0;
pub const DEFAULT_MAX_SEND_AMOUNT: f64 = 1_000_000.0;
pub const MAX_SLIPPAGE_BPS: u16 = 10_000;
pub const MAX_HISTORY_LIMIT: usize = 1_000;

pub struct OperationDispatcher {
    transport: Arc<dyn TransportPort>,
    price_feed: Arc<dyn PricePort>,
    providers: Vec<Arc<dyn SwapPort>>,
    retry: RetryPolicy,
    decimals_policy: DecimalsPolicy,
    max_swap_amount: f64,
    max_send_amount: f64,
}

/// Per-item state once credentials are resolved
struct ItemContext<'a> {
    rpc: SolanaClient,
    credentials: &'a Credentials,
    wallet: Option<WalletManager>,
}

impl ItemContext<'_> {
    /// Explicit parameter, else the configured public key, else the signing key's address
    fn wallet_address(&self, param: Option<&str>) -> Result<String, OperationError> {
        let address = param
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .map(str::to_string)
            .or_else(|| self.credentials.wallet_address().map(str::to_string))
            .or_else(|| self.wallet.as_ref().map(WalletManager::public_key))
            .ok_or_else(|| OperationError::missing_credential("Public key is required"))?;

        require_address(&address, "wallet")?;
        Ok(address)
    }

    fn signer(&self) -> Result<&WalletManager, OperationError> {
        self.wallet
            .as_ref()
            .ok_or_else(|| OperationError::missing_credential("Private key is required"))
    }
}

impl OperationDispatcher {
    pub fn new(transport: Arc<dyn TransportPort>, price_feed: Arc<dyn PricePort>) -> Self {
        Self {
            transport,
            price_feed,
            providers: Vec::new(),
            retry: RetryPolicy::default(),
            decimals_policy: DecimalsPolicy::default(),
            max_swap_amount: DEFAULT_MAX_SWAP_AMOUNT,
            max_send_amount: DEFAULT_MAX_SEND_AMOUNT,
        }
    }

    /// Enable a swap provider; a later provider with the same tag replaces the earlier one
    pub fn with_provider(mut self, provider: Arc<dyn SwapPort>) -> Self {
        self.providers.retain(|p| p.provider() != provider.provider());
        self.providers.push(provider);
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_decimals_policy(mut self, policy: DecimalsPolicy) -> Self {
        self.decimals_policy = policy;
        self
    }

    pub fn with_max_swap_amount(mut self, max: f64) -> Self {
        self.max_swap_amount = max;
        self
    }

    pub fn with_max_send_amount(mut self, max: f64) -> Self {
        self.max_send_amount = max;
        self
    }

    pub fn providers(&self) -> Vec<DexProvider> {
        self.providers.iter().map(|p| p.provider()).collect()
    }

    /// Execute one operation with one item's credentials
    pub async fn execute(
        &self,
        request: &OperationRequest,
        credentials: &Credentials,
    ) -> Result<OperationOutput, OperationError> {
        let wallet = if request.requires_private_key() {
            let secret = credentials.signing_key().ok_or_else(|| {
                OperationError::missing_credential(format!("Private key is required for {}", request.name()))
            })?;
            Some(WalletManager::from_secret(secret)?)
        } else {
            None
        };

        let endpoint = credentials
            .rpc_url()
            .ok_or_else(|| OperationError::missing_credential("Custom RPC URL is required when rpc_type is custom"))?;

        let ctx = ItemContext {
            rpc: SolanaClient::new(self.transport.clone(), endpoint).with_retry(self.retry),
            credentials,
            wallet,
        };

        tracing::debug!(operation = request.name(), "Dispatching operation");

        match request {
            OperationRequest::GetBalance(p) => self.get_balance(&ctx, p).await,
            OperationRequest::GetTokenBalance(p) => self.get_token_balance(&ctx, p).await,
            OperationRequest::GetTokenPrice(p) => self.get_token_price(p).await,
            OperationRequest::GetTransactionHistory(p) => self.get_transaction_history(&ctx, p).await,
            OperationRequest::GetAccountInfo(p) => self.get_account_info(&ctx, p).await,
            OperationRequest::GetSwapQuote(p) => self.get_swap_quote(&ctx, p).await,
            OperationRequest::ExecuteSwap(p) => self.execute_swap(&ctx, p).await,
            OperationRequest::ExecuteSwapAdvanced(p) => self.execute_swap_advanced(&ctx, p).await,
            OperationRequest::SendToken(p) => self.send_token(&ctx, p).await,
        }
    }

    async fn get_balance(&self, ctx: &ItemContext<'_>, p: &WalletParams) -> Result<OperationOutput, OperationError> {
        let wallet_address = ctx.wallet_address(p.wallet_address.as_deref())?;
        let lamports = ctx.rpc.get_balance(&wallet_address).await?;

        Ok(OperationOutput::GetBalance(BalanceOutput {
            wallet_address,
            balance: lamports_to_sol(lamports),
            balance_lamports: lamports,
        }))
    }

    async fn get_token_balance(
        &self,
        ctx: &ItemContext<'_>,
        p: &TokenBalanceParams,
    ) -> Result<OperationOutput, OperationError> {
        let wallet_address = ctx.wallet_address(p.wallet_address.as_deref())?;
        require_address(&p.token_mint, "token mint")?;

        let accounts = ctx.rpc.get_token_accounts_by_owner(&wallet_address, &p.token_mint).await?;
        let output = match accounts.first().and_then(TokenAmount::from_keyed_account) {
            Some(amount) => TokenBalanceOutput {
                wallet_address,
                token_mint: p.token_mint.clone(),
                balance: raw_str_to_display(&amount.amount, amount.decimals),
                balance_raw: amount.amount,
                decimals: Some(amount.decimals),
                note: None,
            },
            None => TokenBalanceOutput {
                wallet_address,
                token_mint: p.token_mint.clone(),
                balance: 0.0,
                balance_raw: "0".to_string(),
                decimals: None,
                note: Some("Token account not found".to_string()),
            },
        };

        Ok(OperationOutput::GetTokenBalance(output))
    }

    async fn get_token_price(&self, p: &TokenPriceParams) -> Result<OperationOutput, OperationError> {
        let symbol = p.token_symbol.trim();
        if symbol.is_empty() {
            return Err(OperationError::validation("Token symbol is required"));
        }

        let price = self.price_feed.usd_price(symbol).await?;

        Ok(OperationOutput::GetTokenPrice(TokenPriceOutput {
            symbol: symbol.to_string(),
            price: price.unwrap_or(0.0),
            found: price.is_some(),
            currency: "USD".to_string(),
            timestamp: Utc::now(),
        }))
    }

    async fn get_transaction_history(
        &self,
        ctx: &ItemContext<'_>,
        p: &HistoryParams,
    ) -> Result<OperationOutput, OperationError> {
        let wallet_address = ctx.wallet_address(p.wallet_address.as_deref())?;
        if p.limit == 0 || p.limit > MAX_HISTORY_LIMIT {
            return Err(OperationError::validation(format!(
                "Limit must be between 1 and {}, got {}",
                MAX_HISTORY_LIMIT, p.limit
            )));
        }

        let signatures = ctx.rpc.get_signatures_for_address(&wallet_address, p.limit).await?;
        let summaries = join_all(
            signatures
                .iter()
                .map(|info| ctx.rpc.get_transaction_summary(&info.signature)),
        )
        .await;

        let transactions: Vec<HistoryEntry> = signatures
            .into_iter()
            .zip(summaries)
            .filter_map(|(info, summary)| match summary {
                Ok(summary) => Some(HistoryEntry {
                    fee: summary.and_then(|s| s.fee),
                    success: summary.map(|s| s.success).unwrap_or(info.err.is_none()),
                    signature: info.signature,
                    slot: info.slot,
                    block_time: info.block_time,
                    confirmation_status: info.confirmation_status,
                }),
                Err(e) => {
                    tracing::warn!(signature = %info.signature, "Dropping history entry: {}", e);
                    None
                }
            })
            .collect();

        Ok(OperationOutput::GetTransactionHistory(HistoryOutput {
            wallet_address,
            count: transactions.len(),
            transactions,
        }))
    }

    async fn get_account_info(&self, ctx: &ItemContext<'_>, p: &WalletParams) -> Result<OperationOutput, OperationError> {
        let wallet_address = ctx.wallet_address(p.wallet_address.as_deref())?;
        let account_info = ctx.rpc.get_account_info(&wallet_address).await?;

        Ok(OperationOutput::GetAccountInfo(AccountInfoOutput {
            wallet_address,
            exists: account_info.is_some(),
            account_info,
        }))
    }

    async fn get_swap_quote(&self, ctx: &ItemContext<'_>, p: &SwapParams) -> Result<OperationOutput, OperationError> {
        let (quote, summary) = self.quote(ctx, p).await?;

        Ok(OperationOutput::GetSwapQuote(SwapQuoteOutput {
            summary,
            route_plan: quote.route_plan,
            quote: quote.raw,
            timestamp: Utc::now(),
        }))
    }

    async fn execute_swap(&self, ctx: &ItemContext<'_>, p: &SwapParams) -> Result<OperationOutput, OperationError> {
        let payer = ctx.wallet_address(None)?;
        let (quote, summary) = self.quote(ctx, p).await?;
        let build = self
            .provider(p.dex_provider)?
            .get_swap_transaction(&quote, &payer, p.priority_fee)
            .await?;

        Ok(OperationOutput::ExecuteSwap(SwapTransactionOutput {
            summary,
            swap_transaction: build.transaction_base64,
            last_valid_block_height: build.last_valid_block_height,
            priority_fee: p.priority_fee,
            status: OperationStatus::TransactionReady,
            timestamp: Utc::now(),
        }))
    }

    async fn execute_swap_advanced(
        &self,
        ctx: &ItemContext<'_>,
        p: &SwapParams,
    ) -> Result<OperationOutput, OperationError> {
        let signer = ctx.signer()?;
        let (quote, summary) = self.quote(ctx, p).await?;
        let build = self
            .provider(p.dex_provider)?
            .get_swap_transaction(&quote, &signer.public_key(), p.priority_fee)
            .await?;

        let submission = sign_and_submit(&ctx.rpc, &build.transaction_base64, signer.keypair()).await?;

        Ok(OperationOutput::ExecuteSwapAdvanced(SwapSubmittedOutput {
            summary,
            signature: submission.signature,
            transaction_type: submission.transaction_type,
            priority_fee: p.priority_fee,
            status: OperationStatus::Submitted,
            timestamp: Utc::now(),
        }))
    }

    async fn send_token(&self, ctx: &ItemContext<'_>, p: &SendTokenParams) -> Result<OperationOutput, OperationError> {
        let signer = ctx.signer()?;
        require_positive(p.send_amount)?;
        if p.send_amount > self.max_send_amount {
            return Err(OperationError::validation(format!(
                "Send amount too large (max: {})",
                self.max_send_amount
            )));
        }
        require_address(&p.recipient_address, "recipient")?;

        let token = p
            .token_type
            .resolve(p.custom_token_mint.as_deref().map(str::trim))
            .ok_or_else(|| OperationError::validation("customTokenMint is required for CUSTOM tokens"))?;
        require_address(&token.mint, "token mint")?;

        let from = signer.public_key();
        let builder = TransactionBuilder::new(&ctx.rpc);

        let (unsigned, amount_raw) = if p.token_type.is_native() {
            let lamports = nonzero(to_smallest_unit(p.send_amount, NATIVE_DECIMALS)?)?;
            let tx = builder
                .build_native_transfer(&from, &p.recipient_address, lamports, p.send_priority_fee)
                .await?;
            (tx, lamports)
        } else {
            let decimals = match (p.token_type, self.decimals_policy) {
                (TokenType::Custom, DecimalsPolicy::OnChain) => ctx.rpc.get_token_decimals(&token.mint).await?,
                _ => token.decimals,
            };
            let raw = nonzero(to_smallest_unit(p.send_amount, decimals)?)?;
            let tx = builder
                .build_token_transfer(
                    &from,
                    &p.recipient_address,
                    &token.mint,
                    p.send_amount,
                    decimals,
                    p.send_priority_fee,
                )
                .await?;
            (tx, raw)
        };

        let submission = sign_and_submit(&ctx.rpc, &unsigned.to_base64()?, signer.keypair()).await?;

        Ok(OperationOutput::SendToken(SendTokenOutput {
            signature: submission.signature,
            from,
            to: p.recipient_address.clone(),
            token_type: p.token_type,
            token_mint: (!p.token_type.is_native()).then_some(token.mint),
            amount: p.send_amount,
            amount_raw: amount_raw.to_string(),
            priority_fee: p.send_priority_fee,
            transaction_type: submission.transaction_type,
            status: OperationStatus::Submitted,
            timestamp: Utc::now(),
        }))
    }

    /// Validate, scale and quote a swap
    async fn quote(&self, ctx: &ItemContext<'_>, p: &SwapParams) -> Result<(Quote, SwapSummary), OperationError> {
        self.validate_swap(p)?;
        let provider = self.provider(p.dex_provider)?;

        let input_decimals = self.decimals_for(ctx, &p.input_mint).await?;
        let amount = nonzero(to_smallest_unit(p.swap_amount, input_decimals)?)?;

        let quote = provider
            .get_quote(&QuoteRequest::new(&p.input_mint, &p.output_mint, amount, p.slippage_bps))
            .await?;

        let output_decimals = self.decimals_for(ctx, &p.output_mint).await?;
        let summary = SwapSummary {
            dex: p.dex_provider,
            input_mint: p.input_mint.clone(),
            output_mint: p.output_mint.clone(),
            input_amount: p.swap_amount,
            input_amount_raw: amount.to_string(),
            output_amount: raw_str_to_display(&quote.out_amount, output_decimals),
            output_amount_raw: quote.out_amount.clone(),
            price_impact_pct: quote.price_impact_pct,
            slippage_bps: p.slippage_bps,
        };

        Ok((quote, summary))
    }

    fn validate_swap(&self, p: &SwapParams) -> Result<(), OperationError> {
        require_positive(p.swap_amount)?;
        if p.swap_amount > self.max_swap_amount {
            return Err(OperationError::validation(format!(
                "Swap amount too large (max: {})",
                self.max_swap_amount
            )));
        }
        if p.slippage_bps > MAX_SLIPPAGE_BPS {
            return Err(OperationError::validation(format!(
                "Slippage must be at most {} bps, got {}",
                MAX_SLIPPAGE_BPS, p.slippage_bps
            )));
        }
        require_address(&p.input_mint, "input mint")?;
        require_address(&p.output_mint, "output mint")?;
        Ok(())
    }

    fn provider(&self, provider: DexProvider) -> Result<&Arc<dyn SwapPort>, OperationError> {
        self.providers
            .iter()
            .find(|p| p.provider() == provider)
            .ok_or_else(|| OperationError::validation(format!("DEX provider '{}' is not enabled", provider)))
    }

    /// Native → 9. Other mints → 6 under the fixed assumption, or the mint's
    /// own decimals under the on-chain policy.
    async fn decimals_for(&self, ctx: &ItemContext<'_>, mint: &str) -> Result<u8, OperationError> {
        if is_native_mint(mint) || self.decimals_policy == DecimalsPolicy::FixedAssumption {
            return Ok(assumed_decimals(mint));
        }
        Ok(ctx.rpc.get_token_decimals(mint).await?)
    }
}

fn require_positive(amount: f64) -> Result<(), OperationError> {
    if !amount.is_finite() {
        return Err(OperationError::validation("Amount must be a finite number"));
    }
    if amount <= 0.0 {
        return Err(OperationError::validation("Amount must be greater than 0"));
    }
    Ok(())
}

fn nonzero(raw: u64) -> Result<u64, OperationError> {
    if raw == 0 {
        return Err(OperationError::validation("Amount is smaller than one indivisible unit"));
    }
    Ok(raw)
}

fn require_address(address: &str, role: &str) -> Result<(), OperationError> {
    if is_valid_address(address) {
        Ok(())
    } else {
        Err(OperationError::validation(format!("Invalid {} address: {}", role, address)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::solana::TransactionType;
    use crate::config::credentials::Network;
    use crate::domain::known_programs::{COMPUTE_BUDGET_PROGRAM_ID, SYSTEM_PROGRAM_ID, TOKEN_PROGRAM_ID};
    use crate::domain::tokens::USDC_MINT;
    use crate::domain::units::NATIVE_MINT;
    use crate::ports::execution::{MockSwapPort, SwapError};
    use crate::ports::market_data::PriceError;
    use crate::ports::mocks::{MockPriceFeed, ScriptedTransport};
    use crate::ports::models::SwapBuild;
    use approx::assert_relative_eq;
    use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
    use serde_json::json;
    use solana_sdk::hash::Hash;
    use solana_sdk::signature::{Keypair, Signer};
    use solana_sdk::transaction::Transaction;

    const WALLET: &str = "9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM";
    const RECIPIENT: &str = "7xKXtg2CW87d97TXJSDpbD5jBkheTqA83TZRuJosgAsU";

    fn dispatcher(transport: &ScriptedTransport) -> OperationDispatcher {
        OperationDispatcher::new(Arc::new(transport.clone()), Arc::new(MockPriceFeed::new().with_price("SOL", 150.0)))
    }

    fn public_creds() -> Credentials {
        Credentials::new(Network::Devnet).with_public_key(WALLET)
    }

    fn signing_creds(keypair: &Keypair) -> Credentials {
        Credentials::new(Network::Devnet).with_private_key(keypair.to_base58_string())
    }

    fn blockhash_result() -> serde_json::Value {
        json!({ "value": { "blockhash": Hash::new_unique().to_string(), "lastValidBlockHeight": 10 } })
    }

    fn quote(provider: DexProvider, req: &QuoteRequest) -> Quote {
        Quote {
            provider,
            input_mint: req.input_mint.clone(),
            output_mint: req.output_mint.clone(),
            in_amount: req.amount,
            out_amount: "150000000".into(),
            price_impact_pct: 0.1,
            route_plan: json!([{ "label": "Orca" }]),
            slippage_bps: req.slippage_bps,
            raw: json!({ "outAmount": "150000000" }),
        }
    }

    fn mock_provider(provider: DexProvider) -> MockSwapPort {
        let mut mock = MockSwapPort::new();
        mock.expect_provider().return_const(provider);
        mock
    }

    #[tokio::test]
    async fn test_get_balance() {
        let transport = ScriptedTransport::new().with_result("getBalance", json!({ "value": 2_500_000_000u64 }));
        let output = dispatcher(&transport)
            .execute(&OperationRequest::GetBalance(WalletParams::default()), &public_creds())
            .await
            .unwrap();

        assert_eq!(
            output,
            OperationOutput::GetBalance(BalanceOutput {
                wallet_address: WALLET.into(),
                balance: 2.5,
                balance_lamports: 2_500_000_000,
            })
        );
    }

    #[tokio::test]
    async fn test_missing_public_key() {
        let transport = ScriptedTransport::new();
        let err = dispatcher(&transport)
            .execute(&OperationRequest::GetBalance(WalletParams::default()), &Credentials::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "MissingCredentialError");
        assert!(transport.calls().is_empty());
    }

    #[tokio::test]
    async fn test_custom_rpc_without_url() {
        let mut creds = public_creds();
        creds.rpc_type = crate::config::credentials::RpcType::Custom;
        let err = dispatcher(&ScriptedTransport::new())
            .execute(&OperationRequest::GetBalance(WalletParams::default()), &creds)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "MissingCredentialError");
    }

    #[tokio::test]
    async fn test_token_balance_missing_account() {
        let transport = ScriptedTransport::new().with_result("getTokenAccountsByOwner", json!({ "value": [] }));
        let output = dispatcher(&transport)
            .execute(
                &OperationRequest::GetTokenBalance(TokenBalanceParams {
                    wallet_address: None,
                    token_mint: USDC_MINT.into(),
                }),
                &public_creds(),
            )
            .await
            .unwrap();

        let OperationOutput::GetTokenBalance(balance) = output else {
            panic!("expected token balance");
        };
        assert_eq!(balance.balance, 0.0);
        assert_eq!(balance.balance_raw, "0");
        assert_eq!(balance.note.as_deref(), Some("Token account not found"));
    }

    #[tokio::test]
    async fn test_token_balance_found() {
        let transport = ScriptedTransport::new().with_result(
            "getTokenAccountsByOwner",
            json!({ "value": [{ "pubkey": "ata", "account": { "data": { "parsed": { "info": {
                "tokenAmount": { "amount": "12345678", "decimals": 6, "uiAmountString": "12.345678" }
            }}}}}]}),
        );
        let output = dispatcher(&transport)
            .execute(
                &OperationRequest::GetTokenBalance(TokenBalanceParams {
                    wallet_address: Some(RECIPIENT.into()),
                    token_mint: USDC_MINT.into(),
                }),
                &public_creds(),
            )
            .await
            .unwrap();

        let OperationOutput::GetTokenBalance(balance) = output else {
            panic!("expected token balance");
        };
        assert_eq!(balance.wallet_address, RECIPIENT);
        assert_relative_eq!(balance.balance, 12.345678);
        assert_eq!(balance.balance_raw, "12345678");
        assert_eq!(balance.decimals, Some(6));
    }

    #[tokio::test]
    async fn test_token_price_unknown_symbol() {
        let output = dispatcher(&ScriptedTransport::new())
            .execute(
                &OperationRequest::GetTokenPrice(TokenPriceParams { token_symbol: "NOPE".into() }),
                &Credentials::default(),
            )
            .await
            .unwrap();

        let OperationOutput::GetTokenPrice(price) = output else {
            panic!("expected price");
        };
        assert_eq!(price.price, 0.0);
        assert!(!price.found);
        assert_eq!(price.currency, "USD");
    }

    #[tokio::test]
    async fn test_token_price_feed_failure() {
        let feed = MockPriceFeed::failing();
        let dispatcher = OperationDispatcher::new(Arc::new(ScriptedTransport::new()), Arc::new(feed.clone()));

        let err = dispatcher
            .execute(
                &OperationRequest::GetTokenPrice(TokenPriceParams { token_symbol: "SOL".into() }),
                &Credentials::default(),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, OperationError::Price(PriceError::Http(_))));
        assert_eq!(err.kind(), "TransportError");
        assert_eq!(feed.get_calls(), vec!["SOL".to_string()]);
    }

    #[tokio::test]
    async fn test_token_price_empty_symbol_rejected() {
        let feed = MockPriceFeed::new();
        let dispatcher = OperationDispatcher::new(Arc::new(ScriptedTransport::new()), Arc::new(feed.clone()));

        let err = dispatcher
            .execute(
                &OperationRequest::GetTokenPrice(TokenPriceParams { token_symbol: "  ".into() }),
                &Credentials::default(),
            )
            .await
            .unwrap_err();

        assert_eq!(err.kind(), "ValidationError");
        assert!(feed.get_calls().is_empty());
    }

    #[tokio::test]
    async fn test_history_drops_failed_lookups() {
        let transport = ScriptedTransport::new()
            .with_result(
                "getSignaturesForAddress",
                json!([
                    { "signature": "sigA", "slot": 10, "blockTime": 1700000000, "confirmationStatus": "finalized", "err": null },
                    { "signature": "sigB", "slot": 9, "blockTime": null, "confirmationStatus": "confirmed", "err": null }
                ]),
            )
            .with_result("getTransaction", json!({ "meta": { "fee": 5000, "err": null } }))
            .with_rpc_error("getTransaction", -32009, "Transaction version (1) is not supported");

        let output = dispatcher(&transport)
            .execute(
                &OperationRequest::GetTransactionHistory(HistoryParams { wallet_address: None, limit: 2 }),
                &public_creds(),
            )
            .await
            .unwrap();

        let OperationOutput::GetTransactionHistory(history) = output else {
            panic!("expected history");
        };
        assert_eq!(history.count, 1);
        assert_eq!(history.transactions[0].fee, Some(5000));
        assert!(history.transactions[0].success);
        assert_eq!(transport.call_count("getTransaction"), 2);
    }

    #[tokio::test]
    async fn test_history_limit_validated() {
        let err = dispatcher(&ScriptedTransport::new())
            .execute(
                &OperationRequest::GetTransactionHistory(HistoryParams { wallet_address: None, limit: 0 }),
                &public_creds(),
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "ValidationError");
    }

    #[tokio::test]
    async fn test_account_info_absent() {
        let transport = ScriptedTransport::new().with_result("getAccountInfo", json!({ "value": null }));
        let output = dispatcher(&transport)
            .execute(&OperationRequest::GetAccountInfo(WalletParams::default()), &public_creds())
            .await
            .unwrap();
        assert_eq!(
            output,
            OperationOutput::GetAccountInfo(AccountInfoOutput {
                wallet_address: WALLET.into(),
                account_info: None,
                exists: false,
            })
        );
    }

    #[tokio::test]
    async fn test_swap_quote_scales_with_fixed_assumption() {
        let mut jupiter = mock_provider(DexProvider::Jupiter);
        jupiter
            .expect_get_quote()
            .withf(|req| req.amount == 500_000_000 && req.slippage_bps == 100)
            .times(1)
            .returning(|req| Ok(quote(DexProvider::Jupiter, req)));

        let transport = ScriptedTransport::new();
        let dispatcher = dispatcher(&transport).with_provider(Arc::new(jupiter));

        let mut params = SwapParams::new(NATIVE_MINT, USDC_MINT, 0.5);
        params.slippage_bps = 100;
        let output = dispatcher
            .execute(&OperationRequest::GetSwapQuote(params), &public_creds())
            .await
            .unwrap();

        let OperationOutput::GetSwapQuote(q) = output else {
            panic!("expected quote");
        };
        assert_eq!(q.summary.input_amount_raw, "500000000");
        assert_relative_eq!(q.summary.output_amount, 150.0);
        assert_eq!(q.summary.output_amount_raw, "150000000");
        assert_eq!(q.route_plan, json!([{ "label": "Orca" }]));
        assert!(transport.calls().is_empty());
    }

    #[tokio::test]
    async fn test_on_chain_decimals_policy() {
        let bonk = "DezXAZ8z7PnrnRJjz3wXBoRgixCa6xjnB7YaB1pPB263";
        let mut jupiter = mock_provider(DexProvider::Jupiter);
        jupiter
            .expect_get_quote()
            .withf(|req| req.amount == 100_000)
            .returning(|req| Ok(quote(DexProvider::Jupiter, req)));

        let transport = ScriptedTransport::new().with_result("getTokenSupply", json!({ "value": { "decimals": 5 } }));
        let output = dispatcher(&transport)
            .with_provider(Arc::new(jupiter))
            .with_decimals_policy(DecimalsPolicy::OnChain)
            .execute(&OperationRequest::GetSwapQuote(SwapParams::new(bonk, NATIVE_MINT, 1.0)), &public_creds())
            .await
            .unwrap();

        let OperationOutput::GetSwapQuote(q) = output else {
            panic!("expected quote");
        };
        assert_eq!(q.summary.input_amount_raw, "100000");
        assert_relative_eq!(q.summary.output_amount, 0.15);
        assert_eq!(transport.call_count("getTokenSupply"), 1);
    }

    #[tokio::test]
    async fn test_swap_validation() {
        let dispatcher = dispatcher(&ScriptedTransport::new()).with_provider(Arc::new(mock_provider(DexProvider::Jupiter)));

        for params in [
            SwapParams::new(NATIVE_MINT, USDC_MINT, 0.0),
            SwapParams::new(NATIVE_MINT, USDC_MINT, -1.0),
            SwapParams::new(NATIVE_MINT, USDC_MINT, f64::NAN),
            SwapParams::new(NATIVE_MINT, USDC_MINT, 2_000_000.0),
            SwapParams::new("bad", USDC_MINT, 1.0),
            SwapParams { slippage_bps: 10_001, ..SwapParams::new(NATIVE_MINT, USDC_MINT, 1.0) },
        ] {
            let err = dispatcher
                .execute(&OperationRequest::GetSwapQuote(params), &public_creds())
                .await
                .unwrap_err();
            assert_eq!(err.kind(), "ValidationError", "{err}");
        }
    }

    #[tokio::test]
    async fn test_disabled_provider() {
        let dispatcher = dispatcher(&ScriptedTransport::new()).with_provider(Arc::new(mock_provider(DexProvider::Jupiter)));
        let err = dispatcher
            .execute(
                &OperationRequest::GetSwapQuote(
                    SwapParams::new(NATIVE_MINT, USDC_MINT, 1.0).with_provider(DexProvider::Raydium),
                ),
                &public_creds(),
            )
            .await
            .unwrap_err();
        assert!(err.to_string().contains("raydium"));
    }

    #[tokio::test]
    async fn test_quote_error_kind() {
        let mut raydium = mock_provider(DexProvider::Raydium);
        raydium
            .expect_get_quote()
            .returning(|req| Err(SwapError::quote(DexProvider::Raydium, req, "ROUTE_NOT_FOUND")));

        let err = dispatcher(&ScriptedTransport::new())
            .with_provider(Arc::new(raydium))
            .execute(
                &OperationRequest::GetSwapQuote(
                    SwapParams::new(NATIVE_MINT, USDC_MINT, 1.0).with_provider(DexProvider::Raydium),
                ),
                &public_creds(),
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "QuoteError");
    }

    #[tokio::test]
    async fn test_execute_swap_returns_unsigned_transaction() {
        let mut jupiter = mock_provider(DexProvider::Jupiter);
        jupiter.expect_get_quote().returning(|req| Ok(quote(DexProvider::Jupiter, req)));
        jupiter
            .expect_get_swap_transaction()
            .withf(|_, payer, fee| payer == WALLET && *fee == 7_000)
            .returning(|_, _, _| {
                Ok(SwapBuild {
                    provider: DexProvider::Jupiter,
                    transaction_base64: "AQID".into(),
                    last_valid_block_height: Some(99),
                    prioritization_fee_lamports: None,
                })
            });

        let mut params = SwapParams::new(NATIVE_MINT, USDC_MINT, 1.0);
        params.priority_fee = 7_000;
        let output = dispatcher(&ScriptedTransport::new())
            .with_provider(Arc::new(jupiter))
            .execute(&OperationRequest::ExecuteSwap(params), &public_creds())
            .await
            .unwrap();

        let OperationOutput::ExecuteSwap(swap) = output else {
            panic!("expected swap transaction");
        };
        assert_eq!(swap.swap_transaction, "AQID");
        assert_eq!(swap.status, OperationStatus::TransactionReady);
        assert_eq!(swap.last_valid_block_height, Some(99));
    }

    #[tokio::test]
    async fn test_execute_swap_advanced_signs_legacy_payload() {
        let keypair = Keypair::new();
        let payer = keypair.pubkey();
        let unsigned = {
            let ix = crate::domain::instructions::system_transfer(&payer, &solana_sdk::pubkey::Pubkey::new_unique(), 1);
            let message = solana_sdk::message::Message::new_with_blockhash(&[ix], Some(&payer), &Hash::new_unique());
            BASE64.encode(bincode::serialize(&Transaction::new_unsigned(message)).unwrap())
        };

        let mut jupiter = mock_provider(DexProvider::Jupiter);
        jupiter.expect_get_quote().returning(|req| Ok(quote(DexProvider::Jupiter, req)));
        let expected_payer = payer.to_string();
        jupiter
            .expect_get_swap_transaction()
            .withf(move |_, p, _| p == expected_payer)
            .returning(move |_, _, _| {
                Ok(SwapBuild {
                    provider: DexProvider::Jupiter,
                    transaction_base64: unsigned.clone(),
                    last_valid_block_height: None,
                    prioritization_fee_lamports: None,
                })
            });

        let transport = ScriptedTransport::new().with_result("sendTransaction", json!("swap-sig"));
        let output = dispatcher(&transport)
            .with_provider(Arc::new(jupiter))
            .execute(
                &OperationRequest::ExecuteSwapAdvanced(SwapParams::new(NATIVE_MINT, USDC_MINT, 1.0)),
                &signing_creds(&keypair),
            )
            .await
            .unwrap();

        let OperationOutput::ExecuteSwapAdvanced(swap) = output else {
            panic!("expected submitted swap");
        };
        assert_eq!(swap.signature, "swap-sig");
        assert_eq!(swap.transaction_type, TransactionType::Legacy);
        assert_eq!(swap.status, OperationStatus::Submitted);
    }

    #[tokio::test]
    async fn test_signing_operations_need_private_key_before_network() {
        let transport = ScriptedTransport::new();
        let dispatcher = dispatcher(&transport).with_provider(Arc::new(mock_provider(DexProvider::Jupiter)));

        let requests = [
            OperationRequest::ExecuteSwapAdvanced(SwapParams::new(NATIVE_MINT, USDC_MINT, 1.0)),
            OperationRequest::SendToken(SendTokenParams {
                recipient_address: RECIPIENT.into(),
                token_type: TokenType::Usdc,
                custom_token_mint: None,
                send_amount: 1.0,
                send_priority_fee: 0,
            }),
        ];
        for request in requests {
            let err = dispatcher.execute(&request, &public_creds()).await.unwrap_err();
            assert_eq!(err.kind(), "MissingCredentialError");
        }
        assert!(transport.calls().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_private_key() {
        let creds = public_creds().with_private_key("definitely-not-a-key");
        let err = dispatcher(&ScriptedTransport::new())
            .execute(
                &OperationRequest::SendToken(SendTokenParams {
                    recipient_address: RECIPIENT.into(),
                    token_type: TokenType::Sol,
                    custom_token_mint: None,
                    send_amount: 1.0,
                    send_priority_fee: 0,
                }),
                &creds,
            )
            .await
            .unwrap_err();

        assert_eq!(err.kind(), "InvalidKeyError");
        assert!(!err.to_string().contains("definitely-not-a-key"));
    }

    #[tokio::test]
    async fn test_send_sol_with_priority_fee() {
        let keypair = Keypair::new();
        let transport = ScriptedTransport::new()
            .with_result("getLatestBlockhash", blockhash_result())
            .with_result("sendTransaction", json!("send-sig"));

        let output = dispatcher(&transport)
            .execute(
                &OperationRequest::SendToken(SendTokenParams {
                    recipient_address: RECIPIENT.into(),
                    token_type: TokenType::Sol,
                    custom_token_mint: None,
                    send_amount: 0.25,
                    send_priority_fee: 10_000,
                }),
                &signing_creds(&keypair),
            )
            .await
            .unwrap();

        let OperationOutput::SendToken(sent) = output else {
            panic!("expected send result");
        };
        assert_eq!(sent.signature, "send-sig");
        assert_eq!(sent.from, keypair.pubkey().to_string());
        assert_eq!(sent.amount_raw, "250000000");
        assert_eq!(sent.transaction_type, TransactionType::Legacy);
        assert!(sent.token_mint.is_none());

        let wire = transport.calls().last().unwrap().1["params"][0].as_str().unwrap().to_string();
        let tx: Transaction = bincode::deserialize(&BASE64.decode(wire).unwrap()).unwrap();
        assert!(tx.verify().is_ok());
        let programs: Vec<_> = tx
            .message
            .instructions
            .iter()
            .map(|ix| tx.message.account_keys[ix.program_id_index as usize])
            .collect();
        assert_eq!(programs, vec![COMPUTE_BUDGET_PROGRAM_ID, SYSTEM_PROGRAM_ID]);
    }

    #[tokio::test]
    async fn test_send_above_ceiling_rejected_before_rpc() {
        let keypair = Keypair::new();
        let transport = ScriptedTransport::new();

        let err = dispatcher(&transport)
            .with_max_send_amount(100.0)
            .execute(
                &OperationRequest::SendToken(SendTokenParams {
                    recipient_address: RECIPIENT.into(),
                    token_type: TokenType::Sol,
                    custom_token_mint: None,
                    send_amount: 100.5,
                    send_priority_fee: 0,
                }),
                &signing_creds(&keypair),
            )
            .await
            .unwrap_err();

        assert_eq!(err.kind(), "ValidationError");
        assert!(err.to_string().contains("max: 100"));
        assert!(transport.calls().is_empty());
    }

    #[tokio::test]
    async fn test_send_usdc_to_existing_account() {
        let keypair = Keypair::new();
        let transport = ScriptedTransport::new()
            .with_result("getAccountInfo", json!({ "value": { "lamports": 2039280 } }))
            .with_result("getLatestBlockhash", blockhash_result())
            .with_result("sendTransaction", json!("usdc-sig"));

        let output = dispatcher(&transport)
            .execute(
                &OperationRequest::SendToken(SendTokenParams {
                    recipient_address: RECIPIENT.into(),
                    token_type: TokenType::Usdc,
                    custom_token_mint: None,
                    send_amount: 12.5,
                    send_priority_fee: 0,
                }),
                &signing_creds(&keypair),
            )
            .await
            .unwrap();

        let OperationOutput::SendToken(sent) = output else {
            panic!("expected send result");
        };
        assert_eq!(sent.amount_raw, "12500000");
        assert_eq!(sent.token_mint.as_deref(), Some(USDC_MINT));
        assert_eq!(
            transport.methods(),
            vec!["getAccountInfo", "getLatestBlockhash", "sendTransaction"]
        );

        let wire = transport.calls().last().unwrap().1["params"][0].as_str().unwrap().to_string();
        let tx: Transaction = bincode::deserialize(&BASE64.decode(wire).unwrap()).unwrap();
        assert_eq!(tx.message.instructions.len(), 1);
        let program = tx.message.account_keys[tx.message.instructions[0].program_id_index as usize];
        assert_eq!(program, TOKEN_PROGRAM_ID);
    }

    #[tokio::test]
    async fn test_custom_token_requires_mint() {
        let keypair = Keypair::new();
        let err = dispatcher(&ScriptedTransport::new())
            .execute(
                &OperationRequest::SendToken(SendTokenParams {
                    recipient_address: RECIPIENT.into(),
                    token_type: TokenType::Custom,
                    custom_token_mint: None,
                    send_amount: 1.0,
                    send_priority_fee: 0,
                }),
                &signing_creds(&keypair),
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "ValidationError");
    }
}
