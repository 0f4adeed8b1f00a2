//! CLI Command Handlers
//!
//! Every command loads the TOML config (defaults when no file is given),
//! resolves credentials, and prints the operation result as JSON.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use super::batch_file::JsonItemSource;
use crate::adapters::jupiter::{JupiterClient, JupiterConfig};
use crate::adapters::market_data::CoinGeckoClient;
use crate::adapters::raydium::{RaydiumClient, RaydiumConfig};
use crate::adapters::solana::rpc::redact_endpoint;
use crate::adapters::solana::{HttpTransport, RetryPolicy, SolanaClient};
use crate::application::request::{SendTokenParams, SwapParams, WalletParams};
use crate::application::{run_batch, OperationDispatcher, OperationRequest};
use crate::config::{load_config, Config};
use crate::domain::priority_fee_cache::PriorityFeeCache;
use crate::domain::tokens::TokenType;
use crate::ports::models::DexProvider;

/// solana-ops - Solana RPC queries, Jupiter/Raydium swaps and transfers
#[derive(Parser, Debug)]
#[command(
    name = "solana-ops",
    version = env!("CARGO_PKG_VERSION"),
    about = "Solana RPC queries, Jupiter/Raydium swaps and token transfers",
    long_about = "solana-ops runs balance, price, history, swap and transfer operations against \
                  a Solana node, one at a time or as a JSON batch."
)]
pub struct CliApp {
    /// The command to execute
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a JSON file of operations
    Batch(BatchCmd),

    /// Show the SOL balance of a wallet
    Balance(BalanceCmd),

    /// Get a swap quote
    Quote(QuoteCmd),

    /// Send SOL or an SPL token
    Send(SendCmd),

    /// Check that the configured node answers
    Health(HealthCmd),
}

/// Run a batch file
#[derive(Parser, Debug)]
pub struct BatchCmd {
    /// JSON array of operations, e.g. `[{"operation": "getBalance"}]`
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Record failed items and keep going instead of stopping
    #[arg(long)]
    pub continue_on_fail: bool,

    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct BalanceCmd {
    /// Wallet address (default: configured public key)
    #[arg(value_name = "ADDRESS")]
    pub address: Option<String>,

    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct QuoteCmd {
    /// Input mint or token symbol (e.g., SOL)
    #[arg(value_name = "INPUT")]
    pub input_token: String,

    /// Output mint or token symbol (e.g., USDC)
    #[arg(value_name = "OUTPUT")]
    pub output_token: String,

    /// Amount to swap, in input token units
    #[arg(value_name = "AMOUNT")]
    pub amount: f64,

    /// Slippage tolerance in basis points (default: 50 = 0.5%)
    #[arg(long, value_name = "BPS", default_value = "50")]
    pub slippage: u16,

    /// Aggregator to quote with (jupiter, raydium)
    #[arg(long, value_name = "DEX", default_value = "jupiter")]
    pub dex: DexProvider,

    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct SendCmd {
    /// Recipient wallet address
    #[arg(value_name = "RECIPIENT")]
    pub recipient: String,

    /// Amount to send, in token units
    #[arg(value_name = "AMOUNT")]
    pub amount: f64,

    /// SOL, USDC, USDT, CHECKHC or CUSTOM
    #[arg(long, value_name = "TOKEN", default_value = "SOL")]
    pub token: TokenType,

    /// Mint address for --token CUSTOM
    #[arg(long, value_name = "MINT")]
    pub mint: Option<String>,

    /// Compute-unit price in micro-lamports
    #[arg(long, value_name = "MICRO_LAMPORTS", default_value = "0")]
    pub priority_fee: u64,

    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct HealthCmd {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

impl Command {
    fn config_path(&self) -> Option<&Path> {
        match self {
            Command::Batch(cmd) => cmd.config.as_deref(),
            Command::Balance(cmd) => cmd.config.as_deref(),
            Command::Quote(cmd) => cmd.config.as_deref(),
            Command::Send(cmd) => cmd.config.as_deref(),
            Command::Health(cmd) => cmd.config.as_deref(),
        }
    }
}

/// Execute the CLI command
pub async fn execute(app: CliApp) -> Result<()> {
    let config = match app.command.config_path() {
        Some(path) => load_config(path).with_context(|| format!("Failed to load config {}", path.display()))?,
        None => Config::default(),
    };

    init_logging(app.verbose, app.debug, &config.logging.level)?;

    match app.command {
        Command::Batch(cmd) => batch_command(cmd, &config).await,
        Command::Balance(cmd) => {
            let request = OperationRequest::GetBalance(WalletParams {
                wallet_address: cmd.address,
            });
            single_command(request, &config).await
        }
        Command::Quote(cmd) => {
            let mut params = SwapParams::new(resolve_mint(&cmd.input_token), resolve_mint(&cmd.output_token), cmd.amount)
                .with_provider(cmd.dex);
            params.slippage_bps = cmd.slippage;
            single_command(OperationRequest::GetSwapQuote(params), &config).await
        }
        Command::Send(cmd) => {
            let request = OperationRequest::SendToken(SendTokenParams {
                recipient_address: cmd.recipient,
                token_type: cmd.token,
                custom_token_mint: cmd.mint,
                send_amount: cmd.amount,
                send_priority_fee: cmd.priority_fee,
            });
            single_command(request, &config).await
        }
        Command::Health(_) => health_command(&config).await,
    }
}

/// Flags win over `logging.level`; `RUST_LOG` wins over both
fn init_logging(verbose: bool, debug: bool, configured: &str) -> Result<()> {
    use tracing_subscriber::{fmt, EnvFilter};

    let level = if debug {
        "debug"
    } else if verbose {
        "info"
    } else {
        configured
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}

/// Build the dispatcher with the providers enabled in `config`
pub fn build_dispatcher(config: &Config) -> Result<OperationDispatcher> {
    let transport = HttpTransport::new(config.rpc.timeout()).context("Failed to create RPC transport")?;
    let prices = CoinGeckoClient::with_url(&config.price.api_url).context("Failed to create price client")?;

    let mut dispatcher = OperationDispatcher::new(Arc::new(transport), Arc::new(prices))
        .with_retry(RetryPolicy {
            max_attempts: config.rpc.max_attempts,
            backoff: config.rpc.backoff(),
        })
        .with_decimals_policy(config.dex.decimals_policy)
        .with_max_swap_amount(config.limits.max_swap_amount)
        .with_max_send_amount(config.limits.max_send_amount);

    for provider in &config.dex.enabled {
        dispatcher = match provider {
            DexProvider::Jupiter => {
                let client = JupiterClient::with_config(JupiterConfig {
                    api_base_url: config.dex.jupiter_api_url.clone(),
                    api_key: config.dex.get_jupiter_api_key(),
                    ..JupiterConfig::default()
                })
                .context("Failed to create Jupiter client")?;
                dispatcher.with_provider(Arc::new(client))
            }
            DexProvider::Raydium => {
                let cache = PriorityFeeCache::new(
                    Duration::from_secs(config.dex.priority_fee_ttl_secs),
                    config.dex.fallback_priority_fee,
                );
                let client = RaydiumClient::with_config(
                    RaydiumConfig {
                        api_base_url: config.dex.raydium_api_url.clone(),
                        ..RaydiumConfig::default()
                    },
                    cache,
                )
                .context("Failed to create Raydium client")?;
                dispatcher.with_provider(Arc::new(client))
            }
        };
    }

    tracing::debug!(providers = ?dispatcher.providers(), "Dispatcher ready");
    Ok(dispatcher)
}

/// Token symbols map to their mint; anything else is taken as a mint address
fn resolve_mint(token: &str) -> String {
    token
        .parse::<TokenType>()
        .ok()
        .and_then(|t| t.resolve(None))
        .map(|token| token.mint)
        .unwrap_or_else(|| token.trim().to_string())
}

async fn single_command(request: OperationRequest, config: &Config) -> Result<()> {
    let credentials = config.credentials().context("Failed to resolve credentials")?;
    let dispatcher = build_dispatcher(config)?;

    let output = dispatcher
        .execute(&request, &credentials)
        .await
        .with_context(|| format!("{} failed", request.name()))?;

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

async fn batch_command(cmd: BatchCmd, config: &Config) -> Result<()> {
    let credentials = config.credentials().context("Failed to resolve credentials")?;
    let source = JsonItemSource::from_file(&cmd.file, credentials, cmd.continue_on_fail)?;
    let dispatcher = build_dispatcher(config)?;

    let results = run_batch(&dispatcher, &source).await?;

    println!("{}", serde_json::to_string_pretty(&results)?);
    Ok(())
}

async fn health_command(config: &Config) -> Result<()> {
    let credentials = config.credentials().context("Failed to resolve credentials")?;
    let endpoint = credentials
        .rpc_url()
        .context("Custom RPC URL is required when rpc_type is custom")?;

    let transport = HttpTransport::new(config.rpc.timeout()).context("Failed to create RPC transport")?;
    let rpc = SolanaClient::new(Arc::new(transport), endpoint).with_retry(RetryPolicy {
        max_attempts: config.rpc.max_attempts,
        backoff: config.rpc.backoff(),
    });

    let health = rpc.get_health().await.context("Health check failed")?;
    println!("{}: {}", redact_endpoint(endpoint), health);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tokens::USDC_MINT;
    use crate::domain::units::NATIVE_MINT;

    #[test]
    fn test_parse_quote_command() {
        let app = CliApp::try_parse_from(["solana-ops", "quote", "SOL", "usdc", "0.5", "--dex", "raydium"]).unwrap();
        let Command::Quote(cmd) = app.command else {
            panic!("expected quote");
        };
        assert_eq!(cmd.dex, DexProvider::Raydium);
        assert_eq!(cmd.slippage, 50);
        assert_eq!(resolve_mint(&cmd.input_token), NATIVE_MINT);
        assert_eq!(resolve_mint(&cmd.output_token), USDC_MINT);
    }

    #[test]
    fn test_parse_send_command() {
        let app = CliApp::try_parse_from([
            "solana-ops",
            "send",
            "7xKXtg2CW87d97TXJSDpbD5jBkheTqA83TZRuJosgAsU",
            "1.5",
            "--token",
            "usdc",
            "--priority-fee",
            "5000",
            "-c",
            "ops.toml",
        ])
        .unwrap();
        let Command::Send(cmd) = app.command else {
            panic!("expected send");
        };
        assert_eq!(cmd.token, TokenType::Usdc);
        assert_eq!(cmd.priority_fee, 5000);
        assert_eq!(cmd.config, Some(PathBuf::from("ops.toml")));
    }

    #[test]
    fn test_parse_batch_command() {
        let app = CliApp::try_parse_from(["solana-ops", "--verbose", "batch", "items.json", "--continue-on-fail"]).unwrap();
        assert!(app.verbose);
        let Command::Batch(cmd) = app.command else {
            panic!("expected batch");
        };
        assert!(cmd.continue_on_fail);
        assert!(cmd.config.is_none());
    }

    #[test]
    fn test_unknown_dex_rejected() {
        assert!(CliApp::try_parse_from(["solana-ops", "quote", "SOL", "USDC", "1", "--dex", "orca"]).is_err());
    }

    #[test]
    fn test_resolve_mint_passthrough() {
        let bonk = "DezXAZ8z7PnrnRJjz3wXBoRgixCa6xjnB7YaB1pPB263";
        assert_eq!(resolve_mint(bonk), bonk);
        assert_eq!(resolve_mint("custom"), "custom");
    }

    #[test]
    fn test_build_dispatcher_from_defaults() {
        let mut config = Config::default();
        config.dex.enabled = vec![DexProvider::Raydium];
        let dispatcher = build_dispatcher(&config).unwrap();
        assert_eq!(dispatcher.providers(), vec![DexProvider::Raydium]);
    }
}
