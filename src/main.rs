//! solana-ops - Solana RPC, swap and transfer operations from the command line

use anyhow::Result;

use solana_ops::adapters::cli;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (secrets go here, not in the config file)
    dotenvy::dotenv().ok();

    let app = cli::init();
    cli::execute(app).await
}
