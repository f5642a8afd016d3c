use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    deckgen_cli::run_cli().await
}
