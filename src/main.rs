use anyhow::Result;

/// Main entry point
#[tokio::main]
async fn main() -> Result<()> {
    fabao::cli::run().await
}
