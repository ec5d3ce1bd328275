use tourdata::cli;
use tourdata::error::Result;

#[tokio::main]
async fn main() -> Result<()> {
    cli::Cli::run().await
}
