use clap::Parser;
use labtrack_backend::{config::Cli, server};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let Cli { config, log_dir } = Cli::parse();

    server::serve(config, log_dir).await
}
