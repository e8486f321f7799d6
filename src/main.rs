mod commands;

use clap::Parser;
use driftfield_utils::cli::CliArgs;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let opts = CliArgs::parse();
    commands::start_field(opts).await
}
