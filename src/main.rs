use anyhow::Result;
use clap::Parser;

use agrimate::{cli::Cli, runtime::Orchestrator, utils::init_logger};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    init_logger(cli.verbose);

    let orchestrator = Orchestrator::new(cli)?;
    let answered = orchestrator.run().await?;

    // Exit with appropriate code
    if !answered {
        std::process::exit(1);
    }

    Ok(())
}
