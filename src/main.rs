use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use plotrelay::config::{Cli, Command, RelaySettings};
use plotrelay::web::RelayServer;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.debug);

    match cli.command {
        Command::Serve { port } => {
            RelayServer::new(RelaySettings::with_port(port)).run().await?;
        }
    }
    Ok(())
}

fn setup_logging(debug: bool) {
    let filter = if debug {
        EnvFilter::new("plotrelay=debug")
    } else {
        EnvFilter::new("plotrelay=info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}
