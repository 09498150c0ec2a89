//! Relay settings and the worker binary's command line.

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

/// Command line arguments for the relay worker binary
#[derive(Parser, Debug)]
#[command(author, version, about = "Browser relay for remotely rendered plots")]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Subcommand
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run the relay server until interrupted
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value_t = default_port())]
        port: u16,
    },
}

/// Relay settings shared by the client and server sides
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelaySettings {
    /// Port the relay server listens on
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 {
    8000
}

impl Default for RelaySettings {
    fn default() -> Self {
        Self {
            port: default_port(),
        }
    }
}

impl RelaySettings {
    /// Settings for a specific port.
    pub fn with_port(port: u16) -> Self {
        Self { port }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_port() {
        assert_eq!(RelaySettings::default().port, 8000);
    }

    #[test]
    fn test_serve_args() {
        let cli = Cli::parse_from(["plotrelay-server", "serve", "--port", "9000"]);
        let Command::Serve { port } = cli.command;
        assert_eq!(port, 9000);
        assert!(!cli.debug);
    }

    #[test]
    fn test_serve_defaults() {
        let cli = Cli::parse_from(["plotrelay-server", "serve"]);
        let Command::Serve { port } = cli.command;
        assert_eq!(port, 8000);
    }
}
