//! CLI command definitions for the `bonechat` binary.
//!
//! Uses clap derive macros for argument parsing.

pub mod chat;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Chat with Gemini, with bounded per-session memory.
#[derive(Parser)]
#[command(name = "bonechat", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Config file to load instead of $BONECHAT_CONFIG or ~/.bonechat/config.toml.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Export tracing spans through OpenTelemetry (stdout exporter).
    #[arg(long, global = true)]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server.
    Serve {
        /// Port to listen on (default from config: 8000).
        #[arg(short, long, env = "BONECHAT_PORT")]
        port: Option<u16>,

        /// Host to bind to (default from config: 127.0.0.1).
        #[arg(long, env = "BONECHAT_HOST")]
        host: Option<String>,
    },

    /// Chat in the terminal.
    Chat,

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

impl Cli {
    /// Default log filter for the requested verbosity. `RUST_LOG` overrides it.
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 if self.quiet => "error",
            0 => "warn",
            1 => "info,bonechat=debug",
            _ => "trace",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_serve_overrides() {
        let cli = Cli::parse_from(["bonechat", "serve", "--port", "9000", "--host", "0.0.0.0"]);
        match cli.command {
            Commands::Serve { port, host } => {
                assert_eq!(port, Some(9000));
                assert_eq!(host.as_deref(), Some("0.0.0.0"));
            }
            _ => panic!("expected serve"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["bonechat", "chat", "-vv", "--config", "/tmp/c.toml"]);
        assert!(matches!(cli.command, Commands::Chat));
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/c.toml")));
        assert_eq!(cli.log_filter(), "trace");
    }

    #[test]
    fn test_log_filter_levels() {
        assert_eq!(Cli::parse_from(["bonechat", "chat"]).log_filter(), "warn");
        assert_eq!(Cli::parse_from(["bonechat", "--quiet", "chat"]).log_filter(), "error");
        assert_eq!(
            Cli::parse_from(["bonechat", "-v", "chat"]).log_filter(),
            "info,bonechat=debug"
        );
    }
}
