//! CLI definitions for Walko.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Walko CLI.
#[derive(Parser)]
#[command(name = "walko")]
#[command(about = "Product tours and tooltips for any page")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml", global = true)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Render content into a recorded page snapshot and print the mount log
    Preview {
        /// Page snapshot (JSON)
        #[arg(long)]
        page: PathBuf,

        /// Tours and tooltips to deliver (JSON)
        #[arg(long)]
        content: PathBuf,

        /// Scripted host events to replay (JSON)
        #[arg(long)]
        events: Option<PathBuf>,

        /// Keep view history in SQLite at `[storage].path` instead of memory
        #[arg(long)]
        persist: bool,

        /// How long to keep the page open after the last scripted event
        #[arg(long, default_value_t = 2000)]
        linger_ms: u64,
    },

    /// Attach to a live browser page over the DevTools protocol
    Attach {
        /// DevTools HTTP endpoint
        #[arg(long, default_value = "http://localhost:9222", env = "WALKO_CDP")]
        cdp: String,

        /// Target id (default: first page)
        #[arg(long)]
        target: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_preview() {
        let cli = Cli::try_parse_from([
            "walko", "preview", "--page", "page.json", "--content", "content.json", "--persist",
        ])
        .unwrap();
        match cli.command {
            Commands::Preview {
                page,
                events,
                persist,
                linger_ms,
                ..
            } => {
                assert_eq!(page, PathBuf::from("page.json"));
                assert!(events.is_none());
                assert!(persist);
                assert_eq!(linger_ms, 2000);
            }
            _ => panic!("expected preview"),
        }
        assert_eq!(cli.config, PathBuf::from("config/default.toml"));
    }

    #[test]
    fn test_parse_attach_defaults() {
        let cli = Cli::try_parse_from(["walko", "attach", "--target", "ABC"]).unwrap();
        match cli.command {
            Commands::Attach { cdp, target } => {
                assert!(cdp.starts_with("http://"));
                assert_eq!(target.as_deref(), Some("ABC"));
            }
            _ => panic!("expected attach"),
        }
    }

    #[test]
    fn test_preview_requires_page_and_content() {
        assert!(Cli::try_parse_from(["walko", "preview", "--page", "p.json"]).is_err());
    }
}
