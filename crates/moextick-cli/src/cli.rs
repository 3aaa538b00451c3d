//! CLI argument definitions for moextick.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `share` | Look up a share by ticker |
//! | `bond` | Look up a bond by ticker or ISIN |
//! | `find` | Search instruments by text |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--timeout-ms` | `MOEX_TIMEOUT_MS` or `10000` | Request timeout in ms |
//! | `--base-url` | `MOEX_BASE_URL` or ISS | ISS base URL |
//! | `--no-cache` | `false` | Disable the lookup caches |
//! | `--log-format` | `plain` | Log format on stderr |
//!
//! # Examples
//!
//! ```bash
//! moextick share SBER
//! moextick bond SU26238RMFS4 --pretty
//! moextick find sberbank --type bond
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Moscow Exchange ISS market-data CLI
#[derive(Debug, Parser)]
#[command(
    name = "moextick",
    author,
    version,
    about = "Moscow Exchange ISS market-data CLI",
    long_about = "moextick looks up shares, bonds and instruments on the Moscow Exchange \
ISS API and prints them as a JSON envelope.\n\
\n\
Environment variables MOEX_* configure the client; flags override them.\n\
Logs go to stderr and are filtered with RUST_LOG."
)]
pub struct Cli {
    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Request timeout budget in milliseconds.
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,

    /// ISS base URL.
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Disable caching; every lookup reaches ISS.
    #[arg(long, global = true, default_value_t = false)]
    pub no_cache: bool,

    /// Log output format on stderr.
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

/// Log formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines.
    Plain,
    /// One JSON object per line.
    Json,
}

/// Available CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Look up a share.
    ///
    /// # Examples
    ///
    ///   moextick share SBER
    ///   moextick share gazp --pretty
    Share(TickerArgs),

    /// Look up a bond.
    ///
    /// # Examples
    ///
    ///   moextick bond SU26238RMFS4
    ///   moextick bond RU000A105Q63 --no-cache
    Bond(TickerArgs),

    /// Search instruments by ticker, ISIN or name.
    ///
    /// # Examples
    ///
    ///   moextick find sberbank
    ///   moextick find sber --type bond
    Find(FindArgs),
}

/// Arguments for the `share` and `bond` commands.
#[derive(Debug, Args)]
pub struct TickerArgs {
    /// Ticker (SECID), case-insensitive.
    pub ticker: String,
}

/// Arguments for the `find` command.
#[derive(Debug, Args)]
pub struct FindArgs {
    /// Search text.
    pub query: String,

    /// Restrict results to one instrument type.
    #[arg(long = "type", value_enum)]
    pub instrument_type: Option<TypeFilter>,
}

/// Instrument type filter for `find`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TypeFilter {
    Share,
    Bond,
    Fund,
}

impl TypeFilter {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Share => "share",
            Self::Bond => "bond",
            Self::Fund => "fund",
        }
    }
}
