//! capi-unwrap — entry point.

use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use capi_unwrap_cli::commands::{self, PayloadSource};
use capi_unwrap_cli::config::{resolve_fetch_config, ConfigOverrides};
use capi_unwrap_cli::endpoints::{build_url, parse_param, KNOWN_ENDPOINTS};
use capi_unwrap_cli::fetch::ApiClient;
use capi_unwrap_cli::output::render;

#[derive(Parser)]
#[command(
    name = "capi-unwrap",
    about = "Fetch obfuscated API endpoints and recover their plaintext",
    version
)]
struct Cli {
    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch an endpoint and print the recovered text.
    Fetch {
        /// Full URL, or a path such as /api/spot/support/coin.
        url: String,

        /// Query parameter as key=value (repeatable).
        #[arg(short, long = "param", value_parser = parse_param)]
        params: Vec<(String, String)>,

        /// Pretty-print JSON output.
        #[arg(long)]
        pretty: bool,

        /// Print at most this many characters.
        #[arg(long)]
        preview: Option<usize>,

        /// Request timeout in milliseconds.
        /// Also reads from CAPI_TIMEOUT_MS env var.
        #[arg(long)]
        timeout_ms: Option<u64>,

        /// Attempts before giving up, each with a fresh timestamp.
        /// Also reads from CAPI_MAX_ATTEMPTS env var.
        #[arg(long)]
        max_attempts: Option<u32>,

        /// User-agent header.
        /// Also reads from CAPI_USER_AGENT env var.
        #[arg(long)]
        user_agent: Option<String>,
    },

    /// Unwrap captured materials offline.
    Decode {
        /// Millisecond timestamp sent with the request.
        #[arg(short, long)]
        timestamp: u64,

        /// Base64 key envelope from the response metadata.
        #[arg(short, long)]
        key_envelope: Option<String>,

        /// Base64 payload envelope.
        #[arg(short, long, conflicts_with = "body_file", required_unless_present = "body_file")]
        payload: Option<String>,

        /// JSON response body file; its `data` field is the payload envelope.
        #[arg(long)]
        body_file: Option<PathBuf>,

        /// Pretty-print JSON output.
        #[arg(long)]
        pretty: bool,
    },

    /// Build key and payload envelopes for a fixture, printed as JSON.
    Seal {
        /// Millisecond timestamp to derive the outer key from.
        #[arg(short, long)]
        timestamp: Option<u64>,

        /// Dynamic key text (16 bytes).
        #[arg(short, long)]
        dynamic_key: String,

        /// Plaintext to seal.
        #[arg(long)]
        text: String,
    },

    /// Print the timestamp key for a timestamp (defaults to now).
    DeriveKey {
        #[arg(short, long)]
        timestamp: Option<u64>,
    },

    /// List known endpoints.
    Endpoints,

    /// Generate shell completion scripts.
    ///
    /// Examples:
    ///   capi-unwrap completions bash > ~/.local/share/bash-completion/completions/capi-unwrap
    ///   capi-unwrap completions zsh > ~/.zfunc/_capi-unwrap
    Completions {
        /// Shell type (bash, zsh, fish, powershell, elvish).
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Fetch {
            url,
            params,
            pretty,
            preview,
            timeout_ms,
            max_attempts,
            user_agent,
        } => {
            let config = resolve_fetch_config(&ConfigOverrides {
                timeout_ms,
                max_attempts,
                user_agent,
            });
            let url = build_url(&url, &params)?;
            tracing::info!("Fetching {url}");

            let client = ApiClient::new(config)?;
            let fetched = client.fetch(url.as_str()).await?;
            println!("{}", render(&fetched.text, pretty, preview));
        }

        Commands::Decode {
            timestamp,
            key_envelope,
            payload,
            body_file,
            pretty,
        } => {
            let source = match (&payload, &body_file) {
                (Some(p), _) => PayloadSource::Inline(p),
                (None, Some(path)) => PayloadSource::BodyFile(path),
                (None, None) => anyhow::bail!("either --payload or --body-file is required"),
            };
            let out = commands::decode(timestamp, key_envelope.as_deref(), source, pretty)?;
            println!("{out}");
        }

        Commands::Seal {
            timestamp,
            dynamic_key,
            text,
        } => {
            println!("{}", commands::seal(timestamp, &dynamic_key, &text)?);
        }

        Commands::DeriveKey { timestamp } => {
            println!("{}", commands::derive_key(timestamp)?);
        }

        Commands::Endpoints => {
            for (path, description) in KNOWN_ENDPOINTS {
                println!("{path:<36} {description}");
            }
        }

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "capi-unwrap", &mut std::io::stdout());
        }
    }

    Ok(())
}
