//! durastream - command-line client for durable streams
//!
//! Probes the durable-stream subsystem, publishes with preconditions, and
//! manages streams and consumers.

mod commands;

use clap::{Parser, Subcommand};
use colored::Colorize;
use durastream_client::{Client, Config, Connection};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "durastream")]
#[command(about = "Command-line client for durable streams over NATS")]
#[command(version)]
struct Cli {
    /// Path to a YAML config file
    #[arg(short, long, env = "DURASTREAM_CONFIG")]
    config: Option<PathBuf>,

    /// Server URL
    #[arg(short, long, env = "DURASTREAM_URL")]
    server: Option<String>,

    /// Authentication token
    #[arg(short = 't', long, env = "DURASTREAM_TOKEN")]
    token: Option<String>,

    /// Prefix placed in front of every API subject
    #[arg(long, env = "DURASTREAM_API_PREFIX")]
    prefix: Option<String>,

    /// Request timeout in milliseconds
    #[arg(long, env = "DURASTREAM_REQUEST_TIMEOUT_MS")]
    timeout_ms: Option<u64>,

    // ===== TLS Options =====
    /// Require a TLS connection
    #[arg(long)]
    tls: bool,

    /// Path to CA certificate for server verification
    #[arg(long)]
    ca_cert: Option<PathBuf>,

    /// Path to client certificate (for mTLS)
    #[arg(long)]
    client_cert: Option<PathBuf>,

    /// Path to client private key (for mTLS)
    #[arg(long)]
    client_key: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the durable-stream subsystem is available
    Check,

    /// Show account usage and limits
    AccountInfo,

    /// Publish a message and wait for the stream acknowledgment
    Publish {
        /// Subject to publish to
        subject: String,

        /// Payload text (or @file to read from file)
        #[arg(default_value = "")]
        payload: String,

        /// Extra header as Name=value (repeatable)
        #[arg(short = 'H', long = "header")]
        headers: Vec<String>,

        /// Reject unless the stream's last message has this id
        #[arg(long)]
        expected_last_msg_id: Option<String>,

        /// Reject unless the stream's last sequence is this value
        #[arg(long)]
        expected_last_seq: Option<u64>,

        /// Reject unless the subject is bound to this stream
        #[arg(long)]
        expected_stream: Option<String>,

        /// Message id used for deduplication
        #[arg(long)]
        msg_id: Option<String>,
    },

    /// Manage streams
    Stream {
        #[command(subcommand)]
        action: StreamCommand,
    },

    /// Manage consumers
    Consumer {
        #[command(subcommand)]
        action: ConsumerCommand,
    },
}

#[derive(Subcommand)]
enum StreamCommand {
    /// Create a stream
    Add {
        /// Stream name (overrides the name in --config)
        name: Option<String>,

        /// Subjects captured by the stream
        #[arg(long, value_delimiter = ',')]
        subjects: Vec<String>,

        /// Stream config JSON (or @file.json to read from file)
        #[arg(long)]
        config: Option<String>,
    },

    /// Update a stream's configuration
    Update {
        /// Stream name (overrides the name in --config)
        name: Option<String>,

        /// Subjects captured by the stream
        #[arg(long, value_delimiter = ',')]
        subjects: Vec<String>,

        /// Stream config JSON (or @file.json to read from file)
        #[arg(long)]
        config: Option<String>,
    },

    /// Delete a stream
    Delete {
        /// Stream name
        name: String,
    },

    /// Show a stream's state
    Info {
        /// Stream name
        name: String,
    },

    /// Remove all messages from a stream
    Purge {
        /// Stream name
        name: String,
    },
}

#[derive(Subcommand)]
enum ConsumerCommand {
    /// Create a consumer (durable when --durable is given)
    Add {
        /// Stream name
        stream: String,

        /// Durable name
        #[arg(short, long)]
        durable: Option<String>,

        /// Subject to push deliveries to
        #[arg(long)]
        deliver_subject: Option<String>,

        /// Only deliver messages matching this subject
        #[arg(long)]
        filter_subject: Option<String>,

        /// Consumer config JSON (or @file.json to read from file)
        #[arg(long)]
        config: Option<String>,
    },

    /// Delete a consumer
    Delete {
        /// Stream name
        stream: String,

        /// Consumer name
        name: String,
    },

    /// Show a consumer's state
    Info {
        /// Stream name
        stream: String,

        /// Consumer name
        name: String,
    },
}

impl Cli {
    /// Loads the layered config and applies command-line overrides.
    fn load_config(&self) -> Result<Config, Box<dyn std::error::Error>> {
        let mut config = match self.config {
            Some(ref path) => {
                let mut config = Config::from_file(path)?;
                config.apply_env_overrides();
                config
            }
            None => Config::load()?,
        };

        if let Some(ref url) = self.server {
            config.connection.url = url.clone();
        }
        if let Some(ref token) = self.token {
            config.connection.token = Some(token.clone());
        }
        if let Some(ref prefix) = self.prefix {
            config.api.prefix = prefix.clone();
        }
        if let Some(ms) = self.timeout_ms {
            config.api.request_timeout_ms = ms;
        }

        if self.tls || self.ca_cert.is_some() || self.client_cert.is_some() {
            config.tls.enabled = true;
        }
        if let Some(ref path) = self.ca_cert {
            config.tls.ca_path = Some(path.clone());
        }
        if let Some(ref path) = self.client_cert {
            config.tls.cert_path = Some(path.clone());
        }
        if let Some(ref path) = self.client_key {
            config.tls.key_path = Some(path.clone());
        }

        if config.connection.client_name.is_none() {
            config.connection.client_name = Some("durastream-cli".to_string());
        }

        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    let config = cli.load_config().map_err(|e| {
        eprintln!("{}: {}", "Configuration error".red(), e);
        e
    })?;
    tracing::debug!(
        "Connecting to {} (prefix '{}')",
        config.connection.url,
        config.api.prefix
    );

    let connection = Connection::connect(config.connection_config())
        .await
        .map_err(|e| {
            eprintln!("{}: {}", "Connection failed".red(), e);
            e
        })?;

    // Connecting runs the availability probe
    let client = match Client::connect(connection, config.bridge_config()).await {
        Ok(client) => client,
        Err(e) => {
            eprintln!("{}: {}", "Unavailable".red(), e);
            std::process::exit(1);
        }
    };

    match commands::execute(&client, cli.command).await {
        Ok(output) => {
            println!("{}", output);
        }
        Err(e) => {
            eprintln!("{}: {}", "Error".red(), e);
            std::process::exit(1);
        }
    }

    client.transport().flush().await?;
    Ok(())
}
