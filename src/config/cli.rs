use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueHint, builder::BoolishValueParser};

/// Command-line arguments for the Chefer binary.
#[derive(Debug, Parser)]
#[command(name = "chefer", version, about = "Chefer restaurant site")]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "CHEFER_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Run the public site.
    Serve(Box<ServeArgs>),
    /// Replace the catalog and site content from a TOML archive.
    #[command(name = "import")]
    Import(ImportArgs),
    /// Newsletter utilities.
    #[command(name = "newsletter")]
    Newsletter(NewsletterArgs),
}

#[derive(Debug, Args, Default, Clone)]
pub struct DatabaseOverride {
    /// Override the database connection URL.
    #[arg(long = "database-url", value_name = "URL")]
    pub database_url: Option<String>,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeArgs {
    #[command(flatten)]
    pub overrides: ServeOverrides,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeOverrides {
    /// Override the listener host.
    #[arg(long = "server-host", value_name = "HOST")]
    pub server_host: Option<String>,

    /// Override the listener port.
    #[arg(long = "server-port", value_name = "PORT")]
    pub server_port: Option<u16>,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub log_json: Option<bool>,

    /// Override the database connection URL.
    #[arg(long = "database-url", value_name = "URL")]
    pub database_url: Option<String>,

    /// Override the database pool size.
    #[arg(long = "database-max-connections", value_name = "COUNT")]
    pub database_max_connections: Option<u32>,

    /// Enable or disable the reference data cache.
    #[arg(
        long = "cache-enabled",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub cache_enabled: Option<bool>,

    /// Override the cache entry lifetime.
    #[arg(long = "cache-ttl-seconds", value_name = "SECONDS")]
    pub cache_ttl_seconds: Option<u32>,

    /// Override the mail relay endpoint.
    #[arg(long = "mail-endpoint", value_name = "URL")]
    pub mail_endpoint: Option<String>,
}

#[derive(Debug, Args, Clone)]
pub struct ImportArgs {
    #[command(flatten)]
    pub database: DatabaseOverride,

    /// Path to the archive to import.
    #[arg(value_name = "FILE", value_hint = ValueHint::FilePath)]
    pub file: PathBuf,
}

#[derive(Debug, Args, Clone)]
pub struct NewsletterArgs {
    #[command(subcommand)]
    pub command: NewsletterCommand,
}

#[derive(Debug, Subcommand, Clone)]
pub enum NewsletterCommand {
    /// Mail a message to every subscriber.
    #[command(name = "send")]
    Send(NewsletterSendArgs),
}

#[derive(Debug, Args, Clone)]
pub struct NewsletterSendArgs {
    #[command(flatten)]
    pub database: DatabaseOverride,

    /// Override the mail relay endpoint.
    #[arg(long = "mail-endpoint", value_name = "URL")]
    pub mail_endpoint: Option<String>,

    /// Subject line of the newsletter.
    #[arg(long, value_name = "TEXT")]
    pub subject: String,

    /// Plain-text file holding the newsletter body.
    #[arg(long = "message-file", value_name = "FILE", value_hint = ValueHint::FilePath)]
    pub message_file: PathBuf,
}
