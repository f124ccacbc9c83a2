//! Configuration layer: typed settings with layered precedence (file → env → CLI).

mod cli;

pub use cli::{
    CliArgs, Command, DatabaseOverride, ImportArgs, NewsletterArgs, NewsletterCommand,
    NewsletterSendArgs, ServeArgs, ServeOverrides,
};

use std::{net::SocketAddr, num::NonZeroU32, str::FromStr};

use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;

use crate::domain::validation::is_well_formed_email;

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "chefer";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 8;
const DEFAULT_CACHE_CAPACITY: u32 = 256;
const DEFAULT_CACHE_TTL_SECS: u32 = 900;
const DEFAULT_MAIL_FROM: &str = "no-reply@chefer.local";
const DEFAULT_MAIL_ADMIN: &str = "admin@chefer.local";
const DEFAULT_BRAND_TITLE: &str = "Chefer";
const DEFAULT_TAGLINE: &str = "Seasonal cooking, served daily";
const DEFAULT_FOOTER_COPY: &str = "Chefer Restaurant";

/// Fully-resolved deployment settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub logging: LoggingSettings,
    pub database: DatabaseSettings,
    pub cache: CacheSettings,
    pub mail: MailSettings,
    pub site: SiteSettings,
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub addr: SocketAddr,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Debug, Clone)]
pub struct DatabaseSettings {
    pub url: Option<String>,
    pub max_connections: NonZeroU32,
}

#[derive(Debug, Clone)]
pub struct CacheSettings {
    pub enabled: bool,
    pub capacity: NonZeroU32,
    /// Zero makes every entry expire immediately.
    pub ttl_seconds: u32,
}

#[derive(Debug, Clone)]
pub struct MailSettings {
    pub from: String,
    pub admin: String,
    /// Relay endpoint; mail is only logged when unset.
    pub endpoint: Option<String>,
}

/// Branding shown in the page chrome and mail sign-offs.
#[derive(Debug, Clone)]
pub struct SiteSettings {
    pub brand_title: String,
    pub tagline: String,
    pub footer_copy: String,
    pub public_url: String,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Load settings using the configured precedence (file → environment → CLI).
pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(Environment::with_prefix("CHEFER").separator("__"));

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;

    match cli.command.as_ref() {
        Some(Command::Serve(args)) => raw.apply_serve_overrides(&args.overrides),
        Some(Command::Import(args)) => raw.apply_database_override(&args.database),
        Some(Command::Newsletter(args)) => match &args.command {
            NewsletterCommand::Send(send) => {
                raw.apply_database_override(&send.database);
                if let Some(endpoint) = send.mail_endpoint.as_ref() {
                    raw.mail.endpoint = Some(endpoint.clone());
                }
            }
        },
        None => raw.apply_serve_overrides(&ServeOverrides::default()),
    }

    Settings::from_raw(raw)
}

/// Resolve configuration using the supplied CLI arguments, returning both for downstream use.
pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    let args = CliArgs::parse();
    let settings = load(&args)?;
    Ok((args, settings))
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    server: RawServerSettings,
    logging: RawLoggingSettings,
    database: RawDatabaseSettings,
    cache: RawCacheSettings,
    mail: RawMailSettings,
    site: RawSiteSettings,
}

impl RawSettings {
    fn apply_serve_overrides(&mut self, overrides: &ServeOverrides) {
        if let Some(host) = overrides.server_host.as_ref() {
            self.server.host = Some(host.clone());
        }
        if let Some(port) = overrides.server_port {
            self.server.port = Some(port);
        }
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
        if let Some(url) = overrides.database_url.as_ref() {
            self.database.url = Some(url.clone());
        }
        if let Some(max) = overrides.database_max_connections {
            self.database.max_connections = Some(max);
        }
        if let Some(enabled) = overrides.cache_enabled {
            self.cache.enabled = Some(enabled);
        }
        if let Some(ttl) = overrides.cache_ttl_seconds {
            self.cache.ttl_seconds = Some(ttl);
        }
        if let Some(endpoint) = overrides.mail_endpoint.as_ref() {
            self.mail.endpoint = Some(endpoint.clone());
        }
    }

    fn apply_database_override(&mut self, overrides: &DatabaseOverride) {
        if let Some(url) = overrides.database_url.as_ref() {
            self.database.url = Some(url.clone());
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            server,
            logging,
            database,
            cache,
            mail,
            site,
        } = raw;

        Ok(Self {
            server: build_server_settings(server)?,
            logging: build_logging_settings(logging)?,
            database: build_database_settings(database)?,
            cache: build_cache_settings(cache)?,
            mail: build_mail_settings(mail)?,
            site: build_site_settings(site),
        })
    }
}

fn build_server_settings(server: RawServerSettings) -> Result<ServerSettings, LoadError> {
    let host = server.host.unwrap_or_else(|| DEFAULT_HOST.to_string());
    let port = server.port.unwrap_or(DEFAULT_PORT);
    if port == 0 {
        return Err(LoadError::invalid(
            "server.port",
            "port must be greater than zero",
        ));
    }

    let addr = parse_socket_addr(&host, port)
        .map_err(|reason| LoadError::invalid("server.addr", reason))?;

    Ok(ServerSettings { addr })
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::INFO,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

fn build_database_settings(database: RawDatabaseSettings) -> Result<DatabaseSettings, LoadError> {
    let url = non_blank(database.url);
    let max_connections = non_zero_u32(
        database
            .max_connections
            .unwrap_or(DEFAULT_DB_MAX_CONNECTIONS)
            .into(),
        "database.max_connections",
    )?;

    Ok(DatabaseSettings {
        url,
        max_connections,
    })
}

fn build_cache_settings(cache: RawCacheSettings) -> Result<CacheSettings, LoadError> {
    let capacity = non_zero_u32(
        cache.capacity.unwrap_or(DEFAULT_CACHE_CAPACITY).into(),
        "cache.capacity",
    )?;

    Ok(CacheSettings {
        enabled: cache.enabled.unwrap_or(true),
        capacity,
        ttl_seconds: cache.ttl_seconds.unwrap_or(DEFAULT_CACHE_TTL_SECS),
    })
}

fn build_mail_settings(mail: RawMailSettings) -> Result<MailSettings, LoadError> {
    let from = non_blank(mail.from).unwrap_or_else(|| DEFAULT_MAIL_FROM.to_string());
    if !is_well_formed_email(&from) {
        return Err(LoadError::invalid("mail.from", "not a valid email address"));
    }

    let admin = non_blank(mail.admin).unwrap_or_else(|| DEFAULT_MAIL_ADMIN.to_string());
    if !is_well_formed_email(&admin) {
        return Err(LoadError::invalid("mail.admin", "not a valid email address"));
    }

    let endpoint = non_blank(mail.endpoint);
    if let Some(endpoint) = endpoint.as_deref()
        && !(endpoint.starts_with("http://") || endpoint.starts_with("https://"))
    {
        return Err(LoadError::invalid(
            "mail.endpoint",
            "endpoint must be an http(s) URL",
        ));
    }

    Ok(MailSettings {
        from,
        admin,
        endpoint,
    })
}

fn build_site_settings(site: RawSiteSettings) -> SiteSettings {
    let public_url = non_blank(site.public_url)
        .unwrap_or_else(|| format!("http://{DEFAULT_HOST}:{DEFAULT_PORT}"))
        .trim_end_matches('/')
        .to_string();

    SiteSettings {
        brand_title: non_blank(site.brand_title)
            .unwrap_or_else(|| DEFAULT_BRAND_TITLE.to_string()),
        tagline: site.tagline.unwrap_or_else(|| DEFAULT_TAGLINE.to_string()),
        footer_copy: site
            .footer_copy
            .unwrap_or_else(|| DEFAULT_FOOTER_COPY.to_string()),
        public_url,
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawServerSettings {
    host: Option<String>,
    port: Option<u16>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawDatabaseSettings {
    url: Option<String>,
    max_connections: Option<u32>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawCacheSettings {
    enabled: Option<bool>,
    capacity: Option<u32>,
    ttl_seconds: Option<u32>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawMailSettings {
    from: Option<String>,
    admin: Option<String>,
    endpoint: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSiteSettings {
    brand_title: Option<String>,
    tagline: Option<String>,
    footer_copy: Option<String>,
    public_url: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.and_then(|value| {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}

fn parse_socket_addr(host: &str, port: u16) -> Result<SocketAddr, String> {
    let candidate = format!("{host}:{port}");
    candidate
        .parse()
        .map_err(|err| format!("invalid address `{candidate}`: {err}"))
}

fn non_zero_u32(value: u64, key: &'static str) -> Result<NonZeroU32, LoadError> {
    if value == 0 {
        return Err(LoadError::invalid(key, "must be greater than zero"));
    }
    let value_u32: u32 = value
        .try_into()
        .map_err(|_| LoadError::invalid(key, "value exceeds supported range for u32"))?;
    NonZeroU32::new(value_u32).ok_or_else(|| LoadError::invalid(key, "must be greater than zero"))
}
