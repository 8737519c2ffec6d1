//! Server configuration

use std::path::PathBuf;

use clap::Parser;
use thiserror::Error;

/// Name of the account file inside the configuration directory
pub const PASSWD_FILE: &str = "passwd";

/// Log level used when none is given; matches the default `RUST_LOG` filter
pub const DEFAULT_LOG_LEVEL: u8 = 3;

/// Personal file server with self-service account registration.
#[derive(Parser, Debug)]
#[command(name = "filenest")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Address the HTTP server binds to
    #[arg(long, env = "FILENEST_HTTP_ADDRESS", default_value = "0.0.0.0:8080")]
    pub http_address: String,

    /// Directory served under /dir/ and holding account storage roots (default: current directory)
    #[arg(long, env = "FILENEST_WEB_ROOT", value_name = "DIR")]
    pub web_root: Option<PathBuf>,

    /// Directory holding the passwd file
    #[arg(long, env = "FILENEST_CONFIG_DIR", value_name = "DIR", default_value = "/etc/filenest/")]
    pub config_dir: PathBuf,

    /// Enable directory browsing and the file transfer server
    #[arg(long, env = "FILENEST_FILESYSTEM_ACCESS", default_value_t = true, action = clap::ArgAction::Set)]
    pub filesystem_access: bool,

    /// Worker threads for the file transfer server
    #[arg(long, env = "FILENEST_TRANSFER_WORKERS", default_value_t = 4)]
    pub transfer_workers: usize,

    /// 0 = none, 1 = error, 2 = info, 3 = debug, 4 = verbose
    #[arg(long, env = "FILENEST_LOG_LEVEL", value_parser = clap::value_parser!(u8).range(0..=4))]
    pub log_level: Option<u8>,

    /// Sender address for confirmation mail; empty disables confirmation
    #[arg(long, env = "FILENEST_EMAIL")]
    pub email: Option<String>,

    /// Password for the sender address
    #[arg(long, env = "FILENEST_EMAIL_PASSWORD", hide_env_values = true)]
    pub email_password: Option<String>,

    /// Print confirmation links to the console instead of mailing them
    #[arg(long, env = "FILENEST_CONSOLE_MAIL")]
    pub console_mail: bool,

    /// SMTP relay (default: smtp.<sender domain>)
    #[arg(long, env = "SMTP_HOST")]
    pub smtp_host: Option<String>,

    #[arg(long, env = "SMTP_PORT", default_value_t = 465)]
    pub smtp_port: u16,

    /// Base URL used in confirmation links (default: http://<Host header>)
    #[arg(long, env = "FILENEST_PUBLIC_URL")]
    pub public_url: Option<String>,

    /// Only accept registrations from these mail domains
    #[arg(long, env = "FILENEST_ALLOWED_EMAIL_DOMAINS", value_delimiter = ',')]
    pub allowed_email_domains: Vec<String>,

    /// Refuse registrations from these mail domains
    #[arg(long, env = "FILENEST_DENIED_EMAIL_DOMAINS", value_delimiter = ',')]
    pub denied_email_domains: Vec<String>,

    /// Forget unconfirmed registrations after this many minutes
    #[arg(long, env = "FILENEST_PENDING_TTL_MINUTES")]
    pub pending_ttl_minutes: Option<u64>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Email {0} is configured without a password")]
    MissingEmailPassword(String),

    #[error("Cannot determine web root: {0}")]
    WebRoot(#[from] std::io::Error),

    #[error("Transfer server needs at least one worker")]
    NoWorkers,
}

#[derive(Clone)]
pub struct Config {
    pub http_address: String,
    pub web_root: PathBuf,
    pub config_dir: PathBuf,
    pub filesystem_access: bool,
    pub transfer_workers: usize,
    pub log_level: Option<u8>,

    pub email: Option<String>,
    pub email_password: Option<String>,
    pub console_mail: bool,
    pub smtp_host: Option<String>,
    pub smtp_port: u16,
    pub public_url: Option<String>,

    pub allowed_email_domains: Vec<String>,
    pub denied_email_domains: Vec<String>,
    pub pending_ttl_minutes: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http_address: "0.0.0.0:8080".to_string(),
            web_root: PathBuf::from("."),
            config_dir: PathBuf::from("/etc/filenest/"),
            filesystem_access: true,
            transfer_workers: 4,
            log_level: None,
            email: None,
            email_password: None,
            console_mail: false,
            smtp_host: None,
            smtp_port: 465,
            public_url: None,
            allowed_email_domains: Vec::new(),
            denied_email_domains: Vec::new(),
            pending_ttl_minutes: None,
        }
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("http_address", &self.http_address)
            .field("web_root", &self.web_root)
            .field("config_dir", &self.config_dir)
            .field("filesystem_access", &self.filesystem_access)
            .field("transfer_workers", &self.transfer_workers)
            .field("log_level", &self.log_level)
            .field("email", &self.email)
            .field("email_password", &self.email_password.as_ref().map(|_| "<redacted>"))
            .field("console_mail", &self.console_mail)
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("public_url", &self.public_url)
            .field("allowed_email_domains", &self.allowed_email_domains)
            .field("denied_email_domains", &self.denied_email_domains)
            .field("pending_ttl_minutes", &self.pending_ttl_minutes)
            .finish()
    }
}

impl Cli {
    pub fn into_config(self) -> Result<Config, ConfigError> {
        let web_root = match self.web_root {
            Some(dir) => dir,
            None => std::env::current_dir()?,
        };

        Ok(Config {
            http_address: self.http_address,
            web_root,
            config_dir: self.config_dir,
            filesystem_access: self.filesystem_access,
            transfer_workers: self.transfer_workers,
            log_level: self.log_level,
            email: self.email,
            email_password: self.email_password,
            console_mail: self.console_mail,
            smtp_host: self.smtp_host,
            smtp_port: self.smtp_port,
            public_url: self.public_url,
            allowed_email_domains: clean_domains(self.allowed_email_domains),
            denied_email_domains: clean_domains(self.denied_email_domains),
            pending_ttl_minutes: self.pending_ttl_minutes,
        })
    }
}

fn clean_domains(domains: Vec<String>) -> Vec<String> {
    domains
        .into_iter()
        .map(|d| d.trim().to_ascii_lowercase())
        .filter(|d| !d.is_empty())
        .collect()
}

impl Config {
    /// Reject configurations the server must not start with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(email) = self.email.as_deref().filter(|e| !e.is_empty()) {
            if self.email_password.as_deref().unwrap_or("").is_empty() {
                return Err(ConfigError::MissingEmailPassword(email.to_string()));
            }
        }
        if self.filesystem_access && self.transfer_workers == 0 {
            return Err(ConfigError::NoWorkers);
        }
        Ok(())
    }

    /// Whether registrations go through a confirmation mail
    pub fn confirmation_enabled(&self) -> bool {
        self.console_mail || self.email.as_deref().is_some_and(|e| !e.is_empty())
    }

    pub fn passwd_path(&self) -> PathBuf {
        self.config_dir.join(PASSWD_FILE)
    }

    pub fn effective_log_level(&self) -> u8 {
        self.log_level.unwrap_or(DEFAULT_LOG_LEVEL)
    }

    /// Default tracing filter for the configured log level
    pub fn log_filter(&self) -> String {
        let level = match self.effective_log_level() {
            0 => return "off".to_string(),
            1 => "error",
            2 => "info",
            3 => "debug",
            _ => "trace",
        };
        format!("filenest_server={level},tower_http={level}")
    }

    /// Apply the allow and deny lists to a mail domain
    pub fn domain_allowed(&self, domain: &str) -> bool {
        let domain = domain.to_ascii_lowercase();
        if !self.allowed_email_domains.is_empty() && !self.allowed_email_domains.contains(&domain) {
            return false;
        }
        !self.denied_email_domains.contains(&domain)
    }

    pub fn pending_ttl(&self) -> Option<chrono::Duration> {
        self.pending_ttl_minutes
            .map(|minutes| chrono::Duration::minutes(minutes.min(i64::MAX as u64 / 60_000) as i64))
    }
}
