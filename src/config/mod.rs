use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use dotenvy::dotenv;
use serde::Deserialize;

/// Command line flags for the ledger binary
#[derive(Debug, Parser)]
#[command(name = "ledger", about = "Project, invoice and payroll tracking dashboard")]
pub struct Cli {
    /// Pre-fill the login form with this email
    #[arg(long)]
    pub email: Option<String>,

    /// Write logs to this file instead of LOG_FILE
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

/// Configuration for the application
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Database connection URL
    pub database_url: String,

    /// Emails that sign in with the admin role
    #[serde(default)]
    pub admin_emails: Vec<String>,

    #[serde(default = "default_storage_root")]
    pub storage_root: PathBuf,

    #[serde(default = "default_storage_bucket")]
    pub storage_bucket: String,

    /// Base of the public URL handed out for stored attachments
    #[serde(default = "default_storage_public_url")]
    pub storage_public_url: String,

    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,

    #[serde(default = "default_db_max_connections")]
    pub db_max_connections: u32,
}

fn default_storage_root() -> PathBuf {
    PathBuf::from("./storage")
}

fn default_storage_bucket() -> String {
    "invoice-files".to_string()
}

fn default_storage_public_url() -> String {
    "http://localhost:54321/storage/v1/object/public".to_string()
}

fn default_log_file() -> PathBuf {
    PathBuf::from("ledger.log")
}

fn default_db_max_connections() -> u32 {
    5
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Variables from a `.env` file are picked up first if one exists.
    pub fn load() -> Result<Self> {
        dotenv().ok();
        Self::from_iter(std::env::vars())
    }

    /// Build a configuration from an explicit set of variables
    pub fn from_iter<I>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut config = envy::from_iter::<_, Config>(vars)?;
        config.admin_emails = config
            .admin_emails
            .iter()
            .map(|email| email.trim().to_lowercase())
            .filter(|email| !email.is_empty())
            .collect();

        Ok(config)
    }

    /// Apply command line overrides
    pub fn with_cli(mut self, cli: &Cli) -> Self {
        if let Some(path) = &cli.log_file {
            self.log_file = path.clone();
        }
        self
    }

    /// Get a direct reference to the database URL
    pub fn database_url(&self) -> &str {
        &self.database_url
    }
}

/// Initialize environment variables and load configuration
pub fn init(cli: &Cli) -> Result<Config> {
    let config = Config::load()?;

    Ok(config.with_cli(cli))
}
