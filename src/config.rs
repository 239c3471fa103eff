use anyhow::{Context, Result};
use clap::Parser;
use std::{env, str::FromStr};

/// Centralized application configuration.
/// Combines environment variables and CLI arguments.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// Default page size for paginated listings.
    pub per_page: u32,
}

/// What to do after the configuration is loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Serve,
    Migrate,
    Seed,
}

/// Command-line + environment configuration.
#[derive(Parser, Debug)]
#[command(author, version, about = "Event booking REST API")]
pub struct Args {
    /// Host to bind to (overrides EVENT_BOOKING_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides EVENT_BOOKING_PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Database URL (overrides EVENT_BOOKING_DATABASE_URL)
    #[arg(long)]
    pub database_url: Option<String>,

    /// Default page size for listings (overrides EVENT_BOOKING_PER_PAGE)
    #[arg(long)]
    pub per_page: Option<u32>,

    /// Apply the schema and exit
    #[arg(long, conflicts_with = "seed")]
    pub migrate: bool,

    /// Apply the schema, insert demo data and exit
    #[arg(long)]
    pub seed: bool,
}

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig and run mode.
    pub fn from_env_and_args() -> Result<(Self, Mode)> {
        Self::from_args(Args::parse())
    }

    fn from_args(args: Args) -> Result<(Self, Mode)> {
        // --- Environment fallback ---
        let env_host = env::var("EVENT_BOOKING_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let env_port = parse_env("EVENT_BOOKING_PORT", 3000)?;
        let env_db = env::var("EVENT_BOOKING_DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://./data/event_booking.db".into());
        let env_per_page = parse_env("EVENT_BOOKING_PER_PAGE", 15)?;

        // --- Merge ---
        let cfg = Self {
            host: args.host.unwrap_or(env_host),
            port: args.port.unwrap_or(env_port),
            database_url: args.database_url.unwrap_or(env_db),
            per_page: args.per_page.unwrap_or(env_per_page),
        };

        let mode = if args.migrate {
            Mode::Migrate
        } else if args.seed {
            Mode::Seed
        } else {
            Mode::Serve
        };

        Ok((cfg, mode))
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_env<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(value) => value
            .parse::<T>()
            .with_context(|| format!("parsing {} value `{}`", name, value)),
        Err(env::VarError::NotPresent) => Ok(default),
        Err(err) => Err(err).with_context(|| format!("reading {}", name)),
    }
}
