use crate::error::{Error, Result};
use chrono::FixedOffset;
use dotenvy::dotenv;
use std::env;
use std::sync::OnceLock;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub database_url: String,
    pub database_max_connections: u32,
    pub auth_api_base_url: String,
    pub auth_timeout_secs: u64,
    /// Offset used to decide which calendar day "today" is.
    pub business_utc_offset: FixedOffset,
    pub expiry_sweep_cron: String,
    pub scheduler_enabled: bool,
}

pub static CONFIG: OnceLock<Config> = OnceLock::new();

/// Midnight every day, in the business offset.
pub const DEFAULT_EXPIRY_SWEEP_CRON: &str = "0 0 0 * * *";

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        Ok(Self {
            server_address: get_env("SERVER_ADDRESS")?,
            database_url: get_env("DATABASE_URL")?,
            database_max_connections: get_env_parse_or("DATABASE_MAX_CONNECTIONS", 20)?,
            auth_api_base_url: get_env("AUTH_API_BASE_URL")?,
            auth_timeout_secs: get_env_parse_or("AUTH_TIMEOUT_SECS", 10)?,
            business_utc_offset: parse_utc_offset(
                &env::var("BUSINESS_UTC_OFFSET").unwrap_or_else(|_| "+07:00".to_string()),
            )?,
            expiry_sweep_cron: env::var("EXPIRY_SWEEP_CRON")
                .unwrap_or_else(|_| DEFAULT_EXPIRY_SWEEP_CRON.to_string()),
            scheduler_enabled: get_env_parse_or("SCHEDULER_ENABLED", true)?,
        })
    }
}

fn get_env(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config(format!("Missing environment variable: {}", name)))
}

fn get_env_parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e))),
        Err(_) => Ok(default),
    }
}

/// Parses `+HH:MM` / `-HH:MM` (or `Z`) into a fixed offset.
pub fn parse_utc_offset(raw: &str) -> Result<FixedOffset> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("z") || raw.eq_ignore_ascii_case("utc") {
        return FixedOffset::east_opt(0)
            .ok_or_else(|| Error::Config("Invalid UTC offset".to_string()));
    }

    let invalid = || Error::Config(format!("Invalid UTC offset: {}", raw));
    let (sign, rest) = if let Some(rest) = raw.strip_prefix('+') {
        (1, rest)
    } else if let Some(rest) = raw.strip_prefix('-') {
        (-1, rest)
    } else {
        return Err(invalid());
    };
    let (hours, minutes) = rest.split_once(':').unwrap_or((rest, "0"));
    let hours: u32 = hours.parse().map_err(|_| invalid())?;
    let minutes: u32 = minutes.parse().map_err(|_| invalid())?;
    if hours > 14 || minutes > 59 {
        return Err(invalid());
    }

    let seconds = (hours * 3600 + minutes * 60) as i32;
    FixedOffset::east_opt(sign * seconds).ok_or_else(invalid)
}

pub fn init_config() -> Result<()> {
    let config = Config::from_env()?;
    CONFIG
        .set(config)
        .map_err(|_| Error::Config("Configuration has already been initialized".to_string()))?;
    Ok(())
}

pub fn get_config() -> Result<&'static Config> {
    CONFIG
        .get()
        .ok_or_else(|| Error::Config("Configuration has not been initialized".to_string()))
}
