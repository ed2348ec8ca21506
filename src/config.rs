use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;
use std::sync::OnceLock;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub database_url: String,
    pub jwt_secret: String,
    pub agent_secret: String,
    pub agent_url: String,
    pub notification_webhook_url: String,
    pub webhook_secret: String,
    pub scheduling_base_url: String,
    pub meeting_base_url: String,
    pub openai_api_key: Option<String>,
    pub scheduler_poll_secs: u64,
    pub dispatch_timeout_secs: u64,
    pub max_interview_minutes: i64,
    pub internal_rps: u32,
    pub public_rps: u32,
}

pub static CONFIG: OnceLock<Config> = OnceLock::new();

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        Ok(Self {
            server_address: get_env("SERVER_ADDRESS")?,
            database_url: get_env("DATABASE_URL")?,
            jwt_secret: get_env("JWT_SECRET")?,
            agent_secret: get_env("AGENT_SECRET")?,
            agent_url: get_env_url("AGENT_URL")?,
            notification_webhook_url: get_env_url("NOTIFICATION_WEBHOOK_URL")?,
            webhook_secret: get_env("WEBHOOK_SECRET")?,
            scheduling_base_url: get_env_url("SCHEDULING_BASE_URL")?,
            meeting_base_url: get_env_url("MEETING_BASE_URL")?,
            openai_api_key: env::var("OPENAI_API_KEY").ok().filter(|k| !k.is_empty()),
            scheduler_poll_secs: get_env_parse_or("SCHEDULER_POLL_SECS", 60)?,
            dispatch_timeout_secs: get_env_parse_or("DISPATCH_TIMEOUT_SECS", 30)?,
            max_interview_minutes: get_env_parse_or("MAX_INTERVIEW_MINUTES", 180)?,
            internal_rps: get_env_parse("INTERNAL_RPS")?,
            public_rps: get_env_parse("PUBLIC_RPS")?,
        })
    }
}

fn get_env(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config(format!("Missing environment variable: {}", name)))
}

fn get_env_url(name: &str) -> Result<String> {
    let raw = get_env(name)?;
    url::Url::parse(&raw).map_err(|e| Error::Config(format!("Invalid URL in {}: {}", name, e)))?;
    Ok(raw)
}

fn get_env_parse<T>(name: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let raw = get_env(name)?;
    raw.parse()
        .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e)))
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

pub fn init_config() -> Result<()> {
    let config = Config::from_env()?;
    CONFIG
        .set(config)
        .map_err(|_| Error::Config("Configuration has already been initialized".to_string()))?;
    Ok(())
}

pub fn get_config() -> &'static Config {
    CONFIG
        .get()
        .expect("Configuration has not been initialized")
}
