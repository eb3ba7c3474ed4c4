use std::{env, str::FromStr};

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-3.5-turbo";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Staging,
    Production,
}

impl FromStr for AppEnv {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Ok(AppEnv::Development),
            "staging" | "stage" => Ok(AppEnv::Staging),
            "production" | "prod" => Ok(AppEnv::Production),
            _ => Ok(AppEnv::Development), // default if unknown
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub env: AppEnv,
    /// Postgres connection string.
    ///
    /// Only optional in development, where the server falls back to the
    /// in-memory lead store.
    pub database_url: Option<String>,
    pub http_port: u16,

    pub openai_api_key: Option<String>,
    /// Any OpenAI-compatible endpoint (OpenAI itself, a proxy, a local model server).
    pub openai_base_url: String,
    pub openai_model: String,

    /// "openai" or "dummy". Unset means "openai" when a key is present.
    pub llm_provider: Option<String>,

    /// Fixed role titles offered by the intake form. Empty means free text.
    pub role_options: Vec<String>,
}

/// Entry point to load configuration
pub fn load() -> Result<Config> {
    load_dotenv()?;
    Config::from_env()
}

/// Load .env base, then .env.{APP_ENV}
fn load_dotenv() -> Result<()> {
    let _ = dotenvy::dotenv();

    let env_name = env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

    let filename = format!(".env.{}", env_name);
    let _ = dotenvy::from_filename(&filename);

    Ok(())
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let env_str = env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());
        let env = AppEnv::from_str(&env_str).unwrap_or(AppEnv::Development);

        let database_url =
            check_database_url(env, env::var("DATABASE_URL").ok().filter(|s| !s.is_empty()))?;

        let http_port: u16 = env::var("HTTP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .map_err(|_| "HTTP_PORT must be a valid u16")?;

        let openai_api_key = env::var("OPENAI_API_KEY").ok().filter(|s| !s.is_empty());
        let openai_base_url = env::var("OPENAI_API_BASE_URL")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string());
        let openai_model = env::var("OPENAI_MODEL")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string());

        let llm_provider = env::var("LLM_PROVIDER").ok();

        let role_options = env::var("ROLE_OPTIONS")
            .map(|raw| parse_role_options(&raw))
            .unwrap_or_default();

        Ok(Self {
            env,
            database_url,
            http_port,
            openai_api_key,
            openai_base_url,
            openai_model,
            llm_provider,
            role_options,
        })
    }

    /// Development defaults with no database and no generation key.
    pub fn for_tests() -> Self {
        Self {
            env: AppEnv::Development,
            database_url: None,
            http_port: 0,
            openai_api_key: None,
            openai_base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            openai_model: DEFAULT_OPENAI_MODEL.to_string(),
            llm_provider: Some("dummy".to_string()),
            role_options: Vec::new(),
        }
    }
}

/// Split a comma-separated `ROLE_OPTIONS` value, dropping blanks.
fn parse_role_options(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Only development may run without a database (in-memory store).
fn check_database_url(env: AppEnv, database_url: Option<String>) -> Result<Option<String>> {
    if database_url.is_none() && env != AppEnv::Development {
        return Err("DATABASE_URL env var is required outside development".into());
    }
    Ok(database_url)
}
