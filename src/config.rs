use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub server_addr: String,

    /// Shared passcode accepted by `/login`
    pub access_code: String,
    /// Token handed back on a successful login
    pub session_token: String,

    /// Origins allowed by CORS; `*` allows any
    pub cors_origins: Vec<String>,

    // Rate limiting
    pub rate_login_per_min: u32,

    /// Where `/esporta/attivita?salva=true` writes its document. Disk writes are off when unset.
    pub export_dir: Option<PathBuf>,
    pub log_dir: String,
}

/// A setting whose value could not be parsed and was replaced by its default.
#[derive(Debug, Clone, PartialEq)]
pub struct InvalidSetting {
    pub key: &'static str,
    pub value: String,
    pub default: String,
}

impl Config {
    /// Reads the environment (and `.env`). Invalid values are returned so they can be logged once
    /// tracing is up.
    pub fn from_env() -> (Self, Vec<InvalidSetting>) {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> (Self, Vec<InvalidSetting>) {
        let mut invalid = Vec::new();
        let or = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        let config = Self {
            server_addr: or("SERVER_ADDR", "127.0.0.1:8000"),
            database_url: or("DATABASE_URL", "sqlite://database.db"),
            access_code: or("ACCESS_CODE", "0000"),
            session_token: or("SESSION_TOKEN", "fake-token"),

            cors_origins: or("CORS_ORIGINS", "*")
                .split(',')
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .map(String::from)
                .collect(),

            rate_login_per_min: parse_or(&get, "RATE_LOGIN_PER_MIN", 60, &mut invalid),

            export_dir: get("EXPORT_DIR")
                .filter(|dir| !dir.trim().is_empty())
                .map(PathBuf::from),
            log_dir: or("LOG_DIR", "logs"),
        };

        (config, invalid)
    }
}

fn parse_or<T: FromStr + ToString>(
    get: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
    invalid: &mut Vec<InvalidSetting>,
) -> T {
    match get(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            invalid.push(InvalidSetting {
                key,
                value: raw,
                default: default.to_string(),
            });
            default
        }),
        None => default,
    }
}

#[cfg(test)]
impl Config {
    pub fn for_tests() -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            server_addr: "127.0.0.1:0".to_string(),
            access_code: "0000".to_string(),
            session_token: "fake-token".to_string(),
            cors_origins: vec!["*".to_string()],
            rate_login_per_min: 1000,
            export_dir: None,
            log_dir: "logs".to_string(),
        }
    }
}
