use std::{env, fmt, time::Duration};

const DEFAULT_TIMEOUT_SECS: u64 = 15;
const REST_PATH: &str = "/rest/v1";
const AUTH_PATH: &str = "/auth/v1";
const STORAGE_PATH: &str = "/storage/v1";

/// Hosted backend configuration sourced from the environment.
#[derive(Debug, Clone)]
pub struct HostedConfig {
    pub base_url: String,
    pub anon_key: String,
    pub timeout: Duration,
}

impl HostedConfig {
    pub fn from_env() -> Result<Self, HostedConfigError> {
        let base_url = required_var("SUPABASE_URL")
            .ok_or(HostedConfigError::MissingUrl)?
            .trim_end_matches('/')
            .to_string();

        let anon_key = required_var("SUPABASE_ANON_KEY").ok_or(HostedConfigError::MissingKey)?;

        let timeout = env::var("SUPABASE_TIMEOUT_SECS")
            .ok()
            .and_then(|value| value.parse::<u64>().ok())
            .filter(|value| *value > 0)
            .map(Duration::from_secs)
            .unwrap_or_else(|| Duration::from_secs(DEFAULT_TIMEOUT_SECS));

        Ok(Self {
            base_url,
            anon_key,
            timeout,
        })
    }

    pub fn table_url(&self, table: &str) -> String {
        format!("{}{}/{}", self.base_url, REST_PATH, table)
    }

    pub fn auth_url(&self, endpoint: &str) -> String {
        format!("{}{}/{}", self.base_url, AUTH_PATH, endpoint)
    }

    pub fn object_url(&self, bucket: &str, path: &str) -> String {
        format!(
            "{}{}/object/{}/{}",
            self.base_url,
            STORAGE_PATH,
            bucket,
            path.trim_start_matches('/')
        )
    }

    pub fn public_object_url(&self, bucket: &str, path: &str) -> String {
        format!(
            "{}{}/object/public/{}/{}",
            self.base_url,
            STORAGE_PATH,
            bucket,
            path.trim_start_matches('/')
        )
    }
}

/// Email/password pair used to sign in at start-up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountCredentials {
    pub email: String,
    pub password: String,
}

impl AccountCredentials {
    /// Reads `HEALTHVERSE_EMAIL` / `HEALTHVERSE_PASSWORD`; `None` when either is unset.
    pub fn from_env() -> Option<Self> {
        let email = required_var("HEALTHVERSE_EMAIL")?;
        let password = required_var("HEALTHVERSE_PASSWORD")?;
        Some(Self { email, password })
    }
}

fn required_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[derive(Debug)]
pub enum HostedConfigError {
    MissingUrl,
    MissingKey,
    ClientBuild(String),
}

impl fmt::Display for HostedConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingUrl => write!(f, "missing SUPABASE_URL"),
            Self::MissingKey => write!(f, "missing SUPABASE_ANON_KEY"),
            Self::ClientBuild(message) => write!(f, "client build failure: {}", message),
        }
    }
}

impl std::error::Error for HostedConfigError {}
