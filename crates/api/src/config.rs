//! Server configuration from environment variables.
//!
//! Every setting has a default; a missing or unparsable value is logged and
//! replaced by the default rather than aborting startup.

use std::{
    env,
    fmt::Display,
    net::{IpAddr, Ipv4Addr, SocketAddr},
    path::PathBuf,
    str::FromStr,
};

use tracing::{info, warn};

const DEV_JWT_SECRET: &str = "dev-secret";

/// Longest accepted token lifetime (30 days).
pub const MAX_TOKEN_TTL_MINUTES: i64 = 30 * 24 * 60;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub port: u16,
    pub bind_addr: IpAddr,
    pub jwt_secret: String,
    pub token_ttl_minutes: i64,
    /// JSON file loaded into the in-memory store at startup.
    pub seed_path: Option<PathBuf>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            port: 5000,
            bind_addr: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            jwt_secret: DEV_JWT_SECRET.to_string(),
            token_ttl_minutes: 60,
            seed_path: None,
        }
    }
}

impl ApiConfig {
    pub fn load() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup (the process environment in
    /// production, a map in tests).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let jwt_secret = match non_empty(lookup("JWT_SECRET")) {
            Some(secret) => secret,
            None => {
                warn!("JWT_SECRET not set; using insecure dev default");
                defaults.jwt_secret
            }
        };

        let token_ttl_minutes = try_load(&lookup, "TOKEN_TTL_MINUTES", defaults.token_ttl_minutes);
        let token_ttl_minutes = if !(1..=MAX_TOKEN_TTL_MINUTES).contains(&token_ttl_minutes) {
            warn!(
                "TOKEN_TTL_MINUTES must be between 1 and {MAX_TOKEN_TTL_MINUTES}, using default: {}",
                defaults.token_ttl_minutes
            );
            defaults.token_ttl_minutes
        } else {
            token_ttl_minutes
        };

        Self {
            port: try_load(&lookup, "PORT", defaults.port),
            bind_addr: try_load(&lookup, "BIND_ADDR", defaults.bind_addr),
            jwt_secret,
            token_ttl_minutes,
            seed_path: non_empty(lookup("CATALOG_SEED_PATH")).map(PathBuf::from),
        }
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.port)
    }

    /// Out-of-range values (only reachable by building the struct by hand)
    /// fall back to the default lifetime.
    pub fn token_ttl(&self) -> chrono::TimeDelta {
        chrono::TimeDelta::try_minutes(self.token_ttl_minutes)
            .filter(|ttl| *ttl <= chrono::TimeDelta::minutes(MAX_TOKEN_TTL_MINUTES))
            .unwrap_or_else(|| chrono::TimeDelta::minutes(Self::default().token_ttl_minutes))
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn try_load<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
{
    let Some(raw) = non_empty(lookup(key)) else {
        info!("{key} not set, using default: {default}");
        return default;
    };
    raw.parse().unwrap_or_else(|e| {
        warn!("Invalid {key} value {raw:?}: {e}; using default: {default}");
        default
    })
}
