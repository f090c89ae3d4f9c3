//! Server configuration loaded from the environment

use anyhow::{Context, bail};
use auth::AuthConfig;
use auth::application::BootstrapAdminInput;
use auth::application::config::{
    DEFAULT_ACCESS_TOKEN_TTL, DEFAULT_REFRESH_TOKEN_TTL, MAX_TOKEN_TTL,
};
use base64::Engine;
use base64::engine::general_purpose;
use std::net::SocketAddr;
use std::time::Duration;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:31113";
const DEFAULT_FRONTEND_ORIGINS: &str = "http://localhost:40922,http://127.0.0.1:40922";

pub struct ApiConfig {
    pub auth: AuthConfig,
    pub bind_addr: SocketAddr,
    pub frontend_origins: Vec<String>,
    /// Seeded at startup from `ADMIN_EMAIL` / `ADMIN_PASSWORD`
    pub bootstrap_admin: Option<BootstrapAdminInput>,
}

impl ApiConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok(), cfg!(debug_assertions))
    }

    /// `allow_ephemeral_secret` lets a missing `AUTH_TOKEN_SECRET` fall back to a random key
    fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
        allow_ephemeral_secret: bool,
    ) -> anyhow::Result<Self> {
        let mut auth = match lookup("AUTH_TOKEN_SECRET") {
            Some(secret_b64) => {
                let token_secret = general_purpose::STANDARD
                    .decode(secret_b64.trim())
                    .context("AUTH_TOKEN_SECRET must be base64")?;
                AuthConfig {
                    token_secret,
                    ..AuthConfig::default()
                }
            }
            None if allow_ephemeral_secret => {
                tracing::warn!("AUTH_TOKEN_SECRET not set, using a random key for this process");
                AuthConfig::with_random_secret()
            }
            None => bail!("AUTH_TOKEN_SECRET must be set in production"),
        };

        auth.access_token_ttl =
            seconds(&lookup, "ACCESS_TOKEN_TTL_SECS")?.unwrap_or(DEFAULT_ACCESS_TOKEN_TTL);
        auth.refresh_token_ttl =
            seconds(&lookup, "REFRESH_TOKEN_TTL_SECS")?.unwrap_or(DEFAULT_REFRESH_TOKEN_TTL);
        auth.password_pepper = lookup("PASSWORD_PEPPER")
            .filter(|pepper| !pepper.is_empty())
            .map(String::into_bytes);

        let bind_addr = lookup("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse()
            .context("BIND_ADDR must be host:port")?;

        let frontend_origins = lookup("FRONTEND_ORIGINS")
            .unwrap_or_else(|| DEFAULT_FRONTEND_ORIGINS.to_string())
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect();

        let bootstrap_admin = match (lookup("ADMIN_EMAIL"), lookup("ADMIN_PASSWORD")) {
            (Some(email), Some(password)) => Some(BootstrapAdminInput { email, password }),
            (None, None) => None,
            _ => bail!("ADMIN_EMAIL and ADMIN_PASSWORD must be set together"),
        };

        Ok(Self {
            auth,
            bind_addr,
            frontend_origins,
            bootstrap_admin,
        })
    }
}

fn seconds(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> anyhow::Result<Option<Duration>> {
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };
    let secs: u64 = raw
        .trim()
        .parse()
        .with_context(|| format!("{key} must be a whole number of seconds"))?;
    let ttl = Duration::from_secs(secs);
    if ttl.is_zero() || ttl > MAX_TOKEN_TTL {
        bail!(
            "{key} must be between 1 and {} seconds",
            MAX_TOKEN_TTL.as_secs()
        );
    }
    Ok(Some(ttl))
}
