use std::{env, fmt::Display, str::FromStr, time::Duration};

use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
#[error("invalid {key} value '{value}': {reason}")]
pub struct ConfigError {
    key: &'static str,
    value: String,
    reason: String,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub port: u16,
    pub medusa: MedusaConfig,
    pub strapi: StrapiConfig,
    pub stripe: StripeConfig,
    pub site_url: String,
    pub mail: MailConfig,
    /// Bearer token for `/api/admin`; admin routes refuse every request when unset.
    pub admin_token: Option<String>,
    pub http_timeout: Duration,
}

#[derive(Clone, Debug)]
pub struct MedusaConfig {
    pub base_url: String,
    pub region_id: String,
    pub sales_channel_id: Option<String>,
    pub admin_token: Option<String>,
}

#[derive(Clone, Debug)]
pub struct StrapiConfig {
    pub api_url: String,
    pub media_url: String,
}

#[derive(Clone, Debug)]
pub struct StripeConfig {
    pub api_url: String,
    pub secret_key: Option<String>,
    pub webhook_secret: Option<String>,
}

#[derive(Clone, Debug)]
pub struct MailConfig {
    pub from: String,
    pub owner: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let from = load_or("SMTP_USER", "info@lekkerpurmerend.nl");
        Ok(Self {
            port: try_load("PORT", "3000")?,
            medusa: MedusaConfig {
                base_url: trimmed_url(load_or("MEDUSA_BACKEND_URL", "http://localhost:9000")),
                region_id: load_or("MEDUSA_REGION_ID", "reg_nl"),
                sales_channel_id: optional("MEDUSA_SALES_CHANNEL_ID"),
                admin_token: optional("MEDUSA_ADMIN_TOKEN"),
            },
            strapi: StrapiConfig {
                api_url: trimmed_url(load_or("STRAPI_API_URL", "http://localhost:1337/api")),
                media_url: trimmed_url(load_or("STRAPI_URL", "http://localhost:1337")),
            },
            stripe: StripeConfig {
                api_url: trimmed_url(load_or("STRIPE_API_URL", "https://api.stripe.com")),
                secret_key: optional("STRIPE_SECRET_KEY"),
                webhook_secret: optional("STRIPE_WEBHOOK_SECRET"),
            },
            site_url: trimmed_url(load_or("SITE_URL", "http://localhost:3000")),
            mail: MailConfig { owner: optional("OWNER_EMAIL").unwrap_or_else(|| from.clone()), from },
            admin_token: optional("ADMIN_API_TOKEN"),
            http_timeout: Duration::from_secs(try_load("HTTP_TIMEOUT_SECS", "10")?),
        })
    }
}

fn optional(key: &str) -> Option<String> {
    env::var(key).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn load_or(key: &str, default: &str) -> String {
    optional(key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    })
}

fn try_load<T: FromStr>(key: &'static str, default: &str) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    let raw = load_or(key, default);
    raw.parse().map_err(|e: T::Err| {
        warn!("Invalid {key} value: {e}");
        ConfigError { key, value: raw.clone(), reason: e.to_string() }
    })
}

fn trimmed_url(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

#[cfg(test)]
impl Config {
    /// Configuration pointing at unroutable hosts, for router tests.
    pub fn for_tests() -> Self {
        Self {
            port: 0,
            medusa: MedusaConfig {
                base_url: "http://medusa.test".into(),
                region_id: "reg_nl".into(),
                sales_channel_id: Some("sc_test".into()),
                admin_token: None,
            },
            strapi: StrapiConfig { api_url: "http://strapi.test/api".into(), media_url: "http://strapi.test".into() },
            stripe: StripeConfig {
                api_url: "http://stripe.test".into(),
                secret_key: Some("sk_test".into()),
                webhook_secret: Some("whsec_test".into()),
            },
            site_url: "https://lekker.test".into(),
            mail: MailConfig { from: "info@lekker.test".into(), owner: "owner@lekker.test".into() },
            admin_token: Some("admin_test".into()),
            http_timeout: Duration::from_secs(1),
        }
    }
}
