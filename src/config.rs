//! Environment-based configuration.

use std::env;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub host: String,
    pub cors_origins: Vec<String>,
    pub store: StoreConfig,
    pub token: TokenConfig,
    pub draw: DrawConfig,
    pub log_level: String,
}

/// Key-value store endpoint. An empty URL selects the in-process backend.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub url: String,
    pub token: String,
}

/// Delivery-token signing.
#[derive(Debug, Clone)]
pub struct TokenConfig {
    pub secret: String,
    pub ttl: u64,
}

/// Draw policy knobs.
#[derive(Debug, Clone)]
pub struct DrawConfig {
    pub admin_view: AdminView,
}

/// What the admin's draw-result table discloses: matched identities, or
/// opaque delivery tokens redeemable by the participants themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminView {
    Full,
    Tokens,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            port: env::var("PORT")
                .unwrap_or_else(|_| "3333".to_string())
                .parse()
                .unwrap_or(3333),
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            cors_origins: env::var("CORS_ORIGINS")
                .unwrap_or_else(|_| "*".to_string())
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            store: StoreConfig {
                url: env::var("STORE_URL").unwrap_or_default(),
                token: env::var("STORE_TOKEN").unwrap_or_default(),
            },
            token: TokenConfig {
                secret: env::var("TOKEN_SECRET").unwrap_or_else(|_| "your-secret-key".to_string()),
                ttl: env::var("TOKEN_TTL")
                    .unwrap_or_else(|_| "604800".to_string())
                    .parse()
                    .unwrap_or(604800),
            },
            draw: DrawConfig {
                admin_view: match env::var("DRAW_ADMIN_VIEW").as_deref() {
                    Ok("tokens") => AdminView::Tokens,
                    _ => AdminView::Full,
                },
            },
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        }
    }
}
