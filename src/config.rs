use log::warn;
use std::env;

const DEV_JWT_SECRET: &str = "dev-only-secret";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Mongo,
    Memory,
}

/// Settings for password hashing and bearer token issuance.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    pub bcrypt_cost: u32,
}

/// Application configuration, read once at startup from the environment (and `.env`).
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub store_backend: StoreBackend,
    pub mongodb_uri: String,
    pub database_name: String,
    pub auth: AuthConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        let store_backend = match env::var("STORE_BACKEND")
            .unwrap_or_default()
            .trim()
            .to_lowercase()
            .as_str()
        {
            "memory" => StoreBackend::Memory,
            _ => StoreBackend::Mongo,
        };

        let jwt_secret = match env::var("JWT_SECRET") {
            Ok(secret) if !secret.trim().is_empty() => secret,
            _ if store_backend == StoreBackend::Memory => {
                warn!("JWT_SECRET is not set, using the development secret");
                DEV_JWT_SECRET.to_string()
            }
            _ => return Err("JWT_SECRET must be set".to_string()),
        };

        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parse_or("PORT", 3000),
            store_backend,
            mongodb_uri: env::var("MONGODB_URI")
                .unwrap_or_else(|_| "mongodb://localhost:27017".to_string()),
            database_name: env::var("DATABASE_NAME")
                .unwrap_or_else(|_| "blogging_api".to_string()),
            auth: AuthConfig {
                jwt_secret,
                token_ttl_hours: parse_or("JWT_EXPIRES_IN_HOURS", 24),
                bcrypt_cost: parse_or("BCRYPT_COST", bcrypt::DEFAULT_COST),
            },
        })
    }
}

fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(default)
}

pub fn service_name() -> String {
    env::var("SERVICE_NAME").unwrap_or_else(|_| "blogging-api".to_string())
}
