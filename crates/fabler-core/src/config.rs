//! Configuration module
//!
//! Environment-driven configuration for the API binary and services: server,
//! database, storage backend, upstream generation providers, and the payment
//! webhook secret.

use std::env;

use crate::AppError;

const MAX_CONNECTIONS: u32 = 20;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const DEFAULT_SERVER_PORT: u16 = 3000;

const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_RUNWARE_BASE_URL: &str = "https://api.runware.ai/v1";
const DEFAULT_ELEVENLABS_BASE_URL: &str = "https://api.elevenlabs.io/v1";

const DEFAULT_CHAT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_TRANSLATION_MODEL: &str = "gpt-4";
const DEFAULT_IMAGE_MODEL: &str = "dall-e-3";

/// Which storage backend to use for media buckets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StorageBackendKind {
    Local,
    S3,
}

/// Service configuration, loaded once at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub environment: String,
    // Database
    pub database_url: String,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    // Auth
    pub jwt_secret: String,
    // Text + image generation providers
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub chat_model: String,
    pub translation_model: String,
    pub image_model: String,
    pub runware_api_key: Option<String>,
    pub runware_base_url: String,
    // Text-to-speech
    pub elevenlabs_api_key: Option<String>,
    pub elevenlabs_base_url: String,
    // Video muxing service
    pub mux_service_url: String,
    // Payment webhook
    pub stripe_webhook_secret: String,
    // Storage
    pub storage_backend: StorageBackendKind,
    pub local_storage_path: String,
    pub local_storage_base_url: String,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>,
}

fn required(name: &str) -> Result<String, AppError> {
    env::var(name)
        .map_err(|_| AppError::Internal(format!("Missing required environment variable {}", name)))
}

fn optional(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.is_empty())
}

fn with_default(name: &str, default: &str) -> String {
    optional(name).unwrap_or_else(|| default.to_string())
}

fn parse_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    optional(name)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Load configuration from the environment (reads `.env` first, best-effort).
    pub fn from_env() -> Result<Self, AppError> {
        let _ = dotenvy::dotenv();

        let storage_backend = match with_default("STORAGE_BACKEND", "local").to_lowercase().as_str()
        {
            "s3" => StorageBackendKind::S3,
            _ => StorageBackendKind::Local,
        };

        let cors_origins = with_default("CORS_ORIGINS", "*")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(Config {
            server_port: parse_or("SERVER_PORT", DEFAULT_SERVER_PORT),
            cors_origins,
            environment: with_default("ENVIRONMENT", "development"),
            database_url: required("DATABASE_URL")?,
            db_max_connections: parse_or("DB_MAX_CONNECTIONS", MAX_CONNECTIONS),
            db_timeout_seconds: parse_or("DB_TIMEOUT_SECONDS", CONNECTION_TIMEOUT_SECS),
            jwt_secret: required("JWT_SECRET")?,
            openai_api_key: required("OPENAI_API_KEY")?,
            openai_base_url: with_default("OPENAI_BASE_URL", DEFAULT_OPENAI_BASE_URL),
            chat_model: with_default("CHAT_MODEL", DEFAULT_CHAT_MODEL),
            translation_model: with_default("TRANSLATION_MODEL", DEFAULT_TRANSLATION_MODEL),
            image_model: with_default("IMAGE_MODEL", DEFAULT_IMAGE_MODEL),
            runware_api_key: optional("RUNWARE_API_KEY"),
            runware_base_url: with_default("RUNWARE_BASE_URL", DEFAULT_RUNWARE_BASE_URL),
            elevenlabs_api_key: optional("ELEVENLABS_API_KEY"),
            elevenlabs_base_url: with_default("ELEVENLABS_BASE_URL", DEFAULT_ELEVENLABS_BASE_URL),
            mux_service_url: required("MUX_SERVICE_URL")?,
            stripe_webhook_secret: required("STRIPE_WEBHOOK_SECRET")?,
            storage_backend,
            local_storage_path: with_default("LOCAL_STORAGE_PATH", "./data/media"),
            local_storage_base_url: with_default(
                "LOCAL_STORAGE_BASE_URL",
                "http://localhost:3000/media",
            ),
            s3_bucket: optional("S3_BUCKET"),
            s3_region: optional("S3_REGION"),
            s3_endpoint: optional("S3_ENDPOINT"),
        })
    }

    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }
}
