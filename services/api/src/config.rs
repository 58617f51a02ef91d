//! Process configuration
//!
//! Every external collaborator gets its own config struct with a `from_env`
//! constructor, loaded once in `main` and handed to the owning client.
//! Nothing re-reads the environment after startup.

use anyhow::Result;
use std::env;

/// Transfer gateway credentials and endpoint.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub base_url: String,
    pub secret_key: String,
}

impl GatewayConfig {
    pub fn from_env() -> Result<Self> {
        let base_url = env::var("GATEWAY_BASE_URL")
            .unwrap_or_else(|_| "https://api.flutterwave.com/v3".to_string());
        let secret_key = env::var("GATEWAY_SECRET_KEY")
            .map_err(|_| anyhow::anyhow!("GATEWAY_SECRET_KEY environment variable not set"))?;

        Ok(Self {
            base_url,
            secret_key,
        })
    }
}

/// Streaming-platform API credentials (client-credentials OAuth2).
#[derive(Debug, Clone)]
pub struct StreamingConfig {
    pub client_id: String,
    pub client_secret: String,
    pub token_url: String,
    pub api_base_url: String,
}

impl StreamingConfig {
    pub fn from_env() -> Result<Self> {
        let client_id = env::var("STREAMING_CLIENT_ID")
            .map_err(|_| anyhow::anyhow!("STREAMING_CLIENT_ID environment variable not set"))?;
        let client_secret = env::var("STREAMING_CLIENT_SECRET").map_err(|_| {
            anyhow::anyhow!("STREAMING_CLIENT_SECRET environment variable not set")
        })?;
        let token_url = env::var("STREAMING_TOKEN_URL")
            .unwrap_or_else(|_| "https://accounts.spotify.com/api/token".to_string());
        let api_base_url = env::var("STREAMING_API_BASE_URL")
            .unwrap_or_else(|_| "https://api.spotify.com/v1".to_string());

        Ok(Self {
            client_id,
            client_secret,
            token_url,
            api_base_url,
        })
    }
}

/// SMTP relay settings.
#[derive(Debug, Clone)]
pub struct MailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: String,
    /// From address on outgoing mail.
    pub mail_from: String,
    /// Where contact-form messages are delivered.
    pub contact_inbox: String,
}

impl MailConfig {
    pub fn from_env() -> Result<Self> {
        let smtp_host = env::var("SMTP_HOST")
            .map_err(|_| anyhow::anyhow!("SMTP_HOST environment variable not set"))?;
        let smtp_port = env::var("SMTP_PORT")
            .unwrap_or_else(|_| "587".to_string())
            .parse()
            .unwrap_or(587);
        let smtp_username = env::var("SMTP_USERNAME")
            .map_err(|_| anyhow::anyhow!("SMTP_USERNAME environment variable not set"))?;
        let smtp_password = env::var("SMTP_PASSWORD")
            .map_err(|_| anyhow::anyhow!("SMTP_PASSWORD environment variable not set"))?;
        let mail_from =
            env::var("MAIL_FROM").unwrap_or_else(|_| "no-reply@wavehouse.io".to_string());
        let contact_inbox =
            env::var("CONTACT_INBOX").unwrap_or_else(|_| "support@wavehouse.io".to_string());

        Ok(Self {
            smtp_host,
            smtp_port,
            smtp_username,
            smtp_password,
            mail_from,
            contact_inbox,
        })
    }
}

/// Object-storage settings for media uploads.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub bucket: String,
    /// Base URL media keys are appended to when building public URLs.
    pub public_base_url: String,
}

impl StorageConfig {
    pub fn from_env() -> Result<Self> {
        let bucket = env::var("S3_BUCKET")
            .map_err(|_| anyhow::anyhow!("S3_BUCKET environment variable not set"))?;
        let public_base_url = env::var("S3_PUBLIC_BASE_URL")
            .unwrap_or_else(|_| format!("https://{}.s3.amazonaws.com", bucket));

        Ok(Self {
            bucket,
            public_base_url,
        })
    }
}

/// HTTP server settings.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .unwrap_or(3000);

        Ok(Self { port })
    }
}
