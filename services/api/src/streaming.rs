//! Streaming-platform API client
//!
//! Obtains short-lived bearer credentials through the OAuth2
//! client-credentials grant, then calls the platform's catalog endpoints.
//! Tokens are fetched per call; the platform's token endpoint is cheap and
//! the ingestion endpoints are hit rarely.

use anyhow::Result;
use oauth2::{
    AuthUrl, ClientId, ClientSecret, TokenResponse, TokenUrl, basic::BasicClient,
};
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::{error, info};

use crate::config::StreamingConfig;

/// Error from the streaming API boundary.
#[derive(Error, Debug)]
pub enum StreamingError {
    /// The client-credentials exchange failed.
    #[error("token exchange failed: {0}")]
    TokenExchange(String),

    /// The platform answered with a non-success status; body attached.
    #[error("streaming API returned {status}: {body}")]
    Api { status: u16, body: String },

    /// The request never completed.
    #[error("streaming API transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

/// A track as returned by the platform's top-tracks endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct TopTrack {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub duration_ms: i64,
    #[serde(default)]
    pub popularity: i32,
}

#[derive(Debug, Deserialize)]
struct TopTracksResponse {
    tracks: Vec<TopTrack>,
}

/// HTTP client for the streaming platform.
#[derive(Clone)]
pub struct StreamingClient {
    http: Client,
    oauth: BasicClient,
    api_base_url: String,
}

impl StreamingClient {
    /// Create a new streaming client.
    pub fn new(config: &StreamingConfig) -> Result<Self> {
        // The client-credentials grant never redirects a user, so the token
        // URL doubles as the (unused) auth URL.
        let oauth = BasicClient::new(
            ClientId::new(config.client_id.clone()),
            Some(ClientSecret::new(config.client_secret.clone())),
            AuthUrl::new(config.token_url.clone())?,
            Some(TokenUrl::new(config.token_url.clone())?),
        );

        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http,
            oauth,
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Exchange client credentials for a short-lived access token.
    ///
    /// The exchange is driven through the shared HTTP client so the token
    /// call carries the same 30 second timeout as every other outbound
    /// request.
    async fn access_token(&self) -> Result<String, StreamingError> {
        let http = self.http.clone();
        let token = self
            .oauth
            .exchange_client_credentials()
            .request_async(move |request| {
                let http = http.clone();
                async move { proxy_token_request(&http, request).await }
            })
            .await
            .map_err(|e| StreamingError::TokenExchange(e.to_string()))?;

        Ok(token.access_token().secret().clone())
    }

    /// Fetch an artist's top tracks.
    pub async fn artist_top_tracks(&self, artist_id: &str) -> Result<Vec<TopTrack>, StreamingError> {
        info!("Fetching top tracks for artist {}", artist_id);

        let token = self.access_token().await?;
        let response = self
            .http
            .get(format!(
                "{}/artists/{}/top-tracks",
                self.api_base_url, artist_id
            ))
            .query(&[("market", "US")])
            .bearer_auth(&token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await?;
            error!("Top tracks fetch failed with {}: {}", status, body);
            return Err(StreamingError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: TopTracksResponse = response.json().await?;
        Ok(parsed.tracks)
    }

    /// Search artists by name; returns the platform's raw JSON.
    pub async fn search_artists(&self, query: &str) -> Result<serde_json::Value, StreamingError> {
        let token = self.access_token().await?;
        let response = self
            .http
            .get(format!("{}/search", self.api_base_url))
            .query(&[("q", query), ("type", "artist")])
            .bearer_auth(&token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await?;
            return Err(StreamingError::Api {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json().await?)
    }
}

/// Drive one OAuth2 wire request through the given reqwest client.
async fn proxy_token_request(
    http: &Client,
    request: oauth2::HttpRequest,
) -> Result<oauth2::HttpResponse, StreamingError> {
    let method = reqwest::Method::from_bytes(request.method.as_str().as_bytes())
        .map_err(|e| StreamingError::TokenExchange(e.to_string()))?;

    let mut builder = http.request(method, request.url.as_str());
    for (name, value) in &request.headers {
        builder = builder.header(name.as_str(), value.as_bytes());
    }

    let response = builder.body(request.body).send().await?;

    let status_code = oauth2::http::StatusCode::from_u16(response.status().as_u16())
        .map_err(|e| StreamingError::TokenExchange(e.to_string()))?;
    let mut headers = oauth2::http::HeaderMap::new();
    for (name, value) in response.headers() {
        if let (Ok(name), Ok(value)) = (
            oauth2::http::header::HeaderName::from_bytes(name.as_str().as_bytes()),
            oauth2::http::header::HeaderValue::from_bytes(value.as_bytes()),
        ) {
            headers.insert(name, value);
        }
    }
    let body = response.bytes().await?.to_vec();

    Ok(oauth2::HttpResponse {
        status_code,
        headers,
        body,
    })
}
