//! Object-storage client for media uploads
//!
//! Uploaded audio and artwork land in S3 under a per-entity key; the public
//! URL is what gets stored on the owning row.

use anyhow::Result;
use aws_sdk_s3::{Client, primitives::ByteStream};
use tracing::info;
use uuid::Uuid;

use crate::config::StorageConfig;

/// Object-storage client
#[derive(Clone)]
pub struct StorageClient {
    s3: Client,
    bucket: String,
    public_base_url: String,
}

impl StorageClient {
    /// Create a storage client from the ambient AWS configuration.
    pub async fn new(config: &StorageConfig) -> Self {
        let aws_config = aws_config::load_from_env().await;
        let s3 = Client::new(&aws_config);

        Self {
            s3,
            bucket: config.bucket.clone(),
            public_base_url: config.public_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Upload a media file and return its public URL.
    ///
    /// Keys are namespaced by entity (`releases/<id>/artwork.jpg`,
    /// `songs/<id>/audio.mp3`) so a re-upload replaces the previous object.
    pub async fn upload(
        &self,
        prefix: &str,
        entity_id: Uuid,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String> {
        let key = format!("{}/{}/{}", prefix, entity_id, file_name);
        info!("Uploading {} bytes to s3://{}/{}", bytes.len(), self.bucket, key);

        self.s3
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .content_type(content_type)
            .body(ByteStream::from(bytes))
            .send()
            .await?;

        Ok(format!("{}/{}", self.public_base_url, key))
    }
}
