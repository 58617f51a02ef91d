//! Catalog repository: releases and songs

use anyhow::Result;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::models::catalog::{
    CreateReleaseRequest, CreateSongRequest, Release, Song, UpdateReleasePageRequest,
};

/// Catalog repository
#[derive(Clone)]
pub struct CatalogRepository {
    pool: PgPool,
}

impl CatalogRepository {
    /// Create a new catalog repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a new release at wizard page 1.
    pub async fn create_release(
        &self,
        owner_email: &str,
        request: &CreateReleaseRequest,
    ) -> Result<Release> {
        info!("Creating release '{}' for {}", request.title, owner_email);

        let release = sqlx::query_as::<_, Release>(
            r#"
            INSERT INTO releases (owner_email, title, artist_name, page)
            VALUES ($1, $2, $3, 1)
            RETURNING *
            "#,
        )
        .bind(owner_email)
        .bind(&request.title)
        .bind(&request.artist_name)
        .fetch_one(&self.pool)
        .await?;

        Ok(release)
    }

    /// Find a release by ID.
    pub async fn find_release(&self, id: Uuid) -> Result<Option<Release>> {
        let release = sqlx::query_as::<_, Release>("SELECT * FROM releases WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(release)
    }

    /// All releases owned by a user, newest first.
    pub async fn list_releases(&self, owner_email: &str) -> Result<Vec<Release>> {
        let releases = sqlx::query_as::<_, Release>(
            "SELECT * FROM releases WHERE owner_email = $1 ORDER BY created_at DESC",
        )
        .bind(owner_email)
        .fetch_all(&self.pool)
        .await?;

        Ok(releases)
    }

    /// Apply a wizard patch and advance the page cursor.
    ///
    /// Callers scope the patch to one page's fields first. The cursor never
    /// moves backwards; re-submitting an earlier page only patches its
    /// fields.
    pub async fn update_release_page(
        &self,
        id: Uuid,
        owner_email: &str,
        page: i32,
        patch: &UpdateReleasePageRequest,
    ) -> Result<Option<Release>> {
        let release = sqlx::query_as::<_, Release>(
            r#"
            UPDATE releases
            SET title = COALESCE($4, title),
                artist_name = COALESCE($5, artist_name),
                genre = COALESCE($6, genre),
                release_date = COALESCE($7, release_date),
                label = COALESCE($8, label),
                upc = COALESCE($9, upc),
                page = GREATEST(page, $3),
                updated_at = now()
            WHERE id = $1 AND owner_email = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(owner_email)
        .bind(page)
        .bind(&patch.title)
        .bind(&patch.artist_name)
        .bind(&patch.genre)
        .bind(patch.release_date)
        .bind(&patch.label)
        .bind(&patch.upc)
        .fetch_optional(&self.pool)
        .await?;

        Ok(release)
    }

    /// Store the artwork URL returned by object storage.
    pub async fn set_artwork_url(
        &self,
        id: Uuid,
        owner_email: &str,
        url: &str,
    ) -> Result<Option<Release>> {
        let release = sqlx::query_as::<_, Release>(
            r#"
            UPDATE releases
            SET artwork_url = $3, updated_at = now()
            WHERE id = $1 AND owner_email = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(owner_email)
        .bind(url)
        .fetch_optional(&self.pool)
        .await?;

        Ok(release)
    }

    /// Delete a release and its songs.
    pub async fn delete_release(&self, id: Uuid, owner_email: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM releases WHERE id = $1 AND owner_email = $2")
            .bind(id)
            .bind(owner_email)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Add a song to a release.
    pub async fn add_song(&self, release_id: Uuid, request: &CreateSongRequest) -> Result<Song> {
        info!("Adding song '{}' to release {}", request.title, release_id);

        let song = sqlx::query_as::<_, Song>(
            r#"
            INSERT INTO songs (release_id, title, isrc, explicit, duration_secs, track_number)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(release_id)
        .bind(&request.title)
        .bind(&request.isrc)
        .bind(request.explicit)
        .bind(request.duration_secs)
        .bind(request.track_number)
        .fetch_one(&self.pool)
        .await?;

        Ok(song)
    }

    /// Songs on a release, in track order.
    pub async fn list_songs(&self, release_id: Uuid) -> Result<Vec<Song>> {
        let songs = sqlx::query_as::<_, Song>(
            "SELECT * FROM songs WHERE release_id = $1 ORDER BY track_number NULLS LAST, created_at",
        )
        .bind(release_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(songs)
    }

    /// Find a song by ID.
    pub async fn find_song(&self, id: Uuid) -> Result<Option<Song>> {
        let song = sqlx::query_as::<_, Song>("SELECT * FROM songs WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(song)
    }

    /// Store the audio URL returned by object storage.
    pub async fn set_song_audio_url(&self, id: Uuid, url: &str) -> Result<Option<Song>> {
        let song = sqlx::query_as::<_, Song>(
            "UPDATE songs SET audio_url = $2 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(url)
        .fetch_optional(&self.pool)
        .await?;

        Ok(song)
    }

    /// Delete a song.
    pub async fn delete_song(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM songs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
