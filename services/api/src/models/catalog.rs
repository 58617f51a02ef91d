//! Release and song models
//!
//! Releases are filled in over several wizard pages; `page` tracks how far
//! the owner has gotten. Songs reference their release by id.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Release entity
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Release {
    pub id: Uuid,
    pub owner_email: String,
    pub title: String,
    pub artist_name: String,
    pub genre: Option<String>,
    pub release_date: Option<NaiveDate>,
    pub label: Option<String>,
    pub upc: Option<String>,
    pub artwork_url: Option<String>,
    /// Last completed wizard page.
    pub page: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Song entity, belonging to a release
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Song {
    pub id: Uuid,
    pub release_id: Uuid,
    pub title: String,
    pub isrc: Option<String>,
    pub explicit: bool,
    pub audio_url: Option<String>,
    pub duration_secs: Option<i32>,
    pub track_number: Option<i32>,
    pub created_at: DateTime<Utc>,
}

/// Payload to open a new release (wizard page 1).
#[derive(Debug, Deserialize)]
pub struct CreateReleaseRequest {
    pub title: String,
    pub artist_name: String,
}

/// Per-page patch; only fields belonging to the submitted page are applied.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateReleasePageRequest {
    pub title: Option<String>,
    pub artist_name: Option<String>,
    pub genre: Option<String>,
    pub release_date: Option<NaiveDate>,
    pub label: Option<String>,
    pub upc: Option<String>,
}

impl UpdateReleasePageRequest {
    /// Restrict the patch to the fields belonging to one wizard page.
    ///
    /// Page 1 carries the identity fields, page 2 genre and release date,
    /// page 3 label and codes. Pages 4 and 5 (artwork, tracklist) carry no
    /// text fields and only advance the cursor.
    pub fn scoped_to(&self, page: i32) -> UpdateReleasePageRequest {
        let mut scoped = UpdateReleasePageRequest::default();
        match page {
            1 => {
                scoped.title = self.title.clone();
                scoped.artist_name = self.artist_name.clone();
            }
            2 => {
                scoped.genre = self.genre.clone();
                scoped.release_date = self.release_date;
            }
            3 => {
                scoped.label = self.label.clone();
                scoped.upc = self.upc.clone();
            }
            _ => {}
        }
        scoped
    }
}

/// Payload to add a song to a release.
#[derive(Debug, Deserialize)]
pub struct CreateSongRequest {
    pub title: String,
    pub isrc: Option<String>,
    #[serde(default)]
    pub explicit: bool,
    pub duration_secs: Option<i32>,
    pub track_number: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_patch() -> UpdateReleasePageRequest {
        UpdateReleasePageRequest {
            title: Some("Midnight Tapes".to_string()),
            artist_name: Some("Ada".to_string()),
            genre: Some("Afrobeats".to_string()),
            release_date: NaiveDate::from_ymd_opt(2026, 3, 1),
            label: Some("Wavehouse".to_string()),
            upc: Some("123456789012".to_string()),
        }
    }

    #[test]
    fn test_page_patch_only_carries_its_own_fields() {
        let scoped = full_patch().scoped_to(2);
        assert!(scoped.title.is_none());
        assert!(scoped.artist_name.is_none());
        assert_eq!(scoped.genre.as_deref(), Some("Afrobeats"));
        assert!(scoped.release_date.is_some());
        assert!(scoped.label.is_none());
        assert!(scoped.upc.is_none());
    }

    #[test]
    fn test_cursor_only_pages_carry_no_fields() {
        for page in [4, 5] {
            let scoped = full_patch().scoped_to(page);
            assert!(scoped.title.is_none());
            assert!(scoped.genre.is_none());
            assert!(scoped.release_date.is_none());
            assert!(scoped.label.is_none());
        }
    }
}
