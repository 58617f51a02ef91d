//! Release and song routes, including media uploads

use axum::{
    Extension, Json, Router,
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
};
use tracing::error;
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    middleware::AuthUser,
    models::catalog::{CreateReleaseRequest, CreateSongRequest, Release, UpdateReleasePageRequest},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/releases", post(create_release))
        .route("/api/releases", get(list_releases))
        .route("/api/releases/:id", get(get_release))
        .route("/api/releases/:id", delete(delete_release))
        .route("/api/releases/:id/page/:page", put(update_release_page))
        .route("/api/releases/:id/artwork", post(upload_artwork))
        .route("/api/releases/:id/songs", post(add_song))
        .route("/api/releases/:id/songs", get(list_songs))
        .route("/api/songs/:id/audio", post(upload_audio))
        .route("/api/songs/:id", delete(delete_song))
}

async fn owned_release(state: &AppState, auth: &AuthUser, id: Uuid) -> ApiResult<Release> {
    let release = state
        .catalog_repository
        .find_release(id)
        .await
        .map_err(|e| {
            error!("Failed to load release: {}", e);
            ApiError::InternalServerError
        })?
        .ok_or(ApiError::NotFound("Release"))?;

    // Other owners' releases read as absent rather than forbidden.
    if release.owner_email != auth.email {
        return Err(ApiError::NotFound("Release"));
    }
    Ok(release)
}

/// Read one uploaded file out of a multipart body.
async fn read_upload(mut multipart: Multipart) -> ApiResult<(String, String, Vec<u8>)> {
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        ApiError::Validation(format!("Invalid multipart body: {}", e))
    })? {
        if field.file_name().is_none() {
            continue;
        }
        let file_name = field.file_name().unwrap_or("upload").to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::Validation(format!("Failed to read upload: {}", e)))?;
        return Ok((file_name, content_type, bytes.to_vec()));
    }

    Err(ApiError::Validation("No file in upload".to_string()))
}

/// Open a new release at wizard page 1
pub async fn create_release(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<CreateReleaseRequest>,
) -> ApiResult<impl IntoResponse> {
    if payload.title.trim().is_empty() || payload.artist_name.trim().is_empty() {
        return Err(ApiError::Validation(
            "title and artist_name are required".to_string(),
        ));
    }

    let release = state
        .catalog_repository
        .create_release(&auth.email, &payload)
        .await
        .map_err(|e| {
            error!("Failed to create release: {}", e);
            ApiError::InternalServerError
        })?;

    Ok((StatusCode::CREATED, Json(release)))
}

/// The caller's releases, newest first
pub async fn list_releases(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<impl IntoResponse> {
    let releases = state
        .catalog_repository
        .list_releases(&auth.email)
        .await
        .map_err(|e| {
            error!("Failed to list releases: {}", e);
            ApiError::InternalServerError
        })?;

    Ok(Json(releases))
}

/// One release with its songs
pub async fn get_release(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let release = owned_release(&state, &auth, id).await?;
    let songs = state.catalog_repository.list_songs(id).await.map_err(|e| {
        error!("Failed to list songs: {}", e);
        ApiError::InternalServerError
    })?;

    Ok(Json(serde_json::json!({
        "release": release,
        "songs": songs,
    })))
}

/// Apply one wizard page's fields
pub async fn update_release_page(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path((id, page)): Path<(Uuid, i32)>,
    Json(payload): Json<UpdateReleasePageRequest>,
) -> ApiResult<impl IntoResponse> {
    if !(1..=5).contains(&page) {
        return Err(ApiError::Validation("page must be between 1 and 5".to_string()));
    }

    // Fields from other pages are dropped, not applied.
    let patch = payload.scoped_to(page);

    let release = state
        .catalog_repository
        .update_release_page(id, &auth.email, page, &patch)
        .await
        .map_err(|e| {
            error!("Failed to update release: {}", e);
            ApiError::InternalServerError
        })?
        .ok_or(ApiError::NotFound("Release"))?;

    Ok(Json(release))
}

/// Delete a release and its songs
pub async fn delete_release(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let deleted = state
        .catalog_repository
        .delete_release(id, &auth.email)
        .await
        .map_err(|e| {
            error!("Failed to delete release: {}", e);
            ApiError::InternalServerError
        })?;

    if deleted {
        Ok(Json(serde_json::json!({"message": "Release deleted"})))
    } else {
        Err(ApiError::NotFound("Release"))
    }
}

/// Upload release artwork; stores the public URL on the release
pub async fn upload_artwork(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> ApiResult<impl IntoResponse> {
    owned_release(&state, &auth, id).await?;

    let (file_name, content_type, bytes) = read_upload(multipart).await?;
    let url = state
        .storage
        .upload("releases", id, &file_name, &content_type, bytes)
        .await
        .map_err(|e| {
            error!("Artwork upload failed: {}", e);
            ApiError::Upstream {
                status: 502,
                body: "object storage unavailable".to_string(),
            }
        })?;

    let release = state
        .catalog_repository
        .set_artwork_url(id, &auth.email, &url)
        .await
        .map_err(|e| {
            error!("Failed to store artwork URL: {}", e);
            ApiError::InternalServerError
        })?
        .ok_or(ApiError::NotFound("Release"))?;

    Ok(Json(release))
}

/// Add a song to a release
pub async fn add_song(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CreateSongRequest>,
) -> ApiResult<impl IntoResponse> {
    if payload.title.trim().is_empty() {
        return Err(ApiError::Validation("title is required".to_string()));
    }

    owned_release(&state, &auth, id).await?;

    let song = state
        .catalog_repository
        .add_song(id, &payload)
        .await
        .map_err(|e| {
            error!("Failed to add song: {}", e);
            ApiError::InternalServerError
        })?;

    Ok((StatusCode::CREATED, Json(song)))
}

/// Songs on a release, in track order
pub async fn list_songs(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    owned_release(&state, &auth, id).await?;

    let songs = state.catalog_repository.list_songs(id).await.map_err(|e| {
        error!("Failed to list songs: {}", e);
        ApiError::InternalServerError
    })?;

    Ok(Json(songs))
}

/// Upload a song's audio file; stores the public URL on the song
pub async fn upload_audio(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> ApiResult<impl IntoResponse> {
    let song = state
        .catalog_repository
        .find_song(id)
        .await
        .map_err(|e| {
            error!("Failed to load song: {}", e);
            ApiError::InternalServerError
        })?
        .ok_or(ApiError::NotFound("Song"))?;

    owned_release(&state, &auth, song.release_id).await?;

    let (file_name, content_type, bytes) = read_upload(multipart).await?;
    let url = state
        .storage
        .upload("songs", id, &file_name, &content_type, bytes)
        .await
        .map_err(|e| {
            error!("Audio upload failed: {}", e);
            ApiError::Upstream {
                status: 502,
                body: "object storage unavailable".to_string(),
            }
        })?;

    let song = state
        .catalog_repository
        .set_song_audio_url(id, &url)
        .await
        .map_err(|e| {
            error!("Failed to store audio URL: {}", e);
            ApiError::InternalServerError
        })?
        .ok_or(ApiError::NotFound("Song"))?;

    Ok(Json(song))
}

/// Delete a song
pub async fn delete_song(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let song = state
        .catalog_repository
        .find_song(id)
        .await
        .map_err(|e| {
            error!("Failed to load song: {}", e);
            ApiError::InternalServerError
        })?
        .ok_or(ApiError::NotFound("Song"))?;

    owned_release(&state, &auth, song.release_id).await?;

    state.catalog_repository.delete_song(id).await.map_err(|e| {
        error!("Failed to delete song: {}", e);
        ApiError::InternalServerError
    })?;

    Ok(Json(serde_json::json!({"message": "Song deleted"})))
}
