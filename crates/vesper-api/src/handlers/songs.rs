//! Copyright-free songs

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    response::IntoResponse,
    Json,
};
use vesper_core::models::{
    AuthUser, CreateSongRequest, Song, SongDownload, SongListQuery, SortOrder, UpdateSongRequest,
};
use vesper_core::AppError;
use vesper_db::{ColumnValues, Condition, ResourceTable};

use crate::auth::{CurrentUser, MaybeUser};
use crate::controller::{non_blank, parse_uuid, set_if_present, Access, Resource};
use crate::error::{ErrorResponse, HttpAppError};
use crate::response::{message, paginated, ApiResponse};
use crate::state::AppState;

pub struct Songs;

impl ResourceTable for Songs {
    type Record = Song;

    const TABLE: &'static str = "songs";
    const COLUMNS: &'static str =
        "id, title, artist, genre, license, audio_url, duration_seconds, download_count, created_at";
    const SEARCHABLE: &'static [&'static str] = &["title", "artist"];
    const SORTABLE: &'static [&'static str] =
        &["title", "artist", "download_count", "created_at"];
    const DEFAULT_SORT: &'static str = "created_at";
    const DEFAULT_ORDER: SortOrder = SortOrder::Desc;
}

impl Resource for Songs {
    const NAME: &'static str = "Song";
    const CREATE_ACCESS: Access = Access::Admin;
    const MUTATE_ACCESS: Access = Access::Admin;

    type Create = CreateSongRequest;
    type Update = UpdateSongRequest;
    type Query = SongListQuery;
    type Output = Song;

    fn filters_from_query(
        query: &SongListQuery,
        _viewer: Option<&AuthUser>,
    ) -> Result<Vec<Condition>, AppError> {
        let mut conditions = Vec::new();
        if let Some(genre) = non_blank(query.genre.as_deref()) {
            conditions.push(Condition::eq("genre", genre));
        }
        if let Some(license) = non_blank(query.license.as_deref()) {
            conditions.push(Condition::eq("license", license));
        }
        Ok(conditions)
    }

    fn present(record: Song, _viewer: Option<&AuthUser>) -> Song {
        record
    }

    fn before_save(input: CreateSongRequest, _user: &AuthUser) -> Result<ColumnValues, AppError> {
        Ok(vec![
            ("title", input.title.trim().into()),
            ("artist", input.artist.into()),
            ("genre", input.genre.into()),
            ("license", input.license.trim().into()),
            ("audio_url", input.audio_url.into()),
            ("duration_seconds", input.duration_seconds.into()),
        ])
    }

    fn before_update(
        input: UpdateSongRequest,
        _existing: &Song,
        _user: &AuthUser,
    ) -> Result<ColumnValues, AppError> {
        let mut values = ColumnValues::new();
        set_if_present(&mut values, "title", input.title);
        set_if_present(&mut values, "artist", input.artist);
        set_if_present(&mut values, "genre", input.genre);
        set_if_present(&mut values, "license", input.license);
        set_if_present(&mut values, "audio_url", input.audio_url);
        set_if_present(&mut values, "duration_seconds", input.duration_seconds);
        Ok(values)
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/songs",
    tag = "songs",
    params(SongListQuery),
    responses(
        (status = 200, description = "Paginated songs"),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn list_songs(
    State(state): State<Arc<AppState>>,
    MaybeUser(viewer): MaybeUser,
    Query(query): Query<SongListQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    let page = state
        .resource::<Songs>()
        .get_list(&query, viewer.as_ref())
        .await?;
    Ok(paginated(page))
}

#[utoipa::path(
    get,
    path = "/api/v1/songs/{id}",
    tag = "songs",
    params(("id" = Uuid, Path, description = "Song ID")),
    responses(
        (status = 200, description = "Song found", body = Song),
        (status = 404, description = "Song not found", body = ErrorResponse)
    )
)]
pub async fn get_song(
    State(state): State<Arc<AppState>>,
    MaybeUser(viewer): MaybeUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HttpAppError> {
    let song = state
        .resource::<Songs>()
        .get_by_id(&id, viewer.as_ref())
        .await?;
    Ok(ApiResponse::ok(song))
}

#[utoipa::path(
    post,
    path = "/api/v1/songs",
    tag = "songs",
    request_body = CreateSongRequest,
    responses(
        (status = 201, description = "Song created", body = Song),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 403, description = "Admin access required", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_song(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    payload: Result<Json<CreateSongRequest>, JsonRejection>,
) -> Result<impl IntoResponse, HttpAppError> {
    let Json(input) = payload?;
    let song = state
        .resource::<Songs>()
        .create(&state, input, &user)
        .await?;
    Ok(ApiResponse::created(song).with_message("Song created"))
}

#[utoipa::path(
    put,
    path = "/api/v1/songs/{id}",
    tag = "songs",
    params(("id" = Uuid, Path, description = "Song ID")),
    request_body = UpdateSongRequest,
    responses(
        (status = 200, description = "Song updated", body = Song),
        (status = 403, description = "Admin access required", body = ErrorResponse),
        (status = 404, description = "Song not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_song(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    payload: Result<Json<UpdateSongRequest>, JsonRejection>,
) -> Result<impl IntoResponse, HttpAppError> {
    let Json(input) = payload?;
    let song = state
        .resource::<Songs>()
        .update(&state, &id, input, &user)
        .await?;
    Ok(ApiResponse::ok(song).with_message("Song updated"))
}

#[utoipa::path(
    delete,
    path = "/api/v1/songs/{id}",
    tag = "songs",
    params(("id" = Uuid, Path, description = "Song ID")),
    responses(
        (status = 200, description = "Song deleted"),
        (status = 404, description = "Song not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_song(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HttpAppError> {
    let id = state.resource::<Songs>().delete(&state, &id, &user).await?;
    Ok(message(id, "Song deleted"))
}

/// Count a download and hand back the audio URL. Public; no account needed.
#[utoipa::path(
    post,
    path = "/api/v1/songs/{id}/download",
    tag = "songs",
    params(("id" = Uuid, Path, description = "Song ID")),
    responses(
        (status = 200, description = "Download recorded", body = SongDownload),
        (status = 404, description = "Song not found", body = ErrorResponse)
    )
)]
pub async fn download_song(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HttpAppError> {
    let id = parse_uuid(&id)?;
    let download = state
        .content
        .songs
        .record_download(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Song not found".to_string()))?;
    Ok(ApiResponse::ok(download))
}
