//! Hymnal: public reads, admin-only writes

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    response::IntoResponse,
    Json,
};
use vesper_core::models::{
    AuthUser, CreateHymnRequest, Hymn, HymnListQuery, SortOrder, UpdateHymnRequest,
};
use vesper_core::AppError;
use vesper_db::{ColumnValues, Condition, ResourceTable};

use crate::auth::{CurrentUser, MaybeUser};
use crate::controller::{non_blank, set_if_present, Access, Resource};
use crate::error::{ErrorResponse, HttpAppError};
use crate::response::{message, paginated, ApiResponse};
use crate::state::AppState;

pub struct Hymns;

impl ResourceTable for Hymns {
    type Record = Hymn;

    const TABLE: &'static str = "hymns";
    const COLUMNS: &'static str = "id, number, title, author, category, lyrics, tune, created_at";
    const SEARCHABLE: &'static [&'static str] = &["title", "author", "lyrics"];
    const SORTABLE: &'static [&'static str] = &["number", "title", "author", "created_at"];
    const DEFAULT_SORT: &'static str = "number";
    const DEFAULT_ORDER: SortOrder = SortOrder::Asc;
}

impl Resource for Hymns {
    const NAME: &'static str = "Hymn";
    const CREATE_ACCESS: Access = Access::Admin;
    const MUTATE_ACCESS: Access = Access::Admin;

    type Create = CreateHymnRequest;
    type Update = UpdateHymnRequest;
    type Query = HymnListQuery;
    type Output = Hymn;

    fn filters_from_query(
        query: &HymnListQuery,
        _viewer: Option<&AuthUser>,
    ) -> Result<Vec<Condition>, AppError> {
        Ok(non_blank(query.category.as_deref())
            .map(|category| Condition::eq("category", category))
            .into_iter()
            .collect())
    }

    fn present(record: Hymn, _viewer: Option<&AuthUser>) -> Hymn {
        record
    }

    fn before_save(input: CreateHymnRequest, _user: &AuthUser) -> Result<ColumnValues, AppError> {
        Ok(vec![
            ("number", input.number.into()),
            ("title", input.title.trim().into()),
            ("author", input.author.into()),
            ("category", input.category.into()),
            ("lyrics", input.lyrics.into()),
            ("tune", input.tune.into()),
        ])
    }

    fn before_update(
        input: UpdateHymnRequest,
        _existing: &Hymn,
        _user: &AuthUser,
    ) -> Result<ColumnValues, AppError> {
        let mut values = ColumnValues::new();
        set_if_present(&mut values, "number", input.number);
        set_if_present(&mut values, "title", input.title);
        set_if_present(&mut values, "author", input.author);
        set_if_present(&mut values, "category", input.category);
        set_if_present(&mut values, "lyrics", input.lyrics);
        set_if_present(&mut values, "tune", input.tune);
        Ok(values)
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/hymns",
    tag = "hymns",
    params(HymnListQuery),
    responses(
        (status = 200, description = "Paginated hymns"),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn list_hymns(
    State(state): State<Arc<AppState>>,
    MaybeUser(viewer): MaybeUser,
    Query(query): Query<HymnListQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    let page = state
        .resource::<Hymns>()
        .get_list(&query, viewer.as_ref())
        .await?;
    Ok(paginated(page))
}

#[utoipa::path(
    get,
    path = "/api/v1/hymns/{id}",
    tag = "hymns",
    params(("id" = Uuid, Path, description = "Hymn ID")),
    responses(
        (status = 200, description = "Hymn found", body = Hymn),
        (status = 400, description = "Malformed id", body = ErrorResponse),
        (status = 404, description = "Hymn not found", body = ErrorResponse)
    )
)]
pub async fn get_hymn(
    State(state): State<Arc<AppState>>,
    MaybeUser(viewer): MaybeUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HttpAppError> {
    let hymn = state
        .resource::<Hymns>()
        .get_by_id(&id, viewer.as_ref())
        .await?;
    Ok(ApiResponse::ok(hymn))
}

#[utoipa::path(
    post,
    path = "/api/v1/hymns",
    tag = "hymns",
    request_body = CreateHymnRequest,
    responses(
        (status = 201, description = "Hymn created", body = Hymn),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 401, description = "Authentication required", body = ErrorResponse),
        (status = 403, description = "Admin access required", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_hymn(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    payload: Result<Json<CreateHymnRequest>, JsonRejection>,
) -> Result<impl IntoResponse, HttpAppError> {
    let Json(input) = payload?;
    let hymn = state
        .resource::<Hymns>()
        .create(&state, input, &user)
        .await?;
    Ok(ApiResponse::created(hymn).with_message("Hymn created"))
}

#[utoipa::path(
    put,
    path = "/api/v1/hymns/{id}",
    tag = "hymns",
    params(("id" = Uuid, Path, description = "Hymn ID")),
    request_body = UpdateHymnRequest,
    responses(
        (status = 200, description = "Hymn updated", body = Hymn),
        (status = 403, description = "Admin access required", body = ErrorResponse),
        (status = 404, description = "Hymn not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_hymn(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    payload: Result<Json<UpdateHymnRequest>, JsonRejection>,
) -> Result<impl IntoResponse, HttpAppError> {
    let Json(input) = payload?;
    let hymn = state
        .resource::<Hymns>()
        .update(&state, &id, input, &user)
        .await?;
    Ok(ApiResponse::ok(hymn).with_message("Hymn updated"))
}

#[utoipa::path(
    delete,
    path = "/api/v1/hymns/{id}",
    tag = "hymns",
    params(("id" = Uuid, Path, description = "Hymn ID")),
    responses(
        (status = 200, description = "Hymn deleted"),
        (status = 403, description = "Admin access required", body = ErrorResponse),
        (status = 404, description = "Hymn not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_hymn(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HttpAppError> {
    let id = state.resource::<Hymns>().delete(&state, &id, &user).await?;
    Ok(message(id, "Hymn deleted"))
}
