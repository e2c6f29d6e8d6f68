//! Churches and places of worship

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    response::IntoResponse,
    Json,
};
use vesper_core::models::{
    AuthUser, Church, ChurchListQuery, ChurchWithDistance, CreateChurchRequest, NearbyQuery,
    SortOrder, UpdateChurchRequest, DEFAULT_NEARBY_RADIUS_KM, DEFAULT_PAGE_LIMIT,
    MAX_NEARBY_RADIUS_KM, MAX_PAGE_LIMIT,
};
use vesper_core::AppError;
use vesper_db::{ColumnValues, Condition, ResourceTable};
use vesper_services::{get_or_set, CacheClass, CacheKey};

use crate::auth::{CurrentUser, MaybeUser};
use crate::controller::{non_blank, set_if_present, Access, ListQuery, Resource};
use crate::error::{ErrorResponse, HttpAppError};
use crate::response::{message, paginated, ApiResponse};
use crate::state::AppState;

pub struct Churches;

impl ResourceTable for Churches {
    type Record = Church;

    const TABLE: &'static str = "churches";
    const COLUMNS: &'static str = "id, name, denomination, address, city, country, latitude, \
        longitude, phone, website, service_times, created_at";
    const SEARCHABLE: &'static [&'static str] = &["name", "address", "city"];
    const SORTABLE: &'static [&'static str] = &["name", "city", "country", "created_at"];
    const DEFAULT_SORT: &'static str = "name";
    const DEFAULT_ORDER: SortOrder = SortOrder::Asc;
}

async fn invalidate_listings(state: &AppState) {
    state
        .cache
        .invalidate(CacheClass::ChurchListing.prefix())
        .await;
}

#[async_trait]
impl Resource for Churches {
    const NAME: &'static str = "Church";
    const CREATE_ACCESS: Access = Access::Admin;
    const MUTATE_ACCESS: Access = Access::Admin;

    type Create = CreateChurchRequest;
    type Update = UpdateChurchRequest;
    type Query = ChurchListQuery;
    type Output = Church;

    fn filters_from_query(
        query: &ChurchListQuery,
        _viewer: Option<&AuthUser>,
    ) -> Result<Vec<Condition>, AppError> {
        let mut conditions = Vec::new();
        if let Some(city) = non_blank(query.city.as_deref()) {
            conditions.push(Condition::eq_ignore_case("city", city));
        }
        if let Some(country) = non_blank(query.country.as_deref()) {
            conditions.push(Condition::eq_ignore_case("country", country));
        }
        if let Some(denomination) = non_blank(query.denomination.as_deref()) {
            conditions.push(Condition::eq_ignore_case("denomination", denomination));
        }
        Ok(conditions)
    }

    fn present(record: Church, _viewer: Option<&AuthUser>) -> Church {
        record
    }

    fn before_save(input: CreateChurchRequest, _user: &AuthUser) -> Result<ColumnValues, AppError> {
        Ok(vec![
            ("name", input.name.trim().into()),
            ("denomination", input.denomination.into()),
            ("address", input.address.into()),
            ("city", input.city.into()),
            ("country", input.country.into()),
            ("latitude", input.latitude.into()),
            ("longitude", input.longitude.into()),
            ("phone", input.phone.into()),
            ("website", input.website.into()),
            ("service_times", input.service_times.into()),
        ])
    }

    async fn after_save(state: &AppState, _record: &Church, _user: &AuthUser) -> anyhow::Result<()> {
        invalidate_listings(state).await;
        Ok(())
    }

    fn before_update(
        input: UpdateChurchRequest,
        _existing: &Church,
        _user: &AuthUser,
    ) -> Result<ColumnValues, AppError> {
        let mut values = ColumnValues::new();
        set_if_present(&mut values, "name", input.name);
        set_if_present(&mut values, "denomination", input.denomination);
        set_if_present(&mut values, "address", input.address);
        set_if_present(&mut values, "city", input.city);
        set_if_present(&mut values, "country", input.country);
        set_if_present(&mut values, "latitude", input.latitude);
        set_if_present(&mut values, "longitude", input.longitude);
        set_if_present(&mut values, "phone", input.phone);
        set_if_present(&mut values, "website", input.website);
        set_if_present(&mut values, "service_times", input.service_times);
        Ok(values)
    }

    async fn after_update(
        state: &AppState,
        _record: &Church,
        _user: &AuthUser,
    ) -> anyhow::Result<()> {
        invalidate_listings(state).await;
        Ok(())
    }

    async fn after_delete(
        state: &AppState,
        _existing: &Church,
        _user: &AuthUser,
    ) -> anyhow::Result<()> {
        invalidate_listings(state).await;
        Ok(())
    }
}

/// Every parameter that changes the listing, in a fixed order
fn listing_cache_key(query: &ChurchListQuery) -> CacheKey {
    let page = query.page_request();
    CacheKey::new(
        CacheClass::ChurchListing,
        [
            page.page.to_string(),
            page.limit.to_string(),
            query.search.clone().unwrap_or_default(),
            query.city.clone().unwrap_or_default(),
            query.country.clone().unwrap_or_default(),
            query.denomination.clone().unwrap_or_default(),
            query.sort.clone().unwrap_or_default(),
            query.order.clone().unwrap_or_default(),
        ],
    )
}

/// Validated nearby search parameters
#[derive(Debug, Clone, Copy, PartialEq)]
struct NearbySearch {
    lat: f64,
    lng: f64,
    radius_km: f64,
    limit: i64,
}

impl NearbySearch {
    fn from_query(query: &NearbyQuery) -> Result<Self, AppError> {
        let (lat, lng) = match (query.lat, query.lng) {
            (Some(lat), Some(lng)) => (lat, lng),
            _ => {
                return Err(AppError::InvalidInput(
                    "lat and lng are required".to_string(),
                ))
            }
        };
        if !(-90.0..=90.0).contains(&lat) {
            return Err(AppError::InvalidInput(
                "lat must be between -90 and 90".to_string(),
            ));
        }
        if !(-180.0..=180.0).contains(&lng) {
            return Err(AppError::InvalidInput(
                "lng must be between -180 and 180".to_string(),
            ));
        }
        let radius_km = query.radius_km.unwrap_or(DEFAULT_NEARBY_RADIUS_KM);
        if !radius_km.is_finite() || radius_km <= 0.0 {
            return Err(AppError::InvalidInput(
                "radius_km must be positive".to_string(),
            ));
        }
        Ok(Self {
            lat,
            lng,
            radius_km: radius_km.min(MAX_NEARBY_RADIUS_KM),
            limit: query
                .limit
                .unwrap_or(DEFAULT_PAGE_LIMIT)
                .clamp(1, MAX_PAGE_LIMIT),
        })
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/churches",
    tag = "churches",
    params(ChurchListQuery),
    responses(
        (status = 200, description = "Paginated churches"),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn list_churches(
    State(state): State<Arc<AppState>>,
    MaybeUser(viewer): MaybeUser,
    Query(query): Query<ChurchListQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    let key = listing_cache_key(&query);
    let controller = state.resource::<Churches>();
    let page = get_or_set(state.cache.as_ref(), &key, || {
        controller.get_list(&query, viewer.as_ref())
    })
    .await?;
    Ok(paginated(page))
}

#[utoipa::path(
    get,
    path = "/api/v1/churches/nearby",
    tag = "churches",
    params(NearbyQuery),
    responses(
        (status = 200, description = "Churches nearest first", body = [ChurchWithDistance]),
        (status = 400, description = "Missing or out-of-range coordinates", body = ErrorResponse)
    )
)]
pub async fn nearby_churches(
    State(state): State<Arc<AppState>>,
    Query(query): Query<NearbyQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    let search = NearbySearch::from_query(&query)?;
    let churches = state
        .content
        .churches
        .nearby(search.lat, search.lng, search.radius_km, search.limit)
        .await?;
    Ok(ApiResponse::ok(churches))
}

#[utoipa::path(
    get,
    path = "/api/v1/churches/{id}",
    tag = "churches",
    params(("id" = Uuid, Path, description = "Church ID")),
    responses(
        (status = 200, description = "Church found", body = Church),
        (status = 404, description = "Church not found", body = ErrorResponse)
    )
)]
pub async fn get_church(
    State(state): State<Arc<AppState>>,
    MaybeUser(viewer): MaybeUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HttpAppError> {
    let church = state
        .resource::<Churches>()
        .get_by_id(&id, viewer.as_ref())
        .await?;
    Ok(ApiResponse::ok(church))
}

#[utoipa::path(
    post,
    path = "/api/v1/churches",
    tag = "churches",
    request_body = CreateChurchRequest,
    responses(
        (status = 201, description = "Church created", body = Church),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 403, description = "Admin access required", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_church(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    payload: Result<Json<CreateChurchRequest>, JsonRejection>,
) -> Result<impl IntoResponse, HttpAppError> {
    let Json(input) = payload?;
    let church = state
        .resource::<Churches>()
        .create(&state, input, &user)
        .await?;
    Ok(ApiResponse::created(church).with_message("Church created"))
}

#[utoipa::path(
    put,
    path = "/api/v1/churches/{id}",
    tag = "churches",
    params(("id" = Uuid, Path, description = "Church ID")),
    request_body = UpdateChurchRequest,
    responses(
        (status = 200, description = "Church updated", body = Church),
        (status = 403, description = "Admin access required", body = ErrorResponse),
        (status = 404, description = "Church not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_church(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    payload: Result<Json<UpdateChurchRequest>, JsonRejection>,
) -> Result<impl IntoResponse, HttpAppError> {
    let Json(input) = payload?;
    let church = state
        .resource::<Churches>()
        .update(&state, &id, input, &user)
        .await?;
    Ok(ApiResponse::ok(church).with_message("Church updated"))
}

#[utoipa::path(
    delete,
    path = "/api/v1/churches/{id}",
    tag = "churches",
    params(("id" = Uuid, Path, description = "Church ID")),
    responses(
        (status = 200, description = "Church deleted"),
        (status = 404, description = "Church not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_church(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HttpAppError> {
    let id = state
        .resource::<Churches>()
        .delete(&state, &id, &user)
        .await?;
    Ok(message(id, "Church deleted"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nearby_requires_coordinates() {
        let query = NearbyQuery {
            lat: Some(51.5),
            ..Default::default()
        };
        assert!(NearbySearch::from_query(&query).is_err());
    }

    #[test]
    fn nearby_rejects_out_of_range_coordinates() {
        let query = NearbyQuery {
            lat: Some(91.0),
            lng: Some(0.0),
            ..Default::default()
        };
        assert!(matches!(
            NearbySearch::from_query(&query),
            Err(AppError::InvalidInput(_))
        ));
    }

    #[test]
    fn nearby_defaults_and_caps_radius() {
        let query = NearbyQuery {
            lat: Some(6.5),
            lng: Some(3.4),
            ..Default::default()
        };
        let search = NearbySearch::from_query(&query).unwrap();
        assert_eq!(search.radius_km, DEFAULT_NEARBY_RADIUS_KM);
        assert_eq!(search.limit, DEFAULT_PAGE_LIMIT);

        let query = NearbyQuery {
            lat: Some(6.5),
            lng: Some(3.4),
            radius_km: Some(5000.0),
            limit: Some(1000),
        };
        let search = NearbySearch::from_query(&query).unwrap();
        assert_eq!(search.radius_km, MAX_NEARBY_RADIUS_KM);
        assert_eq!(search.limit, MAX_PAGE_LIMIT);
    }

    #[test]
    fn cache_key_distinguishes_filters() {
        let lagos = ChurchListQuery {
            city: Some("Lagos".into()),
            ..Default::default()
        };
        let accra = ChurchListQuery {
            city: Some("Accra".into()),
            ..Default::default()
        };
        assert_ne!(
            listing_cache_key(&lagos).as_str(),
            listing_cache_key(&accra).as_str()
        );
        assert!(listing_cache_key(&lagos)
            .as_str()
            .starts_with(CacheClass::ChurchListing.prefix()));
    }
}
