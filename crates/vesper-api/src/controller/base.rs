use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use uuid::Uuid;
use validator::Validate;
use vesper_core::models::{AuthUser, Paginated};
use vesper_core::{AppError, ErrorMetadata};
use vesper_db::{ColumnValues, Condition, ListParams, PgResourceStore, ResourceTable};

use super::utils::{non_blank, parse_uuid, Access, ListQuery};
use crate::state::AppState;

/// Strategy for one CRUD resource: the table description (via [`ResourceTable`]), who may
/// mutate it, how request DTOs become column values, and side effects around each write.
///
/// Every hook has a no-op default except the two conversions a resource cannot do without.
/// `after_*` hooks run once the write is committed; their failures are logged and swallowed.
#[async_trait]
pub trait Resource: ResourceTable<Record: Sync> {
    /// Display name used in messages, e.g. "Hymn"
    const NAME: &'static str;
    const CREATE_ACCESS: Access = Access::Authenticated;
    /// Applies to both update and delete
    const MUTATE_ACCESS: Access = Access::OwnerOrStaff;

    type Create: DeserializeOwned + Validate + Send + 'static;
    type Update: DeserializeOwned + Validate + Send + 'static;
    type Query: ListQuery + Send + Sync + 'static;
    type Output: Serialize + Send + 'static;

    /// Domain-specific list filters derived from the query string
    fn filters_from_query(
        _query: &Self::Query,
        _viewer: Option<&AuthUser>,
    ) -> Result<Vec<Condition>, AppError> {
        Ok(Vec::new())
    }

    fn owner_of(_record: &Self::Record) -> Option<Uuid> {
        None
    }

    /// Records that exist but must look missing to this viewer
    fn visible_to(_record: &Self::Record, _viewer: Option<&AuthUser>) -> bool {
        true
    }

    fn present(record: Self::Record, viewer: Option<&AuthUser>) -> Self::Output;

    fn before_save(input: Self::Create, user: &AuthUser) -> Result<ColumnValues, AppError>;

    async fn after_save(
        _state: &AppState,
        _record: &Self::Record,
        _user: &AuthUser,
    ) -> anyhow::Result<()> {
        Ok(())
    }

    fn before_update(
        input: Self::Update,
        existing: &Self::Record,
        user: &AuthUser,
    ) -> Result<ColumnValues, AppError>;

    async fn after_update(
        _state: &AppState,
        _record: &Self::Record,
        _user: &AuthUser,
    ) -> anyhow::Result<()> {
        Ok(())
    }

    fn before_delete(_existing: &Self::Record, _user: &AuthUser) -> Result<(), AppError> {
        Ok(())
    }

    async fn after_delete(
        _state: &AppState,
        _existing: &Self::Record,
        _user: &AuthUser,
    ) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Generic list / get / create / update / delete over a [`Resource`]
pub struct BaseController<R: Resource> {
    store: PgResourceStore<R>,
}

impl<R: Resource> BaseController<R> {
    pub fn new(store: PgResourceStore<R>) -> Self {
        Self { store }
    }

    fn not_found() -> AppError {
        AppError::NotFound(format!("{} not found", R::NAME))
    }

    /// Log server-side failures with the resource, operation and caller, then hand the error
    /// back unchanged. Client errors are logged by the response conversion only.
    fn failed(operation: &'static str, user: Option<&AuthUser>, error: AppError) -> AppError {
        if error.http_status_code() >= 500 {
            tracing::error!(
                resource = R::NAME,
                table = R::TABLE,
                operation = operation,
                user_id = ?user.map(|u| u.user_id),
                error = %error,
                "Resource operation failed"
            );
        }
        error
    }

    fn hook_failed(hook: &'static str, id: Option<Uuid>, user: &AuthUser, error: anyhow::Error) {
        tracing::warn!(
            resource = R::NAME,
            hook = hook,
            record_id = ?id,
            user_id = %user.user_id,
            error = %error,
            "Post-write hook failed"
        );
    }

    async fn find_visible(
        &self,
        id: Uuid,
        viewer: Option<&AuthUser>,
        operation: &'static str,
    ) -> Result<R::Record, AppError> {
        let record = self
            .store
            .find_by_id(id)
            .await
            .map_err(|e| Self::failed(operation, viewer, e))?
            .ok_or_else(Self::not_found)?;
        if !R::visible_to(&record, viewer) {
            return Err(Self::not_found());
        }
        Ok(record)
    }

    /// Raw records for one page, for callers that need more than `present`.
    pub async fn list_records(
        &self,
        query: &R::Query,
        viewer: Option<&AuthUser>,
    ) -> Result<Paginated<R::Record>, AppError> {
        let params = ListParams {
            conditions: R::filters_from_query(query, viewer)?,
            search: non_blank(query.search()),
            sort: query.sort(),
            order: query.order(),
            page: query.page_request(),
        };
        self.store
            .find_page(params)
            .await
            .map_err(|e| Self::failed("list", viewer, e))
    }

    pub async fn get_list(
        &self,
        query: &R::Query,
        viewer: Option<&AuthUser>,
    ) -> Result<Paginated<R::Output>, AppError> {
        let page = self.list_records(query, viewer).await?;
        Ok(page.map(|record| R::present(record, viewer)))
    }

    pub async fn get_by_id(
        &self,
        raw_id: &str,
        viewer: Option<&AuthUser>,
    ) -> Result<R::Output, AppError> {
        let id = parse_uuid(raw_id)?;
        let record = self.find_visible(id, viewer, "get").await?;
        Ok(R::present(record, viewer))
    }

    pub async fn create(
        &self,
        state: &AppState,
        input: R::Create,
        user: &AuthUser,
    ) -> Result<R::Output, AppError> {
        R::CREATE_ACCESS.authorize(user, None)?;
        input.validate()?;

        let values = R::before_save(input, user)?;
        let record = self
            .store
            .insert(values)
            .await
            .map_err(|e| Self::failed("create", Some(user), e))?;

        if let Err(e) = R::after_save(state, &record, user).await {
            Self::hook_failed("after_save", None, user, e);
        }
        Ok(R::present(record, Some(user)))
    }

    pub async fn update(
        &self,
        state: &AppState,
        raw_id: &str,
        input: R::Update,
        user: &AuthUser,
    ) -> Result<R::Output, AppError> {
        let id = parse_uuid(raw_id)?;
        input.validate()?;

        let existing = self.find_visible(id, Some(user), "update").await?;
        R::MUTATE_ACCESS.authorize(user, R::owner_of(&existing))?;

        let values = R::before_update(input, &existing, user)?;
        let record = self
            .store
            .update(id, values)
            .await
            .map_err(|e| Self::failed("update", Some(user), e))?
            .ok_or_else(Self::not_found)?;

        if let Err(e) = R::after_update(state, &record, user).await {
            Self::hook_failed("after_update", Some(id), user, e);
        }
        Ok(R::present(record, Some(user)))
    }

    /// Hard or soft delete, depending on the table. Returns the deleted id.
    pub async fn delete(
        &self,
        state: &AppState,
        raw_id: &str,
        user: &AuthUser,
    ) -> Result<Uuid, AppError> {
        let id = parse_uuid(raw_id)?;
        let existing = self.find_visible(id, Some(user), "delete").await?;
        R::MUTATE_ACCESS.authorize(user, R::owner_of(&existing))?;
        R::before_delete(&existing, user)?;

        let removed = self
            .store
            .remove(id)
            .await
            .map_err(|e| Self::failed("delete", Some(user), e))?;
        if !removed {
            return Err(Self::not_found());
        }

        if let Err(e) = R::after_delete(state, &existing, user).await {
            Self::hook_failed("after_delete", Some(id), user, e);
        }
        tracing::info!(resource = R::NAME, record_id = %id, user_id = %user.user_id, "Deleted");
        Ok(id)
    }
}
