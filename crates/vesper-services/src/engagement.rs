//! Bookmarks and likes

use std::sync::Arc;

use uuid::Uuid;
use vesper_core::models::{AuthUser, BookmarkWithMedia, PageRequest, Paginated, ToggleResult};
use vesper_core::AppError;
use vesper_db::EngagementStore;

#[derive(Clone)]
pub struct EngagementService {
    store: Arc<dyn EngagementStore>,
}

impl EngagementService {
    pub fn new(store: Arc<dyn EngagementStore>) -> Self {
        Self { store }
    }

    async fn ensure_media(&self, media_id: Uuid) -> Result<(), AppError> {
        if !self.store.media_exists(media_id).await? {
            return Err(AppError::NotFound("Media not found".to_string()));
        }
        Ok(())
    }

    pub async fn toggle_bookmark(&self, user: &AuthUser, media_id: Uuid) -> Result<ToggleResult, AppError> {
        self.ensure_media(media_id).await?;
        self.store.toggle_bookmark(user.user_id, media_id).await
    }

    pub async fn toggle_like(&self, user: &AuthUser, media_id: Uuid) -> Result<ToggleResult, AppError> {
        self.ensure_media(media_id).await?;
        self.store.toggle_like(user.user_id, media_id).await
    }

    pub async fn bookmarks(
        &self,
        user: &AuthUser,
        page: PageRequest,
    ) -> Result<Paginated<BookmarkWithMedia>, AppError> {
        self.store.list_bookmarks(user.user_id, page).await
    }

    /// Only the bookmark's owner may delete it.
    pub async fn remove_bookmark(&self, user: &AuthUser, id: Uuid) -> Result<(), AppError> {
        let bookmark = self
            .store
            .find_bookmark(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Bookmark not found".to_string()))?;
        if bookmark.user_id != user.user_id {
            return Err(AppError::Forbidden(
                "You can only delete your own bookmarks".to_string(),
            ));
        }
        self.store.delete_bookmark(&bookmark).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{media, user, MockEngagementStore};

    #[tokio::test]
    async fn toggling_twice_restores_state_and_count() {
        let store = MockEngagementStore::new();
        let m = media(Uuid::new_v4());
        store.add_media(m.clone());
        let service = EngagementService::new(Arc::new(store.clone()));
        let u = user();

        let on = service.toggle_bookmark(&u, m.id).await.unwrap();
        assert_eq!(on, ToggleResult { active: true, count: 1 });
        let off = service.toggle_bookmark(&u, m.id).await.unwrap();
        assert_eq!(off, ToggleResult { active: false, count: 0 });

        let on = service.toggle_like(&u, m.id).await.unwrap();
        assert!(on.active);
        let off = service.toggle_like(&u, m.id).await.unwrap();
        assert!(!off.active);
        assert_eq!(store.media(m.id).unwrap().like_count, 0);
    }

    #[tokio::test]
    async fn unknown_media_is_not_found() {
        let service = EngagementService::new(Arc::new(MockEngagementStore::new()));
        let err = service.toggle_like(&user(), Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn bookmarks_are_listed_and_deleted_by_owner_only() {
        let store = MockEngagementStore::new();
        let m = media(Uuid::new_v4());
        store.add_media(m.clone());
        let service = EngagementService::new(Arc::new(store.clone()));
        let owner = user();

        service.toggle_bookmark(&owner, m.id).await.unwrap();
        let page = service.bookmarks(&owner, PageRequest::default()).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.data[0].title, m.title);
        let bookmark_id = page.data[0].id;

        let err = service.remove_bookmark(&user(), bookmark_id).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
        service.remove_bookmark(&owner, bookmark_id).await.unwrap();
        assert_eq!(store.media(m.id).unwrap().bookmark_count, 0);
        assert!(matches!(
            service.remove_bookmark(&owner, bookmark_id).await,
            Err(AppError::NotFound(_))
        ));
    }
}
