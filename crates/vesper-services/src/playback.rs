//! Playback session orchestration
//!
//! Loads sessions, applies the transitions from [`vesper_core::playback`] and persists them,
//! keeping each user to a single active session.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;
use vesper_core::models::{
    AuthUser, EndPlaybackRequest, EndPlaybackResponse, PageRequest, Paginated, PlaybackSession,
    ResumePlaybackResponse, StartPlaybackRequest, StartPlaybackResponse, UpdateProgressRequest,
};
use vesper_core::playback;
use vesper_core::AppError;
use vesper_db::PlaybackStore;

#[derive(Clone)]
pub struct PlaybackService {
    store: Arc<dyn PlaybackStore>,
    completion_threshold: f64,
}

impl PlaybackService {
    pub fn new(store: Arc<dyn PlaybackStore>, completion_threshold: f64) -> Self {
        Self {
            store,
            completion_threshold,
        }
    }

    /// 404 for unknown sessions, 403 for sessions of another user.
    async fn owned_session(&self, user: &AuthUser, id: Uuid) -> Result<PlaybackSession, AppError> {
        let session = self
            .store
            .find_session(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Playback session not found".to_string()))?;
        if session.user_id != user.user_id {
            return Err(AppError::Forbidden(
                "You do not have access to this playback session".to_string(),
            ));
        }
        Ok(session)
    }

    async fn persist(&self, session: &PlaybackSession) -> Result<PlaybackSession, AppError> {
        self.store.save_session(session).await?.ok_or_else(|| {
            AppError::BadRequest("Playback session has already ended".to_string())
        })
    }

    /// Pause whatever the user is currently playing, except `keep`.
    async fn pause_active(
        &self,
        user_id: Uuid,
        keep: Option<Uuid>,
    ) -> Result<Option<PlaybackSession>, AppError> {
        let Some(mut active) = self.store.find_active_for_user(user_id).await? else {
            return Ok(None);
        };
        if Some(active.id) == keep {
            return Ok(None);
        }
        playback::pause(&mut active, Utc::now())?;
        let paused = self.store.save_session(&active).await?;
        if let Some(p) = &paused {
            tracing::debug!(session_id = %p.id, user_id = %user_id, "Paused previously active session");
        }
        Ok(paused)
    }

    #[tracing::instrument(skip(self, request, user_agent), fields(user_id = %user.user_id, media_id = %request.media_id))]
    pub async fn start(
        &self,
        user: &AuthUser,
        request: StartPlaybackRequest,
        user_agent: Option<String>,
    ) -> Result<StartPlaybackResponse, AppError> {
        if !self.store.playable_media_exists(request.media_id).await? {
            return Err(AppError::NotFound("Media not found".to_string()));
        }

        let paused_session = self.pause_active(user.user_id, None).await?;
        let new = playback::new_session(
            user.user_id,
            request.media_id,
            request.duration,
            request.position,
            request.device_info,
            user_agent,
            Utc::now(),
        );
        let session = self.store.insert_session(new).await?;
        tracing::info!(session_id = %session.id, "Playback started");

        Ok(StartPlaybackResponse {
            session,
            paused_session,
        })
    }

    #[tracing::instrument(skip(self, request), fields(user_id = %user.user_id))]
    pub async fn update_progress(
        &self,
        user: &AuthUser,
        id: Uuid,
        request: UpdateProgressRequest,
    ) -> Result<PlaybackSession, AppError> {
        let mut session = self.owned_session(user, id).await?;
        playback::apply_progress(
            &mut session,
            request.position,
            request.duration,
            request.progress_percentage,
            Utc::now(),
        )?;
        self.persist(&session).await
    }

    #[tracing::instrument(skip(self), fields(user_id = %user.user_id))]
    pub async fn pause(&self, user: &AuthUser, id: Uuid) -> Result<PlaybackSession, AppError> {
        let mut session = self.owned_session(user, id).await?;
        if !playback::pause(&mut session, Utc::now())? {
            return Ok(session);
        }
        self.persist(&session).await
    }

    #[tracing::instrument(skip(self), fields(user_id = %user.user_id))]
    pub async fn resume(&self, user: &AuthUser, id: Uuid) -> Result<ResumePlaybackResponse, AppError> {
        let mut session = self.owned_session(user, id).await?;
        if session.is_ended() {
            return Err(AppError::BadRequest(
                "Playback session has already ended".to_string(),
            ));
        }
        if !session.is_paused {
            return Ok(ResumePlaybackResponse {
                session,
                paused_session: None,
            });
        }

        let paused_session = self.pause_active(user.user_id, Some(session.id)).await?;
        playback::resume(&mut session, Utc::now())?;
        let session = self.persist(&session).await?;
        Ok(ResumePlaybackResponse {
            session,
            paused_session,
        })
    }

    #[tracing::instrument(skip(self, request), fields(user_id = %user.user_id))]
    pub async fn end(
        &self,
        user: &AuthUser,
        id: Uuid,
        request: EndPlaybackRequest,
    ) -> Result<EndPlaybackResponse, AppError> {
        let mut session = self.owned_session(user, id).await?;
        let qualifies = playback::end(
            &mut session,
            request.reason.unwrap_or_default(),
            request.final_position,
            self.completion_threshold,
            Utc::now(),
        )?;
        let mut session = self.persist(&session).await?;

        let view_recorded = qualifies && self.store.record_view(&session).await?;
        if view_recorded {
            session.view_recorded = true;
            tracing::info!(session_id = %session.id, media_id = %session.media_id, "View recorded");
        }
        Ok(EndPlaybackResponse {
            session,
            view_recorded,
        })
    }

    pub async fn active_session(&self, user: &AuthUser) -> Result<Option<PlaybackSession>, AppError> {
        self.store.find_active_for_user(user.user_id).await
    }

    pub async fn history(
        &self,
        user: &AuthUser,
        page: PageRequest,
    ) -> Result<Paginated<PlaybackSession>, AppError> {
        self.store.list_history(user.user_id, page).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{user, MockPlaybackStore};
    use vesper_core::models::EndReason;
    use vesper_core::playback::PlaybackState;

    fn setup() -> (PlaybackService, MockPlaybackStore, Uuid) {
        let store = MockPlaybackStore::new();
        let media_id = Uuid::new_v4();
        store.add_media(media_id);
        let service = PlaybackService::new(Arc::new(store.clone()), 0.9);
        (service, store, media_id)
    }

    fn start_request(media_id: Uuid) -> StartPlaybackRequest {
        StartPlaybackRequest {
            media_id,
            duration: 100.0,
            position: None,
            device_info: None,
        }
    }

    fn end_at(position: f64) -> EndPlaybackRequest {
        EndPlaybackRequest {
            reason: Some(EndReason::Completed),
            final_position: Some(position),
        }
    }

    #[tokio::test]
    async fn start_unknown_media_is_not_found() {
        let (service, _, _) = setup();
        let err = service
            .start(&user(), start_request(Uuid::new_v4()), None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn starting_pauses_exactly_the_previous_active_session() {
        let (service, store, media_id) = setup();
        let u = user();

        let first = service.start(&u, start_request(media_id), None).await.unwrap();
        assert!(first.paused_session.is_none());

        let second = service.start(&u, start_request(media_id), None).await.unwrap();
        let paused = second.paused_session.unwrap();
        assert_eq!(paused.id, first.session.id);
        assert_eq!(store.session(first.session.id).unwrap().state(), PlaybackState::Paused);
        assert_eq!(store.session(second.session.id).unwrap().state(), PlaybackState::Active);
    }

    #[tokio::test]
    async fn other_users_cannot_touch_a_session() {
        let (service, _, media_id) = setup();
        let owner = user();
        let started = service.start(&owner, start_request(media_id), None).await.unwrap();

        let err = service.pause(&user(), started.session.id).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
        let err = service.pause(&owner, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn resume_pauses_the_other_active_session() {
        let (service, store, media_id) = setup();
        let u = user();
        let first = service.start(&u, start_request(media_id), None).await.unwrap();
        let second = service.start(&u, start_request(media_id), None).await.unwrap();

        let resumed = service.resume(&u, first.session.id).await.unwrap();
        assert!(resumed.session.is_active());
        assert_eq!(resumed.paused_session.unwrap().id, second.session.id);
        assert!(store.session(second.session.id).unwrap().is_paused);
    }

    #[tokio::test]
    async fn pause_and_resume_are_idempotent() {
        let (service, _, media_id) = setup();
        let u = user();
        let started = service.start(&u, start_request(media_id), None).await.unwrap();
        let id = started.session.id;

        assert!(service.pause(&u, id).await.unwrap().is_paused);
        assert!(service.pause(&u, id).await.unwrap().is_paused);
        let resumed = service.resume(&u, id).await.unwrap();
        assert!(resumed.session.is_active());
        let again = service.resume(&u, id).await.unwrap();
        assert!(again.session.is_active());
        assert!(again.paused_session.is_none());
    }

    #[tokio::test]
    async fn end_records_a_view_at_threshold_only() {
        let (service, store, media_id) = setup();
        let u = user();

        let s = service.start(&u, start_request(media_id), None).await.unwrap();
        let ended = service.end(&u, s.session.id, end_at(90.0)).await.unwrap();
        assert!(ended.view_recorded);
        assert!(ended.session.view_recorded);
        assert_eq!(ended.session.end_reason, Some(EndReason::Completed));

        let s = service.start(&u, start_request(media_id), None).await.unwrap();
        let ended = service.end(&u, s.session.id, end_at(89.0)).await.unwrap();
        assert!(!ended.view_recorded);

        assert_eq!(store.views().len(), 1);
    }

    #[tokio::test]
    async fn ended_session_rejects_further_calls() {
        let (service, store, media_id) = setup();
        let u = user();
        let s = service.start(&u, start_request(media_id), None).await.unwrap();
        let id = s.session.id;
        service.end(&u, id, end_at(100.0)).await.unwrap();

        assert!(matches!(service.end(&u, id, end_at(100.0)).await, Err(AppError::BadRequest(_))));
        let progress = UpdateProgressRequest {
            position: 10.0,
            duration: None,
            progress_percentage: None,
        };
        assert!(matches!(
            service.update_progress(&u, id, progress).await,
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(service.resume(&u, id).await, Err(AppError::BadRequest(_))));
        assert_eq!(store.views().len(), 1);
    }

    #[tokio::test]
    async fn progress_is_clamped_and_history_lists_sessions() {
        let (service, _, media_id) = setup();
        let u = user();
        let s = service.start(&u, start_request(media_id), None).await.unwrap();
        let updated = service
            .update_progress(
                &u,
                s.session.id,
                UpdateProgressRequest {
                    position: 250.0,
                    duration: None,
                    progress_percentage: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.current_position, 100.0);
        assert_eq!(updated.progress_percentage, 100.0);

        assert_eq!(service.active_session(&u).await.unwrap().unwrap().id, s.session.id);
        let history = service.history(&u, PageRequest::default()).await.unwrap();
        assert_eq!(history.total, 1);
    }
}
