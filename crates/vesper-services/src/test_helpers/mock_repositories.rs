//! Mock store implementations for testing
//!
//! Each mock keeps its rows in `Arc<Mutex<..>>` collections and mirrors the constraints the
//! Postgres schema enforces (unique pairs, one active session per user).

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;
use vesper_core::models::{
    Bookmark, BookmarkWithMedia, FiledReport, Media, MediaReport, ModerationStatus,
    NewNotification, NewPlaybackSession, PageRequest, Paginated, PlaybackSession, ReportReason,
    ReportStatus, ToggleResult,
};
use vesper_core::AppError;
use vesper_db::{EngagementStore, NotificationStore, PlaybackStore, ReportStore};

/// Mock playback store
#[derive(Clone, Default)]
pub struct MockPlaybackStore {
    media: Arc<Mutex<HashSet<Uuid>>>,
    sessions: Arc<Mutex<HashMap<Uuid, PlaybackSession>>>,
    views: Arc<Mutex<Vec<(Uuid, Uuid)>>>,
}

impl MockPlaybackStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_media(&self, media_id: Uuid) {
        self.media.lock().unwrap().insert(media_id);
    }

    pub fn session(&self, id: Uuid) -> Option<PlaybackSession> {
        self.sessions.lock().unwrap().get(&id).cloned()
    }

    /// `(session_id, media_id)` of every recorded view
    pub fn views(&self) -> Vec<(Uuid, Uuid)> {
        self.views.lock().unwrap().clone()
    }

    fn active_count(&self, user_id: Uuid) -> usize {
        self.sessions
            .lock()
            .unwrap()
            .values()
            .filter(|s| s.user_id == user_id && s.is_active())
            .count()
    }
}

#[async_trait]
impl PlaybackStore for MockPlaybackStore {
    async fn playable_media_exists(&self, media_id: Uuid) -> Result<bool, AppError> {
        Ok(self.media.lock().unwrap().contains(&media_id))
    }

    async fn find_session(&self, id: Uuid) -> Result<Option<PlaybackSession>, AppError> {
        Ok(self.session(id))
    }

    async fn find_active_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Option<PlaybackSession>, AppError> {
        Ok(self
            .sessions
            .lock()
            .unwrap()
            .values()
            .find(|s| s.user_id == user_id && s.is_active())
            .cloned())
    }

    async fn insert_session(
        &self,
        new: NewPlaybackSession,
    ) -> Result<PlaybackSession, AppError> {
        if self.active_count(new.user_id) > 0 {
            return Err(AppError::Conflict(
                "User already has an active playback session".to_string(),
            ));
        }
        let session = PlaybackSession {
            id: Uuid::new_v4(),
            user_id: new.user_id,
            media_id: new.media_id,
            duration: new.duration,
            current_position: new.position,
            progress_percentage: new.progress_percentage,
            is_paused: false,
            started_at: new.started_at,
            last_active_at: new.started_at,
            paused_at: None,
            ended_at: None,
            end_reason: None,
            total_watch_time: 0.0,
            device_info: new.device_info,
            user_agent: new.user_agent,
            view_recorded: false,
        };
        self.sessions
            .lock()
            .unwrap()
            .insert(session.id, session.clone());
        Ok(session)
    }

    async fn save_session(
        &self,
        session: &PlaybackSession,
    ) -> Result<Option<PlaybackSession>, AppError> {
        let mut sessions = self.sessions.lock().unwrap();
        match sessions.get(&session.id) {
            Some(stored) if stored.ended_at.is_none() => {
                let mut saved = session.clone();
                saved.view_recorded = stored.view_recorded;
                sessions.insert(saved.id, saved.clone());
                Ok(Some(saved))
            }
            _ => Ok(None),
        }
    }

    async fn record_view(&self, session: &PlaybackSession) -> Result<bool, AppError> {
        let mut sessions = self.sessions.lock().unwrap();
        let Some(stored) = sessions.get_mut(&session.id) else {
            return Ok(false);
        };
        if stored.view_recorded {
            return Ok(false);
        }
        stored.view_recorded = true;
        self.views
            .lock()
            .unwrap()
            .push((session.id, session.media_id));
        Ok(true)
    }

    async fn list_history(
        &self,
        user_id: Uuid,
        page: PageRequest,
    ) -> Result<Paginated<PlaybackSession>, AppError> {
        let mut sessions: Vec<PlaybackSession> = self
            .sessions
            .lock()
            .unwrap()
            .values()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect();
        sessions.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        Ok(Paginated::from_vec(sessions, page))
    }
}

/// Mock report store
#[derive(Clone, Default)]
pub struct MockReportStore {
    media: Arc<Mutex<HashMap<Uuid, Media>>>,
    reports: Arc<Mutex<Vec<MediaReport>>>,
}

impl MockReportStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_media(&self, media: Media) {
        self.media.lock().unwrap().insert(media.id, media);
    }

    pub fn media(&self, id: Uuid) -> Option<Media> {
        self.media.lock().unwrap().get(&id).cloned()
    }
}

#[async_trait]
impl ReportStore for MockReportStore {
    async fn find_media(&self, media_id: Uuid) -> Result<Option<Media>, AppError> {
        Ok(self.media(media_id).filter(|m| !m.is_deleted))
    }

    async fn has_reported(&self, media_id: Uuid, reporter_id: Uuid) -> Result<bool, AppError> {
        Ok(self
            .reports
            .lock()
            .unwrap()
            .iter()
            .any(|r| r.media_id == media_id && r.reporter_id == reporter_id))
    }

    async fn file_report(
        &self,
        media_id: Uuid,
        reporter_id: Uuid,
        reason: ReportReason,
        details: Option<String>,
    ) -> Result<FiledReport, AppError> {
        if self.has_reported(media_id, reporter_id).await? {
            return Err(AppError::Conflict(
                "You have already reported this media".to_string(),
            ));
        }
        let report = MediaReport {
            id: Uuid::new_v4(),
            media_id,
            reporter_id,
            reason,
            details,
            status: ReportStatus::Pending,
            reviewed_by: None,
            reviewed_at: None,
            created_at: Utc::now(),
        };
        self.reports.lock().unwrap().push(report.clone());

        let mut media = self.media.lock().unwrap();
        let entry = media
            .get_mut(&media_id)
            .ok_or_else(|| AppError::NotFound("Media not found".to_string()))?;
        entry.report_count += 1;
        Ok(FiledReport {
            report,
            report_count: entry.report_count,
        })
    }

    async fn transition_media_status(
        &self,
        media_id: Uuid,
        from: ModerationStatus,
        to: ModerationStatus,
    ) -> Result<bool, AppError> {
        let mut media = self.media.lock().unwrap();
        match media.get_mut(&media_id) {
            Some(m) if m.moderation_status == from => {
                m.moderation_status = to;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn set_media_status(
        &self,
        media_id: Uuid,
        status: ModerationStatus,
    ) -> Result<bool, AppError> {
        let mut media = self.media.lock().unwrap();
        match media.get_mut(&media_id) {
            Some(m) => {
                m.moderation_status = status;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list_reports(
        &self,
        status: Option<ReportStatus>,
        page: PageRequest,
    ) -> Result<Paginated<MediaReport>, AppError> {
        let reports: Vec<MediaReport> = self
            .reports
            .lock()
            .unwrap()
            .iter()
            .rev()
            .filter(|r| status.map_or(true, |s| r.status == s))
            .cloned()
            .collect();
        Ok(Paginated::from_vec(reports, page))
    }

    async fn find_report(&self, id: Uuid) -> Result<Option<MediaReport>, AppError> {
        Ok(self
            .reports
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id == id)
            .cloned())
    }

    async fn review_report(
        &self,
        id: Uuid,
        status: ReportStatus,
        reviewer_id: Uuid,
    ) -> Result<Option<MediaReport>, AppError> {
        let mut reports = self.reports.lock().unwrap();
        Ok(reports.iter_mut().find(|r| r.id == id).map(|r| {
            r.status = status;
            r.reviewed_by = Some(reviewer_id);
            r.reviewed_at = Some(Utc::now());
            r.clone()
        }))
    }
}

/// Mock engagement store
#[derive(Clone, Default)]
pub struct MockEngagementStore {
    media: Arc<Mutex<HashMap<Uuid, Media>>>,
    bookmarks: Arc<Mutex<Vec<Bookmark>>>,
    likes: Arc<Mutex<HashSet<(Uuid, Uuid)>>>,
}

impl MockEngagementStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_media(&self, media: Media) {
        self.media.lock().unwrap().insert(media.id, media);
    }

    pub fn media(&self, id: Uuid) -> Option<Media> {
        self.media.lock().unwrap().get(&id).cloned()
    }
}

#[async_trait]
impl EngagementStore for MockEngagementStore {
    async fn media_exists(&self, media_id: Uuid) -> Result<bool, AppError> {
        Ok(self.media(media_id).is_some_and(|m| !m.is_deleted))
    }

    async fn toggle_bookmark(
        &self,
        user_id: Uuid,
        media_id: Uuid,
    ) -> Result<ToggleResult, AppError> {
        let mut bookmarks = self.bookmarks.lock().unwrap();
        let existing = bookmarks
            .iter()
            .position(|b| b.user_id == user_id && b.media_id == media_id);
        let active = match existing {
            Some(i) => {
                bookmarks.remove(i);
                false
            }
            None => {
                bookmarks.push(Bookmark {
                    id: Uuid::new_v4(),
                    user_id,
                    media_id,
                    created_at: Utc::now(),
                });
                true
            }
        };
        let mut media = self.media.lock().unwrap();
        let m = media
            .get_mut(&media_id)
            .ok_or_else(|| AppError::NotFound("Media not found".to_string()))?;
        m.bookmark_count += if active { 1 } else { -1 };
        Ok(ToggleResult {
            active,
            count: m.bookmark_count,
        })
    }

    async fn toggle_like(&self, user_id: Uuid, media_id: Uuid) -> Result<ToggleResult, AppError> {
        let mut likes = self.likes.lock().unwrap();
        let active = likes.insert((user_id, media_id));
        if !active {
            likes.remove(&(user_id, media_id));
        }
        let mut media = self.media.lock().unwrap();
        let m = media
            .get_mut(&media_id)
            .ok_or_else(|| AppError::NotFound("Media not found".to_string()))?;
        m.like_count += if active { 1 } else { -1 };
        Ok(ToggleResult {
            active,
            count: m.like_count,
        })
    }

    async fn list_bookmarks(
        &self,
        user_id: Uuid,
        page: PageRequest,
    ) -> Result<Paginated<BookmarkWithMedia>, AppError> {
        let media = self.media.lock().unwrap();
        let items: Vec<BookmarkWithMedia> = self
            .bookmarks
            .lock()
            .unwrap()
            .iter()
            .rev()
            .filter(|b| b.user_id == user_id)
            .filter_map(|b| {
                media.get(&b.media_id).map(|m| BookmarkWithMedia {
                    id: b.id,
                    media_id: m.id,
                    created_at: b.created_at,
                    title: m.title.clone(),
                    media_type: m.media_type,
                    url: m.url.clone(),
                    duration_seconds: m.duration_seconds,
                })
            })
            .collect();
        Ok(Paginated::from_vec(items, page))
    }

    async fn find_bookmark(&self, id: Uuid) -> Result<Option<Bookmark>, AppError> {
        Ok(self
            .bookmarks
            .lock()
            .unwrap()
            .iter()
            .find(|b| b.id == id)
            .cloned())
    }

    async fn delete_bookmark(&self, bookmark: &Bookmark) -> Result<bool, AppError> {
        let mut bookmarks = self.bookmarks.lock().unwrap();
        let Some(i) = bookmarks.iter().position(|b| b.id == bookmark.id) else {
            return Ok(false);
        };
        bookmarks.remove(i);
        if let Some(m) = self.media.lock().unwrap().get_mut(&bookmark.media_id) {
            m.bookmark_count -= 1;
        }
        Ok(true)
    }
}

/// Mock notification store
#[derive(Clone, Default)]
pub struct MockNotificationStore {
    staff: Arc<Mutex<Vec<(Uuid, String)>>>,
    created: Arc<Mutex<Vec<NewNotification>>>,
}

impl MockNotificationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_staff(&self, id: Uuid, email: &str) {
        self.staff.lock().unwrap().push((id, email.to_string()));
    }

    pub fn created(&self) -> Vec<NewNotification> {
        self.created.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationStore for MockNotificationStore {
    async fn create_many(&self, notifications: &[NewNotification]) -> Result<u64, AppError> {
        self.created
            .lock()
            .unwrap()
            .extend(notifications.iter().cloned());
        Ok(notifications.len() as u64)
    }

    async fn staff_recipients(&self) -> Result<Vec<(Uuid, String)>, AppError> {
        Ok(self.staff.lock().unwrap().clone())
    }
}
