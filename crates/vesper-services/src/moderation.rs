//! Media reports and moderation review

use std::sync::Arc;

use uuid::Uuid;
use vesper_core::models::{
    AuthUser, CreateReportRequest, MediaReport, ModerationStatus, PageRequest, Paginated,
    ReportReason, ReportStatus,
};
use vesper_core::AppError;
use vesper_db::ReportStore;

use crate::events::{EventPublisher, OutboundEvent};

#[derive(Clone)]
pub struct ModerationService {
    store: Arc<dyn ReportStore>,
    events: EventPublisher,
    review_threshold: i32,
}

impl ModerationService {
    pub fn new(store: Arc<dyn ReportStore>, events: EventPublisher, review_threshold: i32) -> Self {
        Self {
            store,
            events,
            review_threshold,
        }
    }

    fn require_staff(user: &AuthUser) -> Result<(), AppError> {
        if !user.is_staff() {
            return Err(AppError::Forbidden(
                "Moderator or admin role required".to_string(),
            ));
        }
        Ok(())
    }

    /// File a report against media. Checks run in order: reason, media exists, not the
    /// reporter's own upload, not already reported.
    #[tracing::instrument(skip(self, request), fields(user_id = %reporter.user_id, media_id = %media_id))]
    pub async fn report_media(
        &self,
        reporter: &AuthUser,
        media_id: Uuid,
        request: CreateReportRequest,
    ) -> Result<MediaReport, AppError> {
        let reason: ReportReason = request
            .reason
            .trim()
            .to_lowercase()
            .parse()
            .map_err(AppError::InvalidInput)?;

        let media = self
            .store
            .find_media(media_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Media not found".to_string()))?;

        if media.uploader_id == reporter.user_id {
            return Err(AppError::BadRequest(
                "You cannot report your own content".to_string(),
            ));
        }
        if self.store.has_reported(media_id, reporter.user_id).await? {
            return Err(AppError::Conflict(
                "You have already reported this media".to_string(),
            ));
        }

        let filed = self
            .store
            .file_report(media_id, reporter.user_id, reason, request.details)
            .await?;
        tracing::info!(report_id = %filed.report.id, report_count = filed.report_count, "Media reported");

        if filed.report_count == self.review_threshold
            && self
                .store
                .transition_media_status(
                    media_id,
                    ModerationStatus::Active,
                    ModerationStatus::UnderReview,
                )
                .await?
        {
            tracing::warn!(media_id = %media_id, report_count = filed.report_count, "Media moved to review");
            self.events.publish(OutboundEvent::ReportThresholdReached {
                media_id,
                title: media.title,
                report_count: filed.report_count,
            });
        }

        Ok(filed.report)
    }

    pub async fn list_reports(
        &self,
        user: &AuthUser,
        status: Option<ReportStatus>,
        page: PageRequest,
    ) -> Result<Paginated<MediaReport>, AppError> {
        Self::require_staff(user)?;
        self.store.list_reports(status, page).await
    }

    #[tracing::instrument(skip(self), fields(reviewer_id = %reviewer.user_id))]
    pub async fn review_report(
        &self,
        reviewer: &AuthUser,
        report_id: Uuid,
        status: ReportStatus,
    ) -> Result<MediaReport, AppError> {
        Self::require_staff(reviewer)?;
        if status == ReportStatus::Pending {
            return Err(AppError::InvalidInput(
                "status must be one of: reviewed, dismissed, action_taken".to_string(),
            ));
        }

        let report = self
            .store
            .review_report(report_id, status, reviewer.user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Report not found".to_string()))?;

        if status == ReportStatus::ActionTaken {
            self.store
                .set_media_status(report.media_id, ModerationStatus::Removed)
                .await?;
            tracing::info!(media_id = %report.media_id, "Media removed after review");
        }

        self.events.publish(OutboundEvent::ReportReviewed {
            report_id: report.id,
            media_id: report.media_id,
            reporter_id: report.reporter_id,
            status,
        });
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{media, moderator, user, MockReportStore};
    use tokio::sync::mpsc;

    fn setup() -> (ModerationService, MockReportStore, mpsc::Receiver<OutboundEvent>) {
        let store = MockReportStore::new();
        let (events, rx) = EventPublisher::channel(16);
        let service = ModerationService::new(Arc::new(store.clone()), events, 3);
        (service, store, rx)
    }

    fn request(reason: &str) -> CreateReportRequest {
        CreateReportRequest {
            reason: reason.to_string(),
            details: None,
        }
    }

    #[tokio::test]
    async fn report_by_non_uploader_is_pending() {
        let (service, store, _rx) = setup();
        let m = media(Uuid::new_v4());
        store.add_media(m.clone());

        let report = service.report_media(&user(), m.id, request("spam")).await.unwrap();
        assert_eq!(report.status, ReportStatus::Pending);
        assert_eq!(store.media(m.id).unwrap().report_count, 1);
    }

    #[tokio::test]
    async fn invalid_reason_and_unknown_media_are_rejected() {
        let (service, store, _rx) = setup();
        let m = media(Uuid::new_v4());
        store.add_media(m.clone());

        let err = service.report_media(&user(), m.id, request("boring")).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
        let err = service
            .report_media(&user(), Uuid::new_v4(), request("spam"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn self_report_is_rejected_before_duplicate_check() {
        let (service, store, _rx) = setup();
        let uploader = user();
        let m = media(uploader.user_id);
        store.add_media(m.clone());

        for _ in 0..2 {
            let err = service
                .report_media(&uploader, m.id, request("spam"))
                .await
                .unwrap_err();
            assert!(matches!(err, AppError::BadRequest(_)));
        }
    }

    #[tokio::test]
    async fn duplicate_report_is_a_conflict() {
        let (service, store, _rx) = setup();
        let m = media(Uuid::new_v4());
        store.add_media(m.clone());
        let reporter = user();

        service.report_media(&reporter, m.id, request("spam")).await.unwrap();
        let err = service
            .report_media(&reporter, m.id, request("other"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(store.media(m.id).unwrap().report_count, 1);
    }

    #[tokio::test]
    async fn third_report_moves_media_to_review_exactly_once() {
        let (service, store, mut rx) = setup();
        let m = media(Uuid::new_v4());
        store.add_media(m.clone());

        for _ in 0..2 {
            service.report_media(&user(), m.id, request("spam")).await.unwrap();
        }
        assert_eq!(store.media(m.id).unwrap().moderation_status, ModerationStatus::Active);
        assert!(rx.try_recv().is_err());

        service.report_media(&user(), m.id, request("spam")).await.unwrap();
        assert_eq!(store.media(m.id).unwrap().moderation_status, ModerationStatus::UnderReview);
        assert!(matches!(
            rx.try_recv().unwrap(),
            OutboundEvent::ReportThresholdReached { report_count: 3, .. }
        ));

        service.report_media(&user(), m.id, request("spam")).await.unwrap();
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn action_taken_removes_media() {
        let (service, store, mut rx) = setup();
        let m = media(Uuid::new_v4());
        store.add_media(m.clone());
        let report = service.report_media(&user(), m.id, request("copyright")).await.unwrap();

        let err = service
            .review_report(&user(), report.id, ReportStatus::ActionTaken)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));

        let reviewed = service
            .review_report(&moderator(), report.id, ReportStatus::ActionTaken)
            .await
            .unwrap();
        assert_eq!(reviewed.status, ReportStatus::ActionTaken);
        assert_eq!(store.media(m.id).unwrap().moderation_status, ModerationStatus::Removed);
        assert!(matches!(rx.try_recv().unwrap(), OutboundEvent::ReportReviewed { .. }));
    }

    #[tokio::test]
    async fn listing_reports_requires_staff() {
        let (service, store, _rx) = setup();
        let m = media(Uuid::new_v4());
        store.add_media(m.clone());
        service.report_media(&user(), m.id, request("spam")).await.unwrap();

        assert!(service
            .list_reports(&user(), None, PageRequest::default())
            .await
            .is_err());
        let page = service
            .list_reports(&moderator(), Some(ReportStatus::Pending), PageRequest::default())
            .await
            .unwrap();
        assert_eq!(page.total, 1);
    }
}
