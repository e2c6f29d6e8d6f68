use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use vesper_core::models::{NewNotification, NotificationKind, ReportStatus};
use vesper_db::NotificationStore;

use super::{EventSink, OutboundEvent};
use crate::email::EmailService;
use crate::realtime::RealtimeHub;

/// Notification rows an event produces. `staff` is only consulted for staff-facing events.
pub fn notifications_for(event: &OutboundEvent, staff: &[uuid::Uuid]) -> Vec<NewNotification> {
    match event {
        OutboundEvent::ReplyPosted {
            post_id,
            post_title,
            post_author_id,
            replier_id,
            ..
        } if post_author_id != replier_id => vec![NewNotification {
            user_id: *post_author_id,
            kind: NotificationKind::ForumReply,
            title: "New reply to your post".to_string(),
            body: format!("Someone replied to \"{}\"", post_title),
            link: Some(format!("/forums/{}", post_id)),
        }],
        OutboundEvent::ReportThresholdReached {
            media_id,
            title,
            report_count,
        } => staff
            .iter()
            .map(|user_id| NewNotification {
                user_id: *user_id,
                kind: NotificationKind::ReportThreshold,
                title: "Media needs review".to_string(),
                body: format!("\"{}\" has been reported {} times", title, report_count),
                link: Some(format!("/media/{}", media_id)),
            })
            .collect(),
        OutboundEvent::ReportReviewed {
            media_id,
            reporter_id,
            status,
            ..
        } => vec![NewNotification {
            user_id: *reporter_id,
            kind: NotificationKind::ReportReviewed,
            title: "Your report was reviewed".to_string(),
            body: match status {
                ReportStatus::ActionTaken => "Thank you. The reported media has been removed.",
                ReportStatus::Dismissed => "Your report was reviewed and dismissed.",
                _ => "Your report has been reviewed by a moderator.",
            }
            .to_string(),
            link: Some(format!("/media/{}", media_id)),
        }],
        OutboundEvent::PrayerSupported {
            prayer_id,
            author_id,
            supporter_id,
            prayer_count,
        } if author_id != supporter_id => vec![NewNotification {
            user_id: *author_id,
            kind: NotificationKind::PrayerSupport,
            title: "Someone prayed for you".to_string(),
            body: format!("Your prayer request has received {} prayers", prayer_count),
            link: Some(format!("/prayers/{}", prayer_id)),
        }],
        _ => Vec::new(),
    }
}

/// Writes rows to the `notifications` table.
pub struct NotificationSink {
    store: Arc<dyn NotificationStore>,
}

impl NotificationSink {
    pub fn new(store: Arc<dyn NotificationStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl EventSink for NotificationSink {
    fn name(&self) -> &'static str {
        "notifications"
    }

    async fn deliver(&self, event: &OutboundEvent) -> anyhow::Result<()> {
        let staff = match event {
            OutboundEvent::ReportThresholdReached { .. } => self
                .store
                .staff_recipients()
                .await?
                .into_iter()
                .map(|(id, _)| id)
                .collect(),
            _ => Vec::new(),
        };
        let notifications = notifications_for(event, &staff);
        if notifications.is_empty() {
            return Ok(());
        }
        let created = self.store.create_many(&notifications).await?;
        tracing::debug!(event = event.name(), created, "Notifications created");
        Ok(())
    }
}

/// Emails staff when media crosses the review threshold.
pub struct EmailSink {
    email: EmailService,
    store: Arc<dyn NotificationStore>,
}

impl EmailSink {
    pub fn new(email: EmailService, store: Arc<dyn NotificationStore>) -> Self {
        Self { email, store }
    }
}

#[async_trait]
impl EventSink for EmailSink {
    fn name(&self) -> &'static str {
        "email"
    }

    async fn deliver(&self, event: &OutboundEvent) -> anyhow::Result<()> {
        let OutboundEvent::ReportThresholdReached {
            media_id,
            title,
            report_count,
        } = event
        else {
            return Ok(());
        };
        let recipients: Vec<String> = self
            .store
            .staff_recipients()
            .await?
            .into_iter()
            .map(|(_, email)| email)
            .collect();
        let subject = format!("[Vesper] Media under review: {}", title);
        let body = format!(
            "The media \"{}\" ({}) has been reported {} times and is now hidden pending review.",
            title, media_id, report_count
        );
        self.email.send(&recipients, &subject, &body).await
    }
}

/// Pushes events to the rooms of the users they concern.
pub struct RealtimeSink {
    hub: RealtimeHub,
}

impl RealtimeSink {
    pub fn new(hub: RealtimeHub) -> Self {
        Self { hub }
    }

    fn room_for(event: &OutboundEvent) -> String {
        match event {
            OutboundEvent::ReplyPosted { post_author_id, .. } => RealtimeHub::user_room(*post_author_id),
            OutboundEvent::ReportThresholdReached { .. } => RealtimeHub::STAFF_ROOM.to_string(),
            OutboundEvent::ReportReviewed { reporter_id, .. } => RealtimeHub::user_room(*reporter_id),
            OutboundEvent::PrayerSupported { author_id, .. } => RealtimeHub::user_room(*author_id),
            OutboundEvent::PollVoteCast { poll_id, .. } => format!("poll:{}", poll_id),
        }
    }
}

#[async_trait]
impl EventSink for RealtimeSink {
    fn name(&self) -> &'static str {
        "realtime"
    }

    async fn deliver(&self, event: &OutboundEvent) -> anyhow::Result<()> {
        let room = Self::room_for(event);
        let payload = serde_json::to_value(event).unwrap_or_else(|_| json!({}));
        self.hub.emit(&room, event.name(), payload).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::MockNotificationStore;
    use uuid::Uuid;

    #[test]
    fn replying_to_own_post_notifies_nobody() {
        let author = Uuid::new_v4();
        let event = OutboundEvent::ReplyPosted {
            post_id: Uuid::new_v4(),
            post_title: "Hope".to_string(),
            post_author_id: author,
            reply_id: Uuid::new_v4(),
            replier_id: author,
        };
        assert!(notifications_for(&event, &[]).is_empty());
    }

    #[test]
    fn threshold_notifies_every_staff_member() {
        let staff = vec![Uuid::new_v4(), Uuid::new_v4()];
        let event = OutboundEvent::ReportThresholdReached {
            media_id: Uuid::new_v4(),
            title: "Sermon".to_string(),
            report_count: 3,
        };
        let notifications = notifications_for(&event, &staff);
        assert_eq!(notifications.len(), 2);
        assert!(notifications
            .iter()
            .all(|n| n.kind == NotificationKind::ReportThreshold));
    }

    #[tokio::test]
    async fn notification_sink_writes_rows_for_staff() {
        let store = Arc::new(MockNotificationStore::new());
        let admin = Uuid::new_v4();
        store.add_staff(admin, "admin@vesper.test");
        let sink = NotificationSink::new(store.clone());

        sink.deliver(&OutboundEvent::ReportThresholdReached {
            media_id: Uuid::new_v4(),
            title: "Sermon".to_string(),
            report_count: 3,
        })
        .await
        .unwrap();

        let created = store.created();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].user_id, admin);
    }

    #[tokio::test]
    async fn realtime_sink_targets_author_room() {
        let hub = RealtimeHub::new();
        let author = Uuid::new_v4();
        let mut rx = hub.subscribe(&RealtimeHub::user_room(author)).await;
        let sink = RealtimeSink::new(hub);

        sink.deliver(&OutboundEvent::PrayerSupported {
            prayer_id: Uuid::new_v4(),
            author_id: author,
            supporter_id: Uuid::new_v4(),
            prayer_count: 4,
        })
        .await
        .unwrap();

        let msg = rx.recv().await.unwrap();
        assert_eq!(msg.event, "prayer.supported");
        assert_eq!(msg.payload["prayer_count"], 4);
    }
}
