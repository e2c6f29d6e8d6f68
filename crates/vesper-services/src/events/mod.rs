//! Outbound side effects
//!
//! Request handlers never notify, email or broadcast directly. They publish an
//! [`OutboundEvent`] through the [`EventPublisher`]; the [`EventDispatcher`] worker hands each
//! event to every [`EventSink`], retrying failed deliveries with exponential backoff.

mod dispatcher;
mod sinks;

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::mpsc;
use uuid::Uuid;
use vesper_core::models::ReportStatus;

pub use dispatcher::EventDispatcher;
pub use sinks::{notifications_for, EmailSink, NotificationSink, RealtimeSink};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundEvent {
    ReplyPosted {
        post_id: Uuid,
        post_title: String,
        post_author_id: Uuid,
        reply_id: Uuid,
        replier_id: Uuid,
    },
    ReportThresholdReached {
        media_id: Uuid,
        title: String,
        report_count: i32,
    },
    ReportReviewed {
        report_id: Uuid,
        media_id: Uuid,
        reporter_id: Uuid,
        status: ReportStatus,
    },
    PrayerSupported {
        prayer_id: Uuid,
        author_id: Uuid,
        supporter_id: Uuid,
        prayer_count: i64,
    },
    PollVoteCast {
        poll_id: Uuid,
        option_index: i32,
    },
}

impl OutboundEvent {
    /// Event name used in logs and realtime messages
    pub fn name(&self) -> &'static str {
        match self {
            OutboundEvent::ReplyPosted { .. } => "forum.reply_posted",
            OutboundEvent::ReportThresholdReached { .. } => "report.threshold_reached",
            OutboundEvent::ReportReviewed { .. } => "report.reviewed",
            OutboundEvent::PrayerSupported { .. } => "prayer.supported",
            OutboundEvent::PollVoteCast { .. } => "poll.vote_cast",
        }
    }
}

/// A destination for outbound events (notifications table, email, realtime rooms).
#[async_trait]
pub trait EventSink: Send + Sync {
    fn name(&self) -> &'static str;

    async fn deliver(&self, event: &OutboundEvent) -> anyhow::Result<()>;
}

/// Cheap-to-clone handle used by services to enqueue events.
#[derive(Clone)]
pub struct EventPublisher {
    tx: mpsc::Sender<OutboundEvent>,
}

impl EventPublisher {
    /// A publisher and the receiving end to hand to [`EventDispatcher::spawn`].
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<OutboundEvent>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }

    /// Never blocks and never fails the caller. A full or closed queue drops the event.
    pub fn publish(&self, event: OutboundEvent) {
        let name = event.name();
        match self.tx.try_send(event) {
            Ok(()) => tracing::debug!(event = name, "Outbound event queued"),
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!(event = name, "Outbound event queue full, dropping event")
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                tracing::error!(event = name, "Outbound event dispatcher stopped, dropping event")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publish_drops_when_full() {
        let (publisher, mut rx) = EventPublisher::channel(1);
        let event = OutboundEvent::PollVoteCast {
            poll_id: Uuid::new_v4(),
            option_index: 0,
        };
        publisher.publish(event.clone());
        publisher.publish(event.clone());
        assert_eq!(rx.recv().await, Some(event));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn publish_after_close_does_not_panic() {
        let (publisher, rx) = EventPublisher::channel(4);
        drop(rx);
        publisher.publish(OutboundEvent::PollVoteCast {
            poll_id: Uuid::new_v4(),
            option_index: 1,
        });
    }

    #[test]
    fn events_serialize_with_type_tag() {
        let json = serde_json::to_value(OutboundEvent::ReportThresholdReached {
            media_id: Uuid::nil(),
            title: "Sermon".to_string(),
            report_count: 3,
        })
        .unwrap();
        assert_eq!(json["type"], "report_threshold_reached");
        assert_eq!(json["report_count"], 3);
    }
}
