//! Room-scoped realtime broadcasts.
//!
//! Each room (`user:<id>`, `staff`, `media:<id>` ...) owns a `tokio::sync::broadcast` channel.
//! Emitting to a room nobody listens to is not an error.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value as JsonValue;
use tokio::sync::{broadcast, RwLock};

const ROOM_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RealtimeMessage {
    pub room: String,
    pub event: String,
    pub payload: JsonValue,
}

#[derive(Clone, Default)]
pub struct RealtimeHub {
    rooms: Arc<RwLock<HashMap<String, broadcast::Sender<RealtimeMessage>>>>,
}

impl RealtimeHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user_room(user_id: uuid::Uuid) -> String {
        format!("user:{}", user_id)
    }

    pub const STAFF_ROOM: &'static str = "staff";

    pub async fn subscribe(&self, room: &str) -> broadcast::Receiver<RealtimeMessage> {
        let mut rooms = self.rooms.write().await;
        rooms
            .entry(room.to_string())
            .or_insert_with(|| broadcast::channel(ROOM_CAPACITY).0)
            .subscribe()
    }

    /// Returns how many subscribers received the message.
    pub async fn emit(&self, room: &str, event: &str, payload: JsonValue) -> usize {
        let sender = {
            let rooms = self.rooms.read().await;
            rooms.get(room).cloned()
        };
        let Some(sender) = sender else {
            return 0;
        };
        let message = RealtimeMessage {
            room: room.to_string(),
            event: event.to_string(),
            payload,
        };
        match sender.send(message) {
            Ok(n) => n,
            Err(_) => {
                // Every receiver is gone; forget the room.
                self.rooms.write().await.remove(room);
                0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn emit_reaches_room_subscribers_only() {
        let hub = RealtimeHub::new();
        let mut staff = hub.subscribe(RealtimeHub::STAFF_ROOM).await;
        let mut other = hub.subscribe("user:someone").await;

        let delivered = hub
            .emit(RealtimeHub::STAFF_ROOM, "report.threshold", json!({"count": 3}))
            .await;
        assert_eq!(delivered, 1);

        let msg = staff.recv().await.unwrap();
        assert_eq!(msg.event, "report.threshold");
        assert_eq!(msg.payload["count"], 3);
        assert!(other.try_recv().is_err());
    }

    #[tokio::test]
    async fn emit_to_empty_room_is_zero() {
        let hub = RealtimeHub::new();
        assert_eq!(hub.emit("nobody", "x", json!(null)).await, 0);

        let rx = hub.subscribe("gone").await;
        drop(rx);
        assert_eq!(hub.emit("gone", "x", json!(null)).await, 0);
    }
}
