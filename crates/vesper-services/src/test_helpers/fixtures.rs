use chrono::Utc;
use uuid::Uuid;
use vesper_core::models::{AuthUser, Media, MediaType, ModerationStatus, UserRole};

pub fn user() -> AuthUser {
    AuthUser::new(Uuid::new_v4(), UserRole::User)
}

pub fn moderator() -> AuthUser {
    AuthUser::new(Uuid::new_v4(), UserRole::Moderator)
}

pub fn media(uploader_id: Uuid) -> Media {
    let now = Utc::now();
    Media {
        id: Uuid::new_v4(),
        uploader_id,
        title: "Sunday Sermon".to_string(),
        description: None,
        media_type: MediaType::Video,
        url: "https://cdn.vesper.test/sermon.mp4".to_string(),
        duration_seconds: Some(600.0),
        category: Some("sermon".to_string()),
        moderation_status: ModerationStatus::Active,
        view_count: 0,
        like_count: 0,
        bookmark_count: 0,
        report_count: 0,
        is_deleted: false,
        deleted_at: None,
        created_at: now,
        updated_at: now,
    }
}
