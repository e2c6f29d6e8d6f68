//! Rows seeded straight into the database.

use uuid::Uuid;

/// Active audio media owned by `uploader_id`.
pub async fn create_test_media(pool: &sqlx::PgPool, uploader_id: Uuid, duration: f64) -> Uuid {
    sqlx::query_scalar(
        r#"
        INSERT INTO media (uploader_id, title, media_type, url, duration_seconds, category)
        VALUES ($1, 'Morning Devotion', 'audio'::media_type, 'https://cdn.example.com/devotion.mp3', $2, 'devotional')
        RETURNING id
        "#,
    )
    .bind(uploader_id)
    .bind(duration)
    .fetch_one(pool)
    .await
    .expect("Failed to insert test media")
}

pub async fn create_test_hymn(pool: &sqlx::PgPool, number: i32, title: &str, category: &str) -> Uuid {
    sqlx::query_scalar(
        "INSERT INTO hymns (number, title, category, lyrics) VALUES ($1, $2, $3, $4) RETURNING id",
    )
    .bind(number)
    .bind(title)
    .bind(category)
    .bind(format!("Verse one of {}", title))
    .fetch_one(pool)
    .await
    .expect("Failed to insert test hymn")
}

pub async fn media_counter(pool: &sqlx::PgPool, media_id: Uuid, column: &str) -> i64 {
    sqlx::query_scalar::<_, i64>(&format!(
        "SELECT {}::BIGINT FROM media WHERE id = $1",
        column
    ))
    .bind(media_id)
    .fetch_one(pool)
    .await
    .expect("Failed to read media counter")
}
