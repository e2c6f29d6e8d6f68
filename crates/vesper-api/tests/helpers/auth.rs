use chrono::Duration;
use uuid::Uuid;
use vesper_api::auth::JwtKeys;
use vesper_core::models::UserRole;

use super::TEST_JWT_SECRET;

/// Seeded user and a bearer token for it.
pub struct TestUser {
    pub user_id: Uuid,
    pub role: UserRole,
    pub token: String,
}

impl TestUser {
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

pub fn token_for(user_id: Uuid, role: UserRole) -> String {
    JwtKeys::new(TEST_JWT_SECRET)
        .issue(user_id, role, Duration::hours(1))
        .expect("Failed to sign test token")
}

/// Insert a user row with the given role and mint a token for it.
pub async fn create_test_user(pool: &sqlx::PgPool, role: UserRole) -> TestUser {
    let suffix = Uuid::new_v4().simple().to_string();
    let user_id: Uuid = sqlx::query_scalar(
        "INSERT INTO users (email, display_name, role) VALUES ($1, $2, $3::user_role) RETURNING id",
    )
    .bind(format!("user-{}@example.com", suffix))
    .bind(format!("Test {}", role.as_str()))
    .bind(role.as_str())
    .fetch_one(pool)
    .await
    .expect("Failed to insert test user");

    TestUser {
        user_id,
        role,
        token: token_for(user_id, role),
    }
}
