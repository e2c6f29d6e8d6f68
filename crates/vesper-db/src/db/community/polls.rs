use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres};
use uuid::Uuid;
use vesper_core::models::{OptionVoteCount, PageRequest, Paginated, Poll, SortOrder};
use vesper_core::AppError;

use crate::db::query::{execute_paginated_query, Condition, QueryOptions, SortSpec};

const POLL_COLUMNS: &str = "id, creator_id, question, options, is_closed, closes_at, created_at";

/// Repository for polls and votes
#[derive(Clone)]
pub struct PollRepository {
    pool: PgPool,
}

impl PollRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[tracing::instrument(skip(self, question, options), fields(db.table = "polls", db.operation = "insert"))]
    pub async fn create(
        &self,
        creator_id: Uuid,
        question: &str,
        options: &[String],
        closes_at: Option<DateTime<Utc>>,
    ) -> Result<Poll, AppError> {
        let poll = sqlx::query_as::<Postgres, Poll>(&format!(
            "INSERT INTO polls (creator_id, question, options, closes_at) VALUES ($1, $2, $3, $4) RETURNING {}",
            POLL_COLUMNS
        ))
        .bind(creator_id)
        .bind(question)
        .bind(options)
        .bind(closes_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(poll)
    }

    #[tracing::instrument(skip(self), fields(db.table = "polls", db.operation = "select", db.record_id = %id))]
    pub async fn find(&self, id: Uuid) -> Result<Option<Poll>, AppError> {
        let poll = sqlx::query_as::<Postgres, Poll>(&format!(
            "SELECT {} FROM polls WHERE id = $1",
            POLL_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(poll)
    }

    #[tracing::instrument(skip(self), fields(db.table = "polls", db.operation = "select"))]
    pub async fn list(
        &self,
        open_only: bool,
        page: PageRequest,
    ) -> Result<Paginated<Poll>, AppError> {
        let conditions = if open_only {
            vec![
                Condition::Raw("is_closed = false"),
                Condition::Raw("(closes_at IS NULL OR closes_at > NOW())"),
            ]
        } else {
            Vec::new()
        };
        let opts = QueryOptions {
            sort: SortSpec::new("created_at", SortOrder::Desc),
            page,
        };
        execute_paginated_query(&self.pool, "polls", POLL_COLUMNS, &conditions, &opts).await
    }

    #[tracing::instrument(skip(self), fields(db.table = "poll_votes", db.operation = "aggregate", db.record_id = %poll_id))]
    pub async fn tallies(&self, poll_id: Uuid) -> Result<Vec<OptionVoteCount>, AppError> {
        let counts = sqlx::query_as::<Postgres, OptionVoteCount>(
            r#"
            SELECT option_index, COUNT(*) AS votes
            FROM poll_votes
            WHERE poll_id = $1
            GROUP BY option_index
            ORDER BY option_index
            "#,
        )
        .bind(poll_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(counts)
    }

    #[tracing::instrument(skip(self), fields(db.table = "poll_votes", db.operation = "select"))]
    pub async fn user_vote(&self, poll_id: Uuid, user_id: Uuid) -> Result<Option<i32>, AppError> {
        let vote = sqlx::query_scalar::<Postgres, i32>(
            "SELECT option_index FROM poll_votes WHERE poll_id = $1 AND user_id = $2",
        )
        .bind(poll_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(vote)
    }

    /// One vote per user; a second vote fails with [`AppError::Conflict`].
    #[tracing::instrument(skip(self), fields(db.table = "poll_votes", db.operation = "insert"))]
    pub async fn vote(&self, poll_id: Uuid, user_id: Uuid, option_index: i32) -> Result<(), AppError> {
        let result = sqlx::query(
            "INSERT INTO poll_votes (poll_id, user_id, option_index) VALUES ($1, $2, $3)",
        )
        .bind(poll_id)
        .bind(user_id)
        .bind(option_index)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) => {
                let err = AppError::from(e);
                if err.is_unique_violation() {
                    Err(AppError::Conflict("You have already voted in this poll".to_string()))
                } else {
                    Err(err)
                }
            }
        }
    }

    #[tracing::instrument(skip(self), fields(db.table = "polls", db.operation = "update", db.record_id = %id))]
    pub async fn close(&self, id: Uuid) -> Result<Option<Poll>, AppError> {
        let poll = sqlx::query_as::<Postgres, Poll>(&format!(
            "UPDATE polls SET is_closed = true WHERE id = $1 RETURNING {}",
            POLL_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(poll)
    }
}
