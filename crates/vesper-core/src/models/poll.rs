use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

pub const MIN_POLL_OPTIONS: usize = 2;
pub const MAX_POLL_OPTIONS: usize = 10;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Poll {
    pub id: Uuid,
    pub creator_id: Uuid,
    pub question: String,
    pub options: Vec<String>,
    pub is_closed: bool,
    pub closes_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Poll {
    /// Closed explicitly or past its closing time.
    pub fn is_open_at(&self, now: DateTime<Utc>) -> bool {
        !self.is_closed && self.closes_at.map_or(true, |closes| closes > now)
    }
}

/// Row of a `GROUP BY option_index` tally query.
#[derive(Debug, Clone, FromRow)]
pub struct OptionVoteCount {
    pub option_index: i32,
    pub votes: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PollOptionResult {
    pub index: i32,
    pub text: String,
    pub votes: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PollWithResults {
    #[serde(flatten)]
    pub poll: Poll,
    pub results: Vec<PollOptionResult>,
    pub total_votes: i64,
    /// Option the caller voted for, when authenticated
    pub user_vote: Option<i32>,
}

impl PollWithResults {
    /// Zero-fills options nobody voted for.
    pub fn from_counts(poll: Poll, counts: &[OptionVoteCount], user_vote: Option<i32>) -> Self {
        let results: Vec<PollOptionResult> = poll
            .options
            .iter()
            .enumerate()
            .map(|(i, text)| PollOptionResult {
                index: i as i32,
                text: text.clone(),
                votes: counts
                    .iter()
                    .find(|c| c.option_index == i as i32)
                    .map_or(0, |c| c.votes),
            })
            .collect();
        let total_votes = results.iter().map(|r| r.votes).sum();
        Self {
            poll,
            results,
            total_votes,
            user_vote,
        }
    }
}

fn validate_poll_options(options: &[String]) -> Result<(), ValidationError> {
    if options.len() < MIN_POLL_OPTIONS || options.len() > MAX_POLL_OPTIONS {
        return Err(ValidationError::new("option_count")
            .with_message("A poll needs between 2 and 10 options".into()));
    }
    let mut seen = HashSet::new();
    for option in options {
        let normalized = option.trim().to_lowercase();
        if normalized.is_empty() || normalized.len() > 200 {
            return Err(ValidationError::new("option_length")
                .with_message("Options must be between 1 and 200 characters".into()));
        }
        if !seen.insert(normalized) {
            return Err(ValidationError::new("option_duplicate")
                .with_message("Poll options must be distinct".into()));
        }
    }
    Ok(())
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreatePollRequest {
    #[validate(length(min = 5, max = 300, message = "Question must be between 5 and 300 characters"))]
    pub question: String,
    #[validate(custom(function = "validate_poll_options"))]
    pub options: Vec<String>,
    #[serde(default)]
    pub closes_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct VoteRequest {
    #[validate(range(min = 0, message = "option_index must not be negative"))]
    pub option_index: i32,
}

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
pub struct PollListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    /// Only open polls when true
    pub open: Option<bool>,
}
