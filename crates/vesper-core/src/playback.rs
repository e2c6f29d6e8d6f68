//! Playback session lifecycle
//!
//! Pure transition logic over [`PlaybackSession`]. Nothing here touches storage; the playback
//! service loads a session, applies one of these transitions and persists the result.
//!
//! ```text
//! Idle --start--> Active --pause--> Paused --resume--> Active
//!                   |                  |
//!                   +-------end--------+--> Ended (terminal)
//! ```

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::{EndReason, NewPlaybackSession, PlaybackSession};
use crate::AppError;

pub const DEFAULT_COMPLETION_THRESHOLD: f64 = 0.9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Active,
    Paused,
    Ended,
}

impl PlaybackSession {
    pub fn state(&self) -> PlaybackState {
        if self.ended_at.is_some() {
            PlaybackState::Ended
        } else if self.is_paused {
            PlaybackState::Paused
        } else {
            PlaybackState::Active
        }
    }

    pub fn is_active(&self) -> bool {
        self.state() == PlaybackState::Active
    }

    pub fn is_ended(&self) -> bool {
        self.state() == PlaybackState::Ended
    }
}

/// Clamp a position into `[0, duration]`.
pub fn clamp_position(position: f64, duration: f64) -> f64 {
    if !position.is_finite() || position < 0.0 {
        return 0.0;
    }
    if duration > 0.0 {
        position.min(duration)
    } else {
        position
    }
}

/// Percentage of `duration` covered by `position`, clamped into `[0, 100]`.
pub fn progress_percentage(position: f64, duration: f64) -> f64 {
    if duration <= 0.0 {
        return 0.0;
    }
    clamp_percentage(position / duration * 100.0)
}

fn clamp_percentage(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 100.0)
    } else {
        0.0
    }
}

/// Whether a session ending at `final_position` counts as a view.
pub fn qualifies_as_view(final_position: f64, duration: f64, threshold: f64) -> bool {
    duration > 0.0 && final_position / duration >= threshold
}

/// Build the values for a new active session.
pub fn new_session(
    user_id: Uuid,
    media_id: Uuid,
    duration: f64,
    position: Option<f64>,
    device_info: Option<String>,
    user_agent: Option<String>,
    now: DateTime<Utc>,
) -> NewPlaybackSession {
    let position = clamp_position(position.unwrap_or(0.0), duration);
    NewPlaybackSession {
        user_id,
        media_id,
        duration,
        position,
        progress_percentage: progress_percentage(position, duration),
        device_info,
        user_agent,
        started_at: now,
    }
}

fn ensure_not_ended(session: &PlaybackSession) -> Result<(), AppError> {
    if session.is_ended() {
        return Err(AppError::BadRequest(
            "Playback session has already ended".to_string(),
        ));
    }
    Ok(())
}

/// Add the time spent active since `last_active_at` and restart the clock at `now`.
fn accrue_watch_time(session: &mut PlaybackSession, now: DateTime<Utc>) {
    if session.is_active() {
        let elapsed = (now - session.last_active_at).num_milliseconds().max(0) as f64 / 1000.0;
        session.total_watch_time += elapsed;
    }
    session.last_active_at = now;
}

/// Record a new position. Rewinds are allowed. When `percentage` is absent it is derived from
/// the position.
pub fn apply_progress(
    session: &mut PlaybackSession,
    position: f64,
    duration: Option<f64>,
    percentage: Option<f64>,
    now: DateTime<Utc>,
) -> Result<(), AppError> {
    ensure_not_ended(session)?;
    if let Some(d) = duration.filter(|d| d.is_finite() && *d > 0.0) {
        session.duration = d;
    }
    accrue_watch_time(session, now);
    session.current_position = clamp_position(position, session.duration);
    session.progress_percentage = match percentage {
        Some(p) => clamp_percentage(p),
        None => progress_percentage(session.current_position, session.duration),
    };
    Ok(())
}

/// Returns `false` when the session was already paused.
pub fn pause(session: &mut PlaybackSession, now: DateTime<Utc>) -> Result<bool, AppError> {
    ensure_not_ended(session)?;
    if session.is_paused {
        return Ok(false);
    }
    accrue_watch_time(session, now);
    session.is_paused = true;
    session.paused_at = Some(now);
    Ok(true)
}

/// Returns `false` when the session was already active.
pub fn resume(session: &mut PlaybackSession, now: DateTime<Utc>) -> Result<bool, AppError> {
    ensure_not_ended(session)?;
    if !session.is_paused {
        return Ok(false);
    }
    session.is_paused = false;
    session.paused_at = None;
    session.last_active_at = now;
    Ok(true)
}

/// End the session. Returns whether the final position qualifies as a view; the caller records
/// the view and flips `view_recorded`.
pub fn end(
    session: &mut PlaybackSession,
    reason: EndReason,
    final_position: Option<f64>,
    threshold: f64,
    now: DateTime<Utc>,
) -> Result<bool, AppError> {
    ensure_not_ended(session)?;
    accrue_watch_time(session, now);
    if let Some(position) = final_position {
        session.current_position = clamp_position(position, session.duration);
        session.progress_percentage =
            progress_percentage(session.current_position, session.duration);
    }
    session.ended_at = Some(now);
    session.end_reason = Some(reason);
    Ok(!session.view_recorded
        && qualifies_as_view(session.current_position, session.duration, threshold))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn session(now: DateTime<Utc>) -> PlaybackSession {
        PlaybackSession {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            media_id: Uuid::new_v4(),
            duration: 200.0,
            current_position: 0.0,
            progress_percentage: 0.0,
            is_paused: false,
            started_at: now,
            last_active_at: now,
            paused_at: None,
            ended_at: None,
            end_reason: None,
            total_watch_time: 0.0,
            device_info: None,
            user_agent: None,
            view_recorded: false,
        }
    }

    #[test]
    fn positions_are_clamped() {
        assert_eq!(clamp_position(-5.0, 100.0), 0.0);
        assert_eq!(clamp_position(150.0, 100.0), 100.0);
        assert_eq!(clamp_position(f64::NAN, 100.0), 0.0);
        assert_eq!(progress_percentage(50.0, 200.0), 25.0);
        assert_eq!(progress_percentage(500.0, 200.0), 100.0);
    }

    #[test]
    fn new_session_starts_at_clamped_position() {
        let now = Utc::now();
        let new = new_session(Uuid::new_v4(), Uuid::new_v4(), 100.0, Some(250.0), None, None, now);
        assert_eq!(new.position, 100.0);
        assert_eq!(new.progress_percentage, 100.0);
    }

    #[test]
    fn watch_time_accrues_only_while_active() {
        let t0 = Utc::now();
        let mut s = session(t0);
        apply_progress(&mut s, 30.0, None, None, t0 + Duration::seconds(30)).unwrap();
        assert_eq!(s.total_watch_time, 30.0);

        assert!(pause(&mut s, t0 + Duration::seconds(40)).unwrap());
        assert_eq!(s.total_watch_time, 40.0);

        // Ten minutes paused add nothing.
        assert!(resume(&mut s, t0 + Duration::seconds(640)).unwrap());
        end(&mut s, EndReason::Stopped, None, 0.9, t0 + Duration::seconds(650)).unwrap();
        assert_eq!(s.total_watch_time, 50.0);
    }

    #[test]
    fn pause_and_resume_are_idempotent() {
        let now = Utc::now();
        let mut s = session(now);
        assert!(pause(&mut s, now).unwrap());
        assert!(!pause(&mut s, now).unwrap());
        assert_eq!(s.state(), PlaybackState::Paused);
        assert!(resume(&mut s, now).unwrap());
        assert!(!resume(&mut s, now).unwrap());
        assert_eq!(s.state(), PlaybackState::Active);
    }

    #[test]
    fn ended_session_rejects_every_mutation() {
        let now = Utc::now();
        let mut s = session(now);
        end(&mut s, EndReason::Stopped, None, 0.9, now).unwrap();
        assert_eq!(s.state(), PlaybackState::Ended);
        assert!(matches!(apply_progress(&mut s, 1.0, None, None, now), Err(AppError::BadRequest(_))));
        assert!(pause(&mut s, now).is_err());
        assert!(resume(&mut s, now).is_err());
        assert!(end(&mut s, EndReason::Stopped, None, 0.9, now).is_err());
    }

    #[test]
    fn end_at_threshold_qualifies() {
        let now = Utc::now();
        let mut s = session(now);
        assert!(end(&mut s, EndReason::Completed, Some(180.0), 0.9, now).unwrap());

        let mut below = session(now);
        assert!(!end(&mut below, EndReason::Stopped, Some(179.0), 0.9, now).unwrap());
    }

    #[test]
    fn rewind_is_allowed_and_percentage_can_be_supplied() {
        let now = Utc::now();
        let mut s = session(now);
        apply_progress(&mut s, 150.0, None, None, now).unwrap();
        apply_progress(&mut s, 20.0, None, Some(140.0), now).unwrap();
        assert_eq!(s.current_position, 20.0);
        assert_eq!(s.progress_percentage, 100.0);
    }
}
