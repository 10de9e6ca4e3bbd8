use chrono::{DateTime, Utc};

use crate::error::{CoreError, CoreResult};
use crate::models::{Rating, Session, SessionStatus};

/// Whole minutes elapsed between start and stop, floored. Negative spans
/// (clock skew) clamp to zero.
pub fn duration_minutes(started_at: DateTime<Utc>, ended_at: DateTime<Utc>) -> i32 {
    let elapsed_secs = (ended_at - started_at).num_seconds().max(0);
    (elapsed_secs / 60) as i32
}

/// A planned session may be started later; the usual flow creates sessions
/// directly in the active state.
pub fn begin_transition(session: &Session) -> CoreResult<()> {
    if session.status != SessionStatus::Planned {
        return Err(CoreError::InvalidState(format!(
            "session is {}, expected planned",
            session.status.as_str()
        )));
    }
    Ok(())
}

/// Stopping is one-way: only an active session completes, and a completed
/// session can never restart.
pub fn stop_transition(session: &Session) -> CoreResult<DateTime<Utc>> {
    if session.status != SessionStatus::Active {
        return Err(CoreError::InvalidState(format!(
            "session is {}, expected active",
            session.status.as_str()
        )));
    }
    session.started_at.ok_or_else(|| {
        CoreError::Internal(format!("active session {} has no start timestamp", session.id))
    })
}

/// Cancellation covers abandonment (missed planned session, navigation away
/// from an active one). No duration is recorded.
pub fn cancel_transition(session: &Session) -> CoreResult<()> {
    match session.status {
        SessionStatus::Planned | SessionStatus::Active => Ok(()),
        other => Err(CoreError::InvalidState(format!(
            "session is {}, expected planned or active",
            other.as_str()
        ))),
    }
}

/// Ratings attach only to completed sessions and each dimension must sit on
/// the 1-5 scale. Upsert semantics for repeated submissions live in the store.
pub fn validate_rating(session: &Session, rating: &Rating) -> CoreResult<()> {
    if session.status != SessionStatus::Completed {
        return Err(CoreError::InvalidState(format!(
            "session is {}, only completed sessions can be rated",
            session.status.as_str()
        )));
    }
    for (label, value) in [
        ("focus_level", rating.focus_level),
        ("stress_level", rating.stress_level),
        ("productivity", rating.productivity),
    ] {
        if !(1..=5).contains(&value) {
            return Err(CoreError::InvalidRequest(format!(
                "{label} must be between 1 and 5, got {value}"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use uuid::Uuid;

    fn session(status: SessionStatus) -> Session {
        let now = Utc::now();
        Session {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            subject: "Lineer Cebir".to_string(),
            planned_minutes: 25,
            duration_minutes: None,
            status,
            created_at: now,
            started_at: Some(now),
            ended_at: None,
        }
    }

    #[test]
    fn elapsed_seconds_floor_to_minutes() {
        let start = Utc::now();
        assert_eq!(duration_minutes(start, start + Duration::seconds(125)), 2);
        assert_eq!(duration_minutes(start, start + Duration::seconds(59)), 0);
        assert_eq!(duration_minutes(start, start + Duration::seconds(60)), 1);
    }

    #[test]
    fn negative_spans_clamp_to_zero() {
        let start = Utc::now();
        assert_eq!(duration_minutes(start, start - Duration::seconds(30)), 0);
    }

    #[test]
    fn only_active_sessions_stop() {
        assert!(stop_transition(&session(SessionStatus::Active)).is_ok());
        for status in [
            SessionStatus::Planned,
            SessionStatus::Completed,
            SessionStatus::Cancelled,
        ] {
            assert!(matches!(
                stop_transition(&session(status)),
                Err(CoreError::InvalidState(_))
            ));
        }
    }

    #[test]
    fn only_planned_sessions_begin() {
        assert!(begin_transition(&session(SessionStatus::Planned)).is_ok());
        assert!(begin_transition(&session(SessionStatus::Active)).is_err());
    }

    #[test]
    fn cancel_allowed_from_planned_and_active_only() {
        assert!(cancel_transition(&session(SessionStatus::Planned)).is_ok());
        assert!(cancel_transition(&session(SessionStatus::Active)).is_ok());
        assert!(cancel_transition(&session(SessionStatus::Completed)).is_err());
        assert!(cancel_transition(&session(SessionStatus::Cancelled)).is_err());
    }

    #[test]
    fn ratings_require_completed_session() {
        let rating = Rating {
            focus_level: 4,
            stress_level: 2,
            productivity: 5,
        };
        assert!(validate_rating(&session(SessionStatus::Completed), &rating).is_ok());
        assert!(matches!(
            validate_rating(&session(SessionStatus::Active), &rating),
            Err(CoreError::InvalidState(_))
        ));
    }

    #[test]
    fn rating_values_must_sit_on_the_scale() {
        let completed = session(SessionStatus::Completed);
        for bad in [0, 6, -1] {
            let rating = Rating {
                focus_level: bad,
                stress_level: 3,
                productivity: 3,
            };
            assert!(matches!(
                validate_rating(&completed, &rating),
                Err(CoreError::InvalidRequest(_))
            ));
        }
    }
}
