use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::models::{Match, MatchStatus};

/// Validates a new match request before anything touches the store.
/// Pair-level duplicate prevention lives in the store (partial unique index
/// on the unordered pair where status is not ended).
pub fn validate_request(initiator: Uuid, target: Uuid, score: i32) -> CoreResult<()> {
    if initiator == target {
        return Err(CoreError::InvalidRequest(
            "cannot request a match with yourself".to_string(),
        ));
    }
    if !(0..=100).contains(&score) {
        return Err(CoreError::InvalidRequest(format!(
            "compatibility score {score} outside 0-100"
        )));
    }
    Ok(())
}

/// Resolves a respond() call: only the non-initiating party may answer, and
/// only while the match is pending. Returns the status the match moves to.
pub fn respond_transition(m: &Match, responder: Uuid, accept: bool) -> CoreResult<MatchStatus> {
    if !m.involves(responder) {
        return Err(CoreError::NotAuthorized(
            "only the two matched users may act on a match".to_string(),
        ));
    }
    if responder == m.initiated_by {
        return Err(CoreError::NotAuthorized(
            "the initiator cannot respond to their own request".to_string(),
        ));
    }
    if m.status != MatchStatus::Pending {
        return Err(CoreError::InvalidState(format!(
            "match is {}, expected pending",
            m.status.as_str()
        )));
    }
    Ok(if accept {
        MatchStatus::Active
    } else {
        MatchStatus::Ended
    })
}

/// Resolves an end() call: either participant may end, but only an active
/// match. Ended is terminal.
pub fn end_transition(m: &Match, actor: Uuid) -> CoreResult<()> {
    if !m.involves(actor) {
        return Err(CoreError::NotAuthorized(
            "only the two matched users may act on a match".to_string(),
        ));
    }
    if m.status != MatchStatus::Active {
        return Err(CoreError::InvalidState(format!(
            "match is {}, expected active",
            m.status.as_str()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn pending_match(initiator: Uuid, target: Uuid) -> Match {
        Match {
            id: Uuid::new_v4(),
            user_a: initiator,
            user_b: target,
            initiated_by: initiator,
            status: MatchStatus::Pending,
            compatibility_score: 67,
            common_subjects: vec!["Math".to_string()],
            created_at: Utc::now(),
            responded_at: None,
            ended_at: None,
            end_reason: None,
        }
    }

    #[test]
    fn self_match_is_rejected() {
        let user = Uuid::new_v4();
        assert!(matches!(
            validate_request(user, user, 50),
            Err(CoreError::InvalidRequest(_))
        ));
    }

    #[test]
    fn out_of_range_score_is_rejected() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        assert!(validate_request(a, b, 100).is_ok());
        assert!(validate_request(a, b, 101).is_err());
        assert!(validate_request(a, b, -1).is_err());
    }

    #[test]
    fn target_accepting_activates_the_match() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let m = pending_match(a, b);
        assert_eq!(respond_transition(&m, b, true).unwrap(), MatchStatus::Active);
    }

    #[test]
    fn target_rejecting_ends_the_match() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let m = pending_match(a, b);
        assert_eq!(respond_transition(&m, b, false).unwrap(), MatchStatus::Ended);
    }

    #[test]
    fn initiator_cannot_respond_to_own_request() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let m = pending_match(a, b);
        assert!(matches!(
            respond_transition(&m, a, true),
            Err(CoreError::NotAuthorized(_))
        ));
    }

    #[test]
    fn outsider_cannot_respond() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let m = pending_match(a, b);
        assert!(matches!(
            respond_transition(&m, Uuid::new_v4(), true),
            Err(CoreError::NotAuthorized(_))
        ));
    }

    #[test]
    fn responding_twice_fails_on_state() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let mut m = pending_match(a, b);
        m.status = MatchStatus::Active;
        assert!(matches!(
            respond_transition(&m, b, false),
            Err(CoreError::InvalidState(_))
        ));
    }

    #[test]
    fn either_party_may_end_an_active_match() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let mut m = pending_match(a, b);
        m.status = MatchStatus::Active;
        assert!(end_transition(&m, a).is_ok());
        assert!(end_transition(&m, b).is_ok());
    }

    #[test]
    fn ended_is_terminal() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let mut m = pending_match(a, b);
        m.status = MatchStatus::Ended;
        assert!(matches!(
            end_transition(&m, a),
            Err(CoreError::InvalidState(_))
        ));
    }

    #[test]
    fn pending_match_cannot_be_ended_directly() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let m = pending_match(a, b);
        assert!(matches!(
            end_transition(&m, b),
            Err(CoreError::InvalidState(_))
        ));
    }

    #[test]
    fn outsider_cannot_end() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let mut m = pending_match(a, b);
        m.status = MatchStatus::Active;
        assert!(matches!(
            end_transition(&m, Uuid::new_v4()),
            Err(CoreError::NotAuthorized(_))
        ));
    }
}
