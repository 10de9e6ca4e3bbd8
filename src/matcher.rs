use uuid::Uuid;

use crate::models::{Candidate, PoolEntry};

/// Subjects shared between the requester and a candidate, in the
/// requester's declaration order.
pub fn common_subjects(requesting: &[String], theirs: &[String]) -> Vec<String> {
    requesting
        .iter()
        .filter(|subject| theirs.contains(subject))
        .cloned()
        .collect()
}

/// Overlap normalized by the larger subject set, rounded to an integer
/// percentage in 0..=100.
pub fn compatibility_score(common: usize, requesting: usize, theirs: usize) -> i32 {
    let larger = requesting.max(theirs);
    if larger == 0 {
        // Unreachable when common > 0, kept as a division guard.
        return 0;
    }
    ((common as f64 / larger as f64) * 100.0).round() as i32
}

/// Rank a candidate pool by subject compatibility with the requesting user.
/// The requester and zero-overlap candidates are dropped entirely; ties keep
/// pool order. Callers truncate the result for display.
pub fn rank_candidates(
    requesting_user: Uuid,
    requesting_subjects: &[String],
    pool: &[PoolEntry],
) -> Vec<Candidate> {
    let mut candidates = Vec::new();

    for entry in pool.iter() {
        if entry.user_id == requesting_user {
            continue;
        }

        let common = common_subjects(requesting_subjects, &entry.subjects);
        if common.is_empty() {
            continue;
        }

        let score = compatibility_score(
            common.len(),
            requesting_subjects.len(),
            entry.subjects.len(),
        );

        candidates.push(Candidate {
            user_id: entry.user_id,
            display_name: entry.display_name.clone(),
            campus: entry.campus.clone(),
            common_subjects: common,
            compatibility_score: score,
        });
    }

    candidates.sort_by(|a, b| b.compatibility_score.cmp(&a.compatibility_score));
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subjects(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn entry(name: &str, list: &[&str]) -> PoolEntry {
        PoolEntry {
            user_id: Uuid::new_v4(),
            display_name: name.to_string(),
            campus: "main".to_string(),
            subjects: subjects(list),
        }
    }

    #[test]
    fn partial_overlap_normalizes_by_larger_set() {
        let common = common_subjects(
            &subjects(&["Math", "Physics"]),
            &subjects(&["Math", "Chemistry", "Physics"]),
        );
        assert_eq!(common, subjects(&["Math", "Physics"]));
        assert_eq!(compatibility_score(common.len(), 2, 3), 67);
    }

    #[test]
    fn identical_single_subject_scores_full() {
        assert_eq!(compatibility_score(1, 1, 1), 100);
    }

    #[test]
    fn empty_sets_do_not_divide_by_zero() {
        assert_eq!(compatibility_score(0, 0, 0), 0);
    }

    #[test]
    fn zero_overlap_candidates_are_dropped() {
        let requester = Uuid::new_v4();
        let pool = vec![entry("Deniz", &["Hukuka Giriş"]), entry("Ece", &["Math"])];

        let ranked = rank_candidates(requester, &subjects(&["Math", "Physics"]), &pool);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].display_name, "Ece");
    }

    #[test]
    fn requester_is_excluded_from_results() {
        let own = entry("Self", &["Math"]);
        let requester = own.user_id;
        let pool = vec![own, entry("Ece", &["Math"])];

        let ranked = rank_candidates(requester, &subjects(&["Math"]), &pool);
        assert_eq!(ranked.len(), 1);
        assert_ne!(ranked[0].user_id, requester);
    }

    #[test]
    fn results_sorted_descending_with_stable_ties() {
        let requester = Uuid::new_v4();
        let pool = vec![
            entry("Low", &["Math", "Chemistry", "Biology", "Physics"]),
            entry("TieFirst", &["Math", "Physics"]),
            entry("TieSecond", &["Math", "Physics"]),
        ];

        let ranked = rank_candidates(requester, &subjects(&["Math", "Physics"]), &pool);
        let names: Vec<&str> = ranked.iter().map(|c| c.display_name.as_str()).collect();
        assert_eq!(names, vec!["TieFirst", "TieSecond", "Low"]);
        assert_eq!(ranked[0].compatibility_score, 100);
        assert_eq!(ranked[2].compatibility_score, 50);
    }

    #[test]
    fn scores_stay_within_bounds() {
        for (common, a, b) in [(1usize, 5usize, 1usize), (3, 3, 9), (2, 2, 2)] {
            let score = compatibility_score(common, a, b);
            assert!(score > 0 && score <= 100, "score {score} out of range");
        }
    }

    #[test]
    fn common_subjects_follow_requester_order() {
        let common = common_subjects(
            &subjects(&["Physics", "Math", "Biology"]),
            &subjects(&["Math", "Physics"]),
        );
        assert_eq!(common, subjects(&["Physics", "Math"]));
    }
}
