use std::fmt::Write;

use chrono::{DateTime, Utc};

use crate::models::{Rating, SessionStatus, SessionSummary, SubjectSummary, WeeklyMinutes};

const WEEKS_SHOWN: i64 = 8;
const SUBJECTS_SHOWN: usize = 5;
const TREND_POINTS: usize = 10;

pub fn summarize_by_subject(sessions: &[SessionSummary]) -> Vec<SubjectSummary> {
    let mut map: std::collections::HashMap<String, (usize, i64)> =
        std::collections::HashMap::new();

    for session in sessions {
        let entry = map.entry(session.subject.clone()).or_insert((0, 0));
        entry.0 += 1;
        entry.1 += session.duration_minutes as i64;
    }

    let mut summaries: Vec<SubjectSummary> = map
        .into_iter()
        .map(|(subject, (session_count, total_minutes))| SubjectSummary {
            subject,
            session_count,
            total_minutes,
        })
        .collect();

    summaries.sort_by(|a, b| b.total_minutes.cmp(&a.total_minutes));
    summaries
}

/// Minutes studied per week over the last eight weeks, oldest week first.
/// Week 0 is the seven days ending at `now`.
pub fn weekly_minutes(sessions: &[SessionSummary], now: DateTime<Utc>) -> Vec<WeeklyMinutes> {
    let mut buckets: std::collections::HashMap<i64, i64> = std::collections::HashMap::new();

    for session in sessions {
        let weeks_ago = (now - session.created_at).num_days() / 7;
        if !(0..WEEKS_SHOWN).contains(&weeks_ago) {
            continue;
        }
        *buckets.entry(weeks_ago).or_insert(0) += session.duration_minutes as i64;
    }

    let mut weeks: Vec<WeeklyMinutes> = buckets
        .into_iter()
        .map(|(weeks_ago, minutes)| WeeklyMinutes { weeks_ago, minutes })
        .collect();
    weeks.sort_by(|a, b| b.weeks_ago.cmp(&a.weeks_ago));
    weeks
}

pub fn build_report(
    display_name: &str,
    sessions: &[SessionSummary],
    now: DateTime<Utc>,
) -> String {
    let completed: Vec<SessionSummary> = sessions
        .iter()
        .filter(|s| s.status == SessionStatus::Completed)
        .cloned()
        .collect();
    let total_minutes: i64 = completed.iter().map(|s| s.duration_minutes as i64).sum();
    let avg_minutes = if completed.is_empty() {
        0
    } else {
        (total_minutes as f64 / completed.len() as f64).round() as i64
    };
    let subjects = summarize_by_subject(&completed);
    let weeks = weekly_minutes(&completed, now);

    let mut output = String::new();
    let _ = writeln!(output, "# Study Progress Report");
    let _ = writeln!(
        output,
        "Generated for {} on {}",
        display_name,
        now.date_naive()
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Totals");
    let _ = writeln!(output, "- Completed sessions: {}", completed.len());
    let _ = writeln!(
        output,
        "- Total study time: {}h {}min",
        total_minutes / 60,
        total_minutes % 60
    );
    let _ = writeln!(output, "- Average session: {avg_minutes}min");

    let _ = writeln!(output);
    let _ = writeln!(output, "## Weekly Minutes");
    if weeks.is_empty() {
        let _ = writeln!(output, "No completed sessions in the last {WEEKS_SHOWN} weeks.");
    } else {
        for week in weeks.iter() {
            let label = if week.weeks_ago == 0 {
                "this week".to_string()
            } else {
                format!("{} weeks ago", week.weeks_ago)
            };
            let _ = writeln!(output, "- {}: {}min", label, week.minutes);
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Subject Mix");
    if subjects.is_empty() {
        let _ = writeln!(output, "No completed sessions yet.");
    } else {
        for summary in subjects.iter().take(SUBJECTS_SHOWN) {
            let _ = writeln!(
                output,
                "- {}: {}min across {} sessions",
                summary.subject, summary.total_minutes, summary.session_count
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Rating Trend");
    let mut rated: Vec<(&SessionSummary, &Rating)> = completed
        .iter()
        .filter_map(|s| s.rating.as_ref().map(|r| (s, r)))
        .collect();
    rated.sort_by(|a, b| b.0.created_at.cmp(&a.0.created_at));
    rated.truncate(TREND_POINTS);
    rated.reverse();

    if rated.is_empty() {
        let _ = writeln!(output, "No rated sessions yet.");
    } else {
        for (session, rating) in rated {
            let _ = writeln!(
                output,
                "- {} ({}): focus {} / stress {} / productivity {}",
                session.created_at.date_naive(),
                session.subject,
                rating.focus_level,
                rating.stress_level,
                rating.productivity
            );
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Rating;
    use chrono::Duration;

    fn summary(subject: &str, minutes: i32, days_ago: i64) -> SessionSummary {
        SessionSummary {
            subject: subject.to_string(),
            status: SessionStatus::Completed,
            duration_minutes: minutes,
            created_at: Utc::now() - Duration::days(days_ago),
            rating: None,
        }
    }

    #[test]
    fn subjects_rank_by_total_minutes() {
        let sessions = vec![
            summary("Math", 30, 1),
            summary("Physics", 90, 2),
            summary("Math", 40, 3),
        ];
        let summaries = summarize_by_subject(&sessions);
        assert_eq!(summaries[0].subject, "Physics");
        assert_eq!(summaries[1].subject, "Math");
        assert_eq!(summaries[1].total_minutes, 70);
        assert_eq!(summaries[1].session_count, 2);
    }

    #[test]
    fn weekly_buckets_drop_old_sessions() {
        let now = Utc::now();
        let sessions = vec![
            summary("Math", 25, 2),
            summary("Math", 35, 10),
            summary("Math", 50, 70),
        ];
        let weeks = weekly_minutes(&sessions, now);
        assert_eq!(weeks.len(), 2);
        // oldest week first
        assert_eq!(weeks[0].weeks_ago, 1);
        assert_eq!(weeks[0].minutes, 35);
        assert_eq!(weeks[1].weeks_ago, 0);
        assert_eq!(weeks[1].minutes, 25);
    }

    #[test]
    fn report_includes_totals_and_sections() {
        let mut rated = summary("Math", 50, 1);
        rated.rating = Some(Rating {
            focus_level: 4,
            stress_level: 2,
            productivity: 5,
        });
        let sessions = vec![rated, summary("Physics", 75, 2)];
        let report = build_report("Ayşe", &sessions, Utc::now());

        assert!(report.contains("# Study Progress Report"));
        assert!(report.contains("Completed sessions: 2"));
        assert!(report.contains("Total study time: 2h 5min"));
        assert!(report.contains("focus 4 / stress 2 / productivity 5"));
    }

    #[test]
    fn incomplete_sessions_are_ignored() {
        let mut cancelled = summary("Math", 0, 1);
        cancelled.status = SessionStatus::Cancelled;
        let report = build_report("Ayşe", &[cancelled], Utc::now());
        assert!(report.contains("Completed sessions: 0"));
        assert!(report.contains("No completed sessions yet."));
    }
}
