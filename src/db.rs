use log::debug;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::models::{
    AccountStatus, Match, MatchStatus, PoolEntry, Preferences, Profile, Rating, Role, Session,
    SessionStatus, SessionSummary, StudyFrequency, SurveyPhase, SurveyScale, TimeSlot, User,
};

pub async fn init_db(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

// ---------------------------------------------------------------- users

fn map_user_row(row: &PgRow) -> CoreResult<User> {
    let role: String = row.get("role");
    let status: String = row.get("account_status");
    Ok(User {
        id: row.get("id"),
        email: row.get("email"),
        display_name: row.get("display_name"),
        role: Role::parse(&role)
            .ok_or_else(|| CoreError::Internal(format!("unknown role '{role}'")))?,
        is_verified: row.get("is_verified"),
        onboarding_complete: row.get("onboarding_complete"),
        account_status: AccountStatus::parse(&status)
            .ok_or_else(|| CoreError::Internal(format!("unknown account status '{status}'")))?,
        created_at: row.get("created_at"),
        last_login_at: row.get("last_login_at"),
    })
}

pub async fn insert_user(
    pool: &PgPool,
    id: Uuid,
    email: &str,
    display_name: &str,
    password_hash: &str,
) -> CoreResult<()> {
    let mut tx = pool.begin().await?;

    let inserted = sqlx::query(
        r#"
        INSERT INTO study_buddy.users (id, email, display_name)
        VALUES ($1, $2, $3)
        ON CONFLICT (email) DO NOTHING
        "#,
    )
    .bind(id)
    .bind(email)
    .bind(display_name)
    .execute(&mut *tx)
    .await?;

    if inserted.rows_affected() == 0 {
        return Err(CoreError::InvalidRequest(format!(
            "an account already exists for {email}"
        )));
    }

    sqlx::query(
        "INSERT INTO study_buddy.credentials (user_id, password_hash) VALUES ($1, $2)",
    )
    .bind(id)
    .bind(password_hash)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    debug!("created user {id} ({email})");
    Ok(())
}

pub async fn find_user_by_email(pool: &PgPool, email: &str) -> CoreResult<Option<User>> {
    let row = sqlx::query("SELECT * FROM study_buddy.users WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await?;
    row.as_ref().map(map_user_row).transpose()
}

pub async fn fetch_user_by_email(pool: &PgPool, email: &str) -> CoreResult<User> {
    find_user_by_email(pool, email)
        .await?
        .ok_or(CoreError::NotFound("user"))
}

pub async fn fetch_user(pool: &PgPool, id: Uuid) -> CoreResult<User> {
    let row = sqlx::query("SELECT * FROM study_buddy.users WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    match row {
        Some(row) => map_user_row(&row),
        None => Err(CoreError::NotFound("user")),
    }
}

pub async fn fetch_password_hash(pool: &PgPool, user_id: Uuid) -> CoreResult<String> {
    let row = sqlx::query("SELECT password_hash FROM study_buddy.credentials WHERE user_id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await?
        .ok_or(CoreError::NotFound("credentials"))?;
    Ok(row.get("password_hash"))
}

pub async fn touch_last_login(pool: &PgPool, user_id: Uuid) -> CoreResult<()> {
    sqlx::query("UPDATE study_buddy.users SET last_login_at = now() WHERE id = $1")
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn complete_onboarding(pool: &PgPool, user_id: Uuid) -> CoreResult<()> {
    let updated = sqlx::query(
        "UPDATE study_buddy.users SET onboarding_complete = TRUE WHERE id = $1",
    )
    .bind(user_id)
    .execute(pool)
    .await?;
    if updated.rows_affected() == 0 {
        return Err(CoreError::NotFound("user"));
    }
    Ok(())
}

// -------------------------------------------------- profile / preferences

pub async fn upsert_profile(pool: &PgPool, profile: &Profile) -> CoreResult<()> {
    sqlx::query(
        r#"
        INSERT INTO study_buddy.profiles (user_id, university, faculty, department, grade)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (user_id) DO UPDATE
        SET university = EXCLUDED.university,
            faculty = EXCLUDED.faculty,
            department = EXCLUDED.department,
            grade = EXCLUDED.grade,
            updated_at = now()
        "#,
    )
    .bind(profile.user_id)
    .bind(&profile.university)
    .bind(&profile.faculty)
    .bind(&profile.department)
    .bind(&profile.grade)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn upsert_preferences(pool: &PgPool, prefs: &Preferences) -> CoreResult<()> {
    let slots: Vec<String> = prefs
        .time_slots
        .iter()
        .map(|s| s.as_str().to_string())
        .collect();
    sqlx::query(
        r#"
        INSERT INTO study_buddy.preferences (user_id, subjects, campus, time_slots, days, frequency)
        VALUES ($1, $2, $3, $4, $5, $6)
        ON CONFLICT (user_id) DO UPDATE
        SET subjects = EXCLUDED.subjects,
            campus = EXCLUDED.campus,
            time_slots = EXCLUDED.time_slots,
            days = EXCLUDED.days,
            frequency = EXCLUDED.frequency,
            updated_at = now()
        "#,
    )
    .bind(prefs.user_id)
    .bind(&prefs.subjects)
    .bind(&prefs.campus)
    .bind(&slots)
    .bind(&prefs.days)
    .bind(prefs.frequency.as_str())
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn fetch_preferences(pool: &PgPool, user_id: Uuid) -> CoreResult<Preferences> {
    let row = sqlx::query("SELECT * FROM study_buddy.preferences WHERE user_id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await?
        .ok_or(CoreError::NotFound("preferences"))?;

    let slot_names: Vec<String> = row.get("time_slots");
    let mut time_slots = Vec::with_capacity(slot_names.len());
    for name in &slot_names {
        time_slots.push(
            TimeSlot::parse(name)
                .ok_or_else(|| CoreError::Internal(format!("unknown time slot '{name}'")))?,
        );
    }
    let frequency: String = row.get("frequency");

    Ok(Preferences {
        user_id: row.get("user_id"),
        subjects: row.get("subjects"),
        campus: row.get("campus"),
        time_slots,
        days: row.get("days"),
        frequency: StudyFrequency::parse(&frequency)
            .ok_or_else(|| CoreError::Internal(format!("unknown frequency '{frequency}'")))?,
    })
}

/// One page of the candidate pool: active, onboarded users with declared
/// preferences, in stable creation order. The matcher itself is
/// pool-size-agnostic; callers page through until the store runs dry.
pub async fn fetch_candidate_pool(
    pool: &PgPool,
    limit: i64,
    offset: i64,
) -> CoreResult<Vec<PoolEntry>> {
    let rows = sqlx::query(
        r#"
        SELECT u.id, u.display_name, p.campus, p.subjects
        FROM study_buddy.users u
        JOIN study_buddy.preferences p ON p.user_id = u.id
        WHERE u.account_status = 'active' AND u.onboarding_complete
        ORDER BY u.created_at, u.id
        LIMIT $1 OFFSET $2
        "#,
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .iter()
        .map(|row| PoolEntry {
            user_id: row.get("id"),
            display_name: row.get("display_name"),
            campus: row.get("campus"),
            subjects: row.get("subjects"),
        })
        .collect())
}

// -------------------------------------------------------------- matches

fn map_match_row(row: &PgRow) -> CoreResult<Match> {
    let status: String = row.get("status");
    Ok(Match {
        id: row.get("id"),
        user_a: row.get("user_a"),
        user_b: row.get("user_b"),
        initiated_by: row.get("initiated_by"),
        status: MatchStatus::parse(&status)
            .ok_or_else(|| CoreError::Internal(format!("unknown match status '{status}'")))?,
        compatibility_score: row.get("compatibility_score"),
        common_subjects: row.get("common_subjects"),
        created_at: row.get("created_at"),
        responded_at: row.get("responded_at"),
        ended_at: row.get("ended_at"),
        end_reason: row.get("end_reason"),
    })
}

/// Inserts a pending match. A live (pending or active) match between the
/// same pair trips the partial unique index and surfaces as InvalidRequest,
/// which also covers a lost creation race.
pub async fn create_match(
    pool: &PgPool,
    initiator: Uuid,
    target: Uuid,
    score: i32,
    common_subjects: &[String],
) -> CoreResult<Uuid> {
    let id = Uuid::new_v4();
    let result = sqlx::query(
        r#"
        INSERT INTO study_buddy.matches
        (id, user_a, user_b, initiated_by, compatibility_score, common_subjects)
        VALUES ($1, $2, $3, $2, $4, $5)
        "#,
    )
    .bind(id)
    .bind(initiator)
    .bind(target)
    .bind(score)
    .bind(common_subjects)
    .execute(pool)
    .await;

    match result {
        Ok(_) => {
            debug!("match {id} created by {initiator} for {target}");
            Ok(id)
        }
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
            Err(CoreError::InvalidRequest(
                "a pending or active match already exists between these users".to_string(),
            ))
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn fetch_match(pool: &PgPool, id: Uuid) -> CoreResult<Match> {
    let row = sqlx::query("SELECT * FROM study_buddy.matches WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(CoreError::NotFound("match"))?;
    map_match_row(&row)
}

pub async fn list_matches(
    pool: &PgPool,
    user_id: Uuid,
    include_ended: bool,
) -> CoreResult<Vec<Match>> {
    let mut query = String::from(
        "SELECT * FROM study_buddy.matches WHERE (user_a = $1 OR user_b = $1)",
    );
    if !include_ended {
        query.push_str(" AND status IN ('pending', 'active')");
    }
    query.push_str(" ORDER BY created_at DESC");

    let rows = sqlx::query(&query).bind(user_id).fetch_all(pool).await?;
    rows.iter().map(map_match_row).collect()
}

/// Applies an accepted/rejected response with a status guard so a concurrent
/// responder loses cleanly instead of double-writing.
pub async fn apply_match_response(
    pool: &PgPool,
    match_id: Uuid,
    new_status: MatchStatus,
) -> CoreResult<()> {
    let updated = match new_status {
        MatchStatus::Active => {
            sqlx::query(
                r#"
                UPDATE study_buddy.matches
                SET status = 'active', responded_at = now()
                WHERE id = $1 AND status = 'pending'
                "#,
            )
            .bind(match_id)
            .execute(pool)
            .await?
        }
        MatchStatus::Ended => {
            sqlx::query(
                r#"
                UPDATE study_buddy.matches
                SET status = 'ended', responded_at = now(), ended_at = now()
                WHERE id = $1 AND status = 'pending'
                "#,
            )
            .bind(match_id)
            .execute(pool)
            .await?
        }
        MatchStatus::Pending => {
            return Err(CoreError::Internal(
                "a response cannot leave a match pending".to_string(),
            ))
        }
    };

    if updated.rows_affected() == 0 {
        return Err(CoreError::InvalidState(
            "match is no longer pending".to_string(),
        ));
    }
    Ok(())
}

pub async fn apply_match_end(
    pool: &PgPool,
    match_id: Uuid,
    reason: Option<&str>,
) -> CoreResult<()> {
    let updated = sqlx::query(
        r#"
        UPDATE study_buddy.matches
        SET status = 'ended', ended_at = now(), end_reason = $2
        WHERE id = $1 AND status = 'active'
        "#,
    )
    .bind(match_id)
    .bind(reason)
    .execute(pool)
    .await?;

    if updated.rows_affected() == 0 {
        return Err(CoreError::InvalidState(
            "match is no longer active".to_string(),
        ));
    }
    Ok(())
}

// -------------------------------------------------------------- sessions

fn map_session_row(row: &PgRow) -> CoreResult<Session> {
    let status: String = row.get("status");
    Ok(Session {
        id: row.get("id"),
        user_id: row.get("user_id"),
        subject: row.get("subject"),
        planned_minutes: row.get("planned_minutes"),
        duration_minutes: row.get("duration_minutes"),
        status: SessionStatus::parse(&status)
            .ok_or_else(|| CoreError::Internal(format!("unknown session status '{status}'")))?,
        created_at: row.get("created_at"),
        started_at: row.get("started_at"),
        ended_at: row.get("ended_at"),
    })
}

pub async fn create_session(
    pool: &PgPool,
    user_id: Uuid,
    subject: &str,
    planned_minutes: i32,
    status: SessionStatus,
) -> CoreResult<Uuid> {
    let id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO study_buddy.sessions (id, user_id, subject, planned_minutes, status, started_at)
        VALUES ($1, $2, $3, $4, $5, CASE WHEN $5 = 'active' THEN now() END)
        "#,
    )
    .bind(id)
    .bind(user_id)
    .bind(subject)
    .bind(planned_minutes)
    .bind(status.as_str())
    .execute(pool)
    .await?;
    Ok(id)
}

pub async fn fetch_session(pool: &PgPool, id: Uuid) -> CoreResult<Session> {
    let row = sqlx::query("SELECT * FROM study_buddy.sessions WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(CoreError::NotFound("session"))?;
    map_session_row(&row)
}

pub async fn begin_session(pool: &PgPool, id: Uuid) -> CoreResult<()> {
    let updated = sqlx::query(
        r#"
        UPDATE study_buddy.sessions
        SET status = 'active', started_at = now()
        WHERE id = $1 AND status = 'planned'
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?;
    if updated.rows_affected() == 0 {
        return Err(CoreError::InvalidState(
            "session is no longer planned".to_string(),
        ));
    }
    Ok(())
}

pub async fn complete_session(pool: &PgPool, id: Uuid, duration_minutes: i32) -> CoreResult<()> {
    let updated = sqlx::query(
        r#"
        UPDATE study_buddy.sessions
        SET status = 'completed', duration_minutes = $2, ended_at = now()
        WHERE id = $1 AND status = 'active'
        "#,
    )
    .bind(id)
    .bind(duration_minutes)
    .execute(pool)
    .await?;
    if updated.rows_affected() == 0 {
        return Err(CoreError::InvalidState(
            "session is no longer active".to_string(),
        ));
    }
    Ok(())
}

pub async fn cancel_session(pool: &PgPool, id: Uuid) -> CoreResult<()> {
    let updated = sqlx::query(
        r#"
        UPDATE study_buddy.sessions
        SET status = 'cancelled', ended_at = now()
        WHERE id = $1 AND status IN ('planned', 'active')
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?;
    if updated.rows_affected() == 0 {
        return Err(CoreError::InvalidState(
            "session is already completed or cancelled".to_string(),
        ));
    }
    Ok(())
}

pub async fn list_sessions(pool: &PgPool, user_id: Uuid, limit: i64) -> CoreResult<Vec<Session>> {
    let rows = sqlx::query(
        r#"
        SELECT * FROM study_buddy.sessions
        WHERE user_id = $1
        ORDER BY created_at DESC
        LIMIT $2
        "#,
    )
    .bind(user_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;
    rows.iter().map(map_session_row).collect()
}

/// Sessions joined with the creator's own rating, newest first, as the
/// progress report consumes them.
pub async fn list_session_summaries(
    pool: &PgPool,
    user_id: Uuid,
) -> CoreResult<Vec<SessionSummary>> {
    let rows = sqlx::query(
        r#"
        SELECT s.subject, s.status, COALESCE(s.duration_minutes, 0) AS duration_minutes,
               s.created_at, r.focus_level, r.stress_level, r.productivity
        FROM study_buddy.sessions s
        LEFT JOIN study_buddy.session_ratings r
            ON r.session_id = s.id AND r.rater_id = s.user_id
        WHERE s.user_id = $1
        ORDER BY s.created_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    let mut summaries = Vec::with_capacity(rows.len());
    for row in &rows {
        let status: String = row.get("status");
        let focus: Option<i32> = row.get("focus_level");
        let rating = focus.map(|focus_level| Rating {
            focus_level,
            stress_level: row.get::<Option<i32>, _>("stress_level").unwrap_or(0),
            productivity: row.get::<Option<i32>, _>("productivity").unwrap_or(0),
        });
        summaries.push(SessionSummary {
            subject: row.get("subject"),
            status: SessionStatus::parse(&status)
                .ok_or_else(|| CoreError::Internal(format!("unknown session status '{status}'")))?,
            duration_minutes: row.get("duration_minutes"),
            created_at: row.get("created_at"),
            rating,
        });
    }
    Ok(summaries)
}

// --------------------------------------------------------------- ratings

/// One rating per (session, rater); re-submission overwrites the previous
/// values and refreshes the timestamp.
pub async fn upsert_rating(
    pool: &PgPool,
    session_id: Uuid,
    rater_id: Uuid,
    rating: &Rating,
) -> CoreResult<()> {
    sqlx::query(
        r#"
        INSERT INTO study_buddy.session_ratings
        (session_id, rater_id, focus_level, stress_level, productivity)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (session_id, rater_id) DO UPDATE
        SET focus_level = EXCLUDED.focus_level,
            stress_level = EXCLUDED.stress_level,
            productivity = EXCLUDED.productivity,
            rated_at = now()
        "#,
    )
    .bind(session_id)
    .bind(rater_id)
    .bind(rating.focus_level)
    .bind(rating.stress_level)
    .bind(rating.productivity)
    .execute(pool)
    .await?;
    Ok(())
}

// --------------------------------------------------------------- surveys

/// Writes all three scales in one transaction. The survey is terminal per
/// phase: the primary key rejects a repeat submission, even a racing one,
/// and the conflict surfaces as InvalidState.
pub async fn insert_survey(
    pool: &PgPool,
    user_id: Uuid,
    phase: SurveyPhase,
    answers: &[(SurveyScale, Vec<i32>)],
) -> CoreResult<()> {
    let mut tx = pool.begin().await?;
    for (scale, values) in answers {
        let result = sqlx::query(
            r#"
            INSERT INTO study_buddy.survey_responses (user_id, phase, scale, answers)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(user_id)
        .bind(phase.as_str())
        .bind(scale.as_str())
        .bind(values)
        .execute(&mut *tx)
        .await;

        match result {
            Ok(_) => {}
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                return Err(CoreError::InvalidState(format!(
                    "the {} survey is already completed",
                    phase.as_str()
                )));
            }
            Err(e) => return Err(e.into()),
        }
    }
    tx.commit().await?;
    Ok(())
}

// ------------------------------------------------------------------ seed

/// Realistic seed data for local runs: three onboarded students with
/// overlapping subject lists. All seed accounts share the password
/// `Seed!data1`.
pub async fn seed(pool: &PgPool) -> anyhow::Result<()> {
    let password_hash = crate::auth::hash_password("Seed!data1")?;
    let students = [
        (
            Uuid::parse_str("5e0c1a52-7c3f-4a6f-9e2b-0d8f6a1c44b1")?,
            "Ayşe Demir",
            "ayse.demir@boun.edu.tr",
            "Kuzey Kampüs",
            vec!["Matematik", "Fizik", "Lineer Cebir"],
        ),
        (
            Uuid::parse_str("9b4f2e81-1d57-4c4b-b6a3-f2a9c0d37e92")?,
            "Mehmet Kaya",
            "mehmet.kaya@itu.edu.tr",
            "Ayazağa",
            vec!["Matematik", "Algoritma", "Veri Yapıları"],
        ),
        (
            Uuid::parse_str("c7d83f16-6a92-4f0e-8d15-3b6e9a54c0d8")?,
            "Zeynep Arslan",
            "zeynep.arslan@metu.edu.tr",
            "remote",
            vec!["Fizik", "Lineer Cebir", "Olasılık ve İstatistik"],
        ),
    ];

    for (id, name, email, campus, subjects) in students {
        sqlx::query(
            r#"
            INSERT INTO study_buddy.users (id, email, display_name, onboarding_complete)
            VALUES ($1, $2, $3, TRUE)
            ON CONFLICT (email) DO UPDATE
            SET display_name = EXCLUDED.display_name, onboarding_complete = TRUE
            "#,
        )
        .bind(id)
        .bind(email)
        .bind(name)
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO study_buddy.credentials (user_id, password_hash)
            VALUES ($1, $2)
            ON CONFLICT (user_id) DO NOTHING
            "#,
        )
        .bind(id)
        .bind(&password_hash)
        .execute(pool)
        .await?;

        let subjects: Vec<String> = subjects.into_iter().map(String::from).collect();
        let prefs = Preferences {
            user_id: id,
            subjects,
            campus: campus.to_string(),
            time_slots: vec![TimeSlot::Evening, TimeSlot::Night],
            days: vec!["Pzt".to_string(), "Çar".to_string(), "Cum".to_string()],
            frequency: StudyFrequency::ThreeTimesWeek,
        };
        upsert_preferences(pool, &prefs).await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn completed_session(pool: &PgPool) -> (Uuid, Uuid) {
        let user_id = Uuid::new_v4();
        insert_user(
            pool,
            user_id,
            &format!("{user_id}@boun.edu.tr"),
            "Test Student",
            "not-a-real-hash",
        )
        .await
        .unwrap();
        let session_id = create_session(pool, user_id, "Matematik", 25, SessionStatus::Active)
            .await
            .unwrap();
        complete_session(pool, session_id, 25).await.unwrap();
        (user_id, session_id)
    }

    #[sqlx::test]
    async fn rating_resubmission_keeps_one_row_with_latest_values(pool: PgPool) {
        let (user_id, session_id) = completed_session(&pool).await;

        upsert_rating(
            &pool,
            session_id,
            user_id,
            &Rating {
                focus_level: 2,
                stress_level: 4,
                productivity: 2,
            },
        )
        .await
        .unwrap();
        upsert_rating(
            &pool,
            session_id,
            user_id,
            &Rating {
                focus_level: 5,
                stress_level: 1,
                productivity: 4,
            },
        )
        .await
        .unwrap();

        let rows = sqlx::query(
            "SELECT focus_level, stress_level, productivity FROM study_buddy.session_ratings WHERE session_id = $1",
        )
        .bind(session_id)
        .fetch_all(&pool)
        .await
        .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get::<i32, _>("focus_level"), 5);
        assert_eq!(rows[0].get::<i32, _>("stress_level"), 1);
        assert_eq!(rows[0].get::<i32, _>("productivity"), 4);
    }

    #[sqlx::test]
    async fn survey_phase_accepts_only_one_submission(pool: PgPool) {
        let (user_id, _) = completed_session(&pool).await;
        let answers = [
            (SurveyScale::Loneliness, vec![1, 2, 3, 4, 5]),
            (SurveyScale::Motivation, vec![2, 2, 2, 2, 2]),
            (SurveyScale::Procrastination, vec![5, 4, 3, 2, 1]),
        ];

        insert_survey(&pool, user_id, SurveyPhase::PreTest, &answers)
            .await
            .unwrap();

        let err = insert_survey(&pool, user_id, SurveyPhase::PreTest, &answers)
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidState(_)));

        // the other phase is still open
        insert_survey(&pool, user_id, SurveyPhase::PostTest, &answers)
            .await
            .unwrap();

        let rows = sqlx::query(
            "SELECT scale FROM study_buddy.survey_responses WHERE user_id = $1 AND phase = 'pre_test'",
        )
        .bind(user_id)
        .fetch_all(&pool)
        .await
        .unwrap();
        assert_eq!(rows.len(), 3);
    }
}
