use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }

    pub fn parse(value: &str) -> Option<Role> {
        match value {
            "user" => Some(Role::User),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountStatus {
    Active,
    Suspended,
}

impl AccountStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountStatus::Active => "active",
            AccountStatus::Suspended => "suspended",
        }
    }

    pub fn parse(value: &str) -> Option<AccountStatus> {
        match value {
            "active" => Some(AccountStatus::Active),
            "suspended" => Some(AccountStatus::Suspended),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub display_name: String,
    pub role: Role,
    pub is_verified: bool,
    pub onboarding_complete: bool,
    pub account_status: AccountStatus,
    pub created_at: DateTime<Utc>,
    pub last_login_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeSlot {
    Morning,
    Afternoon,
    Evening,
    Night,
}

impl TimeSlot {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeSlot::Morning => "morning",
            TimeSlot::Afternoon => "afternoon",
            TimeSlot::Evening => "evening",
            TimeSlot::Night => "night",
        }
    }

    pub fn parse(value: &str) -> Option<TimeSlot> {
        match value {
            "morning" => Some(TimeSlot::Morning),
            "afternoon" => Some(TimeSlot::Afternoon),
            "evening" => Some(TimeSlot::Evening),
            "night" => Some(TimeSlot::Night),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StudyFrequency {
    Daily,
    ThreeTimesWeek,
    Weekly,
}

impl StudyFrequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            StudyFrequency::Daily => "daily",
            StudyFrequency::ThreeTimesWeek => "3x_week",
            StudyFrequency::Weekly => "weekly",
        }
    }

    pub fn parse(value: &str) -> Option<StudyFrequency> {
        match value {
            "daily" => Some(StudyFrequency::Daily),
            "3x_week" => Some(StudyFrequency::ThreeTimesWeek),
            "weekly" => Some(StudyFrequency::Weekly),
            _ => None,
        }
    }
}

/// Declared study preferences, one record per user. Subjects are stored
/// deduplicated in declaration order; campus uses the sentinel "remote"
/// for students without a fixed campus.
#[derive(Debug, Clone)]
pub struct Preferences {
    pub user_id: Uuid,
    pub subjects: Vec<String>,
    pub campus: String,
    pub time_slots: Vec<TimeSlot>,
    pub days: Vec<String>,
    pub frequency: StudyFrequency,
}

#[derive(Debug, Clone)]
pub struct Profile {
    pub user_id: Uuid,
    pub university: String,
    pub faculty: String,
    pub department: String,
    pub grade: String,
}

/// One entry of the candidate pool handed to the matcher: a user together
/// with their declared subjects and campus.
#[derive(Debug, Clone)]
pub struct PoolEntry {
    pub user_id: Uuid,
    pub display_name: String,
    pub campus: String,
    pub subjects: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Candidate {
    pub user_id: Uuid,
    pub display_name: String,
    pub campus: String,
    pub common_subjects: Vec<String>,
    pub compatibility_score: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStatus {
    Pending,
    Active,
    Ended,
}

impl MatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStatus::Pending => "pending",
            MatchStatus::Active => "active",
            MatchStatus::Ended => "ended",
        }
    }

    pub fn parse(value: &str) -> Option<MatchStatus> {
        match value {
            "pending" => Some(MatchStatus::Pending),
            "active" => Some(MatchStatus::Active),
            "ended" => Some(MatchStatus::Ended),
            _ => None,
        }
    }
}

/// A directed request between two distinct users that becomes a
/// bidirectional relationship on acceptance. `common_subjects` and
/// `compatibility_score` are snapshots taken at creation time.
#[derive(Debug, Clone)]
pub struct Match {
    pub id: Uuid,
    pub user_a: Uuid,
    pub user_b: Uuid,
    pub initiated_by: Uuid,
    pub status: MatchStatus,
    pub compatibility_score: i32,
    pub common_subjects: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub responded_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
    pub end_reason: Option<String>,
}

impl Match {
    pub fn involves(&self, user_id: Uuid) -> bool {
        self.user_a == user_id || self.user_b == user_id
    }

    pub fn other_user(&self, user_id: Uuid) -> Option<Uuid> {
        if self.user_a == user_id {
            Some(self.user_b)
        } else if self.user_b == user_id {
            Some(self.user_a)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Planned,
    Active,
    Completed,
    Cancelled,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Planned => "planned",
            SessionStatus::Active => "active",
            SessionStatus::Completed => "completed",
            SessionStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(value: &str) -> Option<SessionStatus> {
        match value {
            "planned" => Some(SessionStatus::Planned),
            "active" => Some(SessionStatus::Active),
            "completed" => Some(SessionStatus::Completed),
            "cancelled" => Some(SessionStatus::Cancelled),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Session {
    pub id: Uuid,
    pub user_id: Uuid,
    pub subject: String,
    pub planned_minutes: i32,
    pub duration_minutes: Option<i32>,
    pub status: SessionStatus,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
}

/// Post-session self assessment, each dimension on a 1-5 scale. Keyed by
/// (session, rater); re-submission overwrites the previous values.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Rating {
    pub focus_level: i32,
    pub stress_level: i32,
    pub productivity: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurveyPhase {
    PreTest,
    PostTest,
}

impl SurveyPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            SurveyPhase::PreTest => "pre_test",
            SurveyPhase::PostTest => "post_test",
        }
    }

    pub fn parse(value: &str) -> Option<SurveyPhase> {
        match value {
            "pre_test" => Some(SurveyPhase::PreTest),
            "post_test" => Some(SurveyPhase::PostTest),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurveyScale {
    Loneliness,
    Motivation,
    Procrastination,
}

impl SurveyScale {
    pub fn as_str(&self) -> &'static str {
        match self {
            SurveyScale::Loneliness => "loneliness",
            SurveyScale::Motivation => "motivation",
            SurveyScale::Procrastination => "procrastination",
        }
    }
}

/// A session row joined with the creator's own rating, as consumed by the
/// progress report.
#[derive(Debug, Clone)]
pub struct SessionSummary {
    pub subject: String,
    pub status: SessionStatus,
    pub duration_minutes: i32,
    pub created_at: DateTime<Utc>,
    pub rating: Option<Rating>,
}

#[derive(Debug, Clone)]
pub struct SubjectSummary {
    pub subject: String,
    pub session_count: usize,
    pub total_minutes: i64,
}

#[derive(Debug, Clone)]
pub struct WeeklyMinutes {
    pub weeks_ago: i64,
    pub minutes: i64,
}
