use std::io::Write as _;
use std::path::PathBuf;

use anyhow::Context;
use chrono::Utc;
use clap::{ArgGroup, Parser, Subcommand};
use log::info;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tokio::sync::mpsc;
use uuid::Uuid;

mod auth;
mod db;
mod error;
mod lifecycle;
mod matcher;
mod models;
mod policy;
mod report;
mod session;
mod timer;

use auth::{AuthContext, IdentityProvider, PgIdentityProvider};
use models::{Preferences, Profile, Rating, SessionStatus, StudyFrequency, SurveyPhase, SurveyScale, TimeSlot};

const POOL_PAGE_SIZE: i64 = 200;
const SURVEY_ANSWERS_PER_SCALE: usize = 5;

#[derive(Parser)]
#[command(name = "study-buddy")]
#[command(about = "Study buddy matchmaking for university students", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    InitDb,
    /// Load realistic seed data
    Seed,
    /// Register a new account (academic e-mail only)
    Register {
        #[arg(long)]
        email: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        password: String,
    },
    /// Sign in with existing credentials
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Request a password reset e-mail
    ResetPassword {
        #[arg(long)]
        email: String,
    },
    /// Record profile and study preferences, completing onboarding
    Onboard {
        #[arg(long)]
        user: String,
        #[arg(long)]
        university: String,
        #[arg(long)]
        faculty: String,
        #[arg(long, default_value = "")]
        department: String,
        #[arg(long, default_value = "")]
        grade: String,
        #[arg(long, value_delimiter = ',')]
        subjects: Vec<String>,
        #[arg(long, default_value = "remote")]
        campus: String,
        #[arg(long, value_delimiter = ',')]
        slots: Vec<String>,
        #[arg(long, value_delimiter = ',')]
        days: Vec<String>,
        #[arg(long)]
        frequency: String,
    },
    /// Browse compatible study partners
    Candidates {
        #[arg(long)]
        user: String,
        #[arg(long, default_value_t = 10)]
        limit: usize,
        #[arg(long)]
        json: bool,
    },
    /// Send a match request to another user
    Request {
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
    },
    /// Accept or reject a pending match request
    #[command(group(
        ArgGroup::new("decision")
            .args(["accept", "reject"])
            .required(true)
            .multiple(false)
    ))]
    Respond {
        #[arg(long)]
        match_id: Uuid,
        #[arg(long)]
        user: String,
        #[arg(long)]
        accept: bool,
        #[arg(long)]
        reject: bool,
    },
    /// End an active match
    EndMatch {
        #[arg(long)]
        match_id: Uuid,
        #[arg(long)]
        user: String,
        #[arg(long)]
        reason: Option<String>,
    },
    /// List matches for a user (pending and active by default)
    Matches {
        #[arg(long)]
        user: String,
        #[arg(long)]
        include_ended: bool,
    },
    /// Plan a session for later
    Plan {
        #[arg(long)]
        user: String,
        #[arg(long)]
        subject: String,
        #[arg(long, default_value_t = 25)]
        minutes: i32,
    },
    /// Start a planned session
    Begin {
        #[arg(long)]
        session_id: Uuid,
        #[arg(long)]
        user: String,
    },
    /// Start a session and run the countdown until done or Enter is pressed
    Study {
        #[arg(long)]
        user: String,
        #[arg(long)]
        subject: String,
        #[arg(long, default_value_t = 25)]
        minutes: i32,
    },
    /// Complete a running session
    Stop {
        #[arg(long)]
        session_id: Uuid,
        #[arg(long)]
        user: String,
    },
    /// Cancel a planned or running session
    Cancel {
        #[arg(long)]
        session_id: Uuid,
        #[arg(long)]
        user: String,
    },
    /// List recent sessions
    Sessions {
        #[arg(long)]
        user: String,
        #[arg(long, default_value_t = 20)]
        limit: i64,
    },
    /// Rate a completed session (each dimension 1-5)
    Rate {
        #[arg(long)]
        session_id: Uuid,
        #[arg(long)]
        user: String,
        #[arg(long)]
        focus: i32,
        #[arg(long)]
        stress: i32,
        #[arg(long)]
        productivity: i32,
    },
    /// Submit the well-being survey (five answers per scale, 1-5)
    Survey {
        #[arg(long)]
        user: String,
        #[arg(long, default_value = "pre_test")]
        phase: String,
        #[arg(long, value_delimiter = ',')]
        loneliness: Vec<i32>,
        #[arg(long, value_delimiter = ',')]
        motivation: Vec<i32>,
        #[arg(long, value_delimiter = ',')]
        procrastination: Vec<i32>,
    },
    /// Generate a markdown progress report
    Report {
        #[arg(long)]
        user: String,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let database_url = std::env::var("DATABASE_URL")
        .context("DATABASE_URL must be set to a Postgres instance")?;

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .context("failed to connect to Postgres")?;

    let identity = PgIdentityProvider::new(pool.clone());
    let mut ctx = AuthContext::new();
    ctx.subscribe(|current| match current {
        Some(identity) => info!("signed in as {}", identity.email),
        None => info!("signed out"),
    });

    match cli.command {
        Commands::InitDb => {
            db::init_db(&pool).await?;
            println!("Schema ready.");
        }
        Commands::Seed => {
            db::seed(&pool).await?;
            println!("Seed data inserted.");
        }
        Commands::Register {
            email,
            name,
            password,
        } => {
            let issued = identity.issue_account(&email, &name, &password).await?;
            ctx.set(Some(issued.clone()));
            println!("Registered {} (id {}).", issued.email, issued.id);
            println!(
                "Password strength: {}.",
                policy::password_strength(&password).as_str()
            );
        }
        Commands::Login { email, password } => {
            let verified = identity.verify_credentials(&email, &password).await?;
            ctx.set(Some(verified.clone()));
            let user = db::fetch_user(&pool, verified.id).await?;
            println!(
                "Signed in as {} ({}), member since {}.",
                user.email,
                user.role.as_str(),
                user.created_at.date_naive()
            );
            if !verified.email_verified {
                println!("Your e-mail address is not verified yet.");
            }
            if !user.onboarding_complete {
                println!("Onboarding is not complete yet; run `study-buddy onboard`.");
            }
        }
        Commands::ResetPassword { email } => {
            identity.request_password_reset(&email).await?;
            println!("If an account exists for {email}, a reset e-mail is on its way.");
        }
        Commands::Onboard {
            user,
            university,
            faculty,
            department,
            grade,
            subjects,
            campus,
            slots,
            days,
            frequency,
        } => {
            let user = db::fetch_user_by_email(&pool, &user).await?;
            let subjects = clean_subjects(subjects)?;
            let time_slots = parse_slots(&slots)?;
            let frequency = StudyFrequency::parse(&frequency)
                .with_context(|| format!("unknown study frequency '{frequency}'"))?;

            db::upsert_profile(
                &pool,
                &Profile {
                    user_id: user.id,
                    university,
                    faculty,
                    department,
                    grade,
                },
            )
            .await?;
            db::upsert_preferences(
                &pool,
                &Preferences {
                    user_id: user.id,
                    subjects,
                    campus,
                    time_slots,
                    days,
                    frequency,
                },
            )
            .await?;
            db::complete_onboarding(&pool, user.id).await?;
            println!("Onboarding complete for {}.", user.email);
        }
        Commands::Candidates { user, limit, json } => {
            let user = db::fetch_user_by_email(&pool, &user).await?;
            if !user.onboarding_complete {
                return Err(error::CoreError::InvalidState(
                    "complete onboarding before browsing candidates".to_string(),
                )
                .into());
            }
            let prefs = db::fetch_preferences(&pool, user.id).await?;
            let pool_entries = load_full_pool(&pool).await?;
            let mut ranked = matcher::rank_candidates(user.id, &prefs.subjects, &pool_entries);
            ranked.truncate(limit);

            if json {
                println!("{}", serde_json::to_string_pretty(&ranked)?);
            } else if ranked.is_empty() {
                println!("No compatible study partners found.");
            } else {
                println!("Compatible study partners:");
                for candidate in &ranked {
                    println!(
                        "- {} ({}) {}% match, shared: {}",
                        candidate.display_name,
                        candidate.campus,
                        candidate.compatibility_score,
                        candidate.common_subjects.join(", ")
                    );
                }
            }
        }
        Commands::Request { from, to } => {
            let from = db::fetch_user_by_email(&pool, &from).await?;
            let to = db::fetch_user_by_email(&pool, &to).await?;
            let from_prefs = db::fetch_preferences(&pool, from.id).await?;
            let to_prefs = db::fetch_preferences(&pool, to.id).await?;

            let common = matcher::common_subjects(&from_prefs.subjects, &to_prefs.subjects);
            let score = matcher::compatibility_score(
                common.len(),
                from_prefs.subjects.len(),
                to_prefs.subjects.len(),
            );
            lifecycle::validate_request(from.id, to.id, score)?;
            let match_id = db::create_match(&pool, from.id, to.id, score, &common).await?;
            println!("Match request {match_id} sent to {} ({score}% match).", to.email);
        }
        Commands::Respond {
            match_id,
            user,
            accept,
            reject: _,
        } => {
            let user = db::fetch_user_by_email(&pool, &user).await?;
            let m = db::fetch_match(&pool, match_id).await?;
            let new_status = lifecycle::respond_transition(&m, user.id, accept)?;
            db::apply_match_response(&pool, match_id, new_status).await?;
            println!("Match {match_id} is now {}.", new_status.as_str());
        }
        Commands::EndMatch {
            match_id,
            user,
            reason,
        } => {
            let user = db::fetch_user_by_email(&pool, &user).await?;
            let m = db::fetch_match(&pool, match_id).await?;
            lifecycle::end_transition(&m, user.id)?;
            db::apply_match_end(&pool, match_id, reason.as_deref()).await?;
            println!("Match {match_id} ended.");
        }
        Commands::Matches {
            user,
            include_ended,
        } => {
            let user = db::fetch_user_by_email(&pool, &user).await?;
            let matches = db::list_matches(&pool, user.id, include_ended).await?;
            if matches.is_empty() {
                println!("No matches.");
            }
            for m in matches {
                let other_id = m.other_user(user.id).unwrap_or(m.user_b);
                let other = db::fetch_user(&pool, other_id).await?;
                let direction = if m.initiated_by == user.id {
                    "sent"
                } else {
                    "received"
                };
                println!(
                    "- {} [{}] with {} ({direction}, {}% match, shared: {})",
                    m.id,
                    m.status.as_str(),
                    other.display_name,
                    m.compatibility_score,
                    m.common_subjects.join(", ")
                );
                let mut timeline = format!("    created {}", m.created_at.date_naive());
                if let Some(responded_at) = m.responded_at {
                    timeline.push_str(&format!(", responded {}", responded_at.date_naive()));
                }
                if let Some(ended_at) = m.ended_at {
                    timeline.push_str(&format!(", ended {}", ended_at.date_naive()));
                }
                if let Some(reason) = &m.end_reason {
                    timeline.push_str(&format!(" ({reason})"));
                }
                println!("{timeline}");
            }
        }
        Commands::Plan {
            user,
            subject,
            minutes,
        } => {
            let user = db::fetch_user_by_email(&pool, &user).await?;
            let id =
                db::create_session(&pool, user.id, &subject, minutes, SessionStatus::Planned)
                    .await?;
            println!("Planned session {id}: {subject} for {minutes} minutes.");
        }
        Commands::Begin { session_id, user } => {
            let user = db::fetch_user_by_email(&pool, &user).await?;
            let s = require_own_session(&pool, session_id, user.id).await?;
            session::begin_transition(&s)?;
            db::begin_session(&pool, session_id).await?;
            println!("Session {session_id} started.");
        }
        Commands::Study {
            user,
            subject,
            minutes,
        } => {
            let user = db::fetch_user_by_email(&pool, &user).await?;
            let id =
                db::create_session(&pool, user.id, &subject, minutes, SessionStatus::Active)
                    .await?;
            println!("Session {id} started: {subject} for {minutes} minutes.");
            println!("Press Enter to finish early.");

            let (stop_tx, stop_rx) = mpsc::channel(1);
            let input = tokio::task::spawn_blocking(move || {
                let mut line = String::new();
                let _ = std::io::stdin().read_line(&mut line);
                let _ = stop_tx.blocking_send(());
            });

            let outcome = timer::run_countdown(minutes.max(0) as u64 * 60, stop_rx, |remaining| {
                print!("\r{} remaining   ", timer::format_clock(remaining));
                let _ = std::io::stdout().flush();
            })
            .await;
            input.abort();
            println!();

            let duration = (outcome.elapsed_secs() / 60) as i32;
            db::complete_session(&pool, id, duration).await?;
            println!("Session completed: {duration} minutes recorded.");
            println!("Rate it with: study-buddy rate --session-id {id} --user {} ...", user.email);
        }
        Commands::Stop { session_id, user } => {
            let user = db::fetch_user_by_email(&pool, &user).await?;
            let s = require_own_session(&pool, session_id, user.id).await?;
            let started_at = session::stop_transition(&s)?;
            let duration = session::duration_minutes(started_at, Utc::now());
            db::complete_session(&pool, session_id, duration).await?;
            println!("Session {session_id} completed: {duration} minutes recorded.");
        }
        Commands::Cancel { session_id, user } => {
            let user = db::fetch_user_by_email(&pool, &user).await?;
            let s = require_own_session(&pool, session_id, user.id).await?;
            session::cancel_transition(&s)?;
            db::cancel_session(&pool, session_id).await?;
            println!("Session {session_id} cancelled.");
        }
        Commands::Sessions { user, limit } => {
            let user = db::fetch_user_by_email(&pool, &user).await?;
            let sessions = db::list_sessions(&pool, user.id, limit).await?;
            if sessions.is_empty() {
                println!("No sessions yet.");
            }
            for s in sessions {
                let duration = s
                    .duration_minutes
                    .map(|m| format!("{m}min"))
                    .unwrap_or_else(|| "-".to_string());
                let finished = s
                    .ended_at
                    .map(|t| format!(", finished {}", t.date_naive()))
                    .unwrap_or_default();
                println!(
                    "- {} [{}] {} on {}, planned {}min, actual {}{}",
                    s.id,
                    s.status.as_str(),
                    s.subject,
                    s.created_at.date_naive(),
                    s.planned_minutes,
                    duration,
                    finished
                );
            }
        }
        Commands::Rate {
            session_id,
            user,
            focus,
            stress,
            productivity,
        } => {
            let user = db::fetch_user_by_email(&pool, &user).await?;
            let s = db::fetch_session(&pool, session_id).await?;
            let rating = Rating {
                focus_level: focus,
                stress_level: stress,
                productivity,
            };
            session::validate_rating(&s, &rating)?;
            db::upsert_rating(&pool, session_id, user.id, &rating).await?;
            println!("Rating recorded for session {session_id}.");
        }
        Commands::Survey {
            user,
            phase,
            loneliness,
            motivation,
            procrastination,
        } => {
            let user = db::fetch_user_by_email(&pool, &user).await?;
            let phase = SurveyPhase::parse(&phase)
                .with_context(|| format!("unknown survey phase '{phase}'"))?;
            let answers = [
                (SurveyScale::Loneliness, loneliness),
                (SurveyScale::Motivation, motivation),
                (SurveyScale::Procrastination, procrastination),
            ];
            for (scale, values) in &answers {
                validate_survey_answers(scale, values)?;
            }
            db::insert_survey(&pool, user.id, phase, &answers).await?;
            println!("Survey recorded for {} ({}).", user.email, phase.as_str());
        }
        Commands::Report { user, out } => {
            let user = db::fetch_user_by_email(&pool, &user).await?;
            let summaries = db::list_session_summaries(&pool, user.id).await?;
            let report = report::build_report(&user.display_name, &summaries, Utc::now());
            std::fs::write(&out, report)?;
            println!("Report written to {}.", out.display());
        }
    }

    if ctx.current().is_some() {
        ctx.end_session();
    }

    Ok(())
}

async fn load_full_pool(pool: &PgPool) -> anyhow::Result<Vec<models::PoolEntry>> {
    let mut entries = Vec::new();
    let mut offset = 0;
    loop {
        let page = db::fetch_candidate_pool(pool, POOL_PAGE_SIZE, offset).await?;
        let page_len = page.len() as i64;
        entries.extend(page);
        if page_len < POOL_PAGE_SIZE {
            return Ok(entries);
        }
        offset += POOL_PAGE_SIZE;
    }
}

async fn require_own_session(
    pool: &PgPool,
    session_id: Uuid,
    user_id: Uuid,
) -> Result<models::Session, error::CoreError> {
    let s = db::fetch_session(pool, session_id).await?;
    if s.user_id != user_id {
        return Err(error::CoreError::NotAuthorized(
            "only the session owner may act on a session".to_string(),
        ));
    }
    Ok(s)
}

fn clean_subjects(raw: Vec<String>) -> anyhow::Result<Vec<String>> {
    let mut subjects: Vec<String> = Vec::new();
    for subject in raw {
        let subject = subject.trim().to_string();
        if subject.is_empty() {
            anyhow::bail!("subject names cannot be empty");
        }
        if !subjects.contains(&subject) {
            subjects.push(subject);
        }
    }
    if subjects.is_empty() {
        anyhow::bail!("at least one subject is required");
    }
    Ok(subjects)
}

fn parse_slots(raw: &[String]) -> anyhow::Result<Vec<TimeSlot>> {
    let mut slots = Vec::with_capacity(raw.len());
    for name in raw {
        let slot = TimeSlot::parse(name)
            .with_context(|| format!("unknown time slot '{name}' (morning/afternoon/evening/night)"))?;
        if !slots.contains(&slot) {
            slots.push(slot);
        }
    }
    Ok(slots)
}

fn validate_survey_answers(scale: &SurveyScale, values: &[i32]) -> anyhow::Result<()> {
    if values.len() != SURVEY_ANSWERS_PER_SCALE {
        anyhow::bail!(
            "the {} scale needs exactly {} answers, got {}",
            scale.as_str(),
            SURVEY_ANSWERS_PER_SCALE,
            values.len()
        );
    }
    if let Some(bad) = values.iter().find(|v| !(1..=5).contains(*v)) {
        anyhow::bail!("survey answers must be between 1 and 5, got {bad}");
    }
    Ok(())
}
