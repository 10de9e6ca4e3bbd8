use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use log::{debug, info};
use rand::RngCore;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db;
use crate::error::{CoreError, CoreResult};
use crate::models::AccountStatus;
use crate::policy;

/// What the identity collaborator knows about a signed-in user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: Uuid,
    pub email: String,
    pub email_verified: bool,
}

/// Seam for the external auth provider: verify credentials, issue an
/// identity, end the session. Eligibility and password policy are enforced
/// by the core before any call crosses this boundary.
#[allow(async_fn_in_trait)]
pub trait IdentityProvider {
    async fn issue_account(
        &self,
        email: &str,
        display_name: &str,
        password: &str,
    ) -> CoreResult<Identity>;
    async fn verify_credentials(&self, email: &str, password: &str) -> CoreResult<Identity>;
    async fn request_password_reset(&self, email: &str) -> CoreResult<()>;
}

pub(crate) fn hash_password(password: &str) -> CoreResult<String> {
    let mut salt_bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut salt_bytes);
    let salt = SaltString::encode_b64(&salt_bytes)
        .map_err(|e| CoreError::Internal(format!("salt encoding failed: {e}")))?;
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| CoreError::Internal(format!("password hashing failed: {e}")))?;
    Ok(hash.to_string())
}

fn verify_password(hash: &str, password: &str) -> CoreResult<bool> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| CoreError::Internal(format!("stored hash is malformed: {e}")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// Identity provider backed by the same Postgres store as the rest of the
/// core. Credentials are argon2 hashes; the salt travels inside the hash.
pub struct PgIdentityProvider {
    pool: PgPool,
}

impl PgIdentityProvider {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl IdentityProvider for PgIdentityProvider {
    async fn issue_account(
        &self,
        email: &str,
        display_name: &str,
        password: &str,
    ) -> CoreResult<Identity> {
        policy::require_academic_email(email)?;
        policy::require_acceptable_password(password)?;

        let email = email.trim().to_lowercase();
        let id = Uuid::new_v4();
        let password_hash = hash_password(password)?;
        db::insert_user(&self.pool, id, &email, display_name, &password_hash).await?;
        info!("issued account {id} for {email}");

        Ok(Identity {
            id,
            email,
            email_verified: false,
        })
    }

    async fn verify_credentials(&self, email: &str, password: &str) -> CoreResult<Identity> {
        policy::require_academic_email(email)?;

        let email = email.trim().to_lowercase();
        // A missing account and a wrong password produce the same failure.
        let user = match db::find_user_by_email(&self.pool, &email).await? {
            Some(user) => user,
            None => {
                return Err(CoreError::NotAuthorized(
                    "invalid email or password".to_string(),
                ))
            }
        };
        let hash = db::fetch_password_hash(&self.pool, user.id).await?;
        if !verify_password(&hash, password)? {
            return Err(CoreError::NotAuthorized(
                "invalid email or password".to_string(),
            ));
        }
        if user.account_status == AccountStatus::Suspended {
            return Err(CoreError::NotAuthorized(
                "this account is suspended".to_string(),
            ));
        }

        db::touch_last_login(&self.pool, user.id).await?;
        Ok(Identity {
            id: user.id,
            email: user.email,
            email_verified: user.is_verified,
        })
    }

    /// Success-shaped regardless of whether the address is known, so the
    /// reset endpoint cannot be used to enumerate accounts.
    async fn request_password_reset(&self, email: &str) -> CoreResult<()> {
        let email = email.trim().to_lowercase();
        match db::find_user_by_email(&self.pool, &email).await? {
            Some(user) => debug!("password reset requested for known user {}", user.id),
            None => debug!("password reset requested for unknown address"),
        }
        Ok(())
    }
}

type IdentityListener = Box<dyn Fn(Option<&Identity>) + Send>;

/// Explicit replacement for the old process-wide "current user" observable:
/// the context is passed to whoever needs it, and interested parties
/// subscribe for change notification.
#[derive(Default)]
pub struct AuthContext {
    current: Option<Identity>,
    listeners: Vec<IdentityListener>,
}

impl AuthContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&Identity> {
        self.current.as_ref()
    }

    pub fn subscribe(&mut self, listener: impl Fn(Option<&Identity>) + Send + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Replaces the signed-in identity and notifies every subscriber.
    /// `None` means signed out.
    pub fn set(&mut self, identity: Option<Identity>) {
        self.current = identity;
        for listener in &self.listeners {
            listener(self.current.as_ref());
        }
    }

    pub fn end_session(&mut self) {
        self.set(None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn identity() -> Identity {
        Identity {
            id: Uuid::new_v4(),
            email: "ayse@boun.edu.tr".to_string(),
            email_verified: true,
        }
    }

    #[test]
    fn password_hashes_verify_and_differ_per_salt() {
        let first = hash_password("S3cure!password").unwrap();
        let second = hash_password("S3cure!password").unwrap();
        assert_ne!(first, second);
        assert!(verify_password(&first, "S3cure!password").unwrap());
        assert!(!verify_password(&first, "S3cure!other").unwrap());
    }

    #[test]
    fn malformed_stored_hash_is_an_internal_error() {
        assert!(matches!(
            verify_password("not-a-hash", "whatever"),
            Err(CoreError::Internal(_))
        ));
    }

    #[test]
    fn subscribers_see_sign_in_and_sign_out() {
        let notifications = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&notifications);

        let mut ctx = AuthContext::new();
        ctx.subscribe(move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        });

        ctx.set(Some(identity()));
        assert!(ctx.current().is_some());
        ctx.end_session();
        assert!(ctx.current().is_none());
        assert_eq!(notifications.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn context_starts_signed_out() {
        let ctx = AuthContext::new();
        assert!(ctx.current().is_none());
    }
}
