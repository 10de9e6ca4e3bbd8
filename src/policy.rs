use crate::error::{CoreError, CoreResult};

/// Institutional suffix for eligible accounts. Checked locally before any
/// identity-provider call.
pub const ACADEMIC_SUFFIX: &str = ".edu.tr";

const SYMBOLS: &str = "!@#$%^&*()_+-=[]{};':\"\\|,.<>/?";

pub fn is_academic_email(email: &str) -> bool {
    email.trim().to_lowercase().ends_with(ACADEMIC_SUFFIX)
}

pub fn require_academic_email(email: &str) -> CoreResult<()> {
    if is_academic_email(email) {
        Ok(())
    } else {
        Err(CoreError::IneligibleEmail)
    }
}

/// Every unmet rule is reported, not just the first.
pub fn password_violations(password: &str) -> Vec<String> {
    let mut violations = Vec::new();
    if password.chars().count() < 8 {
        violations.push("must be at least 8 characters".to_string());
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        violations.push("must contain an uppercase letter".to_string());
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        violations.push("must contain a lowercase letter".to_string());
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        violations.push("must contain a digit".to_string());
    }
    if !password.chars().any(|c| SYMBOLS.contains(c)) {
        violations.push("must contain a symbol".to_string());
    }
    violations
}

pub fn require_acceptable_password(password: &str) -> CoreResult<()> {
    let violations = password_violations(password);
    if violations.is_empty() {
        Ok(())
    } else {
        Err(CoreError::InvalidPassword(violations))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordStrength {
    Weak,
    Medium,
    Strong,
}

impl PasswordStrength {
    pub fn as_str(&self) -> &'static str {
        match self {
            PasswordStrength::Weak => "weak",
            PasswordStrength::Medium => "medium",
            PasswordStrength::Strong => "strong",
        }
    }
}

/// Advisory banding for UI feedback only; never a substitute for the
/// acceptability gate above.
pub fn password_strength(password: &str) -> PasswordStrength {
    let length = password.chars().count();
    let mut score = 0;
    if length >= 8 {
        score += 1;
    }
    if length >= 12 {
        score += 1;
    }
    if password.chars().any(|c| c.is_ascii_uppercase()) {
        score += 1;
    }
    if password.chars().any(|c| c.is_ascii_lowercase()) {
        score += 1;
    }
    if password.chars().any(|c| c.is_ascii_digit()) {
        score += 1;
    }
    if password.chars().any(|c| !c.is_alphanumeric()) {
        score += 1;
    }
    match score {
        0..=2 => PasswordStrength::Weak,
        3..=4 => PasswordStrength::Medium,
        _ => PasswordStrength::Strong,
    }
}
