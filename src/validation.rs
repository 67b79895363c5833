//! Field validation for student payloads.
//!
//! Every rule is checked and all failures are reported together, keyed by
//! field name.

use std::collections::BTreeMap;

use serde::Deserialize;

pub const MIN_PASSWORD_LENGTH: usize = 8;
/// bcrypt only reads the first 72 bytes of its input
pub const MAX_PASSWORD_BYTES: usize = 72;
pub const MAX_NAME_LENGTH: usize = 100;
pub const MAX_EMAIL_LENGTH: usize = 254;
pub const MAX_AGE: i32 = 150;

/// Aggregated per-field validation failures
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        // First failure per field wins
        self.0.entry(field.to_string()).or_insert_with(|| message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn into_inner(self) -> BTreeMap<String, String> {
        self.0
    }

    /// Human readable summary, e.g. "Field 'email' is required, Field 'age' ..."
    pub fn summary(&self) -> String {
        self.0
            .iter()
            .map(|(field, message)| format!("Field '{}': {}", field, message))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Whether a payload must carry a password
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordRule {
    Required,
    Optional,
}

/// Incoming student body for registration, create and update.
///
/// All fields are optional at the serde level so that missing fields are
/// reported by validation instead of failing JSON decoding.
#[derive(Default, Clone, Deserialize)]
pub struct StudentPayload {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub age: Option<i32>,
}

impl std::fmt::Debug for StudentPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StudentPayload")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("age", &self.age)
            .finish()
    }
}

/// A payload that passed every rule; email is normalized
#[derive(Clone, PartialEq, Eq)]
pub struct ValidStudent {
    pub name: String,
    pub email: String,
    pub password: Option<String>,
    pub age: i32,
}

impl std::fmt::Debug for ValidStudent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidStudent")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("age", &self.age)
            .finish()
    }
}

impl StudentPayload {
    pub fn validate(self, password_rule: PasswordRule) -> Result<ValidStudent, FieldErrors> {
        let mut errors = FieldErrors::new();

        let name = self.name.as_deref().map(str::trim).unwrap_or_default();
        if name.is_empty() {
            errors.add("name", "is required");
        } else if name.chars().count() > MAX_NAME_LENGTH {
            errors.add("name", format!("must be at most {} characters", MAX_NAME_LENGTH));
        }

        let email = self.email.as_deref().map(normalize_email).unwrap_or_default();
        if email.is_empty() {
            errors.add("email", "is required");
        } else if let Err(message) = validate_email_format(&email) {
            errors.add("email", message);
        }

        let password = match self.password {
            Some(p) if !p.is_empty() => {
                if let Err(message) = validate_password(&p) {
                    errors.add("password", message);
                }
                Some(p)
            }
            _ => {
                if password_rule == PasswordRule::Required {
                    errors.add("password", "is required");
                }
                None
            }
        };

        match self.age {
            None => errors.add("age", "is required"),
            Some(age) if !(0..=MAX_AGE).contains(&age) => {
                errors.add("age", format!("must be between 0 and {}", MAX_AGE))
            }
            Some(_) => {}
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(ValidStudent {
            name: name.to_string(),
            email,
            password,
            age: self.age.unwrap_or_default(),
        })
    }
}

/// Emails are compared case-insensitively and without surrounding whitespace
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn validate_password(password: &str) -> Result<(), String> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(format!("must be at least {} characters", MIN_PASSWORD_LENGTH));
    }
    if password.len() > MAX_PASSWORD_BYTES {
        return Err(format!("must be at most {} bytes", MAX_PASSWORD_BYTES));
    }
    Ok(())
}

/// Structural email check: one '@', sane local part, dotted domain
pub fn validate_email_format(email: &str) -> Result<(), String> {
    if email.len() > MAX_EMAIL_LENGTH {
        return Err(format!("must be at most {} characters", MAX_EMAIL_LENGTH));
    }

    if email.chars().any(char::is_whitespace) {
        return Err("invalid email format".to_string());
    }

    let (local, domain) = match email.split_once('@') {
        Some(parts) => parts,
        None => return Err("invalid email format".to_string()),
    };

    if local.is_empty() || local.len() > 64 || domain.contains('@') {
        return Err("invalid email format".to_string());
    }
    if local.starts_with('.') || local.ends_with('.') || local.contains("..") {
        return Err("invalid email format".to_string());
    }

    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 {
        return Err("invalid email format".to_string());
    }
    let labels_ok = labels.iter().all(|label| {
        !label.is_empty()
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_alphanumeric() || c == '-')
    });
    if !labels_ok {
        return Err("invalid email format".to_string());
    }

    Ok(())
}
