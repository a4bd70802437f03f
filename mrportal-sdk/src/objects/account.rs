//! Account registration and login.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::{Validate, ValidationErrors, non_blank};

/// Shortest password accepted at registration.
pub const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub full_name: Option<String>,
    pub company_name: Option<String>,
    pub phone: Option<String>,
}

/// A checked registration. `email` is lower-cased.
#[derive(Clone, PartialEq, Eq)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub full_name: Option<String>,
    pub company_name: Option<String>,
    pub phone: Option<String>,
}

impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration")
            .field("email", &self.email)
            .field("full_name", &self.full_name)
            .finish_non_exhaustive()
    }
}

impl Validate for RegisterRequest {
    type Valid = Registration;

    fn validate(self) -> Result<Registration, ValidationErrors> {
        let mut errors = ValidationErrors::default();
        let email = errors
            .require_text("email", self.email)
            .map(|e| e.to_ascii_lowercase());
        if let Some(email) = &email {
            let well_formed = email
                .split_once('@')
                .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
            if !well_formed {
                errors.add("email", "is not a valid email address");
            }
        }
        // Passwords are taken verbatim, whitespace included.
        let password = errors.require("password", self.password.filter(|p| !p.is_empty()));
        if let Some(password) = &password
            && password.chars().count() < MIN_PASSWORD_LEN
        {
            errors.add(
                "password",
                format!("must be at least {MIN_PASSWORD_LEN} characters"),
            );
        }
        match (email, password) {
            (Some(email), Some(password)) if errors.is_empty() => Ok(Registration {
                email,
                password,
                full_name: non_blank(self.full_name),
                company_name: non_blank(self.company_name),
                phone: non_blank(self.phone),
            }),
            _ => Err(errors),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

impl Validate for LoginRequest {
    type Valid = Credentials;

    fn validate(self) -> Result<Credentials, ValidationErrors> {
        let mut errors = ValidationErrors::default();
        let email = errors.require_text("email", self.email);
        let password = errors.require("password", self.password.filter(|p| !p.is_empty()));
        match (email, password) {
            (Some(email), Some(password)) => Ok(Credentials {
                email: email.to_ascii_lowercase(),
                password,
            }),
            _ => Err(errors),
        }
    }
}

/// Response of register and login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub message: String,
    /// Bearer token for `Authorization: Bearer <token>`.
    pub token: String,
    pub expires_at: i64,
}

/// Response of `GET /me`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub email: String,
    pub full_name: Option<String>,
    pub company_name: Option<String>,
    pub phone: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_lowercases_email() {
        let valid = RegisterRequest {
            email: Some(" Asha@Example.COM ".into()),
            password: Some("password123".into()),
            ..Default::default()
        }
        .validate()
        .unwrap();
        assert_eq!(valid.email, "asha@example.com");
    }

    #[test]
    fn test_register_rejects_short_password_and_bad_email() {
        let err = RegisterRequest {
            email: Some("not-an-email".into()),
            password: Some("short".into()),
            ..Default::default()
        }
        .validate()
        .unwrap_err();
        let fields: Vec<_> = err.fields().iter().map(|f| f.field.as_str()).collect();
        assert_eq!(fields, vec!["email", "password"]);
    }

    #[test]
    fn test_debug_hides_password() {
        let creds = LoginRequest {
            email: Some("a@x.com".into()),
            password: Some("hunter2hunter2".into()),
        }
        .validate()
        .unwrap();
        assert!(!format!("{creds:?}").contains("hunter2"));
    }
}
