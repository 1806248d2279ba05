// src/models/user.rs

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Institution-issued student numbers: letters, digits, '-' and '_'.
static STUDENT_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]{1,50}$").expect("student id pattern"));

/// Represents the 'students' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: Uuid,

    /// Human-facing student number, unique.
    pub student_id: String,

    /// Unique login email.
    pub email: String,

    /// Argon2 password hash.
    /// Skipped during serialization to prevent leaking sensitive data.
    #[serde(skip)]
    pub password_hash: String,

    pub first_name: String,
    pub last_name: String,

    pub created_at: DateTime<Utc>,
}

impl Student {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Represents the 'admins' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Admin {
    pub id: Uuid,

    /// Login handle, unique.
    pub admin_id: String,

    pub email: String,

    #[serde(skip)]
    pub password_hash: String,

    pub first_name: String,
    pub last_name: String,

    pub created_at: DateTime<Utc>,
}

/// DTO for student self-registration.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterStudentRequest {
    #[validate(regex(
        path = *STUDENT_ID_RE,
        message = "Student ID must be 1-50 letters, digits, '-' or '_'."
    ))]
    pub student_id: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(
        min = 6,
        max = 128,
        message = "Password length must be between 6 and 128 characters."
    ))]
    pub password: String,
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100))]
    pub last_name: String,
}

/// DTO for student login.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct StudentLoginRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 1, max = 128, message = "Password is required"))]
    pub password: String,
}

/// DTO for admin login.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminLoginRequest {
    #[validate(length(min = 1, max = 50, message = "Admin ID is required"))]
    pub admin_id: String,
    #[validate(length(min = 1, max = 128, message = "Password is required"))]
    pub password: String,
}

/// Token issued to a student on registration or login.
#[derive(Debug, Serialize, ToSchema)]
pub struct StudentAuthResponse {
    pub token: String,
    #[serde(rename = "type")]
    pub token_type: String,
    pub student: Student,
}

/// Token issued to an administrator on login.
#[derive(Debug, Serialize, ToSchema)]
pub struct AdminAuthResponse {
    pub token: String,
    #[serde(rename = "type")]
    pub token_type: String,
    pub admin: Admin,
}

/// Fields needed to insert a student; the password is already hashed.
#[derive(Debug, Clone)]
pub struct NewStudent {
    pub student_id: String,
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
}

/// Fields needed to insert an administrator; the password is already hashed.
#[derive(Debug, Clone)]
pub struct NewAdmin {
    pub admin_id: String,
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registration(student_id: &str, email: &str) -> RegisterStudentRequest {
        RegisterStudentRequest {
            student_id: student_id.to_string(),
            email: email.to_string(),
            password: "secret123".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
        }
    }

    #[test]
    fn test_registration_accepts_valid_input() {
        assert!(registration("S-2024_001", "ada@example.com").validate().is_ok());
    }

    #[test]
    fn test_registration_rejects_bad_student_id() {
        assert!(registration("S 001", "ada@example.com").validate().is_err());
        assert!(registration("", "ada@example.com").validate().is_err());
    }

    #[test]
    fn test_registration_rejects_bad_email() {
        assert!(registration("S001", "not-an-email").validate().is_err());
    }
}
