// src/handlers/auth.rs

use std::sync::Arc;

use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};

use crate::{
    config::Config,
    error::AppError,
    models::user::{
        Admin, AdminAuthResponse, AdminLoginRequest, NewStudent, RegisterStudentRequest, Student,
        StudentAuthResponse, StudentLoginRequest,
    },
    store::Store,
    utils::{
        extract::ValidatedJson,
        hash::{hash_password, verify_password},
        jwt::{Principal, Role, sign_jwt},
    },
};

fn student_token(student: Student, config: &Config) -> Result<StudentAuthResponse, AppError> {
    let token = sign_jwt(
        student.id,
        Role::Student,
        &config.jwt_secret,
        config.jwt_expiration,
    )?;
    Ok(StudentAuthResponse {
        token,
        token_type: "Bearer".to_string(),
        student,
    })
}

/// Registers a new student and logs them in.
///
/// Email and student ID must both be unused. Returns 201 with a token.
#[utoipa::path(
    post,
    path = "/api/student/register",
    tag = "auth",
    request_body = RegisterStudentRequest,
    responses(
        (status = 201, description = "Student registered", body = StudentAuthResponse),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "Email or student ID already in use")
    )
)]
pub async fn register_student(
    State(store): State<Arc<dyn Store>>,
    State(config): State<Config>,
    ValidatedJson(payload): ValidatedJson<RegisterStudentRequest>,
) -> Result<impl IntoResponse, AppError> {
    let email = payload.email.trim().to_lowercase();

    if store.find_student_by_email(&email).await?.is_some() {
        return Err(AppError::Conflict(
            "Student with this email already exists".to_string(),
        ));
    }
    if store
        .find_student_by_student_id(&payload.student_id)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict("Student ID already exists".to_string()));
    }

    let password_hash = hash_password(&payload.password)?;

    let student = store
        .create_student(NewStudent {
            student_id: payload.student_id,
            email,
            password_hash,
            first_name: payload.first_name.trim().to_string(),
            last_name: payload.last_name.trim().to_string(),
        })
        .await?;

    tracing::info!(student_id = %student.student_id, "Student registered");

    Ok((StatusCode::CREATED, Json(student_token(student, &config)?)))
}

/// Authenticates a student by email and password.
#[utoipa::path(
    post,
    path = "/api/student/login",
    tag = "auth",
    request_body = StudentLoginRequest,
    responses(
        (status = 200, description = "Logged in", body = StudentAuthResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login_student(
    State(store): State<Arc<dyn Store>>,
    State(config): State<Config>,
    ValidatedJson(payload): ValidatedJson<StudentLoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let email = payload.email.trim().to_lowercase();

    let student = store
        .find_student_by_email(&email)
        .await?
        .ok_or_else(|| AppError::AuthError("Invalid credentials".to_string()))?;

    if !verify_password(&payload.password, &student.password_hash)? {
        return Err(AppError::AuthError("Invalid credentials".to_string()));
    }

    Ok(Json(student_token(student, &config)?))
}

/// Returns the logged-in student's profile.
#[utoipa::path(
    get,
    path = "/api/student/me",
    tag = "auth",
    responses(
        (status = 200, description = "Current student", body = Student),
        (status = 401, description = "Not logged in")
    ),
    security(("bearer" = []))
)]
pub async fn student_me(
    State(store): State<Arc<dyn Store>>,
    Extension(principal): Extension<Principal>,
) -> Result<impl IntoResponse, AppError> {
    let student = store
        .find_student_by_id(principal.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Student not found".to_string()))?;

    Ok(Json(student))
}

/// Authenticates an administrator by admin ID and password.
#[utoipa::path(
    post,
    path = "/api/admin/login",
    tag = "auth",
    request_body = AdminLoginRequest,
    responses(
        (status = 200, description = "Logged in", body = AdminAuthResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login_admin(
    State(store): State<Arc<dyn Store>>,
    State(config): State<Config>,
    ValidatedJson(payload): ValidatedJson<AdminLoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let admin = store
        .find_admin_by_admin_id(&payload.admin_id)
        .await?
        .ok_or_else(|| AppError::AuthError("Invalid credentials".to_string()))?;

    if !verify_password(&payload.password, &admin.password_hash)? {
        return Err(AppError::AuthError("Invalid credentials".to_string()));
    }

    let token = sign_jwt(
        admin.id,
        Role::Admin,
        &config.jwt_secret,
        config.jwt_expiration,
    )?;

    Ok(Json(AdminAuthResponse {
        token,
        token_type: "Bearer".to_string(),
        admin,
    }))
}

/// Returns the logged-in administrator's profile.
#[utoipa::path(
    get,
    path = "/api/admin/me",
    tag = "auth",
    responses(
        (status = 200, description = "Current admin", body = Admin),
        (status = 401, description = "Not logged in")
    ),
    security(("bearer" = []))
)]
pub async fn admin_me(
    State(store): State<Arc<dyn Store>>,
    Extension(principal): Extension<Principal>,
) -> Result<impl IntoResponse, AppError> {
    let admin = store
        .find_admin_by_id(principal.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Admin not found".to_string()))?;

    Ok(Json(admin))
}
