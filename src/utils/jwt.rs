// src/utils/jwt.rs

use std::{
    fmt,
    time::{SystemTime, UNIX_EPOCH},
};

use axum::{
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{error::AppError, state::AppState};

/// Kind of account a token was issued to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Admin,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Student => write!(f, "student"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

/// JWT Claims structure.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Claims {
    /// Subject - the account's UUID (`students.id` or `admins.id`).
    pub sub: String,
    pub role: Role,
    /// Expiration time as Unix timestamp.
    pub exp: usize,
}

/// The authenticated caller of the current request.
///
/// Inserted into request extensions by `auth_middleware`; handlers pass its
/// id explicitly into service calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    pub id: Uuid,
    pub role: Role,
}

/// Signs a new JWT for the account.
pub fn sign_jwt(
    id: Uuid,
    role: Role,
    secret: &str,
    expiration_seconds: u64,
) -> Result<String, AppError> {
    let expiration = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| AppError::InternalServerError(e.to_string()))?
        .as_secs()
        + expiration_seconds;

    let claims = Claims {
        sub: id.to_string(),
        role,
        exp: expiration as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::InternalServerError(e.to_string()))
}

/// Verifies and decodes a JWT string into the caller's identity.
pub fn verify_jwt(token: &str, secret: &str) -> Result<Principal, AppError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::AuthError("Invalid token".to_string()))?;

    let id = Uuid::parse_str(&token_data.claims.sub)
        .map_err(|_| AppError::AuthError("Invalid token".to_string()))?;

    Ok(Principal {
        id,
        role: token_data.claims.role,
    })
}

/// Axum Middleware: Authentication.
///
/// Validates the 'Authorization: Bearer <token>' header and injects the
/// `Principal` into the request extensions. Missing or invalid tokens → 401.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| AppError::AuthError("Authentication required".to_string()))?;

    let principal = verify_jwt(token, &state.config.jwt_secret)?;
    req.extensions_mut().insert(principal);

    Ok(next.run(req).await)
}

fn require_role(req: &Request<Body>, role: Role) -> Result<(), AppError> {
    let principal = req
        .extensions()
        .get::<Principal>()
        .ok_or_else(|| AppError::AuthError("Authentication required".to_string()))?;

    if principal.role != role {
        return Err(AppError::Forbidden(format!("{} access required", role)));
    }
    Ok(())
}

/// Axum Middleware: Student Authorization.
/// Must be used AFTER `auth_middleware`.
pub async fn student_middleware(req: Request<Body>, next: Next) -> Result<Response, AppError> {
    require_role(&req, Role::Student)?;
    Ok(next.run(req).await)
}

/// Axum Middleware: Admin Authorization.
/// Must be used AFTER `auth_middleware`.
pub async fn admin_middleware(req: Request<Body>, next: Next) -> Result<Response, AppError> {
    require_role(&req, Role::Admin)?;
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "unit_test_secret";

    #[test]
    fn test_sign_and_verify_round_trip() {
        let id = Uuid::new_v4();
        let token = sign_jwt(id, Role::Student, SECRET, 60).unwrap();
        let principal = verify_jwt(&token, SECRET).unwrap();
        assert_eq!(principal, Principal { id, role: Role::Student });
    }

    #[test]
    fn test_verify_rejects_wrong_secret() {
        let token = sign_jwt(Uuid::new_v4(), Role::Admin, SECRET, 60).unwrap();
        assert!(matches!(
            verify_jwt(&token, "another_secret"),
            Err(AppError::AuthError(_))
        ));
    }

    #[test]
    fn test_verify_rejects_garbage() {
        assert!(verify_jwt("not.a.token", SECRET).is_err());
    }
}
