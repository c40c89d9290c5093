use actix_web::{web, HttpResponse};
use shared_types::validation::{validate_email, validate_password};
use shared_types::{
    ForgotPasswordRequest, LoginRequest, LoginResponse, MessageResponse, RegisterRequest,
    RegisterResponse, ResetPasswordRequest,
};
use std::sync::Arc;
use tracing::info;

use crate::config::AuthConfig;
use crate::database::{is_constraint_violation, users as db, Database};
use crate::handlers::ApiError;
use crate::helpers::auth::{access_token_cookie, cleared_cookie, AuthenticatedUser};
use crate::helpers::security::{hash_password, verify_password, TokenService};

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn email_taken() -> ApiError {
    ApiError::Conflict("An account with this email already exists".to_string())
}

/// A concurrent registration can still win the race to the UNIQUE index
fn insert_error(e: anyhow::Error) -> ApiError {
    if is_constraint_violation(&e) {
        email_taken()
    } else {
        ApiError::from(e)
    }
}

pub async fn register(
    db: web::Data<Arc<Database>>,
    tokens: web::Data<TokenService>,
    auth: web::Data<AuthConfig>,
    request: web::Json<RegisterRequest>,
) -> Result<HttpResponse, ApiError> {
    let req = request.into_inner();
    let email = normalize_email(&req.email);
    validate_email(&email)?;

    if db::find_user_by_email(db.async_connection.clone(), &email)
        .await?
        .is_some()
    {
        return Err(email_taken());
    }

    validate_password(&req.password)?;

    let password_hash = hash_password(&req.password)?;
    let user = db::insert_user(db.async_connection.clone(), &email, &password_hash)
        .await
        .map_err(insert_error)?;
    let token = tokens.create_token(user.id)?;

    info!("Registered user {}", user.id);

    Ok(HttpResponse::Created()
        .cookie(access_token_cookie(&token, &auth))
        .json(RegisterResponse {
            id: user.id,
            email: user.email,
            message: "Account created successfully".to_string(),
        }))
}

pub async fn login(
    db: web::Data<Arc<Database>>,
    tokens: web::Data<TokenService>,
    auth: web::Data<AuthConfig>,
    request: web::Json<LoginRequest>,
) -> Result<HttpResponse, ApiError> {
    let req = request.into_inner();
    let email = normalize_email(&req.email);

    let user = db::find_user_by_email(db.async_connection.clone(), &email)
        .await?
        .filter(|user| verify_password(&req.password, &user.password_hash))
        .ok_or_else(|| ApiError::Unauthorized("Invalid email or password".to_string()))?;

    let token = tokens.create_token(user.id)?;

    info!("User {} logged in", user.id);

    Ok(HttpResponse::Ok()
        .cookie(access_token_cookie(&token, &auth))
        .json(LoginResponse {
            access_token: token,
            token_type: "bearer".to_string(),
            user: RegisterResponse {
                id: user.id,
                email: user.email,
                message: "Login successful".to_string(),
            },
        }))
}

pub async fn logout(
    user: AuthenticatedUser,
    auth: web::Data<AuthConfig>,
) -> Result<HttpResponse, ApiError> {
    info!("User {} logged out", user.id);

    Ok(HttpResponse::Ok()
        .cookie(cleared_cookie(&auth))
        .json(MessageResponse::new("Logged out successfully")))
}

pub async fn me(user: AuthenticatedUser) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(RegisterResponse {
        id: user.id,
        email: user.email,
        message: "User profile retrieved successfully".to_string(),
    }))
}

/// Never reveals whether the address is registered
pub async fn forgot_password(
    db: web::Data<Arc<Database>>,
    request: web::Json<ForgotPasswordRequest>,
) -> Result<HttpResponse, ApiError> {
    let email = normalize_email(&request.email);

    if db::find_user_by_email(db.async_connection.clone(), &email)
        .await?
        .is_some()
    {
        info!("Password reset requested for {}", email);
    }

    Ok(HttpResponse::Ok().json(MessageResponse::new(
        "If the email exists, a reset link would be sent",
    )))
}

pub async fn reset_password(
    db: web::Data<Arc<Database>>,
    request: web::Json<ResetPasswordRequest>,
) -> Result<HttpResponse, ApiError> {
    let req = request.into_inner();
    let email = normalize_email(&req.email);

    let user = db::find_user_by_email(db.async_connection.clone(), &email)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    validate_password(&req.new_password)?;

    let password_hash = hash_password(&req.new_password)?;
    db::update_password(db.async_connection.clone(), user.id, &password_hash).await?;

    info!("Password reset for user {}", user.id);

    Ok(HttpResponse::Ok().json(MessageResponse::new("Password reset successfully")))
}
