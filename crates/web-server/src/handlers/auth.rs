use crate::{
    AppState,
    auth::{hash_password, issue_token, verify_password},
    error::AppError,
};
use axum::{Json, extract::State, http::StatusCode};
use core_types::{Client, NewUser, UserProfile, UserRole};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct RegisterPayload {
    pub email: String,
    pub password: String,
    pub role: Option<UserRole>,
}

#[derive(Debug, Deserialize)]
pub struct LoginPayload {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientLoginPayload {
    pub client_code: String,
    pub phone_last4: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: UserProfile,
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct ClientAuthResponse {
    pub user: UserProfile,
    pub client: Client,
    pub token: String,
}

fn validate_credentials(email: &str, password: &str) -> Result<(), AppError> {
    if email.trim().is_empty() || !email.contains('@') {
        return Err(AppError::Validation("A valid email is required".to_string()));
    }
    if password.len() < 6 {
        return Err(AppError::Validation(
            "Password must be at least 6 characters".to_string(),
        ));
    }
    Ok(())
}

/// # POST /api/auth/register
/// Creates a staff account and hands back a token right away.
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegisterPayload>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    validate_credentials(&payload.email, &payload.password)?;
    let role = payload.role.unwrap_or(UserRole::User);
    if role == UserRole::Client {
        return Err(AppError::Validation(
            "Client accounts are created through client login".to_string(),
        ));
    }

    if state
        .db_repo
        .find_user_by_email(&payload.email)
        .await?
        .is_some()
    {
        return Err(AppError::Validation("User already exists".to_string()));
    }

    let user = state
        .db_repo
        .create_user(&NewUser {
            email: payload.email,
            password_hash: hash_password(&payload.password),
            role,
            client_id: None,
        })
        .await?;

    let token = issue_token(user.id);
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            user: user.into(),
            token,
        }),
    ))
}

/// # POST /api/auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginPayload>,
) -> Result<Json<AuthResponse>, AppError> {
    let user = state
        .db_repo
        .find_user_by_email(&payload.email)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid credentials".to_string()))?;

    if !verify_password(&payload.password, &user.password_hash) {
        return Err(AppError::Unauthorized("Invalid credentials".to_string()));
    }

    let token = issue_token(user.id);
    Ok(Json(AuthResponse {
        user: user.into(),
        token,
    }))
}

/// # POST /api/auth/client-login
/// Lets a client into the portal with their code and the last 4 digits of
/// their phone number. The backing account is created on first login.
pub async fn client_login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ClientLoginPayload>,
) -> Result<Json<ClientAuthResponse>, AppError> {
    if payload.client_code.trim().is_empty() {
        return Err(AppError::Validation("clientCode is required".to_string()));
    }
    if payload.phone_last4.len() != 4 {
        return Err(AppError::Validation(
            "phoneLast4 must be exactly 4 characters".to_string(),
        ));
    }

    let client = state
        .db_repo
        .find_client_by_code(&payload.client_code)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid credentials".to_string()))?;

    let digits = client.phone.chars().count();
    let phone_last4: String = client.phone.chars().skip(digits.saturating_sub(4)).collect();
    if phone_last4 != payload.phone_last4 {
        return Err(AppError::Unauthorized("Invalid credentials".to_string()));
    }

    let user = match state.db_repo.find_user_by_client(client.id).await? {
        Some(user) => user,
        None => {
            // First portal login: provision the backing account.
            let default_password = format!("{}{}", payload.client_code, payload.phone_last4);
            state
                .db_repo
                .create_user(&NewUser {
                    email: format!("{}@client.local", payload.client_code),
                    password_hash: hash_password(&default_password),
                    role: UserRole::Client,
                    client_id: Some(client.id),
                })
                .await?
        }
    };

    let token = issue_token(user.id);
    Ok(Json(ClientAuthResponse {
        user: user.into(),
        client,
        token,
    }))
}
