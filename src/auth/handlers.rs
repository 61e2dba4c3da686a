use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{
            AuthResponse, CheckResponse, LoginRequest, PublicUser, RefreshRequest, RegisterRequest,
        },
        repo::{NewUser, User},
        services::{
            hash_password, is_valid_email, is_valid_url, is_valid_username, verify_password,
            AuthUser, JwtKeys, MaybeAuthUser,
        },
    },
    error::ApiError,
    response::Envelope,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
        .route("/auth/check", get(check))
        .route("/auth/logout", get(logout).post(logout))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(mut payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<Envelope<PublicUser>>), ApiError> {
    payload.username = payload.username.trim().to_string();
    payload.email = payload.email.trim().to_lowercase();
    let github_url = non_empty(payload.github_url.take());

    // Accumulate every validation failure so the client sees the full list.
    let mut errors = Vec::new();
    if payload.username.is_empty() {
        errors.push("Username is required.".to_string());
    } else if payload.username.len() < 3 {
        errors.push("Username must be at least 3 characters long.".to_string());
    } else if !is_valid_username(&payload.username) {
        errors.push("Username can only contain letters, numbers, and underscores.".to_string());
    }

    if payload.email.is_empty() {
        errors.push("Email is required.".to_string());
    } else if !is_valid_email(&payload.email) {
        errors.push("Invalid email format.".to_string());
    }

    if payload.password.is_empty() {
        errors.push("Password is required.".to_string());
    } else if payload.password.len() < 8 {
        errors.push("Password must be at least 8 characters long.".to_string());
    }

    if payload.password != payload.confirm_password {
        errors.push("Passwords do not match.".to_string());
    }

    if let Some(url) = github_url.as_deref() {
        if !is_valid_url(url) {
            errors.push("Invalid GitHub URL format.".to_string());
        }
    }

    if !errors.is_empty() {
        warn!(username = %payload.username, "registration validation failed");
        return Err(ApiError::Validation(errors));
    }

    if User::username_or_email_taken(&state.db, &payload.username, &payload.email).await? {
        warn!(username = %payload.username, "username or email already exists");
        return Err(ApiError::Conflict(
            "Username or email already exists.".to_string(),
        ));
    }

    let password_hash = hash_password(&payload.password)?;
    let new = NewUser {
        username: payload.username,
        email: payload.email,
        password_hash,
        first_name: non_empty(payload.first_name),
        last_name: non_empty(payload.last_name),
        bio: non_empty(payload.bio),
        github_url,
        job_title: non_empty(payload.job_title),
    };
    let user = User::create(&state.db, &new).await?;

    info!(user_id = %user.id, username = %user.username, "user registered");
    Ok((
        StatusCode::CREATED,
        Envelope::ok(
            "Registration successful! Please login to continue.",
            PublicUser::from(&user),
        ),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(mut payload): Json<LoginRequest>,
) -> Result<Json<Envelope<AuthResponse>>, ApiError> {
    payload.email = payload.email.trim().to_lowercase();

    let mut errors = Vec::new();
    if payload.email.is_empty() {
        errors.push("Email is required.".to_string());
    } else if !is_valid_email(&payload.email) {
        errors.push("Invalid email format.".to_string());
    }
    if payload.password.is_empty() {
        errors.push("Password is required.".to_string());
    }
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    // Unknown email and wrong password are indistinguishable to the client.
    let user = match User::find_by_email(&state.db, &payload.email).await? {
        Some(u) => u,
        None => {
            warn!(email = %payload.email, "login unknown email");
            return Err(ApiError::Unauthorized("Invalid email or password.".to_string()));
        }
    };

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(user_id = %user.id, "login invalid password");
        return Err(ApiError::Unauthorized("Invalid email or password.".to_string()));
    }

    let keys = JwtKeys::from_ref(&state);
    let access_token = keys.sign_access(user.id)?;
    let refresh_token = keys.sign_refresh(user.id)?;

    info!(user_id = %user.id, "user logged in");
    let greeting = format!(
        "Welcome back, {}!",
        user.first_name.as_deref().unwrap_or(&user.username)
    );
    Ok(Envelope::ok(
        greeting,
        AuthResponse {
            access_token,
            refresh_token,
            user: PublicUser::from(&user),
        },
    ))
}

#[instrument(skip(state, payload))]
pub async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> Result<Json<Envelope<AuthResponse>>, ApiError> {
    let keys = JwtKeys::from_ref(&state);
    let claims = keys
        .verify_refresh(&payload.refresh_token)
        .map_err(|e| ApiError::Unauthorized(e.to_string()))?;

    let user = User::find_by_id(&state.db, claims.sub)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("User not found".to_string()))?;

    let access_token = keys.sign_access(user.id)?;
    let refresh_token = keys.sign_refresh(user.id)?;

    Ok(Envelope::ok(
        "Token refreshed",
        AuthResponse {
            access_token,
            refresh_token,
            user: PublicUser::from(&user),
        },
    ))
}

/// Authentication status probe. Never fails: an absent or invalid token just
/// reports `logged_in: false`.
#[instrument(skip(state))]
pub async fn check(
    State(state): State<AppState>,
    MaybeAuthUser(user_id): MaybeAuthUser,
) -> Result<Json<Envelope<CheckResponse>>, ApiError> {
    let user = match user_id {
        Some(id) => User::find_by_id(&state.db, id).await?,
        None => None,
    };
    Ok(Envelope::ok(
        "Authentication status",
        CheckResponse {
            logged_in: user.is_some(),
            user: user.as_ref().map(PublicUser::from),
        },
    ))
}

/// Tokens are held by the client; logout is an acknowledgement telling it to
/// discard them.
#[instrument]
pub async fn logout() -> Json<Envelope<()>> {
    Envelope::message("You have been successfully logged out.")
}
