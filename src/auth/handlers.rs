use axum::{
    extract::{rejection::JsonRejection, FromRef, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{LoginRequest, PrivateResponse, PublicUser, SignupRequest, SignupResponse, TokenResponse},
        jwt::{AuthUser, JwtKeys},
        repo_types::NewUser,
    },
    error::ApiError,
    state::AppState,
};

/// Method and path of every endpoint mounted by [`auth_routes`].
pub const ENDPOINTS: &[(&str, &str)] = &[
    ("POST", "/signup"),
    ("POST", "/login"),
    ("GET", "/private"),
];

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/private", get(private))
}

fn bad_body(rejection: JsonRejection) -> ApiError {
    warn!(error = %rejection, "rejected request body");
    ApiError::validation(rejection.body_text())
}

/// Surrounding whitespace is not part of an email; blank counts as missing.
fn clean_email(email: Option<String>) -> Option<String> {
    email
        .map(|e| e.trim().to_string())
        .filter(|e| !e.is_empty())
}

#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<SignupResponse>), ApiError> {
    let Json(payload) = payload.map_err(bad_body)?;

    let email = clean_email(payload.email);
    let password = payload.password.filter(|p| !p.is_empty());
    let (email, password) = match (email, password) {
        (Some(e), Some(p)) => (e, p),
        (email, password) => {
            let mut fields = Vec::new();
            if email.is_none() {
                fields.push("email");
            }
            if password.is_none() {
                fields.push("password");
            }
            warn!(?fields, "signup missing fields");
            return Err(ApiError::Validation {
                message: "Missing email or password".into(),
                fields,
            });
        }
    };

    if state.store.find_by_email(&email).await?.is_some() {
        warn!(email = %email, "email already registered");
        return Err(ApiError::Conflict("User already exists".into()));
    }

    let password_hash = state.hasher.hash(&password)?;
    let user = state
        .store
        .create(NewUser {
            email,
            password_hash,
            is_active: payload.is_active.unwrap_or(true),
        })
        .await?;

    info!(user_id = %user.id, email = %user.email, is_active = user.is_active, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            msg: "User created successfully".into(),
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<TokenResponse>, ApiError> {
    let Json(payload) = payload.map_err(bad_body)?;
    let email = clean_email(payload.email).unwrap_or_default();
    let password = payload.password.unwrap_or_default();

    // Same message for unknown email and wrong password.
    let invalid = || ApiError::Auth("Invalid credentials".into());

    let Some(user) = state.store.find_by_email(&email).await? else {
        warn!(email = %email, "login unknown email");
        return Err(invalid());
    };

    if !state.hasher.verify(&password, &user.password_hash)? {
        warn!(email = %email, user_id = %user.id, "login invalid password");
        return Err(invalid());
    }

    let token = JwtKeys::from_ref(&state).sign(user.id)?;

    info!(user_id = %user.id, email = %user.email, "user logged in");
    Ok(Json(TokenResponse { token }))
}

#[instrument(skip(state))]
pub async fn private(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<PrivateResponse>, ApiError> {
    let user = state.store.find_by_id(user_id).await?.ok_or_else(|| {
        warn!(user_id = %user_id, "token subject no longer exists");
        ApiError::NotFound("User not found".into())
    })?;

    info!(user_id = %user.id, "private content served");
    Ok(Json(PrivateResponse {
        message: format!("Hello, {}. This is private content.", user.email),
        user: PublicUser {
            id: user.id,
            email: user.email,
        },
    }))
}
