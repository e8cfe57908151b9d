use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{AccessToken, PublicUser, RefreshRequest, RegisterRequest, TokenPair, TokenRequest},
        jwt::JwtKeys,
        password::{hash_password, verify_password},
        repo::User,
    },
    error::{ApiError, FieldError},
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/token", post(token))
        .route("/token/refresh", post(token_refresh))
}

/// POST /register — the only endpoint besides token issuance that is
/// reachable without a credential.
#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<PublicUser>), ApiError> {
    let new = payload.validate()?;

    if User::find_by_username(&state.db, &new.username).await?.is_some() {
        warn!(username = %new.username, "username already taken");
        return Err(ApiError::Validation(vec![FieldError::new(
            "username",
            "A user with that username already exists.",
        )]));
    }

    let hash = hash_password(&new.password)?;
    let user = User::create(&state.db, &new, &hash).await?;

    info!(user_id = %user.id, username = %user.username, "user registered");
    Ok((StatusCode::CREATED, Json(user.into())))
}

/// POST /token — exchanges credentials for an access/refresh pair.
#[instrument(skip(state, payload))]
pub async fn token(
    State(state): State<AppState>,
    Json(payload): Json<TokenRequest>,
) -> Result<Json<TokenPair>, ApiError> {
    let (username, password) = payload.validate()?;

    let user = User::find_by_username(&state.db, &username)
        .await?
        .ok_or_else(|| {
            warn!(username = %username, "token request for unknown username");
            invalid_credentials()
        })?;

    if !verify_password(&password, &user.password_hash)? {
        warn!(user_id = %user.id, "token request with invalid password");
        return Err(invalid_credentials());
    }

    let keys = JwtKeys::from_ref(&state);
    let pair = TokenPair {
        access: keys.sign_access(user.id)?,
        refresh: keys.sign_refresh(user.id)?,
    };

    info!(user_id = %user.id, "token pair issued");
    Ok(Json(pair))
}

/// POST /token/refresh — exchanges a refresh token for a new access token.
#[instrument(skip(state, payload))]
pub async fn token_refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> Result<Json<AccessToken>, ApiError> {
    let refresh = payload
        .refresh
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::Validation(vec![FieldError::required("refresh")]))?;

    let keys = JwtKeys::from_ref(&state);
    let claims = keys
        .verify_refresh(&refresh)
        .map_err(|_| ApiError::unauthorized("Token is invalid or expired"))?;

    // The subject must still exist; a deleted user's refresh token is dead.
    User::find_by_id(&state.db, claims.sub)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Token is invalid or expired"))?;

    Ok(Json(AccessToken {
        access: keys.sign_access(claims.sub)?,
    }))
}

fn invalid_credentials() -> ApiError {
    ApiError::unauthorized("No active account found with the given credentials")
}
