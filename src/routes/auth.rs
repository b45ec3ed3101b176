/// Authentication Routes
///
/// Login, refresh-token rotation, and logout.

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::auth::{
    verify_password, verify_password_without_user, AccessClaims, TokenPair, TokenService,
};
use crate::error::{AppError, AuthError, ErrorContext};
use crate::routes::blocking;
use crate::user_store::UserStore;

/// User login request
#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Token refresh request
#[derive(Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Authentication response with access and refresh tokens
#[derive(Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

impl AuthResponse {
    fn bearer(pair: TokenPair, expires_in: i64) -> Self {
        Self {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            token_type: "Bearer".to_string(),
            expires_in,
        }
    }
}

/// POST /auth/login
///
/// Exchange email and password for a token pair. Issuing the pair replaces
/// any refresh token the user held before.
///
/// # Errors
/// - 401: Unknown email or wrong password (same response for both)
pub async fn login(
    form: web::Json<LoginRequest>,
    users: web::Data<dyn UserStore>,
    tokens: web::Data<TokenService>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("user_login");
    let email = form.email.trim().to_lowercase();

    let found = users.find_by_email(&email).await?;

    // an unknown email costs the same bcrypt work as a wrong password
    let password = form.password.clone();
    let password_hash = found.as_ref().map(|user| user.password_hash.clone());
    let password_valid = blocking(move || match password_hash {
        Some(hash) => verify_password(&password, &hash),
        None => Ok(verify_password_without_user(&password)),
    })
    .await?;

    let mut user = match found {
        Some(user) if password_valid => user,
        _ => return Err(AppError::Auth(AuthError::InvalidCredentials)),
    };

    let pair = tokens.issue_token_pair(&mut user).await?;

    tracing::info!(
        request_id = %context.request_id,
        operation = %context.operation,
        user_id = %user.id,
        "User logged in"
    );

    Ok(HttpResponse::Ok().json(AuthResponse::bearer(pair, tokens.access_token_expiry())))
}

/// POST /auth/refresh
///
/// Rotate a refresh token: the presented token must be the one currently
/// stored for its user. On success it is replaced, so presenting it again
/// fails.
///
/// # Errors
/// - 401 `REFRESH_REJECTED`: invalid, expired, superseded, or unknown-user
///   token; the response does not say which
pub async fn refresh(
    form: web::Json<RefreshRequest>,
    tokens: web::Data<TokenService>,
) -> Result<HttpResponse, AppError> {
    let pair = tokens.rotate_tokens(&form.refresh_token).await?;
    Ok(HttpResponse::Ok().json(AuthResponse::bearer(pair, tokens.access_token_expiry())))
}

/// POST /auth/logout
///
/// Revoke the caller's refresh token. The access token stays valid until it
/// expires.
pub async fn logout(
    claims: web::ReqData<AccessClaims>,
    tokens: web::Data<TokenService>,
) -> Result<HttpResponse, AppError> {
    tokens.revoke_refresh_token(claims.id).await?;
    Ok(HttpResponse::NoContent().finish())
}
