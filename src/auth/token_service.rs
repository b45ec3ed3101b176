/// Token Service
///
/// Mints, verifies and rotates access/refresh token pairs. Access tokens are
/// stateless and checked by signature and expiry only. A refresh token is
/// accepted only while its digest is the one stored on the user record, and
/// every issuance overwrites that record, so at most one refresh token per
/// user is live at a time.
///
/// Rotation, one attempt per call:
///
/// ```text
/// Start -> Verifying -> Rejected
///                    -> LookingUp -> Rejected
///                                 -> Comparing -> Rejected
///                                              -> Issued
/// ```

use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::claims::{AccessClaims, RefreshClaims};
use crate::auth::jwt;
use crate::configuration::JwtSettings;
use crate::error::{RotationError, TokenError, VerificationError};
use crate::user_store::{User, UserStore};

/// Freshly minted tokens, handed to the client
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Clone)]
pub struct TokenService {
    settings: Arc<JwtSettings>,
    users: Arc<dyn UserStore>,
}

impl TokenService {
    pub fn new(settings: JwtSettings, users: Arc<dyn UserStore>) -> Self {
        Self {
            settings: Arc::new(settings),
            users,
        }
    }

    /// Access token lifetime in seconds
    pub fn access_token_expiry(&self) -> i64 {
        self.settings.access_token_expiry
    }

    /// Mint a new pair for `user` and store the refresh half on the record.
    ///
    /// Whatever refresh token the user held before stops being accepted by
    /// [`TokenService::rotate_tokens`] once this returns.
    ///
    /// # Errors
    /// `TokenError::Signing` if encoding fails, `TokenError::Store` if the
    /// user record cannot be updated
    pub async fn issue_token_pair(&self, user: &mut User) -> Result<TokenPair, TokenError> {
        let now = Utc::now().timestamp();
        let access_claims =
            AccessClaims::new(user.id, user.role, now, self.settings.access_token_expiry);
        let refresh_claims = RefreshClaims::new(user.id, now, self.settings.refresh_token_expiry);

        let access_token = jwt::sign(&access_claims, &self.settings.access_secret)?;
        let refresh_token = jwt::sign(&refresh_claims, &self.settings.refresh_secret)?;

        user.set_refresh_token(&refresh_token);
        self.users
            .set_refresh_token_hash(user.id, user.refresh_token_hash.as_deref())
            .await?;

        tracing::debug!(user_id = %user.id, role = %user.role, "Token pair issued");

        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }

    pub fn verify_access_token(&self, token: &str) -> Result<AccessClaims, VerificationError> {
        jwt::verify(token, &self.settings.access_secret)
    }

    pub fn verify_refresh_token(&self, token: &str) -> Result<RefreshClaims, VerificationError> {
        jwt::verify(token, &self.settings.refresh_secret)
    }

    /// Exchange the user's current refresh token for a new pair.
    ///
    /// # Errors
    /// Rejections (`InvalidToken`, `LookupFailed`, `UnknownUser`, `Revoked`)
    /// mean the caller must re-authenticate. `RotationError::Token` is a fault
    /// while minting the new pair.
    pub async fn rotate_tokens(&self, presented: &str) -> Result<TokenPair, RotationError> {
        let claims = self.verify_refresh_token(presented).map_err(|kind| {
            tracing::warn!(reason = %kind, "Refresh rejected: token failed verification");
            RotationError::InvalidToken(kind)
        })?;

        let found = self.users.find_by_id(claims.id).await.map_err(|e| {
            tracing::error!(
                user_id = %claims.id,
                error = %e,
                "Refresh rejected: user lookup failed"
            );
            RotationError::LookupFailed(e)
        })?;

        let mut user = match found {
            Some(user) => user,
            None => {
                tracing::warn!(user_id = %claims.id, "Refresh rejected: unknown user");
                return Err(RotationError::UnknownUser(claims.id));
            }
        };

        if !user.refresh_token_matches(presented) {
            tracing::warn!(
                user_id = %user.id,
                has_stored_token = user.refresh_token_hash.is_some(),
                "Refresh rejected: token is not the current one"
            );
            return Err(RotationError::Revoked);
        }

        let pair = self.issue_token_pair(&mut user).await?;
        tracing::info!(user_id = %user.id, "Refresh token rotated");
        Ok(pair)
    }

    /// Forget the stored refresh token so no outstanding one can be rotated.
    pub async fn revoke_refresh_token(&self, user_id: Uuid) -> Result<(), TokenError> {
        self.users.set_refresh_token_hash(user_id, None).await?;

        tracing::info!(user_id = %user_id, "Refresh token revoked");
        Ok(())
    }
}
