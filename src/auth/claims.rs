/// JWT Claims structures
///
/// Payloads of the two token kinds. Field names are the wire format:
/// access `{id, role, iat, exp}`, refresh `{id, iat, exp, jti}`.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::user_store::Role;

/// Claims carried by an access token
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct AccessClaims {
    /// User ID
    pub id: Uuid,
    /// Role at the time of issuance
    pub role: Role,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl AccessClaims {
    pub fn new(id: Uuid, role: Role, now: i64, expiry_seconds: i64) -> Self {
        Self {
            id,
            role,
            iat: now,
            exp: now + expiry_seconds,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Claims carried by a refresh token
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct RefreshClaims {
    /// User ID
    pub id: Uuid,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Unique token id; keeps two tokens minted in the same second distinct
    pub jti: Uuid,
}

impl RefreshClaims {
    pub fn new(id: Uuid, now: i64, expiry_seconds: i64) -> Self {
        Self {
            id,
            iat: now,
            exp: now + expiry_seconds,
            jti: Uuid::new_v4(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_claims_wire_shape() {
        let id = Uuid::new_v4();
        let claims = AccessClaims::new(id, Role::Standard, 1_000, 900);
        let json = serde_json::to_value(&claims).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "id": id.to_string(),
                "role": "standard",
                "iat": 1_000,
                "exp": 1_900,
            })
        );
    }

    #[test]
    fn test_refresh_claims_lifetime() {
        let claims = RefreshClaims::new(Uuid::new_v4(), 1_000, 604800);
        assert_eq!(claims.exp - claims.iat, 604800);
    }

    #[test]
    fn test_refresh_claims_are_unique() {
        let id = Uuid::new_v4();
        let a = RefreshClaims::new(id, 1_000, 60);
        let b = RefreshClaims::new(id, 1_000, 60);
        assert_ne!(a, b);
    }

    #[test]
    fn test_admin_check() {
        let claims = AccessClaims::new(Uuid::new_v4(), Role::Admin, 0, 60);
        assert!(claims.is_admin());
    }
}
