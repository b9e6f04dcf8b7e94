use anyhow::Result;
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

/// Identity claims carried by every access token. Validity is purely a
/// function of the signature and the time window; there is no revocation
/// store, so a leaked token stays valid until `exp`.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub user_id: String,
    pub username: String,
    pub exp: i64,
    pub iat: i64,
    pub nbf: i64,
}

const TOKEN_TTL_HOURS: i64 = 24;

pub fn create_jwt(user_id: &str, username: &str, secret: &str) -> Result<String> {
    let now = Utc::now();
    let claims = Claims {
        user_id: user_id.to_owned(),
        username: username.to_owned(),
        iat: now.timestamp(),
        nbf: now.timestamp(),
        exp: (now + Duration::hours(TOKEN_TTL_HOURS)).timestamp(),
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )?;

    Ok(token)
}

pub fn validate_jwt(token: &str, secret: &str) -> Result<Claims> {
    let mut validation = Validation::default();
    validation.validate_nbf = true;

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &validation,
    )?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jwt_cycle() {
        let secret = "test_secret";
        let token = create_jwt("bkp-abcdefgh", "alice", secret).unwrap();
        let claims = validate_jwt(&token, secret).unwrap();
        assert_eq!(claims.user_id, "bkp-abcdefgh");
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.exp - claims.iat, TOKEN_TTL_HOURS * 3600);
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let secret = "test_secret";
        // Hand-roll claims whose window closed an hour ago, well past the
        // validator's default leeway.
        let now = Utc::now();
        let claims = Claims {
            user_id: "bkp-abcdefgh".to_string(),
            username: "alice".to_string(),
            iat: (now - Duration::hours(25)).timestamp(),
            nbf: (now - Duration::hours(25)).timestamp(),
            exp: (now - Duration::hours(1)).timestamp(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_ref()),
        )
        .unwrap();

        assert!(validate_jwt(&token, secret).is_err());
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let token = create_jwt("bkp-abcdefgh", "alice", "secret_a").unwrap();
        assert!(validate_jwt(&token, "secret_b").is_err());
    }

    #[test]
    fn test_garbage_token_is_rejected() {
        assert!(validate_jwt("not-a-token", "secret").is_err());
    }
}
