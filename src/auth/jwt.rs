use chrono::{TimeDelta, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: i64,
    pub exp: i64,
}

impl Claims {
    pub fn new(user_id: i64, ttl_minutes: i64) -> Result<Self, String> {
        let exp = TimeDelta::try_minutes(ttl_minutes)
            .and_then(|ttl| Utc::now().checked_add_signed(ttl))
            .ok_or_else(|| format!("Token lifetime out of range: {ttl_minutes} minutes"))?;
        Ok(Self {
            sub: user_id,
            exp: exp.timestamp(),
        })
    }
}

pub fn encode_token(claims: &Claims, secret: &str) -> Result<String, String> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| format!("JWT encode failed: {e}"))
}

pub fn decode_token(token: &str, secret: &str) -> Result<Claims, String> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| format!("JWT decode failed: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-jwt-secret-that-is-long-enough";

    #[test]
    fn token_carries_user_identity() {
        let token = encode_token(&Claims::new(42, 60).unwrap(), SECRET).unwrap();
        let claims = decode_token(&token, SECRET).unwrap();
        assert_eq!(claims.sub, 42);
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let token = encode_token(&Claims::new(42, 60).unwrap(), SECRET).unwrap();
        assert!(decode_token(&token, "a-completely-different-secret").is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let token = encode_token(&Claims::new(42, -120).unwrap(), SECRET).unwrap();
        assert!(decode_token(&token, SECRET).is_err());
    }

    #[test]
    fn oversized_lifetime_is_an_error() {
        assert!(Claims::new(42, i64::MAX).is_err());
    }
}
