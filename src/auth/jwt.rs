use axum::extract::FromRef;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use time::{Duration, OffsetDateTime};
use tracing::debug;

use super::claims::{Claims, Identity};
use crate::config::JwtConfig;
use crate::state::AppState;

/// Holds the JWT signing and verification keys plus the token lifetime.
/// Built from `JwtConfig`, immutable for the life of the process.
#[derive(Clone)]
pub struct JwtKeys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
    pub ttl: Duration,
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        let JwtConfig {
            secret,
            ttl_minutes,
        } = state.config.jwt.clone();
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::minutes(ttl_minutes),
        }
    }
}

impl JwtKeys {
    pub fn sign(&self, username: &str, user_id: i64, role: &str) -> anyhow::Result<String> {
        self.sign_with_ttl(username, user_id, role, self.ttl)
    }

    pub fn sign_with_ttl(
        &self,
        username: &str,
        user_id: i64,
        role: &str,
        ttl: Duration,
    ) -> anyhow::Result<String> {
        let exp = OffsetDateTime::now_utc() + ttl;
        let claims = Claims {
            sub: Some(username.to_string()),
            id: Some(user_id),
            role: Some(role.to_string()),
            exp: exp.unix_timestamp() as usize,
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(user_id, username, "jwt signed");
        Ok(token)
    }

    /// Checks the signature, algorithm and expiry, then the structural
    /// claims: a token missing `sub` or `id` never authenticates, even with
    /// a valid signature. Every failure mode collapses to `None`.
    pub fn verify(&self, token: &str) -> Option<Identity> {
        let mut validation = Validation::default();
        validation.leeway = 0;
        let data = decode::<Claims>(token, &self.decoding, &validation).ok()?;

        let Claims { sub, id, role, .. } = data.claims;
        let (username, user_id) = match (sub, id) {
            (Some(sub), Some(id)) => (sub, id),
            _ => {
                debug!("token signature verified but sub or id claim is missing");
                return None;
            }
        };
        Some(Identity {
            user_id,
            username,
            role: role.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_keys(secret: &str) -> JwtKeys {
        JwtKeys {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::minutes(30),
        }
    }

    #[test]
    fn sign_and_verify_roundtrip() {
        let keys = make_keys("dev-secret");
        let token = keys.sign("alice", 7, "admin").expect("sign");
        let identity = keys.verify(&token).expect("verify");
        assert_eq!(identity.username, "alice");
        assert_eq!(identity.user_id, 7);
        assert_eq!(identity.role, "admin");
    }

    #[tokio::test]
    async fn keys_come_from_injected_config() {
        let state = AppState::fake();
        let keys = JwtKeys::from_ref(&state);
        assert_eq!(keys.ttl, Duration::minutes(5));
        let token = keys.sign("bob", 1, "user").expect("sign");
        assert!(keys.verify(&token).is_some());
    }

    #[test]
    fn already_expired_token_is_invalid() {
        let keys = make_keys("dev-secret");
        let token = keys
            .sign_with_ttl("alice", 7, "user", Duration::seconds(-1))
            .expect("sign");
        assert!(keys.verify(&token).is_none());
    }

    #[test]
    fn tampered_token_is_invalid() {
        let keys = make_keys("dev-secret");
        let token = keys.sign("alice", 7, "user").expect("sign");
        let mut bytes = token.into_bytes();
        let mid = bytes.len() / 2;
        bytes[mid] = if bytes[mid] == b'A' { b'B' } else { b'A' };
        let tampered = String::from_utf8(bytes).expect("ascii token");
        assert!(keys.verify(&tampered).is_none());
    }

    #[test]
    fn token_signed_with_a_different_key_is_invalid() {
        let signer = make_keys("one-secret");
        let verifier = make_keys("other-secret");
        let token = signer.sign("alice", 7, "user").expect("sign");
        assert!(verifier.verify(&token).is_none());
    }

    #[test]
    fn token_without_sub_or_id_is_invalid_despite_good_signature() {
        #[derive(serde::Serialize)]
        struct BareClaims {
            exp: usize,
        }
        let keys = make_keys("dev-secret");
        let exp = (OffsetDateTime::now_utc() + Duration::minutes(5)).unix_timestamp() as usize;
        let token =
            encode(&Header::default(), &BareClaims { exp }, &keys.encoding).expect("encode");
        assert!(keys.verify(&token).is_none());

        #[derive(serde::Serialize)]
        struct NoIdClaims {
            sub: String,
            exp: usize,
        }
        let token = encode(
            &Header::default(),
            &NoIdClaims {
                sub: "alice".into(),
                exp,
            },
            &keys.encoding,
        )
        .expect("encode");
        assert!(keys.verify(&token).is_none());
    }

    #[test]
    fn missing_role_claim_yields_an_empty_role() {
        #[derive(serde::Serialize)]
        struct NoRoleClaims {
            sub: String,
            id: i64,
            exp: usize,
        }
        let keys = make_keys("dev-secret");
        let exp = (OffsetDateTime::now_utc() + Duration::minutes(5)).unix_timestamp() as usize;
        let token = encode(
            &Header::default(),
            &NoRoleClaims {
                sub: "alice".into(),
                id: 7,
                exp,
            },
            &keys.encoding,
        )
        .expect("encode");
        let identity = keys.verify(&token).expect("verify");
        assert_eq!(identity.role, "");
    }
}
