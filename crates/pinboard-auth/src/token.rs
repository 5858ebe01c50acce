use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the account email.
    pub sub: String,
    pub iat: usize,
    pub exp: usize,
}

/// Signature mismatch, malformed token, and expiry all collapse here;
/// the boundary never tells a caller which one it was.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("invalid token")]
    Invalid,
}

/// HS256 bearer-token signer/verifier. Constructed once at startup from the
/// configured secret and TTL; the secret is never read ambiently after that.
pub struct TokenSigner {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenSigner {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        let mut validation = Validation::default();
        // No leeway: a token is invalid the second its expiry passes.
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
        }
    }

    pub fn issue(&self, subject: &str) -> anyhow::Result<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: subject.to_owned(),
            iat: now.timestamp() as usize,
            exp: (now + self.ttl).timestamp() as usize,
        };

        let token = encode(&Header::default(), &claims, &self.encoding)?;
        Ok(token)
    }

    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|_| TokenError::Invalid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signer(ttl: Duration) -> TokenSigner {
        TokenSigner::new("test-secret", ttl)
    }

    #[test]
    fn issue_verify_roundtrip() {
        let signer = signer(Duration::minutes(30));
        let token = signer.issue("alice@x.com").unwrap();
        let claims = signer.verify(&token).unwrap();
        assert_eq!(claims.sub, "alice@x.com");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn expired_token_fails() {
        let signer = signer(Duration::seconds(-60));
        let token = signer.issue("alice@x.com").unwrap();
        assert!(signer.verify(&token).is_err());
    }

    #[test]
    fn wrong_secret_fails() {
        let token = signer(Duration::minutes(30)).issue("alice@x.com").unwrap();
        let other = TokenSigner::new("another-secret", Duration::minutes(30));
        assert!(other.verify(&token).is_err());
    }

    #[test]
    fn tampered_token_fails() {
        let signer = signer(Duration::minutes(30));
        let mut token = signer.issue("alice@x.com").unwrap();
        token.push('x');
        assert!(signer.verify(&token).is_err());
    }

    #[test]
    fn garbage_fails() {
        let signer = signer(Duration::minutes(30));
        assert!(signer.verify("not.a.jwt").is_err());
        assert!(signer.verify("").is_err());
    }
}
