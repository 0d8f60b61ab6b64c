use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Guards the admin endpoints behind a single shared password.
///
/// A successful login yields a signed token. There is no session table: a token
/// is valid as long as its signature checks out and it hasn't expired.
pub struct Auth {
    password: Option<String>,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Could not sign token: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    admin: bool,
    iat: i64,
    exp: i64,
}

impl Auth {
    const TOKEN_DURATION_IN_HOURS: i64 = 24;

    /// Creates the auth layer. Without a password, every login attempt is refused.
    pub fn new(password: Option<String>, secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Self {
            password,
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Not constant time.
    pub fn verify_password(&self, candidate: &str) -> bool {
        self.password.as_deref() == Some(candidate)
    }

    /// Returns a token valid for the next 24 hours
    pub fn generate_token(&self) -> Result<String, AuthError> {
        self.generate_token_at(Utc::now())
    }

    /// Returns a token as if it had been issued at `issued_at`
    pub fn generate_token_at(&self, issued_at: DateTime<Utc>) -> Result<String, AuthError> {
        let expires_at = issued_at + Duration::hours(Self::TOKEN_DURATION_IN_HOURS);

        let claims = Claims {
            admin: true,
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };

        Ok(encode(&Header::default(), &claims, &self.encoding_key)?)
    }

    pub fn verify_token(&self, token: &str) -> bool {
        match decode::<Claims>(token, &self.decoding_key, &self.validation) {
            Ok(data) => data.claims.admin,
            Err(e) => {
                debug!("Rejected token: {}", e);
                false
            }
        }
    }
}

#[cfg(test)]
mod test {
    use chrono::{Duration, Utc};

    use super::Auth;

    fn auth() -> Auth {
        Auth::new(Some("hunter2".to_string()), "test-secret")
    }

    #[test]
    fn password_must_match_exactly() {
        let auth = auth();

        assert!(auth.verify_password("hunter2"));
        assert!(!auth.verify_password("hunter2 "));
        assert!(!auth.verify_password("Hunter2"));
        assert!(!auth.verify_password(""));
    }

    #[test]
    fn missing_password_refuses_everything() {
        let auth = Auth::new(None, "test-secret");

        assert!(!auth.verify_password(""));
        assert!(!auth.verify_password("anything"));
    }

    #[test]
    fn fresh_token_is_valid() {
        let auth = auth();
        let token = auth.generate_token().unwrap();

        assert!(auth.verify_token(&token));
    }

    #[test]
    fn token_expires_after_a_day() {
        let auth = auth();

        let almost = auth
            .generate_token_at(Utc::now() - Duration::hours(23))
            .unwrap();
        let expired = auth
            .generate_token_at(Utc::now() - Duration::hours(25))
            .unwrap();

        assert!(auth.verify_token(&almost), "23 hour old token should be valid");
        assert!(!auth.verify_token(&expired), "25 hour old token should be expired");
    }

    #[test]
    fn token_from_another_secret_is_invalid() {
        let other = Auth::new(Some("hunter2".to_string()), "another-secret");
        let token = other.generate_token().unwrap();

        assert!(!auth().verify_token(&token));
    }

    #[test]
    fn garbage_is_invalid() {
        let auth = auth();

        assert!(!auth.verify_token(""));
        assert!(!auth.verify_token("not.a.token"));
    }
}
