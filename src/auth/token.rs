use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use super::AuthError;

/// Lifetime of every issued token
pub const TOKEN_TTL_HOURS: i64 = 24;

const ALGORITHM: Algorithm = Algorithm::HS256;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the student's email
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn new(email: impl Into<String>, now: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            sub: email.into(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        }
    }
}

/// Issues and verifies HS256 identity tokens with a fixed 24 hour TTL.
///
/// The signing secret is handed in at construction and never changes for the
/// lifetime of the service.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &[u8]) -> Result<Self, AuthError> {
        if secret.is_empty() {
            return Err(AuthError::InvalidSecret);
        }

        // Expiry is checked against an explicit clock in verify_at
        let mut validation = Validation::new(ALGORITHM);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            ttl: Duration::hours(TOKEN_TTL_HOURS),
        })
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a token for `email`, valid from now until now + TTL
    pub fn issue(&self, email: &str) -> Result<String, AuthError> {
        self.issue_at(email, Utc::now())
    }

    pub fn issue_at(&self, email: &str, now: DateTime<Utc>) -> Result<String, AuthError> {
        let claims = Claims::new(email, now, self.ttl);

        encode(&Header::new(ALGORITHM), &claims, &self.encoding_key)
            .map_err(|e| AuthError::TokenGeneration(e.to_string()))
    }

    /// Verify a token and return the subject email it was issued for
    pub fn verify(&self, token: &str) -> Result<String, AuthError> {
        self.verify_at(token, Utc::now())
    }

    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<String, AuthError> {
        let claims = self.decode_claims(token)?;

        if now.timestamp() >= claims.exp {
            return Err(AuthError::ExpiredToken);
        }

        Ok(claims.sub)
    }

    fn decode_claims(&self, token: &str) -> Result<Claims, AuthError> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => AuthError::InvalidSignature,
                ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
                _ => AuthError::MalformedToken,
            })?;

        if token_data.claims.sub.is_empty() {
            return Err(AuthError::MalformedToken);
        }

        Ok(token_data.claims)
    }
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("algorithm", &ALGORITHM)
            .field("ttl_hours", &self.ttl.num_hours())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const SECRET: &[u8] = b"test-secret-with-enough-bytes-000";

    fn service() -> TokenService {
        TokenService::new(SECRET).unwrap()
    }

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn tamper(token: &str) -> String {
        // Flip one character inside the claims segment
        let idx = token.find('.').unwrap() + 5;
        let mut chars: Vec<char> = token.chars().collect();
        chars[idx] = if chars[idx] == 'A' { 'B' } else { 'A' };
        chars.into_iter().collect()
    }

    #[test]
    fn issued_token_verifies_to_its_subject() {
        let tokens = service();
        let token = tokens.issue("a@x.com").unwrap();
        assert_eq!(tokens.verify(&token).unwrap(), "a@x.com");
    }

    #[test]
    fn claims_carry_a_24_hour_window() {
        let now = at(1_700_000_000);
        let claims = Claims::new("a@x.com", now, service().ttl());
        assert_eq!(claims.iat, 1_700_000_000);
        assert_eq!(claims.exp - claims.iat, 24 * 60 * 60);
    }

    #[test]
    fn issuance_is_deterministic_for_the_same_instant() {
        let tokens = service();
        let now = Utc::now();
        assert_eq!(
            tokens.issue_at("a@x.com", now).unwrap(),
            tokens.issue_at("a@x.com", now).unwrap()
        );
    }

    #[test]
    fn token_expires_exactly_at_ttl() {
        let tokens = service();
        let issued = Utc::now();
        let token = tokens.issue_at("a@x.com", issued).unwrap();

        let just_before = issued + Duration::hours(TOKEN_TTL_HOURS) - Duration::seconds(1);
        assert_eq!(tokens.verify_at(&token, just_before).unwrap(), "a@x.com");

        let at_expiry = issued + Duration::hours(TOKEN_TTL_HOURS);
        assert!(matches!(tokens.verify_at(&token, at_expiry), Err(AuthError::ExpiredToken)));

        let long_after = issued + Duration::days(3);
        assert!(matches!(tokens.verify_at(&token, long_after), Err(AuthError::ExpiredToken)));
    }

    #[test]
    fn expired_token_is_rejected_with_the_real_clock() {
        let tokens = service();
        let token = tokens.issue_at("a@x.com", Utc::now() - Duration::hours(25)).unwrap();
        assert!(matches!(tokens.verify(&token), Err(AuthError::ExpiredToken)));
    }

    #[test]
    fn token_from_another_secret_fails_signature() {
        let other = TokenService::new(b"a-completely-different-secret-value").unwrap();
        let token = other.issue("a@x.com").unwrap();
        assert!(matches!(service().verify(&token), Err(AuthError::InvalidSignature)));
    }

    #[test]
    fn algorithm_mismatch_is_a_hard_failure() {
        let claims = Claims::new("a@x.com", Utc::now(), Duration::hours(1));
        let token = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(SECRET),
        )
        .unwrap();

        assert!(matches!(service().verify(&token), Err(AuthError::InvalidSignature)));
    }

    #[test]
    fn tampered_token_is_rejected() {
        let tokens = service();
        let token = tokens.issue("a@x.com").unwrap();
        let err = tokens.verify(&tamper(&token)).unwrap_err();
        assert!(err.is_token_rejection(), "unexpected error: {:?}", err);
    }

    #[test]
    fn garbage_is_malformed() {
        let tokens = service();
        assert!(matches!(tokens.verify("not-a-token"), Err(AuthError::MalformedToken)));
        assert!(matches!(tokens.verify("a.b.c"), Err(AuthError::MalformedToken)));
        assert!(matches!(tokens.verify(""), Err(AuthError::MalformedToken)));
    }

    #[test]
    fn claims_without_expiry_are_malformed() {
        #[derive(Serialize)]
        struct NoExp<'a> {
            sub: &'a str,
            iat: i64,
        }

        let token = encode(
            &Header::new(ALGORITHM),
            &NoExp { sub: "a@x.com", iat: Utc::now().timestamp() },
            &EncodingKey::from_secret(SECRET),
        )
        .unwrap();

        assert!(matches!(service().verify(&token), Err(AuthError::MalformedToken)));
    }

    #[test]
    fn empty_secret_is_refused() {
        assert!(matches!(TokenService::new(b""), Err(AuthError::InvalidSecret)));
    }
}
