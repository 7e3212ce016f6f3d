/// Signed identity tokens
///
/// Tokens are HS256 JWTs carrying the subject's user ID and email. They are
/// stateless: there is no server-side session or revocation list, so expiry
/// is the only lifecycle bound.
///
/// # Claims
///
/// - `sub`: user ID
/// - `email`: user email
/// - `iss`: always `"taskboard"`
/// - `iat` / `nbf` / `exp`: Unix timestamps
///
/// # Example
///
/// ```
/// use taskboard_shared::auth::jwt::TokenService;
/// use chrono::Duration;
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let tokens = TokenService::new("a-secret-of-at-least-thirty-two-bytes", Duration::hours(1));
/// let user_id = Uuid::new_v4();
///
/// let token = tokens.issue(user_id, "ada@example.com")?;
/// let claims = tokens.verify(&token)?;
/// assert_eq!(claims.sub, user_id);
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Issuer stamped into and required from every token
pub const ISSUER: &str = "taskboard";

/// Default token lifetime
pub fn default_ttl() -> Duration {
    Duration::hours(24)
}

/// Error type for JWT operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Signature, format or claim check failed
    #[error("Failed to validate token: {0}")]
    ValidationError(String),

    /// Token has expired
    #[error("Token has expired")]
    Expired,

    /// Token was minted by someone else
    #[error("Invalid issuer")]
    InvalidIssuer,
}

/// JWT claims
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: Uuid,

    /// Subject email
    pub email: String,

    /// Issuer
    pub iss: String,

    /// Issued at
    pub iat: i64,

    /// Not before
    pub nbf: i64,

    /// Expiration
    pub exp: i64,
}

impl Claims {
    /// Claims valid from now for the default lifetime
    pub fn new(user_id: Uuid, email: impl Into<String>) -> Self {
        let now = Utc::now();
        Self::spanning(user_id, email.into(), now, now + default_ttl())
    }

    /// Claims valid from now for `expires_in`
    ///
    /// Fails when `now + expires_in` falls outside the representable range.
    pub fn with_expiration(
        user_id: Uuid,
        email: impl Into<String>,
        expires_in: Duration,
    ) -> Result<Self, JwtError> {
        let now = Utc::now();
        let expires_at = now.checked_add_signed(expires_in).ok_or_else(|| {
            JwtError::CreateError(format!(
                "token lifetime of {}s is out of range",
                expires_in.num_seconds()
            ))
        })?;

        Ok(Self::spanning(user_id, email.into(), now, expires_at))
    }

    fn spanning(user_id: Uuid, email: String, from: DateTime<Utc>, until: DateTime<Utc>) -> Self {
        Self {
            sub: user_id,
            email,
            iss: ISSUER.to_string(),
            iat: from.timestamp(),
            nbf: from.timestamp(),
            exp: until.timestamp(),
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

/// Signs `claims` with HS256
pub fn create_token(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&Header::new(Algorithm::HS256), claims, &key)
        .map_err(|e| JwtError::CreateError(e.to_string()))
}

/// Checks signature, issuer, `exp` and `nbf`, and returns the claims
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);
    validation.validate_exp = true;
    validation.validate_nbf = true;
    validation.leeway = 0;

    let data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
        jsonwebtoken::errors::ErrorKind::InvalidIssuer => JwtError::InvalidIssuer,
        _ => JwtError::ValidationError(e.to_string()),
    })?;

    Ok(data.claims)
}

/// Issues and verifies tokens with one secret and lifetime
#[derive(Clone)]
pub struct TokenService {
    secret: String,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: impl Into<String>, ttl: Duration) -> Self {
        Self {
            secret: secret.into(),
            ttl,
        }
    }

    /// Token lifetime
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Mints a token for `(user_id, email)`
    pub fn issue(&self, user_id: Uuid, email: &str) -> Result<String, JwtError> {
        let claims = Claims::with_expiration(user_id, email, self.ttl)?;
        create_token(&claims, &self.secret)
    }

    /// Verifies a token minted by [`TokenService::issue`]
    pub fn verify(&self, token: &str) -> Result<Claims, JwtError> {
        validate_token(token, &self.secret)
    }
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("secret", &"<redacted>")
            .field("ttl", &self.ttl)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    #[test]
    fn test_claims_creation() {
        let user_id = Uuid::new_v4();
        let claims = Claims::new(user_id, "ada@example.com");

        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.email, "ada@example.com");
        assert_eq!(claims.iss, ISSUER);
        assert_eq!(claims.exp - claims.iat, default_ttl().num_seconds());
        assert!(!claims.is_expired());
    }

    #[test]
    fn test_create_and_validate_token() {
        let user_id = Uuid::new_v4();
        let token = create_token(&Claims::new(user_id, "a@example.com"), SECRET).unwrap();

        let claims = validate_token(&token, SECRET).unwrap();
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.email, "a@example.com");
    }

    #[test]
    fn test_validate_with_wrong_secret() {
        let token = create_token(&Claims::new(Uuid::new_v4(), "a@example.com"), SECRET).unwrap();
        let result = validate_token(&token, "another-secret-key-that-is-32-bytes!");
        assert!(matches!(result, Err(JwtError::ValidationError(_))));
    }

    #[test]
    fn test_validate_tampered_signature() {
        let token = create_token(&Claims::new(Uuid::new_v4(), "a@example.com"), SECRET).unwrap();

        // Flip the first character of the signature segment
        let (head, sig) = token.rsplit_once('.').unwrap();
        let mut sig: Vec<char> = sig.chars().collect();
        sig[0] = if sig[0] == 'A' { 'B' } else { 'A' };
        let tampered = format!("{}.{}", head, sig.into_iter().collect::<String>());

        assert!(validate_token(&tampered, SECRET).is_err());
    }

    #[test]
    fn test_validate_tampered_payload() {
        let token = create_token(&Claims::new(Uuid::new_v4(), "a@example.com"), SECRET).unwrap();
        let forged = create_token(&Claims::new(Uuid::new_v4(), "a@example.com"), SECRET).unwrap();

        // Payload of one token with the signature of another
        let parts: Vec<&str> = token.split('.').collect();
        let forged_parts: Vec<&str> = forged.split('.').collect();
        let spliced = format!("{}.{}.{}", parts[0], forged_parts[1], parts[2]);

        assert!(validate_token(&spliced, SECRET).is_err());
    }

    #[test]
    fn test_validate_expired_token() {
        let claims = Claims::with_expiration(
            Uuid::new_v4(),
            "a@example.com",
            Duration::seconds(-3600),
        )
        .unwrap();
        assert!(claims.is_expired());

        let token = create_token(&claims, SECRET).unwrap();
        assert!(matches!(validate_token(&token, SECRET), Err(JwtError::Expired)));
    }

    #[test]
    fn test_validate_foreign_issuer() {
        let mut claims = Claims::new(Uuid::new_v4(), "a@example.com");
        claims.iss = "someone-else".to_string();

        let token = create_token(&claims, SECRET).unwrap();
        assert!(matches!(
            validate_token(&token, SECRET),
            Err(JwtError::InvalidIssuer)
        ));
    }

    #[test]
    fn test_garbage_token() {
        assert!(validate_token("not.a.jwt", SECRET).is_err());
        assert!(validate_token("", SECRET).is_err());
    }

    #[test]
    fn test_out_of_range_lifetime_is_an_error() {
        let service = TokenService::new(SECRET, Duration::seconds(10_000_000_000_000));

        assert!(matches!(
            service.issue(Uuid::new_v4(), "ada@example.com"),
            Err(JwtError::CreateError(_))
        ));
    }

    #[test]
    fn test_token_service_roundtrip() {
        let service = TokenService::new(SECRET, Duration::minutes(5));
        let user_id = Uuid::new_v4();

        let token = service.issue(user_id, "ada@example.com").unwrap();
        let claims = service.verify(&token).unwrap();

        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.exp - claims.iat, 300);
    }

    #[test]
    fn test_token_service_debug_redacts_secret() {
        let service = TokenService::new(SECRET, Duration::minutes(5));
        assert!(!format!("{:?}", service).contains(SECRET));
    }
}
