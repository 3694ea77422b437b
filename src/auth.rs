// src/auth.rs
use crate::database::DatabaseConfig;
use crate::errors::AuthError;
use crate::profiles::{Profile, ProfileRepository};
use crate::types::Identity;
use anyhow::Result;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use rocket::http::Status;
use rocket::request::{FromRequest, Outcome};
use rocket::{Request, State};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

/// Expected audience of the managed identity provider's bearer tokens.
const TOKEN_AUDIENCE: &str = "authenticated";

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // User ID
    pub email: String,
    pub aud: String,
    pub exp: usize, // Expiration timestamp
    pub iat: usize, // Issued at timestamp
}

pub struct AuthConfig {
    jwt_secret: String,
}

impl AuthConfig {
    pub fn new(jwt_secret: String) -> Self {
        Self { jwt_secret }
    }
}

/// Authenticated user with their stored profile, if one exists yet.
/// Freshly signed-up users reach profile creation with `profile: None`.
pub struct AuthenticatedUser {
    pub user_id: String,
    pub email: String,
    pub profile: Option<Profile>,
}

impl AuthenticatedUser {
    /// Session identity, available once a profile has been created.
    pub fn identity(&self) -> Option<Identity> {
        self.profile.as_ref().map(Profile::identity)
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AuthenticatedUser {
    type Error = AuthError;

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let auth_config = match req.guard::<&State<AuthConfig>>().await {
            Outcome::Success(config) => config,
            Outcome::Error((status, _)) => {
                return Outcome::Error((status, AuthError::DatabaseError))
            }
            Outcome::Forward(f) => return Outcome::Forward(f),
        };

        let db_config = match req.guard::<&State<DatabaseConfig>>().await {
            Outcome::Success(config) => config,
            Outcome::Error((status, _)) => {
                return Outcome::Error((status, AuthError::DatabaseError))
            }
            Outcome::Forward(f) => return Outcome::Forward(f),
        };

        // Extract Authorization header
        let token = match req.headers().get_one("Authorization") {
            Some(header) if header.starts_with("Bearer ") => &header[7..],
            Some(_) => {
                warn!("Invalid Authorization header format");
                return Outcome::Error((Status::Unauthorized, AuthError::InvalidToken));
            }
            None => {
                warn!("Missing Authorization header");
                return Outcome::Error((Status::Unauthorized, AuthError::MissingToken));
            }
        };

        let claims = match verify_token(token, auth_config) {
            Ok(claims) => claims,
            Err(e) => {
                warn!("Token verification failed: {}", e);
                return Outcome::Error((
                    Status::Unauthorized,
                    AuthError::TokenVerificationFailed,
                ));
            }
        };

        let pool = match db_config.pool() {
            Ok(pool) => pool,
            Err(e) => {
                error!("Database connection failed: {}", e);
                return Outcome::Error((Status::InternalServerError, AuthError::DatabaseError));
            }
        };

        let profile = match ProfileRepository::new(pool).find(&claims.sub).await {
            Ok(profile) => profile,
            Err(e) => {
                error!("Profile lookup failed for {}: {}", claims.sub, e);
                return Outcome::Error((Status::InternalServerError, AuthError::DatabaseError));
            }
        };

        Outcome::Success(AuthenticatedUser {
            user_id: claims.sub,
            email: claims.email,
            profile,
        })
    }
}

fn verify_token(token: &str, auth_config: &AuthConfig) -> Result<Claims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_audience(&[TOKEN_AUDIENCE]);

    let decoding_key = DecodingKey::from_secret(auth_config.jwt_secret.as_bytes());
    let token_data = decode::<Claims>(token, &decoding_key, &validation)?;

    Ok(token_data.claims)
}

// Optional auth guard that doesn't fail if no auth is provided
pub struct OptionalAuth {
    pub user: Option<AuthenticatedUser>,
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for OptionalAuth {
    type Error = ();

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        match AuthenticatedUser::from_request(req).await {
            Outcome::Success(auth) => Outcome::Success(OptionalAuth { user: Some(auth) }),
            _ => Outcome::Success(OptionalAuth { user: None }),
        }
    }
}

/// Mint a token for the given subject. Test and tooling helper; the
/// production tokens come from the managed identity provider.
pub fn issue_token(secret: &str, user_id: &str, email: &str, ttl_secs: i64) -> Result<String> {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: user_id.to_string(),
        email: email.to_string(),
        aud: TOKEN_AUDIENCE.to_string(),
        exp: (now + ttl_secs) as usize,
        iat: now as usize,
    };

    let token = jsonwebtoken::encode(
        &jsonwebtoken::Header::new(Algorithm::HS256),
        &claims,
        &jsonwebtoken::EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_tokens_verify_with_the_same_secret() {
        let config = AuthConfig::new("test-secret".to_string());
        let token = issue_token("test-secret", "alice", "alice@example.com", 3600).unwrap();

        let claims = verify_token(&token, &config).unwrap();
        assert_eq!(claims.sub, "alice");
        assert_eq!(claims.email, "alice@example.com");
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let config = AuthConfig::new("other-secret".to_string());
        let token = issue_token("test-secret", "alice", "alice@example.com", 3600).unwrap();
        assert!(verify_token(&token, &config).is_err());
    }

    #[test]
    fn expired_tokens_are_rejected() {
        let config = AuthConfig::new("test-secret".to_string());
        let token = issue_token("test-secret", "alice", "alice@example.com", -120).unwrap();
        assert!(verify_token(&token, &config).is_err());
    }
}
