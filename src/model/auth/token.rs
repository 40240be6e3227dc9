use chrono::{serde::ts_seconds, DateTime, Utc};
use jsonwebtoken::{
    errors::Error as JwtError, DecodingKey, EncodingKey, Header, TokenData, Validation,
};
use rocket::{
    http::{Cookie, SameSite, Status},
    request::{self, FromRequest},
    Request, State,
};
use serde::{Deserialize, Serialize};

use crate::config::Config;

pub const AUTH_TOKEN_COOKIE: &str = "auth_token";

/// An authentication token proving the bearer logged in as the administrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminToken {
    #[serde(rename = "u")]
    username: String,
}

impl AdminToken {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Sign this token as a JWT that expires after the configured lifetime.
    pub fn encode(self, config: &Config) -> Result<String, JwtError> {
        let claims = Claims {
            token: self,
            expire_at: Utc::now() + config.auth_ttl(),
        };
        jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(config.jwt_secret()),
        )
    }

    /// Verify a signed JWT and extract the token.
    pub fn decode(jwt: &str, config: &Config) -> Result<Self, JwtError> {
        jsonwebtoken::decode(
            jwt,
            &DecodingKey::from_secret(config.jwt_secret()),
            &Validation::default(),
        )
        .map(|claims: TokenData<Claims>| claims.claims.token)
    }

    /// Wrap an encoded JWT in a cookie with a matching lifetime.
    pub fn cookie(jwt: String, config: &Config) -> Cookie<'static> {
        Cookie::build(AUTH_TOKEN_COOKIE, jwt)
            .max_age(time::Duration::seconds(config.auth_ttl().num_seconds()))
            .same_site(SameSite::Strict)
            .finish()
    }
}

/// JWT claims: the token itself plus an expiry datetime.
#[derive(Serialize, Deserialize)]
struct Claims {
    #[serde(flatten)]
    token: AdminToken,
    #[serde(rename = "exp", with = "ts_seconds")]
    expire_at: DateTime<Utc>,
}

#[derive(Debug)]
pub enum AuthError {
    Missing,
    Invalid(JwtError),
    NoConfig,
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AdminToken {
    type Error = AuthError;

    /// Get the token from an `Authorization: Bearer` header, falling back to
    /// the auth cookie.
    async fn from_request(req: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        let config = match req.guard::<&State<Config>>().await {
            request::Outcome::Success(config) => config,
            _ => {
                return request::Outcome::Failure((
                    Status::InternalServerError,
                    AuthError::NoConfig,
                ))
            }
        };

        let bearer = req
            .headers()
            .get_one("Authorization")
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::to_string);
        let jwt = match bearer.or_else(|| {
            req.cookies()
                .get(AUTH_TOKEN_COOKIE)
                .map(|cookie| cookie.value().to_string())
        }) {
            Some(jwt) => jwt,
            None => return request::Outcome::Failure((Status::Unauthorized, AuthError::Missing)),
        };

        match Self::decode(&jwt, config) {
            Ok(token) => request::Outcome::Success(token),
            Err(e) => {
                debug!("Rejected admin token: {e}");
                request::Outcome::Failure((Status::Unauthorized, AuthError::Invalid(e)))
            }
        }
    }
}
